//! Photostage: photo editing on a 3D stage
//!
//! Load a photo onto a studio stage, orbit the camera around it, grade it
//! with CSS-style filters and decorate it with emoji stickers. Projects
//! save as compressed RON with the image embedded, so a single file
//! brings the whole session back.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod math;
mod camera;
mod history;
mod filters;
mod picture;
mod scene;
mod sticker;
mod project;
mod input;
mod viewport;
mod ui;
mod app;

use macroquad::prelude::*;

use app::App;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Photostage v{}", VERSION),
        window_width: 1280,
        window_height: 800,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    // Emoji font for the sticker palette; glyphs fall back to the default
    // font (and mostly render as boxes) if it is missing
    let sticker_font = match load_ttf_font("assets/runtime/fonts/NotoEmoji-Regular.ttf").await {
        Ok(font) => {
            println!("Loaded sticker font");
            Some(font)
        }
        Err(e) => {
            println!("Failed to load sticker font: {}, stickers will be missing", e);
            None
        }
    };

    let mut app = App::new(sticker_font);

    // Optional image path on the command line
    #[cfg(not(target_arch = "wasm32"))]
    if let Some(arg) = std::env::args().nth(1) {
        app.load_image_from_path(std::path::Path::new(&arg));
    }

    println!("=== Photostage ===");

    loop {
        app.frame();
        next_frame().await;
    }
}
