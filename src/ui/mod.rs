//! Immediate-mode UI for the editor chrome
//!
//! Toolbar, filter sliders, sticker palette and status bar, drawn with
//! macroquad each frame. Design principles:
//! - Immediate mode (no retained state, rebuilt each frame)
//! - Simple rectangle-based layout
//! - Panels report what the user did as [`UiAction`] values; the app
//!   applies them, so drawing code never touches history or files

mod rect;
mod context;
mod theme;
mod widgets;
mod panels;
mod shortcuts;

pub use rect::*;
pub use context::*;
pub use theme::*;
pub use widgets::*;
pub use panels::*;
pub use shortcuts::*;
