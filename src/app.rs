//! Application state and frame logic
//!
//! Owns the whole editing session: the loaded photo, filter settings,
//! placed stickers, camera, undo history and the 3D stage. The main loop
//! hands over one `frame` call per tick; panels report `UiAction` values
//! which are dispatched at the end of the frame.

use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use image::RgbaImage;
use macroquad::prelude::*;

use crate::camera::OrbitCamera;
use crate::filters::{FilterKind, FilterSettings, apply_filters};
use crate::history::{History, Snapshot};
use crate::input::PointerTracker;
use crate::math::Vec3;
use crate::picture::{self, CropRect, ImageSource, PictureError, Rotation};
use crate::project::{self, Project, limits};
use crate::scene::{Lighting, SceneState};
use crate::sticker::{PALETTE, StickerSet};
use crate::ui::{
    self, MouseState, PanelState, Rect, SIDE_PANEL_WIDTH, STATUS_BAR_HEIGHT, Shortcut,
    TOOLBAR_HEIGHT, ToolbarState, UiAction, UiContext,
};
use crate::viewport::Viewport;

#[cfg(not(target_arch = "wasm32"))]
use crate::picture::ExportFormat;
#[cfg(not(target_arch = "wasm32"))]
use crate::project::recents::RecentProjects;

/// Longest edge of the preview bake. Exports always use the full image.
const PREVIEW_MAX_DIM: u32 = 1024;

/// Preview blur stops here once the frame rate dips
const BLUR_CAP: f32 = 8.0;

/// Consecutive slow frames before the blur cap engages
const LOW_FPS_SUSTAIN: u32 = 45;

/// Film-grain amplitude in channel units
const NOISE_INTENSITY: f32 = 25.0;

pub struct App {
    ctx: UiContext,
    panel_state: PanelState,

    /// Persistent project metadata; live edits below are folded back
    /// into it on save
    project: Project,
    project_path: Option<PathBuf>,

    source: Option<ImageSource>,
    /// Full-resolution dimensions, kept for the status bar and export
    full_size: Option<(u32, u32)>,
    /// Downscaled copy the stage texture is baked from
    preview: Option<RgbaImage>,

    camera: OrbitCamera,
    lighting: Lighting,
    filters: FilterSettings,
    stickers: StickerSet,

    history: History,
    viewport: Viewport,
    tracker: PointerTracker,

    sticker_font: Option<Font>,
    /// (sticker id, position at grab time)
    dragging_sticker: Option<(u64, Vec3)>,
    /// Palette index waiting for a stage click
    pending_sticker: Option<usize>,
    /// (message, seconds left)
    status_message: Option<(String, f32)>,
    blur_capped: bool,
    low_fps_frames: u32,

    #[cfg(not(target_arch = "wasm32"))]
    recents: RecentProjects,
}

impl App {
    pub fn new(sticker_font: Option<Font>) -> Self {
        Self {
            ctx: UiContext::new(),
            panel_state: PanelState::default(),
            project: Project::new("Untitled"),
            project_path: None,
            source: None,
            full_size: None,
            preview: None,
            camera: OrbitCamera::new(),
            lighting: Lighting::default(),
            filters: FilterSettings::default(),
            stickers: StickerSet::new(),
            history: History::new(),
            viewport: Viewport::new(),
            tracker: PointerTracker::new(),
            sticker_font,
            dragging_sticker: None,
            pending_sticker: None,
            status_message: None,
            blur_capped: false,
            low_fps_frames: 0,
            #[cfg(not(target_arch = "wasm32"))]
            recents: RecentProjects::load(),
        }
    }

    /// Run one tick: draw the stage and panels, then dispatch whatever
    /// the UI and keyboard produced.
    pub fn frame(&mut self) {
        self.tick_status();
        self.ctx.begin_frame(MouseState::poll());

        let screen = Rect::screen(screen_width(), screen_height());
        let toolbar = screen.slice_top(TOOLBAR_HEIGHT);
        let rest = screen.remaining_after_top(TOOLBAR_HEIGHT);
        let status_bar = rest.slice_bottom(STATUS_BAR_HEIGHT);
        let body = rest.remaining_after_bottom(STATUS_BAR_HEIGHT);
        let side = body.slice_right(SIDE_PANEL_WIDTH);
        let stage = body.remaining_after_right(SIDE_PANEL_WIDTH);

        clear_background(ui::BG_COLOR);

        // Heavy blur tanks the preview bake; cap it once the frame rate
        // has stayed low for a stretch, and leave the cap on for the
        // rest of the session
        if !self.blur_capped && get_time() > 1.0 {
            if get_fps() < 30 {
                self.low_fps_frames += 1;
            } else {
                self.low_fps_frames = 0;
            }
            if self.low_fps_frames >= LOW_FPS_SUSTAIN
                && self.filters.get(FilterKind::Blur) > BLUR_CAP
            {
                self.blur_capped = true;
                self.viewport.mark_dirty();
                println!("Frame rate stayed low, capping preview blur at {}", BLUR_CAP);
            }
        }

        let bake = self.bake_filters();
        self.viewport.refresh(self.preview.as_ref(), &bake);
        self.viewport.draw(
            stage,
            &self.camera,
            self.lighting,
            &self.stickers,
            self.sticker_font.as_ref(),
        );

        let mut actions = Vec::new();
        ui::draw_toolbar(
            &mut self.ctx,
            toolbar,
            &ToolbarState {
                project_name: &self.project.name,
                rotation_enabled: self.camera.rotation_enabled(),
                lighting_enabled: self.lighting.enabled,
                can_undo: self.history.can_undo(),
                can_redo: self.history.can_redo(),
            },
            &mut actions,
        );
        ui::draw_side_panel(
            &mut self.ctx,
            side,
            &self.filters,
            &self.stickers,
            self.pending_sticker,
            self.sticker_font.as_ref(),
            &mut self.panel_state,
            &mut actions,
        );
        ui::draw_status_bar(
            status_bar,
            self.get_status(),
            self.full_size,
            self.history.undo_depth(),
            get_fps(),
        );
        ui::draw_tooltip(&self.ctx);

        keyboard_shortcuts(&mut actions);
        self.handle_stage_input(stage);

        for action in actions {
            self.process(action);
        }
    }

    /// Sticker placement, drag and removal plus camera orbit, all inside
    /// the stage rect
    fn handle_stage_input(&mut self, stage: Rect) {
        let mouse = self.ctx.mouse;
        let over_stage = mouse.inside(&stage) && self.ctx.dragging.is_none();
        let mut click_consumed = false;

        // An armed sticker claims the next stage click
        if let Some(index) = self.pending_sticker {
            if mouse.right_pressed && over_stage {
                self.pending_sticker = None;
                self.set_status("Placement cancelled", 2.0);
                click_consumed = true;
            } else if mouse.left_pressed && over_stage {
                self.pending_sticker = None;
                click_consumed = true;
                if let (Some(point), Some(&(glyph, name))) = (
                    self.viewport.plane_point(stage, &self.camera, mouse.x, mouse.y),
                    PALETTE.get(index),
                ) {
                    self.stickers.place(glyph, point);
                    self.record_state();
                    self.set_status(&format!("Placed {}", name), 2.0);
                }
            }
        }

        if mouse.right_pressed && over_stage && !click_consumed && self.dragging_sticker.is_none()
        {
            if let Some(id) =
                self.viewport
                    .sticker_at(stage, &self.camera, &self.stickers, mouse.x, mouse.y)
            {
                self.stickers.remove(id);
                self.record_state();
                self.set_status("Removed sticker", 2.0);
            }
        }

        if mouse.left_pressed && over_stage && !click_consumed && self.dragging_sticker.is_none() {
            if let Some(id) =
                self.viewport
                    .sticker_at(stage, &self.camera, &self.stickers, mouse.x, mouse.y)
            {
                let start = self
                    .stickers
                    .get(id)
                    .map(|s| s.position)
                    .unwrap_or(Vec3::ZERO);
                self.dragging_sticker = Some((id, start));
            }
        }

        if let Some((id, start)) = self.dragging_sticker {
            if mouse.left_down {
                if let Some(point) =
                    self.viewport.plane_point(stage, &self.camera, mouse.x, mouse.y)
                {
                    self.stickers.set_position(id, point);
                }
            } else {
                self.dragging_sticker = None;
                let moved = self.stickers.get(id).map_or(false, |s| s.position != start);
                if moved {
                    self.record_state();
                }
            }
        }

        let allow_start = over_stage
            && !click_consumed
            && self.dragging_sticker.is_none()
            && self.pending_sticker.is_none();
        self.tracker.pump(&mut self.camera, allow_start);
    }

    fn process(&mut self, action: UiAction) {
        match action {
            UiAction::OpenImage => self.open_image_dialog(),
            UiAction::NewProject => self.new_project(),
            UiAction::OpenProject => self.open_project_dialog(),
            UiAction::SaveProject => self.save_project_action(),
            UiAction::ExportImage => self.export_dialog(),
            UiAction::Undo => self.undo(),
            UiAction::Redo => self.redo(),
            UiAction::ToggleRotation => {
                let enabled = !self.camera.rotation_enabled();
                self.camera.set_rotation_enabled(enabled);
                self.record_state();
                self.set_status(
                    if enabled { "3D rotation on" } else { "Front view locked" },
                    2.0,
                );
            }
            UiAction::ToggleLighting => {
                self.lighting.enabled = !self.lighting.enabled;
                self.record_state();
                self.set_status(
                    if self.lighting.enabled { "Lighting on" } else { "Lighting off" },
                    2.0,
                );
            }
            UiAction::ResetView => {
                self.camera.reset_position();
                self.record_state();
            }
            UiAction::SetFilter(kind, value) => {
                self.filters.set(kind, value);
                self.viewport.mark_dirty();
            }
            UiAction::CommitFilters => self.record_state(),
            UiAction::ResetFilter(kind) => {
                self.filters.set(kind, kind.default_value());
                self.viewport.mark_dirty();
                self.record_state();
            }
            UiAction::ResetAllFilters => {
                self.filters.reset();
                self.viewport.mark_dirty();
                self.record_state();
            }
            UiAction::FlipHorizontal => {
                self.edit_image("Flipped horizontally", |img| Ok(picture::flip_horizontal(img)))
            }
            UiAction::FlipVertical => {
                self.edit_image("Flipped vertically", |img| Ok(picture::flip_vertical(img)))
            }
            UiAction::RotateQuarter => self.edit_image("Rotated 90\u{b0}", |img| {
                Ok(picture::rotate(img, Rotation::Quarter))
            }),
            UiAction::AddNoise => self.edit_image("Added grain", |img| {
                Ok(picture::add_noise(img, NOISE_INTENSITY))
            }),
            UiAction::ArmSticker(index) => self.arm_sticker(index),
            UiAction::CancelPlacement => self.cancel_placement(),
            UiAction::ClearStickers => {
                if self.stickers.is_empty() {
                    self.set_status("No stickers to clear", 2.0);
                } else {
                    self.stickers.clear();
                    self.record_state();
                    self.set_status("Cleared stickers", 2.0);
                }
            }
        }
    }

    /// Arm a palette sticker; the next click on the stage places it
    fn arm_sticker(&mut self, index: usize) {
        if self.preview.is_none() {
            self.set_status("Load a photo first", 2.5);
            return;
        }
        let Some(&(_, name)) = PALETTE.get(index) else {
            return;
        };
        self.pending_sticker = Some(index);
        self.set_status(&format!("Click the photo to place {} (Esc cancels)", name), 6.0);
    }

    fn cancel_placement(&mut self) {
        if self.pending_sticker.take().is_some() {
            self.set_status("Placement cancelled", 2.0);
        }
    }

    /// Run an edit against the full-resolution photo, then rebuild the
    /// preview and record the result
    fn edit_image(
        &mut self,
        label: &str,
        op: impl FnOnce(&RgbaImage) -> Result<RgbaImage, PictureError>,
    ) {
        let Some(source) = &self.source else {
            self.set_status("Load a photo first", 2.5);
            return;
        };
        let result = source
            .decode()
            .and_then(|full| op(&full))
            .and_then(|edited| ImageSource::from_image(&edited));
        match result {
            Ok(edited) => {
                self.source = Some(edited);
                self.rebuild_preview();
                self.record_state();
                self.viewport.mark_dirty();
                self.set_status(label, 2.0);
            }
            Err(e) => self.set_status(&format!("Edit failed: {}", e), 5.0),
        }
    }

    /// Crop to a normalized sub-rectangle of the photo
    pub fn crop_image(&mut self, rect: CropRect) {
        self.edit_image("Cropped", move |img| picture::crop(img, rect));
    }

    /// Resize the photo itself, not just the preview
    pub fn resize_image(&mut self, width: u32, height: u32, preserve_aspect: bool) {
        self.edit_image("Resized", move |img| {
            picture::resize(img, width, height, preserve_aspect)
        });
    }

    fn undo(&mut self) {
        match self.history.undo() {
            Some(snapshot) => self.apply_snapshot(snapshot),
            None => self.set_status("Nothing to undo", 2.0),
        }
    }

    fn redo(&mut self) {
        match self.history.redo() {
            Some(snapshot) => self.apply_snapshot(snapshot),
            None => self.set_status("Nothing to redo", 2.0),
        }
    }

    /// Push the current session state onto the undo stack. Without an
    /// image there is nothing meaningful to snapshot, so this is a no-op
    /// and the history only starts at the load-time baseline.
    fn record_state(&mut self) {
        if self.source.is_none() {
            return;
        }
        let snapshot = Snapshot::capture(
            self.source.clone(),
            SceneState::from_camera(&self.camera, self.lighting),
            self.filters,
            self.stickers.to_vec(),
        );
        self.history.record(snapshot);
    }

    /// Single restore path shared by undo and redo
    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.source = snapshot.image;
        self.rebuild_preview();
        snapshot.scene.apply_to(&mut self.camera);
        self.lighting = snapshot.scene.lighting;
        self.filters = snapshot.filters;
        self.stickers.replace_all(snapshot.stickers);
        self.dragging_sticker = None;
        self.pending_sticker = None;
        self.viewport.mark_dirty();
    }

    fn rebuild_preview(&mut self) {
        match &self.source {
            Some(source) => match source.decode() {
                Ok(full) => {
                    self.full_size = Some((full.width(), full.height()));
                    self.preview = Some(make_preview(&full));
                }
                Err(e) => {
                    eprintln!("Failed to decode image: {}", e);
                    self.full_size = None;
                    self.preview = None;
                }
            },
            None => {
                self.full_size = None;
                self.preview = None;
            }
        }
    }

    /// Filters as baked into the stage texture (blur cap applied)
    fn bake_filters(&self) -> FilterSettings {
        let mut filters = self.filters;
        if self.blur_capped {
            let blur = filters.get(FilterKind::Blur);
            filters.set(FilterKind::Blur, blur.min(BLUR_CAP));
        }
        filters
    }

    fn load_image_bytes(&mut self, bytes: Vec<u8>, label: &str) {
        match ImageSource::from_bytes(bytes) {
            Ok((source, decoded)) => {
                let (w, h) = (decoded.width(), decoded.height());
                if w > limits::MAX_IMAGE_DIM || h > limits::MAX_IMAGE_DIM {
                    self.set_status(
                        &format!("Image too large ({}x{}, max {})", w, h, limits::MAX_IMAGE_DIM),
                        5.0,
                    );
                    return;
                }

                self.full_size = Some((w, h));
                self.preview = Some(make_preview(&decoded));
                self.source = Some(source);

                // Every image starts from the same framing and a clean slate
                self.filters = FilterSettings::default();
                self.stickers.clear();
                self.dragging_sticker = None;
                self.pending_sticker = None;
                self.camera.reset_position();
                self.blur_capped = false;
                self.history.clear();
                self.record_state();
                self.viewport.mark_dirty();
                self.set_status(&format!("Loaded {} ({}x{})", label, w, h), 3.0);
            }
            Err(e) => self.set_status(&format!("Load failed: {}", e), 5.0),
        }
    }

    fn new_project(&mut self) {
        self.project = Project::new("Untitled");
        self.project_path = None;
        self.source = None;
        self.full_size = None;
        self.preview = None;
        self.filters = FilterSettings::default();
        self.stickers.clear();
        self.lighting = Lighting::default();
        self.camera = OrbitCamera::new();
        self.dragging_sticker = None;
        self.pending_sticker = None;
        self.blur_capped = false;
        self.history.clear();
        self.record_state();
        self.viewport.mark_dirty();
        self.set_status("New project", 2.0);
    }

    /// Take over a loaded project as the live session
    fn adopt_project(&mut self, mut project: Project, path: Option<PathBuf>) {
        self.source = project.image.take();
        self.rebuild_preview();
        self.filters = project.filters;
        self.stickers
            .replace_all(std::mem::take(&mut project.stickers));
        project.scene.apply_to(&mut self.camera);
        self.lighting = project.scene.lighting;
        self.project = project;
        self.project_path = path;
        self.dragging_sticker = None;
        self.pending_sticker = None;
        self.blur_capped = false;
        self.history.clear();
        self.record_state();
        self.viewport.mark_dirty();
    }

    /// Fold the live session back into the project container
    fn collect_project(&self) -> Project {
        let mut snapshot = self.project.clone();
        snapshot.image = self.source.clone();
        snapshot.scene = SceneState::from_camera(&self.camera, self.lighting);
        snapshot.filters = self.filters;
        snapshot.stickers = self.stickers.to_vec();
        snapshot.touch();
        snapshot
    }

    pub fn set_status(&mut self, message: &str, duration_secs: f32) {
        self.status_message = Some((message.to_string(), duration_secs));
    }

    pub fn get_status(&self) -> Option<&str> {
        self.status_message.as_ref().map(|(msg, _)| msg.as_str())
    }

    fn tick_status(&mut self) {
        if let Some((_, left)) = &mut self.status_message {
            *left -= get_frame_time();
            if *left <= 0.0 {
                self.status_message = None;
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_image_from_path(&mut self, path: &Path) {
        match std::fs::read(path) {
            Ok(bytes) => {
                let label = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "image".to_string());
                self.load_image_bytes(bytes, &label);
            }
            Err(e) => self.set_status(&format!("Load failed: {}", e), 5.0),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn open_image_dialog(&mut self) {
        let dialog = rfd::FileDialog::new().add_filter("Images", &["png", "jpg", "jpeg", "bmp"]);
        if let Some(path) = dialog.pick_file() {
            self.load_image_from_path(&path);
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn open_image_dialog(&mut self) {
        self.set_status("Open not available in browser", 3.0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn open_project_dialog(&mut self) {
        let dialog = rfd::FileDialog::new().add_filter("Photostage Project", &["ron"]);
        if let Some(path) = dialog.pick_file() {
            match project::load_project(&path) {
                Ok(loaded) => {
                    self.adopt_project(loaded, Some(path.clone()));
                    self.remember_recent(&path);
                    self.set_status(&format!("Loaded {}", path.display()), 3.0);
                }
                Err(e) => self.set_status(&format!("Load failed: {}", e), 5.0),
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn open_project_dialog(&mut self) {
        self.set_status("Open not available in browser", 3.0);
    }

    fn save_project_action(&mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.project_path.clone() {
                Some(path) => self.save_project_to(path),
                None => self.save_project_dialog(),
            }
        }
        #[cfg(target_arch = "wasm32")]
        self.set_status("Save not available in browser", 3.0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save_project_dialog(&mut self) {
        let dialog = rfd::FileDialog::new()
            .add_filter("Photostage Project", &["ron"])
            .set_file_name(format!("{}.ron", self.project.name));
        if let Some(path) = dialog.save_file() {
            self.save_project_to(path);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save_project_to(&mut self, path: PathBuf) {
        let snapshot = self.collect_project();
        match project::save_project(&snapshot, &path) {
            Ok(()) => {
                self.project.modified_at = snapshot.modified_at;
                self.project_path = Some(path.clone());
                self.remember_recent(&path);
                self.set_status(&format!("Saved {}", path.display()), 3.0);
            }
            Err(e) => self.set_status(&format!("Save failed: {}", e), 5.0),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn remember_recent(&mut self, path: &Path) {
        self.recents.remember(&self.project.name, path);
        self.recents.save();
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn export_dialog(&mut self) {
        let Some(source) = self.source.clone() else {
            self.set_status("Load a photo first", 2.5);
            return;
        };

        let dialog = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .add_filter("JPEG Image", &["jpg", "jpeg"])
            .set_file_name("export.png");
        let Some(path) = dialog.save_file() else {
            return;
        };

        let format = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => ExportFormat::Jpeg,
            _ => ExportFormat::Png,
        };

        // Full-resolution bake, independent of the preview and blur cap
        let result = source
            .decode()
            .map_err(|e| e.to_string())
            .and_then(|full| {
                let baked = apply_filters(&full, &self.filters);
                picture::export(&baked, format, 92).map_err(|e| e.to_string())
            })
            .and_then(|data| std::fs::write(&path, data).map_err(|e| e.to_string()));

        match result {
            Ok(()) => self.set_status(&format!("Exported {}", path.display()), 3.0),
            Err(e) => self.set_status(&format!("Export failed: {}", e), 5.0),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn export_dialog(&mut self) {
        self.set_status("Export not available in browser", 3.0);
    }
}

fn keyboard_shortcuts(actions: &mut Vec<UiAction>) {
    if Shortcut::ctrl(KeyCode::Z).is_pressed() {
        actions.push(UiAction::Undo);
    }
    if Shortcut::ctrl_shift(KeyCode::Z).is_pressed() {
        actions.push(UiAction::Redo);
    }
    if Shortcut::ctrl(KeyCode::S).is_pressed() {
        actions.push(UiAction::SaveProject);
    }
    if Shortcut::ctrl(KeyCode::O).is_pressed() {
        actions.push(UiAction::OpenImage);
    }
    if Shortcut::key(KeyCode::R).is_pressed() {
        actions.push(UiAction::ResetView);
    }
    if Shortcut::key(KeyCode::Escape).is_pressed() {
        actions.push(UiAction::CancelPlacement);
    }
}

/// Downscale for the stage bake so filter passes stay interactive
fn make_preview(full: &RgbaImage) -> RgbaImage {
    let longest = full.width().max(full.height());
    if longest <= PREVIEW_MAX_DIM {
        return full.clone();
    }
    picture::resize(full, PREVIEW_MAX_DIM, PREVIEW_MAX_DIM, true)
        .unwrap_or_else(|_| full.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encoded_test_image(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, image::Rgba([120, 80, 40, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// 2x1 image: left pixel blue, right pixel red
    fn encoded_two_tone() -> Vec<u8> {
        let mut img = RgbaImage::from_pixel(2, 1, image::Rgba([200, 0, 0, 255]));
        img.put_pixel(0, 0, image::Rgba([0, 0, 200, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_no_history_without_image() {
        let mut app = App::new(None);
        assert_eq!(app.history.undo_depth(), 0);

        // Nothing to snapshot yet, so recording stays a no-op
        app.record_state();
        assert_eq!(app.history.undo_depth(), 0);

        app.process(UiAction::Undo);
        assert_eq!(app.get_status(), Some("Nothing to undo"));

        // Edits need a photo too
        app.process(UiAction::FlipHorizontal);
        assert_eq!(app.history.undo_depth(), 0);
        assert_eq!(app.get_status(), Some("Load a photo first"));
    }

    #[test]
    fn test_filter_commit_records_and_undoes() {
        let mut app = App::new(None);
        app.load_image_bytes(encoded_test_image(8, 8), "a.png");
        assert_eq!(app.history.undo_depth(), 1);

        app.process(UiAction::SetFilter(FilterKind::Brightness, 140.0));
        app.process(UiAction::CommitFilters);
        assert_eq!(app.history.undo_depth(), 2);
        assert!(app.history.can_undo());

        app.process(UiAction::Undo);
        assert!((app.filters.get(FilterKind::Brightness) - 100.0).abs() < 0.001);
        assert!(!app.history.can_undo());

        app.process(UiAction::Redo);
        assert!((app.filters.get(FilterKind::Brightness) - 140.0).abs() < 0.001);
    }

    #[test]
    fn test_undo_past_baseline_degrades_to_status() {
        let mut app = App::new(None);
        app.load_image_bytes(encoded_test_image(8, 8), "a.png");
        app.process(UiAction::Undo);
        assert_eq!(app.history.undo_depth(), 1);
        assert_eq!(app.get_status(), Some("Nothing to undo"));
    }

    #[test]
    fn test_sticker_round_trip_through_history() {
        let mut app = App::new(None);
        app.load_image_bytes(encoded_test_image(8, 8), "a.png");
        app.stickers.place("star", Vec3::new(1.0, 0.5, 0.1));
        app.record_state();
        assert_eq!(app.stickers.len(), 1);

        app.process(UiAction::Undo);
        assert!(app.stickers.is_empty());

        app.process(UiAction::Redo);
        assert_eq!(app.stickers.len(), 1);
    }

    #[test]
    fn test_snapshot_restores_camera_pose() {
        let mut app = App::new(None);
        app.load_image_bytes(encoded_test_image(8, 8), "a.png");
        app.camera.rotate(0.4, 0.0);
        app.record_state();
        let recorded = app.camera.spherical();

        app.camera.rotate(0.7, 0.2);
        app.record_state();

        app.process(UiAction::Undo);
        assert!((app.camera.spherical().theta - recorded.theta).abs() < 0.001);
        assert!((app.camera.spherical().phi - recorded.phi).abs() < 0.001);
    }

    #[test]
    fn test_image_load_resets_session() {
        let mut app = App::new(None);
        app.filters.set(FilterKind::Brightness, 150.0);
        app.stickers.place("heart", Vec3::ZERO);
        app.record_state();
        app.camera.rotate(1.0, 0.3);

        app.load_image_bytes(encoded_test_image(16, 12), "test.png");

        assert_eq!(app.full_size, Some((16, 12)));
        assert!(app.preview.is_some());
        assert!(app.filters.is_default());
        assert!(app.stickers.is_empty());
        // Fresh baseline only, redo gone
        assert_eq!(app.history.undo_depth(), 1);
        assert!(!app.history.can_redo());
        // Canonical framing restored
        assert!((app.camera.spherical().theta - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_oversized_image_is_rejected() {
        let mut app = App::new(None);
        // Stays decodable but over the editor's cap
        let bytes = encoded_test_image(limits::MAX_IMAGE_DIM + 1, 2);
        app.load_image_bytes(bytes, "big.png");
        assert!(app.source.is_none());
        assert!(app.get_status().unwrap().starts_with("Image too large"));
    }

    #[test]
    fn test_collect_adopt_round_trip() {
        let mut app = App::new(None);
        app.load_image_bytes(encoded_test_image(10, 10), "photo.png");
        app.filters.set(FilterKind::Sepia, 60.0);
        app.stickers.place("moon", Vec3::new(0.5, -0.25, 0.1));
        app.record_state();

        let saved = app.collect_project();

        let mut restored = App::new(None);
        restored.adopt_project(saved, None);
        assert!((restored.filters.get(FilterKind::Sepia) - 60.0).abs() < 0.001);
        assert_eq!(restored.stickers.len(), 1);
        assert_eq!(restored.full_size, Some((10, 10)));
        assert_eq!(restored.history.undo_depth(), 1);
    }

    #[test]
    fn test_lighting_toggle_records_history() {
        let mut app = App::new(None);
        app.load_image_bytes(encoded_test_image(8, 8), "a.png");
        assert!(app.lighting.enabled);

        app.process(UiAction::ToggleLighting);
        assert!(!app.lighting.enabled);
        assert_eq!(app.history.undo_depth(), 2);

        app.process(UiAction::Undo);
        assert!(app.lighting.enabled);
    }

    #[test]
    fn test_arm_requires_image_and_esc_cancels() {
        let mut app = App::new(None);
        app.process(UiAction::ArmSticker(0));
        assert_eq!(app.pending_sticker, None);
        assert_eq!(app.get_status(), Some("Load a photo first"));

        app.load_image_bytes(encoded_test_image(8, 8), "a.png");
        app.process(UiAction::ArmSticker(2));
        assert_eq!(app.pending_sticker, Some(2));

        app.process(UiAction::CancelPlacement);
        assert_eq!(app.pending_sticker, None);
        assert_eq!(app.get_status(), Some("Placement cancelled"));
        // Nothing was placed, nothing recorded
        assert!(app.stickers.is_empty());
        assert_eq!(app.history.undo_depth(), 1);
    }

    #[test]
    fn test_flip_edits_source_and_records() {
        let mut app = App::new(None);
        app.load_image_bytes(encoded_two_tone(), "t.png");
        assert_eq!(app.history.undo_depth(), 1);

        app.process(UiAction::FlipHorizontal);
        assert_eq!(app.history.undo_depth(), 2);
        let flipped = app.source.as_ref().unwrap().decode().unwrap();
        assert_eq!(flipped.get_pixel(1, 0), &image::Rgba([0, 0, 200, 255]));

        app.process(UiAction::Undo);
        let restored = app.source.as_ref().unwrap().decode().unwrap();
        assert_eq!(restored.get_pixel(0, 0), &image::Rgba([0, 0, 200, 255]));
    }

    #[test]
    fn test_rotate_swaps_full_size() {
        let mut app = App::new(None);
        app.load_image_bytes(encoded_test_image(16, 12), "t.png");
        app.process(UiAction::RotateQuarter);
        assert_eq!(app.full_size, Some((12, 16)));
        assert_eq!(app.history.undo_depth(), 2);
    }

    #[test]
    fn test_crop_and_resize_record_history() {
        let mut app = App::new(None);
        app.load_image_bytes(encoded_test_image(16, 12), "t.png");

        app.crop_image(CropRect { x: 0.0, y: 0.0, width: 0.5, height: 0.5 });
        assert_eq!(app.full_size, Some((8, 6)));

        app.resize_image(4, 4, true);
        assert_eq!(app.full_size, Some((4, 3)));
        assert_eq!(app.history.undo_depth(), 3);
    }

    #[test]
    fn test_blur_cap_only_affects_bake() {
        let mut app = App::new(None);
        app.filters.set(FilterKind::Blur, 20.0);
        app.blur_capped = true;
        assert!((app.bake_filters().get(FilterKind::Blur) - BLUR_CAP).abs() < 0.001);
        assert!((app.filters.get(FilterKind::Blur) - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_preview_downscales_large_images() {
        let full = RgbaImage::from_pixel(2048, 512, image::Rgba([9, 9, 9, 255]));
        let preview = make_preview(&full);
        assert_eq!(preview.width(), PREVIEW_MAX_DIM);
        assert_eq!(preview.height(), 256);

        let small = RgbaImage::from_pixel(640, 480, image::Rgba([9, 9, 9, 255]));
        assert_eq!(make_preview(&small).dimensions(), (640, 480));
    }
}
