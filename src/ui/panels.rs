//! Editor panels: toolbar, filter sliders, sticker palette, status bar
//!
//! Panels draw themselves and collect [`UiAction`] values describing what
//! the user did; the app applies them after the UI pass.

use macroquad::prelude::*;

use crate::filters::{FilterKind, FilterSettings};
use crate::sticker::{StickerSet, PALETTE};

use super::{Rect, Toolbar, UiContext, draw_slider_track, flat_button};
use super::theme::*;

pub const TOOLBAR_HEIGHT: f32 = 34.0;
pub const SIDE_PANEL_WIDTH: f32 = 250.0;
pub const STATUS_BAR_HEIGHT: f32 = 22.0;

/// What the user asked for through the chrome this frame
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    OpenImage,
    NewProject,
    OpenProject,
    SaveProject,
    ExportImage,
    Undo,
    Redo,
    ToggleRotation,
    ToggleLighting,
    ResetView,
    /// Live slider value while dragging
    SetFilter(FilterKind, f32),
    /// Slider released; the new values are final
    CommitFilters,
    ResetFilter(FilterKind),
    ResetAllFilters,
    FlipHorizontal,
    FlipVertical,
    RotateQuarter,
    AddNoise,
    /// Palette index armed; the next stage click places it
    ArmSticker(usize),
    CancelPlacement,
    ClearStickers,
}

/// Panel state that must survive across frames
#[derive(Default)]
pub struct PanelState {
    /// Which filter slider is mid-drag
    active_slider: Option<FilterKind>,
}

/// App state the toolbar reflects but never owns
pub struct ToolbarState<'a> {
    pub project_name: &'a str,
    pub rotation_enabled: bool,
    pub lighting_enabled: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}

pub fn draw_toolbar(
    ctx: &mut UiContext,
    rect: Rect,
    state: &ToolbarState,
    actions: &mut Vec<UiAction>,
) {
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, HEADER_COLOR);

    let mut bar = Toolbar::new(rect);
    if bar.button(ctx, "Load Photo", "Load an image (Ctrl+O)") {
        actions.push(UiAction::OpenImage);
    }
    if bar.button(ctx, "Export", "Export the edited image") {
        actions.push(UiAction::ExportImage);
    }
    bar.separator();
    if bar.button(ctx, "New", "Start a new project") {
        actions.push(UiAction::NewProject);
    }
    if bar.button(ctx, "Open", "Open a saved project") {
        actions.push(UiAction::OpenProject);
    }
    if bar.button(ctx, "Save", "Save project (Ctrl+S)") {
        actions.push(UiAction::SaveProject);
    }
    bar.separator();
    if bar.button_enabled(ctx, "Undo", "Undo (Ctrl+Z)", state.can_undo) {
        actions.push(UiAction::Undo);
    }
    if bar.button_enabled(ctx, "Redo", "Redo (Ctrl+Shift+Z)", state.can_redo) {
        actions.push(UiAction::Redo);
    }
    bar.separator();
    if bar.button_active(ctx, "3D", "Toggle 3D rotation", state.rotation_enabled) {
        actions.push(UiAction::ToggleRotation);
    }
    if bar.button_active(ctx, "Light", "Toggle scene lighting", state.lighting_enabled) {
        actions.push(UiAction::ToggleLighting);
    }
    if bar.button(ctx, "Front", "Reset the view (R)") {
        actions.push(UiAction::ResetView);
    }

    // Project name on the right
    let name = if state.project_name.is_empty() { "Untitled" } else { state.project_name };
    let dims = measure_text(name, None, FONT_SIZE_HEADER as u16, 1.0);
    let text_y = (rect.y + (rect.h + dims.height) * 0.5).round();
    draw_text(name, (rect.right() - dims.width - 8.0).round(), text_y, FONT_SIZE_HEADER, TEXT_DIM);
}

pub fn draw_side_panel(
    ctx: &mut UiContext,
    rect: Rect,
    filters: &FilterSettings,
    stickers: &StickerSet,
    armed_sticker: Option<usize>,
    sticker_font: Option<&Font>,
    state: &mut PanelState,
    actions: &mut Vec<UiAction>,
) {
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, PANEL_COLOR);

    let inner = rect.pad(8.0);
    let mut y = inner.y;

    y = draw_filter_section(ctx, inner, y, filters, state, actions);
    y += 10.0;
    y = draw_adjust_section(ctx, inner, y, actions);
    y += 10.0;
    draw_sticker_section(ctx, inner, y, stickers, armed_sticker, sticker_font, actions);
}

/// Filter rows: label, slider, value. Right-click a row to reset that
/// filter. Returns the y below the section.
fn draw_filter_section(
    ctx: &mut UiContext,
    inner: Rect,
    mut y: f32,
    filters: &FilterSettings,
    state: &mut PanelState,
    actions: &mut Vec<UiAction>,
) -> f32 {
    draw_text("Filters", inner.x, y + 10.0, FONT_SIZE_HEADER, TEXT_COLOR);
    y += 18.0;

    let label_w = 68.0;
    let value_w = 30.0;
    let row_h = 20.0;
    let slider_h = 10.0;

    for &kind in FilterKind::ALL {
        let id = ctx.next_id();
        let value = filters.get(kind);
        let (min, max) = kind.range();
        let at_default = (value - kind.default_value()).abs() < 0.001;

        let row_rect = Rect::new(inner.x, y, inner.w, row_h);
        let track_rect = Rect::new(
            inner.x + label_w,
            y + (row_h - slider_h) * 0.5,
            inner.w - label_w - value_w - 4.0,
            slider_h,
        );

        let label_color = if at_default { TEXT_DIM } else { TEXT_COLOR };
        draw_text(kind.label(), inner.x, y + 13.0, FONT_SIZE_CONTENT, label_color);

        let tint = if at_default { SLIDER_FILL_IDLE } else { SLIDER_FILL_ACTIVE };
        let ratio = (value - min) / (max - min);
        draw_slider_track(track_rect, ratio, tint);

        draw_text(
            &format!("{}", value.round() as i32),
            track_rect.right() + 4.0,
            y + 13.0,
            FONT_SIZE_SMALL,
            TEXT_DIM,
        );

        // Grab: lock onto this slider until release, even if the pointer
        // wanders off the track mid-drag
        if ctx.mouse.inside(&track_rect)
            && ctx.mouse.left_pressed
            && state.active_slider.is_none()
            && ctx.dragging.is_none()
        {
            ctx.start_drag(id);
            state.active_slider = Some(kind);
        }

        if state.active_slider == Some(kind) {
            if ctx.mouse.left_down {
                let rel = ((ctx.mouse.x - track_rect.x) / track_rect.w).clamp(0.0, 1.0);
                let new_value = (min + rel * (max - min)).round();
                if (new_value - value).abs() > 0.001 {
                    actions.push(UiAction::SetFilter(kind, new_value));
                }
            } else {
                state.active_slider = None;
                actions.push(UiAction::CommitFilters);
            }
        }

        if ctx.mouse.right_pressed && ctx.mouse.inside(&row_rect) && !at_default {
            actions.push(UiAction::ResetFilter(kind));
        }

        y += row_h;
    }

    y += 4.0;
    let reset_rect = Rect::new(inner.x, y, 72.0, 18.0);
    if flat_button(ctx, reset_rect, "Reset All", "Set every filter back to neutral", false) {
        actions.push(UiAction::ResetAllFilters);
    }
    draw_text(
        "right-click a row to reset it",
        reset_rect.right() + 8.0,
        y + 12.0,
        FONT_SIZE_SMALL,
        TEXT_DIM,
    );

    y + 18.0
}

/// One-shot edits applied to the photo itself
fn draw_adjust_section(ctx: &mut UiContext, inner: Rect, mut y: f32, actions: &mut Vec<UiAction>) -> f32 {
    draw_text("Adjust", inner.x, y + 10.0, FONT_SIZE_HEADER, TEXT_COLOR);
    y += 18.0;

    let items: [(&str, &str, UiAction); 4] = [
        ("Flip H", "Mirror left to right", UiAction::FlipHorizontal),
        ("Flip V", "Mirror top to bottom", UiAction::FlipVertical),
        ("Rotate", "Rotate a quarter turn clockwise", UiAction::RotateQuarter),
        ("Grain", "Add film grain", UiAction::AddNoise),
    ];
    let gap = 4.0;
    let w = ((inner.w - gap * (items.len() as f32 - 1.0)) / items.len() as f32).floor();
    for (i, (label, tooltip, action)) in items.into_iter().enumerate() {
        let rect = Rect::new(inner.x + i as f32 * (w + gap), y, w, 18.0);
        if flat_button(ctx, rect, label, tooltip, false) {
            actions.push(action);
        }
    }

    y + 18.0
}

/// Sticker palette grid plus placed-count and clear button
fn draw_sticker_section(
    ctx: &mut UiContext,
    inner: Rect,
    mut y: f32,
    stickers: &StickerSet,
    armed: Option<usize>,
    sticker_font: Option<&Font>,
    actions: &mut Vec<UiAction>,
) {
    draw_text("Stickers", inner.x, y + 10.0, FONT_SIZE_HEADER, TEXT_COLOR);
    y += 18.0;

    let cols = 8;
    let gap = 2.0;
    let cell = ((inner.w - gap * (cols as f32 - 1.0)) / cols as f32).floor();

    for (idx, (glyph, name)) in PALETTE.iter().enumerate() {
        let col = idx % cols;
        let row = idx / cols;
        let cell_rect = Rect::new(
            inner.x + col as f32 * (cell + gap),
            y + row as f32 * (cell + gap),
            cell,
            cell,
        );

        let id = ctx.next_id();
        if ctx.mouse.inside(&cell_rect) {
            ctx.set_hot(id);
        }
        if ctx.is_hot(id) {
            ctx.set_tooltip(name, ctx.mouse.x, ctx.mouse.y);
            draw_rectangle(cell_rect.x, cell_rect.y, cell_rect.w, cell_rect.h, Color::from_rgba(50, 50, 60, 255));
        }

        let glyph_size = (cell * 0.7) as u16;
        let dims = measure_text(glyph, sticker_font, glyph_size, 1.0);
        draw_text_ex(
            glyph,
            (cell_rect.center_x() - dims.width * 0.5).round(),
            (cell_rect.center_y() + dims.height * 0.5).round(),
            TextParams {
                font: sticker_font,
                font_size: glyph_size,
                color: WHITE,
                ..Default::default()
            },
        );

        if armed == Some(idx) {
            draw_rectangle_lines(cell_rect.x, cell_rect.y, cell_rect.w, cell_rect.h, 2.0, ACCENT_COLOR);
        }

        if ctx.mouse.clicked(&cell_rect) {
            actions.push(UiAction::ArmSticker(idx));
        }
    }

    let rows = (PALETTE.len() + cols - 1) / cols;
    y += rows as f32 * (cell + gap) + 6.0;

    if stickers.is_empty() {
        draw_text("click one, then click the photo", inner.x, y + 10.0, FONT_SIZE_SMALL, TEXT_DIM);
    } else {
        draw_text(
            &format!("{} placed (right-click one to remove)", stickers.len()),
            inner.x,
            y + 10.0,
            FONT_SIZE_SMALL,
            TEXT_DIM,
        );
        let clear_rect = Rect::new(inner.x, y + 16.0, 52.0, 18.0);
        if flat_button(ctx, clear_rect, "Clear", "Remove all stickers", false) {
            actions.push(UiAction::ClearStickers);
        }
    }
}

pub fn draw_status_bar(
    rect: Rect,
    status: Option<&str>,
    image_size: Option<(u32, u32)>,
    undo_depth: usize,
    fps: i32,
) {
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, STATUS_COLOR);

    let text_y = (rect.y + (rect.h + FONT_SIZE_CONTENT * 0.7) * 0.5).round();

    if let Some(message) = status {
        draw_text(message, rect.x + 8.0, text_y, FONT_SIZE_CONTENT, ACCENT_COLOR);
    } else {
        let info = match image_size {
            Some((w, h)) => format!("{}x{}  |  history {}", w, h, undo_depth),
            None => "no image loaded".to_string(),
        };
        draw_text(&info, rect.x + 8.0, text_y, FONT_SIZE_CONTENT, TEXT_DIM);
    }

    let fps_text = format!("{} fps", fps);
    let dims = measure_text(&fps_text, None, FONT_SIZE_CONTENT as u16, 1.0);
    draw_text(&fps_text, (rect.right() - dims.width - 8.0).round(), text_y, FONT_SIZE_CONTENT, TEXT_DIM);
}
