//! Basic UI widgets

use macroquad::prelude::*;

use super::{Rect, UiContext};
use super::theme::*;

/// Simple toolbar layout helper
pub struct Toolbar {
    rect: Rect,
    cursor_x: f32,
    spacing: f32,
}

impl Toolbar {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            cursor_x: rect.x + 6.0,
            spacing: 4.0,
        }
    }

    /// Add a separator
    pub fn separator(&mut self) {
        self.cursor_x += self.spacing * 2.0;
        draw_line(
            self.cursor_x,
            self.rect.y + 6.0,
            self.cursor_x,
            self.rect.bottom() - 6.0,
            1.0,
            Color::from_rgba(80, 80, 80, 255),
        );
        self.cursor_x += self.spacing * 2.0;
    }

    /// Add a flat text button, returns true if clicked
    pub fn button(&mut self, ctx: &mut UiContext, label: &str, tooltip: &str) -> bool {
        self.button_active(ctx, label, tooltip, false)
    }

    /// Add a flat text button with active state highlighting
    pub fn button_active(
        &mut self,
        ctx: &mut UiContext,
        label: &str,
        tooltip: &str,
        is_active: bool,
    ) -> bool {
        let btn_rect = self.advance(label);
        flat_button(ctx, btn_rect, label, tooltip, is_active)
    }

    /// Add a button that only reports clicks while enabled. Disabled
    /// buttons draw dimmed and ignore the mouse.
    pub fn button_enabled(
        &mut self,
        ctx: &mut UiContext,
        label: &str,
        tooltip: &str,
        enabled: bool,
    ) -> bool {
        if enabled {
            return self.button(ctx, label, tooltip);
        }
        let btn_rect = self.advance(label);
        let text_dims = measure_text(label, None, FONT_SIZE_HEADER as u16, 1.0);
        let text_x = (btn_rect.center_x() - text_dims.width * 0.5).round();
        let text_y = (btn_rect.y + (btn_rect.h + text_dims.height) * 0.5).round();
        draw_text(label, text_x, text_y, FONT_SIZE_HEADER, DISABLED_TEXT);
        false
    }

    /// Reserve the next button slot for `label` and move the cursor past it
    fn advance(&mut self, label: &str) -> Rect {
        let text_dims = measure_text(label, None, FONT_SIZE_HEADER as u16, 1.0);
        let pad = 8.0;
        let w = (text_dims.width + pad * 2.0).round();
        let btn_rect = Rect::new(
            self.cursor_x.round(),
            (self.rect.y + 3.0).round(),
            w,
            (self.rect.h - 6.0).round(),
        );
        self.cursor_x += w + self.spacing;
        btn_rect
    }
}

/// Draw a flat text button, returns true if clicked.
/// No background when idle, highlight on hover/press, accent when active.
pub fn flat_button(
    ctx: &mut UiContext,
    rect: Rect,
    label: &str,
    tooltip: &str,
    is_active: bool,
) -> bool {
    let id = ctx.next_id();
    let pressed = ctx.mouse.clicking(&rect);
    let clicked = ctx.mouse.clicked(&rect);

    if ctx.mouse.inside(&rect) {
        ctx.set_hot(id);
    }
    // set_hot refuses while another widget is dragging, so reading it
    // back keeps highlights and tooltips off during slider drags
    let hot = ctx.is_hot(id);
    if hot && !tooltip.is_empty() {
        ctx.set_tooltip(tooltip, ctx.mouse.x, ctx.mouse.y);
    }

    let corner_radius = 4.0;

    if is_active {
        draw_rounded_rect(rect.x, rect.y, rect.w, rect.h, corner_radius, ACCENT_COLOR);
    } else if hot && pressed {
        draw_rounded_rect(rect.x, rect.y, rect.w, rect.h, corner_radius, Color::from_rgba(60, 60, 70, 255));
    } else if hot {
        draw_rounded_rect(rect.x, rect.y, rect.w, rect.h, corner_radius, Color::from_rgba(50, 50, 60, 255));
    }

    let text_color = if is_active {
        WHITE
    } else if hot {
        Color::from_rgba(220, 220, 220, 255)
    } else {
        Color::from_rgba(180, 180, 180, 255)
    };

    let text_dims = measure_text(label, None, FONT_SIZE_HEADER as u16, 1.0);
    let text_x = (rect.center_x() - text_dims.width * 0.5).round();
    let text_y = (rect.y + (rect.h + text_dims.height) * 0.5).round();
    draw_text(label, text_x, text_y, FONT_SIZE_HEADER, text_color);

    clicked
}

/// Draw a slider track with fill and handle. Interaction is handled by
/// the caller, which owns the active-slider state.
pub fn draw_slider_track(rect: Rect, ratio: f32, tint: Color) {
    let ratio = ratio.clamp(0.0, 1.0);
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, SLIDER_TRACK);
    draw_rectangle(rect.x, rect.y, rect.w * ratio, rect.h, tint);

    let handle_x = rect.x + rect.w * ratio - 2.0;
    draw_rectangle(handle_x.max(rect.x), rect.y, 4.0, rect.h, WHITE);
}

/// Draw the frame's pending tooltip, if any. Call after all panels.
pub fn draw_tooltip(ctx: &UiContext) {
    let Some((text, x, y)) = ctx.tooltip() else {
        return;
    };

    let text_dims = measure_text(text, None, FONT_SIZE_CONTENT as u16, 1.0);
    let pad = 5.0;
    let w = text_dims.width + pad * 2.0;
    let h = FONT_SIZE_CONTENT + pad * 2.0;

    // Offset below the cursor, kept on screen
    let tx = (x + 12.0).min(screen_width() - w - 2.0).max(2.0);
    let ty = (y + 18.0).min(screen_height() - h - 2.0).max(2.0);

    draw_rectangle(tx, ty, w, h, TOOLTIP_BG);
    draw_rectangle_lines(tx, ty, w, h, 1.0, TOOLTIP_BORDER);
    draw_text(text, (tx + pad).round(), (ty + h - pad - 2.0).round(), FONT_SIZE_CONTENT, TEXT_COLOR);
}

/// Draw a rounded rectangle (simple approximation using overlapping rects)
fn draw_rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32, color: Color) {
    // Main body
    draw_rectangle(x + r, y, w - r * 2.0, h, color);
    draw_rectangle(x, y + r, w, h - r * 2.0, color);
    // Corners (circles)
    draw_circle(x + r, y + r, r, color);
    draw_circle(x + w - r, y + r, r, color);
    draw_circle(x + r, y + h - r, r, color);
    draw_circle(x + w - r, y + h - r, r, color);
}
