//! 3D stage: photo plane, grid floor and sticker overlays
//!
//! The photo is drawn as a textured quad standing at the origin, sized
//! from its aspect ratio. The quad's texture is a CPU bake of the current
//! filters over a preview-sized image, rebuilt only when marked dirty.
//! Stickers are billboarded glyphs drawn in screen space after the 3D
//! pass, scaled by their camera distance.

use macroquad::prelude::*;

use image::RgbaImage;

use crate::camera::OrbitCamera;
use crate::filters::{FilterSettings, apply_filters};
use crate::math::{Vec3, camera_basis, ray_plane_z0, screen_to_ray, world_to_screen_with_depth};
use crate::scene::{Lighting, plane_size};
use crate::sticker::{Sticker, StickerSet};
use crate::ui::Rect;

/// Vertical field of view of the stage camera, radians
pub const CAMERA_FOVY: f32 = std::f32::consts::FRAC_PI_4;

/// Stickers float slightly in front of the plane
pub const STICKER_LIFT: f32 = 0.1;

/// Screen-space pick radius for sticker hit tests, pixels
const PICK_RADIUS: f32 = 24.0;

/// Fixed floor height, just under the tallest possible plane
const GRID_Y: f32 = -4.5;

pub struct Viewport {
    texture: Option<Texture2D>,
    plane_w: f32,
    plane_h: f32,
    dirty: bool,
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            texture: None,
            plane_w: 0.0,
            plane_h: 0.0,
            dirty: false,
        }
    }

    /// Force a texture rebake on the next refresh
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Rebake the plane texture if marked dirty. `preview` is the
    /// downscaled source image; None drops the plane entirely.
    pub fn refresh(&mut self, preview: Option<&RgbaImage>, filters: &FilterSettings) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        match preview {
            Some(base) => {
                let filtered = apply_filters(base, filters);
                let (w, h) = (filtered.width(), filtered.height());
                let texture = Texture2D::from_rgba8(w as u16, h as u16, filtered.as_raw());
                texture.set_filter(FilterMode::Linear);

                let (pw, ph) = plane_size(w, h);
                self.plane_w = pw;
                self.plane_h = ph;
                self.texture = Some(texture);
            }
            None => {
                self.texture = None;
            }
        }
    }

    /// Draw the stage into `rect`, then overlay stickers
    pub fn draw(
        &self,
        rect: Rect,
        camera: &OrbitCamera,
        lighting: Lighting,
        stickers: &StickerSet,
        sticker_font: Option<&Font>,
    ) {
        let position = camera.position();
        let target = camera.target();

        // macroquad viewports measure from the bottom-left corner
        set_camera(&Camera3D {
            position: vec3(position.x, position.y, position.z),
            target: vec3(target.x, target.y, target.z),
            up: vec3(0.0, 1.0, 0.0),
            fovy: CAMERA_FOVY,
            aspect: Some(rect.w / rect.h),
            viewport: Some((
                rect.x as i32,
                (screen_height() - rect.bottom()) as i32,
                rect.w as i32,
                rect.h as i32,
            )),
            ..Default::default()
        });

        draw_floor_grid();

        if let Some(texture) = &self.texture {
            let tint = lighting_tint(lighting);
            let hw = self.plane_w * 0.5;
            let hh = self.plane_h * 0.5;

            let mesh = Mesh {
                vertices: vec![
                    Vertex::new(-hw, hh, 0.0, 0.0, 0.0, tint),
                    Vertex::new(hw, hh, 0.0, 1.0, 0.0, tint),
                    Vertex::new(hw, -hh, 0.0, 1.0, 1.0, tint),
                    Vertex::new(-hw, -hh, 0.0, 0.0, 1.0, tint),
                ],
                indices: vec![0, 1, 2, 0, 2, 3],
                texture: Some(texture.clone()),
            };
            draw_mesh(&mesh);
        }

        set_default_camera();
        self.draw_stickers(rect, camera, stickers, sticker_font);
    }

    fn draw_stickers(
        &self,
        rect: Rect,
        camera: &OrbitCamera,
        stickers: &StickerSet,
        sticker_font: Option<&Font>,
    ) {
        let position = camera.position();
        let (bx, by, bz) = camera_basis(position, camera.target());
        let view = (rect.x, rect.y, rect.w, rect.h);

        let mut projected: Vec<(&Sticker, f32, f32, f32)> = stickers
            .iter()
            .filter_map(|s| {
                world_to_screen_with_depth(s.position, position, bx, by, bz, CAMERA_FOVY, view)
                    .map(|(sx, sy, depth)| (s, sx, sy, depth))
            })
            .filter(|(_, sx, sy, _)| {
                // Keep a margin so glyphs straddling the edge still draw
                *sx > rect.x - 60.0
                    && *sx < rect.right() + 60.0
                    && *sy > rect.y - 60.0
                    && *sy < rect.bottom() + 60.0
            })
            .collect();

        // Far stickers first so near ones draw on top
        projected.sort_by(|a, b| b.3.partial_cmp(&a.3).unwrap_or(std::cmp::Ordering::Equal));

        for (sticker, sx, sy, depth) in projected {
            let px_per_unit = (rect.h * 0.5) / ((CAMERA_FOVY * 0.5).tan() * depth);
            let size = (sticker.scale * px_per_unit).clamp(8.0, 512.0) as u16;

            let dims = measure_text(&sticker.glyph, sticker_font, size, 1.0);
            draw_text_ex(
                &sticker.glyph,
                (sx - dims.width * 0.5).round(),
                (sy + dims.height * 0.5).round(),
                TextParams {
                    font: sticker_font,
                    font_size: size,
                    rotation: sticker.rotation.z,
                    color: WHITE,
                    ..Default::default()
                },
            );
        }
    }

    /// Closest sticker to a viewport pixel, within the pick radius
    pub fn sticker_at(
        &self,
        rect: Rect,
        camera: &OrbitCamera,
        stickers: &StickerSet,
        sx: f32,
        sy: f32,
    ) -> Option<u64> {
        let position = camera.position();
        let (bx, by, bz) = camera_basis(position, camera.target());
        let view = (rect.x, rect.y, rect.w, rect.h);

        let mut best: Option<(u64, f32)> = None;
        for sticker in stickers.iter() {
            if let Some((px, py, _)) =
                world_to_screen_with_depth(sticker.position, position, bx, by, bz, CAMERA_FOVY, view)
            {
                let d = ((px - sx).powi(2) + (py - sy).powi(2)).sqrt();
                if d < PICK_RADIUS && best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((sticker.id, d));
                }
            }
        }
        best.map(|(id, _)| id)
    }

    /// Where a viewport ray lands on the photo plane, clamped to its
    /// bounds. None without an image or when the ray misses.
    pub fn plane_point(
        &self,
        rect: Rect,
        camera: &OrbitCamera,
        sx: f32,
        sy: f32,
    ) -> Option<Vec3> {
        if self.texture.is_none() {
            return None;
        }

        let position = camera.position();
        let (bx, by, bz) = camera_basis(position, camera.target());
        let view = (rect.x, rect.y, rect.w, rect.h);

        let (origin, dir) = screen_to_ray(sx, sy, position, bx, by, bz, CAMERA_FOVY, view);
        let hit = ray_plane_z0(origin, dir)?;

        let hw = self.plane_w * 0.5;
        let hh = self.plane_h * 0.5;
        Some(Vec3::new(
            hit.x.clamp(-hw, hw),
            hit.y.clamp(-hh, hh),
            STICKER_LIFT,
        ))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform brightness from the scene lights. The plane faces +Z and the
/// key light sits at (5, 5, 5), like the front-on studio setup.
fn lighting_tint(lighting: Lighting) -> Color {
    let level = if lighting.enabled {
        let light_dir = Vec3::new(5.0, 5.0, 5.0).normalize();
        let n_dot_l = light_dir.z.max(0.0);
        (lighting.ambient + lighting.directional * n_dot_l).min(1.0)
    } else {
        lighting.ambient.min(1.0)
    };
    Color::new(level, level, level, 1.0)
}

fn draw_floor_grid() {
    let half = 10;
    let spacing = 1.0;
    let extent = half as f32 * spacing;

    for i in -half..=half {
        let v = i as f32 * spacing;
        let color = if i == 0 {
            Color::new(0.3, 0.3, 0.34, 1.0)
        } else {
            Color::new(0.18, 0.18, 0.21, 1.0)
        };
        draw_line_3d(vec3(v, GRID_Y, -extent), vec3(v, GRID_Y, extent), color);
        draw_line_3d(vec3(-extent, GRID_Y, v), vec3(extent, GRID_Y, v), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lighting_tint_levels() {
        let lit = lighting_tint(Lighting::default());
        // Ambient 0.6 plus the key light saturates to full brightness
        assert!((lit.r - 1.0).abs() < 0.001);

        let unlit = lighting_tint(Lighting { enabled: false, ..Lighting::default() });
        assert!((unlit.r - 0.6).abs() < 0.001);
        assert!((unlit.a - 1.0).abs() < 0.001);
    }
}
