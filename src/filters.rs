//! Image filters with CSS filter-function semantics
//!
//! The filter chain mirrors what a `filter:` style string would do, applied
//! on the CPU: brightness, contrast, saturation, hue-rotate, blur, sepia,
//! grayscale, invert — in that order. Everything except blur is an affine
//! color transform, so the chain collapses into one matrix pass before the
//! blur and one after.

use image::RgbaImage;
use serde::{Serialize, Deserialize};

/// Luminance weights used by the CSS saturate/grayscale matrices
const LUMA_R: f32 = 0.213;
const LUMA_G: f32 = 0.715;
const LUMA_B: f32 = 0.072;

/// One adjustable filter. Order matches the application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Brightness,
    Contrast,
    Saturation,
    Hue,
    Blur,
    Sepia,
    Grayscale,
    Invert,
}

impl FilterKind {
    pub const ALL: &'static [FilterKind] = &[
        FilterKind::Brightness,
        FilterKind::Contrast,
        FilterKind::Saturation,
        FilterKind::Hue,
        FilterKind::Blur,
        FilterKind::Sepia,
        FilterKind::Grayscale,
        FilterKind::Invert,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::Brightness => "Brightness",
            FilterKind::Contrast => "Contrast",
            FilterKind::Saturation => "Saturation",
            FilterKind::Hue => "Hue",
            FilterKind::Blur => "Blur",
            FilterKind::Sepia => "Sepia",
            FilterKind::Grayscale => "Grayscale",
            FilterKind::Invert => "Invert",
        }
    }

    /// Slider range (min, max) in the unit of the filter
    pub fn range(&self) -> (f32, f32) {
        match self {
            FilterKind::Brightness | FilterKind::Contrast | FilterKind::Saturation => (0.0, 200.0),
            FilterKind::Hue => (0.0, 360.0),
            FilterKind::Blur => (0.0, 20.0),
            FilterKind::Sepia | FilterKind::Grayscale | FilterKind::Invert => (0.0, 100.0),
        }
    }

    pub fn default_value(&self) -> f32 {
        match self {
            FilterKind::Brightness | FilterKind::Contrast | FilterKind::Saturation => 100.0,
            _ => 0.0,
        }
    }
}

/// Current value of every filter.
///
/// Percent-style filters store 100 = neutral; hue is degrees, blur pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub hue: f32,
    pub blur: f32,
    pub sepia: f32,
    pub grayscale: f32,
    pub invert: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            hue: 0.0,
            blur: 0.0,
            sepia: 0.0,
            grayscale: 0.0,
            invert: 0.0,
        }
    }
}

impl FilterSettings {
    pub fn get(&self, kind: FilterKind) -> f32 {
        match kind {
            FilterKind::Brightness => self.brightness,
            FilterKind::Contrast => self.contrast,
            FilterKind::Saturation => self.saturation,
            FilterKind::Hue => self.hue,
            FilterKind::Blur => self.blur,
            FilterKind::Sepia => self.sepia,
            FilterKind::Grayscale => self.grayscale,
            FilterKind::Invert => self.invert,
        }
    }

    pub fn set(&mut self, kind: FilterKind, value: f32) {
        let slot = match kind {
            FilterKind::Brightness => &mut self.brightness,
            FilterKind::Contrast => &mut self.contrast,
            FilterKind::Saturation => &mut self.saturation,
            FilterKind::Hue => &mut self.hue,
            FilterKind::Blur => &mut self.blur,
            FilterKind::Sepia => &mut self.sepia,
            FilterKind::Grayscale => &mut self.grayscale,
            FilterKind::Invert => &mut self.invert,
        };
        *slot = value;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply a partial update; filters not named keep their values
    pub fn merge(&mut self, updates: impl IntoIterator<Item = (FilterKind, f32)>) {
        for (kind, value) in updates {
            self.set(kind, value);
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Copy with every value forced into its slider range. Non-finite
    /// values (corrupt project data) fall back to the filter default.
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for &kind in FilterKind::ALL {
            let value = out.get(kind);
            let (min, max) = kind.range();
            if value.is_finite() {
                out.set(kind, value.clamp(min, max));
            } else {
                out.set(kind, kind.default_value());
            }
        }
        out
    }
}

/// Affine color transform: out = m * rgb + bias
#[derive(Clone, Copy)]
struct ColorTransform {
    m: [[f32; 3]; 3],
    bias: [f32; 3],
}

impl ColorTransform {
    /// Compose so that `next` runs after `self`
    fn then(self, next: ColorTransform) -> ColorTransform {
        let mut m = [[0.0f32; 3]; 3];
        let mut bias = [0.0f32; 3];
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    m[i][j] += next.m[i][k] * self.m[k][j];
                }
            }
            for k in 0..3 {
                bias[i] += next.m[i][k] * self.bias[k];
            }
            bias[i] += next.bias[i];
        }
        ColorTransform { m, bias }
    }

    fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0f32; 3];
        for i in 0..3 {
            out[i] = self.m[i][0] * rgb[0] + self.m[i][1] * rgb[1] + self.m[i][2] * rgb[2]
                + self.bias[i];
        }
        out
    }
}

fn brightness_transform(percent: f32) -> ColorTransform {
    let s = percent / 100.0;
    ColorTransform {
        m: [[s, 0.0, 0.0], [0.0, s, 0.0], [0.0, 0.0, s]],
        bias: [0.0; 3],
    }
}

fn contrast_transform(percent: f32) -> ColorTransform {
    let s = percent / 100.0;
    let b = 0.5 - 0.5 * s;
    ColorTransform {
        m: [[s, 0.0, 0.0], [0.0, s, 0.0], [0.0, 0.0, s]],
        bias: [b, b, b],
    }
}

/// Blend between the luminance projection (amount 0) and identity (amount 1)
fn saturate_transform(amount: f32) -> ColorTransform {
    let s = amount;
    ColorTransform {
        m: [
            [LUMA_R + (1.0 - LUMA_R) * s, LUMA_G * (1.0 - s), LUMA_B * (1.0 - s)],
            [LUMA_R * (1.0 - s), LUMA_G + (1.0 - LUMA_G) * s, LUMA_B * (1.0 - s)],
            [LUMA_R * (1.0 - s), LUMA_G * (1.0 - s), LUMA_B + (1.0 - LUMA_B) * s],
        ],
        bias: [0.0; 3],
    }
}

/// Hue rotation matrix from the filter-effects spec
fn hue_rotate_transform(degrees: f32) -> ColorTransform {
    let (sin, cos) = degrees.to_radians().sin_cos();
    ColorTransform {
        m: [
            [
                0.213 + cos * 0.787 - sin * 0.213,
                0.715 - cos * 0.715 - sin * 0.715,
                0.072 - cos * 0.072 + sin * 0.928,
            ],
            [
                0.213 - cos * 0.213 + sin * 0.143,
                0.715 + cos * 0.285 + sin * 0.140,
                0.072 - cos * 0.072 - sin * 0.283,
            ],
            [
                0.213 - cos * 0.213 - sin * 0.787,
                0.715 - cos * 0.715 + sin * 0.715,
                0.072 + cos * 0.928 + sin * 0.072,
            ],
        ],
        bias: [0.0; 3],
    }
}

fn sepia_transform(amount: f32) -> ColorTransform {
    let t = amount;
    let full = [
        [0.393, 0.769, 0.189],
        [0.349, 0.686, 0.168],
        [0.272, 0.534, 0.131],
    ];
    let mut m = [[0.0f32; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let id = if i == j { 1.0 } else { 0.0 };
            m[i][j] = id * (1.0 - t) + full[i][j] * t;
        }
    }
    ColorTransform { m, bias: [0.0; 3] }
}

fn grayscale_transform(amount: f32) -> ColorTransform {
    // grayscale(t) is saturate(1 - t)
    saturate_transform(1.0 - amount)
}

fn invert_transform(amount: f32) -> ColorTransform {
    let s = 1.0 - 2.0 * amount;
    ColorTransform {
        m: [[s, 0.0, 0.0], [0.0, s, 0.0], [0.0, 0.0, s]],
        bias: [amount, amount, amount],
    }
}

/// Apply the full filter chain to an image, returning a new buffer.
/// Alpha is preserved by the color stages; the blur feathers it like the
/// CSS filter does.
pub fn apply_filters(source: &RgbaImage, filters: &FilterSettings) -> RgbaImage {
    let f = filters.clamped();
    if f.is_default() {
        return source.clone();
    }

    // Stages before the blur
    let pre = brightness_transform(f.brightness)
        .then(contrast_transform(f.contrast))
        .then(saturate_transform(f.saturation / 100.0))
        .then(hue_rotate_transform(f.hue));

    // Stages after the blur
    let post = sepia_transform(f.sepia / 100.0)
        .then(grayscale_transform(f.grayscale / 100.0))
        .then(invert_transform(f.invert / 100.0));

    let mut out = source.clone();
    apply_transform(&mut out, &pre);

    let radius = f.blur.round() as u32;
    if radius > 0 {
        out = box_blur(&out, radius);
    }

    apply_transform(&mut out, &post);
    out
}

fn apply_transform(image: &mut RgbaImage, transform: &ColorTransform) {
    for pixel in image.pixels_mut() {
        let rgb = [
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        ];
        let out = transform.apply(rgb);
        for c in 0..3 {
            pixel[c] = (out[c].clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }
}

/// Separable box blur. Window edges truncate at the image border, so flat
/// regions stay flat all the way to the edge.
fn box_blur(source: &RgbaImage, radius: u32) -> RgbaImage {
    let (w, h) = source.dimensions();
    if w == 0 || h == 0 {
        return source.clone();
    }
    let r = radius as i64;

    // Horizontal pass via per-row prefix sums
    let mut mid = RgbaImage::new(w, h);
    let mut prefix = vec![[0u32; 4]; w as usize + 1];
    for y in 0..h {
        for x in 0..w {
            let p = source.get_pixel(x, y);
            let prev = prefix[x as usize];
            prefix[x as usize + 1] = [
                prev[0] + p[0] as u32,
                prev[1] + p[1] as u32,
                prev[2] + p[2] as u32,
                prev[3] + p[3] as u32,
            ];
        }
        for x in 0..w {
            let lo = (x as i64 - r).max(0) as usize;
            let hi = (x as i64 + r + 1).min(w as i64) as usize;
            let count = (hi - lo) as f32;
            let pixel = mid.get_pixel_mut(x, y);
            for c in 0..4 {
                let sum = prefix[hi][c] - prefix[lo][c];
                pixel[c] = (sum as f32 / count).round() as u8;
            }
        }
    }

    // Vertical pass
    let mut out = RgbaImage::new(w, h);
    let mut col_prefix = vec![[0u32; 4]; h as usize + 1];
    for x in 0..w {
        for y in 0..h {
            let p = mid.get_pixel(x, y);
            let prev = col_prefix[y as usize];
            col_prefix[y as usize + 1] = [
                prev[0] + p[0] as u32,
                prev[1] + p[1] as u32,
                prev[2] + p[2] as u32,
                prev[3] + p[3] as u32,
            ];
        }
        for y in 0..h {
            let lo = (y as i64 - r).max(0) as usize;
            let hi = (y as i64 + r + 1).min(h as i64) as usize;
            let count = (hi - lo) as f32;
            let pixel = out.get_pixel_mut(x, y);
            for c in 0..4 {
                let sum = col_prefix[hi][c] - col_prefix[lo][c];
                pixel[c] = (sum as f32 / count).round() as u8;
            }
        }
    }

    out
}
