//! Loaded-image descriptor and pixel edit operations
//!
//! `ImageSource` is the persistable description of the user's photo: the
//! encoded bytes plus dimensions. Edit operations take and return plain RGBA
//! buffers so they compose and stay testable off-screen.

use std::io::Cursor;

use image::{imageops, imageops::FilterType, ImageFormat, RgbaImage};
use serde::{Serialize, Deserialize};

/// Error type for image decode/encode/edit operations
#[derive(Debug)]
pub enum PictureError {
    /// Decode failure (unsupported or corrupt data)
    Decode(String),
    /// Encode failure
    Encode(String),
    /// Bad operation parameters
    ValidationError(String),
}

impl std::fmt::Display for PictureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PictureError::Decode(msg) => write!(f, "Image decode error: {}", msg),
            PictureError::Encode(msg) => write!(f, "Image encode error: {}", msg),
            PictureError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for PictureError {}

impl From<image::ImageError> for PictureError {
    fn from(e: image::ImageError) -> Self {
        PictureError::Decode(e.to_string())
    }
}

/// Encoded image plus dimensions — everything a snapshot or project file
/// needs to bring the photo back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    pub width: u32,
    pub height: u32,
    /// Encoded bytes (PNG after edits; whatever the user gave us before).
    /// Serialized as base64 so project files stay textual.
    #[serde(with = "encoded_bytes")]
    pub data: Vec<u8>,
}

impl ImageSource {
    /// Wrap user-supplied bytes, verifying they decode
    pub fn from_bytes(bytes: Vec<u8>) -> Result<(Self, RgbaImage), PictureError> {
        let decoded = image::load_from_memory(&bytes)?;
        let rgba = decoded.to_rgba8();
        let source = Self {
            width: rgba.width(),
            height: rgba.height(),
            data: bytes,
        };
        Ok((source, rgba))
    }

    /// Capture an in-memory buffer (after an edit op), PNG-encoded
    pub fn from_image(image: &RgbaImage) -> Result<Self, PictureError> {
        let mut data = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .map_err(|e| PictureError::Encode(e.to_string()))?;
        Ok(Self {
            width: image.width(),
            height: image.height(),
            data,
        })
    }

    pub fn decode(&self) -> Result<RgbaImage, PictureError> {
        let decoded = image::load_from_memory(&self.data)?;
        Ok(decoded.to_rgba8())
    }
}

/// Base64 for the embedded image bytes
mod encoded_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let text = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, data);
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, text.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Crop region as fractions of the image (0..1 on both axes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Crop to a normalized sub-rectangle. The region is clamped to the image;
/// a region that clamps to nothing is an error.
pub fn crop(image: &RgbaImage, rect: CropRect) -> Result<RgbaImage, PictureError> {
    let (w, h) = (image.width() as f32, image.height() as f32);
    if ![rect.x, rect.y, rect.width, rect.height].iter().all(|v| v.is_finite()) {
        return Err(PictureError::ValidationError("crop rect is not finite".to_string()));
    }

    let x0 = (rect.x * w).clamp(0.0, w) as u32;
    let y0 = (rect.y * h).clamp(0.0, h) as u32;
    let x1 = ((rect.x + rect.width) * w).clamp(0.0, w) as u32;
    let y1 = ((rect.y + rect.height) * h).clamp(0.0, h) as u32;

    if x1 <= x0 || y1 <= y0 {
        return Err(PictureError::ValidationError(format!(
            "crop region is empty: ({}, {}) to ({}, {})",
            x0, y0, x1, y1
        )));
    }

    Ok(imageops::crop_imm(image, x0, y0, x1 - x0, y1 - y0).to_image())
}

/// Resize to the target box. With `preserve_aspect` the image is fit inside
/// the box instead of stretched.
pub fn resize(
    image: &RgbaImage,
    target_w: u32,
    target_h: u32,
    preserve_aspect: bool,
) -> Result<RgbaImage, PictureError> {
    if target_w == 0 || target_h == 0 {
        return Err(PictureError::ValidationError(format!(
            "resize target {}x{} is empty",
            target_w, target_h
        )));
    }

    let (new_w, new_h) = if preserve_aspect {
        let ratio = (target_w as f32 / image.width() as f32)
            .min(target_h as f32 / image.height() as f32);
        (
            ((image.width() as f32 * ratio) as u32).max(1),
            ((image.height() as f32 * ratio) as u32).max(1),
        )
    } else {
        (target_w, target_h)
    };

    Ok(imageops::resize(image, new_w, new_h, FilterType::Lanczos3))
}

pub fn flip_horizontal(image: &RgbaImage) -> RgbaImage {
    imageops::flip_horizontal(image)
}

pub fn flip_vertical(image: &RgbaImage) -> RgbaImage {
    imageops::flip_vertical(image)
}

/// Quarter-turn rotations. Arbitrary angles would need a resampling kernel
/// and nothing in the editor asks for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Quarter,
    Half,
    ThreeQuarter,
}

pub fn rotate(image: &RgbaImage, rotation: Rotation) -> RgbaImage {
    match rotation {
        Rotation::Quarter => imageops::rotate90(image),
        Rotation::Half => imageops::rotate180(image),
        Rotation::ThreeQuarter => imageops::rotate270(image),
    }
}

/// Add uniform luminance noise, +/- half `intensity` in channel units.
/// One sample per pixel, shared across RGB, so the grain reads as film-like
/// rather than chroma speckle.
pub fn add_noise(image: &RgbaImage, intensity: f32) -> RgbaImage {
    let intensity = intensity.clamp(0.0, 255.0);
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        // macroquad's rand works in WASM, unlike the thread_rng family
        let unit = macroquad::rand::rand() as f32 / u32::MAX as f32;
        let noise = (unit - 0.5) * intensity;
        for c in 0..3 {
            pixel[c] = (pixel[c] as f32 + noise).clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Export encodings offered in the save dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    pub const ALL: &'static [ExportFormat] = &[ExportFormat::Png, ExportFormat::Jpeg];

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

/// Encode the image for export. `quality` only applies to JPEG (1-100).
pub fn export(
    image: &RgbaImage,
    format: ExportFormat,
    quality: u8,
) -> Result<Vec<u8>, PictureError> {
    let mut data = Vec::new();
    match format {
        ExportFormat::Png => {
            image
                .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
                .map_err(|e| PictureError::Encode(e.to_string()))?;
        }
        ExportFormat::Jpeg => {
            // JPEG has no alpha; flatten onto black like a canvas export does
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let quality = quality.clamp(1, 100);
            let mut cursor = Cursor::new(&mut data);
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
            rgb.write_with_encoder(encoder)
                .map_err(|e| PictureError::Encode(e.to_string()))?;
        }
    }
    Ok(data)
}
