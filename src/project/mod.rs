//! Project loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable project files.
//! Supports both compressed (brotli) and uncompressed RON files.
//! - Reading: Auto-detects format by checking for valid RON start
//! - Writing: Always uses brotli compression
//!
//! A project file carries everything a session needs to come back: the
//! photo, the scene pose, filter values and placed stickers, plus naming
//! and timestamps.

use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Serialize, Deserialize};

use crate::filters::FilterSettings;
use crate::history::now_ms;
use crate::picture::ImageSource;
use crate::scene::SceneState;
use crate::sticker::Sticker;

#[cfg(not(target_arch = "wasm32"))]
pub mod recents;

/// Validation limits to prevent resource exhaustion from malicious files
pub mod limits {
    /// Maximum project name length
    pub const MAX_NAME_LEN: usize = 120;
    /// Maximum number of placed stickers
    pub const MAX_STICKERS: usize = 256;
    /// Maximum sticker glyph length in bytes
    pub const MAX_GLYPH_LEN: usize = 16;
    /// Maximum image dimension (width or height)
    pub const MAX_IMAGE_DIM: u32 = 8192;
    /// Maximum encoded image payload (32 MiB)
    pub const MAX_IMAGE_BYTES: usize = 32 * 1024 * 1024;
    /// Maximum coordinate value (prevents overflow issues)
    pub const MAX_COORD: f32 = 1_000_000.0;
    /// Maximum entries in the recent-projects list
    pub const MAX_RECENT_PROJECTS: usize = 10;
}

/// On-disk format version. Minor bumps stay loadable with a warning;
/// a different major is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl FormatVersion {
    pub const CURRENT: FormatVersion = FormatVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error type for project loading
#[derive(Debug)]
pub enum ProjectError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    ValidationError(String),
    JsonError(String),
}

impl From<std::io::Error> for ProjectError {
    fn from(e: std::io::Error) -> Self {
        ProjectError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ProjectError {
    fn from(e: ron::error::SpannedError) -> Self {
        ProjectError::ParseError(e)
    }
}

impl From<ron::Error> for ProjectError {
    fn from(e: ron::Error) -> Self {
        ProjectError::SerializeError(e)
    }
}

impl std::fmt::Display for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectError::IoError(e) => write!(f, "IO error: {}", e),
            ProjectError::ParseError(e) => write!(f, "Parse error: {}", e),
            ProjectError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            ProjectError::ValidationError(e) => write!(f, "Validation error: {}", e),
            ProjectError::JsonError(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for ProjectError {}

/// Counter for generating unique project IDs
static PROJECT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique project ID (same recipe as sticker ids: counter +
/// random bits + wall clock off-wasm, hashed together)
pub fn generate_project_id() -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let counter = PROJECT_ID_COUNTER.fetch_add(1, Ordering::SeqCst);
    let random_bits = macroquad::rand::rand() as u64;

    let mut hasher = DefaultHasher::new();
    counter.hash(&mut hasher);
    random_bits.hash(&mut hasher);

    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Ok(time) = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
            time.as_nanos().hash(&mut hasher);
        }
    }

    hasher.finish()
}

/// Everything a saved session contains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub version: FormatVersion,
    /// Creation time, ms since epoch
    pub created_at: u64,
    /// Last modification time, ms since epoch
    pub modified_at: u64,
    pub image: Option<ImageSource>,
    pub scene: SceneState,
    pub filters: FilterSettings,
    pub stickers: Vec<Sticker>,
}

impl Project {
    /// Fresh empty project with default scene and filters
    pub fn new(name: &str) -> Self {
        let now = now_ms();
        Self {
            id: generate_project_id(),
            name: name.to_string(),
            version: FormatVersion::CURRENT,
            created_at: now,
            modified_at: now,
            image: None,
            scene: SceneState::default(),
            filters: FilterSettings::default(),
            stickers: Vec::new(),
        }
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
        self.touch();
    }

    /// Bump the modification timestamp
    pub fn touch(&mut self) {
        self.modified_at = now_ms();
    }

    /// Independent copy with a fresh identity
    pub fn duplicate(&self) -> Project {
        let now = now_ms();
        Project {
            id: generate_project_id(),
            name: format!("{} (Copy)", self.name),
            created_at: now,
            modified_at: now,
            ..self.clone()
        }
    }
}

/// Check if a float is valid (not NaN or Inf)
fn is_valid_float(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

/// Validate a placed sticker
fn validate_sticker(sticker: &Sticker, context: &str) -> Result<(), String> {
    if sticker.glyph.is_empty() {
        return Err(format!("{}: empty glyph", context));
    }
    if sticker.glyph.len() > limits::MAX_GLYPH_LEN {
        return Err(format!("{}: glyph too long ({} > {})",
            context, sticker.glyph.len(), limits::MAX_GLYPH_LEN));
    }
    for (axis, v) in [
        ("position.x", sticker.position.x),
        ("position.y", sticker.position.y),
        ("position.z", sticker.position.z),
        ("rotation.x", sticker.rotation.x),
        ("rotation.y", sticker.rotation.y),
        ("rotation.z", sticker.rotation.z),
        ("scale", sticker.scale),
    ] {
        if !is_valid_float(v) {
            return Err(format!("{}: invalid {} = {}", context, axis, v));
        }
    }
    if sticker.scale <= 0.0 {
        return Err(format!("{}: scale must be positive, got {}", context, sticker.scale));
    }
    Ok(())
}

/// Validate the image descriptor
fn validate_image(image: &ImageSource, context: &str) -> Result<(), String> {
    if image.width == 0 || image.height == 0 {
        return Err(format!("{}: empty dimensions {}x{}", context, image.width, image.height));
    }
    if image.width > limits::MAX_IMAGE_DIM || image.height > limits::MAX_IMAGE_DIM {
        return Err(format!("{}: dimensions too large ({}x{} > {})",
            context, image.width, image.height, limits::MAX_IMAGE_DIM));
    }
    if image.data.is_empty() {
        return Err(format!("{}: no image data", context));
    }
    if image.data.len() > limits::MAX_IMAGE_BYTES {
        return Err(format!("{}: image data too large ({} > {} bytes)",
            context, image.data.len(), limits::MAX_IMAGE_BYTES));
    }
    Ok(())
}

/// Validate an entire project before handing it to the app
pub fn validate_project(project: &Project) -> Result<(), ProjectError> {
    if project.version.major != FormatVersion::CURRENT.major {
        return Err(ProjectError::ValidationError(format!(
            "incompatible format version {} (this build reads {})",
            project.version, FormatVersion::CURRENT
        )));
    }

    if project.name.is_empty() {
        return Err(ProjectError::ValidationError("project name is empty".to_string()));
    }
    if project.name.len() > limits::MAX_NAME_LEN {
        return Err(ProjectError::ValidationError(format!(
            "project name too long ({} > {})", project.name.len(), limits::MAX_NAME_LEN
        )));
    }

    if let Some(image) = &project.image {
        validate_image(image, "image").map_err(ProjectError::ValidationError)?;
    }

    if project.stickers.len() > limits::MAX_STICKERS {
        return Err(ProjectError::ValidationError(format!(
            "too many stickers ({} > {})", project.stickers.len(), limits::MAX_STICKERS
        )));
    }
    for (i, sticker) in project.stickers.iter().enumerate() {
        validate_sticker(sticker, &format!("sticker[{}]", i))
            .map_err(ProjectError::ValidationError)?;
    }

    if !project.scene.is_finite() {
        return Err(ProjectError::ValidationError("scene state contains non-finite values".to_string()));
    }

    Ok(())
}

/// Parse project data from bytes (plain RON or brotli-compressed RON)
pub fn decode_project(bytes: &[u8]) -> Result<Project, ProjectError> {
    // Detect format: RON files start with '(' or whitespace, brotli is binary
    let is_plain_ron = bytes
        .first()
        .map(|&b| b == b'(' || b == b' ' || b == b'\n' || b == b'\r' || b == b'\t')
        .unwrap_or(false);

    let contents = if is_plain_ron {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ProjectError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid UTF-8: {}", e)
            )))?
    } else {
        let mut decompressed = Vec::new();
        brotli::BrotliDecompress(&mut Cursor::new(bytes), &mut decompressed)
            .map_err(|e| ProjectError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("brotli decompression failed: {}", e)
            )))?;
        String::from_utf8(decompressed)
            .map_err(|e| ProjectError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid UTF-8 after decompression: {}", e)
            )))?
    };

    let project: Project = ron::from_str(&contents)?;
    validate_project(&project)?;

    if project.version.minor > FormatVersion::CURRENT.minor {
        println!(
            "Project was saved by a newer build (format {} vs {}), loading anyway",
            project.version,
            FormatVersion::CURRENT
        );
    }

    Ok(project)
}

/// Load a project from a RON file (supports both compressed and uncompressed)
pub fn load_project<P: AsRef<Path>>(path: P) -> Result<Project, ProjectError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    match decode_project(&bytes) {
        Ok(project) => Ok(project),
        Err(ProjectError::ParseError(e)) => {
            // Log detailed error with context
            eprintln!("RON parse error in {}: {}", path.display(), e);
            Err(ProjectError::ParseError(e))
        }
        Err(e) => Err(e),
    }
}

/// Load a project from a RON string (for embedded projects or testing)
pub fn load_project_from_str(s: &str) -> Result<Project, ProjectError> {
    decode_project(s.as_bytes())
}

/// Serialize a project to compressed bytes
pub fn serialize_project(project: &Project) -> Result<Vec<u8>, ProjectError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let ron_string = ron::ser::to_string_pretty(project, config)?;

    // Compress with brotli (quality 6, window 22 - good balance of speed/ratio)
    let mut compressed = Vec::new();
    brotli::BrotliCompress(&mut Cursor::new(ron_string.as_bytes()), &mut compressed, &brotli::enc::BrotliEncoderParams {
        quality: 6,
        lgwin: 22,
        ..Default::default()
    }).map_err(|e| ProjectError::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("brotli compression failed: {}", e)
    )))?;

    Ok(compressed)
}

/// Save a project to a compressed RON file (brotli)
pub fn save_project<P: AsRef<Path>>(project: &Project, path: P) -> Result<(), ProjectError> {
    let data = serialize_project(project)?;
    fs::write(path, data)?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON interchange (export/import for other tooling)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(not(target_arch = "wasm32"))]
pub fn project_to_json(project: &Project) -> Result<String, ProjectError> {
    serde_json::to_string_pretty(project).map_err(|e| ProjectError::JsonError(e.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn project_from_json(s: &str) -> Result<Project, ProjectError> {
    let project: Project =
        serde_json::from_str(s).map_err(|e| ProjectError::JsonError(e.to_string()))?;
    validate_project(&project)?;
    Ok(project)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn export_json<P: AsRef<Path>>(project: &Project, path: P) -> Result<(), ProjectError> {
    let json = project_to_json(project)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn import_json<P: AsRef<Path>>(path: P) -> Result<Project, ProjectError> {
    let contents = fs::read_to_string(path)?;
    project_from_json(&contents)
}
