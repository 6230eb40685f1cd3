//! Placed sticker records
//!
//! Stickers are glyphs dropped into the 3D scene with a position, rotation
//! and scale. The set keeps placement order, which is also draw order.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Serialize, Deserialize};

use crate::history::now_ms;
use crate::math::Vec3;

/// Counter for generating unique sticker IDs
static STICKER_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique sticker ID
///
/// Combines an atomic counter with random bits (and, off-wasm, the wall
/// clock) so ids stay unique across quick placements and across sessions —
/// projects keep their sticker ids when reloaded.
pub fn generate_sticker_id() -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let counter = STICKER_ID_COUNTER.fetch_add(1, Ordering::SeqCst);

    // Use macroquad's rand which works in WASM (avoids SystemTime::now() which panics in WASM)
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

/// Glyphs offered in the palette, with display names for tooltips
pub const PALETTE: &[(&str, &str)] = &[
    ("\u{1F600}", "Grinning Face"),
    ("\u{1F602}", "Tears of Joy"),
    ("\u{1F60D}", "Heart Eyes"),
    ("\u{1F60E}", "Sunglasses"),
    ("\u{1F973}", "Party Face"),
    ("\u{1F622}", "Crying Face"),
    ("\u{1F44D}", "Thumbs Up"),
    ("\u{1F44F}", "Clapping"),
    ("\u{2764}", "Heart"),
    ("\u{2B50}", "Star"),
    ("\u{1F525}", "Fire"),
    ("\u{1F389}", "Party Popper"),
    ("\u{2728}", "Sparkles"),
    ("\u{1F308}", "Rainbow"),
    ("\u{1F4AF}", "Hundred"),
    ("\u{1F388}", "Balloon"),
];

/// Look up the display name of a palette glyph
pub fn glyph_name(glyph: &str) -> Option<&'static str> {
    PALETTE
        .iter()
        .find(|(g, _)| *g == glyph)
        .map(|(_, name)| *name)
}

/// One placed glyph in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub id: u64,
    pub glyph: String,
    pub position: Vec3,
    /// Euler angles, radians
    pub rotation: Vec3,
    pub scale: f32,
    /// Placement time, ms since epoch
    pub placed_at: u64,
}

/// All stickers currently in the scene, in placement order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StickerSet {
    stickers: Vec<Sticker>,
}

impl StickerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a glyph at a scene position. Returns the new sticker's id.
    pub fn place(&mut self, glyph: &str, position: Vec3) -> u64 {
        let id = generate_sticker_id();
        self.stickers.push(Sticker {
            id,
            glyph: glyph.to_string(),
            position,
            rotation: Vec3::ZERO,
            scale: 1.0,
            placed_at: now_ms(),
        });
        id
    }

    /// Remove by id. Returns false when the id is unknown.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.stickers.len();
        self.stickers.retain(|s| s.id != id);
        self.stickers.len() != before
    }

    pub fn get(&self, id: u64) -> Option<&Sticker> {
        self.stickers.iter().find(|s| s.id == id)
    }

    pub fn set_position(&mut self, id: u64, position: Vec3) -> bool {
        match self.stickers.iter_mut().find(|s| s.id == id) {
            Some(sticker) => {
                sticker.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_rotation(&mut self, id: u64, rotation: Vec3) -> bool {
        match self.stickers.iter_mut().find(|s| s.id == id) {
            Some(sticker) => {
                sticker.rotation = rotation;
                true
            }
            None => false,
        }
    }

    pub fn set_scale(&mut self, id: u64, scale: f32) -> bool {
        match self.stickers.iter_mut().find(|s| s.id == id) {
            Some(sticker) => {
                sticker.scale = scale.clamp(0.1, 10.0);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.stickers.clear();
    }

    /// Swap in a restored set (undo/redo or project load)
    pub fn replace_all(&mut self, stickers: Vec<Sticker>) {
        self.stickers = stickers;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sticker> {
        self.stickers.iter()
    }

    pub fn to_vec(&self) -> Vec<Sticker> {
        self.stickers.clone()
    }

    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_keeps_order_and_defaults() {
        let mut set = StickerSet::new();
        set.place("\u{2B50}", Vec3::new(1.0, 0.0, 0.0));
        set.place("\u{2764}", Vec3::new(2.0, 0.0, 0.0));

        let glyphs: Vec<&str> = set.iter().map(|s| s.glyph.as_str()).collect();
        assert_eq!(glyphs, vec!["\u{2B50}", "\u{2764}"]);
        let first = set.iter().next().unwrap();
        assert!((first.scale - 1.0).abs() < 0.001);
        assert!(first.rotation.len() < 0.001);
    }

    #[test]
    fn ids_are_unique_across_rapid_placement() {
        let mut set = StickerSet::new();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..200 {
            assert!(ids.insert(set.place("\u{2B50}", Vec3::ZERO)));
        }
        assert_eq!(set.len(), 200);
    }

    #[test]
    fn remove_is_total() {
        let mut set = StickerSet::new();
        let id = set.place("\u{1F525}", Vec3::ZERO);
        assert!(set.remove(id));
        assert!(!set.remove(id));
        assert!(set.is_empty());
    }

    #[test]
    fn updates_touch_only_the_target() {
        let mut set = StickerSet::new();
        let a = set.place("\u{2B50}", Vec3::ZERO);
        let b = set.place("\u{2764}", Vec3::ZERO);

        assert!(set.set_position(a, Vec3::new(3.0, 1.0, 0.0)));
        assert!(set.set_scale(b, 2.5));
        assert!(set.set_rotation(b, Vec3::new(0.0, 0.0, 1.0)));
        assert!(!set.set_scale(12345, 2.0));

        assert!((set.get(a).unwrap().position.x - 3.0).abs() < 0.001);
        assert!((set.get(a).unwrap().scale - 1.0).abs() < 0.001);
        assert!((set.get(b).unwrap().scale - 2.5).abs() < 0.001);
    }

    #[test]
    fn scale_is_clamped_to_sane_range() {
        let mut set = StickerSet::new();
        let id = set.place("\u{2B50}", Vec3::ZERO);
        set.set_scale(id, 1000.0);
        assert!((set.get(id).unwrap().scale - 10.0).abs() < 0.001);
        set.set_scale(id, 0.0);
        assert!((set.get(id).unwrap().scale - 0.1).abs() < 0.001);
    }

    #[test]
    fn replace_all_preserves_restored_ids() {
        let mut set = StickerSet::new();
        set.place("\u{2B50}", Vec3::ZERO);
        let saved = set.to_vec();
        set.clear();
        set.place("\u{1F525}", Vec3::ZERO);

        set.replace_all(saved.clone());
        assert_eq!(set.to_vec(), saved);
    }

    #[test]
    fn palette_glyphs_are_unique_and_named() {
        let mut seen = std::collections::HashSet::new();
        for (glyph, name) in PALETTE {
            assert!(seen.insert(*glyph), "duplicate palette glyph {}", glyph);
            assert!(!name.is_empty());
        }
        assert_eq!(glyph_name("\u{2B50}"), Some("Star"));
        assert_eq!(glyph_name("zzz"), None);
    }
}
