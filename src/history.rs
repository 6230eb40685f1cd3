//! Undo/redo history
//!
//! Bounded stack of full-state snapshots. The history never applies a
//! snapshot itself — it hands them back to the app controller, which restores
//! them through the same path used for project loading.

use serde::{Serialize, Deserialize};

use crate::filters::FilterSettings;
use crate::picture::ImageSource;
use crate::scene::SceneState;
use crate::sticker::Sticker;

/// Default undo depth before the oldest snapshot is evicted
pub const MAX_UNDO_STEPS: usize = 20;

/// Wall-clock milliseconds since the Unix epoch.
///
/// SystemTime panics on wasm32, so the web build goes through miniquad's
/// date shim instead.
pub fn now_ms() -> u64 {
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
    #[cfg(target_arch = "wasm32")]
    {
        (macroquad::miniquad::date::now() * 1000.0) as u64
    }
}

/// Complete description of editor visual state at one instant.
///
/// Self-sufficient by construction: restoring a snapshot reproduces the
/// scene exactly, with no dependency on any other snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Capture time, ms since epoch
    pub timestamp: u64,
    pub image: Option<ImageSource>,
    pub scene: SceneState,
    pub filters: FilterSettings,
    pub stickers: Vec<Sticker>,
}

impl Snapshot {
    /// Build a snapshot from the full current state. All fields are taken
    /// at once so a snapshot can never be half-updated.
    pub fn capture(
        image: Option<ImageSource>,
        scene: SceneState,
        filters: FilterSettings,
        stickers: Vec<Sticker>,
    ) -> Self {
        Self {
            timestamp: now_ms(),
            image,
            scene,
            filters,
            stickers,
        }
    }
}

/// Linear undo/redo over snapshots.
///
/// The top of the undo stack is always the *current* state; the bottom entry
/// is the baseline that cannot itself be undone. All operations are total —
/// out-of-range requests are no-ops.
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_undo_steps: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(MAX_UNDO_STEPS)
    }

    pub fn with_limit(max_undo_steps: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            // A zero limit could never hold the baseline
            max_undo_steps: max_undo_steps.max(1),
        }
    }

    /// Record a new current state. Any redo branch is invalidated; on
    /// overflow the oldest snapshot is evicted (FIFO — only insertion
    /// recency matters).
    pub fn record(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.max_undo_steps {
            self.undo_stack.remove(0);
        }
    }

    /// Step back one state. Returns the snapshot to restore, or None at the
    /// baseline (the stacks are left untouched in that case).
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.undo_stack.len() <= 1 {
            return None;
        }
        let current = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        self.undo_stack.last().cloned()
    }

    /// Step forward one previously undone state. Returns the snapshot to
    /// restore, or None if there is nothing to redo.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(snapshot.clone());
        Some(snapshot)
    }

    /// Drop everything (new image or project loaded)
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Snapshot with a recognizable marker in the timestamp field
    fn snap(tag: u64) -> Snapshot {
        Snapshot {
            timestamp: tag,
            image: None,
            scene: SceneState::default(),
            filters: FilterSettings::default(),
            stickers: Vec::new(),
        }
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut history = History::new();
        history.record(snap(0));
        history.record(snap(1));
        history.record(snap(2));

        let undone = history.undo();
        assert_eq!(undone.as_ref().map(|s| s.timestamp), Some(1));
        let redone = history.redo();
        assert_eq!(redone.as_ref().map(|s| s.timestamp), Some(2));
        assert_eq!(history.undo_depth(), 3);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn undo_at_baseline_is_noop() {
        let mut history = History::new();
        assert!(history.undo().is_none());

        history.record(snap(0));
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn redo_on_empty_stack_is_noop() {
        let mut history = History::new();
        history.record(snap(0));
        history.record(snap(1));
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn record_clears_redo_branch() {
        let mut history = History::new();
        history.record(snap(0));
        history.record(snap(1));
        history.record(snap(2));
        history.undo();
        history.undo();
        assert_eq!(history.redo_depth(), 2);

        history.record(snap(3));
        assert_eq!(history.redo_depth(), 0);
        assert!(!history.can_redo());
        // The new branch is current
        assert_eq!(history.undo().map(|s| s.timestamp), Some(0));
    }

    #[test]
    fn overflow_evicts_oldest_first() {
        let mut history = History::with_limit(3);
        for tag in 0..5 {
            history.record(snap(tag));
        }
        assert_eq!(history.undo_depth(), 3);

        // Draining backwards shows exactly the most recent three in order
        assert_eq!(history.undo().map(|s| s.timestamp), Some(3));
        assert_eq!(history.undo().map(|s| s.timestamp), Some(2));
        assert!(history.undo().is_none());
    }

    #[test]
    fn default_limit_holds_twenty() {
        let mut history = History::new();
        for tag in 0..50 {
            history.record(snap(tag));
        }
        assert_eq!(history.undo_depth(), MAX_UNDO_STEPS);
        // Oldest surviving snapshot is 50 - 20 = 30
        let mut last = None;
        while let Some(s) = history.undo() {
            last = Some(s.timestamp);
        }
        assert_eq!(last, Some(30));
    }

    #[test]
    fn clear_empties_both_stacks() {
        let mut history = History::new();
        history.record(snap(0));
        history.record(snap(1));
        history.undo();
        history.clear();
        assert_eq!(history.undo_depth(), 0);
        assert_eq!(history.redo_depth(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn baseline_walk_scenario() {
        // undo_stack=[S0]; record S1, S2; then walk the branch edges
        let mut history = History::new();
        history.record(snap(0));
        history.record(snap(1));
        history.record(snap(2));
        assert_eq!(history.undo_depth(), 3);
        assert_eq!(history.redo_depth(), 0);

        assert_eq!(history.undo().map(|s| s.timestamp), Some(1));
        assert_eq!((history.undo_depth(), history.redo_depth()), (2, 1));

        assert_eq!(history.undo().map(|s| s.timestamp), Some(0));
        assert_eq!((history.undo_depth(), history.redo_depth()), (1, 2));

        assert!(history.undo().is_none());
        assert_eq!((history.undo_depth(), history.redo_depth()), (1, 2));

        assert_eq!(history.redo().map(|s| s.timestamp), Some(1));
        assert_eq!((history.undo_depth(), history.redo_depth()), (2, 1));
    }

    #[test]
    fn round_trip_restores_identical_snapshot() {
        let mut history = History::new();
        history.record(snap(0));
        let mut current = snap(7);
        current.filters.brightness = 150.0;
        history.record(current.clone());

        history.undo();
        let redone = history.redo();
        assert_eq!(redone, Some(current));
    }
}
