//! Scene state
//!
//! The serializable 3D slice of a snapshot: camera pose, lighting and the
//! rotation toggle. Capturing and applying go through this one type, so
//! undo/redo and project load can never disagree about what "scene state"
//! means.

use serde::{Serialize, Deserialize};

use crate::camera::{OrbitCamera, DEFAULT_PHI, DEFAULT_RADIUS, DEFAULT_THETA};
use crate::math::{Spherical, Vec3};

/// World-unit size of the photo plane's larger side
pub const PLANE_MAX_SIZE: f32 = 8.0;

pub const DEFAULT_AMBIENT: f32 = 0.6;
pub const DEFAULT_DIRECTIONAL: f32 = 0.8;

/// Lighting toggles for the stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
    pub enabled: bool,
    pub ambient: f32,
    pub directional: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            enabled: true,
            ambient: DEFAULT_AMBIENT,
            directional: DEFAULT_DIRECTIONAL,
        }
    }
}

/// Complete scene pose at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    pub camera_position: Vec3,
    pub spherical: Spherical,
    pub target: Vec3,
    pub lighting: Lighting,
    pub rotation_enabled: bool,
}

impl Default for SceneState {
    fn default() -> Self {
        let spherical = Spherical::new(DEFAULT_RADIUS, DEFAULT_PHI, DEFAULT_THETA);
        Self {
            camera_position: spherical.to_cartesian(Vec3::ZERO),
            spherical,
            target: Vec3::ZERO,
            lighting: Lighting::default(),
            rotation_enabled: true,
        }
    }
}

impl SceneState {
    /// Capture the current pose from the live camera
    pub fn from_camera(camera: &OrbitCamera, lighting: Lighting) -> Self {
        Self {
            camera_position: camera.position(),
            spherical: camera.spherical(),
            target: camera.target(),
            lighting,
            rotation_enabled: camera.rotation_enabled(),
        }
    }

    /// Push this pose back onto the live camera. The spherical + target pair
    /// is authoritative; `camera_position` is re-derived from it.
    pub fn apply_to(&self, camera: &mut OrbitCamera) {
        camera.restore(self.spherical, self.target, self.rotation_enabled);
    }

    pub fn is_finite(&self) -> bool {
        self.camera_position.is_finite()
            && self.spherical.is_finite()
            && self.target.is_finite()
            && self.lighting.ambient.is_finite()
            && self.lighting.directional.is_finite()
    }
}

/// Plane dimensions for a W x H photo: larger side pinned to
/// PLANE_MAX_SIZE, the other scaled by aspect ratio.
pub fn plane_size(width: u32, height: u32) -> (f32, f32) {
    if width == 0 || height == 0 {
        return (PLANE_MAX_SIZE, PLANE_MAX_SIZE);
    }
    let aspect = width as f32 / height as f32;
    if aspect > 1.0 {
        (PLANE_MAX_SIZE, PLANE_MAX_SIZE / aspect)
    } else {
        (PLANE_MAX_SIZE * aspect, PLANE_MAX_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pose_matches_fresh_camera() {
        let state = SceneState::default();
        let cam = OrbitCamera::new();
        assert!(state.camera_position.distance(cam.position()) < 0.001);
        assert!(state.rotation_enabled);
        assert!(state.lighting.enabled);
    }

    #[test]
    fn capture_apply_round_trip() {
        let mut cam = OrbitCamera::new();
        cam.rotate(0.8, -0.3);
        cam.zoom(-0.2);
        let state = SceneState::from_camera(&cam, Lighting::default());

        let mut fresh = OrbitCamera::new();
        state.apply_to(&mut fresh);
        assert!(fresh.position().distance(cam.position()) < 0.001);
        assert!((fresh.radius() - cam.radius()).abs() < 0.001);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let state = SceneState {
            spherical: Spherical::new(12.0, 1.0, 0.7),
            ..SceneState::default()
        };
        let mut cam = OrbitCamera::new();
        state.apply_to(&mut cam);
        let first = cam.position();
        state.apply_to(&mut cam);
        assert!(cam.position().distance(first) < 0.001);
    }

    #[test]
    fn landscape_plane_pins_width() {
        let (w, h) = plane_size(1920, 1080);
        assert!((w - PLANE_MAX_SIZE).abs() < 0.001);
        assert!((h - PLANE_MAX_SIZE * 1080.0 / 1920.0).abs() < 0.001);
    }

    #[test]
    fn portrait_plane_pins_height() {
        let (w, h) = plane_size(600, 800);
        assert!((h - PLANE_MAX_SIZE).abs() < 0.001);
        assert!((w - PLANE_MAX_SIZE * 600.0 / 800.0).abs() < 0.001);
    }

    #[test]
    fn square_plane_uses_full_size() {
        let (w, h) = plane_size(512, 512);
        assert!((w - PLANE_MAX_SIZE).abs() < 0.001);
        assert!((h - PLANE_MAX_SIZE).abs() < 0.001);
    }

    #[test]
    fn degenerate_dimensions_fall_back_to_square() {
        let (w, h) = plane_size(0, 100);
        assert!((w - PLANE_MAX_SIZE).abs() < 0.001);
        assert!((h - PLANE_MAX_SIZE).abs() < 0.001);
    }
}
