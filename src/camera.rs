//! Orbit camera controller
//!
//! Translates drag/wheel/pinch deltas into a camera pose that orbits a fixed
//! target on a sphere. Deltas accumulate into a pending set, get applied
//! immediately, then reset — the authoritative state between interactions is
//! just `spherical` + `target`, which is all that save/restore carries.

use std::f32::consts::{FRAC_PI_2, PI};

use crate::math::{Spherical, Vec3};

/// Canonical framing every image starts from
pub const DEFAULT_RADIUS: f32 = 10.0;
pub const DEFAULT_PHI: f32 = FRAC_PI_2;
pub const DEFAULT_THETA: f32 = 0.0;

/// Distance the camera may orbit at
pub const MIN_DISTANCE: f32 = 3.0;
pub const MAX_DISTANCE: f32 = 20.0;

/// Keep-out margin around the poles (prevents gimbal flip at phi = 0 or PI)
pub const POLE_MARGIN: f32 = 0.1;

/// Camera state orbiting a look-at target
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    spherical: Spherical,
    target: Vec3,
    position: Vec3,

    // Pending input, consumed by apply_pending
    delta_phi: f32,
    delta_theta: f32,
    scale: f32,

    pub min_distance: f32,
    pub max_distance: f32,
    rotation_enabled: bool,
}

impl OrbitCamera {
    pub fn new() -> Self {
        let mut cam = Self {
            spherical: Spherical::new(DEFAULT_RADIUS, DEFAULT_PHI, DEFAULT_THETA),
            target: Vec3::ZERO,
            position: Vec3::ZERO,
            delta_phi: 0.0,
            delta_theta: 0.0,
            scale: 1.0,
            min_distance: MIN_DISTANCE,
            max_distance: MAX_DISTANCE,
            rotation_enabled: true,
        };
        cam.apply_pending();
        cam
    }

    /// Orbit by pointer deltas. Subtracting gives the natural
    /// "drag right, orbit right" feel. No-op while rotation is disabled.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if !self.rotation_enabled || !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.delta_theta -= dx;
        self.delta_phi -= dy;
        self.apply_pending();
    }

    /// Dolly in/out by a multiplicative delta (wheel or pinch).
    /// Stays active while rotation is disabled.
    pub fn zoom(&mut self, delta: f32) {
        if !delta.is_finite() {
            return;
        }
        self.scale *= 1.0 + delta;
        // Advisory pre-bound; the radius clamp in apply_pending is the
        // authoritative limit.
        let radius = self.spherical.radius.max(f32::EPSILON);
        self.scale = self
            .scale
            .clamp(self.min_distance / radius, self.max_distance / radius);
        self.apply_pending();
    }

    /// Consume pending deltas into the authoritative spherical state and
    /// recompute the Cartesian position.
    fn apply_pending(&mut self) {
        self.spherical.theta += self.delta_theta;
        self.spherical.phi += self.delta_phi;
        self.spherical.radius *= self.scale;

        self.spherical.phi = self.spherical.phi.clamp(POLE_MARGIN, PI - POLE_MARGIN);
        self.spherical.radius = self
            .spherical
            .radius
            .clamp(self.min_distance, self.max_distance);

        self.position = self.spherical.to_cartesian(self.target);

        self.delta_phi = 0.0;
        self.delta_theta = 0.0;
        self.scale = 1.0;
    }

    /// Snap back to the canonical front framing around the origin
    pub fn reset_position(&mut self) {
        self.spherical = Spherical::new(DEFAULT_RADIUS, DEFAULT_PHI, DEFAULT_THETA);
        self.target = Vec3::ZERO;
        self.delta_phi = 0.0;
        self.delta_theta = 0.0;
        self.scale = 1.0;
        self.apply_pending();
    }

    /// Restore a saved pose. Out-of-range or non-finite input degrades to
    /// the nearest valid pose rather than corrupting the session. The
    /// rotation flag is restored verbatim — zoom can have moved the camera
    /// while rotation was off, so no snap-to-front happens here.
    pub fn restore(&mut self, spherical: Spherical, target: Vec3, rotation_enabled: bool) {
        if !spherical.is_finite() || !target.is_finite() {
            return;
        }
        self.spherical = spherical;
        self.target = target;
        self.rotation_enabled = rotation_enabled;
        self.delta_phi = 0.0;
        self.delta_theta = 0.0;
        self.scale = 1.0;
        self.apply_pending();
    }

    /// Toggling rotation off snaps back to the front view; the pose then
    /// stays fixed until rotation is enabled and dragged again.
    pub fn set_rotation_enabled(&mut self, enabled: bool) {
        self.rotation_enabled = enabled;
        if !enabled {
            self.reset_position();
        }
    }

    pub fn rotation_enabled(&self) -> bool {
        self.rotation_enabled
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn spherical(&self) -> Spherical {
        self.spherical
    }

    pub fn radius(&self) -> f32 {
        self.spherical.radius
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pose_is_front_view() {
        let cam = OrbitCamera::new();
        let p = cam.position();
        assert!(p.x.abs() < 0.001);
        assert!(p.y.abs() < 0.001);
        assert!((p.z - DEFAULT_RADIUS).abs() < 0.001);
    }

    #[test]
    fn test_rotate_consumes_deltas() {
        let mut cam = OrbitCamera::new();
        cam.rotate(0.1, 0.05);
        let s = cam.spherical();
        assert!((s.theta - (-0.1)).abs() < 0.001);
        assert!((s.phi - (DEFAULT_PHI - 0.05)).abs() < 0.001);
        assert!((s.radius - DEFAULT_RADIUS).abs() < 0.001);
        // Deltas are consumed on return: a zero-delta rotate changes nothing
        let before = cam.position();
        cam.rotate(0.0, 0.0);
        assert!(cam.position().distance(before) < 0.001);
    }

    #[test]
    fn test_phi_clamped_at_poles() {
        let mut cam = OrbitCamera::new();
        for _ in 0..100 {
            cam.rotate(0.0, -0.5);
        }
        assert!((cam.spherical().phi - (PI - POLE_MARGIN)).abs() < 0.001);
        for _ in 0..100 {
            cam.rotate(0.0, 0.5);
        }
        assert!((cam.spherical().phi - POLE_MARGIN).abs() < 0.001);
    }

    #[test]
    fn test_radius_stays_bounded() {
        let mut cam = OrbitCamera::new();
        for _ in 0..50 {
            cam.zoom(0.5);
        }
        assert!((cam.radius() - MAX_DISTANCE).abs() < 0.001);
        for _ in 0..50 {
            cam.zoom(-0.5);
        }
        assert!((cam.radius() - MIN_DISTANCE).abs() < 0.001);
    }

    #[test]
    fn test_random_walk_respects_bounds() {
        let mut cam = OrbitCamera::new();
        let mut seed = 0x2545f491u32;
        for _ in 0..500 {
            // xorshift keeps the walk deterministic
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let dx = (seed % 200) as f32 / 100.0 - 1.0;
            let dy = (seed % 77) as f32 / 38.0 - 1.0;
            cam.rotate(dx, dy);
            cam.zoom(dx * 0.3);
            let s = cam.spherical();
            assert!(s.phi >= POLE_MARGIN - 0.001 && s.phi <= PI - POLE_MARGIN + 0.001);
            assert!(s.radius >= MIN_DISTANCE - 0.001 && s.radius <= MAX_DISTANCE + 0.001);
        }
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut cam = OrbitCamera::new();
        cam.rotate(1.3, -0.7);
        cam.zoom(0.4);
        cam.reset_position();
        let first = cam.position();
        cam.reset_position();
        let second = cam.position();
        assert!(first.distance(second) < 0.001);
        assert!((first.z - DEFAULT_RADIUS).abs() < 0.001);
    }

    #[test]
    fn test_rotate_disabled_is_noop() {
        let mut cam = OrbitCamera::new();
        cam.set_rotation_enabled(false);
        let before = cam.position();
        cam.rotate(0.5, 0.5);
        assert!(cam.position().distance(before) < 0.001);
        // Zoom still works with rotation off
        cam.zoom(0.2);
        assert!(cam.radius() < DEFAULT_RADIUS);
    }

    #[test]
    fn test_disable_rotation_snaps_to_front_view() {
        let mut cam = OrbitCamera::new();
        cam.rotate(1.0, 0.3);
        cam.set_rotation_enabled(false);
        let p = cam.position();
        assert!(p.x.abs() < 0.001);
        assert!((p.z - DEFAULT_RADIUS).abs() < 0.001);
    }

    #[test]
    fn test_restore_clamps_out_of_range_pose() {
        let mut cam = OrbitCamera::new();
        cam.restore(Spherical::new(100.0, 3.5, 0.2), Vec3::new(1.0, 0.0, 0.0), true);
        assert!((cam.radius() - MAX_DISTANCE).abs() < 0.001);
        assert!((cam.spherical().phi - (PI - POLE_MARGIN)).abs() < 0.001);
    }

    #[test]
    fn test_restore_rejects_non_finite() {
        let mut cam = OrbitCamera::new();
        let before = cam.position();
        cam.restore(Spherical::new(f32::NAN, 1.0, 1.0), Vec3::ZERO, true);
        assert!(cam.position().distance(before) < 0.001);
    }

    #[test]
    fn test_restore_keeps_zoomed_pose_with_rotation_off() {
        let mut cam = OrbitCamera::new();
        // Rotation off, then zoomed in: the saved radius must survive restore
        cam.set_rotation_enabled(false);
        cam.zoom(-0.4);
        let saved = cam.spherical();
        let mut fresh = OrbitCamera::new();
        fresh.restore(saved, cam.target(), false);
        assert!((fresh.radius() - saved.radius).abs() < 0.001);
        assert!(!fresh.rotation_enabled());
    }

    #[test]
    fn test_camera_always_looks_at_target_distance() {
        let mut cam = OrbitCamera::new();
        cam.restore(Spherical::new(8.0, 1.2, 0.4), Vec3::new(0.5, 1.0, -0.5), true);
        assert!((cam.position().distance(cam.target()) - 8.0).abs() < 0.001);
    }
}
