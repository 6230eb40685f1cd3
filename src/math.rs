//! Vector and spherical-coordinate math for the 3D stage

use std::ops::{Add, Sub, Mul};
use serde::{Serialize, Deserialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).len()
    }

    /// Component-wise check against NaN/Inf corruption from bad input data
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

/// Spherical coordinates around an implicit origin.
///
/// `phi` is the polar angle measured from the +Y axis (0 = straight above,
/// PI = straight below), `theta` the azimuth around Y measured from +Z.
/// With phi = PI/2, theta = 0 the position sits on +Z — the front view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn new(radius: f32, phi: f32, theta: f32) -> Self {
        Self { radius, phi, theta }
    }

    /// Convert to a Cartesian position offset from `target`
    pub fn to_cartesian(self, target: Vec3) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3 {
            x: self.radius * sin_phi * self.theta.sin(),
            y: self.radius * self.phi.cos(),
            z: self.radius * sin_phi * self.theta.cos(),
        } + target
    }

    /// Recover spherical coordinates from a position relative to `target`
    pub fn from_position(position: Vec3, target: Vec3) -> Self {
        let rel = position - target;
        let radius = rel.len();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self {
            radius,
            phi: (rel.y / radius).clamp(-1.0, 1.0).acos(),
            theta: rel.x.atan2(rel.z),
        }
    }

    pub fn is_finite(self) -> bool {
        self.radius.is_finite() && self.phi.is_finite() && self.theta.is_finite()
    }
}

impl Default for Spherical {
    fn default() -> Self {
        Self::new(1.0, std::f32::consts::FRAC_PI_2, 0.0)
    }
}

// =============================================================================
// Viewport projection helpers
// =============================================================================

/// Camera basis vectors for a look-at pose: (right, up, forward).
/// `forward` points from the camera toward the target.
pub fn camera_basis(position: Vec3, target: Vec3) -> (Vec3, Vec3, Vec3) {
    let forward = (target - position).normalize();
    let mut right = forward.cross(Vec3::UP);
    if right.len() < 1e-6 {
        // Looking straight along Y; any horizontal axis works
        right = Vec3::new(1.0, 0.0, 0.0);
    }
    let right = right.normalize();
    let up = right.cross(forward).normalize();
    (right, up, forward)
}

/// Project a world-space point to viewport pixels with camera-space depth.
/// Returns None when the point is behind the camera.
pub fn world_to_screen_with_depth(
    world_pos: Vec3,
    camera_pos: Vec3,
    basis_x: Vec3,
    basis_y: Vec3,
    basis_z: Vec3,
    fovy: f32,
    viewport: (f32, f32, f32, f32),
) -> Option<(f32, f32, f32)> {
    let rel = world_pos - camera_pos;
    let cam_z = rel.dot(basis_z);

    // Behind camera
    if cam_z <= 0.1 {
        return None;
    }

    let cam_x = rel.dot(basis_x);
    let cam_y = rel.dot(basis_y);

    let (vx, vy, vw, vh) = viewport;
    let half_h = (fovy * 0.5).tan();
    let aspect = vw / vh;

    let ndc_x = cam_x / (cam_z * half_h * aspect);
    let ndc_y = cam_y / (cam_z * half_h);

    let sx = vx + (ndc_x + 1.0) * 0.5 * vw;
    let sy = vy + (1.0 - ndc_y) * 0.5 * vh;
    Some((sx, sy, cam_z))
}

/// Project a world-space point to viewport pixels
pub fn world_to_screen(
    world_pos: Vec3,
    camera_pos: Vec3,
    basis_x: Vec3,
    basis_y: Vec3,
    basis_z: Vec3,
    fovy: f32,
    viewport: (f32, f32, f32, f32),
) -> Option<(f32, f32)> {
    world_to_screen_with_depth(world_pos, camera_pos, basis_x, basis_y, basis_z, fovy, viewport)
        .map(|(sx, sy, _)| (sx, sy))
}

/// Ray from the camera through a viewport pixel: (origin, direction)
pub fn screen_to_ray(
    sx: f32,
    sy: f32,
    camera_pos: Vec3,
    basis_x: Vec3,
    basis_y: Vec3,
    basis_z: Vec3,
    fovy: f32,
    viewport: (f32, f32, f32, f32),
) -> (Vec3, Vec3) {
    let (vx, vy, vw, vh) = viewport;
    let half_h = (fovy * 0.5).tan();
    let aspect = vw / vh;

    let ndc_x = (sx - vx) / vw * 2.0 - 1.0;
    let ndc_y = 1.0 - (sy - vy) / vh * 2.0;

    let dir = (basis_z + basis_x * (ndc_x * half_h * aspect) + basis_y * (ndc_y * half_h))
        .normalize();
    (camera_pos, dir)
}

/// Intersect a ray with the z = 0 plane the photo sits on
pub fn ray_plane_z0(origin: Vec3, dir: Vec3) -> Option<Vec3> {
    if dir.z.abs() < 1e-6 {
        return None;
    }
    let t = -origin.z / dir.z;
    if t <= 0.0 {
        return None;
    }
    Some(origin + dir * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert!((c.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_normalize_zero_vector() {
        let v = Vec3::ZERO.normalize();
        assert!(v.len() < 0.001);
    }

    #[test]
    fn test_front_view_sits_on_positive_z() {
        let s = Spherical::new(10.0, FRAC_PI_2, 0.0);
        let p = s.to_cartesian(Vec3::ZERO);
        assert!(p.x.abs() < 0.001);
        assert!(p.y.abs() < 0.001);
        assert!((p.z - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_spherical_round_trip() {
        let target = Vec3::new(1.0, 2.0, -3.0);
        let s = Spherical::new(7.5, 1.1, -2.3);
        let p = s.to_cartesian(target);
        let back = Spherical::from_position(p, target);
        assert!((back.radius - s.radius).abs() < 0.001);
        assert!((back.phi - s.phi).abs() < 0.001);
        assert!((back.theta - s.theta).abs() < 0.001);
    }

    #[test]
    fn test_top_down_phi() {
        let s = Spherical::new(5.0, 0.01, 0.0);
        let p = s.to_cartesian(Vec3::ZERO);
        assert!((p.y - 5.0).abs() < 0.01);
        let back = Spherical::from_position(p, Vec3::ZERO);
        assert!(back.phi < 0.02);
        assert!(back.phi >= 0.0);
    }

    #[test]
    fn test_theta_wraps_around_y() {
        let s = Spherical::new(4.0, FRAC_PI_2, PI);
        let p = s.to_cartesian(Vec3::ZERO);
        assert!((p.z + 4.0).abs() < 0.001);
    }

    const FOVY: f32 = std::f32::consts::FRAC_PI_4;
    const VIEW: (f32, f32, f32, f32) = (0.0, 34.0, 800.0, 600.0);

    fn front_camera() -> (Vec3, Vec3, Vec3, Vec3) {
        let pos = Vec3::new(0.0, 0.0, 10.0);
        let (bx, by, bz) = camera_basis(pos, Vec3::ZERO);
        (pos, bx, by, bz)
    }

    #[test]
    fn test_camera_basis_front_view() {
        let (_, bx, by, bz) = front_camera();
        assert!((bx.x - 1.0).abs() < 0.001);
        assert!((by.y - 1.0).abs() < 0.001);
        assert!((bz.z + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_camera_basis_straight_down_does_not_degenerate() {
        let pos = Vec3::new(0.0, 10.0, 0.0);
        let (bx, by, bz) = camera_basis(pos, Vec3::ZERO);
        assert!((bx.len() - 1.0).abs() < 0.001);
        assert!((by.len() - 1.0).abs() < 0.001);
        assert!((bz.y + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_target_projects_to_viewport_center() {
        let (pos, bx, by, bz) = front_camera();
        let (sx, sy) = world_to_screen(Vec3::ZERO, pos, bx, by, bz, FOVY, VIEW).unwrap();
        assert!((sx - 400.0).abs() < 0.001);
        assert!((sy - 334.0).abs() < 0.001);
    }

    #[test]
    fn test_projection_directions() {
        let (pos, bx, by, bz) = front_camera();
        let (right_x, _) =
            world_to_screen(Vec3::new(1.0, 0.0, 0.0), pos, bx, by, bz, FOVY, VIEW).unwrap();
        assert!(right_x > 400.0);

        // World up is screen up, so smaller y
        let (_, up_y) =
            world_to_screen(Vec3::new(0.0, 1.0, 0.0), pos, bx, by, bz, FOVY, VIEW).unwrap();
        assert!(up_y < 334.0);
    }

    #[test]
    fn test_point_behind_camera_is_culled() {
        let (pos, bx, by, bz) = front_camera();
        assert!(world_to_screen(Vec3::new(0.0, 0.0, 20.0), pos, bx, by, bz, FOVY, VIEW).is_none());
    }

    #[test]
    fn test_ray_round_trip_through_plane() {
        let (pos, bx, by, bz) = front_camera();
        let (sx, sy) = (0.0 + 0.7 * 800.0, 34.0 + 0.3 * 600.0);
        let (origin, dir) = screen_to_ray(sx, sy, pos, bx, by, bz, FOVY, VIEW);
        let hit = ray_plane_z0(origin, dir).unwrap();
        assert!(hit.z.abs() < 0.001);

        let (back_x, back_y) = world_to_screen(hit, pos, bx, by, bz, FOVY, VIEW).unwrap();
        assert!((back_x - sx).abs() < 0.05);
        assert!((back_y - sy).abs() < 0.05);
    }

    #[test]
    fn test_ray_parallel_to_plane_misses() {
        let origin = Vec3::new(0.0, 0.0, 10.0);
        assert!(ray_plane_z0(origin, Vec3::new(1.0, 0.0, 0.0)).is_none());
        // Pointing away from the plane
        assert!(ray_plane_z0(origin, Vec3::new(0.0, 0.0, 1.0)).is_none());
    }
}
