//! Pointer gesture tracking for the viewport
//!
//! Turns raw pointer/touch/wheel events into camera motion. Drags feed
//! incremental deltas (move-to-move, not down-to-move) so rotation stays
//! smooth, and a two-finger pinch zooms by the frame-to-frame change in
//! finger distance. The tracker holds no camera state of its own.

use macroquad::prelude::*;

use crate::camera::OrbitCamera;

/// Radians of rotation per pixel of drag
pub const ROTATE_SENSITIVITY: f32 = 0.01;
/// Zoom scale per wheel unit (one notch is ~100 units)
pub const WHEEL_SENSITIVITY: f32 = 0.001;
/// Zoom scale per pixel of pinch distance change
pub const PINCH_SENSITIVITY: f32 = 0.01;

/// Logical wheel units per notch
const WHEEL_NOTCH: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Rotating { last_x: f32, last_y: f32 },
    Pinching { last_distance: f32 },
}

pub struct PointerTracker {
    gesture: Gesture,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self { gesture: Gesture::Idle }
    }

    /// Begin a drag at the given position
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.gesture = Gesture::Rotating { last_x: x, last_y: y };
    }

    /// Feed a pointer move. Rotates the camera if a drag is active.
    pub fn pointer_move(&mut self, x: f32, y: f32, camera: &mut OrbitCamera) {
        if let Gesture::Rotating { last_x, last_y } = self.gesture {
            let dx = x - last_x;
            let dy = y - last_y;
            camera.rotate(dx * ROTATE_SENSITIVITY, dy * ROTATE_SENSITIVITY);
            self.gesture = Gesture::Rotating { last_x: x, last_y: y };
        }
    }

    /// End any active gesture (button release, touch end, pointer leave)
    pub fn pointer_up(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Feed the current two-finger distance. The first sample after a
    /// gesture change only sets the baseline; later samples zoom by the
    /// change in distance.
    pub fn pinch_update(&mut self, distance: f32, camera: &mut OrbitCamera) {
        match self.gesture {
            Gesture::Pinching { last_distance } => {
                let delta = (distance - last_distance) * PINCH_SENSITIVITY;
                camera.zoom(delta);
                self.gesture = Gesture::Pinching { last_distance: distance };
            }
            _ => {
                // A second finger landed; any drag in progress ends here
                self.gesture = Gesture::Pinching { last_distance: distance };
            }
        }
    }

    /// End a pinch (a finger lifted)
    pub fn pinch_end(&mut self) {
        if matches!(self.gesture, Gesture::Pinching { .. }) {
            self.gesture = Gesture::Idle;
        }
    }

    /// Wheel zoom. Positive delta zooms out, negative zooms in.
    pub fn wheel(&self, delta_y: f32, camera: &mut OrbitCamera) {
        camera.zoom(delta_y * WHEEL_SENSITIVITY);
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Rotating { .. })
    }

    /// Read macroquad input for this frame and drive the camera.
    /// `allow_start` gates new drags (false while the pointer is over UI);
    /// a drag already in progress keeps tracking regardless.
    pub fn pump(&mut self, camera: &mut OrbitCamera, allow_start: bool) {
        let touch_list = touches();

        if touch_list.len() >= 2 {
            let a = touch_list[0].position;
            let b = touch_list[1].position;
            let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
            self.pinch_update(distance, camera);
            return;
        }

        let was_pinching = matches!(self.gesture, Gesture::Pinching { .. });
        self.pinch_end();
        // A finger lifted mid-pinch: re-seed the survivor as a rotate so
        // the camera does not jump to a stale drag origin
        if was_pinching {
            if let Some(touch) = touch_list.first() {
                self.pointer_down(touch.position.x, touch.position.y);
            }
        }

        let (mx, my) = mouse_position();

        if is_mouse_button_pressed(MouseButton::Left) && allow_start {
            self.pointer_down(mx, my);
        }
        if is_mouse_button_down(MouseButton::Left) {
            self.pointer_move(mx, my, camera);
        }
        if is_mouse_button_released(MouseButton::Left) {
            self.pointer_up();
        }

        // Scroll up zooms in. Magnitude varies wildly across platforms,
        // so only the sign is used (one notch per frame).
        let (_, wheel_y) = mouse_wheel();
        if wheel_y != 0.0 && allow_start {
            let step = if wheel_y > 0.0 { -WHEEL_NOTCH } else { WHEEL_NOTCH };
            self.wheel(step, camera);
        }
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_rotates_incrementally() {
        let mut tracker = PointerTracker::new();
        let mut camera = OrbitCamera::new();

        tracker.pointer_down(100.0, 100.0);
        tracker.pointer_move(110.0, 100.0, &mut camera);
        // dx = 10 px -> theta -= 0.1
        assert!((camera.spherical().theta + 0.1).abs() < 0.001);

        // Deltas come from the last position, not the down position
        tracker.pointer_move(110.0, 100.0, &mut camera);
        assert!((camera.spherical().theta + 0.1).abs() < 0.001);

        tracker.pointer_move(120.0, 100.0, &mut camera);
        assert!((camera.spherical().theta + 0.2).abs() < 0.001);
    }

    #[test]
    fn test_move_without_down_is_ignored() {
        let mut tracker = PointerTracker::new();
        let mut camera = OrbitCamera::new();

        tracker.pointer_move(300.0, 300.0, &mut camera);
        assert!((camera.spherical().theta).abs() < 0.001);
        assert!((camera.spherical().phi - std::f32::consts::FRAC_PI_2).abs() < 0.001);
    }

    #[test]
    fn test_release_ends_drag() {
        let mut tracker = PointerTracker::new();
        let mut camera = OrbitCamera::new();

        tracker.pointer_down(0.0, 0.0);
        tracker.pointer_up();
        assert!(!tracker.is_dragging());

        tracker.pointer_move(50.0, 0.0, &mut camera);
        assert!((camera.spherical().theta).abs() < 0.001);
    }

    #[test]
    fn test_wheel_zooms() {
        let tracker = PointerTracker::new();
        let mut camera = OrbitCamera::new();

        tracker.wheel(WHEEL_NOTCH, &mut camera);
        // 100 * 0.001 = 0.1 -> radius 10 * 1.1
        assert!((camera.spherical().radius - 11.0).abs() < 0.001);

        tracker.wheel(-WHEEL_NOTCH, &mut camera);
        assert!((camera.spherical().radius - 9.9).abs() < 0.001);
    }

    #[test]
    fn test_pinch_first_sample_is_baseline() {
        let mut tracker = PointerTracker::new();
        let mut camera = OrbitCamera::new();

        tracker.pinch_update(200.0, &mut camera);
        assert!((camera.spherical().radius - 10.0).abs() < 0.001);

        // Distance grows by 10 px -> zoom(0.1) -> radius * 1.1
        tracker.pinch_update(210.0, &mut camera);
        assert!((camera.spherical().radius - 11.0).abs() < 0.001);
    }

    #[test]
    fn test_pinch_interrupts_drag() {
        let mut tracker = PointerTracker::new();
        let mut camera = OrbitCamera::new();

        tracker.pointer_down(100.0, 100.0);
        tracker.pinch_update(150.0, &mut camera);
        assert!(!tracker.is_dragging());

        // The old drag position is gone; a move does not rotate
        let theta = camera.spherical().theta;
        tracker.pointer_move(200.0, 100.0, &mut camera);
        assert!((camera.spherical().theta - theta).abs() < 0.001);
    }

    #[test]
    fn test_pinch_end_returns_to_idle() {
        let mut tracker = PointerTracker::new();
        let mut camera = OrbitCamera::new();

        tracker.pinch_update(200.0, &mut camera);
        tracker.pinch_end();

        // A fresh pinch needs a new baseline; no zoom on its first sample
        tracker.pinch_update(400.0, &mut camera);
        assert!((camera.spherical().radius - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_pinch_survivor_reseeds_without_jump() {
        let mut tracker = PointerTracker::new();
        let mut camera = OrbitCamera::new();

        tracker.pinch_update(100.0, &mut camera);
        tracker.pinch_update(120.0, &mut camera);
        let after_pinch = camera.spherical();

        // One finger lifts; the survivor seeds a drag at its own position
        tracker.pinch_end();
        tracker.pointer_down(50.0, 60.0);
        tracker.pointer_move(50.0, 60.0, &mut camera);
        assert!((camera.spherical().theta - after_pinch.theta).abs() < 0.001);
        assert!((camera.spherical().phi - after_pinch.phi).abs() < 0.001);

        // Motion from there rotates as a normal drag
        tracker.pointer_move(60.0, 60.0, &mut camera);
        let expected = after_pinch.theta - 10.0 * ROTATE_SENSITIVITY;
        assert!((camera.spherical().theta - expected).abs() < 0.001);
    }

    #[test]
    fn test_disabled_rotation_still_zooms() {
        let mut tracker = PointerTracker::new();
        let mut camera = OrbitCamera::new();
        camera.set_rotation_enabled(false);

        tracker.pointer_down(0.0, 0.0);
        tracker.pointer_move(80.0, 40.0, &mut camera);
        assert!((camera.spherical().theta).abs() < 0.001);

        tracker.wheel(WHEEL_NOTCH, &mut camera);
        assert!((camera.spherical().radius - 11.0).abs() < 0.001);
    }
}
