use glam::{Mat4, Vec3, Vec4};

use crate::core::{Button, Controller};
use crate::math::Ray;

pub const DEFAULT_FOV_DEG: f32 = 75.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;

/// Free-movement speed in world units per second
pub const CAMERA_SPEED: f32 = 30.0;

/// Held movement keys, sampled from a controller once per frame
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovementState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementState {
    /// WASD and the arrow keys both drive movement; a captured keyboard drives nothing
    pub fn from_controller(controller: &dyn Controller) -> Self {
        if controller.keyboard_captured() {
            return Self::default();
        }
        Self {
            forward: controller.any_down(&[Button::KeyW, Button::ArrowUp]),
            backward: controller.any_down(&[Button::KeyS, Button::ArrowDown]),
            left: controller.any_down(&[Button::KeyA, Button::ArrowLeft]),
            right: controller.any_down(&[Button::KeyD, Button::ArrowRight]),
        }
    }

    const fn to_direction(&self, positive: bool, negative: bool) -> f32 {
        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    /// (forward, right) axis values in {-1, 0, 1}
    pub const fn velocity(&self) -> (f32, f32) {
        (
            self.to_direction(self.forward, self.backward),
            self.to_direction(self.right, self.left),
        )
    }

    pub const fn is_idle(&self) -> bool {
        !(self.forward || self.backward || self.left || self.right)
    }
}

/// Perspective camera looking from `position` at `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, aspect: f32) -> Self {
        Self {
            position,
            target,
            fov_y_deg: DEFAULT_FOV_DEG,
            aspect,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Forward flattened onto the ground plane
    pub fn ground_forward(&self) -> Vec3 {
        let f = self.forward();
        Vec3::new(f.x, 0.0, f.z).normalize_or(Vec3::NEG_Z)
    }

    pub fn ground_right(&self) -> Vec3 {
        self.ground_forward().cross(Vec3::Y).normalize_or(Vec3::X)
    }

    /// Offset position and target together so the view direction is kept
    pub fn apply_movement(&mut self, movement: MovementState, speed: f32, dt: f32) {
        if movement.is_idle() {
            return;
        }
        let (fwd, right) = movement.velocity();
        let step = (self.ground_forward() * fwd + self.ground_right() * right) * speed * dt;
        self.position += step;
        self.target += step;
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World-space ray through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let inv = self.view_projection().inverse();
        let far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let far = far.truncate() / far.w;
        Ray::new(self.position, (far - self.position).normalize_or(self.forward()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IdleController;

    struct Held(Vec<Button>, bool);

    impl Controller for Held {
        fn is_down(&self, button: Button) -> bool {
            self.0.contains(&button)
        }
        fn get_down_keys(&self) -> &[Button] {
            &self.0
        }
        fn keyboard_captured(&self) -> bool {
            self.1
        }
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = Camera::new(Vec3::new(0.0, 8.0, 15.0), Vec3::ZERO, 16.0 / 9.0);
        let ray = camera.ray_from_ndc(0.0, 0.0);
        let expected = (Vec3::ZERO - camera.position).normalize();
        assert!((ray.dir - expected).length() < 1e-4, "center ray {:?}", ray.dir);
    }

    #[test]
    fn test_movement_is_horizontal() {
        let mut camera = Camera::new(Vec3::new(0.0, 8.0, 15.0), Vec3::ZERO, 1.0);
        let held = Held(vec![Button::KeyW], false);
        camera.apply_movement(MovementState::from_controller(&held), 30.0, 0.5);
        assert!((camera.position.y - 8.0).abs() < 1e-5, "height must not change");
        assert!((camera.position - Vec3::new(0.0, 8.0, 0.0)).length() < 1e-4, "got {}", camera.position);
        assert!((camera.target - Vec3::new(0.0, 0.0, -15.0)).length() < 1e-4);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let held = Held(vec![Button::KeyA, Button::ArrowRight], false);
        let movement = MovementState::from_controller(&held);
        assert_eq!(movement.velocity(), (0.0, 0.0));
    }

    #[test]
    fn test_captured_keyboard_disables_movement() {
        let held = Held(vec![Button::KeyW, Button::KeyD], true);
        assert!(MovementState::from_controller(&held).is_idle());
        assert!(MovementState::from_controller(&IdleController).is_idle());
    }

    #[test]
    fn test_strafe_right_is_positive_x_when_facing_negative_z() {
        let camera = Camera::new(Vec3::new(0.0, 5.0, 15.0), Vec3::new(0.0, 5.0, 0.0), 1.0);
        assert!((camera.ground_right() - Vec3::X).length() < 1e-5);
    }
}
