use glam::Vec3;
use showcase_render::Camera;
use std::f32::consts::{PI, TAU};

use crate::action::ControlAction;

/// Keeps the polar angle away from the poles, where `look_at` degenerates.
const POLE_EPSILON: f32 = 1e-6;

/// Orbit camera controls around a target point.
///
/// Input is accumulated by [`apply`](Self::apply) and consumed by
/// [`update`](Self::update). With damping on, each update applies only
/// `damping_factor` of the pending rotation and decays the rest, so the
/// camera glides to a stop over several frames.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    /// Controls orbiting `target`, aiming the camera at it.
    pub fn new(camera: &mut impl Camera, target: Vec3) -> Self {
        let eye = camera.position();
        camera.look_at(eye, target);
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn with_damping(mut self, factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Queue an input action for the next `update`.
    pub fn apply(&mut self, action: ControlAction) {
        match action {
            ControlAction::Rotate { dx, dy } => {
                self.theta_delta -= TAU * dx * self.rotate_speed;
                self.phi_delta -= TAU * dy * self.rotate_speed;
            }
            ControlAction::Zoom(steps) => {
                self.scale *= 0.95_f32.powf(steps * self.zoom_speed);
            }
            ControlAction::Noop => {}
        }
    }

    /// Whether rotation is still pending (damped motion in progress).
    pub fn is_settling(&self) -> bool {
        self.theta_delta.abs() > POLE_EPSILON || self.phi_delta.abs() > POLE_EPSILON
    }

    /// Move the camera by the pending input. Returns whether the eye moved.
    pub fn update(&mut self, camera: &mut impl Camera) -> bool {
        let eye = camera.position();
        let offset = eye - self.target;
        let radius = offset.length().max(f32::EPSILON);

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        if self.enable_damping {
            theta += self.theta_delta * self.damping_factor;
            phi += self.phi_delta * self.damping_factor;
        } else {
            theta += self.theta_delta;
            phi += self.phi_delta;
        }
        phi = phi.clamp(POLE_EPSILON, PI - POLE_EPSILON);
        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let new_offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let new_eye = self.target + new_offset;
        camera.look_at(new_eye, self.target);

        if self.enable_damping {
            self.theta_delta *= 1.0 - self.damping_factor;
            self.phi_delta *= 1.0 - self.damping_factor;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
        }
        self.scale = 1.0;

        let moved = new_eye.distance_squared(eye) > 1e-10;
        if moved {
            tracing::trace!(x = new_eye.x, y = new_eye.y, z = new_eye.z, "orbit moved camera");
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_render::PerspectiveCamera;

    fn camera() -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::default();
        cam.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        cam
    }

    #[test]
    fn idle_update_keeps_camera() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(&mut cam, Vec3::ZERO);
        assert!(!controls.update(&mut cam));
        assert!(cam.position().distance(Vec3::new(0.0, 0.0, 5.0)) < 1e-4);
    }

    #[test]
    fn undamped_rotation_applies_at_once() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(&mut cam, Vec3::ZERO);
        // Quarter turn to the left.
        controls.apply(ControlAction::Rotate { dx: -0.25, dy: 0.0 });
        assert!(controls.update(&mut cam));
        let p = cam.position();
        assert!((p.x - 5.0).abs() < 1e-4, "{p:?}");
        assert!(p.z.abs() < 1e-4, "{p:?}");
        assert!(!controls.is_settling());
    }

    #[test]
    fn damped_rotation_glides() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(&mut cam, Vec3::ZERO).with_damping(0.05);
        controls.apply(ControlAction::Rotate { dx: -0.25, dy: 0.0 });

        controls.update(&mut cam);
        let first = cam.position();
        assert!(first.x > 0.0 && first.x < 1.0, "{first:?}");
        assert!(controls.is_settling());

        for _ in 0..400 {
            controls.update(&mut cam);
        }
        let settled = cam.position();
        assert!((settled.x - 5.0).abs() < 1e-2, "{settled:?}");
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(&mut cam, Vec3::ZERO);
        controls.apply(ControlAction::Rotate { dx: 0.0, dy: 10.0 });
        controls.update(&mut cam);
        let p = cam.position();
        assert!(p.is_finite());
        assert!((p.length() - 5.0).abs() < 1e-3);
    }

    #[test]
    fn zoom_respects_bounds() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(&mut cam, Vec3::ZERO);
        controls.min_distance = 2.0;
        controls.apply(ControlAction::Zoom(100.0));
        controls.update(&mut cam);
        assert!((cam.position().length() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn zoom_in_moves_closer() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(&mut cam, Vec3::ZERO);
        controls.apply(ControlAction::Zoom(1.0));
        controls.update(&mut cam);
        assert!((cam.position().length() - 4.75).abs() < 1e-4);
    }
}
