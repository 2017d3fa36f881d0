use glam::{Mat4, Vec3};

/// Camera handle the frame loop talks to.
///
/// `set_aspect` only records the new ratio; the projection matrix is
/// rebuilt by `recompute_projection`.
pub trait Camera {
    fn aspect(&self) -> f32;
    fn set_aspect(&mut self, aspect: f32);
    fn recompute_projection(&mut self);
    fn projection(&self) -> Mat4;
    fn view(&self) -> Mat4;
    fn position(&self) -> Vec3;
    fn look_at(&mut self, eye: Vec3, target: Vec3);

    fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Perspective camera with a cached projection matrix.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    position: Vec3,
    target: Vec3,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(75.0, 16.0 / 9.0, 0.1, 100.0)
    }
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov_degrees,
            near,
            far,
            aspect,
            position: Vec3::new(1.0, 1.0, 2.0),
            target: Vec3::ZERO,
            projection: Mat4::IDENTITY,
        };
        camera.recompute_projection();
        camera
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    fn build_projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }
}

impl Camera for PerspectiveCamera {
    fn aspect(&self) -> f32 {
        self.aspect
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    fn recompute_projection(&mut self) {
        self.projection = self.build_projection();
    }

    fn projection(&self) -> Mat4 {
        self.projection
    }

    fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn look_at(&mut self, eye: Vec3, target: Vec3) {
        self.position = eye;
        self.target = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = PerspectiveCamera::default();
        assert_eq!(cam.fov_degrees, 75.0);
        assert_eq!(cam.position(), Vec3::new(1.0, 1.0, 2.0));
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn aspect_change_waits_for_recompute() {
        let mut cam = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        let before = cam.projection();
        cam.set_aspect(2.0);
        assert_eq!(cam.aspect(), 2.0);
        assert_eq!(cam.projection(), before);
        cam.recompute_projection();
        assert_ne!(cam.projection(), before);
    }

    #[test]
    fn look_at_moves_eye_and_target() {
        let mut cam = PerspectiveCamera::default();
        cam.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(cam.position(), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(cam.target(), Vec3::new(1.0, 0.0, 0.0));
    }
}
