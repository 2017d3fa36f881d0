/// A high-level camera action produced by any host (desktop window, CLI replay).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    /// Orbit around the target. Deltas are fractions of the viewport height,
    /// so one full-height drag turns the camera a full revolution.
    Rotate { dx: f32, dy: f32 },
    /// Dolly towards the target by `steps` wheel notches; negative backs away.
    Zoom(f32),
    /// No-op (used for input mapping that hasn't been bound yet).
    Noop,
}

impl ControlAction {
    /// Map a pointer drag in pixels to a rotation, relative to the viewport height.
    pub fn drag(dx_px: f64, dy_px: f64, viewport_height: u32) -> Self {
        if viewport_height == 0 {
            return Self::Noop;
        }
        let h = viewport_height as f64;
        Self::Rotate {
            dx: (dx_px / h) as f32,
            dy: (dy_px / h) as f32,
        }
    }
}
