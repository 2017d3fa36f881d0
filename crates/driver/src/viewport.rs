/// Upper bound on the device pixel ratio applied to the drawable surface.
pub const DEFAULT_MAX_PIXEL_RATIO: f32 = 2.0;

/// Clamp a host scale factor to `ceiling`. Non-finite or non-positive
/// factors fall back to 1.0.
pub fn clamp_scale(scale: f32, ceiling: f32) -> f32 {
    if !scale.is_finite() || scale <= 0.0 {
        return 1.0;
    }
    scale.min(ceiling)
}

/// Logical viewport size plus the scale applied to the backing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    width: u32,
    height: u32,
    scale: f32,
}

impl ViewportState {
    /// A viewport, or `None` when either dimension is zero.
    pub fn new(width: u32, height: u32, scale: f32, ceiling: f32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            width,
            height,
            scale: clamp_scale(scale, ceiling),
        })
    }

    /// Like [`new`](Self::new) but bumps zero dimensions to one pixel.
    pub fn at_least_one_pixel(width: u32, height: u32, scale: f32, ceiling: f32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            scale: clamp_scale(scale, ceiling),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Backing surface size in physical pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        let scaled = |v: u32| ((v as f32 * self.scale).round() as u32).max(1);
        (scaled(self.width), scaled(self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(ViewportState::new(800, 0, 1.0, 2.0).is_none());
        assert!(ViewportState::new(0, 600, 1.0, 2.0).is_none());
    }

    #[test]
    fn scale_is_clamped_to_ceiling() {
        let v = ViewportState::new(800, 600, 3.0, 2.0).unwrap();
        assert_eq!(v.scale(), 2.0);
        assert_eq!(v.drawable_size(), (1600, 1200));
    }

    #[test]
    fn bad_scale_falls_back_to_one() {
        assert_eq!(clamp_scale(f32::NAN, 2.0), 1.0);
        assert_eq!(clamp_scale(-1.0, 2.0), 1.0);
        assert_eq!(clamp_scale(1.25, 2.0), 1.25);
    }

    #[test]
    fn initial_viewport_never_degenerate() {
        let v = ViewportState::at_least_one_pixel(0, 0, 1.0, 2.0);
        assert_eq!((v.width(), v.height()), (1, 1));
    }

    #[test]
    fn aspect_ratio() {
        let v = ViewportState::new(800, 600, 1.0, 2.0).unwrap();
        assert!((v.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }
}
