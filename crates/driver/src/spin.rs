use glam::{EulerRot, Quat};
use serde::{Deserialize, Serialize};

/// Angular rates in radians per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinRates {
    /// Rate about the Y axis.
    pub y: f64,
    /// Rate about the X axis.
    pub x: f64,
}

impl Default for SpinRates {
    fn default() -> Self {
        Self { y: 0.1, x: -0.15 }
    }
}

/// Rotation angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub x: f64,
    pub y: f64,
}

impl Orientation {
    /// XYZ Euler rotation (X applied outermost), Z left at zero.
    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.x as f32, self.y as f32, 0.0)
    }
}

/// Orientation of every managed object at `elapsed` seconds.
pub fn orientation_at(rates: SpinRates, elapsed: f64) -> Orientation {
    Orientation {
        x: rates.x * elapsed,
        y: rates.y * elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_time_same_orientation() {
        let rates = SpinRates::default();
        for t in [0.0, 0.016, 1.0, 3.3, 10.0, 12345.678] {
            let a = orientation_at(rates, t);
            let b = orientation_at(rates, t);
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
        }
    }

    #[test]
    fn positive_rate_is_monotonic() {
        let rates = SpinRates::default();
        let mut prev = orientation_at(rates, 0.0).y;
        for step in 1..1000 {
            let y = orientation_at(rates, step as f64 * 0.037).y;
            assert!(y >= prev);
            prev = y;
        }
    }

    #[test]
    fn ten_seconds_with_default_rates() {
        let o = orientation_at(SpinRates::default(), 10.0);
        assert!((o.y - 1.0).abs() < 1e-12);
        assert!((o.x + 1.5).abs() < 1e-12);
    }

    #[test]
    fn zero_time_is_identity() {
        let q = orientation_at(SpinRates::default(), 0.0).to_quat();
        assert!(q.abs_diff_eq(Quat::IDENTITY, 1e-7));
    }

    #[test]
    fn quat_roundtrips_through_euler() {
        let o = orientation_at(SpinRates::default(), 10.0);
        let (x, y, z) = o.to_quat().to_euler(EulerRot::XYZ);
        assert!((x - -1.5).abs() < 1e-5);
        assert!((y - 1.0).abs() < 1e-5);
        assert!(z.abs() < 1e-5);
    }
}
