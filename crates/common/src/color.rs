use serde::{Deserialize, Serialize};

/// Linear RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn to_hex(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_white() {
        assert_eq!(Rgb::from_hex(0xffffff), Rgb::WHITE);
    }

    #[test]
    fn from_hex_channels() {
        let c = Rgb::from_hex(0x1188ff);
        assert!((c.r - 0x11 as f32 / 255.0).abs() < 1e-6);
        assert!((c.g - 0x88 as f32 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 1.0);
    }

    #[test]
    fn hex_survives_conversion() {
        assert_eq!(Rgb::from_hex(0x00ff00).to_hex(), 0x00ff00);
    }
}
