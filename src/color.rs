/// Splits a `0xRRGGBB` literal into sRGB channels. Use [`Rgb::linear`] before
/// handing colors to the sRGB surface.
pub const fn hex(rgb: u32) -> Rgb {
    Rgb {
        r: ((rgb >> 16) & 0xff) as u8,
        g: ((rgb >> 8) & 0xff) as u8,
        b: (rgb & 0xff) as u8,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }

    pub fn linear_scaled(self, intensity: f32) -> [f32; 3] {
        let [r, g, b] = self.linear();
        [r * intensity, g * intensity, b * intensity]
    }

    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.linear();
        [r, g, b, alpha.clamp(0.0, 1.0)]
    }
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_splits_channels() {
        assert_eq!(hex(0x00d4aa), Rgb { r: 0x00, g: 0xd4, b: 0xaa });
    }

    #[test]
    fn linear_endpoints_are_exact() {
        assert_eq!(hex(0x000000).linear(), [0.0, 0.0, 0.0]);
        assert!(hex(0xffffff)
            .linear()
            .iter()
            .all(|c| (c - 1.0).abs() < 1e-6));
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(hex(0xffffff).with_alpha(1.5)[3], 1.0);
        assert_eq!(hex(0xffffff).with_alpha(-0.5)[3], 0.0);
    }
}
