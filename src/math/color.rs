use glam::Vec3;

/// Packed 8-bit RGBA color, laid out for direct upload as `Rgba8Unorm`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from `0xRRGGBB`
    pub const fn from_hex(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 255)
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }

    pub fn from_vec3(v: Vec3) -> Self {
        let c = (v.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
        Self::new(c.x as u8, c.y as u8, c.z as u8, 255)
    }

    pub fn alpha_f32(self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Source-over compositing of `self` onto `dst`
    pub fn over(self, dst: Rgba) -> Rgba {
        let sa = self.alpha_f32();
        if sa >= 1.0 {
            return self;
        }
        let da = dst.alpha_f32();
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return Rgba::TRANSPARENT;
        }
        let rgb = (self.to_vec3() * sa + dst.to_vec3() * da * (1.0 - sa)) / out_a;
        Rgba::from_vec3(rgb).with_alpha(out_a)
    }

    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let c = v * s;
    let h_prime = (h * 6.0) % 6.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h_prime as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_channels() {
        assert_eq!(Rgba::from_hex(0x00c6ff), Rgba::new(0, 198, 255, 255));
    }

    #[test]
    fn test_over_opaque_replaces() {
        let red = Rgba::new(255, 0, 0, 255);
        assert_eq!(red.over(Rgba::WHITE), red);
    }

    #[test]
    fn test_over_half_alpha_mixes() {
        let out = Rgba::WHITE.with_alpha(0.5).over(Rgba::BLACK);
        assert!((out.r as i32 - 128).abs() <= 1, "got {:?}", out);
        assert_eq!(out.a, 255);
    }

    #[test]
    fn test_hsv_to_rgb_red() {
        let rgb = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!((rgb[0] - 1.0).abs() < 0.01);
        assert!(rgb[1].abs() < 0.01);
        assert!(rgb[2].abs() < 0.01);
    }
}
