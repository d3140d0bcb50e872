/// Host surface dimensions in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayContext {
    pub width: u32,
    pub height: u32,
}

impl DisplayContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    /// Pixel position to normalized device coordinates (y up, [-1, 1])
    pub fn to_ndc(&self, x: f32, y: f32) -> (f32, f32) {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        ((x / w) * 2.0 - 1.0, 1.0 - (y / h) * 2.0)
    }

    /// Reduced-resolution target, never smaller than 1x1
    pub fn scaled(&self, factor: f32) -> Self {
        let factor = factor.clamp(0.05, 1.0);
        Self {
            width: ((self.width as f32 * factor).round() as u32).max(1),
            height: ((self.height as f32 * factor).round() as u32).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_count_calculation() {
        let ctx = DisplayContext::new(640, 480);
        assert_eq!(ctx.pixel_count(), 307200);
    }

    #[test]
    fn test_ndc_corners_and_center() {
        let ctx = DisplayContext::new(800, 600);
        assert_eq!(ctx.to_ndc(0.0, 0.0), (-1.0, 1.0));
        assert_eq!(ctx.to_ndc(400.0, 300.0), (0.0, 0.0));
        assert_eq!(ctx.to_ndc(800.0, 600.0), (1.0, -1.0));
    }

    #[test]
    fn test_scaled_keeps_minimum() {
        let ctx = DisplayContext::new(1280, 720);
        assert_eq!(ctx.scaled(0.25), DisplayContext::new(320, 180));
        assert_eq!(DisplayContext::new(3, 3).scaled(0.1), DisplayContext::new(1, 1));
    }

    #[test]
    fn test_aspect_zero_height() {
        assert_eq!(DisplayContext::new(100, 0).aspect(), 1.0);
        assert!(DisplayContext::new(100, 0).is_empty());
    }
}
