use font8x8::legacy::BASIC_LEGACY;

use crate::math::Rgba;
use crate::scene::Texture;

/// Glyph cell size of the bitmap font before scaling
pub const GLYPH_SIZE: i32 = 8;

/// Largest canvas edge in pixels; larger requests are clamped
pub const MAX_CANVAS_SIDE: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// 2D drawing operations for canvas.
///
/// Coordinates are signed so shapes may hang off the edges; anything outside
/// the canvas is clipped. Fills blend with source-over.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Overwrite every pixel
    Clear(Rgba),

    Rect { x: i32, y: i32, width: i32, height: i32, color: Rgba },

    StrokeRect { x: i32, y: i32, width: i32, height: i32, thickness: i32, color: Rgba },

    /// Ring segment between two angles (radians, clockwise from +x)
    Arc { cx: i32, cy: i32, radius: i32, start: f32, end: f32, thickness: i32, color: Rgba },

    /// Top-to-bottom linear gradient
    VGradient { x: i32, y: i32, width: i32, height: i32, top: Rgba, bottom: Rgba },

    /// `y` is the text baseline
    Text { x: i32, y: i32, text: String, scale: i32, color: Rgba, align: TextAlign },
}

/// Canvas state - pixel buffer with draw operations
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: Vec<Rgba>,
    operations: Vec<DrawOp>,
    width: u32,
    height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.min(MAX_CANVAS_SIDE);
        let height = height.min(MAX_CANVAS_SIDE);
        Self {
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
            operations: Vec::new(),
            width,
            height,
        }
    }

    /// Add draw operation - functional style
    pub fn draw(mut self, op: DrawOp) -> Self {
        self.operations.push(op);
        self
    }

    /// Queue several operations at once
    pub fn draw_all(mut self, ops: impl IntoIterator<Item = DrawOp>) -> Self {
        self.operations.extend(ops);
        self
    }

    /// Execute all pending operations and return new canvas
    pub fn execute_ops(&self) -> Self {
        let mut canvas = Self {
            pixels: self.pixels.clone(),
            operations: Vec::new(),
            width: self.width,
            height: self.height,
        };

        for op in &self.operations {
            canvas.execute_op(op);
        }

        canvas
    }

    fn execute_op(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Clear(color) => self.pixels.fill(*color),
            DrawOp::Rect { x, y, width, height, color } => self.fill_rect(*x, *y, *width, *height, *color),
            DrawOp::StrokeRect { x, y, width, height, thickness, color } => {
                let t = (*thickness).max(1);
                self.fill_rect(*x, *y, *width, t, *color);
                self.fill_rect(*x, y + height - t, *width, t, *color);
                self.fill_rect(*x, y + t, t, height - 2 * t, *color);
                self.fill_rect(x + width - t, y + t, t, height - 2 * t, *color);
            }
            DrawOp::Arc { cx, cy, radius, start, end, thickness, color } => {
                self.draw_ring(*cx, *cy, *radius, (*thickness).max(1), *start, *end, *color)
            }
            DrawOp::VGradient { x, y, width, height, top, bottom } => {
                for dy in 0..(*height).max(0) {
                    let t = dy as f32 / (*height - 1).max(1) as f32;
                    self.fill_rect(*x, y + dy, *width, 1, top.lerp(*bottom, t));
                }
            }
            DrawOp::Text { x, y, text, scale, color, align } => {
                self.draw_text(*x, *y, text, (*scale).max(1), *color, *align)
            }
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        self.pixels[idx] = color.over(self.pixels[idx]);
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width).min(self.width as i32);
        let y1 = (y + height).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, color);
            }
        }
    }

    /// Filled annulus sector
    fn draw_ring(&mut self, cx: i32, cy: i32, radius: i32, thickness: i32, start: f32, end: f32, color: Rgba) {
        let outer_sq = radius * radius;
        let inner = (radius - thickness).max(0);
        let inner_sq = inner * inner;
        let full = (end - start).abs() >= std::f32::consts::TAU - 1e-4;
        let span = (end - start).rem_euclid(std::f32::consts::TAU);

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d = dx * dx + dy * dy;
                if d > outer_sq || (inner > 0 && d < inner_sq) {
                    continue;
                }
                if !full {
                    let angle = (dy as f32).atan2(dx as f32);
                    if (angle - start).rem_euclid(std::f32::consts::TAU) > span {
                        continue;
                    }
                }
                self.blend_pixel(cx + dx, cy + dy, color);
            }
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: i32, color: Rgba, align: TextAlign) {
        let advance = GLYPH_SIZE * scale;
        let width = text_width(text, scale);
        let left = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2,
            TextAlign::Right => x - width,
        };
        let top = y - (GLYPH_SIZE - 1) * scale;

        for (i, ch) in text.chars().enumerate() {
            let glyph = glyph_for_char(ch);
            let gx = left + i as i32 * advance;
            for (row, bits) in glyph.iter().enumerate() {
                for bit in 0..GLYPH_SIZE {
                    if (bits >> bit) & 0x01 == 0 {
                        continue;
                    }
                    self.fill_rect(gx + bit * scale, top + row as i32 * scale, scale, scale, color);
                }
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA8 bytes, ready for a texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn into_texture(self) -> Texture {
        Texture::new(self.width, self.height, self.pixels)
    }
}

/// Rendered width of `text` in pixels
pub fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * GLYPH_SIZE * scale.max(1)
}

const BULLET: [u8; 8] = [0x00, 0x00, 0x18, 0x3C, 0x3C, 0x18, 0x00, 0x00];

fn glyph_for_char(ch: char) -> [u8; 8] {
    if ch == '•' {
        return BULLET;
    }
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_then_rect_blends() {
        let canvas = Canvas::new(10, 10)
            .draw(DrawOp::Clear(Rgba::BLACK))
            .draw(DrawOp::Rect { x: 2, y: 2, width: 3, height: 3, color: Rgba::WHITE.with_alpha(0.5) })
            .execute_ops();

        assert_eq!(canvas.pixel(0, 0), Some(Rgba::BLACK));
        let mid = canvas.pixel(3, 3).unwrap();
        assert!((mid.r as i32 - 128).abs() <= 1, "expected half grey, got {:?}", mid);
        assert_eq!(canvas.pixel(5, 5), Some(Rgba::BLACK));
    }

    #[test]
    fn test_offscreen_shapes_are_clipped() {
        let canvas = Canvas::new(4, 4)
            .draw(DrawOp::Rect { x: -10, y: -10, width: 12, height: 12, color: Rgba::WHITE })
            .draw(DrawOp::StrokeRect { x: -5, y: -2, width: 20, height: 8, thickness: 1, color: Rgba::WHITE })
            .execute_ops();
        assert_eq!(canvas.pixel(1, 1), Some(Rgba::WHITE));
        assert_eq!(canvas.pixel(3, 3), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_text_alignment_positions() {
        let text = "AB".to_string();
        let width = text_width(&text, 1);
        assert_eq!(width, 16);

        let right = Canvas::new(64, 16)
            .draw(DrawOp::Text { x: 64, y: 10, text, scale: 1, color: Rgba::WHITE, align: TextAlign::Right })
            .execute_ops();
        let lit_left_half = (0..48).any(|x| (0..16).any(|y| right.pixel(x, y) != Some(Rgba::TRANSPARENT)));
        assert!(!lit_left_half, "right-aligned text should stay in the last 16 columns");
    }

    #[test]
    fn test_glyph_fallback_for_non_ascii() {
        assert_eq!(glyph_for_char('€'), glyph_for_char('?'));
    }

    #[test]
    fn test_arc_covers_only_its_sector() {
        let canvas = Canvas::new(41, 41)
            .draw(DrawOp::Arc {
                cx: 20,
                cy: 20,
                radius: 15,
                start: 0.0,
                end: std::f32::consts::FRAC_PI_2 + 0.1,
                thickness: 4,
                color: Rgba::WHITE,
            })
            .execute_ops();
        assert_eq!(canvas.pixel(33, 20), Some(Rgba::WHITE));
        assert_eq!(canvas.pixel(20, 33), Some(Rgba::WHITE));
        assert_eq!(canvas.pixel(7, 20), Some(Rgba::TRANSPARENT));
        assert_eq!(canvas.pixel(20, 20), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_oversized_canvas_is_clamped() {
        let canvas = Canvas::new(70_000, 70_000);
        assert_eq!(canvas.width(), MAX_CANVAS_SIDE);
        assert_eq!(canvas.height(), MAX_CANVAS_SIDE);
        assert_eq!(canvas.pixels().len(), (MAX_CANVAS_SIDE * MAX_CANVAS_SIDE) as usize);
    }

    #[test]
    fn test_byte_view_matches_pixels() {
        let canvas = Canvas::new(2, 1).draw(DrawOp::Clear(Rgba::new(1, 2, 3, 4))).execute_ops();
        assert_eq!(canvas.as_bytes(), &[1, 2, 3, 4, 1, 2, 3, 4]);
    }
}
