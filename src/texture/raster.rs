//! RGBA8 raster with the few drawing primitives the painters need

/// RGBA color, straight alpha
pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// 3x5 bitmap digits, one row per byte, bit 2 = left column
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Blend one channel: src * a + dst * (1 - a), a in 0..=255
#[inline]
fn mix(src: u8, dst: u8, alpha: u16) -> u8 {
    let v = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((v + 1 + (v >> 8)) >> 8) as u8
}

/// Off-screen pixel buffer, row-major, top row first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(((y as u32 * self.width + x as u32) * 4) as usize)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        match self.index(x as i32, y as i32) {
            Some(i) => [
                self.pixels[i],
                self.pixels[i + 1],
                self.pixels[i + 2],
                self.pixels[i + 3],
            ],
            None => TRANSPARENT,
        }
    }

    /// Overwrite every pixel
    pub fn clear(&mut self, color: Rgba) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Overwrite one pixel
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i..i + 4].copy_from_slice(&color);
        }
    }

    /// Source-over blend one pixel
    #[inline]
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        let Some(i) = self.index(x, y) else { return };
        let a = color[3] as u16;
        if a == 0 {
            return;
        }
        if a == 255 {
            self.pixels[i..i + 4].copy_from_slice(&color);
            return;
        }
        let dst_a = self.pixels[i + 3] as u16;
        for c in 0..3 {
            self.pixels[i + c] = mix(color[c], self.pixels[i + c], a);
        }
        self.pixels[i + 3] = (a + dst_a * (255 - a) / 255).min(255) as u8;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
        for py in y..y + h {
            for px in x..x + w {
                self.blend(px, py, color);
            }
        }
    }

    /// Filled disc; `softness` in [0, 1] fades alpha toward the rim
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba, softness: f32) {
        if radius <= 0.0 {
            return;
        }
        let x0 = (cx - radius).floor() as i32;
        let x1 = (cx + radius).ceil() as i32;
        let y0 = (cy - radius).floor() as i32;
        let y1 = (cy + radius).ceil() as i32;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt() / radius;
                if d > 1.0 {
                    continue;
                }
                let falloff = if softness > 0.0 {
                    ((1.0 - d) / softness).min(1.0).powi(2)
                } else {
                    1.0
                };
                let alpha = (color[3] as f32 * falloff).round() as u8;
                self.blend(px, py, [color[0], color[1], color[2], alpha]);
            }
        }
    }

    /// Filled triangle (pixel centers inside all three edges)
    pub fn fill_triangle(&mut self, a: (f32, f32), b: (f32, f32), c: (f32, f32), color: Rgba) {
        self.fill_triangle_with(a, b, c, |_, _| color);
    }

    /// Filled triangle with a per-pixel color
    pub fn fill_triangle_with<F>(&mut self, a: (f32, f32), b: (f32, f32), c: (f32, f32), shade: F)
    where
        F: Fn(i32, i32) -> Rgba,
    {
        let edge = |p: (f32, f32), q: (f32, f32), x: f32, y: f32| {
            (q.0 - p.0) * (y - p.1) - (q.1 - p.1) * (x - p.0)
        };
        let area = edge(a, b, c.0, c.1);
        if area.abs() < f32::EPSILON {
            return;
        }
        let x0 = a.0.min(b.0).min(c.0).floor() as i32;
        let x1 = a.0.max(b.0).max(c.0).ceil() as i32;
        let y0 = a.1.min(b.1).min(c.1).floor() as i32;
        let y1 = a.1.max(b.1).max(c.1).ceil() as i32;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let (x, y) = (px as f32 + 0.5, py as f32 + 0.5);
                let w0 = edge(b, c, x, y) * area.signum();
                let w1 = edge(c, a, x, y) * area.signum();
                let w2 = edge(a, b, x, y) * area.signum();
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    self.blend(px, py, shade(px, py));
                }
            }
        }
    }

    /// Width in pixels of `text` drawn at `scale`
    pub fn text_width(text: &str, scale: i32) -> i32 {
        let n = text.chars().filter(|c| c.is_ascii_digit()).count() as i32;
        if n == 0 { 0 } else { n * 3 * scale + (n - 1) * scale }
    }

    /// Draw digits centered on (cx, cy); non-digits are skipped
    pub fn draw_number_centered(&mut self, text: &str, cx: f32, cy: f32, scale: i32, color: Rgba) {
        let w = Self::text_width(text, scale);
        let mut x = (cx - w as f32 / 2.0).round() as i32;
        let y = (cy - 2.5 * scale as f32).round() as i32;
        for ch in text.chars() {
            let Some(d) = ch.to_digit(10) else { continue };
            for (row, bits) in DIGITS[d as usize].iter().enumerate() {
                for col in 0..3 {
                    if bits & (0b100 >> col) != 0 {
                        self.fill_rect(x + col * scale, y + row as i32 * scale, scale, scale, color);
                    }
                }
            }
            x += 4 * scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_opaque_and_half() {
        let mut r = Raster::new(2, 1);
        r.clear([0, 0, 0, 255]);
        r.blend(0, 0, [255, 255, 255, 255]);
        assert_eq!(r.pixel(0, 0), [255, 255, 255, 255]);
        r.blend(1, 0, [255, 0, 0, 128]);
        let p = r.pixel(1, 0);
        assert!((p[0] as i32 - 128).abs() <= 1);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut r = Raster::new(4, 4);
        r.set(-1, 0, [1, 2, 3, 4]);
        r.fill_rect(3, 3, 10, 10, [9, 9, 9, 255]);
        assert_eq!(r.pixel(3, 3), [9, 9, 9, 255]);
        assert_eq!(r.pixel(2, 2), TRANSPARENT);
    }

    #[test]
    fn test_triangle_covers_interior() {
        let mut r = Raster::new(16, 16);
        r.fill_triangle((0.0, 0.0), (16.0, 0.0), (0.0, 16.0), [255, 0, 0, 255]);
        assert_eq!(r.pixel(2, 2), [255, 0, 0, 255]);
        assert_eq!(r.pixel(14, 14), TRANSPARENT);
    }

    #[test]
    fn test_number_width() {
        assert_eq!(Raster::text_width("20", 2), 14);
        assert_eq!(Raster::text_width("", 2), 0);
        let mut r = Raster::new(32, 32);
        r.draw_number_centered("1", 16.0, 16.0, 2, [255, 255, 255, 255]);
        assert!(r.as_bytes().iter().any(|&b| b == 255));
    }
}
