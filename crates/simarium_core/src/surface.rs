//! The raster drawing surface handed to the active engine.
//!
//! The host constructs one `Surface` per engine from the available pixel
//! area; the engine repaints it on every tick and the host blits it to the
//! screen. Text is kept as a positioned overlay list rather than rasterized,
//! so the host can render labels natively.
//!
//! Every drawing operation clips silently at the surface bounds, and all
//! operations on a zero-sized surface are no-ops: a 0x0 surface is a
//! transient layout state, not an error.

use simarium_data::{Circle, Rgba};

/// A piece of text anchored at a surface position, rendered by the host on
/// top of the pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub color: Rgba,
}

/// An owned RGBA pixel buffer plus the label overlay.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
    labels: Vec<Label>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::BLACK; width as usize * height as usize],
            labels: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Diagonal length in pixels. All entity sizes are derived from this so
    /// a simulation looks the same at any resolution.
    pub fn diag_length(&self) -> f64 {
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        (w * w + h * h).sqrt()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Fill the whole buffer and drop all labels.
    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
        self.labels.clear();
    }

    #[inline]
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[inline]
    pub fn put(&mut self, x: i64, y: i64, color: Rgba) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color;
        }
    }

    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<Rgba> {
        self.index(x, y).map(|idx| self.pixels[idx])
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let x1 = (x + w).ceil() as i64;
        let y1 = (y + h).ceil() as i64;
        for py in y0..y1 {
            for px in x0..x1 {
                self.put(px, py, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let x1 = (x + w).ceil() as i64 - 1;
        let y1 = (y + h).ceil() as i64 - 1;
        for px in x0..=x1 {
            self.put(px, y0, color);
            self.put(px, y1, color);
        }
        for py in y0..=y1 {
            self.put(x0, py, color);
            self.put(x1, py, color);
        }
    }

    pub fn fill_circle(&mut self, circle: &Circle, color: Rgba) {
        let r = circle.r.max(0.5);
        let x0 = (circle.x - r).floor() as i64;
        let y0 = (circle.y - r).floor() as i64;
        let x1 = (circle.x + r).ceil() as i64;
        let y1 = (circle.y + r).ceil() as i64;
        let rr = r * r;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f64 + 0.5 - circle.x;
                let dy = py as f64 + 0.5 - circle.y;
                if dx * dx + dy * dy <= rr {
                    self.put(px, py, color);
                }
            }
        }
    }

    /// One-pixel-wide Bresenham line.
    pub fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba) {
        let mut x = x0.round() as i64;
        let mut y = y0.round() as i64;
        let xe = x1.round() as i64;
        let ye = y1.round() as i64;
        let dx = (xe - x).abs();
        let dy = -(ye - y).abs();
        let sx = if x < xe { 1 } else { -1 };
        let sy = if y < ye { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x, y, color);
            if x == xe && y == ye {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Filled triangle via the edge-function test over the bounding box.
    pub fn fill_triangle(
        &mut self,
        (ax, ay): (f64, f64),
        (bx, by): (f64, f64),
        (cx, cy): (f64, f64),
        color: Rgba,
    ) {
        let x0 = ax.min(bx).min(cx).floor() as i64;
        let y0 = ay.min(by).min(cy).floor() as i64;
        let x1 = ax.max(bx).max(cx).ceil() as i64;
        let y1 = ay.max(by).max(cy).ceil() as i64;
        let edge = |px: f64, py: f64, x0: f64, y0: f64, x1: f64, y1: f64| {
            (x1 - x0) * (py - y0) - (y1 - y0) * (px - x0)
        };
        for py in y0..=y1 {
            for px in x0..=x1 {
                let fx = px as f64 + 0.5;
                let fy = py as f64 + 0.5;
                let e0 = edge(fx, fy, ax, ay, bx, by);
                let e1 = edge(fx, fy, bx, by, cx, cy);
                let e2 = edge(fx, fy, cx, cy, ax, ay);
                let inside = (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0)
                    || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0);
                if inside {
                    self.put(px, py, color);
                }
            }
        }
    }

    /// Record a label anchored at `(x, y)`; the host draws it over the
    /// pixels. Labels are dropped on the next `clear`.
    pub fn text(&mut self, x: f64, y: f64, text: impl Into<String>, color: Rgba) {
        if self.is_empty() {
            return;
        }
        self.labels.push(Label {
            x,
            y,
            text: text.into(),
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sized_surface_is_inert() {
        let mut surface = Surface::new(0, 0);
        surface.clear(Rgba::WHITE);
        surface.fill_rect(0.0, 0.0, 10.0, 10.0, Rgba::WHITE);
        surface.line(0.0, 0.0, 5.0, 5.0, Rgba::WHITE);
        surface.text(1.0, 1.0, "nothing", Rgba::WHITE);
        assert!(surface.pixels().is_empty());
        assert!(surface.labels().is_empty());
    }

    #[test]
    fn test_put_clips_out_of_bounds() {
        let mut surface = Surface::new(4, 4);
        surface.put(-1, 0, Rgba::WHITE);
        surface.put(4, 4, Rgba::WHITE);
        assert!(surface.pixels().iter().all(|p| *p == Rgba::BLACK));
    }

    #[test]
    fn test_fill_rect_covers_expected_pixels() {
        let mut surface = Surface::new(4, 4);
        surface.fill_rect(1.0, 1.0, 2.0, 2.0, Rgba::WHITE);
        assert_eq!(surface.get(1, 1), Some(Rgba::WHITE));
        assert_eq!(surface.get(2, 2), Some(Rgba::WHITE));
        assert_eq!(surface.get(0, 0), Some(Rgba::BLACK));
        assert_eq!(surface.get(3, 3), Some(Rgba::BLACK));
    }

    #[test]
    fn test_diag_length() {
        let surface = Surface::new(3, 4);
        assert!((surface.diag_length() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_clear_drops_labels() {
        let mut surface = Surface::new(4, 4);
        surface.text(0.0, 0.0, "hello", Rgba::WHITE);
        assert_eq!(surface.labels().len(), 1);
        surface.clear(Rgba::BLACK);
        assert!(surface.labels().is_empty());
    }

    #[test]
    fn test_line_endpoints_drawn() {
        let mut surface = Surface::new(8, 8);
        surface.line(0.0, 0.0, 7.0, 7.0, Rgba::WHITE);
        assert_eq!(surface.get(0, 0), Some(Rgba::WHITE));
        assert_eq!(surface.get(7, 7), Some(Rgba::WHITE));
    }
}
