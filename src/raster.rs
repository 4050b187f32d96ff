//! Software drawing surface.
//!
//! `FrameBuffer` takes polygons in logical screen coordinates (the configured
//! screen size) and rasterises them into a pixel grid of any resolution with
//! an even-odd scanline fill. Sprites are blitted as solid boxes in their
//! placeholder colour, since textures are the host's business.

use crate::data::{Rgb, ScreenPoint, Sprite};
use crate::renderer::DrawSurface;

#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    scale_x: f32,
    scale_y: f32,
    clear_color: Rgb,
    pixels: Vec<Rgb>,
}

impl FrameBuffer {
    /// Pixel grid of `width` x `height` showing a logical screen of
    /// `logical_width` x `logical_height`
    pub fn new(
        width: usize,
        height: usize,
        logical_width: f32,
        logical_height: f32,
        clear_color: Rgb,
    ) -> Self {
        Self {
            width,
            height,
            scale_x: width as f32 / logical_width,
            scale_y: height as f32 / logical_height,
            clear_color,
            pixels: vec![clear_color; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn row(&self, y: usize) -> &[Rgb] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Fill pixel columns `[x0, x1)` of row `y`, clipped to the buffer
    fn span(&mut self, y: usize, x0: f32, x1: f32, color: Rgb) {
        let start = x0.round().max(0.0) as usize;
        let end = (x1.round().max(0.0) as usize).min(self.width);
        if start >= end {
            return;
        }
        let row = y * self.width;
        self.pixels[row + start..row + end].fill(color);
    }

    /// Solid rectangle in logical coordinates
    pub fn fill_rect(&mut self, left: f32, top: f32, width: f32, height: f32, color: Rgb) {
        let x0 = left * self.scale_x;
        let x1 = (left + width) * self.scale_x;
        let y0 = (top * self.scale_y).round().max(0.0) as usize;
        let y1 = (((top + height) * self.scale_y).round().max(0.0) as usize).min(self.height);
        for y in y0..y1 {
            self.span(y, x0, x1, color);
        }
    }

    /// Blit visible sprites in ascending depth order
    pub fn draw_sprites<'a, I>(&mut self, sprites: I)
    where
        I: IntoIterator<Item = &'a Sprite>,
    {
        let mut visible: Vec<&Sprite> = sprites.into_iter().filter(|s| s.visible).collect();
        visible.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        for sprite in visible {
            let (left, top, width, height) = sprite.rect();
            self.fill_rect(left, top, width, height, sprite.texture.placeholder_color());
        }
    }
}

impl DrawSurface for FrameBuffer {
    fn clear(&mut self) {
        self.pixels.fill(self.clear_color);
    }

    fn fill_polygon(&mut self, points: &[ScreenPoint], color: Rgb) {
        if points.len() < 3 {
            return;
        }
        let pts: Vec<(f32, f32)> = points
            .iter()
            .map(|p| (p.x * self.scale_x, p.y * self.scale_y))
            .collect();

        let min_y = pts.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_y = pts.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
        if !min_y.is_finite() || !max_y.is_finite() {
            return;
        }
        let first_row = min_y.floor().max(0.0) as usize;
        let last_row = (max_y.ceil().max(0.0) as usize).min(self.height);

        let mut crossings: Vec<f32> = Vec::with_capacity(pts.len());
        for y in first_row..last_row {
            let sample_y = y as f32 + 0.5;
            crossings.clear();
            for i in 0..pts.len() {
                let (ax, ay) = pts[i];
                let (bx, by) = pts[(i + 1) % pts.len()];
                // Half-open rule so shared vertices count once
                if (ay <= sample_y && by > sample_y) || (by <= sample_y && ay > sample_y) {
                    let t = (sample_y - ay) / (by - ay);
                    crossings.push(ax + t * (bx - ax));
                }
            }
            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                self.span(y, pair[0], pair[1], color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SpriteKey;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLACK: Rgb = Rgb::new(0, 0, 0);

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<ScreenPoint> {
        vec![
            ScreenPoint::new(x0, y0),
            ScreenPoint::new(x1, y0),
            ScreenPoint::new(x1, y1),
            ScreenPoint::new(x0, y1),
        ]
    }

    #[test]
    fn test_fill_square() {
        let mut fb = FrameBuffer::new(10, 10, 10.0, 10.0, BLACK);
        fb.fill_polygon(&square(2.0, 2.0, 5.0, 5.0), RED);

        let filled = (0..10)
            .flat_map(|y| (0..10).map(move |x| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y) == Some(RED))
            .count();
        assert_eq!(filled, 9);
        assert_eq!(fb.pixel(2, 2), Some(RED));
        assert_eq!(fb.pixel(5, 5), Some(BLACK));
    }

    #[test]
    fn test_fill_clips_to_buffer() {
        let mut fb = FrameBuffer::new(8, 8, 8.0, 8.0, BLACK);
        fb.fill_polygon(&square(-100.0, -100.0, 100.0, 100.0), RED);
        assert!((0..8).all(|y| fb.row(y).iter().all(|&p| p == RED)));
    }

    #[test]
    fn test_trapezoid_narrows_toward_top() {
        let mut fb = FrameBuffer::new(20, 10, 20.0, 10.0, BLACK);
        let trapezoid = vec![
            ScreenPoint::new(0.0, 10.0),
            ScreenPoint::new(20.0, 10.0),
            ScreenPoint::new(12.0, 0.0),
            ScreenPoint::new(8.0, 0.0),
        ];
        fb.fill_polygon(&trapezoid, RED);

        let width = |y: usize| fb.row(y).iter().filter(|&&p| p == RED).count();
        assert!(width(0) < width(9));
        assert!(width(9) >= 18);
    }

    #[test]
    fn test_logical_scaling() {
        let mut fb = FrameBuffer::new(80, 60, 800.0, 600.0, BLACK);
        fb.fill_polygon(&square(0.0, 0.0, 400.0, 300.0), RED);
        assert_eq!(fb.pixel(39, 29), Some(RED));
        assert_eq!(fb.pixel(40, 30), Some(BLACK));
    }

    #[test]
    fn test_clear_and_degenerate_polygons() {
        let mut fb = FrameBuffer::new(4, 4, 4.0, 4.0, BLACK);
        fb.fill_polygon(&[ScreenPoint::new(0.0, 0.0), ScreenPoint::new(4.0, 4.0)], RED);
        assert!(fb.row(0).iter().all(|&p| p == BLACK));

        fb.fill_polygon(&square(0.0, 0.0, 4.0, 4.0), RED);
        fb.clear();
        assert_eq!(fb.pixel(1, 1), Some(BLACK));
    }

    #[test]
    fn test_sprites_drawn_by_depth() {
        let mut fb = FrameBuffer::new(100, 100, 100.0, 100.0, BLACK);
        let mut near = Sprite::new(SpriteKey::Stone);
        near.x = 50.0;
        near.y = 50.0;
        near.visible = true;
        near.depth = 10.0;
        let mut far = Sprite::new(SpriteKey::Tree);
        far.x = 50.0;
        far.y = 50.0;
        far.visible = true;
        far.depth = 1.0;
        let mut hidden = Sprite::new(SpriteKey::Sign);
        hidden.x = 10.0;
        hidden.y = 10.0;

        fb.draw_sprites([&near, &far, &hidden]);

        assert_eq!(fb.pixel(50, 50), Some(SpriteKey::Stone.placeholder_color()));
        assert_eq!(fb.pixel(10, 10), Some(BLACK));
    }
}
