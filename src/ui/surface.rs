//! Display surfaces
//!
//! A surface is the thing monitors are carved out of. The terminal surface
//! lives in `renderer`; the pixel surface here draws into memory and backs
//! headless runs.

use std::io;

use super::glyph::{GlyphMetrics, GlyphRasterizer};
use crate::core::term::Rgb;

/// Drawing target for the coordinator
pub trait DisplaySurface {
    type Glyph;

    /// (width, height) in surface units
    fn size(&self) -> (u32, u32);

    /// Paint a rectangle with the background color
    fn clear_rect(&mut self, x: u32, y: u32, width: u32, height: u32, bg: Rgb);

    /// Draw a glyph with its top-left corner at (x, y)
    fn blit(&mut self, x: u32, y: u32, glyph: &Self::Glyph);

    /// Make everything drawn since the last present visible
    fn present(&mut self) -> io::Result<()>;
}

/// Rasterized glyph for the pixel surface; `None` pixels are transparent
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGlyph {
    pub width: u16,
    pub height: u16,
    pub pixels: Vec<Option<Rgb>>,
}

/// Block-shape rasterizer sized from a point size
#[derive(Debug, Clone)]
pub struct PixelRasterizer {
    metrics: GlyphMetrics,
}

impl PixelRasterizer {
    pub fn new(font_size: u16) -> Self {
        // ceil(0.6 * pt) by ceil(1.2 * pt), in integers
        let pt = font_size.max(1) as u32;
        Self {
            metrics: GlyphMetrics {
                width: ((pt * 3 + 4) / 5) as u16,
                height: ((pt * 6 + 4) / 5) as u16,
            },
        }
    }

    /// Whether the pixel at (x, y) of a cell is inked for `ch`
    fn covers(&self, ch: char, x: u16, y: u16) -> bool {
        let GlyphMetrics { width, height } = self.metrics;
        match ch {
            '█' => true,
            '▀' => y < height / 2,
            '▄' => y >= height / 2,
            '▌' => x < width / 2,
            '▐' => x >= width / 2,
            '░' => (x + y) % 4 == 0,
            '▒' => (x + y) % 2 == 0,
            '▓' => (x + y) % 4 != 0,
            // Anything else is drawn as a box with a one pixel margin
            _ => x > 0 && y > 0 && x + 1 < width && y + 1 < height,
        }
    }
}

impl GlyphRasterizer for PixelRasterizer {
    type Glyph = PixelGlyph;

    fn metrics(&self) -> GlyphMetrics {
        self.metrics
    }

    fn rasterize(&self, ch: char, color: Rgb) -> PixelGlyph {
        let GlyphMetrics { width, height } = self.metrics;
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(self.covers(ch, x, y).then_some(color));
            }
        }
        PixelGlyph { width, height, pixels }
    }
}

/// In-memory RGB frame buffer
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
    presents: u64,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
            presents: 0,
        }
    }

    #[allow(dead_code)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Number of completed presents
    pub fn presents(&self) -> u64 {
        self.presents
    }

    fn set(&mut self, x: u32, y: u32, color: Rgb) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }
}

impl DisplaySurface for PixelSurface {
    type Glyph = PixelGlyph;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: u32, y: u32, width: u32, height: u32, bg: Rgb) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                self.pixels[(py * self.width + px) as usize] = bg;
            }
        }
    }

    fn blit(&mut self, x: u32, y: u32, glyph: &PixelGlyph) {
        let gw = glyph.width as u32;
        for (i, pixel) in glyph.pixels.iter().enumerate() {
            if let Some(color) = pixel {
                let i = i as u32;
                self.set(x.saturating_add(i % gw), y.saturating_add(i / gw), *color);
            }
        }
    }

    fn present(&mut self) -> io::Result<()> {
        self.presents += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(200, 0, 0);

    #[test]
    fn test_metrics_from_point_size() {
        assert_eq!(PixelRasterizer::new(18).metrics(), GlyphMetrics { width: 11, height: 22 });
        assert_eq!(PixelRasterizer::new(10).metrics(), GlyphMetrics { width: 6, height: 12 });
        assert_eq!(PixelRasterizer::new(0).metrics(), GlyphMetrics { width: 1, height: 2 });
    }

    #[test]
    fn test_full_block_is_solid() {
        let glyph = PixelRasterizer::new(10).rasterize('█', RED);
        assert!(glyph.pixels.iter().all(|p| *p == Some(RED)));
    }

    #[test]
    fn test_blit_and_clear() {
        let mut surface = PixelSurface::new(20, 20, Rgb::BLACK);
        let glyph = PixelRasterizer::new(10).rasterize('▀', RED);

        surface.blit(2, 3, &glyph);
        assert_eq!(surface.pixel(2, 3), Some(RED));
        assert_eq!(surface.pixel(2, 3 + 11), Some(Rgb::BLACK));

        surface.clear_rect(0, 0, 20, 20, Rgb::BLACK);
        assert_eq!(surface.pixel(2, 3), Some(Rgb::BLACK));
    }

    #[test]
    fn test_blit_clips_at_edges() {
        let mut surface = PixelSurface::new(4, 4, Rgb::BLACK);
        let glyph = PixelRasterizer::new(10).rasterize('█', RED);
        surface.blit(2, 2, &glyph);

        assert_eq!(surface.pixel(3, 3), Some(RED));
        assert_eq!(surface.pixel(4, 4), None);
        surface.clear_rect(3, 3, 100, 100, Rgb::WHITE);
        assert_eq!(surface.pixel(3, 3), Some(Rgb::WHITE));
    }
}
