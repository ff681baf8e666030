//! Matrix: green code streams pour down every column while the art
//! resolves out of them, then the rain drains away

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::art::{layout, ArtChar, Canvas, FrameBuilder, Gradient, Paint};
use super::{EffectInput, Frame, FrameIter};
use crate::core::term::{xterm_to_rgb, Rgb};

const GRADIENT: Gradient = Gradient::new(&[Rgb::new(0x92, 0xbe, 0x92), Rgb::new(0x18, 0x5c, 0x18)]);
const STREAM_CHARS: &[char] = &[
    'ｱ', 'ｲ', 'ｳ', 'ｴ', 'ｵ', 'ｶ', 'ｷ', 'ｸ', 'ｹ', 'ｺ', 'ｻ', 'ｼ', 'ｽ', 'ｾ', 'ｿ', 'ﾀ', 'ﾁ', 'ﾂ',
    'ﾃ', 'ﾄ', 'ﾅ', 'ﾆ', 'ﾇ', 'ﾈ', 'ﾉ', '0', '1', '2', '3', '4', '5', '7', '8', '9', 'Z', ':',
    '.', '=', '*', '+', '-', '<', '>', '|',
];
/// Trail colors, dimmest first
const TRAIL: [u8; 5] = [22, 28, 34, 40, 46];
const HEAD: Rgb = Rgb::new(0xdd, 0xff, 0xdd);
const RESOLVED: u8 = 46;
const RAIN_FRAMES: usize = 150;
const RESOLVE_START: usize = 30;
/// Stream glyphs change this often
const GLYPH_HOLD: usize = 3;
const FADE_FRAMES: usize = 12;
const HOLD_FRAMES: usize = 40;

pub fn build(input: EffectInput<'_>) -> FrameIter {
    let mut rng = StdRng::seed_from_u64(input.seed);
    let canvas = input.canvas;
    let height = canvas.height.max(1) as usize;

    let mut streams = Vec::new();
    for col in 0..canvas.width {
        let mut cursor = rng.gen_range(0..40);
        while cursor < RAIN_FRAMES {
            let length = rng.gen_range(3..=(height / 2).max(3)) as u16;
            let period = rng.gen_range(1..=2);
            streams.push(Stream {
                col,
                start: cursor,
                period,
                length,
            });
            cursor += length as usize * period + rng.gen_range(5..30);
        }
    }

    let art: Vec<(ArtChar, usize)> = layout(input.text, canvas, &GRADIENT)
        .into_iter()
        .map(|c| (c, rng.gen_range(RESOLVE_START..RAIN_FRAMES)))
        .collect();

    let drained_at = streams
        .iter()
        .map(|s| s.finished_at(canvas))
        .max()
        .unwrap_or(0)
        .max(RAIN_FRAMES);

    Box::new(Matrix {
        canvas,
        streams,
        art,
        drained_at,
        frame: 0,
    })
}

struct Stream {
    col: u16,
    start: usize,
    /// Frames per row of descent
    period: usize,
    length: u16,
}

impl Stream {
    fn head(&self, t: usize) -> Option<i32> {
        (t >= self.start).then(|| ((t - self.start) / self.period) as i32)
    }

    fn finished_at(&self, canvas: Canvas) -> usize {
        self.start + (canvas.height as usize + self.length as usize) * self.period
    }
}

struct Matrix {
    canvas: Canvas,
    streams: Vec<Stream>,
    /// Art characters with the frame they resolve on
    art: Vec<(ArtChar, usize)>,
    drained_at: usize,
    frame: usize,
}

impl Matrix {
    fn glyph(&self, row: i32, col: u16) -> char {
        let k = (col as usize)
            .wrapping_mul(7919)
            .wrapping_add((row as usize).wrapping_mul(104_729))
            .wrapping_add(self.frame / GLYPH_HOLD);
        STREAM_CHARS[k % STREAM_CHARS.len()]
    }
}

impl Iterator for Matrix {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.frame >= self.drained_at + FADE_FRAMES + HOLD_FRAMES {
            return None;
        }

        let t = self.frame;
        let mut out = FrameBuilder::new();
        for stream in &self.streams {
            let Some(head) = stream.head(t) else { continue };
            let length = stream.length as i32;
            for dist in 0..length {
                let row = head - dist;
                let paint = if dist == 0 {
                    Paint::Rgb(HEAD)
                } else {
                    let shade = (TRAIL.len() - 1) - (dist as usize * TRAIL.len() / length as usize).min(TRAIL.len() - 1);
                    Paint::Xterm(TRAIL[shade])
                };
                out.put_clipped(self.canvas, row, stream.col as i32, self.glyph(row, stream.col), paint);
            }
        }

        let resolved = xterm_to_rgb(RESOLVED);
        for (c, resolve_at) in &self.art {
            if t < *resolve_at {
                continue;
            }
            let color = if t >= self.drained_at {
                resolved.lerp(c.final_color, (t - self.drained_at) as f32 / FADE_FRAMES as f32)
            } else {
                resolved
            };
            out.put(c.row, c.col, c.ch, Paint::Rgb(color));
        }

        self.frame += 1;
        Some(out.finish())
    }
}
