//! Slide: rows glide in from alternating sides of the canvas

use std::collections::BTreeMap;

use super::art::{layout, ArtChar, Canvas, FrameBuilder, Gradient, Paint};
use super::{EffectInput, Frame, FrameIter};
use crate::core::term::Rgb;

const GRADIENT: Gradient = Gradient::new(&[Rgb::new(0x83, 0x38, 0xe0), Rgb::new(0x22, 0xc1, 0xc3)]);
const TRAIL_COLOR: Rgb = Rgb::new(0x30, 0x30, 0x30);
const ROW_GAP: usize = 3;
const SLIDE_FRAMES: usize = 30;
const HOLD_FRAMES: usize = 40;

pub fn build(input: EffectInput<'_>) -> FrameIter {
    let canvas = input.canvas;
    let mut rows: BTreeMap<u16, Vec<ArtChar>> = BTreeMap::new();
    for c in layout(input.text, canvas, &GRADIENT) {
        rows.entry(c.row).or_default().push(c);
    }

    let distance = canvas.width.max(1) as usize;
    let speed = (distance / SLIDE_FRAMES).max(1);
    let rows: Vec<Row> = rows
        .into_values()
        .enumerate()
        .map(|(i, chars)| Row {
            chars,
            start: i * ROW_GAP,
            from_left: i % 2 == 0,
        })
        .collect();
    let last_start = rows.last().map(|r| r.start).unwrap_or(0);

    Box::new(Slide {
        canvas,
        rows,
        distance,
        speed,
        total: last_start + (distance + speed - 1) / speed + 1 + HOLD_FRAMES,
        frame: 0,
    })
}

struct Row {
    chars: Vec<ArtChar>,
    start: usize,
    from_left: bool,
}

struct Slide {
    canvas: Canvas,
    rows: Vec<Row>,
    distance: usize,
    /// Columns moved per frame
    speed: usize,
    total: usize,
    frame: usize,
}

impl Iterator for Slide {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.frame >= self.total {
            return None;
        }

        let t = self.frame;
        let mut out = FrameBuilder::new();
        for row in &self.rows {
            if t < row.start {
                continue;
            }
            let remaining = self.distance.saturating_sub((t - row.start) * self.speed);
            let progress = 1.0 - remaining as f32 / self.distance as f32;
            let shift = if row.from_left {
                -(remaining as i32)
            } else {
                remaining as i32
            };
            for c in &row.chars {
                let paint = Paint::Rgb(TRAIL_COLOR.lerp(c.final_color, progress));
                out.put_clipped(self.canvas, c.row as i32, c.col as i32 + shift, c.ch, paint);
            }
        }

        self.frame += 1;
        Some(out.finish())
    }
}
