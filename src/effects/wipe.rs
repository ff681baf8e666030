//! Wipe: the art is revealed along a diagonal sweeping from the top-left

use super::art::{layout, ArtChar, FrameBuilder, Gradient, Paint};
use super::{EffectInput, Frame, FrameIter};
use crate::core::term::Rgb;

const GRADIENT: Gradient = Gradient::new(&[Rgb::new(0x83, 0x38, 0xe0), Rgb::new(0xfe, 0x8a, 0x52)]);
const EDGE: Rgb = Rgb::new(0xff, 0xff, 0xff);
const SWEEP_FRAMES: usize = 60;
const FADE_FRAMES: usize = 10;
const HOLD_FRAMES: usize = 40;

pub fn build(input: EffectInput<'_>) -> FrameIter {
    let chars = layout(input.text, input.canvas, &GRADIENT);
    let origin = chars
        .iter()
        .map(|c| c.row as usize + c.col as usize)
        .min()
        .unwrap_or(0);
    let span = chars
        .iter()
        .map(|c| c.row as usize + c.col as usize - origin)
        .max()
        .unwrap_or(0);
    let per_frame = (span / SWEEP_FRAMES).max(1);

    let plans = chars
        .into_iter()
        .map(|c| {
            let revealed_at = (c.row as usize + c.col as usize - origin) / per_frame;
            (c, revealed_at)
        })
        .collect();

    Box::new(Wipe {
        plans,
        total: span / per_frame + 1 + FADE_FRAMES + HOLD_FRAMES,
        frame: 0,
    })
}

struct Wipe {
    /// Characters with the frame the sweep reaches them
    plans: Vec<(ArtChar, usize)>,
    total: usize,
    frame: usize,
}

impl Iterator for Wipe {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.frame >= self.total {
            return None;
        }

        let t = self.frame;
        let mut out = FrameBuilder::new();
        for (c, revealed_at) in &self.plans {
            if t < *revealed_at {
                continue;
            }
            let progress = (t - revealed_at) as f32 / FADE_FRAMES as f32;
            out.put(c.row, c.col, c.ch, Paint::Rgb(EDGE.lerp(c.final_color, progress)));
        }

        self.frame += 1;
        Some(out.finish())
    }
}
