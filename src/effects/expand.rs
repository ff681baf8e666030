//! Expand: every character bursts out of the canvas center to its place

use super::art::{final_frame, layout, ArtChar, FrameBuilder, Gradient, Paint};
use super::{EffectInput, Frame, FrameIter};
use crate::core::term::Rgb;

const GRADIENT: Gradient = Gradient::new(&[
    Rgb::new(0x8a, 0x00, 0x8a),
    Rgb::new(0x00, 0xd1, 0xff),
    Rgb::new(0xff, 0xff, 0xff),
]);
const TRAVEL_FRAMES: usize = 60;
const HOLD_FRAMES: usize = 40;

pub fn build(input: EffectInput<'_>) -> FrameIter {
    Box::new(Expand {
        chars: layout(input.text, input.canvas, &GRADIENT),
        origin: (input.canvas.height / 2, input.canvas.width / 2),
        frame: 0,
    })
}

struct Expand {
    chars: Vec<ArtChar>,
    /// (row, col) every character starts from
    origin: (u16, u16),
    frame: usize,
}

/// Cubic ease-out
fn ease_out(x: f32) -> f32 {
    1.0 - (1.0 - x.clamp(0.0, 1.0)).powi(3)
}

fn towards(from: u16, to: u16, p: f32) -> u16 {
    (from as f32 + (to as f32 - from as f32) * p).round() as u16
}

impl Iterator for Expand {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.frame >= TRAVEL_FRAMES + HOLD_FRAMES {
            return None;
        }
        if self.frame + 1 >= TRAVEL_FRAMES {
            self.frame += 1;
            return Some(final_frame(&self.chars));
        }

        let p = ease_out(self.frame as f32 / (TRAVEL_FRAMES - 1) as f32);
        let mut out = FrameBuilder::new();
        for c in &self.chars {
            let row = towards(self.origin.0, c.row, p);
            let col = towards(self.origin.1, c.col, p);
            out.put(row, col, c.ch, Paint::Rgb(Rgb::WHITE.lerp(c.final_color, p)));
        }

        self.frame += 1;
        Some(out.finish())
    }
}
