//! Print: the art is typed out row by row behind a block cursor

use super::art::{layout, ArtChar, FrameBuilder, Gradient, Paint};
use super::{EffectInput, Frame, FrameIter};
use crate::core::term::Rgb;

const GRADIENT: Gradient = Gradient::new(&[
    Rgb::new(0x02, 0xb8, 0xbd),
    Rgb::new(0xc1, 0xf0, 0xe3),
    Rgb::new(0x00, 0xff, 0xa0),
]);
const CURSOR: char = '█';
const BLINK_FRAMES: usize = 8;
const TYPING_FRAMES: usize = 90;
const FADE_FRAMES: usize = 8;
const HOLD_FRAMES: usize = 40;

pub fn build(input: EffectInput<'_>) -> FrameIter {
    let chars = layout(input.text, input.canvas, &GRADIENT);
    let per_frame = (chars.len() / TYPING_FRAMES).max(1);
    Box::new(Print {
        chars,
        per_frame,
        frame: 0,
    })
}

struct Print {
    chars: Vec<ArtChar>,
    /// Characters typed per frame
    per_frame: usize,
    frame: usize,
}

impl Print {
    fn total_frames(&self) -> usize {
        (self.chars.len() + self.per_frame - 1) / self.per_frame + FADE_FRAMES + HOLD_FRAMES
    }
}

impl Iterator for Print {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.frame >= self.total_frames() {
            return None;
        }

        let revealed = ((self.frame + 1) * self.per_frame).min(self.chars.len());
        let mut out = FrameBuilder::new();
        for (i, c) in self.chars[..revealed].iter().enumerate() {
            let age = self.frame - i / self.per_frame;
            let color = Rgb::WHITE.lerp(c.final_color, age as f32 / FADE_FRAMES as f32);
            out.put(c.row, c.col, c.ch, Paint::Rgb(color));
        }
        if let Some(next) = self.chars.get(revealed) {
            // Blink between bright and plain white
            let paint = if (self.frame / BLINK_FRAMES) % 2 == 0 {
                Paint::Bright(7)
            } else {
                Paint::Basic(7)
            };
            out.put(next.row, next.col, CURSOR, paint);
        }

        self.frame += 1;
        Some(out.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::term::parse_frame;
    use crate::effects::Canvas;

    fn cursor_color(frame: &str) -> Option<Rgb> {
        parse_frame(frame, 40, 5)
            .values()
            .find(|cell| cell.ch == CURSOR)
            .map(|cell| cell.color)
    }

    #[test]
    fn test_cursor_blinks_through_basic_and_bright_white() {
        let input = EffectInput {
            text: "HELLO WORLD FROM TTSAVER",
            canvas: Canvas::new(40, 5),
            seed: 0,
        };
        let frames: Vec<Frame> = build(input).collect();

        assert!(frames[BLINK_FRAMES].contains("\x1b[37m"));
        assert_eq!(cursor_color(&frames[0]), Some(Rgb::WHITE));
        assert_eq!(cursor_color(&frames[BLINK_FRAMES]), Some(Rgb::new(170, 170, 170)));
        assert_eq!(cursor_color(frames.last().unwrap()), None);
    }
}
