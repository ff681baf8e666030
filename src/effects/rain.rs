//! Rain: characters fall from the top of the canvas and land in place

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::art::{layout, ArtChar, FrameBuilder, Gradient, Paint};
use super::{EffectInput, Frame, FrameIter};
use crate::core::term::{xterm_to_rgb, Rgb};

const GRADIENT: Gradient = Gradient::new(&[Rgb::new(0x48, 0x8b, 0xff), Rgb::new(0xff, 0xff, 0xff)]);
const DROP_SYMBOLS: &[char] = &['o', '.', ',', '*', '|'];
const DROP_BLUES: &[u8] = &[39, 45, 51, 117, 153];
const BASE_SPREAD: usize = 60;
const FADE_FRAMES: usize = 8;
const HOLD_FRAMES: usize = 40;

pub fn build(input: EffectInput<'_>) -> FrameIter {
    let mut rng = StdRng::seed_from_u64(input.seed);
    let chars = layout(input.text, input.canvas, &GRADIENT);
    let spread = BASE_SPREAD + chars.len() / 4;

    let drops: Vec<Raindrop> = chars
        .into_iter()
        .map(|art| Raindrop {
            art,
            start: rng.gen_range(0..spread),
            symbol: *DROP_SYMBOLS.choose(&mut rng).unwrap_or(&'|'),
            tint: *DROP_BLUES.choose(&mut rng).unwrap_or(&45),
        })
        .collect();
    let total = drops.iter().map(Raindrop::landed_at).max().unwrap_or(0) + FADE_FRAMES + HOLD_FRAMES;

    Box::new(Rain {
        drops,
        frame: 0,
        total,
    })
}

struct Raindrop {
    art: ArtChar,
    start: usize,
    symbol: char,
    tint: u8,
}

impl Raindrop {
    /// Falls one row per frame from row 0
    fn landed_at(&self) -> usize {
        self.start + self.art.row as usize
    }
}

struct Rain {
    drops: Vec<Raindrop>,
    frame: usize,
    total: usize,
}

impl Iterator for Rain {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.frame >= self.total {
            return None;
        }

        let t = self.frame;
        let mut out = FrameBuilder::new();
        for drop in &self.drops {
            if t < drop.start {
                continue;
            }
            let art = &drop.art;
            let landed = drop.landed_at();
            if t < landed {
                let row = (t - drop.start) as u16;
                out.put(row, art.col, drop.symbol, Paint::Xterm(drop.tint));
            } else {
                let progress = (t - landed) as f32 / FADE_FRAMES as f32;
                let color = xterm_to_rgb(drop.tint).lerp(art.final_color, progress);
                out.put(art.row, art.col, art.ch, Paint::Rgb(color));
            }
        }

        self.frame += 1;
        Some(out.finish())
    }
}
