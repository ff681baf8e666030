//! Decrypt: ciphertext is typed in, scrambles for a while, then each
//! character settles into the plain art

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::art::{layout, ArtChar, FrameBuilder, Gradient, Paint};
use super::{EffectInput, Frame, FrameIter};
use crate::core::term::{xterm_to_rgb, Rgb};

const GRADIENT: Gradient = Gradient::new(&[Rgb::new(0xea, 0xe6, 0xe9), Rgb::new(0x00, 0x8a, 0xd6)]);
const CIPHER: &[char] = &[
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', '└', '┴',
    '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '█', '▄', '▌', '▐', '▀',
    '!', '#', '$', '%', '&', '*', '+', '<', '>', '?', '@', '0', '1', '7', 'X', 'Z',
];
const CIPHER_GREENS: [u8; 5] = [22, 28, 34, 40, 46];
const TYPING_FRAMES: usize = 40;
const DECRYPT_SPAN: usize = 90;
/// Scrambled glyphs are re-rolled this often
const SCRAMBLE_EVERY: usize = 2;
const FADE_FRAMES: usize = 10;
const HOLD_FRAMES: usize = 40;

pub fn build(input: EffectInput<'_>) -> FrameIter {
    let mut rng = StdRng::seed_from_u64(input.seed);
    let chars = layout(input.text, input.canvas, &GRADIENT);
    let per_frame = (chars.len() / TYPING_FRAMES).max(1);
    let typing_end = (chars.len() + per_frame - 1) / per_frame;

    let plans: Vec<Plan> = chars
        .into_iter()
        .enumerate()
        .map(|(i, art)| Plan {
            art,
            typed_at: i / per_frame,
            resolve_at: typing_end + rng.gen_range(0..DECRYPT_SPAN),
            glyph: random_glyph(&mut rng),
        })
        .collect();
    let total = plans.iter().map(|p| p.resolve_at).max().unwrap_or(0) + FADE_FRAMES + HOLD_FRAMES;

    Box::new(Decrypt {
        plans,
        rng,
        frame: 0,
        total,
    })
}

fn random_glyph(rng: &mut StdRng) -> (char, u8) {
    let ch = *CIPHER.choose(rng).unwrap_or(&'#');
    let green = *CIPHER_GREENS.choose(rng).unwrap_or(&46);
    (ch, green)
}

struct Plan {
    art: ArtChar,
    typed_at: usize,
    resolve_at: usize,
    /// Current scrambled glyph and its palette color
    glyph: (char, u8),
}

struct Decrypt {
    plans: Vec<Plan>,
    rng: StdRng,
    frame: usize,
    total: usize,
}

impl Iterator for Decrypt {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.frame >= self.total {
            return None;
        }

        let t = self.frame;
        let rescramble = t % SCRAMBLE_EVERY == 0;
        let mut out = FrameBuilder::new();
        for plan in &mut self.plans {
            if t < plan.typed_at {
                continue;
            }
            let art = &plan.art;
            if t >= plan.resolve_at {
                let flash = xterm_to_rgb(plan.glyph.1);
                let progress = (t - plan.resolve_at) as f32 / FADE_FRAMES as f32;
                out.put(art.row, art.col, art.ch, Paint::Rgb(flash.lerp(art.final_color, progress)));
            } else {
                if rescramble && t > plan.typed_at {
                    plan.glyph = random_glyph(&mut self.rng);
                }
                out.put(art.row, art.col, plan.glyph.0, Paint::Xterm(plan.glyph.1));
            }
        }

        self.frame += 1;
        Some(out.finish())
    }
}
