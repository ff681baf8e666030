//! SGR color resolution
//!
//! Maps Select Graphic Rendition foreground codes to RGB. Only the subset the
//! effect catalog emits is understood: reset, 30-37, 90-97, `38;5;N` and
//! `38;2;R;G;B`. Anything else is skipped without touching the color.

use serde::{Deserialize, Serialize};

/// Color definition (RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }

    /// Linear blend towards `other`, `t` in 0.0..=1.0
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl Default for Rgb {
    fn default() -> Self {
        DEFAULT_FOREGROUND
    }
}

/// Foreground used before any SGR code and after a reset
pub const DEFAULT_FOREGROUND: Rgb = Rgb::WHITE;

const BASIC: [Rgb; 8] = [
    Rgb::new(0, 0, 0),
    Rgb::new(170, 0, 0),
    Rgb::new(0, 170, 0),
    Rgb::new(170, 85, 0),
    Rgb::new(0, 0, 170),
    Rgb::new(170, 0, 170),
    Rgb::new(0, 170, 170),
    Rgb::new(170, 170, 170),
];

const BRIGHT: [Rgb; 8] = [
    Rgb::new(85, 85, 85),
    Rgb::new(255, 85, 85),
    Rgb::new(85, 255, 85),
    Rgb::new(255, 255, 85),
    Rgb::new(85, 85, 255),
    Rgb::new(255, 85, 255),
    Rgb::new(85, 255, 255),
    Rgb::new(255, 255, 255),
];

/// Basic (0-7) or bright (8-15) table entry
pub fn basic_color(index: u8, bright: bool) -> Rgb {
    let table = if bright { &BRIGHT } else { &BASIC };
    table[(index % 8) as usize]
}

/// Convert an xterm 256-color palette index to RGB
pub fn xterm_to_rgb(n: u8) -> Rgb {
    match n {
        0..=15 => basic_color(n % 8, n >= 8),
        16..=231 => {
            let n = n - 16;
            let r = (n / 36) % 6;
            let g = (n / 6) % 6;
            let b = n % 6;
            Rgb::new(r * 51, g * 51, b * 51)
        }
        _ => {
            let gray = (n - 232) * 10 + 8;
            Rgb::new(gray, gray, gray)
        }
    }
}

/// Resolve a list of SGR parameters against the current color.
///
/// Never fails: malformed groups leave the color as it was.
pub fn resolve_sgr(codes: &[&str], current: Rgb) -> Rgb {
    // `ESC[m` is a reset
    if codes.iter().all(|c| c.is_empty()) {
        return DEFAULT_FOREGROUND;
    }

    let mut color = current;
    let mut i = 0;

    while i < codes.len() {
        let code = match codes[i].parse::<u16>() {
            Ok(code) => code,
            Err(_) => {
                i += 1;
                continue;
            }
        };

        match code {
            0 => {
                color = DEFAULT_FOREGROUND;
                i += 1;
            }
            30..=37 => {
                color = basic_color((code - 30) as u8, false);
                i += 1;
            }
            90..=97 => {
                color = basic_color((code - 90) as u8, true);
                i += 1;
            }
            38 => match codes.get(i + 1).and_then(|m| m.parse::<u16>().ok()) {
                Some(2) => {
                    if i + 4 >= codes.len() {
                        // Truncated truecolor: nothing after it can be trusted
                        break;
                    }
                    if let Some(rgb) = truecolor(&codes[i + 2..i + 5]) {
                        color = rgb;
                    }
                    i += 5;
                }
                Some(5) => {
                    if let Some(n) = codes.get(i + 2).and_then(|n| n.parse::<u8>().ok()) {
                        color = xterm_to_rgb(n);
                    }
                    i += 3;
                }
                _ => i += 2,
            },
            _ => i += 1,
        }
    }

    color
}

fn truecolor(components: &[&str]) -> Option<Rgb> {
    let mut out = [0u8; 3];
    for (slot, raw) in out.iter_mut().zip(components) {
        *slot = raw.parse::<u16>().ok()?.min(255) as u8;
    }
    Some(Rgb::new(out[0], out[1], out[2]))
}
