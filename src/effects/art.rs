//! Shared building blocks for effects
//!
//! Art layout (text anchored at the canvas center), color gradients, and a
//! frame writer that emits the escape subset the interpreter understands.

use std::fmt::Write as _;

use unicode_width::UnicodeWidthChar;

use crate::core::term::Rgb;

/// Character grid an effect renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u16,
    pub height: u16,
}

impl Canvas {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && row < self.height as i32 && col < self.width as i32
    }
}

/// One visible character of the art at its resting place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtChar {
    pub ch: char,
    pub row: u16,
    pub col: u16,
    pub final_color: Rgb,
}

/// Multi-stop linear gradient
#[derive(Debug, Clone, Copy)]
pub struct Gradient {
    pub stops: &'static [Rgb],
}

impl Gradient {
    pub const fn new(stops: &'static [Rgb]) -> Self {
        Self { stops }
    }

    /// Color at `t` in 0.0..=1.0
    pub fn at(&self, t: f32) -> Rgb {
        match self.stops.len() {
            0 => Rgb::WHITE,
            1 => self.stops[0],
            n => {
                let scaled = t.clamp(0.0, 1.0) * (n - 1) as f32;
                let idx = (scaled.floor() as usize).min(n - 2);
                self.stops[idx].lerp(self.stops[idx + 1], scaled - idx as f32)
            }
        }
    }
}

/// Lay the art out centered in the canvas.
///
/// Spaces are dropped; characters that fall outside the canvas are dropped.
/// Final colors follow `gradient` along the diagonal of the art's bounding box.
pub fn layout(text: &str, canvas: Canvas, gradient: &Gradient) -> Vec<ArtChar> {
    let lines: Vec<&str> = text.lines().collect();
    let art_height = lines.len();
    let art_width = lines
        .iter()
        .map(|line| line.chars().map(|c| c.width().unwrap_or(0)).sum::<usize>())
        .max()
        .unwrap_or(0);

    let top = (canvas.height as i32 - art_height as i32) / 2;
    let left = (canvas.width as i32 - art_width as i32) / 2;
    let span = (art_width + art_height).max(2) as f32 - 2.0;

    let mut chars = Vec::new();
    for (line_idx, line) in lines.iter().enumerate() {
        let mut col = 0usize;
        for ch in line.chars() {
            let width = ch.width().unwrap_or(0);
            if width == 0 {
                continue;
            }
            let row = top + line_idx as i32;
            let abs_col = left + col as i32;
            if ch != ' ' && canvas.contains(row, abs_col) {
                let t = if span > 0.0 { (line_idx + col) as f32 / span } else { 0.0 };
                chars.push(ArtChar {
                    ch,
                    row: row as u16,
                    col: abs_col as u16,
                    final_color: gradient.at(t),
                });
            }
            col += width;
        }
    }
    chars
}

/// How a glyph's color is written on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Rgb(Rgb),
    /// `38;5;N`
    Xterm(u8),
    /// `30+N`
    Basic(u8),
    /// `90+N`
    Bright(u8),
}

/// Accumulates one escape-coded frame
pub struct FrameBuilder {
    buf: String,
    last_paint: Option<Paint>,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(1024),
            last_paint: None,
        }
    }

    /// Place `ch` at a zero-indexed position
    pub fn put(&mut self, row: u16, col: u16, ch: char, paint: Paint) {
        let _ = write!(self.buf, "\x1b[{};{}H", row as u32 + 1, col as u32 + 1);
        if self.last_paint != Some(paint) {
            let _ = match paint {
                Paint::Rgb(c) => write!(self.buf, "\x1b[38;2;{};{};{}m", c.r, c.g, c.b),
                Paint::Xterm(n) => write!(self.buf, "\x1b[38;5;{}m", n),
                Paint::Basic(n) => write!(self.buf, "\x1b[{}m", 30 + (n % 8) as u32),
                Paint::Bright(n) => write!(self.buf, "\x1b[{}m", 90 + (n % 8) as u32),
            };
            self.last_paint = Some(paint);
        }
        self.buf.push(ch);
    }

    /// Place `ch` if the (possibly negative) position is on the canvas
    pub fn put_clipped(&mut self, canvas: Canvas, row: i32, col: i32, ch: char, paint: Paint) {
        if canvas.contains(row, col) {
            self.put(row as u16, col as u16, ch, paint);
        }
    }

    pub fn put_art(&mut self, c: &ArtChar) {
        self.put(c.row, c.col, c.ch, Paint::Rgb(c.final_color));
    }

    pub fn finish(mut self) -> String {
        self.buf.push_str("\x1b[0m");
        self.buf
    }
}

/// The resting picture every effect ends on
pub fn final_frame(chars: &[ArtChar]) -> String {
    let mut frame = FrameBuilder::new();
    for c in chars {
        frame.put_art(c);
    }
    frame.finish()
}
