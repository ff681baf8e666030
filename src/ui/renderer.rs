//! Terminal surface using crossterm
//!
//! The host terminal is the display: one surface unit is one character cell.
//! Draw calls are queued into a byte buffer and written out in one
//! synchronized update per present.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};

use super::glyph::{GlyphMetrics, GlyphRasterizer};
use super::surface::DisplaySurface;
use crate::core::term::Rgb;

/// Pre-encoded commands that print one colored character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalGlyph(Vec<u8>);

impl TerminalGlyph {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// One cell per character
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRasterizer;

impl GlyphRasterizer for TerminalRasterizer {
    type Glyph = TerminalGlyph;

    fn metrics(&self) -> GlyphMetrics {
        GlyphMetrics { width: 1, height: 1 }
    }

    fn rasterize(&self, ch: char, color: Rgb) -> TerminalGlyph {
        let mut bytes = Vec::with_capacity(24);
        // Writing into a Vec cannot fail
        let _ = queue!(bytes, SetForegroundColor(color.to_crossterm()), Print(ch));
        TerminalGlyph(bytes)
    }
}

/// The host terminal as a display surface
pub struct TerminalSurface {
    background: Rgb,
    /// Commands queued since the last present
    buffer: Vec<u8>,
    cols: u16,
    rows: u16,
    /// Whether the terminal has been initialized
    initialized: bool,
    alternate_screen: bool,
}

impl TerminalSurface {
    /// Surface sized to the current terminal
    pub fn new(background: Rgb) -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Self::with_size(cols, rows, background))
    }

    /// Surface of a fixed size; nothing touches the terminal until `init`
    pub fn with_size(cols: u16, rows: u16, background: Rgb) -> Self {
        Self {
            background,
            buffer: Vec::with_capacity(65536),
            cols,
            rows,
            initialized: false,
            alternate_screen: true,
        }
    }

    /// Take over the terminal. `alternate_screen = false` draws over the
    /// current screen instead (windowed mode).
    pub fn init(&mut self, alternate_screen: bool) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.initialized = true;
        self.alternate_screen = alternate_screen;

        let mut stdout = io::stdout();
        if alternate_screen {
            execute!(stdout, EnterAlternateScreen)?;
        }
        execute!(
            stdout,
            crossterm::event::EnableMouseCapture,
            DisableLineWrap,
            Hide,
            SetBackgroundColor(self.background.to_crossterm()),
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        stdout.flush()?;

        tracing::info!(
            "Terminal initialized: {}x{}, alternate_screen={}",
            self.cols,
            self.rows,
            alternate_screen
        );
        Ok(())
    }

    /// Give the terminal back
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;

        let mut stdout = io::stdout();

        // Reset all attributes first
        let _ = execute!(stdout, ResetColor, SetAttribute(Attribute::Reset));
        if !self.alternate_screen {
            let _ = execute!(stdout, Clear(ClearType::All), MoveTo(0, 0));
        }
        let _ = execute!(stdout, Show, EnableLineWrap, crossterm::event::DisableMouseCapture);
        if self.alternate_screen {
            let _ = execute!(stdout, LeaveAlternateScreen);
        }
        let _ = stdout.flush();

        // Disable raw mode - this is the most important part
        terminal::disable_raw_mode()?;
        tracing::info!("Terminal restored");
        Ok(())
    }

    /// Bytes queued for the next present
    #[allow(dead_code)]
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }
}

impl DisplaySurface for TerminalSurface {
    type Glyph = TerminalGlyph;

    fn size(&self) -> (u32, u32) {
        (self.cols as u32, self.rows as u32)
    }

    fn clear_rect(&mut self, x: u32, y: u32, width: u32, height: u32, bg: Rgb) {
        let x_end = x.saturating_add(width).min(self.cols as u32);
        let y_end = y.saturating_add(height).min(self.rows as u32);
        if x >= x_end {
            return;
        }
        let blanks = " ".repeat((x_end - x) as usize);
        let _ = queue!(self.buffer, SetBackgroundColor(bg.to_crossterm()));
        for row in y..y_end {
            let _ = queue!(self.buffer, MoveTo(x as u16, row as u16), Print(&blanks));
        }
    }

    fn blit(&mut self, x: u32, y: u32, glyph: &TerminalGlyph) {
        if x >= self.cols as u32 || y >= self.rows as u32 {
            return;
        }
        let _ = queue!(self.buffer, MoveTo(x as u16, y as u16));
        self.buffer.extend_from_slice(glyph.as_bytes());
    }

    fn present(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        // Use a buffered writer for better performance
        let stdout = io::stdout();
        let mut stdout = io::BufWriter::with_capacity(65536, stdout.lock());

        // Synchronized update (reduces flicker)
        write!(stdout, "\x1b[?2026h")?;
        stdout.write_all(&self.buffer)?;
        write!(stdout, "\x1b[?2026l")?;
        stdout.flush()?;

        self.buffer.clear();
        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
