//! Drawing: glyphs and the surfaces they land on.
//!
//! - **glyph**: Rasterizer trait and the `(char, color)` glyph cache
//! - **surface**: `DisplaySurface` trait and the in-memory pixel surface
//! - **renderer**: The host terminal as a surface (crossterm)

pub mod glyph;
pub mod renderer;
pub mod surface;

pub use glyph::{GlyphCache, GlyphCacheStats, GlyphMetrics, GlyphRasterizer, DEFAULT_CACHE_CAPACITY};
pub use renderer::{TerminalRasterizer, TerminalSurface};
pub use surface::{DisplaySurface, PixelRasterizer, PixelSurface};
