//! Escape-coded frame interpretation
//!
//! - **color**: SGR foreground codes to RGB
//! - **grid**: sparse cell model (`Position`, `CellContent`, `CellMap`)
//! - **parser**: frame string to `CellMap`

pub mod color;
pub mod grid;
pub mod parser;

pub use color::{xterm_to_rgb, Rgb};
pub use grid::{CellContent, CellMap, Position};
pub use parser::{parse_frame, EscapeInterpreter};
