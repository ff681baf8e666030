//! Sparse cell model
//!
//! A parsed frame is a map from grid position to the glyph drawn there.
//! Blank positions are simply absent.

use std::collections::HashMap;

use super::color::Rgb;

/// Zero-indexed grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: u16,
    pub col: u16,
}

impl Position {
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

/// What occupies a non-blank position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellContent {
    pub ch: char,
    pub color: Rgb,
}

impl CellContent {
    pub const fn new(ch: char, color: Rgb) -> Self {
        Self { ch, color }
    }
}

/// One parsed frame
pub type CellMap = HashMap<Position, CellContent>;
