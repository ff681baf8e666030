//! Escape sequence interpreter
//!
//! Turns one escape-coded frame into a sparse [`CellMap`]. Only absolute
//! cursor positioning (`CSI row;col H`), SGR foreground color (`CSI ... m`),
//! newline and carriage return have an effect; every other CSI sequence is
//! consumed and ignored.

use unicode_width::UnicodeWidthChar;

use super::color::{resolve_sgr, Rgb, DEFAULT_FOREGROUND};
use super::grid::{CellContent, CellMap, Position};

/// Parser state machine
#[derive(Clone, Copy, Default, PartialEq, Debug)]
enum ParserState {
    #[default]
    Ground,
    Escape,
    Csi,
}

/// Interprets frames for a fixed canvas size
pub struct EscapeInterpreter {
    width: u16,
    height: u16,
    state: ParserState,
    /// Raw parameter bytes of the CSI sequence being read
    params: String,
    /// An intermediate byte (0x20-0x2F) was seen in the current CSI
    has_intermediate: bool,
    /// Signed: `CSI 0;0 H` puts the cursor one step off the canvas
    cursor_row: i64,
    cursor_col: i64,
    color: Rgb,
    cells: CellMap,
}

impl EscapeInterpreter {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            state: ParserState::Ground,
            params: String::with_capacity(16),
            has_intermediate: false,
            cursor_row: 0,
            cursor_col: 0,
            color: DEFAULT_FOREGROUND,
            cells: CellMap::new(),
        }
    }

    /// Parse one frame. Cursor and color start fresh for every frame.
    pub fn parse(&mut self, frame: &str) -> CellMap {
        self.reset();
        for ch in frame.chars() {
            self.feed(ch);
        }
        // A sequence still open here was truncated; drop it
        self.state = ParserState::Ground;
        std::mem::take(&mut self.cells)
    }

    fn reset(&mut self) {
        self.state = ParserState::Ground;
        self.params.clear();
        self.has_intermediate = false;
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.color = DEFAULT_FOREGROUND;
        self.cells.clear();
    }

    /// Feed a single character
    fn feed(&mut self, ch: char) {
        match self.state {
            ParserState::Ground => self.ground(ch),
            ParserState::Escape => self.escape(ch),
            ParserState::Csi => self.csi(ch),
        }
    }

    fn ground(&mut self, ch: char) {
        match ch {
            '\x1b' => self.state = ParserState::Escape,
            '\n' => {
                self.cursor_row = self.cursor_row.saturating_add(1);
                self.cursor_col = 0;
            }
            '\r' => self.cursor_col = 0,
            // Other controls occupy a column but draw nothing
            c if c.is_control() => self.cursor_col = self.cursor_col.saturating_add(1),
            c => self.put_char(c),
        }
    }

    fn escape(&mut self, ch: char) {
        if ch == '[' {
            self.state = ParserState::Csi;
            self.params.clear();
            self.has_intermediate = false;
        } else {
            // Lone ESC: drop it and treat the next char normally
            self.state = ParserState::Ground;
            self.ground(ch);
        }
    }

    fn csi(&mut self, ch: char) {
        match ch {
            '\x30'..='\x3f' => self.params.push(ch),
            '\x20'..='\x2f' => self.has_intermediate = true,
            '\x40'..='\x7e' => {
                self.execute_csi(ch);
                self.state = ParserState::Ground;
            }
            '\x1b' => self.state = ParserState::Escape,
            _ => {
                // Not part of a CSI; abandon the sequence
                self.state = ParserState::Ground;
                self.ground(ch);
            }
        }
    }

    fn execute_csi(&mut self, final_char: char) {
        match (self.has_intermediate, final_char) {
            (false, 'H') => {
                if let Some((row, col)) = two_numeric_params(&self.params) {
                    self.cursor_row = row - 1;
                    self.cursor_col = col - 1;
                }
            }
            (false, 'm') => {
                if self.params.bytes().all(|b| b.is_ascii_digit() || b == b';') {
                    let codes: Vec<&str> = self.params.split(';').collect();
                    self.color = resolve_sgr(&codes, self.color);
                }
            }
            _ => {
                tracing::trace!("Skipped CSI: params={:?}, final={:?}", self.params, final_char);
            }
        }
    }

    fn put_char(&mut self, ch: char) {
        // Combining marks have no cell of their own
        if ch.width() == Some(0) {
            return;
        }

        let on_canvas = (0..i64::from(self.height)).contains(&self.cursor_row)
            && (0..i64::from(self.width)).contains(&self.cursor_col);
        if ch != ' ' && on_canvas {
            self.cells.insert(
                Position::new(self.cursor_row as u16, self.cursor_col as u16),
                CellContent::new(ch, self.color),
            );
        }

        self.cursor_col = self.cursor_col.saturating_add(1);
    }
}

fn two_numeric_params(params: &str) -> Option<(i64, i64)> {
    let mut parts = params.split(';');
    let row = saturating_number(parts.next()?)?;
    let col = saturating_number(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((row, col))
}

/// Decimal digits, saturating at `i64::MAX` so huge coordinates land off-canvas
fn saturating_number(digits: &str) -> Option<i64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    }))
}

/// Parse a frame with a throwaway interpreter
#[allow(dead_code)]
pub fn parse_frame(frame: &str, width: u16, height: u16) -> CellMap {
    EscapeInterpreter::new(width, height).parse(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(map: &CellMap, row: u16, col: u16) -> Option<CellContent> {
        map.get(&Position::new(row, col)).copied()
    }

    #[test]
    fn test_cursor_positioning_round_trip() {
        let map = parse_frame("\x1b[2;3HA\x1b[2;4HB", 80, 24);

        assert_eq!(map.len(), 2);
        assert_eq!(at(&map, 1, 2), Some(CellContent::new('A', Rgb::WHITE)));
        assert_eq!(at(&map, 1, 3), Some(CellContent::new('B', Rgb::WHITE)));
    }

    #[test]
    fn test_cursor_moves_only_yield_nothing() {
        let map = parse_frame("\x1b[1;1H\x1b[5;10H\x1b[24;80H\x1b[2J\x1b[?25l", 80, 24);
        assert!(map.is_empty());
    }

    #[test]
    fn test_sgr_colors() {
        let map = parse_frame("\x1b[31mR\x1b[38;2;1;2;3mT\x1b[0mW", 80, 24);

        assert_eq!(at(&map, 0, 0).map(|c| c.color), Some(Rgb::new(170, 0, 0)));
        assert_eq!(at(&map, 0, 1).map(|c| c.color), Some(Rgb::new(1, 2, 3)));
        assert_eq!(at(&map, 0, 2).map(|c| c.color), Some(Rgb::WHITE));
    }

    #[test]
    fn test_spaces_advance_but_are_not_cells() {
        let map = parse_frame("a b", 80, 24);

        assert_eq!(map.len(), 2);
        assert!(at(&map, 0, 1).is_none());
        assert_eq!(at(&map, 0, 2).map(|c| c.ch), Some('b'));
    }

    #[test]
    fn test_newline_and_carriage_return() {
        let map = parse_frame("ab\ncd\rX", 80, 24);

        assert_eq!(at(&map, 0, 0).map(|c| c.ch), Some('a'));
        assert_eq!(at(&map, 1, 0).map(|c| c.ch), Some('X'));
        assert_eq!(at(&map, 1, 1).map(|c| c.ch), Some('d'));
    }

    #[test]
    fn test_out_of_bounds_dropped() {
        let map = parse_frame("\x1b[3;1Hx\x1b[1;5Hy\x1b[2;4Hz", 4, 2);

        assert_eq!(map.len(), 1);
        assert_eq!(at(&map, 1, 3).map(|c| c.ch), Some('z'));
    }

    #[test]
    fn test_unknown_sequences_skipped() {
        let map = parse_frame("\x1b[2J\x1b[?1049h\x1b[1 qA\x1b[KB", 80, 24);

        assert_eq!(map.len(), 2);
        assert_eq!(at(&map, 0, 0).map(|c| c.ch), Some('A'));
        assert_eq!(at(&map, 0, 1).map(|c| c.ch), Some('B'));
    }

    #[test]
    fn test_malformed_cursor_position_ignored() {
        let map = parse_frame("\x1b[5;6H\x1b[HA\x1b[7HB\x1b[1;2;3HC", 80, 24);

        assert_eq!(at(&map, 4, 5).map(|c| c.ch), Some('A'));
        assert_eq!(at(&map, 4, 6).map(|c| c.ch), Some('B'));
        assert_eq!(at(&map, 4, 7).map(|c| c.ch), Some('C'));
    }

    #[test]
    fn test_zero_coordinates_are_off_canvas() {
        assert!(parse_frame("\x1b[0;5HX", 80, 24).is_empty());

        // Column -1 swallows the first glyph, then the cursor walks back on
        let map = parse_frame("\x1b[3;0HAB", 80, 24);
        assert_eq!(map.len(), 1);
        assert_eq!(at(&map, 2, 0).map(|c| c.ch), Some('B'));
    }

    #[test]
    fn test_oversized_coordinates_are_off_canvas() {
        assert!(parse_frame("\x1b[2;2H\x1b[5000000000;1HX", 80, 24).is_empty());
        assert!(parse_frame("\x1b[1;99999999999999999999999HX", 80, 24).is_empty());
    }

    #[test]
    fn test_other_controls_advance_without_drawing() {
        let map = parse_frame("a\tb\x07c", 80, 24);

        assert_eq!(map.len(), 3);
        assert_eq!(at(&map, 0, 0).map(|c| c.ch), Some('a'));
        assert_eq!(at(&map, 0, 2).map(|c| c.ch), Some('b'));
        assert_eq!(at(&map, 0, 4).map(|c| c.ch), Some('c'));
    }

    #[test]
    fn test_truncated_sequence_at_end() {
        let map = parse_frame("A\x1b[38;2;1", 80, 24);
        assert_eq!(map.len(), 1);

        let map = parse_frame("A\x1b", 80, 24);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_lone_escape_dropped() {
        let map = parse_frame("\x1bXY", 80, 24);

        assert_eq!(at(&map, 0, 0).map(|c| c.ch), Some('X'));
        assert_eq!(at(&map, 0, 1).map(|c| c.ch), Some('Y'));
    }

    #[test]
    fn test_state_resets_between_frames() {
        let mut interp = EscapeInterpreter::new(10, 10);
        let first = interp.parse("\x1b[5;5H\x1b[31mA");
        let second = interp.parse("B");

        assert_eq!(at(&first, 4, 4).map(|c| c.color), Some(Rgb::new(170, 0, 0)));
        assert_eq!(at(&second, 0, 0), Some(CellContent::new('B', Rgb::WHITE)));
    }

    #[test]
    fn test_unicode_art_and_combining_marks() {
        let map = parse_frame("█╗e\u{301}x", 80, 24);

        assert_eq!(at(&map, 0, 0).map(|c| c.ch), Some('█'));
        assert_eq!(at(&map, 0, 1).map(|c| c.ch), Some('╗'));
        assert_eq!(at(&map, 0, 2).map(|c| c.ch), Some('e'));
        assert_eq!(at(&map, 0, 3).map(|c| c.ch), Some('x'));
    }

    #[test]
    fn test_later_write_overwrites() {
        let map = parse_frame("A\x1b[1;1HB", 80, 24);
        assert_eq!(at(&map, 0, 0).map(|c| c.ch), Some('B'));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn frame_piece() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u32..40, 0u32..40).prop_map(|(r, c)| format!("\x1b[{};{}H", r, c)),
            (0u8..=255).prop_map(|n| format!("\x1b[38;5;{}m", n)),
            Just("\x1b[0m".to_string()),
            Just("\x1b[2J".to_string()),
            Just("\n".to_string()),
            Just("\r".to_string()),
            "[ a-z█▓]{1,6}",
        ]
    }

    proptest! {
        #[test]
        fn cells_stay_in_bounds_and_are_never_blank(
            pieces in prop::collection::vec(frame_piece(), 0..30),
            width in 1u16..30,
            height in 1u16..30,
        ) {
            let frame: String = pieces.concat();
            let map = parse_frame(&frame, width, height);
            for (pos, content) in &map {
                prop_assert!(pos.row < height);
                prop_assert!(pos.col < width);
                prop_assert!(content.ch != ' ');
            }
        }

        #[test]
        fn cursor_only_frames_are_empty(
            moves in prop::collection::vec((1u32..100, 1u32..100), 0..20)
        ) {
            let frame: String = moves
                .iter()
                .map(|(r, c)| format!("\x1b[{};{}H", r, c))
                .collect();
            prop_assert!(parse_frame(&frame, 80, 24).is_empty());
        }
    }
}
