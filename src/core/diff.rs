//! Frame diffing
//!
//! Compares two sparse frames and yields only the work needed to turn the
//! previous one into the current one. Unchanged cells produce no operations.

use super::term::{CellContent, CellMap, Position};

/// A cell that must be (re)drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOp {
    pub pos: Position,
    pub content: CellContent,
    /// The position previously held different content and must be cleared first
    pub replaces: bool,
}

/// Operations to move the display from one frame to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameDiff {
    /// Positions to paint back to background
    pub clears: Vec<Position>,
    /// New or changed cells
    pub draws: Vec<DrawOp>,
}

impl FrameDiff {
    pub fn is_empty(&self) -> bool {
        self.clears.is_empty() && self.draws.is_empty()
    }
}

/// Compute the diff between two frames. Output is sorted row-major.
pub fn diff(prev: &CellMap, curr: &CellMap) -> FrameDiff {
    let mut clears: Vec<Position> = prev
        .keys()
        .filter(|pos| !curr.contains_key(pos))
        .copied()
        .collect();
    clears.sort_unstable();

    let mut draws: Vec<DrawOp> = curr
        .iter()
        .filter_map(|(&pos, &content)| match prev.get(&pos) {
            Some(old) if *old == content => None,
            old => Some(DrawOp {
                pos,
                content,
                replaces: old.is_some(),
            }),
        })
        .collect();
    draws.sort_unstable_by_key(|d| d.pos);

    FrameDiff { clears, draws }
}

/// Keeps the last frame so each new one can be diffed against it
#[derive(Debug, Default)]
pub struct FrameDiffer {
    prev: CellMap,
}

impl FrameDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `curr` against the retained frame, then retain `curr`
    pub fn apply(&mut self, curr: CellMap) -> FrameDiff {
        let diff = diff(&self.prev, &curr);
        self.prev = curr;
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::term::Rgb;

    const RED: Rgb = Rgb::new(170, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 170);

    fn map(cells: &[(u16, u16, char, Rgb)]) -> CellMap {
        cells
            .iter()
            .map(|&(r, c, ch, color)| (Position::new(r, c), CellContent::new(ch, color)))
            .collect()
    }

    #[test]
    fn test_self_diff_is_empty() {
        let frame = map(&[(0, 0, 'X', RED), (3, 7, 'Y', BLUE)]);
        assert!(diff(&frame, &frame).is_empty());
    }

    #[test]
    fn test_minimal_addition() {
        let prev = map(&[(0, 0, 'X', RED)]);
        let curr = map(&[(0, 0, 'X', RED), (0, 1, 'Y', BLUE)]);

        let d = diff(&prev, &curr);
        assert!(d.clears.is_empty());
        assert_eq!(
            d.draws,
            vec![DrawOp {
                pos: Position::new(0, 1),
                content: CellContent::new('Y', BLUE),
                replaces: false,
            }]
        );
    }

    #[test]
    fn test_removed_cells_are_cleared() {
        let prev = map(&[(0, 0, 'X', RED), (2, 2, 'Z', RED)]);
        let curr = map(&[(0, 0, 'X', RED)]);

        let d = diff(&prev, &curr);
        assert_eq!(d.clears, vec![Position::new(2, 2)]);
        assert!(d.draws.is_empty());
    }

    #[test]
    fn test_changed_cell_replaces() {
        let prev = map(&[(1, 1, 'X', RED)]);
        let recolored = map(&[(1, 1, 'X', BLUE)]);
        let rechared = map(&[(1, 1, 'Q', RED)]);

        for curr in [recolored, rechared] {
            let d = diff(&prev, &curr);
            assert!(d.clears.is_empty());
            assert_eq!(d.draws.len(), 1);
            assert!(d.draws[0].replaces);
        }
    }

    #[test]
    fn test_output_sorted_row_major() {
        let prev = CellMap::new();
        let curr = map(&[(2, 0, 'c', RED), (0, 5, 'b', RED), (0, 1, 'a', RED)]);

        let order: Vec<char> = diff(&prev, &curr).draws.iter().map(|d| d.content.ch).collect();
        assert_eq!(order, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_differ_retains_previous() {
        let mut differ = FrameDiffer::new();
        let first = map(&[(0, 0, 'A', RED)]);

        assert_eq!(differ.apply(first.clone()).draws.len(), 1);
        assert!(differ.apply(first).is_empty());

        let gone = differ.apply(CellMap::new());
        assert_eq!(gone.clears, vec![Position::new(0, 0)]);
        assert!(differ.apply(CellMap::new()).is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::core::term::Rgb;
    use proptest::prelude::*;

    fn cell_map_strategy() -> impl Strategy<Value = CellMap> {
        prop::collection::hash_map(
            (0u16..8, 0u16..8).prop_map(|(r, c)| Position::new(r, c)),
            (prop::char::range('a', 'e'), 0u8..3)
                .prop_map(|(ch, shade)| CellContent::new(ch, Rgb::new(shade * 100, 0, 0))),
            0..20,
        )
    }

    proptest! {
        #[test]
        fn diff_against_self_is_empty(frame in cell_map_strategy()) {
            prop_assert!(diff(&frame, &frame).is_empty());
        }

        #[test]
        fn applying_diff_reproduces_current(prev in cell_map_strategy(), curr in cell_map_strategy()) {
            let d = diff(&prev, &curr);
            let mut screen = prev.clone();
            for pos in &d.clears {
                screen.remove(pos);
            }
            for op in &d.draws {
                screen.insert(op.pos, op.content);
            }
            prop_assert_eq!(screen, curr);
        }
    }
}
