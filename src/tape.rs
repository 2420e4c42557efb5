//! This module defines the immutable, effectively bi-infinite `Tape` used by every branch
//! of a nondeterministic simulation.

use crate::types::{Direction, Symbol};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single tape with a read/write head.
///
/// Tapes are values: [`Tape::write`] and [`Tape::move_head`] return a new tape and leave
/// the receiver untouched, so configurations on different branches never share mutable
/// state. Only the cells visited so far are materialized; moving off either end first
/// grows the materialized range by one blank cell.
///
/// Equality and hashing ignore blanks at the edges of the materialized range. Two tapes
/// are equal when they hold the same symbols around the same head position over the same
/// blank, no matter how far either has been extended.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<Symbol>,
    head: usize,
    blank: Symbol,
}

impl Tape {
    /// Creates a tape holding `input` with the head over its first symbol.
    ///
    /// An empty input materializes a single blank cell. The symbols are not checked
    /// against any alphabet.
    pub fn new(input: &str, blank: Symbol) -> Self {
        Self::from_symbols(input.chars(), blank)
    }

    /// Creates a tape from a sequence of symbols with the head over the first one.
    pub fn from_symbols(symbols: impl IntoIterator<Item = Symbol>, blank: Symbol) -> Self {
        let mut cells: Vec<Symbol> = symbols.into_iter().collect();
        if cells.is_empty() {
            cells.push(blank);
        }

        Self {
            cells,
            head: 0,
            blank,
        }
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> Symbol {
        self.cells.get(self.head).copied().unwrap_or(self.blank)
    }

    /// Returns a new tape with `symbol` written under the head.
    pub fn write(&self, symbol: Symbol) -> Self {
        let mut tape = self.clone();
        tape.cells[tape.head] = symbol;
        tape
    }

    /// Returns a new tape with the head moved one cell in `direction`.
    ///
    /// Leaving the materialized range prepends or appends exactly one blank cell.
    pub fn move_head(&self, direction: Direction) -> Self {
        if direction == Direction::Left && self.head == 0 {
            return self.extend_left();
        }

        let mut tape = self.clone();
        match direction {
            Direction::Left => tape.head -= 1,
            Direction::Right => {
                tape.head += 1;
                if tape.head >= tape.cells.len() {
                    tape.cells.push(tape.blank);
                }
            }
            Direction::Stay => {}
        }
        tape
    }

    /// Builds the tape one blank wider on the left, with the head over the new cell.
    ///
    /// The copy is written in a single pass with the blank already in front, so growing
    /// left costs no more than the copy every move makes anyway.
    fn extend_left(&self) -> Self {
        let mut cells = Vec::with_capacity(self.cells.len() + 1);
        cells.push(self.blank);
        cells.extend_from_slice(&self.cells);

        Self {
            cells,
            head: 0,
            blank: self.blank,
        }
    }

    /// Returns the materialized cells, leftmost first.
    pub fn symbols(&self) -> &[Symbol] {
        &self.cells
    }

    /// Returns the index of the head within [`Tape::symbols`].
    pub fn head(&self) -> usize {
        self.head
    }

    /// Returns the blank symbol used for extension.
    pub fn blank(&self) -> Symbol {
        self.blank
    }

    /// Returns the number of materialized cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// A tape always materializes at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the smallest window holding every non-blank cell and the head, together
    /// with the head offset inside it.
    fn window(&self) -> (&[Symbol], usize) {
        let first = self
            .cells
            .iter()
            .position(|&c| c != self.blank)
            .map_or(self.head, |i| i.min(self.head));
        let last = self
            .cells
            .iter()
            .rposition(|&c| c != self.blank)
            .map_or(self.head, |i| i.max(self.head));

        (&self.cells[first..=last], self.head - first)
    }
}

impl PartialEq for Tape {
    fn eq(&self, other: &Self) -> bool {
        self.blank == other.blank && self.window() == other.window()
    }
}

impl Eq for Tape {}

impl Hash for Tape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.blank.hash(state);
        self.window().hash(state);
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.cells.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_tape() {
        let tape = Tape::new("abc", '.');

        assert_eq!(tape.symbols(), &['a', 'b', 'c']);
        assert_eq!(tape.head(), 0);
        assert_eq!(tape.read(), 'a');
        assert_eq!(tape.blank(), '.');
    }

    #[test]
    fn test_empty_input_materializes_one_blank() {
        let tape = Tape::new("", '.');

        assert_eq!(tape.symbols(), &['.']);
        assert_eq!(tape.len(), 1);
        assert_eq!(tape.read(), '.');
    }

    #[test]
    fn test_write_leaves_original_untouched() {
        let tape = Tape::new("abc", '.');
        let written = tape.write('x');

        assert_eq!(written.read(), 'x');
        assert_eq!(written.head(), 0);
        assert_eq!(tape.read(), 'a');
    }

    #[test]
    fn test_move_right_extends() {
        let tape = Tape::new("ab", '.');
        let tape = tape.move_head(Direction::Right);
        assert_eq!(tape.len(), 2);
        assert_eq!(tape.read(), 'b');

        let tape = tape.move_head(Direction::Right);
        assert_eq!(tape.symbols(), &['a', 'b', '.']);
        assert_eq!(tape.head(), 2);
        assert_eq!(tape.read(), '.');
    }

    #[test]
    fn test_move_left_extends_and_keeps_head_at_zero() {
        let tape = Tape::new("ab", '.').move_head(Direction::Left);

        assert_eq!(tape.symbols(), &['.', 'a', 'b']);
        assert_eq!(tape.head(), 0);
        assert_eq!(tape.read(), '.');
    }

    #[test]
    fn test_repeated_left_extension() {
        let start = Tape::new("ab", '.').write('x');
        let tape = (0..3).fold(start.clone(), |tape, _| tape.move_head(Direction::Left));

        assert_eq!(tape.symbols(), &['.', '.', '.', 'x', 'b']);
        assert_eq!(tape.head(), 0);
        assert_eq!(start.symbols(), &['x', 'b']);
        assert_eq!(start.head(), 0);

        // Walking back lands on the written cell again.
        let back = (0..3).fold(tape, |tape, _| tape.move_head(Direction::Right));
        assert_eq!(back.read(), 'x');
        assert_eq!(back, start);
    }

    #[test]
    fn test_stay_never_extends() {
        let tape = Tape::new("a", '.');
        let moved = tape.move_head(Direction::Stay);

        assert_eq!(moved.len(), 1);
        assert_eq!(moved.head(), 0);
    }

    #[test]
    fn test_equality_ignores_extension_blanks() {
        let fresh = Tape::new("0", '.');
        let wandered = fresh
            .move_head(Direction::Right)
            .move_head(Direction::Left)
            .move_head(Direction::Left)
            .move_head(Direction::Right);

        assert_eq!(wandered.symbols(), &['.', '0', '.']);
        assert_eq!(wandered, fresh);

        let set: HashSet<Tape> = [fresh, wandered].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_equality_respects_head_and_blank() {
        let tape = Tape::new("ab", '.');

        assert_ne!(tape, tape.move_head(Direction::Right));
        assert_ne!(tape, Tape::new("ab", '_'));
        assert_ne!(tape, tape.write('b'));
    }

    #[test]
    fn test_head_over_blank_region_is_significant() {
        // Same content, head parked two cells right of it vs one cell right.
        let one = Tape::new("a", '.').move_head(Direction::Right);
        let two = one.move_head(Direction::Right);

        assert_ne!(one, two);
    }

    #[test]
    fn test_display() {
        let tape = Tape::new("01", '.').move_head(Direction::Left);
        assert_eq!(tape.to_string(), ".01");
    }

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Left),
            Just(Direction::Right),
            Just(Direction::Stay)
        ]
    }

    proptest! {
        #[test]
        fn prop_write_then_read(input in "[01]{0,8}", moves in prop::collection::vec(direction(), 0..16), symbol in prop::sample::select(vec!['0', '1', '.'])) {
            let tape = moves
                .into_iter()
                .fold(Tape::new(&input, '.'), |tape, direction| tape.move_head(direction));

            prop_assert_eq!(tape.write(symbol).read(), symbol);
        }

        #[test]
        fn prop_moving_past_the_end_grows_by_one_blank(input in "[01]{0,8}", k in 1usize..32) {
            let start = Tape::new(&input, '.');
            let original = start.len();

            // Park the head on the last cell, then walk off the right end.
            let mut tape = (1..original).fold(start.clone(), |tape, _| tape.move_head(Direction::Right));
            for i in 1..=k {
                tape = tape.move_head(Direction::Right);
                prop_assert_eq!(tape.len(), original + i);
                prop_assert_eq!(tape.read(), '.');
            }

            let mut tape = start;
            for i in 1..=k {
                tape = tape.move_head(Direction::Left);
                prop_assert_eq!(tape.len(), original + i);
                prop_assert_eq!(tape.head(), 0);
                prop_assert_eq!(tape.read(), '.');
            }
        }
    }
}
