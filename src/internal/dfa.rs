//! General DFA form: per-cell sorted range/out tables with a binary-search transition function.
//! Produced by subset construction, consumed by minimization, compression, and directly by the
//! runtime driver when compression is disabled.

use crate::internal::char_class::PlainCharRange;
use crate::internal::ids::StateId;
use crate::internal::mark::Mark;

/// `size` cells numbered from `0`; cell `0` is always the begin cell.
///
/// Invariant: `char_ranges[i]` is sorted and disjoint (ranges may touch — i.e. be adjacent without
/// a gap — when they lead to different outs; unlike [`crate::internal::char_class::CharClass`]
/// this table does *not* fuse touching ranges that disagree on target), and
/// `char_ranges[i].len() == outs[i].len() == marks[i].len()`.
#[derive(Debug, Clone)]
pub(crate) struct Dfa {
    pub(crate) char_ranges: Vec<Vec<PlainCharRange>>,
    pub(crate) outs: Vec<Vec<StateId>>,
    pub(crate) marks: Vec<Vec<Option<Mark>>>,
    pub(crate) final_flags: Vec<bool>,
}

impl Dfa {
    pub(crate) fn size(&self) -> usize {
        self.char_ranges.len()
    }

    pub(crate) fn is_final(&self, cell: StateId) -> bool {
        self.final_flags[cell.as_usize()]
    }

    /// Binary search for the outgoing transition slot of `cell` covering `c`.
    pub(crate) fn transition_index(&self, cell: StateId, c: u16) -> Option<usize> {
        self.char_ranges[cell.as_usize()]
            .binary_search_by(|r| {
                if c < r.start {
                    std::cmp::Ordering::Greater
                } else if c > r.end {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok()
    }

    pub(crate) fn target(&self, cell: StateId, slot: usize) -> StateId {
        self.outs[cell.as_usize()][slot]
    }

    pub(crate) fn mark(&self, cell: StateId, slot: usize) -> Option<Mark> {
        self.marks[cell.as_usize()][slot]
    }

    /// Convenience used by tests and the property-based cross-checks: one-step transit, or `None`
    /// for "no transition" (the spec's `-1`).
    pub(crate) fn transit(&self, cell: StateId, c: u16) -> Option<StateId> {
        self.transition_index(cell, c).map(|slot| self.target(cell, slot))
    }
}

/// Incrementally assembled by subset construction; cells and their range tables are appended in
/// id order, never mutated out of order.
#[derive(Debug, Default)]
pub(crate) struct DfaBuilder {
    char_ranges: Vec<Vec<PlainCharRange>>,
    outs: Vec<Vec<StateId>>,
    marks: Vec<Vec<Option<Mark>>>,
    final_flags: Vec<bool>,
}

impl DfaBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn new_cell(&mut self, is_final: bool) -> StateId {
        let id = StateId::from(self.char_ranges.len());
        self.char_ranges.push(Vec::new());
        self.outs.push(Vec::new());
        self.marks.push(Vec::new());
        self.final_flags.push(is_final);
        id
    }

    pub(crate) fn push_transition(&mut self, from: StateId, range: PlainCharRange, to: StateId, mark: Option<Mark>) {
        let idx = from.as_usize();
        self.char_ranges[idx].push(range);
        self.outs[idx].push(to);
        self.marks[idx].push(mark);
    }

    pub(crate) fn build(self) -> Dfa {
        Dfa {
            char_ranges: self.char_ranges,
            outs: self.outs,
            marks: self.marks,
            final_flags: self.final_flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_index_finds_containing_range() {
        let mut b = DfaBuilder::new();
        let s0 = b.new_cell(false);
        let s1 = b.new_cell(true);
        b.push_transition(s0, PlainCharRange::new(b'a' as u16, b'z' as u16), s1, None);
        let dfa = b.build();
        assert_eq!(dfa.transit(s0, b'm' as u16), Some(s1));
        assert_eq!(dfa.transit(s0, b'A' as u16), None);
        assert!(dfa.is_final(s1));
        assert!(!dfa.is_final(s0));
    }

    #[test]
    fn touching_ranges_with_different_targets_stay_distinct() {
        let mut b = DfaBuilder::new();
        let s0 = b.new_cell(false);
        let s1 = b.new_cell(true);
        let s2 = b.new_cell(true);
        b.push_transition(s0, PlainCharRange::new(0, 4), s1, None);
        b.push_transition(s0, PlainCharRange::new(5, 9), s2, None);
        let dfa = b.build();
        assert_eq!(dfa.transit(s0, 4), Some(s1));
        assert_eq!(dfa.transit(s0, 5), Some(s2));
    }
}
