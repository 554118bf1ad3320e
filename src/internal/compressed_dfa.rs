//! Two-level character-class lookup + deduplicated transition-index compression of a [`Dfa`].
//!
//! Turns the general DFA's per-cell variable-length sorted range tables into constant-time
//! lookups that share memory across cells with identical transition behaviour.

use crate::internal::char_class::PlainCharRange;
use crate::internal::dfa::Dfa;
use crate::internal::ids::StateId;
use crate::internal::mark::Mark;
use crate::internal::transition_set::TransitionSet;
use rustc_hash::FxHashMap;

const DEAD_CLASS: u16 = u16::MAX;

#[derive(Debug, Clone)]
pub(crate) struct CompressedDfa {
    /// 256-entry byte table: row index (into `class_table`) for each high byte of a code point.
    top_level: Vec<u8>,
    /// Deduplicated 256-entry rows; `class_table[r][lo]` is the global character-class id, or
    /// [`DEAD_CLASS`] if no cell transitions on that code point.
    class_table: Vec<[u16; 256]>,
    /// Per-cell offset into `transition_indices` (rows deduplicated by content).
    transition_index_begin: Vec<u32>,
    transition_indices: Vec<i32>,
    /// Per-cell offset into `transitions`/`marks`.
    transition_begin: Vec<u32>,
    transitions: Vec<StateId>,
    marks: Vec<Option<Mark>>,
    final_flags: Vec<bool>,
}

impl CompressedDfa {
    pub(crate) fn size(&self) -> usize {
        self.final_flags.len()
    }

    pub(crate) fn is_final(&self, cell: StateId) -> bool {
        self.final_flags[cell.as_usize()]
    }

    fn class_of(&self, c: u16) -> Option<usize> {
        let hi = (c >> 8) as usize;
        let lo = (c & 0xFF) as usize;
        let row = &self.class_table[self.top_level[hi] as usize];
        let cls = row[lo];
        (cls != DEAD_CLASS).then_some(cls as usize)
    }

    pub(crate) fn transition_index(&self, cell: StateId, c: u16) -> Option<usize> {
        let cls = self.class_of(c)?;
        let idx = self.transition_indices[self.transition_index_begin[cell.as_usize()] as usize + cls];
        (idx >= 0).then_some(idx as usize)
    }

    pub(crate) fn target(&self, cell: StateId, slot: usize) -> StateId {
        self.transitions[self.transition_begin[cell.as_usize()] as usize + slot]
    }

    pub(crate) fn mark(&self, cell: StateId, slot: usize) -> Option<Mark> {
        self.marks[self.transition_begin[cell.as_usize()] as usize + slot]
    }

    pub(crate) fn transit(&self, cell: StateId, c: u16) -> Option<StateId> {
        self.transition_index(cell, c).map(|slot| self.target(cell, slot))
    }
}

pub(crate) fn compress(dfa: &Dfa) -> CompressedDfa {
    // Step 1: discover the global alphabet by unioning every cell's ranges into one partition.
    let mut alphabet: TransitionSet<()> = TransitionSet::new();
    for cell in 0..dfa.size() {
        for range in &dfa.char_ranges[cell] {
            alphabet.add(*range, (), |_, _| ());
        }
    }
    alphabet.optimize();
    let boundaries: Vec<PlainCharRange> = alphabet.iter().map(|(r, _)| r).collect();
    let num_classes = boundaries.len();

    // Step 2: dense 65536-entry class table, split into deduplicated 256-entry rows.
    let mut full_table = vec![DEAD_CLASS; 0x1_0000];
    for (class_id, range) in boundaries.iter().enumerate() {
        for c in range.start..range.end {
            full_table[c as usize] = class_id as u16;
        }
        full_table[range.end as usize] = class_id as u16;
    }
    let mut class_table: Vec<[u16; 256]> = Vec::new();
    let mut top_level = Vec::with_capacity(256);
    let mut row_lookup: FxHashMap<[u16; 256], u8> = FxHashMap::default();
    for hi in 0..256usize {
        let mut row = [DEAD_CLASS; 256];
        row.copy_from_slice(&full_table[hi * 256..hi * 256 + 256]);
        let idx = *row_lookup.entry(row).or_insert_with(|| {
            class_table.push(row);
            (class_table.len() - 1) as u8
        });
        top_level.push(idx);
    }
    let class_of = |c: u16| -> Option<usize> {
        let hi = (c >> 8) as usize;
        let lo = (c & 0xFF) as usize;
        let row = class_table[top_level[hi] as usize];
        (row[lo] != DEAD_CLASS).then_some(row[lo] as usize)
    };

    // Steps 3 & 4: per-cell dense transition-index row (deduplicated) plus the concatenated
    // transition/mark tables.
    let mut transition_indices: Vec<i32> = Vec::new();
    let mut transition_index_begin: Vec<u32> = Vec::with_capacity(dfa.size());
    let mut ti_row_lookup: FxHashMap<Vec<i32>, u32> = FxHashMap::default();
    let mut transitions: Vec<StateId> = Vec::new();
    let mut marks: Vec<Option<Mark>> = Vec::new();
    let mut transition_begin: Vec<u32> = Vec::with_capacity(dfa.size());
    let mut final_flags: Vec<bool> = Vec::with_capacity(dfa.size());

    for cell in 0..dfa.size() {
        let mut dense = vec![-1i32; num_classes];
        for (slot, range) in dfa.char_ranges[cell].iter().enumerate() {
            for c in range.start..=range.end {
                if let Some(cls) = class_of(c) {
                    dense[cls] = slot as i32;
                }
            }
        }
        let begin = *ti_row_lookup.entry(dense.clone()).or_insert_with(|| {
            let off = transition_indices.len() as u32;
            transition_indices.extend_from_slice(&dense);
            off
        });
        transition_index_begin.push(begin);

        transition_begin.push(transitions.len() as u32);
        transitions.extend(dfa.outs[cell].iter().copied());
        marks.extend(dfa.marks[cell].iter().copied());
        final_flags.push(dfa.is_final(StateId::from(cell)));
    }

    CompressedDfa {
        top_level,
        class_table,
        transition_index_begin,
        transition_indices,
        transition_begin,
        transitions,
        marks,
        final_flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::char_class::CharClass;
    use crate::internal::ids::ActionId;
    use crate::internal::mark::Mark;
    use crate::internal::nfa::NfaBuilder;
    use crate::internal::subset_construction;

    fn dfa_for(pattern_action: Vec<(&str, u32)>) -> Dfa {
        let rules: Vec<_> = pattern_action
            .into_iter()
            .map(|(p, a)| crate::internal::regex_parser::parse(p).unwrap().finish_rule(Mark::Action(ActionId::new(a))))
            .collect();
        let nfa = NfaBuilder::combine_rules(rules);
        subset_construction::build(&nfa).unwrap()
    }

    #[test]
    fn compression_invariant_holds_for_every_cell_and_code_point() {
        let dfa = dfa_for(vec![("[a-z]+", 1), ("[0-9]+", 2), (" ", 3)]);
        let compressed = compress(&dfa);
        for cell in 0..dfa.size() {
            for c in 0u16..512 {
                let cell_id = StateId::from(cell);
                assert_eq!(dfa.transit(cell_id, c), compressed.transit(cell_id, c), "cell {cell} char {c}");
            }
        }
    }

    #[test]
    fn marks_survive_compression() {
        let dfa = dfa_for(vec![("a", 1), ("b", 2)]);
        let compressed = compress(&dfa);
        let s0 = StateId::from(0usize);
        let slot_a = compressed.transition_index(s0, b'a' as u16).unwrap();
        let slot_b = compressed.transition_index(s0, b'b' as u16).unwrap();
        assert_ne!(compressed.mark(s0, slot_a), compressed.mark(s0, slot_b));
    }

    #[test]
    fn unused_code_points_are_dead() {
        let dfa = dfa_for(vec![("a", 1)]);
        let compressed = compress(&dfa);
        assert!(compressed.transit(StateId::from(0usize), b'z' as u16).is_none());
    }

    #[test]
    fn identical_rows_are_deduplicated() {
        // Three rules accepting disjoint single chars all lead into dead-end final cells with no
        // further outgoing transitions, so those three cells' transition-index rows are
        // identical and should collapse into one physical row.
        let dfa = dfa_for(vec![("a", 1), ("b", 2), ("c", 3)]);
        let compressed = compress(&dfa);
        let distinct_offsets: std::collections::HashSet<_> = compressed.transition_index_begin.iter().collect();
        assert!(distinct_offsets.len() < dfa.size());
    }
}
