//! Static NFA representation and the structural builder used by the regex parser.
//!
//! An [`Nfa`] is a pair of parallel cell attributes indexed by [`CellId`]: a [`CharClass`] (empty
//! means the cell is a *dummy*, i.e. an unconditional epsilon-like move) and a list of [`Target`]
//! out-edges. There is no separate epsilon-transition table: dummies carry the unconditional
//! edges directly as their `outs`. The distinguished final sentinel is [`Target::Final`] and is
//! never itself a stored cell, so concatenating automata only ever needs an index offset, never a
//! sentinel rewrite.

use crate::internal::char_class::CharClass;
use crate::internal::ids::CellId;
use crate::internal::mark::Mark;

/// An NFA out-edge: either another cell, or the distinguished accepting sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Cell(CellId),
    Final,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NfaCell {
    pub(crate) class: CharClass,
    pub(crate) outs: Vec<Target>,
    /// Set only on the dedicated per-rule dummy cell created by [`NfaBuilder::finish_rule`];
    /// structural dummies created by the other combinators always carry `None`.
    pub(crate) mark: Option<Mark>,
}

impl NfaCell {
    pub(crate) fn is_dummy(&self) -> bool {
        self.class.is_empty()
    }
}

/// The static, immutable-once-built NFA: cells plus a begin edge. `begin == Target::Final` means
/// the automaton matches the empty string unconditionally (the initial state of a fresh builder).
#[derive(Debug, Clone)]
pub(crate) struct Nfa {
    pub(crate) cells: Vec<NfaCell>,
    pub(crate) begin: Target,
}

impl Nfa {
    /// Reachability sweep from `begin`; drops unreachable cells and compacts ids. Returns the
    /// number of cells removed.
    pub(crate) fn reduce(&mut self) -> usize {
        let mut reachable = vec![false; self.cells.len()];
        let mut stack = Vec::new();
        if let Target::Cell(id) = self.begin {
            stack.push(id);
        }
        while let Some(id) = stack.pop() {
            let idx = id.as_usize();
            if reachable[idx] {
                continue;
            }
            reachable[idx] = true;
            for out in &self.cells[idx].outs {
                if let Target::Cell(t) = out {
                    stack.push(*t);
                }
            }
        }

        let old_len = self.cells.len();
        let mut remap = vec![None; old_len];
        let mut new_cells = Vec::with_capacity(old_len);
        for (i, cell) in self.cells.iter().enumerate() {
            if reachable[i] {
                remap[i] = Some(CellId::from(new_cells.len()));
                new_cells.push(cell.clone());
            }
        }
        for cell in &mut new_cells {
            for out in &mut cell.outs {
                if let Target::Cell(id) = out {
                    *id = remap[id.as_usize()].expect("reachable cells only reference reachable cells");
                }
            }
        }
        if let Target::Cell(id) = &mut self.begin {
            *id = remap[id.as_usize()].expect("begin cell is reachable by definition");
        }

        let removed = old_len - new_cells.len();
        self.cells = new_cells;
        removed
    }
}

/// Wraps an [`Nfa]` under construction with an `end_cell`: the cell whose `outs` is currently
/// exactly `[Target::Final]` and which the next structural operation retargets to chain further.
/// `end_cell == None` marks an empty accumulator (no fragment appended yet) — distinct from a
/// fragment that matches the empty string, which is represented as a real dummy cell.
#[derive(Debug, Clone)]
pub(crate) struct NfaBuilder {
    nfa: Nfa,
    end_cell: Option<CellId>,
}

impl NfaBuilder {
    pub(crate) fn new() -> Self {
        Self {
            nfa: Nfa {
                cells: Vec::new(),
                begin: Target::Final,
            },
            end_cell: None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.end_cell.is_none() && self.nfa.cells.is_empty()
    }

    fn push_cell(&mut self, class: CharClass) -> CellId {
        let id = CellId::from(self.nfa.cells.len());
        self.nfa.cells.push(NfaCell {
            class,
            outs: Vec::new(),
            mark: None,
        });
        id
    }

    fn push_dummy(&mut self) -> CellId {
        self.push_cell(CharClass::empty())
    }

    /// A single-cell fragment matching exactly `class`.
    pub(crate) fn atom(class: CharClass) -> Self {
        let mut b = Self::new();
        let cell = b.push_cell(class);
        b.nfa.cells[cell.as_usize()].outs.push(Target::Final);
        b.nfa.begin = Target::Cell(cell);
        b.end_cell = Some(cell);
        b
    }

    /// A chain of single-character fragments matching `s` literally.
    pub(crate) fn string(s: &str) -> Self {
        let mut result = Self::new();
        for c in s.encode_utf16() {
            result.append(Self::atom(CharClass::single(c)));
        }
        result
    }

    fn shift_ids(&mut self, offset: usize) {
        if offset == 0 {
            return;
        }
        for cell in &mut self.nfa.cells {
            for out in &mut cell.outs {
                if let Target::Cell(id) = out {
                    *id = CellId::from(id.as_usize() + offset);
                }
            }
        }
        if let Target::Cell(id) = &mut self.nfa.begin {
            *id = CellId::from(id.as_usize() + offset);
        }
        if let Some(id) = &mut self.end_cell {
            *id = CellId::from(id.as_usize() + offset);
        }
    }

    /// Retargets the current `end_cell`'s single out-edge (must be `[Target::Final]`) to `to`.
    fn retarget_end(&mut self, to: Target) {
        let end = self.end_cell.expect("retarget_end requires a non-empty builder");
        let outs = &mut self.nfa.cells[end.as_usize()].outs;
        debug_assert_eq!(outs.as_slice(), &[Target::Final]);
        outs.clear();
        outs.push(to);
    }

    /// Concatenation: extends `self` with `other` in sequence.
    pub(crate) fn append(&mut self, mut other: NfaBuilder) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other;
            return;
        }
        let offset = self.nfa.cells.len();
        other.shift_ids(offset);
        let other_begin = other.nfa.begin;
        self.nfa.cells.append(&mut other.nfa.cells);
        self.retarget_end(other_begin);
        self.end_cell = other.end_cell;
    }

    /// Alternation of `branches` (n-ary, matching the parser's flat `a|b|c` accumulation). Empty
    /// branches are dropped; a single surviving branch is returned unwrapped.
    pub(crate) fn branch(branches: Vec<NfaBuilder>) -> NfaBuilder {
        let mut branches: Vec<NfaBuilder> = branches.into_iter().filter(|b| !b.is_empty()).collect();
        if branches.is_empty() {
            return NfaBuilder::new();
        }
        if branches.len() == 1 {
            return branches.pop().unwrap();
        }

        let mut result = NfaBuilder::new();
        let mut begins = Vec::with_capacity(branches.len());
        let mut ends = Vec::with_capacity(branches.len());
        for mut b in branches {
            let offset = result.nfa.cells.len();
            b.shift_ids(offset);
            begins.push(b.nfa.begin);
            ends.push(b.end_cell.expect("non-empty branch has an end cell"));
            result.nfa.cells.append(&mut b.nfa.cells);
        }

        let b_cell = result.push_dummy();
        result.nfa.cells[b_cell.as_usize()].outs = begins;
        let e_cell = result.push_dummy();
        for end in ends {
            let outs = &mut result.nfa.cells[end.as_usize()].outs;
            debug_assert_eq!(outs.as_slice(), &[Target::Final]);
            outs.clear();
            outs.push(Target::Cell(e_cell));
        }
        result.nfa.cells[e_cell.as_usize()].outs.push(Target::Final);
        result.nfa.begin = Target::Cell(b_cell);
        result.end_cell = Some(e_cell);
        result
    }

    /// `β → ε → D₁ → D₂ → final`, `D₁` loops back to `β` — one-or-more (Kleene plus).
    pub(crate) fn one_or_more(&mut self) {
        debug_assert!(!self.is_empty());
        let begin = self.nfa.begin;
        let d1 = self.push_dummy();
        self.retarget_end(Target::Cell(d1));
        let d2 = self.push_dummy();
        self.nfa.cells[d1.as_usize()].outs = vec![begin, Target::Cell(d2)];
        self.nfa.cells[d2.as_usize()].outs.push(Target::Final);
        self.end_cell = Some(d2);
    }

    /// `D₁ → β → ε → D₂ → final`, `D₁` also bypasses directly to `D₂` — zero-or-one.
    pub(crate) fn unnecessary(&mut self) {
        debug_assert!(!self.is_empty());
        let begin = self.nfa.begin;
        let d1 = self.push_dummy();
        let d2 = self.push_dummy();
        self.retarget_end(Target::Cell(d2));
        self.nfa.cells[d2.as_usize()].outs.push(Target::Final);
        self.nfa.cells[d1.as_usize()].outs = vec![begin, Target::Cell(d2)];
        self.nfa.begin = Target::Cell(d1);
        self.end_cell = Some(d2);
    }

    /// `D₁ → β → ε`, `D₁` also `→ D₂ → final`, `ε` loops back to `D₁` — zero-or-more (Kleene
    /// star).
    pub(crate) fn any(&mut self) {
        debug_assert!(!self.is_empty());
        let begin = self.nfa.begin;
        let d1 = self.push_dummy();
        let d2 = self.push_dummy();
        self.retarget_end(Target::Cell(d1));
        self.nfa.cells[d1.as_usize()].outs = vec![begin, Target::Cell(d2)];
        self.nfa.cells[d2.as_usize()].outs.push(Target::Final);
        self.nfa.begin = Target::Cell(d1);
        self.end_cell = Some(d2);
    }

    /// `{lo,hi}`: `lo` concatenated copies of `atom` followed by `hi - lo` optional copies.
    /// `hi == 0` (only reachable with `lo == 0` too) matches the empty string unconditionally.
    pub(crate) fn repeat(atom: &NfaBuilder, lo: u32, hi: u32) -> NfaBuilder {
        debug_assert!(lo <= hi);
        let mut result = NfaBuilder::new();
        if hi == 0 {
            return result;
        }
        for _ in 0..lo {
            result.append(atom.clone());
        }
        for _ in lo..hi {
            let mut opt = atom.clone();
            opt.unnecessary();
            result.append(opt);
        }
        result
    }

    /// `{lo,}`: `lo` concatenated copies of `atom` followed by a zero-or-more copy.
    pub(crate) fn repeat_at_least(atom: &NfaBuilder, lo: u32) -> NfaBuilder {
        let mut result = NfaBuilder::new();
        for _ in 0..lo {
            result.append(atom.clone());
        }
        let mut star = atom.clone();
        star.any();
        result.append(star);
        result
    }

    /// Marks the end of a rule: appends a dedicated dummy cell carrying `mark`, whose single out
    /// is the final sentinel. This is the only place a non-`None` mark is ever attached to a
    /// cell, so mark accumulation during epsilon closure never needs to look past one dummy per
    /// rule boundary.
    pub(crate) fn finish_rule(mut self, mark: Mark) -> NfaBuilder {
        if self.is_empty() {
            // An empty rule pattern matches epsilon; still needs a markable cell to fire.
            let d = self.push_dummy();
            self.nfa.cells[d.as_usize()].mark = Some(mark);
            self.nfa.cells[d.as_usize()].outs.push(Target::Final);
            self.nfa.begin = Target::Cell(d);
            self.end_cell = Some(d);
            return self;
        }
        let d = self.push_dummy();
        self.nfa.cells[d.as_usize()].mark = Some(mark);
        self.retarget_end(Target::Cell(d));
        self.nfa.cells[d.as_usize()].outs.push(Target::Final);
        self.end_cell = Some(d);
        self
    }

    /// Combines `rules` (each already finished with [`finish_rule`]) under one top-level dummy
    /// begin cell whose outs are each rule's begin. Each rule keeps its own end-cell → marked
    /// dummy → final chain so per-rule marks stay distinct.
    pub(crate) fn combine_rules(rules: Vec<NfaBuilder>) -> Nfa {
        let mut cells = Vec::new();
        let mut begins = Vec::with_capacity(rules.len());
        for mut rule in rules {
            let offset = cells.len();
            rule.shift_ids(offset);
            begins.push(rule.nfa.begin);
            cells.append(&mut rule.nfa.cells);
        }
        let b_cell_id = CellId::from(cells.len());
        cells.push(NfaCell {
            class: CharClass::empty(),
            outs: begins,
            mark: None,
        });
        Nfa {
            cells,
            begin: Target::Cell(b_cell_id),
        }
    }

    /// Finalizes a single-fragment builder (no per-rule marks) into a static [`Nfa`].
    pub(crate) fn into_nfa(self) -> Nfa {
        self.nfa
    }
}

impl Default for NfaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::ids::ActionId;

    fn count_reachable(nfa: &Nfa) -> usize {
        let mut reachable = vec![false; nfa.cells.len()];
        let mut stack = Vec::new();
        if let Target::Cell(id) = nfa.begin {
            stack.push(id);
        }
        while let Some(id) = stack.pop() {
            if reachable[id.as_usize()] {
                continue;
            }
            reachable[id.as_usize()] = true;
            for out in &nfa.cells[id.as_usize()].outs {
                if let Target::Cell(t) = out {
                    stack.push(*t);
                }
            }
        }
        reachable.into_iter().filter(|b| *b).count()
    }

    #[test]
    fn atom_has_one_cell_ending_in_final() {
        let b = NfaBuilder::atom(CharClass::single(b'a' as u16));
        let nfa = b.into_nfa();
        assert_eq!(nfa.cells.len(), 1);
        assert_eq!(nfa.cells[0].outs, vec![Target::Final]);
    }

    #[test]
    fn append_chains_fragments() {
        let mut b = NfaBuilder::string("ab");
        assert_eq!(b.clone().into_nfa().cells.len(), 2);
        b.append(NfaBuilder::string("c"));
        assert_eq!(b.into_nfa().cells.len(), 3);
    }

    #[test]
    fn one_or_more_loops_back_to_begin() {
        let mut b = NfaBuilder::atom(CharClass::single(b'a' as u16));
        let begin_before = match b.clone().into_nfa().begin {
            Target::Cell(id) => id,
            Target::Final => panic!("expected cell"),
        };
        b.one_or_more();
        let nfa = b.into_nfa();
        // d1 is reachable from the atom's (former) end and loops to begin_before.
        let consuming_cell = &nfa.cells[begin_before.as_usize()];
        let d1 = match consuming_cell.outs[0] {
            Target::Cell(id) => id,
            Target::Final => panic!("atom must consume before reaching a dummy"),
        };
        assert!(nfa.cells[d1.as_usize()].is_dummy());
        assert!(nfa.cells[d1.as_usize()].outs.contains(&Target::Cell(begin_before)));
    }

    #[test]
    fn unnecessary_bypasses_directly_to_end() {
        let mut b = NfaBuilder::atom(CharClass::single(b'a' as u16));
        b.unnecessary();
        let nfa = b.into_nfa();
        let d1 = match nfa.begin {
            Target::Cell(id) => id,
            Target::Final => panic!("expected cell"),
        };
        // D1 must have two outs: into the original atom, and the bypass to D2.
        assert_eq!(nfa.cells[d1.as_usize()].outs.len(), 2);
    }

    #[test]
    fn branch_with_single_survivor_is_unwrapped() {
        let atom = NfaBuilder::atom(CharClass::single(b'x' as u16));
        let branched = NfaBuilder::branch(vec![atom.clone()]);
        assert_eq!(branched.into_nfa().cells.len(), atom.into_nfa().cells.len());
    }

    #[test]
    fn branch_of_three_shares_one_begin_and_one_end_dummy() {
        let branches = vec![
            NfaBuilder::atom(CharClass::single(b'a' as u16)),
            NfaBuilder::atom(CharClass::single(b'b' as u16)),
            NfaBuilder::atom(CharClass::single(b'c' as u16)),
        ];
        let b = NfaBuilder::branch(branches);
        let nfa = b.into_nfa();
        // 3 atoms + begin dummy + end dummy.
        assert_eq!(nfa.cells.len(), 5);
        assert_eq!(count_reachable(&nfa), 5);
    }

    #[test]
    fn reduce_drops_unreachable_cells() {
        let mut b = NfaBuilder::atom(CharClass::single(b'a' as u16));
        // Build a second unreferenced fragment and splice it in without linking, to simulate
        // dead cells, then verify reduce() compacts back down.
        b.append(NfaBuilder::atom(CharClass::single(b'b' as u16)));
        let mut nfa = b.into_nfa();
        let before = nfa.cells.len();
        let removed = nfa.reduce();
        assert_eq!(removed, 0);
        assert_eq!(nfa.cells.len(), before);
    }

    #[test]
    fn finish_rule_attaches_mark_to_dedicated_dummy() {
        let b = NfaBuilder::atom(CharClass::single(b'a' as u16)).finish_rule(Mark::Action(ActionId::new(1)));
        let nfa = b.into_nfa();
        let marked: Vec<_> = nfa.cells.iter().filter(|c| c.mark.is_some()).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].outs, vec![Target::Final]);
    }

    #[test]
    fn combine_rules_preserves_each_rules_mark() {
        let r1 = NfaBuilder::atom(CharClass::single(b'a' as u16)).finish_rule(Mark::Action(ActionId::new(1)));
        let r2 = NfaBuilder::atom(CharClass::single(b'b' as u16)).finish_rule(Mark::Action(ActionId::new(2)));
        let nfa = NfaBuilder::combine_rules(vec![r1, r2]);
        let marks: Vec<_> = nfa.cells.iter().filter_map(|c| c.mark).collect();
        assert_eq!(marks.len(), 2);
        assert!(matches!(nfa.begin, Target::Cell(_)));
    }

    #[test]
    fn repeat_zero_zero_matches_epsilon_only() {
        let atom = NfaBuilder::atom(CharClass::single(b'a' as u16));
        let r = NfaBuilder::repeat(&atom, 0, 0);
        assert!(r.is_empty());
    }

    #[test]
    fn repeat_bounds_produce_expected_cell_growth() {
        let atom = NfaBuilder::atom(CharClass::single(b'a' as u16));
        let r = NfaBuilder::repeat(&atom, 1, 3);
        // 1 mandatory copy + 2 optional copies, each optional copy adds 2 dummy cells.
        assert_eq!(r.into_nfa().cells.len(), 1 + 2 * 3);
    }
}
