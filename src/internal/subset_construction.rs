//! NFA → DFA subset construction with per-transition mark propagation and conflict-path
//! reconstruction.

use crate::internal::bitset::BitSet;
use crate::internal::char_class::PlainCharRange;
use crate::internal::dfa::{Dfa, DfaBuilder};
use crate::internal::ids::StateId;
use crate::internal::mark::{merge_optional, Mark};
use crate::internal::nfa::{Nfa, Target};
use crate::internal::transition_set::TransitionSet;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::collections::VecDeque;

/// Raised when two marks reaching the same DFA transition cannot be merged (two rules accept
/// overlapping input in `strict` mode). Carries the minimal witnessing path of character ranges,
/// reconstructed by walking back the partially built DFA from the cell where the merge failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("conflicting marks {a:?} and {b:?} on path {path:?}")]
pub(crate) struct MarksConflict {
    pub(crate) a: Mark,
    pub(crate) b: Mark,
    pub(crate) path: Vec<PlainCharRange>,
}

#[derive(Clone, PartialEq)]
struct CellSetPayload {
    cells: BitSet,
    mark: Option<Mark>,
}

/// Epsilon-closure of `seeds`: the set of consuming cells (plus the final flag) reachable by
/// following dummy outs, with the marks encountered along every dummy path merged together.
fn closure(nfa: &Nfa, seeds: &[Target]) -> Result<(BitSet, Option<Mark>), (Mark, Mark)> {
    let mut set = BitSet::new(nfa.cells.len());
    let mut visited = BitSet::new(nfa.cells.len());
    let mut acc_mark: Option<Mark> = None;
    let mut stack: Vec<Target> = seeds.to_vec();

    while let Some(t) = stack.pop() {
        match t {
            Target::Final => set.set_final(true),
            Target::Cell(id) => {
                if visited.contains(id.as_usize()) {
                    continue;
                }
                visited.insert(id.as_usize());
                let cell = &nfa.cells[id.as_usize()];
                if cell.is_dummy() {
                    acc_mark = merge_optional(acc_mark, cell.mark)?;
                    stack.extend(cell.outs.iter().copied());
                } else {
                    set.insert(id.as_usize());
                }
            }
        }
    }
    Ok((set, acc_mark))
}

fn merge_payload(a: &CellSetPayload, b: &CellSetPayload, conflict: &RefCell<Option<(Mark, Mark)>>) -> CellSetPayload {
    let mut cells = a.cells.clone();
    cells.union_with(&b.cells);
    let mark = match merge_optional(a.mark, b.mark) {
        Ok(m) => m,
        Err(pair) => {
            // Record the conflict and return a placeholder; the caller checks `conflict` right
            // after the TransitionSet pass completes and aborts before this value is trusted.
            *conflict.borrow_mut() = Some(pair);
            a.mark
        }
    };
    CellSetPayload { cells, mark }
}

fn reconstruct_path(predecessor: &[Option<(PlainCharRange, StateId)>], from: StateId) -> Vec<PlainCharRange> {
    let mut path = Vec::new();
    let mut cur = from;
    while let Some((range, pred)) = predecessor[cur.as_usize()] {
        path.push(range);
        cur = pred;
    }
    path.reverse();
    path
}

/// Runs subset construction over `nfa`, producing a [`Dfa`] with per-transition marks.
pub(crate) fn build(nfa: &Nfa) -> Result<Dfa, MarksConflict> {
    let mut builder = DfaBuilder::new();
    let mut seen: FxHashMap<BitSet, StateId> = FxHashMap::default();
    let mut queue: VecDeque<(BitSet, StateId)> = VecDeque::new();
    let mut predecessor: Vec<Option<(PlainCharRange, StateId)>> = Vec::new();

    let (seed_set, seed_mark) =
        closure(nfa, std::slice::from_ref(&nfa.begin)).map_err(|(a, b)| MarksConflict { a, b, path: Vec::new() })?;
    let _ = seed_mark; // the begin cell-set's own mark (if any) only matters once it is final; finalFlags already captures that via seed_set.has_final().
    let seed_id = builder.new_cell(seed_set.has_final());
    predecessor.push(None);
    seen.insert(seed_set.clone(), seed_id);
    queue.push_back((seed_set, seed_id));

    while let Some((cell_set, state_id)) = queue.pop_front() {
        let mut ts: TransitionSet<CellSetPayload> = TransitionSet::new();
        let conflict: RefCell<Option<(Mark, Mark)>> = RefCell::new(None);

        for cell_idx in cell_set.iter() {
            let cell = &nfa.cells[cell_idx];
            debug_assert!(!cell.is_dummy());
            for range in cell.class.ranges() {
                let (closed_cells, mark) = closure(nfa, &cell.outs).map_err(|(a, b)| MarksConflict {
                    a,
                    b,
                    path: reconstruct_path(&predecessor, state_id),
                })?;
                let payload = CellSetPayload { cells: closed_cells, mark };
                ts.add(*range, payload, |a, b| merge_payload(a, b, &conflict));
            }
        }

        if let Some((a, b)) = conflict.into_inner() {
            // The path up to (and including) the DFA state where the merge failed is the minimal
            // witness: every character range consumed to reach a state where two rules disagree.
            let path = reconstruct_path(&predecessor, state_id);
            return Err(MarksConflict { a, b, path });
        }

        ts.optimize();
        for (range, payload) in ts.iter() {
            let target_id = if let Some(&id) = seen.get(&payload.cells) {
                id
            } else {
                let id = builder.new_cell(payload.cells.has_final());
                seen.insert(payload.cells.clone(), id);
                predecessor.push(Some((range, state_id)));
                queue.push_back((payload.cells.clone(), id));
                id
            };
            builder.push_transition(state_id, range, target_id, payload.mark);
        }
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::char_class::CharClass;
    use crate::internal::ids::ActionId;
    use crate::internal::nfa::NfaBuilder;

    #[test]
    fn single_char_rule_builds_two_state_dfa() {
        let rule = NfaBuilder::atom(CharClass::single(b'a' as u16)).finish_rule(Mark::Action(ActionId::new(1)));
        let nfa = NfaBuilder::combine_rules(vec![rule]);
        let dfa = build(&nfa).unwrap();
        assert_eq!(dfa.size(), 2);
        let s0 = StateId::from(0usize);
        let s1 = dfa.transit(s0, b'a' as u16).unwrap();
        assert!(dfa.is_final(s1));
        assert!(dfa.transit(s0, b'b' as u16).is_none());
    }

    #[test]
    fn overlapping_rules_with_action_marks_conflict() {
        let digit = NfaBuilder::atom(CharClass::digit()).finish_rule(Mark::Action(ActionId::new(1)));
        let any = NfaBuilder::atom(CharClass::any()).finish_rule(Mark::Action(ActionId::new(2)));
        let nfa = NfaBuilder::combine_rules(vec![digit, any]);
        let result = build(&nfa);
        assert!(result.is_err());
    }

    #[test]
    fn overlapping_rules_with_priority_marks_never_conflict() {
        let digit = NfaBuilder::atom(CharClass::digit()).finish_rule(Mark::Priority(0, ActionId::new(1)));
        let any = NfaBuilder::atom(CharClass::any()).finish_rule(Mark::Priority(1, ActionId::new(2)));
        let nfa = NfaBuilder::combine_rules(vec![digit, any]);
        assert!(build(&nfa).is_ok());
    }

    #[test]
    fn two_rules_produce_distinct_action_ids_on_their_own_chars() {
        let a = NfaBuilder::atom(CharClass::single(b'a' as u16)).finish_rule(Mark::Action(ActionId::new(1)));
        let b = NfaBuilder::atom(CharClass::single(b'b' as u16)).finish_rule(Mark::Action(ActionId::new(2)));
        let nfa = NfaBuilder::combine_rules(vec![a, b]);
        let dfa = build(&nfa).unwrap();
        let s0 = StateId::from(0usize);
        let sa = dfa.transit(s0, b'a' as u16).unwrap();
        let sb = dfa.transit(s0, b'b' as u16).unwrap();
        assert_ne!(sa, sb);
        assert!(dfa.is_final(sa) && dfa.is_final(sb));
    }
}
