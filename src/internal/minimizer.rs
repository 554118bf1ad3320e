//! Hopcroft-style partition refinement DFA minimizer, preserving per-transition marks.

use crate::internal::char_class::PlainCharRange;
use crate::internal::dfa::{Dfa, DfaBuilder};
use crate::internal::ids::StateId;
use crate::internal::mark::Mark;
use crate::internal::transition_set::TransitionSet;
use rustc_hash::{FxHashMap, FxHashSet};

/// The canonical, boundary-independent description of a cell's outgoing transitions under the
/// current partition: for each range, which class its target belongs to and what mark (if any)
/// the transition carries. Two cells with equal signatures behave identically and can share a
/// class.
type Signature = Vec<(PlainCharRange, (usize, Option<Mark>))>;

fn signature(dfa: &Dfa, class_of: &[usize], cell: usize) -> Signature {
    let mut ts: TransitionSet<(usize, Option<Mark>)> = TransitionSet::new();
    for (i, range) in dfa.char_ranges[cell].iter().enumerate() {
        let target = dfa.outs[cell][i];
        let payload = (class_of[target.as_usize()], dfa.marks[cell][i]);
        ts.add(*range, payload, |_keep, incoming| incoming.clone());
    }
    ts.optimize();
    ts.iter().map(|(r, p)| (r, p.clone())).collect()
}

fn initial_partition(dfa: &Dfa) -> Vec<usize> {
    let mut class_of = vec![0usize; dfa.size()];
    let mut final_id = None;
    let mut nonfinal_id = None;
    let mut next = 0usize;
    for i in 0..dfa.size() {
        let slot = if dfa.is_final(StateId::from(i)) { &mut final_id } else { &mut nonfinal_id };
        let id = *slot.get_or_insert_with(|| {
            let v = next;
            next += 1;
            v
        });
        class_of[i] = id;
    }
    class_of
}

fn refine_once(dfa: &Dfa, class_of: &[usize]) -> Vec<usize> {
    let n = class_of.len();
    let mut ids: FxHashMap<(usize, Signature), usize> = FxHashMap::default();
    let mut new_class = vec![0usize; n];
    for i in 0..n {
        let key = (class_of[i], signature(dfa, class_of, i));
        let next = ids.len();
        let id = *ids.entry(key).or_insert(next);
        new_class[i] = id;
    }
    new_class
}

fn count_distinct(class_of: &[usize]) -> usize {
    let set: FxHashSet<usize> = class_of.iter().copied().collect();
    set.len()
}

/// Minimizes `dfa` by iterative partition refinement until a fixed point, then emits a new DFA
/// renumbered so the class containing cell `0` becomes cell `0`. Returns a clone of `dfa`
/// unchanged if refinement makes no progress (the input was already minimal).
pub(crate) fn minimize(dfa: &Dfa) -> Dfa {
    let mut class_of = initial_partition(dfa);
    loop {
        let next = refine_once(dfa, &class_of);
        if count_distinct(&next) == count_distinct(&class_of) {
            break;
        }
        class_of = next;
    }

    let num_classes = count_distinct(&class_of);
    if num_classes == dfa.size() {
        return dfa.clone();
    }

    let begin_class = class_of[0];
    let mut remap = vec![usize::MAX; num_classes];
    remap[begin_class] = 0;
    let mut next_id = 1;
    for &c in &class_of {
        if remap[c] == usize::MAX {
            remap[c] = next_id;
            next_id += 1;
        }
    }
    let class_of: Vec<usize> = class_of.iter().map(|&c| remap[c]).collect();

    let mut representative: Vec<Option<usize>> = vec![None; num_classes];
    for (i, &c) in class_of.iter().enumerate() {
        representative[c].get_or_insert(i);
    }

    let mut builder = DfaBuilder::new();
    for &rep in representative.iter().flatten() {
        builder.new_cell(dfa.is_final(StateId::from(rep)));
    }
    for (c, &rep) in representative.iter().enumerate().filter_map(|(c, r)| r.map(|r| (c, r))) {
        for (range, (target_class, mark)) in signature(dfa, &class_of, rep) {
            builder.push_transition(StateId::from(c), range, StateId::from(target_class), mark);
        }
    }
    builder.build()
}
