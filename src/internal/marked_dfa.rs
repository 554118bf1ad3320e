//! A [`MarkedDfa`] pairs a compiled automaton (raw, minimized, or compressed, per the generator's
//! build options) with the per-transition action-id table subset construction produced, behind
//! one uniform interface the runtime driver can consume without caring which variant it holds.

use crate::internal::compressed_dfa::{self, CompressedDfa};
use crate::internal::dfa::Dfa;
use crate::internal::ids::{ActionId, StateId};
use crate::internal::minimizer;
use crate::internal::nfa::Nfa;
use crate::internal::subset_construction::{self, MarksConflict};

#[derive(Debug, Clone)]
pub(crate) enum MarkedDfa {
    Raw(Dfa),
    Compressed(CompressedDfa),
}

impl MarkedDfa {
    pub(crate) fn size(&self) -> usize {
        match self {
            MarkedDfa::Raw(d) => d.size(),
            MarkedDfa::Compressed(d) => d.size(),
        }
    }

    pub(crate) fn is_final(&self, cell: StateId) -> bool {
        match self {
            MarkedDfa::Raw(d) => d.is_final(cell),
            MarkedDfa::Compressed(d) => d.is_final(cell),
        }
    }

    pub(crate) fn transition_index(&self, cell: StateId, c: u16) -> Option<usize> {
        match self {
            MarkedDfa::Raw(d) => d.transition_index(cell, c),
            MarkedDfa::Compressed(d) => d.transition_index(cell, c),
        }
    }

    pub(crate) fn target(&self, cell: StateId, slot: usize) -> StateId {
        match self {
            MarkedDfa::Raw(d) => d.target(cell, slot),
            MarkedDfa::Compressed(d) => d.target(cell, slot),
        }
    }

    /// The action id firing on `cell`'s `slot`-th transition, or [`ActionId::NONE`] for "no
    /// action / continue scanning".
    pub(crate) fn action(&self, cell: StateId, slot: usize) -> ActionId {
        let mark = match self {
            MarkedDfa::Raw(d) => d.mark(cell, slot),
            MarkedDfa::Compressed(d) => d.mark(cell, slot),
        };
        mark.map(|m| m.action_id()).unwrap_or(ActionId::NONE)
    }

    /// Whether the begin cell is itself final, meaning the automaton matches the empty string
    /// unconditionally and would loop forever under the longest-match driver.
    pub(crate) fn begin_is_final(&self) -> bool {
        self.is_final(StateId::from(0usize))
    }
}

/// Runs the build pipeline (subset construction, optional minimization, optional compression)
/// over `nfa` and produces the [`MarkedDfa`] a lexing state will scan with.
pub(crate) fn build(nfa: &Nfa, minimize: bool, compress: bool) -> Result<MarkedDfa, MarksConflict> {
    let mut dfa = subset_construction::build(nfa)?;
    if minimize {
        dfa = minimizer::minimize(&dfa);
    }
    if compress {
        Ok(MarkedDfa::Compressed(compressed_dfa::compress(&dfa)))
    } else {
        Ok(MarkedDfa::Raw(dfa))
    }
}
