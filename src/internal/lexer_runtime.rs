//! The longest-match scanning driver: sweeps UTF-16 code units against a (possibly
//! state-switched) [`MarkedDfa`], backtracking to the last accepting position on mismatch.

use crate::internal::ids::{ActionId, LexerStateId, StateId};
use crate::internal::marked_dfa::MarkedDfa;
use crate::span::Span;
use log::trace;

/// The input could not be tokenised starting at `span.start`; no rule's automaton reached an
/// accepting state before getting stuck.
#[derive(Debug, Clone, thiserror::Error)]
#[error("no rule matches the input at {span}")]
pub(crate) struct LexerMismatch {
    pub(crate) span: Span,
}

/// Per-scan runtime state: current lexing state, scan position, and the position of the last
/// completed match. Owned exclusively by the scan in progress.
pub(crate) struct LexerSession {
    units: Vec<u16>,
    current_state: LexerStateId,
    initial_state: LexerStateId,
    position: usize,
    last_match: usize,
}

impl LexerSession {
    pub(crate) fn new(input: &str, initial_state: LexerStateId) -> Self {
        Self {
            units: input.encode_utf16().collect(),
            current_state: initial_state,
            initial_state,
            position: 0,
            last_match: 0,
        }
    }

    pub(crate) fn current_state(&self) -> LexerStateId {
        self.current_state
    }

    pub(crate) fn set_state(&mut self, state: LexerStateId) {
        self.current_state = state;
    }

    pub(crate) fn reset(&mut self) {
        self.position = 0;
        self.last_match = 0;
        self.current_state = self.initial_state;
    }

    fn decode(&self, span: Span) -> String {
        String::from_utf16_lossy(&self.units[span.range()])
    }

    /// Produces the next action's return value, or `Ok(None)` at end of input.
    pub(crate) fn lex<R>(
        &mut self,
        dfas: &[MarkedDfa],
        mut callback: impl FnMut(ActionId, &mut LexerActions<'_, R>),
    ) -> Result<Option<R>, LexerMismatch> {
        let end = self.units.len();
        let mut x = StateId::from(0usize);
        let mut last_accepting_position: Option<usize> = None;
        let mut last_accepting_node = x;

        loop {
            let dfa = &dfas[self.current_state.as_usize()];
            let slot = if self.position == end {
                None
            } else {
                dfa.transition_index(x, self.units[self.position])
            };

            match slot {
                None => {
                    let Some(accepting_position) = last_accepting_position else {
                        if self.position == end && self.position == self.last_match {
                            return Ok(None);
                        }
                        return Err(LexerMismatch {
                            span: Span::new(self.last_match, self.position),
                        });
                    };
                    self.position = accepting_position;
                    x = last_accepting_node;
                    let slot = dfa
                        .transition_index(x, self.units[self.position])
                        .expect("the recorded accepting node still transitions on its triggering char");
                    self.position += 1;
                    let action = dfa.action(x, slot);
                    x = StateId::from(0usize);
                    last_accepting_position = None;

                    if !action.is_none() {
                        let span = Span::new(self.last_match, self.position);
                        trace!("firing action {action} over {span}");
                        let mut actions = LexerActions {
                            matched_span: span,
                            text: self.decode(span),
                            current_state: &mut self.current_state,
                            emitted: None,
                        };
                        callback(action, &mut actions);
                        let emitted = actions.emitted;
                        self.last_match = self.position;
                        if let Some(value) = emitted {
                            return Ok(Some(value));
                        }
                    } else {
                        self.last_match = self.position;
                    }
                    if self.position == end {
                        return Ok(None);
                    }
                }
                Some(slot) => {
                    let target = dfa.target(x, slot);
                    if dfa.is_final(target) {
                        last_accepting_position = Some(self.position);
                        last_accepting_node = x;
                    }
                    x = target;
                    self.position += 1;
                }
            }
        }
    }

    /// Repeatedly calls [`Self::lex`], collecting every emitted value until end of input.
    pub(crate) fn lex_all<R>(
        &mut self,
        dfas: &[MarkedDfa],
        mut callback: impl FnMut(ActionId, &mut LexerActions<'_, R>),
    ) -> Result<Vec<R>, LexerMismatch> {
        let mut results = Vec::new();
        while let Some(value) = self.lex(dfas, &mut callback)? {
            results.push(value);
        }
        Ok(results)
    }
}

/// Handle given to the user's action callback: lets it request a lexing-state switch, read the
/// matched text, and emit a return value.
pub(crate) struct LexerActions<'s, R> {
    matched_span: Span,
    text: String,
    current_state: &'s mut LexerStateId,
    emitted: Option<R>,
}

impl<'s, R> LexerActions<'s, R> {
    pub(crate) fn switch_state(&mut self, state: LexerStateId) {
        *self.current_state = state;
    }

    pub(crate) fn matched_span(&self) -> Span {
        self.matched_span
    }

    pub(crate) fn matched_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn emit(&mut self, value: R) {
        self.emitted = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::char_class::CharClass;
    use crate::internal::ids::ActionId as AId;
    use crate::internal::mark::Mark;
    use crate::internal::marked_dfa;
    use crate::internal::nfa::NfaBuilder;

    fn build_state(rules: Vec<(&str, u32)>) -> MarkedDfa {
        let fragments: Vec<_> = rules
            .into_iter()
            .map(|(p, a)| crate::internal::regex_parser::parse(p).unwrap().finish_rule(Mark::Action(AId::new(a))))
            .collect();
        let nfa = NfaBuilder::combine_rules(fragments);
        marked_dfa::build(&nfa, false, true).unwrap()
    }

    #[test]
    fn s1_letters_digits_and_space_tokenize_in_order() {
        let dfa = build_state(vec![("[A-Za-z]+", 1), ("[0-9]+", 2), (" ", 3)]);
        let dfas = vec![dfa];
        let mut session = LexerSession::new(" a1ba", LexerStateId::from(0usize));
        let mut actions_seen = Vec::new();
        while let Some(id) = session
            .lex(&dfas, |action, _actions: &mut LexerActions<'_, ()>| actions_seen.push(action))
            .unwrap()
        {
            let _: () = id;
        }
        assert_eq!(
            actions_seen,
            vec![AId::new(3), AId::new(1), AId::new(2), AId::new(1)]
        );
    }

    #[test]
    fn mismatch_reports_the_stuck_position() {
        let dfa = build_state(vec![("[0-9]+", 2), ("[A-Za-z]+", 3), (" ", 1)]);
        let dfas = vec![dfa];
        let mut session = LexerSession::new("illegal!", LexerStateId::from(0usize));
        let err = session
            .lex_all::<()>(&dfas, |_action, _actions| {})
            .unwrap_err();
        assert_eq!(err.span, Span::new(7, 7));
    }

    #[test]
    fn switch_state_changes_the_dfa_used_for_the_next_token() {
        let name_state = build_state(vec![("\\w+", 1), (": ", 9), (" ", 0)]);
        let definition_state = build_state(vec![(".+", 2)]);
        let dfas = vec![name_state, definition_state];
        let mut session = LexerSession::new("apple: a kind of fruit", LexerStateId::from(0usize));

        let mut collected = Vec::new();
        loop {
            let next = session
                .lex(&dfas, |action, actions: &mut LexerActions<'_, String>| {
                    if action == AId::new(9) {
                        actions.switch_state(LexerStateId::from(1usize));
                    } else if action == AId::new(1) || action == AId::new(2) {
                        actions.emit(actions.matched_str().to_string());
                    }
                })
                .unwrap();
            match next {
                Some(v) => collected.push(v),
                None => break,
            }
        }
        assert_eq!(collected, vec!["apple".to_string(), "a kind of fruit".to_string()]);
    }
}
