//! Module with the [`LexerBuilder`] fluent builder.

use crate::errors::{LexerBuildErrorKind, Result, ScnrError, ScnrErrorKind};
use crate::internal::ids::{ActionId, LexerStateId};
use crate::internal::mark::Mark;
use crate::internal::marked_dfa;
use crate::internal::nfa::NfaBuilder;
use crate::internal::regex_parser;
use crate::lexer::Lexer;
use crate::lexer_state::LexerState;
use crate::pattern::PatternSource;

/// A fluent builder that runs the full build pipeline (regex parsing, NFA combination, subset
/// construction, optional minimization, optional compression) over a set of [`LexerState`]s and
/// produces a [`Lexer`].
#[derive(Debug, Clone)]
pub struct LexerBuilder {
    states: Vec<LexerState>,
    minimize: bool,
    strict: bool,
    compress: bool,
}

impl Default for LexerBuilder {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            minimize: false,
            strict: true,
            compress: true,
        }
    }
}

impl LexerBuilder {
    /// Creates a new, empty builder with the default options (`minimize = false`,
    /// `strict = true`, `compress = true`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one lexing state. The first state added becomes the initial state (index 0),
    /// consulted by a freshly created [`crate::LexerSession`].
    pub fn add_state(mut self, state: LexerState) -> Self {
        self.states.push(state);
        self
    }

    /// Appends multiple lexing states, preserving relative order.
    pub fn add_states(mut self, states: impl IntoIterator<Item = LexerState>) -> Self {
        self.states.extend(states);
        self
    }

    /// Whether to run DFA minimization after subset construction. Default `false`.
    pub fn minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }

    /// Whether overlapping rules are a build-time error (`true`, the default) or resolved by
    /// first-declared-wins priority (`false`).
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether to apply the two-level compression pass after (optional) minimization. Default
    /// `true`.
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Runs the build pipeline over every configured state and produces a [`Lexer`].
    pub fn build(self) -> Result<Lexer> {
        if self.states.is_empty() {
            return Err(ScnrError::new(ScnrErrorKind::LexerBuildError(
                LexerBuildErrorKind::NoStates,
            )));
        }

        let mut dfas = Vec::with_capacity(self.states.len());
        let mut names = Vec::with_capacity(self.states.len());

        for state in &self.states {
            if state.patterns.is_empty() {
                return Err(ScnrError::new(ScnrErrorKind::LexerBuildError(
                    LexerBuildErrorKind::EmptyState(state.name.clone()),
                )));
            }

            let mut rules = Vec::with_capacity(state.patterns.len());
            for (priority, pattern) in state.patterns.iter().enumerate() {
                let fragment: NfaBuilder = match &pattern.source {
                    PatternSource::Regex(src) => regex_parser::parse(src)?,
                    PatternSource::Fragment(f) => f.builder.clone(),
                };
                let action_id = match pattern.action {
                    None => ActionId::NONE,
                    Some(id) => ActionId::new(id),
                };
                let mark = if self.strict {
                    Mark::Action(action_id)
                } else {
                    Mark::Priority(priority as u32, action_id)
                };
                rules.push(fragment.finish_rule(mark));
            }

            let nfa = NfaBuilder::combine_rules(rules);
            let marked = marked_dfa::build(&nfa, self.minimize, self.compress)?;
            if marked.begin_is_final() {
                return Err(ScnrError::new(ScnrErrorKind::LexerBuildError(
                    LexerBuildErrorKind::NullableLanguage(state.name.clone()),
                )));
            }
            dfas.push(marked);
            names.push(state.name.clone());
        }

        Ok(Lexer::new(dfas, names, LexerStateId::from(0usize)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    #[test]
    fn build_fails_with_no_states() {
        let err = LexerBuilder::new().build().unwrap_err();
        assert!(matches!(
            *err.source,
            ScnrErrorKind::LexerBuildError(LexerBuildErrorKind::NoStates)
        ));
    }

    #[test]
    fn build_fails_with_empty_state() {
        let err = LexerBuilder::new()
            .add_state(LexerState::new("INITIAL"))
            .build()
            .unwrap_err();
        assert!(matches!(
            *err.source,
            ScnrErrorKind::LexerBuildError(LexerBuildErrorKind::EmptyState(_))
        ));
    }

    #[test]
    fn strict_build_rejects_overlapping_rules() {
        let state = LexerState::new("INITIAL")
            .pattern(Pattern::new(r"\d", 1))
            .pattern(Pattern::new(".", 2));
        let err = LexerBuilder::new().add_state(state).build().unwrap_err();
        assert!(matches!(*err.source, ScnrErrorKind::MarksConflict { .. }));
    }

    #[test]
    fn non_strict_build_resolves_overlap_by_declaration_order() {
        let state = LexerState::new("INITIAL")
            .pattern(Pattern::new(r"\d", 1))
            .pattern(Pattern::new(".", 2));
        let lexer = LexerBuilder::new().strict(false).add_state(state).build().unwrap();
        let mut session = lexer.session("1a");
        let mut actions = Vec::new();
        session
            .lex_all::<()>(|action, _| actions.push(action))
            .unwrap();
        assert_eq!(actions, vec![1, 2]);
    }

    #[test]
    fn build_rejects_nullable_language() {
        let state = LexerState::new("INITIAL").pattern(Pattern::new("a*", 1));
        let err = LexerBuilder::new().add_state(state).build().unwrap_err();
        assert!(matches!(
            *err.source,
            ScnrErrorKind::LexerBuildError(LexerBuildErrorKind::NullableLanguage(_))
        ));
    }
}
