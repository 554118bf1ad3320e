//! Module with [`LexerSession`] and [`LexerActions`]: the public scanning driver and the handle
//! given to a rule's action callback.

use crate::errors::{Result, ScnrError, ScnrErrorKind};
use crate::internal::ids::{ActionId, LexerStateId};
use crate::internal::lexer_runtime::{LexerActions as InternalActions, LexerSession as InternalSession};
use crate::lexer::Lexer;
use crate::span::Span;

/// An in-progress scan over one input string against one [`Lexer`]. Holds the current lexing
/// state, scan position, and last-match position; state switches requested from a rule's action
/// callback (see [`LexerActions::switch_state`]) persist across calls to [`Self::lex`].
pub struct LexerSession<'l> {
    lexer: &'l Lexer,
    inner: InternalSession,
}

impl<'l> LexerSession<'l> {
    pub(crate) fn new(lexer: &'l Lexer, input: &str) -> Self {
        Self {
            lexer,
            inner: InternalSession::new(input, lexer.initial_state()),
        }
    }

    /// Scans forward to the next token, calling `callback` with the winning action id and a
    /// [`LexerActions`] handle once a rule with an action fires. Rules without an action (built
    /// from [`crate::Pattern::skip`]) are matched and skipped silently, without invoking
    /// `callback`. Returns `Ok(None)` at end of input, and an error if no rule's automaton can
    /// advance past the current position.
    pub fn lex<R>(&mut self, mut callback: impl FnMut(u32, &mut LexerActions<'_, '_, R>)) -> Result<Option<R>> {
        self.inner
            .lex(self.lexer.dfas(), |action_id: ActionId, actions: &mut InternalActions<'_, R>| {
                let mut wrapped = LexerActions { inner: actions };
                callback(action_id.id(), &mut wrapped);
            })
            .map_err(|e| ScnrError::new(ScnrErrorKind::LexerMismatch { span: e.span }))
    }

    /// Repeatedly calls [`Self::lex`], collecting every value emitted via [`LexerActions::emit`]
    /// until end of input.
    pub fn lex_all<R>(&mut self, mut callback: impl FnMut(u32, &mut LexerActions<'_, '_, R>)) -> Result<Vec<R>> {
        self.inner
            .lex_all(self.lexer.dfas(), |action_id: ActionId, actions: &mut InternalActions<'_, R>| {
                let mut wrapped = LexerActions { inner: actions };
                callback(action_id.id(), &mut wrapped);
            })
            .map_err(|e| ScnrError::new(ScnrErrorKind::LexerMismatch { span: e.span }))
    }

    /// The index of the lexing state the next call to [`Self::lex`] will scan with.
    pub fn current_state(&self) -> usize {
        self.inner.current_state().as_usize()
    }

    /// Switches the lexing state consulted by the next call to [`Self::lex`], without waiting for
    /// a rule's action to request it.
    pub fn set_state(&mut self, state: usize) {
        self.inner.set_state(LexerStateId::from(state));
    }

    /// The name of the lexing state the next call to [`Self::lex`] will scan with, if the
    /// underlying [`Lexer`] has one.
    pub fn mode_name(&self) -> Option<&str> {
        self.lexer.mode_name(self.current_state())
    }

    /// Rewinds the session to the start of the input and the lexer's initial state.
    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

/// Handle given to a rule's action callback: lets it read the matched text and span, request a
/// lexing-state switch, and emit a return value for [`LexerSession::lex`] to hand back.
pub struct LexerActions<'a, 's, R> {
    inner: &'a mut InternalActions<'s, R>,
}

impl<'a, 's, R> LexerActions<'a, 's, R> {
    /// Switches the lexing state the next call to [`LexerSession::lex`] will scan with.
    pub fn switch_state(&mut self, state: usize) {
        self.inner.switch_state(LexerStateId::from(state));
    }

    /// The half-open span `[start, end)` of the matched text, in UTF-16 code units.
    pub fn matched_span(&self) -> Span {
        self.inner.matched_span()
    }

    /// The matched text.
    pub fn matched_str(&self) -> &str {
        self.inner.matched_str()
    }

    /// Emits `value` as this token's result. [`LexerSession::lex`] returns it wrapped in
    /// `Ok(Some(..))`; omitting the call is how an action observes its match (e.g. to switch
    /// state) without producing a token.
    pub fn emit(&mut self, value: R) {
        self.inner.emit(value);
    }
}

#[cfg(test)]
mod tests {
    use crate::{LexerBuilder, LexerState, Pattern};

    #[test]
    fn session_tokenizes_letters_digits_and_space_in_order() {
        let lexer = LexerBuilder::new()
            .add_state(
                LexerState::new("INITIAL")
                    .pattern(Pattern::new("[A-Za-z]+", 1))
                    .pattern(Pattern::new("[0-9]+", 2))
                    .pattern(Pattern::skip(" ")),
            )
            .build()
            .unwrap();

        let mut session = lexer.session(" a1ba");
        let mut actions = Vec::new();
        session.lex_all::<()>(|action, _| actions.push(action)).unwrap();
        assert_eq!(actions, vec![1, 2, 1]);
    }

    #[test]
    fn mismatch_reports_stuck_position() {
        let lexer = LexerBuilder::new()
            .add_state(
                LexerState::new("INITIAL")
                    .pattern(Pattern::new("[0-9]+", 1))
                    .pattern(Pattern::new("[A-Za-z]+", 2))
                    .pattern(Pattern::skip(" ")),
            )
            .build()
            .unwrap();

        let mut session = lexer.session("illegal!");
        let err = session.lex_all::<()>(|_, _| {}).unwrap_err();
        assert!(err.to_string().contains("no rule matches"));
    }

    #[test]
    fn switching_state_from_an_action_changes_the_next_scan() {
        let name_state = LexerState::new("NAME")
            .pattern(Pattern::new(r"\w+", 1))
            .pattern(Pattern::new(": ", 9))
            .pattern(Pattern::skip(" "));
        let definition_state = LexerState::new("DEFINITION").pattern(Pattern::new(".+", 2));

        let lexer = LexerBuilder::new()
            .add_state(name_state)
            .add_state(definition_state)
            .build()
            .unwrap();

        let mut session = lexer.session("apple: a kind of fruit");
        let mut collected = Vec::new();
        while let Some(value) = session
            .lex::<String>(|action, actions| {
                if action == 9 {
                    actions.switch_state(1);
                } else if action == 1 || action == 2 {
                    actions.emit(actions.matched_str().to_string());
                }
            })
            .unwrap()
        {
            collected.push(value);
        }
        assert_eq!(collected, vec!["apple".to_string(), "a kind of fruit".to_string()]);
    }
}
