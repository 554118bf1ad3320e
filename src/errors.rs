//! Module with error definitions.

use thiserror::Error;

use crate::span::Span;

/// The result type for the `scnr` crate.
pub type Result<T> = std::result::Result<T, ScnrError>;

/// The error type for the `scnr` crate.
#[derive(Error, Debug)]
pub struct ScnrError {
    /// The source of the error.
    pub source: Box<ScnrErrorKind>,
}

impl ScnrError {
    /// Create a new `ScnrError`.
    pub fn new(kind: ScnrErrorKind) -> Self {
        ScnrError {
            source: Box::new(kind),
        }
    }
}

impl std::fmt::Display for ScnrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum ScnrErrorKind {
    /// The regular-expression surface syntax could not be parsed.
    #[error("invalid pattern: {0}")]
    RegExpError(String),

    /// Two rules accept overlapping input in `strict` mode and their actions could not be
    /// reconciled. Carries the two conflicting action ids and the minimal witnessing path of
    /// character ranges that leads to the ambiguous state, formatted for display.
    #[error("conflicting rules: action {action_a} and action {action_b} both match input {path}")]
    MarksConflict {
        /// The first rule's action id.
        action_a: u32,
        /// The second rule's action id.
        action_b: u32,
        /// A human-readable rendering of the character-range path that triggers the conflict.
        path: String,
    },

    /// A build-time error that prevents a [`crate::Lexer`] from being constructed.
    #[error(transparent)]
    LexerBuildError(#[from] LexerBuildErrorKind),

    /// The input could not be tokenized at the given position: no rule's automaton reached an
    /// accepting state before getting stuck.
    #[error("no rule matches the input at {span}")]
    LexerMismatch {
        /// The half-open range `[start, end)` of the unrecognized region.
        span: Span,
    },
}

/// The reasons a [`crate::LexerBuilder::build`] call can fail before ever scanning any input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerBuildErrorKind {
    /// No lexing states were added to the builder.
    #[error("no lexer states were configured")]
    NoStates,

    /// A lexing state has no patterns at all.
    #[error("lexer state '{0}' has no patterns")]
    EmptyState(String),

    /// The initial state's automaton is nullable: it accepts the empty string unconditionally,
    /// which would make the longest-match driver loop forever at a fixed position.
    #[error("lexer state '{0}' matches the empty string, which would loop forever")]
    NullableLanguage(String),
}

impl From<crate::internal::regex_parser::RegExpError> for ScnrError {
    fn from(error: crate::internal::regex_parser::RegExpError) -> Self {
        ScnrError::new(ScnrErrorKind::RegExpError(error.0))
    }
}

impl From<crate::internal::subset_construction::MarksConflict> for ScnrError {
    fn from(conflict: crate::internal::subset_construction::MarksConflict) -> Self {
        let path = if conflict.path.is_empty() {
            "<empty>".to_string()
        } else {
            conflict
                .path
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };
        ScnrError::new(ScnrErrorKind::MarksConflict {
            action_a: conflict.a.action_id().id(),
            action_b: conflict.b.action_id().id(),
            path,
        })
    }
}
