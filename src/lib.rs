#![forbid(missing_docs)]
//! # `scnr`
//! The `scnr` crate is a lexer generator core: it turns regex patterns into a minimal DFA and
//! runs a longest-match scanning loop over a string.
//!
//! A [`LexerBuilder`] collects one or more [`LexerState`]s — named, ordered rule sets — compiles
//! each into its own automaton (NFA construction, subset construction, optional minimization,
//! optional two-level compression), and produces an immutable [`Lexer`]. Opening a
//! [`LexerSession`] on a [`Lexer`] drives the longest-match loop: each call to
//! [`LexerSession::lex`] advances to the next token, invoking the winning rule's action with a
//! [`LexerActions`] handle that can read the matched text, request a lexing-state switch (e.g. to
//! scan a quoted string's body differently from surrounding code), and emit a value.
//!
//! Patterns are written in a small regex dialect (literals, `.`, `[...]`/`[^...]` classes,
//! `\d \D \w \W \s \S`, `* + ? {m,n} {m,}`, `|`, grouping) or built up programmatically from
//! pre-built [`Fragment`]s via [`Fragment::composed`].

/// Module with error definitions.
mod errors;
pub use errors::{LexerBuildErrorKind, Result, ScnrError, ScnrErrorKind};

/// The module with internal implementation details: regex parsing, NFA/DFA construction, and the
/// scanning driver.
mod internal;

/// Module with the [`Lexer`] type.
mod lexer;
pub use lexer::Lexer;

/// Module with the [`LexerBuilder`] fluent builder.
mod lexer_builder;
pub use lexer_builder::LexerBuilder;

/// Module with the [`LexerSession`] scanning driver and the [`LexerActions`] callback handle.
mod lexer_session;
pub use lexer_session::{LexerActions, LexerSession};

/// Module with the [`LexerState`] type.
mod lexer_state;
pub use lexer_state::LexerState;

/// Module with the [`Pattern`] type and its supporting [`Fragment`]/[`PatternSource`] types.
mod pattern;
pub use pattern::{Fragment, FragmentPart, Pattern, PatternSource};

/// Module that provides the [`Span`] type.
mod span;
pub use span::Span;
