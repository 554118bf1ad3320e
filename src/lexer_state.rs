//! Module with the [`LexerState`] type: a named, ordered rule set.

use crate::pattern::Pattern;

/// A named, ordered list of [`Pattern`]s — the per-state rule set a generator build consumes. The
/// patterns' declaration order is significant in non-strict mode: the earliest-declared rule wins
/// among rules tied for longest match (see [`crate::LexerBuilder::strict`]).
#[derive(Debug, Clone)]
pub struct LexerState {
    pub(crate) name: String,
    pub(crate) patterns: Vec<Pattern>,
}

impl LexerState {
    /// Creates a new, empty lexing state named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            patterns: Vec::new(),
        }
    }

    /// Creates a lexing state from a name and a ready-made pattern list.
    pub fn with_patterns(name: impl Into<String>, patterns: Vec<Pattern>) -> Self {
        Self {
            name: name.into(),
            patterns,
        }
    }

    /// Appends a pattern to the state's rule set, in builder style.
    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// The state's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The state's rule set, in declaration order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
}
