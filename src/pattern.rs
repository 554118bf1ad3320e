//! Module with the pattern types consumed by a [`crate::LexerState`].

use crate::errors::Result;
use crate::internal::nfa::NfaBuilder;
use crate::internal::regex_parser::{self, FragmentPart as InternalFragmentPart};

/// A pre-built NFA fragment that behaves, syntactically, like a single parenthesized atom when
/// composed with literal pattern text via [`Fragment::composed`]. Built either from its own regex
/// source or by composing further fragments and literal text.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub(crate) builder: NfaBuilder,
}

impl Fragment {
    /// Parses `pattern` as a standalone regex and wraps the resulting NFA fragment.
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        Ok(Self {
            builder: regex_parser::parse(pattern)?,
        })
    }

    /// Builds a fragment from a composable sequence of literal text and nested fragments, as if
    /// the whole sequence were wrapped in one outer group (see [`Fragment::composed`]).
    pub fn composed(parts: Vec<FragmentPart>) -> Result<Self> {
        let parts = parts.into_iter().map(FragmentPart::into_internal).collect();
        Ok(Self {
            builder: regex_parser::parse_fragments(parts)?,
        })
    }
}

/// One element of a [`Fragment::composed`] sequence: either literal regex text or a pre-built
/// fragment.
#[derive(Debug, Clone)]
pub enum FragmentPart {
    /// Literal regex surface syntax, parsed in place.
    Text(String),
    /// A pre-built fragment, treated as a single atom for postfix operators.
    Fragment(Fragment),
}

impl FragmentPart {
    fn into_internal(self) -> InternalFragmentPart {
        match self {
            FragmentPart::Text(t) => InternalFragmentPart::Text(t),
            FragmentPart::Fragment(f) => InternalFragmentPart::Fragment(f.builder),
        }
    }
}

/// Where a [`Pattern`]'s matching language comes from.
#[derive(Debug, Clone)]
pub enum PatternSource {
    /// Regex surface syntax (see the crate's regex grammar), parsed when the pattern's owning
    /// [`crate::LexerState`] is built.
    Regex(String),
    /// A pre-built fragment (see [`Fragment`]).
    Fragment(Fragment),
}

/// One rule in a [`crate::LexerState`]'s ordered rule list: a pattern paired with the action id
/// fired when it wins the longest match, or `None` to match and keep scanning without producing a
/// token (whitespace, comments, ...).
#[derive(Debug, Clone)]
pub struct Pattern {
    pub(crate) source: PatternSource,
    pub(crate) action: Option<u32>,
}

impl Pattern {
    /// Creates a pattern from regex surface syntax, firing `action` (a non-zero id) when it wins.
    pub fn new(pattern: impl Into<String>, action: u32) -> Self {
        Self {
            source: PatternSource::Regex(pattern.into()),
            action: Some(action),
        }
    }

    /// Creates a pattern from regex surface syntax that matches and continues scanning without
    /// producing a token, e.g. whitespace or comments.
    pub fn skip(pattern: impl Into<String>) -> Self {
        Self {
            source: PatternSource::Regex(pattern.into()),
            action: None,
        }
    }

    /// Creates a pattern from a pre-built [`Fragment`], firing `action` when it wins.
    pub fn from_fragment(fragment: Fragment, action: u32) -> Self {
        Self {
            source: PatternSource::Fragment(fragment),
            action: Some(action),
        }
    }

    /// The action id this pattern fires, if any.
    pub fn action(&self) -> Option<u32> {
        self.action
    }
}
