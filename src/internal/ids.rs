macro_rules! impl_id_common {
    ($name:ident, $tp:ty) => {
        /// The ID type $name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub(crate) struct $name($tp);

        impl $name {
            /// Create a new id.
            #[inline]
            pub(crate) const fn new(index: $tp) -> Self {
                $name(index)
            }

            /// Get the id as usize.
            #[inline]
            pub(crate) fn as_usize(&self) -> usize {
                self.0 as usize
            }

            /// Get the id as its base type.
            #[allow(dead_code)]
            #[inline]
            pub(crate) fn id(&self) -> $tp {
                self.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &Self::Output {
                &self[index.0 as usize]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.0 as usize]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &Self::Output {
                &self[index.0 as usize]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.0 as usize]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

/// `$tp == usize` is handled separately, since `From<usize>` would otherwise be implemented
/// twice for id types whose base type already is `usize` (e.g. [`LexerStateId`]).
macro_rules! impl_id {
    ($name:ident, usize) => {
        impl_id_common!($name, usize);

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                $name::new(index)
            }
        }
    };

    ($name:ident, $tp:ty) => {
        impl_id_common!($name, $tp);

        impl From<$tp> for $name {
            fn from(index: $tp) -> Self {
                $name::new(index)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                $name::new(index as $tp)
            }
        }
    };
}

/// The ID type for NFA cells. The final sentinel (`-1` in the spec) is modeled separately as
/// [`crate::internal::nfa::Target::Final`], never as a `CellId` value, so this type only ever
/// indexes real cells in the arena.
pub(crate) type CellIdBase = u32;
impl_id!(CellId, CellIdBase);

/// The ID type for DFA cells. Cell `0` is always the begin cell.
pub(crate) type StateIdBase = u32;
impl_id!(StateId, StateIdBase);

/// A non-zero action id identifying a rule's user callback. `0` is reserved for "no action",
/// i.e. a rule that matches and continues scanning without producing a token (whitespace,
/// comments, ...).
pub(crate) type ActionIdBase = u32;
impl_id!(ActionId, ActionIdBase);

impl ActionId {
    /// The reserved id meaning "no action" / "ignore".
    pub(crate) const NONE: ActionId = ActionId::new(0);

    #[inline]
    pub(crate) fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

/// The ID type for lexing states (a named, ordered rule set). State `0` is always the initial
/// state consulted by a freshly created [`crate::LexerSession`].
pub(crate) type LexerStateIdBase = usize;
impl_id!(LexerStateId, usize);
