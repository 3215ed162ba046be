//! Contains the definition of [`Table`], the tree of lexical declaration
//! scopes that generic environments may be owned by.

use derive_more::Display;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use substc_arena::{Arena, ID};

/// An ID to a [`Scope`] stored in a [`Table`].
pub type ScopeID = ID<Scope>;

/// The kind of declaration that introduces a [`Scope`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
)]
#[allow(missing_docs)]
pub enum ScopeKind {
    #[display(fmt = "module")]
    Module,
    #[display(fmt = "type")]
    Type,
    #[display(fmt = "extension")]
    Extension,
    #[display(fmt = "function")]
    Function,
    #[display(fmt = "closure")]
    Closure,
}

/// A lexical declaration scope.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Getters,
    CopyGetters,
)]
pub struct Scope {
    /// The name of the declaration that introduces the scope.
    #[get = "pub"]
    name: String,

    /// The kind of declaration that introduces the scope.
    #[get_copy = "pub"]
    kind: ScopeKind,

    /// The enclosing scope, `None` for a root.
    #[get_copy = "pub"]
    parent: Option<ScopeID>,

    /// The number of ancestors of this scope; roots have depth zero.
    #[get_copy = "pub"]
    depth: usize,
}

/// The scope-tree contract consumed by the generic environment: a parent
/// accessor and a depth metric.
pub trait Hierarchy {
    /// Gets the enclosing scope of `scope`, `None` if it is a root.
    fn parent(&self, scope: ScopeID) -> Option<ScopeID>;

    /// Gets the number of ancestors of `scope`.
    fn depth(&self, scope: ScopeID) -> usize;
}

/// Finds the nearest common ancestor of `first` and `second`.
///
/// Both parent chains are first shortened to the same depth, then ascended in
/// lock-step until they meet. Returns `None` if the scopes live in different
/// trees.
pub fn common_ancestor<H: Hierarchy + ?Sized>(
    hierarchy: &H,
    first: ScopeID,
    second: ScopeID,
) -> Option<ScopeID> {
    let mut first_depth = hierarchy.depth(first);
    let mut second_depth = hierarchy.depth(second);

    let mut first = Some(first);
    let mut second = Some(second);

    while first_depth > second_depth {
        first = first.and_then(|scope| hierarchy.parent(scope));
        first_depth -= 1;
    }

    while second_depth > first_depth {
        second = second.and_then(|scope| hierarchy.parent(scope));
        second_depth -= 1;
    }

    loop {
        match (first, second) {
            (Some(lhs), Some(rhs)) if lhs == rhs => return Some(lhs),
            (Some(lhs), Some(rhs)) => {
                first = hierarchy.parent(lhs);
                second = hierarchy.parent(rhs);
            }
            _ => return None,
        }
    }
}

/// Returned by [`Table::add_scope`] when the given parent doesn't exist.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error,
)]
#[error("the parent scope {0:?} doesn't exist in the table")]
pub struct InvalidParentError(pub ScopeID);

/// The tree of all declaration scopes of a compilation session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    scopes: Arena<Scope>,
}

impl Table {
    /// Creates an empty [`Table`].
    #[must_use]
    pub const fn new() -> Self { Self { scopes: Arena::new() } }

    /// Adds a new root scope.
    pub fn add_root(
        &mut self,
        name: impl Into<String>,
        kind: ScopeKind,
    ) -> ScopeID {
        self.scopes.insert(Scope {
            name: name.into(),
            kind,
            parent: None,
            depth: 0,
        })
    }

    /// Adds a new scope nested in `parent`.
    ///
    /// # Errors
    ///
    /// See [`InvalidParentError`].
    pub fn add_scope(
        &mut self,
        name: impl Into<String>,
        kind: ScopeKind,
        parent: ScopeID,
    ) -> Result<ScopeID, InvalidParentError> {
        let depth = self
            .scopes
            .get(parent)
            .ok_or(InvalidParentError(parent))?
            .depth
            + 1;

        Ok(self.scopes.insert(Scope {
            name: name.into(),
            kind,
            parent: Some(parent),
            depth,
        }))
    }

    /// Gets the scope with the given ID.
    #[must_use]
    pub fn get(&self, id: ScopeID) -> Option<&Scope> { self.scopes.get(id) }
}

impl Hierarchy for Table {
    fn parent(&self, scope: ScopeID) -> Option<ScopeID> {
        self.scopes.get(scope).and_then(|scope| scope.parent)
    }

    fn depth(&self, scope: ScopeID) -> usize {
        self.scopes.get(scope).map_or(0, |scope| scope.depth)
    }
}
