//! Contains the definition of [`GenericParameterKey`] and [`TypeParameter`].

use std::fmt;

use derive_new::new;
use serde::{Deserialize, Serialize};

/// Identifies a generic parameter by its nesting depth and its position among
/// the parameters introduced at that depth.
///
/// The key is stable: it doesn't depend on the name the author wrote, so it
/// is shared by the canonical and the sugared form of a parameter.
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
    new,
)]
pub struct GenericParameterKey {
    /// The number of enclosing generic contexts.
    pub depth: u32,

    /// The position within the generic context at `depth`.
    pub index: u32,
}

impl fmt::Display for GenericParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "τ_{}_{}", self.depth, self.index)
    }
}

/// A generic type parameter.
///
/// The canonical form carries no name; the sugared form remembers the name
/// the author declared it with. Both forms are semantically equal when their
/// keys are.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TypeParameter {
    key: GenericParameterKey,
    name: Option<String>,
}

impl TypeParameter {
    /// Creates a canonical type parameter.
    #[must_use]
    pub const fn canonical_with(key: GenericParameterKey) -> Self {
        Self { key, name: None }
    }

    /// Creates a sugared type parameter with the given declared name.
    #[must_use]
    pub fn sugared(key: GenericParameterKey, name: impl Into<String>) -> Self {
        Self { key, name: Some(name.into()) }
    }

    /// Gets the key identifying the parameter.
    #[must_use]
    pub const fn key(&self) -> GenericParameterKey { self.key }

    /// Gets the declared name, `None` for canonical parameters.
    #[must_use]
    pub fn name(&self) -> Option<&str> { self.name.as_deref() }

    /// Returns `true` if the parameter carries no sugar.
    #[must_use]
    pub const fn is_canonical(&self) -> bool { self.name.is_none() }

    /// Strips the declared name.
    #[must_use]
    pub const fn canonical(&self) -> Self { Self::canonical_with(self.key) }
}

impl fmt::Display for TypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.key),
        }
    }
}
