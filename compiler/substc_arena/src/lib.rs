//! [`Arena`] is a data structure that allows storing items of type `T` and
//! referencing them by a typed [`ID`]. This is useful for providing more type
//! safety when working with various containers of different types.
//!
//! Items are never removed; the [`ID`] of an item is its insertion position,
//! so IDs stay valid for the lifetime of the arena.

use std::{fmt::Debug, marker::PhantomData};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;

/// Represents an unique identifier to a particular entry in the [`Arena`] of
/// type `T`.
pub struct ID<T: ?Sized> {
    index: u64,

    _marker: PhantomData<Box<T>>,
}

unsafe impl<T> Send for ID<T> {}
unsafe impl<T> Sync for ID<T> {}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ID({})", self.index)
    }
}

impl<T> ID<T> {
    /// Creates a new [`ID`] with the given index.
    #[must_use]
    pub const fn new(index: u64) -> Self {
        Self { index, _marker: PhantomData }
    }
}

impl<T> Clone for ID<T> {
    fn clone(&self) -> Self { *self }
}

impl<T> Copy for ID<T> {}

impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool { self.index == other.index }
}

impl<T> Eq for ID<T> {}

impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> std::hash::Hash for ID<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> Serialize for ID<T> {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        self.index.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for ID<T> {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::new)
    }
}

/// Represents a collection of items of type `T` that can be referenced by an
/// [`ID`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arena<T> {
    items: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self { Self { items: Vec::new() } }
}

impl<T> Arena<T> {
    /// Creates a new empty [`Arena`].
    #[must_use]
    pub const fn new() -> Self { Self { items: Vec::new() } }

    /// Inserts a new item into the [`Arena`] and returns its ID.
    pub fn insert(&mut self, item: T) -> ID<T> {
        let id = ID::new(self.items.len() as u64);
        self.items.push(item);

        id
    }

    /// Returns a reference to the item in the [`Arena`] with the given ID.
    #[must_use]
    pub fn get(&self, id: ID<T>) -> Option<&T> {
        usize::try_from(id.index).ok().and_then(|index| self.items.get(index))
    }
}
