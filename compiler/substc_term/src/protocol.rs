//! Contains the definition of [`Protocol`].

use serde::{Deserialize, Serialize};
use substc_arena::ID;

/// A protocol that types may conform to.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Protocol {
    /// The declared name of the protocol.
    pub name: String,

    /// The names of the associated types the protocol declares.
    pub associated_types: Vec<String>,
}

/// An ID to a [`Protocol`] stored in an arena owned by the surrounding
/// compiler.
pub type ProtocolID = ID<Protocol>;
