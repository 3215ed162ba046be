//! Contains the definition of [`Conformance`].

use std::collections::BTreeMap;

use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::{protocol::ProtocolID, r#type::Type, requirement::Requirement};

/// How a [`Conformance`] was established.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ConformanceKind {
    /// The conforming type is a dependent or context type whose conformance
    /// follows from the requirements of its generic signature.
    Abstract,

    /// The conformance is declared for a concrete type.
    Concrete {
        /// The type witnesses of the protocol's associated types.
        type_witnesses: BTreeMap<String, Type>,
    },
}

/// A record proving that a type conforms to a protocol.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Getters,
)]
pub struct Conformance {
    /// The type that conforms.
    #[get = "pub"]
    conforming_type: Type,

    /// The protocol conformed to.
    protocol: ProtocolID,

    /// How the conformance was established.
    #[get = "pub"]
    kind: ConformanceKind,

    /// The requirements that must additionally hold for the conformance to
    /// apply, e.g. `Array<T>: Equatable` when `T: Equatable`.
    #[get = "pub"]
    conditional_requirements: Vec<Requirement>,
}

impl Conformance {
    /// Creates an abstract conformance of a dependent or context type.
    #[must_use]
    pub const fn new_abstract(
        conforming_type: Type,
        protocol: ProtocolID,
    ) -> Self {
        Self {
            conforming_type,
            protocol,
            kind: ConformanceKind::Abstract,
            conditional_requirements: Vec::new(),
        }
    }

    /// Creates a concrete conformance with the given type witnesses.
    #[must_use]
    pub const fn new_concrete(
        conforming_type: Type,
        protocol: ProtocolID,
        type_witnesses: BTreeMap<String, Type>,
    ) -> Self {
        Self {
            conforming_type,
            protocol,
            kind: ConformanceKind::Concrete { type_witnesses },
            conditional_requirements: Vec::new(),
        }
    }

    /// Attaches conditional requirements to the conformance.
    #[must_use]
    pub fn with_conditional_requirements(
        mut self,
        conditional_requirements: Vec<Requirement>,
    ) -> Self {
        self.conditional_requirements = conditional_requirements;
        self
    }

    /// Gets the protocol conformed to.
    #[must_use]
    pub const fn protocol(&self) -> ProtocolID { self.protocol }

    /// Returns `true` if the conformance is abstract.
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        matches!(self.kind, ConformanceKind::Abstract)
    }

    /// Gets the type witness for the associated type `name`, only known for
    /// concrete conformances.
    #[must_use]
    pub fn type_witness(&self, name: &str) -> Option<&Type> {
        match &self.kind {
            ConformanceKind::Abstract => None,
            ConformanceKind::Concrete { type_witnesses } => {
                type_witnesses.get(name)
            }
        }
    }
}
