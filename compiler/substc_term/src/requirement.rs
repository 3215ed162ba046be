//! Contains the definition of [`Requirement`] and [`RequirementBucket`].

use enum_as_inner::EnumAsInner;
use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::{protocol::ProtocolID, r#type::Type};

/// A layout constraint, denoted by `T: AnyObject`-like syntax.
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
    derive_more::Display,
)]
#[allow(missing_docs)]
pub enum Layout {
    #[display(fmt = "class")]
    Class,
    #[display(fmt = "trivial")]
    Trivial,
}

/// `subject: protocol`
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[allow(missing_docs)]
pub struct ConformanceRequirement {
    pub subject: Type,
    pub protocol: ProtocolID,
}

/// `first == second`
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[allow(missing_docs)]
pub struct SameTypeRequirement {
    pub first: Type,
    pub second: Type,
}

/// `subject: superclass`
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[allow(missing_docs)]
pub struct SuperclassRequirement {
    pub subject: Type,
    pub superclass: Type,
}

/// `subject: layout`
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[allow(missing_docs)]
pub struct LayoutRequirement {
    pub subject: Type,
    pub layout: Layout,
}

/// The kind of a [`Requirement`].
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
    derive_more::Display,
)]
#[allow(missing_docs)]
pub enum RequirementKind {
    #[display(fmt = "conformance")]
    Conformance,
    #[display(fmt = "same-type")]
    SameType,
    #[display(fmt = "superclass")]
    Superclass,
    #[display(fmt = "layout")]
    Layout,
}

/// A requirement constraining the generic parameters of a signature.
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
    EnumAsInner,
    derive_more::From,
)]
#[allow(missing_docs)]
pub enum Requirement {
    Conformance(ConformanceRequirement),
    SameType(SameTypeRequirement),
    Superclass(SuperclassRequirement),
    Layout(LayoutRequirement),
}

impl Requirement {
    /// Creates a conformance requirement.
    #[must_use]
    pub const fn conformance(subject: Type, protocol: ProtocolID) -> Self {
        Self::Conformance(ConformanceRequirement { subject, protocol })
    }

    /// Creates a same-type requirement.
    #[must_use]
    pub const fn same_type(first: Type, second: Type) -> Self {
        Self::SameType(SameTypeRequirement { first, second })
    }

    /// Gets the kind of the requirement.
    #[must_use]
    pub const fn kind(&self) -> RequirementKind {
        match self {
            Self::Conformance(_) => RequirementKind::Conformance,
            Self::SameType(_) => RequirementKind::SameType,
            Self::Superclass(_) => RequirementKind::Superclass,
            Self::Layout(_) => RequirementKind::Layout,
        }
    }

    /// Gets the constrained type; `first` for same-type requirements.
    #[must_use]
    pub const fn subject(&self) -> &Type {
        match self {
            Self::Conformance(requirement) => &requirement.subject,
            Self::SameType(requirement) => &requirement.first,
            Self::Superclass(requirement) => &requirement.subject,
            Self::Layout(requirement) => &requirement.subject,
        }
    }

    /// Gets every type the requirement mentions.
    #[must_use]
    pub fn types(&self) -> Vec<&Type> {
        match self {
            Self::Conformance(requirement) => vec![&requirement.subject],
            Self::SameType(requirement) => {
                vec![&requirement.first, &requirement.second]
            }
            Self::Superclass(requirement) => {
                vec![&requirement.subject, &requirement.superclass]
            }
            Self::Layout(requirement) => vec![&requirement.subject],
        }
    }

    /// Strips the sugar of every type the requirement mentions.
    #[must_use]
    pub fn canonical(&self) -> Self {
        match self {
            Self::Conformance(requirement) => Self::conformance(
                requirement.subject.canonical(),
                requirement.protocol,
            ),
            Self::SameType(requirement) => Self::same_type(
                requirement.first.canonical(),
                requirement.second.canonical(),
            ),
            Self::Superclass(requirement) => {
                Self::Superclass(SuperclassRequirement {
                    subject: requirement.subject.canonical(),
                    superclass: requirement.superclass.canonical(),
                })
            }
            Self::Layout(requirement) => Self::Layout(LayoutRequirement {
                subject: requirement.subject.canonical(),
                layout: requirement.layout,
            }),
        }
    }
}

/// One canonical dependent type paired with the requirements attached to it.
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
pub struct RequirementBucket {
    /// The canonical dependent type the requirements constrain.
    #[get = "pub"]
    subject: Type,

    /// The requirements attached to the subject.
    #[get = "pub"]
    requirements: Vec<Requirement>,
}

impl RequirementBucket {
    /// Creates a new bucket.
    #[must_use]
    pub const fn new(subject: Type, requirements: Vec<Requirement>) -> Self {
        Self { subject, requirements }
    }
}
