//! Contains the definition of [`Error`].

use substc_table::ScopeID;
use substc_term::{
    generic_parameter::TypeParameter,
    protocol::ProtocolID,
    r#type::Type,
    requirement::RequirementKind,
    substitution_map::{Collision, VerificationError},
};

/// A broken invariant detected by a [`GenericEnvironment`] operation.
///
/// Correct callers never observe these; they abort processing of the
/// current unit. Types that merely couldn't be resolved are reported in-band
/// as error placeholders instead.
///
/// [`GenericEnvironment`]: crate::GenericEnvironment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error(
        "the generic parameter {0} is not declared by the signature of the \
         environment"
    )]
    ForeignParameter(TypeParameter),

    #[error(
        "the generic parameter {parameter} is already bound to {existing}, \
         refusing to rebind it to {new_type}"
    )]
    AlreadyBound { parameter: TypeParameter, existing: Type, new_type: Type },

    #[error(
        "{interface_type} has no context type yet and the environment has no \
         resolver to materialize one"
    )]
    MissingResolver { interface_type: Type },

    #[error("the resolution of {interface_type} depends on itself")]
    CyclicResolution { interface_type: Type, in_progress: Vec<Type> },

    #[error(
        "resolving {interface_type} nested more than {limit} resolver calls"
    )]
    ResolutionOverflow { interface_type: Type, limit: usize },

    #[error("{0} already contains context types")]
    AlreadyContextual(Type),

    #[error("{0} still contains generic parameters")]
    AlreadyInterface(Type),

    #[error("the substitution left {0} incomplete")]
    IncompleteSubstitution(Type),

    #[error("no declared parameter corresponds to {0}")]
    MissingSugaredParameter(TypeParameter),

    #[error("the requirement bucket of {0} has a non-dependent subject")]
    NonDependentBucket(Type),

    #[error(
        "the requirement bucket of {subject} carries a {kind} requirement, \
         only conformance requirements are allowed"
    )]
    MalformedRequirementBucket { subject: Type, kind: RequirementKind },

    #[error(
        "the conformance looked up for {subject} conforms to {found:?} \
         instead of {expected:?}"
    )]
    MismatchedConformance {
        subject: Type,
        expected: ProtocolID,
        found: ProtocolID,
    },

    #[error(
        "the conformance of {subject} to {protocol:?} still has conditional \
         requirements"
    )]
    UnresolvedConditionalRequirements { subject: Type, protocol: ProtocolID },

    #[error("a dependent type was visited twice: {0}")]
    DuplicateEntry(#[from] Collision),

    #[error("the substitution map doesn't match its signature: {0}")]
    InvalidSubstitutionMap(#[from] VerificationError),

    #[error("the scopes {current:?} and {scope:?} have no common ancestor")]
    UnrelatedScopes { current: ScopeID, scope: ScopeID },
}
