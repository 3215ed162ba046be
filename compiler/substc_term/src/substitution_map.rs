//! Contains the definition of [`SubstitutionMap`].

use std::collections::{btree_map::Entry, BTreeMap};

use serde::{Deserialize, Serialize};

use crate::{
    conformance::Conformance,
    generic_parameter::{GenericParameterKey, TypeParameter},
    generic_signature::GenericSignature,
    protocol::ProtocolID,
    r#type::Type,
};

/// Returned by [`SubstitutionMap::add_substitution`] and
/// [`SubstitutionMap::add_conformance`] if the slot is already occupied. The
/// prior value is preserved.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error,
)]
#[allow(missing_docs)]
pub enum Collision {
    #[error("the generic parameter {parameter} already has a replacement")]
    Replacement { parameter: TypeParameter, new_type: Type },

    #[error("a conformance of {subject} to {protocol:?} is already recorded")]
    Conformance { subject: Type, protocol: ProtocolID },
}

/// A finished [`SubstitutionMap`] is inconsistent with its generic
/// signature.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error,
)]
#[allow(missing_docs)]
pub enum VerificationError {
    #[error(
        "the generic parameter {0} has a replacement but is not declared by \
         the signature"
    )]
    ForeignParameter(TypeParameter),

    #[error(
        "the conformance of {subject} to {protocol:?} doesn't match any \
         requirement of the signature"
    )]
    UndeclaredConformance { subject: Type, protocol: ProtocolID },
}

/// the generic parameter {0} has no replacement
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    thiserror::Error,
    displaydoc::Display,
)]
pub struct MissingReplacementError(pub GenericParameterKey);

/// Parameter replacements paired with the conformance records needed to use
/// them validly.
///
/// Built incrementally, then verified against its signature with
/// [`SubstitutionMap::verify`] and treated as immutable.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
pub struct SubstitutionMap {
    replacements: BTreeMap<TypeParameter, Type>,
    conformances: BTreeMap<(Type, ProtocolID), Conformance>,
}

impl SubstitutionMap {
    /// Creates an empty [`SubstitutionMap`].
    #[must_use]
    pub const fn new() -> Self {
        Self { replacements: BTreeMap::new(), conformances: BTreeMap::new() }
    }

    /// Records `parameter -> replacement`. The parameter is stored in its
    /// canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`Collision::Replacement`] if the parameter already has a
    /// replacement.
    pub fn add_substitution(
        &mut self,
        parameter: &TypeParameter,
        replacement: Type,
    ) -> Result<(), Collision> {
        match self.replacements.entry(parameter.canonical()) {
            Entry::Occupied(entry) => Err(Collision::Replacement {
                parameter: entry.key().clone(),
                new_type: replacement,
            }),
            Entry::Vacant(entry) => {
                entry.insert(replacement);
                Ok(())
            }
        }
    }

    /// Records the conformance of the canonical dependent type `subject`.
    ///
    /// # Errors
    ///
    /// Returns [`Collision::Conformance`] if a conformance of the subject to
    /// the same protocol is already recorded.
    pub fn add_conformance(
        &mut self,
        subject: Type,
        conformance: Conformance,
    ) -> Result<(), Collision> {
        match self.conformances.entry((subject, conformance.protocol())) {
            Entry::Occupied(entry) => Err(Collision::Conformance {
                subject: entry.key().0.clone(),
                protocol: entry.key().1,
            }),
            Entry::Vacant(entry) => {
                entry.insert(conformance);
                Ok(())
            }
        }
    }

    /// Gets the replacement of the given parameter.
    #[must_use]
    pub fn replacement(&self, parameter: &TypeParameter) -> Option<&Type> {
        self.replacements.get(&parameter.canonical())
    }

    /// Gets the conformance recorded for `subject: protocol`.
    #[must_use]
    pub fn conformance(
        &self,
        subject: &Type,
        protocol: ProtocolID,
    ) -> Option<&Conformance> {
        self.conformances.get(&(subject.clone(), protocol))
    }

    /// Iterates the replacements, ordered by parameter.
    pub fn replacements(
        &self,
    ) -> impl Iterator<Item = (&TypeParameter, &Type)> {
        self.replacements.iter()
    }

    /// Iterates the recorded conformances.
    pub fn conformances(
        &self,
    ) -> impl Iterator<Item = (&Type, ProtocolID, &Conformance)> {
        self.conformances
            .iter()
            .map(|((subject, protocol), conformance)| {
                (subject, *protocol, conformance)
            })
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty() && self.conformances.is_empty()
    }

    /// Checks the map against its signature: every replaced parameter is
    /// declared, and every conformance answers a declared conformance
    /// requirement.
    ///
    /// At most one replacement per parameter, and a conformance keyed under
    /// its own protocol, hold by construction.
    ///
    /// # Errors
    ///
    /// See [`VerificationError`].
    pub fn verify(
        &self,
        signature: &GenericSignature,
    ) -> Result<(), VerificationError> {
        if let Some(parameter) = self
            .replacements
            .keys()
            .find(|parameter| signature.index_of(parameter.key()).is_none())
        {
            return Err(VerificationError::ForeignParameter(parameter.clone()));
        }

        for (subject, protocol) in self.conformances.keys() {
            if !signature.requires_conformance(subject, *protocol) {
                return Err(VerificationError::UndeclaredConformance {
                    subject: subject.clone(),
                    protocol: *protocol,
                });
            }
        }

        Ok(())
    }

    /// Restates the replacements as an argument list ordered like the
    /// signature's declared parameters.
    ///
    /// # Errors
    ///
    /// See [`MissingReplacementError`].
    pub fn generic_arguments(
        &self,
        signature: &GenericSignature,
    ) -> Result<Vec<Type>, MissingReplacementError> {
        signature
            .parameters()
            .iter()
            .map(|parameter| {
                self.replacement(parameter)
                    .cloned()
                    .ok_or(MissingReplacementError(parameter.key()))
            })
            .collect()
    }

    /// Substitutes the replacements into an interface type.
    ///
    /// Parameters without a replacement are kept. A member type whose base
    /// is replaced by a non-dependent type is resolved through the type
    /// witnesses of the recorded conformances of its base. Without a
    /// witness, a member of a context type stays a member of that context
    /// type, and any other member becomes an error placeholder.
    ///
    /// Such a member of a context type has no context type of its own yet;
    /// mapping it out of its environment and back into it resolves it.
    #[must_use]
    pub fn apply(&self, ty: &Type) -> Type {
        ty.transform(|ty| match ty {
            Type::Parameter(parameter) => self.replacement(parameter).cloned(),
            Type::Member(member) => {
                let base = self.apply(&member.base);

                if base.is_dependent() {
                    return Some(base.member(member.name.clone()));
                }

                let subject = member.base.canonical();
                let witness = self
                    .conformances
                    .range((subject.clone(), ProtocolID::new(0))..)
                    .take_while(|((conforming, _), _)| conforming == &subject)
                    .find_map(|(_, conformance)| {
                        conformance.type_witness(&member.name)
                    });

                Some(match witness {
                    Some(witness) => witness.clone(),
                    None if base.is_context() => {
                        base.member(member.name.clone())
                    }
                    None => Type::error_for(ty.clone()),
                })
            }
            _ => None,
        })
    }
}
