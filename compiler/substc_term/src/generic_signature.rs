//! Contains the definition of [`GenericSignature`].

use std::collections::{BTreeSet, HashMap};

use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::{
    generic_parameter::{GenericParameterKey, TypeParameter},
    protocol::ProtocolID,
    r#type::Type,
    requirement::{Requirement, RequirementBucket, SameTypeRequirement},
};

/// An error that occurs when building a [`GenericSignature`] from the
/// declared parameters and requirements.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error,
)]
#[allow(missing_docs)]
pub enum SignatureError {
    #[error("the generic parameter {0} is declared more than once")]
    DuplicateParameter(GenericParameterKey),

    #[error(
        "the requirement mentions the generic parameter {key} which is not \
         declared by the signature"
    )]
    UnknownParameter { key: GenericParameterKey, requirement: Requirement },

    #[error(
        "the subject of a {} requirement must be a dependent type, found {}",
        .requirement.kind(),
        .requirement.subject()
    )]
    NonDependentSubject { requirement: Requirement },
}

/// An ordered, immutable list of generic parameters plus their normalized
/// requirements.
///
/// Conformance requirements are grouped into [`RequirementBucket`]s: one per
/// declared parameter, in declaration order, followed by one per dependent
/// member type that carries conformance requirements, in order of first
/// appearance. Each canonical dependent type is visited exactly once.
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters,
)]
pub struct GenericSignature {
    /// The declared parameters, with the sugar the author wrote.
    #[get = "pub"]
    parameters: Vec<TypeParameter>,

    indices_by_key: HashMap<GenericParameterKey, usize>,

    /// The conformance requirements grouped per canonical dependent type.
    #[get = "pub"]
    requirement_buckets: Vec<RequirementBucket>,

    /// Every normalized requirement, including the same-type, superclass
    /// and layout ones that are not bucketed.
    #[get = "pub"]
    requirements: Vec<Requirement>,
}

fn index_parameters(
    parameters: &[TypeParameter],
) -> Result<HashMap<GenericParameterKey, usize>, SignatureError> {
    let mut indices_by_key = HashMap::with_capacity(parameters.len());

    for (index, parameter) in parameters.iter().enumerate() {
        if indices_by_key.insert(parameter.key(), index).is_some() {
            return Err(SignatureError::DuplicateParameter(parameter.key()));
        }
    }

    Ok(indices_by_key)
}

impl GenericSignature {
    /// Builds a signature from the declared parameters and requirements.
    ///
    /// The requirements are canonicalized and deduplicated.
    ///
    /// # Errors
    ///
    /// See [`SignatureError`].
    pub fn new(
        parameters: Vec<TypeParameter>,
        requirements: impl IntoIterator<Item = Requirement>,
    ) -> Result<Self, SignatureError> {
        let indices_by_key = index_parameters(&parameters)?;

        let mut seen = BTreeSet::new();
        let mut normalized = Vec::new();

        for requirement in requirements {
            let requirement = requirement.canonical();

            if !requirement.subject().is_dependent() {
                return Err(SignatureError::NonDependentSubject {
                    requirement,
                });
            }

            let unknown = requirement.types().into_iter().find_map(|ty| {
                let mut unknown = None;
                ty.contains(|ty| {
                    unknown = ty
                        .as_parameter()
                        .map(TypeParameter::key)
                        .filter(|key| !indices_by_key.contains_key(key));
                    unknown.is_some()
                });
                unknown
            });

            if let Some(key) = unknown {
                return Err(SignatureError::UnknownParameter {
                    key,
                    requirement,
                });
            }

            if seen.insert(requirement.clone()) {
                normalized.push(requirement);
            }
        }

        let mut grouped = parameters
            .iter()
            .map(|parameter| {
                (Type::Parameter(parameter.canonical()), Vec::new())
            })
            .collect::<Vec<_>>();

        for requirement in &normalized {
            let Some(conformance) = requirement.as_conformance() else {
                continue;
            };

            match grouped
                .iter_mut()
                .find(|(subject, _)| subject == &conformance.subject)
            {
                Some((_, requirements)) => {
                    requirements.push(requirement.clone());
                }
                None => grouped.push((
                    conformance.subject.clone(),
                    vec![requirement.clone()],
                )),
            }
        }

        let requirement_buckets = grouped
            .into_iter()
            .map(|(subject, requirements)| {
                RequirementBucket::new(subject, requirements)
            })
            .collect();

        Ok(Self {
            parameters,
            indices_by_key,
            requirement_buckets,
            requirements: normalized,
        })
    }

    /// Assembles a signature from buckets an upstream builder has already
    /// normalized. Nothing is checked beyond parameter uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::DuplicateParameter`] if two parameters share
    /// a key.
    pub fn from_raw_parts(
        parameters: Vec<TypeParameter>,
        requirement_buckets: Vec<RequirementBucket>,
        requirements: Vec<Requirement>,
    ) -> Result<Self, SignatureError> {
        Ok(Self {
            indices_by_key: index_parameters(&parameters)?,
            parameters,
            requirement_buckets,
            requirements,
        })
    }

    /// Gets the number of declared parameters.
    #[must_use]
    pub fn parameter_count(&self) -> usize { self.parameters.len() }

    /// Gets the position of the parameter with the given key, `None` if the
    /// key doesn't belong to this signature.
    #[must_use]
    pub fn index_of(&self, key: GenericParameterKey) -> Option<usize> {
        self.indices_by_key.get(&key).copied()
    }

    /// Gets the declared parameter with the given key.
    #[must_use]
    pub fn parameter(
        &self,
        key: GenericParameterKey,
    ) -> Option<&TypeParameter> {
        self.index_of(key).map(|index| &self.parameters[index])
    }

    /// Returns `true` if the dependent type is rooted in a parameter of this
    /// signature.
    #[must_use]
    pub fn is_dependent_over(&self, ty: &Type) -> bool {
        ty.root_parameter()
            .is_some_and(|parameter| self.index_of(parameter.key()).is_some())
    }

    /// Gets the protocols the canonical dependent type is required to conform
    /// to.
    pub fn conformance_requirements_of<'a>(
        &'a self,
        subject: &'a Type,
    ) -> impl Iterator<Item = ProtocolID> + 'a {
        self.requirement_buckets
            .iter()
            .filter(move |bucket| bucket.subject() == subject)
            .flat_map(|bucket| bucket.requirements().iter())
            .filter_map(|requirement| {
                requirement.as_conformance().map(|x| x.protocol)
            })
    }

    /// Returns `true` if the signature requires `subject: protocol`.
    #[must_use]
    pub fn requires_conformance(
        &self,
        subject: &Type,
        protocol: ProtocolID,
    ) -> bool {
        self.conformance_requirements_of(subject).any(|x| x == protocol)
    }

    /// Gets the same-type requirements of the signature.
    pub fn same_type_requirements(
        &self,
    ) -> impl Iterator<Item = &SameTypeRequirement> {
        self.requirements.iter().filter_map(Requirement::as_same_type)
    }
}
