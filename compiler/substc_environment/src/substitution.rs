//! Builds the [`SubstitutionMap`]s that instantiate the environment's
//! signature.

use log::{debug, warn};
use substc_term::{
    conformance::Conformance, protocol::ProtocolID, r#type::Type,
    substitution_map::SubstitutionMap,
};

use crate::{Error, ForeignParameterPolicy, GenericEnvironment};

impl GenericEnvironment {
    /// Builds a substitution map by visiting every requirement bucket of the
    /// signature.
    ///
    /// The subject of each bucket is mapped into context, then `subst`
    /// replaces its context types and parameters; a leaf `subst` can't
    /// replace becomes an error placeholder. Subjects that are bare
    /// parameters record a replacement. Each conformance requirement of the
    /// bucket is answered with `lookup_conformance(subject, replacement,
    /// protocol)`, and a conformance that isn't found is left out.
    ///
    /// A bucket rooted in a parameter foreign to the signature is handled as
    /// [`Config::foreign_parameters`](crate::Config::foreign_parameters)
    /// says.
    ///
    /// # Errors
    ///
    /// - [`Error::NonDependentBucket`] or
    ///   [`Error::MalformedRequirementBucket`] if the signature's buckets are
    ///   malformed.
    /// - [`Error::ForeignParameter`] for a foreign bucket under
    ///   [`ForeignParameterPolicy::Reject`].
    /// - [`Error::MismatchedConformance`] or
    ///   [`Error::UnresolvedConditionalRequirements`] if `lookup_conformance`
    ///   answers with an unusable conformance.
    /// - [`Error::InvalidSubstitutionMap`] if the finished map fails
    ///   verification.
    /// - Any error of [`Self::map_type_into_context`].
    pub fn substitution_map(
        &self,
        mut subst: impl FnMut(&Type) -> Option<Type>,
        mut lookup_conformance: impl FnMut(
            &Type,
            &Type,
            ProtocolID,
        ) -> Option<Conformance>,
    ) -> Result<SubstitutionMap, Error> {
        let mut substitution_map = SubstitutionMap::new();

        for bucket in self.signature.requirement_buckets() {
            let subject = bucket.subject();

            let Some(root) = subject.root_parameter() else {
                return Err(Error::NonDependentBucket(subject.clone()));
            };

            if self.signature.index_of(root.key()).is_none() {
                match self.config.foreign_parameters() {
                    ForeignParameterPolicy::Skip => {
                        warn!(
                            "skipping the requirement bucket of {subject}, \
                             {root} is not declared by the signature"
                        );
                        continue;
                    }
                    ForeignParameterPolicy::Reject => {
                        return Err(Error::ForeignParameter(root.clone()));
                    }
                }
            }

            let context_type = self.map_type_into_context(subject)?;
            let replacement = context_type.transform(|ty| match ty {
                Type::Context(_) | Type::Parameter(_) => Some(
                    subst(ty).unwrap_or_else(|| Type::error_for(ty.clone())),
                ),
                _ => None,
            });

            if let Some(parameter) = subject.as_parameter() {
                substitution_map
                    .add_substitution(parameter, replacement.clone())?;
            }

            for requirement in bucket.requirements() {
                let Some(conformance_requirement) = requirement.as_conformance()
                else {
                    return Err(Error::MalformedRequirementBucket {
                        subject: subject.clone(),
                        kind: requirement.kind(),
                    });
                };

                let protocol = conformance_requirement.protocol;
                let Some(conformance) =
                    lookup_conformance(subject, &replacement, protocol)
                else {
                    continue;
                };

                if conformance.protocol() != protocol {
                    return Err(Error::MismatchedConformance {
                        subject: subject.clone(),
                        expected: protocol,
                        found: conformance.protocol(),
                    });
                }

                if !conformance.conditional_requirements().is_empty() {
                    return Err(Error::UnresolvedConditionalRequirements {
                        subject: subject.clone(),
                        protocol,
                    });
                }

                substitution_map.add_conformance(subject.clone(), conformance)?;
            }
        }

        substitution_map.verify(&self.signature)?;

        debug!(
            "built a substitution map with {} replacements and {} \
             conformances",
            substitution_map.replacements().count(),
            substitution_map.conformances().count()
        );

        Ok(substitution_map)
    }

    /// Builds the substitution map restating the signature's own parameters
    /// as their context types, with abstract conformances.
    ///
    /// # Errors
    ///
    /// See [`Self::substitution_map`].
    pub fn forwarding_substitutions(&self) -> Result<SubstitutionMap, Error> {
        self.substitution_map(
            |ty| Some(ty.clone()),
            |_, replacement, protocol| {
                Some(Conformance::new_abstract(replacement.clone(), protocol))
            },
        )
    }
}
