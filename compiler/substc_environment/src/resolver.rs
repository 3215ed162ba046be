//! Contains the [`Resolver`] trait and the default [`Archetypes`] resolver.

use std::collections::BTreeSet;

use substc_term::{
    generic_signature::GenericSignature,
    r#type::{ContextType, Type},
};

use crate::{Error, GenericEnvironment};

/// Materializes the context type of an interface type on behalf of a
/// [`GenericEnvironment`].
///
/// The environment calls the resolver only for canonical interface types
/// whose context type isn't known yet, and memoizes the result. The resolver
/// may map other types into the same environment, but requesting the type it
/// is materializing is reported as [`Error::CyclicResolution`].
pub trait Resolver: Send + Sync {
    /// Materializes the context type of `interface_type`.
    ///
    /// # Errors
    ///
    /// Any [`Error`] aborts the mapping that triggered the resolution.
    fn materialize(
        &self,
        interface_type: &Type,
        environment: &GenericEnvironment,
    ) -> Result<Type, Error>;
}

impl<F: Fn(&Type, &GenericEnvironment) -> Result<Type, Error> + Send + Sync>
    Resolver for F
{
    fn materialize(
        &self,
        interface_type: &Type,
        environment: &GenericEnvironment,
    ) -> Result<Type, Error> {
        self(interface_type, environment)
    }
}

/// Resolves interface types from the requirements of the environment's
/// signature.
///
/// The equivalence class of the interface type is the transitive closure of
/// the signature's same-type requirements. Every member of a class maps to
/// the same context type:
///
/// - A class containing a concrete type resolves to that type, mapped into
///   context.
/// - Otherwise the smallest dependent type of the class represents it, and
///   the other members resolve to the context type of the representative.
/// - The representative itself gets a fresh [`ContextType`], named after its
///   sugared form and bounded by the conformance requirements of the whole
///   class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Archetypes;

/// Orders dependent types by the length of their member chain, then
/// structurally; the smallest type of an equivalence class represents it.
fn reduction_order(ty: &Type) -> (usize, &Type) {
    let mut length = 0;
    let mut current = ty;

    while let Type::Member(member) = current {
        length += 1;
        current = &member.base;
    }

    (length, ty)
}

/// Collects every type the signature requires to equal `interface_type`,
/// directly or through other dependent types. Concrete types end the walk.
fn equivalence_class(
    signature: &GenericSignature,
    interface_type: &Type,
) -> BTreeSet<Type> {
    let mut class = BTreeSet::from([interface_type.clone()]);
    let mut pending = vec![interface_type.clone()];

    while let Some(current) = pending.pop() {
        for requirement in signature.same_type_requirements() {
            let other = if requirement.first == current {
                &requirement.second
            } else if requirement.second == current {
                &requirement.first
            } else {
                continue;
            };

            if class.insert(other.clone()) && other.is_dependent() {
                pending.push(other.clone());
            }
        }
    }

    class
}

impl Resolver for Archetypes {
    fn materialize(
        &self,
        interface_type: &Type,
        environment: &GenericEnvironment,
    ) -> Result<Type, Error> {
        let signature = environment.signature();
        let class = equivalence_class(signature, interface_type);

        let (concrete, dependent) =
            class.iter().partition::<Vec<_>, _>(|ty| !ty.is_dependent());

        if let Some(concrete) = concrete.first() {
            return environment.map_type_into_context(concrete);
        }

        let representative = dependent
            .into_iter()
            .min_by(|a, b| reduction_order(a).cmp(&reduction_order(b)))
            .unwrap_or(interface_type);

        if representative != interface_type {
            return environment.map_type_into_context(representative);
        }

        Ok(Type::Context(ContextType {
            name: environment.sugared_type(interface_type)?.to_string(),
            interface_type: Box::new(interface_type.clone()),
            conforms_to: class
                .iter()
                .flat_map(|ty| signature.conformance_requirements_of(ty))
                .collect(),
        }))
    }
}
