//! Translates types between their interface and context forms.

use substc_term::{
    generic_parameter::TypeParameter,
    r#type::{MemberType, Type},
    visitor::Transformer,
};

use crate::{Error, GenericEnvironment};

struct IntoContext<'a> {
    environment: &'a GenericEnvironment,
}

impl Transformer for IntoContext<'_> {
    type Error = Error;

    fn transform(&mut self, ty: &Type) -> Result<Option<Type>, Self::Error> {
        match ty {
            Type::Parameter(parameter) => {
                let key = parameter.key();

                if self.environment.signature.index_of(key).is_none() {
                    return Ok(Some(ty.clone()));
                }

                self.environment.resolve(key).map(Some)
            }

            Type::Member(member) if ty.is_dependent() => {
                self.map_member(ty, member).map(Some)
            }

            _ => Ok(None),
        }
    }
}

impl IntoContext<'_> {
    fn map_member(
        &mut self,
        ty: &Type,
        member: &MemberType,
    ) -> Result<Type, Error> {
        if !self.environment.signature.is_dependent_over(ty) {
            return Ok(ty.clone());
        }

        let base = member.base.try_transform(self)?;

        match base {
            Type::Context(_) if self.environment.resolver.is_some() => {
                self.environment.resolve_member(ty)
            }

            // without a resolver nor conformances there's no way to tell
            // what the member names
            _ => Ok(Type::error_for(ty.clone())),
        }
    }
}

impl GenericEnvironment {
    /// Maps an interface type into this environment's context.
    ///
    /// Every parameter of the signature is replaced by its context type,
    /// resolving it on first use. Parameters the signature doesn't declare
    /// are left as-is. A dependent member type whose base can't be
    /// materialized becomes an error placeholder.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyContextual`] if `ty` contains context types.
    /// - [`Error::IncompleteSubstitution`] if a parameter of the signature
    ///   survives the mapping without an error placeholder explaining it.
    /// - Any error of [`Self::resolve`].
    pub fn map_type_into_context(&self, ty: &Type) -> Result<Type, Error> {
        if ty.has_context() {
            return Err(Error::AlreadyContextual(ty.clone()));
        }

        let result = ty.try_transform(&mut IntoContext { environment: self })?;

        if !result.has_error()
            && result.contains(|ty| {
                ty.as_parameter().is_some_and(|parameter| {
                    self.signature.index_of(parameter.key()).is_some()
                })
            })
        {
            return Err(Error::IncompleteSubstitution(result));
        }

        Ok(result)
    }

    /// Maps a single parameter into context. Unlike
    /// [`Self::map_type_into_context`], a parameter foreign to the signature
    /// yields an error placeholder.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve`].
    pub fn map_parameter_into_context(
        &self,
        parameter: &TypeParameter,
    ) -> Result<Type, Error> {
        if self.signature.index_of(parameter.key()).is_none() {
            return Ok(Type::error_for(Type::Parameter(parameter.clone())));
        }

        self.resolve(parameter.key())
    }

    /// Maps a contextual type back to its interface form: every context type
    /// is replaced by the interface type it records.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyInterface`] if `ty` contains generic parameters.
    /// - [`Error::IncompleteSubstitution`] if a context type remains.
    pub fn map_type_out_of_context(&self, ty: &Type) -> Result<Type, Error> {
        if ty.has_parameter() {
            return Err(Error::AlreadyInterface(ty.clone()));
        }

        let result = ty.transform(|ty| {
            ty.as_context().map(|context| (*context.interface_type).clone())
        });

        if result.has_context() {
            return Err(Error::IncompleteSubstitution(result));
        }

        Ok(result)
    }
}

/// Maps `ty` into the context of `environment`.
///
/// Without an environment every dependent type is replaced by an error
/// placeholder.
///
/// # Errors
///
/// See [`GenericEnvironment::map_type_into_context`].
pub fn map_type_into_context(
    environment: Option<&GenericEnvironment>,
    ty: &Type,
) -> Result<Type, Error> {
    match environment {
        Some(environment) => environment.map_type_into_context(ty),
        None if ty.has_context() => Err(Error::AlreadyContextual(ty.clone())),
        None => Ok(ty.substitute_dependent_types_with_errors()),
    }
}

/// Maps `ty` out of the context of `environment`.
///
/// Without an environment every dependent type is replaced by an error
/// placeholder.
///
/// # Errors
///
/// See [`GenericEnvironment::map_type_out_of_context`].
pub fn map_type_out_of_context(
    environment: Option<&GenericEnvironment>,
    ty: &Type,
) -> Result<Type, Error> {
    match environment {
        Some(environment) => environment.map_type_out_of_context(ty),
        None if ty.has_parameter() => {
            Err(Error::AlreadyInterface(ty.clone()))
        }
        None => Ok(ty.substitute_dependent_types_with_errors()),
    }
}

#[cfg(test)]
mod test;
