//! Restores the parameter names the author wrote, for diagnostics.

use substc_term::{
    generic_parameter::TypeParameter, r#type::Type, visitor::Transformer,
};

use crate::{Error, GenericEnvironment};

struct Sugar<'a> {
    environment: &'a GenericEnvironment,
}

impl Transformer for Sugar<'_> {
    type Error = Error;

    fn transform(&mut self, ty: &Type) -> Result<Option<Type>, Self::Error> {
        let Some(parameter) = ty.as_parameter() else {
            return Ok(None);
        };

        self.environment
            .sugared_parameter(parameter)
            .map(|sugared| Some(Type::Parameter(sugared.clone())))
    }
}

impl GenericEnvironment {
    /// Gets the declared parameter semantically equal to `parameter`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSugaredParameter`] if the signature declares no
    /// such parameter.
    pub fn sugared_parameter(
        &self,
        parameter: &TypeParameter,
    ) -> Result<&TypeParameter, Error> {
        self.signature
            .parameter(parameter.key())
            .ok_or_else(|| Error::MissingSugaredParameter(parameter.clone()))
    }

    /// Replaces every parameter in `ty` with its sugared form, leaving the
    /// rest of the structure untouched.
    ///
    /// # Errors
    ///
    /// See [`Self::sugared_parameter`].
    pub fn sugared_type(&self, ty: &Type) -> Result<Type, Error> {
        ty.try_transform(&mut Sugar { environment: self })
    }
}
