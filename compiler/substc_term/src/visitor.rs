//! Implements the visitor pattern for [`Type`] terms.
//!
//! Context types and error placeholders are leaves: their back-links and
//! remembered originals are not visited.

use std::convert::Infallible;

use crate::r#type::{FunctionSignature, MemberType, Nominal, Tuple, Type};

/// Represents a visitor that visits a type recursively, parents before their
/// sub-terms.
pub trait Recursive {
    /// Visits a type.
    ///
    /// Returns `false` to stop the whole traversal.
    fn visit(&mut self, ty: &Type) -> bool;
}

/// Visits `ty` and all of its sub-terms with `visitor`.
///
/// Returns `false` if the visitor stopped the traversal early.
pub fn accept_recursive(ty: &Type, visitor: &mut impl Recursive) -> bool {
    if !visitor.visit(ty) {
        return false;
    }

    match ty {
        Type::Nominal(Nominal { arguments: types, .. })
        | Type::Tuple(Tuple { elements: types }) => {
            types.iter().all(|ty| accept_recursive(ty, visitor))
        }
        Type::FunctionSignature(FunctionSignature {
            parameters,
            return_type,
        }) => {
            parameters.iter().all(|ty| accept_recursive(ty, visitor))
                && accept_recursive(return_type, visitor)
        }
        Type::Member(MemberType { base, .. }) => {
            accept_recursive(base, visitor)
        }
        Type::Parameter(_) | Type::Context(_) | Type::Error(_) => true,
    }
}

/// Rewrites a type top-down.
///
/// For every visited type the transformer either returns a replacement, in
/// which case the replacement is used as-is without descending into it, or
/// `None`, in which case the type is rebuilt from its transformed sub-terms.
pub trait Transformer {
    /// The error that aborts the rewrite.
    type Error;

    /// Transforms a type.
    ///
    /// # Errors
    ///
    /// Any error aborts the whole rewrite and is returned by
    /// [`Type::try_transform`].
    fn transform(&mut self, ty: &Type) -> Result<Option<Type>, Self::Error>;
}

struct FnTransformer<F>(F);

impl<F: FnMut(&Type) -> Option<Type>> Transformer for FnTransformer<F> {
    type Error = Infallible;

    fn transform(&mut self, ty: &Type) -> Result<Option<Type>, Self::Error> {
        Ok((self.0)(ty))
    }
}

fn try_transform_all<T: Transformer + ?Sized>(
    types: &[Type],
    transformer: &mut T,
) -> Result<Vec<Type>, T::Error> {
    types.iter().map(|ty| ty.try_transform(transformer)).collect()
}

impl Type {
    /// Rewrites the type with the given [`Transformer`].
    ///
    /// # Errors
    ///
    /// Returns the first error the transformer reports.
    pub fn try_transform<T: Transformer + ?Sized>(
        &self,
        transformer: &mut T,
    ) -> Result<Self, T::Error> {
        if let Some(replacement) = transformer.transform(self)? {
            return Ok(replacement);
        }

        Ok(match self {
            Self::Nominal(nominal) => Self::Nominal(Nominal {
                name: nominal.name.clone(),
                arguments: try_transform_all(&nominal.arguments, transformer)?,
            }),
            Self::Tuple(tuple) => Self::Tuple(Tuple {
                elements: try_transform_all(&tuple.elements, transformer)?,
            }),
            Self::FunctionSignature(function) => {
                Self::FunctionSignature(FunctionSignature {
                    parameters: try_transform_all(
                        &function.parameters,
                        transformer,
                    )?,
                    return_type: Box::new(
                        function.return_type.try_transform(transformer)?,
                    ),
                })
            }
            Self::Member(member) => Self::Member(MemberType {
                base: Box::new(member.base.try_transform(transformer)?),
                name: member.name.clone(),
            }),
            Self::Parameter(_) | Self::Context(_) | Self::Error(_) => {
                self.clone()
            }
        })
    }

    /// Rewrites the type with an infallible closure, see [`Transformer`].
    #[must_use]
    pub fn transform(&self, f: impl FnMut(&Self) -> Option<Self>) -> Self {
        match self.try_transform(&mut FnTransformer(f)) {
            Ok(ty) => ty,
            Err(never) => match never {},
        }
    }
}
