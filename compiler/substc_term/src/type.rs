//! Contains the definition of the [`Type`] term.

use std::{collections::BTreeSet, fmt};

use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use crate::{
    generic_parameter::{GenericParameterKey, TypeParameter},
    protocol::ProtocolID,
    visitor::{self, Recursive},
};

/// A nominal type with its generic arguments, denoted by `Name<A, B>`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Nominal {
    /// The name of the declaration.
    pub name: String,

    /// The generic arguments supplied to the declaration.
    pub arguments: Vec<Type>,
}

/// Represents a tuple type, denoted by `(A, B, ...)` syntax.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Tuple {
    /// The element types of the tuple.
    pub elements: Vec<Type>,
}

/// Represents a function signature object, denoted by `(A, B) -> R` syntax.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FunctionSignature {
    /// The list of function parameters.
    pub parameters: Vec<Type>,

    /// The return type of the function.
    pub return_type: Box<Type>,
}

/// A member type derived from a base type, e.g. `T.Element`.
///
/// When the base is rooted in a generic parameter the member is a dependent
/// type; an interface type may use it anywhere a parameter may appear.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MemberType {
    /// The type the member is looked up in.
    pub base: Box<Type>,

    /// The name of the associated type.
    pub name: String,
}

/// A placeholder type bound to a generic parameter (or dependent member
/// type) within one generic environment.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ContextType {
    /// The name the placeholder is displayed with.
    pub name: String,

    /// The interface type this placeholder was materialized from.
    ///
    /// Mapping a type out of context replaces the placeholder with it.
    pub interface_type: Box<Type>,

    /// The protocols the placeholder is known to conform to.
    pub conforms_to: BTreeSet<ProtocolID>,
}

/// Marks a position whose type couldn't be resolved.
///
/// Results carrying an error placeholder are erroneous but still usable for
/// diagnostics.
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
    Default,
)]
pub struct ErrorType {
    /// The type that failed to resolve, when known.
    pub original: Option<Box<Type>>,
}

/// Represents a type term.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumAsInner,
    Serialize,
    Deserialize,
    derive_more::From,
)]
#[allow(missing_docs)]
pub enum Type {
    Parameter(TypeParameter),
    Nominal(Nominal),
    Tuple(Tuple),
    FunctionSignature(FunctionSignature),
    Member(MemberType),
    Context(ContextType),
    Error(ErrorType),
}

impl Type {
    /// Creates a nominal type.
    #[must_use]
    pub fn nominal(name: impl Into<String>, arguments: Vec<Self>) -> Self {
        Self::Nominal(Nominal { name: name.into(), arguments })
    }

    /// Creates a canonical parameter type.
    #[must_use]
    pub const fn parameter(depth: u32, index: u32) -> Self {
        Self::Parameter(TypeParameter::canonical_with(GenericParameterKey {
            depth,
            index,
        }))
    }

    /// Creates a member type `self.name`.
    #[must_use]
    pub fn member(self, name: impl Into<String>) -> Self {
        Self::Member(MemberType { base: Box::new(self), name: name.into() })
    }

    /// Creates an error placeholder remembering `original`.
    #[must_use]
    pub fn error_for(original: Self) -> Self {
        Self::Error(ErrorType { original: Some(Box::new(original)) })
    }

    /// Gets the parameter a dependent type is rooted in.
    ///
    /// Returns `None` if the type is not a parameter nor a chain of member
    /// types ending in one.
    #[must_use]
    pub fn root_parameter(&self) -> Option<&TypeParameter> {
        match self {
            Self::Parameter(parameter) => Some(parameter),
            Self::Member(member) => member.base.root_parameter(),
            _ => None,
        }
    }

    /// Returns `true` if the type is a parameter or a member type rooted in
    /// one.
    #[must_use]
    pub fn is_dependent(&self) -> bool { self.root_parameter().is_some() }

    /// Returns `true` if any parameter leaf is found in the type.
    #[must_use]
    pub fn has_parameter(&self) -> bool {
        self.contains(|ty| matches!(ty, Self::Parameter(_)))
    }

    /// Returns `true` if any context-type leaf is found in the type.
    #[must_use]
    pub fn has_context(&self) -> bool {
        self.contains(|ty| matches!(ty, Self::Context(_)))
    }

    /// Returns `true` if any error placeholder is found in the type.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.contains(|ty| matches!(ty, Self::Error(_)))
    }

    /// Returns `true` if `predicate` holds for the type or any of its
    /// sub-terms.
    pub fn contains(&self, predicate: impl FnMut(&Self) -> bool) -> bool {
        struct Finder<F> {
            predicate: F,
            found: bool,
        }

        impl<F: FnMut(&Type) -> bool> Recursive for Finder<F> {
            fn visit(&mut self, ty: &Type) -> bool {
                self.found = (self.predicate)(ty);
                !self.found
            }
        }

        let mut finder = Finder { predicate, found: false };
        visitor::accept_recursive(self, &mut finder);

        finder.found
    }

    /// Strips the sugar of every parameter leaf.
    #[must_use]
    pub fn canonical(&self) -> Self {
        self.transform(|ty| {
            ty.as_parameter()
                .map(|parameter| Self::Parameter(parameter.canonical()))
        })
    }

    /// Replaces every dependent type (parameters and member types rooted in
    /// them) with an error placeholder.
    ///
    /// This is what mapping a type in or out of context produces when there
    /// is no generic environment to map with.
    #[must_use]
    pub fn substitute_dependent_types_with_errors(&self) -> Self {
        self.transform(|ty| {
            ty.is_dependent().then(|| Self::error_for(ty.clone()))
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, types: &[Type]) -> fmt::Result {
            for (i, ty) in types.iter().enumerate() {
                if i != 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{ty}")?;
            }

            Ok(())
        }

        match self {
            Self::Parameter(parameter) => write!(f, "{parameter}"),
            Self::Nominal(nominal) => {
                f.write_str(&nominal.name)?;

                if !nominal.arguments.is_empty() {
                    f.write_str("<")?;
                    list(f, &nominal.arguments)?;
                    f.write_str(">")?;
                }

                Ok(())
            }
            Self::Tuple(tuple) => {
                f.write_str("(")?;
                list(f, &tuple.elements)?;
                f.write_str(")")
            }
            Self::FunctionSignature(function) => {
                f.write_str("(")?;
                list(f, &function.parameters)?;
                write!(f, ") -> {}", function.return_type)
            }
            Self::Member(member) => {
                write!(f, "{}.{}", member.base, member.name)
            }
            Self::Context(context) => f.write_str(&context.name),
            Self::Error(_) => f.write_str("<<error type>>"),
        }
    }
}
