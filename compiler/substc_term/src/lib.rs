//! Contains the definition of the terms the generic environment works on:
//! types, generic parameters, protocols, conformances, requirements, generic
//! signatures and substitution maps.

pub mod conformance;
pub mod generic_parameter;
pub mod generic_signature;
pub mod protocol;
pub mod requirement;
pub mod substitution_map;
pub mod r#type;
pub mod visitor;
