//! Environment model
//!
//! Typed, cross-linked views over the declaration store: types, members,
//! annotations and generic signatures, with supertype walks and generic
//! substitution.

mod environment;
mod generics;
mod hierarchy;
mod resolve;
mod types;

pub use environment::{Environment, EnvironmentBuilder};
pub use generics::TypeBindings;
pub use hierarchy::ResolvedMethod;
pub use resolve::{link_type, NameResolver};
pub use types::{
    Annotation, CompilationUnit, Field, Method, Parameter, Type, TypeParameter, TypeRef, OBJECT,
};
