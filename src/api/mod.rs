//! Versioned API resolution
//!
//! Generators that target several incompatible versions of a framework ask
//! the Environment for a capability (`env.api::<dyn S>()`); the registry picks
//! the variant registered for the detected framework version once, and the
//! Environment caches that choice for its lifetime. Calls on the returned
//! `Arc<dyn S>` dispatch to the chosen variant.

mod provider;
mod registry;
mod version;

pub use provider::{
    ApiVersionProvider, ConstantFieldVersionProvider, FixedVersionProvider, FnVersionProvider,
};
pub use registry::ApiRegistry;
pub use version::{ApiRequirement, ApiVersion};
