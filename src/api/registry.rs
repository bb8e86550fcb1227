//! API specification registry
//!
//! A specification is a capability trait `S` (used as `dyn S`). Each variant
//! is an `Arc<S>` tagged with an inclusive maximum version, or untagged as
//! the always-applicable fallback. For a detected version `v` the variant
//! with the smallest marker that is still `>= v` wins; when no marker
//! qualifies, or no version was detected, the fallback is used.

use super::provider::ApiVersionProvider;
use super::version::ApiVersion;
use crate::error::{Error, Result};
use crate::model::Environment;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

struct Variant {
    max_version: Option<ApiVersion>,
    /// `Arc<S>`
    implementation: Box<dyn Any + Send + Sync>,
}

struct Specification {
    name: &'static str,
    /// Markers descending, fallback last
    variants: Vec<Variant>,
}

#[derive(Default)]
pub struct ApiRegistry {
    specifications: HashMap<TypeId, Specification>,
    providers: Vec<Box<dyn ApiVersionProvider>>,
}

impl ApiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variant of specification `S`.
    ///
    /// A second variant with an equal marker (or a second fallback) is a
    /// configuration error.
    pub fn register<S>(&mut self, max_version: Option<ApiVersion>, implementation: Arc<S>) -> Result<()>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let spec = self
            .specifications
            .entry(TypeId::of::<S>())
            .or_insert_with(|| Specification {
                name: type_name::<S>(),
                variants: Vec::new(),
            });
        if spec.variants.iter().any(|v| v.max_version == max_version) {
            let marker = max_version
                .map(|v| format!("maximum version {}", v))
                .unwrap_or_else(|| "no version marker".to_string());
            return Err(Error::Configuration(format!(
                "{} already has a variant with {}",
                spec.name, marker
            )));
        }
        spec.variants.push(Variant {
            max_version,
            implementation: Box::new(implementation),
        });
        // None sorts first in Option's order; reversed it lands last
        spec.variants
            .sort_by(|a, b| b.max_version.cmp(&a.max_version));
        tracing::debug!(spec = spec.name, variants = spec.variants.len(), "registered API variant");
        Ok(())
    }

    /// Chaining form of [`ApiRegistry::register`]
    pub fn with_variant<S>(mut self, max_version: Option<ApiVersion>, implementation: Arc<S>) -> Result<Self>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.register(max_version, implementation)?;
        Ok(self)
    }

    /// Append a version provider to the detection chain
    pub fn add_provider(&mut self, provider: Box<dyn ApiVersionProvider>) {
        self.providers.push(provider);
    }

    pub fn with_provider(mut self, provider: Box<dyn ApiVersionProvider>) -> Self {
        self.add_provider(provider);
        self
    }

    /// Version markers of `S`, descending, `None` for the fallback
    pub fn variants<S>(&self) -> Vec<Option<ApiVersion>>
    where
        S: ?Sized + 'static,
    {
        self.specifications
            .get(&TypeId::of::<S>())
            .map(|spec| spec.variants.iter().map(|v| v.max_version.clone()).collect())
            .unwrap_or_default()
    }

    /// Run the provider chain; first non-empty answer wins
    pub fn detect(&self, env: &Environment) -> Option<ApiVersion> {
        self.providers.iter().find_map(|provider| {
            let version = provider.detect(env)?;
            tracing::debug!(provider = provider.name(), %version, "version provider matched");
            Some(version)
        })
    }

    /// Variant of `S` for a detected version
    pub fn select<S>(&self, version: Option<&ApiVersion>) -> Result<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let unresolvable = || Error::UnresolvableApi {
            spec: type_name::<S>().to_string(),
            version: version
                .map(ApiVersion::to_string)
                .unwrap_or_else(|| "undetected".to_string()),
        };
        let spec = self
            .specifications
            .get(&TypeId::of::<S>())
            .ok_or_else(unresolvable)?;

        // Descending order: the last marker still >= version is the tightest
        let tightest = version.and_then(|v| {
            spec.variants
                .iter()
                .filter(|variant| variant.max_version.as_ref().is_some_and(|max| max >= v))
                .last()
        });
        let fallback = || spec.variants.iter().find(|v| v.max_version.is_none());
        let chosen = tightest.or_else(fallback).ok_or_else(unresolvable)?;

        tracing::debug!(
            spec = spec.name,
            version = ?version.map(ApiVersion::to_string),
            variant = ?chosen.max_version.as_ref().map(ApiVersion::to_string),
            "selected API variant"
        );
        chosen
            .implementation
            .downcast_ref::<Arc<S>>()
            .cloned()
            .ok_or_else(|| Error::Other(format!("variant of {} has a foreign type", spec.name)))
    }
}

impl fmt::Debug for ApiRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let specs: Vec<&str> = self.specifications.values().map(|s| s.name).collect();
        let providers: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("ApiRegistry")
            .field("specifications", &specs)
            .field("providers", &providers)
            .finish()
    }
}
