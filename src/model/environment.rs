//! Environment
//!
//! Session-scoped root over a fixed set of classpath roots. Owns the
//! declaration store and every cache derived from it: linked types (identity
//! cached by qualified name), linked compilation units, the detected framework
//! version and the selected API variants. All caches are guarded per
//! Environment, so independent Environments never share state.

use super::resolve::link_type;
use super::types::{CompilationUnit, Type, TypeRef};
use crate::api::{ApiRegistry, ApiRequirement, ApiVersion};
use crate::config::EnvironmentConfig;
use crate::decl::{Origin, RawType};
use crate::error::Result;
use crate::parse::ParseOptions;
use crate::store::{BinaryRoot, DeclarationSource, DeclarationStore, SourceRoot};
use crate::util::normalize_name;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

pub struct Environment {
    config: EnvironmentConfig,
    store: DeclarationStore,
    registry: Arc<ApiRegistry>,
    types: Mutex<HashMap<String, Arc<Type>>>,
    units: Mutex<HashMap<String, Arc<CompilationUnit>>>,
    version: OnceLock<Option<ApiVersion>>,
    /// Selected API variants, `TypeId::of::<S>()` -> `Arc<S>`
    apis: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

/// Collects roots and settings for an [`Environment`]
#[derive(Default)]
pub struct EnvironmentBuilder {
    config: EnvironmentConfig,
    roots: Vec<Box<dyn DeclarationSource>>,
    registry: Option<Arc<ApiRegistry>>,
}

impl EnvironmentBuilder {
    pub fn config(mut self, config: EnvironmentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn source_root(mut self, root: SourceRoot) -> Self {
        self.roots.push(Box::new(root));
        self
    }

    pub fn binary_root(mut self, root: BinaryRoot) -> Self {
        self.roots.push(Box::new(root));
        self
    }

    /// Any other backing source
    pub fn root(mut self, root: Box<dyn DeclarationSource>) -> Self {
        self.roots.push(root);
        self
    }

    pub fn api_registry(mut self, registry: Arc<ApiRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<Environment> {
        self.config.validate()?;
        let options = ParseOptions {
            method_bodies: self.config.parse_method_bodies,
        };
        let mut store = DeclarationStore::new(options, self.config.include_sources);
        for root in self.roots {
            store.add_root(root);
        }
        tracing::debug!(roots = ?store.root_names(), "environment created");
        Ok(Environment {
            config: self.config,
            store,
            registry: self.registry.unwrap_or_default(),
            types: Mutex::new(HashMap::new()),
            units: Mutex::new(HashMap::new()),
            version: OnceLock::new(),
            apis: Mutex::new(HashMap::new()),
        })
    }
}

impl Environment {
    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder::default()
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    pub fn store(&self) -> &DeclarationStore {
        &self.store
    }

    pub fn registry(&self) -> &ApiRegistry {
        &self.registry
    }

    /// Linked type for a qualified (or binary `$`) name.
    ///
    /// Returns the same `Arc` for the same name for the lifetime of the
    /// Environment (until [`Environment::recompute`] drops its unit).
    pub fn resolve(&self, qualified_name: &str) -> Option<Arc<Type>> {
        let key = normalize_name(qualified_name);
        let mut types = self.types.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(found) = types.get(&key) {
            return Some(Arc::clone(found));
        }
        let raw = self.store.find_declaration(&key)?;
        let linked = self.intern(&mut types, &raw);
        if linked.qualified_name != key {
            types.insert(key, Arc::clone(&linked));
        }
        Some(linked)
    }

    fn intern(&self, types: &mut HashMap<String, Arc<Type>>, raw: &Arc<RawType>) -> Arc<Type> {
        let qualified_name = normalize_name(&raw.qualified_name);
        if let Some(found) = types.get(&qualified_name) {
            return Arc::clone(found);
        }
        let linked = Arc::new(link_type(&self.store, raw));
        tracing::debug!(r#type = %qualified_name, "linked type");
        types.insert(qualified_name, Arc::clone(&linked));
        linked
    }

    /// Declaration behind a class or type variable reference
    pub fn resolve_ref(&self, reference: &TypeRef) -> Option<Arc<Type>> {
        match reference {
            TypeRef::Class { name, .. } => self.resolve(name),
            TypeRef::Variable { bound, .. } => self.resolve(bound),
            TypeRef::Wildcard { upper: Some(upper), .. } => self.resolve_ref(upper),
            _ => None,
        }
    }

    /// Linked compilation unit at a source-root-relative path
    pub fn compilation_unit(&self, path: &str) -> Option<Arc<CompilationUnit>> {
        {
            let units = self.units.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(unit) = units.get(path) {
                return Some(Arc::clone(unit));
            }
        }
        let raw = self.store.compilation_unit(path)?;
        let types = {
            let mut cache = self.types.lock().unwrap_or_else(PoisonError::into_inner);
            raw.types
                .iter()
                .map(|t| self.intern(&mut cache, t))
                .collect()
        };
        let unit = Arc::new(CompilationUnit {
            path: raw.path.clone(),
            package: raw.package.clone(),
            imports: raw.imports.clone(),
            types,
            has_errors: raw.has_errors,
            source_hash: raw.source_hash.clone(),
        });
        let mut units = self.units.lock().unwrap_or_else(PoisonError::into_inner);
        Some(Arc::clone(
            units.entry(path.to_string()).or_insert(unit),
        ))
    }

    /// Top-level types of a package across all roots
    pub fn types_in_package(&self, package: &str) -> Vec<Arc<Type>> {
        let raws = self.store.declarations_in_package(package);
        let mut cache = self.types.lock().unwrap_or_else(PoisonError::into_inner);
        raws.iter().map(|raw| self.intern(&mut cache, raw)).collect()
    }

    /// Drop and recompute everything derived from one source file. The next
    /// query re-parses it and yields new instances.
    pub fn recompute(&self, path: &str) {
        self.store.invalidate(path);
        self.units
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
        let mut types = self.types.lock().unwrap_or_else(PoisonError::into_inner);
        let before = types.len();
        types.retain(|_, t| !matches!(&t.origin, Origin::Source { path: p } if p == path));
        tracing::debug!(path, dropped = before - types.len(), "recomputing compilation unit");
    }

    /// Release every cached declaration, type and API selection
    pub fn dispose(self) {
        let types = self
            .types
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        tracing::debug!(types, "environment disposed");
    }

    // ------------------------------------------------------------------------
    // API selection
    // ------------------------------------------------------------------------

    /// Framework version detected by the registry's provider chain. Detected
    /// once; stable for the life of the Environment.
    pub fn api_version(&self) -> Option<ApiVersion> {
        self.version
            .get_or_init(|| {
                let detected = self.registry.detect(self);
                match &detected {
                    Some(version) => tracing::debug!(%version, "detected framework version"),
                    None => tracing::debug!("no framework version detected"),
                }
                detected
            })
            .clone()
    }

    /// Whether the detected version satisfies a requirement
    pub fn api_matches(&self, requirement: &ApiRequirement) -> bool {
        self.api_version()
            .is_some_and(|version| requirement.matches(&version))
    }

    /// Variant of capability `S` for this Environment's framework version.
    ///
    /// Selected on first use and cached; later calls return the same `Arc`.
    pub fn api<S>(&self) -> Result<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let version = self.api_version();
        let key = TypeId::of::<S>();
        let mut apis = self.apis.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(selected) = apis.get(&key).and_then(|b| b.downcast_ref::<Arc<S>>()) {
            return Ok(Arc::clone(selected));
        }
        let selected = self.registry.select::<S>(version.as_ref())?;
        apis.insert(key, Box::new(Arc::clone(&selected)));
        Ok(selected)
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("roots", &self.store.root_names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
