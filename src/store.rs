//! Declaration store
//!
//! One lookup contract over any number of classpath roots. A root is either
//! a source root (relative path -> text, parsed lazily by a [`FrontEnd`]) or
//! a binary root (qualified name -> pre-compiled declaration). A type may
//! come from a source root while its supertype is binary-only.

use crate::decl::{RawCompilationUnit, RawType};
use crate::error::{Error, Result};
use crate::parse::{FrontEnd, JavaFrontEnd, ParseOptions};
use crate::util::{normalize_name, qualifier};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use walkdir::WalkDir;

/// Kind of a classpath root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Source,
    Binary,
}

/// Backing source of raw declarations
pub trait DeclarationSource: Send + Sync {
    fn kind(&self) -> RootKind;

    /// Root name for diagnostics
    fn name(&self) -> &str;

    /// Look up a (normalized, dotted) qualified name
    fn find_type(&self, qualified_name: &str, options: ParseOptions) -> Option<Arc<RawType>>;

    /// Top-level types declared in a package
    fn types_in_package(&self, package: &str, options: ParseOptions) -> Vec<Arc<RawType>>;

    /// Packages that contain at least one declaration
    fn packages(&self) -> BTreeSet<String>;

    /// Drop any cached state for a root-relative path
    fn invalidate(&self, _path: &str) {}

    fn as_source_root(&self) -> Option<&SourceRoot> {
        None
    }
}

// ============================================================================
// Source roots
// ============================================================================

/// Source root: relative path -> source text
pub struct SourceRoot {
    name: String,
    files: BTreeMap<String, String>,
    front_end: Arc<dyn FrontEnd>,
    units: Mutex<HashMap<String, Arc<RawCompilationUnit>>>,
}

impl SourceRoot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: BTreeMap::new(),
            front_end: Arc::new(JavaFrontEnd),
            units: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_front_end(mut self, front_end: Arc<dyn FrontEnd>) -> Self {
        self.front_end = front_end;
        self
    }

    pub fn with_file(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.add_file(path, source);
        self
    }

    pub fn add_file(&mut self, path: impl Into<String>, source: impl Into<String>) {
        let path = path.into().replace('\\', "/");
        self.files.insert(path, source.into());
    }

    /// Load every file with the front end's extension below `dir`
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut root = SourceRoot::new(dir.display().to_string());
        let extension = root.front_end.extension();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.map_err(|e| Error::Other(format!("walk {}: {}", dir.display(), e)))?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(extension)
            {
                continue;
            }
            let relative = path
                .strip_prefix(dir)
                .map_err(|e| Error::Other(e.to_string()))?
                .to_string_lossy()
                .replace('\\', "/");
            let source = std::fs::read_to_string(path)?;
            root.add_file(relative, source);
        }
        tracing::debug!(root = %root.name, files = root.files.len(), "loaded source root");
        Ok(root)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Parse (or fetch the cached parse of) one compilation unit
    pub fn compilation_unit(
        &self,
        path: &str,
        options: ParseOptions,
    ) -> Option<Arc<RawCompilationUnit>> {
        let source = self.files.get(path)?;
        let mut units = self.units.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(unit) = units.get(path) {
            return Some(Arc::clone(unit));
        }
        match self.front_end.parse(path, source, options) {
            Ok(unit) => {
                let unit = Arc::new(unit);
                units.insert(path.to_string(), Arc::clone(&unit));
                Some(unit)
            }
            Err(e) => {
                tracing::warn!(root = %self.name, path, error = %e, "front end failed");
                None
            }
        }
    }

    /// Compilation units directly inside a package directory
    pub fn units_in_package(
        &self,
        package: &str,
        options: ParseOptions,
    ) -> Vec<Arc<RawCompilationUnit>> {
        let paths: Vec<String> = self.paths_in_package(package).map(String::from).collect();
        paths
            .iter()
            .filter_map(|p| self.compilation_unit(p, options))
            .collect()
    }

    fn package_dir(package: &str) -> String {
        package.replace('.', "/")
    }

    /// Paths of the units directly inside a package directory
    fn paths_in_package<'a>(&'a self, package: &str) -> impl Iterator<Item = &'a str> + 'a {
        let dir = Self::package_dir(package);
        let extension = self.front_end.extension();
        self.files.keys().map(String::as_str).filter(move |path| {
            let parent = match path.rfind('/') {
                Some(idx) => &path[..idx],
                None => "",
            };
            parent == dir && path.ends_with(&format!(".{}", extension))
        })
    }

    /// Top-level type `package.name`: primary unit first, then secondary types
    fn find_top_level(&self, package: &str, name: &str, options: ParseOptions) -> Option<Arc<RawType>> {
        let dir = Self::package_dir(package);
        let primary = if dir.is_empty() {
            format!("{}.{}", name, self.front_end.extension())
        } else {
            format!("{}/{}.{}", dir, name, self.front_end.extension())
        };
        if let Some(found) = self
            .compilation_unit(&primary, options)
            .and_then(|unit| unit.find_type(name).cloned())
        {
            return Some(found);
        }
        let candidates: Vec<String> = self
            .paths_in_package(package)
            .filter(|p| *p != primary)
            .map(String::from)
            .collect();
        candidates.iter().find_map(|path| {
            self.compilation_unit(path, options)
                .and_then(|unit| unit.find_type(name).cloned())
        })
    }
}

impl DeclarationSource for SourceRoot {
    fn kind(&self) -> RootKind {
        RootKind::Source
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn find_type(&self, qualified_name: &str, options: ParseOptions) -> Option<Arc<RawType>> {
        let segments: Vec<&str> = qualified_name.split('.').collect();
        // Longest package prefix first; remaining segments are member types
        for top in (0..segments.len()).rev() {
            let package = segments[..top].join(".");
            if top > 0 && self.paths_in_package(&package).next().is_none() {
                continue;
            }
            if let Some(found) = self
                .find_top_level(&package, segments[top], options)
                .and_then(|t| t.nested_path(&segments[top + 1..]))
            {
                return Some(found);
            }
        }
        None
    }

    fn types_in_package(&self, package: &str, options: ParseOptions) -> Vec<Arc<RawType>> {
        self.units_in_package(package, options)
            .iter()
            .flat_map(|unit| unit.types.clone())
            .collect()
    }

    fn packages(&self) -> BTreeSet<String> {
        self.files
            .keys()
            .map(|path| match path.rfind('/') {
                Some(idx) => path[..idx].replace('/', "."),
                None => String::new(),
            })
            .collect()
    }

    fn invalidate(&self, path: &str) {
        let mut units = self.units.lock().unwrap_or_else(PoisonError::into_inner);
        if units.remove(path).is_some() {
            tracing::debug!(root = %self.name, path, "dropped cached compilation unit");
        }
    }

    fn as_source_root(&self) -> Option<&SourceRoot> {
        Some(self)
    }
}

// ============================================================================
// Binary roots
// ============================================================================

/// Binary root: qualified name -> pre-compiled declaration metadata
#[derive(Debug, Clone, Default)]
pub struct BinaryRoot {
    name: String,
    /// Every declared type including member types, by dotted qualified name
    index: BTreeMap<String, Arc<RawType>>,
    top_level: BTreeMap<String, Arc<RawType>>,
}

impl BinaryRoot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, raw: RawType) -> Self {
        self.add_type(raw);
        self
    }

    pub fn add_type(&mut self, raw: RawType) {
        let raw = Arc::new(raw.normalized());
        self.index_recursive(&raw);
        self.top_level
            .insert(normalize_name(&raw.qualified_name), raw);
    }

    fn index_recursive(&mut self, raw: &Arc<RawType>) {
        self.index
            .insert(normalize_name(&raw.qualified_name), Arc::clone(raw));
        for nested in &raw.nested {
            self.index_recursive(nested);
        }
    }

    /// Decode a JSON array of declarations
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self> {
        let types: Vec<RawType> = serde_json::from_str(json)?;
        let mut root = BinaryRoot::new(name);
        for raw in types {
            root.add_type(raw);
        }
        tracing::debug!(root = %root.name, types = root.index.len(), "decoded binary root");
        Ok(root)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl DeclarationSource for BinaryRoot {
    fn kind(&self) -> RootKind {
        RootKind::Binary
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn find_type(&self, qualified_name: &str, _options: ParseOptions) -> Option<Arc<RawType>> {
        self.index.get(qualified_name).cloned()
    }

    fn types_in_package(&self, package: &str, _options: ParseOptions) -> Vec<Arc<RawType>> {
        self.top_level
            .iter()
            .filter(|(name, _)| qualifier(name) == package)
            .map(|(_, t)| Arc::clone(t))
            .collect()
    }

    fn packages(&self) -> BTreeSet<String> {
        self.top_level
            .keys()
            .map(|name| qualifier(name).to_string())
            .collect()
    }
}

// ============================================================================
// Store
// ============================================================================

/// Lookup over an ordered list of roots; source roots win over binary roots
pub struct DeclarationStore {
    roots: Vec<Box<dyn DeclarationSource>>,
    options: ParseOptions,
    include_sources: bool,
    found: Mutex<HashMap<String, Arc<RawType>>>,
}

impl DeclarationStore {
    pub fn new(options: ParseOptions, include_sources: bool) -> Self {
        Self {
            roots: Vec::new(),
            options,
            include_sources,
            found: Mutex::new(HashMap::new()),
        }
    }

    pub fn add_root(&mut self, root: Box<dyn DeclarationSource>) {
        self.roots.push(root);
        // stable order: sources before binaries, insertion order otherwise
        self.roots.sort_by_key(|r| r.kind() == RootKind::Binary);
        self.clear();
    }

    fn active_roots(&self) -> impl Iterator<Item = &dyn DeclarationSource> {
        let include_sources = self.include_sources;
        self.roots
            .iter()
            .map(|r| r.as_ref())
            .filter(move |r| include_sources || r.kind() == RootKind::Binary)
    }

    /// Resolve a qualified (or binary `$`) name to its raw declaration
    pub fn find_declaration(&self, qualified_name: &str) -> Option<Arc<RawType>> {
        let name = normalize_name(qualified_name);
        if name.is_empty() {
            return None;
        }
        {
            let found = self.found.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(raw) = found.get(&name) {
                return Some(Arc::clone(raw));
            }
        }
        let raw = self
            .active_roots()
            .find_map(|root| root.find_type(&name, self.options))?;
        tracing::debug!(name = %name, "declaration found");
        self.found
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, Arc::clone(&raw));
        Some(raw)
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.find_declaration(qualified_name).is_some()
    }

    /// Top-level declarations of a package across all roots; the first root
    /// declaring a simple name shadows later ones
    pub fn declarations_in_package(&self, package: &str) -> Vec<Arc<RawType>> {
        let mut seen = BTreeSet::new();
        let mut result = Vec::new();
        for root in self.active_roots() {
            for raw in root.types_in_package(package, self.options) {
                if seen.insert(raw.qualified_name.clone()) {
                    result.push(raw);
                }
            }
        }
        result
    }

    pub fn packages(&self) -> BTreeSet<String> {
        self.active_roots().flat_map(|r| r.packages()).collect()
    }

    /// Raw compilation unit at a root-relative path in the first source root
    /// that has it
    pub fn compilation_unit(&self, path: &str) -> Option<Arc<RawCompilationUnit>> {
        if !self.include_sources {
            return None;
        }
        self.roots
            .iter()
            .filter_map(|r| r.as_source_root())
            .find_map(|root| root.compilation_unit(path, self.options))
    }

    /// Source compilation units of a package, first root first
    pub fn compilation_units_in_package(&self, package: &str) -> Vec<Arc<RawCompilationUnit>> {
        if !self.include_sources {
            return Vec::new();
        }
        self.roots
            .iter()
            .filter_map(|r| r.as_source_root())
            .flat_map(|root| root.units_in_package(package, self.options))
            .collect()
    }

    /// Drop the cached parse of `path` and every declaration found through it
    pub fn invalidate(&self, path: &str) {
        for root in &self.roots {
            root.invalidate(path);
        }
        let mut found = self.found.lock().unwrap_or_else(PoisonError::into_inner);
        found.retain(|_, raw| {
            !matches!(&raw.origin, crate::decl::Origin::Source { path: p } if p == path)
        });
    }

    pub fn clear(&self) {
        self.found
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn root_names(&self) -> Vec<&str> {
        self.roots.iter().map(|r| r.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{Origin, TypeKind};

    fn sources() -> SourceRoot {
        SourceRoot::new("src")
            .with_file(
                "app/Widget.java",
                "package app; public class Widget extends lib.Base { public static class Part {} }\nclass Secondary {}",
            )
            .with_file("app/other/Gadget.java", "package app.other; public interface Gadget {}")
    }

    fn binaries() -> BinaryRoot {
        BinaryRoot::from_json(
            "lib.jar",
            r#"[{"name": "Base", "qualified_name": "lib.Base", "kind": "class",
                 "nested": [{"name": "Inner", "qualified_name": "lib.Base.Inner", "kind": "enum"}]}]"#,
        )
        .unwrap()
    }

    fn store() -> DeclarationStore {
        let mut store = DeclarationStore::new(ParseOptions::default(), true);
        store.add_root(Box::new(binaries()));
        store.add_root(Box::new(sources()));
        store
    }

    #[test]
    fn test_primary_secondary_and_member_types() {
        let store = store();
        assert_eq!(store.find_declaration("app.Widget").unwrap().kind, TypeKind::Class);
        assert_eq!(
            store.find_declaration("app.Secondary").unwrap().qualified_name,
            "app.Secondary"
        );
        assert_eq!(
            store.find_declaration("app.Widget.Part").unwrap().qualified_name,
            "app.Widget.Part"
        );
        assert_eq!(
            store.find_declaration("app.Widget$Part").unwrap().qualified_name,
            "app.Widget.Part"
        );
        assert!(store.find_declaration("app.Missing").is_none());
        assert!(store.find_declaration("").is_none());
    }

    #[test]
    fn test_mixed_roots() {
        let store = store();
        let base = store.find_declaration("lib.Base").unwrap();
        assert_eq!(base.origin, Origin::Binary);
        let inner = store.find_declaration("lib.Base$Inner").unwrap();
        assert_eq!(inner.kind, TypeKind::Enum);
        let widget = store.find_declaration("app.Widget").unwrap();
        assert!(matches!(widget.origin, Origin::Source { .. }));
    }

    #[test]
    fn test_identity_of_cached_declarations() {
        let store = store();
        let a = store.find_declaration("app.Widget").unwrap();
        let b = store.find_declaration("app.Widget").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_declarations_in_package() {
        let store = store();
        let names: Vec<String> = store
            .declarations_in_package("app")
            .iter()
            .map(|t| t.qualified_name.clone())
            .collect();
        assert_eq!(names, vec!["app.Widget", "app.Secondary"]);
        assert_eq!(store.declarations_in_package("lib").len(), 1);
        assert_eq!(store.compilation_units_in_package("app").len(), 1);
        assert!(store.compilation_units_in_package("lib").is_empty());
        assert!(store.packages().contains("app.other"));
    }

    #[test]
    fn test_binary_only_mode_skips_sources() {
        let mut store = DeclarationStore::new(ParseOptions::default(), false);
        store.add_root(Box::new(sources()));
        store.add_root(Box::new(binaries()));
        assert!(store.find_declaration("app.Widget").is_none());
        assert!(store.find_declaration("lib.Base").is_some());
        assert!(store.compilation_unit("app/Widget.java").is_none());
    }

    #[test]
    fn test_invalidate_drops_parse() {
        let store = store();
        let first = store.compilation_unit("app/Widget.java").unwrap();
        store.invalidate("app/Widget.java");
        let second = store.compilation_unit("app/Widget.java").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.source_hash, second.source_hash);
    }
}
