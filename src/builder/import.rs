//! Import validator
//!
//! Session-scoped allocation of short names. `use_type` is memoized per
//! qualified name; a bare name that is already taken (or reserved) gets the
//! smallest free numeric suffix. Bindings keep first-use order, which makes
//! the allocation order observable, so one validator must never be shared by
//! concurrent renders.

use crate::util::{normalize_name, qualifier, simple_name};
use indexmap::IndexMap;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ImportValidator {
    package: String,
    reserved: HashSet<String>,
    taken: HashSet<String>,
    /// Qualified name -> short name, in first-use order
    bindings: IndexMap<String, String>,
    /// Types declared by the unit being rendered
    declared: HashSet<String>,
}

impl ImportValidator {
    /// Validator for a unit in `package`; same-package types are never imported
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Default::default()
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Keep `short_name` from ever being handed out
    pub fn reserve(&mut self, short_name: impl Into<String>) {
        self.reserved.insert(short_name.into());
    }

    pub fn is_reserved(&self, short_name: &str) -> bool {
        self.reserved.contains(short_name)
    }

    /// Bind a type declared by the unit to its own simple name and reserve
    /// that name against every other type
    pub fn declare(&mut self, qualified_name: &str) {
        let qualified_name = normalize_name(qualified_name);
        let short = simple_name(&qualified_name).to_string();
        self.reserved.insert(short.clone());
        self.taken.insert(short.clone());
        self.declared.insert(qualified_name.clone());
        self.bindings.entry(qualified_name).or_insert(short);
    }

    /// Short name for `qualified_name`, allocating one on first use
    pub fn use_type(&mut self, qualified_name: &str) -> String {
        let qualified_name = normalize_name(qualified_name);
        if let Some(short) = self.bindings.get(&qualified_name) {
            return short.clone();
        }
        let bare = simple_name(&qualified_name);
        let short = if self.is_free(bare) {
            bare.to_string()
        } else {
            (0u32..)
                .map(|i| format!("{}{}", bare, i))
                .find(|candidate| self.is_free(candidate))
                .unwrap_or_else(|| qualified_name.clone())
        };
        self.taken.insert(short.clone());
        self.bindings.insert(qualified_name, short.clone());
        short
    }

    fn is_free(&self, short: &str) -> bool {
        !self.taken.contains(short) && !self.reserved.contains(short)
    }

    /// Text to emit for a reference: the short name when it is the type's own
    /// simple name, otherwise the qualified name (a suffixed alias cannot be
    /// imported)
    pub fn reference(&mut self, qualified_name: &str) -> String {
        let qualified_name = normalize_name(qualified_name);
        let short = self.use_type(&qualified_name);
        if short == simple_name(&qualified_name) {
            short
        } else {
            qualified_name
        }
    }

    pub fn bindings(&self) -> &IndexMap<String, String> {
        &self.bindings
    }

    /// Qualified names needing an import statement, sorted: bound to their
    /// own simple name, not declared here, not in `java.lang`, not in the
    /// unit's package and not a member of a declared type
    pub fn imports(&self) -> Vec<String> {
        let mut imports: Vec<String> = self
            .bindings
            .iter()
            .filter(|(qualified, short)| {
                let owner = qualifier(qualified);
                simple_name(qualified) == short.as_str()
                    && !owner.is_empty()
                    && !self.declared.contains(qualified.as_str())
                    && !self.declared.contains(owner)
                    && owner != "java.lang"
                    && owner != self.package
            })
            .map(|(qualified, _)| qualified.clone())
            .collect();
        imports.sort();
        imports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_gets_suffix() {
        let mut v = ImportValidator::new("app");
        assert_eq!(v.use_type("a.pkg.Widget"), "Widget");
        assert_eq!(v.use_type("b.pkg.Widget"), "Widget0");
        assert_eq!(v.use_type("a.pkg.Widget"), "Widget");
        assert_eq!(v.use_type("c.pkg.Widget"), "Widget1");
    }

    #[test]
    fn test_reserved_names_are_never_handed_out() {
        let mut v = ImportValidator::new("app");
        v.reserve("Widget");
        assert!(v.is_reserved("Widget"));
        assert_eq!(v.use_type("a.pkg.Widget"), "Widget0");
        assert_eq!(v.reference("a.pkg.Widget"), "a.pkg.Widget");
    }

    #[test]
    fn test_suffix_skips_taken_candidates() {
        let mut v = ImportValidator::new("app");
        v.reserve("Widget0");
        assert_eq!(v.use_type("a.Widget"), "Widget");
        assert_eq!(v.use_type("b.Widget"), "Widget1");
    }

    #[test]
    fn test_imports_filtering() {
        let mut v = ImportValidator::new("app");
        v.declare("app.Service");
        v.reference("java.util.List");
        v.reference("java.lang.String");
        v.reference("app.Helper");
        v.reference("app.Service.Inner");
        v.reference("other.List");
        v.reference("java.util.Map$Entry");
        assert_eq!(v.imports(), vec!["java.util.List", "java.util.Map.Entry"]);
        assert_eq!(
            v.bindings().keys().cloned().collect::<Vec<_>>(),
            vec![
                "app.Service",
                "java.util.List",
                "java.lang.String",
                "app.Helper",
                "app.Service.Inner",
                "other.List",
                "java.util.Map.Entry"
            ]
        );
    }

    #[test]
    fn test_declared_type_keeps_its_name() {
        let mut v = ImportValidator::new("app");
        v.declare("app.Widget");
        assert_eq!(v.reference("app.Widget"), "Widget");
        assert_eq!(v.reference("lib.Widget"), "lib.Widget");
    }
}
