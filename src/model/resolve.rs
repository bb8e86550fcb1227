//! Name resolution and linking
//!
//! Turns the names written in raw declarations into qualified [`TypeRef`]s.
//! Simple names are looked up in this order: type variables in scope,
//! enclosing types and their member types, single-type imports, the
//! declaring package, on-demand imports, `java.lang`. A dotted name whose
//! first segment resolves that way is continued as a member type path;
//! otherwise it is taken as written. Names that no root declares become
//! unresolved placeholders carrying the best-known spelling.

use super::types::{Annotation, Field, Method, Parameter, Type, TypeParameter, TypeRef};
use crate::decl::{
    RawAnnotation, RawField, RawMethod, RawType, RawTypeParameter, TypeSyntax,
};
use crate::store::DeclarationStore;
use crate::util::{normalize_name, qualify, simple_name};
use std::sync::Arc;

/// `java.lang` types that resolve without a declaring root
const JAVA_LANG: &[&str] = &[
    "AutoCloseable",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "Cloneable",
    "Comparable",
    "Deprecated",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "FunctionalInterface",
    "IllegalArgumentException",
    "IllegalStateException",
    "Integer",
    "Iterable",
    "Long",
    "Math",
    "Number",
    "Object",
    "Override",
    "Record",
    "Runnable",
    "RuntimeException",
    "SafeVarargs",
    "Short",
    "String",
    "StringBuilder",
    "SuppressWarnings",
    "System",
    "Thread",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
];

/// Resolves names in the scope of one declaration
#[derive(Clone)]
pub struct NameResolver<'a> {
    store: &'a DeclarationStore,
    package: String,
    imports: Vec<crate::decl::RawImport>,
    /// Innermost first
    enclosing: Vec<Arc<RawType>>,
    /// Type variables in scope with their erased bound, innermost first
    variables: Vec<(String, String)>,
}

impl<'a> NameResolver<'a> {
    /// Scope of a type declaration: its imports, package, enclosing types and
    /// the type variables of all of them
    pub fn for_type(store: &'a DeclarationStore, raw: &Arc<RawType>) -> Self {
        let mut enclosing = vec![Arc::clone(raw)];
        let mut parent = raw.declaring_type.clone();
        while let Some(name) = parent {
            match store.find_declaration(&name) {
                Some(outer) => {
                    parent = outer.declaring_type.clone();
                    enclosing.push(outer);
                }
                None => break,
            }
        }
        let mut resolver = NameResolver {
            store,
            package: raw.scope.package.clone(),
            imports: raw.scope.imports.clone(),
            enclosing,
            variables: Vec::new(),
        };
        let scopes: Vec<Arc<RawType>> = resolver.enclosing.iter().rev().cloned().collect();
        for scope in scopes {
            resolver = resolver.with_variables(&scope.type_parameters);
        }
        resolver
    }

    /// Same scope with additional (method level) type variables
    pub fn with_variables(&self, parameters: &[RawTypeParameter]) -> Self {
        let mut next = self.clone();
        for p in parameters {
            let bound = p
                .bounds
                .first()
                .map(|b| next.erase(b))
                .unwrap_or_else(|| super::types::OBJECT.to_string());
            next.variables.insert(0, (p.name.clone(), bound));
        }
        next
    }

    fn variable(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(v, _)| v == name)
            .map(|(_, bound)| bound.as_str())
    }

    /// Erased qualified name of a syntax without resolving its arguments
    fn erase(&self, syntax: &TypeSyntax) -> String {
        match syntax {
            TypeSyntax::Named { name, .. } => match self.variable(name) {
                Some(bound) => bound.to_string(),
                None => self.resolve_name(name).0,
            },
            TypeSyntax::Array { element } => format!("{}[]", self.erase(element)),
            other => self.resolve(other).erasure(),
        }
    }

    pub fn resolve(&self, syntax: &TypeSyntax) -> TypeRef {
        match syntax {
            TypeSyntax::Primitive { name } => TypeRef::Primitive { name: name.clone() },
            TypeSyntax::Void => TypeRef::Void,
            TypeSyntax::Array { element } => TypeRef::Array {
                element: Box::new(self.resolve(element)),
            },
            TypeSyntax::Wildcard { upper, lower } => TypeRef::Wildcard {
                upper: upper.as_ref().map(|u| Box::new(self.resolve(u))),
                lower: lower.as_ref().map(|l| Box::new(self.resolve(l))),
            },
            TypeSyntax::Named { name, args } => {
                if let Some(bound) = self.variable(name) {
                    return TypeRef::Variable {
                        name: name.clone(),
                        bound: bound.to_string(),
                    };
                }
                let (qualified, resolved) = self.resolve_name(name);
                if !resolved {
                    tracing::debug!(name = %name, best = %qualified, "unresolved type reference");
                }
                TypeRef::Class {
                    name: qualified,
                    args: args.iter().map(|a| self.resolve(a)).collect(),
                    resolved,
                }
            }
        }
    }

    /// Qualified spelling of a (simple or dotted) type name, and whether a
    /// declaration backs it
    pub fn resolve_name(&self, name: &str) -> (String, bool) {
        let name = normalize_name(name);
        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name.as_str(), None),
        };
        if let Some((qualified, resolved)) = self.resolve_head(head) {
            return match rest {
                None => (qualified, resolved),
                Some(rest) => {
                    let full = format!("{}.{}", qualified, rest);
                    let resolved = self.store.contains(&full);
                    (full, resolved)
                }
            };
        }
        if rest.is_some() && self.store.contains(&name) {
            return (name, true);
        }
        (name, false)
    }

    fn resolve_head(&self, head: &str) -> Option<(String, bool)> {
        for scope in &self.enclosing {
            if scope.name == head {
                return Some((normalize_name(&scope.qualified_name), true));
            }
            if let Some(member) = scope.nested_type(head) {
                return Some((normalize_name(&member.qualified_name), true));
            }
        }
        if let Some(import) = self
            .imports
            .iter()
            .find(|i| !i.is_static && !i.on_demand && simple_name(&i.name) == head)
        {
            let qualified = normalize_name(&import.name);
            let resolved = self.store.contains(&qualified);
            return Some((qualified, resolved));
        }
        let same_package = qualify(&self.package, head);
        if self.store.contains(&same_package) {
            return Some((same_package, true));
        }
        for import in self.imports.iter().filter(|i| i.on_demand && !i.is_static) {
            let candidate = qualify(&import.name, head);
            if self.store.contains(&candidate) {
                return Some((candidate, true));
            }
        }
        let lang = qualify("java.lang", head);
        if JAVA_LANG.contains(&head) || self.store.contains(&lang) {
            return Some((lang, true));
        }
        None
    }

    pub fn annotation(&self, raw: &RawAnnotation) -> Annotation {
        let (type_name, resolved) = self.resolve_name(&raw.name);
        Annotation {
            type_name,
            resolved,
            elements: raw.elements.clone(),
        }
    }

    fn type_parameters(&self, parameters: &[RawTypeParameter]) -> Vec<TypeParameter> {
        parameters
            .iter()
            .map(|p| TypeParameter {
                name: p.name.clone(),
                bounds: p.bounds.iter().map(|b| self.resolve(b)).collect(),
            })
            .collect()
    }

    fn field(&self, raw: &RawField, declaring_type: &str) -> Field {
        Field {
            name: raw.name.clone(),
            flags: raw.flags,
            type_ref: self.resolve(&raw.type_syntax),
            annotations: raw.annotations.iter().map(|a| self.annotation(a)).collect(),
            constant: raw.constant.clone(),
            declaring_type: declaring_type.to_string(),
        }
    }

    fn method(&self, raw: &RawMethod, declaring_type: &str) -> Method {
        let scope = self.with_variables(&raw.type_parameters);
        Method {
            name: raw.name.clone(),
            flags: raw.flags,
            type_parameters: scope.type_parameters(&raw.type_parameters),
            return_type: raw.return_type.as_ref().map(|r| scope.resolve(r)),
            parameters: raw
                .parameters
                .iter()
                .map(|p| Parameter {
                    name: p.name.clone(),
                    type_ref: scope.resolve(&p.type_syntax),
                    varargs: p.varargs,
                    annotations: p.annotations.clone(),
                })
                .collect(),
            exceptions: raw.exceptions.iter().map(|e| scope.resolve(e)).collect(),
            annotations: raw.annotations.iter().map(|a| scope.annotation(a)).collect(),
            default_value: raw.default_value.clone(),
            body: raw.body.clone(),
            declaring_type: declaring_type.to_string(),
        }
    }
}

/// Link one raw declaration into a model type
pub fn link_type(store: &DeclarationStore, raw: &Arc<RawType>) -> Type {
    let resolver = NameResolver::for_type(store, raw);
    let qualified_name = normalize_name(&raw.qualified_name);
    let superclass = raw.superclass.as_ref().map(|s| resolver.resolve(s));
    if let Some(unresolved) = superclass.as_ref().filter(|s| s.is_unresolved()) {
        tracing::warn!(
            r#type = %qualified_name,
            superclass = %unresolved,
            "superclass is not declared in any root"
        );
    }
    Type {
        name: raw.name.clone(),
        qualified_name: qualified_name.clone(),
        package: raw.scope.package.clone(),
        kind: raw.kind,
        flags: raw.flags,
        type_parameters: resolver.type_parameters(&raw.type_parameters),
        superclass,
        interfaces: raw.interfaces.iter().map(|i| resolver.resolve(i)).collect(),
        fields: raw
            .fields
            .iter()
            .map(|f| resolver.field(f, &qualified_name))
            .collect(),
        methods: raw
            .methods
            .iter()
            .map(|m| resolver.method(m, &qualified_name))
            .collect(),
        annotations: raw
            .annotations
            .iter()
            .map(|a| resolver.annotation(a))
            .collect(),
        enum_constants: raw.enum_constants.clone(),
        nested: raw
            .nested
            .iter()
            .map(|n| normalize_name(&n.qualified_name))
            .collect(),
        declaring_type: raw.declaring_type.as_deref().map(normalize_name),
        has_errors: raw.has_errors,
        origin: raw.origin.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParseOptions;
    use crate::store::{BinaryRoot, SourceRoot};

    fn store() -> DeclarationStore {
        let sources = SourceRoot::new("src")
            .with_file(
                "app/Widget.java",
                r#"package app;
import lib.Base;
import util.*;
import java.util.List;
public class Widget<T extends Comparable<T>> extends Base implements Helper {
    public static class Part {}
    Part part;
    List<T> items;
    Sibling sibling;
    <E extends Number> E convert(T value) { return null; }
    String label;
    ghost.Thing thing;
}"#,
            )
            .with_file("app/Sibling.java", "package app; class Sibling {}")
            .with_file("util/Helper.java", "package util; public interface Helper {}");
        let binaries = BinaryRoot::from_json(
            "lib",
            r#"[{"name": "Base", "qualified_name": "lib.Base", "kind": "class"}]"#,
        )
        .unwrap();
        let mut store = DeclarationStore::new(ParseOptions::default(), true);
        store.add_root(Box::new(sources));
        store.add_root(Box::new(binaries));
        store
    }

    fn field_type(t: &Type, name: &str) -> TypeRef {
        t.field(name).unwrap().type_ref.clone()
    }

    #[test]
    fn test_resolution_order() {
        let store = store();
        let raw = store.find_declaration("app.Widget").unwrap();
        let widget = link_type(&store, &raw);

        assert_eq!(widget.superclass, Some(TypeRef::class("lib.Base")));
        assert_eq!(widget.interfaces, vec![TypeRef::class("util.Helper")]);
        assert_eq!(field_type(&widget, "part"), TypeRef::class("app.Widget.Part"));
        assert_eq!(field_type(&widget, "sibling"), TypeRef::class("app.Sibling"));
        assert_eq!(field_type(&widget, "label"), TypeRef::class("java.lang.String"));
    }

    #[test]
    fn test_type_variables_and_unresolved_imports() {
        let store = store();
        let raw = store.find_declaration("app.Widget").unwrap();
        let widget = link_type(&store, &raw);

        let items = field_type(&widget, "items");
        assert_eq!(items.name(), Some("java.util.List"));
        assert!(items.is_unresolved());
        assert_eq!(
            items.args()[0],
            TypeRef::Variable {
                name: "T".into(),
                bound: "java.lang.Comparable".into()
            }
        );

        let convert = widget.method("convert").unwrap();
        assert_eq!(
            convert.return_type,
            Some(TypeRef::Variable {
                name: "E".into(),
                bound: "java.lang.Number".into()
            })
        );
        assert_eq!(convert.erased_parameters(), vec!["java.lang.Comparable"]);
    }

    #[test]
    fn test_unknown_qualified_name_is_kept() {
        let store = store();
        let raw = store.find_declaration("app.Widget").unwrap();
        let widget = link_type(&store, &raw);
        assert_eq!(field_type(&widget, "thing"), TypeRef::unresolved("ghost.Thing"));
    }

    #[test]
    fn test_nested_type_links_to_parent() {
        let store = store();
        let raw = store.find_declaration("app.Widget.Part").unwrap();
        let part = link_type(&store, &raw);
        assert_eq!(part.declaring_type.as_deref(), Some("app.Widget"));
        assert_eq!(part.qualified_name, "app.Widget.Part");
    }
}
