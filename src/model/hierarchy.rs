//! Supertype walks, member lookup and override detection

use super::environment::Environment;
use super::generics::TypeBindings;
use super::types::{Method, Type, TypeRef};
use crate::decl::Flags;
use std::collections::HashSet;
use std::sync::Arc;

/// A method found through a (possibly parameterized) type reference, with
/// its signature substituted for that use site
#[derive(Debug, Clone)]
pub struct ResolvedMethod {
    pub declaring_type: Arc<Type>,
    index: usize,
    pub return_type: Option<TypeRef>,
    pub parameter_types: Vec<TypeRef>,
}

impl ResolvedMethod {
    fn new(declaring_type: &Arc<Type>, index: usize, bindings: &TypeBindings) -> Self {
        let method = &declaring_type.methods[index];
        let bindings = bindings.without(method.type_parameters.iter().map(|p| p.name.as_str()));
        ResolvedMethod {
            declaring_type: Arc::clone(declaring_type),
            index,
            return_type: method.return_type.as_ref().map(|r| bindings.apply(r)),
            parameter_types: method
                .parameters
                .iter()
                .map(|p| bindings.apply(&p.type_ref))
                .collect(),
        }
    }

    /// Declared (unsubstituted) method
    pub fn method(&self) -> &Method {
        &self.declaring_type.methods[self.index]
    }
}

impl Environment {
    /// Direct supertypes of a reference, substituted with its arguments
    pub fn supertypes(&self, reference: &TypeRef) -> Vec<TypeRef> {
        match self.resolve_ref(reference) {
            Some(ty) => {
                let bindings = TypeBindings::bind(&ty, reference.args());
                direct_supertypes(&ty, &bindings)
            }
            None => Vec::new(),
        }
    }

    /// Linearized ancestors: the superclass chain first, then interfaces
    /// depth-first in declaration order; each type once. Unresolvable links
    /// are skipped.
    pub fn ancestors(&self, ty: &Type) -> Vec<Arc<Type>> {
        self.linearize(&ty.self_ref())
            .into_iter()
            .skip(1)
            .map(|(t, _)| t)
            .collect()
    }

    /// `reference` itself followed by its ancestors, each with the bindings
    /// in effect for it
    fn linearize(&self, reference: &TypeRef) -> Vec<(Arc<Type>, TypeBindings)> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        let mut current = Some(reference.clone());
        while let Some(r) = current.take() {
            let Some(ty) = self.resolve_ref(&r) else {
                break;
            };
            if !seen.insert(ty.qualified_name.clone()) {
                break;
            }
            let bindings = TypeBindings::bind(&ty, r.args());
            current = ty.superclass.as_ref().map(|s| bindings.apply(s));
            out.push((ty, bindings));
        }

        let chain_len = out.len();
        for i in 0..chain_len {
            let (ty, bindings) = out[i].clone();
            for interface in &ty.interfaces {
                self.visit_interface(&bindings.apply(interface), &mut seen, &mut out);
            }
        }
        out
    }

    fn visit_interface(
        &self,
        reference: &TypeRef,
        seen: &mut HashSet<String>,
        out: &mut Vec<(Arc<Type>, TypeBindings)>,
    ) {
        let Some(ty) = self.resolve_ref(reference) else {
            return;
        };
        if !seen.insert(ty.qualified_name.clone()) {
            return;
        }
        let bindings = TypeBindings::bind(&ty, reference.args());
        out.push((Arc::clone(&ty), bindings.clone()));
        for parent in &ty.interfaces {
            self.visit_interface(&bindings.apply(parent), seen, out);
        }
    }

    /// First method named `name` accepting `arity` arguments, searching the
    /// type and then its ancestors
    pub fn find_method(&self, reference: &TypeRef, name: &str, arity: usize) -> Option<ResolvedMethod> {
        self.lookup_method(reference, |m| m.name == name && m.accepts(arity))
    }

    fn lookup_method(
        &self,
        reference: &TypeRef,
        matches: impl Fn(&Method) -> bool,
    ) -> Option<ResolvedMethod> {
        self.linearize(reference).iter().find_map(|(ty, bindings)| {
            ty.methods
                .iter()
                .position(|m| !m.is_constructor() && matches(m))
                .map(|index| ResolvedMethod::new(ty, index, bindings))
        })
    }

    /// Substituted return type of the first method named `name`
    pub fn method_return_type(&self, reference: &TypeRef, name: &str) -> Option<TypeRef> {
        self.lookup_method(reference, |m| m.name == name)?
            .return_type
    }

    /// Substituted type of a field, searching ancestors
    pub fn field_type(&self, reference: &TypeRef, name: &str) -> Option<TypeRef> {
        self.linearize(reference).iter().find_map(|(ty, bindings)| {
            ty.field(name).map(|f| bindings.apply(&f.type_ref))
        })
    }

    /// Same name, same arity and positionally equal erased parameter types.
    /// Return types are not compared.
    pub fn overrides(&self, method: &Method, candidate: &Method) -> bool {
        !method.is_constructor()
            && !candidate.is_constructor()
            && method.name == candidate.name
            && method.parameters.len() == candidate.parameters.len()
            && method.erased_parameters() == candidate.erased_parameters()
    }

    /// Nearest ancestor method that `method` (declared in `ty`) overrides.
    ///
    /// Ancestor parameters are compared both as declared and as substituted
    /// through the use site, so `set(String)` overrides `set(T)` of a
    /// `Holder<String>` supertype.
    pub fn find_overridden(&self, ty: &Type, method: &Method) -> Option<ResolvedMethod> {
        if method.is_constructor() || method.flags.contains(Flags::STATIC) {
            return None;
        }
        let erased = method.erased_parameters();
        self.linearize(&ty.self_ref())
            .iter()
            .skip(1)
            .find_map(|(ancestor, bindings)| {
                ancestor.methods.iter().enumerate().find_map(|(index, candidate)| {
                    if candidate.flags.contains(Flags::PRIVATE)
                        || candidate.flags.contains(Flags::STATIC)
                    {
                        return None;
                    }
                    if self.overrides(method, candidate) {
                        return Some(ResolvedMethod::new(ancestor, index, bindings));
                    }
                    let resolved = ResolvedMethod::new(ancestor, index, bindings);
                    let substituted: Vec<String> =
                        resolved.parameter_types.iter().map(TypeRef::erasure).collect();
                    (candidate.name == method.name
                        && !candidate.is_constructor()
                        && substituted == erased)
                        .then_some(resolved)
                })
            })
    }

    /// `ty` is `qualified_name` or has it among its ancestors
    pub fn is_subtype_of(&self, ty: &Type, qualified_name: &str) -> bool {
        ty.qualified_name == qualified_name
            || self
                .ancestors(ty)
                .iter()
                .any(|a| a.qualified_name == qualified_name)
    }
}

fn direct_supertypes(ty: &Type, bindings: &TypeBindings) -> Vec<TypeRef> {
    ty.superclass
        .iter()
        .chain(ty.interfaces.iter())
        .map(|s| bindings.apply(s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BinaryRoot, SourceRoot};

    fn env() -> Environment {
        let sources = SourceRoot::new("src")
            .with_file(
                "gen/Box.java",
                "package gen; public class Box<T> { T value; public T get() { return value; } public void set(T value) {} }",
            )
            .with_file(
                "gen/StringBox.java",
                "package gen; public class StringBox extends Box<String> implements Named { public void set(String value) {} }",
            )
            .with_file(
                "gen/Named.java",
                "package gen; public interface Named extends Labeled { String name(); }",
            )
            .with_file("gen/Labeled.java", "package gen; public interface Labeled { String label(); }")
            .with_file(
                "gen/Orphan.java",
                "package gen; public final class Orphan extends missing.Parent {}",
            );
        let binaries = BinaryRoot::from_json(
            "runtime",
            r#"[{"name": "Holder", "qualified_name": "rt.Holder", "kind": "interface",
                 "type_parameters": [{"name": "V"}],
                 "methods": [{"name": "held", "return_type": {"kind": "named", "name": "V"}}]}]"#,
        )
        .unwrap();
        Environment::builder()
            .source_root(sources)
            .binary_root(binaries)
            .build()
            .unwrap()
    }

    fn string() -> TypeRef {
        TypeRef::class("java.lang.String")
    }

    #[test]
    fn test_substituted_return_types() {
        let env = env();
        let boxed = TypeRef::generic("gen.Box", vec![string()]);
        assert_eq!(env.method_return_type(&boxed, "get"), Some(string()));

        let nested = TypeRef::generic("gen.Box", vec![boxed.clone()]);
        let inner = env.method_return_type(&nested, "get").unwrap();
        assert_eq!(inner, boxed);
        assert_eq!(env.method_return_type(&inner, "get"), Some(string()));
        assert_eq!(env.field_type(&nested, "value"), Some(boxed));
    }

    #[test]
    fn test_inherited_members_through_parameterized_superclass() {
        let env = env();
        let sub = TypeRef::class("gen.StringBox");
        assert_eq!(env.method_return_type(&sub, "get"), Some(string()));
        let found = env.find_method(&sub, "label", 0).unwrap();
        assert_eq!(found.declaring_type.qualified_name, "gen.Labeled");
        assert!(env.find_method(&sub, "get", 3).is_none());
    }

    #[test]
    fn test_binary_generic_members() {
        let env = env();
        let holder = TypeRef::generic("rt.Holder", vec![string()]);
        assert_eq!(env.method_return_type(&holder, "held"), Some(string()));
    }

    #[test]
    fn test_ancestors_linearized() {
        let env = env();
        let sub = env.resolve("gen.StringBox").unwrap();
        let names: Vec<String> = env
            .ancestors(&sub)
            .iter()
            .map(|t| t.qualified_name.clone())
            .collect();
        assert_eq!(names, vec!["gen.Box", "gen.Named", "gen.Labeled"]);
        assert!(env.is_subtype_of(&sub, "gen.Labeled"));
        assert!(!env.is_subtype_of(&sub, "gen.Orphan"));
    }

    #[test]
    fn test_supertypes_substituted() {
        let env = env();
        let supers = env.supertypes(&TypeRef::class("gen.StringBox"));
        assert_eq!(
            supers,
            vec![
                TypeRef::generic("gen.Box", vec![string()]),
                TypeRef::class("gen.Named")
            ]
        );
    }

    #[test]
    fn test_override_detection() {
        let env = env();
        let sub = env.resolve("gen.StringBox").unwrap();
        let set = sub.method("set").unwrap();
        let overridden = env.find_overridden(&sub, set).unwrap();
        assert_eq!(overridden.declaring_type.qualified_name, "gen.Box");

        let boxed = env.resolve("gen.Box").unwrap();
        let get = boxed.method("get").unwrap();
        assert!(env.overrides(get, get));
        assert!(!env.overrides(get, boxed.method("set").unwrap()));
    }

    #[test]
    fn test_missing_supertype_degrades() {
        let env = env();
        let orphan = env.resolve("gen.Orphan").unwrap();
        assert_eq!(orphan.name, "Orphan");
        assert!(orphan.flags.is_final());
        let parent = orphan.superclass.as_ref().unwrap();
        assert!(parent.is_unresolved());
        assert_eq!(parent.name(), Some("missing.Parent"));
        assert!(env.ancestors(&orphan).is_empty());
    }
}
