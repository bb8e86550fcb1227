//! Generic substitution

use super::types::{Type, TypeRef};
use std::collections::HashMap;

/// Type variable -> actual argument
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeBindings {
    map: HashMap<String, TypeRef>,
}

impl TypeBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the type parameters of `ty` to the arguments of a use site.
    ///
    /// Wildcard arguments collapse to their `extends` bound; unbounded and
    /// `super` wildcards, as well as missing arguments (raw use), fall back to
    /// the parameter's declared upper bound so substitution stays total.
    pub fn bind(ty: &Type, args: &[TypeRef]) -> Self {
        let map = ty
            .type_parameters
            .iter()
            .enumerate()
            .map(|(i, parameter)| {
                let actual = match args.get(i) {
                    Some(TypeRef::Wildcard {
                        upper: Some(upper), ..
                    }) => (**upper).clone(),
                    Some(TypeRef::Wildcard { .. }) | None => parameter.upper_bound(),
                    Some(arg) => arg.clone(),
                };
                (parameter.name.clone(), actual)
            })
            .collect();
        TypeBindings { map }
    }

    pub fn insert(&mut self, variable: impl Into<String>, actual: TypeRef) {
        self.map.insert(variable.into(), actual);
    }

    pub fn get(&self, variable: &str) -> Option<&TypeRef> {
        self.map.get(variable)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Bindings with the given variables unbound (shadowed by method-level
    /// type parameters of the same name)
    pub fn without<'a>(&self, shadowed: impl IntoIterator<Item = &'a str>) -> Self {
        let mut next = self.clone();
        for name in shadowed {
            next.map.remove(name);
        }
        next
    }

    /// Substitute bound variables, recursing into arguments, arrays and
    /// wildcard bounds
    pub fn apply(&self, reference: &TypeRef) -> TypeRef {
        if self.map.is_empty() {
            return reference.clone();
        }
        match reference {
            TypeRef::Variable { name, .. } => self
                .map
                .get(name)
                .cloned()
                .unwrap_or_else(|| reference.clone()),
            TypeRef::Class {
                name,
                args,
                resolved,
            } => TypeRef::Class {
                name: name.clone(),
                args: args.iter().map(|a| self.apply(a)).collect(),
                resolved: *resolved,
            },
            TypeRef::Array { element } => TypeRef::Array {
                element: Box::new(self.apply(element)),
            },
            TypeRef::Wildcard { upper, lower } => TypeRef::Wildcard {
                upper: upper.as_ref().map(|u| Box::new(self.apply(u))),
                lower: lower.as_ref().map(|l| Box::new(self.apply(l))),
            },
            TypeRef::Primitive { .. } | TypeRef::Void => reference.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{Flags, Origin, TypeKind};
    use crate::model::types::TypeParameter;

    fn generic_type(parameters: &[(&str, Option<&str>)]) -> Type {
        Type {
            name: "Pair".into(),
            qualified_name: "a.Pair".into(),
            package: "a".into(),
            kind: TypeKind::Class,
            flags: Flags::PUBLIC,
            type_parameters: parameters
                .iter()
                .map(|(name, bound)| TypeParameter {
                    name: name.to_string(),
                    bounds: bound.map(|b| TypeRef::class(b)).into_iter().collect(),
                })
                .collect(),
            superclass: None,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            annotations: vec![],
            enum_constants: vec![],
            nested: vec![],
            declaring_type: None,
            has_errors: false,
            origin: Origin::Binary,
        }
    }

    fn var(name: &str) -> TypeRef {
        TypeRef::Variable {
            name: name.into(),
            bound: "java.lang.Object".into(),
        }
    }

    #[test]
    fn test_bind_and_apply_nested() {
        let pair = generic_type(&[("K", None), ("V", None)]);
        let bindings = TypeBindings::bind(
            &pair,
            &[
                TypeRef::class("java.lang.String"),
                TypeRef::generic("java.util.List", vec![TypeRef::class("a.Item")]),
            ],
        );
        let declared = TypeRef::generic("java.util.Map", vec![var("K"), TypeRef::Array {
            element: Box::new(var("V")),
        }]);
        assert_eq!(
            bindings.apply(&declared).to_source(),
            "java.util.Map<java.lang.String, java.util.List<a.Item>[]>"
        );
    }

    #[test]
    fn test_wildcards_collapse_to_bounds() {
        let pair = generic_type(&[("K", Some("java.lang.Number")), ("V", None)]);
        let bindings = TypeBindings::bind(
            &pair,
            &[
                TypeRef::Wildcard {
                    upper: None,
                    lower: Some(Box::new(TypeRef::class("java.lang.Integer"))),
                },
                TypeRef::Wildcard {
                    upper: Some(Box::new(TypeRef::class("a.Item"))),
                    lower: None,
                },
            ],
        );
        assert_eq!(bindings.get("K"), Some(&TypeRef::class("java.lang.Number")));
        assert_eq!(bindings.get("V"), Some(&TypeRef::class("a.Item")));
    }

    #[test]
    fn test_raw_use_binds_upper_bounds() {
        let pair = generic_type(&[("K", None), ("V", None)]);
        let bindings = TypeBindings::bind(&pair, &[]);
        assert_eq!(bindings.get("K"), Some(&TypeRef::object()));
        assert_eq!(bindings.apply(&var("V")), TypeRef::object());
    }

    #[test]
    fn test_method_variables_shadow() {
        let pair = generic_type(&[("K", None), ("V", None)]);
        let bindings =
            TypeBindings::bind(&pair, &[TypeRef::class("a.X"), TypeRef::class("a.Y")]).without(["K"]);
        assert_eq!(bindings.apply(&var("K")), var("K"));
        assert_eq!(bindings.apply(&var("V")), TypeRef::class("a.Y"));
    }
}
