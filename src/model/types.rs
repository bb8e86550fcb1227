//! Linked model types

use crate::decl::{Flags, MetaValue, Origin, RawImport, TypeKind, TypeSyntax};
use crate::util::simple_name;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

pub const OBJECT: &str = "java.lang.Object";

/// A linked type reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    Primitive {
        name: String,
    },
    Void,
    /// Class, interface, enum or annotation type. `resolved` is false when
    /// no declaration backs the name (missing root); the name is then the
    /// best-known spelling.
    Class {
        name: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeRef>,
        resolved: bool,
    },
    Array {
        element: Box<TypeRef>,
    },
    /// Type variable with the erasure of its first bound
    Variable {
        name: String,
        bound: String,
    },
    Wildcard {
        #[serde(skip_serializing_if = "Option::is_none")]
        upper: Option<Box<TypeRef>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        lower: Option<Box<TypeRef>>,
    },
}

impl TypeRef {
    /// Resolved reference without arguments
    pub fn class(name: impl Into<String>) -> Self {
        TypeRef::Class {
            name: name.into(),
            args: Vec::new(),
            resolved: true,
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Class {
            name: name.into(),
            args,
            resolved: true,
        }
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        TypeRef::Class {
            name: name.into(),
            args: Vec::new(),
            resolved: false,
        }
    }

    pub fn object() -> Self {
        TypeRef::class(OBJECT)
    }

    /// Qualified name of a class reference
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Class { args, .. } => args,
            _ => &[],
        }
    }

    /// Placeholder for a name no root declares
    pub fn is_unresolved(&self) -> bool {
        match self {
            TypeRef::Class { resolved, .. } => !resolved,
            TypeRef::Array { element } => element.is_unresolved(),
            _ => false,
        }
    }

    /// Erased qualified spelling (`java.util.List`, `int[]`, bound of `T`)
    pub fn erasure(&self) -> String {
        match self {
            TypeRef::Primitive { name } => name.clone(),
            TypeRef::Void => "void".to_string(),
            TypeRef::Class { name, .. } => name.clone(),
            TypeRef::Array { element } => format!("{}[]", element.erasure()),
            TypeRef::Variable { bound, .. } => bound.clone(),
            TypeRef::Wildcard { upper, .. } => upper
                .as_ref()
                .map(|u| u.erasure())
                .unwrap_or_else(|| OBJECT.to_string()),
        }
    }

    /// Source spelling with qualified names
    pub fn to_source(&self) -> String {
        self.to_syntax().to_string()
    }

    pub fn to_syntax(&self) -> TypeSyntax {
        match self {
            TypeRef::Primitive { name } => TypeSyntax::Primitive { name: name.clone() },
            TypeRef::Void => TypeSyntax::Void,
            TypeRef::Class { name, args, .. } => {
                TypeSyntax::generic(name.clone(), args.iter().map(TypeRef::to_syntax).collect())
            }
            TypeRef::Array { element } => TypeSyntax::array(element.to_syntax()),
            TypeRef::Variable { name, .. } => TypeSyntax::named(name.clone()),
            TypeRef::Wildcard { upper, lower } => TypeSyntax::Wildcard {
                upper: upper.as_ref().map(|u| Box::new(u.to_syntax())),
                lower: lower.as_ref().map(|l| Box::new(l.to_syntax())),
            },
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive { .. })
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_source())
    }
}

/// Generic type parameter with linked bounds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeParameter {
    pub name: String,
    pub bounds: Vec<TypeRef>,
}

impl TypeParameter {
    /// First bound, `java.lang.Object` when unbounded
    pub fn upper_bound(&self) -> TypeRef {
        self.bounds.first().cloned().unwrap_or_else(TypeRef::object)
    }
}

/// Annotation instance with its type name linked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub type_name: String,
    pub resolved: bool,
    pub elements: IndexMap<String, MetaValue>,
}

impl Annotation {
    pub fn simple_name(&self) -> &str {
        simple_name(&self.type_name)
    }

    pub fn element(&self, name: &str) -> Option<&MetaValue> {
        self.elements.get(name)
    }

    /// Matches a qualified annotation type name; unresolved instances match
    /// on the simple name
    pub fn is(&self, qualified_name: &str) -> bool {
        self.type_name == qualified_name
            || (!self.resolved && self.simple_name() == simple_name(qualified_name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    pub varargs: bool,
    pub annotations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub name: String,
    pub flags: Flags,
    pub type_parameters: Vec<TypeParameter>,
    /// `None` for constructors
    pub return_type: Option<TypeRef>,
    pub parameters: Vec<Parameter>,
    pub exceptions: Vec<TypeRef>,
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<MetaValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub declaring_type: String,
}

impl Method {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn is_varargs(&self) -> bool {
        self.parameters.last().is_some_and(|p| p.varargs)
    }

    /// Accepts `arity` arguments
    pub fn accepts(&self, arity: usize) -> bool {
        let declared = self.parameters.len();
        declared == arity || (self.is_varargs() && arity + 1 >= declared)
    }

    /// Erased parameter types in order
    pub fn erased_parameters(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.type_ref.erasure()).collect()
    }

    /// `name(erased, types)` form
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.erased_parameters().join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub flags: Flags,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constant: Option<MetaValue>,
    pub declaring_type: String,
}

/// A linked type declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Type {
    pub name: String,
    pub qualified_name: String,
    pub package: String,
    pub kind: TypeKind,
    pub flags: Flags,
    pub type_parameters: Vec<TypeParameter>,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub annotations: Vec<Annotation>,
    pub enum_constants: Vec<String>,
    /// Qualified names of member types
    pub nested: Vec<String>,
    /// Enclosing type of a member type
    pub declaring_type: Option<String>,
    pub has_errors: bool,
    pub origin: Origin,
}

impl Type {
    /// Reference to this type parameterized by its own type variables
    pub fn self_ref(&self) -> TypeRef {
        TypeRef::generic(
            self.qualified_name.clone(),
            self.type_parameters
                .iter()
                .map(|p| TypeRef::Variable {
                    name: p.name.clone(),
                    bound: p.upper_bound().erasure(),
                })
                .collect(),
        )
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Method> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter().filter(|m| m.is_constructor())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn annotation(&self, qualified_name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.is(qualified_name))
    }

    /// Source path for types parsed from text
    pub fn source_path(&self) -> Option<&str> {
        match &self.origin {
            Origin::Source { path } => Some(path),
            Origin::Binary => None,
        }
    }
}

/// A linked compilation unit
#[derive(Debug, Clone, Serialize)]
pub struct CompilationUnit {
    pub path: String,
    pub package: String,
    pub imports: Vec<RawImport>,
    pub types: Vec<Arc<Type>>,
    pub has_errors: bool,
    pub source_hash: String,
}

impl CompilationUnit {
    /// Type named after the file, if declared
    pub fn primary_type(&self) -> Option<&Arc<Type>> {
        let stem = self
            .path
            .rsplit('/')
            .next()
            .and_then(|file| file.split('.').next())
            .unwrap_or_default();
        self.types.iter().find(|t| t.name == stem)
    }
}
