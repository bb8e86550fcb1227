//! Raw declarations
//!
//! The unlinked form of packages, types and members as produced by a
//! front end (parsed text) or decoded from a binary root (JSON metadata).
//! Type references are kept exactly as written; linking them to qualified
//! names is the job of the model layer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

/// Kind of a type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

impl TypeKind {
    /// Declaration keyword
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "@interface",
            TypeKind::Record => "record",
        }
    }
}

/// Declaration modifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flags(u32);

impl Flags {
    pub const PUBLIC: Flags = Flags(1);
    pub const PROTECTED: Flags = Flags(1 << 1);
    pub const PRIVATE: Flags = Flags(1 << 2);
    pub const STATIC: Flags = Flags(1 << 3);
    pub const FINAL: Flags = Flags(1 << 4);
    pub const ABSTRACT: Flags = Flags(1 << 5);
    pub const DEFAULT: Flags = Flags(1 << 6);
    pub const SYNCHRONIZED: Flags = Flags(1 << 7);
    pub const NATIVE: Flags = Flags(1 << 8);
    pub const TRANSIENT: Flags = Flags(1 << 9);
    pub const VOLATILE: Flags = Flags(1 << 10);
    pub const STRICTFP: Flags = Flags(1 << 11);
    pub const SEALED: Flags = Flags(1 << 12);

    // Canonical modifier order for rendering
    const KEYWORDS: [(Flags, &'static str); 13] = [
        (Flags::PUBLIC, "public"),
        (Flags::PROTECTED, "protected"),
        (Flags::PRIVATE, "private"),
        (Flags::ABSTRACT, "abstract"),
        (Flags::DEFAULT, "default"),
        (Flags::STATIC, "static"),
        (Flags::SEALED, "sealed"),
        (Flags::FINAL, "final"),
        (Flags::TRANSIENT, "transient"),
        (Flags::VOLATILE, "volatile"),
        (Flags::SYNCHRONIZED, "synchronized"),
        (Flags::NATIVE, "native"),
        (Flags::STRICTFP, "strictfp"),
    ];

    pub const fn empty() -> Self {
        Flags(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Flags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Flags) {
        self.0 &= !other.0;
    }

    pub fn from_keyword(keyword: &str) -> Option<Flags> {
        Self::KEYWORDS
            .iter()
            .find(|(_, k)| *k == keyword)
            .map(|(f, _)| *f)
    }

    /// Modifier keywords in canonical order
    pub fn keywords(self) -> Vec<&'static str> {
        Self::KEYWORDS
            .iter()
            .filter(|(f, _)| self.contains(*f))
            .map(|(_, k)| *k)
            .collect()
    }

    pub fn is_public(self) -> bool {
        self.contains(Flags::PUBLIC)
    }

    pub fn is_static(self) -> bool {
        self.contains(Flags::STATIC)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Flags::ABSTRACT)
    }

    pub fn is_final(self) -> bool {
        self.contains(Flags::FINAL)
    }

    /// No access modifier present
    pub fn is_package_private(self) -> bool {
        !self.contains(Flags::PUBLIC)
            && !self.contains(Flags::PROTECTED)
            && !self.contains(Flags::PRIVATE)
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keywords().join(" "))
    }
}

/// A type reference as written at the use site
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeSyntax {
    Primitive {
        name: String,
    },
    Void,
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeSyntax>,
    },
    Array {
        element: Box<TypeSyntax>,
    },
    Wildcard {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upper: Option<Box<TypeSyntax>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lower: Option<Box<TypeSyntax>>,
    },
}

impl TypeSyntax {
    pub fn named(name: impl Into<String>) -> Self {
        TypeSyntax::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeSyntax>) -> Self {
        TypeSyntax::Named {
            name: name.into(),
            args,
        }
    }

    pub fn array(element: TypeSyntax) -> Self {
        TypeSyntax::Array {
            element: Box::new(element),
        }
    }

    /// Name of the named type at the root of this reference, if any
    pub fn base_name(&self) -> Option<&str> {
        match self {
            TypeSyntax::Named { name, .. } => Some(name),
            TypeSyntax::Array { element } => element.base_name(),
            _ => None,
        }
    }
}

impl fmt::Display for TypeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSyntax::Primitive { name } => write!(f, "{}", name),
            TypeSyntax::Void => write!(f, "void"),
            TypeSyntax::Named { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                Ok(())
            }
            TypeSyntax::Array { element } => write!(f, "{}[]", element),
            TypeSyntax::Wildcard { upper, lower } => match (upper, lower) {
                (Some(u), _) => write!(f, "? extends {}", u),
                (None, Some(l)) => write!(f, "? super {}", l),
                (None, None) => write!(f, "?"),
            },
        }
    }
}

/// A literal value attached to a metadata element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
    /// Class literal (`Foo.class`)
    Class(TypeSyntax),
    /// Enum constant; `type_name` is empty for statically imported constants
    Enum {
        type_name: String,
        constant: String,
    },
    Annotation(Box<RawAnnotation>),
    Array(Vec<MetaValue>),
    /// Expression the front end does not evaluate (kept as text)
    Expression(String),
}

impl MetaValue {
    /// Kind name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            MetaValue::Bool(_) => "bool",
            MetaValue::Int(_) => "int",
            MetaValue::Float(_) => "float",
            MetaValue::Char(_) => "char",
            MetaValue::String(_) => "string",
            MetaValue::Class(_) => "class",
            MetaValue::Enum { .. } => "enum",
            MetaValue::Annotation(_) => "annotation",
            MetaValue::Array(_) => "array",
            MetaValue::Expression(_) => "expression",
        }
    }
}

/// A metadata marker as written on a declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAnnotation {
    /// Annotation type name as written (simple or qualified)
    pub name: String,

    /// Explicitly given elements, in source order
    #[serde(default)]
    pub elements: IndexMap<String, MetaValue>,
}

/// A generic type parameter declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTypeParameter {
    pub name: String,
    #[serde(default)]
    pub bounds: Vec<TypeSyntax>,
}

/// A field declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawField {
    pub name: String,
    #[serde(default)]
    pub flags: Flags,
    #[serde(rename = "type")]
    pub type_syntax: TypeSyntax,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
    /// Literal initializer, when the initializer is a constant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<MetaValue>,
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_syntax: TypeSyntax,
    #[serde(default)]
    pub varargs: bool,
    #[serde(default)]
    pub annotations: Vec<String>,
}

/// A method or constructor declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMethod {
    pub name: String,
    #[serde(default)]
    pub flags: Flags,
    #[serde(default)]
    pub type_parameters: Vec<RawTypeParameter>,
    /// `None` for constructors
    #[serde(default)]
    pub return_type: Option<TypeSyntax>,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    #[serde(default)]
    pub exceptions: Vec<TypeSyntax>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
    /// Default of an annotation type element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<MetaValue>,
    /// Body text span, only kept when bodies are requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// An import statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImport {
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub on_demand: bool,
}

/// Names visible to a declaration: its package and the unit's imports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportScope {
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub imports: Vec<RawImport>,
}

/// Where a declaration came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Origin {
    Source {
        path: String,
    },
    #[default]
    Binary,
}

/// A type declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawType {
    pub name: String,
    pub qualified_name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub flags: Flags,
    #[serde(default)]
    pub type_parameters: Vec<RawTypeParameter>,
    #[serde(default)]
    pub superclass: Option<TypeSyntax>,
    #[serde(default)]
    pub interfaces: Vec<TypeSyntax>,
    #[serde(default)]
    pub fields: Vec<RawField>,
    #[serde(default)]
    pub methods: Vec<RawMethod>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
    #[serde(default)]
    pub enum_constants: Vec<String>,
    #[serde(default)]
    pub nested: Vec<Arc<RawType>>,
    /// Qualified name of the enclosing type for member types
    #[serde(default)]
    pub declaring_type: Option<String>,
    /// Set when the declaring unit did not parse cleanly
    #[serde(default)]
    pub has_errors: bool,
    #[serde(default)]
    pub scope: ImportScope,
    #[serde(default)]
    pub origin: Origin,
}

impl RawType {
    /// Member type with the given simple name
    pub fn nested_type(&self, name: &str) -> Option<&Arc<RawType>> {
        self.nested.iter().find(|n| n.name == name)
    }

    /// Walk a chain of member type names (`["Inner", "Deeper"]`)
    pub fn nested_path(self: &Arc<Self>, path: &[&str]) -> Option<Arc<RawType>> {
        let mut current = Arc::clone(self);
        for segment in path {
            let next = current.nested_type(segment)?.clone();
            current = next;
        }
        Some(current)
    }

    /// Fill in scope, origin and enclosing links for binary declarations
    /// whose JSON omits them
    pub(crate) fn normalized(mut self) -> Self {
        if self.scope.package.is_empty() && self.declaring_type.is_none() {
            self.scope.package = crate::util::qualifier(&self.qualified_name).to_string();
        }
        let scope = self.scope.clone();
        let parent = self.qualified_name.clone();
        self.nested = self
            .nested
            .into_iter()
            .map(|n| {
                let mut nested = Arc::unwrap_or_clone(n);
                if nested.declaring_type.is_none() {
                    nested.declaring_type = Some(parent.clone());
                }
                if nested.scope.package.is_empty() {
                    nested.scope = scope.clone();
                }
                Arc::new(nested.normalized())
            })
            .collect();
        self
    }
}

/// One compilation unit as produced by a front end
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawCompilationUnit {
    /// Root-relative path (`a/b/C.java`)
    pub path: String,
    pub package: String,
    pub imports: Vec<RawImport>,
    pub types: Vec<Arc<RawType>>,
    pub has_errors: bool,
    /// `sha256:` prefixed hash of the source text
    pub source_hash: String,
}

impl RawCompilationUnit {
    pub fn find_type(&self, name: &str) -> Option<&Arc<RawType>> {
        self.types.iter().find(|t| t.name == name)
    }
}
