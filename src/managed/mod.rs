//! Managed annotations
//!
//! Typed access to annotation instances. [`AnnotationView::get`] looks an
//! element up in this order: the explicit value on the instance, the default
//! declared by the annotation type (when the Environment can resolve it), the
//! caller's fallback, and finally the type's empty value. A literal of the
//! wrong kind is a [`Error::MetadataTypeMismatch`], never a silent coercion.
//!
//! Wrappers for specific annotation types implement [`ManagedAnnotation`];
//! see [`Deprecated`], [`SuppressWarnings`], [`Retention`] and [`Target`].

mod builtin;

pub use builtin::{Deprecated, Retention, RetentionPolicy, SuppressWarnings, Target};

use crate::decl::{MetaValue, RawAnnotation};
use crate::error::{Error, Result};
use crate::model::{Annotation, Environment};

/// Conversion from a metadata literal
pub trait FromMetaValue: Sized {
    /// Kind name reported on mismatch
    const KIND: &'static str;

    fn from_meta(value: &MetaValue) -> Option<Self>;

    /// Value returned when neither the instance, the declaration nor the
    /// caller supply one
    fn empty() -> Self;
}

impl FromMetaValue for bool {
    const KIND: &'static str = "bool";

    fn from_meta(value: &MetaValue) -> Option<Self> {
        match value {
            MetaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn empty() -> Self {
        false
    }
}

impl FromMetaValue for i64 {
    const KIND: &'static str = "int";

    fn from_meta(value: &MetaValue) -> Option<Self> {
        match value {
            MetaValue::Int(i) => Some(*i),
            MetaValue::Char(c) => Some(*c as i64),
            _ => None,
        }
    }

    fn empty() -> Self {
        0
    }
}

impl FromMetaValue for i32 {
    const KIND: &'static str = "int";

    fn from_meta(value: &MetaValue) -> Option<Self> {
        i64::from_meta(value).and_then(|i| i32::try_from(i).ok())
    }

    fn empty() -> Self {
        0
    }
}

impl FromMetaValue for f64 {
    const KIND: &'static str = "float";

    fn from_meta(value: &MetaValue) -> Option<Self> {
        match value {
            MetaValue::Float(f) => Some(*f),
            MetaValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    fn empty() -> Self {
        0.0
    }
}

impl FromMetaValue for char {
    const KIND: &'static str = "char";

    fn from_meta(value: &MetaValue) -> Option<Self> {
        match value {
            MetaValue::Char(c) => Some(*c),
            _ => None,
        }
    }

    fn empty() -> Self {
        '\0'
    }
}

impl FromMetaValue for String {
    const KIND: &'static str = "string";

    fn from_meta(value: &MetaValue) -> Option<Self> {
        match value {
            MetaValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn empty() -> Self {
        String::new()
    }
}

/// Value of a class literal element (`Foo.class`), as written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassName(pub String);

impl FromMetaValue for ClassName {
    const KIND: &'static str = "class";

    fn from_meta(value: &MetaValue) -> Option<Self> {
        match value {
            MetaValue::Class(syntax) => Some(ClassName(syntax.to_string())),
            _ => None,
        }
    }

    fn empty() -> Self {
        ClassName::default()
    }
}

/// Value of an enum constant element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumConstant {
    /// Enum type as written; empty for statically imported constants
    pub type_name: String,
    pub constant: String,
}

impl FromMetaValue for EnumConstant {
    const KIND: &'static str = "enum";

    fn from_meta(value: &MetaValue) -> Option<Self> {
        match value {
            MetaValue::Enum {
                type_name,
                constant,
            } => Some(EnumConstant {
                type_name: type_name.clone(),
                constant: constant.clone(),
            }),
            _ => None,
        }
    }

    fn empty() -> Self {
        EnumConstant::default()
    }
}

impl FromMetaValue for RawAnnotation {
    const KIND: &'static str = "annotation";

    fn from_meta(value: &MetaValue) -> Option<Self> {
        match value {
            MetaValue::Annotation(a) => Some((**a).clone()),
            _ => None,
        }
    }

    fn empty() -> Self {
        RawAnnotation {
            name: String::new(),
            elements: Default::default(),
        }
    }
}

/// Arrays; a single scalar counts as a one-element array
impl<T: FromMetaValue> FromMetaValue for Vec<T> {
    const KIND: &'static str = "array";

    fn from_meta(value: &MetaValue) -> Option<Self> {
        match value {
            MetaValue::Array(items) => items.iter().map(T::from_meta).collect(),
            scalar => T::from_meta(scalar).map(|item| vec![item]),
        }
    }

    fn empty() -> Self {
        Vec::new()
    }
}

/// Typed view over one annotation instance
#[derive(Debug, Clone, Copy)]
pub struct AnnotationView<'a> {
    annotation: &'a Annotation,
    env: Option<&'a Environment>,
}

impl<'a> AnnotationView<'a> {
    /// Without an Environment, declared defaults are not consulted
    pub fn new(annotation: &'a Annotation, env: Option<&'a Environment>) -> Self {
        Self { annotation, env }
    }

    pub fn annotation(&self) -> &'a Annotation {
        self.annotation
    }

    /// Explicitly given on the instance
    pub fn is_explicit(&self, name: &str) -> bool {
        self.annotation.elements.contains_key(name)
    }

    /// Default declared by the annotation type for `name`
    pub fn declared_default(&self, name: &str) -> Option<MetaValue> {
        let ty = self.env?.resolve(&self.annotation.type_name)?;
        ty.method(name)?.default_value.clone()
    }

    pub fn get<T: FromMetaValue>(&self, name: &str, fallback: Option<T>) -> Result<T> {
        if let Some(value) = self.annotation.element(name) {
            return self.convert(name, value);
        }
        if let Some(value) = self.declared_default(name) {
            return self.convert(name, &value);
        }
        Ok(fallback.unwrap_or_else(T::empty))
    }

    fn convert<T: FromMetaValue>(&self, name: &str, value: &MetaValue) -> Result<T> {
        T::from_meta(value).ok_or_else(|| Error::MetadataTypeMismatch {
            element: format!("@{}.{}", self.annotation.simple_name(), name),
            expected: T::KIND,
            found: value.kind_name(),
        })
    }
}

/// Typed wrapper for one annotation type
pub trait ManagedAnnotation<'a>: Sized {
    /// Qualified annotation type name
    const TYPE_NAME: &'static str;

    fn from_view(view: AnnotationView<'a>) -> Self;

    /// Wrap the first matching instance of `annotations`
    fn find(annotations: &'a [Annotation], env: Option<&'a Environment>) -> Option<Self> {
        annotations
            .iter()
            .find(|a| a.is(Self::TYPE_NAME))
            .map(|a| Self::from_view(AnnotationView::new(a, env)))
    }
}

impl Environment {
    /// Typed wrapper for the first instance of `A` among `annotations`
    pub fn annotation<'a, A: ManagedAnnotation<'a>>(&'a self, annotations: &'a [Annotation]) -> Option<A> {
        A::find(annotations, Some(self))
    }
}
