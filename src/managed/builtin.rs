//! Wrappers for the platform's own annotation types

use super::{AnnotationView, EnumConstant, ManagedAnnotation};
use crate::error::{Error, Result};

/// `@java.lang.Deprecated`
#[derive(Debug, Clone, Copy)]
pub struct Deprecated<'a> {
    view: AnnotationView<'a>,
}

impl<'a> ManagedAnnotation<'a> for Deprecated<'a> {
    const TYPE_NAME: &'static str = "java.lang.Deprecated";

    fn from_view(view: AnnotationView<'a>) -> Self {
        Self { view }
    }
}

impl Deprecated<'_> {
    pub fn since(&self) -> Result<String> {
        self.view.get("since", Some(String::new()))
    }

    pub fn for_removal(&self) -> Result<bool> {
        self.view.get("forRemoval", Some(false))
    }
}

/// `@java.lang.SuppressWarnings`
#[derive(Debug, Clone, Copy)]
pub struct SuppressWarnings<'a> {
    view: AnnotationView<'a>,
}

impl<'a> ManagedAnnotation<'a> for SuppressWarnings<'a> {
    const TYPE_NAME: &'static str = "java.lang.SuppressWarnings";

    fn from_view(view: AnnotationView<'a>) -> Self {
        Self { view }
    }
}

impl SuppressWarnings<'_> {
    pub fn value(&self) -> Result<Vec<String>> {
        self.view.get("value", None)
    }

    pub fn suppresses(&self, warning: &str) -> Result<bool> {
        Ok(self.value()?.iter().any(|w| w == warning || w == "all"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    Source,
    Class,
    Runtime,
}

impl RetentionPolicy {
    pub fn from_constant(constant: &str) -> Option<Self> {
        match constant {
            "SOURCE" => Some(RetentionPolicy::Source),
            "CLASS" => Some(RetentionPolicy::Class),
            "RUNTIME" => Some(RetentionPolicy::Runtime),
            _ => None,
        }
    }
}

/// `@java.lang.annotation.Retention`
#[derive(Debug, Clone, Copy)]
pub struct Retention<'a> {
    view: AnnotationView<'a>,
}

impl<'a> ManagedAnnotation<'a> for Retention<'a> {
    const TYPE_NAME: &'static str = "java.lang.annotation.Retention";

    fn from_view(view: AnnotationView<'a>) -> Self {
        Self { view }
    }
}

impl Retention<'_> {
    /// Policy; `CLASS` when the element is absent
    pub fn value(&self) -> Result<RetentionPolicy> {
        let constant: EnumConstant = self.view.get(
            "value",
            Some(EnumConstant {
                type_name: "RetentionPolicy".into(),
                constant: "CLASS".into(),
            }),
        )?;
        RetentionPolicy::from_constant(&constant.constant).ok_or_else(|| {
            Error::MetadataTypeMismatch {
                element: "@Retention.value".into(),
                expected: "RetentionPolicy",
                found: "enum",
            }
        })
    }
}

/// `@java.lang.annotation.Target`
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    view: AnnotationView<'a>,
}

impl<'a> ManagedAnnotation<'a> for Target<'a> {
    const TYPE_NAME: &'static str = "java.lang.annotation.Target";

    fn from_view(view: AnnotationView<'a>) -> Self {
        Self { view }
    }
}

impl Target<'_> {
    /// Element type constant names (`TYPE`, `METHOD`, ...)
    pub fn value(&self) -> Result<Vec<String>> {
        let constants: Vec<EnumConstant> = self.view.get("value", None)?;
        Ok(constants.into_iter().map(|c| c.constant).collect())
    }
}
