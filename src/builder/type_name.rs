//! Type and member names used by generators

use super::RenderContext;
use crate::decl::TypeSyntax;
use crate::error::Result;
use crate::model::{Environment, TypeRef};
use crate::parse::parse_signature;
use std::fmt;
use std::sync::Arc;

type ApiTypeFn = dyn Fn(&Environment) -> Result<TypeSyntax> + Send + Sync;
type ApiMemberFn = dyn Fn(&Environment) -> Result<String> + Send + Sync;

/// A type reference to emit
#[derive(Clone)]
pub enum TypeName {
    /// Fixed reference with qualified names
    Syntax(TypeSyntax),
    /// Reference whose spelling depends on the framework version
    Api(Arc<ApiTypeFn>),
}

impl TypeName {
    /// Parse signature text, e.g. `java.util.Map<java.lang.String, a.B[]>`
    pub fn parse(signature: &str) -> Result<Self> {
        Ok(TypeName::Syntax(parse_signature(signature)?))
    }

    pub fn named(qualified_name: impl Into<String>) -> Self {
        TypeName::Syntax(TypeSyntax::named(qualified_name))
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        TypeName::Syntax(TypeSyntax::Primitive { name: name.into() })
    }

    pub fn void() -> Self {
        TypeName::Syntax(TypeSyntax::Void)
    }

    /// Type name obtained from capability `S` for the rendering
    /// Environment's framework version. The returned text is parsed as a
    /// signature.
    pub fn api<S, F>(select: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&S) -> String + Send + Sync + 'static,
    {
        TypeName::Api(Arc::new(move |env: &Environment| {
            let api = env.api::<S>()?;
            parse_signature(&select(&api))
        }))
    }

    /// Syntax for the given Environment
    pub fn syntax(&self, env: Option<&Environment>) -> Result<TypeSyntax> {
        match self {
            TypeName::Syntax(syntax) => Ok(syntax.clone()),
            TypeName::Api(select) => {
                let env = RenderContext::require(env, "API-aware type name")?;
                select(env)
            }
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeName::Syntax(TypeSyntax::Void))
    }
}

impl From<TypeSyntax> for TypeName {
    fn from(syntax: TypeSyntax) -> Self {
        TypeName::Syntax(syntax)
    }
}

impl From<&TypeRef> for TypeName {
    fn from(reference: &TypeRef) -> Self {
        TypeName::Syntax(reference.to_syntax())
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Syntax(syntax) => write!(f, "TypeName({})", syntax),
            TypeName::Api(_) => write!(f, "TypeName(<api>)"),
        }
    }
}

/// A member (method or field) name to emit
#[derive(Clone)]
pub enum MemberName {
    Literal(String),
    Api(Arc<ApiMemberFn>),
}

impl MemberName {
    pub fn api<S, F>(select: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&S) -> String + Send + Sync + 'static,
    {
        MemberName::Api(Arc::new(move |env: &Environment| {
            let api = env.api::<S>()?;
            Ok(select(&api))
        }))
    }

    pub fn text(&self, env: Option<&Environment>) -> Result<String> {
        match self {
            MemberName::Literal(name) => Ok(name.clone()),
            MemberName::Api(select) => {
                let env = RenderContext::require(env, "API-aware member name")?;
                select(env)
            }
        }
    }
}

impl From<&str> for MemberName {
    fn from(name: &str) -> Self {
        MemberName::Literal(name.to_string())
    }
}

impl From<String> for MemberName {
    fn from(name: String) -> Self {
        MemberName::Literal(name)
    }
}

impl fmt::Debug for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberName::Literal(name) => write!(f, "MemberName({})", name),
            MemberName::Api(_) => write!(f, "MemberName(<api>)"),
        }
    }
}
