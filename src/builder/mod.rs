//! Source builder framework
//!
//! Generators are plain descriptions of declarations and expressions. They
//! are rendered into `genco` Java token streams against an optional
//! [`Environment`] and a session's [`ImportValidator`]; children render
//! depth-first, left to right, sharing the parent's validator. Rendering never
//! touches the Environment beyond read-only queries and API selection.

mod annotation;
mod comment;
mod expression;
mod field;
mod import;
mod method;
mod type_gen;
mod type_name;
mod unit;

pub use annotation::AnnotationGenerator;
pub use comment::CommentGenerator;
pub use expression::ExpressionGenerator;
pub use field::FieldGenerator;
pub use import::ImportValidator;
pub use method::{MethodGenerator, ParameterGenerator};
pub use type_gen::TypeGenerator;
pub use type_name::{MemberName, TypeName};
pub use unit::{CompilationUnitGenerator, GeneratedUnit};

use crate::config::EnvironmentConfig;
use crate::decl::{Flags, TypeSyntax};
use crate::error::{Error, Result};
use crate::model::Environment;
use genco::prelude::*;

/// Something that renders into Java tokens
pub trait SourceGenerator {
    fn render(&self, cx: &mut RenderContext<'_>, out: &mut java::Tokens) -> Result<()>;
}

/// Per-render state handed down to child generators
pub struct RenderContext<'s> {
    env: Option<&'s Environment>,
    imports: &'s mut ImportValidator,
}

impl<'s> RenderContext<'s> {
    pub fn new(env: Option<&'s Environment>, imports: &'s mut ImportValidator) -> Self {
        Self { env, imports }
    }

    pub fn env(&self) -> Option<&'s Environment> {
        self.env
    }

    /// The Environment, or a `ContextRequired` error naming `what` needs it
    pub fn require_env(&self, what: &str) -> Result<&'s Environment> {
        Self::require(self.env, what)
    }

    pub(crate) fn require<'e>(env: Option<&'e Environment>, what: &str) -> Result<&'e Environment> {
        env.ok_or_else(|| {
            Error::ContextRequired(format!("{} cannot be rendered without an Environment", what))
        })
    }

    pub fn imports(&mut self) -> &mut ImportValidator {
        &mut *self.imports
    }

    /// Emitted spelling of a qualified type name
    pub fn reference(&mut self, qualified_name: &str) -> String {
        self.imports.reference(qualified_name)
    }

    pub fn type_text(&mut self, name: &TypeName) -> Result<String> {
        let syntax = name.syntax(self.env)?;
        Ok(self.syntax_text(&syntax))
    }

    /// Render a syntax, routing every qualified name through the validator.
    /// Undotted names (type variables, already-short names) pass through.
    pub fn syntax_text(&mut self, syntax: &TypeSyntax) -> String {
        match syntax {
            TypeSyntax::Primitive { name } => name.clone(),
            TypeSyntax::Void => "void".to_string(),
            TypeSyntax::Named { name, args } => {
                let mut text = if name.contains('.') {
                    self.reference(name)
                } else {
                    name.clone()
                };
                if !args.is_empty() {
                    let args: Vec<String> = args.iter().map(|a| self.syntax_text(a)).collect();
                    text.push('<');
                    text.push_str(&args.join(", "));
                    text.push('>');
                }
                text
            }
            TypeSyntax::Array { element } => format!("{}[]", self.syntax_text(element)),
            TypeSyntax::Wildcard { upper, lower } => match (upper, lower) {
                (Some(u), _) => format!("? extends {}", self.syntax_text(u)),
                (None, Some(l)) => format!("? super {}", self.syntax_text(l)),
                (None, None) => "?".to_string(),
            },
        }
    }
}

/// Render session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Initialized,
    Rendering,
    Rendered,
}

/// One render pass: owns the import validator and produces one text
pub struct RenderSession<'e> {
    env: Option<&'e Environment>,
    imports: ImportValidator,
    line_delimiter: String,
    state: RenderState,
}

impl<'e> RenderSession<'e> {
    pub fn new(env: Option<&'e Environment>, config: &EnvironmentConfig) -> Self {
        Self {
            env,
            imports: ImportValidator::default(),
            line_delimiter: config.line_delimiter.clone(),
            state: RenderState::Initialized,
        }
    }

    /// Start from a prepared validator (package set, names reserved)
    pub fn with_imports(mut self, imports: ImportValidator) -> Self {
        self.imports = imports;
        self
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn imports(&self) -> &ImportValidator {
        &self.imports
    }

    /// Render once. A session that has rendered (or failed rendering) cannot
    /// render again.
    pub fn render(&mut self, generator: &dyn SourceGenerator) -> Result<String> {
        if self.state != RenderState::Initialized {
            return Err(Error::Render(format!(
                "render session is {:?}; start a new session",
                self.state
            )));
        }
        self.state = RenderState::Rendering;
        let mut tokens = java::Tokens::new();
        let result = {
            let mut cx = RenderContext::new(self.env, &mut self.imports);
            generator.render(&mut cx, &mut tokens)
        };
        self.state = RenderState::Rendered;
        result?;
        let text = tokens.to_file_string()?;
        tracing::debug!(bytes = text.len(), "rendered source");
        Ok(self.apply_line_delimiter(text))
    }

    fn apply_line_delimiter(&self, text: String) -> String {
        if self.line_delimiter == "\n" {
            text
        } else {
            text.replace('\n', &self.line_delimiter)
        }
    }

    pub fn into_imports(self) -> ImportValidator {
        self.imports
    }
}

/// `public static final ` style prefix (with trailing space) for a flag set
pub(crate) fn modifiers(flags: Flags) -> String {
    flags
        .keywords()
        .into_iter()
        .map(|k| format!("{} ", k))
        .collect()
}

/// Append multi-line text one line at a time so the current indentation
/// applies to every line
pub(crate) fn append_lines(out: &mut java::Tokens, text: &str) {
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.line();
        } else {
            out.push();
            out.append(line.to_string());
        }
    }
}
