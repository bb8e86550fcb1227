use super::{AnnotationGenerator, MemberName, RenderContext, SourceGenerator, TypeName};
use crate::decl::MetaValue;
use crate::error::Result;
use genco::prelude::*;

#[derive(Debug, Clone)]
enum Part {
    Text(String),
    Type(TypeName),
    Member(MemberName),
    StringLiteral(String),
    Annotation(Box<AnnotationGenerator>),
    Expression(ExpressionGenerator),
}

/// An inline expression fragment assembled from text, type references,
/// (possibly API-aware) member names and nested expressions
#[derive(Debug, Clone, Default)]
pub struct ExpressionGenerator {
    parts: Vec<Part>,
}

impl ExpressionGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verbatim source text
    pub fn raw(text: impl Into<String>) -> Self {
        Self::new().text(text)
    }

    pub fn string_literal(value: impl Into<String>) -> Self {
        Self::new().string(value)
    }

    /// `Type.class`
    pub fn class_literal(type_name: TypeName) -> Self {
        Self::new().type_ref(type_name).text(".class")
    }

    /// `Type.CONSTANT`
    pub fn enum_constant(type_name: TypeName, constant: &str) -> Self {
        Self::new().type_ref(type_name).text(format!(".{}", constant))
    }

    /// `new Type(args)`
    pub fn new_instance(type_name: TypeName, args: Vec<ExpressionGenerator>) -> Self {
        Self::new()
            .text("new ")
            .type_ref(type_name)
            .arguments(args)
    }

    /// `target.member(args)`, or `member(args)` without a target
    pub fn call(
        target: Option<ExpressionGenerator>,
        member: impl Into<MemberName>,
        args: Vec<ExpressionGenerator>,
    ) -> Self {
        let mut expr = Self::new();
        if let Some(target) = target {
            expr = expr.expr(target).text(".");
        }
        expr.member(member).arguments(args)
    }

    /// `Type.member(args)`
    pub fn static_call(
        type_name: TypeName,
        member: impl Into<MemberName>,
        args: Vec<ExpressionGenerator>,
    ) -> Self {
        Self::new()
            .type_ref(type_name)
            .text(".")
            .member(member)
            .arguments(args)
    }

    /// Source form of a metadata literal
    pub fn from_meta(value: &MetaValue) -> Self {
        match value {
            MetaValue::Bool(b) => Self::raw(b.to_string()),
            MetaValue::Int(i) if i32::try_from(*i).is_ok() => Self::raw(i.to_string()),
            MetaValue::Int(i) => Self::raw(format!("{}L", i)),
            MetaValue::Float(f) => Self::raw(format!("{:?}", f)),
            MetaValue::Char(c) => Self::raw(char_literal(*c)),
            MetaValue::String(s) => Self::string_literal(s.clone()),
            MetaValue::Class(syntax) => Self::class_literal(TypeName::Syntax(syntax.clone())),
            MetaValue::Enum {
                type_name,
                constant,
            } if type_name.is_empty() => Self::raw(constant.clone()),
            MetaValue::Enum {
                type_name,
                constant,
            } => Self::raw(format!("{}.{}", type_name, constant)),
            MetaValue::Annotation(raw) => {
                let mut annotation = AnnotationGenerator::new(TypeName::named(raw.name.clone()));
                for (name, value) in &raw.elements {
                    annotation = annotation.element(name, Self::from_meta(value));
                }
                Self::new().annotation(annotation)
            }
            MetaValue::Array(items) => {
                let mut expr = Self::raw("{");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        expr = expr.text(", ");
                    }
                    expr = expr.expr(Self::from_meta(item));
                }
                expr.text("}")
            }
            MetaValue::Expression(text) => Self::raw(text.clone()),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::Text(text.into()));
        self
    }

    pub fn type_ref(mut self, type_name: TypeName) -> Self {
        self.parts.push(Part::Type(type_name));
        self
    }

    pub fn member(mut self, member: impl Into<MemberName>) -> Self {
        self.parts.push(Part::Member(member.into()));
        self
    }

    pub fn string(mut self, value: impl Into<String>) -> Self {
        self.parts.push(Part::StringLiteral(value.into()));
        self
    }

    pub fn expr(mut self, expr: ExpressionGenerator) -> Self {
        self.parts.push(Part::Expression(expr));
        self
    }

    pub fn annotation(mut self, annotation: AnnotationGenerator) -> Self {
        self.parts.push(Part::Annotation(Box::new(annotation)));
        self
    }

    /// `(a, b, c)`
    pub fn arguments(mut self, args: Vec<ExpressionGenerator>) -> Self {
        self = self.text("(");
        for (i, arg) in args.into_iter().enumerate() {
            if i > 0 {
                self = self.text(", ");
            }
            self = self.expr(arg);
        }
        self.text(")")
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Render to inline text
    pub fn to_text(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        let mut text = String::new();
        for part in &self.parts {
            match part {
                Part::Text(t) => text.push_str(t),
                Part::Type(type_name) => text.push_str(&cx.type_text(type_name)?),
                Part::Member(member) => text.push_str(&member.text(cx.env())?),
                Part::StringLiteral(value) => text.push_str(&string_literal(value)?),
                Part::Annotation(annotation) => text.push_str(&annotation.to_text(cx)?),
                Part::Expression(expr) => text.push_str(&expr.to_text(cx)?),
            }
        }
        Ok(text)
    }
}

impl SourceGenerator for ExpressionGenerator {
    fn render(&self, cx: &mut RenderContext<'_>, out: &mut java::Tokens) -> Result<()> {
        let text = self.to_text(cx)?;
        out.append(text);
        Ok(())
    }
}

/// Java string literal with escapes, via genco's quoting
fn string_literal(value: &str) -> Result<String> {
    let mut tokens = java::Tokens::new();
    quote_in!(tokens => $(quoted(value)));
    Ok(tokens.to_string()?)
}

fn char_literal(c: char) -> String {
    match c {
        '\'' => "'\\''".to_string(),
        '\\' => "'\\\\'".to_string(),
        '\n' => "'\\n'".to_string(),
        '\r' => "'\\r'".to_string(),
        '\t' => "'\\t'".to_string(),
        c => format!("'{}'", c),
    }
}
