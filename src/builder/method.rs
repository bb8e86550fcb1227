use super::{
    append_lines, modifiers, AnnotationGenerator, CommentGenerator, ExpressionGenerator,
    MemberName, RenderContext, SourceGenerator, TypeName,
};
use crate::decl::Flags;
use crate::error::Result;
use crate::model::{Method, ResolvedMethod, TypeParameter, TypeRef};
use crate::util::capitalize;
use genco::prelude::*;

/// Method parameter
#[derive(Debug, Clone)]
pub struct ParameterGenerator {
    annotations: Vec<AnnotationGenerator>,
    type_name: TypeName,
    name: String,
    varargs: bool,
    is_final: bool,
}

impl ParameterGenerator {
    pub fn new(type_name: TypeName, name: impl Into<String>) -> Self {
        Self {
            annotations: Vec::new(),
            type_name,
            name: name.into(),
            varargs: false,
            is_final: false,
        }
    }

    pub fn annotation(mut self, annotation: AnnotationGenerator) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Trailing `Type... name`; the type is the element type
    pub fn varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    pub fn final_(mut self) -> Self {
        self.is_final = true;
        self
    }

    fn to_text(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        let mut text = String::new();
        for annotation in &self.annotations {
            text.push_str(&annotation.to_text(cx)?);
            text.push(' ');
        }
        if self.is_final {
            text.push_str("final ");
        }
        text.push_str(&cx.type_text(&self.type_name)?);
        if self.varargs {
            text.push_str("...");
        }
        text.push(' ');
        text.push_str(&self.name);
        Ok(text)
    }
}

#[derive(Debug, Clone)]
enum Statement {
    Expression(ExpressionGenerator),
    Source(String),
}

/// Method or constructor declaration. A method without a body renders as
/// an abstract (or interface) declaration ending in `;`.
#[derive(Debug, Clone)]
pub struct MethodGenerator {
    comment: Option<CommentGenerator>,
    annotations: Vec<AnnotationGenerator>,
    flags: Flags,
    type_parameters: Vec<(String, Vec<TypeName>)>,
    /// `None` for constructors
    return_type: Option<TypeName>,
    name: MemberName,
    parameters: Vec<ParameterGenerator>,
    exceptions: Vec<TypeName>,
    body: Option<Vec<Statement>>,
    default_value: Option<ExpressionGenerator>,
}

impl MethodGenerator {
    pub fn new(return_type: TypeName, name: impl Into<MemberName>) -> Self {
        Self {
            comment: None,
            annotations: Vec::new(),
            flags: Flags::empty(),
            type_parameters: Vec::new(),
            return_type: Some(return_type),
            name: name.into(),
            parameters: Vec::new(),
            exceptions: Vec::new(),
            body: None,
            default_value: None,
        }
    }

    /// Constructor for the type with the given simple name
    pub fn constructor(type_name: &str) -> Self {
        Self {
            return_type: None,
            body: Some(Vec::new()),
            ..Self::new(TypeName::void(), type_name)
        }
    }

    /// `getName()` (or `isName()` for `boolean`) returning the field
    pub fn getter(type_name: TypeName, field: &str) -> Self {
        let boolean = matches!(
            &type_name,
            TypeName::Syntax(crate::decl::TypeSyntax::Primitive { name }) if name == "boolean"
        );
        let prefix = if boolean { "is" } else { "get" };
        Self::new(type_name, format!("{}{}", prefix, capitalize(field)))
            .flags(Flags::PUBLIC)
            .statement(ExpressionGenerator::raw(format!("return this.{}", field)))
    }

    /// `setName(value)` assigning the field
    pub fn setter(type_name: TypeName, field: &str) -> Self {
        Self::new(TypeName::void(), format!("set{}", capitalize(field)))
            .flags(Flags::PUBLIC)
            .parameter(ParameterGenerator::new(type_name, field))
            .statement(ExpressionGenerator::raw(format!("this.{0} = {0}", field)))
    }

    /// Overriding skeleton for an inherited method: same signature,
    /// `@Override`, and a body returning the type's default value
    pub fn from_method(method: &Method) -> Self {
        let parameter_types: Vec<&TypeRef> = method.parameters.iter().map(|p| &p.type_ref).collect();
        Self::skeleton(method, method.return_type.as_ref(), &parameter_types)
    }

    /// Overriding skeleton for a method reached through a parameterized
    /// supertype; the signature uses the substituted types
    pub fn from_resolved(resolved: &ResolvedMethod) -> Self {
        let parameter_types: Vec<&TypeRef> = resolved.parameter_types.iter().collect();
        Self::skeleton(resolved.method(), resolved.return_type.as_ref(), &parameter_types)
    }

    fn skeleton(method: &Method, return_type: Option<&TypeRef>, parameter_types: &[&TypeRef]) -> Self {
        let return_type = return_type.cloned().unwrap_or(TypeRef::Void);
        let mut flags = method.flags;
        flags.remove(Flags::ABSTRACT);
        flags.remove(Flags::DEFAULT);
        flags.remove(Flags::NATIVE);
        let mut generator = Self::new(TypeName::from(&return_type), method.name.as_str())
            .flags(flags)
            .annotation(AnnotationGenerator::override_marker());
        for parameter in &method.type_parameters {
            generator = generator.type_parameter_of(parameter);
        }
        for (parameter, declared) in method.parameters.iter().zip(parameter_types) {
            let mut param_type: &TypeRef = declared;
            if parameter.varargs {
                if let TypeRef::Array { element } = param_type {
                    param_type = &**element;
                }
            }
            let mut generated = ParameterGenerator::new(TypeName::from(param_type), &parameter.name);
            if parameter.varargs {
                generated = generated.varargs();
            }
            generator = generator.parameter(generated);
        }
        for exception in &method.exceptions {
            generator = generator.exception(TypeName::from(exception));
        }
        match default_value(&return_type) {
            Some(value) => generator.statement(ExpressionGenerator::raw(format!("return {}", value))),
            None => generator.with_empty_body(),
        }
    }

    pub fn comment(mut self, comment: CommentGenerator) -> Self {
        self.comment = Some(comment);
        self
    }

    pub fn annotation(mut self, annotation: AnnotationGenerator) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn type_parameter(mut self, name: impl Into<String>, bounds: Vec<TypeName>) -> Self {
        self.type_parameters.push((name.into(), bounds));
        self
    }

    fn type_parameter_of(self, parameter: &TypeParameter) -> Self {
        let bounds = parameter
            .bounds
            .iter()
            .filter(|b| b.name() != Some(crate::model::OBJECT))
            .map(TypeName::from)
            .collect();
        self.type_parameter(parameter.name.clone(), bounds)
    }

    pub fn parameter(mut self, parameter: ParameterGenerator) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn exception(mut self, type_name: TypeName) -> Self {
        self.exceptions.push(type_name);
        self
    }

    /// Append an expression statement (`;` added)
    pub fn statement(mut self, expr: ExpressionGenerator) -> Self {
        self.body
            .get_or_insert_with(Vec::new)
            .push(Statement::Expression(expr));
        self
    }

    /// Append verbatim statement source, possibly spanning lines
    pub fn source(mut self, text: impl Into<String>) -> Self {
        self.body
            .get_or_insert_with(Vec::new)
            .push(Statement::Source(text.into()));
        self
    }

    /// `{}` instead of an abstract declaration
    pub fn with_empty_body(mut self) -> Self {
        self.body.get_or_insert_with(Vec::new);
        self
    }

    /// Annotation type element default (`String value() default "";`)
    pub fn default_value(mut self, value: ExpressionGenerator) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    fn signature(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        let mut text = modifiers(self.flags);
        if !self.type_parameters.is_empty() {
            let mut params = Vec::with_capacity(self.type_parameters.len());
            for (name, bounds) in &self.type_parameters {
                if bounds.is_empty() {
                    params.push(name.clone());
                } else {
                    let mut names = Vec::with_capacity(bounds.len());
                    for bound in bounds {
                        names.push(cx.type_text(bound)?);
                    }
                    params.push(format!("{} extends {}", name, names.join(" & ")));
                }
            }
            text.push_str(&format!("<{}> ", params.join(", ")));
        }
        if let Some(return_type) = &self.return_type {
            text.push_str(&cx.type_text(return_type)?);
            text.push(' ');
        }
        text.push_str(&self.name.text(cx.env())?);
        let mut params = Vec::with_capacity(self.parameters.len());
        for parameter in &self.parameters {
            params.push(parameter.to_text(cx)?);
        }
        text.push_str(&format!("({})", params.join(", ")));
        if !self.exceptions.is_empty() {
            let mut names = Vec::with_capacity(self.exceptions.len());
            for exception in &self.exceptions {
                names.push(cx.type_text(exception)?);
            }
            text.push_str(&format!(" throws {}", names.join(", ")));
        }
        if let Some(value) = &self.default_value {
            text.push_str(&format!(" default {}", value.to_text(cx)?));
        }
        Ok(text)
    }
}

impl SourceGenerator for MethodGenerator {
    fn render(&self, cx: &mut RenderContext<'_>, out: &mut java::Tokens) -> Result<()> {
        if let Some(comment) = &self.comment {
            comment.render(cx, out)?;
        }
        for annotation in &self.annotations {
            annotation.render(cx, out)?;
        }
        let signature = self.signature(cx)?;
        out.push();
        match &self.body {
            None => out.append(format!("{};", signature)),
            Some(statements) if statements.is_empty() => out.append(format!("{} {{}}", signature)),
            Some(statements) => {
                out.append(format!("{} {{", signature));
                out.indent();
                for statement in statements {
                    match statement {
                        Statement::Expression(expr) => {
                            let text = expr.to_text(cx)?;
                            append_lines(out, &format!("{};", text));
                        }
                        Statement::Source(text) => append_lines(out, text),
                    }
                }
                out.unindent();
                out.push();
                out.append("}");
            }
        }
        out.push();
        Ok(())
    }
}

/// Literal a generated body returns for a type, `None` for `void`
fn default_value(return_type: &TypeRef) -> Option<&'static str> {
    match return_type {
        TypeRef::Void => None,
        TypeRef::Primitive { name } => Some(match name.as_str() {
            "boolean" => "false",
            "char" => "'\\0'",
            "long" => "0L",
            "float" => "0.0f",
            "double" => "0.0",
            _ => "0",
        }),
        _ => Some("null"),
    }
}
