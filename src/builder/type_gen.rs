use super::{
    modifiers, AnnotationGenerator, CommentGenerator, ExpressionGenerator, FieldGenerator,
    MethodGenerator, RenderContext, SourceGenerator, TypeName,
};
use crate::decl::{Flags, TypeKind};
use crate::error::{Error, Result};
use crate::util::{is_identifier, qualify};
use genco::prelude::*;

#[derive(Debug, Clone)]
struct EnumConstant {
    name: String,
    arguments: Vec<ExpressionGenerator>,
}

/// Class, interface, enum or annotation type declaration
#[derive(Debug, Clone)]
pub struct TypeGenerator {
    kind: TypeKind,
    name: String,
    comment: Option<CommentGenerator>,
    annotations: Vec<AnnotationGenerator>,
    flags: Flags,
    type_parameters: Vec<(String, Vec<TypeName>)>,
    superclass: Option<TypeName>,
    interfaces: Vec<TypeName>,
    constants: Vec<EnumConstant>,
    fields: Vec<FieldGenerator>,
    methods: Vec<MethodGenerator>,
    nested: Vec<TypeGenerator>,
}

impl TypeGenerator {
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            comment: None,
            annotations: Vec::new(),
            flags: Flags::empty(),
            type_parameters: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            constants: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Class, name)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Interface, name)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Enum, name)
    }

    pub fn annotation_type(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Annotation, name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_public(&self) -> bool {
        self.flags.is_public()
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

    pub fn superclass(mut self, type_name: TypeName) -> Self {
        self.superclass = Some(type_name);
        self
    }

    /// Implemented interface (extended, for interfaces)
    pub fn interface_type(mut self, type_name: TypeName) -> Self {
        self.interfaces.push(type_name);
        self
    }

    pub fn constant(self, name: impl Into<String>) -> Self {
        self.constant_with(name, Vec::new())
    }

    /// Enum constant with constructor arguments
    pub fn constant_with(mut self, name: impl Into<String>, arguments: Vec<ExpressionGenerator>) -> Self {
        self.constants.push(EnumConstant {
            name: name.into(),
            arguments,
        });
        self
    }

    pub fn field(mut self, field: FieldGenerator) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodGenerator) -> Self {
        self.methods.push(method);
        self
    }

    pub fn nested(mut self, nested: TypeGenerator) -> Self {
        self.nested.push(nested);
        self
    }

    /// Qualified names of this type and every member type under `owner`
    /// (a package or an enclosing type)
    pub fn declared_names(&self, owner: &str) -> Vec<String> {
        let qualified = qualify(owner, &self.name);
        let mut names = vec![qualified.clone()];
        for nested in &self.nested {
            names.extend(nested.declared_names(&qualified));
        }
        names
    }

    fn header(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        if !is_identifier(&self.name) {
            return Err(Error::Render(format!("invalid type name '{}'", self.name)));
        }
        let mut text = format!("{}{} {}", modifiers(self.flags), self.kind.keyword(), self.name);
        if !self.type_parameters.is_empty() {
            let mut params = Vec::with_capacity(self.type_parameters.len());
            for (name, bounds) in &self.type_parameters {
                let mut param = name.clone();
                for (i, bound) in bounds.iter().enumerate() {
                    param.push_str(if i == 0 { " extends " } else { " & " });
                    param.push_str(&cx.type_text(bound)?);
                }
                params.push(param);
            }
            text.push_str(&format!("<{}>", params.join(", ")));
        }
        if let Some(superclass) = &self.superclass {
            text.push_str(&format!(" extends {}", cx.type_text(superclass)?));
        }
        if !self.interfaces.is_empty() {
            let mut names = Vec::with_capacity(self.interfaces.len());
            for interface in &self.interfaces {
                names.push(cx.type_text(interface)?);
            }
            let keyword = match self.kind {
                TypeKind::Interface => "extends",
                _ => "implements",
            };
            text.push_str(&format!(" {} {}", keyword, names.join(", ")));
        }
        text.push_str(" {");
        Ok(text)
    }

    fn render_constants(&self, cx: &mut RenderContext<'_>, out: &mut java::Tokens) -> Result<()> {
        let more = !self.fields.is_empty() || !self.methods.is_empty() || !self.nested.is_empty();
        for (i, constant) in self.constants.iter().enumerate() {
            let mut line = constant.name.clone();
            if !constant.arguments.is_empty() {
                let mut args = Vec::with_capacity(constant.arguments.len());
                for arg in &constant.arguments {
                    args.push(arg.to_text(cx)?);
                }
                line.push_str(&format!("({})", args.join(", ")));
            }
            if i + 1 < self.constants.len() {
                line.push(',');
            } else if more {
                line.push(';');
            }
            out.push();
            out.append(line);
        }
        Ok(())
    }
}

impl SourceGenerator for TypeGenerator {
    fn render(&self, cx: &mut RenderContext<'_>, out: &mut java::Tokens) -> Result<()> {
        if let Some(comment) = &self.comment {
            comment.render(cx, out)?;
        }
        for annotation in &self.annotations {
            annotation.render(cx, out)?;
        }
        let header = self.header(cx)?;
        out.push();
        out.append(header);
        out.indent();

        // blank line between member groups and between methods or member types
        let mut first = true;
        let mut separate = |out: &mut java::Tokens| {
            if !first {
                out.line();
            }
            first = false;
        };
        if !self.constants.is_empty() {
            separate(out);
            self.render_constants(cx, out)?;
        }
        if !self.fields.is_empty() {
            separate(out);
            for field in &self.fields {
                field.render(cx, out)?;
            }
        }
        for method in &self.methods {
            separate(out);
            method.render(cx, out)?;
        }
        for nested in &self.nested {
            separate(out);
            nested.render(cx, out)?;
        }

        out.unindent();
        out.push();
        out.append("}");
        out.push();
        Ok(())
    }
}
