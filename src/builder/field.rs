use super::{
    modifiers, AnnotationGenerator, CommentGenerator, ExpressionGenerator, MemberName,
    RenderContext, SourceGenerator, TypeName,
};
use crate::decl::Flags;
use crate::error::Result;
use crate::model::Field;
use genco::prelude::*;

/// Field declaration
#[derive(Debug, Clone)]
pub struct FieldGenerator {
    comment: Option<CommentGenerator>,
    annotations: Vec<AnnotationGenerator>,
    flags: Flags,
    type_name: TypeName,
    name: MemberName,
    initializer: Option<ExpressionGenerator>,
}

impl FieldGenerator {
    pub fn new(type_name: TypeName, name: impl Into<MemberName>) -> Self {
        Self {
            comment: None,
            annotations: Vec::new(),
            flags: Flags::empty(),
            type_name,
            name: name.into(),
            initializer: None,
        }
    }

    /// `public static final` constant with an initializer
    pub fn constant(type_name: TypeName, name: &str, value: ExpressionGenerator) -> Self {
        Self::new(type_name, name)
            .flags(Flags::PUBLIC | Flags::STATIC | Flags::FINAL)
            .initializer(value)
    }

    /// Declaration mirroring an existing field, constant initializer included
    pub fn from_field(field: &Field) -> Self {
        let mut generator = Self::new(TypeName::from(&field.type_ref), field.name.as_str())
            .flags(field.flags);
        for annotation in &field.annotations {
            generator = generator.annotation(AnnotationGenerator::from_annotation(annotation));
        }
        if let Some(constant) = &field.constant {
            generator = generator.initializer(ExpressionGenerator::from_meta(constant));
        }
        generator
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

    pub fn initializer(mut self, value: ExpressionGenerator) -> Self {
        self.initializer = Some(value);
        self
    }
}

impl SourceGenerator for FieldGenerator {
    fn render(&self, cx: &mut RenderContext<'_>, out: &mut java::Tokens) -> Result<()> {
        if let Some(comment) = &self.comment {
            comment.render(cx, out)?;
        }
        for annotation in &self.annotations {
            annotation.render(cx, out)?;
        }
        let mut line = format!(
            "{}{} {}",
            modifiers(self.flags),
            cx.type_text(&self.type_name)?,
            self.name.text(cx.env())?
        );
        if let Some(value) = &self.initializer {
            line.push_str(" = ");
            line.push_str(&value.to_text(cx)?);
        }
        line.push(';');
        out.push();
        out.append(line);
        out.push();
        Ok(())
    }
}
