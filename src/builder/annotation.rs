use super::{ExpressionGenerator, RenderContext, SourceGenerator, TypeName};
use crate::error::Result;
use crate::model::Annotation;
use genco::prelude::*;
use indexmap::IndexMap;

/// `@Type`, `@Type(value)` or `@Type(a = x, b = y)`
#[derive(Debug, Clone)]
pub struct AnnotationGenerator {
    type_name: TypeName,
    elements: IndexMap<String, ExpressionGenerator>,
}

impl AnnotationGenerator {
    pub fn new(type_name: TypeName) -> Self {
        Self {
            type_name,
            elements: IndexMap::new(),
        }
    }

    pub fn named(qualified_name: &str) -> Self {
        Self::new(TypeName::named(qualified_name))
    }

    pub fn override_marker() -> Self {
        Self::named("java.lang.Override")
    }

    pub fn deprecated() -> Self {
        Self::named("java.lang.Deprecated")
    }

    pub fn suppress_warnings(warnings: &[&str]) -> Self {
        let value = match warnings {
            [single] => ExpressionGenerator::string_literal(*single),
            many => {
                let mut expr = ExpressionGenerator::raw("{");
                for (i, w) in many.iter().enumerate() {
                    if i > 0 {
                        expr = expr.text(", ");
                    }
                    expr = expr.string(*w);
                }
                expr.text("}")
            }
        };
        Self::named("java.lang.SuppressWarnings").value(value)
    }

    /// Copy of an existing annotation instance
    pub fn from_annotation(annotation: &Annotation) -> Self {
        let mut generator = Self::named(&annotation.type_name);
        for (name, value) in &annotation.elements {
            generator = generator.element(name, ExpressionGenerator::from_meta(value));
        }
        generator
    }

    pub fn element(mut self, name: &str, value: ExpressionGenerator) -> Self {
        self.elements.insert(name.to_string(), value);
        self
    }

    pub fn value(self, value: ExpressionGenerator) -> Self {
        self.element("value", value)
    }

    pub fn to_text(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        let mut text = format!("@{}", cx.type_text(&self.type_name)?);
        if self.elements.is_empty() {
            return Ok(text);
        }
        text.push('(');
        if self.elements.len() == 1 && self.elements.contains_key("value") {
            if let Some(value) = self.elements.get("value") {
                text.push_str(&value.to_text(cx)?);
            }
        } else {
            let mut pairs = Vec::with_capacity(self.elements.len());
            for (name, value) in &self.elements {
                pairs.push(format!("{} = {}", name, value.to_text(cx)?));
            }
            text.push_str(&pairs.join(", "));
        }
        text.push(')');
        Ok(text)
    }
}

impl SourceGenerator for AnnotationGenerator {
    fn render(&self, cx: &mut RenderContext<'_>, out: &mut java::Tokens) -> Result<()> {
        let text = self.to_text(cx)?;
        out.push();
        out.append(text);
        out.push();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ImportValidator;
    use crate::decl::MetaValue;

    fn text(annotation: &AnnotationGenerator) -> String {
        let mut imports = ImportValidator::new("app");
        let mut cx = RenderContext::new(None, &mut imports);
        annotation.to_text(&mut cx).unwrap()
    }

    #[test]
    fn test_forms() {
        assert_eq!(text(&AnnotationGenerator::override_marker()), "@Override");
        assert_eq!(
            text(&AnnotationGenerator::suppress_warnings(&["unchecked"])),
            "@SuppressWarnings(\"unchecked\")"
        );
        assert_eq!(
            text(&AnnotationGenerator::suppress_warnings(&["unchecked", "rawtypes"])),
            "@SuppressWarnings({\"unchecked\", \"rawtypes\"})"
        );
        let pair = AnnotationGenerator::named("javax.annotation.Generated")
            .value(ExpressionGenerator::string_literal("classforge"))
            .element("date", ExpressionGenerator::string_literal("today"));
        assert_eq!(text(&pair), "@Generated(value = \"classforge\", date = \"today\")");
    }

    #[test]
    fn test_copy_of_instance() {
        let mut elements = IndexMap::new();
        elements.insert("since".to_string(), MetaValue::String("9".into()));
        elements.insert("forRemoval".to_string(), MetaValue::Bool(true));
        let annotation = Annotation {
            type_name: "java.lang.Deprecated".into(),
            resolved: true,
            elements,
        };
        assert_eq!(
            text(&AnnotationGenerator::from_annotation(&annotation)),
            "@Deprecated(since = \"9\", forRemoval = true)"
        );
    }
}
