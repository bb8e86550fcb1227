use super::{
    CommentGenerator, ImportValidator, RenderContext, RenderSession, SourceGenerator,
    TypeGenerator,
};
use crate::config::EnvironmentConfig;
use crate::error::{Error, Result};
use crate::model::Environment;
use genco::prelude::*;
use serde::Serialize;

/// A rendered compilation unit, ready to be written by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedUnit {
    pub package: String,
    /// Simple name of the primary type
    pub type_name: String,
    pub source: String,
}

impl GeneratedUnit {
    /// Root-relative path the unit belongs at (`a/b/Name.java`)
    pub fn path(&self) -> String {
        if self.package.is_empty() {
            format!("{}.java", self.type_name)
        } else {
            format!("{}/{}.java", self.package.replace('.', "/"), self.type_name)
        }
    }
}

/// Package declaration, imports and top-level types of one file
#[derive(Debug, Clone, Default)]
pub struct CompilationUnitGenerator {
    package: String,
    header: Option<CommentGenerator>,
    types: Vec<TypeGenerator>,
}

impl CompilationUnitGenerator {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Default::default()
        }
    }

    /// File comment above the package declaration
    pub fn header(mut self, comment: CommentGenerator) -> Self {
        self.header = Some(comment);
        self
    }

    pub fn type_decl(mut self, generator: TypeGenerator) -> Self {
        self.types.push(generator);
        self
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// The first public type, else the first type
    pub fn primary_type(&self) -> Option<&TypeGenerator> {
        self.types
            .iter()
            .find(|t| t.is_public())
            .or_else(|| self.types.first())
    }

    /// Render in a fresh session. Type references that need an
    /// Environment fail with `ContextRequired` when `env` is `None`.
    pub fn generate(&self, env: Option<&Environment>, config: &EnvironmentConfig) -> Result<GeneratedUnit> {
        let primary = self
            .primary_type()
            .ok_or_else(|| Error::Render(format!("unit '{}' declares no types", self.package)))?;
        let mut session =
            RenderSession::new(env, config).with_imports(ImportValidator::new(self.package.clone()));
        let source = session.render(self)?;
        tracing::debug!(
            package = %self.package,
            type_name = primary.name(),
            imports = session.imports().imports().len(),
            "generated compilation unit"
        );
        Ok(GeneratedUnit {
            package: self.package.clone(),
            type_name: primary.name().to_string(),
            source,
        })
    }
}

impl SourceGenerator for CompilationUnitGenerator {
    fn render(&self, cx: &mut RenderContext<'_>, out: &mut java::Tokens) -> Result<()> {
        for generator in &self.types {
            for name in generator.declared_names(&self.package) {
                cx.imports().declare(&name);
            }
        }

        // the body decides the imports, so it renders first
        let mut body = java::Tokens::new();
        for (i, generator) in self.types.iter().enumerate() {
            if i > 0 {
                body.line();
            }
            generator.render(cx, &mut body)?;
        }

        if let Some(header) = &self.header {
            header.render(cx, out)?;
        }
        if !self.package.is_empty() {
            out.push();
            out.append(format!("package {};", self.package));
            out.line();
        }
        let imports = cx.imports().imports();
        for import in &imports {
            out.push();
            out.append(format!("import {};", import));
        }
        if !imports.is_empty() {
            out.line();
        }
        out.append(body);
        Ok(())
    }
}
