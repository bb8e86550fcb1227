use super::{RenderContext, SourceGenerator};
use crate::error::Result;
use genco::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentStyle {
    Javadoc,
    Block,
    Line,
}

/// Javadoc, block or line comment
#[derive(Debug, Clone)]
pub struct CommentGenerator {
    style: CommentStyle,
    lines: Vec<String>,
    tags: Vec<(String, String)>,
}

impl CommentGenerator {
    fn new(style: CommentStyle, text: &str) -> Self {
        Self {
            style,
            lines: text.lines().map(|l| l.trim_end().to_string()).collect(),
            tags: Vec::new(),
        }
    }

    pub fn javadoc(text: &str) -> Self {
        Self::new(CommentStyle::Javadoc, text)
    }

    pub fn block(text: &str) -> Self {
        Self::new(CommentStyle::Block, text)
    }

    pub fn line(text: &str) -> Self {
        Self::new(CommentStyle::Line, text)
    }

    /// Trailing `@tag text` line (javadoc only)
    pub fn tag(mut self, tag: &str, text: &str) -> Self {
        self.tags.push((tag.trim_start_matches('@').to_string(), text.to_string()));
        self
    }
}

impl SourceGenerator for CommentGenerator {
    fn render(&self, _cx: &mut RenderContext<'_>, out: &mut java::Tokens) -> Result<()> {
        if self.style == CommentStyle::Line {
            for line in &self.lines {
                out.push();
                out.append(format!("// {}", line).trim_end().to_string());
            }
            out.push();
            return Ok(());
        }

        out.push();
        out.append(if self.style == CommentStyle::Javadoc { "/**" } else { "/*" });
        let tags = self
            .tags
            .iter()
            .map(|(tag, text)| format!("@{} {}", tag, text));
        let tagged = self.style == CommentStyle::Javadoc && !self.tags.is_empty();
        let separator = (tagged && !self.lines.is_empty()).then(String::new);
        for line in self
            .lines
            .iter()
            .cloned()
            .chain(separator)
            .chain(tags.filter(|_| tagged))
        {
            out.push();
            if line.is_empty() {
                out.append(" *");
            } else {
                out.append(format!(" * {}", line));
            }
        }
        out.push();
        out.append(" */");
        out.push();
        Ok(())
    }
}
