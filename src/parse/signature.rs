//! Type signature text -> `TypeSyntax`
//!
//! Accepts the source form of a type reference, e.g.
//! `java.util.Map<java.lang.String, ? extends a.B[]>`.

use crate::decl::TypeSyntax;
use crate::error::{Error, Result};

const PRIMITIVES: [&str; 8] = [
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

/// Parse a type signature
pub fn parse_signature(text: &str) -> Result<TypeSyntax> {
    let mut parser = SignatureParser {
        text,
        chars: text.char_indices().collect(),
        pos: 0,
    };
    let syntax = parser.parse_type()?;
    parser.skip_ws();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(syntax)
}

struct SignatureParser<'a> {
    text: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl SignatureParser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> Error {
        let offset = self
            .chars
            .get(self.pos)
            .map(|(i, _)| *i)
            .unwrap_or(self.text.len());
        Error::Signature(format!("{} at offset {} in '{}'", message, offset, self.text))
    }

    fn identifier(&mut self) -> Option<String> {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.pos += 1;
        }
        (self.pos > start).then(|| self.chars[start..self.pos].iter().map(|(_, c)| c).collect())
    }

    fn parse_type(&mut self) -> Result<TypeSyntax> {
        self.skip_ws();
        let mut syntax = if self.eat('?') {
            self.parse_wildcard()?
        } else {
            let first = self
                .identifier()
                .ok_or_else(|| self.error("expected a type name"))?;
            if first == "void" {
                TypeSyntax::Void
            } else if PRIMITIVES.contains(&first.as_str()) {
                TypeSyntax::Primitive { name: first }
            } else {
                self.parse_named(first)?
            }
        };

        loop {
            self.skip_ws();
            if self.peek() == Some('[') {
                self.pos += 1;
                if !self.eat(']') {
                    return Err(self.error("expected ']'"));
                }
                syntax = TypeSyntax::array(syntax);
            } else if self.at_ellipsis() {
                self.pos += 3;
                syntax = TypeSyntax::array(syntax);
            } else {
                break;
            }
        }
        Ok(syntax)
    }

    fn parse_named(&mut self, first: String) -> Result<TypeSyntax> {
        let mut name = first;
        let mut args = Vec::new();
        loop {
            if self.eat('<') {
                args = self.parse_arguments()?;
            }
            self.skip_ws();
            if self.peek() == Some('.') && !self.at_ellipsis() {
                self.pos += 1;
                let segment = self
                    .identifier()
                    .ok_or_else(|| self.error("expected identifier after '.'"))?;
                name.push('.');
                name.push_str(&segment);
                // arguments of an outer type are dropped for member types
                args.clear();
            } else {
                break;
            }
        }
        Ok(TypeSyntax::Named { name, args })
    }

    fn at_ellipsis(&self) -> bool {
        (0..3).all(|i| self.chars.get(self.pos + i).map(|(_, c)| *c) == Some('.'))
    }

    fn parse_arguments(&mut self) -> Result<Vec<TypeSyntax>> {
        let mut args = vec![self.parse_type()?];
        while self.eat(',') {
            args.push(self.parse_type()?);
        }
        if !self.eat('>') {
            return Err(self.error("expected '>'"));
        }
        Ok(args)
    }

    fn parse_wildcard(&mut self) -> Result<TypeSyntax> {
        let save = self.pos;
        match self.identifier().as_deref() {
            Some("extends") => Ok(TypeSyntax::Wildcard {
                upper: Some(Box::new(self.parse_type()?)),
                lower: None,
            }),
            Some("super") => Ok(TypeSyntax::Wildcard {
                upper: None,
                lower: Some(Box::new(self.parse_type()?)),
            }),
            Some(_) => Err(self.error("expected 'extends' or 'super'")),
            None => {
                self.pos = save;
                Ok(TypeSyntax::Wildcard {
                    upper: None,
                    lower: None,
                })
            }
        }
    }
}
