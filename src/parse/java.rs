//! Java front end - parses compilation units to raw declarations via tree-sitter

use super::{source_hash, FrontEnd, ParseOptions};
use crate::decl::*;
use crate::error::{Error, Result};
use crate::util::qualify;
use indexmap::IndexMap;
use std::sync::Arc;
use tree_sitter::{Node, Parser};

/// tree-sitter based front end for `.java` sources
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaFrontEnd;

impl FrontEnd for JavaFrontEnd {
    fn parse(&self, path: &str, source: &str, options: ParseOptions) -> Result<RawCompilationUnit> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| Error::CodeParse(format!("Failed to set language: {}", e)))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| Error::CodeParse(format!("Failed to parse {}", path)))?;

        let root = tree.root_node();
        let mut unit = UnitParser {
            src: source.as_bytes(),
            path,
            options,
            scope: ImportScope::default(),
        };

        let mut cursor = root.walk();
        let children: Vec<Node> = root.named_children(&mut cursor).collect();

        for child in &children {
            match child.kind() {
                "package_declaration" => unit.scope.package = unit.package_name(*child),
                "import_declaration" => {
                    if let Some(import) = unit.parse_import(*child) {
                        unit.scope.imports.push(import);
                    }
                }
                _ => {}
            }
        }

        let types: Vec<Arc<RawType>> = children
            .iter()
            .filter(|c| is_type_declaration(c.kind()))
            .filter_map(|c| unit.parse_type(*c, None))
            .map(Arc::new)
            .collect();

        let has_errors = root.has_error();
        if has_errors {
            tracing::warn!(path, "compilation unit has syntax errors");
        }
        tracing::debug!(path, types = types.len(), "parsed compilation unit");

        Ok(RawCompilationUnit {
            path: path.to_string(),
            package: unit.scope.package.clone(),
            imports: unit.scope.imports.clone(),
            types,
            has_errors,
            source_hash: source_hash(source),
        })
    }

    fn extension(&self) -> &'static str {
        "java"
    }
}

fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "annotation_type_declaration"
            | "record_declaration"
    )
}

fn is_type_node(kind: &str) -> bool {
    matches!(
        kind,
        "void_type"
            | "integral_type"
            | "floating_point_type"
            | "boolean_type"
            | "type_identifier"
            | "scoped_type_identifier"
            | "generic_type"
            | "array_type"
            | "wildcard"
            | "annotated_type"
    )
}

struct UnitParser<'a> {
    src: &'a [u8],
    path: &'a str,
    options: ParseOptions,
    scope: ImportScope,
}

impl<'a> UnitParser<'a> {
    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.src).unwrap_or("")
    }

    /// Node text with all whitespace removed (qualified names may span lines)
    fn compact_text(&self, node: Node) -> String {
        self.text(node).chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn package_name(&self, node: Node) -> String {
        let mut cursor = node.walk();
        let name = node
            .named_children(&mut cursor)
            .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
            .map(|c| self.compact_text(c))
            .unwrap_or_default();
        name
    }

    fn parse_import(&self, node: Node) -> Option<RawImport> {
        let mut import = RawImport {
            name: String::new(),
            is_static: false,
            on_demand: false,
        };
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "static" => import.is_static = true,
                "asterisk" => import.on_demand = true,
                "identifier" | "scoped_identifier" => import.name = self.compact_text(child),
                _ => {}
            }
        }
        (!import.name.is_empty()).then_some(import)
    }

    fn parse_type(&self, node: Node, parent: Option<&str>) -> Option<RawType> {
        let kind = match node.kind() {
            "class_declaration" => TypeKind::Class,
            "interface_declaration" => TypeKind::Interface,
            "enum_declaration" => TypeKind::Enum,
            "annotation_type_declaration" => TypeKind::Annotation,
            "record_declaration" => TypeKind::Record,
            _ => return None,
        };
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())?;
        let qualified_name = match parent {
            Some(p) => format!("{}.{}", p, name),
            None => qualify(&self.scope.package, &name),
        };

        let mut raw = RawType {
            name,
            qualified_name,
            kind,
            flags: Flags::empty(),
            type_parameters: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            enum_constants: Vec::new(),
            nested: Vec::new(),
            declaring_type: parent.map(String::from),
            has_errors: node.has_error(),
            scope: self.scope.clone(),
            origin: Origin::Source {
                path: self.path.to_string(),
            },
        };

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "modifiers" => self.parse_modifiers(child, &mut raw.flags, &mut raw.annotations),
                "type_parameters" => raw.type_parameters = self.parse_type_parameters(child),
                "superclass" => raw.superclass = self.first_type(child),
                "super_interfaces" | "extends_interfaces" => {
                    raw.interfaces.extend(self.parse_type_list(child))
                }
                "formal_parameters" if kind == TypeKind::Record => {
                    self.parse_record_components(child, &mut raw)
                }
                "class_body" | "interface_body" | "enum_body" | "annotation_type_body" => {
                    self.parse_body(child, &mut raw)
                }
                _ => {}
            }
        }

        if raw.has_errors {
            tracing::warn!(path = self.path, name = %raw.qualified_name, "type declaration has syntax errors");
        }
        Some(raw)
    }

    fn parse_body(&self, body: Node, raw: &mut RawType) {
        let parent = raw.qualified_name.clone();
        let owner = raw.kind;
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "field_declaration" | "constant_declaration" => {
                    raw.fields.extend(self.parse_field(child, owner))
                }
                "method_declaration" => raw.methods.push(self.parse_method(child, owner, false)),
                "constructor_declaration" => {
                    raw.methods.push(self.parse_method(child, owner, true))
                }
                "annotation_type_element_declaration" => {
                    raw.methods.push(self.parse_annotation_element(child))
                }
                "enum_constant" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        raw.enum_constants.push(self.text(name).to_string());
                    }
                }
                "enum_body_declarations" => self.parse_body(child, raw),
                kind if is_type_declaration(kind) => {
                    if let Some(mut nested) = self.parse_type(child, Some(&parent)) {
                        if matches!(owner, TypeKind::Interface | TypeKind::Annotation) {
                            nested.flags |= Flags::PUBLIC | Flags::STATIC;
                        }
                        raw.nested.push(Arc::new(nested));
                    }
                }
                _ => {}
            }
        }
    }

    fn parse_modifiers(&self, node: Node, flags: &mut Flags, annotations: &mut Vec<RawAnnotation>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "marker_annotation" | "annotation" => annotations.push(self.parse_annotation(child)),
                keyword => {
                    if let Some(flag) = Flags::from_keyword(keyword) {
                        flags.insert(flag);
                    }
                }
            }
        }
    }

    fn parse_field(&self, node: Node, owner: TypeKind) -> Vec<RawField> {
        let mut flags = Flags::empty();
        let mut annotations = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "modifiers" {
                self.parse_modifiers(child, &mut flags, &mut annotations);
            }
        }
        if matches!(owner, TypeKind::Interface | TypeKind::Annotation) {
            flags |= Flags::PUBLIC | Flags::STATIC | Flags::FINAL;
        }

        let base_type = node
            .child_by_field_name("type")
            .map(|t| self.parse_type_syntax(t))
            .unwrap_or_else(|| TypeSyntax::named("java.lang.Object"));

        let mut fields = Vec::new();
        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            let Some(name) = declarator.child_by_field_name("name") else {
                continue;
            };
            let type_syntax = match declarator.child_by_field_name("dimensions") {
                Some(dims) => wrap_dimensions(base_type.clone(), self.text(dims)),
                None => base_type.clone(),
            };
            let constant = declarator
                .child_by_field_name("value")
                .filter(|_| flags.is_static() && flags.is_final())
                .map(|v| self.parse_meta(v))
                .filter(|v| !matches!(v, MetaValue::Expression(_)));
            fields.push(RawField {
                name: self.text(name).to_string(),
                flags,
                type_syntax,
                annotations: annotations.clone(),
                constant,
            });
        }
        fields
    }

    fn parse_method(&self, node: Node, owner: TypeKind, constructor: bool) -> RawMethod {
        let mut flags = Flags::empty();
        let mut annotations = Vec::new();
        let mut exceptions = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "modifiers" => self.parse_modifiers(child, &mut flags, &mut annotations),
                "throws" => exceptions = self.parse_type_list(child),
                _ => {}
            }
        }

        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let return_type = if constructor {
            None
        } else {
            node.child_by_field_name("type").map(|t| {
                let syntax = self.parse_type_syntax(t);
                match node.child_by_field_name("dimensions") {
                    Some(dims) => wrap_dimensions(syntax, self.text(dims)),
                    None => syntax,
                }
            })
        };
        let body_node = node.child_by_field_name("body");

        if owner == TypeKind::Interface && !flags.contains(Flags::PRIVATE) {
            flags |= Flags::PUBLIC;
            if body_node.is_none() && !flags.is_static() {
                flags |= Flags::ABSTRACT;
            }
        }

        RawMethod {
            name,
            flags,
            type_parameters: node
                .child_by_field_name("type_parameters")
                .map(|tp| self.parse_type_parameters(tp))
                .unwrap_or_default(),
            return_type,
            parameters: node
                .child_by_field_name("parameters")
                .map(|p| self.parse_parameters(p))
                .unwrap_or_default(),
            exceptions,
            annotations,
            default_value: None,
            body: body_node
                .filter(|_| self.options.method_bodies)
                .map(|b| self.text(b).to_string()),
        }
    }

    fn parse_annotation_element(&self, node: Node) -> RawMethod {
        let mut flags = Flags::PUBLIC | Flags::ABSTRACT;
        let mut annotations = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "modifiers" {
                self.parse_modifiers(child, &mut flags, &mut annotations);
            }
        }
        let return_type = node.child_by_field_name("type").map(|t| {
            let syntax = self.parse_type_syntax(t);
            match node.child_by_field_name("dimensions") {
                Some(dims) => wrap_dimensions(syntax, self.text(dims)),
                None => syntax,
            }
        });

        RawMethod {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default(),
            flags,
            type_parameters: Vec::new(),
            return_type,
            parameters: Vec::new(),
            exceptions: Vec::new(),
            annotations,
            default_value: node.child_by_field_name("value").map(|v| self.parse_meta(v)),
            body: None,
        }
    }

    fn parse_parameters(&self, node: Node) -> Vec<RawParameter> {
        let mut params = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "formal_parameter" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    let mut type_syntax = child
                        .child_by_field_name("type")
                        .map(|t| self.parse_type_syntax(t))
                        .unwrap_or_else(|| TypeSyntax::named("java.lang.Object"));
                    if let Some(dims) = child.child_by_field_name("dimensions") {
                        type_syntax = wrap_dimensions(type_syntax, self.text(dims));
                    }
                    params.push(RawParameter {
                        name: self.text(name).to_string(),
                        type_syntax,
                        varargs: false,
                        annotations: self.annotation_names(child),
                    });
                }
                "spread_parameter" => {
                    let mut name = String::new();
                    let mut element = None;
                    let mut inner = child.walk();
                    for part in child.named_children(&mut inner) {
                        match part.kind() {
                            "variable_declarator" => {
                                name = part
                                    .child_by_field_name("name")
                                    .map(|n| self.text(n).to_string())
                                    .unwrap_or_default();
                            }
                            kind if is_type_node(kind) && element.is_none() => {
                                element = Some(self.parse_type_syntax(part));
                            }
                            _ => {}
                        }
                    }
                    if let Some(element) = element {
                        params.push(RawParameter {
                            name,
                            type_syntax: TypeSyntax::array(element),
                            varargs: true,
                            annotations: self.annotation_names(child),
                        });
                    }
                }
                _ => {}
            }
        }
        params
    }

    fn parse_record_components(&self, node: Node, raw: &mut RawType) {
        for param in self.parse_parameters(node) {
            raw.methods.push(RawMethod {
                name: param.name.clone(),
                flags: Flags::PUBLIC,
                type_parameters: Vec::new(),
                return_type: Some(param.type_syntax.clone()),
                parameters: Vec::new(),
                exceptions: Vec::new(),
                annotations: Vec::new(),
                default_value: None,
                body: None,
            });
            raw.fields.push(RawField {
                name: param.name,
                flags: Flags::PRIVATE | Flags::FINAL,
                type_syntax: param.type_syntax,
                annotations: Vec::new(),
                constant: None,
            });
        }
    }

    fn annotation_names(&self, param: Node) -> Vec<String> {
        let mut flags = Flags::empty();
        let mut annotations = Vec::new();
        let mut cursor = param.walk();
        for child in param.children(&mut cursor) {
            if child.kind() == "modifiers" {
                self.parse_modifiers(child, &mut flags, &mut annotations);
            }
        }
        annotations.into_iter().map(|a| a.name).collect()
    }

    fn parse_type_parameters(&self, node: Node) -> Vec<RawTypeParameter> {
        let mut params = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "type_parameter" {
                continue;
            }
            let mut name = String::new();
            let mut bounds = Vec::new();
            let mut inner = child.walk();
            for part in child.named_children(&mut inner) {
                match part.kind() {
                    "type_identifier" | "identifier" if name.is_empty() => {
                        name = self.text(part).to_string()
                    }
                    "type_bound" => {
                        let mut bound_cursor = part.walk();
                        bounds = part
                            .named_children(&mut bound_cursor)
                            .filter(|b| is_type_node(b.kind()))
                            .map(|b| self.parse_type_syntax(b))
                            .collect();
                    }
                    _ => {}
                }
            }
            if !name.is_empty() {
                params.push(RawTypeParameter { name, bounds });
            }
        }
        params
    }

    /// Types of a `type_list`, or of the node itself when it holds them directly
    fn parse_type_list(&self, node: Node) -> Vec<TypeSyntax> {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        let mut types = Vec::new();
        for child in children {
            if child.kind() == "type_list" {
                let mut inner = child.walk();
                types.extend(
                    child
                        .named_children(&mut inner)
                        .filter(|t| is_type_node(t.kind()))
                        .map(|t| self.parse_type_syntax(t)),
                );
            } else if is_type_node(child.kind()) {
                types.push(self.parse_type_syntax(child));
            }
        }
        types
    }

    fn first_type(&self, node: Node) -> Option<TypeSyntax> {
        let mut cursor = node.walk();
        let found = node
            .named_children(&mut cursor)
            .find(|c| is_type_node(c.kind()))
            .map(|c| self.parse_type_syntax(c));
        found
    }

    fn parse_type_syntax(&self, node: Node) -> TypeSyntax {
        match node.kind() {
            "void_type" => TypeSyntax::Void,
            "integral_type" | "floating_point_type" | "boolean_type" => TypeSyntax::Primitive {
                name: self.text(node).to_string(),
            },
            "type_identifier" | "identifier" => TypeSyntax::named(self.text(node)),
            "scoped_type_identifier" | "scoped_identifier" => {
                TypeSyntax::named(strip_type_arguments(&self.compact_text(node)))
            }
            "generic_type" => {
                let mut name = String::new();
                let mut args = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    match child.kind() {
                        "type_identifier" | "scoped_type_identifier" => {
                            name = strip_type_arguments(&self.compact_text(child))
                        }
                        "type_arguments" => {
                            let mut inner = child.walk();
                            args = child
                                .named_children(&mut inner)
                                .filter(|a| is_type_node(a.kind()))
                                .map(|a| self.parse_type_syntax(a))
                                .collect();
                        }
                        _ => {}
                    }
                }
                TypeSyntax::Named { name, args }
            }
            "array_type" => {
                let element = node
                    .child_by_field_name("element")
                    .map(|e| self.parse_type_syntax(e))
                    .unwrap_or_else(|| TypeSyntax::named("java.lang.Object"));
                match node.child_by_field_name("dimensions") {
                    Some(dims) => wrap_dimensions(element, self.text(dims)),
                    None => TypeSyntax::array(element),
                }
            }
            "wildcard" => {
                let mut lower_bound = false;
                let mut bound = None;
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    match child.kind() {
                        "super" => lower_bound = true,
                        kind if is_type_node(kind) => {
                            bound = Some(Box::new(self.parse_type_syntax(child)))
                        }
                        _ => {}
                    }
                }
                if lower_bound {
                    TypeSyntax::Wildcard {
                        upper: None,
                        lower: bound,
                    }
                } else {
                    TypeSyntax::Wildcard {
                        upper: bound,
                        lower: None,
                    }
                }
            }
            "annotated_type" => {
                let mut cursor = node.walk();
                let inner = node
                    .named_children(&mut cursor)
                    .filter(|c| is_type_node(c.kind()))
                    .last();
                match inner {
                    Some(inner) => self.parse_type_syntax(inner),
                    None => TypeSyntax::named(self.compact_text(node)),
                }
            }
            _ => TypeSyntax::named(self.compact_text(node)),
        }
    }

    fn parse_annotation(&self, node: Node) -> RawAnnotation {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.compact_text(n))
            .unwrap_or_default();
        let mut elements = IndexMap::new();

        if let Some(args) = node.child_by_field_name("arguments") {
            let mut cursor = args.walk();
            for child in args.named_children(&mut cursor) {
                match child.kind() {
                    "element_value_pair" => {
                        let key = child.child_by_field_name("key").map(|k| self.text(k));
                        let value = child.child_by_field_name("value").map(|v| self.parse_meta(v));
                        if let (Some(key), Some(value)) = (key, value) {
                            elements.insert(key.to_string(), value);
                        }
                    }
                    "line_comment" | "block_comment" => {}
                    _ => {
                        elements.insert("value".to_string(), self.parse_meta(child));
                    }
                }
            }
        }

        RawAnnotation { name, elements }
    }

    fn parse_meta(&self, node: Node) -> MetaValue {
        let text = self.text(node);
        match node.kind() {
            "string_literal" => MetaValue::String(unescape(strip_quotes(text, "\""))),
            "text_block" => MetaValue::String(
                strip_quotes(text, "\"\"\"")
                    .trim_start_matches(['\r', '\n'])
                    .to_string(),
            ),
            "character_literal" => unescape(strip_quotes(text, "'"))
                .chars()
                .next()
                .map(MetaValue::Char)
                .unwrap_or_else(|| MetaValue::Expression(text.to_string())),
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal" => parse_int_literal(text)
                .map(MetaValue::Int)
                .unwrap_or_else(|| MetaValue::Expression(text.to_string())),
            "decimal_floating_point_literal" | "hex_floating_point_literal" => text
                .replace('_', "")
                .trim_end_matches(['f', 'F', 'd', 'D'])
                .parse()
                .map(MetaValue::Float)
                .unwrap_or_else(|_| MetaValue::Expression(text.to_string())),
            "true" => MetaValue::Bool(true),
            "false" => MetaValue::Bool(false),
            "class_literal" => {
                let mut cursor = node.walk();
                let inner = node.named_children(&mut cursor).next();
                match inner {
                    Some(t) => MetaValue::Class(self.parse_type_syntax(t)),
                    None => MetaValue::Expression(text.to_string()),
                }
            }
            "field_access" => {
                let object = node.child_by_field_name("object").map(|o| self.compact_text(o));
                let field = node.child_by_field_name("field").map(|f| self.text(f));
                match (object, field) {
                    (Some(type_name), Some(constant)) => MetaValue::Enum {
                        type_name,
                        constant: constant.to_string(),
                    },
                    _ => MetaValue::Expression(text.to_string()),
                }
            }
            "identifier" => MetaValue::Enum {
                type_name: String::new(),
                constant: text.to_string(),
            },
            "element_value_array_initializer" | "array_initializer" => {
                let mut cursor = node.walk();
                let items = node
                    .named_children(&mut cursor)
                    .filter(|c| !matches!(c.kind(), "line_comment" | "block_comment"))
                    .map(|c| self.parse_meta(c))
                    .collect();
                MetaValue::Array(items)
            }
            "annotation" | "marker_annotation" => {
                MetaValue::Annotation(Box::new(self.parse_annotation(node)))
            }
            "parenthesized_expression" => {
                let mut cursor = node.walk();
                let inner = node.named_children(&mut cursor).next();
                match inner {
                    Some(inner) => self.parse_meta(inner),
                    None => MetaValue::Expression(text.to_string()),
                }
            }
            "unary_expression" => {
                let operator = node.child_by_field_name("operator").map(|o| self.text(o));
                let operand = node.child_by_field_name("operand").map(|o| self.parse_meta(o));
                match (operator, operand) {
                    (Some("-"), Some(MetaValue::Int(i))) => MetaValue::Int(i.wrapping_neg()),
                    (Some("-"), Some(MetaValue::Float(f))) => MetaValue::Float(-f),
                    (Some("+"), Some(v @ (MetaValue::Int(_) | MetaValue::Float(_)))) => v,
                    (Some("!"), Some(MetaValue::Bool(b))) => MetaValue::Bool(!b),
                    _ => MetaValue::Expression(text.to_string()),
                }
            }
            _ => MetaValue::Expression(text.to_string()),
        }
    }
}

fn wrap_dimensions(mut syntax: TypeSyntax, dims: &str) -> TypeSyntax {
    for _ in 0..dims.matches('[').count() {
        syntax = TypeSyntax::array(syntax);
    }
    syntax
}

/// `Outer<String>.Inner` -> `Outer.Inner`
fn strip_type_arguments(name: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn strip_quotes<'s>(text: &'s str, quote: &str) -> &'s str {
    let text = text.strip_prefix(quote).unwrap_or(text);
    text.strip_suffix(quote).unwrap_or(text)
}

/// Integer literal value in its `int` or `long` (suffixed) width. Non-decimal
/// literals are two's complement bit patterns. The decimal magnitudes 2^31
/// and 2^63 are only legal under unary minus, which wraps them back.
fn parse_int_literal(text: &str) -> Option<i64> {
    let cleaned = text.replace('_', "");
    let long = cleaned.ends_with(['l', 'L']);
    let t = cleaned.trim_end_matches(['l', 'L']);
    let (digits, radix) = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(bin) = t.strip_prefix("0b").or_else(|| t.strip_prefix("0B")) {
        (bin, 2)
    } else if t.len() > 1 && t.starts_with('0') {
        (&t[1..], 8)
    } else {
        (t, 10)
    };
    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    if radix == 10 {
        let limit = if long { 1u64 << 63 } else { 1u64 << 31 };
        (magnitude <= limit).then_some(magnitude as i64)
    } else if long {
        Some(magnitude as i64)
    } else {
        u32::try_from(magnitude).ok().map(|v| i64::from(v as i32))
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('s') => out.push(' '),
            Some(first @ '0'..='7') => {
                // \0 through \377
                let max_digits = if first <= '3' { 3 } else { 2 };
                let mut value = first.to_digit(8).unwrap_or(0);
                for _ in 1..max_digits {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from(value as u8));
            }
            Some('u') => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> RawCompilationUnit {
        JavaFrontEnd
            .parse("demo/Sample.java", source, ParseOptions::default())
            .unwrap()
    }

    #[test]
    fn test_parse_package_imports_and_types() {
        let unit = parse(
            r#"
package demo;

import java.util.List;
import static java.util.Collections.*;

public class Sample<T extends Comparable<T>> extends Base<T> implements Runnable, java.io.Serializable {
    private List<T> items;
    public static final String VERSION = "1.2.3";

    public T first() { return items.get(0); }
    public void run() {}
}

class Helper {}
"#,
        );

        assert_eq!(unit.package, "demo");
        assert_eq!(unit.imports.len(), 2);
        assert!(unit.imports[1].is_static && unit.imports[1].on_demand);
        assert_eq!(unit.types.len(), 2);
        assert!(!unit.has_errors);

        let sample = unit.find_type("Sample").unwrap();
        assert_eq!(sample.qualified_name, "demo.Sample");
        assert_eq!(sample.kind, TypeKind::Class);
        assert!(sample.flags.is_public());
        assert_eq!(sample.type_parameters[0].name, "T");
        assert_eq!(sample.type_parameters[0].bounds[0].to_string(), "Comparable<T>");
        assert_eq!(sample.superclass.as_ref().unwrap().to_string(), "Base<T>");
        assert_eq!(sample.interfaces.len(), 2);
        assert_eq!(sample.interfaces[1].to_string(), "java.io.Serializable");

        let version = sample.fields.iter().find(|f| f.name == "VERSION").unwrap();
        assert_eq!(version.constant, Some(MetaValue::String("1.2.3".into())));
        assert!(version.flags.is_static() && version.flags.is_final());

        let first = sample.methods.iter().find(|m| m.name == "first").unwrap();
        assert_eq!(first.return_type, Some(TypeSyntax::named("T")));
        assert!(first.body.is_none());

        let helper = unit.find_type("Helper").unwrap();
        assert_eq!(helper.qualified_name, "demo.Helper");
        assert!(helper.flags.is_package_private());
    }

    #[test]
    fn test_bodies_kept_on_request() {
        let unit = JavaFrontEnd
            .parse(
                "A.java",
                "class A { int f() { return 1; } }",
                ParseOptions { method_bodies: true },
            )
            .unwrap();
        let f = &unit.types[0].methods[0];
        assert_eq!(f.body.as_deref(), Some("{ return 1; }"));
    }

    #[test]
    fn test_interface_members_get_implicit_flags() {
        let unit = parse(
            "package demo; interface Api { int LIMIT = 3; String name(); default int size() { return 0; } class Impl {} }",
        );
        let api = &unit.types[0];
        assert_eq!(api.kind, TypeKind::Interface);
        assert!(api.fields[0].flags.contains(Flags::PUBLIC | Flags::STATIC | Flags::FINAL));
        assert_eq!(api.fields[0].constant, Some(MetaValue::Int(3)));
        let name = api.methods.iter().find(|m| m.name == "name").unwrap();
        assert!(name.flags.is_abstract() && name.flags.is_public());
        let size = api.methods.iter().find(|m| m.name == "size").unwrap();
        assert!(!size.flags.is_abstract());
        let nested = api.nested_type("Impl").unwrap();
        assert_eq!(nested.qualified_name, "demo.Api.Impl");
        assert_eq!(nested.declaring_type.as_deref(), Some("demo.Api"));
        assert!(nested.flags.is_static());
    }

    #[test]
    fn test_annotations_and_element_defaults() {
        let unit = parse(
            r#"
package demo;

@Retention(RetentionPolicy.RUNTIME)
@Target({ElementType.TYPE, ElementType.METHOD})
public @interface Label {
    String value() default "N/A";
    int order() default -1;
    Class<?> type() default Object.class;
    String[] tags() default {};
}
"#,
        );
        let label = &unit.types[0];
        assert_eq!(label.kind, TypeKind::Annotation);
        assert_eq!(label.annotations.len(), 2);
        assert_eq!(
            label.annotations[0].elements["value"],
            MetaValue::Enum {
                type_name: "RetentionPolicy".into(),
                constant: "RUNTIME".into()
            }
        );
        match &label.annotations[1].elements["value"] {
            MetaValue::Array(items) => assert_eq!(items.len(), 2),
            other => panic!("expected array, got {:?}", other),
        }

        let value = label.methods.iter().find(|m| m.name == "value").unwrap();
        assert_eq!(value.default_value, Some(MetaValue::String("N/A".into())));
        let order = label.methods.iter().find(|m| m.name == "order").unwrap();
        assert_eq!(order.default_value, Some(MetaValue::Int(-1)));
        let ty = label.methods.iter().find(|m| m.name == "type").unwrap();
        assert_eq!(
            ty.default_value,
            Some(MetaValue::Class(TypeSyntax::named("Object")))
        );
        let tags = label.methods.iter().find(|m| m.name == "tags").unwrap();
        assert_eq!(tags.default_value, Some(MetaValue::Array(vec![])));
        assert_eq!(tags.return_type.as_ref().unwrap().to_string(), "String[]");
    }

    #[test]
    fn test_varargs_wildcards_and_enum() {
        let unit = parse(
            r#"
package demo;
enum Color implements Supplier<? extends Number> {
    RED, GREEN;
    static void paint(Map<String, ? super Integer> m, String... names) throws java.io.IOException {}
}
"#,
        );
        let color = &unit.types[0];
        assert_eq!(color.enum_constants, vec!["RED", "GREEN"]);
        assert_eq!(color.interfaces[0].to_string(), "Supplier<? extends Number>");
        let paint = &color.methods[0];
        assert_eq!(paint.parameters[0].type_syntax.to_string(), "Map<String, ? super Integer>");
        assert!(paint.parameters[1].varargs);
        assert_eq!(paint.parameters[1].type_syntax.to_string(), "String[]");
        assert_eq!(paint.exceptions[0].to_string(), "java.io.IOException");
    }

    #[test]
    fn test_malformed_source_still_yields_type() {
        let unit = parse("package demo; public class Broken extends Base { void f() { int x = ; } }");
        assert!(unit.has_errors);
        let broken = unit.find_type("Broken").unwrap();
        assert_eq!(broken.qualified_name, "demo.Broken");
        assert!(broken.has_errors);
    }

    #[test]
    fn test_literal_helpers() {
        assert_eq!(parse_int_literal("0x1F"), Some(31));
        assert_eq!(parse_int_literal("1_000L"), Some(1000));
        assert_eq!(parse_int_literal("017"), Some(15));
        assert_eq!(parse_int_literal("0b101"), Some(5));
        assert_eq!(unescape(r#"a\"b\nA"#), "a\"b\nA");
        assert_eq!(unescape(r"A\101B\12C"), "AAB\nC");
        assert_eq!(unescape(r"\0\477"), "\0'7");
        assert_eq!(parse_int_literal("0xFFFFFFFF"), Some(-1));
        assert_eq!(parse_int_literal("0xFFFFFFFFL"), Some(4_294_967_295));
        assert_eq!(parse_int_literal("037777777777"), Some(-1));
        assert_eq!(parse_int_literal("0x8000000000000000L"), Some(i64::MIN));
        assert_eq!(parse_int_literal("9223372036854775808L"), Some(i64::MIN));
        assert_eq!(parse_int_literal("9223372036854775809L"), None);
        assert_eq!(strip_type_arguments("Outer<String>.Inner"), "Outer.Inner");
    }

    #[test]
    fn test_constant_initializers() {
        let unit = parse(
            r#"package demo;
class Limits {
    static final long MIN = -0x8000000000000000L;
    static final long FLOOR = -9223372036854775808L;
    static final int INT_MIN = -2147483648;
    static final int ALL = 0xFFFFFFFF;
    static final double NEG = -1.5;
    static final String S = "A\101B\12C";
    static final char Q = '\101';
    int count = 3;
    static int shared = 4;
}"#,
        );
        let limits = unit.find_type("Limits").unwrap();
        let constant = |name: &str| {
            limits
                .fields
                .iter()
                .find(|f| f.name == name)
                .unwrap()
                .constant
                .clone()
        };
        assert_eq!(constant("MIN"), Some(MetaValue::Int(i64::MIN)));
        assert_eq!(constant("FLOOR"), Some(MetaValue::Int(i64::MIN)));
        assert_eq!(constant("INT_MIN"), Some(MetaValue::Int(-2_147_483_648)));
        assert_eq!(constant("ALL"), Some(MetaValue::Int(-1)));
        assert_eq!(constant("NEG"), Some(MetaValue::Float(-1.5)));
        assert_eq!(constant("S"), Some(MetaValue::String("AAB\nC".into())));
        assert_eq!(constant("Q"), Some(MetaValue::Char('A')));
        assert_eq!(constant("count"), None);
        assert_eq!(constant("shared"), None);
    }
}
