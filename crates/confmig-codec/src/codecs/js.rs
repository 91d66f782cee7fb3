//! JS module config codec
//!
//! Reads modules of the form `module.exports = { ... }` or
//! `export default { ... }` with tree-sitter. The TypeScript grammar is used
//! since it is a superset of JS and also covers `satisfies`/`as` wrappers.
//! Only literal data is accepted: objects, arrays, strings, numbers, booleans,
//! `null`/`undefined`, and references to `const` bindings declared earlier
//! in the module.
//!
//! Output mirrors Node's `util.inspect` with `compact: false`, one entry per
//! line, so rewritten modules read like hand-written ones.

use super::{ConfigCodec, Format};
use crate::document::{value_kind, ConfigDocument};
use crate::error::CodecError;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::fmt::Write as _;
use tree_sitter::{Node, Parser};

/// Module export prefix written on serialize
const EXPORT_PREFIX: &str = "module.exports = ";

/// JS module codec
#[derive(Debug, Clone, Copy, Default)]
pub struct JsModuleCodec;

impl ConfigCodec for JsModuleCodec {
    fn format(&self) -> Format {
        Format::JsModule
    }

    fn extensions(&self) -> &[&str] {
        &["js", "cjs", "mjs"]
    }

    fn parse(&self, source: &str) -> Result<ConfigDocument, CodecError> {
        let exported = ModuleReader::new(source).read()?;

        ConfigDocument::from_value(exported).map_err(|other| CodecError::NotAMapping {
            format: Format::JsModule,
            found: value_kind(&other),
        })
    }

    fn serialize(&self, document: &ConfigDocument) -> Result<String, CodecError> {
        let mut out = String::from(EXPORT_PREFIX);
        write_object(&mut out, document.as_map(), 0);
        out.push('\n');
        Ok(out)
    }
}

fn error_at(node: Node<'_>, message: impl std::fmt::Display) -> CodecError {
    let pos = node.start_position();
    CodecError::parse(
        Format::JsModule,
        format!("{message} at line {}, column {}", pos.row + 1, pos.column + 1),
    )
}

/// Walks a parsed module and evaluates its exported literal
struct ModuleReader<'s> {
    source: &'s str,
    bindings: HashMap<String, Value>,
}

impl<'s> ModuleReader<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            bindings: HashMap::new(),
        }
    }

    fn read(mut self) -> Result<Value, CodecError> {
        let mut parser = Parser::new();
        let language: tree_sitter::Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
        parser
            .set_language(&language)
            .map_err(|e| CodecError::parse(Format::JsModule, e.to_string()))?;

        let tree = parser
            .parse(self.source, None)
            .ok_or_else(|| CodecError::parse(Format::JsModule, "failed to parse module"))?;
        let root = tree.root_node();

        if root.has_error() {
            let node = first_error(root).unwrap_or(root);
            return Err(error_at(node, "syntax error"));
        }

        let mut exported = None;
        for statement in named_children(root) {
            match statement.kind() {
                "lexical_declaration" | "variable_declaration" => self.bind(statement),
                "expression_statement" => {
                    if let Some(value) = self.module_exports(statement)? {
                        exported = Some(value);
                    }
                }
                "export_statement" => {
                    if let Some(value) = statement.child_by_field_name("value") {
                        exported = Some(self.literal(value)?);
                    }
                }
                _ => {}
            }
        }

        exported.ok_or_else(|| {
            CodecError::parse(
                Format::JsModule,
                "module does not export a config (expected `module.exports =` or `export default`)",
            )
        })
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        &self.source[node.byte_range()]
    }

    /// Record `const name = <literal>` bindings
    fn bind(&mut self, declaration: Node<'_>) {
        for declarator in named_children(declaration) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let (Some(name), Some(value)) = (
                declarator.child_by_field_name("name"),
                declarator.child_by_field_name("value"),
            ) else {
                continue;
            };
            if name.kind() != "identifier" {
                continue;
            }
            // Non-literal initializers are fine as long as nothing exports them
            if let Ok(value) = self.literal(value) {
                let key = self.text(name).to_string();
                self.bindings.insert(key, value);
            }
        }
    }

    /// Evaluate `module.exports = <literal>` if this statement is one
    fn module_exports(&self, statement: Node<'_>) -> Result<Option<Value>, CodecError> {
        let Some(expr) = named_children(statement).into_iter().next() else {
            return Ok(None);
        };
        if expr.kind() != "assignment_expression" {
            return Ok(None);
        }
        let (Some(left), Some(right)) = (
            expr.child_by_field_name("left"),
            expr.child_by_field_name("right"),
        ) else {
            return Ok(None);
        };

        let target: String = self.text(left).split_whitespace().collect();
        if target != "module.exports" {
            return Ok(None);
        }
        self.literal(right).map(Some)
    }

    fn literal(&self, node: Node<'_>) -> Result<Value, CodecError> {
        match node.kind() {
            "object" => self.object(node),
            "array" => named_children(node)
                .into_iter()
                .filter(|n| n.kind() != "comment")
                .map(|n| self.literal(n))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            "string" => self.string(node).map(Value::String),
            "template_string" => self.template(node).map(Value::String),
            "number" => number(self.text(node)).ok_or_else(|| error_at(node, "invalid number")),
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" | "undefined" => Ok(Value::Null),
            "unary_expression" => self.unary(node),
            "parenthesized_expression"
            | "as_expression"
            | "satisfies_expression"
            | "non_null_expression" => match named_children(node).into_iter().next() {
                Some(inner) => self.literal(inner),
                None => Err(error_at(node, "empty expression")),
            },
            "identifier" => {
                let name = self.text(node);
                if name == "undefined" {
                    return Ok(Value::Null);
                }
                self.bindings
                    .get(name)
                    .cloned()
                    .ok_or_else(|| error_at(node, format!("unknown reference `{name}`")))
            }
            kind => Err(error_at(node, format!("unsupported expression `{kind}`"))),
        }
    }

    fn object(&self, node: Node<'_>) -> Result<Value, CodecError> {
        let mut map = Map::new();
        for member in named_children(node) {
            match member.kind() {
                "pair" => {
                    let (Some(key), Some(value)) = (
                        member.child_by_field_name("key"),
                        member.child_by_field_name("value"),
                    ) else {
                        return Err(error_at(member, "incomplete property"));
                    };
                    map.insert(self.key(key)?, self.literal(value)?);
                }
                "shorthand_property_identifier" => {
                    let name = self.text(member);
                    let value = self
                        .bindings
                        .get(name)
                        .cloned()
                        .ok_or_else(|| error_at(member, format!("unknown reference `{name}`")))?;
                    map.insert(name.to_string(), value);
                }
                "spread_element" => {
                    let inner = named_children(member).into_iter().next();
                    match inner.map(|n| self.literal(n)).transpose()? {
                        Some(Value::Object(spread)) => map.extend(spread),
                        _ => return Err(error_at(member, "spread of a non-object")),
                    }
                }
                "comment" => {}
                kind => return Err(error_at(member, format!("unsupported property `{kind}`"))),
            }
        }
        Ok(Value::Object(map))
    }

    fn key(&self, node: Node<'_>) -> Result<String, CodecError> {
        match node.kind() {
            "property_identifier" | "number" => Ok(self.text(node).to_string()),
            "string" => self.string(node),
            kind => Err(error_at(node, format!("unsupported key `{kind}`"))),
        }
    }

    fn string(&self, node: Node<'_>) -> Result<String, CodecError> {
        let mut out = String::new();
        for part in named_children(node) {
            match part.kind() {
                "string_fragment" => out.push_str(self.text(part)),
                "escape_sequence" => unescape(self.text(part), &mut out),
                kind => return Err(error_at(part, format!("unsupported string part `{kind}`"))),
            }
        }
        Ok(out)
    }

    fn template(&self, node: Node<'_>) -> Result<String, CodecError> {
        if named_children(node)
            .iter()
            .any(|n| n.kind() == "template_substitution")
        {
            return Err(error_at(node, "template substitutions are not supported"));
        }
        self.string(node)
    }

    fn unary(&self, node: Node<'_>) -> Result<Value, CodecError> {
        let operator = node.child_by_field_name("operator").map(|n| self.text(n));
        let argument = node
            .child_by_field_name("argument")
            .ok_or_else(|| error_at(node, "missing operand"))?;

        match (operator, self.literal(argument)?) {
            (Some("+"), value @ Value::Number(_)) => Ok(value),
            (Some("-"), Value::Number(n)) => negate(&n).ok_or_else(|| error_at(node, "invalid number")),
            (Some("!"), Value::Bool(b)) => Ok(Value::Bool(!b)),
            _ => Err(error_at(node, "unsupported unary expression")),
        }
    }
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

/// Parse a JS numeric literal
///
/// JS has a single number type, so integral floats become integers.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn number(text: &str) -> Option<Value> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            return i64::from_str_radix(digits, radix).ok().map(Value::from);
        }
    }
    if let Ok(int) = cleaned.parse::<i64>() {
        return Some(Value::from(int));
    }

    let float = cleaned.parse::<f64>().ok()?;
    if float.fract() == 0.0 && float.abs() < (1_i64 << 53) as f64 {
        return Some(Value::from(float as i64));
    }
    Number::from_f64(float).map(Value::Number)
}

fn negate(n: &Number) -> Option<Value> {
    if let Some(int) = n.as_i64() {
        return int.checked_neg().map(Value::from);
    }
    n.as_f64().and_then(|f| Number::from_f64(-f)).map(Value::Number)
}

/// Decode one escape sequence into `out`
fn unescape(seq: &str, out: &mut String) {
    let body = &seq[1..];
    let decoded = match body.chars().next() {
        Some('n') => Some('\n'),
        Some('t') => Some('\t'),
        Some('r') => Some('\r'),
        Some('b') => Some('\u{8}'),
        Some('f') => Some('\u{c}'),
        Some('v') => Some('\u{b}'),
        Some('0') if body.len() == 1 => Some('\0'),
        Some('x') => u32::from_str_radix(&body[1..], 16).ok().and_then(char::from_u32),
        Some('u') => {
            let hex = body[1..].trim_start_matches('{').trim_end_matches('}');
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        }
        // Line continuation
        Some('\n' | '\r') => return,
        Some(other) => Some(other),
        None => None,
    };
    match decoded {
        Some(c) => out.push(c),
        None => out.push_str(seq),
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                out.push_str(if i == 0 { "\n" } else { ",\n" });
                indent(out, depth + 1);
                write_value(out, item, depth + 1);
            }
            out.push('\n');
            indent(out, depth);
            out.push(']');
        }
        Value::Object(map) => write_object(out, map, depth),
    }
}

fn write_object(out: &mut String, map: &Map<String, Value>, depth: usize) {
    if map.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push('{');
    for (i, (key, value)) in map.iter().enumerate() {
        out.push_str(if i == 0 { "\n" } else { ",\n" });
        indent(out, depth + 1);
        if is_plain_key(key) {
            out.push_str(key);
        } else {
            // Template literals are not valid property names
            write_quoted(out, key, '\'');
        }
        out.push_str(": ");
        write_value(out, value, depth + 1);
    }
    out.push('\n');
    indent(out, depth);
    out.push('}');
}

/// Keys matching `^[a-zA-Z_][a-zA-Z_0-9]*$` are written bare
fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote a string, preferring single quotes, then double, then backticks
fn write_string(out: &mut String, s: &str) {
    let quote = if !s.contains('\'') {
        '\''
    } else if !s.contains('"') {
        '"'
    } else if !s.contains('`') && !s.contains("${") {
        '`'
    } else {
        '\''
    };
    write_quoted(out, s, quote);
}

fn write_quoted(out: &mut String, s: &str, quote: char) {
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(source: &str) -> Value {
        JsModuleCodec.parse(source).unwrap().into_value()
    }

    fn render(value: Value) -> String {
        let doc = ConfigDocument::from_value(value).unwrap();
        JsModuleCodec.serialize(&doc).unwrap()
    }

    #[test]
    fn serialize_simple_module() {
        assert_eq!(render(json!({ "version": 2 })), "module.exports = {\n  version: 2\n}\n");
    }

    #[test]
    fn serialize_nested_module() {
        let out = render(json!({
            "version": 2,
            "snapshot": { "widths": [375, 1280], "min-height": 1024 },
            "static": {},
            "name": "it's"
        }));

        assert_eq!(
            out,
            concat!(
                "module.exports = {\n",
                "  version: 2,\n",
                "  snapshot: {\n",
                "    widths: [\n",
                "      375,\n",
                "      1280\n",
                "    ],\n",
                "    'min-height': 1024\n",
                "  },\n",
                "  static: {},\n",
                "  name: \"it's\"\n",
                "}\n",
            )
        );
    }

    #[test]
    fn parse_module_exports() {
        let value = parse(
            r#"
// percy config
module.exports = {
  version: 1,
  'min-height': 1024,
  "quoted": "double",
  snapshot: { widths: [375, 1_280], enabled: true, scope: null },
  offset: -4,
  ratio: 1.5,
};
"#,
        );

        assert_eq!(
            value,
            json!({
                "version": 1,
                "min-height": 1024,
                "quoted": "double",
                "snapshot": { "widths": [375, 1280], "enabled": true, "scope": null },
                "offset": -4,
                "ratio": 1.5
            })
        );
    }

    #[test]
    fn parse_export_default() {
        assert_eq!(parse("export default { version: 2 };\n"), json!({ "version": 2 }));
    }

    #[test]
    fn parse_const_reference() {
        let value = parse(
            r#"
const widths = [375, 1280];
const config = { version: 1, snapshot: { widths } };
module.exports = config;
"#,
        );

        assert_eq!(value, json!({ "version": 1, "snapshot": { "widths": [375, 1280] } }));
    }

    #[test]
    fn parse_spread() {
        let value = parse(
            r"
const base = { a: 1, b: 2 };
module.exports = { ...base, b: 3 };
",
        );
        assert_eq!(value, json!({ "a": 1, "b": 3 }));
    }

    #[test]
    fn parse_string_escapes() {
        let value = parse(r#"module.exports = { s: 'a\'b\nA', t: `plain` };"#);
        assert_eq!(value, json!({ "s": "a'b\nA", "t": "plain" }));
    }

    #[test]
    fn rejects_missing_export() {
        let err = JsModuleCodec.parse("const x = { version: 1 };\n").unwrap_err();
        assert!(err.to_string().contains("does not export a config"));
    }

    #[test]
    fn rejects_syntax_error() {
        let err = JsModuleCodec.parse("module.exports = { version: ;\n").unwrap_err();
        assert!(matches!(err, CodecError::Parse { format: Format::JsModule, .. }));
    }

    #[test]
    fn rejects_dynamic_values() {
        let err = JsModuleCodec
            .parse("module.exports = { version: require('x') };\n")
            .unwrap_err();
        assert!(err.to_string().contains("unsupported expression"));
    }

    #[test]
    fn parse_after_serialize_is_stable() {
        let original = json!({
            "version": 2,
            "snapshot": { "widths": [375], "min-height": 1024 },
            "name": "a 'quoted' \"name\""
        });
        let rendered = render(original.clone());
        assert_eq!(parse(&rendered), original);
        assert_eq!(render(parse(&rendered)), rendered);
    }

    #[test]
    fn quoted_keys_use_single_quotes() {
        let original = json!({ "a'b\"c": 1, "x`${y}": 2 });
        let rendered = render(original.clone());

        assert_eq!(
            rendered,
            "module.exports = {\n  'a\\'b\"c': 1,\n  'x`${y}': 2\n}\n"
        );
        assert_eq!(parse(&rendered), original);
    }

    #[test]
    fn number_forms() {
        assert_eq!(number("0x1F"), Some(json!(31)));
        assert_eq!(number("1e3"), Some(json!(1000)));
        assert_eq!(number("0.25"), Some(json!(0.25)));
        assert_eq!(number("nope"), None);
    }

    #[test]
    fn plain_keys() {
        assert!(is_plain_key("version"));
        assert!(is_plain_key("_private1"));
        assert!(!is_plain_key("min-height"));
        assert!(!is_plain_key("1st"));
        assert!(!is_plain_key("$schema"));
    }
}
