//! JSON text output for converted values
//!
//! Keys are written in insertion order.

use crate::value::{Array, Object, Value};

/// Output layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatConfig {
    /// Spaces per nesting level; 0 writes compact single-line JSON
    pub indent_spaces: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self { indent_spaces: 2 }
    }
}

impl FormatConfig {
    pub const fn pretty() -> Self {
        Self { indent_spaces: 2 }
    }

    pub const fn compact() -> Self {
        Self { indent_spaces: 0 }
    }

    const fn is_compact(&self) -> bool {
        self.indent_spaces == 0
    }
}

/// Serialize a value to JSON text
pub fn to_string(value: &Value, config: &FormatConfig) -> String {
    let mut out = String::new();
    write_value(value, 0, config, &mut out);
    out
}

/// Pretty JSON with two-space indentation
pub fn to_string_pretty(value: &Value) -> String {
    to_string(value, &FormatConfig::pretty())
}

fn write_value(value: &Value, depth: usize, config: &FormatConfig, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) if n.is_finite() => out.push_str(&n.to_string()),
        Value::Number(_) => out.push_str("null"),
        Value::String(s) => write_string(s, out),
        Value::Array(arr) => write_array(arr, depth, config, out),
        Value::Object(obj) => write_object(obj, depth, config, out),
    }
}

fn write_array(arr: &Array, depth: usize, config: &FormatConfig, out: &mut String) {
    if arr.is_empty() {
        out.push_str("[]");
        return;
    }

    out.push('[');
    for (i, item) in arr.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        newline_indent(depth + 1, config, out);
        write_value(item, depth + 1, config, out);
    }
    newline_indent(depth, config, out);
    out.push(']');
}

fn write_object(obj: &Object, depth: usize, config: &FormatConfig, out: &mut String) {
    if obj.is_empty() {
        out.push_str("{}");
        return;
    }

    out.push('{');
    for (i, (key, value)) in obj.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        newline_indent(depth + 1, config, out);
        write_string(key, out);
        out.push(':');
        if !config.is_compact() {
            out.push(' ');
        }
        write_value(value, depth + 1, config, out);
    }
    newline_indent(depth, config, out);
    out.push('}');
}

fn newline_indent(depth: usize, config: &FormatConfig, out: &mut String) {
    if config.is_compact() {
        return;
    }
    out.push('\n');
    out.extend(std::iter::repeat_n(' ', depth * config.indent_spaces));
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
}
