//! Deterministic JSON text output.

use serde::Serialize;
use tracing::{debug, trace};

use crate::canonicalizer::{Canonicalizer, Limits};
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use crate::number::write_number;
use crate::reduce::{Reduce, Replacer, Serde};
use crate::value::Value;

/// Longest indentation unit: spaces, or UTF-16 code units of text.
pub const MAX_INDENT: usize = 10;

/// Indentation unit for pretty output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indent {
    /// This many spaces per level (at most [`MAX_INDENT`]; `0` is compact).
    Spaces(usize),
    /// This text per level, cut to at most [`MAX_INDENT`] UTF-16 code units
    /// (a character that would straddle the limit is left out); empty is
    /// compact.
    Text(String),
}

impl Indent {
    /// The text written once per nesting level.
    pub fn unit(&self) -> String {
        match self {
            Indent::Spaces(n) => " ".repeat((*n).min(MAX_INDENT)),
            Indent::Text(text) => {
                let mut units = 0;
                text.chars()
                    .take_while(|c| {
                        units += c.len_utf16();
                        units <= MAX_INDENT
                    })
                    .collect()
            }
        }
    }
}

impl From<usize> for Indent {
    fn from(spaces: usize) -> Self {
        Indent::Spaces(spaces)
    }
}

impl From<&str> for Indent {
    fn from(text: &str) -> Self {
        Indent::Text(text.to_owned())
    }
}

impl From<String> for Indent {
    fn from(text: String) -> Self {
        Indent::Text(text)
    }
}

/// Configurable serializer: reduce, canonicalize, render.
#[derive(Debug, Default)]
pub struct Serializer<'r> {
    indent: Option<Indent>,
    replacer: Option<Replacer<'r>>,
    canonicalizer: Canonicalizer,
}

impl<'r> Serializer<'r> {
    /// Compact serializer with default limits and no replacer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation unit.
    pub fn indent(mut self, indent: impl Into<Indent>) -> Self {
        self.indent = Some(indent.into());
        self
    }

    /// Sets the replacer.
    pub fn replacer(mut self, replacer: Replacer<'r>) -> Self {
        self.replacer = Some(replacer);
        self
    }

    /// Sets the canonicalization limits.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.canonicalizer = Canonicalizer::new(limits);
        self
    }

    /// Serializes any reducible value.
    ///
    /// The replacer, if any, sees the reduced value before sorting, including
    /// object entries whose value is [`Value::Omitted`].
    pub fn serialize<R: Reduce + ?Sized>(&self, value: &R) -> Result<String> {
        let reduced = value.reduce()?;
        let canonical = match &self.replacer {
            Some(replacer) => {
                let max_depth = self.canonicalizer.limits().max_depth;
                if reduced.depth() > max_depth {
                    // Let the canonicalizer report the offending path.
                    self.canonicalizer.canonicalize(&reduced)?;
                }
                let replaced = replacer.apply(reduced.into_owned());
                self.canonicalizer.canonicalize(&replaced)?
            }
            None => self.canonicalizer.canonicalize(&reduced)?,
        };
        self.finish(canonical)
    }

    /// Serializes the container `root` of `graph`.
    ///
    /// Graph handles are resolved by canonicalizing first, so a replacer only
    /// sees entries that are present; its output is sorted again.
    pub fn serialize_graph(&self, graph: &Graph, root: NodeId) -> Result<String> {
        let canonical = self.canonicalizer.canonicalize_graph(graph, root)?;
        let canonical = match &self.replacer {
            Some(replacer) => self.canonicalizer.canonicalize(&replacer.apply(canonical))?,
            None => canonical,
        };
        self.finish(canonical)
    }

    fn finish(&self, canonical: Value) -> Result<String> {
        if canonical.is_omitted() {
            debug!("top-level value is omitted");
            return Err(Error::UnsupportedValue(
                "an omitted value has no JSON text".into(),
            ));
        }
        let unit = self.indent.as_ref().map(Indent::unit).unwrap_or_default();
        trace!(indent = unit.len(), "rendering canonical value");
        let mut out = String::new();
        Renderer::new(&unit, &mut out).value(&canonical, 0);
        Ok(out)
    }
}

/// Serializes `value` with sorted keys, compact unless `indent` is given.
pub fn serialize<R: Reduce + ?Sized>(value: &R, indent: Option<Indent>) -> Result<String> {
    let serializer = match indent {
        Some(indent) => Serializer::new().indent(indent),
        None => Serializer::new(),
    };
    serializer.serialize(value)
}

/// Serializes any [`Serialize`] type with sorted keys.
pub fn to_string<T: Serialize + ?Sized>(value: &T, indent: Option<Indent>) -> Result<String> {
    serialize(&Serde(value), indent)
}

/// Writes JSON text. Expects a canonical value, so depth is already bounded.
struct Renderer<'o> {
    unit: &'o str,
    out: &'o mut String,
}

impl<'o> Renderer<'o> {
    fn new(unit: &'o str, out: &'o mut String) -> Self {
        Self { unit, out }
    }

    fn value(&mut self, value: &Value, level: usize) {
        match value {
            Value::Null | Value::Omitted => self.out.push_str("null"),
            Value::Bool(true) => self.out.push_str("true"),
            Value::Bool(false) => self.out.push_str("false"),
            Value::Number(n) => write_number(n, self.out),
            Value::String(s) => write_string(s, self.out),
            Value::Array(items) => {
                if items.is_empty() {
                    self.out.push_str("[]");
                    return;
                }
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.newline(level + 1);
                    // Omitted array slots keep their position as `null`.
                    self.value(item, level + 1);
                }
                self.newline(level);
                self.out.push(']');
            }
            Value::Object(map) => {
                let mut entries = map.iter().filter(|(_, v)| !v.is_omitted()).peekable();
                if entries.peek().is_none() {
                    self.out.push_str("{}");
                    return;
                }
                self.out.push('{');
                for (i, (key, child)) in entries.enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.newline(level + 1);
                    write_string(key, self.out);
                    self.out.push(':');
                    if !self.unit.is_empty() {
                        self.out.push(' ');
                    }
                    self.value(child, level + 1);
                }
                self.newline(level);
                self.out.push('}');
            }
        }
    }

    fn newline(&mut self, level: usize) {
        if self.unit.is_empty() {
            return;
        }
        self.out.push('\n');
        for _ in 0..level {
            self.out.push_str(self.unit);
        }
    }
}

/// Appends `s` as a quoted JSON string, escaping like `JSON.stringify`.
fn write_string(s: &str, out: &mut String) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let code = c as usize;
                out.push_str("\\u00");
                out.push(HEX[code >> 4] as char);
                out.push(HEX[code & 0xF] as char);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
