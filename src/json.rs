//! JSON rendering of a parsed tree.
//!
//! Group keys are written in sorted order so the output does not depend on
//! bucket layout. Groups are walked with an explicit stack; arrays only hold
//! scalars and never nest.

use std::fmt::Write;

use crate::group::Group;
use crate::tree::{Array, Node, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStyle {
    /// No whitespace between tokens.
    Compact,
    /// 2-space indent, one entry per line.
    Pretty,
}

/// A group whose entries are still being written.
struct OpenGroup<'a> {
    entries: std::vec::IntoIter<(&'a str, &'a Node)>,
    written: usize,
}

impl<'a> OpenGroup<'a> {
    fn new(group: &'a Group) -> Self {
        let mut entries: Vec<_> = group.iter().collect();
        entries.sort_unstable_by_key(|&(name, _)| name);
        OpenGroup {
            entries: entries.into_iter(),
            written: 0,
        }
    }
}

struct Output {
    buf: String,
    style: JsonStyle,
}

impl Output {
    fn indent(&mut self, depth: usize) {
        if self.style == JsonStyle::Pretty {
            self.buf.push('\n');
            self.buf.extend(std::iter::repeat("  ").take(depth));
        }
    }

    fn group(&mut self, root: &Group) {
        let mut open = vec![OpenGroup::new(root)];
        self.buf.push('{');
        loop {
            let depth = open.len();
            let Some(top) = open.last_mut() else {
                break;
            };
            let Some((name, node)) = top.entries.next() else {
                let written = top.written;
                open.pop();
                if written > 0 {
                    self.indent(depth - 1);
                }
                self.buf.push('}');
                continue;
            };
            if top.written > 0 {
                self.buf.push(',');
            }
            top.written += 1;

            self.indent(depth);
            self.string(name);
            self.buf.push(':');
            if self.style == JsonStyle::Pretty {
                self.buf.push(' ');
            }
            match node.as_value() {
                Value::Group(child) => {
                    self.buf.push('{');
                    open.push(OpenGroup::new(child));
                }
                Value::Array(array) => self.array(array, depth),
                scalar => self.value(scalar),
            }
        }
    }

    fn array(&mut self, array: &Array, depth: usize) {
        self.buf.push('[');
        for (i, item) in array.iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            self.indent(depth + 1);
            self.value(item);
        }
        if !array.is_empty() {
            self.indent(depth);
        }
        self.buf.push(']');
    }

    fn value(&mut self, value: Value<'_>) {
        match value {
            Value::Integer(n) => {
                let _ = write!(self.buf, "{}", n);
            }
            // Whole floats keep a fractional digit so they read back as floats.
            Value::Float(n) if n.fract() == 0.0 => {
                let _ = write!(self.buf, "{:.1}", n);
            }
            Value::Float(n) => {
                let _ = write!(self.buf, "{}", n);
            }
            Value::Boolean(b) => self.buf.push_str(if b { "true" } else { "false" }),
            Value::String(s) => self.string(s),
            Value::Group(g) => self.group(g),
            Value::Array(a) => self.array(a, 0),
        }
    }

    fn string(&mut self, s: &str) {
        self.buf.push('"');
        for ch in s.chars() {
            match ch {
                '"' | '\\' => {
                    self.buf.push('\\');
                    self.buf.push(ch);
                }
                '\n' => self.buf.push_str("\\n"),
                '\r' => self.buf.push_str("\\r"),
                '\t' => self.buf.push_str("\\t"),
                c if u32::from(c) < 0x20 => {
                    let _ = write!(self.buf, "\\u{:04x}", u32::from(c));
                }
                c => self.buf.push(c),
            }
        }
        self.buf.push('"');
    }
}

/// Serialize a tree to compact JSON.
pub fn to_json(group: &Group) -> String {
    value_to_json(Value::Group(group), JsonStyle::Compact)
}

/// Serialize a tree to pretty-printed JSON.
pub fn to_json_pretty(group: &Group) -> String {
    value_to_json(Value::Group(group), JsonStyle::Pretty)
}

/// Serialize any node or element view.
pub fn value_to_json(value: Value<'_>, style: JsonStyle) -> String {
    let mut out = Output {
        buf: String::new(),
        style,
    };
    out.value(value);
    out.buf
}
