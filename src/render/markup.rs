// src/render/markup.rs
//! Low-level HTML assembly: escaping, class-list composition, tags.
//!
//! Rendered markup is plain `String`s — children arrive already
//! rendered and are embedded verbatim, while text and attribute values
//! are always escaped here and nowhere else.

use std::fmt::Write;

/// Escapes text content for element bodies.
pub fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escapes a double-quoted attribute value.
pub fn escape_attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Composes a class list, skipping absent and empty entries.
pub fn cs(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The per-block class hook, mirroring `notion-block-<id>`.
pub fn block_id_class(id: &crate::types::BlockId) -> String {
    format!("notion-block-{}", id.as_str())
}

/// An element with a class list, extra attributes, and pre-rendered
/// children.
pub fn tag(name: &str, class: &str, attrs: &[(&str, &str)], children: &str) -> String {
    let mut out = String::with_capacity(children.len() + 64);
    write_open(&mut out, name, class, attrs);
    out.push_str(children);
    let _ = write!(out, "</{}>", name);
    out
}

/// A self-closing element.
pub fn void_tag(name: &str, class: &str, attrs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(64);
    write_open_unclosed(&mut out, name, class, attrs);
    out.push_str("/>");
    out
}

fn write_open(out: &mut String, name: &str, class: &str, attrs: &[(&str, &str)]) {
    write_open_unclosed(out, name, class, attrs);
    out.push('>');
}

fn write_open_unclosed(out: &mut String, name: &str, class: &str, attrs: &[(&str, &str)]) {
    let _ = write!(out, "<{}", name);
    if !class.is_empty() {
        let _ = write!(out, " class=\"{}\"", escape_attr(class));
    }
    for (key, value) in attrs {
        let _ = write!(out, " {}=\"{}\"", key, escape_attr(value));
    }
}
