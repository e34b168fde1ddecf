//! HTML Serializer
//!
//! Writes a finalized render tree as an HTML string.

use super::tags::is_void_element;
use crate::render_tree::{AttributeValue, RenderFrame, RenderTree};
use std::borrow::Cow;

/// Serializes render trees. Identical trees always produce identical output.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSerializer;

impl HtmlSerializer {
    pub fn new() -> Self {
        HtmlSerializer
    }

    pub fn serialize(&self, tree: &RenderTree) -> String {
        let mut out = String::new();
        self.write_frames(tree.frames(), &mut out);
        out
    }

    pub fn write_frames(&self, frames: &[RenderFrame], out: &mut String) {
        let mut open: Vec<&str> = Vec::new();
        let mut index = 0;

        while index < frames.len() {
            match &frames[index] {
                RenderFrame::Element { name } => {
                    out.push('<');
                    out.push_str(name);
                    while let Some(RenderFrame::Attribute { name, value }) = frames.get(index + 1) {
                        write_attribute(name, value, out);
                        index += 1;
                    }
                    out.push('>');
                    open.push(name);
                }
                RenderFrame::CloseElement => {
                    if let Some(name) = open.pop() {
                        if !is_void_element(name) {
                            out.push_str("</");
                            out.push_str(name);
                            out.push('>');
                        }
                    }
                }
                RenderFrame::Text(text) => escape_into(text, out),
                RenderFrame::Markup(markup) => out.push_str(markup),
                // Attributes not directly following an element have no place
                // to go; component boundaries produce no output.
                RenderFrame::Attribute { .. }
                | RenderFrame::Component(_)
                | RenderFrame::ComponentStart { .. }
                | RenderFrame::ComponentEnd => {}
            }
            index += 1;
        }
    }
}

fn write_attribute(name: &str, value: &AttributeValue, out: &mut String) {
    match value {
        AttributeValue::Bool(false) => {}
        AttributeValue::Bool(true) => {
            out.push(' ');
            out.push_str(name);
        }
        AttributeValue::Text(text) => {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(text, out);
            out.push('"');
        }
    }
}

/// Append `text` with `& < > " '` replaced by character references.
pub fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    escape_into(text, &mut out);
    Cow::Owned(out)
}

/// Inverse of [`escape_html`] for the five standard references, plus
/// numeric references.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').map(|end| (&tail[1..end], end)) {
            Some((entity, end)) if decode_entity(entity).is_some() => {
                if let Some(ch) = decode_entity(entity) {
                    out.push(ch);
                }
                rest = &tail[end + 1..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
