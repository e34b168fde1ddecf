//! HTML Tag Definitions
//!
//! Parsing and serialization rules for the HTML elements that need special
//! treatment. Lookups are case-insensitive.

use bitflags::bitflags;
use once_cell::sync::Lazy;
use std::collections::HashMap;

bitflags! {
    /// Per-tag rules.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TagFlags: u8 {
        /// Never has content or a closing tag.
        const VOID = 1 << 0;
        /// Content is raw text; no markup is recognized inside it.
        const RAW_TEXT = 1 << 1;
        /// Content is text with character references but no markup.
        const ESCAPABLE_RAW_TEXT = 1 << 2;
    }
}

/// Tag definitions registry
static TAG_DEFINITIONS: Lazy<HashMap<&'static str, TagFlags>> = Lazy::new(|| {
    let mut defs = HashMap::new();

    // Void elements (self-closing)
    for name in [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ] {
        defs.insert(name, TagFlags::VOID);
    }

    defs.insert("script", TagFlags::RAW_TEXT);
    defs.insert("style", TagFlags::RAW_TEXT);
    defs.insert("textarea", TagFlags::ESCAPABLE_RAW_TEXT);
    defs.insert("title", TagFlags::ESCAPABLE_RAW_TEXT);

    defs
});

pub fn get_tag_flags(tag_name: &str) -> TagFlags {
    if let Some(flags) = TAG_DEFINITIONS.get(tag_name) {
        return *flags;
    }
    TAG_DEFINITIONS
        .get(tag_name.to_ascii_lowercase().as_str())
        .copied()
        .unwrap_or_default()
}

pub fn is_void_element(tag_name: &str) -> bool {
    get_tag_flags(tag_name).contains(TagFlags::VOID)
}

/// Whether markup inside the element is treated as plain text.
pub fn has_text_content_only(tag_name: &str) -> bool {
    get_tag_flags(tag_name).intersects(TagFlags::RAW_TEXT | TagFlags::ESCAPABLE_RAW_TEXT)
}
