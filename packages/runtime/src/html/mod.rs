//! HTML Module
//!
//! Tag rules and render tree serialization.

pub mod serializer;
pub mod tags;

pub use serializer::{decode_entities, escape_html, escape_into, HtmlSerializer};
pub use tags::{get_tag_flags, has_text_content_only, is_void_element, TagFlags};
