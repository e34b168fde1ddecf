//! Utility Functions
//!
//! Name validation shared by the parser and the emitter.

use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

static NAMESPACE_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("valid namespace regex")
});

/// `Name`, `_private`, `item2`
pub fn is_identifier(input: &str) -> bool {
    IDENTIFIER_REGEXP.is_match(input)
}

/// Dot-separated identifiers, e.g. `Shop.Views`
pub fn is_namespace(input: &str) -> bool {
    NAMESPACE_REGEXP.is_match(input)
}

/// Last segment of a dotted name.
pub fn simple_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}
