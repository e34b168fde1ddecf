/*
 * Character Codes
 *
 * Characters with a meaning in template source and expressions.
 */

pub const EOF: char = '\0';
pub const TAB: char = '\t';
pub const LF: char = '\n';
pub const CR: char = '\r';

// Punctuation
pub const BANG: char = '!';
pub const DQ: char = '"';
pub const PERCENT: char = '%';
pub const AMPERSAND: char = '&';
pub const SQ: char = '\'';
pub const LPAREN: char = '(';
pub const RPAREN: char = ')';
pub const STAR: char = '*';
pub const PLUS: char = '+';
pub const COMMA: char = ',';
pub const MINUS: char = '-';
pub const PERIOD: char = '.';
pub const SLASH: char = '/';
pub const COLON: char = ':';
pub const SEMICOLON: char = ';';
pub const LT: char = '<';
pub const EQ: char = '=';
pub const GT: char = '>';
pub const QUESTION: char = '?';
pub const AT: char = '@';
pub const BACKSLASH: char = '\\';

// Brackets
pub const LBRACKET: char = '[';
pub const RBRACKET: char = ']';
pub const LBRACE: char = '{';
pub const BAR: char = '|';
pub const RBRACE: char = '}';

/// Check if character is whitespace
pub fn is_whitespace(ch: char) -> bool {
    (ch <= ' ' && ch != EOF) || ch == '\u{00A0}'
}

/// Check if character is a digit
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Check if character is a quote
pub fn is_quote(ch: char) -> bool {
    ch == SQ || ch == DQ
}

/// Check if character can start an identifier
pub fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

/// Check if character can be part of an identifier
pub fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || is_digit(ch)
}

/// Tag names: `[A-Za-z][A-Za-z0-9:._-]*`
pub fn is_tag_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

pub fn is_tag_name_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, ':' | '.' | '_' | '-')
}

/// Attribute names end at whitespace, quotes, `=`, `/`, `<` or `>`.
pub fn is_attribute_name_part(ch: char) -> bool {
    !is_whitespace(ch) && ch != EOF && !matches!(ch, '"' | '\'' | '=' | '/' | '<' | '>')
}
