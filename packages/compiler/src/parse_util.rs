//! Parse Utilities
//!
//! Source files, locations, spans and parse errors shared by the template
//! parser, the emitter and the loader.

use crate::chars;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseSourceFile {
    pub content: String,
    pub url: String,
    #[serde(skip)]
    line_starts: Vec<usize>,
}

impl ParseSourceFile {
    pub fn new(content: impl Into<String>, url: impl Into<String>) -> Self {
        let content = content.into();
        let line_starts = std::iter::once(0)
            .chain(
                content
                    .char_indices()
                    .filter(|(_, ch)| *ch == chars::LF)
                    .map(|(index, _)| index + 1),
            )
            .collect();
        ParseSourceFile {
            content,
            url: url.into(),
            line_starts,
        }
    }

    /// Location of byte `offset`; offsets past the end clamp to the end.
    pub fn location(self: &Arc<Self>, offset: usize) -> ParseLocation {
        let offset = offset.min(self.content.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let col = self
            .content
            .get(line_start..offset)
            .map_or(0, |prefix| prefix.chars().count());
        ParseLocation::new(Arc::clone(self), offset, line, col)
    }

    pub fn span(self: &Arc<Self>, start: usize, end: usize) -> ParseSourceSpan {
        ParseSourceSpan::new(self.location(start), self.location(end))
    }
}

/// A position in a source file. `line` and `col` are zero-based; the
/// `Display` form is one-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseLocation {
    pub file: Arc<ParseSourceFile>,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    pub fn new(file: Arc<ParseSourceFile>, offset: usize, line: usize, col: usize) -> Self {
        ParseLocation {
            file,
            offset,
            line,
            col,
        }
    }

    /// Return the source around the location, up to `max_chars` or
    /// `max_lines` on each side.
    pub fn get_context(&self, max_chars: usize, max_lines: usize) -> (String, String) {
        let content = &self.file.content;
        let offset = self.offset.min(content.len());

        let mut before = Vec::new();
        let mut lines = 0;
        for ch in content[..offset].chars().rev().take(max_chars) {
            if ch == chars::LF {
                lines += 1;
                if lines >= max_lines {
                    break;
                }
            }
            before.push(ch);
        }

        let mut after = String::new();
        lines = 0;
        for ch in content[offset..].chars().take(max_chars) {
            if ch == chars::LF {
                lines += 1;
                if lines >= max_lines {
                    break;
                }
            }
            after.push(ch);
        }

        (before.into_iter().rev().collect(), after)
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.file.url, self.line + 1, self.col + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
}

impl ParseSourceSpan {
    pub fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan { start, end }
    }

    /// The source text covered by the span.
    pub fn text(&self) -> &str {
        self.start
            .file
            .content
            .get(self.start.offset..self.end.offset)
            .unwrap_or("")
    }
}

impl fmt::Display for ParseSourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.start.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseErrorLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    pub span: ParseSourceSpan,
    pub msg: String,
    pub level: ParseErrorLevel,
}

impl ParseError {
    pub fn new(span: ParseSourceSpan, msg: impl Into<String>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
            level: ParseErrorLevel::Error,
        }
    }

    pub fn contextual_message(&self) -> String {
        let (before, after) = self.span.start.get_context(100, 3);
        let level = match self.level {
            ParseErrorLevel::Warning => "WARNING",
            ParseErrorLevel::Error => "ERROR",
        };
        format!("{} (\"{}[{} ->]{}\")", self.msg, before, level, after)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span.start, self.msg)
    }
}

/// Turn an arbitrary name (e.g. a file stem) into an identifier.
pub fn sanitize_identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() {
        return "Template".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}
