//! Compile diagnostics
//!
//! Resolution and checking problems found while loading a generated type.

use crate::parse_util::{ParseLocation, ParseSourceSpan};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

pub const UNKNOWN_FUNCTION: &str = "QL1001";
pub const WRONG_ARITY: &str = "QL1002";
pub const UNRESOLVED_COMPONENT: &str = "QL1003";
pub const AMBIGUOUS_REFERENCE: &str = "QL1004";
pub const WRONG_SYMBOL_KIND: &str = "QL1005";
pub const PAGE_AS_CHILD: &str = "QL1006";
pub const UNDECLARED_CHILD_PARAMETER: &str = "QL1007";
pub const UNDECLARED_IDENTIFIER: &str = "QL1008";
pub const UNUSED_PARAMETER: &str = "QL2001";
pub const SHADOWED_LOCAL: &str = "QL2002";
pub const IMPLICIT_PARAMETER: &str = "QL3001";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub location: Option<ParseLocation>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(
                f,
                "{}: {} {}: {}",
                location,
                self.severity.as_str(),
                self.code,
                self.message
            ),
            None => write!(f, "{} {}: {}", self.severity.as_str(), self.code, self.message),
        }
    }
}

/// Compilation failed; carries every error-severity diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct CompileError {
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileError {
    pub fn codes(&self) -> Vec<&'static str> {
        self.diagnostics.iter().map(|d| d.code).collect()
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.diagnostics.iter().map(|d| d.to_string()).collect();
        f.write_str(&messages.join("\n"))
    }
}

#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(
        &mut self,
        severity: Severity,
        code: &'static str,
        span: Option<&ParseSourceSpan>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            severity,
            code,
            message: message.into(),
            location: span.map(|s| s.start.clone()),
        });
    }

    pub fn error(&mut self, code: &'static str, span: Option<&ParseSourceSpan>, message: impl Into<String>) {
        self.report(Severity::Error, code, span, message);
    }

    pub fn warning(&mut self, code: &'static str, span: Option<&ParseSourceSpan>, message: impl Into<String>) {
        self.report(Severity::Warning, code, span, message);
    }

    pub fn info(&mut self, code: &'static str, span: Option<&ParseSourceSpan>, message: impl Into<String>) {
        self.report(Severity::Info, code, span, message);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// `Err` with the error diagnostics when there are any.
    pub fn into_result(self) -> Result<Vec<Diagnostic>, CompileError> {
        if self.has_errors() {
            Err(CompileError {
                diagnostics: self.diagnostics.into_iter().filter(Diagnostic::is_error).collect(),
            })
        } else {
            Ok(self.diagnostics)
        }
    }
}
