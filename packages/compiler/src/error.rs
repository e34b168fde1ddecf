//! Compiler errors
//!
//! Every failure of the compile pipeline surfaces as [`Error`]. Each kind is
//! terminal for its call; no partial module is ever returned.

use crate::loader::CompileError;
use crate::parse_util::ParseError;
use quill_runtime::ResolveError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Malformed template source. Carries every error found in one parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct SyntaxError {
    pub errors: Vec<ParseError>,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "Template parse errors:\n{}", messages.join("\n"))
    }
}

/// A template document that cannot be lowered into a generated type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("Invalid class name '{0}': expected an identifier")]
    InvalidClassName(String),

    #[error("Invalid namespace '{0}': expected dot-separated identifiers")]
    InvalidNamespace(String),

    #[error("{location}: parameter '{name}' is declared more than once")]
    DuplicateParameter { name: String, location: String },

    #[error("{location}: directive @{directive} may appear only once")]
    DuplicateDirective { directive: &'static str, location: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Failed to read template '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
