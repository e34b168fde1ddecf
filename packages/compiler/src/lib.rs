#![deny(clippy::all)]

/**
 * Quill Compiler
 *
 * Template parser, code emitter and dynamic loader turning template source
 * into loadable component types.
 */

pub mod chars;
pub mod compiler;
pub mod config;
mod error;
pub mod expression_parser;
pub mod loader;
pub mod output;
pub mod parse_util;
pub mod template_parser;
pub mod util;

// Re-exports
pub use compiler::TemplateCompiler;
pub use config::{CompileOptions, CompilerConfig, OptimizationLevel};
pub use error::{EmitError, Error, Result, SyntaxError};
pub use loader::{CompileError, Diagnostic, Loader, Severity};
pub use output::{EmitOptions, Emitter, GeneratedSource};
pub use parse_util::{ParseError, ParseLocation, ParseSourceFile, ParseSourceSpan};
pub use template_parser::{TemplateDocument, TemplateParser};

/// Compiler version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
