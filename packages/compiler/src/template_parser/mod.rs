/**
 * Template Parser Module
 *
 * Parses template source into a `TemplateDocument`.
 */
pub mod ast;
pub mod parser;

pub use ast::*;
pub use parser::TemplateParser;
