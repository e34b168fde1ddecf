/**
 * Expression Parser Module
 *
 * Lexer, parser and serializer of the template expression language.
 */
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod serializer;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::{ExpressionError, Parser};
pub use serializer::{quote_string, serialize};
