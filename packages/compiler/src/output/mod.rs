//! Output Module
//!
//! Generated component types, the code printer and the emitter.

pub mod abstract_emitter;
pub mod emitter;
pub mod output_ast;

pub use abstract_emitter::{print_class, EmitterVisitorContext};
pub use emitter::{EmitOptions, Emitter, GeneratedSource, DEFAULT_NAMESPACE};
pub use output_ast::*;
