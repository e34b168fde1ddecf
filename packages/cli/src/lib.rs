#![deny(clippy::all)]

/**
 * Quill CLI
 *
 * Command implementations behind the `quill` binary: emit generated
 * source, render templates to HTML and check template trees.
 */
pub use quill_compiler as compiler;
pub use quill_runtime as runtime;

pub mod commands;
pub mod logging;

/// CLI version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
