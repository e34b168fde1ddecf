#![deny(clippy::all)]

/**
 * Quill Runtime
 *
 * Values, the component capability, render trees, loadable modules and the
 * HTML renderer shared by compiled templates and native Rust components.
 */

pub mod component;
mod error;
pub mod html;
pub mod logging;
pub mod module;
pub mod parameters;
pub mod render_tree;
pub mod renderer;
pub mod value;

// Re-exports
pub use component::{
    BaseCapability, Component, ComponentDescriptor, ComponentFactory, LifecycleContext,
    LifecycleFuture, NativeComponentFactory,
};
pub use error::{BuilderError, ParameterError, RenderError, ResolveError};
pub use html::HtmlSerializer;
pub use logging::{LogField, LogLevel, Logger};
pub use module::{HelperError, HelperFunction, LoadedModule, ModuleBuilder, ModuleId, TypeHandle};
pub use parameters::ParameterSet;
pub use render_tree::{AttributeValue, ComponentReference, RenderFrame, RenderTree, RenderTreeBuilder};
pub use renderer::{active_dispatchers, CancellationToken, HtmlRenderer, RendererConfig};
pub use value::{Deferred, Value};

/// Runtime version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
