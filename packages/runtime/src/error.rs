//! Runtime errors
//!
//! Failures raised while resolving types, building render trees and
//! rendering components.

use thiserror::Error;

/// Errors returned by [`crate::HtmlRenderer`].
#[derive(Debug, Error)]
pub enum RenderError {
    /// The handle does not name a type implementing the component capability.
    #[error("Invalid component type: '{name}' does not implement the component capability")]
    InvalidComponentType { name: String },

    /// A lifecycle step of a component (or one of its children) failed.
    #[error("Error while rendering component '{component}': {source:#}")]
    Lifecycle {
        component: String,
        #[source]
        source: anyhow::Error,
    },

    /// The render call was cancelled before the tree was finalized.
    #[error("Render was cancelled")]
    Cancelled,

    #[error("Maximum component nesting depth of {max_depth} exceeded while rendering '{component}'")]
    DepthExceeded { component: String, max_depth: usize },

    #[error("Failed to create the render dispatcher: {0}")]
    Dispatcher(#[source] std::io::Error),
}

/// Errors returned when looking up a type in a [`crate::LoadedModule`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("No type named '{name}' is defined in module '{module}'")]
    NotFound { name: String, module: String },

    #[error("'{name}' in module '{module}' does not implement the component capability")]
    NotAComponent { name: String, module: String },

    #[error("'{name}' is ambiguous in module '{module}'; candidates: {}", candidates.join(", "))]
    Ambiguous {
        name: String,
        module: String,
        candidates: Vec<String>,
    },
}

/// Misuse of a [`crate::RenderTreeBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("Attribute '{name}' must directly follow an element frame")]
    AttributeOutOfPlace { name: String },

    #[error("Close element without a matching open element")]
    UnbalancedClose,

    #[error("Render tree finished with unclosed elements: {}", open.join(", "))]
    UnclosedElements { open: Vec<String> },
}

/// Errors converting external data into a [`crate::ParameterSet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("Parameters must be a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },

    #[error("Invalid parameter assignment '{input}': expected NAME=VALUE")]
    InvalidAssignment { input: String },
}
