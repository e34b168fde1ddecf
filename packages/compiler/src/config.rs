//! Compiler configuration
//!
//! Per-call compile options and the long-lived compiler configuration.

use crate::output::EmitOptions;
use quill_runtime::logging::TracingLogger;
use quill_runtime::{BaseCapability, LoadedModule, Logger};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OptimizationLevel {
    /// No rewriting; info diagnostics are reported.
    Debug,
    #[default]
    Release,
}

/// Options of one compile call.
#[derive(Clone, Default)]
pub struct CompileOptions {
    pub class_name: Option<String>,
    pub namespace: Option<String>,
    pub base_capability: Option<BaseCapability>,
    /// Modules whose symbols the template may use, searched in order after
    /// the baseline runtime module.
    pub additional_references: Vec<Arc<LoadedModule>>,
    pub optimization_level: OptimizationLevel,
    /// Reject identifiers that are neither locals nor declared parameters.
    pub strict_parameters: bool,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_base_capability(mut self, base_capability: BaseCapability) -> Self {
        self.base_capability = Some(base_capability);
        self
    }

    pub fn with_reference(mut self, module: Arc<LoadedModule>) -> Self {
        self.additional_references.push(module);
        self
    }

    pub fn with_optimization_level(mut self, level: OptimizationLevel) -> Self {
        self.optimization_level = level;
        self
    }

    pub fn with_strict_parameters(mut self, strict: bool) -> Self {
        self.strict_parameters = strict;
        self
    }

    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            class_name: self.class_name.clone(),
            namespace: self.namespace.clone(),
            base_capability: self.base_capability,
        }
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions")
            .field("class_name", &self.class_name)
            .field("namespace", &self.namespace)
            .field("base_capability", &self.base_capability)
            .field(
                "additional_references",
                &self
                    .additional_references
                    .iter()
                    .map(|m| m.name())
                    .collect::<Vec<_>>(),
            )
            .field("optimization_level", &self.optimization_level)
            .field("strict_parameters", &self.strict_parameters)
            .finish()
    }
}

/// Compiler configuration
#[derive(Clone)]
pub struct CompilerConfig {
    pub logger: Arc<dyn Logger>,
}

impl CompilerConfig {
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            logger: Arc::new(TracingLogger::default()),
        }
    }
}
