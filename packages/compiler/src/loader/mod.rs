//! Dynamic compiler / loader
//!
//! Links a generated type against the baseline runtime module and the
//! caller's references, checks it, lowers it to an executable program and
//! wraps the result in a fresh `LoadedModule`.

pub mod component;
pub mod diagnostics;
pub mod eval;
pub mod lowering;
pub mod optimizer;
pub mod program;
pub mod runtime_lib;

pub use component::{CompiledComponent, CompiledComponentFactory};
pub use diagnostics::{CompileError, Diagnostic, DiagnosticBag, Severity};
pub use eval::EvalError;
pub use runtime_lib::{runtime_module, RUNTIME_MODULE_NAME};

use crate::config::{CompileOptions, OptimizationLevel};
use crate::output::GeneratedSource;
use lowering::Lowerer;
use quill_runtime::{ComponentDescriptor, LoadedModule, LogField, LogLevel, Logger, ModuleBuilder};
use std::sync::Arc;

/// Loader. Holds no per-compile state; one instance serves concurrent
/// compiles.
pub struct Loader {
    logger: Arc<dyn Logger>,
}

impl Loader {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Loader { logger }
    }

    /// Compile `generated` into a new module named `<namespace>.<class>`.
    /// `references` are searched in order after the runtime module.
    pub fn compile(
        &self,
        generated: &GeneratedSource,
        references: &[Arc<LoadedModule>],
        options: &CompileOptions,
    ) -> Result<Arc<LoadedModule>, CompileError> {
        let class = &generated.class;
        let mut modules = Vec::with_capacity(references.len() + 1);
        modules.push(runtime_module());
        modules.extend(references.iter().cloned());

        let mut diagnostics = DiagnosticBag::new();
        let mut program = Lowerer::new(class, &modules, options, &mut diagnostics).lower();

        let full_name = class.full_name();
        let diagnostics = diagnostics.into_result()?;
        for diagnostic in &diagnostics {
            let level = match diagnostic.severity {
                Severity::Info => LogLevel::Info,
                _ => LogLevel::Warn,
            };
            let location = diagnostic
                .location
                .as_ref()
                .map(|l| l.to_string())
                .unwrap_or_default();
            self.logger.log(
                level,
                &diagnostic.message,
                &[
                    LogField::new("code", diagnostic.code),
                    LogField::new("type", &full_name),
                    LogField::new("location", &location),
                ],
            );
        }

        if options.optimization_level == OptimizationLevel::Release {
            optimizer::optimize(&mut program);
        }

        let declared: Vec<String> = class.parameters.iter().map(|p| p.name.clone()).collect();
        let descriptor = ComponentDescriptor {
            capability: class.base,
            parameters: if declared.is_empty() { None } else { Some(declared) },
            route: class.route.clone(),
        };
        let module = ModuleBuilder::new(full_name.as_str())
            .component(
                full_name.as_str(),
                Arc::new(CompiledComponentFactory::new(program, descriptor)),
            )
            .build();

        let id = module.id().as_u64().to_string();
        self.logger.log(
            LogLevel::Info,
            &format!("Loaded module {}", module.name()),
            &[LogField::new("module_id", &id)],
        );
        Ok(module)
    }
}
