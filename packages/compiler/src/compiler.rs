//! Template Compiler
//!
//! High-level entry points chaining parse, emit and load.

use crate::config::{CompileOptions, CompilerConfig};
use crate::error::{Error, Result};
use crate::loader::Loader;
use crate::output::{Emitter, GeneratedSource};
use crate::parse_util::sanitize_identifier;
use crate::template_parser::{TemplateDocument, TemplateParser};
use quill_runtime::{LoadedModule, LogField, LogLevel, TypeHandle};
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;

const INLINE_URL: &str = "<inline>";

/// Compiles template source into loaded component types. `Send + Sync`;
/// one instance may serve many threads.
pub struct TemplateCompiler {
    config: CompilerConfig,
    parser: TemplateParser,
    emitter: Emitter,
    loader: Loader,
}

impl Default for TemplateCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl TemplateCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        let loader = Loader::new(Arc::clone(&config.logger));
        TemplateCompiler {
            config,
            parser: TemplateParser::new(),
            emitter: Emitter::new(),
            loader,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn parse(&self, source: &str, url: &str) -> Result<TemplateDocument> {
        Ok(self.parser.parse(source, url)?)
    }

    /// Parse and emit without loading.
    pub fn emit(&self, source: &str, url: &str, options: &CompileOptions) -> Result<GeneratedSource> {
        let doc = self.parse(source, url)?;
        let generated = self.emitter.emit(&doc, &options.emit_options())?;
        self.config.logger.log(
            LogLevel::Info,
            &format!("Generated source:\n{}", generated.source_text),
            &[LogField::new("type", &generated.full_name())],
        );
        Ok(generated)
    }

    /// Load an emitted type against `options.additional_references`.
    pub fn compile(&self, generated: &GeneratedSource, options: &CompileOptions) -> Result<Arc<LoadedModule>> {
        Ok(self
            .loader
            .compile(generated, &options.additional_references, options)?)
    }

    pub fn compile_module(&self, source: &str, url: &str, options: &CompileOptions) -> Result<Arc<LoadedModule>> {
        let generated = self.emit(source, url, options)?;
        self.compile(&generated, options)
    }

    pub fn compile_from_source(&self, source: &str, options: &CompileOptions) -> Result<TypeHandle> {
        let module = self.compile_module(source, INLINE_URL, options)?;
        Ok(module.sole_component_type()?)
    }

    /// The class name defaults to the file stem.
    pub fn compile_from_file(&self, path: impl AsRef<Path>, options: &CompileOptions) -> Result<TypeHandle> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("template path is empty".to_string()));
        }
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut options = options.clone();
        if options.class_name.is_none() {
            let stem = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            options.class_name = Some(sanitize_identifier(&stem));
        }
        let module = self.compile_module(&source, &path.display().to_string(), &options)?;
        Ok(module.sole_component_type()?)
    }

    /// Compile `(name, source)` pairs in parallel. Results keep input order.
    pub fn compile_many(&self, templates: &[(String, String)], options: &CompileOptions) -> Vec<Result<TypeHandle>> {
        templates
            .par_iter()
            .map(|(name, source)| {
                let options = options.clone().with_class_name(sanitize_identifier(name));
                let module = self.compile_module(source, name, &options)?;
                Ok(module.sole_component_type()?)
            })
            .collect()
    }
}
