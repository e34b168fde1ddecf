//! Commands
//!
//! `emit`, `render` and `check`. Each command takes the compiler (and
//! renderer) it runs against so hosts and tests can supply their own
//! loggers.

use anyhow::{bail, Context, Result};
use quill_compiler::{CompileOptions, OptimizationLevel, TemplateCompiler};
use quill_runtime::{HtmlRenderer, ParameterSet};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

fn read_template(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read template '{}'", path.display()))
}

fn class_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    quill_compiler::parse_util::sanitize_identifier(&stem)
}

/// Generated source of the template at `path`.
pub fn emit(compiler: &TemplateCompiler, path: &Path) -> Result<String> {
    let source = read_template(path)?;
    let options = CompileOptions::new().with_class_name(class_name_for(path));
    let generated = compiler.emit(&source, &path.display().to_string(), &options)?;
    Ok(generated.source_text)
}

/// Build the parameter set from a JSON file and `NAME=VALUE` assignments.
/// Assignments override values of the same name from the file.
pub fn load_parameters(assignments: &[String], json_file: Option<&Path>) -> Result<ParameterSet> {
    let mut parameters = match json_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read parameters '{}'", path.display()))?;
            let json: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("Invalid JSON in '{}'", path.display()))?;
            ParameterSet::from_json(json)?
        }
        None => ParameterSet::new(),
    };
    for assignment in assignments {
        let (name, value) = ParameterSet::parse_assignment(assignment)?;
        parameters.insert(name, value);
    }
    Ok(parameters)
}

/// Arguments of `quill render`.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub file: PathBuf,
    pub params: Vec<String>,
    pub params_json: Option<PathBuf>,
    /// Templates compiled before `file`, in order; each may use the ones
    /// before it.
    pub references: Vec<PathBuf>,
    pub debug: bool,
}

impl RenderRequest {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        RenderRequest {
            file: file.into(),
            ..Default::default()
        }
    }

    fn options(&self) -> CompileOptions {
        let level = if self.debug {
            OptimizationLevel::Debug
        } else {
            OptimizationLevel::Release
        };
        CompileOptions::new().with_optimization_level(level)
    }
}

pub fn render(compiler: &TemplateCompiler, renderer: &HtmlRenderer, request: &RenderRequest) -> Result<String> {
    let parameters = load_parameters(&request.params, request.params_json.as_deref())?;

    let mut options = request.options();
    for reference in &request.references {
        tracing::debug!(path = %reference.display(), "Compiling reference");
        let handle = compiler
            .compile_from_file(reference, &options)
            .with_context(|| format!("Failed to compile reference '{}'", reference.display()))?;
        options = options.with_reference(handle.module().clone());
    }

    let handle = compiler
        .compile_from_file(&request.file, &options)
        .with_context(|| format!("Failed to compile '{}'", request.file.display()))?;
    Ok(renderer.render(&handle, parameters)?)
}

/// Outcome of `quill check`.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub checked: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, String)>,
}

impl CheckReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Compile every file matching `pattern` in parallel.
pub fn check(compiler: &TemplateCompiler, pattern: &str) -> Result<CheckReport> {
    let mut files = Vec::new();
    for entry in glob::glob(pattern).with_context(|| format!("Invalid pattern '{}'", pattern))? {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    if files.is_empty() {
        bail!("No templates match '{}'", pattern);
    }
    files.sort();

    let results: Vec<(PathBuf, Option<String>)> = files
        .par_iter()
        .map(|path| {
            let outcome = compiler.compile_from_file(path, &CompileOptions::new());
            (path.clone(), outcome.err().map(|e| e.to_string()))
        })
        .collect();

    let mut report = CheckReport::default();
    for (path, error) in results {
        if let Some(error) = error {
            report.failures.push((path.clone(), error));
        }
        report.checked.push(path);
    }
    Ok(report)
}
