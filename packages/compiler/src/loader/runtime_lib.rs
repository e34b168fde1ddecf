//! Baseline runtime library
//!
//! Helper functions linked into every compile, in the `Quill.Runtime`
//! module.

use once_cell::sync::Lazy;
use quill_runtime::{HelperError, HelperFunction, LoadedModule, ModuleBuilder, Value};
use std::sync::Arc;

pub const RUNTIME_MODULE_NAME: &str = "Quill.Runtime";

/// Upper bound on the length of lists produced by `range`.
const MAX_RANGE_LEN: i64 = 1_000_000;

static RUNTIME_MODULE: Lazy<Arc<LoadedModule>> = Lazy::new(build_runtime_module);

/// The shared baseline module.
pub fn runtime_module() -> Arc<LoadedModule> {
    Arc::clone(&RUNTIME_MODULE)
}

type HelperResult = Result<Value, HelperError>;

fn helper<F>(name: &str, arity: std::ops::RangeInclusive<usize>, func: F) -> HelperFunction
where
    F: Fn(&[Value]) -> HelperResult + Send + Sync + 'static,
{
    HelperFunction::new(format!("{}.{}", RUNTIME_MODULE_NAME, name), arity, func)
}

fn build_runtime_module() -> Arc<LoadedModule> {
    ModuleBuilder::new(RUNTIME_MODULE_NAME)
        .function(helper("upper", 1..=1, |args| {
            Ok(Value::Str(args[0].to_text().to_uppercase()))
        }))
        .function(helper("lower", 1..=1, |args| {
            Ok(Value::Str(args[0].to_text().to_lowercase()))
        }))
        .function(helper("trim", 1..=1, |args| {
            Ok(Value::Str(args[0].to_text().trim().to_string()))
        }))
        .function(helper("len", 1..=1, len))
        .function(helper("join", 2..=2, join))
        .function(helper("contains", 2..=2, contains))
        .function(helper("starts_with", 2..=2, |args| {
            Ok(Value::Bool(args[0].to_text().starts_with(args[1].to_text().as_ref())))
        }))
        .function(helper("ends_with", 2..=2, |args| {
            Ok(Value::Bool(args[0].to_text().ends_with(args[1].to_text().as_ref())))
        }))
        .function(helper("replace", 3..=3, |args| {
            Ok(Value::Str(
                args[0]
                    .to_text()
                    .replace(args[1].to_text().as_ref(), args[2].to_text().as_ref()),
            ))
        }))
        .function(helper("default", 2..=2, |args| {
            let missing = match &args[0] {
                Value::Null => true,
                Value::Str(s) => s.is_empty(),
                _ => false,
            };
            Ok(if missing { args[1].clone() } else { args[0].clone() })
        }))
        .function(helper("string", 1..=1, |args| {
            Ok(Value::Str(args[0].to_text().into_owned()))
        }))
        .function(helper("json", 1..=1, |args| {
            serde_json::to_string(&args[0])
                .map(Value::Str)
                .map_err(|e| HelperError::new(e.to_string()))
        }))
        .function(helper("raw", 1..=1, |args| {
            Ok(Value::markup(args[0].to_text().into_owned()))
        }))
        .function(helper("range", 1..=2, range))
        .function(helper("round", 1..=2, round))
        .function(helper("keys", 1..=1, |args| match &args[0] {
            Value::Map(map) => Ok(Value::List(map.keys().cloned().map(Value::Str).collect())),
            other => Err(HelperError::new(format!("expected a map, got {}", other.type_name()))),
        }))
        .build()
}

fn len(args: &[Value]) -> HelperResult {
    let len = match &args[0] {
        Value::Null => 0,
        Value::Str(s) | Value::Markup(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        other => return Err(HelperError::new(format!("{} has no length", other.type_name()))),
    };
    Ok(Value::Int(len as i64))
}

fn join(args: &[Value]) -> HelperResult {
    let items = args[0]
        .as_list()
        .ok_or_else(|| HelperError::new(format!("expected a list, got {}", args[0].type_name())))?;
    let separator = args[1].to_text();
    Ok(Value::Str(
        items
            .iter()
            .map(|item| item.to_text().into_owned())
            .collect::<Vec<_>>()
            .join(separator.as_ref()),
    ))
}

fn contains(args: &[Value]) -> HelperResult {
    let needle = &args[1];
    let found = match &args[0] {
        Value::List(items) => items.iter().any(|item| item == needle),
        Value::Map(map) => map.contains_key(needle.to_text().as_ref()),
        Value::Null => false,
        haystack => haystack.to_text().contains(needle.to_text().as_ref()),
    };
    Ok(Value::Bool(found))
}

fn range(args: &[Value]) -> HelperResult {
    let int = |value: &Value| {
        value
            .as_i64()
            .ok_or_else(|| HelperError::new(format!("expected an int, got {}", value.type_name())))
    };
    let (start, end) = match args {
        [end] => (0, int(end)?),
        [start, end] => (int(start)?, int(end)?),
        _ => return Err(HelperError::new("expected 1 or 2 arguments")),
    };
    if end.saturating_sub(start) > MAX_RANGE_LEN {
        return Err(HelperError::new(format!(
            "range of {} items exceeds the limit of {}",
            end.saturating_sub(start),
            MAX_RANGE_LEN
        )));
    }
    Ok(Value::List((start..end).map(Value::Int).collect()))
}

fn round(args: &[Value]) -> HelperResult {
    let digits = match args.get(1) {
        None => None,
        Some(Value::Int(d)) if (0..=15).contains(d) => Some(*d as i32),
        Some(other) => {
            return Err(HelperError::new(format!(
                "digits must be an int between 0 and 15, got {}",
                other
            )))
        }
    };
    match (&args[0], digits) {
        (Value::Int(i), _) => Ok(Value::Int(*i)),
        (Value::Float(f), None) => {
            let rounded = f.round();
            if rounded.is_finite() && rounded.abs() < i64::MAX as f64 {
                Ok(Value::Int(rounded as i64))
            } else {
                Ok(Value::Float(rounded))
            }
        }
        (Value::Float(f), Some(digits)) => {
            let factor = 10f64.powi(digits);
            Ok(Value::Float((f * factor).round() / factor))
        }
        (other, _) => Err(HelperError::new(format!("expected a number, got {}", other.type_name()))),
    }
}
