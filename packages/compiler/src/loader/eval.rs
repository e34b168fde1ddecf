//! Interpreter
//!
//! Evaluates compiled expressions and runs instruction trees against a
//! `RenderTreeBuilder`.

use super::program::{CExpr, CExprKind, CPart, CValue, Instr};
use crate::expression_parser::{BinaryOperator, UnaryOperator};
use crate::parse_util::ParseLocation;
use indexmap::IndexMap;
use quill_runtime::{AttributeValue, ParameterSet, RenderTreeBuilder, Value};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Evaluation failure with the location of the failing expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct EvalError {
    pub message: String,
    pub location: Option<ParseLocation>,
}

impl EvalError {
    fn at(expr: &CExpr, message: impl Into<String>) -> Self {
        EvalError {
            message: message.into(),
            location: Some(expr.span.start.clone()),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}", location, self.message),
            None => f.write_str(&self.message),
        }
    }
}

pub fn evaluate(expr: &CExpr, slots: &[Value]) -> Result<Value, EvalError> {
    match &expr.kind {
        CExprKind::Const(value) => Ok(value.clone()),
        CExprKind::Local(slot) => Ok(slots.get(*slot).cloned().unwrap_or_default()),
        CExprKind::List(items) => items
            .iter()
            .map(|item| evaluate(item, slots))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        CExprKind::Member(receiver, name) => {
            let value = evaluate(receiver, slots)?;
            member(&value, name).map_err(|message| EvalError::at(expr, message))
        }
        CExprKind::Index(receiver, key) => {
            let value = evaluate(receiver, slots)?;
            let key = evaluate(key, slots)?;
            index(&value, &key).map_err(|message| EvalError::at(expr, message))
        }
        CExprKind::Call(function, args) => {
            let args = args
                .iter()
                .map(|arg| evaluate(arg, slots))
                .collect::<Result<Vec<_>, _>>()?;
            function
                .call(&args)
                .map_err(|e| EvalError::at(expr, format!("{}(): {}", short_name(function.name()), e)))
        }
        CExprKind::Unary(operator, operand) => {
            let value = evaluate(operand, slots)?;
            unary(*operator, &value).map_err(|message| EvalError::at(expr, message))
        }
        CExprKind::Binary(operator, left, right) => {
            let left_value = evaluate(left, slots)?;
            match operator {
                BinaryOperator::And => {
                    if !left_value.is_truthy() {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(evaluate(right, slots)?.is_truthy()))
                }
                BinaryOperator::Or => {
                    if left_value.is_truthy() {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(evaluate(right, slots)?.is_truthy()))
                }
                BinaryOperator::NullishCoalesce => {
                    if left_value.is_null() {
                        evaluate(right, slots)
                    } else {
                        Ok(left_value)
                    }
                }
                _ => {
                    let right_value = evaluate(right, slots)?;
                    binary(*operator, &left_value, &right_value)
                        .map_err(|message| EvalError::at(expr, message))
                }
            }
        }
        CExprKind::Conditional(condition, yes, no) => {
            if evaluate(condition, slots)?.is_truthy() {
                evaluate(yes, slots)
            } else {
                evaluate(no, slots)
            }
        }
    }
}

fn short_name(name: &str) -> &str {
    crate::util::simple_name(name)
}

pub fn member(value: &Value, name: &str) -> Result<Value, String> {
    match value {
        Value::Map(map) => Ok(map.get(name).cloned().unwrap_or_default()),
        other => Err(format!("Cannot read member '{}' of {}", name, other.type_name())),
    }
}

pub fn index(value: &Value, key: &Value) -> Result<Value, String> {
    match (value, key) {
        (Value::List(items), Value::Int(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .ok_or_else(|| format!("Index {} is out of bounds for a list of length {}", i, items.len())),
        (Value::Map(map), Value::Str(key)) => Ok(map.get(key).cloned().unwrap_or_default()),
        (Value::Str(text), Value::Int(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| text.chars().nth(i))
            .map(|ch| Value::Str(ch.to_string()))
            .ok_or_else(|| format!("Index {} is out of bounds for a string of length {}", i, text.chars().count())),
        (value, key) => Err(format!("Cannot index {} with {}", value.type_name(), key.type_name())),
    }
}

pub fn unary(operator: UnaryOperator, value: &Value) -> Result<Value, String> {
    match operator {
        UnaryOperator::Not => Ok(Value::Bool(!value.is_truthy())),
        UnaryOperator::Minus => match value {
            Value::Int(i) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| "Integer overflow".to_string()),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(format!("Cannot negate {}", other.type_name())),
        },
    }
}

fn is_text(value: &Value) -> bool {
    matches!(value, Value::Str(_) | Value::Markup(_))
}

fn numeric_pair(left: &Value, right: &Value) -> Option<(f64, f64)> {
    Some((left.as_f64()?, right.as_f64()?))
}

pub fn binary(operator: BinaryOperator, left: &Value, right: &Value) -> Result<Value, String> {
    use BinaryOperator::*;

    let type_error = || {
        format!(
            "Cannot apply '{}' to {} and {}",
            operator.as_str(),
            left.type_name(),
            right.type_name()
        )
    };

    match operator {
        Plus => match (left, right) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(*b)
                .map(Value::Int)
                .ok_or_else(|| "Integer overflow".to_string()),
            (l, r) if is_text(l) || is_text(r) => {
                Ok(Value::Str(format!("{}{}", l.to_text(), r.to_text())))
            }
            (Value::List(a), Value::List(b)) => {
                Ok(Value::List(a.iter().chain(b.iter()).cloned().collect()))
            }
            (l, r) => numeric_pair(l, r)
                .map(|(a, b)| Value::Float(a + b))
                .ok_or_else(type_error),
        },
        Minus | Multiply | Divide | Modulo => match (left, right) {
            (Value::Int(a), Value::Int(b)) => {
                let result = match operator {
                    Minus => a.checked_sub(*b),
                    Multiply => a.checked_mul(*b),
                    Divide | Modulo if *b == 0 => return Err("Division by zero".to_string()),
                    Divide => a.checked_div(*b),
                    _ => a.checked_rem(*b),
                };
                result.map(Value::Int).ok_or_else(|| "Integer overflow".to_string())
            }
            (l, r) => {
                let (a, b) = numeric_pair(l, r).ok_or_else(type_error)?;
                Ok(Value::Float(match operator {
                    Minus => a - b,
                    Multiply => a * b,
                    Divide => a / b,
                    _ => a % b,
                }))
            }
        },
        Lower | LowerEquals | Bigger | BiggerEquals => {
            let ordering = compare(left, right).ok_or_else(|| {
                format!("Cannot compare {} and {}", left.type_name(), right.type_name())
            })?;
            Ok(Value::Bool(match operator {
                Lower => ordering == Ordering::Less,
                LowerEquals => ordering != Ordering::Greater,
                Bigger => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        }
        Equals => Ok(Value::Bool(left == right)),
        NotEquals => Ok(Value::Bool(left != right)),
        And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        NullishCoalesce => Ok(if left.is_null() { right.clone() } else { left.clone() }),
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (l, r) if is_text(l) && is_text(r) => Some(l.to_text().cmp(&r.to_text())),
        (l, r) => {
            let (a, b) = numeric_pair(l, r)?;
            a.partial_cmp(&b)
        }
    }
}

/// Items visited by `@foreach`. Maps yield `{ key, value }` entries.
pub fn iterate(value: &Value) -> Result<Vec<Value>, String> {
    match value {
        Value::List(items) => Ok(items.clone()),
        Value::Map(map) => Ok(map
            .iter()
            .map(|(key, value)| {
                let mut entry = IndexMap::new();
                entry.insert("key".to_string(), Value::Str(key.clone()));
                entry.insert("value".to_string(), value.clone());
                Value::Map(entry)
            })
            .collect()),
        other => Err(format!("Cannot iterate over {}", other.type_name())),
    }
}

fn evaluate_value(value: &CValue, slots: &[Value]) -> Result<Value, EvalError> {
    match value {
        CValue::Present => Ok(Value::Bool(true)),
        CValue::Single(expr) => evaluate(expr, slots),
        CValue::Parts(parts) => {
            let mut text = String::new();
            for part in parts {
                match part {
                    CPart::Literal(literal) => text.push_str(literal),
                    CPart::Expr(expr) => text.push_str(&evaluate(expr, slots)?.to_text()),
                }
            }
            Ok(Value::Str(text))
        }
    }
}

fn attribute_value(value: &CValue, slots: &[Value]) -> Result<AttributeValue, EvalError> {
    let result = evaluate_value(value, slots)?;
    Ok(match (value, result) {
        (CValue::Parts(_), result) => AttributeValue::Text(result.to_text().into_owned()),
        (_, Value::Bool(b)) => AttributeValue::Bool(b),
        (_, Value::Null) => AttributeValue::Bool(false),
        (_, result) => AttributeValue::Text(result.to_text().into_owned()),
    })
}

/// Run `body`, appending frames to `builder`.
pub fn execute(body: &[Instr], slots: &mut [Value], builder: &mut RenderTreeBuilder) -> anyhow::Result<()> {
    for instr in body {
        match instr {
            Instr::Markup(markup) => builder.add_markup(markup.as_str()),
            Instr::Text(expr) => match evaluate(expr, slots)? {
                Value::Markup(markup) => builder.add_markup(markup),
                value => builder.add_text(value.to_text().into_owned()),
            },
            Instr::Open(name) => builder.open_element(name.as_str()),
            Instr::Attribute(name, value) => {
                let value = attribute_value(value, slots)?;
                builder.add_attribute(name.as_str(), value)?;
            }
            Instr::Close => builder.close_element()?,
            Instr::If { arms, else_body } => {
                let mut taken = None;
                for arm in arms {
                    if evaluate(&arm.condition, slots)?.is_truthy() {
                        taken = Some(&arm.body);
                        break;
                    }
                }
                execute(taken.unwrap_or(else_body), slots, builder)?;
            }
            Instr::ForEach { slot, iterable, body } => {
                let items = iterate(&evaluate(iterable, slots)?)
                    .map_err(|message| EvalError::at(iterable, message))?;
                for item in items {
                    slots[*slot] = item;
                    execute(body, slots, builder)?;
                }
            }
            Instr::Let { slot, value } => {
                let value = evaluate(value, slots)?;
                slots[*slot] = value;
            }
            Instr::Component { handle, parameters } => {
                let mut set = ParameterSet::new();
                for (name, value) in parameters {
                    set.insert(name.as_str(), evaluate_value(value, slots)?);
                }
                builder.add_component(handle.clone(), set);
            }
        }
    }
    Ok(())
}
