//! Release optimizations
//!
//! Constant folding over compiled expressions, removal of branches with
//! constant conditions, and merging of adjacent markup writes.

use super::eval::evaluate;
use super::program::*;
use quill_runtime::html::escape_html;
use quill_runtime::Value;

pub fn optimize(program: &mut Program) {
    let body = std::mem::take(&mut program.body);
    program.body = optimize_body(body);
}

fn optimize_body(body: Vec<Instr>) -> Vec<Instr> {
    let mut out: Vec<Instr> = Vec::with_capacity(body.len());
    for instr in body {
        match instr {
            Instr::Text(expr) => {
                let expr = fold(expr);
                match expr.as_const() {
                    Some(Value::Markup(markup)) => push_markup(&mut out, markup.clone()),
                    Some(value) => push_markup(&mut out, escape_html(&value.to_text()).into_owned()),
                    None => out.push(Instr::Text(expr)),
                }
            }
            Instr::Markup(markup) => push_markup(&mut out, markup),
            Instr::Attribute(name, value) => out.push(Instr::Attribute(name, fold_value(value))),
            Instr::If { arms, else_body } => {
                let mut kept = Vec::with_capacity(arms.len());
                let mut else_body = Some(else_body);
                for arm in arms {
                    let condition = fold(arm.condition);
                    match condition.as_const().map(Value::is_truthy) {
                        Some(false) => continue,
                        Some(true) => {
                            // Later arms and the else branch are unreachable.
                            else_body = Some(arm.body);
                            break;
                        }
                        None => kept.push(CArm {
                            condition,
                            body: arm.body,
                        }),
                    }
                }
                let else_body = optimize_body(else_body.unwrap_or_default());
                if kept.is_empty() {
                    for instr in else_body {
                        match instr {
                            Instr::Markup(markup) => push_markup(&mut out, markup),
                            other => out.push(other),
                        }
                    }
                } else {
                    let arms = kept
                        .into_iter()
                        .map(|arm| CArm {
                            condition: arm.condition,
                            body: optimize_body(arm.body),
                        })
                        .collect();
                    out.push(Instr::If { arms, else_body });
                }
            }
            Instr::ForEach { slot, iterable, body } => out.push(Instr::ForEach {
                slot,
                iterable: fold(iterable),
                body: optimize_body(body),
            }),
            Instr::Let { slot, value } => out.push(Instr::Let {
                slot,
                value: fold(value),
            }),
            Instr::Component { handle, parameters } => out.push(Instr::Component {
                handle,
                parameters: parameters
                    .into_iter()
                    .map(|(name, value)| (name, fold_value(value)))
                    .collect(),
            }),
            other => out.push(other),
        }
    }
    out
}

fn push_markup(out: &mut Vec<Instr>, markup: String) {
    if markup.is_empty() {
        return;
    }
    if let Some(Instr::Markup(last)) = out.last_mut() {
        last.push_str(&markup);
        return;
    }
    out.push(Instr::Markup(markup));
}

fn fold_value(value: CValue) -> CValue {
    match value {
        CValue::Present => CValue::Present,
        CValue::Single(expr) => CValue::Single(fold(expr)),
        CValue::Parts(parts) => CValue::Parts(
            parts
                .into_iter()
                .map(|part| match part {
                    CPart::Expr(expr) => CPart::Expr(fold(expr)),
                    literal => literal,
                })
                .collect(),
        ),
    }
}

/// Fold `expr` bottom-up. A node whose operands are all constant is
/// evaluated now; if evaluation fails the node is kept so the error surfaces
/// at render time with its location.
pub fn fold(expr: CExpr) -> CExpr {
    let CExpr { kind, span } = expr;
    let kind = match kind {
        CExprKind::List(items) => CExprKind::List(items.into_iter().map(fold).collect()),
        CExprKind::Member(receiver, name) => CExprKind::Member(Box::new(fold(*receiver)), name),
        CExprKind::Index(receiver, key) => {
            CExprKind::Index(Box::new(fold(*receiver)), Box::new(fold(*key)))
        }
        CExprKind::Call(function, args) => CExprKind::Call(function, args.into_iter().map(fold).collect()),
        CExprKind::Unary(operator, operand) => CExprKind::Unary(operator, Box::new(fold(*operand))),
        CExprKind::Binary(operator, left, right) => {
            CExprKind::Binary(operator, Box::new(fold(*left)), Box::new(fold(*right)))
        }
        CExprKind::Conditional(condition, yes, no) => {
            let condition = fold(*condition);
            match condition.as_const().map(Value::is_truthy) {
                Some(true) => return fold(*yes),
                Some(false) => return fold(*no),
                None => CExprKind::Conditional(Box::new(condition), Box::new(fold(*yes)), Box::new(fold(*no))),
            }
        }
        leaf => leaf,
    };

    let expr = CExpr::new(kind, span);
    if !operands_constant(&expr) {
        return expr;
    }
    match evaluate(&expr, &[]) {
        Ok(value) if !value.is_deferred() => CExpr::new(CExprKind::Const(value), expr.span),
        _ => expr,
    }
}

fn operands_constant(expr: &CExpr) -> bool {
    let is_const = |e: &CExpr| e.as_const().is_some();
    match &expr.kind {
        CExprKind::Const(_) | CExprKind::Local(_) => false,
        CExprKind::List(items) => items.iter().all(is_const),
        CExprKind::Member(receiver, _) => is_const(receiver),
        CExprKind::Index(receiver, key) => is_const(receiver) && is_const(key),
        CExprKind::Call(_, args) => args.iter().all(is_const),
        CExprKind::Unary(_, operand) => is_const(operand),
        CExprKind::Binary(_, left, right) => is_const(left) && is_const(right),
        CExprKind::Conditional(..) => false,
    }
}
