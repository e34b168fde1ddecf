//! Compiled program
//!
//! The executable form of a generated type: an instruction tree over
//! compiled expressions. Locals are slot indexes into one value frame per
//! component instance.

use crate::expression_parser::{BinaryOperator, UnaryOperator};
use crate::parse_util::{ParseSourceFile, ParseSourceSpan};
use quill_runtime::{HelperFunction, TypeHandle, Value};
use std::fmt;
use std::sync::Arc;

pub type Slot = usize;

#[derive(Debug, Clone)]
pub struct CExpr {
    pub kind: CExprKind,
    pub span: ParseSourceSpan,
}

impl CExpr {
    pub fn new(kind: CExprKind, span: ParseSourceSpan) -> Self {
        CExpr { kind, span }
    }

    pub fn as_const(&self) -> Option<&Value> {
        match &self.kind {
            CExprKind::Const(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub enum CExprKind {
    Const(Value),
    Local(Slot),
    List(Vec<CExpr>),
    Member(Box<CExpr>, String),
    Index(Box<CExpr>, Box<CExpr>),
    Call(Arc<HelperFunction>, Vec<CExpr>),
    Unary(UnaryOperator, Box<CExpr>),
    Binary(BinaryOperator, Box<CExpr>, Box<CExpr>),
    Conditional(Box<CExpr>, Box<CExpr>, Box<CExpr>),
}

impl fmt::Debug for CExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CExprKind::Const(value) => f.debug_tuple("Const").field(value).finish(),
            CExprKind::Local(slot) => f.debug_tuple("Local").field(slot).finish(),
            CExprKind::List(items) => f.debug_tuple("List").field(items).finish(),
            CExprKind::Member(receiver, name) => f.debug_tuple("Member").field(receiver).field(name).finish(),
            CExprKind::Index(receiver, key) => f.debug_tuple("Index").field(receiver).field(key).finish(),
            CExprKind::Call(function, args) => f.debug_tuple("Call").field(&function.name()).field(args).finish(),
            CExprKind::Unary(op, expr) => f.debug_tuple("Unary").field(op).field(expr).finish(),
            CExprKind::Binary(op, left, right) => {
                f.debug_tuple("Binary").field(op).field(left).field(right).finish()
            }
            CExprKind::Conditional(condition, yes, no) => f
                .debug_tuple("Conditional")
                .field(condition)
                .field(yes)
                .field(no)
                .finish(),
        }
    }
}

/// Attribute or child parameter value
#[derive(Debug, Clone)]
pub enum CValue {
    Present,
    Single(CExpr),
    Parts(Vec<CPart>),
}

#[derive(Debug, Clone)]
pub enum CPart {
    Literal(String),
    Expr(CExpr),
}

#[derive(Debug, Clone)]
pub struct CArm {
    pub condition: CExpr,
    pub body: Vec<Instr>,
}

#[derive(Debug, Clone)]
pub enum Instr {
    Markup(String),
    /// Write an expression's value; escaped unless it is markup
    Text(CExpr),
    Open(String),
    Attribute(String, CValue),
    Close,
    If {
        arms: Vec<CArm>,
        else_body: Vec<Instr>,
    },
    ForEach {
        slot: Slot,
        iterable: CExpr,
        body: Vec<Instr>,
    },
    Let {
        slot: Slot,
        value: CExpr,
    },
    Component {
        handle: TypeHandle,
        parameters: Vec<(String, CValue)>,
    },
}

/// A parameter and the slot its value is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSlot {
    pub name: String,
    pub slot: Slot,
    pub declared: bool,
}

#[derive(Debug, Clone)]
pub struct Program {
    pub type_name: String,
    pub body: Vec<Instr>,
    pub slot_count: usize,
    pub parameters: Vec<ParamSlot>,
    pub source: Arc<ParseSourceFile>,
}

impl Program {
    pub fn parameter_slot(&self, name: &str) -> Option<Slot> {
        self.parameters.iter().find(|p| p.name == name).map(|p| p.slot)
    }
}
