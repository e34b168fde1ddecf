//! Output AST Module
//!
//! The generated component type: a class declaration whose body is the
//! statement list of its `build_render_tree` method.

use crate::parse_util::{ParseSourceFile, ParseSourceSpan};
use crate::template_parser::Expression;
use quill_runtime::BaseCapability;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    pub source_span: ParseSourceSpan,
}

/// One generated component type
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub namespace: String,
    pub name: String,
    pub base: BaseCapability,
    pub parameters: Vec<ParamDecl>,
    pub route: Option<String>,
    pub body: Vec<Statement>,
    /// Template the class was generated from
    pub source: Arc<ParseSourceFile>,
}

impl ClassDecl {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }
}

/// Value bound to an attribute or a child component parameter
#[derive(Debug, Clone)]
pub enum ValueExpr {
    /// Written without `=`
    Present,
    Literal(String),
    /// Exactly one expression and no literal text
    Single(Expression),
    Interpolated(Vec<ValuePart>),
}

#[derive(Debug, Clone)]
pub enum ValuePart {
    Literal(String),
    Expression(Expression),
}

#[derive(Debug, Clone)]
pub struct IfArm {
    pub condition: Expression,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct ComponentParameter {
    pub name: String,
    pub value: ValueExpr,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone)]
pub enum Statement {
    /// Literal markup, written verbatim
    WriteMarkup {
        text: String,
        source_span: ParseSourceSpan,
    },
    /// Expression value, escaped unless it is markup
    WriteExpression(Expression),
    OpenElement {
        name: String,
        source_span: ParseSourceSpan,
    },
    AddAttribute {
        name: String,
        value: ValueExpr,
        source_span: ParseSourceSpan,
    },
    CloseElement {
        name: String,
    },
    If {
        arms: Vec<IfArm>,
        else_body: Option<Vec<Statement>>,
        source_span: ParseSourceSpan,
    },
    ForEach {
        variable: String,
        variable_span: ParseSourceSpan,
        iterable: Expression,
        body: Vec<Statement>,
        source_span: ParseSourceSpan,
    },
    Let {
        name: String,
        name_span: ParseSourceSpan,
        value: Expression,
    },
    RenderComponent {
        type_ref: String,
        parameters: Vec<ComponentParameter>,
        source_span: ParseSourceSpan,
    },
}

impl Statement {
    pub fn source_span(&self) -> Option<&ParseSourceSpan> {
        match self {
            Statement::WriteMarkup { source_span, .. }
            | Statement::OpenElement { source_span, .. }
            | Statement::AddAttribute { source_span, .. }
            | Statement::If { source_span, .. }
            | Statement::ForEach { source_span, .. }
            | Statement::RenderComponent { source_span, .. } => Some(source_span),
            Statement::WriteExpression(expr) => Some(&expr.source_span),
            Statement::Let { name_span, .. } => Some(name_span),
            Statement::CloseElement { .. } => None,
        }
    }
}
