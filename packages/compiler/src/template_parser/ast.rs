//! Template AST
//!
//! Node definitions of a parsed template document. Node order always
//! equals source order.

use crate::expression_parser::AST;
use crate::parse_util::{ParseSourceFile, ParseSourceSpan};
use std::sync::Arc;

/// A parsed template. Immutable once produced by the parser.
#[derive(Debug, Clone)]
pub struct TemplateDocument {
    pub source: Arc<ParseSourceFile>,
    pub nodes: Vec<Node>,
}

impl TemplateDocument {
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Directive(directive) => Some(directive),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Node type union
#[derive(Debug, Clone)]
pub enum Node {
    Text(Text),
    Expression(Expression),
    Element(Element),
    Component(Component),
    If(IfBlock),
    ForEach(ForEachBlock),
    Let(LetDeclaration),
    Directive(Directive),
}

impl Node {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            Node::Text(node) => &node.source_span,
            Node::Expression(node) => &node.source_span,
            Node::Element(node) => &node.source_span,
            Node::Component(node) => &node.source_span,
            Node::If(node) => &node.source_span,
            Node::ForEach(node) => &node.source_span,
            Node::Let(node) => &node.source_span,
            Node::Directive(node) => &node.source_span,
        }
    }
}

/// Literal markup, emitted verbatim
#[derive(Debug, Clone)]
pub struct Text {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

/// `@expr` or `@( expr )`
#[derive(Debug, Clone)]
pub struct Expression {
    pub ast: AST,
    /// Expression source without the transition and parentheses.
    pub source: String,
    pub source_span: ParseSourceSpan,
}

/// Attribute value piece
#[derive(Debug, Clone)]
pub enum AttributeValuePart {
    Text(String),
    Expression(Expression),
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    /// `None` for a boolean attribute written without a value.
    pub value: Option<Vec<AttributeValuePart>>,
    pub source_span: ParseSourceSpan,
    pub key_span: ParseSourceSpan,
}

/// Element node
#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    pub is_self_closing: bool,
    pub is_void: bool,
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
    pub end_source_span: Option<ParseSourceSpan>,
}

/// Reference to a nested component, e.g. `<Greeting Name="@user" />`
#[derive(Debug, Clone)]
pub struct Component {
    pub component_name: String,
    pub attrs: Vec<Attribute>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone)]
pub struct IfBranch {
    pub condition: Expression,
    pub children: Vec<Node>,
}

/// `@if (...) { } else if (...) { } else { }`
#[derive(Debug, Clone)]
pub struct IfBlock {
    pub branches: Vec<IfBranch>,
    pub else_children: Option<Vec<Node>>,
    pub source_span: ParseSourceSpan,
}

/// `@foreach (var item in items) { }`
#[derive(Debug, Clone)]
pub struct ForEachBlock {
    pub item: String,
    pub item_span: ParseSourceSpan,
    pub iterable: Expression,
    pub children: Vec<Node>,
    pub source_span: ParseSourceSpan,
}

/// `@let name = expr;`
#[derive(Debug, Clone)]
pub struct LetDeclaration {
    pub name: String,
    pub value: Expression,
    pub source_span: ParseSourceSpan,
    pub name_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `@page` with an optional quoted route
    Page { route: Option<String> },
    Namespace(String),
    Param(String),
}

impl DirectiveKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            DirectiveKind::Page { .. } => "page",
            DirectiveKind::Namespace(_) => "namespace",
            DirectiveKind::Param(_) => "param",
        }
    }
}

/// File-level directive; consumes its whole line.
#[derive(Debug, Clone)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub source_span: ParseSourceSpan,
}
