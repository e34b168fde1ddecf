/**
 * Expression AST
 *
 * Node types of the template expression language. Spans are byte offsets
 * into the template source the expression was taken from.
 */

use serde::{Deserialize, Serialize};

/// Span relative to the parsed expression text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSpan {
    pub start: usize,
    pub end: usize,
}

impl ParseSpan {
    pub fn new(start: usize, end: usize) -> Self {
        ParseSpan { start, end }
    }

    pub fn to_absolute(&self, absolute_offset: usize) -> AbsoluteSourceSpan {
        AbsoluteSourceSpan::new(absolute_offset + self.start, absolute_offset + self.end)
    }
}

/// Absolute source span for mapping back to the template source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsoluteSourceSpan {
    pub start: usize,
    pub end: usize,
}

impl AbsoluteSourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        AbsoluteSourceSpan { start, end }
    }
}

/// Main AST enum containing all node types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AST {
    LiteralPrimitive(LiteralPrimitive),
    LiteralArray(LiteralArray),
    Identifier(Identifier),
    PropertyRead(PropertyRead),
    KeyedRead(KeyedRead),
    Call(Call),
    Unary(Unary),
    Binary(Binary),
    Conditional(Conditional),
}

impl AST {
    pub fn source_span(&self) -> AbsoluteSourceSpan {
        match self {
            AST::LiteralPrimitive(ast) => ast.source_span,
            AST::LiteralArray(ast) => ast.source_span,
            AST::Identifier(ast) => ast.source_span,
            AST::PropertyRead(ast) => ast.source_span,
            AST::KeyedRead(ast) => ast.source_span,
            AST::Call(ast) => ast.source_span,
            AST::Unary(ast) => ast.source_span,
            AST::Binary(ast) => ast.source_span,
            AST::Conditional(ast) => ast.source_span,
        }
    }

    pub fn visit<V: AstVisitor>(&self, visitor: &mut V) -> V::Result {
        match self {
            AST::LiteralPrimitive(ast) => visitor.visit_literal_primitive(ast),
            AST::LiteralArray(ast) => visitor.visit_literal_array(ast),
            AST::Identifier(ast) => visitor.visit_identifier(ast),
            AST::PropertyRead(ast) => visitor.visit_property_read(ast),
            AST::KeyedRead(ast) => visitor.visit_keyed_read(ast),
            AST::Call(ast) => visitor.visit_call(ast),
            AST::Unary(ast) => visitor.visit_unary(ast),
            AST::Binary(ast) => visitor.visit_binary(ast),
            AST::Conditional(ast) => visitor.visit_conditional(ast),
        }
    }

    /// Whether the expression is a literal (no identifiers or calls).
    pub fn is_constant(&self) -> bool {
        match self {
            AST::LiteralPrimitive(_) => true,
            AST::LiteralArray(ast) => ast.expressions.iter().all(AST::is_constant),
            AST::Identifier(_) | AST::Call(_) => false,
            AST::PropertyRead(ast) => ast.receiver.is_constant(),
            AST::KeyedRead(ast) => ast.receiver.is_constant() && ast.key.is_constant(),
            AST::Unary(ast) => ast.expr.is_constant(),
            AST::Binary(ast) => ast.left.is_constant() && ast.right.is_constant(),
            AST::Conditional(ast) => {
                ast.condition.is_constant()
                    && ast.true_exp.is_constant()
                    && ast.false_exp.is_constant()
            }
        }
    }
}

/// Visitor pattern for AST traversal
pub trait AstVisitor {
    type Result;

    fn visit_literal_primitive(&mut self, ast: &LiteralPrimitive) -> Self::Result;
    fn visit_literal_array(&mut self, ast: &LiteralArray) -> Self::Result;
    fn visit_identifier(&mut self, ast: &Identifier) -> Self::Result;
    fn visit_property_read(&mut self, ast: &PropertyRead) -> Self::Result;
    fn visit_keyed_read(&mut self, ast: &KeyedRead) -> Self::Result;
    fn visit_call(&mut self, ast: &Call) -> Self::Result;
    fn visit_unary(&mut self, ast: &Unary) -> Self::Result;
    fn visit_binary(&mut self, ast: &Binary) -> Self::Result;
    fn visit_conditional(&mut self, ast: &Conditional) -> Self::Result;
}

/// Literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "literalType", content = "value")]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// Literal primitive (string, number, boolean, null)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralPrimitive {
    pub source_span: AbsoluteSourceSpan,
    pub value: Literal,
}

/// List literal (e.g., `[a, b]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralArray {
    pub source_span: AbsoluteSourceSpan,
    pub expressions: Vec<AST>,
}

/// Free identifier: a parameter or a local binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub source_span: AbsoluteSourceSpan,
    pub name: String,
}

/// Property read (e.g., `obj.property`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRead {
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub name: String,
}

/// Keyed read (e.g., `obj[key]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedRead {
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
}

/// Call of a named function. `a.f(x)` is recorded as `f(a, x)` with
/// `method_syntax` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub name: String,
    pub args: Vec<AST>,
    pub method_syntax: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Not,
    Minus,
}

impl UnaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Minus => "-",
        }
    }
}

/// Unary operation (e.g., `-x`, `!x`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unary {
    pub source_span: AbsoluteSourceSpan,
    pub operator: UnaryOperator,
    pub expr: Box<AST>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Multiply,
    Divide,
    Modulo,
    Plus,
    Minus,
    Lower,
    LowerEquals,
    Bigger,
    BiggerEquals,
    Equals,
    NotEquals,
    And,
    Or,
    NullishCoalesce,
}

impl BinaryOperator {
    pub fn from_token(op: &str) -> Option<Self> {
        Some(match op {
            "*" => BinaryOperator::Multiply,
            "/" => BinaryOperator::Divide,
            "%" => BinaryOperator::Modulo,
            "+" => BinaryOperator::Plus,
            "-" => BinaryOperator::Minus,
            "<" => BinaryOperator::Lower,
            "<=" => BinaryOperator::LowerEquals,
            ">" => BinaryOperator::Bigger,
            ">=" => BinaryOperator::BiggerEquals,
            "==" => BinaryOperator::Equals,
            "!=" => BinaryOperator::NotEquals,
            "&&" => BinaryOperator::And,
            "||" => BinaryOperator::Or,
            "??" => BinaryOperator::NullishCoalesce,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Lower => "<",
            BinaryOperator::LowerEquals => "<=",
            BinaryOperator::Bigger => ">",
            BinaryOperator::BiggerEquals => ">=",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::NullishCoalesce => "??",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::NullishCoalesce => 1,
            BinaryOperator::Or => 2,
            BinaryOperator::And => 3,
            BinaryOperator::Equals | BinaryOperator::NotEquals => 4,
            BinaryOperator::Lower
            | BinaryOperator::LowerEquals
            | BinaryOperator::Bigger
            | BinaryOperator::BiggerEquals => 5,
            BinaryOperator::Plus | BinaryOperator::Minus => 6,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 7,
        }
    }
}

/// Binary operation (e.g., `a + b`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub source_span: AbsoluteSourceSpan,
    pub operation: BinaryOperator,
    pub left: Box<AST>,
    pub right: Box<AST>,
}

/// Ternary conditional (e.g., `condition ? a : b`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub source_span: AbsoluteSourceSpan,
    pub condition: Box<AST>,
    pub true_exp: Box<AST>,
    pub false_exp: Box<AST>,
}
