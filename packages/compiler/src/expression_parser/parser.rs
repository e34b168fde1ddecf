/**
 * Expression Parser
 *
 * Recursive descent parser for template expressions
 */
use super::ast::*;
use super::lexer::{Lexer, Token, TokenType};
use std::fmt;
use thiserror::Error;

/// A failure to parse one expression. `index` is an absolute offset into the
/// template source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ExpressionError {
    pub message: String,
    pub index: usize,
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub type Result<T> = std::result::Result<T, ExpressionError>;

/// Parser for template expressions
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            lexer: Lexer::new(),
        }
    }

    /// Parse `input`, which starts at `absolute_offset` in the template.
    pub fn parse(&self, input: &str, absolute_offset: usize) -> Result<AST> {
        let tokens = self.lexer.tokenize(input);
        let mut parse_ast = ParseAST::new(input, absolute_offset, tokens);
        if let Some(error) = parse_ast.tokens.iter().find(|t| t.is_error()) {
            return Err(ExpressionError {
                message: error.str_value.clone(),
                index: absolute_offset + error.index,
            });
        }
        if parse_ast.tokens.is_empty() {
            return Err(parse_ast.error("Expected an expression".to_string()));
        }

        let ast = parse_ast.parse_conditional()?;
        if let Some(token) = parse_ast.current() {
            return Err(parse_ast.error(format!("Unexpected token '{}'", token.str_value)));
        }
        Ok(ast)
    }
}

struct ParseAST<'a> {
    input: &'a str,
    absolute_offset: usize,
    tokens: Vec<Token>,
    index: usize,
}

impl<'a> ParseAST<'a> {
    fn new(input: &'a str, absolute_offset: usize, tokens: Vec<Token>) -> Self {
        ParseAST {
            input,
            absolute_offset,
            tokens,
            index: 0,
        }
    }

    fn error(&self, message: String) -> ExpressionError {
        ExpressionError {
            message: format!("Parser Error: {} in expression [{}]", message, self.input),
            index: self.absolute_offset + self.input_index(),
        }
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn consume_optional_character(&mut self, code: char) -> bool {
        if self.current().map_or(false, |t| t.is_character(code)) {
            self.advance();
            return true;
        }
        false
    }

    fn consume_optional_operator(&mut self, op: &str) -> bool {
        if self.current().map_or(false, |t| t.is_operator(op)) {
            self.advance();
            return true;
        }
        false
    }

    fn expect_character(&mut self, code: char) -> Result<()> {
        if self.consume_optional_character(code) {
            Ok(())
        } else {
            Err(self.error(format!("Missing expected {}", code)))
        }
    }

    fn expect_identifier(&mut self) -> Result<(String, AbsoluteSourceSpan)> {
        match self.current() {
            Some(token) if token.is_identifier() || token.is_keyword() => {
                let name = token.str_value.clone();
                let span = ParseSpan::new(token.index, token.end).to_absolute(self.absolute_offset);
                self.advance();
                Ok((name, span))
            }
            _ => Err(self.error("Expected identifier".to_string())),
        }
    }

    /// Parse conditional/ternary expression (e.g., `a ? b : c`)
    fn parse_conditional(&mut self) -> Result<AST> {
        let start = self.input_index();
        let result = self.parse_binary(1)?;

        if self.consume_optional_operator("?") {
            let true_exp = self.parse_conditional()?;
            self.expect_character(':')?;
            let false_exp = self.parse_conditional()?;
            return Ok(AST::Conditional(Conditional {
                source_span: self.source_span(start),
                condition: Box::new(result),
                true_exp: Box::new(true_exp),
                false_exp: Box::new(false_exp),
            }));
        }
        Ok(result)
    }

    /// Precedence climbing over the binary operators; every level is
    /// left-associative.
    fn parse_binary(&mut self, min_precedence: u8) -> Result<AST> {
        let start = self.input_index();
        let mut result = self.parse_prefix()?;

        while let Some(operation) = self.current_binary_operator() {
            let precedence = operation.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary(precedence + 1)?;
            result = AST::Binary(Binary {
                source_span: self.source_span(start),
                operation,
                left: Box::new(result),
                right: Box::new(right),
            });
        }
        Ok(result)
    }

    fn current_binary_operator(&self) -> Option<BinaryOperator> {
        self.current()
            .filter(|t| t.token_type == TokenType::Operator)
            .and_then(|t| BinaryOperator::from_token(&t.str_value))
    }

    fn parse_prefix(&mut self) -> Result<AST> {
        let start = self.input_index();
        let operator = if self.consume_optional_operator("!") {
            UnaryOperator::Not
        } else if self.consume_optional_operator("-") {
            UnaryOperator::Minus
        } else {
            return self.parse_call_chain();
        };

        let expr = self.parse_prefix()?;
        Ok(AST::Unary(Unary {
            source_span: self.source_span(start),
            operator,
            expr: Box::new(expr),
        }))
    }

    fn parse_call_chain(&mut self) -> Result<AST> {
        let start = self.input_index();
        let mut result = self.parse_primary()?;

        loop {
            if self.consume_optional_character('.') {
                let (name, name_span) = self.expect_identifier()?;
                if self.consume_optional_character('(') {
                    let mut args = vec![result];
                    args.extend(self.parse_call_arguments()?);
                    result = AST::Call(Call {
                        source_span: self.source_span(start),
                        name_span,
                        name,
                        args,
                        method_syntax: true,
                    });
                } else {
                    result = AST::PropertyRead(PropertyRead {
                        source_span: self.source_span(start),
                        name_span,
                        receiver: Box::new(result),
                        name,
                    });
                }
            } else if self.consume_optional_character('[') {
                let key = self.parse_conditional()?;
                self.expect_character(']')?;
                result = AST::KeyedRead(KeyedRead {
                    source_span: self.source_span(start),
                    receiver: Box::new(result),
                    key: Box::new(key),
                });
            } else {
                return Ok(result);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<AST> {
        let start = self.input_index();
        let token = match self.current() {
            Some(token) => token.clone(),
            None => return Err(self.error("Unexpected end of expression".to_string())),
        };

        if token.is_character('(') {
            self.advance();
            let result = self.parse_conditional()?;
            self.expect_character(')')?;
            return Ok(result);
        }

        if token.is_character('[') {
            self.advance();
            let mut expressions = Vec::new();
            if !self.consume_optional_character(']') {
                loop {
                    expressions.push(self.parse_conditional()?);
                    if !self.consume_optional_character(',') {
                        break;
                    }
                }
                self.expect_character(']')?;
            }
            return Ok(AST::LiteralArray(LiteralArray {
                source_span: self.source_span(start),
                expressions,
            }));
        }

        let value = if token.is_keyword_null() {
            Literal::Null
        } else if token.is_keyword_true() {
            Literal::Boolean(true)
        } else if token.is_keyword_false() {
            Literal::Boolean(false)
        } else if token.is_number() {
            self.parse_number(&token)?
        } else if token.is_string() {
            Literal::String(token.str_value.clone())
        } else if token.is_identifier() {
            self.advance();
            let name_span = self.source_span(start);
            if self.consume_optional_character('(') {
                let args = self.parse_call_arguments()?;
                return Ok(AST::Call(Call {
                    source_span: self.source_span(start),
                    name_span,
                    name: token.str_value,
                    args,
                    method_syntax: false,
                }));
            }
            return Ok(AST::Identifier(Identifier {
                source_span: name_span,
                name: token.str_value,
            }));
        } else {
            return Err(self.error(format!("Unexpected token '{}'", token.str_value)));
        };

        self.advance();
        Ok(AST::LiteralPrimitive(LiteralPrimitive {
            source_span: self.source_span(start),
            value,
        }))
    }

    fn parse_number(&self, token: &Token) -> Result<Literal> {
        let text = &token.str_value;
        if text.contains(['.', 'e', 'E']) {
            text.parse::<f64>()
                .map(Literal::Float)
                .map_err(|_| self.error(format!("Invalid number '{}'", text)))
        } else {
            text.parse::<i64>()
                .map(Literal::Integer)
                .map_err(|_| self.error(format!("Integer literal '{}' is out of range", text)))
        }
    }

    /// Arguments after an opening parenthesis, through the closing one.
    fn parse_call_arguments(&mut self) -> Result<Vec<AST>> {
        let mut args = Vec::new();
        if self.consume_optional_character(')') {
            return Ok(args);
        }
        loop {
            args.push(self.parse_conditional()?);
            if !self.consume_optional_character(',') {
                break;
            }
        }
        self.expect_character(')')?;
        Ok(args)
    }

    fn input_index(&self) -> usize {
        self.current().map(|t| t.index).unwrap_or(self.input.len())
    }

    fn source_span(&self, start: usize) -> AbsoluteSourceSpan {
        let end = if self.index > 0 && self.index <= self.tokens.len() {
            self.tokens[self.index - 1].end
        } else {
            self.input_index()
        };
        ParseSpan::new(start, end).to_absolute(self.absolute_offset)
    }
}
