/**
 * Expression Lexer
 *
 * Tokenizes template expressions into tokens for parsing
 */

use crate::chars;
use serde::{Deserialize, Serialize};

/// Token types in template expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TokenType {
    Character = 0,
    Identifier = 1,
    Keyword = 2,
    String = 3,
    Operator = 4,
    Number = 5,
    Error = 6,
}

/// Token representation. Numbers keep their source text in `str_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,
    pub end: usize,
    pub token_type: TokenType,
    pub str_value: String,
}

impl Token {
    pub fn new(index: usize, end: usize, token_type: TokenType, str_value: impl Into<String>) -> Self {
        Token {
            index,
            end,
            token_type,
            str_value: str_value.into(),
        }
    }

    pub fn operator(index: usize, end: usize, str_value: &str) -> Self {
        Token::new(index, end, TokenType::Operator, str_value)
    }

    pub fn is_character(&self, code: char) -> bool {
        self.token_type == TokenType::Character && self.str_value.starts_with(code)
    }

    pub fn is_number(&self) -> bool {
        self.token_type == TokenType::Number
    }

    pub fn is_string(&self) -> bool {
        self.token_type == TokenType::String
    }

    pub fn is_identifier(&self) -> bool {
        self.token_type == TokenType::Identifier
    }

    pub fn is_keyword(&self) -> bool {
        self.token_type == TokenType::Keyword
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.token_type == TokenType::Operator && self.str_value == operator
    }

    pub fn is_keyword_null(&self) -> bool {
        self.is_keyword() && self.str_value == "null"
    }

    pub fn is_keyword_true(&self) -> bool {
        self.is_keyword() && self.str_value == "true"
    }

    pub fn is_keyword_false(&self) -> bool {
        self.is_keyword() && self.str_value == "false"
    }

    pub fn is_error(&self) -> bool {
        self.token_type == TokenType::Error
    }
}

/// Expression lexer
#[derive(Debug, Clone, Copy, Default)]
pub struct Lexer;

impl Lexer {
    pub fn new() -> Self {
        Lexer
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        Scanner::new(text).scan()
    }
}

const KEYWORDS: &[&str] = &["null", "true", "false"];

/// Scanner for tokenizing input
struct Scanner<'a> {
    input: &'a str,
    length: usize,
    index: usize,
    peek: char,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        let peek = input.chars().next().unwrap_or(chars::EOF);
        Scanner {
            input,
            length: input.len(),
            index: 0,
            peek,
        }
    }

    fn scan(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.scan_token() {
            let is_error = token.is_error();
            tokens.push(token);
            if is_error {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) {
        self.index += self.peek.len_utf8();
        self.peek = self.input[self.index..].chars().next().unwrap_or(chars::EOF);
    }

    fn scan_token(&mut self) -> Option<Token> {
        while self.index < self.length && chars::is_whitespace(self.peek) {
            self.advance();
        }
        if self.index >= self.length {
            return None;
        }

        let start = self.index;
        let ch = self.peek;

        if chars::is_identifier_start(ch) {
            return Some(self.scan_identifier());
        }
        if chars::is_digit(ch) {
            return Some(self.scan_number(start));
        }

        let token = match ch {
            chars::PERIOD
            | chars::LPAREN
            | chars::RPAREN
            | chars::LBRACKET
            | chars::RBRACKET
            | chars::COMMA
            | chars::COLON
            | chars::SEMICOLON => self.scan_character(start, ch),
            chars::SQ | chars::DQ => self.scan_string(ch),
            chars::PLUS | chars::MINUS | chars::STAR | chars::SLASH | chars::PERCENT => {
                self.advance();
                Token::operator(start, self.index, &ch.to_string())
            }
            chars::LT => self.scan_complex_operator(start, "<", chars::EQ, "<="),
            chars::GT => self.scan_complex_operator(start, ">", chars::EQ, ">="),
            chars::BANG => self.scan_complex_operator(start, "!", chars::EQ, "!="),
            chars::EQ => self.scan_complex_operator(start, "=", chars::EQ, "=="),
            chars::AMPERSAND => self.scan_complex_operator(start, "&", chars::AMPERSAND, "&&"),
            chars::BAR => self.scan_complex_operator(start, "|", chars::BAR, "||"),
            chars::QUESTION => self.scan_complex_operator(start, "?", chars::QUESTION, "??"),
            _ => {
                self.advance();
                self.error(start, format!("Unexpected character [{}]", ch))
            }
        };
        Some(token)
    }

    fn error(&self, start: usize, message: String) -> Token {
        Token::new(
            start,
            self.index,
            TokenType::Error,
            format!("Lexer Error: {} at column {} in expression [{}]", message, start, self.input),
        )
    }

    fn scan_character(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        Token::new(start, self.index, TokenType::Character, ch.to_string())
    }

    /// `one` alone, or `two` when followed by `next`. `&` and `|` alone are
    /// not operators of the language and are reported by the parser.
    fn scan_complex_operator(&mut self, start: usize, one: &str, next: char, two: &str) -> Token {
        self.advance();
        if self.peek == next {
            self.advance();
            return Token::operator(start, self.index, two);
        }
        Token::operator(start, self.index, one)
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.index;
        self.advance();
        while self.index < self.length && chars::is_identifier_part(self.peek) {
            self.advance();
        }

        let str_value = &self.input[start..self.index];
        let token_type = if KEYWORDS.contains(&str_value) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };
        Token::new(start, self.index, token_type, str_value)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        while chars::is_digit(self.peek) {
            self.advance();
        }

        // A fraction needs a digit after the period; `1.upper()` is a call.
        let rest = &self.input[self.index..];
        let mut chars_after = rest.chars();
        if chars_after.next() == Some(chars::PERIOD)
            && chars_after.next().map_or(false, chars::is_digit)
        {
            self.advance();
            while chars::is_digit(self.peek) {
                self.advance();
            }
        }

        if self.peek == 'e' || self.peek == 'E' {
            self.advance();
            if self.peek == chars::PLUS || self.peek == chars::MINUS {
                self.advance();
            }
            if !chars::is_digit(self.peek) {
                return self.error(start, "Invalid exponent".to_string());
            }
            while chars::is_digit(self.peek) {
                self.advance();
            }
        }

        Token::new(start, self.index, TokenType::Number, &self.input[start..self.index])
    }

    fn scan_string(&mut self, quote: char) -> Token {
        let start = self.index;
        self.advance();

        let mut buffer = String::new();
        loop {
            if self.index >= self.length {
                return self.error(start, "Unterminated quote".to_string());
            }
            let ch = self.peek;
            self.advance();
            if ch == quote {
                break;
            }
            if ch != chars::BACKSLASH {
                buffer.push(ch);
                continue;
            }

            let escaped = self.peek;
            if self.index >= self.length {
                return self.error(start, "Unterminated quote".to_string());
            }
            self.advance();
            buffer.push(match escaped {
                'n' => chars::LF,
                't' => chars::TAB,
                'r' => chars::CR,
                '\\' | '\'' | '"' => escaped,
                other => {
                    return self.error(start, format!("Invalid escape sequence [\\{}]", other));
                }
            });
        }

        Token::new(start, self.index, TokenType::String, buffer)
    }
}
