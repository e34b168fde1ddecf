/**
 * Template Parser
 *
 * Single pass over the template source. Markup is split from `@` code
 * transitions, elements are matched against their end tags, and every
 * problem found is collected so one run reports all of them.
 */
use super::ast::*;
use crate::chars;
use crate::error::SyntaxError;
use crate::expression_parser::Parser;
use crate::parse_util::{ParseError, ParseSourceFile, ParseSourceSpan};
use crate::util::{is_identifier, is_namespace};
use once_cell::sync::Lazy;
use quill_runtime::html::{decode_entities, get_tag_flags, is_void_element, TagFlags};
use regex::Regex;
use std::sync::Arc;

/// `var? item in expression`
static FOREACH_HEADER_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*(?:var\s+)?([A-Za-z_][A-Za-z0-9_]*)\s+in\s+(\S.*?)\s*$")
        .expect("valid foreach regex")
});

/// Template parser. Stateless; one instance may parse many sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateParser {
    expression_parser: Parser,
}

impl TemplateParser {
    pub fn new() -> Self {
        TemplateParser {
            expression_parser: Parser::new(),
        }
    }

    /// Parse `source`; `url` only labels locations in messages.
    pub fn parse(&self, source: &str, url: &str) -> Result<TemplateDocument, SyntaxError> {
        let file = Arc::new(ParseSourceFile::new(source, url));
        let mut builder = TreeBuilder::new(Arc::clone(&file), &self.expression_parser);
        let content = builder.parse_content(Context::TopLevel);
        if builder.errors.is_empty() {
            Ok(TemplateDocument {
                source: file,
                nodes: content.nodes,
            })
        } else {
            Err(SyntaxError {
                errors: builder.errors,
            })
        }
    }
}

/// Where a content run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context<'n> {
    TopLevel,
    /// Body of `@if`, `@foreach`; ends at a `}`
    Block,
    /// Children of an element; ends at its end tag
    Element(&'n str),
}

struct Content {
    nodes: Vec<Node>,
    /// Span of the `}` or end tag that terminated the run.
    closed_by: Option<ParseSourceSpan>,
}

struct TreeBuilder<'p> {
    file: Arc<ParseSourceFile>,
    expression_parser: &'p Parser,
    index: usize,
    errors: Vec<ParseError>,
}

impl<'p> TreeBuilder<'p> {
    fn new(file: Arc<ParseSourceFile>, expression_parser: &'p Parser) -> Self {
        TreeBuilder {
            file,
            expression_parser,
            index: 0,
            errors: Vec::new(),
        }
    }

    // Cursor

    fn len(&self) -> usize {
        self.file.content.len()
    }

    fn at_end(&self) -> bool {
        self.index >= self.len()
    }

    fn rest(&self) -> &str {
        &self.file.content[self.index..]
    }

    fn peek(&self) -> char {
        self.rest().chars().next().unwrap_or(chars::EOF)
    }

    fn peek_at(&self, n: usize) -> char {
        self.rest().chars().nth(n).unwrap_or(chars::EOF)
    }

    fn previous_char(&self) -> Option<char> {
        self.file.content[..self.index].chars().next_back()
    }

    fn advance(&mut self) {
        if !self.at_end() {
            self.index += self.peek().len_utf8();
        }
    }

    fn attempt_char_code(&mut self, code: char) -> bool {
        if !self.at_end() && self.peek() == code {
            self.advance();
            return true;
        }
        false
    }

    fn attempt_str(&mut self, chars: &str) -> bool {
        if self.rest().starts_with(chars) {
            self.index += chars.len();
            return true;
        }
        false
    }

    /// `keyword` as a whole word
    fn attempt_keyword(&mut self, keyword: &str) -> bool {
        let rest = self.rest();
        if rest.starts_with(keyword)
            && !rest[keyword.len()..]
                .chars()
                .next()
                .map_or(false, chars::is_identifier_part)
        {
            self.index += keyword.len();
            return true;
        }
        false
    }

    fn skip_whitespace(&mut self) {
        while !self.at_end() && chars::is_whitespace(self.peek()) {
            self.advance();
        }
    }

    fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let start = self.index;
        while !self.at_end() && predicate(self.peek()) {
            self.advance();
        }
        self.file.content[start..self.index].to_string()
    }

    fn span(&self, start: usize, end: usize) -> ParseSourceSpan {
        self.file.span(start, end)
    }

    fn error(&mut self, start: usize, end: usize, msg: impl Into<String>) {
        let span = self.span(start, end);
        self.errors.push(ParseError::new(span, msg));
    }

    // Content

    fn parse_content(&mut self, context: Context<'_>) -> Content {
        let mut nodes = Vec::new();
        let mut text = String::new();
        let mut text_start = self.index;

        while !self.at_end() {
            match self.peek() {
                chars::AT => self.consume_at(&mut nodes, &mut text, &mut text_start, context),
                chars::LT => {
                    let next = self.peek_at(1);
                    if next == chars::SLASH {
                        self.flush_text(&mut nodes, &mut text, text_start, context);
                        let start = self.index;
                        let name = self.consume_end_tag();
                        let end_span = self.span(start, self.index);
                        match context {
                            Context::Element(open) if open.eq_ignore_ascii_case(&name) => {
                                return Content {
                                    nodes,
                                    closed_by: Some(end_span),
                                };
                            }
                            Context::Element(open) => {
                                self.error(
                                    start,
                                    self.index,
                                    format!(
                                        "Unexpected closing tag \"{}\"; expected </{}>",
                                        name, open
                                    ),
                                );
                                return Content {
                                    nodes,
                                    closed_by: Some(end_span),
                                };
                            }
                            _ => {
                                self.error(
                                    start,
                                    self.index,
                                    format!(
                                        "Unexpected closing tag \"{}\". It may happen when the tag has already been closed by another tag",
                                        name
                                    ),
                                );
                            }
                        }
                        text_start = self.index;
                    } else if next == chars::BANG {
                        self.consume_comment_or_declaration(&mut text);
                    } else if chars::is_tag_name_start(next) {
                        self.flush_text(&mut nodes, &mut text, text_start, context);
                        if let Some(node) = self.parse_element() {
                            nodes.push(node);
                        }
                        text_start = self.index;
                    } else {
                        text.push(chars::LT);
                        self.advance();
                    }
                }
                chars::RBRACE if context == Context::Block => {
                    self.flush_text(&mut nodes, &mut text, text_start, context);
                    let start = self.index;
                    self.advance();
                    return Content {
                        nodes,
                        closed_by: Some(self.span(start, self.index)),
                    };
                }
                ch => {
                    text.push(ch);
                    self.advance();
                }
            }
        }

        self.flush_text(&mut nodes, &mut text, text_start, context);
        Content {
            nodes,
            closed_by: None,
        }
    }

    /// `@` in content: literal after an alphanumeric, `@@` escape, or a
    /// code transition.
    fn consume_at(&mut self, nodes: &mut Vec<Node>, text: &mut String, text_start: &mut usize, context: Context<'_>) {
        let literal = self
            .previous_char()
            .map_or(false, |c| c.is_ascii_alphanumeric());
        if literal {
            text.push(chars::AT);
            self.advance();
        } else if self.attempt_str("@@") {
            text.push(chars::AT);
        } else {
            self.flush_text(nodes, text, *text_start, context);
            if let Some(node) = self.parse_transition(context) {
                nodes.push(node);
            }
            *text_start = self.index;
        }
    }

    fn flush_text(&self, nodes: &mut Vec<Node>, text: &mut String, start: usize, context: Context<'_>) {
        if text.is_empty() {
            return;
        }
        let value = std::mem::take(text);
        if context == Context::Block && value.trim().is_empty() && value.contains(chars::LF) {
            return;
        }
        nodes.push(Node::Text(Text {
            value,
            source_span: self.span(start, self.index),
        }));
    }

    /// `<!-- ... -->` or `<!DOCTYPE ...>`, appended verbatim to `text`.
    fn consume_comment_or_declaration(&mut self, text: &mut String) {
        let start = self.index;
        let terminator = if self.rest().starts_with("<!--") { "-->" } else { ">" };
        match self.rest().find(terminator) {
            Some(pos) => {
                let end = self.index + pos + terminator.len();
                text.push_str(&self.file.content[start..end]);
                self.index = end;
            }
            None => {
                let what = if terminator == "-->" { "comment" } else { "declaration" };
                self.error(start, self.len(), format!("Unterminated {}", what));
                self.index = self.len();
            }
        }
    }

    /// Consumes `</name>` and returns `name`.
    fn consume_end_tag(&mut self) -> String {
        let start = self.index;
        self.attempt_str("</");
        let name = self.read_while(chars::is_tag_name_part);
        self.skip_whitespace();
        if !self.attempt_char_code(chars::GT) {
            self.error(start, self.index, format!("Unterminated closing tag \"{}\"", name));
        }
        name
    }

    // Code transitions

    fn parse_transition(&mut self, context: Context<'_>) -> Option<Node> {
        let start = self.index;
        let next = self.peek_at(1);

        if next == chars::STAR {
            self.index += 2;
            match self.rest().find("*@") {
                Some(pos) => self.index += pos + 2,
                None => {
                    self.error(start, self.len(), "Unterminated template comment; missing '*@'");
                    self.index = self.len();
                }
            }
            return None;
        }

        if next == chars::LPAREN {
            self.advance();
            return self
                .parse_parenthesized(start, self.len())
                .map(Node::Expression);
        }

        if !chars::is_identifier_start(next) {
            self.advance();
            let found = if next == chars::EOF {
                "end of input".to_string()
            } else {
                format!("'{}'", next)
            };
            self.error(
                start,
                self.index,
                format!("Unexpected {} after '@'; use '@@' for a literal '@'", found),
            );
            return None;
        }

        self.advance();
        let word_start = self.index;
        let word = self.read_while(chars::is_identifier_part);
        match word.as_str() {
            "if" => self.parse_if(start),
            "foreach" => self.parse_foreach(start),
            "let" => self.parse_let(start),
            "page" | "namespace" | "param" => {
                let directive = self.parse_directive(&word, start);
                if context != Context::TopLevel {
                    self.error(
                        start,
                        word_start + word.len(),
                        format!("Directive @{} is only allowed at the top level", word),
                    );
                    return None;
                }
                directive
            }
            "else" => {
                self.error(start, self.index, "Unexpected 'else' without a preceding @if");
                None
            }
            _ => {
                self.index = word_start;
                self.parse_implicit_expression(start, self.len())
                    .map(Node::Expression)
            }
        }
    }

    /// `@name.member[key](args)`; the cursor is right after `@`.
    fn parse_implicit_expression(&mut self, start: usize, limit: usize) -> Option<Expression> {
        let expr_start = self.index;
        self.read_identifier_within(limit);
        loop {
            if self.index >= limit {
                break;
            }
            match self.peek() {
                chars::PERIOD if chars::is_identifier_start(self.peek_at(1)) && self.index + 1 < limit => {
                    self.advance();
                    self.read_identifier_within(limit);
                }
                chars::LBRACKET | chars::LPAREN => {
                    if self.scan_balanced(limit).is_none() {
                        self.error(start, self.index, "Unterminated expression");
                        return None;
                    }
                }
                _ => break,
            }
        }
        self.make_expression(start, expr_start, self.index)
    }

    fn read_identifier_within(&mut self, limit: usize) {
        while self.index < limit && chars::is_identifier_part(self.peek()) {
            self.advance();
        }
    }

    /// `( expr )`; the cursor is on the opening parenthesis.
    fn parse_parenthesized(&mut self, start: usize, limit: usize) -> Option<Expression> {
        match self.scan_balanced(limit) {
            Some((inner_start, inner_end)) => self.make_expression(start, inner_start, inner_end),
            None => {
                self.error(start, self.index, "Unterminated expression; missing ')'");
                None
            }
        }
    }

    /// Skips a bracketed group starting at the cursor, honouring nesting and
    /// string literals. Returns the inner range, or `None` when the group is
    /// not closed before `limit`.
    fn scan_balanced(&mut self, limit: usize) -> Option<(usize, usize)> {
        let open_index = self.index;
        let mut stack: Vec<char> = Vec::new();
        while self.index < limit {
            let ch = self.peek();
            match ch {
                chars::LPAREN => stack.push(chars::RPAREN),
                chars::LBRACKET => stack.push(chars::RBRACKET),
                chars::LBRACE => stack.push(chars::RBRACE),
                chars::RPAREN | chars::RBRACKET | chars::RBRACE => {
                    if stack.pop() != Some(ch) {
                        return None;
                    }
                    if stack.is_empty() {
                        let inner_end = self.index;
                        self.advance();
                        return Some((open_index + 1, inner_end));
                    }
                }
                chars::SQ | chars::DQ => {
                    if !self.skip_string_literal(limit) {
                        return None;
                    }
                    continue;
                }
                _ => {}
            }
            self.advance();
        }
        None
    }

    /// Cursor on the opening quote; leaves it after the closing one.
    fn skip_string_literal(&mut self, limit: usize) -> bool {
        let quote = self.peek();
        self.advance();
        while self.index < limit {
            let ch = self.peek();
            self.advance();
            if ch == chars::BACKSLASH {
                self.advance();
            } else if ch == quote {
                return true;
            }
        }
        false
    }

    fn make_expression(&mut self, start: usize, expr_start: usize, expr_end: usize) -> Option<Expression> {
        let source = self.file.content[expr_start..expr_end].to_string();
        match self.expression_parser.parse(&source, expr_start) {
            Ok(ast) => Some(Expression {
                ast,
                source,
                source_span: self.span(start, self.index),
            }),
            Err(error) => {
                self.error(error.index, error.index, error.message);
                None
            }
        }
    }

    /// `(cond)` after `@if` or `else if`
    fn parse_condition(&mut self, keyword: &str) -> Option<Expression> {
        self.skip_whitespace();
        let start = self.index;
        if self.peek() != chars::LPAREN {
            self.error(start, start, format!("Expected '(' after {}", keyword));
            return None;
        }
        self.parse_parenthesized(start, self.len())
    }

    /// `{ ... }` after a block header
    fn parse_block_body(&mut self, keyword: &str) -> Option<Vec<Node>> {
        self.skip_whitespace();
        let open = self.index;
        if !self.attempt_char_code(chars::LBRACE) {
            self.error(open, open, format!("Expected '{{' to open the {} block", keyword));
            return None;
        }
        let content = self.parse_content(Context::Block);
        if content.closed_by.is_none() {
            self.error(open, open + 1, format!("Unterminated {} block; missing '}}'", keyword));
        }
        Some(content.nodes)
    }

    fn parse_if(&mut self, start: usize) -> Option<Node> {
        let mut branches = Vec::new();
        let mut else_children = None;
        let mut keyword = "@if";

        loop {
            let condition = self.parse_condition(keyword)?;
            let children = self.parse_block_body(keyword)?;
            branches.push(IfBranch {
                condition,
                children,
            });

            let save = self.index;
            self.skip_whitespace();
            if !self.attempt_keyword("else") {
                self.index = save;
                break;
            }
            self.skip_whitespace();
            if self.attempt_keyword("if") {
                keyword = "else if";
                continue;
            }
            else_children = Some(self.parse_block_body("else")?);
            break;
        }

        Some(Node::If(IfBlock {
            branches,
            else_children,
            source_span: self.span(start, self.index),
        }))
    }

    fn parse_foreach(&mut self, start: usize) -> Option<Node> {
        self.skip_whitespace();
        let header_start = self.index;
        if self.peek() != chars::LPAREN {
            self.error(header_start, header_start, "Expected '(' after @foreach");
            return None;
        }
        let (inner_start, inner_end) = match self.scan_balanced(self.len()) {
            Some(range) => range,
            None => {
                self.error(start, self.index, "Unterminated @foreach header; missing ')'");
                return None;
            }
        };

        let header = self.file.content[inner_start..inner_end].to_string();
        let captures = match FOREACH_HEADER_REGEXP.captures(&header) {
            Some(captures) => captures,
            None => {
                self.error(
                    inner_start,
                    inner_end,
                    format!("Invalid @foreach header \"{}\"; expected \"var item in items\"", header),
                );
                return None;
            }
        };
        let (item, item_range) = match captures.get(1) {
            Some(m) => (m.as_str().to_string(), m.range()),
            None => return None,
        };
        let iterable_range = captures.get(2)?.range();
        let iterable_start = inner_start + iterable_range.start;
        let iterable_end = inner_start + iterable_range.end;

        let saved = self.index;
        let iterable = self.make_expression(iterable_start, iterable_start, iterable_end);
        self.index = saved;
        let mut iterable = iterable?;
        iterable.source_span = self.span(iterable_start, iterable_end);

        let children = self.parse_block_body("@foreach")?;
        Some(Node::ForEach(ForEachBlock {
            item,
            item_span: self.span(inner_start + item_range.start, inner_start + item_range.end),
            iterable,
            children,
            source_span: self.span(start, self.index),
        }))
    }

    fn parse_let(&mut self, start: usize) -> Option<Node> {
        self.skip_whitespace();
        let name_start = self.index;
        let name = if chars::is_identifier_start(self.peek()) {
            self.read_while(chars::is_identifier_part)
        } else {
            String::new()
        };
        if name.is_empty() {
            self.error(start, self.index, "Expected a name after @let");
            return None;
        }
        let name_span = self.span(name_start, self.index);

        self.skip_whitespace();
        if !self.attempt_char_code(chars::EQ) {
            self.error(start, self.index, format!("Expected '=' after @let {}", name));
            return None;
        }

        let value_start = self.index;
        let value_end = match self.find_statement_end() {
            Some(end) => end,
            None => {
                self.error(start, self.len(), format!("@let {} is missing a closing ';'", name));
                self.index = self.len();
                return None;
            }
        };
        self.index = value_end;
        let value = self.make_expression(value_start, value_start, value_end);
        self.index = value_end + 1;
        let mut value = value?;
        value.source_span = self.span(value_start, value_end);

        Some(Node::Let(LetDeclaration {
            name,
            value,
            source_span: self.span(start, self.index),
            name_span,
        }))
    }

    /// Offset of the `;` ending a statement that starts at the cursor, outside
    /// brackets and string literals. The cursor is left unchanged.
    fn find_statement_end(&mut self) -> Option<usize> {
        let saved = self.index;
        let mut depth = 0usize;
        let mut result = None;
        while !self.at_end() {
            match self.peek() {
                chars::SQ | chars::DQ => {
                    if !self.skip_string_literal(self.len()) {
                        break;
                    }
                    continue;
                }
                chars::LPAREN | chars::LBRACKET => depth += 1,
                chars::RPAREN | chars::RBRACKET => depth = depth.saturating_sub(1),
                chars::SEMICOLON if depth == 0 => {
                    result = Some(self.index);
                    break;
                }
                _ => {}
            }
            self.advance();
        }
        self.index = saved;
        result
    }

    /// Directive arguments run to the end of the line; the line break is
    /// consumed with them.
    fn parse_directive(&mut self, keyword: &str, start: usize) -> Option<Node> {
        let line_end = self
            .rest()
            .find(chars::LF)
            .map(|pos| self.index + pos)
            .unwrap_or(self.len());
        let value = self.file.content[self.index..line_end].trim().to_string();
        let value_start = self.index;
        self.index = line_end;
        let span_end = self.index;
        self.attempt_char_code(chars::LF);

        let kind = match keyword {
            "page" => {
                if value.is_empty() {
                    DirectiveKind::Page { route: None }
                } else if value.len() >= 2 && value.starts_with(chars::DQ) && value.ends_with(chars::DQ) {
                    DirectiveKind::Page {
                        route: Some(value[1..value.len() - 1].to_string()),
                    }
                } else {
                    self.error(value_start, span_end, format!("Expected a quoted route after @page, found \"{}\"", value));
                    return None;
                }
            }
            "namespace" => {
                if !is_namespace(&value) {
                    self.error(value_start, span_end, format!("Invalid namespace \"{}\"", value));
                    return None;
                }
                DirectiveKind::Namespace(value)
            }
            _ => {
                if !is_identifier(&value) {
                    self.error(value_start, span_end, format!("Expected a parameter name after @param, found \"{}\"", value));
                    return None;
                }
                DirectiveKind::Param(value)
            }
        };

        Some(Node::Directive(Directive {
            kind,
            source_span: self.span(start, span_end),
        }))
    }

    // Markup

    fn parse_element(&mut self) -> Option<Node> {
        let start = self.index;
        self.advance();
        let name = self.read_while(chars::is_tag_name_part);
        let is_component = name.starts_with(|c: char| c.is_ascii_uppercase());

        let mut attrs = Vec::new();
        let mut is_self_closing = false;
        loop {
            self.skip_whitespace();
            if self.at_end() {
                self.error(start, self.index, format!("Unterminated tag <{}>", name));
                return None;
            }
            if self.attempt_str("/>") {
                is_self_closing = true;
                break;
            }
            if self.attempt_char_code(chars::GT) {
                break;
            }
            let ch = self.peek();
            if chars::is_attribute_name_part(ch) {
                if let Some(attr) = self.parse_attribute() {
                    attrs.push(attr);
                }
            } else {
                let at = self.index;
                self.advance();
                self.error(at, self.index, format!("Unexpected character '{}' in tag <{}>", ch, name));
            }
        }
        let start_source_span = self.span(start, self.index);

        if is_component {
            if !is_self_closing {
                let content = self.parse_content(Context::Element(&name));
                if content.closed_by.is_none() {
                    self.error(start, start_source_span.end.offset, format!("Unclosed component tag <{}>", name));
                }
                let has_content = content.nodes.iter().any(|node| match node {
                    Node::Text(text) => !text.value.trim().is_empty(),
                    _ => true,
                });
                if has_content {
                    self.error(
                        start,
                        self.index,
                        format!("Component <{}> cannot have child content", name),
                    );
                }
            }
            return Some(Node::Component(Component {
                component_name: name,
                attrs,
                source_span: self.span(start, self.index),
            }));
        }

        let is_void = is_void_element(&name);
        if is_self_closing || is_void {
            return Some(Node::Element(Element {
                name,
                attrs,
                children: Vec::new(),
                is_self_closing,
                is_void,
                source_span: self.span(start, self.index),
                start_source_span,
                end_source_span: None,
            }));
        }

        let (children, end_source_span) = if get_tag_flags(&name).contains(TagFlags::RAW_TEXT) {
            self.parse_raw_text(&name, start)
        } else {
            let content = self.parse_content(Context::Element(&name));
            if content.closed_by.is_none() {
                self.error(start, start_source_span.end.offset, format!("Unclosed element <{}>", name));
            }
            (content.nodes, content.closed_by)
        };

        Some(Node::Element(Element {
            name,
            attrs,
            children,
            is_self_closing,
            is_void,
            source_span: self.span(start, self.index),
            start_source_span,
            end_source_span,
        }))
    }

    /// `<script>` and `<style>` content up to the end tag. Markup is not
    /// recognized inside it; `@` transitions are.
    fn parse_raw_text(&mut self, name: &str, start: usize) -> (Vec<Node>, Option<ParseSourceSpan>) {
        let closing = format!("</{}", name);
        let context = Context::Element(name);
        let content_start = self.index;
        let mut nodes = Vec::new();
        let mut text = String::new();
        let mut text_start = self.index;

        while !self.at_end() {
            match self.peek() {
                chars::LT if self.at_closing_tag(&closing) => {
                    self.flush_text(&mut nodes, &mut text, text_start, context);
                    let end_start = self.index;
                    self.consume_end_tag();
                    return (nodes, Some(self.span(end_start, self.index)));
                }
                chars::AT => self.consume_at(&mut nodes, &mut text, &mut text_start, context),
                ch => {
                    text.push(ch);
                    self.advance();
                }
            }
        }

        self.error(start, content_start, format!("Unclosed element <{}>", name));
        (Vec::new(), None)
    }

    fn at_closing_tag(&self, closing: &str) -> bool {
        self.rest()
            .get(..closing.len())
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case(closing))
    }

    fn parse_attribute(&mut self) -> Option<Attribute> {
        let start = self.index;
        let name = self.read_while(chars::is_attribute_name_part);
        let key_span = self.span(start, self.index);

        let save = self.index;
        self.skip_whitespace();
        if !self.attempt_char_code(chars::EQ) {
            self.index = save;
            return Some(Attribute {
                name,
                value: None,
                source_span: key_span.clone(),
                key_span,
            });
        }
        self.skip_whitespace();

        let quote = self.peek();
        let (value_start, value_end) = if chars::is_quote(quote) {
            self.advance();
            let value_start = self.index;
            match self.find_attribute_value_end(quote) {
                Some(end) => {
                    self.index = end + 1;
                    (value_start, end)
                }
                None => {
                    self.error(start, self.len(), format!("Unterminated value of attribute \"{}\"", name));
                    self.index = self.len();
                    return None;
                }
            }
        } else {
            let value_start = self.index;
            while !self.at_end() {
                let ch = self.peek();
                if chars::is_whitespace(ch) || ch == chars::GT || self.rest().starts_with("/>") {
                    break;
                }
                self.advance();
            }
            (value_start, self.index)
        };

        let after = self.index;
        let parts = self.parse_attribute_value(value_start, value_end);
        self.index = after;

        Some(Attribute {
            name,
            value: Some(parts),
            source_span: self.span(start, self.index),
            key_span,
        })
    }

    /// Offset of the closing `quote`, skipping over `@( ... )` groups.
    fn find_attribute_value_end(&mut self, quote: char) -> Option<usize> {
        let saved = self.index;
        let mut result = None;
        while !self.at_end() {
            let ch = self.peek();
            if ch == quote {
                result = Some(self.index);
                break;
            }
            if ch == chars::AT && self.peek_at(1) == chars::LPAREN {
                self.advance();
                if self.scan_balanced(self.len()).is_none() {
                    break;
                }
                continue;
            }
            self.advance();
        }
        self.index = saved;
        result
    }

    fn parse_attribute_value(&mut self, start: usize, end: usize) -> Vec<AttributeValuePart> {
        let mut parts = Vec::new();
        let mut text = String::new();
        self.index = start;

        while self.index < end {
            let ch = self.peek();
            if ch != chars::AT {
                text.push(ch);
                self.advance();
                continue;
            }

            let literal = self.index > start
                && self
                    .previous_char()
                    .map_or(false, |c| c.is_ascii_alphanumeric());
            if literal {
                text.push(ch);
                self.advance();
                continue;
            }
            if self.index + 1 < end && self.peek_at(1) == chars::AT {
                text.push(chars::AT);
                self.index += 2;
                continue;
            }

            let at = self.index;
            let next = if at + 1 < end { self.peek_at(1) } else { chars::EOF };
            let expression = if next == chars::LPAREN {
                self.advance();
                self.parse_parenthesized(at, end)
            } else if chars::is_identifier_start(next) {
                self.advance();
                self.parse_implicit_expression(at, end)
            } else {
                self.advance();
                self.error(at, self.index, "Unexpected character after '@' in attribute value; use '@@' for a literal '@'");
                None
            };

            if let Some(expression) = expression {
                if !text.is_empty() {
                    parts.push(AttributeValuePart::Text(decode_entities(&std::mem::take(&mut text)).into_owned()));
                }
                parts.push(AttributeValuePart::Expression(expression));
            }
        }

        if !text.is_empty() {
            parts.push(AttributeValuePart::Text(decode_entities(&text).into_owned()));
        }
        parts
    }
}
