//! Abstract Emitter Module
//!
//! Indenting line buffer plus the printer that renders a `ClassDecl` as
//! readable generated source.

use crate::expression_parser::{quote_string, serialize};
use crate::output::output_ast::{ClassDecl, Statement, ValueExpr, ValuePart};

const INDENT_WITH: &str = "  ";

#[derive(Debug, Clone)]
struct EmittedLine {
    parts_length: usize,
    parts: Vec<String>,
    indent: usize,
}

impl EmittedLine {
    fn new(indent: usize) -> Self {
        EmittedLine {
            parts_length: 0,
            parts: Vec::new(),
            indent,
        }
    }
}

pub struct EmitterVisitorContext {
    lines: Vec<EmittedLine>,
    indent: usize,
}

impl EmitterVisitorContext {
    pub fn create_root() -> Self {
        EmitterVisitorContext::new(0)
    }

    pub fn new(indent: usize) -> Self {
        EmitterVisitorContext {
            lines: vec![EmittedLine::new(indent)],
            indent,
        }
    }

    fn current_line_mut(&mut self) -> &mut EmittedLine {
        if self.lines.is_empty() {
            self.lines.push(EmittedLine::new(self.indent));
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    pub fn println(&mut self, last_part: &str) {
        self.print(last_part, true);
    }

    pub fn line_is_empty(&self) -> bool {
        self.lines.last().map_or(true, |line| line.parts.is_empty())
    }

    pub fn line_length(&self) -> usize {
        self.lines
            .last()
            .map_or(0, |line| line.indent * INDENT_WITH.len() + line.parts_length)
    }

    pub fn print(&mut self, part: &str, new_line: bool) {
        if !part.is_empty() {
            let current = self.current_line_mut();
            current.parts.push(part.to_string());
            current.parts_length += part.len();
        }
        if new_line {
            self.lines.push(EmittedLine::new(self.indent));
        }
    }

    pub fn remove_empty_last_line(&mut self) {
        if self.line_is_empty() {
            self.lines.pop();
        }
    }

    pub fn inc_indent(&mut self) {
        self.indent += 1;
        if self.line_is_empty() {
            let indent = self.indent;
            self.current_line_mut().indent = indent;
        }
    }

    pub fn dec_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        if self.line_is_empty() {
            let indent = self.indent;
            self.current_line_mut().indent = indent;
        }
    }

    pub fn to_source(&self) -> String {
        let lines = match self.lines.last() {
            Some(last) if last.parts.is_empty() => &self.lines[..self.lines.len() - 1],
            _ => &self.lines[..],
        };
        lines
            .iter()
            .map(|l| {
                if !l.parts.is_empty() {
                    format!("{}{}", INDENT_WITH.repeat(l.indent), l.parts.join(""))
                } else {
                    String::new()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Print `class` as generated source text.
pub fn print_class(class: &ClassDecl) -> String {
    let mut ctx = EmitterVisitorContext::create_root();
    ctx.println(&format!("namespace {};", class.namespace));
    ctx.println("");
    if let Some(route) = &class.route {
        ctx.println(&format!("#[route({})]", quote_string(route)));
    }
    ctx.println(&format!("class {} : {} {{", class.name, class.base.as_str()));
    ctx.inc_indent();
    for param in &class.parameters {
        ctx.println(&format!("param {};", param.name));
    }
    if !class.parameters.is_empty() {
        ctx.println("");
    }
    ctx.println("fn build_render_tree(builder) {");
    ctx.inc_indent();
    print_statements(&class.body, &mut ctx);
    ctx.dec_indent();
    ctx.println("}");
    ctx.dec_indent();
    ctx.println("}");
    ctx.to_source()
}

fn print_statements(statements: &[Statement], ctx: &mut EmitterVisitorContext) {
    for statement in statements {
        print_statement(statement, ctx);
    }
}

fn print_statement(statement: &Statement, ctx: &mut EmitterVisitorContext) {
    match statement {
        Statement::WriteMarkup { text, .. } => {
            ctx.println(&format!("builder.add_markup({});", quote_string(text)));
        }
        Statement::WriteExpression(expr) => {
            ctx.println(&format!("builder.add_content({});", serialize(&expr.ast)));
        }
        Statement::OpenElement { name, .. } => {
            ctx.println(&format!("builder.open_element({});", quote_string(name)));
        }
        Statement::AddAttribute { name, value, .. } => {
            ctx.println(&format!(
                "builder.add_attribute({}, {});",
                quote_string(name),
                print_value(value)
            ));
        }
        Statement::CloseElement { .. } => ctx.println("builder.close_element();"),
        Statement::If { arms, else_body, .. } => {
            for (i, arm) in arms.iter().enumerate() {
                let keyword = if i == 0 { "if" } else { "} else if" };
                ctx.println(&format!("{} ({}) {{", keyword, serialize(&arm.condition.ast)));
                ctx.inc_indent();
                print_statements(&arm.body, ctx);
                ctx.dec_indent();
            }
            if let Some(body) = else_body {
                ctx.println("} else {");
                ctx.inc_indent();
                print_statements(body, ctx);
                ctx.dec_indent();
            }
            ctx.println("}");
        }
        Statement::ForEach {
            variable,
            iterable,
            body,
            ..
        } => {
            ctx.println(&format!("foreach (var {} in {}) {{", variable, serialize(&iterable.ast)));
            ctx.inc_indent();
            print_statements(body, ctx);
            ctx.dec_indent();
            ctx.println("}");
        }
        Statement::Let { name, value, .. } => {
            ctx.println(&format!("let {} = {};", name, serialize(&value.ast)));
        }
        Statement::RenderComponent {
            type_ref,
            parameters,
            ..
        } => {
            let args = parameters
                .iter()
                .map(|p| format!("{}: {}", p.name, print_value(&p.value)))
                .collect::<Vec<_>>()
                .join(", ");
            ctx.println(&format!("builder.add_component::<{}>({{ {} }});", type_ref, args));
        }
    }
}

fn print_value(value: &ValueExpr) -> String {
    match value {
        ValueExpr::Present => "true".to_string(),
        ValueExpr::Literal(text) => quote_string(text),
        ValueExpr::Single(expr) => serialize(&expr.ast),
        ValueExpr::Interpolated(parts) => {
            let pieces = parts
                .iter()
                .map(|part| match part {
                    ValuePart::Literal(text) => quote_string(text),
                    ValuePart::Expression(expr) => format!("string({})", serialize(&expr.ast)),
                })
                .collect::<Vec<_>>();
            format!("concat({})", pieces.join(", "))
        }
    }
}
