/**
 * Expression Serializer
 *
 * Serializes AST back to source form. Parentheses are added only where
 * precedence requires them, so re-parsing the output yields the same tree.
 */
use super::ast::*;

/// Serialize AST to string
pub fn serialize(ast: &AST) -> String {
    ast.visit(&mut SerializeExpressionVisitor)
}

/// Quote `value` as a double-quoted string literal.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

struct SerializeExpressionVisitor;

impl SerializeExpressionVisitor {
    /// Serialize `ast` as an operand of an operator with `precedence`.
    fn operand(&mut self, ast: &AST, precedence: u8) -> String {
        let text = ast.visit(self);
        let needs_parens = match ast {
            AST::Binary(binary) => binary.operation.precedence() < precedence,
            AST::Conditional(_) => true,
            _ => false,
        };
        if needs_parens {
            format!("({})", text)
        } else {
            text
        }
    }

    fn receiver(&mut self, ast: &AST) -> String {
        match ast {
            AST::Binary(_) | AST::Conditional(_) | AST::Unary(_) => format!("({})", ast.visit(self)),
            AST::LiteralPrimitive(LiteralPrimitive {
                value: Literal::Integer(_) | Literal::Float(_),
                ..
            }) => format!("({})", ast.visit(self)),
            _ => ast.visit(self),
        }
    }

    fn list(&mut self, items: &[AST]) -> String {
        items
            .iter()
            .map(|item| item.visit(self))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl AstVisitor for SerializeExpressionVisitor {
    type Result = String;

    fn visit_literal_primitive(&mut self, ast: &LiteralPrimitive) -> String {
        match &ast.value {
            Literal::Null => "null".to_string(),
            Literal::Boolean(b) => b.to_string(),
            Literal::Integer(i) => i.to_string(),
            Literal::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{:.1}", f),
            Literal::Float(f) => f.to_string(),
            Literal::String(s) => quote_string(s),
        }
    }

    fn visit_literal_array(&mut self, ast: &LiteralArray) -> String {
        format!("[{}]", self.list(&ast.expressions))
    }

    fn visit_identifier(&mut self, ast: &Identifier) -> String {
        ast.name.clone()
    }

    fn visit_property_read(&mut self, ast: &PropertyRead) -> String {
        format!("{}.{}", self.receiver(&ast.receiver), ast.name)
    }

    fn visit_keyed_read(&mut self, ast: &KeyedRead) -> String {
        format!("{}[{}]", self.receiver(&ast.receiver), ast.key.visit(self))
    }

    fn visit_call(&mut self, ast: &Call) -> String {
        match ast.args.split_first() {
            Some((receiver, rest)) if ast.method_syntax => {
                format!("{}.{}({})", self.receiver(receiver), ast.name, self.list(rest))
            }
            _ => format!("{}({})", ast.name, self.list(&ast.args)),
        }
    }

    fn visit_unary(&mut self, ast: &Unary) -> String {
        let operand = match ast.expr.as_ref() {
            AST::Binary(_) | AST::Conditional(_) => format!("({})", ast.expr.visit(self)),
            // Keeps `- -x` from printing as `--x`.
            AST::Unary(_) => format!(" {}", ast.expr.visit(self)),
            _ => ast.expr.visit(self),
        };
        format!("{}{}", ast.operator.as_str(), operand)
    }

    fn visit_binary(&mut self, ast: &Binary) -> String {
        let precedence = ast.operation.precedence();
        format!(
            "{} {} {}",
            self.operand(&ast.left, precedence),
            ast.operation.as_str(),
            self.operand(&ast.right, precedence + 1)
        )
    }

    fn visit_conditional(&mut self, ast: &Conditional) -> String {
        let condition = match ast.condition.as_ref() {
            AST::Conditional(_) => format!("({})", ast.condition.visit(self)),
            _ => ast.condition.visit(self),
        };
        format!(
            "{} ? {} : {}",
            condition,
            ast.true_exp.visit(self),
            ast.false_exp.visit(self)
        )
    }
}
