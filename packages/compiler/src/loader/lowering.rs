//! Lowering
//!
//! Turns the statements of a generated type into an instruction tree,
//! resolving every name against the local scopes, the parameters and the
//! linked modules. Problems are reported to a `DiagnosticBag`; lowering
//! always runs to the end so that one compile reports all of them.

use super::diagnostics::{self as codes, DiagnosticBag};
use super::program::*;
use crate::config::{CompileOptions, OptimizationLevel};
use crate::expression_parser::*;
use crate::output::{ClassDecl, Statement, ValueExpr, ValuePart};
use crate::parse_util::ParseSourceSpan;
use indexmap::IndexMap;
use smallvec::SmallVec;
use quill_runtime::module::SymbolKind;
use quill_runtime::{BaseCapability, HelperFunction, LoadedModule, TypeHandle, Value};
use std::sync::Arc;

/// Locals declared in one statement list or element body
type Scope = SmallVec<[(String, Slot); 4]>;

struct ParamState {
    slot: Slot,
    declared: bool,
    used: bool,
    span: Option<ParseSourceSpan>,
}

pub struct Lowerer<'a> {
    class: &'a ClassDecl,
    modules: &'a [Arc<LoadedModule>],
    options: &'a CompileOptions,
    diagnostics: &'a mut DiagnosticBag,
    scopes: Vec<Scope>,
    params: IndexMap<String, ParamState>,
    slot_count: usize,
}

impl<'a> Lowerer<'a> {
    /// `modules` is the symbol scope in search order.
    pub fn new(
        class: &'a ClassDecl,
        modules: &'a [Arc<LoadedModule>],
        options: &'a CompileOptions,
        diagnostics: &'a mut DiagnosticBag,
    ) -> Self {
        let mut lowerer = Lowerer {
            class,
            modules,
            options,
            diagnostics,
            scopes: Vec::new(),
            params: IndexMap::new(),
            slot_count: 0,
        };
        for param in &class.parameters {
            let slot = lowerer.allocate_slot();
            lowerer.params.insert(
                param.name.clone(),
                ParamState {
                    slot,
                    declared: true,
                    used: false,
                    span: Some(param.source_span.clone()),
                },
            );
        }
        lowerer
    }

    pub fn lower(mut self) -> Program {
        let class = self.class;
        let body = self.lower_statements(&class.body);

        for (name, param) in &self.params {
            if param.declared && !param.used {
                self.diagnostics.warning(
                    codes::UNUSED_PARAMETER,
                    param.span.as_ref(),
                    format!("Parameter '{}' is declared but never used", name),
                );
            }
        }

        Program {
            type_name: class.full_name(),
            body,
            slot_count: self.slot_count,
            parameters: self
                .params
                .iter()
                .map(|(name, param)| ParamSlot {
                    name: name.clone(),
                    slot: param.slot,
                    declared: param.declared,
                })
                .collect(),
            source: class.source.clone(),
        }
    }

    fn allocate_slot(&mut self) -> Slot {
        let slot = self.slot_count;
        self.slot_count += 1;
        slot
    }

    fn span(&self, span: AbsoluteSourceSpan) -> ParseSourceSpan {
        self.class.source.span(span.start, span.end)
    }

    // Scopes

    fn lookup_local(&self, name: &str) -> Option<Slot> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(local, _)| local == name)
            .map(|(_, slot)| *slot)
    }

    fn declare_local(&mut self, name: &str, span: &ParseSourceSpan) -> Slot {
        if self.lookup_local(name).is_some() {
            self.diagnostics.warning(
                codes::SHADOWED_LOCAL,
                Some(span),
                format!("Local '{}' shadows an earlier local of the same name", name),
            );
        }
        let slot = self.allocate_slot();
        if let Some(scope) = self.scopes.last_mut() {
            scope.push((name.to_string(), slot));
        }
        slot
    }

    // Statements

    fn lower_statements(&mut self, statements: &[Statement]) -> Vec<Instr> {
        self.scopes.push(Scope::new());
        let depth = self.scopes.len();
        let mut body = Vec::with_capacity(statements.len());
        for statement in statements {
            self.lower_statement(statement, &mut body);
        }
        self.scopes.truncate(depth - 1);
        body
    }

    fn lower_statement(&mut self, statement: &Statement, body: &mut Vec<Instr>) {
        match statement {
            Statement::WriteMarkup { text, .. } => body.push(Instr::Markup(text.clone())),
            Statement::WriteExpression(expr) => body.push(Instr::Text(self.lower_expr(&expr.ast))),
            Statement::OpenElement { name, .. } => {
                body.push(Instr::Open(name.clone()));
                self.scopes.push(Scope::new());
            }
            Statement::AddAttribute { name, value, .. } => {
                let value = self.lower_value(value);
                body.push(Instr::Attribute(name.clone(), value));
            }
            Statement::CloseElement { .. } => {
                if self.scopes.len() > 1 {
                    self.scopes.pop();
                }
                body.push(Instr::Close);
            }
            Statement::If { arms, else_body, .. } => {
                let arms = arms
                    .iter()
                    .map(|arm| CArm {
                        condition: self.lower_expr(&arm.condition.ast),
                        body: self.lower_statements(&arm.body),
                    })
                    .collect();
                let else_body = else_body
                    .as_deref()
                    .map(|statements| self.lower_statements(statements))
                    .unwrap_or_default();
                body.push(Instr::If { arms, else_body });
            }
            Statement::ForEach {
                variable,
                variable_span,
                iterable,
                body: loop_body,
                ..
            } => {
                let iterable = self.lower_expr(&iterable.ast);
                self.scopes.push(Scope::new());
                let slot = self.declare_local(variable, variable_span);
                let loop_body = self.lower_statements(loop_body);
                self.scopes.pop();
                body.push(Instr::ForEach {
                    slot,
                    iterable,
                    body: loop_body,
                });
            }
            Statement::Let { name, name_span, value } => {
                let value = self.lower_expr(&value.ast);
                let slot = self.declare_local(name, name_span);
                body.push(Instr::Let { slot, value });
            }
            Statement::RenderComponent {
                type_ref,
                parameters,
                source_span,
            } => {
                let handle = self.resolve_component(type_ref, source_span);
                let parameters: Vec<(String, CValue)> = parameters
                    .iter()
                    .map(|param| (param.name.clone(), self.lower_value(&param.value)))
                    .collect();
                let handle = match handle {
                    Some(handle) => handle,
                    None => return,
                };
                if let Some(descriptor) = handle.descriptor() {
                    if descriptor.capability == BaseCapability::Page {
                        self.diagnostics.error(
                            codes::PAGE_AS_CHILD,
                            Some(source_span),
                            format!("Page '{}' cannot be used as a child component", handle.name()),
                        );
                    }
                    for (name, _) in &parameters {
                        if !descriptor.accepts_parameter(name) {
                            self.diagnostics.error(
                                codes::UNDECLARED_CHILD_PARAMETER,
                                Some(source_span),
                                format!("Component '{}' does not declare parameter '{}'", handle.name(), name),
                            );
                        }
                    }
                }
                body.push(Instr::Component { handle, parameters });
            }
        }
    }

    fn lower_value(&mut self, value: &ValueExpr) -> CValue {
        match value {
            ValueExpr::Present => CValue::Present,
            ValueExpr::Literal(text) => CValue::Parts(vec![CPart::Literal(text.clone())]),
            ValueExpr::Single(expr) => CValue::Single(self.lower_expr(&expr.ast)),
            ValueExpr::Interpolated(parts) => CValue::Parts(
                parts
                    .iter()
                    .map(|part| match part {
                        ValuePart::Literal(text) => CPart::Literal(text.clone()),
                        ValuePart::Expression(expr) => CPart::Expr(self.lower_expr(&expr.ast)),
                    })
                    .collect(),
            ),
        }
    }

    fn lower_expr(&mut self, ast: &AST) -> CExpr {
        ast.visit(self)
    }

    // Resolution

    fn resolve_identifier(&mut self, name: &str, span: ParseSourceSpan) -> CExpr {
        if let Some(slot) = self.lookup_local(name) {
            return CExpr::new(CExprKind::Local(slot), span);
        }
        if let Some(param) = self.params.get_mut(name) {
            param.used = true;
            return CExpr::new(CExprKind::Local(param.slot), span);
        }

        if self.options.strict_parameters {
            self.diagnostics.error(
                codes::UNDECLARED_IDENTIFIER,
                Some(&span),
                format!("'{}' is not declared; add '@param {}'", name, name),
            );
            return CExpr::new(CExprKind::Const(Value::Null), span);
        }

        if self.options.optimization_level == OptimizationLevel::Debug {
            self.diagnostics.info(
                codes::IMPLICIT_PARAMETER,
                Some(&span),
                format!("'{}' is bound as an implicit parameter", name),
            );
        }
        let slot = self.allocate_slot();
        self.params.insert(
            name.to_string(),
            ParamState {
                slot,
                declared: false,
                used: true,
                span: None,
            },
        );
        CExpr::new(CExprKind::Local(slot), span)
    }

    fn resolve_function(&mut self, name: &str, argc: usize, span: &ParseSourceSpan) -> Option<Arc<HelperFunction>> {
        let mut component = None;
        for module in self.modules {
            for index in module.lookup(name) {
                match module.symbol(index).map(|symbol| (symbol.name(), symbol.kind())) {
                    Some((_, SymbolKind::Function(function))) => {
                        if !function.accepts(argc) {
                            let arity = function.arity();
                            let expected = if arity.start() == arity.end() {
                                arity.start().to_string()
                            } else {
                                format!("{} to {}", arity.start(), arity.end())
                            };
                            self.diagnostics.error(
                                codes::WRONG_ARITY,
                                Some(span),
                                format!("Function '{}' expects {} argument(s) but got {}", name, expected, argc),
                            );
                            return None;
                        }
                        return Some(Arc::clone(function));
                    }
                    Some((full_name, SymbolKind::Component(_))) => {
                        component.get_or_insert_with(|| full_name.to_string());
                    }
                    None => {}
                }
            }
        }

        match component {
            Some(full_name) => self.diagnostics.error(
                codes::WRONG_SYMBOL_KIND,
                Some(span),
                format!("'{}' is the component type '{}', not a function", name, full_name),
            ),
            None => self.diagnostics.error(
                codes::UNKNOWN_FUNCTION,
                Some(span),
                format!("Unknown function '{}'", name),
            ),
        }
        None
    }

    fn resolve_component(&mut self, name: &str, span: &ParseSourceSpan) -> Option<TypeHandle> {
        let mut components = Vec::new();
        let mut functions = Vec::new();
        for module in self.modules {
            for index in module.lookup(name) {
                match module.symbol(index) {
                    Some(symbol) if symbol.is_component() => {
                        components.extend(module.handle(index));
                    }
                    Some(symbol) => functions.push(symbol.name().to_string()),
                    None => {}
                }
            }
        }

        match components.len() {
            1 => components.pop(),
            0 => {
                match functions.first() {
                    Some(function) => self.diagnostics.error(
                        codes::WRONG_SYMBOL_KIND,
                        Some(span),
                        format!("'{}' is the function '{}', not a component type", name, function),
                    ),
                    None => self.diagnostics.error(
                        codes::UNRESOLVED_COMPONENT,
                        Some(span),
                        format!("Unresolved component <{}>", name),
                    ),
                }
                None
            }
            _ => {
                let candidates: Vec<&str> = components.iter().map(|h| h.name()).collect();
                self.diagnostics.error(
                    codes::AMBIGUOUS_REFERENCE,
                    Some(span),
                    format!(
                        "Component reference <{}> is ambiguous between {}",
                        name,
                        candidates.join(", ")
                    ),
                );
                None
            }
        }
    }
}

impl AstVisitor for Lowerer<'_> {
    type Result = CExpr;

    fn visit_literal_primitive(&mut self, ast: &LiteralPrimitive) -> CExpr {
        let value = match &ast.value {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Bool(*b),
            Literal::Integer(i) => Value::Int(*i),
            Literal::Float(f) => Value::Float(*f),
            Literal::String(s) => Value::Str(s.clone()),
        };
        CExpr::new(CExprKind::Const(value), self.span(ast.source_span))
    }

    fn visit_literal_array(&mut self, ast: &LiteralArray) -> CExpr {
        let items = ast.expressions.iter().map(|item| item.visit(self)).collect();
        CExpr::new(CExprKind::List(items), self.span(ast.source_span))
    }

    fn visit_identifier(&mut self, ast: &Identifier) -> CExpr {
        let span = self.span(ast.source_span);
        self.resolve_identifier(&ast.name, span)
    }

    fn visit_property_read(&mut self, ast: &PropertyRead) -> CExpr {
        let receiver = ast.receiver.visit(self);
        CExpr::new(
            CExprKind::Member(Box::new(receiver), ast.name.clone()),
            self.span(ast.source_span),
        )
    }

    fn visit_keyed_read(&mut self, ast: &KeyedRead) -> CExpr {
        let receiver = ast.receiver.visit(self);
        let key = ast.key.visit(self);
        CExpr::new(
            CExprKind::Index(Box::new(receiver), Box::new(key)),
            self.span(ast.source_span),
        )
    }

    fn visit_call(&mut self, ast: &Call) -> CExpr {
        let span = self.span(ast.source_span);
        let name_span = self.span(ast.name_span);
        let args: Vec<CExpr> = ast.args.iter().map(|arg| arg.visit(self)).collect();
        match self.resolve_function(&ast.name, args.len(), &name_span) {
            Some(function) => CExpr::new(CExprKind::Call(function, args), span),
            None => CExpr::new(CExprKind::Const(Value::Null), span),
        }
    }

    fn visit_unary(&mut self, ast: &Unary) -> CExpr {
        let expr = ast.expr.visit(self);
        CExpr::new(
            CExprKind::Unary(ast.operator, Box::new(expr)),
            self.span(ast.source_span),
        )
    }

    fn visit_binary(&mut self, ast: &Binary) -> CExpr {
        let left = ast.left.visit(self);
        let right = ast.right.visit(self);
        CExpr::new(
            CExprKind::Binary(ast.operation, Box::new(left), Box::new(right)),
            self.span(ast.source_span),
        )
    }

    fn visit_conditional(&mut self, ast: &Conditional) -> CExpr {
        let condition = ast.condition.visit(self);
        let yes = ast.true_exp.visit(self);
        let no = ast.false_exp.visit(self);
        CExpr::new(
            CExprKind::Conditional(Box::new(condition), Box::new(yes), Box::new(no)),
            self.span(ast.source_span),
        )
    }
}
