//! Code Emitter
//!
//! Lowers a parsed `TemplateDocument` into exactly one generated component
//! type and prints it as source text.

use crate::error::EmitError;
use crate::output::abstract_emitter::print_class;
use crate::output::output_ast::*;
use crate::template_parser::{AttributeValuePart, Attribute, DirectiveKind, Node, TemplateDocument};
use crate::util::{is_identifier, is_namespace};
use quill_runtime::BaseCapability;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

pub const DEFAULT_NAMESPACE: &str = "Quill.Generated";

/// Caller choices for one emit; unset fields fall back to the template's
/// directives, then to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitOptions {
    pub class_name: Option<String>,
    pub namespace: Option<String>,
    pub base_capability: Option<BaseCapability>,
}

/// Result of one emit: the generated type and its printed form.
#[derive(Debug, Clone)]
pub struct GeneratedSource {
    pub class: ClassDecl,
    pub source_text: String,
    pub options: EmitOptions,
}

impl GeneratedSource {
    pub fn full_name(&self) -> String {
        self.class.full_name()
    }
}

/// Emits generated types. Remembers every class name it generated so one
/// instance never hands out the same generated name twice.
#[derive(Debug, Default)]
pub struct Emitter {
    issued: Mutex<HashSet<String>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, doc: &TemplateDocument, options: &EmitOptions) -> Result<GeneratedSource, EmitError> {
        let name = match &options.class_name {
            Some(name) if !is_identifier(name) => return Err(EmitError::InvalidClassName(name.clone())),
            Some(name) => name.clone(),
            None => self.next_class_name(),
        };
        if let Some(namespace) = &options.namespace {
            if !is_namespace(namespace) {
                return Err(EmitError::InvalidNamespace(namespace.clone()));
            }
        }

        let mut directive_namespace = None;
        let mut page = None;
        let mut parameters: Vec<ParamDecl> = Vec::new();
        for directive in doc.directives() {
            let location = directive.source_span.start.to_string();
            match &directive.kind {
                DirectiveKind::Namespace(namespace) => {
                    if directive_namespace.replace(namespace.clone()).is_some() {
                        return Err(EmitError::DuplicateDirective {
                            directive: "namespace",
                            location,
                        });
                    }
                }
                DirectiveKind::Page { route } => {
                    if page.replace(route.clone()).is_some() {
                        return Err(EmitError::DuplicateDirective {
                            directive: "page",
                            location,
                        });
                    }
                }
                DirectiveKind::Param(param) => {
                    if parameters.iter().any(|p| &p.name == param) {
                        return Err(EmitError::DuplicateParameter {
                            name: param.clone(),
                            location,
                        });
                    }
                    parameters.push(ParamDecl {
                        name: param.clone(),
                        source_span: directive.source_span.clone(),
                    });
                }
            }
        }

        let namespace = options
            .namespace
            .clone()
            .or(directive_namespace)
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let base = options.base_capability.unwrap_or(if page.is_some() {
            BaseCapability::Page
        } else {
            BaseCapability::Component
        });

        let class = ClassDecl {
            namespace,
            name,
            base,
            parameters,
            route: page.flatten(),
            body: lower_nodes(&doc.nodes),
            source: doc.source.clone(),
        };
        let source_text = print_class(&class);
        Ok(GeneratedSource {
            class,
            source_text,
            options: options.clone(),
        })
    }

    fn next_class_name(&self) -> String {
        let mut issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            let name = format!("Template_{:016x}", rand::random::<u64>());
            if issued.insert(name.clone()) {
                return name;
            }
        }
    }
}

fn lower_nodes(nodes: &[Node]) -> Vec<Statement> {
    let mut body = Vec::with_capacity(nodes.len());
    for node in nodes {
        lower_node(node, &mut body);
    }
    body
}

fn lower_node(node: &Node, body: &mut Vec<Statement>) {
    match node {
        Node::Text(text) => body.push(Statement::WriteMarkup {
            text: text.value.clone(),
            source_span: text.source_span.clone(),
        }),
        Node::Expression(expr) => body.push(Statement::WriteExpression(expr.clone())),
        Node::Element(element) => {
            body.push(Statement::OpenElement {
                name: element.name.clone(),
                source_span: element.start_source_span.clone(),
            });
            for attr in &element.attrs {
                body.push(Statement::AddAttribute {
                    name: attr.name.clone(),
                    value: lower_value(attr),
                    source_span: attr.source_span.clone(),
                });
            }
            for child in &element.children {
                lower_node(child, body);
            }
            body.push(Statement::CloseElement {
                name: element.name.clone(),
            });
        }
        Node::Component(component) => body.push(Statement::RenderComponent {
            type_ref: component.component_name.clone(),
            parameters: component
                .attrs
                .iter()
                .map(|attr| ComponentParameter {
                    name: attr.name.clone(),
                    value: lower_value(attr),
                    source_span: attr.source_span.clone(),
                })
                .collect(),
            source_span: component.source_span.clone(),
        }),
        Node::If(block) => body.push(Statement::If {
            arms: block
                .branches
                .iter()
                .map(|branch| IfArm {
                    condition: branch.condition.clone(),
                    body: lower_nodes(&branch.children),
                })
                .collect(),
            else_body: block.else_children.as_deref().map(lower_nodes),
            source_span: block.source_span.clone(),
        }),
        Node::ForEach(block) => body.push(Statement::ForEach {
            variable: block.item.clone(),
            variable_span: block.item_span.clone(),
            iterable: block.iterable.clone(),
            body: lower_nodes(&block.children),
            source_span: block.source_span.clone(),
        }),
        Node::Let(decl) => body.push(Statement::Let {
            name: decl.name.clone(),
            name_span: decl.name_span.clone(),
            value: decl.value.clone(),
        }),
        Node::Directive(_) => {}
    }
}

fn lower_value(attr: &Attribute) -> ValueExpr {
    let parts = match &attr.value {
        None => return ValueExpr::Present,
        Some(parts) => parts,
    };
    match parts.as_slice() {
        [] => ValueExpr::Literal(String::new()),
        [AttributeValuePart::Text(text)] => ValueExpr::Literal(text.clone()),
        [AttributeValuePart::Expression(expr)] => ValueExpr::Single(expr.clone()),
        _ => ValueExpr::Interpolated(
            parts
                .iter()
                .map(|part| match part {
                    AttributeValuePart::Text(text) => ValuePart::Literal(text.clone()),
                    AttributeValuePart::Expression(expr) => ValuePart::Expression(expr.clone()),
                })
                .collect(),
        ),
    }
}
