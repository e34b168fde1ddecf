/**
 * Emitter Tests
 *
 * Lowering of template documents into generated component types: naming,
 * namespaces, capabilities, parameters and statement shapes.
 */

#[cfg(test)]
mod tests {
    use quill_compiler::output::{
        EmitOptions, Emitter, GeneratedSource, Statement, ValueExpr, ValuePart, DEFAULT_NAMESPACE,
    };
    use quill_compiler::{EmitError, TemplateParser};
    use quill_runtime::BaseCapability;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn emit_with(source: &str, options: &EmitOptions) -> Result<GeneratedSource, EmitError> {
        let doc = TemplateParser::new().parse(source, "test.quill").unwrap();
        Emitter::new().emit(&doc, options)
    }

    fn emit(source: &str) -> GeneratedSource {
        emit_with(source, &EmitOptions::default()).unwrap()
    }

    fn named(name: &str) -> EmitOptions {
        EmitOptions {
            class_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    mod naming {
        use super::*;

        #[test]
        fn should_use_the_requested_class_name() {
            let generated = emit_with("x", &named("Card")).unwrap();
            assert_eq!(generated.class.name, "Card");
            assert_eq!(generated.full_name(), format!("{}.Card", DEFAULT_NAMESPACE));
        }

        #[test]
        fn should_generate_unique_names_across_threads() {
            let emitter = Arc::new(Emitter::new());
            let doc = Arc::new(TemplateParser::new().parse("x", "t").unwrap());
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let emitter = Arc::clone(&emitter);
                    let doc = Arc::clone(&doc);
                    thread::spawn(move || {
                        (0..25)
                            .map(|_| emitter.emit(&doc, &EmitOptions::default()).unwrap().class.name)
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            let mut names = HashSet::new();
            for handle in handles {
                for name in handle.join().unwrap() {
                    assert!(name.starts_with("Template_"), "unexpected name {}", name);
                    assert!(names.insert(name), "generated name issued twice");
                }
            }
            assert_eq!(names.len(), 200);
        }

        #[test]
        fn should_reject_invalid_class_names() {
            for bad in ["", "1st", "has space", "a.b", "with-dash"] {
                let err = emit_with("x", &named(bad)).unwrap_err();
                assert_eq!(err, EmitError::InvalidClassName(bad.to_string()));
            }
        }

        #[test]
        fn should_reject_invalid_namespaces() {
            let options = EmitOptions {
                namespace: Some("My..App".to_string()),
                ..Default::default()
            };
            let err = emit_with("x", &options).unwrap_err();
            assert_eq!(err, EmitError::InvalidNamespace("My..App".to_string()));
        }
    }

    mod directives {
        use super::*;

        #[test]
        fn should_default_to_a_component_in_the_default_namespace() {
            let generated = emit("<p>x</p>");
            assert_eq!(generated.class.namespace, DEFAULT_NAMESPACE);
            assert_eq!(generated.class.base, BaseCapability::Component);
            assert!(generated.class.route.is_none());
        }

        #[test]
        fn should_take_the_namespace_directive() {
            let generated = emit("@namespace Shop.Views\nx");
            assert_eq!(generated.class.namespace, "Shop.Views");
        }

        #[test]
        fn should_prefer_caller_options_over_directives() {
            let options = EmitOptions {
                class_name: None,
                namespace: Some("App".to_string()),
                base_capability: Some(BaseCapability::Component),
            };
            let generated = emit_with("@page \"/a\"\n@namespace Shop\nx", &options).unwrap();
            assert_eq!(generated.class.namespace, "App");
            assert_eq!(generated.class.base, BaseCapability::Component);
            assert_eq!(generated.class.route.as_deref(), Some("/a"));
        }

        #[test]
        fn should_make_pages_from_page_directives() {
            let generated = emit("@page\n<h1>Home</h1>");
            assert_eq!(generated.class.base, BaseCapability::Page);
            assert!(generated.class.route.is_none());
        }

        #[test]
        fn should_collect_parameters_in_order() {
            let generated = emit("@param Title\n@param Items\n@Title");
            let names: Vec<&str> = generated.class.parameters.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, vec!["Title", "Items"]);
            assert!(generated.class.declares("Items"));
            assert!(!generated.class.declares("Other"));
        }

        #[test]
        fn should_reject_duplicate_parameters() {
            let err = emit_with("@param A\n@param A\n", &EmitOptions::default()).unwrap_err();
            match err {
                EmitError::DuplicateParameter { name, location } => {
                    assert_eq!(name, "A");
                    assert_eq!(location, "test.quill@2:1");
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_reject_repeated_directives() {
            let err = emit_with("@namespace A\n@namespace B\n", &EmitOptions::default()).unwrap_err();
            assert!(matches!(err, EmitError::DuplicateDirective { directive: "namespace", .. }));
            let err = emit_with("@page\n@page \"/x\"\n", &EmitOptions::default()).unwrap_err();
            assert!(matches!(err, EmitError::DuplicateDirective { directive: "page", .. }));
        }
    }

    mod statements {
        use super::*;

        #[test]
        fn should_emit_nothing_for_an_empty_template() {
            assert!(emit("").class.body.is_empty());
        }

        #[test]
        fn should_balance_element_statements() {
            let body = emit("<div><br><span>a</span></div>").class.body;
            let opens = body.iter().filter(|s| matches!(s, Statement::OpenElement { .. })).count();
            let closes = body.iter().filter(|s| matches!(s, Statement::CloseElement { .. })).count();
            assert_eq!(opens, 3);
            assert_eq!(closes, 3);
            assert!(matches!(body.last(), Some(Statement::CloseElement { name }) if name == "div"));
        }

        #[test]
        fn should_lower_attribute_values() {
            let body = emit("<input checked value=\"@v\" title=\"a @b c\" name=\"n\">").class.body;
            let values: Vec<&ValueExpr> = body
                .iter()
                .filter_map(|s| match s {
                    Statement::AddAttribute { value, .. } => Some(value),
                    _ => None,
                })
                .collect();
            assert_eq!(values.len(), 4);
            assert!(matches!(values[0], ValueExpr::Present));
            assert!(matches!(values[1], ValueExpr::Single(e) if e.source == "v"));
            match values[2] {
                ValueExpr::Interpolated(parts) => {
                    assert_eq!(parts.len(), 3);
                    assert!(matches!(&parts[0], ValuePart::Literal(t) if t == "a "));
                    assert!(matches!(&parts[2], ValuePart::Literal(t) if t == " c"));
                }
                other => panic!("unexpected {:?}", other),
            }
            assert!(matches!(values[3], ValueExpr::Literal(t) if t == "n"));
        }

        #[test]
        fn should_lower_component_references() {
            let body = emit("<Greeting Name=\"@user\" Loud />").class.body;
            match &body[0] {
                Statement::RenderComponent {
                    type_ref, parameters, ..
                } => {
                    assert_eq!(type_ref, "Greeting");
                    assert_eq!(parameters.len(), 2);
                    assert_eq!(parameters[0].name, "Name");
                    assert!(matches!(parameters[1].value, ValueExpr::Present));
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_lower_blocks() {
            let body = emit("@let x = 1;@if (x) {a} else {b}@foreach (i in xs) {@i}").class.body;
            assert!(matches!(&body[0], Statement::Let { name, .. } if name == "x"));
            assert!(matches!(&body[1], Statement::If { arms, else_body: Some(_), .. } if arms.len() == 1));
            assert!(matches!(&body[2], Statement::ForEach { variable, body, .. } if variable == "i" && body.len() == 1));
        }

        #[test]
        fn should_drop_directives_from_the_body() {
            let body = emit("@param A\n@namespace N\nhi").class.body;
            assert_eq!(body.len(), 1);
            assert!(matches!(&body[0], Statement::WriteMarkup { text, .. } if text == "hi"));
        }
    }
}
