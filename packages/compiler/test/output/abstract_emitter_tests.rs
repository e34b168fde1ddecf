/**
 * Abstract Emitter Tests
 *
 * Line buffer behavior and the printed form of generated types.
 */

#[cfg(test)]
mod tests {
    use quill_compiler::output::{print_class, EmitOptions, Emitter, EmitterVisitorContext};
    use quill_compiler::TemplateParser;

    fn print(source: &str, class_name: &str) -> String {
        let doc = TemplateParser::new().parse(source, "test.quill").unwrap();
        let options = EmitOptions {
            class_name: Some(class_name.to_string()),
            ..Default::default()
        };
        let generated = Emitter::new().emit(&doc, &options).unwrap();
        assert_eq!(
            generated.source_text,
            print_class(&generated.class),
            "Emitter output should match the printer"
        );
        generated.source_text
    }

    mod context {
        use super::*;

        #[test]
        fn should_join_parts_of_one_line() {
            let mut ctx = EmitterVisitorContext::create_root();
            ctx.print("let ", false);
            ctx.print("x", false);
            ctx.println(" = 1;");
            ctx.println("y;");
            assert_eq!(ctx.to_source(), "let x = 1;\ny;");
        }

        #[test]
        fn should_indent_nested_lines() {
            let mut ctx = EmitterVisitorContext::create_root();
            ctx.println("a {");
            ctx.inc_indent();
            ctx.println("b {");
            ctx.inc_indent();
            ctx.println("c;");
            ctx.dec_indent();
            ctx.println("}");
            ctx.dec_indent();
            ctx.println("}");
            assert_eq!(ctx.to_source(), "a {\n  b {\n    c;\n  }\n}");
        }

        #[test]
        fn should_keep_blank_lines() {
            let mut ctx = EmitterVisitorContext::create_root();
            ctx.println("a;");
            ctx.println("");
            ctx.println("b;");
            assert_eq!(ctx.to_source(), "a;\n\nb;");
        }

        #[test]
        fn should_report_line_state() {
            let mut ctx = EmitterVisitorContext::new(2);
            assert!(ctx.line_is_empty());
            ctx.print("abc", false);
            assert!(!ctx.line_is_empty());
            assert_eq!(ctx.line_length(), 7);
        }

        #[test]
        fn should_remove_an_empty_last_line() {
            let mut ctx = EmitterVisitorContext::create_root();
            ctx.println("a;");
            ctx.remove_empty_last_line();
            assert!(!ctx.line_is_empty());
            assert_eq!(ctx.to_source(), "a;");
        }
    }

    mod classes {
        use super::*;

        #[test]
        fn should_print_a_component_with_parameters() {
            let source = print("@param Name\n<h1 class=\"big\">Hello, @Name!</h1>", "Greeting");
            let expected = [
                "namespace Quill.Generated;",
                "",
                "class Greeting : Component {",
                "  param Name;",
                "",
                "  fn build_render_tree(builder) {",
                "    builder.open_element(\"h1\");",
                "    builder.add_attribute(\"class\", \"big\");",
                "    builder.add_markup(\"Hello, \");",
                "    builder.add_content(Name);",
                "    builder.add_markup(\"!\");",
                "    builder.close_element();",
                "  }",
                "}",
            ]
            .join("\n");
            assert_eq!(source, expected);
        }

        #[test]
        fn should_print_a_page_with_control_flow() {
            let template = concat!(
                "@page \"/items\"\n",
                "@namespace Shop\n",
                "@let n = len(items);",
                "@if (n > 0) {<ul>@foreach (var item in items) {",
                "<li class=\"row-@item.id\" hidden>@item.name</li>}</ul>}",
                " else {<Empty Label=\"none\" />}",
            );
            let source = print(template, "Listing");
            let expected = [
                "namespace Shop;",
                "",
                "#[route(\"/items\")]",
                "class Listing : Page {",
                "  fn build_render_tree(builder) {",
                "    let n = len(items);",
                "    if (n > 0) {",
                "      builder.open_element(\"ul\");",
                "      foreach (var item in items) {",
                "        builder.open_element(\"li\");",
                "        builder.add_attribute(\"class\", concat(\"row-\", string(item.id)));",
                "        builder.add_attribute(\"hidden\", true);",
                "        builder.add_content(item.name);",
                "        builder.close_element();",
                "      }",
                "      builder.close_element();",
                "    } else {",
                "      builder.add_component::<Empty>({ Label: \"none\" });",
                "    }",
                "  }",
                "}",
            ]
            .join("\n");
            assert_eq!(source, expected);
        }

        #[test]
        fn should_print_else_if_arms() {
            let source = print("@if (a) {1} else if (b) {2}", "Arms");
            assert!(source.contains("    if (a) {\n      builder.add_markup(\"1\");\n    } else if (b) {\n"));
        }

        #[test]
        fn should_escape_markup_literals() {
            let source = print("say \"hi\"\n\tnow", "Quote");
            assert!(source.contains(r#"builder.add_markup("say \"hi\"\n\tnow");"#));
        }

        #[test]
        fn should_print_an_empty_body() {
            let source = print("", "Empty");
            assert!(source.ends_with("  fn build_render_tree(builder) {\n  }\n}"));
        }
    }
}
