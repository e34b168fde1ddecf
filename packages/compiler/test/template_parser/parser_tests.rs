/**
 * Template Parser Tests
 *
 * Markup and code transitions, blocks, directives, components and error
 * reporting of the template parser.
 */

#[cfg(test)]
mod tests {
    use quill_compiler::template_parser::{
        AttributeValuePart, DirectiveKind, Node, TemplateDocument, TemplateParser,
    };
    use quill_compiler::SyntaxError;

    fn parse(source: &str) -> TemplateDocument {
        TemplateParser::new()
            .parse(source, "test.quill")
            .unwrap_or_else(|e| panic!("Failed to parse {:?}:\n{}", source, e))
    }

    fn parse_errors(source: &str) -> SyntaxError {
        match TemplateParser::new().parse(source, "test.quill") {
            Ok(doc) => panic!("Expected {:?} to fail, got {:?}", source, doc.nodes),
            Err(err) => err,
        }
    }

    fn expect_error(source: &str, fragment: &str) {
        let err = parse_errors(source);
        assert!(
            err.errors.iter().any(|e| e.msg.contains(fragment)),
            "Expected an error containing {:?}, got:\n{}",
            fragment,
            err
        );
    }

    fn text_of(node: &Node) -> &str {
        match node {
            Node::Text(text) => &text.value,
            other => panic!("Expected text, got {:?}", other),
        }
    }

    fn expression_of(node: &Node) -> &str {
        match node {
            Node::Expression(expr) => &expr.source,
            other => panic!("Expected expression, got {:?}", other),
        }
    }

    mod text_and_expressions {
        use super::*;

        #[test]
        fn should_parse_an_empty_template() {
            assert!(parse("").is_empty());
        }

        #[test]
        fn should_split_text_around_implicit_expressions() {
            let doc = parse("Hello @name!");
            assert_eq!(doc.nodes.len(), 3);
            assert_eq!(text_of(&doc.nodes[0]), "Hello ");
            assert_eq!(expression_of(&doc.nodes[1]), "name");
            assert_eq!(text_of(&doc.nodes[2]), "!");
        }

        #[test]
        fn should_extend_implicit_expressions_over_member_index_and_call() {
            let doc = parse("@items[0].name.upper() done");
            assert_eq!(expression_of(&doc.nodes[0]), "items[0].name.upper()");
            assert_eq!(text_of(&doc.nodes[1]), " done");
        }

        #[test]
        fn should_parse_explicit_expressions() {
            let doc = parse("<b>@(a + b)</b>");
            match &doc.nodes[0] {
                Node::Element(el) => assert_eq!(expression_of(&el.children[0]), "a + b"),
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_keep_parentheses_inside_strings_balanced() {
            let doc = parse("@(\"(\" + x)");
            assert_eq!(expression_of(&doc.nodes[0]), "\"(\" + x");
        }

        #[test]
        fn should_treat_escaped_and_email_at_signs_as_text() {
            let doc = parse("a @@ b, mail me@example.com");
            assert_eq!(doc.nodes.len(), 1);
            assert_eq!(text_of(&doc.nodes[0]), "a @ b, mail me@example.com");
        }

        #[test]
        fn should_drop_template_comments() {
            let doc = parse("a @* hidden @x *@b");
            let text: String = doc.nodes.iter().map(text_of).collect();
            assert_eq!(text, "a b");
        }

        #[test]
        fn should_keep_html_comments_verbatim() {
            let doc = parse("<!-- @x --><!DOCTYPE html>");
            assert_eq!(doc.nodes.len(), 1);
            assert_eq!(text_of(&doc.nodes[0]), "<!-- @x --><!DOCTYPE html>");
        }
    }

    mod elements {
        use super::*;

        #[test]
        fn should_nest_elements() {
            let doc = parse("<ul><li>a</li><li>b</li></ul>");
            match &doc.nodes[0] {
                Node::Element(ul) => {
                    assert_eq!(ul.name, "ul");
                    assert_eq!(ul.children.len(), 2);
                    assert!(ul.end_source_span.is_some());
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_not_expect_end_tags_for_void_elements() {
            let doc = parse("<br><img src=\"a.png\"><input disabled/>");
            assert_eq!(doc.nodes.len(), 3);
            for node in &doc.nodes {
                match node {
                    Node::Element(el) => assert!(el.children.is_empty()),
                    other => panic!("unexpected {:?}", other),
                }
            }
        }

        #[test]
        fn should_parse_attribute_forms() {
            let doc = parse("<a href=\"/u/@id\" disabled class=big title='x &amp; y'>go</a>");
            let el = match &doc.nodes[0] {
                Node::Element(el) => el,
                other => panic!("unexpected {:?}", other),
            };
            assert_eq!(el.attrs.len(), 4);

            let href = el.attrs[0].value.as_ref().unwrap();
            assert!(matches!(&href[0], AttributeValuePart::Text(t) if t == "/u/"));
            assert!(matches!(&href[1], AttributeValuePart::Expression(e) if e.source == "id"));

            assert_eq!(el.attrs[1].name, "disabled");
            assert!(el.attrs[1].value.is_none());

            let class = el.attrs[2].value.as_ref().unwrap();
            assert!(matches!(&class[..], [AttributeValuePart::Text(t)] if t == "big"));

            let title = el.attrs[3].value.as_ref().unwrap();
            assert!(matches!(&title[..], [AttributeValuePart::Text(t)] if t == "x & y"));
        }

        #[test]
        fn should_allow_quotes_inside_explicit_attribute_expressions() {
            let doc = parse("<p class=\"@(on ? \"a\" : \"b\")\"></p>");
            match &doc.nodes[0] {
                Node::Element(el) => {
                    let parts = el.attrs[0].value.as_ref().unwrap();
                    assert_eq!(parts.len(), 1);
                    assert!(matches!(&parts[0], AttributeValuePart::Expression(_)));
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_read_script_markup_as_text_and_code_as_expressions() {
            let doc = parse("<script>if (a < b) { say(\"@x\"); }</script>");
            match &doc.nodes[0] {
                Node::Element(el) => {
                    assert_eq!(el.children.len(), 3);
                    assert_eq!(text_of(&el.children[0]), "if (a < b) { say(\"");
                    match &el.children[1] {
                        Node::Expression(expr) => assert_eq!(expr.source, "x"),
                        other => panic!("unexpected {:?}", other),
                    }
                    assert_eq!(text_of(&el.children[2]), "\"); }");
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_keep_escaped_and_embedded_at_signs_in_style() {
            let doc = parse("<style>@@media print { a[href^=\"mailto:me@x\"] { } }</style>");
            match &doc.nodes[0] {
                Node::Element(el) => {
                    assert_eq!(el.children.len(), 1);
                    assert_eq!(
                        text_of(&el.children[0]),
                        "@media print { a[href^=\"mailto:me@x\"] { } }"
                    );
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_parse_blocks_inside_script() {
            let doc = parse("<SCRIPT>var on = @if (a) {true} else {false};</script>");
            match &doc.nodes[0] {
                Node::Element(el) => {
                    assert_eq!(el.children.len(), 3);
                    assert!(matches!(el.children[1], Node::If(_)));
                    assert_eq!(text_of(&el.children[2]), ";");
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_report_unclosed_script() {
            expect_error("<script>var a = @x;", "Unclosed element <script>");
        }
    }

    mod components {
        use super::*;

        #[test]
        fn should_parse_component_references() {
            let doc = parse("<Greeting Name=\"@user\" Punctuation=\"!\" />");
            match &doc.nodes[0] {
                Node::Component(component) => {
                    assert_eq!(component.component_name, "Greeting");
                    assert_eq!(component.attrs.len(), 2);
                    assert_eq!(component.attrs[0].name, "Name");
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_allow_whitespace_between_component_tags() {
            let doc = parse("<Card>  </Card>");
            assert!(matches!(&doc.nodes[0], Node::Component(c) if c.component_name == "Card"));
        }

        #[test]
        fn should_reject_component_child_content() {
            expect_error("<Card><p>x</p></Card>", "Component <Card> cannot have child content");
        }
    }

    mod blocks {
        use super::*;

        #[test]
        fn should_parse_if_else_chains() {
            let doc = parse("@if (a) {x} else if (b) {y} else {z}");
            match &doc.nodes[0] {
                Node::If(block) => {
                    assert_eq!(block.branches.len(), 2);
                    assert_eq!(block.branches[0].condition.source, "a");
                    assert_eq!(block.branches[1].condition.source, "b");
                    let else_children = block.else_children.as_ref().unwrap();
                    assert_eq!(text_of(&else_children[0]), "z");
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_parse_foreach() {
            let doc = parse("<ul>@foreach (var item in items) {<li>@item</li>}</ul>");
            let ul = match &doc.nodes[0] {
                Node::Element(el) => el,
                other => panic!("unexpected {:?}", other),
            };
            match &ul.children[0] {
                Node::ForEach(block) => {
                    assert_eq!(block.item, "item");
                    assert_eq!(block.iterable.source, "items");
                    assert_eq!(block.children.len(), 1);
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_accept_foreach_without_var() {
            let doc = parse("@foreach (n in range(3)) {@n}");
            assert!(matches!(&doc.nodes[0], Node::ForEach(b) if b.item == "n" && b.iterable.source == "range(3)"));
        }

        #[test]
        fn should_parse_let() {
            let doc = parse("@let total = price * (1 + rate);<p>@total</p>");
            match &doc.nodes[0] {
                Node::Let(decl) => {
                    assert_eq!(decl.name, "total");
                    assert_eq!(decl.value.source.trim(), "price * (1 + rate)");
                }
                other => panic!("unexpected {:?}", other),
            }
            assert!(matches!(&doc.nodes[1], Node::Element(_)));
        }

        #[test]
        fn should_allow_semicolons_in_let_strings() {
            let doc = parse("@let s = \"a;b\";");
            assert!(matches!(&doc.nodes[0], Node::Let(decl) if decl.value.source.trim() == "\"a;b\""));
        }
    }

    mod directives {
        use super::*;

        #[test]
        fn should_parse_directives_in_order() {
            let doc = parse("@page \"/home\"\n@namespace My.App\n@param Title\n<h1>@Title</h1>");
            let kinds: Vec<&DirectiveKind> = doc.directives().map(|d| &d.kind).collect();
            assert_eq!(
                kinds,
                vec![
                    &DirectiveKind::Page {
                        route: Some("/home".to_string())
                    },
                    &DirectiveKind::Namespace("My.App".to_string()),
                    &DirectiveKind::Param("Title".to_string()),
                ]
            );
            assert!(matches!(doc.nodes.last(), Some(Node::Element(_))));
        }

        #[test]
        fn should_accept_page_without_route() {
            let doc = parse("@page\nhi");
            assert!(matches!(&doc.nodes[0], Node::Directive(d) if d.kind == (DirectiveKind::Page { route: None })));
        }

        #[test]
        fn should_reject_invalid_directive_arguments() {
            expect_error("@page /home\n", "Expected a quoted route after @page");
            expect_error("@namespace 1bad\n", "Invalid namespace");
            expect_error("@param two words\n", "Expected a parameter name after @param");
        }

        #[test]
        fn should_reject_directives_inside_blocks() {
            expect_error("@if (a) {\n@param X\n}", "Directive @param is only allowed at the top level");
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_report_a_lone_transition() {
            expect_error("cost: @ 5", "Unexpected ' ' after '@'");
            expect_error("end @", "Unexpected end of input after '@'");
        }

        #[test]
        fn should_report_mismatched_end_tags() {
            expect_error("<div></span>", "Unexpected closing tag \"span\"; expected </div>");
            expect_error("</div>", "Unexpected closing tag \"div\"");
        }

        #[test]
        fn should_report_unclosed_elements_and_blocks() {
            expect_error("<div>", "Unclosed element <div>");
            expect_error("@if (a) { x", "Unterminated @if block");
            expect_error("@(a + b", "Unterminated expression");
            expect_error("@let x = 1", "@let x is missing a closing ';'");
        }

        #[test]
        fn should_report_invalid_foreach_headers() {
            expect_error("@foreach (items) {}", "Invalid @foreach header");
        }

        #[test]
        fn should_report_stray_else() {
            expect_error("@else {}", "Unexpected 'else' without a preceding @if");
        }

        #[test]
        fn should_report_expression_errors() {
            expect_error("@(a +)", "Parser Error");
        }

        #[test]
        fn should_locate_errors() {
            let err = TemplateParser::new().parse("\n\n  @(", "page.quill").unwrap_err();
            let first = err.errors[0].to_string();
            assert!(first.starts_with("page.quill@3:3"), "unexpected location in {}", first);
        }

        #[test]
        fn should_collect_every_error() {
            let err = parse_errors("<div></span> @ ");
            assert_eq!(err.errors.len(), 2, "{}", err);
        }
    }
}
