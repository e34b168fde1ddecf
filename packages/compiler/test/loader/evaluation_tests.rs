/**
 * Evaluation Tests
 *
 * Expression semantics, control flow, locals and attribute rendering of
 * compiled templates. Every template is compiled at both optimization
 * levels and must render identically.
 */

#[cfg(test)]
mod tests {
    use quill_compiler::{CompileOptions, CompilerConfig, OptimizationLevel, TemplateCompiler};
    use quill_runtime::logging::MemoryLogger;
    use quill_runtime::{HtmlRenderer, ParameterSet, RenderError, RendererConfig, TypeHandle, Value};
    use serde_json::json;
    use std::sync::Arc;

    fn compile(source: &str, level: OptimizationLevel) -> TypeHandle {
        let compiler = TemplateCompiler::new(
            CompilerConfig::default().with_logger(Arc::new(MemoryLogger::default())),
        );
        // Both levels share a class name so error messages are comparable.
        let options = CompileOptions::new()
            .with_class_name("Eval")
            .with_optimization_level(level);
        let module = compiler
            .compile_module(source, "eval.quill", &options)
            .unwrap_or_else(|e| panic!("Failed to compile {:?}:\n{}", source, e));
        module.sole_component_type().unwrap()
    }

    fn renderer() -> HtmlRenderer {
        HtmlRenderer::new(RendererConfig::default().with_logger(Arc::new(MemoryLogger::default())))
    }

    fn try_render(source: &str, parameters: ParameterSet) -> [Result<String, RenderError>; 2] {
        let renderer = renderer();
        [OptimizationLevel::Debug, OptimizationLevel::Release]
            .map(|level| renderer.render(&compile(source, level), parameters.clone()))
    }

    fn render_with(source: &str, parameters: ParameterSet) -> String {
        let [debug, release] = try_render(source, parameters);
        let debug = debug.unwrap_or_else(|e| panic!("Failed to render {:?}: {}", source, e));
        let release = release.unwrap_or_else(|e| panic!("Failed to render {:?}: {}", source, e));
        assert_eq!(debug, release, "Optimization changed the output of {:?}", source);
        debug
    }

    fn render(source: &str) -> String {
        render_with(source, ParameterSet::new())
    }

    fn render_json(source: &str, parameters: serde_json::Value) -> String {
        render_with(source, ParameterSet::from_json(parameters).unwrap())
    }

    fn render_error(source: &str, parameters: ParameterSet) -> String {
        let [debug, release] = try_render(source, parameters);
        let debug = debug.expect_err("Debug render should fail").to_string();
        let release = release.expect_err("Release render should fail").to_string();
        assert_eq!(debug, release);
        debug
    }

    mod output {
        use super::*;

        #[test]
        fn should_render_an_empty_template_as_empty() {
            assert_eq!(render(""), "");
        }

        #[test]
        fn should_write_markup_verbatim() {
            assert_eq!(render("<p class=\"a\">x &amp; y</p>"), "<p class=\"a\">x &amp; y</p>");
        }

        #[test]
        fn should_escape_expression_output() {
            let params = ParameterSet::new().with("s", "<script>alert('x')</script> & \"q\"");
            assert_eq!(
                render_with("@s", params),
                "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; &quot;q&quot;"
            );
        }

        #[test]
        fn should_write_markup_values_unescaped() {
            assert_eq!(render("@raw(\"<i>x</i>\")"), "<i>x</i>");
            let params = ParameterSet::new().with("m", Value::markup("<b>bold</b>"));
            assert_eq!(render_with("@m", params), "<b>bold</b>");
        }

        #[test]
        fn should_render_null_as_nothing() {
            assert_eq!(render("[@missing]"), "[]");
        }

        #[test]
        fn should_render_lists_as_json() {
            assert_eq!(render("@([1, \"a\"])"), "[1,&quot;a&quot;]");
        }
    }

    mod operators {
        use super::*;

        #[test]
        fn should_evaluate_arithmetic() {
            assert_eq!(render("@(1 + 2 * 3)"), "7");
            assert_eq!(render("@((1 + 2) * 3)"), "9");
            assert_eq!(render("@(7 / 2)|@(7 % 3)|@(-4 + 1)"), "3|1|-3");
            assert_eq!(render("@(1 + 0.5)"), "1.5");
        }

        #[test]
        fn should_concatenate_strings() {
            assert_eq!(render("@(\"n=\" + 3)"), "n=3");
            let params = ParameterSet::new().with("name", "Ada");
            assert_eq!(render_with("@(\"Hi \" + name + \"!\")", params), "Hi Ada!");
        }

        #[test]
        fn should_compare_values() {
            assert_eq!(render("@(1 < 2) @(2 <= 1) @(\"a\" < \"b\") @(1 == 1.0) @(\"1\" == 1)"), "true false true true false");
        }

        #[test]
        fn should_short_circuit_logical_operators() {
            assert_eq!(render("@(0 && nope.x) @(1 || nope.x) @(\"a\" && [1])"), "false true true");
        }

        #[test]
        fn should_coalesce_only_null() {
            assert_eq!(render("@(missing ?? \"d\") @(0 ?? 5) @(\"\" ?? \"e\")"), "d 0 ");
        }

        #[test]
        fn should_evaluate_conditionals() {
            let params = ParameterSet::new().with("flag", false);
            assert_eq!(render_with("@(flag ? \"yes\" : \"no\")", params), "no");
            assert_eq!(render("@(!missing)"), "true");
        }
    }

    mod access {
        use super::*;

        #[test]
        fn should_read_members_and_indexes() {
            let html = render_json(
                "@user.name/@user.tags[1]/@user[\"name\"]/@user.missing/@user.name[0]",
                json!({ "user": { "name": "Ada", "tags": ["x", "y"] } }),
            );
            assert_eq!(html, "Ada/y/Ada//A");
        }

        #[test]
        fn should_call_helpers_with_method_syntax() {
            let params = ParameterSet::new().with("title", "  Hello ");
            assert_eq!(render_with("@title.trim().upper()", params), "HELLO");
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_fail_on_division_by_zero_with_location() {
            let message = render_error("<p>\n @(1 / 0)</p>", ParameterSet::new());
            assert!(message.contains("eval.quill@2:4: Division by zero"), "{}", message);
            assert!(message.contains("'Quill.Generated.Eval'"), "{}", message);
        }

        #[test]
        fn should_fail_on_member_of_a_non_map() {
            let message = render_error("@n.x", ParameterSet::new().with("n", 3));
            assert!(message.contains("Cannot read member 'x' of int"), "{}", message);
        }

        #[test]
        fn should_fail_on_out_of_bounds_index() {
            let message = render_error("@(items[5])", ParameterSet::new().with("items", vec![1, 2]));
            assert!(message.contains("Index 5 is out of bounds for a list of length 2"), "{}", message);
        }

        #[test]
        fn should_fail_on_iterating_a_scalar() {
            let message = render_error("@foreach (x in n) {@x}", ParameterSet::new().with("n", 1));
            assert!(message.contains("Cannot iterate over int"), "{}", message);
        }

        #[test]
        fn should_name_the_failing_helper() {
            let message = render_error("@join(1, \",\")", ParameterSet::new());
            assert!(message.contains("join(): expected a list, got int"), "{}", message);
        }
    }

    mod control_flow {
        use super::*;

        #[test]
        fn should_take_the_first_truthy_arm() {
            let source = "@if (n > 10) {big} else if (n > 0) {small} else {none}";
            assert_eq!(render_with(source, ParameterSet::new().with("n", 50)), "big");
            assert_eq!(render_with(source, ParameterSet::new().with("n", 3)), "small");
            assert_eq!(render_with(source, ParameterSet::new().with("n", 0)), "none");
        }

        #[test]
        fn should_apply_truthiness() {
            let source = "@if (v) {T} else {F}";
            let cases: Vec<(Value, &str)> = vec![
                (Value::Null, "F"),
                (Value::from(""), "F"),
                (Value::from("x"), "T"),
                (Value::from(0), "F"),
                (Value::from(0.0), "F"),
                (Value::List(vec![]), "F"),
                (Value::from(vec![1]), "T"),
            ];
            for (value, expected) in cases {
                let debug = format!("{:?}", value);
                assert_eq!(render_with(source, ParameterSet::new().with("v", value)), expected, "{}", debug);
            }
        }

        #[test]
        fn should_fold_constant_conditions() {
            assert_eq!(render("[@if (true) {b} else {c}|@if (false) {e}]"), "[b|]");
        }

        #[test]
        fn should_iterate_lists() {
            let html = render_json(
                "<ul>@foreach (var item in items) {<li>@item</li>}</ul>",
                json!({ "items": ["a", "<b>"] }),
            );
            assert_eq!(html, "<ul><li>a</li><li>&lt;b&gt;</li></ul>");
        }

        #[test]
        fn should_render_nothing_for_empty_lists() {
            assert_eq!(render_json("<ul>@foreach (i in items) {<li>@i</li>}</ul>", json!({ "items": [] })), "<ul></ul>");
        }

        #[test]
        fn should_iterate_map_entries_in_order() {
            let html = render_json(
                "@foreach (e in m) {@e.key=@e.value;}",
                json!({ "m": { "b": 1, "a": 2 } }),
            );
            assert_eq!(html, "b=1;a=2;");
        }

        #[test]
        fn should_nest_loops() {
            assert_eq!(render("@foreach (i in range(2)) {@foreach (j in range(2)) {@(i)@(j) }}"), "00 01 10 11 ");
        }
    }

    mod locals {
        use super::*;

        #[test]
        fn should_bind_let_values() {
            let params = ParameterSet::new().with("price", 4).with("qty", 3);
            assert_eq!(render_with("@let total = price * qty;Total: @total", params), "Total: 12");
        }

        #[test]
        fn should_rebind_let_per_iteration() {
            assert_eq!(render("@foreach (i in range(3)) {@let sq = i * i;@sq,}"), "0,1,4,");
        }

        #[test]
        fn should_shadow_and_restore_outer_locals() {
            assert_eq!(render("@let x = \"outer\";@foreach (x in [1, 2]) {@x}@x"), "12outer");
        }
    }

    mod attributes {
        use super::*;

        #[test]
        fn should_render_boolean_attributes() {
            let params = ParameterSet::new().with("on", true).with("off", false);
            assert_eq!(
                render_with("<input a=\"@on\" b=\"@off\" c=\"@missing\" hidden>", params),
                "<input a hidden>"
            );
        }

        #[test]
        fn should_render_interpolated_attributes_as_text() {
            let params = ParameterSet::new().with("id", 7).with("off", false);
            assert_eq!(
                render_with("<li class=\"row-@id @off\" data-x=\"@id\"></li>", params),
                "<li class=\"row-7 false\" data-x=\"7\"></li>"
            );
        }

        #[test]
        fn should_escape_attribute_values() {
            let params = ParameterSet::new().with("t", "a\"b<c");
            assert_eq!(
                render_with("<a title=\"@t\"></a>", params),
                "<a title=\"a&quot;b&lt;c\"></a>"
            );
        }

        #[test]
        fn should_not_close_void_elements() {
            assert_eq!(render("<br><img src=\"x.png\"/><hr>"), "<br><img src=\"x.png\"><hr>");
        }
    }
}
