/**
 * Runtime Library Tests
 *
 * Baseline helper functions available to every compiled template.
 */

#[cfg(test)]
mod tests {
    use quill_compiler::loader::{runtime_module, RUNTIME_MODULE_NAME};
    use quill_runtime::{HelperError, Value};
    use serde_json::json;

    fn call(name: &str, args: Vec<Value>) -> Result<Value, HelperError> {
        let module = runtime_module();
        let function = module
            .function(name)
            .unwrap_or_else(|| panic!("missing helper {}", name))
            .clone();
        assert!(function.accepts(args.len()), "{} rejects {} argument(s)", name, args.len());
        function.call(&args)
    }

    fn ok(name: &str, args: Vec<Value>) -> Value {
        call(name, args).unwrap_or_else(|e| panic!("{} failed: {}", name, e))
    }

    fn err(name: &str, args: Vec<Value>) -> String {
        call(name, args).expect_err("helper should fail").to_string()
    }

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    mod module {
        use super::*;

        #[test]
        fn should_qualify_every_helper() {
            let module = runtime_module();
            assert_eq!(module.name(), RUNTIME_MODULE_NAME);
            for symbol in module.symbols() {
                assert!(symbol.name().starts_with("Quill.Runtime."), "{:?}", symbol);
                assert!(!symbol.is_component());
            }
        }

        #[test]
        fn should_share_one_module() {
            assert_eq!(runtime_module().id(), runtime_module().id());
        }

        #[test]
        fn should_declare_arities() {
            let module = runtime_module();
            let arity = |name: &str| module.function(name).unwrap().arity().clone();
            assert_eq!(arity("upper"), 1..=1);
            assert_eq!(arity("join"), 2..=2);
            assert_eq!(arity("replace"), 3..=3);
            assert_eq!(arity("range"), 1..=2);
            assert_eq!(arity("round"), 1..=2);
        }
    }

    mod strings {
        use super::*;

        #[test]
        fn should_change_case_and_trim() {
            assert_eq!(ok("upper", vec![s("abc")]), s("ABC"));
            assert_eq!(ok("lower", vec![s("ÀB")]), s("àb"));
            assert_eq!(ok("trim", vec![s("  x \n")]), s("x"));
            assert_eq!(ok("upper", vec![Value::Int(5)]), s("5"));
        }

        #[test]
        fn should_test_prefixes_and_suffixes() {
            assert_eq!(ok("starts_with", vec![s("quill"), s("qu")]), Value::Bool(true));
            assert_eq!(ok("ends_with", vec![s("quill"), s("qu")]), Value::Bool(false));
        }

        #[test]
        fn should_replace_every_occurrence() {
            assert_eq!(ok("replace", vec![s("a-b-c"), s("-"), s("+")]), s("a+b+c"));
        }

        #[test]
        fn should_convert_to_text() {
            assert_eq!(ok("string", vec![Value::Float(1.5)]), s("1.5"));
            assert_eq!(ok("string", vec![Value::Null]), s(""));
            assert_eq!(ok("string", vec![Value::from(vec![1, 2])]), s("[1,2]"));
        }

        #[test]
        fn should_mark_raw_text_as_markup() {
            let value = ok("raw", vec![s("<b>x</b>")]);
            assert!(value.is_markup());
            assert_eq!(value.as_str(), Some("<b>x</b>"));
        }

        #[test]
        fn should_serialize_json() {
            let value = Value::from(json!({ "a": [1, "x"], "b": null }));
            assert_eq!(ok("json", vec![value]), s(r#"{"a":[1,"x"],"b":null}"#));
            assert_eq!(ok("json", vec![s("q\"")]), s(r#""q\"""#));
        }
    }

    mod collections {
        use super::*;

        #[test]
        fn should_measure_length() {
            assert_eq!(ok("len", vec![s("héllo")]), Value::Int(5));
            assert_eq!(ok("len", vec![Value::from(vec![1, 2, 3])]), Value::Int(3));
            assert_eq!(ok("len", vec![Value::from(json!({ "a": 1 }))]), Value::Int(1));
            assert_eq!(ok("len", vec![Value::Null]), Value::Int(0));
            assert_eq!(err("len", vec![Value::Int(3)]), "int has no length");
        }

        #[test]
        fn should_join_lists() {
            let items = Value::from(vec![s("a"), Value::Int(1), Value::Null]);
            assert_eq!(ok("join", vec![items, s(", ")]), s("a, 1, "));
            assert_eq!(err("join", vec![s("a"), s(",")]), "expected a list, got string");
        }

        #[test]
        fn should_test_containment() {
            let list = Value::from(vec![1, 2]);
            assert_eq!(ok("contains", vec![list.clone(), Value::Int(2)]), Value::Bool(true));
            assert_eq!(ok("contains", vec![list, s("2")]), Value::Bool(false));
            let map = Value::from(json!({ "key": 0 }));
            assert_eq!(ok("contains", vec![map, s("key")]), Value::Bool(true));
            assert_eq!(ok("contains", vec![s("haystack"), s("st")]), Value::Bool(true));
            assert_eq!(ok("contains", vec![Value::Null, s("x")]), Value::Bool(false));
        }

        #[test]
        fn should_list_map_keys_in_order() {
            let map = Value::from(json!({ "z": 1, "a": 2 }));
            assert_eq!(ok("keys", vec![map]), Value::from(vec!["z", "a"]));
            assert_eq!(err("keys", vec![Value::from(vec![1])]), "expected a map, got list");
        }

        #[test]
        fn should_fall_back_to_defaults() {
            assert_eq!(ok("default", vec![Value::Null, s("d")]), s("d"));
            assert_eq!(ok("default", vec![s(""), s("d")]), s("d"));
            assert_eq!(ok("default", vec![Value::Int(0), s("d")]), Value::Int(0));
            assert_eq!(ok("default", vec![Value::Bool(false), s("d")]), Value::Bool(false));
        }
    }

    mod numbers {
        use super::*;

        #[test]
        fn should_produce_ranges() {
            assert_eq!(ok("range", vec![Value::Int(3)]), Value::from(vec![0, 1, 2]));
            assert_eq!(ok("range", vec![Value::Int(2), Value::Int(4)]), Value::from(vec![2, 3]));
            assert_eq!(ok("range", vec![Value::Int(5), Value::Int(1)]), Value::List(vec![]));
            assert_eq!(ok("range", vec![Value::Int(-1)]), Value::List(vec![]));
        }

        #[test]
        fn should_reject_invalid_ranges() {
            assert_eq!(err("range", vec![s("3")]), "expected an int, got string");
            assert_eq!(
                err("range", vec![Value::Int(2_000_000)]),
                "range of 2000000 items exceeds the limit of 1000000"
            );
        }

        #[test]
        fn should_round_to_integers() {
            assert_eq!(ok("round", vec![Value::Float(2.5)]), Value::Int(3));
            assert_eq!(ok("round", vec![Value::Float(-1.4)]), Value::Int(-1));
            assert!(matches!(ok("round", vec![Value::Int(7)]), Value::Int(7)));
        }

        #[test]
        fn should_round_to_digits() {
            let rounded = ok("round", vec![Value::Float(3.14159), Value::Int(2)]);
            assert!(matches!(rounded, Value::Float(f) if (f - 3.14).abs() < 1e-9));
            assert_eq!(
                err("round", vec![Value::Float(1.0), Value::Int(16)]),
                "digits must be an int between 0 and 15, got 16"
            );
            assert_eq!(err("round", vec![s("x")]), "expected a number, got string");
        }
    }
}
