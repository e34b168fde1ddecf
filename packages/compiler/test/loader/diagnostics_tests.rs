/**
 * Diagnostics Tests
 *
 * Name resolution and checking errors, warnings and informational
 * diagnostics reported while loading generated types.
 */

#[cfg(test)]
mod tests {
    use quill_compiler::loader::diagnostics as codes;
    use quill_compiler::{
        CompileError, CompileOptions, CompilerConfig, Error, OptimizationLevel, Severity,
        TemplateCompiler,
    };
    use quill_runtime::logging::{LogLevel, MemoryLogger};
    use quill_runtime::{
        BaseCapability, Component, ComponentDescriptor, HelperFunction, LoadedModule, ModuleBuilder,
        ParameterSet, RenderTreeBuilder, Value,
    };
    use std::sync::Arc;

    #[derive(Default)]
    struct Card;

    impl Component for Card {
        fn set_parameters(&mut self, _parameters: ParameterSet) -> anyhow::Result<()> {
            Ok(())
        }

        fn build_render_tree(&self, builder: &mut RenderTreeBuilder) -> anyhow::Result<()> {
            builder.add_text("card");
            Ok(())
        }
    }

    fn compiler() -> (TemplateCompiler, Arc<MemoryLogger>) {
        let logger = Arc::new(MemoryLogger::new(LogLevel::Debug));
        let config = CompilerConfig::default().with_logger(logger.clone());
        (TemplateCompiler::new(config), logger)
    }

    fn compile(source: &str, options: &CompileOptions) -> Result<(), Error> {
        let (compiler, _) = compiler();
        compiler.compile_module(source, "diag.quill", options).map(|_| ())
    }

    fn compile_error(source: &str, options: &CompileOptions) -> CompileError {
        match compile(source, options) {
            Err(Error::Compile(err)) => err,
            Err(other) => panic!("Expected a compile error, got {:?}", other),
            Ok(()) => panic!("Expected {:?} to fail to compile", source),
        }
    }

    fn expect_codes(source: &str, options: &CompileOptions, expected: &[&str]) {
        let err = compile_error(source, options);
        assert_eq!(err.codes(), expected, "Diagnostics:\n{}", err);
        assert!(err.diagnostics.iter().all(|d| d.severity == Severity::Error));
    }

    fn library(name: &str) -> ModuleBuilder {
        ModuleBuilder::new(name)
    }

    fn with_reference(module: Arc<LoadedModule>) -> CompileOptions {
        CompileOptions::new().with_reference(module)
    }

    mod functions {
        use super::*;

        #[test]
        fn should_report_unknown_functions() {
            let err = compile_error("@nope(1)", &CompileOptions::new());
            assert_eq!(err.codes(), vec![codes::UNKNOWN_FUNCTION]);
            assert_eq!(
                err.to_string(),
                "diag.quill@1:2: error QL1001: Unknown function 'nope'"
            );
        }

        #[test]
        fn should_report_wrong_arity() {
            let err = compile_error("@upper(a, b)", &CompileOptions::new());
            assert_eq!(err.codes(), vec![codes::WRONG_ARITY]);
            assert!(err.diagnostics[0]
                .message
                .contains("Function 'upper' expects 1 argument(s) but got 2"));
        }

        #[test]
        fn should_describe_ranged_arity() {
            let err = compile_error("@range()", &CompileOptions::new());
            assert!(err.diagnostics[0].message.contains("expects 1 to 2 argument(s) but got 0"));
        }

        #[test]
        fn should_resolve_functions_from_references() {
            let module = library("Lib")
                .function(HelperFunction::new("Lib.shout", 1..=1, |args| {
                    Ok(Value::Str(format!("{}!", args[0])))
                }))
                .build();
            assert!(compile("@shout(x)", &with_reference(module)).is_ok());
        }

        #[test]
        fn should_reject_components_called_as_functions() {
            let module = library("Lib").native_component::<Card>("Lib.Card").build();
            expect_codes("@Card()", &with_reference(module), &[codes::WRONG_SYMBOL_KIND]);
        }
    }

    mod components {
        use super::*;

        #[test]
        fn should_report_unresolved_components() {
            let err = compile_error("<Missing />", &CompileOptions::new());
            assert_eq!(err.codes(), vec![codes::UNRESOLVED_COMPONENT]);
            assert!(err.diagnostics[0].message.contains("<Missing>"));
        }

        #[test]
        fn should_report_ambiguous_components() {
            let a = library("Lib.A").native_component::<Card>("Lib.A.Card").build();
            let b = library("Lib.B").native_component::<Card>("Lib.B.Card").build();
            let options = CompileOptions::new().with_reference(a).with_reference(b);
            let err = compile_error("<Card />", &options);
            assert_eq!(err.codes(), vec![codes::AMBIGUOUS_REFERENCE]);
            assert!(err.diagnostics[0].message.contains("Lib.A.Card, Lib.B.Card"));
        }

        #[test]
        fn should_reject_functions_used_as_components() {
            let module = library("Lib")
                .function(HelperFunction::new("Lib.Format", 1..=1, |args| Ok(args[0].clone())))
                .build();
            expect_codes("<Format />", &with_reference(module), &[codes::WRONG_SYMBOL_KIND]);
        }

        #[test]
        fn should_reject_pages_as_children() {
            let descriptor = ComponentDescriptor {
                capability: BaseCapability::Page,
                ..Default::default()
            };
            let module = library("Lib")
                .native_component_with::<Card>("Lib.Home", descriptor)
                .build();
            expect_codes("<Home />", &with_reference(module), &[codes::PAGE_AS_CHILD]);
        }

        #[test]
        fn should_check_declared_child_parameters() {
            let descriptor = ComponentDescriptor {
                parameters: Some(vec!["Name".to_string()]),
                ..Default::default()
            };
            let module = library("Lib")
                .native_component_with::<Card>("Lib.Greeting", descriptor)
                .build();
            let options = with_reference(module);
            assert!(compile("<Greeting Name=\"x\" />", &options).is_ok());
            expect_codes(
                "<Greeting Name=\"x\" Other=\"y\" />",
                &options,
                &[codes::UNDECLARED_CHILD_PARAMETER],
            );
        }

        #[test]
        fn should_accept_any_parameter_without_declarations() {
            let module = library("Lib").native_component::<Card>("Lib.Card").build();
            assert!(compile("<Card Anything=\"1\" Else />", &with_reference(module)).is_ok());
        }
    }

    mod identifiers {
        use super::*;

        #[test]
        fn should_bind_undeclared_identifiers_implicitly() {
            assert!(compile("@title", &CompileOptions::new()).is_ok());
        }

        #[test]
        fn should_reject_undeclared_identifiers_in_strict_mode() {
            let options = CompileOptions::new().with_strict_parameters(true);
            expect_codes("@title", &options, &[codes::UNDECLARED_IDENTIFIER]);
            assert!(compile("@param Title\n@Title", &options).is_ok());
            assert!(compile("@foreach (i in range(2)) {@i}", &options).is_ok());
        }

        #[test]
        fn should_scope_element_locals() {
            let options = CompileOptions::new().with_strict_parameters(true);
            assert!(compile("<p>@let x = 1;@x</p>", &options).is_ok());
            expect_codes("<p>@let x = 1;</p>@x", &options, &[codes::UNDECLARED_IDENTIFIER]);
        }

        #[test]
        fn should_scope_loop_variables() {
            let options = CompileOptions::new().with_strict_parameters(true);
            expect_codes(
                "@foreach (i in range(2)) {@i}@i",
                &options,
                &[codes::UNDECLARED_IDENTIFIER],
            );
        }
    }

    mod reporting {
        use super::*;

        #[test]
        fn should_report_every_error_of_one_compile() {
            let err = compile_error("@nope()<Missing />@upper()", &CompileOptions::new());
            assert_eq!(
                err.codes(),
                vec![codes::UNKNOWN_FUNCTION, codes::UNRESOLVED_COMPONENT, codes::WRONG_ARITY]
            );
        }

        #[test]
        fn should_log_warnings_without_failing() {
            let (compiler, logger) = compiler();
            let source = "@param Unused\n@let x = 1;@foreach (x in range(1)) {@x}";
            compiler
                .compile_module(source, "warn.quill", &CompileOptions::new())
                .unwrap();

            let warnings = logger.records_at(LogLevel::Warn);
            let codes: Vec<&str> = warnings.iter().filter_map(|r| r.field("code")).collect();
            assert!(codes.contains(&"QL2001"), "warnings: {:?}", warnings);
            assert!(codes.contains(&"QL2002"), "warnings: {:?}", warnings);
            let unused = warnings.iter().find(|r| r.field("code") == Some("QL2001")).unwrap();
            assert_eq!(unused.field("location"), Some("warn.quill@1:1"));
        }

        #[test]
        fn should_exclude_warnings_from_compile_errors() {
            let err = compile_error("@param Unused\n@nope()", &CompileOptions::new());
            assert_eq!(err.codes(), vec![codes::UNKNOWN_FUNCTION]);
        }

        #[test]
        fn should_report_implicit_parameters_only_in_debug() {
            let (compiler, logger) = compiler();
            let debug = CompileOptions::new().with_optimization_level(OptimizationLevel::Debug);
            compiler.compile_module("@title", "a.quill", &debug).unwrap();
            let infos = logger.records_at(LogLevel::Info);
            assert!(infos.iter().any(|r| r.field("code") == Some(codes::IMPLICIT_PARAMETER)));

            logger.clear();
            compiler
                .compile_module("@title", "b.quill", &CompileOptions::new())
                .unwrap();
            let infos = logger.records_at(LogLevel::Info);
            assert!(!infos.iter().any(|r| r.field("code") == Some(codes::IMPLICIT_PARAMETER)));
        }
    }
}
