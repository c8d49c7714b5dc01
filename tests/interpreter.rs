#[cfg(test)]
mod interpreter_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rlox::interpreter::Interpreter;
    use rlox::native::OutputSink;
    use rlox::parser::Parser;
    use rlox::resolver::Resolver;
    use rlox::scanner::Scanner;
    use rlox::token::Token;

    /// Sink that collects printed lines instead of writing to stdout.
    struct CaptureSink(Rc<RefCell<Vec<String>>>);

    impl OutputSink for CaptureSink {
        fn write_line(&mut self, text: &str) {
            self.0.borrow_mut().push(text.to_string());
        }
    }

    fn capturing_interpreter() -> (Interpreter, Rc<RefCell<Vec<String>>>) {
        let buffer: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = CaptureSink(Rc::clone(&buffer));

        (Interpreter::with_output(Box::new(sink)), buffer)
    }

    /// Feed one source unit through the whole pipeline against an existing
    /// interpreter, as the REPL does.  Syntax must be clean; resolve and
    /// runtime errors come back as their display strings.
    fn run_with(interpreter: &mut Interpreter, source: &str) -> Result<(), String> {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        let (statements, diagnostics) = Parser::new(&tokens).parse();

        assert!(
            diagnostics.is_empty(),
            "Unexpected parse diagnostics for {:?}: {:?}",
            source,
            diagnostics
        );

        Resolver::new(interpreter)
            .resolve(&statements)
            .map_err(|e| e.to_string())?;

        interpreter
            .interpret(&statements)
            .map_err(|e| e.to_string())
    }

    /// One-shot pipeline: returns whatever the program printed plus the
    /// error (if any) that stopped it.
    fn run(source: &str) -> (Vec<String>, Result<(), String>) {
        let (mut interpreter, buffer) = capturing_interpreter();

        let result: Result<(), String> = run_with(&mut interpreter, source);
        let output: Vec<String> = buffer.borrow().clone();

        (output, result)
    }

    fn run_ok(source: &str) -> Vec<String> {
        let (output, result) = run(source);

        assert!(result.is_ok(), "Unexpected error: {:?}", result);

        output
    }

    // ───────────────────── arithmetic and display ─────────────────────

    #[test]
    fn test_interp_01_arithmetic() {
        assert_eq!(run_ok("print 1 + 2;"), vec!["3"]);
        assert_eq!(run_ok("print 1 + 2 * 3;"), vec!["7"]);
        assert_eq!(run_ok("print (1 + 2) * 3;"), vec!["9"]);
        assert_eq!(run_ok("print 10 - 4 / 2;"), vec!["8"]);
    }

    #[test]
    fn test_interp_02_number_display_trims_integral() {
        assert_eq!(run_ok("print 3.0;"), vec!["3"]);
        assert_eq!(run_ok("print 0.5;"), vec!["0.5"]);
        assert_eq!(run_ok("print 2.5 * 2;"), vec!["5"]);
        assert_eq!(run_ok("print -0.25 + 0.5;"), vec!["0.25"]);
    }

    #[test]
    fn test_interp_03_string_concatenation() {
        assert_eq!(run_ok("print \"foo\" + \"bar\";"), vec!["foobar"]);

        // One string side is enough: the other operand concatenates through
        // its display form.
        assert_eq!(run_ok("print \"a\" + 1;"), vec!["a1"]);
        assert_eq!(run_ok("print 1 + \"a\";"), vec!["1a"]);
        assert_eq!(run_ok("print \"x = \" + nil;"), vec!["x = nil"]);
        assert_eq!(run_ok("print \"ok: \" + true;"), vec!["ok: true"]);
    }

    #[test]
    fn test_interp_04_division_by_zero_is_an_error() {
        let (output, result) = run("print 1 / 0;");

        assert!(output.is_empty(), "Nothing may print before the error");

        let message: String = result.unwrap_err();
        assert!(message.contains("Division by zero."), "Got: {}", message);
    }

    #[test]
    fn test_interp_05_type_errors() {
        let (_, result) = run("print -\"abc\";");
        assert!(result.unwrap_err().contains("Operand must be a number."));

        let (_, result) = run("print \"a\" < \"b\";");
        assert!(result.unwrap_err().contains("Operands must be numbers"));

        let (_, result) = run("print true + 1;");
        assert!(result
            .unwrap_err()
            .contains("Operands must be two numbers or involve a string."));
    }

    // ─────────────────── truthiness, equality, logic ──────────────────

    #[test]
    fn test_interp_06_truthiness() {
        // Only nil and false are falsy; 0 and "" are truthy.
        let source = "
            if (0) print \"zero\";
            if (\"\") print \"empty\";
            if (nil) print \"nil\"; else print \"not nil\";
            if (false) print \"false\"; else print \"not false\";
        ";

        assert_eq!(run_ok(source), vec!["zero", "empty", "not nil", "not false"]);
    }

    #[test]
    fn test_interp_07_equality_across_kinds() {
        let source = "
            print 1 == 1;
            print 1 == 2;
            print \"a\" == \"a\";
            print 1 == \"1\";
            print nil == nil;
            print nil == false;
            print 0 == false;
            print 1 != \"1\";
        ";

        assert_eq!(
            run_ok(source),
            vec!["true", "false", "true", "false", "true", "false", "false", "true"]
        );
    }

    #[test]
    fn test_interp_07b_bang_applies_truthiness() {
        assert_eq!(
            run_ok("print !0; print !nil; print !\"\"; print !false;"),
            vec!["false", "true", "false", "true"]
        );
    }

    #[test]
    fn test_interp_08_logical_operators_yield_booleans() {
        let source = "
            print 1 and 2;
            print nil and 2;
            print nil or 3;
            print false or nil;
        ";

        assert_eq!(run_ok(source), vec!["true", "false", "true", "false"]);
    }

    #[test]
    fn test_interp_09_logical_short_circuit() {
        // The right side must not run when the left decides the outcome:
        // these would be runtime errors if evaluated.
        let source = "
            print false and missingVariable;
            print true or missingVariable;
        ";

        assert_eq!(run_ok(source), vec!["false", "true"]);
    }

    // ───────────────────── variables and scoping ──────────────────────

    #[test]
    fn test_interp_10_variables_and_assignment() {
        let source = "
            var x = 1;
            x = x + 41;
            print x;
            var unset;
            print unset;
        ";

        assert_eq!(run_ok(source), vec!["42", "nil"]);
    }

    #[test]
    fn test_interp_11_assignment_is_an_expression() {
        assert_eq!(run_ok("var a; var b; print a = b = 5; print a;"), vec!["5", "5"]);
    }

    #[test]
    fn test_interp_12_block_scoping_shadows_and_restores() {
        let source = "
            var a = \"outer\";
            {
                var a = \"inner\";
                print a;
            }
            print a;
        ";

        assert_eq!(run_ok(source), vec!["inner", "outer"]);
    }

    #[test]
    fn test_interp_13_initializer_sees_the_shadowed_binding() {
        // The reference inside the initializer resolves past the in-flight
        // declaration to the outer variable.
        let source = "
            var a = 1;
            {
                var a = a + 1;
                print a;
            }
            print a;
        ";

        assert_eq!(run_ok(source), vec!["2", "1"]);
    }

    #[test]
    fn test_interp_14_self_initializer_without_outer_binding_fails() {
        let (_, result) = run("{ var x = x; }");

        assert!(result.unwrap_err().contains("Undefined variable 'x'."));
    }

    #[test]
    fn test_interp_15_undefined_variable_errors() {
        let (_, result) = run("print missing;");
        assert!(result.unwrap_err().contains("Undefined variable 'missing'."));

        let (_, result) = run("missing = 1;");
        assert!(result.unwrap_err().contains("Undefined variable 'missing'."));
    }

    #[test]
    fn test_interp_16_runtime_error_carries_line() {
        let (_, result) = run("var ok = 1;\nprint ok;\nprint boom;");

        let message: String = result.unwrap_err();
        assert!(message.contains("[line 3]"), "Got: {}", message);
    }

    // ──────────────────────── control flow ────────────────────────────

    #[test]
    fn test_interp_17_while_loop() {
        let source = "
            var i = 0;
            while (i < 3) {
                print i;
                i = i + 1;
            }
        ";

        assert_eq!(run_ok(source), vec!["0", "1", "2"]);
    }

    #[test]
    fn test_interp_18_for_loop() {
        assert_eq!(
            run_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
            vec!["0", "1", "2"]
        );
    }

    #[test]
    fn test_interp_19_for_loop_variable_stays_scoped() {
        let (_, result) = run("for (var i = 0; i < 3; i = i + 1) print i; print i;");

        assert!(result.unwrap_err().contains("Undefined variable 'i'."));
    }

    // ───────────────────── functions and closures ─────────────────────

    #[test]
    fn test_interp_20_function_declaration_and_call() {
        let source = "
            fun add(a, b) {
                return a + b;
            }
            print add(1, 2);
            print add;
        ";

        assert_eq!(run_ok(source), vec!["3", "<fn add>"]);
    }

    #[test]
    fn test_interp_21_return_without_value_and_fallthrough() {
        let source = "
            fun early() {
                return;
                print \"unreachable\";
            }
            fun fallthrough() {
                var x = 1;
            }
            print early();
            print fallthrough();
        ";

        assert_eq!(run_ok(source), vec!["nil", "nil"]);
    }

    #[test]
    fn test_interp_22_recursion() {
        let source = "
            fun fib(n) {
                if (n < 2) return n;
                return fib(n - 1) + fib(n - 2);
            }
            print fib(10);
        ";

        assert_eq!(run_ok(source), vec!["55"]);
    }

    #[test]
    fn test_interp_23_closure_captures_defining_environment() {
        let source = "
            fun makeCounter() {
                var count = 0;
                fun increment() {
                    count = count + 1;
                    return count;
                }
                return increment;
            }
            var counter = makeCounter();
            print counter();
            print counter();
        ";

        assert_eq!(run_ok(source), vec!["1", "2"]);
    }

    #[test]
    fn test_interp_24_closures_do_not_share_unrelated_calls() {
        let source = "
            fun makeCounter() {
                var count = 0;
                fun increment() {
                    count = count + 1;
                    return count;
                }
                return increment;
            }
            var a = makeCounter();
            var b = makeCounter();
            print a();
            print a();
            print b();
        ";

        assert_eq!(run_ok(source), vec!["1", "2", "1"]);
    }

    #[test]
    fn test_interp_25_arity_mismatch() {
        let (_, result) = run("fun f(a, b) { return a; } f(1);");
        assert!(result
            .unwrap_err()
            .contains("Expected 2 arguments but got 1."));

        let (_, result) = run("fun g() { return 1; } g(1, 2);");
        assert!(result
            .unwrap_err()
            .contains("Expected 0 arguments but got 2."));
    }

    #[test]
    fn test_interp_26_calling_a_non_callable() {
        let (_, result) = run("var x = 1; x();");

        assert!(result.unwrap_err().contains("Can only call functions."));
    }

    // ───────────────────────── classes ────────────────────────────────

    #[test]
    fn test_interp_27_class_declaration_binds_name() {
        let source = "
            class Counter {
                describe() {
                    return \"a counter\";
                }
            }
            print Counter;
        ";

        assert_eq!(run_ok(source), vec!["Counter"]);
    }

    // ─────────────────────── native functions ─────────────────────────

    #[test]
    fn test_interp_28_clock_returns_a_number() {
        assert_eq!(run_ok("print clock() > 0;"), vec!["true"]);
    }

    #[test]
    fn test_interp_29_sleep_rejects_non_numbers() {
        let (_, result) = run("sleep(true);");

        assert!(result
            .unwrap_err()
            .contains("sleep() can only accept number values"));
    }

    #[test]
    fn test_interp_30_read_text_file() {
        let path = std::env::temp_dir().join("rlox_read_text_file_test.txt");
        std::fs::write(&path, "contents here").unwrap();

        let source = format!("print readTextFile(\"{}\");", path.display());
        assert_eq!(run_ok(&source), vec!["contents here"]);

        std::fs::remove_file(&path).ok();

        // Any I/O failure reads as false rather than an error.
        assert_eq!(
            run_ok("print readTextFile(\"/no/such/file/anywhere.txt\");"),
            vec!["false"]
        );
    }

    // ──────────────────────── resolver rules ──────────────────────────

    #[test]
    fn test_interp_31_duplicate_declaration_in_scope_is_rejected() {
        let (output, result) = run("{ var a = 1; var a = 2; }");

        assert!(output.is_empty());
        assert!(result.unwrap_err().contains("already declared"));
    }

    #[test]
    fn test_interp_32_top_level_return_is_rejected() {
        let (output, result) = run("return 1;");

        assert!(output.is_empty());
        assert!(result
            .unwrap_err()
            .contains("'return' used outside of function"));
    }

    #[test]
    fn test_interp_33_redeclaration_at_top_level_is_allowed() {
        // Globals may be redefined freely, as in a REPL session.
        assert_eq!(run_ok("var a = 1; var a = 2; print a;"), vec!["2"]);
    }

    // ────────────────────── session persistence ───────────────────────

    #[test]
    fn test_interp_34_state_persists_across_source_units() {
        let (mut interpreter, buffer) = capturing_interpreter();

        run_with(&mut interpreter, "var x = 10;").unwrap();
        run_with(&mut interpreter, "fun double(n) { return n * 2; }").unwrap();
        run_with(&mut interpreter, "print double(x);").unwrap();

        assert_eq!(*buffer.borrow(), vec!["20"]);
    }

    #[test]
    fn test_interp_35_session_survives_runtime_errors() {
        let (mut interpreter, buffer) = capturing_interpreter();

        run_with(&mut interpreter, "var x = 1;").unwrap();

        let result = run_with(&mut interpreter, "print missing;");
        assert!(result.is_err());

        // The earlier binding is intact and new work proceeds normally.
        run_with(&mut interpreter, "print x;").unwrap();

        assert_eq!(*buffer.borrow(), vec!["1"]);
    }

    #[test]
    fn test_interp_36_closures_stay_valid_across_units() {
        let (mut interpreter, buffer) = capturing_interpreter();

        run_with(
            &mut interpreter,
            "fun makeCounter() { var n = 0; fun inc() { n = n + 1; return n; } return inc; }",
        )
        .unwrap();
        run_with(&mut interpreter, "var c = makeCounter();").unwrap();
        run_with(&mut interpreter, "print c();").unwrap();
        run_with(&mut interpreter, "print c();").unwrap();

        assert_eq!(*buffer.borrow(), vec!["1", "2"]);
    }

    #[test]
    fn test_interp_37_environment_restored_after_runtime_error_in_block() {
        // An error inside a block must not leave the interpreter stuck in
        // the block's scope.
        let (mut interpreter, buffer) = capturing_interpreter();

        let result = run_with(&mut interpreter, "var a = \"global\"; { var a = \"inner\"; boom; }");
        assert!(result.is_err());

        run_with(&mut interpreter, "print a;").unwrap();

        assert_eq!(*buffer.borrow(), vec!["global"]);
    }

    #[test]
    fn test_interp_38_resolved_reads_bypass_later_shadow() {
        // `show` resolves `a` before the block's own `a` exists, so both
        // calls read the global even though a dynamic walk from the
        // closure's chain would find the block binding after line 4.
        let source = "
            var a = \"global\";
            {
                fun show() { print a; }
                show();
                var a = \"block\";
                show();
            }
        ";

        assert_eq!(run_ok(source), vec!["global", "global"]);
    }

    #[test]
    fn test_interp_39_resolved_writes_target_the_captured_scope() {
        // Assignment through a resolved depth lands in the closure's
        // birthplace scope, not in a same-named variable of whatever scope
        // is active at call time.
        let source = "
            var put;
            var take;
            {
                var contents = \"start\";
                fun store(v) { contents = v; }
                fun load() { return contents; }
                put = store;
                take = load;
            }
            {
                var contents = \"shadow\";
                put(\"updated\");
                print take();
                print contents;
            }
        ";

        assert_eq!(run_ok(source), vec!["updated", "shadow"]);
    }

    #[test]
    fn test_interp_40_depth_map_entries_survive_later_parses() {
        // Later source units mint fresh node ids; the closure resolved in
        // the first unit must keep its own depth-map entries intact.
        let (mut interpreter, buffer) = capturing_interpreter();

        run_with(
            &mut interpreter,
            "fun make() { var n = 100; fun get() { return n; } return get; } var g = make();",
        )
        .unwrap();
        run_with(&mut interpreter, "{ var n = 1; var m = 2; print n + m; }").unwrap();
        run_with(&mut interpreter, "print g();").unwrap();

        assert_eq!(*buffer.borrow(), vec!["3", "100"]);
    }
}
