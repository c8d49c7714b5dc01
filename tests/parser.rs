#[cfg(test)]
mod parser_tests {
    use rlox::ast::Stmt;
    use rlox::ast_printer::AstPrinter;
    use rlox::error::LoxError;
    use rlox::parser::Parser;
    use rlox::scanner::Scanner;
    use rlox::token::Token;

    fn parse(source: &str) -> (Vec<Stmt>, Vec<LoxError>) {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        Parser::new(&tokens).parse()
    }

    /// Parse a source unit that must be diagnostic-free and render each
    /// statement in prefix form.
    fn parse_clean(source: &str) -> Vec<String> {
        let (statements, diagnostics) = parse(source);

        assert!(
            diagnostics.is_empty(),
            "Unexpected diagnostics for {:?}: {:?}",
            source,
            diagnostics
        );

        statements.iter().map(AstPrinter::print_stmt).collect()
    }

    #[test]
    fn test_parser_01_precedence_mul_over_add() {
        assert_eq!(parse_clean("1 + 2 * 3;"), vec!["(; (+ 1.0 (* 2.0 3.0)))"]);
    }

    #[test]
    fn test_parser_02_precedence_full_chain() {
        // equality < comparison < term < factor < unary
        assert_eq!(
            parse_clean("1 == 2 < 3 + 4 * -5;"),
            vec!["(; (== 1.0 (< 2.0 (+ 3.0 (* 4.0 (- 5.0))))))"]
        );
    }

    #[test]
    fn test_parser_03_left_associativity() {
        assert_eq!(parse_clean("1 - 2 - 3;"), vec!["(; (- (- 1.0 2.0) 3.0))"]);
    }

    #[test]
    fn test_parser_04_grouping_overrides_precedence() {
        assert_eq!(
            parse_clean("(1 + 2) * 3;"),
            vec!["(; (* (group (+ 1.0 2.0)) 3.0))"]
        );
    }

    #[test]
    fn test_parser_05_assignment_right_associative() {
        assert_eq!(parse_clean("a = b = 3;"), vec!["(; (= a (= b 3.0)))"]);
    }

    #[test]
    fn test_parser_06_logical_or_binds_looser_than_and() {
        assert_eq!(
            parse_clean("a or b and c;"),
            vec!["(; (or a (and b c)))"]
        );
    }

    #[test]
    fn test_parser_07_else_binds_to_nearest_if() {
        assert_eq!(
            parse_clean("if (a) if (b) print 1; else print 2;"),
            vec!["(if a (if b (print 1.0) (print 2.0)))"]
        );
    }

    #[test]
    fn test_parser_08_for_desugars_to_while() {
        // for (var i = 0; i < 3; i = i + 1) print i;
        // becomes a block: the initializer, then a while whose body runs
        // the loop body followed by the increment.
        assert_eq!(
            parse_clean("for (var i = 0; i < 3; i = i + 1) print i;"),
            vec![
                "(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
            ]
        );
    }

    #[test]
    fn test_parser_09_for_with_empty_clauses() {
        // No initializer, no condition (→ true), no increment: bare while.
        assert_eq!(
            parse_clean("for (;;) print 1;"),
            vec!["(while true (print 1.0))"]
        );
    }

    #[test]
    fn test_parser_10_function_declaration_and_call() {
        assert_eq!(
            parse_clean("fun add(a, b) { return a + b; } add(1, 2);"),
            vec![
                "(fun add (a b) (return (+ a b)))",
                "(; (call add 1.0 2.0))"
            ]
        );
    }

    #[test]
    fn test_parser_11_class_declaration() {
        assert_eq!(
            parse_clean("class Counter { increment() { return 1; } reset() { return 0; } }"),
            vec!["(class Counter increment reset)"]
        );
    }

    #[test]
    fn test_parser_12_missing_semicolon_is_reported() {
        let (_, diagnostics) = parse("print 1");

        assert_eq!(diagnostics.len(), 1);
        assert!(
            diagnostics[0].to_string().contains("at end"),
            "Expected an at-end diagnostic, got: {}",
            diagnostics[0]
        );
    }

    #[test]
    fn test_parser_13_diagnostic_names_offending_lexeme() {
        let (_, diagnostics) = parse("var = 1;");

        assert_eq!(diagnostics.len(), 1);
        assert!(
            diagnostics[0].to_string().contains("'='"),
            "Expected the diagnostic to name '=', got: {}",
            diagnostics[0]
        );
    }

    #[test]
    fn test_parser_14_synchronize_bounds_cascade() {
        // One malformed statement between two good ones: exactly one
        // diagnostic, and both healthy statements survive.
        let (statements, diagnostics) = parse("print 1;\nvar = oops;\nprint 2;");

        assert_eq!(diagnostics.len(), 1);

        let rendered: Vec<String> = statements.iter().map(AstPrinter::print_stmt).collect();
        assert!(rendered.contains(&"(print 1.0)".to_string()));
        assert!(rendered.contains(&"(print 2.0)".to_string()));
    }

    #[test]
    fn test_parser_15_invalid_assignment_target_not_fatal() {
        // `a + b = c` reports the bad target but still yields the LHS
        // expression, and the following statement parses normally.
        let (statements, diagnostics) = parse("a + b = c; print 1;");

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].to_string().contains("Invalid assignment target"));

        let rendered: Vec<String> = statements.iter().map(AstPrinter::print_stmt).collect();
        assert!(rendered.contains(&"(; (+ a b))".to_string()));
        assert!(rendered.contains(&"(print 1.0)".to_string()));
    }

    #[test]
    fn test_parser_16_var_without_initializer() {
        assert_eq!(parse_clean("var x;"), vec!["(var x)"]);
    }

    #[test]
    fn test_parser_17_block_statement() {
        assert_eq!(
            parse_clean("{ var x = 1; print x; }"),
            vec!["(block (var x 1.0) (print x))"]
        );
    }

    #[test]
    fn test_parser_18_call_chains() {
        assert_eq!(parse_clean("f(1)(2);"), vec!["(; (call (call f 1.0) 2.0))"]);
    }

    #[test]
    fn test_parser_19_empty_source_is_empty_program() {
        let (statements, diagnostics) = parse("");

        assert!(statements.is_empty());
        assert!(diagnostics.is_empty());
    }
}
