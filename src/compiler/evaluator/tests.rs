use pretty_assertions::assert_eq;
use crate::compiler::lexer::Lexer;
use crate::compiler::object::{FALSE, TRUE};
use crate::compiler::parser::Parser;
use super::*;

fn parse(source: &str) -> Program {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();

    assert!(!parser.had_error(), "unexpected syntax errors for {:?}: {:?}", source, parser.errors());
    program
}

fn eval_in(source: &str, env: &Env) -> Object {
    Evaluator::default().eval_program(&parse(source), env)
}

fn eval(source: &str) -> Object {
    eval_in(source, &Environment::new_global())
}

fn eval_error(source: &str) -> RuntimeError {
    match eval(source) {
        Object::Error(error) => error,
        other => panic!("expected an error for {:?}, got {}", source, other),
    }
}

fn int_array(values: &[i64]) -> Object {
    Object::Array(Rc::new(values.iter().copied().map(Object::Integer).collect()))
}

mod expressions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integer_arithmetic() {
        let cases = [
            ("5", 5),
            ("-10", -10),
            ("--10", 10),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * 2 * 2 * 2 * 2", 32),
            ("-50 + 100 + -50", 0),
            ("5 * 2 + 10", 20),
            ("5 + 2 * 10", 25),
            ("50 / 2 * 2 + 10", 60),
            ("2 * (5 + 10)", 30),
            ("3 * 3 * 3 + 10", 37),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
            ("-7 / 2", -3),
            ("7 / -2", -3),
        ];

        for (source, expected) in cases {
            assert_eq!(eval(source), Object::Integer(expected), "for {:?}", source);
        }
    }

    #[test]
    fn test_integer_arithmetic_wraps() {
        assert_eq!(eval("9223372036854775807 + 1"), Object::Integer(i64::MIN));
        assert_eq!(eval("-9223372036854775807 - 2"), Object::Integer(i64::MAX));
        assert_eq!(eval("4611686018427387904 * 2"), Object::Integer(i64::MIN));
    }

    #[test]
    fn test_boolean_expressions() {
        let cases = [
            ("true", true),
            ("false", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 <= 1", true),
            ("2 >= 3", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("true == true", true),
            ("true != false", true),
            ("(1 < 2) == true", true),
            ("(1 > 2) == true", false),
            ("1 == true", false),
            ("1 != true", true),
            ("\"abc\" == \"abc\"", true),
            ("\"abc\" != \"abd\"", true),
            ("[1, 2] == [1, 2]", true),
            ("[1] == [2]", false),
        ];

        for (source, expected) in cases {
            assert_eq!(eval(source), Object::from_bool(expected), "for {:?}", source);
        }
    }

    #[test]
    fn test_bang_operator_uses_truthiness() {
        assert_eq!(eval("!true"), FALSE);
        assert_eq!(eval("!false"), TRUE);
        assert_eq!(eval("!5"), FALSE);
        assert_eq!(eval("!0"), FALSE);
        assert_eq!(eval("!!0"), TRUE);
        assert_eq!(eval("!\"\""), FALSE);
        assert_eq!(eval("!if (false) { 1 }"), TRUE);
    }

    #[test]
    fn test_if_else_expressions() {
        assert_eq!(eval("if (true) { 10 }"), Object::Integer(10));
        assert_eq!(eval("if (false) { 10 }"), NULL);
        assert_eq!(eval("if (0) { 10 }"), Object::Integer(10));
        assert_eq!(eval("if (1 > 2) { 10 } else { 20 }"), Object::Integer(20));
        assert_eq!(eval("if (1 > 2) 10 else if (2 > 1) 20 else 30"), Object::Integer(20));
        assert_eq!(eval("if (true) { }"), NULL);
    }

    #[test]
    fn test_strings() {
        assert_eq!(eval("\"hello world\""), Object::String(Rc::from("hello world")));
        assert_eq!(eval("\"ünï\"").to_string(), "ünï");
    }

    #[test]
    fn test_arrays_and_indexing() {
        assert_eq!(eval("[1, 2 * 2, 3 + 3]"), int_array(&[1, 4, 6]));
        assert_eq!(eval("[]"), int_array(&[]));

        let cases = [
            ("[1, 2, 3][0]", Object::Integer(1)),
            ("[1, 2, 3][1 + 1]", Object::Integer(3)),
            ("const i = 0; [1][i]", Object::Integer(1)),
            ("const a = [1, 2, 3]; a[0] + a[1] + a[2]", Object::Integer(6)),
            ("[1, 2, 3][3]", NULL),
            ("[1, 2, 3][-1]", NULL),
            ("[[1, 2], [3]][0][1]", Object::Integer(2)),
        ];

        for (source, expected) in cases {
            assert_eq!(eval(source), expected, "for {:?}", source);
        }
    }

    #[test]
    fn test_inspect() {
        assert_eq!(eval("[1, \"a\", true, [2]]").to_string(), "[1, \"a\", true, [2]]");
        assert_eq!(eval("if (false) { 1 }").to_string(), "null");
        assert_eq!(eval("func(int x) -> x").to_string(), "func(int x) { return x }");
        assert_eq!(eval("len").to_string(), "builtin function len");
        assert_eq!(eval("1 / 0").to_string(), "ERROR: division by zero");
    }
}

mod statements {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_declarations_bind_and_yield_their_value() {
        assert_eq!(eval("const a = 5; a"), Object::Integer(5));
        assert_eq!(eval("var a: int = 5 * 5; a"), Object::Integer(25));
        assert_eq!(eval("const a = 5; var b = a; const c = a + b + 5; c"), Object::Integer(15));
        assert_eq!(eval("Λ x = 3"), Object::Integer(3));
    }

    #[test]
    fn test_return_statements() {
        let cases = [
            ("return 10; 9", Object::Integer(10)),
            ("9; return 2 * 5; 9", Object::Integer(10)),
            ("if (10 > 1) { if (10 > 1) { return 10; } return 1; }", Object::Integer(10)),
            ("return; 1", NULL),
        ];

        for (source, expected) in cases {
            assert_eq!(eval(source), expected, "for {:?}", source);
        }
    }

    #[test]
    fn test_return_inside_a_declaration_ends_the_program() {
        let env = Environment::new_global();

        assert_eq!(eval_in("const x = if (true) { return 5 }; x + 1", &env), Object::Integer(5));
        assert!(!env.borrow().contains_local("x"));
    }

    #[test]
    fn test_return_inside_an_array_literal_ends_the_program() {
        assert_eq!(eval("[if (true) { return 1 }]"), Object::Integer(1));
        assert_eq!(eval("[0, if (false) { 1 } else { return 2 }, missing]; 3"), Object::Integer(2));
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(eval(""), NULL);
    }
}

mod functions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_function_object() {
        match eval("func(int x) { x + 2 }") {
            Object::Function(function) => {
                assert_eq!(function.arity(), 1);
                assert_eq!(function.name(), None);
                assert_eq!(function.literal.body.to_string(), "{ (x + 2) }");
            },
            other => panic!("expected a function, got {}", other),
        }
    }

    #[test]
    fn test_function_application() {
        let cases = [
            ("const identity = func(int x) { x }; identity(5)", 5),
            ("const identity = func(int x) { return x; }; identity(5)", 5),
            ("const double = func(int x) { x * 2 }; double(5)", 10),
            ("const add = func(int x, int y) { x + y }; add(5, 5)", 10),
            ("const add = func(int x, int y) { x + y }; add(5 + 5, add(5, 5))", 20),
            ("const add = func(int x, int y) -> x + y; add(1, 2)", 3),
            ("func(int x) { x }(5)", 5),
            ("func() { 1; 2 }()", 2),
        ];

        for (source, expected) in cases {
            assert_eq!(eval(source), Object::Integer(expected), "for {:?}", source);
        }
    }

    #[test]
    fn test_empty_body_yields_null() {
        assert_eq!(eval("func() { }()"), NULL);
    }

    #[test]
    fn test_return_does_not_leak_out_of_a_call() {
        assert_eq!(eval("const f = func() { return 1; 2 }; f() + 10"), Object::Integer(11));
    }

    #[test]
    fn test_return_inside_a_declaration_leaves_the_function() {
        assert_eq!(eval("const f = func() { const x = if (true) { return 5 }; 99 }; f() + 1"), Object::Integer(6));
    }

    #[test]
    fn test_return_inside_a_call_argument_leaves_the_function() {
        let source = "
            const add = func(int a, int b) { a + b };
            const f = func() { add(1, if (true) { return 3 }) + 100 };
            f() + 1
        ";

        assert_eq!(eval(source), Object::Integer(4));
        assert_eq!(eval("const f = func() { len([if (true) { return 7 }]) }; f()"), Object::Integer(7));
    }

    #[test]
    fn test_bare_return_before_else() {
        let source = "func f(bool b) { if (b) return else return 2 }";

        assert_eq!(eval(&format!("{}; f(true)", source)), NULL);
        assert_eq!(eval(&format!("{}; f(false)", source)), Object::Integer(2));
    }

    #[test]
    fn test_named_function_binds_itself() {
        let source = "func fact(int n) { if (n < 2) { return 1 } n * fact(n - 1) }; fact(5)";

        assert_eq!(eval(source), Object::Integer(120));
    }

    #[test]
    fn test_recursive_fibonacci() {
        let source = "const fib = func(int n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }; fib(10)";

        assert_eq!(eval(source), Object::Integer(55));
    }

    #[test]
    fn test_closures() {
        let source = "
            const new_adder = func(int x) { func(int y) { x + y } };
            const add_two = new_adder(2);
            add_two(3)
        ";

        assert_eq!(eval(source), Object::Integer(5));
    }

    #[test]
    fn test_closure_sees_later_rebinding_in_its_scope() {
        assert_eq!(eval("var x = 1; const f = func() { x }; var x = 2; f()"), Object::Integer(2));
    }

    #[test]
    fn test_shadowing_does_not_touch_caller_scope() {
        assert_eq!(eval("const x = 1; const f = func(int x) { x * 10 }; f(5); x"), Object::Integer(1));
        assert_eq!(eval("const x = 1; const g = func() { const x = 99; x }; g(); x"), Object::Integer(1));
    }

    #[test]
    fn test_scoping_is_lexical() {
        let source = "
            const x = 1;
            const get_x = func() { x };
            const call_with_x = func(int x) { get_x() };
            call_with_x(50)
        ";

        assert_eq!(eval(source), Object::Integer(1));
    }

    #[test]
    fn test_function_bound_in_its_own_scope_does_not_keep_it_alive() {
        let env = Environment::new_global();
        eval_in("func f() { 1 }; const g = func() { f() }; 0", &env);

        assert_eq!(Rc::strong_count(&env), 1);
        assert_eq!(eval_in("g() + f()", &env), Object::Integer(2));
    }

    #[test]
    fn test_call_scope_is_released_with_its_last_closure() {
        let source = "
            const make = func() {
                func helper() { 1 }
                const other = func() { helper() };
                func() { other() + 1 }
            };
        ";

        match eval(&format!("{} make()", source)) {
            Object::Function(function) => assert_eq!(Rc::strong_count(&function.env), 1),
            other => panic!("expected a function, got {}", other),
        }

        assert_eq!(eval(&format!("{} make()()", source)), Object::Integer(2));
    }

    #[test]
    fn test_function_identity() {
        assert_eq!(eval("const f = func() { 1 }; f == f"), TRUE);
        assert_eq!(eval("func() { 1 } == func() { 1 }"), FALSE);
    }
}

mod builtins {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_functions() {
        let cases = [
            ("len([1, 2, 3])", Object::Integer(3)),
            ("len([])", Object::Integer(0)),
            ("len(\"héllo\")", Object::Integer(5)),
            ("first([1, 2])", Object::Integer(1)),
            ("first([])", NULL),
            ("last([1, 2])", Object::Integer(2)),
            ("last([])", NULL),
            ("rest([1, 2, 3])", int_array(&[2, 3])),
            ("rest([1])", int_array(&[])),
            ("rest([])", NULL),
            ("push([1], 2)", int_array(&[1, 2])),
            ("const a = [1]; const b = push(a, 2); len(a)", Object::Integer(1)),
            ("print(1, \"two\", [3])", NULL),
        ];

        for (source, expected) in cases {
            assert_eq!(eval(source), expected, "for {:?}", source);
        }
    }

    #[test]
    fn test_builtin_argument_errors() {
        assert_eq!(eval_error("len(1)"), RuntimeError::BuiltinArgument { builtin: "len", got: "INTEGER" });
        assert_eq!(eval_error("first(\"abc\")"), RuntimeError::BuiltinArgument { builtin: "first", got: "STRING" });
        assert_eq!(eval_error("len(\"a\", \"b\")"), RuntimeError::ArityMismatch { expected: 1, got: 2 });
        assert_eq!(eval_error("push([1])"), RuntimeError::ArityMismatch { expected: 2, got: 1 });
        assert_eq!(eval_error("len(1)").to_string(), "argument to `len` not supported, got INTEGER");
    }

    #[test]
    fn test_user_bindings_shadow_builtins() {
        assert_eq!(eval("const len = func(arr a) { 42 }; len([1])"), Object::Integer(42));
    }
}

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_messages() {
        let cases = [
            ("5 + true", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5", "type mismatch: INTEGER + BOOLEAN"),
            ("\"a\" + 1", "type mismatch: STRING + INTEGER"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("-\"a\"", "unknown operator: -STRING"),
            ("true + false", "unknown operator: BOOLEAN + BOOLEAN"),
            ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
            ("if (10 > 1) { true + false; }", "unknown operator: BOOLEAN + BOOLEAN"),
            ("if (10 > 1) { if (10 > 1) { return true + false; } return 1; }", "unknown operator: BOOLEAN + BOOLEAN"),
            ("\"a\" - \"b\"", "unknown operator: STRING - STRING"),
            ("[1] < [2]", "unknown operator: ARRAY < ARRAY"),
            ("foobar", "identifier not found: foobar"),
            ("5(1)", "not a function: INTEGER"),
            ("1[0]", "index operator not supported: INTEGER[INTEGER]"),
            ("[1][true]", "index operator not supported: ARRAY[BOOLEAN]"),
            ("10 / 0", "division by zero"),
        ];

        for (source, expected) in cases {
            assert_eq!(eval_error(source).to_string(), expected, "for {:?}", source);
        }
    }

    #[test]
    fn test_errors_short_circuit() {
        assert_eq!(eval_error("(1 / 0) + 5"), RuntimeError::DivisionByZero);
        assert_eq!(eval_error("const f = func(int a, int b) { a }; f(1 / 0, missing)"), RuntimeError::DivisionByZero);
        assert_eq!(eval_error("[1, missing, 1 / 0]"), RuntimeError::UnknownIdentifier(String::from("missing")));
        assert_eq!(eval_error("const x = missing; 5"), RuntimeError::UnknownIdentifier(String::from("missing")));
        assert_eq!(eval_error("if (1 / 0) { 1 } else { 2 }"), RuntimeError::DivisionByZero);
    }

    #[test]
    fn test_arity_mismatch_binds_nothing() {
        let env = Environment::new_global();
        let result = eval_in("const f = func(int a) { a }; f(1, 2)", &env);

        assert_eq!(result, Object::Error(RuntimeError::ArityMismatch { expected: 1, got: 2 }));
        assert_eq!(env.borrow().get("a"), None);
    }

    #[test]
    fn test_failed_declaration_binds_nothing() {
        let env = Environment::new_global();

        assert!(eval_in("const x = 1 / 0", &env).is_error());
        assert_eq!(env.borrow().get("x"), None);
    }
}

mod call_depth {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unbounded_recursion_hits_the_limit() {
        let program = parse("func f(int n) { f(n + 1) }; f(0)");
        let mut evaluator = Evaluator::new(50);

        assert_eq!(evaluator.eval_program(&program, &Environment::new_global()), Object::Error(RuntimeError::MaxCallDepth(50)));
    }

    #[test]
    fn test_depth_is_released_after_each_call() {
        let program = parse("func down(int n) { if (n == 0) { return 0 } down(n - 1) }; down(40); down(40) + down(40)");
        let mut evaluator = Evaluator::new(50);

        assert_eq!(evaluator.eval_program(&program, &Environment::new_global()), Object::Integer(0));
    }

    #[test]
    fn test_evaluator_is_reusable_after_an_error() {
        let env = Environment::new_global();
        let mut evaluator = Evaluator::new(10);

        let failing = parse("func f(int n) { f(n) }; f(0)");
        assert_eq!(evaluator.eval_program(&failing, &env), Object::Error(RuntimeError::MaxCallDepth(10)));

        let ok = parse("func g(int n) { if (n == 0) { return 7 } g(n - 1) }; g(9)");
        assert_eq!(evaluator.eval_program(&ok, &env), Object::Integer(7));
    }

    #[test]
    fn test_deep_recursion_below_the_default_limit() {
        let source = "func count(int n) { if (n == 0) { return 0 } 1 + count(n - 1) }; count(5000)";

        assert_eq!(eval(source), Object::Integer(5000));
    }
}
