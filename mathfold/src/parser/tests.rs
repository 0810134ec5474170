//! Parser tests

use crate::ast::{ConstValue, Node, OperatorNode};
use crate::config::{MathConfig, NumberType};
use crate::parser::parse_expression;
use bigdecimal::BigDecimal;
use std::str::FromStr;

/// Helper to parse with the default configuration
fn parse_ok(source: &str) -> Node {
    parse_expression(source, &MathConfig::default()).expect("Parse should succeed")
}

/// Helper to check if parsing fails
fn parse_fails(source: &str) -> bool {
    parse_expression(source, &MathConfig::default()).is_err()
}

/// Parse and print back
fn round_trip(source: &str) -> String {
    parse_ok(source).to_string()
}

fn num(n: f64) -> Node {
    Node::number(n)
}

fn sym(name: &str) -> Node {
    Node::symbol(name)
}

// ============================================
// Literals
// ============================================

#[test]
fn test_parse_number() {
    assert_eq!(parse_ok("42"), num(42.0));
    assert_eq!(parse_ok("1.5e3"), num(1500.0));
}

#[test]
fn test_parse_number_as_decimal() {
    let config = MathConfig {
        number: NumberType::BigNumber,
    };
    let node = parse_expression("0.1", &config).unwrap();
    assert_eq!(node, Node::decimal(BigDecimal::from_str("0.1").unwrap()));
}

#[test]
fn test_parse_keyword_constants() {
    assert_eq!(parse_ok("true"), Node::Constant(ConstValue::Bool(true)));
    assert_eq!(parse_ok("null"), Node::Constant(ConstValue::Null));
    assert_eq!(parse_ok("undefined"), Node::undefined());
    assert_eq!(parse_ok("\"hi\""), Node::string("hi"));
}

// ============================================
// Operators
// ============================================

#[test]
fn test_parse_precedence() {
    assert_eq!(
        parse_ok("1 + 2 * x"),
        Node::binary(
            "+",
            "add",
            num(1.0),
            Node::binary("*", "multiply", num(2.0), sym("x"))
        )
    );
    assert_eq!(round_trip("(1 + 2) * x"), "(1 + 2) * x");
}

#[test]
fn test_parse_left_associative_subtraction() {
    assert_eq!(
        parse_ok("a - b - c"),
        Node::binary(
            "-",
            "subtract",
            Node::binary("-", "subtract", sym("a"), sym("b")),
            sym("c")
        )
    );
}

#[test]
fn test_parse_power_right_associative() {
    assert_eq!(
        parse_ok("2 ^ 3 ^ 2"),
        Node::binary(
            "^",
            "pow",
            num(2.0),
            Node::binary("^", "pow", num(3.0), num(2.0))
        )
    );
    assert_eq!(
        parse_ok("-x ^ 2"),
        Node::unary_minus(Node::binary("^", "pow", sym("x"), num(2.0)))
    );
}

#[test]
fn test_parse_implicit_multiplication() {
    assert_eq!(
        parse_ok("2 x"),
        Node::Operator(OperatorNode {
            op: "*".into(),
            fn_name: "multiply".into(),
            args: vec![num(2.0), sym("x")],
            implicit: true,
        })
    );
    assert_eq!(round_trip("z cos(0)"), "z cos(0)");
    assert_eq!(round_trip("(a)(b)"), "(a) (b)");
}

#[test]
fn test_parse_unary_operators() {
    assert_eq!(parse_ok("-3"), Node::unary_minus(num(3.0)));
    assert_eq!(
        parse_ok("not a"),
        Node::operator("not", "not", vec![sym("a")])
    );
    assert_eq!(round_trip("--x"), "-(-x)");
}

#[test]
fn test_parse_comparison_and_logic() {
    assert_eq!(round_trip("a < b and c >= d or e"), "a < b and c >= d or e");
    let Node::Operator(op) = parse_ok("a == b") else {
        panic!("Expected operator");
    };
    assert_eq!(op.fn_name, "equal");
}

// ============================================
// Calls, indexing, structures
// ============================================

#[test]
fn test_parse_call() {
    assert_eq!(
        parse_ok("f(x, 1)"),
        Node::call("f", vec![sym("x"), num(1.0)])
    );
    assert_eq!(parse_ok("g()"), Node::call("g", vec![]));
}

#[test]
fn test_parse_index_and_member() {
    assert_eq!(
        parse_ok("A[1, x]"),
        Node::accessor(sym("A"), Node::Index(vec![num(1.0), sym("x")]))
    );
    assert_eq!(
        parse_ok("obj.key"),
        Node::accessor(sym("obj"), Node::Index(vec![Node::string("key")]))
    );
}

#[test]
fn test_parse_arrays() {
    assert_eq!(
        parse_ok("[1, 2]"),
        Node::Array(vec![num(1.0), num(2.0)])
    );
    assert_eq!(
        parse_ok("[1, 2; 3, 4]"),
        parse_ok("[[1, 2], [3, 4]]")
    );
    assert_eq!(parse_ok("[]"), Node::Array(vec![]));
}

#[test]
fn test_parse_object() {
    let Node::Object(props) = parse_ok("{a: 1, \"b c\": x}") else {
        panic!("Expected object");
    };
    assert_eq!(props.get("a"), Some(&num(1.0)));
    assert_eq!(props.get("b c"), Some(&sym("x")));
}

// ============================================
// Constructs the folder rejects
// ============================================

#[test]
fn test_parse_assignment_and_function_definition() {
    assert!(matches!(parse_ok("x = 2"), Node::Assignment { .. }));
    let Node::FunctionAssignment { name, params, .. } = parse_ok("f(x, y) = x + y") else {
        panic!("Expected function assignment");
    };
    assert_eq!(name, "f");
    assert_eq!(params, vec!["x".to_string(), "y".to_string()]);
    assert!(parse_fails("f(1) = 2"));
    assert!(parse_fails("1 = 2"));
}

#[test]
fn test_parse_range_and_conditional() {
    assert_eq!(round_trip("1:2:10"), "1:2:10");
    let Node::Range { step, .. } = parse_ok("1:3") else {
        panic!("Expected range");
    };
    assert!(step.is_none());
    let Node::Conditional { true_expr, .. } = parse_ok("a > 0 ? 1 : 2") else {
        panic!("Expected conditional");
    };
    assert_eq!(*true_expr, num(1.0));
}

#[test]
fn test_parse_block() {
    let Node::Block(statements) = parse_ok("a = 1; a + 1") else {
        panic!("Expected block");
    };
    assert_eq!(statements.len(), 2);
    assert!(matches!(parse_ok("x;"), Node::Block(_)));
}

// ============================================
// Errors
// ============================================

#[test]
fn test_parse_errors() {
    assert!(parse_fails(""));
    assert!(parse_fails("1 +"));
    assert!(parse_fails("(1"));
    assert!(parse_fails("[1, 2"));
    assert!(parse_fails("a.+"));
    assert!(parse_fails("1 )"));
}

#[test]
fn test_parse_error_has_span() {
    let err = parse_expression("1 + )", &MathConfig::default()).unwrap_err();
    let span = err.span().expect("parser errors carry a span");
    assert_eq!((span.start, span.end), (4, 5));
    assert!(err.message().contains("expected an expression"));
}
