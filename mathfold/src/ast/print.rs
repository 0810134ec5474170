//! Infix rendering of expression trees with minimal parentheses

use super::node::{ConstValue, Node, OperatorNode};
use num_traits::Signed;
use std::fmt;

const PREC_BLOCK: u8 = 0;
const PREC_ASSIGN: u8 = 1;
const PREC_CONDITIONAL: u8 = 2;
const PREC_OR: u8 = 3;
const PREC_AND: u8 = 4;
const PREC_COMPARE: u8 = 5;
const PREC_RANGE: u8 = 6;
const PREC_ADD: u8 = 7;
const PREC_MUL: u8 = 8;
const PREC_UNARY: u8 = 9;
const PREC_POW: u8 = 10;
const PREC_ATOM: u8 = 11;

fn precedence(node: &Node) -> u8 {
    match node {
        Node::Block(_) => PREC_BLOCK,
        Node::Assignment { .. } | Node::FunctionAssignment { .. } => PREC_ASSIGN,
        Node::Conditional { .. } => PREC_CONDITIONAL,
        Node::Range { .. } => PREC_RANGE,
        Node::Operator(op) => operator_precedence(op),
        Node::Constant(ConstValue::Number(n)) if *n < 0.0 => PREC_UNARY,
        Node::Constant(ConstValue::Decimal(d)) if d.is_negative() => PREC_UNARY,
        _ => PREC_ATOM,
    }
}

fn operator_precedence(op: &OperatorNode) -> u8 {
    if op.is_unary() {
        return PREC_UNARY;
    }
    match op.op.as_str() {
        "or" => PREC_OR,
        "and" => PREC_AND,
        "==" | "!=" | "<" | ">" | "<=" | ">=" => PREC_COMPARE,
        "+" | "-" => PREC_ADD,
        "^" => PREC_POW,
        _ => PREC_MUL,
    }
}

/// `a + (b + c)` prints without parentheses for associative operators
fn continues_chain(parent: &OperatorNode, child: &Node) -> bool {
    matches!(child, Node::Operator(c)
        if c.fn_name == parent.fn_name && matches!(parent.fn_name.as_str(), "add" | "multiply"))
}

struct Wrapped<'a>(&'a Node, bool);

impl fmt::Display for Wrapped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.1 {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Node], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_operator(f: &mut fmt::Formatter<'_>, op: &OperatorNode) -> fmt::Result {
    let prec = operator_precedence(op);
    match op.args.as_slice() {
        [] => write!(f, "{}", op.op),
        [operand] => {
            let sep = if op.op.chars().all(char::is_alphabetic) { " " } else { "" };
            let paren = precedence(operand) <= PREC_UNARY;
            write!(f, "{}{}{}", op.op, sep, Wrapped(operand, paren))
        }
        [lhs, rhs] => {
            let right_assoc = op.op == "^";
            let lhs_paren = if right_assoc {
                precedence(lhs) <= prec
            } else {
                precedence(lhs) < prec
            };
            let rhs_prec = precedence(rhs);
            let rhs_paren = if right_assoc {
                rhs_prec < prec
            } else {
                rhs_prec < prec || (rhs_prec == prec && !continues_chain(op, rhs))
            };
            if op.implicit {
                write!(f, "{} {}", Wrapped(lhs, lhs_paren), Wrapped(rhs, rhs_paren))
            } else {
                write!(f, "{} {} {}", Wrapped(lhs, lhs_paren), op.op, Wrapped(rhs, rhs_paren))
            }
        }
        args => {
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", op.op)?;
                }
                write!(f, "{}", Wrapped(arg, precedence(arg) <= prec))?;
            }
            Ok(())
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Number(n) if n.is_nan() => write!(f, "NaN"),
            ConstValue::Number(n) if n.is_infinite() => {
                write!(f, "{}Infinity", if *n < 0.0 { "-" } else { "" })
            }
            ConstValue::Number(n) => write!(f, "{n}"),
            ConstValue::Decimal(d) => write!(f, "{d}"),
            ConstValue::Text(s) => write!(f, "{s:?}"),
            ConstValue::Bool(b) => write!(f, "{b}"),
            ConstValue::Null => write!(f, "null"),
            ConstValue::Undefined => write!(f, "undefined"),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Symbol(name) => write!(f, "{name}"),
            Node::Constant(value) => write!(f, "{value}"),
            Node::Operator(op) => write_operator(f, op),
            Node::Call { name, args } => {
                write!(f, "{name}(")?;
                write_list(f, args, ", ")?;
                write!(f, ")")
            }
            Node::Parenthesis(inner) => write!(f, "({inner})"),
            Node::Accessor { object, index } => {
                let paren = precedence(object) < PREC_ATOM;
                write!(f, "{}", Wrapped(object, paren))?;
                match index.as_ref() {
                    Node::Index(_) => write!(f, "{index}"),
                    other => write!(f, "[{other}]"),
                }
            }
            Node::Index(dims) | Node::Array(dims) => {
                write!(f, "[")?;
                write_list(f, dims, ", ")?;
                write!(f, "]")
            }
            Node::Object(props) => {
                write!(f, "{{")?;
                for (i, (key, value)) in props.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                write!(f, "}}")
            }
            Node::Assignment { target, value } => write!(f, "{target} = {value}"),
            Node::Block(statements) => write_list(f, statements, "; "),
            Node::FunctionAssignment { name, params, body } => {
                write!(f, "{name}({}) = {body}", params.join(", "))
            }
            Node::Range { start, end, step } => {
                let part = |n: &Node| precedence(n) <= PREC_RANGE;
                write!(f, "{}", Wrapped(start, part(start)))?;
                if let Some(step) = step {
                    write!(f, ":{}", Wrapped(step, part(step)))?;
                }
                write!(f, ":{}", Wrapped(end, part(end)))
            }
            Node::Conditional {
                condition,
                true_expr,
                false_expr,
            } => {
                let part = |n: &Node| precedence(n) <= PREC_CONDITIONAL;
                write!(
                    f,
                    "{} ? {} : {}",
                    Wrapped(condition, part(condition)),
                    Wrapped(true_expr, part(true_expr)),
                    Wrapped(false_expr, precedence(false_expr) < PREC_CONDITIONAL)
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(a: Node, b: Node) -> Node {
        Node::binary("+", "add", a, b)
    }

    fn mul(a: Node, b: Node) -> Node {
        Node::binary("*", "multiply", a, b)
    }

    #[test]
    fn test_print_numbers() {
        assert_eq!(Node::number(2.0).to_string(), "2");
        assert_eq!(Node::number(6.28).to_string(), "6.28");
        assert_eq!(Node::number(f64::INFINITY).to_string(), "Infinity");
    }

    #[test]
    fn test_print_minimal_parentheses() {
        let x = Node::symbol("x");
        let t = Node::symbol("t");
        assert_eq!(mul(add(x.clone(), Node::number(1.0)), t.clone()).to_string(), "(x + 1) * t");
        assert_eq!(add(x.clone(), mul(Node::number(2.0), t.clone())).to_string(), "x + 2 * t");
        assert_eq!(add(x.clone(), add(t.clone(), Node::number(1.0))).to_string(), "x + t + 1");
        let sub = Node::binary("-", "subtract", x.clone(), add(t, Node::number(1.0)));
        assert_eq!(sub.to_string(), "x - (t + 1)");
    }

    #[test]
    fn test_print_power_is_right_associative() {
        let x = Node::symbol("x");
        let pow = |a, b| Node::binary("^", "pow", a, b);
        assert_eq!(pow(x.clone(), pow(Node::number(2.0), Node::number(3.0))).to_string(), "x ^ 2 ^ 3");
        assert_eq!(pow(pow(x, Node::number(2.0)), Node::number(3.0)).to_string(), "(x ^ 2) ^ 3");
    }

    #[test]
    fn test_print_unary_and_implicit() {
        assert_eq!(Node::unary_minus(Node::number(3.0)).to_string(), "-3");
        let nested = Node::unary_minus(Node::unary_minus(Node::symbol("x")));
        assert_eq!(nested.to_string(), "-(-x)");
        let implicit = Node::Operator(OperatorNode {
            op: "*".into(),
            fn_name: "multiply".into(),
            args: vec![Node::number(6.28), Node::symbol("t")],
            implicit: true,
        });
        assert_eq!(implicit.to_string(), "6.28 t");
    }

    #[test]
    fn test_print_structures() {
        let access = Node::accessor(
            Node::symbol("A"),
            Node::Index(vec![Node::number(1.0), Node::symbol("x")]),
        );
        assert_eq!(access.to_string(), "A[1, x]");
        let obj = Node::Object(
            [("a".to_string(), Node::number(1.0)), ("b".to_string(), Node::string("s"))]
                .into_iter()
                .collect(),
        );
        assert_eq!(obj.to_string(), r#"{"a": 1, "b": "s"}"#);
        let call = Node::call("cos", vec![Node::number(0.0)]);
        assert_eq!(call.to_string(), "cos(0)");
    }
}
