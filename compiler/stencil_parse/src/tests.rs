#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use stencil_ir::{ArrayElement, BinaryOp, Expr, LogicalOp, Property, TemplatePart, UnaryOp};

use super::*;

fn parse(source: &str) -> Expr {
    parse_expression(source).unwrap()
}

// -- literals and identifiers --

#[test]
fn literals() {
    assert_eq!(parse("42"), Expr::int(42));
    assert_eq!(parse("1.5e3"), Expr::double(1500.0));
    assert_eq!(parse("'it\\'s'"), Expr::string("it's"));
    assert_eq!(parse("true"), Expr::bool(true));
    assert_eq!(parse("null"), Expr::null());
}

#[test]
fn negative_literals_fold() {
    assert_eq!(parse("-5"), Expr::int(-5));
    assert_eq!(parse("-2.5"), Expr::double(-2.5));
    assert_eq!(parse("-x"), Expr::unary(UnaryOp::Neg, Expr::ident("x")));
    assert_eq!(parse("!ok"), Expr::unary(UnaryOp::Not, Expr::ident("ok")));
}

// -- precedence --

#[test]
fn multiplication_binds_tighter() {
    assert_eq!(
        parse("1 + 2 * 3"),
        Expr::binary(
            Expr::int(1),
            BinaryOp::Add,
            Expr::binary(Expr::int(2), BinaryOp::Mul, Expr::int(3))
        )
    );
}

#[test]
fn parentheses_reset_precedence() {
    assert_eq!(
        parse("(1 + 2) * 3"),
        Expr::binary(
            Expr::binary(Expr::int(1), BinaryOp::Add, Expr::int(2)),
            BinaryOp::Mul,
            Expr::int(3)
        )
    );
}

#[test]
fn same_level_associates_left() {
    assert_eq!(
        parse("10 - 4 - 3"),
        Expr::binary(
            Expr::binary(Expr::int(10), BinaryOp::Sub, Expr::int(4)),
            BinaryOp::Sub,
            Expr::int(3)
        )
    );
}

#[test]
fn comparison_below_shift_above_equality() {
    assert_eq!(
        parse("a << 1 < b == c"),
        Expr::binary(
            Expr::binary(
                Expr::binary(Expr::ident("a"), BinaryOp::Shl, Expr::int(1)),
                BinaryOp::Lt,
                Expr::ident("b")
            ),
            BinaryOp::Eq,
            Expr::ident("c")
        )
    );
}

#[test]
fn word_operators_alias_logical() {
    assert_eq!(
        parse("a and b or c"),
        Expr::logical(
            Expr::logical(Expr::ident("a"), LogicalOp::And, Expr::ident("b")),
            LogicalOp::Or,
            Expr::ident("c")
        )
    );
}

#[test]
fn coalesce_shares_or_level() {
    assert_eq!(
        parse("a ?? b || c"),
        Expr::logical(
            Expr::logical(Expr::ident("a"), LogicalOp::Coalesce, Expr::ident("b")),
            LogicalOp::Or,
            Expr::ident("c")
        )
    );
}

#[test]
fn pipe_is_bitwise_or_outside_fragments() {
    assert_eq!(
        parse("1 | 2"),
        Expr::binary(Expr::int(1), BinaryOp::BitOr, Expr::int(2))
    );
}

#[test]
fn pipe_ends_fragment_expressions_at_top_level() {
    let mut parser = Parser::for_fragment("a | upper", 0);
    assert_eq!(parser.parse_expr().unwrap(), Expr::ident("a"));
    assert_eq!(parser.position(), 2);

    let mut nested = Parser::for_fragment("(a | 1) | upper", 0);
    assert_eq!(
        nested.parse_expr().unwrap(),
        Expr::binary(Expr::ident("a"), BinaryOp::BitOr, Expr::int(1))
    );
}

// -- postfix --

#[test]
fn member_chains_fold_left() {
    assert_eq!(
        parse("a.b[0].c(1, 'x')"),
        Expr::call(
            Expr::member(Expr::index(Expr::member(Expr::ident("a"), "b"), Expr::int(0)), "c"),
            vec![Expr::int(1), Expr::string("x")]
        )
    );
}

#[test]
fn postfix_binds_before_unary() {
    assert_eq!(
        parse("-a.b"),
        Expr::unary(UnaryOp::Neg, Expr::member(Expr::ident("a"), "b"))
    );
}

// -- arrows --

#[test]
fn arrow_forms() {
    assert_eq!(
        parse("it => it * it"),
        Expr::arrow(
            vec!["it".into()],
            Expr::binary(Expr::ident("it"), BinaryOp::Mul, Expr::ident("it"))
        )
    );
    assert_eq!(
        parse("(a, b) => a + b"),
        Expr::arrow(
            vec!["a".into(), "b".into()],
            Expr::binary(Expr::ident("a"), BinaryOp::Add, Expr::ident("b"))
        )
    );
    assert_eq!(parse("() => 1"), Expr::arrow(vec![], Expr::int(1)));
    assert_eq!(parse("(a)"), Expr::ident("a"));
}

#[test]
fn arrow_as_call_argument() {
    assert_eq!(
        parse("map(x => x.id)"),
        Expr::call(
            Expr::ident("map"),
            vec![Expr::arrow(vec!["x".into()], Expr::member(Expr::ident("x"), "id"))]
        )
    );
}

// -- collections and templates --

#[test]
fn arrays_with_spread() {
    assert_eq!(
        parse("[1, ...rest, 3,]"),
        Expr::Array(vec![
            ArrayElement::Item(Expr::int(1)),
            ArrayElement::Spread(Expr::ident("rest")),
            ArrayElement::Item(Expr::int(3)),
        ])
    );
}

#[test]
fn object_key_forms() {
    assert_eq!(
        parse("{ a, 'b c': 2, [k]: 3, ...o }"),
        Expr::Object(vec![
            Property {
                key: Some(Expr::string("a")),
                value: Expr::ident("a"),
                shorthand: true,
            },
            Property {
                key: Some(Expr::string("b c")),
                value: Expr::int(2),
                shorthand: false,
            },
            Property {
                key: Some(Expr::ident("k")),
                value: Expr::int(3),
                shorthand: false,
            },
            Property {
                key: None,
                value: Expr::ident("o"),
                shorthand: false,
            },
        ])
    );
}

#[test]
fn template_literals_split_on_holes() {
    assert_eq!(
        parse("`Hi ${name}, ${1 + 1}!\\n`"),
        Expr::Template {
            quasis: vec![
                TemplatePart {
                    text: "Hi ".into(),
                    tail: false
                },
                TemplatePart {
                    text: ", ".into(),
                    tail: false
                },
                TemplatePart {
                    text: "!\n".into(),
                    tail: true
                },
            ],
            exprs: vec![
                Expr::ident("name"),
                Expr::binary(Expr::int(1), BinaryOp::Add, Expr::int(1)),
            ],
        }
    );
}

#[test]
fn display_round_trips_through_the_parser() {
    for source in [
        "(1 + 2) * 3",
        "a.b[0].c(1, 'x')",
        "x => x.name",
        "{ a: 1, ...rest }",
        "!(a && b)",
    ] {
        assert_eq!(parse(source).to_string(), source);
    }
}

// -- errors --

#[test]
fn missing_operand_after_operator() {
    let err = parse_expression("1 +").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::ExpectedExpression);
    assert_eq!(err.position, 3);
}

#[test]
fn unclosed_paren() {
    let err = parse_expression("(1 + 2").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnclosedDelimiter);
    assert_eq!(err.message, "Expected ')' but found 'end of expression'");
}

#[test]
fn unterminated_string() {
    let err = parse_expression("'abc").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::Lex(_)));
    assert_eq!(err.position, 0);
}

#[test]
fn trailing_tokens() {
    let err = parse_expression("1 2").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
    assert_eq!(err.position, 2);
}

#[test]
fn template_hole_errors_are_absolute() {
    let err = parse_expression("`ab ${ 1 + }`").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::ExpectedExpression);
    assert_eq!(err.position, 11);
}

// -- generated input --

#[derive(Clone, Debug)]
enum Arith {
    Num(i64),
    Op(Box<Arith>, char, Box<Arith>),
}

impl Arith {
    fn source(&self) -> String {
        match self {
            Arith::Num(n) => n.to_string(),
            Arith::Op(l, op, r) => format!("({} {op} {})", l.source(), r.source()),
        }
    }

    fn value(&self) -> i64 {
        match self {
            Arith::Num(n) => *n,
            Arith::Op(l, '+', r) => l.value().wrapping_add(r.value()),
            Arith::Op(l, '-', r) => l.value().wrapping_sub(r.value()),
            Arith::Op(l, _, r) => l.value().wrapping_mul(r.value()),
        }
    }

}

fn eval(expr: &Expr) -> i64 {
    match expr {
        Expr::Literal(stencil_ir::Literal::Int(n)) => *n,
        Expr::Binary { left, op, right } => match op {
            BinaryOp::Add => eval(left).wrapping_add(eval(right)),
            BinaryOp::Sub => eval(left).wrapping_sub(eval(right)),
            BinaryOp::Mul => eval(left).wrapping_mul(eval(right)),
            other => panic!("unexpected operator {other}"),
        },
        other => panic!("unexpected node {other}"),
    }
}

fn arith() -> impl Strategy<Value = Arith> {
    let leaf = (0i64..1000).prop_map(Arith::Num);
    leaf.prop_recursive(4, 32, 2, |inner| {
        (inner.clone(), prop::sample::select(vec!['+', '-', '*']), inner)
            .prop_map(|(l, op, r)| Arith::Op(Box::new(l), op, Box::new(r)))
    })
}

proptest! {
    #[test]
    fn arithmetic_matches_host_evaluation(tree in arith()) {
        prop_assert_eq!(eval(&parse_expression(&tree.source()).unwrap()), tree.value());
    }

    #[test]
    fn parsing_never_panics(source in "[a-z0-9 '\"`$(){}\\[\\].,+*/|&!?:=<>-]{0,40}") {
        let _ = parse_expression(&source);
    }

    #[test]
    fn compiling_never_panics(source in "[a-z{}#/|*' \n:()-]{0,60}") {
        let _ = compile_page(&source);
    }
}
