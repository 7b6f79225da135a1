use pretty_assertions::assert_eq;

use super::*;

#[test]
fn precedence_orders_multiplicative_above_bitwise() {
    assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
    assert!(BinaryOp::Add.precedence() > BinaryOp::Shl.precedence());
    assert!(BinaryOp::Shl.precedence() > BinaryOp::Lt.precedence());
    assert!(BinaryOp::Lt.precedence() > BinaryOp::Eq.precedence());
    assert!(BinaryOp::Eq.precedence() > BinaryOp::BitAnd.precedence());
    assert!(BinaryOp::BitAnd.precedence() > BinaryOp::BitXor.precedence());
    assert!(BinaryOp::BitXor.precedence() > BinaryOp::BitOr.precedence());
    assert!(BinaryOp::BitOr.precedence() > LogicalOp::And.precedence());
    assert!(LogicalOp::And.precedence() > LogicalOp::Or.precedence());
    assert_eq!(LogicalOp::Or.precedence(), LogicalOp::Coalesce.precedence());
}

#[test]
fn display_parenthesizes_looser_children() {
    let expr = Expr::binary(
        Expr::binary(Expr::int(1), BinaryOp::Add, Expr::int(2)),
        BinaryOp::Mul,
        Expr::int(3),
    );
    assert_eq!(expr.to_string(), "(1 + 2) * 3");

    let flat = Expr::binary(
        Expr::int(1),
        BinaryOp::Add,
        Expr::binary(Expr::int(2), BinaryOp::Mul, Expr::int(3)),
    );
    assert_eq!(flat.to_string(), "1 + 2 * 3");
}

#[test]
fn display_member_chains_and_calls() {
    let expr = Expr::call(
        Expr::member(Expr::index(Expr::ident("rows"), Expr::int(0)), "format"),
        vec![Expr::string("it's")],
    );
    assert_eq!(expr.to_string(), "rows[0].format('it\\'s')");
}

#[test]
fn display_literals_and_arrows() {
    let arrow = Expr::arrow(
        vec!["it".to_string()],
        Expr::binary(Expr::ident("it"), BinaryOp::Mul, Expr::ident("it")),
    );
    assert_eq!(arrow.to_string(), "it => it * it");

    let obj = Expr::Object(vec![
        Property {
            key: Some(Expr::string("a")),
            value: Expr::int(1),
            shorthand: false,
        },
        Property {
            key: Some(Expr::ident("k")),
            value: Expr::int(2),
            shorthand: false,
        },
        Property {
            key: None,
            value: Expr::ident("rest"),
            shorthand: false,
        },
    ]);
    assert_eq!(obj.to_string(), "{ a: 1, [k]: 2, ...rest }");
}

#[test]
fn root_identifier_walks_member_chain() {
    let expr = Expr::member(Expr::index(Expr::ident("a"), Expr::int(1)), "b");
    assert_eq!(expr.root_identifier(), Some("a"));
    assert_eq!(Expr::int(1).root_identifier(), None);
}

#[test]
fn variable_fragment_last_name_prefers_filters() {
    let bare = VariableFragment {
        original_text: "{{ end }}".to_string(),
        expr: Expr::ident("end"),
        filters: Vec::new(),
    };
    assert_eq!(bare.last_name(), Some("end"));

    let piped = VariableFragment {
        original_text: "{{ 1 | assignTo: x }}".to_string(),
        expr: Expr::int(1),
        filters: vec![FilterCall::new("assignTo").with_arg("x", Expr::string("x"))],
    };
    assert_eq!(piped.last_name(), Some("assignTo"));
    assert_eq!(piped.binding(), None);
}
