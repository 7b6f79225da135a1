//! Expression nodes.
//!
//! Expressions are small owned trees (`Box` children). A page holds a few
//! dozen of them at most, so an arena would buy nothing here; structural
//! equality on the plain tree is what the parser tests assert against.

use std::fmt;

use super::operators::{BinaryOp, LogicalOp, UnaryOp};

/// Literal values.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Double(f64),
    Str(String),
    Bool(bool),
    Null,
}

/// One element of an array literal.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayElement {
    Item(Expr),
    /// `...expr`: splices the source's elements in place.
    Spread(Expr),
}

/// One property of an object literal.
///
/// `key == None` marks a spread property (`...expr`), whose own properties
/// are copied in order. Written keys (`a:`, `'a':`, `1:`) are stored as
/// literals; any other key expression came from `[computed]` syntax.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub key: Option<Expr>,
    pub value: Expr,
    pub shorthand: bool,
}

/// A literal text segment of a template literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplatePart {
    pub text: String,
    /// Set on the final segment only.
    pub tail: bool,
}

/// Expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Identifier(String),
    /// `object.key` (`computed == false`, key is an `Identifier`) or
    /// `object[key]` (`computed == true`).
    Member {
        object: Box<Expr>,
        key: Box<Expr>,
        computed: bool,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Array(Vec<ArrayElement>),
    Object(Vec<Property>),
    /// Template literal: `quasis.len() == exprs.len() + 1`.
    Template {
        quasis: Vec<TemplatePart>,
        exprs: Vec<Expr>,
    },
    Arrow {
        params: Vec<String>,
        body: Box<Expr>,
    },
}

impl Expr {
    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }

    pub fn double(value: f64) -> Self {
        Expr::Literal(Literal::Double(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::Str(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Expr::Literal(Literal::Bool(value))
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    /// `object.name`
    pub fn member(object: Expr, name: impl Into<String>) -> Self {
        Expr::Member {
            object: Box::new(object),
            key: Box::new(Expr::Identifier(name.into())),
            computed: false,
        }
    }

    /// `object[key]`
    pub fn index(object: Expr, key: Expr) -> Self {
        Expr::Member {
            object: Box::new(object),
            key: Box::new(key),
            computed: true,
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn logical(left: Expr, op: LogicalOp, right: Expr) -> Self {
        Expr::Logical {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn arrow(params: Vec<String>, body: Expr) -> Self {
        Expr::Arrow {
            params,
            body: Box::new(body),
        }
    }

    /// The identifier name if this is a bare identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Root identifier of a member chain (`a` for `a.b[0].c`).
    pub fn root_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name),
            Expr::Member { object, .. } => object.root_identifier(),
            _ => None,
        }
    }

    /// Binding power of the node when printed, for parenthesization.
    fn display_precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Logical { op, .. } => op.precedence(),
            Expr::Arrow { .. } => 0,
            Expr::Unary { .. } => 12,
            _ => u8::MAX,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        if self.display_precedence() < parent {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in s.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("'")
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Double(n) => write!(f, "{n}"),
            Literal::Str(s) => write_quoted(f, s),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Null => f.write_str("null"),
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for ArrayElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayElement::Item(expr) => write!(f, "{expr}"),
            ArrayElement::Spread(expr) => write!(f, "...{expr}"),
        }
    }
}

fn is_plain_key(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            None => write!(f, "...{}", self.value),
            Some(_) if self.shorthand => write!(f, "{}", self.value),
            Some(Expr::Literal(Literal::Str(name))) if is_plain_key(name) => {
                write!(f, "{name}: {}", self.value)
            }
            Some(Expr::Literal(lit)) => write!(f, "{lit}: {}", self.value),
            Some(key) => write!(f, "[{key}]: {}", self.value),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{lit}"),
            Expr::Identifier(name) => f.write_str(name),
            Expr::Member {
                object,
                key,
                computed,
            } => {
                object.fmt_operand(f, u8::MAX)?;
                if *computed {
                    write!(f, "[{key}]")
                } else {
                    write!(f, ".{key}")
                }
            }
            Expr::Call { callee, args } => {
                callee.fmt_operand(f, u8::MAX)?;
                f.write_str("(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Expr::Binary { left, op, right } => {
                let prec = op.precedence();
                left.fmt_operand(f, prec)?;
                write!(f, " {op} ")?;
                right.fmt_operand(f, prec.saturating_add(1))
            }
            Expr::Logical { left, op, right } => {
                let prec = op.precedence();
                left.fmt_operand(f, prec)?;
                write!(f, " {op} ")?;
                right.fmt_operand(f, prec.saturating_add(1))
            }
            Expr::Unary { op, operand } => {
                write!(f, "{op}")?;
                operand.fmt_operand(f, 12)
            }
            Expr::Array(elements) => {
                f.write_str("[")?;
                write_list(f, elements)?;
                f.write_str("]")
            }
            Expr::Object(props) => {
                if props.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                write_list(f, props)?;
                f.write_str(" }")
            }
            Expr::Template { quasis, exprs } => {
                f.write_str("`")?;
                for (i, part) in quasis.iter().enumerate() {
                    f.write_str(&part.text)?;
                    if let Some(expr) = exprs.get(i) {
                        write!(f, "${{{expr}}}")?;
                    }
                }
                f.write_str("`")
            }
            Expr::Arrow { params, body } => {
                if let [single] = params.as_slice() {
                    write!(f, "{single} => {body}")
                } else {
                    write!(f, "({}) => {body}", params.join(", "))
                }
            }
        }
    }
}
