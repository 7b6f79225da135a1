//! Page fragments: the compiled form of a template.

use super::expr::Expr;

/// A filter application inside a variable fragment: `| name(args)` or
/// `| name: free text`.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCall {
    pub name: String,
    /// Parsed argument expressions, evaluated per render.
    pub args: Vec<Expr>,
    /// Source text of each argument as written.
    pub raw_args: Vec<String>,
}

impl FilterCall {
    pub fn new(name: impl Into<String>) -> Self {
        FilterCall {
            name: name.into(),
            args: Vec::new(),
            raw_args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_arg(mut self, raw: impl Into<String>, arg: Expr) -> Self {
        self.raw_args.push(raw.into());
        self.args.push(arg);
        self
    }
}

/// `{{ expr | filter | ... }}`
#[derive(Clone, Debug, PartialEq)]
pub struct VariableFragment {
    /// Full tag text including the delimiters, emitted verbatim when the
    /// leading filter cannot be resolved.
    pub original_text: String,
    pub expr: Expr,
    pub filters: Vec<FilterCall>,
}

impl VariableFragment {
    /// Name of the bound variable when the head expression is a bare
    /// identifier.
    pub fn binding(&self) -> Option<&str> {
        self.expr.as_identifier()
    }

    /// Last filter applied, or the bare binding when there are no filters.
    ///
    /// This is the name that decides whether the fragment produces output.
    pub fn last_name(&self) -> Option<&str> {
        match self.filters.last() {
            Some(filter) => Some(filter.name.as_str()),
            None => self.binding(),
        }
    }
}

/// `{{#name argument}} body {{else ...}} body {{/name}}`
#[derive(Clone, Debug, PartialEq)]
pub struct BlockFragment {
    pub name: String,
    /// Raw argument text after the block name, trimmed.
    pub argument: String,
    pub body: Vec<PageFragment>,
    /// `{{else}}` / `{{else if cond}}` branches, in source order. Each branch
    /// is named `else` and carries the text after `else` as its argument.
    pub else_branches: Vec<BlockFragment>,
}

impl BlockFragment {
    pub fn new(name: impl Into<String>, argument: impl Into<String>) -> Self {
        BlockFragment {
            name: name.into(),
            argument: argument.into(),
            body: Vec::new(),
            else_branches: Vec::new(),
        }
    }
}

/// One renderable unit of a page.
#[derive(Clone, Debug, PartialEq)]
pub enum PageFragment {
    Text(String),
    Variable(VariableFragment),
    Block(BlockFragment),
}

impl PageFragment {
    pub fn text(value: impl Into<String>) -> Self {
        PageFragment::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PageFragment::Text(text) => Some(text),
            _ => None,
        }
    }
}
