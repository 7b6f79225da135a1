//! Page fragment compiler.
//!
//! Splits page text into [`PageFragment`]s: literal text, `{{ expr | filters }}`
//! variables and `{{#name}} … {{/name}}` blocks. Block bodies compile
//! recursively except for verbatim blocks, whose body is kept as one text
//! fragment. All offsets in errors are absolute page positions.

mod scan;

use rustc_hash::FxHashSet;
use stencil_ir::{BlockFragment, Expr, FilterCall, PageFragment, VariableFragment};
use tracing::trace;

use crate::{ParseError, Parser};
use scan::{
    find_body_end, newline_len, read_name, skip_whitespace, split_clean_argument, BodyEnd,
};

/// Knobs the compiler takes from the template context.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Blocks whose body is never compiled (`raw`).
    pub verbatim_blocks: FxHashSet<String>,
    /// Filters (or bare bindings) that produce no output; a newline directly
    /// after a fragment ending in one of these is dropped.
    pub no_output_filters: FxHashSet<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            verbatim_blocks: std::iter::once("raw".to_string()).collect(),
            no_output_filters: FxHashSet::default(),
        }
    }
}

impl CompileOptions {
    pub fn is_verbatim(&self, name: &str) -> bool {
        self.verbatim_blocks.contains(name)
    }
}

/// Compiles page text with a fixed set of options.
pub struct PageCompiler<'o> {
    options: &'o CompileOptions,
}

impl<'o> PageCompiler<'o> {
    pub fn new(options: &'o CompileOptions) -> Self {
        PageCompiler { options }
    }

    /// Compile a whole page body. `base` is the body's offset in the file
    /// (non-zero after front matter).
    pub fn compile(&self, text: &str, base: usize) -> Result<Vec<PageFragment>, ParseError> {
        stencil_stack::ensure_sufficient_stack(|| self.compile_range(text, base))
    }

    fn compile_range(&self, text: &str, base: usize) -> Result<Vec<PageFragment>, ParseError> {
        let mut fragments = Vec::new();
        let mut last = 0;

        while let Some(found) = text[last..].find("{{") {
            let pos = last + found;
            if pos > last {
                fragments.push(PageFragment::text(&text[last..pos]));
            }

            let after = pos + 2;
            last = match text.as_bytes().get(after) {
                Some(b'*') => match text[after..].find("*}}") {
                    Some(end) => after + end + 3,
                    None => {
                        return Err(ParseError::new(
                            crate::ParseErrorKind::UnterminatedTag,
                            "Unterminated comment",
                            base + pos,
                        ))
                    }
                },
                Some(b'#') => {
                    let (block, next) = self.compile_block(text, pos, base)?;
                    trace!(name = %block.name, "compiled block");
                    fragments.push(PageFragment::Block(block));
                    next
                }
                _ => {
                    let (variable, next) = self.compile_variable(text, pos, base)?;
                    fragments.push(PageFragment::Variable(variable));
                    next
                }
            };
        }

        if last < text.len() {
            fragments.push(PageFragment::text(&text[last..]));
        }
        Ok(fragments)
    }

    /// `{{#name argument}}` at `pos`. Returns the block and the offset just
    /// past its close tag (and one trailing newline).
    fn compile_block(
        &self,
        text: &str,
        pos: usize,
        base: usize,
    ) -> Result<(BlockFragment, usize), ParseError> {
        let name_start = pos + 3;
        let name_end = read_name(text, name_start);
        let name = &text[name_start..name_end];
        let tag_end = text[name_end..]
            .find("}}")
            .map(|i| name_end + i)
            .ok_or_else(|| ParseError::unterminated_block_tag(name, base + pos))?;

        let mut block = BlockFragment::new(name, text[name_end..tag_end].trim());
        let body_start = tag_end + 2;

        if self.options.is_verbatim(name) {
            let close = format!("{{{{/{name}}}}}");
            let close_pos = text[body_start..]
                .find(&close)
                .map(|i| body_start + i)
                .ok_or_else(|| ParseError::unclosed_block(name, base + pos))?;
            block.body = vec![PageFragment::text(&text[body_start..close_pos])];
            let next = close_pos + close.len();
            return Ok((block, next + newline_len(&text[next..])));
        }

        let (body, mut cursor) = self.compile_body(text, body_start, name, base, pos)?;
        block.body = body;

        while text[cursor..].starts_with("{{else") {
            let else_tag_end = text[cursor..]
                .find("}}")
                .map(|i| cursor + i)
                .ok_or_else(|| ParseError::unterminated_block_tag("else", base + cursor))?;
            let mut branch = BlockFragment::new("else", text[cursor + 6..else_tag_end].trim());
            let (body, next) = self.compile_body(text, else_tag_end + 2, name, base, pos)?;
            branch.body = body;
            block.else_branches.push(branch);
            cursor = next;
        }

        // `cursor` is at `{{/name}}`
        let next = text[cursor..]
            .find("}}")
            .map_or(text.len(), |close| cursor + close + 2);
        Ok((block, next + newline_len(&text[next..])))
    }

    /// Compile one block body starting at `start`, up to the matching
    /// `{{else…}}` or `{{/name}}`. Returns the fragments and the offset of
    /// that terminating tag.
    fn compile_body(
        &self,
        text: &str,
        start: usize,
        name: &str,
        base: usize,
        open_pos: usize,
    ) -> Result<(Vec<PageFragment>, usize), ParseError> {
        let end = match find_body_end(text, start, name, self.options) {
            BodyEnd::Found(end) => end,
            BodyEnd::Unclosed => return Err(ParseError::unclosed_block(name, base + open_pos)),
            BodyEnd::UnterminatedTag(at) => {
                let inner = read_name(text, at + 3);
                return Err(ParseError::unterminated_block_tag(
                    &text[at + 3..inner],
                    base + at,
                ));
            }
        };
        let body_start = start + newline_len(&text[start..end]);
        let body = stencil_stack::ensure_sufficient_stack(|| {
            self.compile_range(&text[body_start..end], base + body_start)
        })?;
        Ok((body, end))
    }

    /// `{{ expr | filter … }}` at `pos`.
    fn compile_variable(
        &self,
        text: &str,
        pos: usize,
        base: usize,
    ) -> Result<(VariableFragment, usize), ParseError> {
        let head_start = pos + 2;
        let mut parser = Parser::for_fragment(&text[head_start..], base + head_start);
        let expr = parser.parse_expr()?;
        let mut cursor = skip_whitespace(text, head_start + parser.position());

        let mut filters = Vec::new();
        if text[cursor..].starts_with("}}") {
            cursor += 2;
        } else if text[cursor..].starts_with('|') {
            loop {
                cursor += if text[cursor..].starts_with("|>") { 2 } else { 1 };
                cursor = skip_whitespace(text, cursor);
                let (filter, next) = self.compile_filter(text, cursor, base)?;
                filters.push(filter);
                cursor = skip_whitespace(text, next);

                let rest = &text[cursor..];
                if rest.is_empty() {
                    return Err(ParseError::unterminated_filter(base + pos));
                }
                if rest.starts_with("}}") {
                    cursor += 2;
                    break;
                }
                if !rest.starts_with('|') {
                    let found = rest.chars().next().unwrap_or(' ');
                    return Err(ParseError::expected_filter_separator(found, base + cursor));
                }
            }
        } else {
            return Err(match text[cursor..].chars().next() {
                None => ParseError::unterminated_filter(base + pos),
                Some(found) => ParseError::expected_filter_separator(found, base + cursor),
            });
        }

        let variable = VariableFragment {
            original_text: text[pos..cursor].to_string(),
            expr,
            filters,
        };

        let elide = variable
            .last_name()
            .is_some_and(|name| self.options.no_output_filters.contains(name));
        if elide {
            cursor += newline_len(&text[cursor..]);
        }
        Ok((variable, cursor))
    }

    /// One filter at `start`: `name`, `name(args)`, `name: free text` or
    /// `name => body`.
    fn compile_filter(
        &self,
        text: &str,
        start: usize,
        base: usize,
    ) -> Result<(FilterCall, usize), ParseError> {
        let name_end = read_name(text, start);
        if name_end == start {
            let mut parser = Parser::new(&text[start..], base + start);
            return Err(match parser.parse_expr() {
                Err(err) => err,
                Ok(_) => ParseError::new(
                    crate::ParseErrorKind::UnexpectedToken,
                    "Expected filter name",
                    base + start,
                ),
            });
        }
        let mut filter = FilterCall::new(&text[start..name_end]);
        let after = skip_whitespace(text, name_end);
        let rest = &text[after..];

        if rest.starts_with(':') {
            let arg_start = after + 1;
            let Some((raw, end)) = split_clean_argument(text, arg_start) else {
                return Err(ParseError::unterminated_filter(base + start));
            };
            let template = raw.replace('{', "{{").replace('}', "}}");
            filter = filter.with_arg(raw, Expr::string(template));
            return Ok((filter, end));
        }

        if rest.starts_with("=>") {
            let body_start = after + 2;
            let mut parser = Parser::for_fragment(&text[body_start..], base + body_start);
            let body = parser.parse_expr()?;
            let body_end = body_start + parser.position();
            let raw = text[body_start..body_end].trim();
            filter = filter.with_arg(raw, Expr::arrow(vec!["it".to_string()], body));
            return Ok((filter, body_end));
        }

        if rest.starts_with('(') {
            let args_start = after + 1;
            let mut parser = Parser::for_fragment(&text[args_start..], base + args_start);
            for (arg, range) in parser.parse_call_args_with_source()? {
                filter = filter.with_arg(text[args_start..][range].trim(), arg);
            }
            return Ok((filter, args_start + parser.position()));
        }

        Ok((filter, name_end))
    }
}
