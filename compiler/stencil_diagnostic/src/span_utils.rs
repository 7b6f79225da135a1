//! Line and column lookup for byte offsets.
//!
//! Template errors are reported as byte positions; these helpers turn them
//! into 1-based `line:col` pairs and pull out the offending source line.

use stencil_ir::Span;

/// Byte offset of every line start in a source, for `O(log L)` lookups.
///
/// ```
/// use stencil_diagnostic::span_utils::LineOffsetTable;
///
/// let source = "<h1>\n{{ title }}\n</h1>";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
/// assert_eq!(table.offset_to_line_col(source, 8), (2, 4));
/// assert_eq!(table.line_text(source, 2), Some("{{ title }}"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    offsets: Vec<usize>,
}

impl LineOffsetTable {
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0];
        offsets.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        LineOffsetTable { offsets }
    }

    /// 1-based line containing `offset`.
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let offset = offset as usize;
        let idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(idx + 1).unwrap_or(u32::MAX)
    }

    /// 1-based `(line, column)`; the column counts characters, not bytes.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self.offsets[(line - 1) as usize];
        let end = (offset as usize).min(source.len());
        let col = source
            .get(line_start..end)
            .map_or(0, |prefix| prefix.chars().count());
        (line, u32::try_from(col + 1).unwrap_or(u32::MAX))
    }

    /// Text of a 1-based line, without its line terminator.
    pub fn line_text<'s>(&self, source: &'s str, line: u32) -> Option<&'s str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.offsets.get(idx)?;
        let end = self.offsets.get(idx + 1).map_or(source.len(), |next| next - 1);
        source
            .get(start..end)
            .map(|text| text.strip_suffix('\r').unwrap_or(text))
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}

/// 1-based `(line, column)` of a span's start. Use [`LineOffsetTable`] for
/// repeated lookups on the same source.
pub fn span_to_line_col(source: &str, span: Span) -> (u32, u32) {
    LineOffsetTable::build(source).offset_to_line_col(source, span.start)
}
