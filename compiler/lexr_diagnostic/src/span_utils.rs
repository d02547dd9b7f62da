//! Line/column lookup for rendering spans.

use lexr_ir::Span;

/// Pre-computed line offset table for efficient line/column lookup.
///
/// ```
/// use lexr_diagnostic::span_utils::LineOffsetTable;
///
/// let source = "%%\n[a-z]+ { word(); }\n";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
/// assert_eq!(table.offset_to_line_col(source, 3), (2, 1));
/// assert_eq!(table.offset_to_line_col(source, 9), (2, 7));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// Byte offset of each line start; `offsets[0] == 0`.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable { offsets }
    }

    /// 1-based line containing `offset`.
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(line_idx).unwrap_or(u32::MAX - 1) + 1
    }

    /// 1-based `(line, column)`; the column counts characters, not bytes.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self.offsets.get((line - 1) as usize).copied().unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len());
        let col = source
            .get(line_start..end)
            .map_or(end.saturating_sub(line_start), |s| s.chars().count());
        (line, u32::try_from(col).unwrap_or(u32::MAX - 1) + 1)
    }

    /// The full text of the 1-based `line`, without its newline.
    pub fn line_text<'s>(&self, source: &'s str, line: u32) -> &'s str {
        let idx = (line.max(1) - 1) as usize;
        let Some(&start) = self.offsets.get(idx) else {
            return "";
        };
        let end = self
            .offsets
            .get(idx + 1)
            .map_or(source.len(), |&next| (next as usize).saturating_sub(1));
        source.get(start as usize..end).unwrap_or("")
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}

/// Convenience: `(line, column)` of a span start without building a table.
pub fn span_start_line_col(source: &str, span: Span) -> (u32, u32) {
    LineOffsetTable::build(source).offset_to_line_col(source, span.start)
}
