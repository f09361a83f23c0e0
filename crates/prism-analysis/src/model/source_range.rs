//! Source coordinates.
//!
//! Parsers work in byte offsets ([`Span`]); everything user facing is
//! reported as 0-based line/column pairs ([`SourceRange`]). [`LineIndex`]
//! converts between the two, and [`LocationOffset`] shifts the coordinates of
//! an inline document (a `<script>` body, a `<style>` body) back into the file
//! that contains it.

use std::fmt;

use prism_graph::ResolvedUrl;
use serde::Serialize;

/// A half-open byte range into a document's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A 0-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A range of positions within one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRange {
    pub file: ResolvedUrl,
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceRange {
    /// The empty range at the very start of `file`.
    pub fn file_start(file: ResolvedUrl) -> Self {
        Self {
            file,
            start: SourcePosition::default(),
            end: SourcePosition::default(),
        }
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file,
            self.start.line + 1,
            self.start.column + 1
        )
    }
}

/// Where an inline document begins inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LocationOffset {
    pub line: usize,
    pub col: usize,
}

impl LocationOffset {
    /// Translate a position local to the inline document into the container.
    ///
    /// Only the first line of the inline document is shifted horizontally.
    pub fn apply(&self, position: SourcePosition) -> SourcePosition {
        let column = if position.line == 0 {
            position.column + self.col
        } else {
            position.column
        };
        SourcePosition::new(position.line + self.line, column)
    }
}

/// Precomputed line starts for offset to position conversion.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(memchr::memchr_iter(b'\n', source.as_bytes()).map(|idx| idx + 1));
        Self { line_starts }
    }

    /// Convert a byte offset into a position. Columns count characters.
    pub fn position(&self, source: &str, offset: usize) -> SourcePosition {
        let offset = offset.min(source.len());
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let column = source
            .get(line_start..offset)
            .map_or(offset - line_start, |prefix| prefix.chars().count());
        SourcePosition::new(line, column)
    }

    /// Byte offset of a 0-based line and a column counted in UTF-16 code
    /// units, the way CSS tooling reports locations.
    pub fn offset_utf16(&self, source: &str, line: usize, column: usize) -> usize {
        let Some(&line_start) = self.line_starts.get(line) else {
            return source.len();
        };
        let mut units = 0;
        for (idx, ch) in source.get(line_start..).unwrap_or_default().char_indices() {
            if units >= column || ch == '\n' {
                return line_start + idx;
            }
            units += ch.len_utf16();
        }
        source.len()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_zero_based() {
        let source = "ab\ncd\n\nef";
        let index = LineIndex::new(source);
        assert_eq!(index.position(source, 0), SourcePosition::new(0, 0));
        assert_eq!(index.position(source, 4), SourcePosition::new(1, 1));
        assert_eq!(index.position(source, 7), SourcePosition::new(3, 0));
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        let source = "é = 1";
        let index = LineIndex::new(source);
        assert_eq!(index.position(source, 2), SourcePosition::new(0, 1));
    }

    #[test]
    fn offsets_past_the_end_clamp() {
        let source = "abc";
        let index = LineIndex::new(source);
        assert_eq!(index.position(source, 99), SourcePosition::new(0, 3));
    }

    #[test]
    fn utf16_columns_map_back_to_bytes() {
        let source = "a {}\n😀 b";
        let index = LineIndex::new(source);
        assert_eq!(index.offset_utf16(source, 0, 2), 2);
        // The emoji is two UTF-16 units and four bytes.
        assert_eq!(index.offset_utf16(source, 1, 3), 10);
        assert_eq!(index.offset_utf16(source, 0, 99), 4);
        assert_eq!(index.offset_utf16(source, 7, 0), source.len());
    }

    #[test]
    fn location_offset_shifts_first_line_only() {
        let offset = LocationOffset { line: 3, col: 10 };
        assert_eq!(
            offset.apply(SourcePosition::new(0, 2)),
            SourcePosition::new(3, 12)
        );
        assert_eq!(
            offset.apply(SourcePosition::new(2, 2)),
            SourcePosition::new(5, 2)
        );
    }
}
