use serde::{Deserialize, Serialize};

use crate::ModulePath;

/// Byte-offset span into source text. Start is inclusive, end is exclusive.
///
/// All positions in the Vibefun compiler are tracked as byte offsets into
/// the original source string. Line/column information is computed on
/// demand via [`LineIndex`] when a [`Location`] is needed for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create a new span from byte offsets.
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start ({start}) must be <= end ({end})");
        Self { start, end }
    }

    /// A zero-length span at offset 0, for nodes synthesized by the
    /// desugarer with no surface counterpart.
    pub fn synthetic() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether the span is empty (zero-length).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one that covers both.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A resolved source position: file, 1-based line and column, byte offset.
///
/// Built from a [`Span`] plus the file's [`LineIndex`] when a diagnostic is
/// constructed; the AST and Core IR only carry spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: ModulePath,
    pub line: u32,
    pub col: u32,
    pub offset: u32,
}

impl Location {
    pub fn new(path: ModulePath, line: u32, col: u32, offset: u32) -> Self {
        Self {
            path,
            line,
            col,
            offset,
        }
    }

    /// Resolve the start of `span` against a line index.
    pub fn from_span(path: &ModulePath, index: &LineIndex, span: Span) -> Self {
        let (line, col) = index.line_col(span.start);
        Self {
            path: path.clone(),
            line,
            col,
            offset: span.start,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.line, self.col)
    }
}

/// Pre-computed index of line start positions for on-demand line/column
/// lookup.
///
/// Constructed once per source file, then used to convert byte offsets to
/// human-readable (line, column) pairs via binary search.
#[derive(Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line. The first entry is always 0.
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Build a line index by scanning the source text for newline characters.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 1-based (line, column) pair.
    ///
    /// Column is measured in bytes from the start of the line (1-based).
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        // partition_point returns the index of the first line_start > offset,
        // so the line index is one less than that.
        let line_idx = self.line_starts.partition_point(|&start| start <= offset);
        let line_idx = line_idx.saturating_sub(1);
        let line = (line_idx as u32) + 1;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Return the number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_new_and_len() {
        let span = Span::new(5, 10);
        assert_eq!(span.start, 5);
        assert_eq!(span.end, 10);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
    }

    #[test]
    fn span_merge() {
        let a = Span::new(5, 10);
        let b = Span::new(8, 15);
        let merged = a.merge(b);
        assert_eq!(merged.start, 5);
        assert_eq!(merged.end, 15);
    }

    #[test]
    fn line_index_multiple_lines() {
        let src = "hello\nworld\nfoo";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(6), (2, 1));
        assert_eq!(idx.line_col(12), (3, 1));
        assert_eq!(idx.line_col(13), (3, 2));
        assert_eq!(idx.line_count(), 3);
    }

    #[test]
    fn location_from_span() {
        let path = ModulePath::from("/proj/a.vf");
        let idx = LineIndex::new("let x = 1\nlet y = 2\n");
        let loc = Location::from_span(&path, &idx, Span::new(14, 15));
        assert_eq!(loc.line, 2);
        assert_eq!(loc.col, 5);
        assert_eq!(loc.offset, 14);
    }
}
