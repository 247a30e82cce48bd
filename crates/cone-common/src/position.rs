//! Line/column positions for diagnostic rendering.
//!
//! The IR and lexer track byte offsets (`Span`); diagnostics need to show
//! the user a `file:line:column` and the offending source line with a caret,
//! per spec §7. `LineMap` converts between the two.

/// A 1-indexed line/column position, matching the node header's
/// "column-of-token" / "column-of-line" fields (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Maps byte offsets to line/column positions for a single source file.
///
/// Built once per file (incrementally by the lexer as it scans, or in one
/// pass over already-loaded text) and queried by the diagnostic renderer.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offset where each line starts; `line_starts[0]` is always 0.
    line_starts: Vec<u32>,
}

impl LineMap {
    #[must_use]
    pub fn build(source: &str) -> Self {
        let mut map = LineMap { line_starts: vec![0] };
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                map.push_line_start(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        map
    }

    /// Record that a new line starts at `offset`. Called incrementally by
    /// the lexer so it never has to re-scan already-consumed source.
    pub fn push_line_start(&mut self, offset: u32) {
        if self.line_starts.last() != Some(&offset) {
            self.line_starts.push(offset);
        }
    }

    #[must_use]
    pub fn position_for(&self, offset: u32) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        Position::new(u32::try_from(line + 1).unwrap_or(u32::MAX), offset - line_start + 1)
    }

    #[must_use]
    pub fn line_text<'a>(&self, line: u32, source: &'a str) -> &'a str {
        let idx = line.saturating_sub(1) as usize;
        let Some(&start) = self.line_starts.get(idx) else {
            return "";
        };
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&e| e.saturating_sub(1))
            .unwrap_or(source.len() as u32);
        source.get(start as usize..(end as usize).max(start as usize)).unwrap_or("")
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_position() {
        let map = LineMap::build("fn main() {}");
        let pos = map.position_for(3);
        assert_eq!(pos, Position::new(1, 4));
    }

    #[test]
    fn multi_line_position_and_text() {
        let source = "fn f() {\n  return 1\n}\n";
        let map = LineMap::build(source);
        // offset of 'return' is 11
        let pos = map.position_for(11);
        assert_eq!(pos.line, 2);
        assert_eq!(map.line_text(2, source), "  return 1");
    }

    #[test]
    fn incremental_build_matches_batch() {
        let source = "a\nbb\nccc";
        let batch = LineMap::build(source);
        let mut incremental = LineMap { line_starts: vec![0] };
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                incremental.push_line_start(u32::try_from(i + 1).unwrap());
            }
        }
        assert_eq!(batch.line_starts, incremental.line_starts);
    }
}
