//! Document positions.
//!
//! Patterns produce byte offsets into UTF-8 text, hosts address text either by
//! absolute character position or by [`Point`]. [`LineIndex`] converts between all
//! three without rescanning the document for every conversion.

use crate::etc;
use std::cmp;

/// A `0`-based line and character column.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Point {
    pub line: usize,
    pub col: usize,
}

impl Point {
    pub fn new(line: usize, col: usize) -> Point {
        Point { line, col }
    }
}

/// Line start table for a borrowed snapshot of text.
pub struct LineIndex<'a> {
    text: &'a str,

    /// Pairs of (byte offset, character position) at which each line starts.
    starts: Vec<(usize, usize)>,

    /// Pairs of (byte offset, character position) at every
    /// [`CHECKPOINT`](Self::CHECKPOINT) characters, which bound the scan needed to
    /// locate an offset on a long line.
    checkpoints: Vec<(usize, usize)>,

    /// Total number of characters in [`text`](Self::text).
    chars: usize,
}

impl<'a> LineIndex<'a> {
    const CHECKPOINT: usize = 64;

    pub fn new(text: &'a str) -> LineIndex<'a> {
        let mut starts = vec![(0, 0)];
        let mut checkpoints = vec![(0, 0)];
        let mut chars = 0;
        for (offset, c) in text.char_indices() {
            if chars % Self::CHECKPOINT == 0 && chars > 0 {
                checkpoints.push((offset, chars));
            }
            chars += 1;
            if c == '\n' {
                starts.push((offset + 1, chars));
            }
        }
        LineIndex {
            text,
            starts,
            checkpoints,
            chars,
        }
    }

    pub fn chars(&self) -> usize {
        self.chars
    }

    /// Returns the character position and point of byte `offset`, which must be
    /// aligned to a UTF-8 code point boundary.
    pub fn locate(&self, offset: usize) -> (usize, Point) {
        let offset = cmp::min(offset, self.text.len());
        let line = Self::before(&self.starts, offset);
        let (line_ofs, line_pos) = self.starts[line];

        // Scan forward from whichever of the line start or the nearest checkpoint is
        // closer to `offset`.
        let (from_ofs, from_pos) = cmp::max(
            (line_ofs, line_pos),
            self.checkpoints[Self::before(&self.checkpoints, offset)],
        );
        let pos = from_pos + etc::offset_to_pos(&self.text[from_ofs..], offset - from_ofs);
        (pos, Point::new(line, pos - line_pos))
    }

    /// Returns the character position of `p`, where columns beyond the end of a line
    /// are clamped to that line's end and lines beyond the last line resolve to the
    /// end of text.
    pub fn pos(&self, p: Point) -> usize {
        match self.starts.get(p.line) {
            Some(&(_, start)) => {
                let end = self
                    .starts
                    .get(p.line + 1)
                    .map(|&(_, next)| next - 1)
                    .unwrap_or(self.chars);
                cmp::min(start + p.col, end)
            }
            None => self.chars,
        }
    }

    /// Returns the index of the last entry of `table` at or before byte `offset`.
    fn before(table: &[(usize, usize)], offset: usize) -> usize {
        table.partition_point(|&(ofs, _)| ofs <= offset) - 1
    }
}
