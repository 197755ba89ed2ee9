//! Rope-based text buffer, cursor positions, and the read-only buffer view
//! consumed by the word-motion engine.
//!
//! Lines are addressed 1-indexed (editor convention) and columns are 0-indexed
//! byte offsets into the line's UTF-8 content, excluding the line terminator.

use std::borrow::Cow;

use anyhow::Result;
use ropey::Rope;

pub mod class;
pub mod motion;
pub mod token;
pub mod word;

/// A text buffer backed by a `ropey::Rope`.
#[derive(Debug, Clone)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
    tabstop: usize,
}

/// A cursor inside a buffer: 1-indexed line, 0-indexed byte column.
///
/// Ordering is document order (line first, then column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CursorPosition {
    pub line: usize,
    pub col: usize,
}

impl CursorPosition {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    pub fn origin() -> Self {
        Self { line: 1, col: 0 }
    }
}

impl Default for CursorPosition {
    fn default() -> Self {
        Self::origin()
    }
}

/// Outcome of a word motion computed for a visual or operator-pending context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionResult {
    pub cursor: CursorPosition,
    /// A delete over this range must become a whole-line delete.
    pub d_special: bool,
    /// No progress was possible; a pending change must be cancelled.
    pub prevent_change: bool,
}

impl MotionResult {
    pub fn plain(cursor: CursorPosition) -> Self {
        Self {
            cursor,
            d_special: false,
            prevent_change: false,
        }
    }
}

/// Read-only line access used by the motion engine and the adapter.
///
/// `line` is 1-indexed and yields content without the line terminator.
pub trait BufferView {
    fn line_count(&self) -> usize;

    fn line(&self, lnum: usize) -> Option<Cow<'_, str>>;

    fn line_byte_len(&self, lnum: usize) -> usize {
        self.line(lnum).map(|l| l.len()).unwrap_or(0)
    }

    /// Display cells between tab stops.
    fn tabstop(&self) -> usize {
        grapheme::DEFAULT_TABSTOP
    }
}

impl<S: AsRef<str>> BufferView for [S] {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line(&self, lnum: usize) -> Option<Cow<'_, str>> {
        let idx = lnum.checked_sub(1)?;
        self.get(idx).map(|s| Cow::Borrowed(s.as_ref()))
    }
}

impl<S: AsRef<str>> BufferView for Vec<S> {
    fn line_count(&self) -> usize {
        self.as_slice().line_count()
    }

    fn line(&self, lnum: usize) -> Option<Cow<'_, str>> {
        self.as_slice().line(lnum)
    }
}

impl BufferView for Buffer {
    fn line_count(&self) -> usize {
        Buffer::line_count(self)
    }

    fn line(&self, lnum: usize) -> Option<Cow<'_, str>> {
        Buffer::line(self, lnum).map(Cow::Owned)
    }

    fn line_byte_len(&self, lnum: usize) -> usize {
        Buffer::line_byte_len(self, lnum)
    }

    fn tabstop(&self) -> usize {
        self.tabstop
    }
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
            tabstop: grapheme::DEFAULT_TABSTOP,
        })
    }

    /// Set the tab width used for display columns. Zero is treated as one.
    pub fn set_tabstop(&mut self, tabstop: usize) {
        self.tabstop = tabstop.max(1);
    }

    /// Construct a buffer whose lines are `lines` joined by `\n` (no trailing terminator).
    pub fn from_lines<S: AsRef<str>>(name: impl Into<String>, lines: &[S]) -> Result<Self> {
        let joined = lines
            .iter()
            .map(|l| l.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        Self::from_str(name, &joined)
    }

    /// Number of lines. A trailing `\n` terminates the last line rather than
    /// opening a new one, and an empty buffer still has one (empty) line.
    pub fn line_count(&self) -> usize {
        let n = self.rope.len_lines();
        let len = self.rope.len_chars();
        if n > 1 && len > 0 && self.rope.char(len - 1) == '\n' {
            n - 1
        } else {
            n
        }
    }

    /// Content of line `lnum` (1-indexed) without its terminator.
    pub fn line(&self, lnum: usize) -> Option<String> {
        if lnum == 0 || lnum > self.line_count() {
            return None;
        }
        let mut s = self.rope.line(lnum - 1).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        Some(s)
    }

    /// Byte length of line `lnum` excluding any newline.
    pub fn line_byte_len(&self, lnum: usize) -> usize {
        if lnum == 0 || lnum > self.line_count() {
            return 0;
        }
        let line = self.rope.line(lnum - 1);
        let bytes = line.len_bytes();
        if bytes > 0 && line.char(line.len_chars() - 1) == '\n' {
            bytes - 1
        } else {
            bytes
        }
    }

    /// Whole buffer contents.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// All lines as owned strings.
    pub fn lines(&self) -> Vec<String> {
        (1..=self.line_count())
            .filter_map(|l| self.line(l))
            .collect()
    }

    fn line_start_byte(&self, lnum: usize) -> usize {
        let idx = lnum.saturating_sub(1).min(self.rope.len_lines().saturating_sub(1));
        self.rope.char_to_byte(self.rope.line_to_char(idx))
    }

    /// Absolute byte offset of a position (column clamped to the line content).
    pub fn absolute_byte_index(&self, pos: CursorPosition) -> usize {
        self.line_start_byte(pos.line) + pos.col.min(self.line_byte_len(pos.line))
    }

    /// Return the UTF-8 slice in the absolute byte range `[start,end)`.
    /// Offsets must lie on character boundaries.
    pub fn slice_bytes(&self, start: usize, end: usize) -> String {
        let total = self.rope.len_bytes();
        let s = start.min(total);
        let e = end.min(total);
        if s >= e {
            return String::new();
        }
        let start_char = self.rope.byte_to_char(s);
        let end_char = self.rope.byte_to_char(e);
        self.rope.slice(start_char..end_char).to_string()
    }

    /// Delete the UTF-8 slice in absolute byte range `[start,end)` (clamped).
    /// Returns the removed text for register integration.
    pub fn delete_bytes(&mut self, start: usize, end: usize) -> String {
        let total = self.rope.len_bytes();
        let s = start.min(total);
        let e = end.min(total);
        if s >= e {
            return String::new();
        }
        let start_char = self.rope.byte_to_char(s);
        let end_char = self.rope.byte_to_char(e);
        let removed = self.rope.slice(start_char..end_char).to_string();
        self.rope.remove(start_char..end_char);
        removed
    }

    /// Delete lines `first..=last` (1-indexed, clamped) as a linewise operation.
    /// Returns the removed lines, each terminated by `\n`.
    pub fn delete_lines(&mut self, first: usize, last: usize) -> String {
        let count = self.line_count();
        let first = first.max(1);
        let last = last.min(count);
        if first > last {
            return String::new();
        }
        let removed: String = (first..=last)
            .filter_map(|l| self.line(l))
            .map(|l| l + "\n")
            .collect();
        let content_end = |b: &Self, l: usize| b.line_start_byte(l) + b.line_byte_len(l);
        let (start, end) = if last < count {
            (self.line_start_byte(first), self.line_start_byte(last + 1))
        } else if first > 1 {
            // Tail delete: take the newline before `first` so the file terminator survives.
            (self.line_start_byte(first) - 1, content_end(self, last))
        } else {
            (0, content_end(self, last))
        };
        self.delete_bytes(start, end);
        removed
    }
}

/// Grapheme and width utilities. Pure helpers operating on a single line.
pub mod grapheme {
    use unicode_segmentation::UnicodeSegmentation;
    use unicode_width::UnicodeWidthStr;

    /// Iterate grapheme clusters in a line.
    pub fn iter(line: &str) -> impl Iterator<Item = &str> {
        line.graphemes(true)
    }

    /// Previous grapheme boundary (returns 0 if already at or below 1st boundary).
    pub fn prev_boundary(line: &str, byte: usize) -> usize {
        if byte == 0 || byte > line.len() {
            return 0;
        }
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            last = idx;
        }
        last
    }

    /// Next grapheme boundary (returns line.len() if at or beyond end).
    pub fn next_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                return idx;
            }
        }
        line.len()
    }

    /// Start of the grapheme containing `byte`, or `line.len()` when past the end.
    pub fn floor_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        let mut start = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                break;
            }
            start = idx;
        }
        start
    }

    /// Tab width when the buffer does not say otherwise.
    pub const DEFAULT_TABSTOP: usize = 8;

    /// Width in terminal cells of this grapheme cluster when it starts at
    /// display column `at` (at least one cell). A tab reaches the next stop.
    pub fn cell_width(g: &str, at: usize, tabstop: usize) -> usize {
        if g == "\t" {
            let tabstop = tabstop.max(1);
            return tabstop - at % tabstop;
        }
        UnicodeWidthStr::width(g).max(1)
    }

    /// Compute visual column (terminal cells) up to (but not including) byte offset.
    pub fn visual_col(line: &str, byte: usize, tabstop: usize) -> usize {
        line.grapheme_indices(true)
            .take_while(|(idx, _)| *idx < byte)
            .fold(0, |cells, (_, g)| cells + cell_width(g, cells, tabstop))
    }

    /// Byte offset of the grapheme occupying 0-indexed display column `col`.
    /// Columns beyond the last cell map to `line.len()`.
    pub fn byte_for_visual_col(line: &str, col: usize, tabstop: usize) -> usize {
        let mut cells = 0;
        for (idx, g) in line.grapheme_indices(true) {
            let w = cell_width(g, cells, tabstop);
            if cells + w > col {
                return idx;
            }
            cells += w;
        }
        line.len()
    }
}

#[cfg(test)]
mod tests {
    use super::grapheme;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_count_follows_editor_convention() {
        assert_eq!(Buffer::from_str("t", "").unwrap().line_count(), 1);
        assert_eq!(Buffer::from_str("t", "a").unwrap().line_count(), 1);
        assert_eq!(Buffer::from_str("t", "a\n").unwrap().line_count(), 1);
        assert_eq!(Buffer::from_str("t", "a\n\n").unwrap().line_count(), 2);
        assert_eq!(Buffer::from_str("t", ",,,\n").unwrap().line_count(), 1);
    }

    #[test]
    fn create_buffer_and_read_line() {
        let b = Buffer::from_str("test", "hello\nworld").unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line(1).unwrap(), "hello");
        assert_eq!(b.line(2).unwrap(), "world");
        assert_eq!(b.line(0), None);
        assert_eq!(b.line(3), None);
        assert_eq!(b.line_byte_len(1), 5);
    }

    #[test]
    fn buffer_view_over_vec_is_one_indexed() {
        let lines = vec!["ab", "", "c"];
        assert_eq!(BufferView::line_count(&lines), 3);
        assert_eq!(BufferView::line(&lines, 1).as_deref(), Some("ab"));
        assert_eq!(BufferView::line(&lines, 2).as_deref(), Some(""));
        assert_eq!(BufferView::line(&lines, 0), None);
        assert_eq!(BufferView::line_byte_len(&lines, 3), 1);
    }

    #[test]
    fn delete_bytes_within_line() {
        let mut b = Buffer::from_str("t", "foo bar\nbaz").unwrap();
        let s = b.absolute_byte_index(CursorPosition::new(1, 0));
        let e = b.absolute_byte_index(CursorPosition::new(1, 4));
        assert_eq!(b.delete_bytes(s, e), "foo ");
        assert_eq!(b.lines(), vec!["bar", "baz"]);
    }

    #[test]
    fn delete_lines_middle_and_tail() {
        let mut b = Buffer::from_lines("t", &["a", "  foo", "bar", "z"]).unwrap();
        assert_eq!(b.delete_lines(2, 3), "  foo\nbar\n");
        assert_eq!(b.lines(), vec!["a", "z"]);

        let mut b = Buffer::from_str("t", "a\nb\n").unwrap();
        b.delete_lines(2, 2);
        assert_eq!(b.text(), "a\n");

        let mut b = Buffer::from_str("t", "only").unwrap();
        b.delete_lines(1, 1);
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line(1).unwrap(), "");
    }

    #[test]
    fn grapheme_combining_mark() {
        let s = "e\u{301}x";
        let nb = grapheme::next_boundary(s, 0);
        assert_eq!(nb, 3);
        assert_eq!(grapheme::prev_boundary(s, nb), 0);
        assert_eq!(grapheme::floor_boundary(s, 1), 0);
    }

    #[test]
    fn display_column_round_trip_with_wide_chars() {
        let s = "a漢b";
        let ts = grapheme::DEFAULT_TABSTOP;
        assert_eq!(grapheme::visual_col(s, 4, ts), 3);
        assert_eq!(grapheme::byte_for_visual_col(s, 0, ts), 0);
        assert_eq!(grapheme::byte_for_visual_col(s, 1, ts), 1);
        assert_eq!(grapheme::byte_for_visual_col(s, 2, ts), 1);
        assert_eq!(grapheme::byte_for_visual_col(s, 3, ts), 4);
        assert_eq!(grapheme::byte_for_visual_col(s, 40, ts), s.len());
    }

    #[test]
    fn tab_expands_to_next_stop() {
        let s = "\tfoo bar";
        assert_eq!(grapheme::visual_col(s, 1, 8), 8);
        assert_eq!(grapheme::byte_for_visual_col(s, 0, 8), 0);
        assert_eq!(grapheme::byte_for_visual_col(s, 7, 8), 0);
        assert_eq!(grapheme::byte_for_visual_col(s, 8, 8), 1);
        assert_eq!(grapheme::byte_for_visual_col(s, 8, 4), 5);

        // mid-line tab only fills up to the stop
        let s = "ab\tc";
        assert_eq!(grapheme::visual_col(s, 3, 4), 4);
        assert_eq!(grapheme::byte_for_visual_col(s, 3, 4), 2);
        assert_eq!(grapheme::byte_for_visual_col(s, 4, 4), 3);
    }

    #[test]
    fn buffer_tabstop_is_clamped() {
        let mut buf = Buffer::from_str("t", "\tx").unwrap();
        assert_eq!(BufferView::tabstop(&buf), grapheme::DEFAULT_TABSTOP);
        buf.set_tabstop(0);
        assert_eq!(BufferView::tabstop(&buf), 1);
        buf.set_tabstop(4);
        assert_eq!(BufferView::tabstop(&buf), 4);
        assert_eq!(BufferView::tabstop(&["\tx"][..]), grapheme::DEFAULT_TABSTOP);
    }
}
