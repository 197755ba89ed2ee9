//! Character and line cursor motions plus cursor clamping.
//!
//! These operate purely on a `BufferView` + `CursorPosition` pair and are free
//! of editor state. Word motions live in [`crate::word`].

use crate::{BufferView, CursorPosition, grapheme};

/// Clamp a cursor into the buffer.
///
/// The line is forced into `1..=line_count`, the column onto a grapheme
/// start. With `onemore` the column may rest one past the last character
/// (virtual-edit addressing); otherwise a column at or past the end moves
/// back onto the last character. Empty lines always clamp to column 0.
pub fn clamp<B: BufferView + ?Sized>(buf: &B, pos: &mut CursorPosition, onemore: bool) {
    let lines = buf.line_count().max(1);
    pos.line = pos.line.clamp(1, lines);
    let Some(content) = buf.line(pos.line) else {
        pos.col = 0;
        return;
    };
    let len = content.len();
    if pos.col >= len {
        pos.col = if onemore {
            len
        } else {
            grapheme::prev_boundary(&content, len)
        };
        return;
    }
    pos.col = grapheme::floor_boundary(&content, pos.col);
}

/// Move left one grapheme boundary.
pub fn left<B: BufferView + ?Sized>(buf: &B, pos: &mut CursorPosition) {
    if pos.col == 0 {
        return;
    }
    if let Some(content) = buf.line(pos.line) {
        pos.col = grapheme::prev_boundary(&content, pos.col);
    }
}

/// Move right one grapheme boundary (may reach the line end; callers clamp).
pub fn right<B: BufferView + ?Sized>(buf: &B, pos: &mut CursorPosition) {
    if let Some(content) = buf.line(pos.line) {
        let next = grapheme::next_boundary(&content, pos.col);
        if next > pos.col {
            pos.col = next;
        }
    }
}

/// Move up one line preserving a target visual column (sticky). Returns the updated sticky column.
/// Caller should maintain the returned sticky column across successive vertical motions. If `sticky_col`
/// is `None`, it will be computed from the current position's visual column.
pub fn up<B: BufferView + ?Sized>(
    buf: &B,
    pos: &mut CursorPosition,
    sticky_col: Option<usize>,
) -> Option<usize> {
    if pos.line <= 1 {
        return sticky_col;
    }
    vertical(buf, pos, sticky_col, pos.line - 1)
}

/// Move down one line preserving sticky visual column.
pub fn down<B: BufferView + ?Sized>(
    buf: &B,
    pos: &mut CursorPosition,
    sticky_col: Option<usize>,
) -> Option<usize> {
    if pos.line >= buf.line_count() {
        return sticky_col;
    }
    vertical(buf, pos, sticky_col, pos.line + 1)
}

fn vertical<B: BufferView + ?Sized>(
    buf: &B,
    pos: &mut CursorPosition,
    sticky_col: Option<usize>,
    target: usize,
) -> Option<usize> {
    let sticky = sticky_col.unwrap_or_else(|| {
        buf.line(pos.line)
            .map(|l| grapheme::visual_col(&l, pos.col, buf.tabstop()))
            .unwrap_or(0)
    });
    pos.line = target;
    pos.col = buf
        .line(target)
        .map(|l| grapheme::byte_for_visual_col(&l, sticky, buf.tabstop()))
        .unwrap_or(0);
    Some(sticky)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Buffer;

    #[test]
    fn horizontal_and_line_boundaries() {
        let buf = Buffer::from_str("t", "ab😀c").unwrap();
        let mut pos = CursorPosition::origin();
        while pos.col < buf.line_byte_len(1) {
            right(&buf, &mut pos);
        }
        let end = buf.line_byte_len(1);
        assert_eq!(pos.col, end);
        left(&buf, &mut pos);
        assert_eq!(pos.col, end - 1);
        left(&buf, &mut pos);
        assert_eq!(pos.col, 2);
    }

    #[test]
    fn clamp_normal_and_onemore() {
        let buf = vec!["abc", ""];
        let mut pos = CursorPosition::new(1, 3);
        clamp(&buf, &mut pos, false);
        assert_eq!(pos, CursorPosition::new(1, 2));
        let mut pos = CursorPosition::new(1, 9);
        clamp(&buf, &mut pos, true);
        assert_eq!(pos, CursorPosition::new(1, 3));
        let mut pos = CursorPosition::new(7, 4);
        clamp(&buf, &mut pos, false);
        assert_eq!(pos, CursorPosition::new(2, 0));
        let mut pos = CursorPosition::new(0, 1);
        clamp(&buf, &mut pos, false);
        assert_eq!(pos, CursorPosition::new(1, 1));
    }

    #[test]
    fn clamp_snaps_inside_multibyte_grapheme() {
        let buf = vec!["a漢b"];
        let mut pos = CursorPosition::new(1, 2);
        clamp(&buf, &mut pos, false);
        assert_eq!(pos.col, 1);
    }

    #[test]
    fn vertical_motions_basic_and_sticky() {
        let buf = Buffer::from_str("t", "abcdef\nxy\nlonger line here").unwrap();
        let mut pos = CursorPosition::new(1, 4);
        let mut sticky = down(&buf, &mut pos, None);
        assert_eq!(pos, CursorPosition::new(2, 2));
        sticky = down(&buf, &mut pos, sticky);
        assert_eq!(pos, CursorPosition::new(3, 4));
        sticky = up(&buf, &mut pos, sticky);
        up(&buf, &mut pos, sticky);
        assert_eq!(pos, CursorPosition::new(1, 4));
        let at_top = up(&buf, &mut pos, None);
        assert_eq!(at_top, None);
        assert_eq!(pos.line, 1);
    }
}
