//! Native word motions (`w`, `e`, `b`, `ge` and their WORD forms) for every
//! modal protocol.
//!
//! Normal-mode motions land on real characters. Visual motions may land one
//! past the last character of the buffer, and operator-pending motions
//! describe the operated range the way the editor's own motions do,
//! including the d-special and prevent-change flags.

use std::iter::Peekable;

use crate::token::{BackwardTokens, ForwardTokens, index_token, tokenize};
use crate::{BufferView, CursorPosition, MotionResult};

fn forward<B: BufferView + ?Sized>(
    buffer: &B,
    from: CursorPosition,
    big: bool,
) -> Peekable<ForwardTokens<'_, B>> {
    ForwardTokens::new(buffer, from, big).peekable()
}

fn backward<B: BufferView + ?Sized>(
    buffer: &B,
    from: CursorPosition,
    big: bool,
) -> Peekable<BackwardTokens<'_, B>> {
    BackwardTokens::new(buffer, from, big).peekable()
}

/// `w` / `W` in normal mode. Stops on word starts and on empty lines; a count
/// running past the last target lands on the last character of the buffer.
pub fn forward_word_start<B: BufferView + ?Sized>(
    buffer: &B,
    cursor: CursorPosition,
    mut count: u64,
    big: bool,
) -> CursorPosition {
    let mut at = cursor;
    let mut it = forward(buffer, cursor, big);
    while count > 0 {
        let Some(item) = it.next() else { break };
        let stop = !item.cursor && (item.is_word() || item.is_empty_line());
        if !stop {
            at = item.at(item.last());
            continue;
        }
        at = item.at(item.first());
        count -= 1;
        if count > 0 && it.peek().is_none() {
            at.col = item.last();
        }
    }
    at
}

/// `e` / `E` in normal mode. Empty lines are not targets.
pub fn forward_word_end<B: BufferView + ?Sized>(
    buffer: &B,
    cursor: CursorPosition,
    mut count: u64,
    big: bool,
) -> CursorPosition {
    let mut at = cursor;
    let mut it = forward(buffer, cursor, big);
    while count > 0 {
        let Some(item) = it.next() else { break };
        if !item.is_word() {
            at = item.at(item.last());
        } else if !(item.cursor && at.col == item.last()) {
            at = item.at(item.last());
            count -= 1;
        }
    }
    at
}

/// `b` / `B` in normal mode. Stops on word starts and on empty lines.
pub fn backward_word_start<B: BufferView + ?Sized>(
    buffer: &B,
    cursor: CursorPosition,
    mut count: u64,
    big: bool,
) -> CursorPosition {
    let mut at = cursor;
    let mut it = backward(buffer, cursor, big);
    while count > 0 {
        let Some(item) = it.next() else { break };
        let stop = item.is_word() || item.is_empty_line();
        if !stop {
            at = item.at(item.first());
        } else if !(item.cursor && at.col == item.first()) {
            at = item.at(item.first());
            count -= 1;
        }
    }
    at
}

/// `ge` / `gE` walk shared by normal, visual and operator-pending modes.
/// Returns the target and whether no backward progress was possible.
fn backward_word_end_walk<B: BufferView + ?Sized>(
    buffer: &B,
    cursor: CursorPosition,
    mut count: u64,
    big: bool,
) -> (CursorPosition, bool) {
    let mut at = cursor;
    let mut stuck = cursor == CursorPosition::origin() && count > 0;
    let mut it = backward(buffer, cursor, big);
    while count > 0 {
        let Some(item) = it.next() else { break };
        let stop = item.is_word() || item.is_empty_line();
        if !stop || item.cursor {
            at = item.at(item.first());
            continue;
        }
        at = item.at(item.last());
        count -= 1;
        if count > 0 && it.peek().is_none() {
            at.col = item.first();
            count -= 1;
            if item.is_empty_line() {
                stuck = true;
            }
        }
    }
    (at, stuck)
}

/// `ge` / `gE` in normal mode. Empty lines are targets.
pub fn backward_word_end<B: BufferView + ?Sized>(
    buffer: &B,
    cursor: CursorPosition,
    count: u64,
    big: bool,
) -> CursorPosition {
    backward_word_end_walk(buffer, cursor, count, big).0
}

/// `w` / `W` in visual mode: past the last target the selection extends one
/// past the final character.
pub fn visual_word_start<B: BufferView + ?Sized>(
    buffer: &B,
    cursor: CursorPosition,
    mut count: u64,
    big: bool,
) -> CursorPosition {
    let mut at = cursor;
    let mut it = forward(buffer, cursor, big);
    while count > 0 {
        let Some(item) = it.next() else { break };
        let stop = !item.cursor && (item.is_word() || item.is_empty_line());
        if !stop {
            at.line = item.lnum;
            at.col = if it.peek().is_some() {
                item.last()
            } else {
                item.past_end()
            };
            continue;
        }
        at = item.at(item.first());
        count -= 1;
        if count > 0 && it.peek().is_none() {
            at.col = item.past_end();
        }
    }
    at
}

/// `e` / `E` in visual mode.
pub fn visual_word_end<B: BufferView + ?Sized>(
    buffer: &B,
    cursor: CursorPosition,
    mut count: u64,
    big: bool,
) -> CursorPosition {
    let mut at = cursor;
    let mut it = forward(buffer, cursor, big);
    while count > 0 {
        let Some(item) = it.next() else { break };
        let exhausted = it.peek().is_none();
        if !item.is_word() {
            at.line = item.lnum;
            at.col = if exhausted { item.past_end() } else { item.last() };
        } else if !(item.cursor && at.col == item.last()) {
            at = item.at(item.last());
            count -= 1;
            if count > 0 && exhausted {
                at.col = item.past_end();
            }
        } else if exhausted {
            at.col = item.past_end();
            count -= 1;
        }
    }
    at
}

/// `w` / `W` under an operator other than change. The last word of a count
/// that ends its line extends the range to the line end instead of the next
/// line's first word.
pub fn operator_word_start<B: BufferView + ?Sized>(
    buffer: &B,
    cursor: CursorPosition,
    mut count: u64,
    big: bool,
) -> MotionResult {
    let mut at = cursor;
    let mut it = forward(buffer, cursor, big);
    while count > 0 {
        let Some(item) = it.next() else { break };
        if !(item.is_word() || item.is_empty_line()) {
            at.line = item.lnum;
            if it.peek().is_none() || (count == 1 && item.eol) {
                at.col = item.past_end();
                count -= 1;
            } else {
                at.col = item.last();
            }
            continue;
        }
        if !item.cursor {
            at = item.at(item.first());
            count -= 1;
        }
        if count > 0 && it.peek().is_none() {
            at.col = item.past_end();
            count -= 1;
        } else if count == 1 && item.eol && it.peek().is_some() {
            if item.is_empty_line() {
                if let Some(next) = it.next() {
                    at = next.at(next.first());
                }
            } else {
                at.col = item.past_end();
            }
            count -= 1;
        }
    }
    MotionResult::plain(at)
}

/// `cw` / `cW`. Starting on a word it behaves like `ce` with an exclusive end;
/// starting on blanks it behaves like `dw`.
pub fn change_word<B: BufferView + ?Sized>(
    buffer: &B,
    cursor: CursorPosition,
    mut count: u64,
    big: bool,
) -> MotionResult {
    let mut at = cursor;
    let mut it = forward(buffer, cursor, big);
    let mut end_mode: Option<bool> = None;
    while count > 0 {
        let Some(item) = it.next() else { break };
        let like_end = *end_mode.get_or_insert(item.cursor && item.is_word());
        if like_end {
            if item.is_word() {
                at = item.at(item.past_end());
                count -= 1;
            } else {
                at.line = item.lnum;
                at.col = if it.peek().is_none() {
                    item.past_end()
                } else {
                    item.last()
                };
            }
            continue;
        }
        if !(item.is_word() || item.is_empty_line()) {
            at.line = item.lnum;
            if it.peek().is_none() || (count == 1 && item.eol) {
                at.col = item.past_end();
                count -= 1;
            } else {
                at.col = item.last();
            }
            continue;
        }
        if !item.cursor {
            at = item.at(item.first());
            count -= 1;
        }
        if count > 0 && it.peek().is_none() {
            at.col = item.past_end();
        } else if count == 1 && item.eol && it.peek().is_some() {
            if let Some(next) = it.next() {
                at = next.at(next.first());
            }
            count -= 1;
        }
    }
    MotionResult::plain(at)
}

/// `e` / `E` under an operator; only `d` can turn linewise.
pub fn operator_word_end<B: BufferView + ?Sized>(
    buffer: &B,
    cursor: CursorPosition,
    count: u64,
    big: bool,
    delete: bool,
) -> MotionResult {
    let target = forward_word_end(buffer, cursor, count, big);
    MotionResult {
        cursor: target,
        d_special: delete && is_d_special(buffer, cursor, target, big),
        prevent_change: false,
    }
}

/// `b` / `B` under an operator. For `c`, no movement means there is nothing
/// to change; `d` and `y` simply operate on an empty range.
pub fn operator_word_back<B: BufferView + ?Sized>(
    buffer: &B,
    cursor: CursorPosition,
    count: u64,
    big: bool,
    change: bool,
) -> MotionResult {
    let target = backward_word_start(buffer, cursor, count, big);
    MotionResult {
        cursor: target,
        d_special: false,
        prevent_change: change && target == cursor,
    }
}

/// `ge` / `gE` under an operator; only `d` can turn linewise.
pub fn operator_word_back_end<B: BufferView + ?Sized>(
    buffer: &B,
    cursor: CursorPosition,
    count: u64,
    big: bool,
    delete: bool,
) -> MotionResult {
    let (target, stuck) = backward_word_end_walk(buffer, cursor, count, big);
    MotionResult {
        cursor: target,
        d_special: delete && is_d_special(buffer, target, cursor, big),
        prevent_change: stuck,
    }
}

/// Whether a delete from `start` to `end` (document order) must become
/// linewise: the range spans lines, nothing but blanks precede `start` on its
/// line, and nothing but blanks follow `end` on its line.
pub fn is_d_special<B: BufferView + ?Sized>(
    buffer: &B,
    start: CursorPosition,
    end: CursorPosition,
    big: bool,
) -> bool {
    if start.line == end.line {
        return false;
    }
    let head = buffer
        .line(start.line)
        .map(|l| tokenize(&l, big))
        .unwrap_or_default();
    if !head.is_empty() {
        let i = index_token(&head, start.col).unwrap_or(head.len());
        if head[..i].iter().any(|t| t.is_word()) {
            return false;
        }
        if head.get(i).is_some_and(|t| t.is_word() && start.col > t.start) {
            return false;
        }
    }
    let tail = buffer
        .line(end.line)
        .map(|l| tokenize(&l, big))
        .unwrap_or_default();
    if !tail.is_empty() {
        let Some(j) = index_token(&tail, end.col) else {
            return true;
        };
        if tail[j + 1..].iter().any(|t| t.is_word()) {
            return false;
        }
        if tail[j].is_word() && end.col < tail[j].last {
            return false;
        }
    }
    true
}
