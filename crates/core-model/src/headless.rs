//! In-memory editor host.
//!
//! `HeadlessEditor` models the slice of a modal editor the adapter has to
//! cooperate with, including the quirks it compensates for:
//! - after an operator is applied the cursor is clamped the normal-mode way,
//!   so a change that empties a line end leaves the cursor one column left of
//!   the insertion point;
//! - restoring a narrow virtual-edit value clamps the live cursor but leaves
//!   the `'>` mark where `m>` put it;
//! - every observable change is queued as an [`EditorEvent`] and only
//!   delivered when the caller drains the queue.

use std::collections::VecDeque;

use core_events::EditorEvent;
use core_state::{BufferId, Mode, Operator, VirtualEdit, VisualKind};
use core_text::{Buffer, BufferView, CursorPosition, grapheme, motion};
use tracing::{debug, trace};

use crate::{EditorHost, EventSource, HostError, RawCursor};

#[derive(Debug, Clone, Copy)]
struct PendingOperator {
    op: Operator,
    start: CursorPosition,
    exclusive: bool,
}

#[derive(Debug)]
pub struct HeadlessEditor {
    id: BufferId,
    buffer: Buffer,
    cursor: CursorPosition,
    mode: Mode,
    virtual_edit: VirtualEdit,
    anchor: Option<CursorPosition>,
    last_visual: VisualKind,
    visual_end: Option<CursorPosition>,
    pending: Option<PendingOperator>,
    register: String,
    highlights: Vec<CursorPosition>,
    events: VecDeque<EditorEvent>,
    ve_writes: Vec<VirtualEdit>,
}

impl HeadlessEditor {
    pub fn new(id: BufferId, buffer: Buffer) -> Self {
        Self {
            id,
            buffer,
            cursor: CursorPosition::origin(),
            mode: Mode::Normal,
            virtual_edit: VirtualEdit::empty(),
            anchor: None,
            last_visual: VisualKind::Char,
            visual_end: None,
            pending: None,
            register: String::new(),
            highlights: Vec::new(),
            events: VecDeque::new(),
            ve_writes: Vec::new(),
        }
    }

    /// Convenience constructor for tests and scripts.
    pub fn from_lines<S: AsRef<str>>(id: BufferId, lines: &[S]) -> Result<Self, HostError> {
        let buffer =
            Buffer::from_lines(format!("buffer{id}"), lines).map_err(|_| HostError::Rejected("buffer"))?;
        Ok(Self::new(id, buffer))
    }

    /// Start from a user virtual-edit value without recording a write.
    pub fn with_virtual_edit(mut self, value: VirtualEdit) -> Self {
        self.virtual_edit = value;
        self
    }

    /// Display tab width for raw cursor reporting.
    pub fn with_tabstop(mut self, tabstop: usize) -> Self {
        self.buffer.set_tabstop(tabstop);
        self
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn lines(&self) -> Vec<String> {
        self.buffer.lines()
    }

    pub fn register(&self) -> &str {
        &self.register
    }

    pub fn highlights(&self) -> &[CursorPosition] {
        &self.highlights
    }

    /// Every value written through [`EditorHost::set_virtual_edit`], oldest first.
    pub fn virtual_edit_writes(&self) -> &[VirtualEdit] {
        &self.ve_writes
    }

    /// `(anchor, cursor)` while a visual selection is active.
    pub fn selection(&self) -> Option<(CursorPosition, CursorPosition)> {
        match self.mode {
            Mode::Visual(_) => self.anchor.map(|a| (a, self.cursor)),
            _ => None,
        }
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Drop queued events without delivering them.
    pub fn discard_events(&mut self) {
        self.events.clear();
    }

    fn push(&mut self, event: EditorEvent) {
        trace!(target: "model.headless", event = %event, "event_queued");
        self.events.push_back(event);
    }

    fn switch_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            self.mode = mode;
            self.push(EditorEvent::ModeChanged);
        }
    }

    fn onemore_allowed(&self) -> bool {
        self.mode == Mode::Insert || self.virtual_edit.allows_onemore()
    }

    /// Place the cursor, clamped to what the current state allows, and queue
    /// `CursorMoved` when it actually moved.
    fn place(&mut self, mut pos: CursorPosition, onemore: bool) {
        motion::clamp(&self.buffer, &mut pos, onemore);
        if pos != self.cursor {
            self.cursor = pos;
            self.push(EditorEvent::CursorMoved);
        }
    }

    /// `v`, `V` or `<C-v>`. Repeating the active kind leaves visual mode.
    pub fn toggle_visual(&mut self, kind: VisualKind) {
        match self.mode {
            Mode::Visual(active) if active == kind => self.escape(),
            Mode::Visual(_) => {
                self.last_visual = kind;
                self.switch_mode(Mode::Visual(kind));
            }
            _ => {
                self.anchor = Some(self.cursor);
                self.visual_end = Some(self.cursor);
                self.last_visual = kind;
                self.switch_mode(Mode::Visual(kind));
            }
        }
    }

    /// `<Esc>`.
    pub fn escape(&mut self) {
        match self.mode {
            Mode::Normal => {}
            Mode::Insert => {
                let mut pos = self.cursor;
                motion::left(&self.buffer, &mut pos);
                self.switch_mode(Mode::Normal);
                self.place(pos, self.virtual_edit.allows_onemore());
            }
            Mode::Visual(_) => {
                self.anchor = None;
                self.switch_mode(Mode::Normal);
                self.place(self.cursor, self.virtual_edit.allows_onemore());
            }
            Mode::OperatorPending(op) => {
                debug!(target: "model.headless", op = %op, "operator_cancelled");
                self.pending = None;
                self.switch_mode(Mode::Normal);
            }
        }
    }

    /// Typing an operator key in normal mode.
    pub fn begin_operator(&mut self, op: Operator) -> Result<(), HostError> {
        if self.mode != Mode::Normal {
            return Err(HostError::Rejected("operator outside normal mode"));
        }
        self.pending = Some(PendingOperator {
            op,
            start: self.cursor,
            exclusive: false,
        });
        self.switch_mode(Mode::OperatorPending(op));
        Ok(())
    }

    /// Apply the pending operator over the range the motion selected, from
    /// the position the operator started at to the current cursor.
    ///
    /// A cancelled operator is a no-op.
    pub fn finish_operator(&mut self, inclusive: bool) -> Result<(), HostError> {
        let Some(pending) = self.pending.take() else {
            return match self.mode {
                Mode::OperatorPending(_) => Err(HostError::Rejected("operator state lost")),
                _ => Ok(()),
            };
        };
        let (from, to) = if pending.start <= self.cursor {
            (pending.start, self.cursor)
        } else {
            (self.cursor, pending.start)
        };
        let start = self.buffer.absolute_byte_index(from);
        let mut end = self.buffer.absolute_byte_index(to);
        if inclusive && !pending.exclusive {
            if let Some(line) = self.buffer.line(to.line) {
                end += grapheme::next_boundary(&line, to.col) - to.col.min(line.len());
            }
        }
        let before = self.cursor;
        self.register = self.buffer.slice_bytes(start, end);
        let changed = match pending.op {
            Operator::Delete | Operator::Change => !self.buffer.delete_bytes(start, end).is_empty(),
            Operator::Yank | Operator::Other(_) => false,
        };
        debug!(
            target: "model.headless",
            op = %pending.op,
            start,
            end,
            changed,
            "operator_applied"
        );
        if changed {
            self.push(EditorEvent::TextChanged);
        }
        // Operator application always lands with the normal-mode clamp.
        let mut pos = from;
        motion::clamp(&self.buffer, &mut pos, false);
        self.cursor = pos;
        if pos != before {
            self.push(EditorEvent::CursorMoved);
        }
        let next = match pending.op {
            Operator::Change => Mode::Insert,
            _ => Mode::Normal,
        };
        self.switch_mode(next);
        Ok(())
    }
}

impl EditorHost for HeadlessEditor {
    fn buffer_id(&self) -> BufferId {
        self.id
    }

    fn buffer(&self) -> &dyn BufferView {
        &self.buffer
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn raw_cursor(&self) -> RawCursor {
        let display = self
            .buffer
            .line(self.cursor.line)
            .map(|l| grapheme::visual_col(&l, self.cursor.col, self.buffer.tabstop()))
            .unwrap_or(0);
        RawCursor::new(self.cursor.line as i64, display as i64 + 1)
    }

    fn set_cursor(&mut self, pos: CursorPosition) -> Result<(), HostError> {
        let count = self.buffer.line_count();
        if pos.line == 0 || pos.line > count {
            return Err(HostError::InvalidLine {
                line: pos.line,
                count,
            });
        }
        self.place(pos, self.onemore_allowed());
        if self.mode.is_visual() {
            self.visual_end = Some(self.cursor);
        }
        Ok(())
    }

    fn virtual_edit(&self) -> VirtualEdit {
        self.virtual_edit
    }

    fn set_virtual_edit(&mut self, value: VirtualEdit) {
        self.virtual_edit = value;
        self.ve_writes.push(value);
        if !self.onemore_allowed() {
            // The live cursor snaps back; `'>` keeps its column.
            self.place(self.cursor, false);
        }
    }

    fn visual_end_mark(&self) -> Option<CursorPosition> {
        self.visual_end
    }

    fn set_visual_end_mark(&mut self, pos: CursorPosition) {
        self.visual_end = Some(pos);
    }

    fn reselect_visual(&mut self) -> Result<(), HostError> {
        let Some(end) = self.visual_end else {
            return Err(HostError::Rejected("no previous selection"));
        };
        if self.anchor.is_none() {
            self.anchor = Some(end);
        }
        self.switch_mode(Mode::Visual(self.last_visual));
        self.place(end, self.onemore_allowed());
        Ok(())
    }

    fn force_exclusive(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            pending.exclusive = true;
        }
    }

    fn delete_cursor_line(&mut self) -> Result<(), HostError> {
        if self.buffer.line(self.cursor.line).is_none() {
            return Err(HostError::InvalidLine {
                line: self.cursor.line,
                count: self.buffer.line_count(),
            });
        }
        self.register = self.buffer.delete_lines(self.cursor.line, self.cursor.line);
        self.push(EditorEvent::TextChanged);
        self.place(self.cursor, false);
        Ok(())
    }

    fn cancel_pending(&mut self) {
        self.escape();
    }

    fn show_highlights(&mut self, targets: &[CursorPosition]) {
        self.highlights = targets.to_vec();
    }

    fn clear_highlights(&mut self) {
        self.highlights.clear();
    }
}

impl EventSource for HeadlessEditor {
    fn next_event(&mut self) -> Option<EditorEvent> {
        self.events.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn editor(lines: &[&str]) -> HeadlessEditor {
        HeadlessEditor::from_lines(BufferId(1), lines).unwrap()
    }

    #[test]
    fn raw_cursor_counts_tab_cells() {
        let mut ed = editor(&["\tfoo bar"]);
        ed.set_cursor(CursorPosition::new(1, 1)).unwrap();
        assert_eq!(ed.raw_cursor(), RawCursor::new(1, 9));

        let mut ed = editor(&["\tfoo bar"]).with_tabstop(4);
        ed.set_cursor(CursorPosition::new(1, 1)).unwrap();
        assert_eq!(ed.raw_cursor(), RawCursor::new(1, 5));
    }

    fn drain(ed: &mut HeadlessEditor) -> Vec<EditorEvent> {
        std::iter::from_fn(|| ed.next_event()).collect()
    }

    #[test]
    fn cursor_clamp_follows_virtual_edit() {
        let mut ed = editor(&["abc"]);
        ed.set_cursor(CursorPosition::new(1, 3)).unwrap();
        assert_eq!(ed.cursor(), CursorPosition::new(1, 2));
        ed.set_virtual_edit(VirtualEdit::ONEMORE);
        ed.set_cursor(CursorPosition::new(1, 3)).unwrap();
        assert_eq!(ed.cursor(), CursorPosition::new(1, 3));
        ed.set_virtual_edit(VirtualEdit::empty());
        assert_eq!(ed.cursor(), CursorPosition::new(1, 2));
        assert_eq!(
            ed.set_cursor(CursorPosition::new(4, 0)),
            Err(HostError::InvalidLine { line: 4, count: 1 })
        );
    }

    #[test]
    fn raw_cursor_reports_display_columns() {
        let mut ed = editor(&["漢字x"]);
        ed.set_cursor(CursorPosition::new(1, 6)).unwrap();
        assert_eq!(ed.raw_cursor(), RawCursor::new(1, 5));
    }

    #[test]
    fn end_mark_survives_virtual_edit_restore() {
        let mut ed = editor(&["foo bar"]);
        ed.toggle_visual(VisualKind::Char);
        ed.set_virtual_edit(VirtualEdit::ONEMORE);
        ed.set_cursor(CursorPosition::new(1, 7)).unwrap();
        ed.set_visual_end_mark(CursorPosition::new(1, 7));
        ed.reselect_visual().unwrap();
        ed.set_virtual_edit(VirtualEdit::empty());
        assert_eq!(ed.cursor(), CursorPosition::new(1, 6));
        assert_eq!(ed.visual_end_mark(), Some(CursorPosition::new(1, 7)));
        assert_eq!(
            ed.selection(),
            Some((CursorPosition::origin(), CursorPosition::new(1, 6)))
        );
    }

    #[test]
    fn delete_exclusive_and_inclusive() {
        let mut ed = editor(&["foo bar baz"]);
        ed.begin_operator(Operator::Delete).unwrap();
        ed.set_cursor(CursorPosition::new(1, 4)).unwrap();
        ed.finish_operator(false).unwrap();
        assert_eq!(ed.text(), "bar baz");
        assert_eq!(ed.register(), "foo ");
        assert_eq!(ed.mode(), Mode::Normal);

        ed.begin_operator(Operator::Delete).unwrap();
        ed.set_cursor(CursorPosition::new(1, 2)).unwrap();
        ed.finish_operator(true).unwrap();
        assert_eq!(ed.text(), " baz");
    }

    #[test]
    fn backward_inclusive_range_covers_start_character() {
        let mut ed = editor(&["foo bar"]);
        ed.set_cursor(CursorPosition::new(1, 4)).unwrap();
        ed.begin_operator(Operator::Yank).unwrap();
        ed.set_cursor(CursorPosition::new(1, 2)).unwrap();
        ed.finish_operator(true).unwrap();
        assert_eq!(ed.register(), "o b");
        assert_eq!(ed.text(), "foo bar");
        assert_eq!(ed.cursor(), CursorPosition::new(1, 2));
    }

    #[test]
    fn change_at_line_end_drifts_left() {
        let mut ed = editor(&["foo bar"]);
        ed.set_cursor(CursorPosition::new(1, 4)).unwrap();
        drain(&mut ed);
        ed.begin_operator(Operator::Change).unwrap();
        ed.set_virtual_edit(VirtualEdit::ONEMORE);
        ed.set_cursor(CursorPosition::new(1, 7)).unwrap();
        ed.finish_operator(false).unwrap();
        assert_eq!(ed.text(), "foo ");
        assert_eq!(ed.mode(), Mode::Insert);
        assert_eq!(ed.cursor(), CursorPosition::new(1, 3));
        assert_eq!(
            drain(&mut ed),
            vec![
                EditorEvent::ModeChanged,
                EditorEvent::CursorMoved,
                EditorEvent::TextChanged,
                EditorEvent::CursorMoved,
                EditorEvent::ModeChanged,
            ]
        );
    }

    #[test]
    fn forced_exclusive_empty_range_is_noop() {
        let mut ed = editor(&["foo"]);
        ed.begin_operator(Operator::Delete).unwrap();
        ed.force_exclusive();
        ed.finish_operator(true).unwrap();
        assert_eq!(ed.text(), "foo");
        assert_eq!(ed.register(), "");
    }

    #[test]
    fn cancel_leaves_insert_and_pending() {
        let mut ed = editor(&["ab"]);
        ed.begin_operator(Operator::Change).unwrap();
        ed.cancel_pending();
        assert_eq!(ed.mode(), Mode::Normal);
        assert!(ed.finish_operator(false).is_ok());
        assert_eq!(ed.text(), "ab");
    }

    #[test]
    fn whole_line_delete() {
        let mut ed = editor(&["a", "  ", "z"]);
        ed.set_cursor(CursorPosition::new(2, 1)).unwrap();
        ed.delete_cursor_line().unwrap();
        assert_eq!(ed.lines(), vec!["a", "z"]);
        assert_eq!(ed.cursor(), CursorPosition::new(2, 0));
    }

    #[test]
    fn highlights_are_stored_and_cleared() {
        let mut ed = editor(&["a b"]);
        ed.show_highlights(&[CursorPosition::new(1, 2)]);
        assert_eq!(ed.highlights(), &[CursorPosition::new(1, 2)]);
        ed.clear_highlights();
        assert!(ed.highlights().is_empty());
    }
}
