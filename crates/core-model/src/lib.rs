//! The editor surface the motion adapter drives.
//!
//! [`EditorHost`] exposes exactly the reads and
//! commands the adapter's modal protocols need (cursor, mode, virtual-edit
//! option, visual marks, a handful of corrective commands, highlights). A
//! real editor integration implements it over its own state; the workspace
//! ships [`HeadlessEditor`], an in-memory host used by the CLI and the tests.
//!
//! Hosts report a *raw* cursor (1-indexed line, 1-indexed display column, any
//! integer) and accept normalized [`CursorPosition`]s back. Normalization is
//! the adapter's job, never the host's.

use core_events::EditorEvent;
use core_state::{BufferId, Mode, VirtualEdit};
use core_text::{BufferView, CursorPosition};
use thiserror::Error;

mod headless;
pub use headless::HeadlessEditor;

/// Cursor exactly as an editor reports it: 1-indexed line, 1-indexed display
/// column. Values are not validated and may be zero, negative or far out of
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawCursor {
    pub line: i64,
    pub col: i64,
}

impl RawCursor {
    pub fn new(line: i64, col: i64) -> Self {
        Self { line, col }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("line {line} is outside the buffer (1..={count})")]
    InvalidLine { line: usize, count: usize },
    #[error("command rejected: {0}")]
    Rejected(&'static str),
}

/// Everything the adapter reads from or asks of an editor.
pub trait EditorHost {
    fn buffer_id(&self) -> BufferId;

    fn buffer(&self) -> &dyn BufferView;

    /// Mode at the moment of the call; never cached by the adapter.
    fn mode(&self) -> Mode;

    fn raw_cursor(&self) -> RawCursor;

    /// Move the cursor. The host clamps the column according to its current
    /// mode and virtual-edit value.
    fn set_cursor(&mut self, pos: CursorPosition) -> Result<(), HostError>;

    fn virtual_edit(&self) -> VirtualEdit;

    fn set_virtual_edit(&mut self, value: VirtualEdit);

    /// The `'>` mark: trailing boundary of the current (or last) visual
    /// selection, reported verbatim.
    fn visual_end_mark(&self) -> Option<CursorPosition>;

    /// `m>`: move the trailing selection mark.
    fn set_visual_end_mark(&mut self, pos: CursorPosition);

    /// `gv`: reinstate the selection between the anchor and `'>`.
    fn reselect_visual(&mut self) -> Result<(), HostError>;

    /// Make the pending operator's motion exclusive regardless of its
    /// natural kind.
    fn force_exclusive(&mut self);

    /// Linewise delete of the cursor line.
    fn delete_cursor_line(&mut self) -> Result<(), HostError>;

    /// Synthesize a cancel keystroke.
    fn cancel_pending(&mut self);

    fn show_highlights(&mut self, targets: &[CursorPosition]);

    fn clear_highlights(&mut self);
}

/// Host-side event source. The headless editor queues events as its state
/// changes; a real integration forwards its autocommands.
pub trait EventSource {
    fn next_event(&mut self) -> Option<EditorEvent>;
}
