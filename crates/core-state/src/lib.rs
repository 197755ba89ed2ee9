//! Adapter state: editor modes, the virtual-edit option value, and the
//! per-buffer session that owns the virtual-edit scope and deferred hooks.
//!
//! Sessions are keyed by [`BufferId`]; no state is shared between buffers.
//! Two buffers edited in interleaved windows each carry their own saved
//! virtual-edit value and their own hook queue.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use core_events::HookQueue;
use thiserror::Error;

mod scope;
pub use scope::VirtualEditScope;

/// Identity of an open buffer as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    Char,
    Line,
    Block,
}

/// Pending operator tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Delete,
    Change,
    Yank,
    Other(char),
}

impl Operator {
    pub fn from_char(c: char) -> Self {
        match c {
            'd' => Operator::Delete,
            'c' => Operator::Change,
            'y' => Operator::Yank,
            other => Operator::Other(other),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Operator::Delete => 'd',
            Operator::Change => 'c',
            Operator::Yank => 'y',
            Operator::Other(c) => c,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Editor mode as reported by the host at invocation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Normal,
    Insert,
    Visual(VisualKind),
    OperatorPending(Operator),
}

impl Mode {
    pub fn is_visual(self) -> bool {
        matches!(self, Mode::Visual(_))
    }

    /// Short name used in logs and CLI output.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Insert => "insert",
            Mode::Visual(VisualKind::Char) => "visual",
            Mode::Visual(VisualKind::Line) => "visual-line",
            Mode::Visual(VisualKind::Block) => "visual-block",
            Mode::OperatorPending(_) => "operator-pending",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

bitflags::bitflags! {
    /// Value of the editor's virtual-edit option. The empty set is the
    /// default (no virtual addressing).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct VirtualEdit: u8 {
        const BLOCK   = 0b0000_0001;
        const INSERT  = 0b0000_0010;
        const ALL     = 0b0000_0100;
        const ONEMORE = 0b0000_1000;
        /// Explicit `none`: disables a global value for a window-local setting.
        const NONE    = 0b0001_0000;
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown virtualedit value `{0}`")]
pub struct VirtualEditParseError(pub String);

impl VirtualEdit {
    /// The value the adapter installs for the duration of a motion.
    pub fn widened(self) -> VirtualEdit {
        (self - VirtualEdit::NONE) | VirtualEdit::ONEMORE
    }

    /// Whether the column one past the last character is addressable.
    pub fn allows_onemore(self) -> bool {
        self.intersects(VirtualEdit::ONEMORE | VirtualEdit::ALL)
    }
}

impl FromStr for VirtualEdit {
    type Err = VirtualEditParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ve = VirtualEdit::empty();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            ve |= match part {
                "block" => VirtualEdit::BLOCK,
                "insert" => VirtualEdit::INSERT,
                "all" => VirtualEdit::ALL,
                "onemore" => VirtualEdit::ONEMORE,
                "none" | "NONE" => VirtualEdit::NONE,
                other => return Err(VirtualEditParseError(other.to_string())),
            };
        }
        Ok(ve)
    }
}

impl fmt::Display for VirtualEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(VirtualEdit, &str); 5] = [
            (VirtualEdit::BLOCK, "block"),
            (VirtualEdit::INSERT, "insert"),
            (VirtualEdit::ALL, "all"),
            (VirtualEdit::ONEMORE, "onemore"),
            (VirtualEdit::NONE, "none"),
        ];
        let parts: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&parts.join(","))
    }
}

/// Deferred corrections the adapter can arm on a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// Put back the virtual-edit value saved by the session scope.
    RestoreVirtualEdit,
    /// Redo the last delete as a whole-line delete, then move to `column`.
    DeleteLineSpecial { column: usize },
    /// After a change, step right once if the cursor sits left of `column` on `line`.
    CompensateChangeDrift { line: usize, column: usize },
    /// Abort the pending change operator.
    CancelPendingOperator,
}

/// Per-buffer adapter bookkeeping.
#[derive(Debug)]
pub struct AdapterSession {
    pub id: BufferId,
    pub scope: VirtualEditScope,
    pub hooks: HookQueue<HookAction>,
}

impl AdapterSession {
    pub fn new(id: BufferId) -> Self {
        Self {
            id,
            scope: VirtualEditScope::default(),
            hooks: HookQueue::new(),
        }
    }
}

/// All live sessions, one per buffer that has seen a motion.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<BufferId, AdapterSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_mut(&mut self, id: BufferId) -> &mut AdapterSession {
        self.sessions.entry(id).or_insert_with(|| {
            tracing::trace!(target: "state.session", buffer = %id, "session_created");
            AdapterSession::new(id)
        })
    }

    pub fn session(&self, id: BufferId) -> Option<&AdapterSession> {
        self.sessions.get(&id)
    }

    /// Existing session only; events on buffers that never saw a motion
    /// must not allocate one.
    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut AdapterSession> {
        self.sessions.get_mut(&id)
    }

    /// Drop a buffer's session together with any hooks still armed on it.
    pub fn close(&mut self, id: BufferId) -> Option<usize> {
        let mut session = self.sessions.remove(&id)?;
        let dropped = session.hooks.discard_all();
        tracing::debug!(target: "state.session", buffer = %id, dropped, "session_closed");
        Some(dropped)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
