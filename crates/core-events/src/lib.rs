//! Editor events and per-buffer deferred hooks.
//!
//! A deferred hook is a one-shot action armed after a motion and fired by a
//! later editor event. Hooks live in a [`HookQueue`] owned by one buffer's
//! session; the queue fires matching hooks in arming order and removes each
//! hook as it fires, so a hook runs at most once even when it listens for
//! several event kinds.

use std::fmt;
use std::mem::{Discriminant, discriminant};
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed counters, process wide. Inspected by tests and logged by the binary on exit.
// -------------------------------------------------------------------------------------------------
pub static HOOKS_ARMED: AtomicU64 = AtomicU64::new(0);
pub static HOOKS_FIRED: AtomicU64 = AtomicU64::new(0);
pub static HOOKS_SUPERSEDED: AtomicU64 = AtomicU64::new(0);
pub static HOOKS_DISCARDED: AtomicU64 = AtomicU64::new(0);

/// Snapshot of the hook counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HookTelemetry {
    pub armed: u64,
    pub fired: u64,
    pub superseded: u64,
    pub discarded: u64,
}

pub fn hook_telemetry() -> HookTelemetry {
    HookTelemetry {
        armed: HOOKS_ARMED.load(Ordering::Relaxed),
        fired: HOOKS_FIRED.load(Ordering::Relaxed),
        superseded: HOOKS_SUPERSEDED.load(Ordering::Relaxed),
        discarded: HOOKS_DISCARDED.load(Ordering::Relaxed),
    }
}

/// Editor notifications the adapter reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorEvent {
    CursorMoved,
    TextChanged,
    ModeChanged,
}

impl EditorEvent {
    pub fn mask(self) -> TriggerMask {
        match self {
            EditorEvent::CursorMoved => TriggerMask::CURSOR_MOVED,
            EditorEvent::TextChanged => TriggerMask::TEXT_CHANGED,
            EditorEvent::ModeChanged => TriggerMask::MODE_CHANGED,
        }
    }
}

impl fmt::Display for EditorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditorEvent::CursorMoved => "CursorMoved",
            EditorEvent::TextChanged => "TextChanged",
            EditorEvent::ModeChanged => "ModeChanged",
        };
        f.write_str(name)
    }
}

bitflags::bitflags! {
    /// Set of events a hook listens for.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TriggerMask: u8 {
        const CURSOR_MOVED = 0b0000_0001;
        const TEXT_CHANGED = 0b0000_0010;
        const MODE_CHANGED = 0b0000_0100;
    }
}

impl TriggerMask {
    pub fn matches(self, event: EditorEvent) -> bool {
        self.intersects(event.mask())
    }
}

/// Identifier handed out when a hook is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(u64);

/// One-shot action bound to a trigger mask.
#[derive(Debug, Clone)]
pub struct DeferredHook<A> {
    pub id: HookId,
    pub trigger: TriggerMask,
    pub action: A,
    armed: bool,
}

impl<A> DeferredHook<A> {
    fn new(id: HookId, trigger: TriggerMask, action: A) -> Self {
        Self {
            id,
            trigger,
            action,
            armed: true,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Clear the armed flag; returns whether the hook was still armed.
    pub fn disarm(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }
}

/// Outcome of an arming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Armed {
    /// A new hook was queued.
    New(HookId),
    /// A hook of the same kind was already armed and absorbs the request.
    Absorbed(HookId),
    /// Armed hooks of the same kind were dropped in favour of this one.
    Superseded { id: HookId, replaced: usize },
}

impl Armed {
    pub fn id(self) -> HookId {
        match self {
            Armed::New(id) | Armed::Absorbed(id) | Armed::Superseded { id, .. } => id,
        }
    }
}

/// FIFO queue of armed hooks for one buffer.
///
/// "Kind" is the enum variant of the action (`std::mem::discriminant`), so
/// `arm_once` and `arm_replacing` work for any action enum.
#[derive(Debug, Clone)]
pub struct HookQueue<A> {
    hooks: SmallVec<[DeferredHook<A>; 4]>,
    next_id: u64,
}

impl<A> Default for HookQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> HookQueue<A> {
    pub fn new() -> Self {
        Self {
            hooks: SmallVec::new(),
            next_id: 0,
        }
    }

    fn push(&mut self, trigger: TriggerMask, action: A) -> HookId {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.hooks.push(DeferredHook::new(id, trigger, action));
        HOOKS_ARMED.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(target: "events.hooks", id = id.0, trigger = ?trigger, "hook_armed");
        id
    }

    fn kind_of(action: &A) -> Discriminant<A> {
        discriminant(action)
    }

    /// Queue a hook unconditionally; hooks of the same kind coexist.
    pub fn arm(&mut self, trigger: TriggerMask, action: A) -> Armed {
        Armed::New(self.push(trigger, action))
    }

    /// Queue a hook unless one of the same kind is already armed.
    pub fn arm_once(&mut self, trigger: TriggerMask, action: A) -> Armed {
        let kind = Self::kind_of(&action);
        if let Some(existing) = self
            .hooks
            .iter()
            .find(|h| h.armed && Self::kind_of(&h.action) == kind)
        {
            tracing::trace!(target: "events.hooks", id = existing.id.0, "hook_absorbed");
            return Armed::Absorbed(existing.id);
        }
        Armed::New(self.push(trigger, action))
    }

    /// Drop armed hooks of the same kind, then queue this one.
    pub fn arm_replacing(&mut self, trigger: TriggerMask, action: A) -> Armed {
        let kind = Self::kind_of(&action);
        let before = self.hooks.len();
        self.hooks.retain(|h| Self::kind_of(&h.action) != kind);
        let replaced = before - self.hooks.len();
        if replaced > 0 {
            HOOKS_SUPERSEDED.fetch_add(replaced as u64, Ordering::Relaxed);
            tracing::debug!(target: "events.hooks", replaced, "hook_superseded");
        }
        let id = self.push(trigger, action);
        if replaced == 0 {
            Armed::New(id)
        } else {
            Armed::Superseded { id, replaced }
        }
    }

    /// Disarm and remove every hook listening for `event`, returning their
    /// actions in arming order.
    pub fn take_fired(&mut self, event: EditorEvent) -> Vec<A> {
        let mut fired = Vec::new();
        let mut kept: SmallVec<[DeferredHook<A>; 4]> = SmallVec::new();
        for mut hook in self.hooks.drain(..) {
            if hook.trigger.matches(event) && hook.disarm() {
                tracing::trace!(target: "events.hooks", id = hook.id.0, %event, "hook_fired");
                fired.push(hook.action);
            } else if hook.armed {
                kept.push(hook);
            }
        }
        self.hooks = kept;
        HOOKS_FIRED.fetch_add(fired.len() as u64, Ordering::Relaxed);
        fired
    }

    /// Drop every pending hook (buffer closed). Returns how many were dropped.
    pub fn discard_all(&mut self) -> usize {
        let n = self.hooks.len();
        self.hooks.clear();
        if n > 0 {
            HOOKS_DISCARDED.fetch_add(n as u64, Ordering::Relaxed);
            tracing::debug!(target: "events.hooks", dropped = n, "hooks_discarded");
        }
        n
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Armed hooks in arming order.
    pub fn pending(&self) -> impl Iterator<Item = &DeferredHook<A>> {
        self.hooks.iter().filter(|h| h.armed)
    }

    /// Whether an armed hook of the same kind as `probe` is queued.
    pub fn has_kind(&self, probe: &A) -> bool {
        let kind = Self::kind_of(probe);
        self.pending().any(|h| Self::kind_of(&h.action) == kind)
    }
}
