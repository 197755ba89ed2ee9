//! Save-once / restore-once bookkeeping for the virtual-edit option.

use crate::VirtualEdit;

/// Remembers the user's virtual-edit value across one motion sequence.
///
/// The first motion of a sequence saves the live value; later motions issued
/// before restoration observe the saved value and do not overwrite it with
/// the adapter's own widened setting. Restoration yields the saved value
/// exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualEditScope {
    saved: Option<VirtualEdit>,
}

impl VirtualEditScope {
    /// Start (or join) a scope given the editor's live value. Returns the
    /// value to install while the motion runs.
    pub fn enter(&mut self, live: VirtualEdit) -> VirtualEdit {
        match self.saved {
            Some(saved) => {
                tracing::trace!(target: "state.virtual_edit", saved = %saved, "scope_joined");
                live.widened()
            }
            None => {
                tracing::trace!(target: "state.virtual_edit", saved = %live, "scope_entered");
                self.saved = Some(live);
                live.widened()
            }
        }
    }

    /// End the scope, handing back the value to restore. `None` when no scope
    /// is active (restoration already happened).
    pub fn restore(&mut self) -> Option<VirtualEdit> {
        let saved = self.saved.take();
        if let Some(value) = saved {
            tracing::trace!(target: "state.virtual_edit", restored = %value, "scope_restored");
        }
        saved
    }

    pub fn is_active(&self) -> bool {
        self.saved.is_some()
    }

    pub fn saved(&self) -> Option<VirtualEdit> {
        self.saved
    }
}
