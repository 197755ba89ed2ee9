//! Virtual-edit scope manager.
//!
//! A motion that may land one past the last character widens the host's
//! virtual-edit option for its duration. The user's value is captured once
//! per motion sequence by the session's [`VirtualEditScope`] and restored by
//! a single deferred hook on the next cursor-moved or text-changed event.

use core_events::{Armed, TriggerMask};
use core_model::EditorHost;
use core_state::{AdapterSession, HookAction, VirtualEditScope};
use tracing::{debug, trace};

pub(crate) const RESTORE_TRIGGER: TriggerMask =
    TriggerMask::CURSOR_MOVED.union(TriggerMask::TEXT_CHANGED);

/// Install the widened value and make sure a restoration is pending.
pub(crate) fn widen<H: EditorHost + ?Sized>(host: &mut H, session: &mut AdapterSession) {
    let live = host.virtual_edit();
    let widened = session.scope.enter(live);
    if widened != live {
        host.set_virtual_edit(widened);
    }
    let armed = session
        .hooks
        .arm_once(RESTORE_TRIGGER, HookAction::RestoreVirtualEdit);
    match armed {
        Armed::Absorbed(id) => {
            trace!(target: "actions.hooks", buffer = %session.id, hook = ?id, "restore_already_armed")
        }
        other => {
            trace!(target: "actions.hooks", buffer = %session.id, hook = ?other.id(), "restore_armed")
        }
    }
}

/// Put back the value saved when the scope was entered. A second call is a
/// no-op.
pub(crate) fn restore<H: EditorHost + ?Sized>(host: &mut H, scope: &mut VirtualEditScope) {
    if let Some(saved) = scope.restore() {
        debug!(target: "actions.hooks", value = %saved, "virtual_edit_restored");
        host.set_virtual_edit(saved);
    }
}
