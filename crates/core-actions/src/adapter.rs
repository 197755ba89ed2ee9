//! The motion adapter: the single entry point the host's key bindings call,
//! plus the event pump that runs deferred corrections.

use core_config::{Config, PreviewLimit};
use core_events::EditorEvent;
use core_model::{EditorHost, EventSource};
use core_state::{AdapterSession, BufferId, HookAction, SessionRegistry};
use core_text::{CursorPosition, MotionResult};
use tracing::{debug, warn};

use crate::dispatcher::{self, Binding, MotionFamily, Protocol, Request};
use crate::normalize::{Count, RawCount, normalize_count, normalize_cursor};
use crate::oracle::{NativeFactory, OracleHandle, init_oracle};
use crate::preview::Preview;
use crate::{AdapterError, operator, virtual_edit};

#[derive(Debug)]
pub struct MotionAdapter {
    oracle: OracleHandle,
    sessions: SessionRegistry,
    preview_limit: PreviewLimit,
}

impl MotionAdapter {
    pub fn new(oracle: OracleHandle, preview_limit: PreviewLimit) -> Self {
        Self {
            oracle,
            sessions: SessionRegistry::new(),
            preview_limit,
        }
    }

    /// Adapter over the native oracle, configured from `config`.
    pub fn from_config(config: &Config) -> Result<Self, AdapterError> {
        let oracle = init_oracle(config, Box::new(NativeFactory))?;
        Ok(Self::new(oracle, config.preview_limit()))
    }

    pub fn oracle(&self) -> &OracleHandle {
        &self.oracle
    }

    pub fn session(&self, id: BufferId) -> Option<&AdapterSession> {
        self.sessions.session(id)
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn preview_limit(&self) -> PreviewLimit {
        self.preview_limit
    }

    /// Run `family` under whatever protocol the host's current mode calls for.
    pub fn invoke<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        family: MotionFamily,
        count: RawCount<'_>,
    ) -> Result<MotionResult, AdapterError> {
        self.invoke_counted(host, family, normalize_count(count))
    }

    /// Entry point for a named binding (`xmap_w`, ...). The binding's prefix
    /// must agree with the host's mode.
    pub fn invoke_binding<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        binding: Binding,
        count: RawCount<'_>,
    ) -> Result<MotionResult, AdapterError> {
        let mode = host.mode();
        if Protocol::for_mode(mode)?.prefix() != binding.prefix {
            return Err(AdapterError::ModeMismatch { binding, mode });
        }
        self.invoke(host, binding.family, count)
    }

    pub fn invoke_counted<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        family: MotionFamily,
        count: Count,
    ) -> Result<MotionResult, AdapterError> {
        let mode = host.mode();
        let protocol = Protocol::for_mode(mode)?;
        let oracle = self.oracle.get()?;
        let session = self.sessions.session_mut(host.buffer_id());
        let req = Request {
            oracle,
            family,
            count,
        };
        let result = dispatcher::dispatch(protocol, host, session, req)?;
        debug!(
            target: "actions.motion",
            buffer = %host.buffer_id(),
            mode = %mode,
            family = %family,
            count = count.get(),
            line = result.cursor.line,
            col = result.cursor.col,
            "motion_applied"
        );
        Ok(result)
    }

    /// Deliver one host event: every hook of this buffer listening for it
    /// fires once, in arming order, and is removed. Returns how many fired.
    pub fn handle_event<H: EditorHost + ?Sized>(&mut self, host: &mut H, event: EditorEvent) -> usize {
        let Some(session) = self.sessions.get_mut(host.buffer_id()) else {
            return 0;
        };
        let fired = session.hooks.take_fired(event);
        for action in &fired {
            let outcome = match *action {
                HookAction::RestoreVirtualEdit => {
                    virtual_edit::restore(host, &mut session.scope);
                    Ok(())
                }
                HookAction::DeleteLineSpecial { column } => {
                    operator::delete_line_special(host, column)
                }
                HookAction::CompensateChangeDrift { line, column } => {
                    operator::compensate_drift(host, line, column)
                }
                HookAction::CancelPendingOperator => {
                    host.cancel_pending();
                    Ok(())
                }
            };
            if let Err(err) = outcome {
                warn!(target: "actions.hooks", buffer = %session.id, ?action, error = %err, "hook_failed");
            }
        }
        fired.len()
    }

    /// Drain the host's event queue through [`Self::handle_event`]. Events
    /// raised by the hooks themselves are delivered in the same pass.
    pub fn pump<H: EditorHost + EventSource + ?Sized>(&mut self, host: &mut H) -> usize {
        let mut fired = 0;
        while let Some(event) = host.next_event() {
            fired += self.handle_event(host, event);
        }
        fired
    }

    /// The buffer is gone: its pending hooks are dropped unrun.
    pub fn buffer_closed(&mut self, id: BufferId) -> usize {
        let dropped = self.sessions.close(id).unwrap_or(0);
        if dropped > 0 {
            debug!(target: "actions.hooks", buffer = %id, dropped, "pending_hooks_discarded");
        }
        dropped
    }

    /// Highlight the upcoming targets of `family` from the cursor. Clears
    /// highlights when there is nothing to show. Cursor, selection and
    /// virtual-edit state are left untouched.
    pub fn preview<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        family: MotionFamily,
    ) -> Result<Vec<CursorPosition>, AdapterError> {
        let oracle = self.oracle.get()?;
        let origin = normalize_cursor(host.buffer(), host.raw_cursor());
        let targets: Vec<_> = Preview::new(oracle, host.buffer(), origin, family, self.preview_limit)
            .targets()
            .collect();
        debug!(target: "actions.preview", family = %family, shown = targets.len(), "preview");
        if targets.is_empty() {
            host.clear_highlights();
        } else {
            host.show_highlights(&targets);
        }
        Ok(targets)
    }

    pub fn clear_preview<H: EditorHost + ?Sized>(&self, host: &mut H) {
        host.clear_highlights();
    }
}
