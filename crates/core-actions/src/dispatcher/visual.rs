use core_model::EditorHost;
use core_state::AdapterSession;
use core_text::MotionResult;
use tracing::trace;

use super::Request;
use crate::normalize::normalize_cursor;
use crate::{AdapterError, boundary, virtual_edit};

/// Visual protocol: correct the start, widen addressing, move, then `m>`
/// and `gv` so the selection is reinstated with the new trailing end.
pub(super) fn run<H: EditorHost + ?Sized>(
    host: &mut H,
    session: &mut AdapterSession,
    req: Request<'_>,
) -> Result<MotionResult, AdapterError> {
    let live = normalize_cursor(host.buffer(), host.raw_cursor());
    let start = boundary::effective_start(host.buffer(), host.mode(), host.visual_end_mark(), live);
    virtual_edit::widen(host, session);
    let result = req
        .oracle
        .visual(host.buffer(), start, req.count, req.family)?;
    trace!(
        target: "actions.motion",
        family = %req.family,
        from = ?start,
        to = ?result.cursor,
        "visual_target"
    );
    host.set_cursor(result.cursor)?;
    host.set_visual_end_mark(result.cursor);
    host.reselect_visual()?;
    Ok(result)
}
