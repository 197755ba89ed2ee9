use core_model::EditorHost;
use core_state::{AdapterSession, Operator};
use core_text::MotionResult;
use tracing::trace;

use super::Request;
use crate::normalize::normalize_cursor;
use crate::{AdapterError, operator, virtual_edit};

pub(super) fn run<H: EditorHost + ?Sized>(
    host: &mut H,
    session: &mut AdapterSession,
    op: Operator,
    req: Request<'_>,
) -> Result<MotionResult, AdapterError> {
    let cursor = normalize_cursor(host.buffer(), host.raw_cursor());
    virtual_edit::widen(host, session);
    let result = req
        .oracle
        .operator_pending(host.buffer(), cursor, op, req.count, req.family)?;
    trace!(
        target: "actions.motion",
        op = %op,
        family = %req.family,
        from = ?cursor,
        to = ?result.cursor,
        d_special = result.d_special,
        prevent_change = result.prevent_change,
        "operator_target"
    );
    operator::post_process(host, &mut session.hooks, op, req.family, cursor, result)?;
    Ok(result)
}
