use core_model::EditorHost;
use core_text::MotionResult;
use tracing::trace;

use super::Request;
use crate::AdapterError;
use crate::normalize::normalize_cursor;

pub(super) fn run<H: EditorHost + ?Sized>(
    host: &mut H,
    req: Request<'_>,
) -> Result<MotionResult, AdapterError> {
    let cursor = normalize_cursor(host.buffer(), host.raw_cursor());
    let target = req
        .oracle
        .normal(host.buffer(), cursor, req.count, req.family)?;
    trace!(target: "actions.motion", family = %req.family, from = ?cursor, to = ?target, "normal_target");
    host.set_cursor(target)?;
    Ok(MotionResult::plain(target))
}
