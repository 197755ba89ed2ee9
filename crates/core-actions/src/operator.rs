//! Operator-pending post-processing.
//!
//! After the oracle answers, the cursor is handed to the host and any
//! correction the host's own operator application cannot express is armed as
//! a deferred hook on the buffer's queue:
//!
//! | operator | condition                 | hook (trigger)                          |
//! |----------|---------------------------|-----------------------------------------|
//! | `d`      | `d_special`               | whole-line delete (text changed)        |
//! | `c`      | forward family            | one-column drift fix (mode changed)     |
//! | `c`      | `prevent_change`          | cancel the change (mode changed)        |
//! | any      | `prevent_change`          | empty exclusive range, no hook          |

use core_events::{HookQueue, TriggerMask};
use core_model::{EditorHost, HostError};
use core_state::{HookAction, Operator};
use core_text::{CursorPosition, MotionResult, motion};
use tracing::{debug, trace};

use crate::dispatcher::{Direction, MotionFamily};
use crate::normalize::normalize_cursor;

pub(crate) fn post_process<H: EditorHost + ?Sized>(
    host: &mut H,
    hooks: &mut HookQueue<HookAction>,
    op: Operator,
    family: MotionFamily,
    start: CursorPosition,
    result: MotionResult,
) -> Result<(), HostError> {
    if result.prevent_change {
        host.set_cursor(start)?;
        host.force_exclusive();
        if op == Operator::Change {
            let armed = hooks.arm(TriggerMask::MODE_CHANGED, HookAction::CancelPendingOperator);
            debug!(target: "actions.hooks", hook = ?armed, "change_cancel_armed");
        }
        return Ok(());
    }
    host.set_cursor(result.cursor)?;
    match op {
        Operator::Delete if result.d_special => {
            let armed = hooks.arm_replacing(
                TriggerMask::TEXT_CHANGED,
                HookAction::DeleteLineSpecial { column: start.col },
            );
            debug!(target: "actions.hooks", hook = ?armed, column = start.col, "d_special_armed");
        }
        Operator::Change if family.direction() == Direction::Forward => {
            let armed = hooks.arm_replacing(
                TriggerMask::MODE_CHANGED,
                HookAction::CompensateChangeDrift {
                    line: start.line,
                    column: start.col,
                },
            );
            trace!(target: "actions.hooks", hook = ?armed, "change_drift_armed");
        }
        _ => {}
    }
    Ok(())
}

/// Redo the delete as a whole-line delete and return to `column`.
pub(crate) fn delete_line_special<H: EditorHost + ?Sized>(
    host: &mut H,
    column: usize,
) -> Result<(), HostError> {
    host.delete_cursor_line()?;
    let line = normalize_cursor(host.buffer(), host.raw_cursor()).line;
    host.set_cursor(CursorPosition::new(line, column))
}

/// Step right once when the change left the cursor short of `column` on
/// `line`. Never moves past the line's byte length.
pub(crate) fn compensate_drift<H: EditorHost + ?Sized>(
    host: &mut H,
    line: usize,
    column: usize,
) -> Result<(), HostError> {
    let at = normalize_cursor(host.buffer(), host.raw_cursor());
    if at.line != line || at.col >= column {
        return Ok(());
    }
    let mut next = at;
    motion::right(host.buffer(), &mut next);
    if next == at || next.col > host.buffer().line_byte_len(line) {
        return Ok(());
    }
    trace!(target: "actions.hooks", from = at.col, to = next.col, "change_drift_fixed");
    host.set_cursor(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::HeadlessEditor;
    use core_state::{BufferId, Mode};
    use pretty_assertions::assert_eq;

    fn editor(lines: &[&str], at: CursorPosition) -> HeadlessEditor {
        let mut ed = HeadlessEditor::from_lines(BufferId(1), lines).unwrap();
        ed.set_cursor(at).unwrap();
        ed
    }

    #[test]
    fn drift_fix_moves_once_and_only_on_its_line() {
        let mut ed = editor(&["foo ", "bar"], CursorPosition::new(1, 2));
        compensate_drift(&mut ed, 1, 4).unwrap();
        assert_eq!(ed.cursor(), CursorPosition::new(1, 3));

        compensate_drift(&mut ed, 2, 4).unwrap();
        assert_eq!(ed.cursor(), CursorPosition::new(1, 3));

        // Already at or right of the column.
        compensate_drift(&mut ed, 1, 3).unwrap();
        assert_eq!(ed.cursor(), CursorPosition::new(1, 3));
    }

    #[test]
    fn prevent_change_empties_the_range_without_hooks_for_yank() {
        let mut ed = editor(&["foo bar"], CursorPosition::new(1, 4));
        ed.begin_operator(Operator::Yank).unwrap();
        let mut hooks = HookQueue::new();
        let result = MotionResult {
            cursor: CursorPosition::new(1, 0),
            d_special: false,
            prevent_change: true,
        };
        let start = CursorPosition::new(1, 4);
        post_process(&mut ed, &mut hooks, Operator::Yank, MotionFamily::WordBack, start, result)
            .unwrap();
        assert!(hooks.is_empty());
        ed.finish_operator(true).unwrap();
        assert_eq!(ed.register(), "");
        assert_eq!(ed.mode(), Mode::Normal);
    }

    #[test]
    fn newer_drift_request_supersedes_older() {
        let mut ed = editor(&["foo bar"], CursorPosition::new(1, 0));
        let mut hooks = HookQueue::new();
        let result = MotionResult::plain(CursorPosition::new(1, 3));
        for col in [0, 4] {
            let start = CursorPosition::new(1, col);
            post_process(&mut ed, &mut hooks, Operator::Change, MotionFamily::WordEnd, start, result)
                .unwrap();
        }
        assert_eq!(hooks.len(), 1);
        let kept: Vec<_> = hooks.pending().map(|h| h.action).collect();
        assert_eq!(kept, vec![HookAction::CompensateChangeDrift { line: 1, column: 4 }]);
    }
}
