//! Visual selection boundary correction.

use core_state::Mode;
use core_text::{BufferView, CursorPosition};

/// Starting cursor for a visual motion.
///
/// When the `'>` mark sits at or past the byte length of its line the
/// selection extends past the last character, and the live cursor (which the
/// host clamps back onto a character) is not where the motion must continue
/// from. The mark is then used verbatim. Outside visual modes, or when the
/// mark lies inside its line, the live cursor is returned unchanged.
pub fn effective_start<B: BufferView + ?Sized>(
    buffer: &B,
    mode: Mode,
    end_mark: Option<CursorPosition>,
    live: CursorPosition,
) -> CursorPosition {
    if !mode.is_visual() {
        return live;
    }
    match end_mark {
        Some(mark) if buffer.line(mark.line).is_some() && mark.col >= buffer.line_byte_len(mark.line) => {
            tracing::trace!(target: "actions.motion", ?mark, ?live, "boundary_corrected");
            mark
        }
        _ => live,
    }
}
