//! Key-script replay against a [`HeadlessEditor`].
//!
//! Scripts use the editor's own notation for the subset the adapter cares
//! about:
//! * `[count][operator][count]motion` with operators `d`, `c`, `y` and
//!   motions `w W e E b B ge gE` (counts multiply, as in `2d3w`);
//! * `h j k l` with an optional count;
//! * `v`, `V`, `<C-v>` and `<Esc>`.
//!
//! Whitespace between keys is ignored. Word motions go through the
//! [`MotionAdapter`]; `h/j/k/l` use plain cursor motions. Host events are
//! pumped after every step, and once more between an operator key and its
//! motion, mirroring an editor that runs its autocommands as they happen.

use std::fmt;

use core_model::{EditorHost, HeadlessEditor};
use core_state::{Mode, Operator, VisualKind};
use core_text::{CursorPosition, motion};
use tracing::{debug, trace};

use crate::ReplayError;
use crate::adapter::MotionAdapter;
use crate::dispatcher::MotionFamily;
use crate::normalize::{Count, RawCount, normalize_count};
use crate::oracle::MotionOracle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Left,
    Down,
    Up,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Motion {
        count: Count,
        operator: Option<Operator>,
        family: MotionFamily,
    },
    Nudge {
        count: Count,
        dir: Nudge,
    },
    Visual(VisualKind),
    Escape,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = |f: &mut fmt::Formatter<'_>, c: &Count| {
            if *c == Count::ONE {
                Ok(())
            } else {
                write!(f, "{c}")
            }
        };
        match self {
            Step::Motion {
                count: c,
                operator,
                family,
            } => {
                count(f, c)?;
                if let Some(op) = operator {
                    write!(f, "{op}")?;
                }
                write!(f, "{family}")
            }
            Step::Nudge { count: c, dir } => {
                count(f, c)?;
                f.write_str(match dir {
                    Nudge::Left => "h",
                    Nudge::Down => "j",
                    Nudge::Up => "k",
                    Nudge::Right => "l",
                })
            }
            Step::Visual(VisualKind::Char) => f.write_str("v"),
            Step::Visual(VisualKind::Line) => f.write_str("V"),
            Step::Visual(VisualKind::Block) => f.write_str("<C-v>"),
            Step::Escape => f.write_str("<Esc>"),
        }
    }
}

#[derive(Default)]
struct Pending<'a> {
    count: Option<&'a str>,
    operator: Option<Operator>,
    op_count: Option<&'a str>,
}

impl<'a> Pending<'a> {
    fn total(&self) -> Count {
        let prefix = normalize_count(self.count.map_or(RawCount::Absent, RawCount::Digits));
        let post = normalize_count(self.op_count.map_or(RawCount::Absent, RawCount::Digits));
        prefix.saturating_mul(post)
    }
}

fn unknown(keys: &str, offset: usize, len: usize) -> ReplayError {
    let end = (offset + len).min(keys.len());
    ReplayError::UnknownKey {
        key: keys.get(offset..end).unwrap_or_default().to_string(),
        offset,
    }
}

/// Split a key script into steps.
pub fn parse(keys: &str) -> Result<Vec<Step>, ReplayError> {
    let mut steps = Vec::new();
    let mut pending = Pending::default();
    let bytes = keys.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' | b'\n' | b'\r' => i += 1,
            b'0'..=b'9' => {
                let slot = if pending.operator.is_some() {
                    &mut pending.op_count
                } else {
                    &mut pending.count
                };
                // `0` is a motion of its own, never the start of a count.
                if c == b'0' || slot.is_some() {
                    return Err(unknown(keys, i, 1));
                }
                let mut end = i;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                *slot = Some(&keys[i..end]);
                i = end;
            }
            b'd' | b'c' | b'y' => {
                if pending.operator.is_some() {
                    return Err(unknown(keys, i, 1));
                }
                pending.operator = Some(Operator::from_char(char::from(c)));
                i += 1;
            }
            b'w' | b'W' | b'e' | b'E' | b'b' | b'B' | b'g' => {
                let len = if c == b'g' { 2 } else { 1 };
                let family = keys
                    .get(i..i + len)
                    .and_then(MotionFamily::from_keys)
                    .ok_or_else(|| unknown(keys, i, len))?;
                steps.push(Step::Motion {
                    count: pending.total(),
                    operator: pending.operator,
                    family,
                });
                pending = Pending::default();
                i += len;
            }
            b'h' | b'j' | b'k' | b'l' | b'v' | b'V' if pending.operator.is_some() => {
                return Err(unknown(keys, i, 1));
            }
            b'h' | b'j' | b'k' | b'l' => {
                let dir = match c {
                    b'h' => Nudge::Left,
                    b'j' => Nudge::Down,
                    b'k' => Nudge::Up,
                    _ => Nudge::Right,
                };
                steps.push(Step::Nudge {
                    count: pending.total(),
                    dir,
                });
                pending = Pending::default();
                i += 1;
            }
            b'v' | b'V' => {
                let kind = if c == b'v' {
                    VisualKind::Char
                } else {
                    VisualKind::Line
                };
                steps.push(Step::Visual(kind));
                pending = Pending::default();
                i += 1;
            }
            b'<' => {
                let close = keys[i..]
                    .find('>')
                    .ok_or_else(|| unknown(keys, i, keys.len() - i))?;
                let name = &keys[i + 1..i + close];
                if name.eq_ignore_ascii_case("esc") {
                    steps.push(Step::Escape);
                } else if name.eq_ignore_ascii_case("c-v") && pending.operator.is_none() {
                    steps.push(Step::Visual(VisualKind::Block));
                } else {
                    return Err(unknown(keys, i, close + 1));
                }
                pending = Pending::default();
                i += close + 1;
            }
            _ => {
                let len = keys[i..].chars().next().map_or(1, char::len_utf8);
                return Err(unknown(keys, i, len));
            }
        }
    }
    if let Some(op) = pending.operator {
        return Err(ReplayError::DanglingOperator { op: op.as_char() });
    }
    Ok(steps)
}

fn nudge(editor: &mut HeadlessEditor, dir: Nudge, count: Count) -> Result<(), ReplayError> {
    let mut sticky = None;
    for _ in 0..count.get() {
        let before = editor.cursor();
        let mut pos = before;
        match dir {
            Nudge::Left => motion::left(editor.buffer(), &mut pos),
            Nudge::Right => motion::right(editor.buffer(), &mut pos),
            Nudge::Up => sticky = motion::up(editor.buffer(), &mut pos, sticky),
            Nudge::Down => sticky = motion::down(editor.buffer(), &mut pos, sticky),
        }
        editor.set_cursor(pos)?;
        if editor.cursor() == before {
            break;
        }
    }
    Ok(())
}

/// Execute one step and deliver the events it raised.
pub fn execute(
    adapter: &mut MotionAdapter,
    editor: &mut HeadlessEditor,
    step: Step,
) -> Result<(), ReplayError> {
    trace!(target: "actions.replay", step = %step, "step");
    match step {
        Step::Motion {
            count,
            operator: None,
            family,
        } => {
            adapter.invoke_counted(editor, family, count)?;
        }
        Step::Motion {
            count,
            operator: Some(op),
            family,
        } => {
            editor.begin_operator(op)?;
            adapter.pump(editor);
            if let Err(err) = adapter.invoke_counted(editor, family, count) {
                editor.escape();
                adapter.pump(editor);
                return Err(err.into());
            }
            editor.finish_operator(family.is_inclusive())?;
        }
        Step::Nudge { count, dir } => nudge(editor, dir, count)?,
        Step::Visual(kind) => editor.toggle_visual(kind),
        Step::Escape => editor.escape(),
    }
    adapter.pump(editor);
    Ok(())
}

/// Run a whole script. Returns the number of steps executed.
pub fn run(
    adapter: &mut MotionAdapter,
    editor: &mut HeadlessEditor,
    keys: &str,
) -> Result<usize, ReplayError> {
    let steps = parse(keys)?;
    for step in &steps {
        execute(adapter, editor, *step)?;
    }
    debug!(target: "actions.replay", steps = steps.len(), "script_done");
    Ok(steps.len())
}

/// First normal-mode motion whose result differs from a reference oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    pub index: usize,
    pub step: Step,
    pub from: CursorPosition,
    pub expected: CursorPosition,
    pub actual: CursorPosition,
}

/// Replay `keys`, checking every plain normal-mode motion against
/// `reference` evaluated from the same cursor.
pub fn compare(
    adapter: &mut MotionAdapter,
    editor: &mut HeadlessEditor,
    keys: &str,
    reference: &dyn MotionOracle,
) -> Result<Option<Divergence>, ReplayError> {
    for (index, step) in parse(keys)?.into_iter().enumerate() {
        let from = editor.cursor();
        let expected = match step {
            Step::Motion {
                count,
                operator: None,
                family,
            } if editor.mode() == Mode::Normal => {
                Some(reference.normal(editor.buffer(), from, count, family)?)
            }
            _ => None,
        };
        execute(adapter, editor, step)?;
        if let Some(expected) = expected
            && editor.cursor() != expected
        {
            return Ok(Some(Divergence {
                index,
                step,
                from,
                expected,
                actual: editor.cursor(),
            }));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn n(v: u64) -> Count {
        normalize_count(RawCount::Int(i128::from(v)))
    }

    #[test]
    fn parses_counts_operators_and_modes() {
        let steps = parse("2d3w vge<Esc> 12j <C-v>E").unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Motion {
                    count: n(6),
                    operator: Some(Operator::Delete),
                    family: MotionFamily::Word
                },
                Step::Visual(VisualKind::Char),
                Step::Motion {
                    count: Count::ONE,
                    operator: None,
                    family: MotionFamily::WordBackEnd
                },
                Step::Escape,
                Step::Nudge {
                    count: n(12),
                    dir: Nudge::Down
                },
                Step::Visual(VisualKind::Block),
                Step::Motion {
                    count: Count::ONE,
                    operator: None,
                    family: MotionFamily::BigWordEnd
                },
            ]
        );
    }

    #[test]
    fn huge_counts_saturate() {
        let steps = parse("18446744073709551616w").unwrap();
        assert_eq!(
            steps,
            vec![Step::Motion {
                count: Count::MAX,
                operator: None,
                family: MotionFamily::Word
            }]
        );
        let steps = parse("99999999999d99999999999e").unwrap();
        assert!(matches!(steps[0], Step::Motion { count, .. } if count == Count::MAX));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            parse("wx"),
            Err(ReplayError::UnknownKey { ref key, offset: 1 }) if key == "x"
        ));
        assert!(matches!(
            parse("gx"),
            Err(ReplayError::UnknownKey { ref key, offset: 0 }) if key == "gx"
        ));
        assert!(matches!(parse("0w"), Err(ReplayError::UnknownKey { .. })));
        assert!(matches!(parse("dd"), Err(ReplayError::UnknownKey { .. })));
        assert!(matches!(parse("<C-x>"), Err(ReplayError::UnknownKey { .. })));
        assert!(matches!(
            parse("2c"),
            Err(ReplayError::DanglingOperator { op: 'c' })
        ));
    }

    #[test]
    fn steps_display_as_keys() {
        let text: Vec<String> = parse("3cgE2l<c-v>")
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(text, vec!["3cgE", "2l", "<C-v>"]);
    }
}
