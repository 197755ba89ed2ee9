//! Sanitizing of editor-supplied counts and cursors.
//!
//! Both conversions are total: any input, however pathological, maps to a
//! value the oracle accepts.

use std::fmt;
use std::num::NonZeroU64;

use core_model::RawCursor;
use core_text::{BufferView, CursorPosition, grapheme};

/// Motion repeat count in `1..=u64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Count(NonZeroU64);

impl Count {
    pub const ONE: Count = Count(NonZeroU64::MIN);
    pub const MAX: Count = Count(NonZeroU64::MAX);

    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// `2d3w` counts multiply.
    pub fn saturating_mul(self, other: Count) -> Count {
        Count(self.0.saturating_mul(other.0))
    }
}

impl Default for Count {
    fn default() -> Self {
        Count::ONE
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A count as the editor hands it over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawCount<'a> {
    /// No count typed.
    Absent,
    Int(i128),
    /// A typed digit sequence of any length.
    Digits(&'a str),
}

/// Zero, negative and absent counts mean "once"; anything past `u64::MAX`
/// saturates.
pub fn normalize_count(raw: RawCount<'_>) -> Count {
    let value = match raw {
        RawCount::Absent => 0,
        RawCount::Int(n) if n <= 0 => 0,
        RawCount::Int(n) => u64::try_from(n).unwrap_or(u64::MAX),
        RawCount::Digits(digits) => digits
            .bytes()
            .filter(u8::is_ascii_digit)
            .fold(0u64, |acc, d| {
                acc.saturating_mul(10).saturating_add(u64::from(d - b'0'))
            }),
    };
    NonZeroU64::new(value).map_or(Count::ONE, Count)
}

/// Convert a raw editor cursor (1-indexed line, 1-indexed display column)
/// into a line/byte position. Lines clamp into the buffer; a display column
/// past the last cell addresses the slot one past the last character.
pub fn normalize_cursor<B: BufferView + ?Sized>(buffer: &B, raw: RawCursor) -> CursorPosition {
    let lines = buffer.line_count().max(1) as i64;
    let line = raw.line.clamp(1, lines) as usize;
    let display = usize::try_from(raw.col.saturating_sub(1)).unwrap_or(0);
    let tabstop = buffer.tabstop();
    let col = buffer
        .line(line)
        .map(|content| grapheme::byte_for_visual_col(&content, display, tabstop))
        .unwrap_or(0);
    CursorPosition::new(line, col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;
    use proptest::prelude::*;

    #[test]
    fn absent_and_zero_mean_once() {
        assert_eq!(normalize_count(RawCount::Absent), Count::ONE);
        assert_eq!(normalize_count(RawCount::Int(0)), Count::ONE);
        assert_eq!(normalize_count(RawCount::Int(-7)), Count::ONE);
        assert_eq!(normalize_count(RawCount::Digits("")), Count::ONE);
        assert_eq!(normalize_count(RawCount::Digits("000")), Count::ONE);
    }

    #[test]
    fn oversized_counts_saturate() {
        assert_eq!(
            normalize_count(RawCount::Digits("18446744073709551616")),
            Count::MAX
        );
        assert_eq!(
            normalize_count(RawCount::Digits("99999999999999999999999999999999")),
            Count::MAX
        );
        assert_eq!(normalize_count(RawCount::Int(1 << 64)), Count::MAX);
        assert_eq!(normalize_count(RawCount::Int(i128::MAX)), Count::MAX);
        assert_eq!(Count::MAX.get(), 18_446_744_073_709_551_615);
    }

    #[test]
    fn cursor_conversion_handles_wide_characters() {
        let lines = vec!["漢字 ab", ""];
        let pos = normalize_cursor(&lines, RawCursor::new(1, 5));
        assert_eq!(pos, CursorPosition::new(1, 6));
        let pos = normalize_cursor(&lines, RawCursor::new(1, 3));
        assert_eq!(pos, CursorPosition::new(1, 3));
        // Past the last cell.
        let pos = normalize_cursor(&lines, RawCursor::new(1, 40));
        assert_eq!(pos, CursorPosition::new(1, 9));
    }

    #[test]
    fn cursor_conversion_expands_leading_tab() {
        let lines = vec!["\tfoo bar"];
        assert_eq!(
            normalize_cursor(&lines, RawCursor::new(1, 9)),
            CursorPosition::new(1, 1)
        );
        assert_eq!(
            normalize_cursor(&lines, RawCursor::new(1, 8)),
            CursorPosition::new(1, 0)
        );
        assert_eq!(
            normalize_cursor(&lines, RawCursor::new(1, 13)),
            CursorPosition::new(1, 5)
        );

        let mut buffer = Buffer::from_lines("tabs", &lines).unwrap();
        buffer.set_tabstop(2);
        assert_eq!(
            normalize_cursor(&buffer, RawCursor::new(1, 3)),
            CursorPosition::new(1, 1)
        );
    }

    #[test]
    fn cursor_conversion_clamps_garbage() {
        let lines = vec!["abc", ""];
        assert_eq!(
            normalize_cursor(&lines, RawCursor::new(-3, -9)),
            CursorPosition::new(1, 0)
        );
        assert_eq!(
            normalize_cursor(&lines, RawCursor::new(i64::MAX, i64::MIN)),
            CursorPosition::new(2, 0)
        );
    }

    proptest! {
        #[test]
        fn clamping_is_idempotent(n in any::<u64>()) {
            let once = normalize_count(RawCount::Int(i128::from(n)));
            let twice = normalize_count(RawCount::Int(i128::from(once.get())));
            prop_assert_eq!(once, twice);
            prop_assert_eq!(once.get(), n.max(1));
        }

        #[test]
        fn digits_agree_with_integers(n in any::<u64>()) {
            let text = n.to_string();
            prop_assert_eq!(
                normalize_count(RawCount::Digits(&text)),
                normalize_count(RawCount::Int(i128::from(n)))
            );
        }
    }
}
