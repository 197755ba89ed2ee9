//! Preview of upcoming motion targets.
//!
//! A [`Preview`] is a cheap, copyable description (oracle, buffer, origin,
//! family, limit). [`Preview::targets`] starts a fresh lazy walk every time it
//! is called, so the same preview can be iterated again from the start. The
//! walk repeats the single-step normal-mode motion and stops when the cursor
//! stops moving, when the limit is reached, or (for
//! [`PreviewLimit::CurrentLine`]) when the next target leaves the line.

use core_config::PreviewLimit;
use core_text::{BufferView, CursorPosition};
use tracing::debug;

use crate::dispatcher::MotionFamily;
use crate::normalize::Count;
use crate::oracle::MotionOracle;

#[derive(Clone, Copy)]
pub struct Preview<'a> {
    oracle: &'a dyn MotionOracle,
    buffer: &'a dyn BufferView,
    origin: CursorPosition,
    family: MotionFamily,
    limit: PreviewLimit,
}

impl<'a> Preview<'a> {
    pub fn new(
        oracle: &'a dyn MotionOracle,
        buffer: &'a dyn BufferView,
        origin: CursorPosition,
        family: MotionFamily,
        limit: PreviewLimit,
    ) -> Self {
        Self {
            oracle,
            buffer,
            origin,
            family,
            limit,
        }
    }

    pub fn targets(&self) -> PreviewTargets<'a> {
        PreviewTargets {
            preview: *self,
            at: self.origin,
            produced: 0,
            done: false,
        }
    }
}

pub struct PreviewTargets<'a> {
    preview: Preview<'a>,
    at: CursorPosition,
    produced: usize,
    done: bool,
}

impl Iterator for PreviewTargets<'_> {
    type Item = CursorPosition;

    fn next(&mut self) -> Option<CursorPosition> {
        let p = &self.preview;
        if self.done || self.produced >= p.limit.cap() {
            return None;
        }
        let next = match p.oracle.normal(p.buffer, self.at, Count::ONE, p.family) {
            Ok(next) => next,
            Err(err) => {
                debug!(target: "actions.preview", error = %err, "preview_oracle_failed");
                self.done = true;
                return None;
            }
        };
        let left_line = p.limit == PreviewLimit::CurrentLine && next.line != self.at.line;
        if next == self.at || left_line {
            self.done = true;
            return None;
        }
        self.at = next;
        self.produced += 1;
        Some(next)
    }
}
