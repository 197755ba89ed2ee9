#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use core_actions::{MotionAdapter, OracleHandle, NativeOracle};
use core_config::PreviewLimit;
use core_model::{EditorHost, EventSource, HeadlessEditor};
use core_state::BufferId;
use core_text::CursorPosition;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

pub fn pos(line: usize, col: usize) -> CursorPosition {
    CursorPosition::new(line, col)
}

/// Editor on buffer 1 with the cursor at `at` and an empty event queue.
pub fn editor_at(lines: &[&str], at: CursorPosition) -> HeadlessEditor {
    editor_in(BufferId(1), lines, at)
}

pub fn editor_in(id: BufferId, lines: &[&str], at: CursorPosition) -> HeadlessEditor {
    let mut ed = HeadlessEditor::from_lines(id, lines).unwrap();
    ed.set_cursor(at).unwrap();
    ed.discard_events();
    ed
}

pub fn adapter() -> MotionAdapter {
    adapter_with_limit(PreviewLimit::CurrentLine)
}

pub fn adapter_with_limit(limit: PreviewLimit) -> MotionAdapter {
    MotionAdapter::new(OracleHandle::ready(NativeOracle::new()), limit)
}

/// Events still queued on the host, without delivering them.
pub fn queued(ed: &mut HeadlessEditor) -> usize {
    let mut n = 0;
    while ed.next_event().is_some() {
        n += 1;
    }
    n
}

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Write for LockedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

/// Run `f` under a subscriber that records everything at `level` and above.
pub fn capture<T>(level: Level, f: impl FnOnce() -> T) -> (T, String) {
    let inner = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(BufferWriter {
            inner: inner.clone(),
        })
        .finish();
    let out = with_default(subscriber, f);
    let log = String::from_utf8(inner.lock().unwrap().clone()).unwrap();
    (out, log)
}
