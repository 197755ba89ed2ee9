//! `wordnav`: run a key script through the motion adapter against a file.
use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, ValueEnum};
use core_actions::oracle::NativeOracle;
use core_actions::replay;
use core_actions::{MotionAdapter, MotionFamily};
use core_config::load_from;
use core_events::hook_telemetry;
use core_model::{EditorHost, HeadlessEditor};
use core_state::{BufferId, Mode, VisualKind};
use core_text::{Buffer, BufferView, CursorPosition};
use crossterm::queue;
use crossterm::style::{Print, Stylize};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "wordnav.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StartMode {
    #[value(name = "n")]
    Normal,
    #[value(name = "v")]
    Char,
    #[value(name = "V")]
    Line,
    #[value(name = "b")]
    Block,
}

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "wordnav", version, about = "Replay word motions through the motion adapter")]
struct Args {
    /// File to load. Reads standard input when omitted.
    pub path: Option<PathBuf>,
    /// Key script, e.g. `2w d3e vge<Esc>`.
    #[arg(long, default_value = "")]
    pub keys: String,
    /// Starting cursor as LINE:COL (1-indexed line, 0-indexed byte column).
    #[arg(long, value_parser = parse_cursor, default_value = "1:0")]
    pub cursor: CursorPosition,
    /// Mode to start the script in.
    #[arg(long, value_enum, default_value = "n")]
    pub mode: StartMode,
    /// Configuration file (overrides discovery of `wordnav.toml`).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// After the script, preview the targets of this motion (`w`, `gE`, ...).
    #[arg(long)]
    pub preview: Option<String>,
    /// Check every normal-mode motion against the native engine.
    #[arg(long)]
    pub compare: bool,
}

fn parse_cursor(raw: &str) -> Result<CursorPosition, String> {
    let (line, col) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected LINE:COL, got `{raw}`"))?;
    let line: usize = line.trim().parse().map_err(|e| format!("line: {e}"))?;
    let col: usize = col.trim().parse().map_err(|e| format!("column: {e}"))?;
    if line == 0 {
        return Err("lines start at 1".to_string());
    }
    Ok(CursorPosition::new(line, col))
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn load_buffer(path: Option<&Path>) -> Result<Buffer> {
    let (name, content) = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                error!(target: "runtime", file = %path.display(), ?e, "file_open_error");
                anyhow!(e).context(format!("reading {}", path.display()))
            })?;
            let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("file");
            (name.to_string(), content)
        }
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("reading standard input")?;
            ("stdin".to_string(), content)
        }
    };
    // A final newline terminates the last line rather than opening a new one.
    let content = content.replace("\r\n", "\n");
    let content = content.strip_suffix('\n').unwrap_or(&content);
    debug!(target: "runtime", file = %name, size_bytes = content.len(), "buffer_loaded");
    Buffer::from_str(name, content)
}

fn prepare_editor(
    args: &Args,
    adapter: &mut MotionAdapter,
    tabstop: usize,
) -> Result<HeadlessEditor> {
    let mut buffer = load_buffer(args.path.as_deref())?;
    buffer.set_tabstop(tabstop);
    let mut editor = HeadlessEditor::new(BufferId(1), buffer);
    editor
        .set_cursor(args.cursor)
        .with_context(|| format!("cursor {}:{}", args.cursor.line, args.cursor.col))?;
    match args.mode {
        StartMode::Normal => {}
        StartMode::Char => editor.toggle_visual(VisualKind::Char),
        StartMode::Line => editor.toggle_visual(VisualKind::Line),
        StartMode::Block => editor.toggle_visual(VisualKind::Block),
    }
    adapter.pump(&mut editor);
    Ok(editor)
}

fn render_preview(
    out: &mut impl Write,
    editor: &HeadlessEditor,
    targets: &[CursorPosition],
) -> Result<()> {
    let cursor = editor.cursor();
    let mut lines: Vec<usize> = std::iter::once(cursor.line)
        .chain(targets.iter().map(|t| t.line))
        .collect();
    lines.sort_unstable();
    lines.dedup();
    for lnum in lines {
        let Some(text) = editor.buffer().line(lnum) else {
            continue;
        };
        queue!(out, Print(format!("{lnum:>4} ")))?;
        for (col, g) in core_text::grapheme::iter(&text).scan(0, |at, g| {
            let col = *at;
            *at += g.len();
            Some((col, g))
        }) {
            let here = CursorPosition::new(lnum, col);
            if here == cursor {
                queue!(out, Print(g.reverse()))?;
            } else if targets.contains(&here) {
                queue!(out, Print(g.black().on_yellow()))?;
            } else {
                queue!(out, Print(g))?;
            }
        }
        queue!(out, Print("\n"))?;
    }
    out.flush()?;
    Ok(())
}

fn print_state(out: &mut impl Write, editor: &HeadlessEditor) -> Result<()> {
    let cursor = editor.cursor();
    writeln!(out, "cursor {}:{}", cursor.line, cursor.col)?;
    writeln!(out, "mode {}", editor.mode())?;
    if let Mode::Visual(_) = editor.mode()
        && let Some((from, to)) = editor.selection()
    {
        writeln!(out, "selection {}:{}-{}:{}", from.line, from.col, to.line, to.col)?;
    }
    writeln!(out, "---")?;
    writeln!(out, "{}", editor.text())?;
    Ok(())
}

fn log_hook_telemetry() {
    let t = hook_telemetry();
    info!(
        target: "runtime",
        armed = t.armed,
        fired = t.fired,
        superseded = t.superseded,
        discarded = t.discarded,
        "hook_telemetry"
    );
}

fn run(args: Args) -> Result<()> {
    let config = load_from(args.config.clone())?;
    let mut adapter = MotionAdapter::from_config(&config)?;
    let mut editor = prepare_editor(&args, &mut adapter, config.tabstop())?;
    let mut out = io::stdout().lock();

    if args.compare {
        match replay::compare(&mut adapter, &mut editor, &args.keys, &NativeOracle::new())? {
            Some(d) => {
                info!(target: "runtime", index = d.index, step = %d.step, "divergence");
                writeln!(
                    out,
                    "divergence at step {} (`{}`) from {}:{}: expected {}:{}, got {}:{}",
                    d.index,
                    d.step,
                    d.from.line,
                    d.from.col,
                    d.expected.line,
                    d.expected.col,
                    d.actual.line,
                    d.actual.col
                )?;
            }
            None => writeln!(out, "no divergence")?,
        }
    } else {
        let steps = replay::run(&mut adapter, &mut editor, &args.keys)?;
        info!(target: "runtime", steps, "script_replayed");
    }

    if let Some(keys) = args.preview.as_deref() {
        let Some(family) = MotionFamily::from_keys(keys) else {
            bail!("unknown motion `{keys}` for --preview");
        };
        let targets = adapter.preview(&mut editor, family)?;
        render_preview(&mut out, &editor, &targets)?;
    }

    print_state(&mut out, &editor)
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");
    let args = Args::parse();
    let result = run(args);
    if let Err(e) = &result {
        error!(target: "runtime", error = %e, "run_failed");
    }
    log_hook_telemetry();
    info!(target: "runtime", "shutdown");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn cursor_argument_parses() {
        assert_eq!(parse_cursor("3:7"), Ok(CursorPosition::new(3, 7)));
        assert_eq!(parse_cursor(" 1 : 0"), Ok(CursorPosition::new(1, 0)));
        assert!(parse_cursor("0:1").is_err());
        assert!(parse_cursor("12").is_err());
        assert!(parse_cursor("a:b").is_err());
    }

    #[test]
    fn preview_marks_targets_and_cursor() {
        let mut editor = HeadlessEditor::from_lines(BufferId(1), &["ab cd"]).unwrap();
        editor.set_cursor(CursorPosition::new(1, 0)).unwrap();
        let mut out = Vec::new();
        render_preview(&mut out, &editor, &[CursorPosition::new(1, 3)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("   1 "));
        assert!(text.contains("b "));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn state_lists_cursor_mode_and_text() {
        let mut editor = HeadlessEditor::from_lines(BufferId(1), &["foo", "bar"]).unwrap();
        editor.set_cursor(CursorPosition::new(2, 1)).unwrap();
        let mut out = Vec::new();
        print_state(&mut out, &editor).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "cursor 2:1\nmode normal\n---\nfoo\nbar\n");
    }

    #[test]
    fn configured_tabstop_reaches_the_buffer() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "\tfoo bar\n").unwrap();
        let path = file.path().display().to_string();
        let args = Args::parse_from(["wordnav", path.as_str(), "--cursor", "1:1"]);
        let mut adapter = MotionAdapter::from_config(&core_config::Config::default()).unwrap();
        let editor = prepare_editor(&args, &mut adapter, 4).unwrap();
        assert_eq!(editor.raw_cursor(), core_model::RawCursor::new(1, 5));
    }

    #[derive(Clone, Default)]
    struct SharedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn shutdown_logs_hook_counters() {
        let log = SharedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, log_hook_telemetry);
        let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("runtime: hook_telemetry"));
        for field in ["armed=", "fired=", "superseded=", "discarded="] {
            assert!(text.contains(field), "missing {field} in {text}");
        }
    }
}
