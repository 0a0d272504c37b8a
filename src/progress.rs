//! Progress reporting and diagnostics.
//!
//! Ingestion, search, and statistics all report observable progress
//! (percentage of items completed) through an injected reporter so the
//! pipeline itself stays free of terminal concerns. Progress is emitted on
//! **stderr** so stdout remains parseable for scripts. Progress is an
//! observational side effect only: it never affects ordering or results.
//!
//! [`Diagnostics`] is the injected logging sink: components receive it at
//! construction instead of consulting global logger state.

use std::io::Write;

/// A single progress event.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// The data root is being enumerated (total not yet known).
    Enumerating { root: String },
    /// `done` items finished out of `total` for the named phase
    /// ("parsing", "searching", "stats").
    Completed {
        phase: &'static str,
        done: u64,
        total: u64,
    },
}

/// Reports progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress: "parsing  42% (128 / 300 files)".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Enumerating { root } => {
                format!("enumerating {}...\n", root)
            }
            ProgressEvent::Completed { phase, done, total } => {
                let pct = if *total > 0 { done * 100 / total } else { 100 };
                format!("{}  {}% ({} / {})\n", phase, pct, done, total)
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Enumerating { root } => serde_json::json!({
                "event": "progress",
                "phase": "enumerating",
                "root": root
            }),
            ProgressEvent::Completed { phase, done, total } => serde_json::json!({
                "event": "progress",
                "phase": phase,
                "done": done,
                "total": total
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

/// Injected diagnostics sink: debug lines appear only in verbose mode,
/// warnings always.
#[derive(Clone, Copy, Debug, Default)]
pub struct Diagnostics {
    pub verbose: bool,
}

impl Diagnostics {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Diagnostic-level message; never interrupts the run.
    pub fn debug(&self, msg: impl AsRef<str>) {
        if self.verbose {
            eprintln!("debug: {}", msg.as_ref());
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        eprintln!("warning: {}", msg.as_ref());
    }
}
