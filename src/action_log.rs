// src/action_log.rs

//! Action log for filesystem mutations
//!
//! Every mutating primitive announces itself here *before* touching the
//! filesystem. The engine never depends on what a log does with the
//! announcement.
//!
//! Implementations:
//! - `SilentActionLog`: no-op, the default
//! - `TracingActionLog`: one `info!` per action under the `treepack::action` target
//! - `RecordingActionLog`: keeps the actions in memory, for inspection

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

/// A single filesystem mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Copy content and permission mode
    Copy { from: PathBuf, to: PathBuf },
    /// Create `link` pointing at `target`
    Symlink { link: PathBuf, target: String },
    Rename { from: PathBuf, to: PathBuf },
    Mkdir(PathBuf),
    Rmdir(PathBuf),
    Remove(PathBuf),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy { from, to } => write!(
                f,
                "copy (with mode) '{}' to '{}'",
                from.display(),
                to.display()
            ),
            Self::Symlink { link, target } => {
                write!(f, "symlink '{}' -> '{}'", link.display(), target)
            }
            Self::Rename { from, to } => {
                write!(f, "rename '{}' to '{}'", from.display(), to.display())
            }
            Self::Mkdir(path) => write!(f, "mkdir '{}'", path.display()),
            Self::Rmdir(path) => write!(f, "rmdir '{}'", path.display()),
            Self::Remove(path) => write!(f, "rm '{}'", path.display()),
        }
    }
}

/// Sink notified before each mutation
pub trait ActionLog: Send + Sync {
    fn record(&self, action: &Action);
}

/// No-op action log
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentActionLog;

impl ActionLog for SilentActionLog {
    fn record(&self, _action: &Action) {}
}

/// Tracing target of every action line
pub const ACTION_TARGET: &str = "treepack::action";

/// Action log that reports through tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingActionLog;

impl ActionLog for TracingActionLog {
    fn record(&self, action: &Action) {
        info!(target: ACTION_TARGET, "{}", action);
    }
}

/// Action log that keeps every action it sees
#[derive(Debug, Default)]
pub struct RecordingActionLog {
    actions: Mutex<Vec<Action>>,
}

impl RecordingActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the actions recorded so far, in order
    pub fn actions(&self) -> Vec<Action> {
        self.actions
            .lock()
            .map(|actions| actions.clone())
            .unwrap_or_default()
    }
}

impl ActionLog for RecordingActionLog {
    fn record(&self, action: &Action) {
        if let Ok(mut actions) = self.actions.lock() {
            actions.push(action.clone());
        }
    }
}

/// Pick the action log for a verbosity setting
pub fn for_verbosity(verbose: bool) -> Box<dyn ActionLog> {
    if verbose {
        Box::new(TracingActionLog)
    } else {
        Box::new(SilentActionLog)
    }
}
