use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const LOG_FILE_RELATIVE_PATH: &str = "logs/inviteflow.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

pub fn event_log_path(state_root: &Path) -> PathBuf {
    state_root.join(LOG_FILE_RELATIVE_PATH)
}

/// Appends one JSON line to the event log under `state_root`.
///
/// Logging never fails the caller; encode and write errors are dropped.
pub fn append_event_log(state_root: &Path, level: LogLevel, event: &str, message: &str) {
    let payload = serde_json::json!({
        "timestamp": chrono::Utc::now().timestamp(),
        "level": level.as_str(),
        "event": event,
        "message": message,
    });

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    let path = event_log_path(state_root);
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}

/// Cloneable handle that components hold instead of a raw state root.
///
/// A disabled logger drops every event, which keeps library callers and unit
/// tests free of filesystem side effects.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    state_root: Option<PathBuf>,
}

impl EventLog {
    pub fn new(state_root: impl Into<PathBuf>) -> Self {
        Self {
            state_root: Some(state_root.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { state_root: None }
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.state_root.as_deref().map(event_log_path)
    }

    pub fn record(&self, level: LogLevel, event: &str, message: &str) {
        if let Some(root) = &self.state_root {
            append_event_log(root, level, event, message);
        }
    }

    pub fn info(&self, event: &str, message: &str) {
        self.record(LogLevel::Info, event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.record(LogLevel::Warn, event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.record(LogLevel::Error, event, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn append_event_log_writes_json_lines() {
        let dir = tempdir().expect("tempdir");
        append_event_log(dir.path(), LogLevel::Info, "invite.sent", "member 7");
        append_event_log(dir.path(), LogLevel::Warn, "search.lookup_failed", "timeout");

        let raw = fs::read_to_string(event_log_path(dir.path())).expect("read log");
        let lines: Vec<serde_json::Value> = raw
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "invite.sent");
        assert_eq!(lines[1]["level"], "warn");
        assert_eq!(lines[1]["message"], "timeout");
    }

    #[test]
    fn disabled_event_log_has_no_path() {
        let log = EventLog::disabled();
        assert!(log.path().is_none());
        log.info("noop", "dropped");
    }
}
