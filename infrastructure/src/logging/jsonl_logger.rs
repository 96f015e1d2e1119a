//! JSONL file writer for run events.
//!
//! Each [`RunEvent`] is serialized as a single JSON line with a `type`
//! field and `timestamp`, appended to the file via a buffered writer.

use chrono::{SecondsFormat, Utc};
use crew_application::{RunEvent, RunEventLogger};
use serde_json::{Value, json};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL run event logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlRunEventLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlRunEventLogger {
    /// Create a logger appending to `path`.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create run log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open run log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Logger for one run under `dir`, named after the subject and start time.
    pub fn for_run(dir: impl AsRef<Path>, subject_id: Option<&str>) -> Option<Self> {
        Self::new(dir.as_ref().join(run_log_file_name(subject_id)))
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn run_log_file_name(subject_id: Option<&str>) -> String {
    let subject: String = subject_id
        .unwrap_or("anonymous")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}-{}.run.jsonl", subject, Utc::now().format("%Y%m%dT%H%M%S%3f"))
}

impl RunEventLogger for JsonlRunEventLogger {
    fn log(&self, event: RunEvent) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        // Merge payload with type + timestamp
        let record = if let Value::Object(mut map) = event.payload {
            map.insert("type".to_string(), Value::String(event.event_type.to_string()));
            map.insert("timestamp".to_string(), Value::String(timestamp));
            Value::Object(map)
        } else {
            json!({
                "type": event.event_type,
                "timestamp": timestamp,
                "data": event.payload,
            })
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlRunEventLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let logger = JsonlRunEventLogger::new(&path).unwrap();

        logger.log(RunEvent::new(
            "tool_call",
            json!({ "tool": "analyze_radiology", "attempts": 2, "success": true }),
        ));
        logger.log(RunEvent::new(
            "worker_result",
            json!({ "worker": "records", "success": false }),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(line.get("type").is_some());
            let ts = line["timestamp"].as_str().unwrap();
            assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        }
        assert_eq!(lines[0]["type"], "tool_call");
        assert_eq!(lines[0]["attempts"], 2);
        assert_eq!(lines[1]["worker"], "records");
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let logger = JsonlRunEventLogger::new(&path).unwrap();

        logger.log(RunEvent::new("phase", json!("collecting")));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "phase");
        assert_eq!(lines[0]["data"], "collecting");
    }

    #[test]
    fn test_appends_across_loggers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("run.jsonl");

        for _ in 0..2 {
            let logger = JsonlRunEventLogger::new(&path).unwrap();
            logger.log(RunEvent::new("bootstrap", json!({})));
        }

        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_for_run_sanitizes_subject() {
        let dir = tempfile::tempdir().unwrap();
        let logger = JsonlRunEventLogger::for_run(dir.path(), Some("pt/42")).unwrap();

        let name = logger.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("pt_42-"));
        assert!(name.ends_with(".run.jsonl"));
    }
}
