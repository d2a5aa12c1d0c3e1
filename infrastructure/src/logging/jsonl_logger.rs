//! JSONL file writer for interaction events.
//!
//! Each [`InteractionEvent`] becomes one JSON line with `event` and `ts`
//! fields merged into its payload. The writer is buffered and flushed after
//! every record — the log is the audit trail of what each model was asked
//! and answered, so a crash must not lose the tail.

use conclave_application::{InteractionEvent, InteractionLogger};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// JSONL interaction logger that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`.
pub struct JsonlInteractionLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlInteractionLogger {
    /// Open (or create) the log file in append mode, creating parent
    /// directories as needed.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record_for(event: InteractionEvent) -> serde_json::Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        match event.payload {
            serde_json::Value::Object(mut fields) => {
                fields.insert("event".to_string(), event.event_type.into());
                fields.insert("ts".to_string(), timestamp.into());
                serde_json::Value::Object(fields)
            }
            other => serde_json::json!({
                "event": event.event_type,
                "ts": timestamp,
                "data": other,
            }),
        }
    }
}

impl InteractionLogger for JsonlInteractionLogger {
    fn log(&self, event: InteractionEvent) {
        let record = Self::record_for(event);
        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}
