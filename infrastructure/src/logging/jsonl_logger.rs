//! JSONL file writer for review transcripts.
//!
//! Each [`ConversationEvent`] is serialized as a single JSON line with a
//! `type` field and `timestamp`, appended to the file via a buffered writer.
//! [`JsonlTranscriptFactory`] opens one such file per review run.

use chrono::{DateTime, Local};
use crew_application::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, TranscriptFactory,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Transcript logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Create a new logger writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create transcript directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    "Could not create transcript file {}: {}",
                    path.display(),
                    e
                );
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Open a transcript for one review run:
    /// `<dir>/<source stem>_<YYYYmmdd_HHMMSS>_<run id>.transcript.jsonl`.
    pub fn for_run(
        dir: impl AsRef<Path>,
        source_name: &str,
        run_id: &str,
        at: DateTime<Local>,
    ) -> Option<Self> {
        let stem = Path::new(source_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "review".to_string());
        let file_name = format!(
            "{}_{}_{}.transcript.jsonl",
            stem,
            at.format("%Y%m%d_%H%M%S"),
            run_id
        );
        Self::new(dir.as_ref().join(file_name))
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        // Build the record: merge payload with type + timestamp
        let record = if let serde_json::Value::Object(mut map) = event.payload {
            map.insert(
                "type".to_string(),
                serde_json::Value::String(event.event_type.to_string()),
            );
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp),
            );
            serde_json::Value::Object(map)
        } else {
            serde_json::json!({
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
            // Flush every record so an interrupted run keeps its transcript
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

/// Opens a [`JsonlConversationLogger`] per run under one directory.
///
/// Falls back to a no-op logger when the file cannot be created.
pub struct JsonlTranscriptFactory {
    dir: PathBuf,
}

impl JsonlTranscriptFactory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TranscriptFactory for JsonlTranscriptFactory {
    fn open(&self, source_name: &str, run_id: &str) -> Arc<dyn ConversationLogger> {
        match JsonlConversationLogger::for_run(&self.dir, source_name, run_id, Local::now()) {
            Some(logger) => {
                info!("Transcript: {}", logger.path().display());
                Arc::new(logger)
            }
            None => Arc::new(NoConversationLogger),
        }
    }
}
