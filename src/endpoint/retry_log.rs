//! Retries log: retry and skip events, mirrored from the `log` output into a
//! dedicated file so long runs can be audited afterwards.

use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::error::Result;

pub struct RetryLog {
    sink: Option<Mutex<Box<dyn Write + Send>>>,
}

impl RetryLog {
    /// Open the retries log; `-` writes to stderr. The file is appended to.
    pub fn open(target: &str) -> Result<Self> {
        let writer: Box<dyn Write + Send> = if target == "-" {
            Box::new(std::io::stderr())
        } else {
            Box::new(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(Path::new(target))?,
            )
        };
        Ok(Self {
            sink: Some(Mutex::new(writer)),
        })
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// A transient failure or a scheduled retry.
    pub fn retry(&self, message: &str) {
        log::warn!(target: "retry", "{}", message);
        self.write("RETRY", message);
    }

    /// A question given up on.
    pub fn skipped(&self, message: &str) {
        log::error!(target: "skipped", "{}", message);
        self.write("SKIPPED", message);
    }

    fn write(&self, level: &str, message: &str) {
        let Some(sink) = &self.sink else {
            return;
        };
        let line = format!("{} | {:<7} | {}\n", Utc::now().to_rfc3339(), level, message);
        // A poisoned lock only means an earlier write panicked; keep logging.
        let mut writer = sink.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writer.write_all(line.as_bytes()).and_then(|_| writer.flush()) {
            log::warn!("Failed to write retries log: {}", e);
        }
    }
}
