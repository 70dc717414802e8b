//! Output targets: a file path or `-` for stdout. Existing files are never
//! overwritten.

use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::{BenchError, Result};

pub const STDOUT: &str = "-";

/// Fail if `target` already exists. Call before doing any work.
pub fn check_output_free(target: &str) -> Result<()> {
    if target != STDOUT && Path::new(target).exists() {
        return Err(BenchError::OutputExists(target.to_string()));
    }
    Ok(())
}

pub fn describe(target: &str) -> &str {
    if target == STDOUT {
        "stdout"
    } else {
        target
    }
}

/// Write `value` as pretty JSON. Files are created exclusively.
pub fn write_json<T: Serialize + ?Sized>(target: &str, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    if target == STDOUT {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => BenchError::OutputExists(target.to_string()),
            _ => BenchError::Io(e),
        })?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
