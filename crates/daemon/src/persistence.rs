// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Restore file and history log (§4.10). Both are best-effort: I/O errors
//! are logged and never surfaced to the caller.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One `(partitionID, sessionID)` pair listed in the restore file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestorePartition {
    pub partition: String,
    pub session: String,
}

/// The restore file's JSON schema: `{"sessions": [{"partition", "session"}]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestoreData {
    pub sessions: Vec<RestorePartition>,
}

fn restore_path(restore_dir: &Path, id: &str) -> PathBuf {
    restore_dir.join(format!("odc_{id}.json"))
}

/// Reads the restore file for `id`, logging and returning an empty
/// [`RestoreData`] on any I/O or parse error (§4.10).
pub fn read_restore(restore_dir: &Path, id: &str) -> RestoreData {
    let path = restore_path(restore_dir, id);
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::error!(path = %path.display(), error = %e, "failed to parse restore file");
            RestoreData::default()
        }),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read restore file");
            RestoreData::default()
        }
    }
}

/// Writes `data` into the restore file for `id` by writing a temp file in
/// the same directory and renaming it into place, so readers never see a
/// partial write (§4.10 "written by swap-and-rename").
pub fn write_restore(restore_dir: &Path, id: &str, data: &RestoreData) {
    if let Err(e) = write_restore_inner(restore_dir, id, data) {
        tracing::error!(restore_dir = %restore_dir.display(), id, error = %e, "failed to write restore file");
    }
}

fn write_restore_inner(restore_dir: &Path, id: &str, data: &RestoreData) -> std::io::Result<()> {
    std::fs::create_dir_all(restore_dir)?;
    let final_path = restore_path(restore_dir, id);
    let tmp_path = restore_dir.join(format!("odc_{id}.json.tmp"));
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, &final_path)?;
    Ok(())
}

/// Appends one `<timestamp> <partitionID> <sessionID>` line to the history
/// log, best-effort (§4.10, §4.9 "Append a history line...").
pub fn append_history(history_dir: &Path, partition_id: &str, session_id: &str) {
    if let Err(e) = append_history_inner(history_dir, partition_id, session_id) {
        tracing::error!(history_dir = %history_dir.display(), error = %e, "failed to append history");
    }
}

fn append_history_inner(history_dir: &Path, partition_id: &str, session_id: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(history_dir)?;
    let path = history_dir.join("odc_history.log");
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    let timestamp = chrono::Utc::now().to_rfc3339();
    writeln!(file, "{timestamp} {partition_id} {session_id}")?;
    Ok(())
}

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
