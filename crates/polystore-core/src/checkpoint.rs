//! Atomic, crash-safe checkpoint file for resumable long-running
//! operations (currently only [`crate::migration::migrate`]).
//!
//! Writes go to a sibling `.tmp` file, are `fsync`'d, and are then renamed
//! over the canonical path — the same temp-then-rename idiom a table-file
//! rewrite uses, here applied to a single small JSON record instead of a
//! whole table file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// The status of the step recorded in a [`Checkpoint`].
///
/// Serializes to the exact four lowercase, hyphenated strings the
/// external checkpoint-file contract specifies, not the Rust variant
/// names: `"in-progress"`, `"success"`, `"failed"`, `"cancelled"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointStatus {
    /// The step is in progress; resuming should redo or continue it.
    #[serde(rename = "in-progress")]
    InProgress,
    /// The step completed successfully.
    #[serde(rename = "success")]
    Complete,
    /// The step failed; `error_msg` carries the detail.
    #[serde(rename = "failed")]
    Failed,
    /// The step was cancelled via a caller-supplied cancellation token.
    #[serde(rename = "cancelled")]
    Cancelled,
}

/// A single resumable checkpoint record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// A caller-chosen name for the overall operation (e.g. a migration id).
    pub task: String,
    /// Which named step of the operation this checkpoint reflects (e.g.
    /// `"start"`, `"table"`, `"validate"`, `"done"`).
    pub step: String,
    /// The table currently being processed, if applicable.
    pub table: Option<String>,
    /// The column index currently being processed, if applicable.
    pub column_index: Option<usize>,
    /// The status of `step`.
    pub status: CheckpointStatus,
    /// Seconds since the Unix epoch when this checkpoint was written.
    pub timestamp: i64,
    /// The error detail if `status` is [`CheckpointStatus::Failed`].
    pub error_msg: Option<String>,
}

/// Serializes `checkpoint` to `path` atomically: write to `path.tmp`,
/// `fsync`, then rename over `path`. A reader can never observe a
/// partially written checkpoint file, even across a crash between the
/// write and the rename.
///
/// # Errors
///
/// Returns [`crate::error::Error::Io`] if any filesystem operation fails.
pub async fn write(checkpoint: &Checkpoint, path: &Path) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let json = serde_json::to_vec_pretty(checkpoint)?;
    let mut temp_file = fs::File::create(&temp_path).await?;
    temp_file.write_all(&json).await?;
    temp_file.flush().await?;
    temp_file.sync_all().await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Reads the checkpoint at `path`, if one exists.
///
/// Returns `Ok(None)` if `path` does not exist — the absence of a
/// checkpoint is not itself an error, it just means there is nothing to
/// resume.
///
/// # Errors
///
/// Returns [`crate::error::Error::Integrity`] if the file exists but does
/// not parse as a [`Checkpoint`], or [`crate::error::Error::Io`] if reading
/// it fails for any other reason.
pub async fn read(path: &Path) -> Result<Option<Checkpoint>> {
    match fs::read(path).await {
        Ok(bytes) => {
            let checkpoint: Checkpoint = serde_json::from_slice(&bytes)?;
            Ok(Some(checkpoint))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Removes the checkpoint at `path`, if it exists. A missing file is not
/// an error.
///
/// # Errors
///
/// Returns [`crate::error::Error::Io`] if removing an existing file fails.
pub async fn clear(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Checkpoint {
        Checkpoint {
            task: "migrate-orders".into(),
            step: "table".into(),
            table: Some("orders".into()),
            column_index: Some(3),
            status: CheckpointStatus::InProgress,
            timestamp: 1_700_000_000,
            error_msg: None,
        }
    }

    #[test]
    fn status_serializes_to_the_spec_exact_strings() {
        assert_eq!(serde_json::to_string(&CheckpointStatus::InProgress).unwrap(), "\"in-progress\"");
        assert_eq!(serde_json::to_string(&CheckpointStatus::Complete).unwrap(), "\"success\"");
        assert_eq!(serde_json::to_string(&CheckpointStatus::Failed).unwrap(), "\"failed\"");
        assert_eq!(serde_json::to_string(&CheckpointStatus::Cancelled).unwrap(), "\"cancelled\"");
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("checkpoint.json");

        write(&sample(), &path).await.expect("write");
        let loaded = read(&path).await.expect("read").expect("present");

        assert_eq!(loaded.task, "migrate-orders");
        assert_eq!(loaded.step, "table");
        assert_eq!(loaded.column_index, Some(3));
        assert_eq!(loaded.status, CheckpointStatus::InProgress);
    }

    #[tokio::test]
    async fn read_missing_file_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nonexistent.json");
        assert!(read(&path).await.expect("read").is_none());
    }

    #[tokio::test]
    async fn no_tmp_file_survives_a_successful_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("checkpoint.json");
        write(&sample(), &path).await.expect("write");
        assert!(!path.with_extension("tmp").exists());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn clear_removes_an_existing_checkpoint() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("checkpoint.json");
        write(&sample(), &path).await.expect("write");
        clear(&path).await.expect("clear");
        assert!(read(&path).await.expect("read").is_none());
    }

    #[tokio::test]
    async fn clear_on_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nonexistent.json");
        clear(&path).await.expect("clear should be a no-op");
    }

    proptest::proptest! {
        /// `∀ checkpoint cp: read(write(cp)) ≅ cp up to string allocation` —
        /// any task/step/table name and timestamp round-trips byte-for-byte
        /// through a write-then-read cycle.
        #[test]
        fn write_then_read_round_trips_arbitrary_checkpoints(
            task in "[a-z-]{1,16}",
            step in "[a-z-]{1,16}",
            has_table in proptest::bool::ANY,
            column_index in proptest::option::of(0usize..10_000),
            timestamp in 0i64..2_000_000_000_000,
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("checkpoint.json");
            let checkpoint = Checkpoint {
                task: task.clone(),
                step: step.clone(),
                table: has_table.then(|| "orders".to_string()),
                column_index,
                status: CheckpointStatus::InProgress,
                timestamp,
                error_msg: None,
            };
            runtime.block_on(write(&checkpoint, &path)).unwrap();
            let loaded = runtime.block_on(read(&path)).unwrap().unwrap();
            proptest::prop_assert_eq!(loaded.task, task);
            proptest::prop_assert_eq!(loaded.step, step);
            proptest::prop_assert_eq!(loaded.table, checkpoint.table);
            proptest::prop_assert_eq!(loaded.column_index, column_index);
            proptest::prop_assert_eq!(loaded.timestamp, timestamp);
        }
    }
}
