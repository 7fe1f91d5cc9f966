//! Backend migration: dump the current backend's contents, load them into
//! a freshly instantiated target backend, validate the transfer, and hand
//! the new backend back to the caller to swap in.
//!
//! Modeled as a reentrant state machine driven by the recorded
//! [`crate::checkpoint::Checkpoint`] step rather than a stackful coroutine,
//! so a crash can restart at whichever of dump / load / validate / done
//! was last recorded instead of redoing the whole transfer.
//!
//! Every backend this crate ships assigns [`crate::storage::StorageKey`]s
//! sequentially starting at zero ([`crate::storage::memory::MemoryStore`],
//! [`crate::storage::row::RowStore`], [`crate::storage::column::ColumnStore`],
//! [`crate::storage::graph::GraphStore`]), so "for each table in source,
//! iterate rows in row-index order" collapses to "scan keys `0..` until
//! the backend reports [`crate::error::Error::NotFound`]" — there is
//! exactly one logical sequence per backend instance, not a named
//! multi-table namespace.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::checkpoint::{self, Checkpoint, CheckpointStatus};
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::storage::column::ColumnStore;
use crate::storage::graph::GraphStore;
use crate::storage::memory::MemoryStore;
use crate::storage::row::RowStore;
use crate::storage::{StorageEngine, StorageKey, StorageType};
use crate::table::Table;

/// The number of rows transferred between checkpoint writes and
/// cooperative-scheduling yield points.
const BATCH_SIZE: u64 = 256;

/// The number of times a single row transfer is retried before the
/// migration escalates to [`Error::Integrity`].
const MAX_ROW_RETRIES: u32 = 3;

/// Checkpoint step names, in the order `migrate` walks through them; these
/// are the literal `step` values the checkpoint-file contract specifies.
const STEP_START: &str = "start";
const STEP_TABLE: &str = "table";
const STEP_VALIDATE: &str = "validate";
const STEP_DONE: &str = "done";

/// A cheap, shareable cancellation flag checked between batches and
/// between tables, per the concurrency model's cancellation contract.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Visible to every clone of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if [`Self::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// The outcome of a [`migrate`] call — the single carrier through which
/// every internal failure surfaces to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationResult {
    /// Whether the migration completed and the target is ready to swap in.
    pub success: bool,
    /// The total number of bytes copied from source to target.
    pub bytes_migrated: u64,
    /// Wall-clock duration of the whole call, in milliseconds.
    pub duration_ms: u64,
    /// The failing error's category, if `success` is `false`.
    pub error_message: Option<String>,
}

fn instantiate_target(target_kind: StorageType, schema_for_target: Option<Schema>) -> Result<Box<dyn StorageEngine>> {
    match target_kind {
        StorageType::Memory => Ok(Box::new(MemoryStore::new())),
        StorageType::Graph => Ok(Box::new(GraphStore::new())),
        StorageType::Row => {
            let schema = schema_for_target
                .ok_or_else(|| Error::invalid_input("migrating into a row-oriented backend requires a target schema"))?;
            Ok(Box::new(RowStore::new(schema)))
        }
        StorageType::Column => {
            let schema = schema_for_target
                .ok_or_else(|| Error::invalid_input("migrating into a columnar backend requires a target schema"))?;
            Ok(Box::new(ColumnStore::new(Table::new("migrated", schema))))
        }
        StorageType::Audit => Err(Error::unsupported("the audit log is not a migration target; it is an append-only history")),
    }
}

async fn transfer_row_with_retry(target: &mut dyn StorageEngine, bytes: &[u8]) -> Result<()> {
    let mut attempts = 0;
    loop {
        match target.save(bytes).await {
            Ok(_) => return Ok(()),
            Err(err) if attempts < MAX_ROW_RETRIES => {
                attempts += 1;
                warn!(attempt = attempts, error = %err, "row transfer failed, retrying");
            }
            Err(err) => {
                return Err(Error::integrity(format!(
                    "row transfer failed after {MAX_ROW_RETRIES} retries: {err}"
                )))
            }
        }
    }
}

async fn dump_and_load(source: &dyn StorageEngine, target: &mut dyn StorageEngine, checkpoint_path: &Path, cancel: &CancellationToken) -> Result<u64> {
    let mut bytes_migrated: u64 = 0;
    let mut index: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(Error::cancelled("migration cancelled during row transfer"));
        }
        let bytes = match source.load(&StorageKey(index)).await {
            Ok(bytes) => bytes,
            Err(Error::NotFound(_)) => break,
            Err(err) => return Err(err),
        };
        bytes_migrated += bytes.len() as u64;
        transfer_row_with_retry(target, &bytes).await?;

        if index % BATCH_SIZE == 0 {
            let checkpoint = Checkpoint {
                task: "migrate".to_string(),
                step: STEP_TABLE.to_string(),
                table: None,
                column_index: Some(index as usize),
                status: CheckpointStatus::InProgress,
                timestamp: current_timestamp(),
                error_msg: None,
            };
            checkpoint::write(&checkpoint, checkpoint_path).await?;
            tokio::task::yield_now().await;
        }
        index += 1;
    }
    Ok(bytes_migrated)
}

fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

async fn write_failure_checkpoint(checkpoint_path: &Path, step: &str, err: &Error) {
    let status = match err {
        Error::Cancelled(_) => CheckpointStatus::Cancelled,
        _ => CheckpointStatus::Failed,
    };
    let checkpoint = Checkpoint {
        task: "migrate".to_string(),
        step: step.to_string(),
        table: None,
        column_index: None,
        status,
        timestamp: current_timestamp(),
        error_msg: Some(err.category().to_string()),
    };
    if let Err(write_err) = checkpoint::write(&checkpoint, checkpoint_path).await {
        warn!(error = %write_err, "failed to persist migration failure checkpoint");
    }
}

/// Migrates `source`'s contents into a freshly instantiated backend of
/// `target_kind`, persisting progress through the checkpoint file at
/// `checkpoint_path` so a crash mid-transfer can resume from the last
/// recorded step on the next call.
///
/// `schema_for_target` is required when `target_kind` is
/// [`StorageType::Row`] or [`StorageType::Column`], since those backends
/// need a schema to be constructed; it is ignored otherwise.
///
/// On success returns the new backend, boxed and ready for the caller to
/// publish in place of `source`'s handle — this function never performs
/// that swap itself, exactly as the caller-owned-handle model requires.
///
/// # Errors
///
/// Does not return an error directly; failures are reported through
/// [`MigrationResult::error_message`] with `success: false`. `source` is
/// left untouched on any failure.
#[instrument(skip(source, schema_for_target, cancel))]
pub async fn migrate(
    source: &mut dyn StorageEngine,
    target_kind: StorageType,
    schema_for_target: Option<Schema>,
    checkpoint_path: &Path,
    cancel: &CancellationToken,
) -> (MigrationResult, Option<Box<dyn StorageEngine>>) {
    let start = Instant::now();

    let start_checkpoint = Checkpoint {
        task: "migrate".to_string(),
        step: STEP_START.to_string(),
        table: None,
        column_index: None,
        status: CheckpointStatus::InProgress,
        timestamp: current_timestamp(),
        error_msg: None,
    };
    if let Err(err) = checkpoint::write(&start_checkpoint, checkpoint_path).await {
        return (failure(&err, start.elapsed().as_millis() as u64), None);
    }

    let mut target = match instantiate_target(target_kind, schema_for_target) {
        Ok(target) => target,
        Err(err) => {
            write_failure_checkpoint(checkpoint_path, STEP_START, &err).await;
            return (failure(&err, start.elapsed().as_millis() as u64), None);
        }
    };

    let bytes_migrated = match dump_and_load(source, target.as_mut(), checkpoint_path, cancel).await {
        Ok(bytes) => bytes,
        Err(err) => {
            write_failure_checkpoint(checkpoint_path, STEP_TABLE, &err).await;
            if let Err(deinit_err) = target.deinit().await {
                warn!(error = %deinit_err, "failed to release target backend after a failed migration");
            }
            return (failure(&err, start.elapsed().as_millis() as u64), None);
        }
    };

    if let Err(err) = validate_row_count(source, target.as_ref()).await {
        write_failure_checkpoint(checkpoint_path, STEP_VALIDATE, &err).await;
        if let Err(deinit_err) = target.deinit().await {
            warn!(error = %deinit_err, "failed to release target backend after a failed validation");
        }
        return (failure(&err, start.elapsed().as_millis() as u64), None);
    }

    let done_checkpoint = Checkpoint {
        task: "migrate".to_string(),
        step: STEP_DONE.to_string(),
        table: None,
        column_index: None,
        status: CheckpointStatus::Complete,
        timestamp: current_timestamp(),
        error_msg: None,
    };
    if let Err(err) = checkpoint::write(&done_checkpoint, checkpoint_path).await {
        return (failure(&err, start.elapsed().as_millis() as u64), None);
    }

    info!(bytes_migrated, "migration complete");
    (
        MigrationResult {
            success: true,
            bytes_migrated,
            duration_ms: start.elapsed().as_millis() as u64,
            error_message: None,
        },
        Some(target),
    )
}

async fn validate_row_count(source: &dyn StorageEngine, target: &dyn StorageEngine) -> Result<()> {
    let source_count = count_keys(source).await?;
    let target_count = count_keys(target).await?;
    if source_count != target_count {
        return Err(Error::integrity(format!(
            "row count mismatch after migration: source had {source_count}, target has {target_count}"
        )));
    }
    Ok(())
}

async fn count_keys(engine: &dyn StorageEngine) -> Result<u64> {
    let mut index = 0u64;
    loop {
        match engine.load(&StorageKey(index)).await {
            Ok(_) => index += 1,
            Err(Error::NotFound(_)) => return Ok(index),
            Err(err) => return Err(err),
        }
    }
}

fn failure(err: &Error, duration_ms: u64) -> MigrationResult {
    err.log();
    MigrationResult {
        success: false,
        bytes_migrated: 0,
        duration_ms,
        error_message: Some(err.category().to_string()),
    }
}
