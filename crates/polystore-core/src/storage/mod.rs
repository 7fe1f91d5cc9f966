//! The storage-engine abstraction and its concrete backends.
//!
//! `StorageEngine` is the crate's one polymorphic seam: callers program
//! against the trait, never against a concrete backend, and swap backends
//! through [`crate::migration::migrate`] without touching operator code.
//! The trait's shape — async `save`/`load`/`query` plus sync
//! `capabilities`/`metrics` and an async, consuming `deinit` — is an
//! `async_trait` over pluggable backends, the same pattern a blob-storage
//! abstraction takes when it needs to swap a local disk backend for a
//! cloud object store without touching callers.
//!
//! ```ignore
//! use polystore_core::storage::{memory::MemoryStore, StorageEngine};
//!
//! # async fn example() -> polystore_core::error::Result<()> {
//! let mut store = MemoryStore::new();
//! let key = store.save(b"hello").await?;
//! assert_eq!(store.load(&key).await?, b"hello");
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod column;
pub mod graph;
pub mod memory;
pub mod row;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value::Value;

/// An opaque, backend-assigned identifier for a saved blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageKey(pub u64);

/// The kind of backend a [`StorageEngine`] implements; used by the
/// migration engine and the storage selector to name a target without
/// depending on a concrete backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// [`memory::MemoryStore`].
    Memory,
    /// [`column::ColumnStore`].
    Column,
    /// [`row::RowStore`].
    Row,
    /// [`graph::GraphStore`].
    Graph,
    /// [`audit::AuditStore`].
    Audit,
}

/// The access patterns a backend is suited for. A backend may claim more
/// than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Suited for analytical (scan-heavy, aggregate-heavy) workloads.
    pub olap: bool,
    /// Suited for transactional (point-lookup-heavy) workloads.
    pub oltp: bool,
    /// Suited for traversal/pattern-matching workloads.
    pub graph: bool,
    /// Provides a tamper-evident append-only history.
    pub blockchain: bool,
}

/// Point-in-time performance metrics a backend reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineMetrics {
    /// Average read latency, in milliseconds.
    pub read_latency_ms: f64,
    /// Average write latency, in milliseconds.
    pub write_latency_ms: f64,
    /// Ratio of encoded size to raw size (`1.0` means no compression).
    pub compression_ratio: f64,
    /// Sustained throughput, in megabytes per second.
    pub throughput_mbps: f64,
}

/// The six-operation interface every storage backend implements.
///
/// `deinit` consumes `Box<Self>` rather than taking `&mut self`: this is
/// the idiomatic Rust reading of "run a deterministic release routine on
/// every exit path" — ownership, not a runtime flag, is what guarantees it
/// runs exactly once and that no further call can reach a released
/// backend.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    /// Persists `bytes` and returns a key that can later retrieve them.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot accept the write (e.g. an
    /// I/O failure for a file-backed backend).
    async fn save(&mut self, bytes: &[u8]) -> Result<StorageKey>;

    /// Retrieves the bytes previously stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::NotFound`] if `key` is unknown to
    /// this backend.
    async fn load(&self, key: &StorageKey) -> Result<Vec<u8>>;

    /// Runs a query against this backend and returns its result rows.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::NotImplemented`] or
    /// [`crate::error::Error::InvalidInput`] for queries this backend does
    /// not support.
    async fn query(&self, query: &str) -> Result<Vec<Value>>;

    /// The access patterns this backend is suited for.
    fn capabilities(&self) -> Capabilities;

    /// This backend's current performance metrics.
    fn metrics(&self) -> EngineMetrics;

    /// Deterministically releases this backend's resources. Runs exactly
    /// once, on every exit path, because it consumes `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing resources fails (e.g. flushing
    /// buffered writes).
    async fn deinit(self: Box<Self>) -> Result<()>;
}
