//! # polystore-core
//!
//! The core of a small, embedded, columnar analytical database with a
//! hybrid storage architecture: a single row lands in whichever backend
//! best suits the workload currently observed against it — an in-memory
//! blob store, a row-oriented OLTP store, a column-oriented OLAP store,
//! or a graph store — and a workload analyzer plus storage selector
//! decide, with a migration engine to move data between backends without
//! downtime.
//!
//! Every backend implements the same [`storage::StorageEngine`] trait, so
//! callers and the migration engine program against one interface
//! regardless of which backend currently holds a table. A hash-chained
//! audit log ([`audit`]) gives the system a tamper-evident history
//! independent of any one backend.

pub mod audit;
pub mod checkpoint;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod graph;
pub mod migration;
pub mod schema;
pub mod selector;
pub mod sort;
pub mod storage;
pub mod table;
pub mod value;
pub mod workload;

pub use audit::{AuditBlock, AuditChain};
pub use checkpoint::{Checkpoint, CheckpointStatus};
pub use config::{CompressionKind, Config, LoadOptions, SaveOptions};
pub use error::{Error, Result};
pub use graph::{Edge, EdgeDirection, EdgePattern, GraphNode, Match, NodeId, Pattern};
pub use migration::{migrate, CancellationToken, MigrationResult};
pub use schema::{ColumnDef, Schema};
pub use selector::{recommend, StorageRecommendation};
pub use sort::{sort_table, OrderBy, SortDirection};
pub use storage::audit::AuditStore;
pub use storage::{Capabilities, EngineMetrics, StorageEngine, StorageKey, StorageType};
pub use table::{Column, Table};
pub use value::{DataType, Value};
pub use workload::{QueryKind, QueryPattern, WorkloadAnalyzer, WorkloadProfile};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    /// A thin end-to-end smoke test: a workload observation feeds the
    /// selector, whose recommendation feeds a migration, all without any
    /// module needing to know about the others' internals beyond the
    /// public types re-exported here.
    #[tokio::test]
    async fn workload_selector_and_migration_compose_end_to_end() {
        let mut analyzer = WorkloadAnalyzer::new(60_000);
        for _ in 0..10 {
            analyzer.record_query("SELECT COUNT(*) FROM events", 2, 100);
        }
        let profile = analyzer.generate_workload_profile();
        let recommendation = recommend(&profile);
        assert_eq!(recommendation.target, StorageType::Column);

        let dir = tempfile::tempdir().unwrap();
        let checkpoint_path = dir.path().join("migration.checkpoint.json");
        let mut source = MemoryStore::new();
        source.save(b"row-one").await.unwrap();

        let cancel = CancellationToken::new();
        let (result, target) = migrate(&mut source, StorageType::Memory, None, &checkpoint_path, &cancel).await;
        assert!(result.success);
        assert!(target.is_some());
    }
}
