//! # Concurrency Model
//!
//! `polystore-core` is built around **single-threaded cooperative
//! scheduling**: a single logical task drives every operator, and control
//! only yields to the scheduler at a handful of well-defined suspension
//! points. There is no internal lock hierarchy to document the way a
//! multi-writer engine would need, because no component other than the
//! (external, out-of-scope) type registry claims to be safe for concurrent
//! mutation from more than one caller at a time.
//!
//! ## Suspension points
//!
//! Control only ever yields mid-operation in three places:
//!
//! 1. [`crate::checkpoint`] and [`crate::audit`] file I/O — both go through
//!    `tokio::fs`, so writing or reading a checkpoint/audit segment is the
//!    only place a `save`/`load` call on a [`crate::storage::StorageEngine`]
//!    genuinely suspends.
//! 2. [`crate::migration::migrate`]'s per-batch yield
//!    between tables and between row batches within a table, so a caller
//!    holding a [`crate::migration::CancellationToken`] gets a chance to
//!    observe cancellation without waiting for the whole migration.
//! 3. [`crate::audit::AuditChain::add_block`]'s per-nonce yield during
//!    proof-of-work mining, so a high `difficulty` cannot starve the
//!    runtime while it searches for a valid nonce.
//!
//! Everything else — sorting a table, matching a graph pattern, recording
//! a query into the workload analyzer, selecting a storage recommendation —
//! runs to completion without an `.await` in the middle.
//!
//! ## What callers must still serialize themselves
//!
//! - [`crate::workload::WorkloadAnalyzer::record_query`] guarantees query
//!   patterns are appended in call order *within a single caller*; it makes
//!   no promise about interleaving across callers sharing one analyzer.
//! - [`crate::audit::AuditChain::add_block`] is not internally
//!   synchronized: two concurrent callers racing to mine a block onto the
//!   same chain will corrupt the chain's `previous_hash` linkage. Wrap an
//!   [`crate::audit::AuditChain`] in a `tokio::sync::Mutex` if more than
//!   one task can append to it.
//! - [`crate::storage::memory::MemoryStore`] and the other
//!   [`crate::storage::StorageEngine`] backends hold their state behind a
//!   plain field, not an internal lock, on the same principle: the caller
//!   owns exclusion.
//!
//! When a backend *is* shared across tasks, wrap it the way the rest of
//! the ecosystem does: `tokio::sync::RwLock`/`Mutex` for anything crossing
//! an `.await` point, `std::sync::RwLock`/`Mutex` only for critical
//! sections that never await while the guard is held.
//!
//! ```text
//! // WRONG: holding a std::sync guard across an .await point
//! let guard = std_mutex.lock().unwrap();
//! engine.save(&bytes).await?;   // deadlock risk if save() also contends
//! drop(guard);
//!
//! // CORRECT: drop the guard before the await
//! let data = {
//!     let guard = std_mutex.lock().unwrap();
//!     guard.clone()
//! };
//! engine.save(&data).await?;
//! ```

#[cfg(test)]
mod tests {
    // This module is documentation-only; there is no runtime behavior to
    // exercise beyond confirming it compiles as part of the crate.
}
