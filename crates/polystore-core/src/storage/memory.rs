//! An in-memory key/value backend.
//!
//! Deliberately uses a plain `HashMap` behind an un-synchronized field
//! rather than an internally-locking concurrent map: the crate's
//! concurrency contract (see [`crate::concurrency`]) puts the burden of
//! serializing concurrent mutation on the caller, not on the backend, so
//! reaching for a concurrent map here would promise more safety than the
//! rest of the crate actually provides.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::storage::{Capabilities, EngineMetrics, StorageEngine, StorageKey};
use crate::value::Value;

/// An in-memory, OLTP-shaped key/value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: HashMap<StorageKey, Vec<u8>>,
    next_key: u64,
}

impl MemoryStore {
    /// Builds an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of blobs currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the store holds no blobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl StorageEngine for MemoryStore {
    async fn save(&mut self, bytes: &[u8]) -> Result<StorageKey> {
        let key = StorageKey(self.next_key);
        self.next_key += 1;
        self.data.insert(key, bytes.to_vec());
        Ok(key)
    }

    async fn load(&self, key: &StorageKey) -> Result<Vec<u8>> {
        self.data.get(key).cloned().ok_or_else(|| Error::not_found(format!("no blob stored under key {}", key.0)))
    }

    async fn query(&self, _query: &str) -> Result<Vec<Value>> {
        Err(Error::not_implemented("MemoryStore exposes only save/load; it does not interpret queries"))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            oltp: true,
            ..Capabilities::default()
        }
    }

    fn metrics(&self) -> EngineMetrics {
        EngineMetrics {
            read_latency_ms: 0.01,
            write_latency_ms: 0.01,
            compression_ratio: 1.0,
            throughput_mbps: f64::INFINITY,
        }
    }

    async fn deinit(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let mut store = MemoryStore::new();
        let key = store.save(b"hello").await.unwrap();
        assert_eq!(store.load(&key).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn load_unknown_key_is_not_found() {
        let store = MemoryStore::new();
        let err = store.load(&StorageKey(999)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn keys_are_distinct_across_saves() {
        let mut store = MemoryStore::new();
        let a = store.save(b"a").await.unwrap();
        let b = store.save(b"b").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn capabilities_declare_oltp_only() {
        let store = MemoryStore::new();
        let caps = store.capabilities();
        assert!(caps.oltp);
        assert!(!caps.olap);
        assert!(!caps.graph);
    }
}
