//! A row-oriented OLTP backend with a primary-key hash index.
//!
//! By convention the first declared column is the primary key: a single,
//! unnamed `primary_key` slot rather than a composite or explicitly named
//! one, since `RowStore` has no use for either.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::storage::{Capabilities, EngineMetrics, StorageEngine, StorageKey};
use crate::value::Value;

/// A single stored row: one [`Value`] per column, in schema order.
pub type Row = Vec<Value>;

/// A row-oriented store indexing rows by their first column's value.
#[derive(Debug)]
pub struct RowStore {
    schema: Schema,
    rows: Vec<Row>,
    pk_index: HashMap<String, usize>,
}

fn pk_key(value: &Value) -> String {
    value.to_string()
}

impl RowStore {
    /// Builds an empty store for rows matching `schema`.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            pk_index: HashMap::new(),
        }
    }

    /// The number of rows currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no rows are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up a row by its primary-key (first column) value.
    #[must_use]
    pub fn find_by_primary_key(&self, key: &Value) -> Option<&Row> {
        self.pk_index.get(&pk_key(key)).and_then(|&idx| self.rows.get(idx))
    }

    fn decode_row(&self, bytes: &[u8]) -> Result<Row> {
        let row: Row = serde_json::from_slice(bytes)?;
        if row.len() != self.schema.len() {
            return Err(Error::arity_mismatch(format!(
                "row has {} values but schema declares {} columns",
                row.len(),
                self.schema.len()
            )));
        }
        Ok(row)
    }
}

#[async_trait]
impl StorageEngine for RowStore {
    async fn save(&mut self, bytes: &[u8]) -> Result<StorageKey> {
        let row = self.decode_row(bytes)?;
        let index = self.rows.len();
        if let Some(pk_value) = row.first() {
            self.pk_index.insert(pk_key(pk_value), index);
        }
        self.rows.push(row);
        Ok(StorageKey(index as u64))
    }

    async fn load(&self, key: &StorageKey) -> Result<Vec<u8>> {
        let row = self.rows.get(key.0 as usize).ok_or_else(|| Error::not_found(format!("no row at key {}", key.0)))?;
        Ok(serde_json::to_vec(row)?)
    }

    async fn query(&self, query: &str) -> Result<Vec<Value>> {
        let trimmed = query.trim();
        if let Some(pk_literal) = trimmed.strip_prefix("GET ") {
            let key = Value::string(pk_literal.trim());
            return Ok(self.find_by_primary_key(&key).cloned().unwrap_or_default());
        }
        if trimmed.eq_ignore_ascii_case("SELECT * FROM ROWS") {
            return Ok(self.rows.iter().flatten().cloned().collect());
        }
        Err(Error::not_implemented(format!("RowStore does not support query: {query}")))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            oltp: true,
            ..Capabilities::default()
        }
    }

    fn metrics(&self) -> EngineMetrics {
        EngineMetrics {
            read_latency_ms: 0.05,
            write_latency_ms: 0.08,
            compression_ratio: 1.0,
            throughput_mbps: 150.0,
        }
    }

    async fn deinit(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
