//! Table schema: an ordered list of column definitions plus a name index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::value::DataType;

/// The definition of a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    /// The column's name, matched case-insensitively by
    /// [`Schema::find_column`].
    pub name: String,
    /// The column's declared data type.
    pub data_type: DataType,
    /// The fixed dimension of every [`crate::value::Value::Vector`] this
    /// column accepts; `0` for non-vector columns.
    pub vector_dim: usize,
}

impl ColumnDef {
    /// Builds a new non-vector column definition.
    #[must_use]
    pub const fn new(name: String, data_type: DataType) -> Self {
        Self {
            name,
            data_type,
            vector_dim: 0,
        }
    }

    /// Builds a new [`DataType::Vector`] column definition with a fixed
    /// dimension.
    #[must_use]
    pub const fn vector(name: String, dim: usize) -> Self {
        Self {
            name,
            data_type: DataType::Vector,
            vector_dim: dim,
        }
    }
}

/// An ordered list of [`ColumnDef`]s plus a precomputed case-insensitive
/// name index, so [`Schema::find_column`] is O(1) after construction
/// rather than a linear scan on every lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnDef>,
    #[serde(skip, default = "HashMap::new")]
    index: HashMap<String, usize>,
}

impl Schema {
    /// Builds a schema from an ordered column list.
    #[must_use]
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        let index = Self::build_index(&columns);
        Self { columns, index }
    }

    fn build_index(columns: &[ColumnDef]) -> HashMap<String, usize> {
        columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.to_lowercase(), i))
            .collect()
    }

    /// Returns the column definitions in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Looks up a column's position by name, case-insensitively.
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_lowercase()).copied()
    }

    /// The number of declared columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if this schema declares no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// `#[serde(skip)]` on `index` leaves it empty after deserialization;
// `rebuild_index` below restores it the same way `Schema::new` does, so a
// deserialized schema's `find_column` behaves identically to a freshly
// constructed one.
impl Schema {
    /// Rebuilds the internal name index after deserialization.
    ///
    /// Call this once after `serde_json::from_*` produces a `Schema`; the
    /// index itself is never serialized since it is fully determined by
    /// `columns`.
    pub fn rebuild_index(&mut self) {
        self.index = Self::build_index(&self.columns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::new(vec![
            ColumnDef::new("id".into(), DataType::Int64),
            ColumnDef::new("Name".into(), DataType::String),
            ColumnDef::vector("embedding".into(), 8),
        ])
    }

    #[test]
    fn find_column_is_case_insensitive() {
        let schema = sample();
        assert_eq!(schema.find_column("name"), Some(1));
        assert_eq!(schema.find_column("NAME"), Some(1));
        assert_eq!(schema.find_column("missing"), None);
    }

    #[test]
    fn vector_column_carries_dimension() {
        let schema = sample();
        assert_eq!(schema.columns()[2].vector_dim, 8);
    }

    #[test]
    fn rebuild_index_after_json_round_trip() {
        let schema = sample();
        let json = serde_json::to_string(&schema).expect("serialize");
        let mut back: Schema = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.find_column("name"), None);
        back.rebuild_index();
        assert_eq!(back.find_column("name"), Some(1));
    }
}
