//! Columnar in-memory table storage.
//!
//! A [`Table`] owns one [`Column`] per [`crate::schema::ColumnDef`]; each
//! `Column` stores its values contiguously rather than the table storing
//! rows of boxed `Value`s, so a full-column scan (the common OLAP access
//! pattern this crate targets) never touches unrelated columns.

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::value::{DataType, Value};

/// A single column's storage.
///
/// Values are boxed individually today (`Vec<Value>`) rather than packed
/// into a typed byte buffer — the dictionary/RLE encoding [`ColumnStore`]
/// applies on top (see [`crate::storage::column`]) is where the "trivially
/// beneficial" compression from the storage-engine contract actually
/// lives; `Column` itself stays a plain typed vector so every operator in
/// this crate (sort, projection, the workload analyzer) can index into it
/// without decoding first.
///
/// [`ColumnStore`]: crate::storage::column::ColumnStore
#[derive(Debug, Clone)]
pub struct Column {
    values: Vec<Value>,
}

impl Column {
    /// Builds an empty column.
    #[must_use]
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// The number of values stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the column holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrows the value at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `index >= self.len()`.
    pub fn get(&self, index: usize) -> Result<&Value> {
        self.values
            .get(index)
            .ok_or_else(|| Error::out_of_range(format!("column index {index} out of range (len {})", self.values.len())))
    }

    fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Reorders this column's values in place according to `permutation`,
    /// where `permutation[i]` names the source index that should end up at
    /// position `i`.
    fn reorder(&mut self, permutation: &[usize]) {
        let mut reordered = Vec::with_capacity(self.values.len());
        for &src in permutation {
            // `sort::sort_table` only ever builds permutations over
            // `0..len`, so this index is always in bounds.
            reordered.push(self.values[src].clone());
        }
        self.values = reordered;
    }
}

impl Default for Column {
    fn default() -> Self {
        Self::new()
    }
}

/// A columnar table: a [`Schema`] plus one [`Column`] per declared field.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    schema: Schema,
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Builds an empty table with no rows.
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        let columns = (0..schema.len()).map(|_| Column::new()).collect();
        Self {
            name: name.into(),
            schema,
            columns,
            row_count: 0,
        }
    }

    /// The table's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The table's schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The number of rows currently stored.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Borrows a column by position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `index` is not a declared column.
    pub fn get_column(&self, index: usize) -> Result<&Column> {
        self.columns
            .get(index)
            .ok_or_else(|| Error::out_of_range(format!("column {index} out of range (table has {} columns)", self.columns.len())))
    }

    /// Appends one row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArityMismatch`] if `row.len()` does not equal the
    /// number of declared columns, or [`Error::TypeMismatch`] if any value's
    /// runtime type does not match its column's declared type (`Null` is
    /// accepted in any column).
    pub fn insert_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::arity_mismatch(format!(
                "row has {} values but table {} declares {} columns",
                row.len(),
                self.name,
                self.columns.len()
            )));
        }
        for (i, value) in row.iter().enumerate() {
            let column_def = &self.schema.columns()[i];
            let expected = column_def.data_type;
            if value.is_null() {
                continue;
            }
            if value.data_type() != expected {
                return Err(Error::type_mismatch(format!(
                    "column '{}' expects {:?}, got {:?}",
                    column_def.name,
                    expected,
                    value.data_type()
                )));
            }
            if expected == DataType::Vector {
                let dim = value.as_vector().map(<[f32]>::len).unwrap_or(0);
                if dim != column_def.vector_dim {
                    return Err(Error::type_mismatch(format!(
                        "column '{}' expects a vector of dimension {}, got {}",
                        column_def.name, column_def.vector_dim, dim
                    )));
                }
            }
        }
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(value);
        }
        self.row_count += 1;
        Ok(())
    }

    /// Reorders every column in lockstep according to `permutation`, where
    /// `permutation[i]` names the source row index that should end up at
    /// position `i`. Used by [`crate::sort::sort_table`] to apply a
    /// computed ordering without materializing whole rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `permutation.len()` does not equal
    /// `self.row_count()`.
    pub fn reorder_rows(&mut self, permutation: &[usize]) -> Result<()> {
        if permutation.len() != self.row_count {
            return Err(Error::out_of_range(format!(
                "permutation has {} entries but table has {} rows",
                permutation.len(),
                self.row_count
            )));
        }
        for column in &mut self.columns {
            column.reorder(permutation);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;
    use crate::value::DataType;

    fn people_table() -> Table {
        let schema = Schema::new(vec![
            ColumnDef::new("id".into(), DataType::Int64),
            ColumnDef::new("name".into(), DataType::String),
        ]);
        Table::new("people", schema)
    }

    #[test]
    fn insert_row_rejects_wrong_arity() {
        let mut table = people_table();
        let err = table.insert_row(vec![Value::Int64(1)]).unwrap_err();
        assert!(matches!(err, Error::ArityMismatch(_)));
    }

    #[test]
    fn insert_row_rejects_wrong_type() {
        let mut table = people_table();
        let err = table
            .insert_row(vec![Value::string("not an id"), Value::string("bob")])
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
    }

    #[test]
    fn insert_row_rejects_vector_of_wrong_dimension() {
        let schema = Schema::new(vec![ColumnDef::vector("embedding".into(), 4)]);
        let mut table = Table::new("vectors", schema);
        let err = table.insert_row(vec![Value::vector(vec![1.0_f32, 2.0])]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
    }

    #[test]
    fn insert_row_accepts_vector_of_matching_dimension() {
        let schema = Schema::new(vec![ColumnDef::vector("embedding".into(), 2)]);
        let mut table = Table::new("vectors", schema);
        table.insert_row(vec![Value::vector(vec![1.0_f32, 2.0])]).unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn insert_row_accepts_null_in_any_column() {
        let mut table = people_table();
        table.insert_row(vec![Value::Int64(1), Value::Null]).unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn reorder_rows_permutes_every_column() {
        let mut table = people_table();
        table.insert_row(vec![Value::Int64(1), Value::string("a")]).unwrap();
        table.insert_row(vec![Value::Int64(2), Value::string("b")]).unwrap();
        table.insert_row(vec![Value::Int64(3), Value::string("c")]).unwrap();

        table.reorder_rows(&[2, 0, 1]).unwrap();

        let ids = table.get_column(0).unwrap();
        assert_eq!(*ids.get(0).unwrap(), Value::Int64(3));
        assert_eq!(*ids.get(1).unwrap(), Value::Int64(1));
        assert_eq!(*ids.get(2).unwrap(), Value::Int64(2));

        let names = table.get_column(1).unwrap();
        assert_eq!(names.get(0).unwrap().as_str(), Some("c"));
    }

    #[test]
    fn reorder_rows_rejects_wrong_length_permutation() {
        let mut table = people_table();
        table.insert_row(vec![Value::Int64(1), Value::string("a")]).unwrap();
        let err = table.reorder_rows(&[0, 1]).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
    }

    /// `∀ table T, ∀ bijective permutation p: reorder_rows(p)` satisfies
    /// `new[i] = old[p[i]]` for every row — checked against a randomly
    /// shuffled permutation rather than one fixed example.
    #[test]
    fn reorder_rows_matches_its_postcondition_on_a_random_permutation() {
        use rand::seq::SliceRandom;

        let mut table = people_table();
        let original_ids: Vec<i64> = (0..50).collect();
        for id in &original_ids {
            table.insert_row(vec![Value::Int64(*id), Value::string(format!("person-{id}"))]).unwrap();
        }

        let mut permutation: Vec<usize> = (0..original_ids.len()).collect();
        permutation.shuffle(&mut rand::thread_rng());
        table.reorder_rows(&permutation).unwrap();

        let ids = table.get_column(0).unwrap();
        for (new_index, &source_index) in permutation.iter().enumerate() {
            assert_eq!(*ids.get(new_index).unwrap(), Value::Int64(original_ids[source_index]));
        }
    }
}
