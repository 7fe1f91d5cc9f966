//! Stable, multi-key `ORDER BY` over a [`Table`].

use std::cmp::Ordering;

use tracing::debug;

use crate::error::Result;
use crate::table::Table;
use crate::value::{total_cmp_f64, Value};

/// Ascending or descending sort direction for a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest value first.
    Asc,
    /// Largest value first.
    Desc,
}

/// One `ORDER BY` key: a column name plus its direction.
#[derive(Debug, Clone)]
pub struct OrderBy {
    /// The column to sort by.
    pub column: String,
    /// The direction to sort that column in.
    pub direction: SortDirection,
}

impl OrderBy {
    /// Builds an ascending order-by key.
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Builds a descending order-by key.
    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Sorts `table` in place by `order_by`, applying each key in order and
/// falling through to the next on a tie. The sort is stable: rows that
/// compare equal on every key keep their original relative order, which
/// Rust's slice sort already guarantees without any extra tie-break logic
/// here.
///
/// An `order_by` entry naming a column the table's schema does not declare
/// contributes `Ordering::Equal` for every comparison (falls through to
/// the next key, or leaves relative order unchanged if it was the last
/// key) rather than failing the whole sort over what is most often a typo;
/// this is logged at `debug` level so it is visible without aborting a
/// running query.
///
/// # Errors
///
/// Returns an error if `order_by` names more keys than columns exist to
/// read, or if building the permutation fails to apply (see
/// [`Table::reorder_rows`]).
pub fn sort_table(table: &mut Table, order_by: &[OrderBy]) -> Result<()> {
    let row_count = table.row_count();
    let mut indices: Vec<usize> = (0..row_count).collect();

    let column_positions: Vec<Option<usize>> = order_by
        .iter()
        .map(|key| {
            let pos = table.schema().find_column(&key.column);
            if pos.is_none() {
                debug!(column = %key.column, "order-by column not found in schema; treating as no-op tie-break");
            }
            pos
        })
        .collect();

    indices.sort_by(|&a, &b| {
        for (key, pos) in order_by.iter().zip(&column_positions) {
            let Some(pos) = pos else {
                continue;
            };
            // Columns only ever come from this table, so `pos` is in range.
            let va = table.get_column(*pos).expect("order-by column in range").get(a).expect("row index in range");
            let vb = table.get_column(*pos).expect("order-by column in range").get(b).expect("row index in range");
            let ord = directional_cmp(va, vb, key.direction);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    table.reorder_rows(&indices)
}

/// Compares two values under the sort operator's fixed, direction-neutral
/// ordering rules:
///
/// - Numeric types compare by native ordering; `NaN` compares equal to
///   itself and greater than every other float (see
///   [`crate::value::total_cmp_f64`]).
/// - `false < true`.
/// - Strings compare lexicographically by byte value (not locale-aware).
/// - Timestamps compare by their underlying integer instant.
/// - Vectors compare by their first element (an empty vector sorts as
///   less than any non-empty one).
/// - `Custom`, `Exception`, and cross-type comparisons (including either
///   side being `Null`) are always `Equal` — they never participate in
///   ordering, only in tie-breaking to the next key.
///
/// This is the base comparator only; it does not know about sort
/// direction or the "NaN always sorts last" rule, both of which
/// [`directional_cmp`] layers on top.
#[must_use]
pub fn cmp_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int32(x), Value::Int32(y)) => x.cmp(y),
        (Value::Int64(x), Value::Int64(y)) => x.cmp(y),
        (Value::Float32(x), Value::Float32(y)) => total_cmp_f64(f64::from(*x), f64::from(*y)),
        (Value::Float64(x), Value::Float64(y)) => total_cmp_f64(*x, *y),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.as_str().cmp(y.as_str()),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Vector(x), Value::Vector(y)) => match (x.first(), y.first()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(fx), Some(fy)) => total_cmp_f64(f64::from(*fx), f64::from(*fy)),
        },
        _ => Ordering::Equal,
    }
}

/// Returns `true` for a value whose comparison routes through
/// [`total_cmp_f64`] and currently holds `NaN`: a bare float, or a vector
/// whose first element is `NaN`.
fn is_nan_like(value: &Value) -> bool {
    match value {
        Value::Float32(x) => x.is_nan(),
        Value::Float64(x) => x.is_nan(),
        Value::Vector(v) => v.first().is_some_and(|x| x.is_nan()),
        _ => false,
    }
}

/// Applies `direction` to [`cmp_values`], pinning `NaN`-like operands last
/// regardless of direction: spec §4.3 requires `NaN` to sort after every
/// non-`NaN` value "regardless of direction", which a plain `Ordering::reverse`
/// on top of [`total_cmp_f64`]'s NaN-maximal order would instead flip to
/// first on `Desc`.
fn directional_cmp(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (is_nan_like(a), is_nan_like(b)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = cmp_values(a, b);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}
