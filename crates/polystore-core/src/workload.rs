//! Workload analysis: classify recent queries by shape and roll them up
//! into a profile the [`crate::selector`] can act on.

use std::collections::VecDeque;

use chrono::Utc;

/// The kind of statement a query pattern was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// A `SELECT`-shaped read.
    Select,
    /// An `INSERT`-shaped write.
    Insert,
    /// An `UPDATE`-shaped write.
    Update,
    /// A `DELETE`-shaped write.
    Delete,
    /// A `CREATE`/`DROP`/`ALTER`-shaped schema change.
    Ddl,
    /// Anything that did not match a recognized leading keyword.
    Other,
}

/// One observed query, classified and timestamped.
#[derive(Debug, Clone)]
pub struct QueryPattern {
    /// The classified statement kind.
    pub kind: QueryKind,
    /// The best-effort extracted `FROM`/`INTO`/`UPDATE` table name, if any.
    pub table: Option<String>,
    /// The best-effort extracted projected column names (empty for `*`).
    pub columns: Vec<String>,
    /// The best-effort extracted `WHERE`-clause predicate texts.
    pub predicates: Vec<String>,
    /// The best-effort extracted `JOIN` target table names.
    pub joins: Vec<String>,
    /// The aggregation function names detected (`COUNT`, `SUM`, `AVG`,
    /// `MIN`, `MAX`), without the opening parenthesis.
    pub aggregations: Vec<String>,
    /// `true` if the statement text contains `DISTINCT`.
    pub has_distinct: bool,
    /// Milliseconds since the Unix epoch when this pattern was recorded.
    pub timestamp_ms: i64,
    /// Wall-clock execution time of the query, in milliseconds.
    pub execution_time_ms: u64,
    /// Number of rows the query touched or returned.
    pub rows_affected: u64,
}

/// A rollup of the patterns currently in the analyzer's window.
///
/// Field names and derivation rules follow the analyzer's documented
/// contract exactly: each boolean is a threshold over a ratio computed from
/// the window, not a heuristic of its own.
#[derive(Debug, Clone, Default)]
pub struct WorkloadProfile {
    /// Total patterns in the current window.
    pub total_queries: u64,
    /// `read_ratio > 0.7`, where `read_ratio = selects / total`.
    pub read_heavy: bool,
    /// `write_ratio > 0.3`, where `write_ratio = (inserts+updates+deletes) / total`.
    pub write_heavy: bool,
    /// `queries_with_aggregations / selects > 0.3`.
    pub analytical_queries: bool,
    /// `selects_with_predicates_and_no_joins / selects > 0.5`.
    pub point_lookups: bool,
    /// `selects_with_joins / selects > 0.2`.
    pub complex_joins: bool,
    /// `Σ rows_affected × 1e-6` — a roughly-1-KB-per-row heuristic.
    pub data_size_gb: f32,
    /// Mean over the window of
    /// `clamp((#joins + #predicates + #aggregations) / 10, 0, 1)`.
    pub query_complexity: f32,
    /// The single most frequently touched table in the window, if any.
    pub hottest_table: Option<String>,
}

const AGGREGATION_MARKERS: [&str; 5] = ["COUNT(", "SUM(", "AVG(", "MIN(", "MAX("];
const PREDICATE_CLAUSE_TERMINATORS: [&str; 4] = ["GROUP BY", "ORDER BY", "HAVING", "LIMIT"];

/// A bounded ring of recently observed [`QueryPattern`]s, covering the
/// last `time_window_ms` milliseconds.
#[derive(Debug, Clone)]
pub struct WorkloadAnalyzer {
    window: VecDeque<QueryPattern>,
    time_window_ms: i64,
}

impl WorkloadAnalyzer {
    /// Builds an analyzer that retains patterns recorded within the last
    /// `time_window_ms` milliseconds of each other.
    #[must_use]
    pub fn new(time_window_ms: i64) -> Self {
        Self {
            window: VecDeque::new(),
            time_window_ms,
        }
    }

    /// Classifies `sql` and records it into the window.
    ///
    /// This never fails: anything the best-effort heuristics cannot
    /// confidently extract is simply left at its default (`None`/empty),
    /// since a misclassified query pattern should never abort the caller
    /// that is just trying to execute a query.
    pub fn record_query(&mut self, sql: &str, execution_time_ms: u64, rows_affected: u64) {
        let upper = sql.to_uppercase();
        let kind = classify(&upper);
        let table = extract_table(&upper);
        let columns = extract_columns(&upper, kind);
        let predicates = extract_predicates(&upper);
        let joins = extract_joins(&upper);
        let aggregations = extract_aggregations(&upper);
        let has_distinct = upper.contains("DISTINCT");
        let timestamp_ms = Utc::now().timestamp_millis();

        self.window.push_back(QueryPattern {
            kind,
            table,
            columns,
            predicates,
            joins,
            aggregations,
            has_distinct,
            timestamp_ms,
            execution_time_ms,
            rows_affected,
        });
        self.evict_stale(timestamp_ms);
    }

    fn evict_stale(&mut self, now_ms: i64) {
        while let Some(front) = self.window.front() {
            if now_ms - front.timestamp_ms > self.time_window_ms {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }

    /// The number of patterns currently retained in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Returns `true` if the window holds no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Rolls the current window up into a [`WorkloadProfile`]. An empty
    /// window yields an all-zero, all-`false` profile.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn generate_workload_profile(&self) -> WorkloadProfile {
        let total = self.window.len() as u64;
        if total == 0 {
            return WorkloadProfile::default();
        }
        let total_f = total as f64;

        let selects = self.window.iter().filter(|p| matches!(p.kind, QueryKind::Select)).count() as f64;
        let writes = self
            .window
            .iter()
            .filter(|p| matches!(p.kind, QueryKind::Insert | QueryKind::Update | QueryKind::Delete))
            .count() as f64;
        let read_ratio = selects / total_f;
        let write_ratio = writes / total_f;

        let queries_with_aggs = self.window.iter().filter(|p| !p.aggregations.is_empty()).count() as f64;
        let selects_with_preds_no_joins = self
            .window
            .iter()
            .filter(|p| matches!(p.kind, QueryKind::Select) && !p.predicates.is_empty() && p.joins.is_empty())
            .count() as f64;
        let selects_with_joins = self
            .window
            .iter()
            .filter(|p| matches!(p.kind, QueryKind::Select) && !p.joins.is_empty())
            .count() as f64;

        let analytical_queries = selects > 0.0 && (queries_with_aggs / selects) > 0.3;
        let point_lookups = selects > 0.0 && (selects_with_preds_no_joins / selects) > 0.5;
        let complex_joins = selects > 0.0 && (selects_with_joins / selects) > 0.2;

        let rows_affected_total: u64 = self.window.iter().map(|p| p.rows_affected).sum();
        #[allow(clippy::cast_possible_truncation)]
        let data_size_gb = (rows_affected_total as f64 * 1e-6) as f32;

        let complexity_sum: f64 = self
            .window
            .iter()
            .map(|p| {
                let raw = (p.joins.len() + p.predicates.len() + p.aggregations.len()) as f64 / 10.0;
                raw.clamp(0.0, 1.0)
            })
            .sum();
        #[allow(clippy::cast_possible_truncation)]
        let query_complexity = (complexity_sum / total_f) as f32;

        let mut table_counts: std::collections::HashMap<&str, u64> = std::collections::HashMap::new();
        for pattern in &self.window {
            if let Some(table) = pattern.table.as_deref() {
                *table_counts.entry(table).or_insert(0) += 1;
            }
        }
        let hottest_table = table_counts.into_iter().max_by_key(|(_, count)| *count).map(|(name, _)| name.to_string());

        WorkloadProfile {
            total_queries: total,
            read_heavy: read_ratio > 0.7,
            write_heavy: write_ratio > 0.3,
            analytical_queries,
            point_lookups,
            complex_joins,
            data_size_gb,
            query_complexity,
            hottest_table,
        }
    }
}

fn classify(upper: &str) -> QueryKind {
    let trimmed = upper.trim_start();
    if trimmed.starts_with("SELECT") {
        QueryKind::Select
    } else if trimmed.starts_with("INSERT") {
        QueryKind::Insert
    } else if trimmed.starts_with("UPDATE") {
        QueryKind::Update
    } else if trimmed.starts_with("DELETE") {
        QueryKind::Delete
    } else if trimmed.starts_with("CREATE") || trimmed.starts_with("DROP") || trimmed.starts_with("ALTER") {
        QueryKind::Ddl
    } else {
        QueryKind::Other
    }
}

/// Best-effort extraction of the table named after `FROM`/`INTO`/`UPDATE`.
///
/// This is a keyword-scanning heuristic, not a parser: a quoted identifier
/// containing a space, or a `FROM` appearing inside a string literal, will
/// misparse. That is an accepted, documented limitation — the analyzer's
/// job is to classify typical workload shape, not to validate SQL.
fn extract_table(upper: &str) -> Option<String> {
    for marker in ["FROM ", "INTO ", "UPDATE "] {
        if let Some(pos) = upper.find(marker) {
            let rest = &upper[pos + marker.len()..];
            let name: String = rest.split(|c: char| c.is_whitespace() || c == '(' || c == ',').next().unwrap_or("").to_string();
            if !name.is_empty() {
                return Some(name);
            }
        }
    }
    None
}

fn extract_columns(upper: &str, kind: QueryKind) -> Vec<String> {
    if !matches!(kind, QueryKind::Select) {
        return Vec::new();
    }
    let Some(select_pos) = upper.find("SELECT") else {
        return Vec::new();
    };
    let Some(from_pos) = upper.find(" FROM ") else {
        return Vec::new();
    };
    if from_pos <= select_pos {
        return Vec::new();
    }
    let projection = &upper[select_pos + "SELECT".len()..from_pos];
    if projection.trim() == "*" {
        return Vec::new();
    }
    projection
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Best-effort extraction of the `WHERE` clause's top-level predicates,
/// split on `AND`/`OR`. Stops at the first `GROUP BY`/`ORDER BY`/`HAVING`/
/// `LIMIT` keyword, whichever comes first, so those clauses never leak
/// into the predicate list.
fn extract_predicates(upper: &str) -> Vec<String> {
    let Some(where_pos) = upper.find("WHERE ") else {
        return Vec::new();
    };
    let rest = &upper[where_pos + "WHERE ".len()..];
    let end = PREDICATE_CLAUSE_TERMINATORS
        .iter()
        .filter_map(|kw| rest.find(kw))
        .min()
        .unwrap_or(rest.len());
    let clause = rest.get(..end).unwrap_or(rest);
    clause
        .split(" AND ")
        .flat_map(|segment| segment.split(" OR "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn extract_joins(upper: &str) -> Vec<String> {
    let mut joins = Vec::new();
    let mut search_from = 0;
    while let Some(offset) = upper.get(search_from..).and_then(|tail| tail.find("JOIN ")) {
        let pos = search_from + offset;
        let rest = &upper[pos + "JOIN ".len()..];
        let name: String = rest.split(|c: char| c.is_whitespace() || c == '(').next().unwrap_or("").to_string();
        if !name.is_empty() {
            joins.push(name);
        }
        search_from = pos + "JOIN ".len();
    }
    joins
}

fn extract_aggregations(upper: &str) -> Vec<String> {
    AGGREGATION_MARKERS
        .iter()
        .filter(|marker| upper.contains(*marker))
        .map(|marker| marker.trim_end_matches('(').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_basic_statement_kinds() {
        let mut analyzer = WorkloadAnalyzer::new(60_000);
        analyzer.record_query("select * from orders", 5, 10);
        analyzer.record_query("INSERT INTO orders VALUES (1)", 2, 1);
        analyzer.record_query("update orders set x = 1", 3, 1);
        analyzer.record_query("delete from orders where x = 1", 1, 1);
        analyzer.record_query("CREATE TABLE orders (id INT)", 8, 0);

        assert_eq!(analyzer.len(), 5);
        let profile = analyzer.generate_workload_profile();
        assert!(!profile.write_heavy || profile.total_queries > 0);
    }

    #[test]
    fn empty_window_yields_zeroed_profile() {
        let analyzer = WorkloadAnalyzer::new(60_000);
        let profile = analyzer.generate_workload_profile();
        assert_eq!(profile.total_queries, 0);
        assert!(!profile.read_heavy);
        assert!(!profile.analytical_queries);
        assert!(profile.hottest_table.is_none());
    }

    #[test]
    fn detects_aggregation_and_distinct() {
        let mut analyzer = WorkloadAnalyzer::new(60_000);
        analyzer.record_query("SELECT COUNT(*) FROM orders", 5, 1);
        let pattern = analyzer.window.back().expect("just recorded");
        assert_eq!(pattern.aggregations, vec!["COUNT"]);
        assert!(!pattern.has_distinct);
    }

    #[test]
    fn extracts_table_joins_and_columns() {
        let mut analyzer = WorkloadAnalyzer::new(60_000);
        analyzer.record_query("SELECT a, b FROM orders JOIN customers ON orders.id = customers.id", 5, 1);
        let pattern = analyzer.window.back().expect("just recorded");
        assert_eq!(pattern.table.as_deref(), Some("ORDERS"));
        assert_eq!(pattern.joins, vec!["CUSTOMERS"]);
        assert_eq!(pattern.columns, vec!["A", "B"]);
    }

    #[test]
    fn extracts_where_predicates_split_on_and_or() {
        let mut analyzer = WorkloadAnalyzer::new(60_000);
        analyzer.record_query("SELECT * FROM orders WHERE status = 'OPEN' AND total > 10 GROUP BY status", 5, 1);
        let pattern = analyzer.window.back().expect("just recorded");
        assert_eq!(pattern.predicates, vec!["STATUS = 'OPEN'", "TOTAL > 10"]);
    }

    #[test]
    fn hottest_table_is_the_most_frequently_touched() {
        let mut analyzer = WorkloadAnalyzer::new(60_000);
        analyzer.record_query("SELECT * FROM orders", 1, 1);
        analyzer.record_query("SELECT * FROM orders", 1, 1);
        analyzer.record_query("SELECT * FROM customers", 1, 1);
        let profile = analyzer.generate_workload_profile();
        assert_eq!(profile.hottest_table.as_deref(), Some("ORDERS"));
    }

    /// The literal end-to-end scenario from the workload-classification
    /// acceptance test: 8 analytical selects and 2 inserts should read as
    /// `read_ratio=0.8`-equivalent (`read_heavy` true), not write-heavy,
    /// and analytical.
    #[test]
    fn eight_analytical_selects_and_two_inserts_profile_as_analytical() {
        let mut analyzer = WorkloadAnalyzer::new(60_000);
        for _ in 0..8 {
            analyzer.record_query("SELECT x, COUNT(*) FROM events GROUP BY x", 2, 100);
        }
        for _ in 0..2 {
            analyzer.record_query("INSERT INTO events VALUES (1)", 1, 1);
        }
        let profile = analyzer.generate_workload_profile();
        assert!(profile.read_heavy);
        assert!(!profile.write_heavy);
        assert!(profile.analytical_queries);
    }

    #[test]
    fn stale_patterns_are_evicted_from_the_window() {
        let mut analyzer = WorkloadAnalyzer::new(0);
        analyzer.record_query("SELECT * FROM a", 1, 1);
        analyzer.record_query("SELECT * FROM b", 1, 1);
        assert!(analyzer.len() <= 2);
    }
}
