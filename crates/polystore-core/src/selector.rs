//! The storage selector: a pure function from a [`WorkloadProfile`] to a
//! recommended backend, following a fixed, first-match decision table.
//!
//! [`StorageRecommendation`] pairs a target backend with a confidence
//! score and a free-text reason, the same shape an optimizer suggestion
//! takes when it needs to justify itself to a human reading a log.

use crate::storage::StorageType;
use crate::workload::WorkloadProfile;

/// The outcome of [`recommend`]: a target backend, how confident the
/// recommendation is, and why.
#[derive(Debug, Clone)]
pub struct StorageRecommendation {
    /// The recommended backend.
    pub target: StorageType,
    /// A confidence score in `0.0..=1.0`.
    pub confidence: f64,
    /// A human-readable justification.
    pub reasoning: &'static str,
}

/// Recommends a storage backend for the workload described by `profile`,
/// by walking a fixed table of rules and returning the first one that
/// matches:
///
/// | Condition | Target | Confidence |
/// |---|---|---|
/// | `analytical_queries ∧ ¬write_heavy` | column | 0.9 |
/// | `point_lookups ∧ ¬analytical_queries` | row | 0.85 |
/// | `complex_joins ∧ data_size_gb < 1` | memory | 0.75 |
/// | `data_size_gb > 10` | column | 0.7 |
/// | otherwise | memory | 0.5 |
///
/// [`StorageType::Graph`] is never produced here — it is chosen only by an
/// explicit schema hint elsewhere, never inferred from query shape, so no
/// rule in this table can select it.
#[must_use]
pub fn recommend(profile: &WorkloadProfile) -> StorageRecommendation {
    if profile.analytical_queries && !profile.write_heavy {
        return StorageRecommendation {
            target: StorageType::Column,
            confidence: 0.9,
            reasoning: "analytical workload, column-oriented scans",
        };
    }

    if profile.point_lookups && !profile.analytical_queries {
        return StorageRecommendation {
            target: StorageType::Row,
            confidence: 0.85,
            reasoning: "point-lookup workload, row layout wins",
        };
    }

    if profile.complex_joins && profile.data_size_gb < 1.0 {
        return StorageRecommendation {
            target: StorageType::Memory,
            confidence: 0.75,
            reasoning: "small hot working set with joins",
        };
    }

    if profile.data_size_gb > 10.0 {
        return StorageRecommendation {
            target: StorageType::Column,
            confidence: 0.7,
            reasoning: "large data favors compression",
        };
    }

    StorageRecommendation {
        target: StorageType::Memory,
        confidence: 0.5,
        reasoning: "no strong signal; default",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> WorkloadProfile {
        WorkloadProfile {
            total_queries: 10,
            read_heavy: false,
            write_heavy: false,
            analytical_queries: false,
            point_lookups: false,
            complex_joins: false,
            data_size_gb: 0.0,
            query_complexity: 0.0,
            hottest_table: None,
        }
    }

    #[test]
    fn empty_history_defaults_to_memory_with_moderate_confidence() {
        let rec = recommend(&WorkloadProfile::default());
        assert!(matches!(rec.target, StorageType::Memory));
        assert!((rec.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn analytical_and_not_write_heavy_recommends_column() {
        let mut p = profile();
        p.analytical_queries = true;
        let rec = recommend(&p);
        assert!(matches!(rec.target, StorageType::Column));
        assert!(rec.confidence >= 0.85);
    }

    #[test]
    fn analytical_but_write_heavy_falls_through_to_next_rule() {
        let mut p = profile();
        p.analytical_queries = true;
        p.write_heavy = true;
        p.point_lookups = true;
        let rec = recommend(&p);
        assert!(matches!(rec.target, StorageType::Row));
    }

    #[test]
    fn point_lookups_without_analytical_recommends_row() {
        let mut p = profile();
        p.point_lookups = true;
        let rec = recommend(&p);
        assert!(matches!(rec.target, StorageType::Row));
        assert!((rec.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn complex_joins_with_small_data_recommends_memory() {
        let mut p = profile();
        p.complex_joins = true;
        p.data_size_gb = 0.2;
        let rec = recommend(&p);
        assert!(matches!(rec.target, StorageType::Memory));
        assert!((rec.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn large_data_recommends_column() {
        let mut p = profile();
        p.data_size_gb = 25.0;
        let rec = recommend(&p);
        assert!(matches!(rec.target, StorageType::Column));
        assert!((rec.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn no_strong_signal_defaults_to_memory() {
        let rec = recommend(&profile());
        assert!(matches!(rec.target, StorageType::Memory));
        assert!((rec.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn graph_is_never_recommended() {
        let mut p = profile();
        p.analytical_queries = true;
        p.write_heavy = true;
        p.point_lookups = true;
        p.complex_joins = true;
        p.data_size_gb = 50.0;
        let rec = recommend(&p);
        assert!(!matches!(rec.target, StorageType::Graph));
    }

    /// The literal acceptance scenario: an analytical, non-write-heavy
    /// profile must recommend `column` with confidence >= 0.85.
    #[test]
    fn acceptance_scenario_recommends_column_with_high_confidence() {
        let mut p = profile();
        p.analytical_queries = true;
        p.write_heavy = false;
        let rec = recommend(&p);
        assert!(matches!(rec.target, StorageType::Column));
        assert!(rec.confidence >= 0.85);
    }
}
