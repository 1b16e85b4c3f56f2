//! Heuristic data-quality flags for tables.
//!
//! Runs a fixed battery of independent rules over a table, its
//! structural summary and its missing-value report, then folds the raw
//! signals into a composite `quality_score` in `[0, 1]`.
//!
//! Every rule is defined for degenerate input (zero rows, zero
//! columns, all-missing columns) and no rule halts the others; the
//! output always carries every flag, with empty lists rather than
//! absent entries.
//!
//! # Example
//!
//! ```ignore
//! use catar::{compute_quality_flags, missing_table, summarize_dataset};
//!
//! let summary = summarize_dataset(&table)?;
//! let missing = missing_table(&table)?;
//! let flags = compute_quality_flags(&table, &summary, &missing);
//! println!("quality score: {:.2}", flags.quality_score);
//! ```

#![allow(clippy::cast_precision_loss)]

use crate::{missing::MissingReport, profile::DatasetSummary, table::Table};

/// Penalty for a table below the minimum row count.
const FEW_ROWS_PENALTY: f64 = 0.15;
/// Penalty for a table above the column ceiling.
const WIDE_TABLE_PENALTY: f64 = 0.10;
/// Weight applied to the worst per-column missing share.
const MISSING_WEIGHT: f64 = 0.30;
/// Penalty for the first constant column found.
const CONSTANT_BASE_PENALTY: f64 = 0.10;
/// Additional penalty per constant column beyond the first.
const CONSTANT_EXTRA_PENALTY: f64 = 0.05;
/// Ceiling on the total constant-column penalty.
const CONSTANT_PENALTY_CAP: f64 = 0.25;
/// Penalty for the presence of any suspicious identifier duplicates.
const DUPLICATE_BASE_PENALTY: f64 = 0.10;
/// Weight applied to the worst duplicate share among candidates.
const DUPLICATE_WEIGHT: f64 = 0.20;
/// Ceiling on the total duplicate penalty.
const DUPLICATE_PENALTY_CAP: f64 = 0.30;

/// Thresholds steering the quality heuristics.
///
/// Every threshold is an explicit, documented field; there are no
/// hidden module-level cutoffs. `Default` gives the contractual
/// defaults, and `with_*` builders adjust individual knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityConfig {
    /// Minimum viable row count; fewer rows raises `too_few_rows`.
    pub min_rows: usize,
    /// Column ceiling; more columns raises `too_many_columns`.
    pub max_columns: usize,
    /// Worst per-column missing share tolerated before
    /// `too_many_missing` is raised.
    pub max_missing_share: f64,
    /// Case-insensitive substring marking a column name as a candidate
    /// identifier.
    pub id_name_pattern: String,
    /// Distinct-to-rows ratio at or above which a column is a
    /// candidate identifier by near-uniqueness.
    pub id_uniqueness_ratio: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_rows: 5,
            max_columns: 50,
            max_missing_share: 0.5,
            id_name_pattern: "id".to_string(),
            id_uniqueness_ratio: 0.95,
        }
    }
}

impl QualityConfig {
    /// Create a config with the contractual defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum viable row count.
    #[must_use]
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// Set the column ceiling.
    #[must_use]
    pub fn with_max_columns(mut self, max_columns: usize) -> Self {
        self.max_columns = max_columns;
        self
    }

    /// Set the tolerated worst missing share.
    #[must_use]
    pub fn with_max_missing_share(mut self, share: f64) -> Self {
        self.max_missing_share = share;
        self
    }

    /// Set the identifier name pattern.
    #[must_use]
    pub fn with_id_name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.id_name_pattern = pattern.into();
        self
    }

    /// Set the near-uniqueness ratio for identifier candidates.
    #[must_use]
    pub fn with_id_uniqueness_ratio(mut self, ratio: f64) -> Self {
        self.id_uniqueness_ratio = ratio;
        self
    }

    /// Check whether a column is a candidate identifier: name pattern
    /// match or near-unique values.
    #[must_use]
    pub fn is_id_candidate(&self, name: &str, distinct_count: usize, n_rows: usize) -> bool {
        if n_rows == 0 {
            return false;
        }

        let name_match = name
            .to_lowercase()
            .contains(&self.id_name_pattern.to_lowercase());
        let near_unique = distinct_count as f64 >= self.id_uniqueness_ratio * n_rows as f64;

        name_match || near_unique
    }
}

/// Duplicate statistics for one suspicious identifier column.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateStats {
    /// Rows that collide with an earlier value
    /// (`n_rows - distinct_count`).
    pub duplicate_count: usize,
    /// `duplicate_count / n_rows`, in `[0, 1]`.
    pub duplicate_share: f64,
}

/// The full set of quality flags. Every field is always populated;
/// clean tables carry `false` flags and empty lists, never absent
/// entries.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityFlags {
    /// Row count below [`QualityConfig::min_rows`].
    pub too_few_rows: bool,
    /// Column count above [`QualityConfig::max_columns`].
    pub too_many_columns: bool,
    /// Worst per-column missing share, `0.0` for a column-less table.
    pub max_missing_share: f64,
    /// `max_missing_share` above [`QualityConfig::max_missing_share`].
    pub too_many_missing: bool,
    /// At least one constant column exists.
    pub has_constant_columns: bool,
    /// Number of constant columns.
    pub constant_columns_count: usize,
    /// Constant column names in table column order.
    pub constant_columns_list: Vec<String>,
    /// At least one candidate identifier column has colliding values.
    pub has_suspicious_id_duplicates: bool,
    /// Suspicious candidate columns with their duplicate statistics,
    /// in table column order.
    pub suspicious_duplicates: Vec<(String, DuplicateStats)>,
    /// Composite score in `[0, 1]`; higher is better.
    pub quality_score: f64,
}

impl QualityFlags {
    /// Look up duplicate statistics for a suspicious column by name.
    #[must_use]
    pub fn duplicates_for(&self, name: &str) -> Option<&DuplicateStats> {
        self.suspicious_duplicates
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, stats)| stats)
    }
}

/// Evaluates the quality-rule battery with default thresholds.
///
/// Depends on the structural summary and missing report of the same
/// table; sequence this call after [`crate::summarize_dataset`] and
/// [`crate::missing_table`].
#[must_use]
pub fn compute_quality_flags(
    table: &Table,
    summary: &DatasetSummary,
    missing: &MissingReport,
) -> QualityFlags {
    compute_quality_flags_with(table, summary, missing, &QualityConfig::default())
}

/// Evaluates the quality-rule battery with explicit thresholds.
#[must_use]
pub fn compute_quality_flags_with(
    table: &Table,
    summary: &DatasetSummary,
    missing: &MissingReport,
    config: &QualityConfig,
) -> QualityFlags {
    let n_rows = table.n_rows();
    let n_cols = table.n_cols();

    let too_few_rows = n_rows < config.min_rows;
    let too_many_columns = n_cols > config.max_columns;

    let max_missing_share = missing.max_missing_share();
    let too_many_missing = max_missing_share > config.max_missing_share;

    // A fully-missing column counts as constant (0 distinct values).
    // A zero-row table has no constant columns at all.
    let constant_columns_list: Vec<String> = if n_rows == 0 {
        Vec::new()
    } else {
        summary
            .columns
            .iter()
            .filter(|c| c.is_constant())
            .map(|c| c.name.clone())
            .collect()
    };
    let constant_columns_count = constant_columns_list.len();
    let has_constant_columns = constant_columns_count > 0;

    let mut suspicious_duplicates = Vec::new();
    for column in &summary.columns {
        if !config.is_id_candidate(&column.name, column.distinct_count, n_rows) {
            continue;
        }

        let duplicate_count = n_rows.saturating_sub(column.distinct_count);
        if duplicate_count == 0 {
            continue;
        }

        suspicious_duplicates.push((
            column.name.clone(),
            DuplicateStats {
                duplicate_count,
                duplicate_share: duplicate_count as f64 / n_rows as f64,
            },
        ));
    }
    let has_suspicious_id_duplicates = !suspicious_duplicates.is_empty();

    let worst_duplicate_share = suspicious_duplicates
        .iter()
        .map(|(_, s)| s.duplicate_share)
        .fold(None, |acc: Option<f64>, share| {
            Some(acc.map_or(share, |a| a.max(share)))
        });

    let quality_score = score_from_signals(
        too_few_rows,
        too_many_columns,
        max_missing_share,
        constant_columns_count,
        worst_duplicate_share,
    );

    QualityFlags {
        too_few_rows,
        too_many_columns,
        max_missing_share,
        too_many_missing,
        has_constant_columns,
        constant_columns_count,
        constant_columns_list,
        has_suspicious_id_duplicates,
        suspicious_duplicates,
        quality_score,
    }
}

/// Folds the raw rule signals into a composite score in `[0, 1]`.
///
/// Pure weighted aggregation, testable in isolation from the rules
/// that feed it: each defect class subtracts a penalty from 1.0, so a
/// table with any defect scores strictly below the same table without
/// it, and the result is clamped to `[0, 1]`.
#[must_use]
pub fn score_from_signals(
    too_few_rows: bool,
    too_many_columns: bool,
    max_missing_share: f64,
    constant_columns: usize,
    worst_duplicate_share: Option<f64>,
) -> f64 {
    let mut penalty = 0.0;

    if too_few_rows {
        penalty += FEW_ROWS_PENALTY;
    }
    if too_many_columns {
        penalty += WIDE_TABLE_PENALTY;
    }

    penalty += MISSING_WEIGHT * max_missing_share.clamp(0.0, 1.0);

    if constant_columns > 0 {
        let constant_penalty =
            CONSTANT_BASE_PENALTY + CONSTANT_EXTRA_PENALTY * (constant_columns - 1) as f64;
        penalty += constant_penalty.min(CONSTANT_PENALTY_CAP);
    }

    if let Some(share) = worst_duplicate_share {
        let duplicate_penalty = DUPLICATE_BASE_PENALTY + DUPLICATE_WEIGHT * share.clamp(0.0, 1.0);
        penalty += duplicate_penalty.min(DUPLICATE_PENALTY_CAP);
    }

    (1.0 - penalty).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{ArrayRef, Int32Array, StringArray},
        datatypes::{DataType, Field, Schema},
        record_batch::RecordBatch,
    };

    use super::*;
    use crate::{missing::missing_table, profile::summarize_dataset};

    fn make_table(columns: Vec<(&str, ArrayRef)>) -> Table {
        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
            .collect();
        let arrays: Vec<ArrayRef> = columns.into_iter().map(|(_, array)| array).collect();

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).expect("batch");
        Table::from_batch(batch).expect("table")
    }

    fn int_col(values: Vec<Option<i32>>) -> ArrayRef {
        Arc::new(Int32Array::from(values))
    }

    fn str_col(values: Vec<Option<&str>>) -> ArrayRef {
        Arc::new(StringArray::from(values))
    }

    fn flags_for(table: &Table) -> QualityFlags {
        let summary = summarize_dataset(table).expect("summary");
        let missing = missing_table(table).expect("missing");
        compute_quality_flags(table, &summary, &missing)
    }

    #[test]
    fn test_config_defaults() {
        let config = QualityConfig::default();
        assert_eq!(config.min_rows, 5);
        assert_eq!(config.max_columns, 50);
        assert!((config.max_missing_share - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.id_name_pattern, "id");
        assert!((config.id_uniqueness_ratio - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_builder() {
        let config = QualityConfig::new()
            .with_min_rows(10)
            .with_max_columns(20)
            .with_max_missing_share(0.3)
            .with_id_name_pattern("key")
            .with_id_uniqueness_ratio(0.9);

        assert_eq!(config.min_rows, 10);
        assert_eq!(config.max_columns, 20);
        assert!((config.max_missing_share - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.id_name_pattern, "key");
        assert!((config.id_uniqueness_ratio - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_id_candidate_by_name_and_uniqueness() {
        let config = QualityConfig::default();

        assert!(config.is_id_candidate("user_id", 1, 10));
        assert!(config.is_id_candidate("ID", 1, 10));
        // near-unique without pattern match
        assert!(config.is_id_candidate("token", 10, 10));
        assert!(config.is_id_candidate("token", 96, 100));
        // neither
        assert!(!config.is_id_candidate("city", 3, 10));
        // zero rows never yields candidates
        assert!(!config.is_id_candidate("user_id", 0, 0));
    }

    #[test]
    fn test_too_few_rows() {
        let small = make_table(vec![("value", int_col(vec![Some(1), Some(2), Some(3)]))]);
        assert!(flags_for(&small).too_few_rows);

        let big = make_table(vec![("value", int_col((0..6).map(Some).collect()))]);
        assert!(!flags_for(&big).too_few_rows);
    }

    #[test]
    fn test_too_many_columns() {
        let table = make_table(vec![("a", int_col(vec![Some(1)]))]);
        let summary = summarize_dataset(&table).expect("summary");
        let missing = missing_table(&table).expect("missing");

        let config = QualityConfig::new().with_max_columns(0);
        let flags = compute_quality_flags_with(&table, &summary, &missing, &config);
        assert!(flags.too_many_columns);

        let flags = compute_quality_flags(&table, &summary, &missing);
        assert!(!flags.too_many_columns);
    }

    #[test]
    fn test_missing_flags() {
        let table = make_table(vec![
            ("a", int_col(vec![Some(1), None, None, None])),
            ("b", int_col(vec![Some(1), Some(2), Some(3), Some(4)])),
        ]);

        let flags = flags_for(&table);
        assert!((flags.max_missing_share - 0.75).abs() < f64::EPSILON);
        assert!(flags.too_many_missing);
    }

    #[test]
    fn test_constant_column_detection() {
        let table = make_table(vec![
            ("key", int_col(vec![Some(1), Some(2), Some(3), Some(4)])),
            (
                "name",
                str_col(vec![Some("a"), Some("b"), Some("c"), Some("d")]),
            ),
            (
                "status",
                str_col(vec![
                    Some("active"),
                    Some("active"),
                    Some("active"),
                    Some("active"),
                ]),
            ),
            (
                "value",
                int_col(vec![Some(10), Some(20), Some(30), Some(40)]),
            ),
        ]);

        let flags = flags_for(&table);
        assert!(flags.has_constant_columns);
        assert_eq!(flags.constant_columns_count, 1);
        assert_eq!(flags.constant_columns_list, vec!["status".to_string()]);
    }

    #[test]
    fn test_two_distinct_values_not_constant() {
        let table = make_table(vec![(
            "value",
            int_col(vec![Some(10), Some(20), Some(10), Some(20)]),
        )]);

        let flags = flags_for(&table);
        assert!(!flags.has_constant_columns);
        assert_eq!(flags.constant_columns_count, 0);
        assert!(flags.constant_columns_list.is_empty());
    }

    #[test]
    fn test_fully_missing_column_is_constant() {
        let table = make_table(vec![("ghost", int_col(vec![None, None, None]))]);

        let flags = flags_for(&table);
        assert!(flags.has_constant_columns);
        assert_eq!(flags.constant_columns_list, vec!["ghost".to_string()]);
    }

    #[test]
    fn test_suspicious_id_duplicates() {
        let table = make_table(vec![
            (
                "user_id",
                int_col(vec![Some(101), Some(102), Some(103), Some(101), Some(105)]),
            ),
            (
                "transaction_id",
                str_col(vec![
                    Some("tx1"),
                    Some("tx2"),
                    Some("tx3"),
                    Some("tx4"),
                    Some("tx5"),
                ]),
            ),
            (
                "value",
                int_col(vec![Some(100), Some(200), Some(300), Some(400), Some(500)]),
            ),
        ]);

        let flags = flags_for(&table);
        assert!(flags.has_suspicious_id_duplicates);

        let stats = flags.duplicates_for("user_id").expect("user_id stats");
        assert_eq!(stats.duplicate_count, 1);
        assert!((stats.duplicate_share - 0.2).abs() < f64::EPSILON);

        // unique candidate is not suspicious
        assert!(flags.duplicates_for("transaction_id").is_none());
    }

    #[test]
    fn test_unique_ids_not_suspicious() {
        let table = make_table(vec![
            (
                "id",
                int_col(vec![Some(1), Some(2), Some(3), Some(4), Some(5)]),
            ),
            (
                "uuid",
                str_col(vec![Some("a"), Some("b"), Some("c"), Some("d"), Some("e")]),
            ),
        ]);

        let flags = flags_for(&table);
        assert!(!flags.has_suspicious_id_duplicates);
        assert!(flags.suspicious_duplicates.is_empty());
    }

    #[test]
    fn test_non_candidates_never_evaluated() {
        // "city" has duplicates but is neither id-named nor near-unique
        let table = make_table(vec![(
            "city",
            str_col(vec![Some("A"), Some("B"), Some("A"), Some("B"), Some("A")]),
        )]);

        let flags = flags_for(&table);
        assert!(!flags.has_suspicious_id_duplicates);
    }

    #[test]
    fn test_empty_table_defaults() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, true),
            Field::new("name", DataType::Utf8, true),
        ]));
        let table = Table::empty(schema);

        let flags = flags_for(&table);
        assert!(flags.too_few_rows);
        assert!(!flags.too_many_columns);
        assert!(flags.max_missing_share.abs() < f64::EPSILON);
        assert!(!flags.too_many_missing);
        assert!(!flags.has_constant_columns);
        assert_eq!(flags.constant_columns_count, 0);
        assert!(!flags.has_suspicious_id_duplicates);
        assert!(flags.quality_score.is_finite());
        assert!((0.0..=1.0).contains(&flags.quality_score));
    }

    #[test]
    fn test_score_clean_table() {
        assert!((score_from_signals(false, false, 0.0, 0, None) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_each_defect_lowers() {
        let clean = score_from_signals(false, false, 0.0, 0, None);

        assert!(score_from_signals(true, false, 0.0, 0, None) < clean);
        assert!(score_from_signals(false, true, 0.0, 0, None) < clean);
        assert!(score_from_signals(false, false, 0.3, 0, None) < clean);
        assert!(score_from_signals(false, false, 0.0, 1, None) < clean);
        assert!(score_from_signals(false, false, 0.0, 0, Some(0.2)) < clean);
    }

    #[test]
    fn test_score_monotone_in_severity() {
        assert!(
            score_from_signals(false, false, 0.2, 0, None)
                > score_from_signals(false, false, 0.8, 0, None)
        );
        assert!(
            score_from_signals(false, false, 0.0, 1, None)
                > score_from_signals(false, false, 0.0, 3, None)
        );
        assert!(
            score_from_signals(false, false, 0.0, 0, Some(0.1))
                > score_from_signals(false, false, 0.0, 0, Some(0.9))
        );
    }

    #[test]
    fn test_score_clamped() {
        let worst = score_from_signals(true, true, 1.0, 100, Some(1.0));
        assert!((0.0..=1.0).contains(&worst));

        let best = score_from_signals(false, false, -0.5, 0, None);
        assert!((0.0..=1.0).contains(&best));
    }

    #[test]
    fn test_flags_ordering_good_vs_bad() {
        let good = make_table(vec![
            ("id", int_col(vec![Some(1), Some(2), Some(3), Some(4)])),
            (
                "name",
                str_col(vec![Some("A"), Some("B"), Some("C"), Some("D")]),
            ),
            (
                "value",
                int_col(vec![Some(10), Some(20), Some(30), Some(40)]),
            ),
        ]);

        let bad = make_table(vec![
            ("user_id", int_col(vec![Some(1), Some(2), Some(1), Some(3)])),
            (
                "status",
                str_col(vec![Some("X"), Some("X"), Some("X"), Some("X")]),
            ),
            ("value", int_col(vec![Some(10), None, Some(30), Some(40)])),
        ]);

        let good_flags = flags_for(&good);
        let bad_flags = flags_for(&bad);

        assert!(good_flags.quality_score > bad_flags.quality_score);
        assert!((0.0..=1.0).contains(&good_flags.quality_score));
        assert!((0.0..=1.0).contains(&bad_flags.quality_score));
    }
}
