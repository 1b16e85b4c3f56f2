//! catar - Tabular Dataset Quality Triage in Pure Rust
//!
//! Assesses the quality of an in-memory table: structural summaries
//! per column, missing-value reports, heuristic quality flags with a
//! composite score, numeric correlation matrices and top-value tables
//! for categorical columns.
//!
//! # Design Principles
//!
//! 1. **Pure core** - every analysis is a pure function of the table;
//!    nothing caches, nothing mutates the input
//! 2. **Degenerate input is not an error** - zero rows, zero columns
//!    and all-missing columns produce well-defined defaults
//! 3. **Ecosystem aligned** - Arrow 53, Parquet 53; the missing marker
//!    is the Arrow null
//!
//! # Quick Start
//!
//! ```no_run
//! use catar::{compute_quality_flags, missing_table, summarize_dataset, Table};
//!
//! let table = Table::from_csv("data/users.csv").unwrap();
//!
//! let summary = summarize_dataset(&table).unwrap();
//! let missing = missing_table(&table).unwrap();
//! let flags = compute_quality_flags(&table, &summary, &missing);
//!
//! println!("quality score: {:.2}", flags.quality_score);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_lossless,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::unreadable_literal
    )
)]
// Allow some pedantic lints for cleaner code
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::map_unwrap_or)]

pub mod categories;
pub mod correlation;
pub mod error;
pub mod missing;
pub mod profile;
pub mod quality;
pub mod table;

// Re-exports for convenience
// Re-export arrow types commonly needed
pub use arrow::{
    array::RecordBatch,
    datatypes::{Schema, SchemaRef},
};
pub use categories::{top_categories, TopCategories, TopValues, ValueCount};
pub use correlation::{correlation_matrix, CorrelationMatrix};
pub use error::{Error, Result};
pub use missing::{missing_table, MissingEntry, MissingReport};
pub use profile::{
    flatten_summary_for_print, summarize_dataset, ColumnSummary, DatasetSummary, Dtype,
    NumericSummary,
};
pub use quality::{
    compute_quality_flags, compute_quality_flags_with, score_from_signals, DuplicateStats,
    QualityConfig, QualityFlags,
};
pub use table::{CsvOptions, Table};
