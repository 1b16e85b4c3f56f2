//! catar CLI - Tabular Dataset Quality Triage
//!
//! Command-line interface for catar analyses.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::uninlined_format_args)]

use std::{path::PathBuf, process::ExitCode};

use arrow::util::pretty::print_batches;
use catar::{
    compute_quality_flags_with, correlation_matrix, flatten_summary_for_print, missing_table,
    summarize_dataset, top_categories, QualityConfig, QualityFlags, Table,
};
use clap::{Parser, Subcommand};

/// catar - Tabular Dataset Quality Triage in Pure Rust
#[derive(Parser)]
#[command(name = "catar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the per-column structural summary
    Summary {
        /// Path to dataset file
        path: PathBuf,
    },
    /// Display per-column missing-value counts and shares
    Missing {
        /// Path to dataset file
        path: PathBuf,
    },
    /// Evaluate heuristic quality flags and the composite score
    Quality {
        /// Path to dataset file
        path: PathBuf,
        /// Minimum viable row count
        #[arg(long, default_value = "5")]
        min_rows: usize,
        /// Column ceiling before the table counts as too wide
        #[arg(long, default_value = "50")]
        max_columns: usize,
        /// Worst tolerated per-column missing share
        #[arg(long, default_value = "0.5")]
        missing_threshold: f64,
        /// Substring marking a column name as an identifier
        #[arg(long, default_value = "id")]
        id_pattern: String,
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Display the numeric correlation matrix
    Corr {
        /// Path to dataset file
        path: PathBuf,
    },
    /// Display top values of categorical columns
    Categories {
        /// Path to dataset file
        path: PathBuf,
        /// Maximum number of categorical columns to cover
        #[arg(long, default_value = "5")]
        max_columns: usize,
        /// Rows to keep per column
        #[arg(long, default_value = "10")]
        top_k: usize,
    },
    /// Write the full quality report as JSON
    Report {
        /// Path to dataset file
        path: PathBuf,
        /// Maximum number of categorical columns to cover
        #[arg(long, default_value = "5")]
        max_columns: usize,
        /// Rows to keep per top-category table
        #[arg(long, default_value = "10")]
        top_k: usize,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Summary { path } => cmd_summary(&path),
        Commands::Missing { path } => cmd_missing(&path),
        Commands::Quality {
            path,
            min_rows,
            max_columns,
            missing_threshold,
            id_pattern,
            format,
        } => cmd_quality(
            &path,
            min_rows,
            max_columns,
            missing_threshold,
            &id_pattern,
            &format,
        ),
        Commands::Corr { path } => cmd_corr(&path),
        Commands::Categories {
            path,
            max_columns,
            top_k,
        } => cmd_categories(&path, max_columns, top_k),
        Commands::Report {
            path,
            max_columns,
            top_k,
            output,
        } => cmd_report(&path, max_columns, top_k, output.as_ref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_table(path: &PathBuf) -> catar::Result<Table> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        "parquet" => Table::from_parquet(path),
        "csv" => Table::from_csv(path),
        "json" | "jsonl" => Table::from_json(path),
        ext => Err(catar::Error::unsupported_format(ext)),
    }
}

fn cmd_summary(path: &PathBuf) -> catar::Result<()> {
    let table = load_table(path)?;
    let summary = summarize_dataset(&table)?;

    println!("Dataset Summary");
    println!("===============");
    println!("File: {}", path.display());
    println!("Rows: {}", summary.n_rows);
    println!("Columns: {}", summary.n_cols);
    println!();

    let flat = flatten_summary_for_print(&summary)?;
    print_batches(&[flat])?;

    Ok(())
}

fn cmd_missing(path: &PathBuf) -> catar::Result<()> {
    let table = load_table(path)?;
    let report = missing_table(&table)?;

    println!("Missing Values");
    println!("==============");
    println!("{:<24} {:<12} {:<10}", "COLUMN", "MISSING", "SHARE %");
    println!("{}", "-".repeat(48));

    for entry in report.iter() {
        println!(
            "{:<24} {:<12} {:<10.2}",
            entry.name,
            entry.missing_count,
            entry.missing_share * 100.0
        );
    }

    Ok(())
}

fn cmd_quality(
    path: &PathBuf,
    min_rows: usize,
    max_columns: usize,
    missing_threshold: f64,
    id_pattern: &str,
    format: &str,
) -> catar::Result<()> {
    let table = load_table(path)?;
    let summary = summarize_dataset(&table)?;
    let missing = missing_table(&table)?;

    let config = QualityConfig::new()
        .with_min_rows(min_rows)
        .with_max_columns(max_columns)
        .with_max_missing_share(missing_threshold)
        .with_id_name_pattern(id_pattern);

    let flags = compute_quality_flags_with(&table, &summary, &missing, &config);

    match format {
        "json" => {
            let json = flags_to_json(path, &table, &flags);
            println!(
                "{}",
                serde_json::to_string_pretty(&json)
                    .map_err(|e| catar::Error::InvalidFormat(e.to_string()))?
            );
        }
        "text" => {
            println!("Data Quality Report");
            println!("===================");
            println!("File: {}", path.display());
            println!("Rows: {}", table.n_rows());
            println!("Columns: {}", table.n_cols());
            println!();
            println!("Quality Score: {:.2}", flags.quality_score);
            println!();

            println!("Flags:");
            println!("  too_few_rows:       {}", flags.too_few_rows);
            println!("  too_many_columns:   {}", flags.too_many_columns);
            println!("  max_missing_share:  {:.3}", flags.max_missing_share);
            println!("  too_many_missing:   {}", flags.too_many_missing);
            println!(
                "  constant_columns:   {} {:?}",
                flags.constant_columns_count, flags.constant_columns_list
            );

            if flags.has_suspicious_id_duplicates {
                println!("  suspicious id duplicates:");
                for (name, stats) in &flags.suspicious_duplicates {
                    println!(
                        "    {:<20} {} duplicates ({:.1}%)",
                        name,
                        stats.duplicate_count,
                        stats.duplicate_share * 100.0
                    );
                }
            } else {
                println!("  suspicious id duplicates: none");
            }
        }
        other => return Err(catar::Error::InvalidFormat(other.to_string())),
    }

    Ok(())
}

fn cmd_corr(path: &PathBuf) -> catar::Result<()> {
    let table = load_table(path)?;
    let corr = correlation_matrix(&table)?;

    println!("Correlation Matrix");
    println!("==================");

    if corr.is_empty() {
        println!("(no numeric columns)");
        return Ok(());
    }

    print!("{:<16}", "");
    for name in corr.columns() {
        print!("{:>12}", truncate(name, 12));
    }
    println!();

    for (row_name, row) in corr.columns().iter().zip(corr.values()) {
        print!("{:<16}", truncate(row_name, 16));
        for cell in row {
            match cell {
                Some(r) => print!("{:>12.3}", r),
                None => print!("{:>12}", "-"),
            }
        }
        println!();
    }

    Ok(())
}

fn cmd_categories(path: &PathBuf, max_columns: usize, top_k: usize) -> catar::Result<()> {
    let table = load_table(path)?;
    let top = top_categories(&table, max_columns, top_k)?;

    println!("Top Categories");
    println!("==============");

    if top.is_empty() {
        println!("(no categorical columns)");
        return Ok(());
    }

    for entry in top.iter() {
        println!();
        println!("{}", entry.name);
        println!("{}", "-".repeat(entry.name.len()));
        for vc in &entry.values {
            println!("  {:<24} {}", vc.value, vc.count);
        }
    }

    Ok(())
}

fn cmd_report(
    path: &PathBuf,
    max_columns: usize,
    top_k: usize,
    output: Option<&PathBuf>,
) -> catar::Result<()> {
    let table = load_table(path)?;
    let summary = summarize_dataset(&table)?;
    let missing = missing_table(&table)?;
    let flags = compute_quality_flags_with(&table, &summary, &missing, &QualityConfig::default());
    let corr = correlation_matrix(&table)?;
    let top = top_categories(&table, max_columns, top_k)?;

    let json = serde_json::json!({
        "path": path.display().to_string(),
        "n_rows": summary.n_rows,
        "n_cols": summary.n_cols,
        "summary": summary.columns.iter().map(|c| {
            serde_json::json!({
                "name": c.name,
                "dtype": c.dtype.to_string(),
                "missing_count": c.missing_count,
                "distinct_count": c.distinct_count,
                "min": c.numeric.as_ref().map(|n| n.min),
                "max": c.numeric.as_ref().map(|n| n.max),
                "mean": c.numeric.as_ref().map(|n| n.mean),
                "top_value": c.top_value,
            })
        }).collect::<Vec<_>>(),
        "missing": missing.iter().map(|e| {
            serde_json::json!({
                "column": e.name,
                "missing_count": e.missing_count,
                "missing_share": e.missing_share,
            })
        }).collect::<Vec<_>>(),
        "quality": flags_to_json(path, &table, &flags),
        "correlation": {
            "columns": corr.columns(),
            "values": corr.values(),
        },
        "top_categories": top.iter().map(|entry| {
            serde_json::json!({
                "column": entry.name,
                "values": entry.values.iter().map(|vc| {
                    serde_json::json!({"value": vc.value, "count": vc.count})
                }).collect::<Vec<_>>(),
            })
        }).collect::<Vec<_>>(),
    });

    let json_str = serde_json::to_string_pretty(&json)
        .map_err(|e| catar::Error::InvalidFormat(e.to_string()))?;

    if let Some(output_path) = output {
        std::fs::write(output_path, &json_str).map_err(|e| catar::Error::io(e, output_path))?;
        println!("Quality report written to: {}", output_path.display());
    } else {
        println!("{}", json_str);
    }

    Ok(())
}

fn flags_to_json(path: &PathBuf, table: &Table, flags: &QualityFlags) -> serde_json::Value {
    serde_json::json!({
        "path": path.display().to_string(),
        "rows": table.n_rows(),
        "columns": table.n_cols(),
        "too_few_rows": flags.too_few_rows,
        "too_many_columns": flags.too_many_columns,
        "max_missing_share": flags.max_missing_share,
        "too_many_missing": flags.too_many_missing,
        "has_constant_columns": flags.has_constant_columns,
        "constant_columns_count": flags.constant_columns_count,
        "constant_columns_list": flags.constant_columns_list,
        "has_suspicious_id_duplicates": flags.has_suspicious_id_duplicates,
        "suspicious_duplicates": flags.suspicious_duplicates.iter().map(|(name, stats)| {
            serde_json::json!({
                "column": name,
                "duplicate_count": stats.duplicate_count,
                "duplicate_share": stats.duplicate_share,
            })
        }).collect::<Vec<_>>(),
        "quality_score": flags.quality_score,
    })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
