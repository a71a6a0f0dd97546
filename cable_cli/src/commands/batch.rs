use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use cable_core::calculations::{calculate_batch, BatchSummary, SizingDefaults};
use cable_core::catalog::{match_rows, CableCatalog, CatalogMatchPerRow, MatchRow};
use cable_core::{export, file_io};

use crate::cli::OutputFormat;

pub fn handle_batch(
    rows_path: &Path,
    defaults: &SizingDefaults,
    catalog: &CableCatalog,
    catalog_sizes: bool,
    csv_out: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let rows = file_io::load_rows(rows_path).with_context(|| format!("loading rows {}", rows_path.display()))?;

    let mut defaults = defaults.clone();
    if catalog_sizes && defaults.csa_options.is_empty() {
        defaults.csa_options = catalog.csa_options();
    }

    let results = calculate_batch(&rows, &defaults);

    if let Some(out) = csv_out {
        let csv = export::rows_to_csv(&rows, &results)?;
        file_io::write_atomic(out, csv.as_bytes()).with_context(|| format!("writing {}", out.display()))?;
    }

    match format {
        OutputFormat::Json => super::print_json(&results)?,
        OutputFormat::Table => {
            super::print_results_table(&results);
            let summary = BatchSummary::from_results(&results);
            println!();
            println!(
                "{} rows: {} sized ({} passing, {} undersized), {} rejected",
                summary.total, summary.sized, summary.passing, summary.undersized, summary.rejected
            );
        }
    }
    Ok(())
}

pub fn handle_match(rows_path: &Path, catalog: &CableCatalog, top: usize, format: OutputFormat) -> Result<()> {
    let text = fs::read_to_string(rows_path).with_context(|| format!("reading {}", rows_path.display()))?;
    let rows: Vec<MatchRow> =
        serde_json::from_str(&text).with_context(|| format!("parsing match rows {}", rows_path.display()))?;

    let matches = match_rows(catalog, &rows, top);

    match format {
        OutputFormat::Json => super::print_json(&matches),
        OutputFormat::Table => {
            print_matches(&matches);
            Ok(())
        }
    }
}

fn print_matches(matches: &[CatalogMatchPerRow]) {
    for row in matches {
        let label = if row.cable_number.is_empty() {
            format!("row {}", row.row_index + 1)
        } else {
            row.cable_number.clone()
        };
        println!("{}:", label);
        if row.suggestions.is_empty() {
            println!("  (no criteria)");
        }
        for s in &row.suggestions {
            println!(
                "  {:>6.4}  {:<16} {:>6} A  {} mV/A/m",
                s.score, s.entry.description, s.entry.current_rating, s.entry.vd_mv_per_am
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cable_core::catalog::builtin_catalog;

    const ROWS: &str = r#"[
        { "cable_number": "F-1", "current": 40, "voltage": 400, "length": 30 },
        { "cable_number": "BAD", "current": 10, "voltage": 0, "length": 5 }
    ]"#;

    #[test]
    fn test_batch_with_catalog_sizes_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let rows = dir.path().join("rows.json");
        let out = dir.path().join("sized.csv");
        fs::write(&rows, ROWS).unwrap();

        handle_batch(
            &rows,
            &SizingDefaults::default(),
            &builtin_catalog(),
            true,
            Some(&out),
            OutputFormat::Table,
        )
        .unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Cable No,"));
        // 40 A against the catalog sizes picks 50 mm²
        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(fields[0], "F-1");
        assert_eq!(fields[8], "50.0");
        assert!(lines[2].starts_with("BAD,"));
    }

    #[test]
    fn test_batch_without_catalog_sizes_is_undersized() {
        let dir = tempfile::tempdir().unwrap();
        let rows = dir.path().join("rows.json");
        let out = dir.path().join("sized.csv");
        fs::write(&rows, ROWS).unwrap();

        handle_batch(
            &rows,
            &SizingDefaults::default(),
            &builtin_catalog(),
            false,
            Some(&out),
            OutputFormat::Json,
        )
        .unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let fields: Vec<&str> = text.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(fields[8], "0.0");
    }

    #[test]
    fn test_batch_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = handle_batch(
            &dir.path().join("nope.json"),
            &SizingDefaults::default(),
            &builtin_catalog(),
            false,
            None,
            OutputFormat::Table,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_match_rows_file() {
        let dir = tempfile::tempdir().unwrap();
        let rows = dir.path().join("match.json");
        fs::write(
            &rows,
            r#"[ { "cable_number": "M-1", "csa": 16 }, { "current": 43.63, "description": "CU" }, {} ]"#,
        )
        .unwrap();

        handle_match(&rows, &builtin_catalog(), 3, OutputFormat::Table).unwrap();
        handle_match(&rows, &builtin_catalog(), 1, OutputFormat::Json).unwrap();
    }

    #[test]
    fn test_match_rejects_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let rows = dir.path().join("match.json");
        fs::write(&rows, r#"{ "csa": 16 }"#).unwrap();
        assert!(handle_match(&rows, &builtin_catalog(), 3, OutputFormat::Table).is_err());
    }
}
