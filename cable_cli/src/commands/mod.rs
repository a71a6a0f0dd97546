pub mod batch;
pub mod catalog;
pub mod schedule;
pub mod size;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use cable_core::calculations::{BatchRowResult, SizingDefaults};
use cable_core::catalog::{builtin_catalog, CableCatalog};
use cable_core::file_io;

/// Catalog from `--catalog`, or the built-in table.
pub fn load_catalog(path: Option<&Path>) -> Result<CableCatalog> {
    match path {
        Some(path) => file_io::load_catalog(path).with_context(|| format!("loading catalog {}", path.display())),
        None => Ok(builtin_catalog()),
    }
}

/// Defaults from a `--defaults` TOML file, or the built-in values.
pub fn load_defaults(path: Option<&Path>) -> Result<SizingDefaults> {
    let Some(path) = path else {
        return Ok(SizingDefaults::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading defaults {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing defaults {}", path.display()))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_results_table(results: &[BatchRowResult]) {
    println!(
        "{:<14} {:>9} {:>10} {:>8} {:>9} {:>9} {:<6} {:<6} {:<4}",
        "Cable", "FLC A", "Derated A", "CSA", "Vdrop %", "SC mm²", "Vdrop", "SC", "Cat"
    );
    for row in results {
        match row {
            BatchRowResult::Sized(r) => {
                let undersized = if r.undersized { " (undersized)" } else { "" };
                println!(
                    "{:<14} {:>9.2} {:>10.2} {:>8} {:>9.3} {:>9.2} {:<6} {:<6} {:<4}{}",
                    r.cable_number,
                    r.flc,
                    r.derated_current,
                    r.selected_csa,
                    r.vdrop_percent,
                    r.sc_required_area,
                    ok(r.vdrop_ok),
                    ok(r.sc_ok),
                    r.voltage_category.label(),
                    undersized,
                );
            }
            BatchRowResult::Rejected { cable_number, error, .. } => {
                println!("{:<14} rejected: {}", cable_number, error);
            }
        }
    }
}

fn ok(flag: bool) -> &'static str {
    if flag {
        "OK"
    } else {
        "FAIL"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defaults.toml");
        fs::write(&path, "pf = 0.85\nk_const = 143.0\ncsa_options = [2.5, 4.0, 6.0]\n").unwrap();

        let defaults = load_defaults(Some(&path)).unwrap();
        assert_eq!(defaults.pf, 0.85);
        assert_eq!(defaults.k_const, 143.0);
        assert_eq!(defaults.csa_options, vec![2.5, 4.0, 6.0]);
        assert_eq!(defaults.eff, 1.0);
    }

    #[test]
    fn test_load_defaults_absent() {
        assert_eq!(load_defaults(None).unwrap(), SizingDefaults::default());
    }

    #[test]
    fn test_load_catalog_builtin() {
        assert_eq!(load_catalog(None).unwrap().len(), 15);
    }
}
