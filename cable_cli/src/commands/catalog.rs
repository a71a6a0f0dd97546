use anyhow::Result;

use cable_core::catalog::{CableCatalog, CatalogQuery};

use crate::cli::OutputFormat;

pub fn handle(catalog: &CableCatalog, query: &CatalogQuery, format: OutputFormat) -> Result<()> {
    let entries = catalog.filter(query);

    match format {
        OutputFormat::Json => super::print_json(&entries),
        OutputFormat::Table => {
            println!(
                "{:>8} {:<18} {:>10} {:>10} {:>10} {:>8}",
                "CSA mm²", "Description", "Rating A", "mV/A/m", "SC A", "OD mm"
            );
            for e in &entries {
                println!(
                    "{:>8} {:<18} {:>10} {:>10} {:>10} {:>8}",
                    e.csa, e.description, e.current_rating, e.vd_mv_per_am, e.sc_rating, e.od_mm
                );
            }
            println!("{} of {} entries", entries.len(), catalog.len());
            Ok(())
        }
    }
}
