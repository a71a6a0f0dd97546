//! Built-in copper cable table (1.5 mm² to 240 mm²).

use super::{CableCatalog, CatalogEntry};

/// Catalog with the common copper sizes pre-loaded.
///
/// Usable without any catalog file.
pub fn builtin_catalog() -> CableCatalog {
    let mut catalog = CableCatalog::new();

    // (csa mm², current rating A, mV/A/m, sc rating A, outer diameter mm)
    let copper = [
        (1.5, 17.0, 1.44, 1_500.0, 5.5),
        (2.5, 24.0, 0.87, 2_500.0, 6.3),
        (4.0, 32.0, 0.54, 4_000.0, 7.4),
        (6.0, 41.0, 0.36, 6_000.0, 8.3),
        (10.0, 57.0, 0.23, 10_000.0, 10.0),
        (16.0, 76.0, 0.14, 16_000.0, 11.8),
        (25.0, 106.0, 0.092, 25_000.0, 13.9),
        (35.0, 138.0, 0.066, 35_000.0, 16.0),
        (50.0, 173.0, 0.047, 50_000.0, 18.3),
        (70.0, 221.0, 0.034, 70_000.0, 21.2),
        (95.0, 269.0, 0.025, 95_000.0, 24.5),
        (120.0, 308.0, 0.019, 120_000.0, 27.2),
        (150.0, 354.0, 0.0153, 150_000.0, 30.0),
        (185.0, 397.0, 0.0125, 185_000.0, 33.0),
        (240.0, 470.0, 0.0099, 240_000.0, 37.5),
    ];

    for (csa, current_rating, vd_mv_per_am, sc_rating, od_mm) in copper {
        catalog.insert(CatalogEntry {
            csa,
            description: format!("{} mm² Cu", csa),
            current_rating,
            vd_mv_per_am,
            sc_rating,
            od_mm,
        });
    }

    catalog
}
