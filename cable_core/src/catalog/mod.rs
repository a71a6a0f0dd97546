//! # Cable Catalog
//!
//! Reference table of cable sizes with their ratings. A [`CableCatalog`] is
//! built once (from the built-in table, a JSON file or a CSV file) and then
//! passed by shared reference to whatever needs lookup, filtering or
//! matching. It is never mutated after construction.
//!
//! ## Example
//!
//! ```rust
//! use cable_core::catalog::{builtin_catalog, CatalogQuery};
//!
//! let catalog = builtin_catalog();
//! let entry = catalog.lookup(16.0).unwrap();
//! assert_eq!(entry.current_rating, 76.0);
//!
//! let query = CatalogQuery { min_current_rating: Some(100.0), max_csa: Some(50.0), ..Default::default() };
//! let sizes: Vec<f64> = catalog.filter(&query).iter().map(|e| e.csa).collect();
//! assert_eq!(sizes, vec![25.0, 35.0, 50.0]);
//! ```

pub mod builtin;
pub mod matching;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};

pub use builtin::builtin_catalog;
pub use matching::{match_rows, CatalogMatchPerRow, CatalogMatchSuggestion, MatchRow};

/// Sizes closer than this are the same catalog row.
const CSA_TOLERANCE: f64 = 1e-9;

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Conductor cross-sectional area (mm²)
    pub csa: f64,
    /// Free-text description, e.g. "16 mm² Cu"
    pub description: String,
    /// Continuous current rating (A)
    pub current_rating: f64,
    /// Voltage-drop coefficient (mV/A/m)
    pub vd_mv_per_am: f64,
    /// Short-circuit rating (A)
    pub sc_rating: f64,
    /// Outer diameter (mm)
    pub od_mm: f64,
}

impl CatalogEntry {
    fn validate(&self) -> CalcResult<()> {
        require_positive("csa", self.csa)?;
        require_non_negative("current_rating", self.current_rating)?;
        require_non_negative("vd_mv_per_am", self.vd_mv_per_am)?;
        require_non_negative("sc_rating", self.sc_rating)?;
        require_non_negative("od_mm", self.od_mm)?;
        Ok(())
    }
}

/// Filter criteria. Every present criterion must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    pub min_csa: Option<f64>,
    pub max_csa: Option<f64>,
    pub min_current_rating: Option<f64>,
    /// Case-insensitive substring of the description
    pub search: Option<String>,
}

impl CatalogQuery {
    fn accepts(&self, entry: &CatalogEntry, search_lower: Option<&str>) -> bool {
        if self.min_csa.is_some_and(|min| entry.csa < min) {
            return false;
        }
        if self.max_csa.is_some_and(|max| entry.csa > max) {
            return false;
        }
        if self.min_current_rating.is_some_and(|min| entry.current_rating < min) {
            return false;
        }
        match search_lower {
            Some(needle) => entry.description.to_lowercase().contains(needle),
            None => true,
        }
    }
}

/// Read-only cable table, kept sorted by ascending CSA.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CableCatalog {
    entries: Vec<CatalogEntry>,
}

impl CableCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from rows, validating each one.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> CalcResult<Self> {
        let mut catalog = CableCatalog::new();
        for entry in entries {
            entry.validate()?;
            catalog.insert(entry);
        }
        Ok(catalog)
    }

    /// Load rows from a CSV file with a header row naming the entry fields.
    pub fn load_from_csv(path: impl AsRef<Path>) -> CalcResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| CalcError::file_error("open", &path_str, format!("Failed to open CSV: {}", e)))?;

        let mut entries = Vec::new();
        for (line, record) in reader.deserialize::<CatalogEntry>().enumerate() {
            let entry = record.map_err(|e| {
                CalcError::file_error("parse", &path_str, format!("Row {}: {}", line + 1, e))
            })?;
            entries.push(entry);
        }

        Self::from_entries(entries)
    }

    /// Insert a row, replacing any row with the same CSA.
    pub fn insert(&mut self, entry: CatalogEntry) {
        match self
            .entries
            .binary_search_by(|probe| probe.csa.total_cmp(&entry.csa))
        {
            Ok(pos) => self.entries[pos] = entry,
            Err(pos) => self.entries.insert(pos, entry),
        }
    }

    /// All rows in ascending CSA order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the row for an exact CSA.
    pub fn lookup(&self, csa: f64) -> CalcResult<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| (e.csa - csa).abs() < CSA_TOLERANCE)
            .ok_or_else(|| CalcError::catalog_entry_not_found(csa))
    }

    /// Rows satisfying every criterion in `query`, ascending by CSA.
    pub fn filter(&self, query: &CatalogQuery) -> Vec<&CatalogEntry> {
        let search_lower = query.search.as_ref().map(|s| s.to_lowercase());
        self.entries
            .iter()
            .filter(|e| query.accepts(e, search_lower.as_deref()))
            .collect()
    }

    /// Rows whose description contains `pattern` (case-insensitive)
    pub fn search(&self, pattern: &str) -> Vec<&CatalogEntry> {
        self.filter(&CatalogQuery {
            search: Some(pattern.to_string()),
            ..Default::default()
        })
    }

    /// Every CSA in the table, usable as a candidate list for sizing
    pub fn csa_options(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.csa).collect()
    }
}
