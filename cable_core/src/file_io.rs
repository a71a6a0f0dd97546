//! # File I/O Module
//!
//! Reads and writes the files the engine works with:
//! - **Schedules**: JSON, saved atomically (write `.tmp`, sync, re-read and
//!   verify, rename) and version-checked on load
//! - **Catalogs**: JSON array of entries or CSV with a header row
//! - **Batch rows**: JSON array of rows
//!
//! ## Example
//!
//! ```rust,no_run
//! use cable_core::file_io::{save_schedule, load_schedule};
//! use cable_core::schedule::SizingSchedule;
//! use std::path::Path;
//!
//! let schedule = SizingSchedule::new("Engineer", "25-001", "Client");
//! let path = Path::new("plant.schedule.json");
//!
//! save_schedule(&schedule, path)?;
//! let loaded = load_schedule(path)?;
//! assert_eq!(loaded.meta.job_id, "25-001");
//! # Ok::<(), cable_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::calculations::BulkCableInput;
use crate::catalog::{CableCatalog, CatalogEntry};
use crate::errors::{CalcError, CalcResult};
use crate::schedule::{SizingSchedule, SCHEMA_VERSION};

/// Save a schedule with atomic write semantics.
///
/// The save process:
/// 1. Serialize the schedule to JSON
/// 2. Write to a sibling temporary file and sync it to disk
/// 3. Read the temporary file back and check it parses
/// 4. Rename it over the destination
///
/// An interrupted save leaves the previous file intact.
pub fn save_schedule(schedule: &SizingSchedule, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(schedule).map_err(|e| CalcError::serialization(e.to_string()))?;

    let tmp_path = tmp_path_for(path);
    write_synced(&tmp_path, json.as_bytes())?;

    if let Err(e) = verify_schedule_file(&tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    info!(path = %path.display(), rows = schedule.row_count(), "schedule saved");
    Ok(())
}

/// Load a schedule from a file.
///
/// # Returns
///
/// * `Ok(SizingSchedule)` - Successfully loaded schedule
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_schedule(path: &Path) -> CalcResult<SizingSchedule> {
    let contents = read_file(path)?;

    let schedule: SizingSchedule = serde_json::from_str(&contents)
        .map_err(|e| CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(&schedule.meta.version)?;

    debug!(path = %path.display(), rows = schedule.row_count(), "schedule loaded");
    Ok(schedule)
}

/// Load a catalog file. `.csv` files are read as CSV, anything else as a
/// JSON array of entries.
pub fn load_catalog(path: &Path) -> CalcResult<CableCatalog> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let catalog = if is_csv {
        CableCatalog::load_from_csv(path)?
    } else {
        let contents = read_file(path)?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&contents)
            .map_err(|e| CalcError::serialization(format!("Invalid catalog in {}: {}", path.display(), e)))?;
        CableCatalog::from_entries(entries)?
    };

    debug!(path = %path.display(), entries = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// Load batch rows from a JSON array.
pub fn load_rows(path: &Path) -> CalcResult<Vec<BulkCableInput>> {
    let contents = read_file(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| CalcError::serialization(format!("Invalid rows in {}: {}", path.display(), e)))
}

/// Write bytes to `path` atomically (temporary file, sync, rename).
pub fn write_atomic(path: &Path, bytes: &[u8]) -> CalcResult<()> {
    let tmp_path = tmp_path_for(path);
    write_synced(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> CalcResult<()> {
    let mut file = File::create(path)
        .map_err(|e| CalcError::file_error("create temp file", path.display().to_string(), e.to_string()))?;

    file.write_all(bytes)
        .map_err(|e| CalcError::file_error("write temp file", path.display().to_string(), e.to_string()))?;

    file.sync_all()
        .map_err(|e| CalcError::file_error("sync temp file", path.display().to_string(), e.to_string()))
}

fn verify_schedule_file(path: &Path) -> CalcResult<()> {
    let contents = read_file(path)?;
    serde_json::from_str::<SizingSchedule>(&contents)
        .map(|_| ())
        .map_err(|e| CalcError::file_error("verify temp file", path.display().to_string(), e.to_string()))
}

fn read_file(path: &Path) -> CalcResult<String> {
    fs::read_to_string(path).map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))
}

/// Validate that a file version is compatible with the current schema.
///
/// Major versions must match; within 0.x a newer minor version is rejected.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    let (Some(file_major), Some(current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }

    if *current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}
