//! # Sizing Schedule
//!
//! A `SizingSchedule` is the document an engineer works on: an ordered list
//! of cable rows plus the defaults used to size them and the set of cables
//! that have been reviewed and approved. Schedules serialize to
//! human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! SizingSchedule
//! ├── meta: ScheduleMetadata (version, engineer, job info, timestamps)
//! ├── settings: ScheduleSettings (reference standard, sizing defaults)
//! ├── rows: Vec<ScheduleRow> (ordered cable rows, each with a UUID)
//! └── approved: BTreeSet<String> (approved cable numbers)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cable_core::schedule::SizingSchedule;
//! use cable_core::calculations::BulkCableInput;
//!
//! let mut schedule = SizingSchedule::new("Jane Engineer", "25-042", "ACME Corp");
//!
//! let mut row = BulkCableInput::new("FDR-01", 400.0, 40.0);
//! row.load_kw = Some(15.0);
//! schedule.add_row(row);
//!
//! let results = schedule.size_all();
//! assert_eq!(results.len(), 1);
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{calculate_batch_traced, BatchRowResult, BulkCableInput, SizingDefaults};
use crate::equations::EquationTracker;
use crate::errors::{CalcError, CalcResult};

/// Current schema version for schedule files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root schedule container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingSchedule {
    /// Schedule metadata (version, engineer, job info)
    pub meta: ScheduleMetadata,

    /// Reference standard and sizing defaults
    pub settings: ScheduleSettings,

    /// Cable rows in schedule order
    pub rows: Vec<ScheduleRow>,

    /// Cable numbers signed off by the engineer
    #[serde(default)]
    pub approved: BTreeSet<String>,
}

/// One row of the schedule with its stable identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub id: Uuid,
    #[serde(flatten)]
    pub input: BulkCableInput,
}

impl SizingSchedule {
    /// Create a new empty schedule.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cable_core::schedule::SizingSchedule;
    ///
    /// let schedule = SizingSchedule::new("John Doe", "25-001", "Client Corp");
    /// assert_eq!(schedule.meta.engineer, "John Doe");
    /// assert_eq!(schedule.row_count(), 0);
    /// ```
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        SizingSchedule {
            meta: ScheduleMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: ScheduleSettings::default(),
            rows: Vec::new(),
            approved: BTreeSet::new(),
        }
    }

    /// Append a row. Returns the UUID assigned to it.
    pub fn add_row(&mut self, input: BulkCableInput) -> Uuid {
        let id = Uuid::new_v4();
        self.rows.push(ScheduleRow { id, input });
        self.touch();
        id
    }

    /// Remove a row by UUID.
    ///
    /// The approval for its cable number is dropped once no remaining row
    /// carries that number.
    pub fn remove_row(&mut self, id: &Uuid) -> Option<BulkCableInput> {
        let pos = self.rows.iter().position(|r| r.id == *id)?;
        let removed = self.rows.remove(pos).input;
        if self.find_cable(removed.label()).is_none() {
            self.approved.remove(removed.label());
        }
        self.touch();
        Some(removed)
    }

    pub fn get_row(&self, id: &Uuid) -> Option<&BulkCableInput> {
        self.rows.iter().find(|r| r.id == *id).map(|r| &r.input)
    }

    /// First row with the given cable number
    pub fn find_cable(&self, cable_number: &str) -> Option<&ScheduleRow> {
        self.rows.iter().find(|r| r.input.label() == cable_number)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Mark a cable as approved.
    ///
    /// Fails if no row carries that cable number.
    pub fn approve(&mut self, cable_number: &str) -> CalcResult<()> {
        if self.find_cable(cable_number).is_none() {
            return Err(CalcError::invalid_input(
                "cable_number",
                cable_number,
                "No row with this cable number in the schedule",
            ));
        }
        if self.approved.insert(cable_number.to_string()) {
            self.touch();
        }
        Ok(())
    }

    /// Withdraw an approval. Returns whether the cable was approved.
    pub fn unapprove(&mut self, cable_number: &str) -> bool {
        let removed = self.approved.remove(cable_number);
        if removed {
            self.touch();
        }
        removed
    }

    pub fn is_approved(&self, cable_number: &str) -> bool {
        self.approved.contains(cable_number)
    }

    /// Input rows in schedule order
    pub fn inputs(&self) -> Vec<BulkCableInput> {
        self.rows.iter().map(|r| r.input.clone()).collect()
    }

    /// Size every row with the schedule's defaults.
    pub fn size_all(&self) -> Vec<BatchRowResult> {
        let mut tracker = EquationTracker::new();
        self.size_all_traced(&mut tracker)
    }

    /// Size every row, recording which equations were applied.
    pub fn size_all_traced(&self, tracker: &mut EquationTracker) -> Vec<BatchRowResult> {
        calculate_batch_traced(&self.inputs(), &self.settings.defaults, tracker)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

impl Default for SizingSchedule {
    fn default() -> Self {
        SizingSchedule::new("", "", "")
    }
}

/// Schedule metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    pub client: String,

    /// When the schedule was created
    pub created: DateTime<Utc>,

    /// When the schedule was last modified
    pub modified: DateTime<Utc>,
}

/// Schedule-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// Wiring standard the schedule is checked against (shown on reports)
    pub standard: String,

    /// Defaults applied to absent row fields
    #[serde(default)]
    pub defaults: SizingDefaults,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        ScheduleSettings {
            standard: "IEC 60364-5-52".to_string(),
            defaults: SizingDefaults::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feeder(cable: &str, kw: f64) -> BulkCableInput {
        let mut row = BulkCableInput::new(cable, 400.0, 50.0);
        row.load_kw = Some(kw);
        row.csa_options = Some(vec![2.5, 4.0, 6.0, 10.0, 16.0, 25.0]);
        row
    }

    #[test]
    fn test_schedule_creation() {
        let schedule = SizingSchedule::new("John Doe", "25-001", "Acme Corp");
        assert_eq!(schedule.meta.engineer, "John Doe");
        assert_eq!(schedule.meta.job_id, "25-001");
        assert_eq!(schedule.meta.version, SCHEMA_VERSION);
        assert_eq!(schedule.settings.defaults, SizingDefaults::default());
    }

    #[test]
    fn test_rows_keep_order() {
        let mut schedule = SizingSchedule::default();
        schedule.add_row(feeder("C", 1.0));
        let id = schedule.add_row(feeder("A", 2.0));
        schedule.add_row(feeder("B", 3.0));

        let labels: Vec<String> = schedule.inputs().iter().map(|r| r.label().to_string()).collect();
        assert_eq!(labels, vec!["C", "A", "B"]);

        assert_eq!(schedule.get_row(&id).unwrap().load_kw, Some(2.0));
        let removed = schedule.remove_row(&id).unwrap();
        assert_eq!(removed.label(), "A");
        assert_eq!(schedule.row_count(), 2);
        assert!(schedule.remove_row(&id).is_none());
    }

    #[test]
    fn test_approval() {
        let mut schedule = SizingSchedule::default();
        let id = schedule.add_row(feeder("FDR-1", 10.0));

        schedule.approve("FDR-1").unwrap();
        assert!(schedule.is_approved("FDR-1"));
        assert!(schedule.approve("NOPE").is_err());

        assert!(schedule.unapprove("FDR-1"));
        assert!(!schedule.unapprove("FDR-1"));

        schedule.approve("FDR-1").unwrap();
        schedule.remove_row(&id);
        assert!(!schedule.is_approved("FDR-1"));
    }

    #[test]
    fn test_removing_duplicate_keeps_approval() {
        let mut schedule = SizingSchedule::default();
        let first = schedule.add_row(feeder("F-1", 10.0));
        let second = schedule.add_row(feeder("F-1", 12.0));
        schedule.approve("F-1").unwrap();

        schedule.remove_row(&first);
        assert_eq!(schedule.row_count(), 1);
        assert!(schedule.find_cable("F-1").is_some());
        assert!(schedule.is_approved("F-1"));

        schedule.remove_row(&second);
        assert!(!schedule.is_approved("F-1"));
    }

    #[test]
    fn test_size_all_uses_schedule_defaults() {
        let mut schedule = SizingSchedule::default();
        let mut row = BulkCableInput::new("P-1", 400.0, 20.0);
        row.current = Some(30.0);
        schedule.add_row(row);
        schedule.settings.defaults.csa_options = vec![4.0, 35.0];

        let results = schedule.size_all();
        assert_eq!(results[0].result().unwrap().selected_csa, 35.0);
    }

    #[test]
    fn test_schedule_serialization() {
        let mut schedule = SizingSchedule::new("Jane Engineer", "25-042", "Test Client");
        schedule.add_row(feeder("FDR-9", 7.5));
        schedule.approve("FDR-9").unwrap();

        let json = serde_json::to_string_pretty(&schedule).unwrap();
        assert!(json.contains("Jane Engineer"));
        assert!(json.contains("IEC 60364-5-52"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        // Row fields sit next to the id
        assert_eq!(value["rows"][0]["cable_number"], "FDR-9");
        assert_eq!(value["approved"][0], "FDR-9");

        let roundtrip: SizingSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, schedule);
    }
}
