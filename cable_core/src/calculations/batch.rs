//! # Batch Sizing
//!
//! Sizes an ordered list of cable rows. Each row is independent: output
//! position `i` always corresponds to input position `i`, and a row that
//! cannot be sized becomes a rejection entry without affecting its
//! neighbours.
//!
//! ## Defaults
//!
//! Batch rows leave most fields optional. Absent values are filled by an
//! explicit default-application step ([`BulkCableInput::resolve`]) using
//! [`SizingDefaults`]; a value that is present, even `0`, is kept.
//!
//! | Field | Default |
//! |-------|---------|
//! | `cable_number` | `""` |
//! | `pf`, `eff` | 1.0 |
//! | `mv_per_a_m` | 0.44 |
//! | `derating_factors` (absent or empty) | `[1.0]` |
//! | `csa_options` | none: selected size reported as 0 |
//! | `sc_current` | 0 A |
//! | `sc_time` | 1 s |
//! | `k_const` | 115 |

use serde::{Deserialize, Serialize};
use tracing::info;

use super::cable::{
    size, CableInput, CableResult, StartMethod, DEFAULT_EFF, DEFAULT_K_CONST, DEFAULT_MV_PER_A_M, DEFAULT_PF,
    DEFAULT_SC_TIME_S,
};
use crate::equations::EquationTracker;
use crate::errors::{CalcError, CalcResult};

/// Default values applied to absent batch fields.
///
/// Stored in a schedule's settings and loadable from a TOML file.
///
/// ## TOML Example
///
/// ```toml
/// pf = 0.85
/// eff = 0.92
/// k_const = 143.0
/// csa_options = [1.5, 2.5, 4, 6, 10, 16, 25]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingDefaults {
    /// Power factor
    pub pf: f64,
    /// Efficiency
    pub eff: f64,
    /// Voltage-drop coefficient (mV/A/m)
    pub mv_per_a_m: f64,
    /// Fault current (A)
    pub sc_current: f64,
    /// Fault clearing time (s)
    pub sc_time: f64,
    /// Material constant k
    pub k_const: f64,
    /// Derating factors for rows without any
    pub derating_factors: Vec<f64>,
    /// Candidate sizes for rows without any (empty: no selection)
    pub csa_options: Vec<f64>,
}

impl Default for SizingDefaults {
    fn default() -> Self {
        SizingDefaults {
            pf: DEFAULT_PF,
            eff: DEFAULT_EFF,
            mv_per_a_m: DEFAULT_MV_PER_A_M,
            sc_current: 0.0,
            sc_time: DEFAULT_SC_TIME_S,
            k_const: DEFAULT_K_CONST,
            derating_factors: vec![1.0],
            csa_options: Vec::new(),
        }
    }
}

/// One row of a batch request. Only `voltage` and `length` are required.
///
/// ## JSON Example
///
/// ```json
/// { "cable_number": "FDR-12", "from_equipment": "MCC-1", "to_equipment": "P-101",
///   "load_kw": 30.0, "voltage": 400.0, "length": 80.0, "derating_factors": [0.87, 0.9] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkCableInput {
    #[serde(default)]
    pub cable_number: Option<String>,
    /// Source equipment tag (schedule metadata)
    #[serde(default)]
    pub from_equipment: Option<String>,
    /// Destination equipment tag (schedule metadata)
    #[serde(default)]
    pub to_equipment: Option<String>,
    #[serde(default)]
    pub load_kw: Option<f64>,
    #[serde(default)]
    pub load_kva: Option<f64>,
    #[serde(default)]
    pub current: Option<f64>,
    pub voltage: f64,
    #[serde(default)]
    pub pf: Option<f64>,
    #[serde(default)]
    pub eff: Option<f64>,
    pub length: f64,
    #[serde(default)]
    pub mv_per_a_m: Option<f64>,
    #[serde(default)]
    pub r_ohm_per_km: Option<f64>,
    #[serde(default)]
    pub x_ohm_per_km: Option<f64>,
    #[serde(default)]
    pub derating_factors: Option<Vec<f64>>,
    #[serde(default)]
    pub csa_options: Option<Vec<f64>>,
    #[serde(default)]
    pub sc_current: Option<f64>,
    #[serde(default)]
    pub sc_time: Option<f64>,
    #[serde(default)]
    pub k_const: Option<f64>,
    #[serde(default)]
    pub motor_start_method: Option<StartMethod>,
}

impl BulkCableInput {
    /// Row with only the required fields set
    pub fn new(cable_number: impl Into<String>, voltage: f64, length: f64) -> Self {
        BulkCableInput {
            cable_number: Some(cable_number.into()),
            voltage,
            length,
            ..Default::default()
        }
    }

    /// Cable number, or `""` when absent
    pub fn label(&self) -> &str {
        self.cable_number.as_deref().unwrap_or("")
    }

    /// Apply defaults to every absent field.
    pub fn resolve(&self, defaults: &SizingDefaults) -> CableInput {
        let derating_factors = match &self.derating_factors {
            Some(factors) if !factors.is_empty() => factors.clone(),
            _ if !defaults.derating_factors.is_empty() => defaults.derating_factors.clone(),
            _ => vec![1.0],
        };

        CableInput {
            cable_number: self.label().to_string(),
            load_kw: self.load_kw,
            load_kva: self.load_kva,
            current: self.current,
            voltage: self.voltage,
            pf: self.pf.unwrap_or(defaults.pf),
            eff: self.eff.unwrap_or(defaults.eff),
            length: self.length,
            mv_per_a_m: self.mv_per_a_m.unwrap_or(defaults.mv_per_a_m),
            r_ohm_per_km: self.r_ohm_per_km,
            x_ohm_per_km: self.x_ohm_per_km,
            derating_factors,
            csa_options: self
                .csa_options
                .clone()
                .unwrap_or_else(|| defaults.csa_options.clone()),
            sc_current: self.sc_current.unwrap_or(defaults.sc_current),
            sc_time: self.sc_time.unwrap_or(defaults.sc_time),
            k_const: self.k_const.unwrap_or(defaults.k_const),
            motor_start_method: self.motor_start_method.clone().unwrap_or_default(),
        }
    }
}

/// Outcome for one batch row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchRowResult {
    /// Row was sized (compliant or not)
    Sized(CableResult),
    /// Row values could not be sized (e.g., zero voltage)
    Rejected {
        row_index: usize,
        cable_number: String,
        error: CalcError,
    },
}

impl BatchRowResult {
    /// Sizing result, if the row was sized
    pub fn result(&self) -> Option<&CableResult> {
        match self {
            BatchRowResult::Sized(result) => Some(result),
            BatchRowResult::Rejected { .. } => None,
        }
    }

    pub fn cable_number(&self) -> &str {
        match self {
            BatchRowResult::Sized(result) => &result.cable_number,
            BatchRowResult::Rejected { cable_number, .. } => cable_number,
        }
    }
}

/// Counts over a batch outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub sized: usize,
    pub rejected: usize,
    /// Sized rows where every check passes
    pub passing: usize,
    /// Sized rows where no candidate met the derated current
    pub undersized: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[BatchRowResult]) -> Self {
        let mut summary = BatchSummary {
            total: results.len(),
            ..Default::default()
        };
        for row in results {
            match row.result() {
                Some(result) => {
                    summary.sized += 1;
                    if result.passes() {
                        summary.passing += 1;
                    }
                    if result.undersized {
                        summary.undersized += 1;
                    }
                }
                None => summary.rejected += 1,
            }
        }
        summary
    }
}

/// Size one resolved batch row.
fn size_row(row: &BulkCableInput, defaults: &SizingDefaults, tracker: &mut EquationTracker) -> CalcResult<CableResult> {
    let input = row.resolve(defaults);
    input.validate_values()?;
    size(&input, tracker)
}

/// Size every row independently, preserving order and length.
///
/// # Example
///
/// ```rust
/// use cable_core::calculations::batch::{calculate_batch, BulkCableInput, SizingDefaults};
///
/// let mut row = BulkCableInput::new("C-1", 400.0, 30.0);
/// row.current = Some(20.0);
/// row.csa_options = Some(vec![2.5, 4.0, 25.0]);
///
/// let results = calculate_batch(&[row, BulkCableInput::new("C-2", 0.0, 10.0)], &SizingDefaults::default());
/// assert_eq!(results.len(), 2);
/// assert_eq!(results[0].result().unwrap().selected_csa, 25.0);
/// assert!(results[1].result().is_none());
/// ```
pub fn calculate_batch(rows: &[BulkCableInput], defaults: &SizingDefaults) -> Vec<BatchRowResult> {
    let mut tracker = EquationTracker::new();
    calculate_batch_traced(rows, defaults, &mut tracker)
}

/// Size every row, recording which equations were applied.
pub fn calculate_batch_traced(
    rows: &[BulkCableInput],
    defaults: &SizingDefaults,
    tracker: &mut EquationTracker,
) -> Vec<BatchRowResult> {
    let results: Vec<BatchRowResult> = rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| match size_row(row, defaults, tracker) {
            Ok(result) => BatchRowResult::Sized(result),
            Err(error) => BatchRowResult::Rejected {
                row_index,
                cable_number: row.label().to_string(),
                error,
            },
        })
        .collect();

    let summary = BatchSummary::from_results(&results);
    info!(
        total = summary.total,
        sized = summary.sized,
        rejected = summary.rejected,
        passing = summary.passing,
        undersized = summary.undersized,
        "batch sized"
    );

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw_row(cable: &str, load_kw: f64) -> BulkCableInput {
        let mut row = BulkCableInput::new(cable, 400.0, 50.0);
        row.load_kw = Some(load_kw);
        row.pf = Some(0.85);
        row.eff = Some(0.9);
        row.derating_factors = Some(vec![0.8]);
        row.csa_options = Some(vec![1.5, 2.5, 4.0, 6.0, 10.0, 16.0]);
        row.sc_current = Some(5000.0);
        row
    }

    #[test]
    fn test_order_and_length_preserved() {
        let rows = vec![
            kw_row("A", 18.5),
            BulkCableInput::new("B", 400.0, 10.0),
            kw_row("C", 1.0),
        ];
        let results = calculate_batch(&rows, &SizingDefaults::default());
        assert_eq!(results.len(), 3);
        let numbers: Vec<&str> = results.iter().map(|r| r.cable_number()).collect();
        assert_eq!(numbers, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_matches_single_cable_path() {
        let results = calculate_batch(&[kw_row("A", 18.5)], &SizingDefaults::default());
        let result = results[0].result().unwrap();
        assert_eq!(result.flc, 34.91);
        assert_eq!(result.derated_current, 43.63);
        assert_eq!(result.selected_csa, 16.0);
        assert!(!result.sc_ok);
        assert!(result.vdrop_ok);
    }

    #[test]
    fn test_absent_fields_defaulted() {
        // Only the required fields: no load, no derating, no candidates
        let row = BulkCableInput::new("B", 400.0, 10.0);
        let input = row.resolve(&SizingDefaults::default());
        assert_eq!(input.derating_factors, vec![1.0]);
        assert_eq!(input.k_const, 115.0);
        assert_eq!(input.sc_time, 1.0);
        assert_eq!(input.pf, 1.0);
        assert!(input.csa_options.is_empty());

        let results = calculate_batch(&[row], &SizingDefaults::default());
        let result = results[0].result().unwrap();
        assert_eq!(result.flc, 0.0);
        assert_eq!(result.selected_csa, 0.0);
        assert!(result.undersized);
        // 0 A fault needs 0 mm², so 0 mm² is sufficient
        assert!(result.sc_ok);
    }

    #[test]
    fn test_empty_derating_list_defaulted() {
        let mut row = kw_row("A", 18.5);
        row.derating_factors = Some(vec![]);
        let input = row.resolve(&SizingDefaults::default());
        assert_eq!(input.derating_factors, vec![1.0]);
    }

    #[test]
    fn test_explicit_zero_not_replaced_by_default() {
        let mut row = kw_row("A", 18.5);
        row.pf = Some(0.0);
        let input = row.resolve(&SizingDefaults::default());
        assert_eq!(input.pf, 0.0);

        let results = calculate_batch(&[row], &SizingDefaults::default());
        assert!(matches!(
            &results[0],
            BatchRowResult::Rejected { row_index: 0, error: CalcError::InvalidInput { .. }, .. }
        ));
    }

    #[test]
    fn test_custom_defaults() {
        let defaults = SizingDefaults {
            csa_options: vec![10.0, 25.0, 50.0],
            k_const: 143.0,
            ..Default::default()
        };
        let mut row = BulkCableInput::new("D", 400.0, 20.0);
        row.current = Some(20.0);
        let results = calculate_batch(&[row], &defaults);
        let result = results[0].result().unwrap();
        assert_eq!(result.selected_csa, 25.0);
    }

    #[test]
    fn test_rejected_row_isolated() {
        let rows = vec![kw_row("A", 18.5), BulkCableInput::new("BAD", 0.0, 10.0), kw_row("C", 1.0)];
        let results = calculate_batch(&rows, &SizingDefaults::default());

        assert!(results[0].result().is_some());
        assert!(results[2].result().is_some());
        match &results[1] {
            BatchRowResult::Rejected { row_index, cable_number, error } => {
                assert_eq!(*row_index, 1);
                assert_eq!(cable_number, "BAD");
                assert_eq!(error.error_code(), "INVALID_INPUT");
            }
            other => panic!("expected rejection, got {:?}", other),
        }

        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.sized, 2);
        assert_eq!(summary.rejected, 1);
    }

    #[test]
    fn test_batch_json_shape() {
        let json = r#"[
            { "cable_number": "X1", "load_kva": 50, "voltage": 400, "length": 25, "csa_options": [16, 25] },
            { "voltage": 400, "length": 5 }
        ]"#;
        let rows: Vec<BulkCableInput> = serde_json::from_str(json).unwrap();
        let results = calculate_batch(&rows, &SizingDefaults::default());
        let value = serde_json::to_value(&results).unwrap();
        assert_eq!(value[0]["status"], "sized");
        // 72.17 A exceeds both candidates, so the largest is used
        assert_eq!(value[0]["selected_csa"], 25.0);
        assert_eq!(value[0]["undersized"], true);
        assert_eq!(value[1]["cable_number"], "");
    }

    #[test]
    fn test_unknown_start_method_does_not_fail_batch() {
        let json = r#"[
            { "cable_number": "M1", "current": 10, "voltage": 400, "length": 10, "motor_start_method": "soft_starter" },
            { "cable_number": "M2", "current": 10, "voltage": 400, "length": 10, "motor_start_method": "star_delta" }
        ]"#;
        let rows: Vec<BulkCableInput> = serde_json::from_str(json).unwrap();
        let results = calculate_batch(&rows, &SizingDefaults::default());

        let first = results[0].result().unwrap();
        assert_eq!(first.motor_start_method, StartMethod::Other("soft_starter".into()));
        assert_eq!(results[1].result().unwrap().motor_start_method, StartMethod::StarDelta);
    }

    #[test]
    fn test_partial_defaults_fill_remaining() {
        let defaults: SizingDefaults = serde_json::from_str(r#"{ "pf": 0.85 }"#).unwrap();
        assert_eq!(defaults.pf, 0.85);
        assert_eq!(defaults.sc_time, 1.0);
        assert_eq!(defaults.derating_factors, vec![1.0]);
    }
}
