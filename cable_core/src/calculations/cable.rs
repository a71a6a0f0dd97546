//! # Single Cable Sizing
//!
//! Sizes one cable circuit: derives the full-load current, derates it,
//! computes the running voltage drop, selects a conductor size from the
//! candidate list and checks short-circuit withstand.
//!
//! ## Selection Policy
//!
//! 1. Base current: `current` if positive, else from kW if positive, else from kVA
//!    (an absent kVA gives 0 A, which is tolerated)
//! 2. Derate the base current to the design current
//! 3. Voltage drop uses the **base** current, not the derated current
//! 4. Select the smallest candidate ≥ the derated current; when none
//!    qualifies the largest candidate is used and the result is flagged
//!    undersized
//! 5. Short-circuit check against the selected size
//! 6. Voltage drop passes at ≤ 5 %
//! 7. Numbers are rounded for display after every comparison is made
//!
//! Selection compares the candidate size value directly with the derated
//! current in amperes. Callers wanting ampacity-based selection should pass
//! catalog ratings via [`CableCatalog`](crate::catalog::CableCatalog).
//!
//! ## Example
//!
//! ```rust
//! use cable_core::calculations::cable::{calculate, CableInput};
//!
//! let input = CableInput::from_kw("CBL-001", 18.5, 400.0, 50.0)
//!     .with_power_factor(0.85)
//!     .with_efficiency(0.9)
//!     .with_derating(vec![0.8])
//!     .with_csa_options(vec![1.5, 2.5, 4.0, 6.0, 10.0, 16.0])
//!     .with_short_circuit(5000.0, 1.0, 115.0);
//!
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.selected_csa, 16.0);
//! assert!(result.undersized);
//! assert!(!result.sc_ok);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::compliance::{ComplianceItem, ComplianceKind, VoltageCategory, VDROP_LIMIT_PERCENT};
use crate::equations::{
    derated_current, full_load_current_kva, full_load_current_kw, mv_per_a_m_from_impedance, round_to,
    short_circuit_check, voltage_drop_percent, Equation, EquationTracker,
};
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};

/// Default power factor when none is given
pub const DEFAULT_PF: f64 = 1.0;
/// Default efficiency when none is given
pub const DEFAULT_EFF: f64 = 1.0;
/// Default voltage-drop coefficient (mV/A/m)
pub const DEFAULT_MV_PER_A_M: f64 = 0.44;
/// Default fault clearing time (s)
pub const DEFAULT_SC_TIME_S: f64 = 1.0;
/// Default material constant k (PVC-insulated copper)
pub const DEFAULT_K_CONST: f64 = 115.0;

fn default_pf() -> f64 {
    DEFAULT_PF
}

fn default_eff() -> f64 {
    DEFAULT_EFF
}

fn default_mv_per_a_m() -> f64 {
    DEFAULT_MV_PER_A_M
}

fn default_sc_time() -> f64 {
    DEFAULT_SC_TIME_S
}

fn default_k_const() -> f64 {
    DEFAULT_K_CONST
}

/// Motor starting method. Carried through to the result; not used in any formula.
///
/// Tags outside the known set are kept verbatim in [`StartMethod::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StartMethod {
    /// Direct-on-line
    #[default]
    #[serde(rename = "DOL")]
    DirectOnLine,
    /// Star-delta starter
    #[serde(rename = "star_delta")]
    StarDelta,
    /// Variable frequency drive
    #[serde(rename = "VFD")]
    Vfd,
    /// Any other starter tag (soft starter, autotransformer, ...)
    #[serde(untagged)]
    Other(String),
}

impl StartMethod {
    /// Short label ("DOL", "star_delta", "VFD", or the tag as given)
    pub fn label(&self) -> &str {
        match self {
            StartMethod::DirectOnLine => "DOL",
            StartMethod::StarDelta => "star_delta",
            StartMethod::Vfd => "VFD",
            StartMethod::Other(tag) => tag,
        }
    }
}

/// Input parameters for one cable circuit.
///
/// Absent optional fields take their documented defaults during
/// deserialization; an explicit `0` is kept as `0` and validated.
///
/// ## JSON Example
///
/// ```json
/// {
///   "cable_number": "CBL-001",
///   "load_kw": 55.0,
///   "voltage": 415.0,
///   "pf": 0.85,
///   "eff": 0.95,
///   "length": 100.0,
///   "mv_per_a_m": 0.44,
///   "derating_factors": [1.0, 0.9],
///   "csa_options": [1.5, 2.5, 4, 6, 10, 16, 25, 35, 50, 70, 95, 120, 150, 185, 240],
///   "sc_current": 8000.0,
///   "sc_time": 1.0,
///   "k_const": 115.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableInput {
    /// Cable identifier (e.g., "CBL-001")
    pub cable_number: String,

    /// Active power in kW
    #[serde(default)]
    pub load_kw: Option<f64>,

    /// Apparent power in kVA
    #[serde(default)]
    pub load_kva: Option<f64>,

    /// Directly specified load current in A (takes precedence when positive)
    #[serde(default)]
    pub current: Option<f64>,

    /// Nominal line-to-line voltage in V
    pub voltage: f64,

    /// Power factor, (0, 1]
    #[serde(default = "default_pf")]
    pub pf: f64,

    /// Efficiency, (0, 1]
    #[serde(default = "default_eff")]
    pub eff: f64,

    /// Route length in metres
    pub length: f64,

    /// Lumped voltage-drop coefficient in mV/A/m
    #[serde(default = "default_mv_per_a_m")]
    pub mv_per_a_m: f64,

    /// Conductor resistance in Ω/km; when present it replaces `mv_per_a_m`
    #[serde(default)]
    pub r_ohm_per_km: Option<f64>,

    /// Conductor reactance in Ω/km (0 when absent)
    #[serde(default)]
    pub x_ohm_per_km: Option<f64>,

    /// Installation derating factors, applied multiplicatively
    pub derating_factors: Vec<f64>,

    /// Candidate conductor sizes in mm²
    pub csa_options: Vec<f64>,

    /// Prospective fault current in A
    #[serde(default)]
    pub sc_current: f64,

    /// Fault clearing time in s
    #[serde(default = "default_sc_time")]
    pub sc_time: f64,

    /// Conductor material constant k
    #[serde(default = "default_k_const")]
    pub k_const: f64,

    /// Motor starting method (informational)
    #[serde(default)]
    pub motor_start_method: StartMethod,
}

impl CableInput {
    fn base(cable_number: impl Into<String>, voltage: f64, length: f64) -> Self {
        CableInput {
            cable_number: cable_number.into(),
            load_kw: None,
            load_kva: None,
            current: None,
            voltage,
            pf: DEFAULT_PF,
            eff: DEFAULT_EFF,
            length,
            mv_per_a_m: DEFAULT_MV_PER_A_M,
            r_ohm_per_km: None,
            x_ohm_per_km: None,
            derating_factors: vec![1.0],
            csa_options: Vec::new(),
            sc_current: 0.0,
            sc_time: DEFAULT_SC_TIME_S,
            k_const: DEFAULT_K_CONST,
            motor_start_method: StartMethod::default(),
        }
    }

    /// Circuit described by active power (kW)
    pub fn from_kw(cable_number: impl Into<String>, load_kw: f64, voltage: f64, length: f64) -> Self {
        let mut input = Self::base(cable_number, voltage, length);
        input.load_kw = Some(load_kw);
        input
    }

    /// Circuit described by apparent power (kVA)
    pub fn from_kva(cable_number: impl Into<String>, load_kva: f64, voltage: f64, length: f64) -> Self {
        let mut input = Self::base(cable_number, voltage, length);
        input.load_kva = Some(load_kva);
        input
    }

    /// Circuit described by its load current (A)
    pub fn from_current(cable_number: impl Into<String>, current: f64, voltage: f64, length: f64) -> Self {
        let mut input = Self::base(cable_number, voltage, length);
        input.current = Some(current);
        input
    }

    pub fn with_power_factor(mut self, pf: f64) -> Self {
        self.pf = pf;
        self
    }

    pub fn with_efficiency(mut self, eff: f64) -> Self {
        self.eff = eff;
        self
    }

    pub fn with_mv_per_a_m(mut self, mv_per_a_m: f64) -> Self {
        self.mv_per_a_m = mv_per_a_m;
        self
    }

    /// Use conductor impedance instead of the lumped mV/A/m coefficient
    pub fn with_impedance(mut self, r_ohm_per_km: f64, x_ohm_per_km: f64) -> Self {
        self.r_ohm_per_km = Some(r_ohm_per_km);
        self.x_ohm_per_km = Some(x_ohm_per_km);
        self
    }

    pub fn with_derating(mut self, factors: Vec<f64>) -> Self {
        self.derating_factors = factors;
        self
    }

    pub fn with_csa_options(mut self, options: Vec<f64>) -> Self {
        self.csa_options = options;
        self
    }

    pub fn with_short_circuit(mut self, sc_current: f64, sc_time: f64, k_const: f64) -> Self {
        self.sc_current = sc_current;
        self.sc_time = sc_time;
        self.k_const = k_const;
        self
    }

    pub fn with_start_method(mut self, method: StartMethod) -> Self {
        self.motor_start_method = method;
        self
    }

    /// Validate every value for a single-cable request.
    ///
    /// Rejects empty derating and candidate lists on top of
    /// [`validate_values`](Self::validate_values).
    pub fn validate(&self) -> CalcResult<()> {
        if self.derating_factors.is_empty() {
            return Err(CalcError::missing_field("derating_factors"));
        }
        if self.csa_options.is_empty() {
            return Err(CalcError::missing_field("csa_options"));
        }
        self.validate_values()
    }

    /// Validate numeric values without requiring non-empty lists.
    ///
    /// Batch rows use this directly: an empty candidate list there means
    /// "no selection possible", not a malformed request.
    pub fn validate_values(&self) -> CalcResult<()> {
        require_positive("voltage", self.voltage)?;
        require_non_negative("length", self.length)?;
        require_unit_interval("pf", self.pf)?;
        require_unit_interval("eff", self.eff)?;
        require_non_negative("mv_per_a_m", self.mv_per_a_m)?;

        for (field, value) in [
            ("load_kw", self.load_kw),
            ("load_kva", self.load_kva),
            ("current", self.current),
            ("r_ohm_per_km", self.r_ohm_per_km),
            ("x_ohm_per_km", self.x_ohm_per_km),
        ] {
            if let Some(v) = value {
                require_non_negative(field, v)?;
            }
        }

        require_non_negative("sc_current", self.sc_current)?;
        require_non_negative("sc_time", self.sc_time)?;
        require_positive("k_const", self.k_const)?;

        for (i, factor) in self.derating_factors.iter().enumerate() {
            require_positive(&format!("derating_factors[{}]", i), *factor)?;
            if *factor > 1.0 {
                warn!(
                    cable = %self.cable_number,
                    factor,
                    "derating factor above 1.0 applied as given"
                );
            }
        }
        for (i, csa) in self.csa_options.iter().enumerate() {
            require_positive(&format!("csa_options[{}]", i), *csa)?;
        }
        Ok(())
    }

    /// Full-load (base) current per step 1 of the selection policy.
    pub fn base_current(&self, tracker: &mut EquationTracker) -> CalcResult<f64> {
        if let Some(current) = self.current.filter(|c| *c > 0.0) {
            return Ok(current);
        }
        if let Some(load_kw) = self.load_kw.filter(|p| *p > 0.0) {
            tracker.record_for_cable(Equation::FullLoadCurrentKw, "Base current from kW", &self.cable_number);
            return full_load_current_kw(load_kw, self.voltage, self.pf, self.eff);
        }
        tracker.record_for_cable(Equation::FullLoadCurrentKva, "Base current from kVA", &self.cable_number);
        full_load_current_kva(self.load_kva.unwrap_or(0.0), self.voltage)
    }

    /// Voltage-drop coefficient in mV/A/m: impedance-derived when a
    /// resistance is given, otherwise the lumped coefficient.
    pub fn effective_mv_per_a_m(&self, tracker: &mut EquationTracker) -> CalcResult<f64> {
        match self.r_ohm_per_km {
            Some(r) => {
                tracker.record_for_cable(
                    Equation::ImpedanceDropCoefficient,
                    "mV/A/m from conductor impedance",
                    &self.cable_number,
                );
                mv_per_a_m_from_impedance(r, self.x_ohm_per_km.unwrap_or(0.0), self.pf)
            }
            None => Ok(self.mv_per_a_m),
        }
    }
}

fn require_unit_interval(field: &str, value: f64) -> CalcResult<()> {
    require_positive(field, value)?;
    if value > 1.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Must be between 0 and 1"));
    }
    Ok(())
}

/// Outcome of conductor size selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CsaSelection {
    /// Selected conductor size (mm²)
    pub csa: f64,
    /// No candidate qualified and the largest one was used instead
    pub is_fallback: bool,
}

/// Select the smallest candidate ≥ `required`, falling back to the largest.
///
/// Returns `None` only for an empty candidate list.
///
/// ```rust
/// use cable_core::calculations::cable::select_csa;
///
/// let pick = select_csa(&[10.0, 1.5, 6.0, 2.5, 4.0], 5.0).unwrap();
/// assert_eq!(pick.csa, 6.0);
/// assert!(!pick.is_fallback);
/// ```
pub fn select_csa(candidates: &[f64], required: f64) -> Option<CsaSelection> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(f64::total_cmp);

    match sorted.iter().find(|&&csa| csa >= required) {
        Some(&csa) => Some(CsaSelection { csa, is_fallback: false }),
        None => sorted.last().map(|&csa| CsaSelection { csa, is_fallback: true }),
    }
}

/// Results from sizing one cable.
///
/// Currents and short-circuit area are rounded to 2 dp and the voltage drop
/// to 3 dp. The flags were decided on unrounded values.
///
/// ## JSON Example
///
/// ```json
/// {
///   "cable_number": "CBL-001",
///   "flc": 34.91,
///   "derated_current": 43.63,
///   "selected_csa": 16.0,
///   "vdrop_percent": 0.192,
///   "sc_required_area": 43.48,
///   "sc_ok": false,
///   "vdrop_ok": true,
///   "undersized": true,
///   "compliance": [],
///   "voltage_category": "LV",
///   "motor_start_method": "DOL"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableResult {
    /// Cable identifier echoed from the input
    pub cable_number: String,
    /// Full-load current (A)
    pub flc: f64,
    /// Derated design current (A)
    pub derated_current: f64,
    /// Selected conductor size (mm²); 0 when no candidates were given
    pub selected_csa: f64,
    /// Running voltage drop (%)
    pub vdrop_percent: f64,
    /// Minimum area for short-circuit withstand (mm²)
    pub sc_required_area: f64,
    /// Selected size withstands the fault
    pub sc_ok: bool,
    /// Voltage drop within the 5 % limit
    pub vdrop_ok: bool,
    /// No candidate met the derated current
    pub undersized: bool,
    /// Per-check detail entries
    #[serde(default)]
    pub compliance: Vec<ComplianceItem>,
    /// Voltage class of the circuit
    pub voltage_category: VoltageCategory,
    /// Starting method echoed from the input
    #[serde(default)]
    pub motor_start_method: StartMethod,
}

impl CableResult {
    /// Every check passes and the selection is not a fallback
    pub fn passes(&self) -> bool {
        self.sc_ok && self.vdrop_ok && !self.undersized
    }

    /// Kinds of the failing compliance entries
    pub fn failed_checks(&self) -> Vec<ComplianceKind> {
        self.compliance.iter().filter(|c| !c.ok).map(|c| c.kind).collect()
    }
}

/// Size one cable.
///
/// # Returns
///
/// * `Ok(CableResult)` - Sizing results, including non-compliant outcomes
/// * `Err(CalcError)` - If the input is malformed or hits a zero divisor
pub fn calculate(input: &CableInput) -> CalcResult<CableResult> {
    let mut tracker = EquationTracker::new();
    calculate_traced(input, &mut tracker)
}

/// Size one cable, recording which equations were applied.
pub fn calculate_traced(input: &CableInput, tracker: &mut EquationTracker) -> CalcResult<CableResult> {
    input.validate()?;
    size(input, tracker)
}

/// Core sizing sequence. Expects [`CableInput::validate_values`] to have passed.
pub(crate) fn size(input: &CableInput, tracker: &mut EquationTracker) -> CalcResult<CableResult> {
    let cable = input.cable_number.as_str();

    let flc = input.base_current(tracker)?;

    tracker.record_for_cable(Equation::DeratedCurrent, "Design current", cable);
    let derated = derated_current(flc, &input.derating_factors)?;

    let mv_per_a_m = input.effective_mv_per_a_m(tracker)?;
    tracker.record_for_cable(Equation::VoltageDropPercent, "Running voltage drop", cable);
    let vdrop = voltage_drop_percent(flc, input.length, mv_per_a_m, input.voltage)?;

    // Finite inputs can still overflow
    require_non_negative("flc", flc)?;
    require_non_negative("derated_current", derated)?;
    require_non_negative("vdrop_percent", vdrop)?;

    let selection = select_csa(&input.csa_options, derated);
    let selected_csa = selection.map(|s| s.csa).unwrap_or(0.0);
    let undersized = selection.map(|s| s.is_fallback).unwrap_or(true);
    if undersized {
        warn!(
            cable,
            derated_current = derated,
            selected_csa,
            "no candidate size meets the derated current"
        );
    }

    tracker.record_for_cable(Equation::ShortCircuitMinimumArea, "Fault withstand", cable);
    let sc = short_circuit_check(input.sc_current, input.sc_time, input.k_const, selected_csa)?;
    require_non_negative("sc_required_area", sc.required_area)?;

    let vdrop_ok = vdrop <= VDROP_LIMIT_PERCENT;

    let compliance = vec![
        ComplianceItem::upper_bound(
            ComplianceKind::VoltageDropRunning,
            vdrop_ok,
            VDROP_LIMIT_PERCENT,
            vdrop,
            format!(
                "Running voltage drop {:.3}% at {:.2} A over {} m (limit {:.1}%)",
                vdrop, flc, input.length, VDROP_LIMIT_PERCENT
            ),
        ),
        ComplianceItem::upper_bound(
            ComplianceKind::ShortCircuit,
            sc.is_sufficient,
            selected_csa,
            sc.required_area,
            format!(
                "{:.2} mm² required for {:.0} A over {} s (k = {})",
                sc.required_area, input.sc_current, input.sc_time, input.k_const
            ),
        ),
        ComplianceItem::upper_bound(
            ComplianceKind::Derating,
            !undersized,
            selected_csa,
            derated,
            if selection.is_none() {
                "No candidate sizes supplied".to_string()
            } else if undersized {
                format!(
                    "No candidate reaches {:.2}; largest option {} mm² used",
                    derated, selected_csa
                )
            } else {
                format!("{} mm² selected for {:.2} A derated", selected_csa, derated)
            },
        ),
    ];

    debug!(
        cable,
        flc,
        derated_current = derated,
        selected_csa,
        vdrop_percent = vdrop,
        sc_required_area = sc.required_area,
        "sized cable"
    );

    Ok(CableResult {
        cable_number: input.cable_number.clone(),
        flc: round_to(flc, 2),
        derated_current: round_to(derated, 2),
        selected_csa,
        vdrop_percent: round_to(vdrop, 3),
        sc_required_area: round_to(sc.required_area, 2),
        sc_ok: sc.is_sufficient,
        vdrop_ok,
        undersized,
        compliance,
        voltage_category: VoltageCategory::from_voltage(input.voltage),
        motor_start_method: input.motor_start_method.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motor_feeder() -> CableInput {
        CableInput::from_kw("CBL-001", 18.5, 400.0, 50.0)
            .with_power_factor(0.85)
            .with_efficiency(0.9)
            .with_derating(vec![0.8])
            .with_csa_options(vec![1.5, 2.5, 4.0, 6.0, 10.0, 16.0])
            .with_short_circuit(5000.0, 1.0, 115.0)
    }

    #[test]
    fn test_select_first_qualifying() {
        let pick = select_csa(&[1.5, 2.5, 4.0, 6.0, 10.0], 5.0).unwrap();
        assert_eq!(pick, CsaSelection { csa: 6.0, is_fallback: false });
    }

    #[test]
    fn test_select_exact_match() {
        let pick = select_csa(&[4.0, 6.0], 6.0).unwrap();
        assert_eq!(pick.csa, 6.0);
        assert!(!pick.is_fallback);
    }

    #[test]
    fn test_select_fallback() {
        let pick = select_csa(&[1.5, 2.5], 50.0).unwrap();
        assert_eq!(pick, CsaSelection { csa: 2.5, is_fallback: true });
        assert!(select_csa(&[], 1.0).is_none());
    }

    #[test]
    fn test_end_to_end_motor_feeder() {
        let result = calculate(&motor_feeder()).unwrap();

        // 18.5 kW / (√3 × 400 × 0.85 × 0.9) = 34.905 A
        assert_eq!(result.flc, 34.91);
        // 34.905 / 0.8 = 43.631 A
        assert_eq!(result.derated_current, 43.63);
        // 43.63 exceeds every candidate, so the largest is used
        assert_eq!(result.selected_csa, 16.0);
        assert!(result.undersized);
        // Voltage drop on base current: 34.905 × 50 × 0.44 / 400000 × 100
        assert_eq!(result.vdrop_percent, 0.192);
        assert!(result.vdrop_ok);
        // 5000 × √1 / 115 = 43.48 mm²
        assert_eq!(result.sc_required_area, 43.48);
        assert!(!result.sc_ok);
        assert!(!result.passes());
        assert_eq!(
            result.failed_checks(),
            vec![ComplianceKind::ShortCircuit, ComplianceKind::Derating]
        );
        assert_eq!(result.voltage_category, VoltageCategory::Low);
    }

    #[test]
    fn test_fallback_flags_undersizing() {
        let input = CableInput::from_current("C-2", 50.0, 400.0, 20.0)
            .with_csa_options(vec![1.5, 2.5])
            .with_short_circuit(1000.0, 1.0, 115.0);
        let result = calculate(&input).unwrap();
        assert_eq!(result.selected_csa, 2.5);
        assert!(result.undersized);
        // 1000 / 115 = 8.70 mm² > 2.5 mm²
        assert!(!result.sc_ok);
    }

    #[test]
    fn test_direct_current_takes_precedence() {
        let mut input = motor_feeder();
        input.current = Some(5.0);
        input.derating_factors = vec![1.0];
        let result = calculate(&input).unwrap();
        assert_eq!(result.flc, 5.0);
        assert_eq!(result.selected_csa, 6.0);
        assert!(!result.undersized);
    }

    #[test]
    fn test_zero_current_falls_through_to_kw() {
        let mut input = motor_feeder();
        input.current = Some(0.0);
        let result = calculate(&input).unwrap();
        assert_eq!(result.flc, 34.91);
    }

    #[test]
    fn test_kva_and_absent_load() {
        let input = CableInput::from_kva("C-3", 100.0, 400.0, 10.0)
            .with_csa_options(vec![150.0, 185.0]);
        let result = calculate(&input).unwrap();
        assert_eq!(result.flc, 144.34);
        assert_eq!(result.selected_csa, 150.0);

        // No load given at all: zero current is tolerated
        let mut input = input;
        input.load_kva = None;
        let result = calculate(&input).unwrap();
        assert_eq!(result.flc, 0.0);
        assert_eq!(result.selected_csa, 150.0);
        assert_eq!(result.vdrop_percent, 0.0);
    }

    #[test]
    fn test_voltage_drop_uses_base_current() {
        let input = CableInput::from_current("C-4", 100.0, 400.0, 50.0)
            .with_derating(vec![0.5])
            .with_csa_options(vec![240.0]);
        let result = calculate(&input).unwrap();
        assert_eq!(result.derated_current, 200.0);
        // Computed against 100 A, not 200 A
        assert_eq!(result.vdrop_percent, 0.55);
    }

    #[test]
    fn test_vdrop_limit_boundary() {
        // 100 A × 100 m × 2.0 mV / 400 V = 5.0 % exactly
        let input = CableInput::from_current("C-5", 100.0, 400.0, 100.0)
            .with_mv_per_a_m(2.0)
            .with_csa_options(vec![120.0]);
        let result = calculate(&input).unwrap();
        assert_eq!(result.vdrop_percent, 5.0);
        assert!(result.vdrop_ok);
    }

    #[test]
    fn test_impedance_replaces_lumped_coefficient() {
        let input = CableInput::from_current("C-6", 100.0, 400.0, 50.0)
            .with_power_factor(1.0)
            .with_mv_per_a_m(99.0)
            .with_impedance(0.5, 0.08)
            .with_csa_options(vec![120.0]);
        let mut tracker = EquationTracker::new();
        let result = calculate_traced(&input, &mut tracker).unwrap();
        // √3 × 0.5 = 0.866 mV/A/m → 100 × 50 × 0.866 / 400000 × 100
        assert_eq!(result.vdrop_percent, 1.083);
        assert!(tracker.unique_equations().contains(&Equation::ImpedanceDropCoefficient));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mut input = motor_feeder();
        input.voltage = 0.0;
        assert!(matches!(calculate(&input), Err(CalcError::InvalidInput { .. })));

        let mut input = motor_feeder();
        input.k_const = 0.0;
        assert!(calculate(&input).is_err());

        let mut input = motor_feeder();
        input.pf = 1.2;
        assert!(calculate(&input).is_err());

        let mut input = motor_feeder();
        input.csa_options.clear();
        assert!(matches!(calculate(&input), Err(CalcError::MissingField { .. })));

        let mut input = motor_feeder();
        input.derating_factors.clear();
        assert!(matches!(calculate(&input), Err(CalcError::MissingField { .. })));
    }

    #[test]
    fn test_json_defaults_applied() {
        let json = r#"{
            "cable_number": "CBL-009",
            "load_kw": 55.0,
            "voltage": 415.0,
            "pf": 0.85,
            "eff": 0.95,
            "length": 100.0,
            "derating_factors": [1.0, 0.9],
            "csa_options": [1.5, 2.5, 4, 6, 10, 16, 25, 35, 50, 70, 95, 120, 150, 185, 240],
            "sc_current": 8000.0
        }"#;
        let input: CableInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.k_const, 115.0);
        assert_eq!(input.sc_time, 1.0);
        assert_eq!(input.mv_per_a_m, 0.44);
        assert_eq!(input.motor_start_method, StartMethod::DirectOnLine);

        let result = calculate(&input).unwrap();
        // 55 kW / (√3 × 415 × 0.85 × 0.95) = 94.76 A; / 0.9 = 105.29 A
        assert_eq!(result.flc, 94.76);
        assert_eq!(result.derated_current, 105.29);
        assert_eq!(result.selected_csa, 120.0);
        // 8000 / 115 = 69.57 mm² ≤ 120 mm²
        assert!(result.sc_ok);
        assert_eq!(result.vdrop_percent, 1.005);
        assert!(result.passes());
    }

    #[test]
    fn test_vdrop_flag_decided_before_rounding() {
        // 100 A × 100 m × 2.00008 mV / 400 V = 5.0002 %, displayed as 5.0
        let input = CableInput::from_current("C-5b", 100.0, 400.0, 100.0)
            .with_mv_per_a_m(2.00008)
            .with_csa_options(vec![120.0]);
        let result = calculate(&input).unwrap();
        assert_eq!(result.vdrop_percent, 5.0);
        assert!(!result.vdrop_ok);
        assert_eq!(result.failed_checks(), vec![ComplianceKind::VoltageDropRunning]);
    }

    #[test]
    fn test_overflowing_load_rejected() {
        let input = CableInput::from_kw("C-HUGE", 1e308, 400.0, 10.0).with_csa_options(vec![240.0]);
        match calculate(&input) {
            Err(CalcError::InvalidInput { field, .. }) => assert_eq!(field, "flc"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_start_method_is_echoed() {
        let json = r#"{ "cable_number": "M-7", "current": 10.0, "voltage": 400.0, "length": 10.0,
                        "derating_factors": [1.0], "csa_options": [2.5, 16.0],
                        "motor_start_method": "soft_starter" }"#;
        let input: CableInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.motor_start_method, StartMethod::Other("soft_starter".into()));

        let result = calculate(&input).unwrap();
        assert_eq!(result.motor_start_method.label(), "soft_starter");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["motor_start_method"], "soft_starter");

        let known: StartMethod = serde_json::from_str(r#""VFD""#).unwrap();
        assert_eq!(known, StartMethod::Vfd);
    }

    #[test]
    fn test_missing_voltage_is_shape_error() {
        let json = r#"{ "cable_number": "X", "length": 10.0, "derating_factors": [1.0], "csa_options": [1.5] }"#;
        assert!(serde_json::from_str::<CableInput>(json).is_err());
    }
}
