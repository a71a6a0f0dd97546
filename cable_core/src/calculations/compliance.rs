//! # Compliance Details
//!
//! Per-check detail entries attached to every [`CableResult`](super::CableResult),
//! plus the voltage-category label. These drive pass/fail badges in a review
//! front end; the boolean flags on the result remain the primary answer.

use serde::{Deserialize, Serialize};

use crate::equations::round_to;

/// Fixed running voltage-drop limit for low-voltage circuits (percent).
///
/// The same limit is applied to every voltage category.
pub const VDROP_LIMIT_PERCENT: f64 = 5.0;

/// Which check a compliance entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceKind {
    /// Running voltage drop against the percentage limit
    #[serde(rename = "vdrop_run")]
    VoltageDropRunning,
    /// Selected area against the short-circuit minimum area
    #[serde(rename = "sc")]
    ShortCircuit,
    /// Selected area against the derated design current
    #[serde(rename = "derating")]
    Derating,
}

impl ComplianceKind {
    /// Display name for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            ComplianceKind::VoltageDropRunning => "Vdrop (Running)",
            ComplianceKind::ShortCircuit => "Short-Circuit (SC) Check",
            ComplianceKind::Derating => "Derating / Thermal",
        }
    }
}

/// One compliance detail entry.
///
/// ## JSON Example
///
/// ```json
/// { "type": "vdrop_run", "ok": true, "limit": 5.0, "value": 0.192, "margin": 96.16, "msg": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceItem {
    /// Check kind
    #[serde(rename = "type")]
    pub kind: ComplianceKind,
    /// Check passed
    pub ok: bool,
    /// Limit the value is compared against
    pub limit: Option<f64>,
    /// Actual value
    pub value: Option<f64>,
    /// Headroom as a percentage of the limit; absent when the limit is zero
    pub margin: Option<f64>,
    /// Human-readable explanation
    pub msg: Option<String>,
}

impl ComplianceItem {
    /// Build an entry where passing means `value <= limit`.
    ///
    /// Values are rounded for display; `ok` must be decided by the caller
    /// on unrounded numbers.
    pub fn upper_bound(kind: ComplianceKind, ok: bool, limit: f64, value: f64, msg: impl Into<String>) -> Self {
        ComplianceItem {
            kind,
            ok,
            limit: Some(round_to(limit, 3)),
            value: Some(round_to(value, 3)),
            margin: margin_percent(limit, value),
            msg: Some(msg.into()),
        }
    }
}

/// Headroom `(limit - value) / limit × 100`, rounded to 2 dp.
fn margin_percent(limit: f64, value: f64) -> Option<f64> {
    if limit == 0.0 || !limit.is_finite() || !value.is_finite() {
        return None;
    }
    Some(round_to((limit - value) / limit * 100.0, 2))
}

/// Nominal voltage class of a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoltageCategory {
    /// Up to 1 kV
    #[serde(rename = "LV")]
    Low,
    /// Above 1 kV up to 36 kV
    #[serde(rename = "MV")]
    Medium,
    /// Above 36 kV
    #[serde(rename = "HV")]
    High,
}

impl VoltageCategory {
    /// Classify a line-to-line voltage in volts
    pub fn from_voltage(voltage: f64) -> Self {
        if voltage <= 1_000.0 {
            VoltageCategory::Low
        } else if voltage <= 36_000.0 {
            VoltageCategory::Medium
        } else {
            VoltageCategory::High
        }
    }

    /// Short label ("LV", "MV", "HV")
    pub fn label(&self) -> &'static str {
        match self {
            VoltageCategory::Low => "LV",
            VoltageCategory::Medium => "MV",
            VoltageCategory::High => "HV",
        }
    }
}
