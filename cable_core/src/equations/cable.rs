//! # Cable Sizing Formulas
//!
//! Fundamental equations for sizing a low-voltage power cable: full-load
//! current, derating, voltage drop and short-circuit withstand.
//!
//! ## Notation
//!
//! - `P` = Active power (kW)
//! - `S` = Apparent power (kVA)
//! - `U` = Nominal line-to-line voltage (V)
//! - `cos φ` = Power factor
//! - `η` = Efficiency
//! - `I_b` = Full-load (base) current (A)
//! - `I_z` = Derated design current (A)
//! - `L` = Route length (m)
//! - `mV` = Voltage-drop coefficient (mV/A/m)
//! - `I_sc` = Prospective fault current (A)
//! - `t` = Fault clearing time (s)
//! - `k` = Conductor material constant (115 for PVC-insulated copper)
//!
//! ## Divisor Hazards
//!
//! Every formula here divides by a user-supplied quantity. Instead of
//! producing `inf`/`NaN`, a zero or negative divisor is rejected with
//! [`CalcError::InvalidInput`](crate::errors::CalcError::InvalidInput).
//!
//! ## References
//!
//! - IEC 60364-5-52: Selection and erection of wiring systems
//! - IEC 60949: Calculation of thermally permissible short-circuit currents

use serde::{Deserialize, Serialize};

use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};

/// √3, the line-to-phase factor for balanced three-phase circuits
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Full-load current of a three-phase load from its shaft/active power.
///
/// # Formula
/// - I_b = P × 1000 / (√3 × U × cos φ × η)
///
/// # Arguments
/// * `load_kw` - Active power in kW
/// * `voltage` - Line-to-line voltage in V
/// * `pf` - Power factor
/// * `eff` - Efficiency
///
/// # Errors
/// `InvalidInput` when `voltage`, `pf` or `eff` is not positive.
pub fn full_load_current_kw(load_kw: f64, voltage: f64, pf: f64, eff: f64) -> CalcResult<f64> {
    require_positive("voltage", voltage)?;
    require_positive("pf", pf)?;
    require_positive("eff", eff)?;
    Ok(load_kw * 1000.0 / (SQRT_3 * voltage * pf * eff))
}

/// Full-load current of a three-phase load from its apparent power.
///
/// # Formula
/// - I_b = S × 1000 / (√3 × U)
pub fn full_load_current_kva(load_kva: f64, voltage: f64) -> CalcResult<f64> {
    require_positive("voltage", voltage)?;
    Ok(load_kva * 1000.0 / (SQRT_3 * voltage))
}

/// Design current after applying every derating factor.
///
/// # Formula
/// - I_z = I_b / (f₁ × f₂ × … × fₙ)
///
/// Factors are expected in (0, 1]. Factors above 1 are applied as given
/// (they reduce the design current); zero or negative factors are rejected
/// because they make the product a zero or sign-flipping divisor.
///
/// # Errors
/// `MissingField` for an empty list, `InvalidInput` for a non-positive factor.
pub fn derated_current(base_current: f64, derating_factors: &[f64]) -> CalcResult<f64> {
    if derating_factors.is_empty() {
        return Err(CalcError::missing_field("derating_factors"));
    }
    for (i, factor) in derating_factors.iter().enumerate() {
        require_positive(&format!("derating_factors[{}]", i), *factor)?;
    }
    let product: f64 = derating_factors.iter().product();
    Ok(base_current / product)
}

/// Voltage drop as a percentage of nominal voltage.
///
/// # Formula
/// - ΔU% = (I × L × mV) / (1000 × U) × 100
///
/// The mV/A/m coefficient is the tabulated three-phase figure, so the
/// product `I × L × mV` is already a line-to-line drop in millivolts.
pub fn voltage_drop_percent(current: f64, length_m: f64, mv_per_a_m: f64, voltage: f64) -> CalcResult<f64> {
    require_positive("voltage", voltage)?;
    Ok((current * length_m * mv_per_a_m) / (1000.0 * voltage) * 100.0)
}

/// Three-phase voltage-drop coefficient from conductor impedance.
///
/// # Formula
/// - mV = √3 × (R cos φ + X sin φ)
///
/// With R and X in Ω/km the result is in mV/A/m (1 Ω/km = 1 mV/A/m per
/// conductor). `pf` must lie in (0, 1].
pub fn mv_per_a_m_from_impedance(r_ohm_per_km: f64, x_ohm_per_km: f64, pf: f64) -> CalcResult<f64> {
    require_non_negative("r_ohm_per_km", r_ohm_per_km)?;
    require_non_negative("x_ohm_per_km", x_ohm_per_km)?;
    require_positive("pf", pf)?;
    if pf > 1.0 {
        return Err(CalcError::invalid_input(
            "pf",
            pf.to_string(),
            "Power factor must not exceed 1.0 for impedance-based voltage drop",
        ));
    }
    let sin_phi = (1.0 - pf * pf).sqrt();
    Ok(SQRT_3 * (r_ohm_per_km * pf + x_ohm_per_km * sin_phi))
}

/// Outcome of the adiabatic short-circuit withstand check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortCircuitCheck {
    /// Candidate area is at least the required area
    pub is_sufficient: bool,
    /// Minimum conductor area (mm²) that survives the fault
    pub required_area: f64,
}

/// Adiabatic short-circuit withstand check.
///
/// # Formulas (IEC 60364-5-54 / IEC 60949 adiabatic equation)
/// - S_min = I_sc × √t / k
/// - sufficient ⇔ S ≥ S_min
///
/// # Errors
/// `InvalidInput` when `k_const` is not positive or the current/time is negative.
pub fn short_circuit_check(
    fault_current: f64,
    fault_duration_s: f64,
    k_const: f64,
    candidate_csa: f64,
) -> CalcResult<ShortCircuitCheck> {
    require_non_negative("sc_current", fault_current)?;
    require_non_negative("sc_time", fault_duration_s)?;
    require_positive("k_const", k_const)?;
    let required_area = fault_current * fault_duration_s.sqrt() / k_const;
    Ok(ShortCircuitCheck {
        is_sufficient: candidate_csa >= required_area,
        required_area,
    })
}

/// Round for presentation only. Never feed the result back into a comparison.
#[inline]
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_full_load_current_kw() {
        // 18.5 kW / (√3 × 400 × 0.85 × 0.9) = 34.905 A
        let i = full_load_current_kw(18.5, 400.0, 0.85, 0.9).unwrap();
        assert!((i - 34.905).abs() < 0.001);
    }

    #[test]
    fn test_full_load_current_kva() {
        // 100 kVA at 400 V = 144.34 A
        let i = full_load_current_kva(100.0, 400.0).unwrap();
        assert!((i - 144.3376).abs() < 0.001);
    }

    #[test]
    fn test_zero_divisors_rejected() {
        assert!(full_load_current_kw(10.0, 0.0, 0.85, 0.9).is_err());
        assert!(full_load_current_kw(10.0, 400.0, 0.0, 0.9).is_err());
        assert!(full_load_current_kw(10.0, 400.0, 0.85, 0.0).is_err());
        assert!(full_load_current_kva(10.0, 0.0).is_err());
        assert!(voltage_drop_percent(10.0, 10.0, 0.44, 0.0).is_err());
        assert!(short_circuit_check(1000.0, 1.0, 0.0, 10.0).is_err());
    }

    #[test]
    fn test_identity_derating() {
        let i = derated_current(42.0, &[1.0]).unwrap();
        assert!((i - 42.0).abs() < TOL);
    }

    #[test]
    fn test_compound_derating() {
        let i = derated_current(72.0, &[0.8, 0.9]).unwrap();
        assert!((i - 72.0 / 0.72).abs() < TOL);
        assert!((i - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_derating_quirks() {
        assert!(matches!(
            derated_current(10.0, &[]),
            Err(CalcError::MissingField { .. })
        ));
        assert!(derated_current(10.0, &[0.8, 0.0]).is_err());
        // Factors above 1 are applied, not rejected
        let i = derated_current(10.0, &[1.25]).unwrap();
        assert!((i - 8.0).abs() < TOL);
    }

    #[test]
    fn test_voltage_drop() {
        // (100 × 50 × 0.44) / (1000 × 400) × 100 = 0.55 %
        let vd = voltage_drop_percent(100.0, 50.0, 0.44, 400.0).unwrap();
        assert!((vd - 0.55).abs() < TOL);
        assert!(vd <= 5.0);
    }

    #[test]
    fn test_impedance_coefficient() {
        // Unity power factor: only resistance contributes
        let mv = mv_per_a_m_from_impedance(0.524, 0.08, 1.0).unwrap();
        assert!((mv - SQRT_3 * 0.524).abs() < TOL);

        // √3 × (0.524 × 0.85 + 0.08 × 0.5268) = 0.8444
        let mv = mv_per_a_m_from_impedance(0.524, 0.08, 0.85).unwrap();
        assert!((mv - 0.84445).abs() < 1e-4);

        assert!(mv_per_a_m_from_impedance(0.524, 0.08, 1.2).is_err());
    }

    #[test]
    fn test_short_circuit_check() {
        // 10000 × √1 / 115 = 86.96 mm²
        let sc = short_circuit_check(10_000.0, 1.0, 115.0, 95.0).unwrap();
        assert!((sc.required_area - 86.9565).abs() < 0.001);
        assert!(sc.is_sufficient);

        let sc = short_circuit_check(10_000.0, 1.0, 115.0, 70.0).unwrap();
        assert!(!sc.is_sufficient);
    }

    #[test]
    fn test_short_circuit_duration_scaling() {
        // Quarter of the clearing time halves the required area
        let full = short_circuit_check(10_000.0, 1.0, 115.0, 50.0).unwrap();
        let quarter = short_circuit_check(10_000.0, 0.25, 115.0, 50.0).unwrap();
        assert!((full.required_area / quarter.required_area - 2.0).abs() < TOL);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(34.905163, 2), 34.91);
        assert_eq!(round_to(0.191978, 3), 0.192);
    }

    proptest! {
        #[test]
        fn prop_flc_monotonic(
            kw in 0.1f64..5000.0,
            dkw in 0.1f64..100.0,
            v in 100.0f64..36_000.0,
            dv in 1.0f64..1000.0,
            pf in 0.1f64..0.99,
            eff in 0.1f64..0.99,
            dfrac in 0.001f64..0.01,
        ) {
            let base = full_load_current_kw(kw, v, pf, eff).unwrap();
            prop_assert!(full_load_current_kw(kw + dkw, v, pf, eff).unwrap() > base);
            prop_assert!(full_load_current_kw(kw, v + dv, pf, eff).unwrap() < base);
            prop_assert!(full_load_current_kw(kw, v, pf + dfrac, eff).unwrap() < base);
            prop_assert!(full_load_current_kw(kw, v, pf, eff + dfrac).unwrap() < base);
        }
    }
}
