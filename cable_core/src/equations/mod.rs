//! # Cable Sizing Equations
//!
//! All formulas used by the sizing engine live here so they can be checked
//! against their references in one place.
//!
//! ## Modules
//!
//! - [`cable`] - Load current, derating, voltage drop and short-circuit formulas
//! - [`registry`] - Equation metadata and tracking for the PDF appendix
//!
//! ## Units
//!
//! - Power: kW, kVA
//! - Voltage: V (line-to-line)
//! - Current: A
//! - Length: m
//! - Area: mm²
//! - Voltage-drop coefficient: mV/A/m
//! - Impedance: Ω/km

pub mod cable;
pub mod registry;

pub use cable::{
    derated_current,
    full_load_current_kva,
    full_load_current_kw,
    mv_per_a_m_from_impedance,
    round_to,
    short_circuit_check,
    voltage_drop_percent,
    ShortCircuitCheck,
    SQRT_3,
};

pub use registry::{
    CodeReference,
    Equation,
    EquationCategory,
    EquationMetadata,
    EquationTracker,
    EquationUsage,
    Variable,
    ALL_EQUATIONS,
    generate_equations_markdown,
};
