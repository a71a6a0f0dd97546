//! # Cable Sizing Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(input) -> Result<*Result, CalcError>` - Pure calculation function
//!
//! ## Available Calculations
//!
//! - [`cable`] - Single circuit sizing
//! - [`batch`] - Ordered multi-row sizing with defaults and per-row rejection
//! - [`compliance`] - Compliance detail entries and voltage category

pub mod batch;
pub mod cable;
pub mod compliance;

// Re-export commonly used types
pub use batch::{calculate_batch, calculate_batch_traced, BatchRowResult, BatchSummary, BulkCableInput, SizingDefaults};
pub use cable::{calculate, calculate_traced, select_csa, CableInput, CableResult, CsaSelection, StartMethod};
pub use compliance::{ComplianceItem, ComplianceKind, VoltageCategory, VDROP_LIMIT_PERCENT};
