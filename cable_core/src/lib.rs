//! # cable_core - Cable Sizing Calculation Engine
//!
//! `cable_core` sizes low-voltage power cables: it derives the full-load
//! current of a circuit, derates it for installation conditions, picks the
//! smallest candidate conductor that carries it and checks running voltage
//! drop and short-circuit withstand. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Non-compliance is data**: an undersized cable is a flagged result, never an error
//!
//! ## Quick Start
//!
//! ```rust
//! use cable_core::calculations::{calculate, CableInput};
//!
//! let input = CableInput::from_kw("FDR-01", 18.5, 400.0, 50.0)
//!     .with_power_factor(0.85)
//!     .with_efficiency(0.9)
//!     .with_derating(vec![0.8])
//!     .with_csa_options(vec![1.5, 2.5, 4.0, 6.0, 10.0, 16.0])
//!     .with_short_circuit(5000.0, 1.0, 115.0);
//!
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.selected_csa, 16.0);
//! assert!(result.vdrop_ok);
//! assert!(!result.sc_ok);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Single-cable and batch sizing, compliance details
//! - [`equations`] - Formula library and equation registry
//! - [`catalog`] - Cable reference table, filtering and matching
//! - [`schedule`] - Sizing schedule document (metadata, defaults, rows, approvals)
//! - [`file_io`] - Atomic schedule saves, catalog and row loading
//! - [`export`] - CSV export
//! - [`pdf`] - Typst PDF report
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod catalog;
pub mod equations;
pub mod errors;
pub mod export;
pub mod file_io;
pub mod pdf;
pub mod schedule;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate, calculate_batch, BatchRowResult, BulkCableInput, CableInput, CableResult, SizingDefaults};
pub use catalog::{builtin_catalog, CableCatalog, CatalogEntry, CatalogQuery};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_schedule, save_schedule};
pub use schedule::{ScheduleMetadata, ScheduleSettings, SizingSchedule};
