//! # Equation Registry
//!
//! Central registry of the cable sizing equations. Each equation carries
//! metadata (formula, reference, variables) for the PDF appendix and for
//! the generated `EQUATIONS.md` audit document.
//!
//! ## Usage
//!
//! ```rust
//! use cable_core::equations::registry::{Equation, EquationTracker};
//!
//! let mut tracker = EquationTracker::new();
//! tracker.record_for_cable(Equation::VoltageDropPercent, "Running voltage drop", "CBL-001");
//!
//! let meta = Equation::VoltageDropPercent.metadata();
//! println!("Formula: {}", meta.formula_plain);
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

// ============================================================================
// Code References
// ============================================================================

/// Reference to an electrical standard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CodeReference {
    /// IEC 60364 - Low-voltage electrical installations
    Iec60364 {
        part: &'static str,
        clause: &'static str,
    },
    /// IEC 60949 - Thermally permissible short-circuit currents
    Iec60949,
    /// Basic three-phase circuit theory
    CircuitTheory,
}

impl CodeReference {
    /// Format the reference for display in reports
    pub fn citation(&self) -> String {
        match self {
            CodeReference::Iec60364 { part, clause } => format!("IEC 60364-{} Clause {}", part, clause),
            CodeReference::Iec60949 => "IEC 60949 (adiabatic method)".to_string(),
            CodeReference::CircuitTheory => "Three-phase circuit theory".to_string(),
        }
    }
}

// ============================================================================
// Equation Categories
// ============================================================================

/// Categories for organizing equations in the appendix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// Load current derivation
    LoadCurrent,
    /// Installation derating
    Derating,
    /// Voltage drop
    VoltageDrop,
    /// Short-circuit withstand
    ShortCircuit,
}

impl EquationCategory {
    /// Display name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::LoadCurrent => "Load Current",
            EquationCategory::Derating => "Derating",
            EquationCategory::VoltageDrop => "Voltage Drop",
            EquationCategory::ShortCircuit => "Short-Circuit Withstand",
        }
    }

    /// Sort order for the appendix (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            EquationCategory::LoadCurrent => 1,
            EquationCategory::Derating => 2,
            EquationCategory::VoltageDrop => 3,
            EquationCategory::ShortCircuit => 4,
        }
    }
}

/// Definition of a variable used in an equation.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol (e.g., "I_b", "U")
    pub symbol: &'static str,
    /// Description
    pub description: &'static str,
    /// Units (e.g., "A", "V")
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

/// Complete metadata for an equation.
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    /// Human-readable name
    pub name: &'static str,
    /// Brief description of what this equation calculates
    pub description: &'static str,
    /// The formula in Typst math notation for PDF rendering
    pub formula_typst: &'static str,
    /// The formula in plain text for markdown
    pub formula_plain: &'static str,
    /// Standard reference
    pub reference: CodeReference,
    /// Variable definitions
    pub variables: Vec<Variable>,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    /// Category for grouping in appendix
    pub category: EquationCategory,
    /// Function name implementing the equation
    pub source_function: &'static str,
}

// ============================================================================
// Equation Enum
// ============================================================================

/// All equations used by the sizing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Equation {
    /// I_b = P·1000 / (√3·U·cos φ·η)
    FullLoadCurrentKw,
    /// I_b = S·1000 / (√3·U)
    FullLoadCurrentKva,
    /// I_z = I_b / Π f
    DeratedCurrent,
    /// mV = √3·(R cos φ + X sin φ)
    ImpedanceDropCoefficient,
    /// ΔU% = I·L·mV / (1000·U) · 100
    VoltageDropPercent,
    /// S_min = I_sc·√t / k
    ShortCircuitMinimumArea,
}

impl Equation {
    /// Get the full metadata for this equation
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            Equation::FullLoadCurrentKw => EquationMetadata {
                name: "Full-Load Current from Active Power",
                description: "Line current drawn by a balanced three-phase load at rated output",
                formula_typst: r#"$I_b = (P dot 1000) / (sqrt(3) dot U dot cos phi dot eta)$"#,
                formula_plain: "Ib = P*1000 / (sqrt(3) * U * pf * eff)",
                reference: CodeReference::CircuitTheory,
                variables: vec![
                    Variable::new("P", "Active (shaft) power", "kW"),
                    Variable::new("U", "Line-to-line voltage", "V"),
                    Variable::new("cos φ", "Power factor", "-"),
                    Variable::new("η", "Efficiency", "-"),
                    Variable::new("I_b", "Full-load current", "A"),
                ],
                assumptions: vec!["Balanced three-phase load"],
                category: EquationCategory::LoadCurrent,
                source_function: "full_load_current_kw",
            },
            Equation::FullLoadCurrentKva => EquationMetadata {
                name: "Full-Load Current from Apparent Power",
                description: "Line current for a three-phase load specified in kVA",
                formula_typst: r#"$I_b = (S dot 1000) / (sqrt(3) dot U)$"#,
                formula_plain: "Ib = S*1000 / (sqrt(3) * U)",
                reference: CodeReference::CircuitTheory,
                variables: vec![
                    Variable::new("S", "Apparent power", "kVA"),
                    Variable::new("U", "Line-to-line voltage", "V"),
                    Variable::new("I_b", "Full-load current", "A"),
                ],
                assumptions: vec!["Balanced three-phase load"],
                category: EquationCategory::LoadCurrent,
                source_function: "full_load_current_kva",
            },
            Equation::DeratedCurrent => EquationMetadata {
                name: "Derated Design Current",
                description: "Current the conductor must carry once all installation correction factors are applied",
                formula_typst: r#"$I_z = I_b / (product_i f_i)$"#,
                formula_plain: "Iz = Ib / (f1 * f2 * ... * fn)",
                reference: CodeReference::Iec60364 { part: "5-52", clause: "523" },
                variables: vec![
                    Variable::new("I_b", "Full-load current", "A"),
                    Variable::new("f_i", "Correction factor (grouping, ambient, burial)", "-"),
                    Variable::new("I_z", "Derated design current", "A"),
                ],
                assumptions: vec!["Correction factors compound by multiplication"],
                category: EquationCategory::Derating,
                source_function: "derated_current",
            },
            Equation::ImpedanceDropCoefficient => EquationMetadata {
                name: "Voltage-Drop Coefficient from Impedance",
                description: "Three-phase mV/A/m coefficient derived from conductor resistance and reactance",
                formula_typst: r#"$m V = sqrt(3) dot (R cos phi + X sin phi)$"#,
                formula_plain: "mV = sqrt(3) * (R*cos(phi) + X*sin(phi))",
                reference: CodeReference::Iec60364 { part: "5-52", clause: "G.1" },
                variables: vec![
                    Variable::new("R", "Conductor resistance", "Ω/km"),
                    Variable::new("X", "Conductor reactance", "Ω/km"),
                    Variable::new("cos φ", "Power factor", "-"),
                ],
                assumptions: vec!["Used only when resistance per km is supplied"],
                category: EquationCategory::VoltageDrop,
                source_function: "mv_per_a_m_from_impedance",
            },
            Equation::VoltageDropPercent => EquationMetadata {
                name: "Voltage Drop Percentage",
                description: "Running voltage drop along the route as a percentage of nominal voltage",
                formula_typst: r#"$Delta U_"%" = (I_b dot L dot m V) / (1000 dot U) dot 100$"#,
                formula_plain: "dU% = (Ib * L * mV) / (1000 * U) * 100",
                reference: CodeReference::Iec60364 { part: "5-52", clause: "525" },
                variables: vec![
                    Variable::new("I_b", "Full-load current (not derated)", "A"),
                    Variable::new("L", "Route length", "m"),
                    Variable::new("mV", "Voltage-drop coefficient", "mV/A/m"),
                    Variable::new("U", "Line-to-line voltage", "V"),
                ],
                assumptions: vec!["Limit of 5 % for low-voltage circuits"],
                category: EquationCategory::VoltageDrop,
                source_function: "voltage_drop_percent",
            },
            Equation::ShortCircuitMinimumArea => EquationMetadata {
                name: "Short-Circuit Minimum Area",
                description: "Smallest conductor area that withstands the fault without exceeding its final temperature",
                formula_typst: r#"$S_"min" = (I_"sc" dot sqrt(t)) / k$"#,
                formula_plain: "Smin = Isc * sqrt(t) / k",
                reference: CodeReference::Iec60949,
                variables: vec![
                    Variable::new("I_sc", "Prospective fault current", "A"),
                    Variable::new("t", "Fault clearing time", "s"),
                    Variable::new("k", "Material constant", "A·√s/mm²"),
                    Variable::new("S_min", "Required conductor area", "mm²"),
                ],
                assumptions: vec!["Adiabatic heating (t ≤ 5 s)"],
                category: EquationCategory::ShortCircuit,
                source_function: "short_circuit_check",
            },
        }
    }

    /// Get all equations in a given category
    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .filter(|eq| eq.metadata().category == category)
            .copied()
            .collect()
    }

    /// Get all categories in appendix order
    pub fn all_categories() -> Vec<EquationCategory> {
        use EquationCategory::*;
        let mut cats = vec![LoadCurrent, Derating, VoltageDrop, ShortCircuit];
        cats.sort_by_key(|c| c.sort_order());
        cats
    }
}

/// All equations in the registry (for iteration)
pub static ALL_EQUATIONS: &[Equation] = &[
    Equation::FullLoadCurrentKw,
    Equation::FullLoadCurrentKva,
    Equation::DeratedCurrent,
    Equation::ImpedanceDropCoefficient,
    Equation::VoltageDropPercent,
    Equation::ShortCircuitMinimumArea,
];

// ============================================================================
// Equation Usage Tracking
// ============================================================================

/// Record of an equation being used while sizing a cable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquationUsage {
    /// The equation that was used
    pub equation: Equation,
    /// Context describing where/why it was used
    pub context: String,
    /// Cable number the equation was applied to
    pub cable_number: Option<String>,
}

/// Collector for equation usage during sizing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquationTracker {
    usages: Vec<EquationUsage>,
}

impl EquationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record equation usage for a specific cable
    pub fn record_for_cable(&mut self, equation: Equation, context: impl Into<String>, cable_number: impl Into<String>) {
        self.usages.push(EquationUsage {
            equation,
            context: context.into(),
            cable_number: Some(cable_number.into()),
        });
    }

    /// Unique equations used, in first-use order
    pub fn unique_equations(&self) -> Vec<Equation> {
        let mut seen = HashSet::new();
        self.usages
            .iter()
            .filter(|u| seen.insert(u.equation))
            .map(|u| u.equation)
            .collect()
    }

    /// Group unique equations by category for the appendix
    pub fn by_category(&self) -> Vec<(EquationCategory, Vec<Equation>)> {
        let mut by_cat: HashMap<EquationCategory, Vec<Equation>> = HashMap::new();
        for eq in self.unique_equations() {
            by_cat.entry(eq.metadata().category).or_default().push(eq);
        }
        let mut result: Vec<_> = by_cat.into_iter().collect();
        result.sort_by_key(|(cat, _)| cat.sort_order());
        result
    }

    /// Cable numbers an equation was applied to, deduplicated
    pub fn cables_for(&self, equation: Equation) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.usages
            .iter()
            .filter(|u| u.equation == equation)
            .filter_map(|u| u.cable_number.as_deref())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Generate Typst markup for the "List of Equations" appendix.
    pub fn generate_appendix_typst(&self) -> String {
        let mut output = String::new();

        output.push_str(
            r##"
#pagebreak()
#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Appendix: List of Equations]
  ]
]
#v(12pt)
"##,
        );

        let by_category = self.by_category();
        if by_category.is_empty() {
            output.push_str("#text(style: \"italic\")[No equations recorded for this schedule.]\n");
            return output;
        }

        for (category, equations) in by_category {
            output.push_str(&format!("\n== {}\n\n", category.display_name()));

            for equation in equations {
                let meta = equation.metadata();
                output.push_str(&format!("=== {}\n\n", meta.name));
                output.push_str(&format!("#text(size: 10pt)[{}]\n\n", meta.description));
                output.push_str(&format!("*Formula:* {}\n\n", meta.formula_typst));
                output.push_str(&format!("*Reference:* {}\n\n", meta.reference.citation()));

                let cables = self.cables_for(equation);
                if !cables.is_empty() {
                    let list: Vec<String> = cables.iter().map(|c| crate::pdf::escape_typst(c)).collect();
                    output.push_str(&format!("*Applied to:* {}\n\n", list.join(", ")));
                }
            }
        }

        output
    }
}

/// Generate the EQUATIONS.md audit document from the registry.
pub fn generate_equations_markdown() -> String {
    let mut output = String::with_capacity(8_000);

    output.push_str(
        r#"# Cable Sizing Equations Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-equations`

---

"#,
    );

    let categories = Equation::all_categories();
    for category in &categories {
        let equations = Equation::in_category(*category);
        if equations.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for equation in equations {
            let meta = equation.metadata();
            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!("| {} | {} | {} |\n", var.symbol, var.description, var.units));
                }
                output.push('\n');
            }

            output.push_str(&format!("**Reference:** {}\n\n", meta.reference.citation()));
            output.push_str(&format!("**Source:** `equations::cable::{}`\n\n", meta.source_function));

            if !meta.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!("**Total Equations:** {}\n", ALL_EQUATIONS.len()));
    output
}
