use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use cable_core::calculations::{calculate, BulkCableInput, CableInput, CableResult, SizingDefaults};
use cable_core::catalog::CableCatalog;

use crate::cli::{OutputFormat, SizeArgs};

pub fn handle(args: &SizeArgs, defaults: &SizingDefaults, catalog: &CableCatalog) -> Result<()> {
    let input = build_input(args, defaults, catalog)?;
    info!(cable = %input.cable_number, "sizing cable");

    let result = calculate(&input).with_context(|| format!("sizing cable '{}'", input.cable_number))?;

    match args.format {
        OutputFormat::Json => super::print_json(&result),
        OutputFormat::Table => {
            print_result(&result);
            Ok(())
        }
    }
}

/// Input from `--input`, or from the flags with defaults applied.
///
/// Without `--csa` the candidates come from the defaults, then the catalog.
pub fn build_input(args: &SizeArgs, defaults: &SizingDefaults, catalog: &CableCatalog) -> Result<CableInput> {
    if let Some(path) = &args.input {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        return serde_json::from_str(&text).with_context(|| format!("parsing cable input {}", path.display()));
    }

    let csa_options = if !args.csa.is_empty() {
        Some(args.csa.clone())
    } else if defaults.csa_options.is_empty() {
        Some(catalog.csa_options())
    } else {
        None
    };

    let row = BulkCableInput {
        cable_number: Some(args.cable.clone()),
        load_kw: args.load_kw,
        load_kva: args.load_kva,
        current: args.current,
        voltage: args.voltage.unwrap_or_default(),
        length: args.length.unwrap_or_default(),
        pf: args.pf,
        eff: args.eff,
        mv_per_a_m: args.mv_per_a_m,
        r_ohm_per_km: args.r_ohm_per_km,
        x_ohm_per_km: args.x_ohm_per_km,
        derating_factors: Some(args.derating.clone()),
        csa_options,
        sc_current: args.sc_current,
        sc_time: args.sc_time,
        k_const: args.k_const,
        motor_start_method: args.start.map(Into::into),
        ..Default::default()
    };

    Ok(row.resolve(defaults))
}

fn print_result(r: &CableResult) {
    println!("Cable {} ({}, {})", r.cable_number, r.voltage_category.label(), r.motor_start_method.label());
    println!("  Full-load current : {:.2} A", r.flc);
    println!("  Derated current   : {:.2} A", r.derated_current);
    println!(
        "  Selected size     : {} mm²{}",
        r.selected_csa,
        if r.undersized { " (largest candidate, undersized)" } else { "" }
    );
    println!("  Voltage drop      : {:.3} %", r.vdrop_percent);
    println!("  SC minimum area   : {:.2} mm²", r.sc_required_area);
    println!();
    for item in &r.compliance {
        println!(
            "  [{}] {}: {}",
            if item.ok { "OK" } else { "FAIL" },
            item.kind.display_name(),
            item.msg.as_deref().unwrap_or("")
        );
    }
}
