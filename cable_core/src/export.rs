//! # CSV Export
//!
//! Writes sized rows as a spreadsheet-friendly CSV table, one line per row
//! in schedule order:
//!
//! ```text
//! Cable No,From,To,Voltage,Load kW,Length m,FLC A,Derated A,CSA mm2,Vdrop %,Vdrop OK,SC OK
//! FDR-01,MCC-1,P-101,400,18.5,50,34.91,43.63,16,0.192,YES,NO
//! ```
//!
//! Rejected rows keep their input columns; the result columns are left blank
//! and both checks read `NO`.

use serde::Serialize;

use crate::calculations::{BatchRowResult, BulkCableInput};
use crate::errors::{CalcError, CalcResult};
use crate::schedule::SizingSchedule;

/// Column headers, in output order
pub const CSV_HEADERS: [&str; 12] = [
    "Cable No",
    "From",
    "To",
    "Voltage",
    "Load kW",
    "Length m",
    "FLC A",
    "Derated A",
    "CSA mm2",
    "Vdrop %",
    "Vdrop OK",
    "SC OK",
];

/// One exported line
#[derive(Debug, Clone, PartialEq, Serialize)]
struct CsvRow<'a> {
    cable_number: &'a str,
    from: &'a str,
    to: &'a str,
    voltage: f64,
    load_kw: Option<f64>,
    length: f64,
    flc: Option<f64>,
    derated: Option<f64>,
    csa: Option<f64>,
    vdrop_percent: Option<f64>,
    vdrop_ok: &'static str,
    sc_ok: &'static str,
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO"
    }
}

impl<'a> CsvRow<'a> {
    fn new(input: &'a BulkCableInput, outcome: &BatchRowResult) -> Self {
        let result = outcome.result();
        CsvRow {
            cable_number: input.label(),
            from: input.from_equipment.as_deref().unwrap_or(""),
            to: input.to_equipment.as_deref().unwrap_or(""),
            voltage: input.voltage,
            load_kw: input.load_kw,
            length: input.length,
            flc: result.map(|r| r.flc),
            derated: result.map(|r| r.derated_current),
            csa: result.map(|r| r.selected_csa),
            vdrop_percent: result.map(|r| r.vdrop_percent),
            vdrop_ok: yes_no(result.is_some_and(|r| r.vdrop_ok)),
            sc_ok: yes_no(result.is_some_and(|r| r.sc_ok)),
        }
    }
}

/// Write input rows next to their outcomes.
///
/// `rows` and `results` are paired by position; a length mismatch is an error.
pub fn rows_to_csv(rows: &[BulkCableInput], results: &[BatchRowResult]) -> CalcResult<String> {
    write_csv(rows.iter().zip(results), rows.len(), results.len())
}

/// Export a sized schedule, optionally restricted to approved cables.
///
/// `results` must come from sizing this schedule (see
/// [`SizingSchedule::size_all`]).
pub fn schedule_to_csv(schedule: &SizingSchedule, results: &[BatchRowResult], approved_only: bool) -> CalcResult<String> {
    let pairs = schedule
        .rows
        .iter()
        .map(|r| &r.input)
        .zip(results)
        .filter(|(input, _)| !approved_only || schedule.is_approved(input.label()));
    write_csv(pairs, schedule.row_count(), results.len())
}

fn write_csv<'a>(
    pairs: impl Iterator<Item = (&'a BulkCableInput, &'a BatchRowResult)>,
    row_count: usize,
    result_count: usize,
) -> CalcResult<String> {
    if row_count != result_count {
        return Err(CalcError::invalid_input(
            "results",
            result_count.to_string(),
            format!("Expected one result per row ({} rows)", row_count),
        ));
    }

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer
        .write_record(CSV_HEADERS)
        .map_err(|e| CalcError::serialization(e.to_string()))?;

    for (input, outcome) in pairs {
        writer
            .serialize(CsvRow::new(input, outcome))
            .map_err(|e| CalcError::serialization(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CalcError::serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CalcError::serialization(e.to_string()))
}
