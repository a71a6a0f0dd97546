//! # PDF Generation Module
//!
//! Renders a sizing schedule as a PDF report using Typst.
//!
//! ## Architecture
//!
//! - The report template is embedded as a string constant
//! - Data is injected by placeholder replacement before compilation
//! - Fonts come from `typst-assets`; no files are read at render time
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Report Layout
//!
//! 1. Title block with engineer, job and client
//! 2. Summary table, one line per cable
//! 3. Compliance details for every sized cable
//! 4. Appendix listing the equations that were applied
//!
//! ## Example
//!
//! ```rust,no_run
//! use cable_core::pdf::render_schedule_pdf;
//! use cable_core::schedule::SizingSchedule;
//! use cable_core::calculations::BulkCableInput;
//!
//! let mut schedule = SizingSchedule::new("John Engineer", "25-001", "ACME Corp");
//! schedule.add_row(BulkCableInput::new("FDR-01", 400.0, 30.0));
//! let pdf = render_schedule_pdf(&schedule).unwrap();
//! std::fs::write("schedule.pdf", pdf).unwrap();
//! ```

use chrono::Utc;
use tracing::debug;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::calculations::{BatchRowResult, BulkCableInput, CableResult, VDROP_LIMIT_PERCENT};
use crate::equations::EquationTracker;
use crate::errors::{CalcError, CalcResult};
use crate::schedule::SizingSchedule;

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling a single in-memory document.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    fn load_fonts() -> Vec<Font> {
        typst_assets::fonts()
            .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
            .collect()
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// PDF Template
// ============================================================================

const SCHEDULE_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  flipped: true,
  margin: (top: 20mm, bottom: 20mm, left: 15mm, right: 15mm),
  header: align(right)[
    #text(size: 9pt, fill: gray)[Cable Sizing Schedule]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 9pt)[Job: {{JOB_ID}}]],
      align(center)[#text(size: 9pt)[Page #counter(page).display()]],
      align(right)[#text(size: 9pt)[{{DATE}}]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 10pt)

// Title Block
#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 16pt, radius: 4pt)[
    #text(size: 20pt, weight: "bold")[Cable Sizing Schedule]
    #v(6pt)
    #text(size: 14pt)[{{CLIENT}}]
  ]
]

#v(12pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 20pt,
  [
    *Project Information*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 4pt,
      [Engineer:], [{{ENGINEER}}],
      [Job ID:], [{{JOB_ID}}],
      [Client:], [{{CLIENT}}],
      [Date:], [{{DATE}}],
    )
  ],
  [
    *Design Basis*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 4pt,
      [Standard:], [{{STANDARD}}],
      [Voltage drop limit:], [{{VDROP_LIMIT}} %],
      [Cables:], [{{TOTAL}} ({{PASSING}} passing, {{REJECTED}} rejected)],
    )
  ],
)

#v(16pt)

== Summary

#table(
  columns: (auto, 1fr, 1fr, auto, auto, auto, auto, auto, auto, auto),
  stroke: 0.5pt + gray,
  inset: 5pt,
  fill: (_, row) => if row == 0 { rgb("#e0e0e0") },
  [*\#*], [*Cable No*], [*From / To*], [*FLC (A)*], [*Derated (A)*], [*CSA (mm²)*], [*Vdrop (%)*], [*SC min (mm²)*], [*Status*], [*Approved*],
{{SUMMARY_ROWS}}
)

{{DETAILS}}

{{APPENDIX}}
"##;

// ============================================================================
// Rendering
// ============================================================================

/// Render a whole schedule to a PDF report.
///
/// Rows are sized with the schedule's defaults. Rejected rows appear in the
/// summary with their error.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(CalcError::Internal)` - The schedule is empty or Typst failed
pub fn render_schedule_pdf(schedule: &SizingSchedule) -> CalcResult<Vec<u8>> {
    if schedule.rows.is_empty() {
        return Err(CalcError::Internal {
            message: "Schedule has no rows to report".to_string(),
        });
    }

    let mut tracker = EquationTracker::new();
    let results = schedule.size_all_traced(&mut tracker);
    let inputs = schedule.inputs();

    let passing = results.iter().filter_map(BatchRowResult::result).filter(|r| r.passes()).count();
    let rejected = results.iter().filter(|r| r.result().is_none()).count();

    let source = SCHEDULE_TEMPLATE
        .replace("{{ENGINEER}}", &escape_typst(&schedule.meta.engineer))
        .replace("{{JOB_ID}}", &escape_typst(&schedule.meta.job_id))
        .replace("{{CLIENT}}", &escape_typst(&schedule.meta.client))
        .replace("{{DATE}}", &Utc::now().format("%Y-%m-%d").to_string())
        .replace("{{STANDARD}}", &escape_typst(&schedule.settings.standard))
        .replace("{{VDROP_LIMIT}}", &format!("{:.1}", VDROP_LIMIT_PERCENT))
        .replace("{{TOTAL}}", &results.len().to_string())
        .replace("{{PASSING}}", &passing.to_string())
        .replace("{{REJECTED}}", &rejected.to_string())
        .replace("{{SUMMARY_ROWS}}", &build_summary_rows(schedule, &inputs, &results))
        .replace("{{DETAILS}}", &build_details(&results))
        .replace("{{APPENDIX}}", &tracker.generate_appendix_typst());

    let pdf = compile_pdf(source)?;
    debug!(bytes = pdf.len(), rows = results.len(), "schedule report rendered");
    Ok(pdf)
}

/// Compile Typst source to PDF bytes.
fn compile_pdf(source: String) -> CalcResult<Vec<u8>> {
    let world = PdfWorld::new(source);

    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("PDF rendering failed: {}", error_msgs.join("; ")),
        }
    })
}

/// Escape characters with meaning in Typst markup.
pub(crate) fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

fn route(input: &BulkCableInput) -> String {
    match (input.from_equipment.as_deref(), input.to_equipment.as_deref()) {
        (None, None) => String::new(),
        (from, to) => format!(
            "{} → {}",
            escape_typst(from.unwrap_or("?")),
            escape_typst(to.unwrap_or("?"))
        ),
    }
}

fn status(result: &CableResult) -> &'static str {
    if result.passes() {
        "PASS"
    } else {
        "FAIL"
    }
}

/// Build summary table rows
fn build_summary_rows(schedule: &SizingSchedule, inputs: &[BulkCableInput], results: &[BatchRowResult]) -> String {
    inputs
        .iter()
        .zip(results)
        .enumerate()
        .map(|(i, (input, outcome))| {
            let cable = input.label();
            let approved = if schedule.is_approved(cable) { "yes" } else { "" };
            match outcome {
                BatchRowResult::Sized(r) => format!(
                    "  [{}], [{}], [{}], [{:.2}], [{:.2}], [{}], [{:.3}], [{:.2}], [{}], [{}],",
                    i + 1,
                    escape_typst(cable),
                    route(input),
                    r.flc,
                    r.derated_current,
                    r.selected_csa,
                    r.vdrop_percent,
                    r.sc_required_area,
                    status(r),
                    approved,
                ),
                BatchRowResult::Rejected { .. } => format!(
                    "  [{}], [{}], [{}], [n/a], [n/a], [n/a], [n/a], [n/a], [REJECTED], [{}],",
                    i + 1,
                    escape_typst(cable),
                    route(input),
                    approved,
                ),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the per-cable compliance section
fn build_details(results: &[BatchRowResult]) -> String {
    let mut output = String::from("#pagebreak()\n== Compliance Details\n\n");

    for outcome in results {
        match outcome {
            BatchRowResult::Sized(r) => {
                output.push_str(&format!(
                    "=== {} ({}, {})\n\n",
                    escape_typst(&r.cable_number),
                    r.voltage_category.label(),
                    escape_typst(r.motor_start_method.label()),
                ));
                output.push_str(
                    "#table(\n  columns: (1fr, auto, auto, auto, auto),\n  stroke: 0.5pt + gray,\n  inset: 4pt,\n  [*Check*], [*Limit*], [*Value*], [*Margin (%)*], [*Result*],\n",
                );
                for item in &r.compliance {
                    output.push_str(&format!(
                        "  [{}], [{}], [{}], [{}], [{}],\n",
                        item.kind.display_name(),
                        fmt_opt(item.limit),
                        fmt_opt(item.value),
                        fmt_opt(item.margin),
                        if item.ok { "OK" } else { "FAIL" },
                    ));
                }
                output.push_str(")\n\n");
            }
            BatchRowResult::Rejected { cable_number, error, .. } => {
                output.push_str(&format!(
                    "=== {} (rejected)\n\n#text(fill: red)[{}]\n\n",
                    escape_typst(cable_number),
                    escape_typst(&error.to_string()),
                ));
            }
        }
    }

    output
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> SizingSchedule {
        let mut schedule = SizingSchedule::new("Test Engineer", "TEST_001", "Client #1");

        let mut row = BulkCableInput::new("FDR_01", 400.0, 50.0);
        row.from_equipment = Some("MCC-1".into());
        row.to_equipment = Some("P-101".into());
        row.load_kw = Some(18.5);
        row.pf = Some(0.85);
        row.eff = Some(0.9);
        row.derating_factors = Some(vec![0.8]);
        row.csa_options = Some(vec![1.5, 2.5, 4.0, 6.0, 10.0, 16.0]);
        row.sc_current = Some(5000.0);
        schedule.add_row(row);
        schedule.add_row(BulkCableInput::new("BAD [1]", 0.0, 5.0));
        schedule.approve("FDR_01").unwrap();
        schedule
    }

    #[test]
    fn test_pdf_generation() {
        let pdf = render_schedule_pdf(&sample_schedule());
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }

    #[test]
    fn test_empty_schedule_rejected() {
        let err = render_schedule_pdf(&SizingSchedule::default()).unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("CBL_01"), "CBL\\_01");
        assert_eq!(escape_typst("#1 [a]"), "\\#1 \\[a\\]");
        assert_eq!(escape_typst("plain"), "plain");
    }

    #[test]
    fn test_summary_rows() {
        let schedule = sample_schedule();
        let results = schedule.size_all();
        let rows = build_summary_rows(&schedule, &schedule.inputs(), &results);
        let lines: Vec<&str> = rows.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[FDR\\_01]"));
        assert!(lines[0].contains("[34.91]"));
        assert!(lines[0].contains("[FAIL], [yes]"));
        assert!(lines[1].contains("[REJECTED]"));
    }
}
