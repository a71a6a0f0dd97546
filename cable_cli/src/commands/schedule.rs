use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use cable_core::calculations::SizingDefaults;
use cable_core::schedule::SizingSchedule;
use cable_core::{export, file_io, pdf};

use crate::cli::{OutputFormat, ScheduleCommands};

pub fn handle(command: &ScheduleCommands, defaults: Option<&SizingDefaults>) -> Result<()> {
    match command {
        ScheduleCommands::New {
            path,
            engineer,
            job,
            client,
            force,
        } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let mut schedule = SizingSchedule::new(engineer.as_str(), job.as_str(), client.as_str());
            if let Some(defaults) = defaults {
                schedule.settings.defaults = defaults.clone();
            }
            save(&schedule, path)?;
            println!("Created schedule {}", path.display());
            Ok(())
        }
        ScheduleCommands::Add { path, rows } => {
            let mut schedule = load(path)?;
            let new_rows = file_io::load_rows(rows).with_context(|| format!("loading rows {}", rows.display()))?;
            let count = new_rows.len();
            for row in new_rows {
                schedule.add_row(row);
            }
            save(&schedule, path)?;
            println!("Added {} rows ({} total)", count, schedule.row_count());
            Ok(())
        }
        ScheduleCommands::Approve { path, cables, revoke } => {
            let mut schedule = load(path)?;
            for cable in cables {
                if *revoke {
                    if !schedule.unapprove(cable) {
                        info!(cable = %cable, "cable was not approved");
                    }
                } else {
                    schedule.approve(cable)?;
                }
            }
            save(&schedule, path)?;
            println!("{} approved cables", schedule.approved.len());
            Ok(())
        }
        ScheduleCommands::Run { path, format } => {
            let schedule = load(path)?;
            let results = schedule.size_all();
            match format {
                OutputFormat::Json => super::print_json(&results),
                OutputFormat::Table => {
                    super::print_results_table(&results);
                    Ok(())
                }
            }
        }
        ScheduleCommands::Export { path, out, approved_only } => {
            let schedule = load(path)?;
            let results = schedule.size_all();
            let csv = export::schedule_to_csv(&schedule, &results, *approved_only)?;
            file_io::write_atomic(out, csv.as_bytes()).with_context(|| format!("writing {}", out.display()))?;
            println!("Wrote {}", out.display());
            Ok(())
        }
        ScheduleCommands::Report { path, out } => {
            let schedule = load(path)?;
            let bytes = pdf::render_schedule_pdf(&schedule).context("rendering report")?;
            file_io::write_atomic(out, &bytes).with_context(|| format!("writing {}", out.display()))?;
            println!("Wrote {} ({} bytes)", out.display(), bytes.len());
            Ok(())
        }
    }
}

fn load(path: &Path) -> Result<SizingSchedule> {
    file_io::load_schedule(path).with_context(|| format!("loading schedule {}", path.display()))
}

fn save(schedule: &SizingSchedule, path: &Path) -> Result<()> {
    file_io::save_schedule(schedule, path).with_context(|| format!("saving schedule {}", path.display()))
}
