use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use cable_core::calculations::StartMethod;

#[derive(Parser, Debug)]
#[command(author, version, about = "Size low-voltage power cables", long_about = None)]
pub struct Cli {
    /// Set the logging level (RUST_LOG overrides)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: tracing::Level,

    /// Cable catalog file (.json array or .csv); the built-in table is used otherwise
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// TOML file with defaults for absent row fields
    #[arg(long, global = true)]
    pub defaults: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Size a single cable
    Size(SizeArgs),
    /// Size every row of a JSON file
    Batch {
        /// JSON array of rows
        rows: PathBuf,
        /// Candidate sizes for rows without any are taken from the catalog
        #[arg(long)]
        catalog_sizes: bool,
        /// Also write the results as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List or filter the cable catalog
    Catalog {
        #[arg(long)]
        min_csa: Option<f64>,
        #[arg(long)]
        max_csa: Option<f64>,
        #[arg(long)]
        min_rating: Option<f64>,
        /// Case-insensitive substring of the description
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Suggest catalog entries for rows of a JSON file
    Match {
        /// JSON array of rows (target csa, current, description)
        rows: PathBuf,
        /// Suggestions per row
        #[arg(long, default_value_t = 3)]
        top: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Manage a sizing schedule file
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommands {
    /// Create an empty schedule
    New {
        path: PathBuf,
        #[arg(long, default_value = "")]
        engineer: String,
        #[arg(long, default_value = "")]
        job: String,
        #[arg(long, default_value = "")]
        client: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Append rows from a JSON file
    Add {
        path: PathBuf,
        rows: PathBuf,
    },
    /// Approve cables by number
    Approve {
        path: PathBuf,
        #[arg(required = true)]
        cables: Vec<String>,
        /// Withdraw the approval instead
        #[arg(long)]
        revoke: bool,
    },
    /// Size every row of the schedule
    Run {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Export sized rows as CSV
    Export {
        path: PathBuf,
        out: PathBuf,
        #[arg(long)]
        approved_only: bool,
    },
    /// Render the schedule as a PDF report
    Report {
        path: PathBuf,
        out: PathBuf,
    },
}

/// Flags for a single cable. `--input` replaces all of them.
#[derive(Args, Debug, Default)]
pub struct SizeArgs {
    /// JSON file holding a complete cable input
    #[arg(long, conflicts_with_all = ["load_kw", "load_kva", "current"])]
    pub input: Option<PathBuf>,

    #[arg(long, default_value = "")]
    pub cable: String,

    /// Active load (kW)
    #[arg(long)]
    pub load_kw: Option<f64>,

    /// Apparent load (kVA)
    #[arg(long)]
    pub load_kva: Option<f64>,

    /// Load current (A), takes precedence over kW and kVA
    #[arg(long)]
    pub current: Option<f64>,

    /// Line-to-line voltage (V)
    #[arg(long, required_unless_present = "input")]
    pub voltage: Option<f64>,

    /// Route length (m)
    #[arg(long, required_unless_present = "input")]
    pub length: Option<f64>,

    #[arg(long)]
    pub pf: Option<f64>,

    #[arg(long)]
    pub eff: Option<f64>,

    /// Voltage-drop coefficient (mV/A/m)
    #[arg(long)]
    pub mv_per_a_m: Option<f64>,

    /// Conductor resistance (ohm/km); switches to impedance-based drop
    #[arg(long)]
    pub r_ohm_per_km: Option<f64>,

    /// Conductor reactance (ohm/km)
    #[arg(long, requires = "r_ohm_per_km")]
    pub x_ohm_per_km: Option<f64>,

    /// Derating factors, comma separated
    #[arg(long, value_delimiter = ',')]
    pub derating: Vec<f64>,

    /// Candidate sizes (mm²), comma separated; the catalog sizes otherwise
    #[arg(long, value_delimiter = ',')]
    pub csa: Vec<f64>,

    /// Prospective fault current (A)
    #[arg(long)]
    pub sc_current: Option<f64>,

    /// Fault clearing time (s)
    #[arg(long)]
    pub sc_time: Option<f64>,

    /// Material constant k
    #[arg(long)]
    pub k_const: Option<f64>,

    #[arg(long, value_enum)]
    pub start: Option<StartArg>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartArg {
    Dol,
    StarDelta,
    Vfd,
}

impl From<StartArg> for StartMethod {
    fn from(arg: StartArg) -> Self {
        match arg {
            StartArg::Dol => StartMethod::DirectOnLine,
            StartArg::StarDelta => StartMethod::StarDelta,
            StartArg::Vfd => StartMethod::Vfd,
        }
    }
}
