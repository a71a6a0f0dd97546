//! # cable_cli
//!
//! Command-line front end for `cable_core`: size single cables or batches,
//! browse and match the cable catalog, and manage sizing schedules
//! (CSV export and PDF report included).
//!
//! Results go to stdout; logs go to stderr.

use clap::Parser;

mod cli;
mod commands;
mod logging;

use cable_core::catalog::CatalogQuery;
use cli::{Cli, Commands};

fn run(cli: &Cli) -> anyhow::Result<()> {
    let catalog_path = cli.catalog.as_deref();
    let defaults_path = cli.defaults.as_deref();

    match &cli.command {
        Commands::Size(args) => {
            let defaults = commands::load_defaults(defaults_path)?;
            let catalog = commands::load_catalog(catalog_path)?;
            commands::size::handle(args, &defaults, &catalog)
        }
        Commands::Batch {
            rows,
            catalog_sizes,
            csv,
            format,
        } => {
            let defaults = commands::load_defaults(defaults_path)?;
            let catalog = commands::load_catalog(catalog_path)?;
            commands::batch::handle_batch(rows, &defaults, &catalog, *catalog_sizes, csv.as_deref(), *format)
        }
        Commands::Catalog {
            min_csa,
            max_csa,
            min_rating,
            search,
            format,
        } => {
            let catalog = commands::load_catalog(catalog_path)?;
            let query = CatalogQuery {
                min_csa: *min_csa,
                max_csa: *max_csa,
                min_current_rating: *min_rating,
                search: search.clone(),
            };
            commands::catalog::handle(&catalog, &query, *format)
        }
        Commands::Match { rows, top, format } => {
            let catalog = commands::load_catalog(catalog_path)?;
            commands::batch::handle_match(rows, &catalog, *top, *format)
        }
        Commands::Schedule { command } => {
            let defaults = match defaults_path {
                Some(_) => Some(commands::load_defaults(defaults_path)?),
                None => None,
            };
            commands::schedule::handle(command, defaults.as_ref())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
