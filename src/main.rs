mod analysis_settings;
mod analyze;
mod analyze_clusters;
mod breakend_index;
mod chain;
mod chain_finder;
mod classify_cluster;
mod cli;
mod cluster;
mod cluster_svs;
mod geometry;
mod globals;
mod link_finder;
mod linked_pair;
mod logger;
mod read_sample_data;
mod ref_genome;
mod run_stats;
mod sample_output;
mod sv;

use std::{error, process};

use hhmmss::Hhmmss;
use log::info;

use crate::analyze::run_analyze;
use crate::cli::Commands;
use crate::globals::{PROGRAM_NAME, PROGRAM_VERSION};
use crate::logger::setup_output_dir_and_logger;

fn run(settings: &cli::Settings) -> Result<(), Box<dyn error::Error>> {
    info!("Starting {PROGRAM_NAME} {PROGRAM_VERSION}");
    info!(
        "cmdline: {}",
        std::env::args().collect::<Vec<_>>().join(" ")
    );
    info!("Running on {} threads", settings.shared.thread_count);

    let start = std::time::Instant::now();

    match &settings.command {
        Commands::Analyze(x) => {
            run_analyze(&settings.shared, x);
        }
    }

    info!(
        "{PROGRAM_NAME} completed. Total Runtime: {}",
        start.elapsed().hhmmssxxx()
    );
    Ok(())
}

fn main() {
    let settings = cli::validate_and_fix_settings(cli::parse_settings());

    // Setup logger, including creation of the output directory for the log file:
    setup_output_dir_and_logger(
        settings.get_output_dir(),
        settings.shared.clobber,
        settings.shared.debug,
    );

    if let Err(err) = run(&settings) {
        eprintln!("{err}");
        process::exit(2);
    }
}
