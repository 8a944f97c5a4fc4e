//! Log setup for the svlink run, writing to stderr and to a log file in the output directory
//!

use camino::{Utf8Path, Utf8PathBuf};

use crate::cli;
use crate::globals::PROGRAM_NAME;

pub fn get_log_filename(output_dir: &Utf8Path) -> Utf8PathBuf {
    output_dir.join(format!("{PROGRAM_NAME}.log"))
}

fn setup_logger(log_filename: &Utf8Path, debug: bool) -> Result<(), fern::InitError> {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                PROGRAM_NAME,
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .chain(fern::log_file(log_filename)?)
        .apply()?;
    Ok(())
}

/// Create the output directory, then setup the logger to write into it
///
/// An existing output directory is only accepted with `clobber`. Any error here is reported
/// directly to stderr, since no logger is available yet.
///
pub fn setup_output_dir_and_logger(output_dir: &Utf8Path, clobber: bool, debug: bool) {
    if let Err(msg) = cli::check_novel_dirname(output_dir, "Output directory") {
        if !(clobber && output_dir.is_dir()) {
            eprintln!("Invalid command-line setting: {msg}");
            std::process::exit(exitcode::USAGE);
        }
    }

    if let Err(e) = std::fs::create_dir_all(output_dir) {
        eprintln!("Can't create output directory '{output_dir}': {e}");
        std::process::exit(exitcode::CANTCREAT);
    }

    if let Err(e) = setup_logger(&get_log_filename(output_dir), debug) {
        eprintln!("Can't setup logger: {e}");
        std::process::exit(exitcode::CANTCREAT);
    }
}
