pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");

/// Program version reported in the log and in run statistics
pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");
