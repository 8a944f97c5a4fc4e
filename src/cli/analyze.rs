use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use const_format::concatcp;
use serde::Serialize;
use simple_error::{SimpleResult, bail};
use unwrap::unwrap;

use crate::analysis_settings::ChainTieBreak;

pub const SETTINGS_FILENAME: &str = "analyze.settings.json";

#[derive(Args, Serialize)]
pub struct AnalyzeSettings {
    /// Directory for all analyze command output (must not already exist)
    #[arg(
        long,
        value_name = "DIR",
        default_value = concatcp!(env!("CARGO_PKG_NAME"), "_analyze_output")
    )]
    pub output_dir: Utf8PathBuf,

    /// Somatic SVs of one sample, in tab-separated table format
    #[arg(long = "sv-table", value_name = "FILE")]
    pub sv_table_filename: String,

    /// Chromosome lengths and centromere positions, in tab-separated table format
    #[arg(long = "ref-coords", value_name = "FILE")]
    pub ref_coords_filename: String,

    /// Loss of heterozygosity segments, each given by the SV ids bounding the segment
    ///
    /// Clusters holding the SVs at either end of a segment are merged.
    ///
    #[arg(long = "loh-table", value_name = "FILE")]
    pub loh_table_filename: Option<String>,

    /// Copy number of each chromosome, used to find the number of instances of each SV
    #[arg(long = "chrom-cn", value_name = "FILE")]
    pub chrom_cn_filename: Option<String>,

    /// Copy number used for any chromosome missing from the --chrom-cn table
    #[arg(long, default_value_t = 1.0)]
    pub default_chrom_cn: f64,

    /// Maximum distance between breakends of two SVs for the SVs to be clustered
    #[arg(long, default_value_t = 100_000)]
    pub proximity_distance: i64,

    /// Facing breakends closer than this distance form a deletion bridge instead of a templated
    /// insertion
    #[arg(long, default_value_t = 30)]
    pub min_ti_length: i64,

    /// Templated insertions longer than this are treated as long in cluster classification
    #[arg(long, default_value_t = 1000)]
    pub short_ti_length: i64,

    /// Maximum length of a deletion bridge joining the two sides of a reciprocal event
    #[arg(long, default_value_t = 1000)]
    pub max_db_length: i64,

    /// Minimum length of a simple or synthetic DEL/DUP to be marked as long
    #[arg(long, default_value_t = 100_000)]
    pub del_dup_long_length: i64,

    /// Clusters of up to this many simple SVs are resolved directly to the SV type
    #[arg(long, default_value_t = 2)]
    pub small_cluster_size: usize,

    /// Maximum number of additional instances created for a single SV
    #[arg(long, default_value_t = 8)]
    pub max_replication_count: usize,

    /// Ordering of equal length templated insertion candidates in chain assembly
    ///
    /// 'arrival' keeps the order in which candidates were found, 'position' orders by the genomic
    /// position of the candidate's first breakend.
    ///
    #[arg(long, value_name = "POLICY", default_value_t = ChainTieBreak::Arrival)]
    pub chain_tie_break: ChainTieBreak,

    /// Require both breakends of a templated insertion to be on the same chromosome arm
    #[arg(hide = true, long)]
    pub no_centromere_span: bool,
}

/// Check an input table filename
///
/// Assumes no logger has been configured yet
///
fn check_table_filename(filename: &str, label: &str) -> SimpleResult<()> {
    if filename.is_empty() {
        bail!("Must specify {label} file");
    }
    let path = Utf8Path::new(filename);
    if !path.exists() {
        bail!("Can't find specified {label} file: '{filename}'");
    }
    if !path.is_file() {
        bail!("Specified {label} file path does not appear to be a file: '{filename}'");
    }
    Ok(())
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_analyze_settings(
    settings: AnalyzeSettings,
) -> SimpleResult<AnalyzeSettings> {
    check_table_filename(&settings.sv_table_filename, "SV table")?;
    check_table_filename(&settings.ref_coords_filename, "reference coordinate")?;
    if let Some(filename) = &settings.loh_table_filename {
        check_table_filename(filename, "LOH table")?;
    }
    if let Some(filename) = &settings.chrom_cn_filename {
        check_table_filename(filename, "chromosome copy number")?;
    }

    if settings.default_chrom_cn <= 0.0 {
        bail!("--default-chrom-cn argument must be greater than 0");
    }
    if settings.proximity_distance < 0 {
        bail!("--proximity-distance argument must not be negative");
    }
    if settings.min_ti_length < 0 {
        bail!("--min-ti-length argument must not be negative");
    }
    if settings.short_ti_length < settings.min_ti_length {
        bail!(
            "--short-ti-length argument must be at least the min TI length of {}",
            settings.min_ti_length
        );
    }
    if settings.max_db_length < 0 {
        bail!("--max-db-length argument must not be negative");
    }
    if settings.small_cluster_size == 0 {
        bail!("--small-cluster-size argument must be greater than 0");
    }

    Ok(settings)
}

pub fn write_analyze_settings(output_dir: &Utf8Path, settings: &AnalyzeSettings) {
    use log::info;

    let filename = output_dir.join(SETTINGS_FILENAME);

    info!("Writing analyze settings to file: '{filename}'");

    let f = unwrap!(
        std::fs::File::create(&filename),
        "Unable to create analyze settings json file: '{filename}'"
    );

    serde_json::to_writer_pretty(&f, &settings).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        analyze: AnalyzeSettings,
    }

    #[test]
    fn test_analyze_defaults() {
        let cli = TestCli::parse_from(["test", "--sv-table", "x.tsv", "--ref-coords", "y.tsv"]);
        let settings = cli.analyze;
        assert_eq!(settings.proximity_distance, 100_000);
        assert_eq!(settings.min_ti_length, 30);
        assert_eq!(settings.max_replication_count, 8);
        assert_eq!(settings.chain_tie_break, ChainTieBreak::Arrival);
        assert!(!settings.no_centromere_span);
        assert_eq!(settings.output_dir.as_str(), "svlink_analyze_output");
    }

    #[test]
    fn test_tie_break_option() {
        let cli = TestCli::parse_from([
            "test",
            "--sv-table",
            "x.tsv",
            "--ref-coords",
            "y.tsv",
            "--chain-tie-break",
            "position",
        ]);
        assert_eq!(cli.analyze.chain_tie_break, ChainTieBreak::Position);
    }

    #[test]
    fn test_missing_input_file() {
        let cli = TestCli::parse_from([
            "test",
            "--sv-table",
            "missing_sv_table.tsv",
            "--ref-coords",
            "missing_ref_coords.tsv",
        ]);
        assert!(validate_and_fix_analyze_settings(cli.analyze).is_err());
    }
}
