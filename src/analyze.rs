//! Run the analyze command on one sample
//!

use camino::Utf8Path;
use log::{info, warn};
use thousands::Separable;

use crate::analysis_settings::AnalysisSettings;
use crate::analyze_clusters::analyze_sample_clusters;
use crate::cli::{AnalyzeSettings, SharedSettings, write_analyze_settings};
use crate::read_sample_data::{
    read_chrom_copy_numbers, read_loh_segments, read_ref_coords, read_sv_table,
};
use crate::run_stats::{RunStats, get_cluster_stats, get_sv_stats, write_run_stats};
use crate::sample_output::write_sample_output;
use crate::sv::{ChromCopyNumbers, SampleSvs};

/// Load all sample inputs and build the SV arena, including replicated SV instances
fn get_sample_svs(settings: &AnalyzeSettings) -> SampleSvs {
    let ref_coords = read_ref_coords(Utf8Path::new(&settings.ref_coords_filename));
    info!(
        "Read reference coordinates for {} chromosomes",
        ref_coords.len()
    );

    let sv_inputs = read_sv_table(Utf8Path::new(&settings.sv_table_filename));
    info!("Read {} SVs", sv_inputs.len().separate_with_commas());

    let chrom_copy_numbers = match &settings.chrom_cn_filename {
        Some(filename) => {
            read_chrom_copy_numbers(Utf8Path::new(filename), settings.default_chrom_cn)
        }
        None => ChromCopyNumbers::new(settings.default_chrom_cn),
    };

    let mut svs = SampleSvs::new(&ref_coords, sv_inputs);

    let unknown_arm_count = svs
        .svs
        .iter()
        .flat_map(|x| x.breakends())
        .filter(|x| !x.arm.is_valid())
        .count();
    if unknown_arm_count > 0 {
        warn!(
            "{} breakends are outside of the reference coordinates, these are excluded from all chromosome arm checks",
            unknown_arm_count.separate_with_commas()
        );
    }

    let replica_count =
        svs.expand_replicated_svs(&chrom_copy_numbers, settings.max_replication_count);
    info!(
        "Added {} replicated SV instances",
        replica_count.separate_with_commas()
    );
    svs
}

pub fn run_analyze(shared_settings: &SharedSettings, settings: &AnalyzeSettings) {
    let start = std::time::Instant::now();

    write_analyze_settings(&settings.output_dir, settings);

    let mut svs = get_sample_svs(settings);
    let loh_segments = match &settings.loh_table_filename {
        Some(filename) => read_loh_segments(Utf8Path::new(filename)),
        None => Vec::new(),
    };

    let analysis_settings = AnalysisSettings::new(settings);
    let analysis = analyze_sample_clusters(
        shared_settings.thread_count,
        &mut svs,
        &loh_segments,
        &analysis_settings,
    );
    info!(
        "Resolved {} clusters with {} chains",
        analysis.clusters.len().separate_with_commas(),
        analysis
            .clusters
            .iter()
            .map(|x| x.chains.len())
            .sum::<usize>()
            .separate_with_commas()
    );

    write_sample_output(&settings.output_dir, &svs, &analysis.clusters);

    let run_stats = RunStats::new(
        get_sv_stats(&svs, &analysis.clusters),
        get_cluster_stats(
            &analysis.clusters,
            analysis.proximity_cluster_count,
            analysis.merge_stats,
        ),
        start.elapsed().as_secs_f64(),
    );
    write_run_stats(&settings.output_dir, &run_stats);
}
