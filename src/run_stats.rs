//! Track stats for the whole svlink run
//!

use std::collections::BTreeMap;
use std::fs::File;

use camino::Utf8Path;
use log::info;
use serde::Serialize;
use strum::IntoEnumIterator;
use unwrap::unwrap;

use crate::cluster::{Cluster, ResolvedType};
use crate::cluster_svs::MergeStats;
use crate::globals::PROGRAM_VERSION;
use crate::sv::SampleSvs;

pub const RUN_STATS_FILENAME: &str = "run.stats.json";

#[derive(Default, Serialize)]
pub struct SvStats {
    pub input_sv_count: usize,

    /// Count of additional SV instances created from SV ploidy
    pub replicated_sv_count: usize,
    pub clustered_sv_count: usize,
    pub assembly_conflict_sv_count: usize,
}

#[derive(Default, Serialize)]
pub struct ClusterStats {
    pub proximity_cluster_count: usize,
    pub cluster_count: usize,
    pub merge_stats: MergeStats,

    pub chain_count: usize,

    /// Count of SV instances placed in any chain, including replicated instances
    pub chained_sv_instance_count: usize,
    pub fully_chained_cluster_count: usize,
    pub invalid_chain_cluster_count: usize,

    /// Cluster count for every resolved type, including types with no clusters
    pub resolved_type_counts: BTreeMap<String, usize>,
}

#[derive(Serialize)]
pub struct RunStats {
    pub version: String,
    pub sv_stats: SvStats,
    pub cluster_stats: ClusterStats,
    pub total_analysis_time_secs: f64,
}

pub fn get_sv_stats(svs: &SampleSvs, clusters: &[Cluster]) -> SvStats {
    SvStats {
        input_sv_count: svs.original_count(),
        replicated_sv_count: svs.svs.len() - svs.original_count(),
        clustered_sv_count: clusters.iter().map(|x| x.original_sv_count(svs)).sum(),
        assembly_conflict_sv_count: svs.svs[..svs.original_count()]
            .iter()
            .filter(|x| x.assembly_conflict.iter().any(|&c| c))
            .count(),
    }
}

pub fn get_cluster_stats(
    clusters: &[Cluster],
    proximity_cluster_count: usize,
    merge_stats: MergeStats,
) -> ClusterStats {
    let mut resolved_type_counts = ResolvedType::iter()
        .map(|x| (x.to_string(), 0))
        .collect::<BTreeMap<_, _>>();
    for cluster in clusters.iter() {
        *resolved_type_counts
            .entry(cluster.resolved_type.to_string())
            .or_default() += 1;
    }

    ClusterStats {
        proximity_cluster_count,
        cluster_count: clusters.len(),
        merge_stats,
        chain_count: clusters.iter().map(|x| x.chains.len()).sum(),
        chained_sv_instance_count: clusters.iter().map(|x| x.chained_sv_count()).sum(),
        fully_chained_cluster_count: clusters.iter().filter(|x| x.is_fully_chained).count(),
        invalid_chain_cluster_count: clusters.iter().filter(|x| x.is_chain_invalid).count(),
        resolved_type_counts,
    }
}

impl RunStats {
    pub fn new(
        sv_stats: SvStats,
        cluster_stats: ClusterStats,
        total_analysis_time_secs: f64,
    ) -> Self {
        Self {
            version: PROGRAM_VERSION.to_string(),
            sv_stats,
            cluster_stats,
            total_analysis_time_secs,
        }
    }
}

/// Write run_stats structure out in json format
pub fn write_run_stats(output_dir: &Utf8Path, run_stats: &RunStats) {
    let filename = output_dir.join(RUN_STATS_FILENAME);

    info!("Writing run statistics to file: '{filename}'");

    let f = unwrap!(
        File::create(&filename),
        "Unable to create run statistics json file: '{filename}'"
    );

    serde_json::to_writer_pretty(&f, &run_stats).unwrap();
}
