//! Run link, chain and classification steps over all clusters of a sample
//!

use std::sync::mpsc::channel;

use log::{debug, error, info};
use thousands::Separable;

use crate::analysis_settings::AnalysisSettings;
use crate::breakend_index::BreakendIndex;
use crate::chain_finder::find_chains;
use crate::classify_cluster::classify_cluster;
use crate::cluster::{Cluster, ResolvedType};
use crate::cluster_svs::{LohSegment, MergeStats, cluster_svs_by_proximity, merge_clusters};
use crate::link_finder::find_cluster_links;
use crate::linked_pair::LinkedPair;
use crate::sv::{BreakendRef, SampleSvs};

/// Output of one cluster analysis worker
pub struct ClusterAnalysisResult {
    pub cluster: Cluster,

    /// Breakends which were offered more than one assembly link
    pub assembly_conflicts: Vec<BreakendRef>,
}

/// Final clusters of a sample with statistics from the cluster merge pass
pub struct SampleClusterAnalysis {
    pub clusters: Vec<Cluster>,
    pub proximity_cluster_count: usize,
    pub merge_stats: MergeStats,
}

/// Find links and chains for one cluster, then attempt a non-final classification
///
/// All previous analysis results on the cluster are replaced.
///
fn analyze_cluster(
    mut cluster: Cluster,
    svs: &SampleSvs,
    settings: &AnalysisSettings,
) -> ClusterAnalysisResult {
    cluster.reset_analysis();

    let original_sv_indexes = cluster.original_sv_indexes(svs);
    let links = find_cluster_links(svs, &original_sv_indexes, settings);
    let chain_result = find_chains(
        svs,
        cluster.id,
        &cluster.sv_indexes,
        &links.assembly_pairs,
        &links.inferred_pairs,
        settings.chain_tie_break,
    );

    cluster.is_chain_invalid = !chain_result.is_valid;
    cluster.is_fully_chained = chain_result.is_fully_chained();
    cluster.chains = chain_result.chains;
    cluster.linked_pairs = chain_result.linked_pairs;
    cluster.unlinked_svs = chain_result.unlinked_svs;
    cluster.assembly_pairs = links.assembly_pairs;
    cluster.inferred_pairs = links.inferred_pairs;

    if let Err(e) = classify_cluster(&mut cluster, svs, settings, false) {
        error!("Cluster {}: classification failed: {e}", cluster.id);
    }

    ClusterAnalysisResult {
        cluster,
        assembly_conflicts: links.assembly_conflicts,
    }
}

/// Analyze each cluster as an independent task in the worker pool
///
/// Results are returned in cluster id order.
///
fn analyze_clusters_in_pool(
    worker_pool: &rayon::ThreadPool,
    clusters: Vec<Cluster>,
    svs: &SampleSvs,
    settings: &AnalysisSettings,
) -> Vec<ClusterAnalysisResult> {
    let (tx, rx) = channel();

    worker_pool.scope(move |scope| {
        for cluster in clusters {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let result = analyze_cluster(cluster, svs, settings);
                tx.send(result).unwrap();
            });
        }
    });

    let mut results = rx.into_iter().collect::<Vec<_>>();
    results.sort_by_key(|x| x.cluster.id);
    results
}

/// Record assembly conflicts on the SVs and return the analyzed clusters
fn apply_analysis_results(
    svs: &mut SampleSvs,
    results: Vec<ClusterAnalysisResult>,
) -> Vec<Cluster> {
    let mut clusters = Vec::with_capacity(results.len());
    for result in results {
        for be in result.assembly_conflicts {
            svs.svs[be.sv_index].assembly_conflict[be.side.index()] = true;
        }
        clusters.push(result.cluster);
    }
    clusters
}

/// Set the distance to the next SV and the count of SV breakends traversed by the pair
fn annotate_linked_pair(pair: &mut LinkedPair, svs: &SampleSvs, breakend_index: &BreakendIndex) {
    let be1 = svs.breakend(pair.first);
    let be2 = svs.breakend(pair.second);
    let start = std::cmp::min(be1.pos, be2.pos);
    let end = std::cmp::max(be1.pos, be2.pos);
    let exclude_svs = [be1.orig_sv_index, be2.orig_sv_index];
    pair.traversed_sv_count = breakend_index.count_inside(&be1.chrom, start, end, &exclude_svs);
    pair.next_sv_distance =
        breakend_index.nearest_outside_distance(&be1.chrom, start, end, &exclude_svs);
}

fn annotate_linked_pairs(clusters: &mut [Cluster], svs: &SampleSvs) {
    let breakend_index = BreakendIndex::from_sv_indexes(svs, 0..svs.original_count());
    for cluster in clusters.iter_mut() {
        let chain_links = cluster.chains.iter_mut().flat_map(|x| x.links.iter_mut());
        for pair in cluster.linked_pairs.iter_mut().chain(chain_links) {
            annotate_linked_pair(pair, svs, &breakend_index);
        }
    }
}

/// Cluster all SVs of the sample and resolve each cluster's chains and type
///
/// The analysis runs in two phases around the cluster merge pass. All proximity clusters are
/// analyzed in the first phase, and only clusters changed by the merge pass are analyzed again in
/// the second phase. Clusters left unresolved after both phases get a final classification.
///
pub fn analyze_sample_clusters(
    thread_count: usize,
    svs: &mut SampleSvs,
    loh_segments: &[LohSegment],
    settings: &AnalysisSettings,
) -> SampleClusterAnalysis {
    let worker_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .unwrap();

    let clusters = cluster_svs_by_proximity(svs, settings.proximity_distance);
    let proximity_cluster_count = clusters.len();
    info!(
        "Found {} proximity clusters",
        proximity_cluster_count.separate_with_commas()
    );

    let results = analyze_clusters_in_pool(&worker_pool, clusters, svs, settings);
    let mut clusters = apply_analysis_results(svs, results);

    let merge_stats = merge_clusters(&mut clusters, svs, loh_segments);
    info!(
        "Cluster merge pass completed: {} arm merges in {} iterations, {} LOH merges",
        merge_stats.arm_merge_count, merge_stats.arm_merge_iterations, merge_stats.loh_merge_count
    );

    let (merged_clusters, mut clusters): (Vec<_>, Vec<_>) =
        clusters.into_iter().partition(|x| x.is_merged());
    info!(
        "Reanalyzing {} merged clusters",
        merged_clusters.len().separate_with_commas()
    );
    let results = analyze_clusters_in_pool(&worker_pool, merged_clusters, svs, settings);
    clusters.extend(apply_analysis_results(svs, results));
    clusters.sort_by_key(|x| x.id);

    for cluster in clusters
        .iter_mut()
        .filter(|x| x.resolved_type == ResolvedType::None)
    {
        if let Err(e) = classify_cluster(cluster, svs, settings, true) {
            error!("Cluster {}: final classification failed: {e}", cluster.id);
        }
    }

    annotate_linked_pairs(&mut clusters, svs);

    for cluster in clusters.iter() {
        debug!("{cluster:?}");
    }

    SampleClusterAnalysis {
        clusters,
        proximity_cluster_count,
        merge_stats,
    }
}
