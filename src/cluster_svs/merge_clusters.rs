use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::cluster::{Cluster, ClusterReason};
use crate::sv::SampleSvs;

const MAX_ARM_MERGE_ITERATIONS: usize = 5;

/// LOH segment bounded by two SVs of the sample
#[derive(Clone, Debug, Deserialize)]
pub struct LohSegment {
    pub sv_id_start: String,
    pub sv_id_end: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct MergeStats {
    pub arm_merge_count: usize,
    pub arm_merge_iterations: usize,
    pub loh_merge_count: usize,
    pub loh_missing_sv_count: usize,
}

fn can_arm_merge(cluster1: &Cluster, cluster2: &Cluster, svs: &SampleSvs) -> bool {
    cluster1.arm_count() > 1
        && cluster2.arm_count() > 1
        && !cluster1.is_simple_consistent_pair(svs)
        && !cluster2.is_simple_consistent_pair(svs)
        && cluster1.shared_arm_group_count(cluster2) >= 2
}

/// Run one pass over all cluster pairs, merging each pair sharing enough chromosome arms
///
/// Returns the number of merges
///
fn merge_clusters_on_shared_arms(clusters: &mut Vec<Cluster>, svs: &SampleSvs) -> usize {
    let mut merge_count = 0;
    let mut cluster_index = 0;
    while cluster_index < clusters.len() {
        let mut other_index = cluster_index + 1;
        while other_index < clusters.len() {
            if can_arm_merge(&clusters[cluster_index], &clusters[other_index], svs) {
                let other = clusters.remove(other_index);
                debug!(
                    "Arm merge of cluster {} into cluster {}",
                    other.id, clusters[cluster_index].id
                );
                clusters[cluster_index].merge(other, ClusterReason::ArmMerge, svs);
                merge_count += 1;
            } else {
                other_index += 1;
            }
        }
        cluster_index += 1;
    }
    merge_count
}

fn find_cluster_index(clusters: &[Cluster], sv_index: usize) -> Option<usize> {
    clusters
        .iter()
        .position(|x| x.sv_indexes.binary_search(&sv_index).is_ok())
}

/// Merge the two clusters holding the SVs at either end of each LOH segment
fn merge_clusters_on_loh(
    clusters: &mut Vec<Cluster>,
    svs: &SampleSvs,
    loh_segments: &[LohSegment],
    stats: &mut MergeStats,
) {
    for segment in loh_segments.iter() {
        let mut cluster_indexes = Vec::new();
        for sv_id in [&segment.sv_id_start, &segment.sv_id_end] {
            let cluster_index = svs
                .find_original_by_id(sv_id)
                .and_then(|x| find_cluster_index(clusters, x));
            match cluster_index {
                Some(x) => cluster_indexes.push(x),
                None => {
                    error!("LOH segment SV id '{sv_id}' is not found in any cluster, skipping merge");
                    stats.loh_missing_sv_count += 1;
                }
            }
        }
        if cluster_indexes.len() != 2 || cluster_indexes[0] == cluster_indexes[1] {
            continue;
        }

        cluster_indexes.sort();
        let other = clusters.remove(cluster_indexes[1]);
        let target = &mut clusters[cluster_indexes[0]];
        debug!(
            "LOH merge of cluster {} into cluster {} for segment {}-{}",
            other.id, target.id, segment.sv_id_start, segment.sv_id_end
        );
        target.merge(other, ClusterReason::Loh, svs);
        stats.loh_merge_count += 1;
    }
}

/// Merge clusters sharing at least two chromosome arms, then clusters joined by LOH segments
///
/// Merged clusters have their analysis state reset and keep the id of the absorbing cluster.
///
pub fn merge_clusters(
    clusters: &mut Vec<Cluster>,
    svs: &SampleSvs,
    loh_segments: &[LohSegment],
) -> MergeStats {
    let mut stats = MergeStats::default();
    for _ in 0..MAX_ARM_MERGE_ITERATIONS {
        stats.arm_merge_iterations += 1;
        let merge_count = merge_clusters_on_shared_arms(clusters, svs);
        stats.arm_merge_count += merge_count;
        if merge_count == 0 {
            break;
        }
    }

    merge_clusters_on_loh(clusters, svs, loh_segments, &mut stats);
    stats
}
