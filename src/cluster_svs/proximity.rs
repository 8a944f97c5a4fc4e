use std::collections::VecDeque;

use crate::breakend_index::BreakendIndex;
use crate::cluster::{Cluster, ClusterReason};
use crate::sv::{SampleSvs, SvType};

/// Group all clusterable SVs of the sample into clusters by breakend proximity
///
/// Each cluster is the transitive closure of SVs with any pair of breakends on the same
/// chromosome within `proximity_distance` bases. Seeds are taken in SV input order, so cluster ids
/// follow the input position of each cluster's first SV.
///
/// INS SVs are not clustered. Replicated instances join the cluster of their original SV.
///
pub fn cluster_svs_by_proximity(svs: &SampleSvs, proximity_distance: i64) -> Vec<Cluster> {
    let debug = false;

    let is_clusterable = |sv_index: usize| svs.svs[sv_index].sv_type != SvType::Ins;

    let original_count = svs.original_count();
    let index =
        BreakendIndex::from_sv_indexes(svs, (0..original_count).filter(|&x| is_clusterable(x)));
    let instances = svs.instances_by_original();

    let mut assigned = vec![false; original_count];
    let mut clusters = Vec::new();
    for seed_index in 0..original_count {
        if assigned[seed_index] || !is_clusterable(seed_index) {
            continue;
        }

        assigned[seed_index] = true;
        let mut members = vec![seed_index];
        let mut queue = VecDeque::from([seed_index]);
        while let Some(sv_index) = queue.pop_front() {
            for be in svs.svs[sv_index].breakends() {
                let start = be.pos.saturating_sub(proximity_distance);
                let end = be.pos.saturating_add(proximity_distance);
                for hit in index.breakends_in_range(&be.chrom, start, end) {
                    let hit_index = hit.be.sv_index;
                    if !assigned[hit_index] {
                        assigned[hit_index] = true;
                        members.push(hit_index);
                        queue.push_back(hit_index);
                    }
                }
            }
        }

        let sv_indexes = members
            .iter()
            .flat_map(|&x| instances[x].iter().copied())
            .collect::<Vec<_>>();
        let cluster = Cluster::new(clusters.len(), sv_indexes, ClusterReason::Proximity, svs);
        if debug {
            eprintln!("Proximity cluster: {cluster:?}");
        }
        clusters.push(cluster);
    }
    clusters
}
