//! Write per-SV and per-cluster analysis results in json format
//!

use std::fs::File;

use camino::Utf8Path;
use log::info;
use serde::Serialize;
use unwrap::unwrap;

use crate::chain::Chain;
use crate::cluster::{Cluster, ClusterReason, ResolvedType, SuperType};
use crate::linked_pair::{LinkType, LinkedPair};
use crate::sv::{BreakendSide, SampleSvs, SvType};

pub const SV_OUTPUT_FILENAME: &str = "sample.svs.json";
pub const CLUSTER_OUTPUT_FILENAME: &str = "sample.clusters.json";

/// Cluster annotations of one original SV
#[derive(Serialize)]
pub struct SvOutput<'a> {
    pub id: &'a str,
    pub sv_type: SvType,
    pub replication_count: usize,
    pub assembly_conflict: [bool; 2],

    /// Copy number change across each breakend
    pub breakend_copy_number_change: Vec<f64>,
    pub cluster_id: Option<usize>,
    pub resolved_type: ResolvedType,
    pub super_type: SuperType,
    pub cluster_consistency_count: i32,
    pub cluster_arm_count: usize,

    /// Chain id for each instance of the SV, starting with the original
    pub chain_ids: Vec<Option<usize>>,
}

#[derive(Serialize)]
pub struct LinkedPairOutput<'a> {
    pub sv_id1: &'a str,
    pub side1: BreakendSide,
    pub sv_id2: &'a str,
    pub side2: BreakendSide,
    pub chrom: &'a str,
    pub pos1: i64,
    pub pos2: i64,
    pub link_type: LinkType,
    pub length: i64,
    pub is_assembled: bool,
    pub next_sv_distance: Option<i64>,
    pub traversed_sv_count: usize,
}

#[derive(Serialize)]
pub struct ChainOutput<'a> {
    pub id: usize,

    /// SV ids in chain order, replicated SVs appear once per instance
    pub sv_ids: Vec<&'a str>,
    pub links: Vec<LinkedPairOutput<'a>>,
}

#[derive(Serialize)]
pub struct ClusterOutput<'a> {
    pub id: usize,
    pub reasons: &'a [ClusterReason],
    pub sv_ids: Vec<&'a str>,
    pub instance_count: usize,
    pub resolved_type: ResolvedType,
    pub super_type: SuperType,
    pub is_long: bool,
    pub synthetic_length: i64,
    pub consistency_count: i32,
    pub arm_count: usize,
    pub is_fully_chained: bool,
    pub is_chain_invalid: bool,
    pub chains: Vec<ChainOutput<'a>>,
    pub unlinked_sv_ids: Vec<&'a str>,
}

fn get_linked_pair_output<'a>(svs: &'a SampleSvs, pair: &LinkedPair) -> LinkedPairOutput<'a> {
    let be1 = svs.breakend(pair.first);
    let be2 = svs.breakend(pair.second);
    LinkedPairOutput {
        sv_id1: &svs.svs[be1.sv_index].id,
        side1: be1.side,
        sv_id2: &svs.svs[be2.sv_index].id,
        side2: be2.side,
        chrom: &be1.chrom,
        pos1: be1.pos,
        pos2: be2.pos,
        link_type: pair.link_type,
        length: pair.length,
        is_assembled: !pair.is_inferred,
        next_sv_distance: pair.next_sv_distance,
        traversed_sv_count: pair.traversed_sv_count,
    }
}

fn get_chain_output<'a>(svs: &'a SampleSvs, chain: &Chain) -> ChainOutput<'a> {
    ChainOutput {
        id: chain.id,
        sv_ids: chain
            .sv_indexes()
            .into_iter()
            .map(|x| svs.svs[x].id.as_str())
            .collect(),
        links: chain
            .links
            .iter()
            .map(|x| get_linked_pair_output(svs, x))
            .collect(),
    }
}

pub fn get_cluster_output<'a>(svs: &'a SampleSvs, cluster: &'a Cluster) -> ClusterOutput<'a> {
    let sv_id = move |x: &usize| svs.svs[*x].id.as_str();
    ClusterOutput {
        id: cluster.id,
        reasons: &cluster.reasons,
        sv_ids: cluster.original_sv_indexes(svs).iter().map(sv_id).collect(),
        instance_count: cluster.sv_indexes.len(),
        resolved_type: cluster.resolved_type,
        super_type: cluster.super_type(),
        is_long: cluster.is_long,
        synthetic_length: cluster.synthetic_length,
        consistency_count: cluster.consistency_count,
        arm_count: cluster.arm_count(),
        is_fully_chained: cluster.is_fully_chained,
        is_chain_invalid: cluster.is_chain_invalid,
        chains: cluster
            .chains
            .iter()
            .map(|x| get_chain_output(svs, x))
            .collect(),
        unlinked_sv_ids: cluster.unlinked_svs.iter().map(sv_id).collect(),
    }
}

/// Get annotations for every original SV, in input order
///
/// SVs which are not in any cluster, such as insertions, have no cluster id and resolved type
/// NONE.
///
pub fn get_sv_output<'a>(svs: &'a SampleSvs, clusters: &[Cluster]) -> Vec<SvOutput<'a>> {
    let mut sv_cluster = vec![None; svs.svs.len()];
    for (cluster_index, cluster) in clusters.iter().enumerate() {
        for &sv_index in cluster.sv_indexes.iter() {
            sv_cluster[sv_index] = Some(cluster_index);
        }
    }

    svs.instances_by_original()
        .into_iter()
        .enumerate()
        .map(|(sv_index, instances)| {
            let sv = &svs.svs[sv_index];
            let cluster = sv_cluster[sv_index].map(|x| &clusters[x]);
            SvOutput {
                id: &sv.id,
                sv_type: sv.sv_type,
                replication_count: sv.replication_count,
                assembly_conflict: sv.assembly_conflict,
                breakend_copy_number_change: sv
                    .breakends()
                    .map(|x| x.copy_number_change())
                    .collect(),
                cluster_id: cluster.map(|x| x.id),
                resolved_type: cluster.map_or(ResolvedType::None, |x| x.resolved_type),
                super_type: cluster.map_or(SuperType::Complex, |x| x.super_type()),
                cluster_consistency_count: cluster.map_or(0, |x| x.consistency_count),
                cluster_arm_count: cluster.map_or(0, |x| x.arm_count()),
                chain_ids: instances
                    .iter()
                    .map(|&x| cluster.and_then(|c| c.chain_id_of_sv(x)))
                    .collect(),
            }
        })
        .collect()
}

fn write_json_file<T: Serialize>(output_dir: &Utf8Path, filename: &str, label: &str, data: &T) {
    let filename = output_dir.join(filename);

    info!("Writing {label} to file: '{filename}'");

    let f = unwrap!(
        File::create(&filename),
        "Unable to create {label} json file: '{filename}'"
    );
    unwrap!(
        serde_json::to_writer_pretty(&f, data),
        "Unable to write {label} json file: '{filename}'"
    );
}

pub fn write_sample_output(output_dir: &Utf8Path, svs: &SampleSvs, clusters: &[Cluster]) {
    write_json_file(
        output_dir,
        SV_OUTPUT_FILENAME,
        "SV annotations",
        &get_sv_output(svs, clusters),
    );

    let cluster_output = clusters
        .iter()
        .map(|x| get_cluster_output(svs, x))
        .collect::<Vec<_>>();
    write_json_file(
        output_dir,
        CLUSTER_OUTPUT_FILENAME,
        "cluster annotations",
        &cluster_output,
    );
}
