//! Find the assembly-supported and inferred linked pairs of one cluster
//!

use std::collections::HashMap;

use itertools::Itertools;
use log::debug;

use crate::analysis_settings::AnalysisSettings;
use crate::geometry::{are_facing, are_section_break};
use crate::linked_pair::{LinkType, LinkedPair};
use crate::sv::{Breakend, BreakendRef, SampleSvs};

#[derive(Default)]
pub struct ClusterLinks {
    /// Links directly supported by assembly evidence
    ///
    /// Assembled facing breakends closer than the minimum TI length are kept as deletion bridges.
    ///
    pub assembly_pairs: Vec<LinkedPair>,

    /// Geometry-only candidates, sorted by ascending length
    pub inferred_pairs: Vec<LinkedPair>,

    /// Breakends which already had an assembly link when another assembly candidate was found
    pub assembly_conflicts: Vec<BreakendRef>,
}

fn share_assembly_token(svs: &SampleSvs, be1: &Breakend, be2: &Breakend) -> bool {
    let tokens1 = &svs.svs[be1.sv_index].assembly_tokens[be1.side.index()];
    let tokens2 = &svs.svs[be2.sv_index].assembly_tokens[be2.side.index()];
    tokens1.iter().any(|x| tokens2.contains(x))
}

/// Iterate over all breakend pairs from different SVs, in SV order
fn breakend_pairs<'a>(
    svs: &'a SampleSvs,
    sv_indexes: &'a [usize],
) -> impl Iterator<Item = (&'a Breakend, &'a Breakend)> + 'a {
    sv_indexes
        .iter()
        .tuple_combinations()
        .flat_map(move |(&sv1, &sv2)| {
            svs.svs[sv1]
                .breakends()
                .flat_map(move |be1| svs.svs[sv2].breakends().map(move |be2| (be1, be2)))
        })
}

/// Find assembly linked pairs
///
/// Each breakend may be assembly-linked once, the first candidate found in SV order is kept. The
/// minimum TI length applies as for inferred links.
///
fn find_assembly_links(
    svs: &SampleSvs,
    sv_indexes: &[usize],
    settings: &AnalysisSettings,
    links: &mut ClusterLinks,
) {
    let mut linked_breakends = Vec::new();
    for (be1, be2) in breakend_pairs(svs, sv_indexes) {
        if !share_assembly_token(svs, be1, be2)
            || !are_facing(be1, be2, settings.allow_centromere_span)
        {
            continue;
        }
        let existing = [be1.handle(), be2.handle()]
            .into_iter()
            .filter(|x| linked_breakends.contains(x))
            .collect::<Vec<_>>();
        if !existing.is_empty() {
            debug!(
                "Rejecting assembly link {:?}-{:?}, conflict on {existing:?}",
                be1.handle(),
                be2.handle()
            );
            for be in existing {
                if !links.assembly_conflicts.contains(&be) {
                    links.assembly_conflicts.push(be);
                }
            }
            continue;
        }

        let pair = LinkedPair::new(
            be1,
            be2,
            LinkType::TemplatedInsertion,
            false,
            settings.min_ti_length,
        );
        linked_breakends.extend(pair.breakends());
        links.assembly_pairs.push(pair);
    }
}

/// Find inferred linked pairs among all breakend pairs not already joined by assembly
///
/// Candidates are accepted shortest first. Each breakend can be used in up to
/// `replication_count + 1` pairs of each link type, including the assembly pairs, so that a
/// longer candidate is dropped when shorter pairs already consumed its breakend.
///
fn find_inferred_links(
    svs: &SampleSvs,
    sv_indexes: &[usize],
    settings: &AnalysisSettings,
    links: &mut ClusterLinks,
) {
    let mut candidates = Vec::new();
    for (be1, be2) in breakend_pairs(svs, sv_indexes) {
        let handles = [be1.handle(), be2.handle()];
        if links
            .assembly_pairs
            .iter()
            .any(|x| handles.iter().all(|&be| x.has_breakend(be)))
        {
            continue;
        }

        if are_facing(be1, be2, settings.allow_centromere_span) {
            let pair = LinkedPair::new(
                be1,
                be2,
                LinkType::TemplatedInsertion,
                true,
                settings.min_ti_length,
            );
            if pair.link_type == LinkType::TemplatedInsertion {
                candidates.push(pair);
            }
        } else if are_section_break(be1, be2) {
            candidates.push(LinkedPair::new(
                be1,
                be2,
                LinkType::DeletionBridge,
                true,
                settings.min_ti_length,
            ));
        }
    }

    // Stable sort keeps discovery order among equal lengths
    candidates.sort_by_key(|x| x.length);

    let capacity = |be: BreakendRef| svs.svs[be.sv_index].replication_count + 1;
    let mut use_counts = HashMap::<(BreakendRef, LinkType), usize>::new();
    for pair in links.assembly_pairs.iter() {
        for be in pair.breakends() {
            *use_counts.entry((be, pair.link_type)).or_default() += 1;
        }
    }

    for pair in candidates {
        let is_clash = pair.breakends().iter().any(|&be| {
            use_counts
                .get(&(be, pair.link_type))
                .is_some_and(|&x| x >= capacity(be))
        });
        if is_clash {
            continue;
        }
        for be in pair.breakends() {
            *use_counts.entry((be, pair.link_type)).or_default() += 1;
        }
        links.inferred_pairs.push(pair);
    }
}

/// Find all linked pairs among the original SVs of one cluster
///
/// # Arguments
/// * `sv_indexes` - original SV indexes of the cluster in input order
///
pub fn find_cluster_links(
    svs: &SampleSvs,
    sv_indexes: &[usize],
    settings: &AnalysisSettings,
) -> ClusterLinks {
    let mut links = ClusterLinks::default();
    find_assembly_links(svs, sv_indexes, settings, &mut links);
    find_inferred_links(svs, sv_indexes, settings, &mut links);
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sv::tests::{get_test_sample_svs, get_test_sv};
    use crate::sv::{BreakendSide, SvType};

    fn be(sv_index: usize, side: BreakendSide) -> BreakendRef {
        BreakendRef::new(sv_index, side)
    }

    #[test]
    fn test_assembly_links() {
        use BreakendSide::*;

        let mut inputs = vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 5000, -1), Some(("2", 900, 1))),
            get_test_sv("c", SvType::Bnd, ("1", 3000, -1), Some(("2", 950, 1))),
        ];
        inputs[0].start.assembly_tokens = vec!["asm1".to_string()];
        inputs[1].start.assembly_tokens = vec!["asm1".to_string()];
        inputs[2].start.assembly_tokens = vec!["asm1".to_string(), "asm2".to_string()];
        let svs = get_test_sample_svs(inputs);

        let links = find_cluster_links(&svs, &[0, 1, 2], &AnalysisSettings::default());
        assert_eq!(links.assembly_pairs.len(), 1);
        let pair = &links.assembly_pairs[0];
        assert!(!pair.is_inferred);
        assert_eq!(pair.breakends(), [be(0, Start), be(1, Start)]);
        assert_eq!(links.assembly_conflicts, vec![be(0, Start)]);

        // The assembled pair is not repeated as an inferred pair
        assert!(
            !links
                .inferred_pairs
                .iter()
                .any(|x| x.has_breakend(be(0, Start)) && x.has_breakend(be(1, Start)))
        );
    }

    #[test]
    fn test_inferred_links_shortest_wins() {
        use BreakendSide::*;

        // a.start can face either b.start (500) or c.start (2000), the shorter is kept
        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 1500, -1), Some(("2", 7_000_000, 1))),
            get_test_sv("c", SvType::Bnd, ("1", 3000, -1), Some(("2", 7_500_000, 1))),
        ]);
        let links = find_cluster_links(&svs, &[0, 1, 2], &AnalysisSettings::default());
        let tis = links
            .inferred_pairs
            .iter()
            .filter(|x| x.link_type == LinkType::TemplatedInsertion)
            .collect::<Vec<_>>();
        assert_eq!(tis.len(), 1);
        assert_eq!(tis[0].breakends(), [be(0, Start), be(1, Start)]);
        assert_eq!(tis[0].length, 500);

        // b.start and c.start can't form a pair of either type
        assert!(
            !links
                .inferred_pairs
                .iter()
                .any(|x| x.has_breakend(be(1, Start)) && x.has_breakend(be(2, Start)))
        );

        for pair in links.inferred_pairs.windows(2) {
            assert!(pair[0].length <= pair[1].length);
        }
    }

    #[test]
    fn test_inferred_links_with_replication() {
        use BreakendSide::*;

        let mut inputs = vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 1500, -1), Some(("2", 7_000_000, 1))),
            get_test_sv("c", SvType::Bnd, ("1", 3000, -1), Some(("2", 7_500_000, 1))),
        ];
        inputs[0].ploidy = 2.0;
        let mut svs = get_test_sample_svs(inputs);
        svs.expand_replicated_svs(&crate::sv::ChromCopyNumbers::new(1.0), 8);

        // a has two instances, so its start breakend can face both b and c
        let links = find_cluster_links(&svs, &[0, 1, 2], &AnalysisSettings::default());
        let a_tis = links
            .inferred_pairs
            .iter()
            .filter(|x| {
                x.link_type == LinkType::TemplatedInsertion && x.has_breakend(be(0, Start))
            })
            .count();
        assert_eq!(a_tis, 2);
    }

    #[test]
    fn test_short_facing_pair_rejected() {
        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 1010, -1), Some(("2", 7_000_000, 1))),
        ]);
        let links = find_cluster_links(&svs, &[0, 1], &AnalysisSettings::default());
        assert!(links.inferred_pairs.is_empty());
    }

    #[test]
    fn test_deletion_bridge() {
        use BreakendSide::*;

        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, -1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 1200, 1), Some(("2", 7_000_000, 1))),
        ]);
        let links = find_cluster_links(&svs, &[0, 1], &AnalysisSettings::default());
        assert_eq!(links.inferred_pairs.len(), 1);
        let pair = &links.inferred_pairs[0];
        assert_eq!(pair.link_type, LinkType::DeletionBridge);
        assert_eq!(pair.breakends(), [be(0, Start), be(1, Start)]);
        assert_eq!(pair.length, 200);
    }

    #[test]
    fn test_short_assembly_link_is_deletion_bridge() {
        use BreakendSide::*;

        let mut inputs = vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 1010, -1), Some(("2", 7_000_000, 1))),
        ];
        inputs[0].start.assembly_tokens = vec!["asm1".to_string()];
        inputs[1].start.assembly_tokens = vec!["asm1".to_string()];
        let svs = get_test_sample_svs(inputs);

        let links = find_cluster_links(&svs, &[0, 1], &AnalysisSettings::default());
        assert_eq!(links.assembly_pairs.len(), 1);
        let pair = &links.assembly_pairs[0];
        assert!(!pair.is_inferred);
        assert_eq!(pair.link_type, LinkType::DeletionBridge);
        assert_eq!(pair.breakends(), [be(0, Start), be(1, Start)]);
        assert_eq!(pair.length, 10);
    }
}
