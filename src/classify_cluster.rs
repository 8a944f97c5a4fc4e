//! Assign a resolved type to each cluster from its SV types and chain shape
//!

use simple_error::{SimpleResult, bail};

use crate::analysis_settings::AnalysisSettings;
use crate::chain::Chain;
use crate::cluster::{ArmKey, Cluster, ResolvedType};
use crate::geometry::{
    are_section_break, get_breakend_distance, is_same_valid_arm, order_breakends,
};
use crate::linked_pair::LinkType;
use crate::sv::{Breakend, BreakendRef, SampleSvs, SvType};

fn get_breakend(svs: &SampleSvs, be: BreakendRef) -> SimpleResult<&Breakend> {
    match svs.get_breakend(be) {
        Some(x) => Ok(x),
        None => bail!("Breakend {be:?} is missing from the SV arena"),
    }
}

/// Get the two open breakends of a chain, or None if either end is a single breakend SV
fn get_chain_open_ends<'a>(
    chain: &Chain,
    svs: &'a SampleSvs,
) -> SimpleResult<Option<(&'a Breakend, &'a Breakend)>> {
    match chain.open_breakends(svs) {
        [Some(start), Some(end)] => Ok(Some((
            get_breakend(svs, start)?,
            get_breakend(svs, end)?,
        ))),
        _ => Ok(None),
    }
}

fn is_short_db(be1: &Breakend, be2: &Breakend, max_db_length: i64) -> bool {
    are_section_break(be1, be2)
        && get_breakend_distance(be1, be2).is_some_and(|x| x <= max_db_length)
}

/// Get the single chain of a fully chained cluster
fn get_single_chain(cluster: &Cluster) -> SimpleResult<Option<&Chain>> {
    if !cluster.is_fully_chained {
        return Ok(None);
    }
    if cluster.chains.len() != 1 {
        bail!(
            "Cluster {} is marked fully chained with {} chains",
            cluster.id,
            cluster.chains.len()
        );
    }
    Ok(Some(&cluster.chains[0]))
}

/// Resolve clusters of a few simple SVs to their SV type
fn try_small_simple_cluster(
    cluster: &mut Cluster,
    svs: &SampleSvs,
    settings: &AnalysisSettings,
) -> bool {
    let sv_indexes = cluster.original_sv_indexes(svs);
    if sv_indexes.is_empty()
        || sv_indexes.len() > settings.small_cluster_size
        || !sv_indexes.iter().all(|&x| svs.svs[x].sv_type.is_simple())
    {
        return false;
    }

    let sv_type = svs.svs[sv_indexes[0]].sv_type;
    cluster.resolved_type = if sv_indexes.iter().any(|&x| svs.svs[x].sv_type != sv_type) {
        ResolvedType::SimpleGrp
    } else {
        match sv_type {
            SvType::Del => ResolvedType::Del,
            SvType::Dup => ResolvedType::Dup,
            _ => ResolvedType::Ins,
        }
    };
    cluster.synthetic_length = sv_indexes
        .iter()
        .map(|&x| svs.svs[x].length())
        .max()
        .unwrap_or(0);
    cluster.is_long = cluster.synthetic_length >= settings.del_dup_long_length;
    true
}

/// Long templated insertions of the chain as (lower, upper) position spans with their chromosome
fn get_long_tis<'a>(
    chain: &Chain,
    svs: &'a SampleSvs,
    short_ti_length: i64,
) -> SimpleResult<Vec<(&'a str, i64, i64)>> {
    let mut long_tis = Vec::new();
    for link in chain.links.iter() {
        if link.link_type != LinkType::TemplatedInsertion || link.length <= short_ti_length {
            continue;
        }
        let be1 = get_breakend(svs, link.first)?;
        let be2 = get_breakend(svs, link.second)?;
        let (lower, upper) = order_breakends(be1, be2);
        long_tis.push((lower.chrom.as_str(), lower.pos, upper.pos));
    }
    Ok(long_tis)
}

/// Match a single chain whose open ends act as one deletion or duplication
fn try_synthetic_del_dup(
    cluster: &mut Cluster,
    svs: &SampleSvs,
    settings: &AnalysisSettings,
) -> SimpleResult<bool> {
    let Some(chain) = get_single_chain(cluster)? else {
        return Ok(false);
    };
    let Some((be1, be2)) = get_chain_open_ends(chain, svs)? else {
        return Ok(false);
    };
    if !is_same_valid_arm(be1, be2) || be1.orientation == be2.orientation {
        return Ok(false);
    }

    let long_tis = get_long_tis(chain, svs, settings.short_ti_length)?;
    if long_tis.len() > 1 {
        return Ok(false);
    }

    let (lower, upper) = order_breakends(be1, be2);
    let is_enclosed = |(chrom, start, end): &(&str, i64, i64)| {
        *chrom == lower.chrom && *start >= lower.pos && *end <= upper.pos
    };
    if long_tis.iter().any(is_enclosed) {
        return Ok(false);
    }

    let synthetic_length = upper.pos - lower.pos;
    cluster.resolved_type = if lower.orientation == -1 {
        ResolvedType::Del
    } else {
        ResolvedType::Dup
    };
    cluster.synthetic_length = synthetic_length;
    cluster.is_long = synthetic_length >= settings.del_dup_long_length;
    Ok(true)
}

/// Match two inversions joined by one long templated insertion, flanked on each side by a short
/// deletion bridge to the chain open ends
fn try_synthetic_reciprocal_inversion(
    cluster: &mut Cluster,
    svs: &SampleSvs,
    settings: &AnalysisSettings,
) -> SimpleResult<bool> {
    let Some(chain) = get_single_chain(cluster)? else {
        return Ok(false);
    };
    if chain.link_count() != 1 {
        return Ok(false);
    }
    let sv_indexes = chain.sv_indexes();
    let is_inv = |x: &usize| svs.svs[*x].sv_type == SvType::Inv;
    if sv_indexes.len() != 2 || !sv_indexes.iter().all(is_inv) {
        return Ok(false);
    }
    let Some((be1, be2)) = get_chain_open_ends(chain, svs)? else {
        return Ok(false);
    };
    if !is_same_valid_arm(be1, be2) || be1.orientation == be2.orientation {
        return Ok(false);
    }

    let link = &chain.links[0];
    if link.link_type != LinkType::TemplatedInsertion || link.length <= settings.short_ti_length {
        return Ok(false);
    }
    let (ti_lower, ti_upper) =
        order_breakends(get_breakend(svs, link.first)?, get_breakend(svs, link.second)?);
    let (lower, upper) = order_breakends(be1, be2);
    if ti_lower.chrom != lower.chrom || ti_lower.pos < lower.pos || ti_upper.pos > upper.pos {
        return Ok(false);
    }

    if !is_short_db(lower, ti_lower, settings.max_db_length)
        || !is_short_db(ti_upper, upper, settings.max_db_length)
    {
        return Ok(false);
    }

    cluster.resolved_type = ResolvedType::RecipInv;
    Ok(true)
}

/// Open ends of each chain and each unlinked SV, treating an unlinked SV as a single SV chain
fn get_unit_open_ends<'a>(
    cluster: &Cluster,
    svs: &'a SampleSvs,
) -> SimpleResult<Option<Vec<[&'a Breakend; 2]>>> {
    let mut units = Vec::new();
    for chain in cluster.chains.iter() {
        match get_chain_open_ends(chain, svs)? {
            Some((be1, be2)) => units.push([be1, be2]),
            None => return Ok(None),
        }
    }
    for &sv_index in cluster.unlinked_svs.iter() {
        let sv = &svs.svs[sv_index];
        match &sv.end {
            Some(end) => units.push([&sv.start, end]),
            None => return Ok(None),
        }
    }
    Ok(Some(units))
}

fn arm_key(be: &Breakend) -> ArmKey {
    (be.chrom.clone(), be.arm)
}

/// Match two units which each join the same two chromosome arms, with a short deletion bridge
/// between the units on each arm
fn try_synthetic_reciprocal_translocation(
    cluster: &mut Cluster,
    svs: &SampleSvs,
    settings: &AnalysisSettings,
) -> SimpleResult<bool> {
    if cluster.is_chain_invalid {
        return Ok(false);
    }
    let Some(units) = get_unit_open_ends(cluster, svs)? else {
        return Ok(false);
    };
    if units.len() != 2 {
        return Ok(false);
    }

    for unit in units.iter() {
        if unit.iter().any(|x| !x.arm.is_valid()) || arm_key(unit[0]) == arm_key(unit[1]) {
            return Ok(false);
        }
    }

    for be1 in units[0].iter() {
        let Some(be2) = units[1].iter().find(|x| arm_key(x) == arm_key(be1)) else {
            return Ok(false);
        };
        if !is_short_db(be1, be2, settings.max_db_length) {
            return Ok(false);
        }
    }

    cluster.resolved_type = ResolvedType::RecipTrans;
    Ok(true)
}

fn has_duplicate_breakend(svs: &SampleSvs, sv_index1: usize, sv_index2: usize) -> bool {
    svs.svs[sv_index1]
        .breakends()
        .any(|be1| svs.svs[sv_index2].breakends().any(|be2| be1.is_same_location(be2)))
}

/// Label a cluster which no pattern could resolve
fn classify_unresolved(cluster: &mut Cluster, svs: &SampleSvs) {
    let sv_indexes = cluster.original_sv_indexes(svs);
    cluster.resolved_type = match sv_indexes.as_slice() {
        [sv_index] => match svs.svs[*sv_index].sv_type {
            SvType::Bnd => ResolvedType::UnbalTrans,
            SvType::Inv => ResolvedType::Inv,
            SvType::Sgl => ResolvedType::Sgl,
            SvType::Inf => ResolvedType::Inf,
            _ => ResolvedType::Complex,
        },
        [sv_index1, sv_index2] => {
            if has_duplicate_breakend(svs, *sv_index1, *sv_index2) {
                ResolvedType::DupBe
            } else {
                ResolvedType::PairOther
            }
        }
        _ => ResolvedType::Complex,
    };
}

/// Set the resolved type of a cluster after its chains have been found
///
/// Patterns are tested in a fixed order and the first match wins. If no pattern matches, the
/// resolved type is left unchanged, unless this is the final classification pass.
///
/// An error is returned for cluster states which should not occur, in which case the resolved
/// type may be left at its previous value.
///
pub fn classify_cluster(
    cluster: &mut Cluster,
    svs: &SampleSvs,
    settings: &AnalysisSettings,
    is_final_pass: bool,
) -> SimpleResult<()> {
    if cluster.has_line_element(svs) {
        cluster.resolved_type = ResolvedType::Line;
        return Ok(());
    }

    if try_small_simple_cluster(cluster, svs, settings)
        || try_synthetic_del_dup(cluster, svs, settings)?
        || try_synthetic_reciprocal_inversion(cluster, svs, settings)?
        || try_synthetic_reciprocal_translocation(cluster, svs, settings)?
    {
        return Ok(());
    }

    if is_final_pass {
        classify_unresolved(cluster, svs);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_finder::find_chains;
    use crate::cluster::{ClusterReason, SuperType};
    use crate::link_finder::find_cluster_links;
    use crate::sv::SvInput;
    use crate::sv::tests::{get_test_sample_svs, get_test_sv};

    /// Run link, chain and final classification steps on a single cluster of all test SVs
    fn get_classified_cluster(inputs: Vec<SvInput>) -> (SampleSvs, Cluster) {
        let svs = get_test_sample_svs(inputs);
        let settings = AnalysisSettings::default();
        let sv_indexes = (0..svs.svs.len()).collect::<Vec<_>>();
        let mut cluster = Cluster::new(0, sv_indexes.clone(), ClusterReason::Proximity, &svs);
        let links = find_cluster_links(&svs, &sv_indexes, &settings);
        let result = find_chains(
            &svs,
            0,
            &sv_indexes,
            &links.assembly_pairs,
            &links.inferred_pairs,
            settings.chain_tie_break,
        );
        cluster.is_fully_chained = result.is_fully_chained();
        cluster.is_chain_invalid = !result.is_valid;
        cluster.chains = result.chains;
        cluster.unlinked_svs = result.unlinked_svs;
        cluster.linked_pairs = result.linked_pairs;
        cluster.assembly_pairs = links.assembly_pairs;
        cluster.inferred_pairs = links.inferred_pairs;
        classify_cluster(&mut cluster, &svs, &settings, true).unwrap();
        (svs, cluster)
    }

    #[test]
    fn test_simple_clusters() {
        let (_, cluster) = get_classified_cluster(vec![get_test_sv(
            "a",
            SvType::Del,
            ("1", 1000, -1),
            Some(("1", 2000, 1)),
        )]);
        assert_eq!(cluster.resolved_type, ResolvedType::Del);
        assert_eq!(cluster.super_type(), SuperType::Simple);
        assert!(!cluster.is_long);

        let (_, cluster) = get_classified_cluster(vec![get_test_sv(
            "a",
            SvType::Dup,
            ("1", 1000, 1),
            Some(("1", 201_000, -1)),
        )]);
        assert_eq!(cluster.resolved_type, ResolvedType::Dup);
        assert!(cluster.is_long);

        let (_, cluster) = get_classified_cluster(vec![
            get_test_sv("a", SvType::Del, ("1", 1000, -1), Some(("1", 2000, 1))),
            get_test_sv("b", SvType::Dup, ("1", 5000, 1), Some(("1", 6000, -1))),
        ]);
        assert_eq!(cluster.resolved_type, ResolvedType::SimpleGrp);
    }

    #[test]
    fn test_line_cluster() {
        let mut inputs = vec![get_test_sv(
            "a",
            SvType::Bnd,
            ("1", 1000, 1),
            Some(("2", 100, 1)),
        )];
        inputs[0].start.is_line_element = true;
        let (_, cluster) = get_classified_cluster(inputs);
        assert_eq!(cluster.resolved_type, ResolvedType::Line);
        assert_eq!(cluster.super_type(), SuperType::Insertion);
    }

    #[test]
    fn test_reciprocal_translocation() {
        let (_, cluster) = get_classified_cluster(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, -1), Some(("2", 2000, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 1050, 1), Some(("2", 1950, -1))),
        ]);
        assert!(cluster.is_consistent());
        assert!(cluster.chains.is_empty());
        assert_eq!(cluster.resolved_type, ResolvedType::RecipTrans);
        assert_eq!(cluster.super_type(), SuperType::BreakPair);
    }

    #[test]
    fn test_synthetic_deletion() {
        // a.end -> b.start is a short TI on chr2, the chain open ends face away from each other
        let (_, cluster) = get_classified_cluster(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, -1), Some(("2", 500, 1))),
            get_test_sv("b", SvType::Bnd, ("2", 800, -1), Some(("1", 60_000, 1))),
        ]);
        assert!(cluster.is_fully_chained);
        assert_eq!(cluster.resolved_type, ResolvedType::Del);
        assert_eq!(cluster.synthetic_length, 59_000);
        assert!(!cluster.is_long);

        // Balanced cluster with a single chain
        assert!(cluster.is_consistent());

        let (_, cluster) = get_classified_cluster(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, -1), Some(("2", 500, 1))),
            get_test_sv("b", SvType::Bnd, ("2", 800, -1), Some(("1", 200_000, 1))),
        ]);
        assert_eq!(cluster.resolved_type, ResolvedType::Del);
        assert!(cluster.is_long);
    }

    #[test]
    fn test_synthetic_duplication() {
        let (_, cluster) = get_classified_cluster(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 500, 1))),
            get_test_sv("b", SvType::Bnd, ("2", 800, -1), Some(("1", 60_000, -1))),
        ]);
        assert!(cluster.is_fully_chained);
        assert_eq!(cluster.resolved_type, ResolvedType::Dup);
    }

    #[test]
    fn test_reciprocal_inversion() {
        // The segment 1100-50000 is inverted, with small deletions at both ends
        let (_, cluster) = get_classified_cluster(vec![
            get_test_sv("inv1", SvType::Inv, ("1", 1000, -1), Some(("1", 50_000, -1))),
            get_test_sv("inv2", SvType::Inv, ("1", 1100, 1), Some(("1", 50_100, 1))),
        ]);
        assert!(cluster.is_fully_chained);
        assert_eq!(cluster.chains[0].links[0].length, 48_900);
        assert_eq!(cluster.resolved_type, ResolvedType::RecipInv);
    }

    #[test]
    fn test_unresolved_clusters() {
        let (_, cluster) = get_classified_cluster(vec![get_test_sv(
            "a",
            SvType::Bnd,
            ("1", 1000, 1),
            Some(("2", 100, 1)),
        )]);
        assert_eq!(cluster.resolved_type, ResolvedType::UnbalTrans);

        let (_, cluster) =
            get_classified_cluster(vec![get_test_sv("a", SvType::Sgl, ("1", 1000, 1), None)]);
        assert_eq!(cluster.resolved_type, ResolvedType::Sgl);

        let (_, cluster) = get_classified_cluster(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 1000, 1), Some(("2", 7_000_000, 1))),
        ]);
        assert_eq!(cluster.resolved_type, ResolvedType::DupBe);
        assert_eq!(cluster.super_type(), SuperType::Artifact);

        let (_, cluster) = get_classified_cluster(vec![
            get_test_sv("a", SvType::Inv, ("1", 1000, 1), Some(("1", 5000, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 9000, 1), Some(("2", 100, 1))),
        ]);
        assert_eq!(cluster.resolved_type, ResolvedType::PairOther);
    }

    #[test]
    fn test_non_final_pass() {
        let svs = get_test_sample_svs(vec![get_test_sv(
            "a",
            SvType::Bnd,
            ("1", 1000, 1),
            Some(("2", 100, 1)),
        )]);
        let mut cluster = Cluster::new(0, vec![0], ClusterReason::Proximity, &svs);
        cluster.unlinked_svs = vec![0];
        classify_cluster(&mut cluster, &svs, &AnalysisSettings::default(), false).unwrap();
        assert_eq!(cluster.resolved_type, ResolvedType::None);
    }

    #[test]
    fn test_inconsistent_fully_chained_state() {
        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 9000, 1), Some(("2", 200, 1))),
        ]);
        let mut cluster = Cluster::new(0, vec![0, 1], ClusterReason::Proximity, &svs);
        cluster.is_fully_chained = true;
        assert!(
            classify_cluster(&mut cluster, &svs, &AnalysisSettings::default(), true).is_err()
        );
        assert_eq!(cluster.resolved_type, ResolvedType::None);
    }
}
