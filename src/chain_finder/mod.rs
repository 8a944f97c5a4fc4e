//! Replication-aware assembly of a cluster's templated insertions into chains
//!

mod breakend_pool;
mod candidate_queue;

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, warn};
use simple_error::{SimpleResult, bail};

use self::breakend_pool::BreakendPool;
use self::candidate_queue::{CandidateQueue, get_tie_break_ranks};
use crate::analysis_settings::ChainTieBreak;
use crate::chain::Chain;
use crate::linked_pair::{LinkType, LinkedPair};
use crate::sv::{BreakendRef, SampleSvs};

pub struct ChainFinderResult {
    /// False if the chain search hit a breakend bookkeeping violation
    pub is_valid: bool,

    pub chains: Vec<Chain>,

    /// All pairs placed in chains, in the order they were added
    pub linked_pairs: Vec<LinkedPair>,

    /// SV instances not placed in any chain
    pub unlinked_svs: Vec<usize>,
}

impl ChainFinderResult {
    fn invalid(sv_indexes: &[usize]) -> Self {
        Self {
            is_valid: false,
            chains: Vec::new(),
            linked_pairs: Vec::new(),
            unlinked_svs: sv_indexes.to_vec(),
        }
    }

    pub fn is_fully_chained(&self) -> bool {
        self.is_valid && self.chains.len() == 1 && self.unlinked_svs.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ChainEnd {
    Start,
    End,
}

/// An open breakend instance at one end of a partial chain
#[derive(Clone, Copy, Debug)]
struct OpenEnd {
    chain_index: usize,
    end: ChainEnd,
    be: BreakendRef,
}

/// Candidate linked pair on original breakend handles
struct Candidate {
    pair: LinkedPair,
    rank: usize,
    is_active: bool,
}

struct ChainFinder<'a> {
    svs: &'a SampleSvs,
    cluster_id: usize,
    pool: BreakendPool,
    candidates: Vec<Candidate>,
    chains: Vec<Chain>,
    linked_pairs: Vec<LinkedPair>,

    /// Instance count of each original SV in the cluster
    instance_counts: BTreeMap<usize, usize>,

    /// Original SVs removed from replication priority
    dropped_svs: HashSet<usize>,

    next_chain_id: usize,
}

impl<'a> ChainFinder<'a> {
    fn new(
        svs: &'a SampleSvs,
        cluster_id: usize,
        sv_indexes: &[usize],
        inferred_pairs: &[LinkedPair],
        tie_break: ChainTieBreak,
    ) -> Self {
        let mut instance_counts = BTreeMap::new();
        for &sv_index in sv_indexes.iter() {
            *instance_counts
                .entry(svs.svs[sv_index].orig_sv_index)
                .or_default() += 1;
        }

        let ti_pairs = inferred_pairs
            .iter()
            .filter(|x| x.link_type == LinkType::TemplatedInsertion)
            .cloned()
            .collect::<Vec<_>>();
        let ranks = get_tie_break_ranks(svs, &ti_pairs, tie_break);
        let candidates = ti_pairs
            .into_iter()
            .zip(ranks)
            .map(|(pair, rank)| Candidate {
                pair,
                rank,
                is_active: true,
            })
            .collect();

        Self {
            svs,
            cluster_id,
            pool: BreakendPool::new(svs, sv_indexes),
            candidates,
            chains: Vec::new(),
            linked_pairs: Vec::new(),
            instance_counts,
            dropped_svs: HashSet::new(),
            next_chain_id: 0,
        }
    }

    fn instance_count(&self, orig_sv_index: usize) -> usize {
        self.instance_counts
            .get(&orig_sv_index)
            .copied()
            .unwrap_or(0)
    }

    fn is_usable(&self, pair: &LinkedPair) -> bool {
        pair.breakends().iter().all(|&x| self.pool.remaining(x) > 0)
    }

    fn has_active_candidates(&self) -> bool {
        self.candidates.iter().any(|x| x.is_active)
    }

    fn deactivate_exhausted_candidates(&mut self) {
        for candidate in self.candidates.iter_mut().filter(|x| x.is_active) {
            if !candidate
                .pair
                .breakends()
                .iter()
                .all(|&x| self.pool.remaining(x) > 0)
            {
                candidate.is_active = false;
            }
        }
    }

    /// After two non-replicated SVs are linked on one side, remove the candidate linking their
    /// other sides, which could only close a two SV loop
    fn remove_opposite_end_conflicts(&mut self, pair: &LinkedPair) {
        if self.instance_count(pair.first.sv_index) > 1
            || self.instance_count(pair.second.sv_index) > 1
        {
            return;
        }
        let opposite1 = pair.first.other_side();
        let opposite2 = pair.second.other_side();
        for candidate in self.candidates.iter_mut().filter(|x| x.is_active) {
            if candidate.pair.has_breakend(opposite1) && candidate.pair.has_breakend(opposite2) {
                debug!(
                    "Cluster {}: removing opposite end candidate {:?}",
                    self.cluster_id, candidate.pair
                );
                candidate.is_active = false;
            }
        }
    }

    /// Find a chain open end which is an instance of the given original breakend
    fn find_open_end(&self, orig_be: BreakendRef, skip_chain: Option<usize>) -> Option<OpenEnd> {
        for (chain_index, chain) in self.chains.iter().enumerate() {
            if skip_chain == Some(chain_index) {
                continue;
            }
            let [start, end] = chain.open_breakends(self.svs);
            for (end, be) in [(ChainEnd::Start, start), (ChainEnd::End, end)] {
                let Some(be) = be else {
                    continue;
                };
                if self.svs.breakend(be).orig_handle() == orig_be {
                    return Some(OpenEnd {
                        chain_index,
                        end,
                        be,
                    });
                }
            }
        }
        None
    }

    /// Find an unconsumed instance of the breakend whose SV instance is not yet in any chain
    fn find_free_instance(&self, orig_be: BreakendRef) -> Option<BreakendRef> {
        self.pool
            .instances(orig_be)
            .iter()
            .find(|x| !self.chains.iter().any(|c| c.has_sv(x.sv_index)))
            .copied()
    }

    fn take(&mut self, orig_be: BreakendRef, be: BreakendRef) -> SimpleResult<()> {
        self.pool.take(orig_be, be)
    }

    /// Add a candidate pair to the partial chains
    ///
    /// Returns false if the pair was skipped because it would close a chain into a loop.
    ///
    fn add_pair(&mut self, pair: &LinkedPair) -> SimpleResult<bool> {
        let debug = false;

        let (mut orig1, mut orig2) = (pair.first, pair.second);
        let mut anchor = self.find_open_end(orig1, None);
        if anchor.is_none() {
            anchor = self.find_open_end(orig2, None);
            if anchor.is_some() {
                std::mem::swap(&mut orig1, &mut orig2);
            }
        }

        let Some(anchor) = anchor else {
            let Some(be1) = self.find_free_instance(orig1) else {
                bail!("No free instance of breakend {orig1:?} for pair {pair:?}");
            };
            let Some(be2) = self.find_free_instance(orig2) else {
                bail!("No free instance of breakend {orig2:?} for pair {pair:?}");
            };
            self.take(orig1, be1)?;
            self.take(orig2, be2)?;
            let instance_pair = pair.with_instances(be1, be2);
            if debug {
                eprintln!("New chain {} from {instance_pair:?}", self.next_chain_id);
            }
            self.linked_pairs.push(instance_pair.clone());
            self.chains
                .push(Chain::new(self.next_chain_id, instance_pair));
            self.next_chain_id += 1;
            return Ok(true);
        };

        // The partner is an open end of a different chain, or else a free instance
        let partner = self.find_open_end(orig2, Some(anchor.chain_index));
        let be2 = match partner {
            Some(x) => x.be,
            None => match self.find_free_instance(orig2) {
                Some(x) => x,
                None => {
                    if self.find_open_end(orig2, None).is_some() {
                        warn!(
                            "Cluster {}: skipping linked pair {pair:?} which would close chain {} into a loop",
                            self.cluster_id, self.chains[anchor.chain_index].id
                        );
                        return Ok(false);
                    }
                    bail!("No available instance of breakend {orig2:?} for pair {pair:?}");
                }
            },
        };
        let be1 = anchor.be;
        self.take(orig1, be1)?;
        self.take(orig2, be2)?;

        let mut chain_index = anchor.chain_index;
        let instance_pair = match anchor.end {
            ChainEnd::End => {
                let x = pair.with_instances(be1, be2);
                self.chains[chain_index].append(x.clone());
                x
            }
            ChainEnd::Start => {
                let x = pair.with_instances(be2, be1);
                self.chains[chain_index].prepend(x.clone());
                x
            }
        };
        if debug {
            eprintln!("Added {instance_pair:?} to chain {}", self.chains[chain_index].id);
        }
        self.linked_pairs.push(instance_pair);

        if let Some(partner) = partner {
            let mut other = self.chains.remove(partner.chain_index);
            if partner.chain_index < chain_index {
                chain_index -= 1;
            }
            if debug {
                eprintln!(
                    "Merging chain {} into chain {}",
                    other.id, self.chains[chain_index].id
                );
            }
            let chain = &mut self.chains[chain_index];
            match anchor.end {
                ChainEnd::End => {
                    if partner.end == ChainEnd::End {
                        other.reverse();
                    }
                    chain.extend(other);
                }
                ChainEnd::Start => {
                    if partner.end == ChainEnd::Start {
                        other.reverse();
                    }
                    chain.extend_front(other);
                }
            }
        }

        if self.chains[chain_index].has_repeated_breakend() {
            bail!(
                "Breakend instance repeated in chain {} after adding pair {pair:?}",
                self.chains[chain_index].id
            );
        }
        Ok(true)
    }

    /// Original SVs with the highest remaining instance count, if that count is above one
    fn get_max_replication_svs(&self) -> Vec<usize> {
        let mut max_count = 1;
        let mut max_svs = Vec::new();
        for &orig_sv_index in self.instance_counts.keys() {
            if self.dropped_svs.contains(&orig_sv_index) {
                continue;
            }
            let remaining = self.svs.svs[orig_sv_index]
                .breakends()
                .map(|x| self.pool.remaining(x.handle()))
                .max()
                .unwrap_or(0);
            if remaining > max_count {
                max_count = remaining;
                max_svs.clear();
            }
            if remaining == max_count && remaining > 1 {
                max_svs.push(orig_sv_index);
            }
        }
        max_svs
    }

    /// Select the candidates attached to the most constrained breakends
    ///
    /// # Arguments
    /// * `restricted_svs` - If not empty, only breakends of these original SVs are considered, and
    ///   the selection is further limited to candidates whose partner breakend is also most
    ///   constrained
    ///
    fn select_candidates(&self, restricted_svs: &[usize]) -> Vec<usize> {
        let mut alt_counts = HashMap::<BreakendRef, usize>::new();
        for candidate in self.candidates.iter().filter(|x| x.is_active) {
            for be in candidate.pair.breakends() {
                *alt_counts.entry(be).or_default() += 1;
            }
        }

        let is_in_scope =
            |be: &BreakendRef| restricted_svs.is_empty() || restricted_svs.contains(&be.sv_index);
        let Some(min_count) = alt_counts
            .iter()
            .filter(|(be, _)| is_in_scope(*be))
            .map(|(_, &count)| count)
            .min()
        else {
            return Vec::new();
        };
        let min_breakends = alt_counts
            .iter()
            .filter(|(be, count)| is_in_scope(*be) && **count == min_count)
            .map(|(&be, _)| be)
            .collect::<HashSet<_>>();

        let mut selection = self
            .candidates
            .iter()
            .enumerate()
            .filter(|(_, x)| {
                x.is_active && x.pair.breakends().iter().any(|be| min_breakends.contains(be))
            })
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        if !restricted_svs.is_empty() {
            let partner_count = |i: &usize| {
                let pair = &self.candidates[*i].pair;
                if min_breakends.contains(&pair.first) && min_breakends.contains(&pair.second) {
                    min_count
                } else if min_breakends.contains(&pair.first) {
                    alt_counts[&pair.second]
                } else {
                    alt_counts[&pair.first]
                }
            };
            if let Some(min_partner_count) = selection.iter().map(partner_count).min() {
                selection.retain(|x| partner_count(x) == min_partner_count);
            }
        }
        selection
    }

    /// Add selected candidates shortest first, removing candidates which clash with each addition
    /// from the rest of the round
    ///
    /// Returns the number of pairs added
    ///
    fn run_selection_round(&mut self, selection: &[usize]) -> SimpleResult<usize> {
        let mut queue = CandidateQueue::new(selection.iter().map(|&i| {
            let candidate = &self.candidates[i];
            (i, candidate.pair.length, candidate.rank)
        }));

        let mut added_count = 0;
        while let Some(index) = queue.pop() {
            let pair = self.candidates[index].pair.clone();
            for &other_index in selection.iter() {
                if other_index != index && self.candidates[other_index].pair.shares_breakend(&pair)
                {
                    queue.remove(other_index);
                }
            }

            if !self.candidates[index].is_active {
                continue;
            }
            if !self.is_usable(&pair) {
                self.candidates[index].is_active = false;
                continue;
            }
            if self.add_pair(&pair)? {
                added_count += 1;
                self.remove_opposite_end_conflicts(&pair);
            } else {
                self.candidates[index].is_active = false;
            }
            self.deactivate_exhausted_candidates();
        }
        Ok(added_count)
    }

    fn run(&mut self, assembly_pairs: &[LinkedPair]) -> SimpleResult<()> {
        for pair in assembly_pairs
            .iter()
            .filter(|x| x.link_type == LinkType::TemplatedInsertion)
        {
            if self.add_pair(pair)? {
                self.remove_opposite_end_conflicts(pair);
            }
        }

        loop {
            self.deactivate_exhausted_candidates();
            if !self.has_active_candidates() {
                break;
            }

            let restricted_svs = self.get_max_replication_svs();
            let selection = self.select_candidates(&restricted_svs);
            let added_count = if selection.is_empty() {
                0
            } else {
                self.run_selection_round(&selection)?
            };

            if added_count == 0 && !restricted_svs.is_empty() {
                debug!(
                    "Cluster {}: dropping SVs {restricted_svs:?} from replication priority",
                    self.cluster_id
                );
                self.dropped_svs.extend(restricted_svs);
            } else if selection.is_empty() {
                break;
            }
        }
        Ok(())
    }

    fn into_result(mut self, sv_indexes: &[usize]) -> ChainFinderResult {
        for (chain_id, chain) in self.chains.iter_mut().enumerate() {
            chain.id = chain_id;
        }
        let unlinked_svs = sv_indexes
            .iter()
            .copied()
            .filter(|&x| !self.chains.iter().any(|c| c.has_sv(x)))
            .collect();
        ChainFinderResult {
            is_valid: true,
            chains: self.chains,
            linked_pairs: self.linked_pairs,
            unlinked_svs,
        }
    }
}

/// Assemble the templated insertions of one cluster into chains
///
/// Assembly pairs are placed first, inferred pairs are then added by a most-constrained-first
/// search which prioritizes the breakends of the SVs with the most remaining replicated instances.
///
/// # Arguments
/// * `sv_indexes` - All SV instances of the cluster, in arena order
/// * `assembly_pairs` - Assembly supported pairs on original breakends
/// * `inferred_pairs` - Inferred pairs on original breakends, sorted by length
///
pub fn find_chains(
    svs: &SampleSvs,
    cluster_id: usize,
    sv_indexes: &[usize],
    assembly_pairs: &[LinkedPair],
    inferred_pairs: &[LinkedPair],
    tie_break: ChainTieBreak,
) -> ChainFinderResult {
    let mut finder = ChainFinder::new(svs, cluster_id, sv_indexes, inferred_pairs, tie_break);
    match finder.run(assembly_pairs) {
        Ok(()) => finder.into_result(sv_indexes),
        Err(e) => {
            warn!("Cluster {cluster_id}: chain finder run is invalid: {e}");
            ChainFinderResult::invalid(sv_indexes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis_settings::AnalysisSettings;
    use crate::link_finder::find_cluster_links;
    use crate::sv::tests::{get_test_sample_svs, get_test_sv};
    use crate::sv::{BreakendSide, ChromCopyNumbers, SvType};

    fn run_chain_finder(svs: &SampleSvs) -> ChainFinderResult {
        let sv_indexes = (0..svs.svs.len()).collect::<Vec<_>>();
        let originals = (0..svs.original_count()).collect::<Vec<_>>();
        let links = find_cluster_links(svs, &originals, &AnalysisSettings::default());
        find_chains(
            svs,
            0,
            &sv_indexes,
            &links.assembly_pairs,
            &links.inferred_pairs,
            ChainTieBreak::Arrival,
        )
    }

    /// Check that every instance is in exactly one chain or the unlinked set
    fn assert_partition(svs: &SampleSvs, result: &ChainFinderResult) {
        for sv_index in 0..svs.svs.len() {
            let chain_count = result.chains.iter().filter(|c| c.has_sv(sv_index)).count();
            let unlinked_count = result
                .unlinked_svs
                .iter()
                .filter(|&&x| x == sv_index)
                .count();
            assert_eq!(chain_count + unlinked_count, 1, "SV instance {sv_index}");
        }
        for chain in result.chains.iter() {
            assert!(!chain.has_repeated_breakend());
        }
    }

    #[test]
    fn test_shortest_first() {
        // Two independent facing pairs: a-b with length 500 and c-d with length 50
        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 1500, -1), Some(("2", 7_000_000, 1))),
            get_test_sv("c", SvType::Bnd, ("1", 50_000, 1), Some(("2", 200, 1))),
            get_test_sv("d", SvType::Bnd, ("1", 50_050, -1), Some(("2", 7_100_000, 1))),
        ]);
        let result = run_chain_finder(&svs);
        assert!(result.is_valid);
        assert_eq!(result.linked_pairs.len(), 2);
        assert_eq!(result.linked_pairs[0].length, 50);
        assert_eq!(result.linked_pairs[1].length, 500);
        assert_eq!(result.chains.len(), 2);
        assert!(!result.is_fully_chained());
        assert_partition(&svs, &result);
    }

    #[test]
    fn test_three_sv_chain_without_loop() {
        use BreakendSide::*;

        // c.end -> a.start, a.end -> b.start and b.end -> c.start would form a loop
        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Del, ("1", 1000, -1), Some(("1", 2000, 1))),
            get_test_sv("b", SvType::Del, ("1", 2600, -1), Some(("1", 3000, 1))),
            get_test_sv("c", SvType::Bnd, ("1", 3700, -1), Some(("1", 500, 1))),
        ]);
        let result = run_chain_finder(&svs);
        assert!(result.is_valid);
        assert_eq!(result.chains.len(), 1);
        let chain = &result.chains[0];
        assert_eq!(chain.link_count(), 2);
        assert_eq!(chain.sv_indexes(), vec![1, 0, 2]);
        assert_eq!(chain.open_start(&svs), Some(BreakendRef::new(1, End)));
        assert_eq!(chain.open_end(&svs), Some(BreakendRef::new(2, Start)));
        assert!(result.is_fully_chained());
        assert_partition(&svs, &result);
    }

    #[test]
    fn test_opposite_end_conflict() {
        // A DUP enclosing a DEL can face on both sides, only one side is used
        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Dup, ("1", 1000, 1), Some(("1", 4000, -1))),
            get_test_sv("b", SvType::Del, ("1", 2000, -1), Some(("1", 3000, 1))),
        ]);
        let result = run_chain_finder(&svs);
        assert!(result.is_valid);
        assert_eq!(result.chains.len(), 1);
        assert_eq!(result.chains[0].link_count(), 1);
        assert!(result.is_fully_chained());
        assert_partition(&svs, &result);
    }

    #[test]
    fn test_replication_exhaustion() {
        // x has four instances but only two partners
        let mut inputs = vec![
            get_test_sv("x", SvType::Bnd, ("1", 10_000, -1), Some(("2", 100, -1))),
            get_test_sv("a", SvType::Bnd, ("2", 4_000_000, -1), Some(("1", 9000, 1))),
            get_test_sv("b", SvType::Bnd, ("2", 5_000_000, -1), Some(("1", 9500, 1))),
        ];
        inputs[0].ploidy = 4.0;
        let mut svs = get_test_sample_svs(inputs);
        assert_eq!(svs.expand_replicated_svs(&ChromCopyNumbers::new(1.0), 8), 3);
        assert_eq!(svs.svs[0].replication_count, 3);

        let result = run_chain_finder(&svs);
        assert!(result.is_valid);
        assert_eq!(result.chains.len(), 2);
        assert_eq!(
            result.linked_pairs.iter().map(|x| x.length).collect::<Vec<_>>(),
            vec![500, 1000]
        );
        assert_eq!(result.unlinked_svs, vec![4, 5]);
        assert_partition(&svs, &result);
    }

    #[test]
    fn test_replication_priority_dropped() {
        // x keeps unused instances after both of its partners are linked. The shorter c-d pair is
        // only reached after x is dropped from replication priority.
        let mut inputs = vec![
            get_test_sv("x", SvType::Bnd, ("1", 10_000, -1), Some(("2", 100, -1))),
            get_test_sv("a", SvType::Bnd, ("2", 4_000_000, -1), Some(("1", 9000, 1))),
            get_test_sv("b", SvType::Bnd, ("2", 5_000_000, -1), Some(("1", 9500, 1))),
            get_test_sv("c", SvType::Bnd, ("1", 50_000, 1), Some(("1", 60_000, 1))),
            get_test_sv("d", SvType::Bnd, ("1", 50_050, -1), Some(("1", 70_000, -1))),
        ];
        inputs[0].ploidy = 4.0;
        let mut svs = get_test_sample_svs(inputs);
        svs.expand_replicated_svs(&ChromCopyNumbers::new(1.0), 8);

        let result = run_chain_finder(&svs);
        assert!(result.is_valid);
        assert_eq!(
            result.linked_pairs.iter().map(|x| x.length).collect::<Vec<_>>(),
            vec![500, 1000, 50]
        );
        assert_eq!(result.chains.len(), 3);
        assert_eq!(result.unlinked_svs, vec![6, 7]);
        assert_partition(&svs, &result);
    }

    #[test]
    fn test_short_assembly_link_not_chained() {
        let mut inputs = vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 1010, -1), Some(("2", 7_000_000, 1))),
        ];
        inputs[0].start.assembly_tokens = vec!["asm1".to_string()];
        inputs[1].start.assembly_tokens = vec!["asm1".to_string()];
        let svs = get_test_sample_svs(inputs);

        let result = run_chain_finder(&svs);
        assert!(result.is_valid);
        assert!(result.chains.is_empty());
        assert_eq!(result.unlinked_svs, vec![0, 1]);
    }

    #[test]
    fn test_chain_merge() {
        // a.end -> b.start and c.end -> d.start form two chains before b.end -> c.start joins them
        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Bnd, ("2", 100, -1), Some(("1", 1000, 1))),
            get_test_sv("b", SvType::Del, ("1", 1100, -1), Some(("1", 2000, 1))),
            get_test_sv("c", SvType::Del, ("1", 2300, -1), Some(("1", 3000, 1))),
            get_test_sv("d", SvType::Bnd, ("1", 3200, -1), Some(("2", 7_000_000, 1))),
        ]);
        let result = run_chain_finder(&svs);
        assert!(result.is_valid);
        assert_eq!(
            result.linked_pairs.iter().map(|x| x.length).collect::<Vec<_>>(),
            vec![100, 200, 300]
        );
        assert_eq!(result.chains.len(), 1);
        assert_eq!(result.chains[0].id, 0);
        assert_eq!(result.chains[0].sv_indexes(), vec![0, 1, 2, 3]);
        assert!(result.is_fully_chained());
        assert_partition(&svs, &result);
    }

    #[test]
    fn test_replicated_sv_chain() {
        use BreakendSide::*;

        // One instance of d is enough to join a.start -> d -> b.start, the other is left unlinked
        let mut inputs = vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, -1))),
            get_test_sv("d", SvType::Dup, ("1", 1500, -1), Some(("1", 2500, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 3000, -1), Some(("2", 7_000_000, 1))),
        ];
        inputs[1].ploidy = 2.0;
        let mut svs = get_test_sample_svs(inputs);
        svs.expand_replicated_svs(&ChromCopyNumbers::new(1.0), 8);

        let result = run_chain_finder(&svs);
        assert!(result.is_valid);
        assert_partition(&svs, &result);
        assert_eq!(result.chains.len(), 1);
        assert_eq!(result.chains[0].sv_indexes(), vec![0, 1, 2]);
        assert_eq!(result.unlinked_svs, vec![3]);
        let linked_breakends = result
            .linked_pairs
            .iter()
            .flat_map(|x| x.breakends())
            .collect::<Vec<_>>();
        assert!(linked_breakends.contains(&BreakendRef::new(0, Start)));
        assert!(linked_breakends.contains(&BreakendRef::new(2, Start)));
    }

    #[test]
    fn test_invalid_run() {
        use BreakendSide::*;

        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 1500, -1), Some(("2", 7_000_000, 1))),
            get_test_sv("c", SvType::Bnd, ("1", 3000, -1), Some(("2", 7_500_000, 1))),
        ]);

        // The assembly pair refers to an SV outside of the cluster
        let pair = LinkedPair::new(
            svs.breakend(BreakendRef::new(0, Start)),
            svs.breakend(BreakendRef::new(2, Start)),
            LinkType::TemplatedInsertion,
            false,
            30,
        );
        let result = find_chains(&svs, 0, &[0, 1], &[pair], &[], ChainTieBreak::Arrival);
        assert!(!result.is_valid);
        assert!(result.chains.is_empty());
        assert_eq!(result.unlinked_svs, vec![0, 1]);
    }
}
