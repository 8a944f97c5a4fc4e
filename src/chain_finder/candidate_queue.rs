use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use crate::analysis_settings::ChainTieBreak;
use crate::linked_pair::LinkedPair;
use crate::sv::SampleSvs;

/// Rank each candidate pair for tie-breaking among candidates of equal length
///
/// Lower ranks are selected first.
///
pub fn get_tie_break_ranks(
    svs: &SampleSvs,
    pairs: &[LinkedPair],
    tie_break: ChainTieBreak,
) -> Vec<usize> {
    match tie_break {
        ChainTieBreak::Arrival => (0..pairs.len()).collect(),
        ChainTieBreak::Position => {
            let mut order = (0..pairs.len()).collect::<Vec<_>>();
            order.sort_by_key(|&i| {
                let be = svs.breakend(pairs[i].first);
                (be.chrom.as_str(), be.pos, i)
            });
            let mut ranks = vec![0; pairs.len()];
            for (rank, i) in order.into_iter().enumerate() {
                ranks[i] = rank;
            }
            ranks
        }
    }
}

/// Min-priority queue of candidate indexes keyed on (length, tie-break rank)
///
/// Removal is lazy: removed entries are skipped when they reach the top of the heap.
///
pub struct CandidateQueue {
    heap: BinaryHeap<Reverse<(i64, usize, usize)>>,
    removed: HashSet<usize>,
}

impl CandidateQueue {
    /// # Arguments
    /// * `entries` - (candidate index, length, tie-break rank) for each candidate
    ///
    pub fn new(entries: impl IntoIterator<Item = (usize, i64, usize)>) -> Self {
        let heap = entries
            .into_iter()
            .map(|(index, length, rank)| Reverse((length, rank, index)))
            .collect();
        Self {
            heap,
            removed: HashSet::new(),
        }
    }

    pub fn remove(&mut self, index: usize) {
        self.removed.insert(index);
    }

    /// Return the shortest remaining candidate index and remove it from the queue
    pub fn pop(&mut self) -> Option<usize> {
        while let Some(Reverse((_, _, index))) = self.heap.pop() {
            if self.removed.insert(index) {
                return Some(index);
            }
        }
        None
    }
}
