use std::collections::HashMap;

use crate::sv::{BreakendRef, SampleSvs};

#[derive(Clone, Copy, Debug)]
pub struct IndexedBreakend {
    pub pos: i64,
    pub be: BreakendRef,
}

/// Position-sorted breakend handles for each chromosome
///
/// The index is built once per sample (or per cluster) and is read-only afterwards.
///
#[derive(Default)]
pub struct BreakendIndex {
    chroms: HashMap<String, Vec<IndexedBreakend>>,
}

impl BreakendIndex {
    /// Index every breakend of the given SV instances
    pub fn from_sv_indexes(svs: &SampleSvs, sv_indexes: impl IntoIterator<Item = usize>) -> Self {
        let mut chroms = HashMap::<String, Vec<IndexedBreakend>>::new();
        for sv_index in sv_indexes {
            for be in svs.svs[sv_index].breakends() {
                chroms
                    .entry(be.chrom.clone())
                    .or_default()
                    .push(IndexedBreakend {
                        pos: be.pos,
                        be: be.handle(),
                    });
            }
        }
        for breakends in chroms.values_mut() {
            breakends.sort_by_key(|x| (x.pos, x.be));
        }
        Self { chroms }
    }

    pub fn chrom_breakends(&self, chrom: &str) -> &[IndexedBreakend] {
        self.chroms.get(chrom).map(|x| x.as_slice()).unwrap_or(&[])
    }

    /// All breakends with position in [start, end]
    pub fn breakends_in_range(&self, chrom: &str, start: i64, end: i64) -> &[IndexedBreakend] {
        let breakends = self.chrom_breakends(chrom);
        let first = breakends.partition_point(|x| x.pos < start);
        let last = breakends.partition_point(|x| x.pos <= end);
        if first >= last {
            &[]
        } else {
            &breakends[first..last]
        }
    }

    /// Count breakends strictly inside (start, end), skipping breakends of the excluded SVs
    pub fn count_inside(&self, chrom: &str, start: i64, end: i64, exclude_svs: &[usize]) -> usize {
        if end - start < 2 {
            return 0;
        }
        self.breakends_in_range(chrom, start + 1, end - 1)
            .iter()
            .filter(|x| !exclude_svs.contains(&x.be.sv_index))
            .count()
    }

    /// Distance from the interval [start, end] to the closest breakend outside of it, skipping
    /// breakends of the excluded SVs
    ///
    /// Returns None if there are no other breakends on the chromosome
    ///
    pub fn nearest_outside_distance(
        &self,
        chrom: &str,
        start: i64,
        end: i64,
        exclude_svs: &[usize],
    ) -> Option<i64> {
        let breakends = self.chrom_breakends(chrom);
        let is_candidate = |x: &&IndexedBreakend| !exclude_svs.contains(&x.be.sv_index);

        let lower = breakends.partition_point(|x| x.pos < start);
        let left = breakends[..lower]
            .iter()
            .rev()
            .find(is_candidate)
            .map(|x| start - x.pos);

        let upper = breakends.partition_point(|x| x.pos <= end);
        let right = breakends[upper..]
            .iter()
            .find(is_candidate)
            .map(|x| x.pos - end);

        match (left, right) {
            (Some(l), Some(r)) => Some(std::cmp::min(l, r)),
            (l, r) => l.or(r),
        }
    }
}
