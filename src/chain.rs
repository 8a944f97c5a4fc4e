use std::collections::HashSet;
use std::fmt;

use crate::linked_pair::LinkedPair;
use crate::sv::{BreakendRef, SampleSvs};

/// An ordered path of linked pairs representing a candidate derivative chromosome segment
///
/// Each link is stored in chain order, so that the `second` breakend of one link and the `first`
/// breakend of the next link are the two breakends of the same SV instance.
///
#[derive(Clone)]
pub struct Chain {
    pub id: usize,
    pub links: Vec<LinkedPair>,
}

impl Chain {
    pub fn new(id: usize, pair: LinkedPair) -> Self {
        Self {
            id,
            links: vec![pair],
        }
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// The unlinked breakend of the SV at the start of the chain
    ///
    /// Returns None if that SV has a single breakend.
    ///
    pub fn open_start(&self, svs: &SampleSvs) -> Option<BreakendRef> {
        let be = self.links.first()?.first.other_side();
        svs.get_breakend(be).map(|_| be)
    }

    /// The unlinked breakend of the SV at the end of the chain
    ///
    /// Returns None if that SV has a single breakend.
    ///
    pub fn open_end(&self, svs: &SampleSvs) -> Option<BreakendRef> {
        let be = self.links.last()?.second.other_side();
        svs.get_breakend(be).map(|_| be)
    }

    pub fn open_breakends(&self, svs: &SampleSvs) -> [Option<BreakendRef>; 2] {
        [self.open_start(svs), self.open_end(svs)]
    }

    /// SV instances in chain order
    pub fn sv_indexes(&self) -> Vec<usize> {
        let mut sv_indexes = Vec::new();
        if let Some(first) = self.links.first() {
            sv_indexes.push(first.first.sv_index);
        }
        sv_indexes.extend(self.links.iter().map(|x| x.second.sv_index));
        sv_indexes
    }

    pub fn has_sv(&self, sv_index: usize) -> bool {
        self.links.iter().any(|x| x.has_sv(sv_index))
    }

    /// Add pair to the end of the chain, the pair's first breakend must be the chain's open end
    pub fn append(&mut self, pair: LinkedPair) {
        if let Some(last) = self.links.last() {
            assert_eq!(last.second.other_side(), pair.first);
        }
        self.links.push(pair);
    }

    /// Add pair to the start of the chain, the pair's second breakend must be the chain's open
    /// start
    pub fn prepend(&mut self, pair: LinkedPair) {
        if let Some(first) = self.links.first() {
            assert_eq!(first.first.other_side(), pair.second);
        }
        self.links.insert(0, pair);
    }

    /// Reverse the chain direction
    pub fn reverse(&mut self) {
        self.links.reverse();
        for link in self.links.iter_mut() {
            std::mem::swap(&mut link.first, &mut link.second);
        }
    }

    /// Append all links of `other` to this chain, `other` must start where this chain ends
    pub fn extend(&mut self, other: Chain) {
        for link in other.links {
            self.append(link);
        }
    }

    /// Insert all links of `other` before this chain, `other` must end where this chain starts
    pub fn extend_front(&mut self, other: Chain) {
        let links = std::mem::replace(&mut self.links, other.links);
        for link in links {
            self.append(link);
        }
    }

    /// True if any breakend instance is used twice in the chain
    pub fn has_repeated_breakend(&self) -> bool {
        let mut seen = HashSet::new();
        !self
            .links
            .iter()
            .flat_map(|x| x.breakends())
            .all(|x| seen.insert(x))
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Chain {}: {:?}", self.id, self.links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linked_pair::LinkType;
    use crate::sv::tests::{get_test_sample_svs, get_test_sv};
    use crate::sv::{BreakendSide, SvType};

    fn be(sv_index: usize, side: BreakendSide) -> BreakendRef {
        BreakendRef::new(sv_index, side)
    }

    #[test]
    fn test_chain_growth() {
        use BreakendSide::*;

        // Three SVs chained a.end -> b.start, b.end -> c.start
        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Bnd, ("2", 100, -1), Some(("1", 1000, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 2000, -1), Some(("1", 3000, 1))),
            get_test_sv("c", SvType::Bnd, ("1", 4000, -1), Some(("2", 900, 1))),
        ]);
        let pair = |x: BreakendRef, y: BreakendRef| {
            LinkedPair::new(
                svs.breakend(x),
                svs.breakend(y),
                LinkType::TemplatedInsertion,
                true,
                30,
            )
        };

        let mut chain = Chain::new(0, pair(be(1, End), be(2, Start)));
        assert_eq!(chain.open_start(&svs), Some(be(1, Start)));
        assert_eq!(chain.open_end(&svs), Some(be(2, End)));

        chain.prepend(pair(be(0, End), be(1, Start)));
        assert_eq!(chain.sv_indexes(), vec![0, 1, 2]);
        assert_eq!(chain.open_start(&svs), Some(be(0, Start)));
        assert!(!chain.has_repeated_breakend());

        chain.reverse();
        assert_eq!(chain.sv_indexes(), vec![2, 1, 0]);
        assert_eq!(chain.open_start(&svs), Some(be(2, End)));
        assert_eq!(chain.open_end(&svs), Some(be(0, Start)));
    }

    #[test]
    fn test_single_breakend_open_end() {
        use BreakendSide::*;

        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Sgl, ("1", 1000, 1), None),
            get_test_sv("b", SvType::Bnd, ("1", 2000, -1), Some(("2", 3000, 1))),
        ]);
        let chain = Chain::new(
            0,
            LinkedPair::new(
                svs.breakend(be(0, Start)),
                svs.breakend(be(1, Start)),
                LinkType::TemplatedInsertion,
                true,
                30,
            ),
        );
        assert_eq!(chain.open_start(&svs), None);
        assert_eq!(chain.open_end(&svs), Some(be(1, End)));
    }

    #[test]
    fn test_repeated_breakend() {
        use BreakendSide::*;

        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 2000, -1), Some(("2", 3000, 1))),
        ]);
        let pair = LinkedPair::new(
            svs.breakend(be(0, Start)),
            svs.breakend(be(1, Start)),
            LinkType::TemplatedInsertion,
            true,
            30,
        );
        let chain = Chain {
            id: 0,
            links: vec![pair.clone(), pair],
        };
        assert!(chain.has_repeated_breakend());
    }
}
