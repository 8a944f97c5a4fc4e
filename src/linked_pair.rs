use std::fmt;

use serde::Serialize;

use crate::sv::{Breakend, BreakendRef};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, strum::Display)]
pub enum LinkType {
    /// Bases between the two breakends are retained in the derivative chromosome
    #[strum(serialize = "TI")]
    #[serde(rename = "TI")]
    TemplatedInsertion,

    /// Bases between the two breakends are lost
    #[strum(serialize = "DB")]
    #[serde(rename = "DB")]
    DeletionBridge,
}

/// A proposed direct adjacency between two breakends of different SV instances
///
#[derive(Clone)]
pub struct LinkedPair {
    pub first: BreakendRef,
    pub second: BreakendRef,
    pub link_type: LinkType,

    /// Base distance between the two breakends
    pub length: i64,

    /// False for links directly supported by assembly evidence
    pub is_inferred: bool,

    /// Distance from the pair span to the closest breakend of any other SV, set after chaining
    pub next_sv_distance: Option<i64>,

    /// Count of other SV breakends inside the pair span, set after chaining
    pub traversed_sv_count: usize,
}

impl LinkedPair {
    /// Create a new linked pair from two breakends
    ///
    /// A templated insertion shorter than `min_ti_length` is reclassified as a deletion bridge.
    ///
    pub fn new(
        be1: &Breakend,
        be2: &Breakend,
        link_type: LinkType,
        is_inferred: bool,
        min_ti_length: i64,
    ) -> Self {
        assert_ne!(
            be1.sv_index, be2.sv_index,
            "Linked pair breakends must come from different SV instances"
        );
        let length = (be2.pos - be1.pos).abs();
        let link_type = if link_type == LinkType::TemplatedInsertion && length < min_ti_length {
            LinkType::DeletionBridge
        } else {
            link_type
        };
        Self {
            first: be1.handle(),
            second: be2.handle(),
            link_type,
            length,
            is_inferred,
            next_sv_distance: None,
            traversed_sv_count: 0,
        }
    }

    pub fn breakends(&self) -> [BreakendRef; 2] {
        [self.first, self.second]
    }

    pub fn has_breakend(&self, be: BreakendRef) -> bool {
        self.first == be || self.second == be
    }

    pub fn has_sv(&self, sv_index: usize) -> bool {
        self.first.sv_index == sv_index || self.second.sv_index == sv_index
    }

    pub fn shares_breakend(&self, other: &LinkedPair) -> bool {
        self.has_breakend(other.first) || self.has_breakend(other.second)
    }

    /// Copy of the pair with both breakends replaced by specific instances
    pub fn with_instances(&self, first: BreakendRef, second: BreakendRef) -> Self {
        let mut x = self.clone();
        x.first = first;
        x.second = second;
        x
    }
}

impl fmt::Debug for LinkedPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}({:?}-{:?} len={}{})",
            self.link_type,
            self.first,
            self.second,
            self.length,
            if self.is_inferred { "" } else { " asm" }
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::geometry::are_facing;
    use crate::sv::tests::{get_test_sample_svs, get_test_sv};
    use crate::sv::{BreakendSide, SvType};

    #[test]
    fn test_facing_pair_type() {
        let min_ti_length = 30;
        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 1500, -1), Some(("2", 900, 1))),
            get_test_sv("c", SvType::Bnd, ("1", 1020, -1), Some(("2", 950, 1))),
        ]);
        let a = &svs.svs[0].start;
        let b = &svs.svs[1].start;
        let c = &svs.svs[2].start;

        assert!(are_facing(a, b, false));
        let pair = LinkedPair::new(a, b, LinkType::TemplatedInsertion, true, min_ti_length);
        assert_eq!(pair.link_type, LinkType::TemplatedInsertion);
        assert_eq!(pair.length, 500);

        // Facing breakends closer than the minimum TI length become a deletion bridge
        assert!(are_facing(a, c, false));
        let pair = LinkedPair::new(a, c, LinkType::TemplatedInsertion, true, min_ti_length);
        assert_eq!(pair.link_type, LinkType::DeletionBridge);
        assert_eq!(pair.length, 20);
    }

    #[test]
    fn test_pair_relations() {
        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 1500, -1), Some(("2", 900, -1))),
        ]);
        let pair1 = LinkedPair::new(
            &svs.svs[0].start,
            &svs.svs[1].start,
            LinkType::TemplatedInsertion,
            true,
            30,
        );
        let a_start = BreakendRef::new(0, BreakendSide::Start);
        let b_end = BreakendRef::new(1, BreakendSide::End);
        let pair2 = pair1.with_instances(b_end, a_start);
        assert!(pair1.shares_breakend(&pair2));
        assert!(pair2.has_breakend(b_end));
        assert!(!pair1.has_breakend(b_end));
        assert!(pair1.has_sv(1));
        assert!(!pair1.has_sv(2));
    }

    #[test]
    fn test_breakend_use_by_link_type() {
        let a_start = BreakendRef::new(0, BreakendSide::Start);
        let mut use_counts = HashMap::<(BreakendRef, LinkType), usize>::new();
        *use_counts
            .entry((a_start, LinkType::TemplatedInsertion))
            .or_default() += 1;
        *use_counts
            .entry((a_start, LinkType::TemplatedInsertion))
            .or_default() += 1;
        *use_counts
            .entry((a_start, LinkType::DeletionBridge))
            .or_default() += 1;
        assert_eq!(use_counts[&(a_start, LinkType::TemplatedInsertion)], 2);
        assert_eq!(use_counts[&(a_start, LinkType::DeletionBridge)], 1);
    }
}
