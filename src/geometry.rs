//! Breakend geometry predicates shared by clustering, linking, chaining and classification
//!

use crate::sv::Breakend;

/// Return the two breakends in (lower, upper) order
///
/// Breakends at the same position are ordered with the leftward-facing breakend first, so that
/// a zero length section break is recognized.
///
pub fn order_breakends<'a>(be1: &'a Breakend, be2: &'a Breakend) -> (&'a Breakend, &'a Breakend) {
    if (be1.pos, be1.orientation) <= (be2.pos, be2.orientation) {
        (be1, be2)
    } else {
        (be2, be1)
    }
}

/// Get the number of bases separating two breakends, or None if they are on different chromosomes
pub fn get_breakend_distance(be1: &Breakend, be2: &Breakend) -> Option<i64> {
    if be1.chrom != be2.chrom {
        None
    } else {
        Some((be1.pos - be2.pos).abs())
    }
}

pub fn is_same_valid_arm(be1: &Breakend, be2: &Breakend) -> bool {
    be1.chrom == be2.chrom && be1.arm.is_valid() && be1.arm == be2.arm
}

/// True if the breakends face each other, so that the bases between them could be retained as a
/// templated insertion
///
/// The lower breakend must face right and the upper breakend must face left, with the two
/// positions strictly apart.
///
/// # Arguments
/// * `allow_centromere_span` - If true, only the chromosome must match, otherwise both breakends
///   must be on the same valid chromosome arm
///
pub fn are_facing(be1: &Breakend, be2: &Breakend, allow_centromere_span: bool) -> bool {
    if be1.chrom != be2.chrom {
        return false;
    }
    if !allow_centromere_span && !is_same_valid_arm(be1, be2) {
        return false;
    }
    let (lower, upper) = order_breakends(be1, be2);
    lower.pos < upper.pos && lower.orientation == 1 && upper.orientation == -1
}

/// True if the breakends point away from each other on the same arm, so that the bases between
/// them are lost, forming a deletion bridge
///
pub fn are_section_break(be1: &Breakend, be2: &Breakend) -> bool {
    if !is_same_valid_arm(be1, be2) {
        return false;
    }
    let (lower, upper) = order_breakends(be1, be2);
    lower.pos <= upper.pos && lower.orientation == -1 && upper.orientation == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sv::SvType;
    use crate::sv::tests::{get_test_sample_svs, get_test_sv};

    #[test]
    fn test_are_facing() {
        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, 1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 2000, -1), Some(("2", 900, 1))),
            get_test_sv("c", SvType::Bnd, ("1", 6_000_000, -1), Some(("2", 50, -1))),
        ]);
        let a = &svs.svs[0];
        let b = &svs.svs[1];
        let c = &svs.svs[2];
        assert!(are_facing(&a.start, &b.start, false));
        assert!(are_facing(&b.start, &a.start, false));

        // same orientation:
        assert!(!are_facing(a.end.as_ref().unwrap(), b.end.as_ref().unwrap(), false));

        // facing away:
        assert!(!are_facing(c.end.as_ref().unwrap(), a.end.as_ref().unwrap(), false));

        // centromere spanning:
        assert!(!are_facing(&a.start, &c.start, false));
        assert!(are_facing(&a.start, &c.start, true));
    }

    #[test]
    fn test_are_section_break() {
        let svs = get_test_sample_svs(vec![
            get_test_sv("a", SvType::Bnd, ("1", 1000, -1), Some(("2", 100, 1))),
            get_test_sv("b", SvType::Bnd, ("1", 1010, 1), Some(("2", 100, -1))),
        ]);
        let a = &svs.svs[0];
        let b = &svs.svs[1];
        assert!(are_section_break(&a.start, &b.start));
        assert!(!are_facing(&a.start, &b.start, true));

        // zero length deletion bridge
        assert!(are_section_break(a.end.as_ref().unwrap(), b.end.as_ref().unwrap()));
    }
}
