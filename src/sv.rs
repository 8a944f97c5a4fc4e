//! Structural variant and breakend types, stored per sample in a single SV arena
//!
//! All cross references between SVs, breakends, linked pairs, chains and clusters use integer
//! indexes into the sample's [SampleSvs] arena.
//!

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use unwrap::unwrap;

use crate::ref_genome::{ChromosomeArm, RefGenomeCoords};

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SvType {
    Del,
    Dup,
    Ins,
    Inv,
    Bnd,
    Sgl,

    /// Inferred breakend, typically a copy number transition without a called SV
    Inf,
}

impl SvType {
    /// True for the SV types which can be resolved on their own as a simple SV
    pub fn is_simple(&self) -> bool {
        matches!(self, SvType::Del | SvType::Dup | SvType::Ins)
    }

    pub fn is_single_breakend(&self) -> bool {
        matches!(self, SvType::Sgl | SvType::Inf)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize)]
pub enum BreakendSide {
    Start,
    End,
}

impl BreakendSide {
    pub fn other(&self) -> Self {
        match self {
            BreakendSide::Start => BreakendSide::End,
            BreakendSide::End => BreakendSide::Start,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            BreakendSide::Start => 0,
            BreakendSide::End => 1,
        }
    }
}

/// Handle to one breakend instance in the sample SV arena
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct BreakendRef {
    pub sv_index: usize,
    pub side: BreakendSide,
}

impl BreakendRef {
    pub fn new(sv_index: usize, side: BreakendSide) -> Self {
        Self { sv_index, side }
    }

    pub fn other_side(&self) -> Self {
        Self::new(self.sv_index, self.side.other())
    }
}

impl fmt::Debug for BreakendRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let side = if self.side == BreakendSide::Start {
            "s"
        } else {
            "e"
        };
        write!(f, "{}{side}", self.sv_index)
    }
}

/// A single breakend of a structural variant
///
/// Orientation follows the convention that +1 means the retained sequence extends rightward from
/// the break (the breakend 'faces right'), and -1 means the retained sequence extends leftward.
///
/// Breakends are not modified after creation. Replicated breakends are distinct objects with the
/// same chromosome, position and orientation as their original.
///
#[derive(Clone, Debug)]
pub struct Breakend {
    pub chrom: String,
    pub pos: i64,
    pub orientation: i8,
    pub arm: ChromosomeArm,
    pub copy_number_before: f64,
    pub copy_number_after: f64,

    /// Index of the owning SV instance
    pub sv_index: usize,
    pub side: BreakendSide,
    pub is_replicated: bool,

    /// Index of the original SV instance, this is the same as sv_index for non-replicated breakends
    pub orig_sv_index: usize,
}

impl Breakend {
    pub fn handle(&self) -> BreakendRef {
        BreakendRef::new(self.sv_index, self.side)
    }

    pub fn orig_handle(&self) -> BreakendRef {
        BreakendRef::new(self.orig_sv_index, self.side)
    }

    pub fn copy_number_change(&self) -> f64 {
        (self.copy_number_after - self.copy_number_before).abs()
    }

    /// Contribution of this breakend to the telomere/centromere consistency sum
    pub fn consistency(&self) -> i32 {
        self.orientation as i32 * self.arm.side_factor()
    }

    /// True if the other breakend is at the same location and has the same orientation
    pub fn is_same_location(&self, other: &Breakend) -> bool {
        self.chrom == other.chrom
            && self.pos == other.pos
            && self.orientation == other.orientation
    }
}

/// Breakend description supplied by the SV input collaborator
#[derive(Clone, Debug)]
pub struct BreakendInput {
    pub chrom: String,
    pub pos: i64,
    pub orientation: i8,

    /// Copy number on the retained side of the break
    pub copy_number: f64,
    pub copy_number_change: f64,
    pub assembly_tokens: Vec<String>,
    pub is_line_element: bool,
}

/// SV description supplied by the SV input collaborator
#[derive(Clone, Debug)]
pub struct SvInput {
    pub id: String,
    pub sv_type: SvType,
    pub start: BreakendInput,
    pub end: Option<BreakendInput>,
    pub ploidy: f64,
}

#[derive(Clone, Debug)]
pub struct StructuralVariant {
    pub id: String,
    pub sv_type: SvType,
    pub start: Breakend,
    pub end: Option<Breakend>,
    pub ploidy: f64,

    /// Assembly evidence tokens for the start and end breakend
    pub assembly_tokens: [Vec<String>; 2],

    /// Mobile element (LINE) insertion flags for the start and end breakend
    pub line_element: [bool; 2],

    /// Number of additional instances of this SV required to explain its copy number
    pub replication_count: usize,

    pub is_replicated: bool,
    pub orig_sv_index: usize,

    /// Set for a breakend when a second assembly link was rejected on it
    pub assembly_conflict: [bool; 2],
}

impl StructuralVariant {
    pub fn breakend(&self, side: BreakendSide) -> Option<&Breakend> {
        match side {
            BreakendSide::Start => Some(&self.start),
            BreakendSide::End => self.end.as_ref(),
        }
    }

    pub fn breakends(&self) -> impl Iterator<Item = &Breakend> {
        std::iter::once(&self.start).chain(self.end.iter())
    }

    /// Base span of the SV on one chromosome, or zero if the SV has no defined span
    pub fn length(&self) -> i64 {
        match &self.end {
            Some(end) if end.chrom == self.start.chrom && self.sv_type != SvType::Ins => {
                (end.pos - self.start.pos).abs()
            }
            _ => 0,
        }
    }

    pub fn is_line_element(&self) -> bool {
        self.line_element.iter().any(|&x| x)
    }

    /// Signed telomere/centromere consistency sum over the SV breakends
    pub fn consistency(&self) -> i32 {
        self.breakends().map(|x| x.consistency()).sum()
    }
}

/// Per-chromosome copy number used to derive SV replication counts
#[derive(Clone)]
pub struct ChromCopyNumbers {
    pub default_copy_number: f64,
    pub data: HashMap<String, f64>,
}

impl ChromCopyNumbers {
    pub fn new(default_copy_number: f64) -> Self {
        Self {
            default_copy_number,
            data: HashMap::new(),
        }
    }

    pub fn get(&self, chrom: &str) -> f64 {
        *self.data.get(chrom).unwrap_or(&self.default_copy_number)
    }
}

/// Replication count is the number of additional SV instances implied by the SV ploidy relative to
/// the chromosome copy number
///
pub fn get_replication_count(
    ploidy: f64,
    chrom_copy_number: f64,
    max_replication_count: usize,
) -> usize {
    if chrom_copy_number <= 0.0 || ploidy <= 0.0 {
        return 0;
    }
    let count = (ploidy / chrom_copy_number).round() as i64 - 1;
    std::cmp::min(std::cmp::max(count, 0) as usize, max_replication_count)
}

fn make_breakend(
    ref_coords: &RefGenomeCoords,
    input: &BreakendInput,
    sv_index: usize,
    side: BreakendSide,
) -> Breakend {
    // The copy number change is lost going from the retained side across the break
    let retained = input.copy_number;
    let lost = input.copy_number - input.copy_number_change;
    let (copy_number_before, copy_number_after) = if input.orientation > 0 {
        (lost, retained)
    } else {
        (retained, lost)
    };
    Breakend {
        chrom: input.chrom.clone(),
        pos: input.pos,
        orientation: input.orientation,
        arm: ref_coords.arm(&input.chrom, input.pos),
        copy_number_before,
        copy_number_after,
        sv_index,
        side,
        is_replicated: false,
        orig_sv_index: sv_index,
    }
}

/// The SV arena for one sample
///
/// Original SVs occupy indexes `0..original_count()` in input order. Replicated instances are
/// appended after all originals.
///
pub struct SampleSvs {
    pub svs: Vec<StructuralVariant>,
    original_count: usize,
}

impl SampleSvs {
    pub fn new(ref_coords: &RefGenomeCoords, sv_inputs: Vec<SvInput>) -> Self {
        let svs = sv_inputs
            .into_iter()
            .enumerate()
            .map(|(sv_index, input)| {
                let start = make_breakend(ref_coords, &input.start, sv_index, BreakendSide::Start);
                let end = input
                    .end
                    .as_ref()
                    .filter(|_| !input.sv_type.is_single_breakend())
                    .map(|x| make_breakend(ref_coords, x, sv_index, BreakendSide::End));
                let end_tokens = input
                    .end
                    .as_ref()
                    .map(|x| x.assembly_tokens.clone())
                    .unwrap_or_default();
                let end_line = input.end.as_ref().is_some_and(|x| x.is_line_element);
                StructuralVariant {
                    id: input.id,
                    sv_type: input.sv_type,
                    start,
                    end,
                    ploidy: input.ploidy,
                    assembly_tokens: [input.start.assembly_tokens, end_tokens],
                    line_element: [input.start.is_line_element, end_line],
                    replication_count: 0,
                    is_replicated: false,
                    orig_sv_index: sv_index,
                    assembly_conflict: [false; 2],
                }
            })
            .collect::<Vec<_>>();
        let original_count = svs.len();
        Self {
            svs,
            original_count,
        }
    }

    pub fn original_count(&self) -> usize {
        self.original_count
    }

    pub fn is_original(&self, sv_index: usize) -> bool {
        sv_index < self.original_count
    }

    pub fn get_breakend(&self, be: BreakendRef) -> Option<&Breakend> {
        self.svs.get(be.sv_index)?.breakend(be.side)
    }

    /// Get breakend from a handle which is known to be valid
    pub fn breakend(&self, be: BreakendRef) -> &Breakend {
        unwrap!(self.get_breakend(be), "Invalid breakend handle {be:?}")
    }

    pub fn find_original_by_id(&self, id: &str) -> Option<usize> {
        self.svs[..self.original_count].iter().position(|x| x.id == id)
    }

    /// Set replication counts on all original SVs and append their replicated instances to the
    /// arena
    ///
    /// Returns the number of replicated instances added
    ///
    pub fn expand_replicated_svs(
        &mut self,
        chrom_copy_numbers: &ChromCopyNumbers,
        max_replication_count: usize,
    ) -> usize {
        assert_eq!(
            self.svs.len(),
            self.original_count,
            "SV replication can only be run once"
        );
        let mut replicas = Vec::new();
        for sv in self.svs.iter_mut() {
            if sv.sv_type == SvType::Ins {
                continue;
            }
            let chrom_copy_number = chrom_copy_numbers.get(&sv.start.chrom);
            sv.replication_count =
                get_replication_count(sv.ploidy, chrom_copy_number, max_replication_count);
            for _ in 0..sv.replication_count {
                let sv_index = self.original_count + replicas.len();
                let mut replica = sv.clone();
                replica.is_replicated = true;
                for be in std::iter::once(&mut replica.start).chain(replica.end.iter_mut()) {
                    be.sv_index = sv_index;
                    be.is_replicated = true;
                }
                replicas.push(replica);
            }
        }
        let replica_count = replicas.len();
        self.svs.extend(replicas);
        replica_count
    }

    /// Return all instance indexes for each original SV, including the original itself first
    pub fn instances_by_original(&self) -> Vec<Vec<usize>> {
        let mut instances = (0..self.original_count)
            .map(|x| vec![x])
            .collect::<Vec<_>>();
        for (sv_index, sv) in self.svs.iter().enumerate().skip(self.original_count) {
            instances[sv.orig_sv_index].push(sv_index);
        }
        instances
    }
}
