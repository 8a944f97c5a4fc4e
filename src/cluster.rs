use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::chain::Chain;
use crate::linked_pair::LinkedPair;
use crate::ref_genome::ChromosomeArm;
use crate::sv::SampleSvs;

/// Final taxonomy label assigned to a cluster
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolvedType {
    Del,
    Dup,
    Ins,

    /// Small cluster of simple SVs with mixed types
    SimpleGrp,

    /// Mobile element insertion
    Line,

    RecipInv,
    RecipTrans,

    /// Single BND without a partner
    UnbalTrans,
    Inv,
    Sgl,
    Inf,
    PairOther,

    /// Two SVs sharing an identical breakend
    DupBe,

    Complex,

    #[default]
    None,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SuperType {
    Simple,
    Insertion,
    BreakPair,
    Incomplete,
    Complex,
    Artifact,
}

impl ResolvedType {
    pub fn super_type(&self) -> SuperType {
        use ResolvedType::*;
        match self {
            Del | Dup | Ins | SimpleGrp => SuperType::Simple,
            Line => SuperType::Insertion,
            RecipInv | RecipTrans => SuperType::BreakPair,
            Inv | Sgl | Inf | UnbalTrans | PairOther => SuperType::Incomplete,
            Complex | None => SuperType::Complex,
            DupBe => SuperType::Artifact,
        }
    }
}

/// Reason a cluster was formed or extended
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, strum::Display)]
pub enum ClusterReason {
    Proximity,
    ArmMerge,
    Loh,
}

/// Arm group key, only valid arms are used
pub type ArmKey = (String, ChromosomeArm);

#[derive(Clone)]
pub struct Cluster {
    pub id: usize,

    /// All SV instances in the cluster, replicas included, in arena order
    pub sv_indexes: Vec<usize>,

    pub reasons: Vec<ClusterReason>,

    pub assembly_pairs: Vec<LinkedPair>,
    pub inferred_pairs: Vec<LinkedPair>,

    /// Pairs used in chains, set after chain resolution
    pub linked_pairs: Vec<LinkedPair>,

    pub chains: Vec<Chain>,

    /// SV instances which are not part of any chain
    pub unlinked_svs: Vec<usize>,

    /// Original SV indexes with at least one breakend on each chromosome arm
    pub arm_groups: BTreeMap<ArmKey, Vec<usize>>,

    /// Signed telomere/centromere balance summed over all SV instances
    pub consistency_count: i32,

    pub resolved_type: ResolvedType,
    pub is_long: bool,

    /// Effective span of a synthetic DEL/DUP, or of the single simple SV
    pub synthetic_length: i64,

    pub is_fully_chained: bool,

    /// Set when the chain search failed its breakend bookkeeping
    pub is_chain_invalid: bool,
}

impl Cluster {
    pub fn new(id: usize, sv_indexes: Vec<usize>, reason: ClusterReason, svs: &SampleSvs) -> Self {
        let mut cluster = Self {
            id,
            sv_indexes,
            reasons: vec![reason],
            assembly_pairs: Vec::new(),
            inferred_pairs: Vec::new(),
            linked_pairs: Vec::new(),
            chains: Vec::new(),
            unlinked_svs: Vec::new(),
            arm_groups: BTreeMap::new(),
            consistency_count: 0,
            resolved_type: ResolvedType::None,
            is_long: false,
            synthetic_length: 0,
            is_fully_chained: false,
            is_chain_invalid: false,
        };
        cluster.sv_indexes.sort();
        cluster.update_arm_data(svs);
        cluster
    }

    fn update_arm_data(&mut self, svs: &SampleSvs) {
        self.arm_groups.clear();
        self.consistency_count = 0;
        for &sv_index in self.sv_indexes.iter() {
            let sv = &svs.svs[sv_index];
            self.consistency_count += sv.consistency();
            if sv.is_replicated {
                continue;
            }
            for be in sv.breakends().filter(|x| x.arm.is_valid()) {
                let group = self
                    .arm_groups
                    .entry((be.chrom.clone(), be.arm))
                    .or_default();
                if group.last() != Some(&sv_index) {
                    group.push(sv_index);
                }
            }
        }
    }

    /// Original SVs in the cluster, in input order
    pub fn original_sv_indexes(&self, svs: &SampleSvs) -> Vec<usize> {
        self.sv_indexes
            .iter()
            .copied()
            .filter(|&x| svs.is_original(x))
            .collect()
    }

    pub fn original_sv_count(&self, svs: &SampleSvs) -> usize {
        self.sv_indexes
            .iter()
            .filter(|&&x| svs.is_original(x))
            .count()
    }

    /// True if the cluster absorbed another cluster in the merge pass
    pub fn is_merged(&self) -> bool {
        self.reasons
            .iter()
            .any(|x| matches!(x, ClusterReason::ArmMerge | ClusterReason::Loh))
    }

    pub fn is_consistent(&self) -> bool {
        self.consistency_count == 0
    }

    pub fn arm_count(&self) -> usize {
        self.arm_groups.len()
    }

    /// True for a cluster of two SVs which already balance each other
    pub fn is_simple_consistent_pair(&self, svs: &SampleSvs) -> bool {
        self.original_sv_count(svs) == 2 && self.is_consistent()
    }

    pub fn shared_arm_group_count(&self, other: &Cluster) -> usize {
        self.arm_groups
            .keys()
            .filter(|x| other.arm_groups.contains_key(*x))
            .count()
    }

    pub fn has_line_element(&self, svs: &SampleSvs) -> bool {
        self.sv_indexes.iter().any(|&x| svs.svs[x].is_line_element())
    }

    pub fn super_type(&self) -> SuperType {
        self.resolved_type.super_type()
    }

    /// Absorb the SVs of another cluster, all link, chain and classification state is reset
    pub fn merge(&mut self, other: Cluster, reason: ClusterReason, svs: &SampleSvs) {
        self.sv_indexes.extend(other.sv_indexes);
        self.sv_indexes.sort();
        for other_reason in other.reasons {
            if !self.reasons.contains(&other_reason) {
                self.reasons.push(other_reason);
            }
        }
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
        self.reset_analysis();
        self.update_arm_data(svs);
    }

    pub fn reset_analysis(&mut self) {
        self.assembly_pairs.clear();
        self.inferred_pairs.clear();
        self.linked_pairs.clear();
        self.chains.clear();
        self.unlinked_svs.clear();
        self.resolved_type = ResolvedType::None;
        self.is_long = false;
        self.synthetic_length = 0;
        self.is_fully_chained = false;
        self.is_chain_invalid = false;
    }

    /// Id of the chain holding the SV instance, if any
    pub fn chain_id_of_sv(&self, sv_index: usize) -> Option<usize> {
        self.chains
            .iter()
            .find(|x| x.has_sv(sv_index))
            .map(|x| x.id)
    }

    /// Count of unique SV instances held in chains
    pub fn chained_sv_count(&self) -> usize {
        self.chains
            .iter()
            .flat_map(|x| x.sv_indexes())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

impl fmt::Debug for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Cluster {} svs: {:?} reasons: {:?} type: {} consistency: {}",
            self.id, self.sv_indexes, self.reasons, self.resolved_type, self.consistency_count
        )?;
        for chain in self.chains.iter() {
            writeln!(f, "\t{chain:?}")?;
        }
        write!(f, "\tunlinked: {:?}", self.unlinked_svs)
    }
}
