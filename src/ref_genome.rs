//! Chromosome length and centromere lookup used to assign breakends to chromosome arms
//!

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Chromosome arm of a breakend
///
/// 'Unknown' is used whenever the chromosome is missing from the reference coordinate table, or
/// the position falls outside of the chromosome. All arm-based logic treats it as "no valid arm".
///
#[derive(
    Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, strum::Display,
)]
pub enum ChromosomeArm {
    P,
    Q,
    Unknown,
}

impl ChromosomeArm {
    /// Arm side factor used in the telomere/centromere consistency sum
    pub fn side_factor(&self) -> i32 {
        match self {
            ChromosomeArm::P => 1,
            ChromosomeArm::Q => -1,
            ChromosomeArm::Unknown => 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        *self != ChromosomeArm::Unknown
    }
}

/// One row of the reference coordinate table
#[derive(Clone, Debug, Deserialize)]
pub struct ChromCoords {
    pub chrom: String,
    pub length: i64,
    pub centromere: i64,
}

/// Read-only chromosome coordinate lookup, built once per run
///
#[derive(Clone, Default)]
pub struct RefGenomeCoords {
    chroms: HashMap<String, ChromCoords>,
}

/// Return the alternate spelling of a chromosome name, with the 'chr' prefix added or removed
fn alternate_chrom_label(chrom: &str) -> String {
    match chrom.strip_prefix("chr") {
        Some(x) => x.to_string(),
        None => format!("chr{chrom}"),
    }
}

impl RefGenomeCoords {
    pub fn from_records(records: impl IntoIterator<Item = ChromCoords>) -> Self {
        let chroms = records
            .into_iter()
            .map(|x| (x.chrom.clone(), x))
            .collect::<HashMap<_, _>>();
        Self { chroms }
    }

    pub fn len(&self) -> usize {
        self.chroms.len()
    }

    /// Find coordinates for the chromosome, allowing for a mismatch in the 'chr' prefix convention
    /// between the SV input and the reference table
    ///
    fn get_chrom(&self, chrom: &str) -> Option<&ChromCoords> {
        self.chroms
            .get(chrom)
            .or_else(|| self.chroms.get(&alternate_chrom_label(chrom)))
    }

    pub fn arm(&self, chrom: &str, pos: i64) -> ChromosomeArm {
        match self.get_chrom(chrom) {
            Some(coords) => {
                if pos < 0 || pos > coords.length {
                    ChromosomeArm::Unknown
                } else if pos < coords.centromere {
                    ChromosomeArm::P
                } else {
                    ChromosomeArm::Q
                }
            }
            None => ChromosomeArm::Unknown,
        }
    }
}
