use serde::{Deserialize, Serialize};

use crate::cli::AnalyzeSettings;

/// Order used to rank linked pair candidates of equal length during chain assembly
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChainTieBreak {
    /// Earlier candidates from the link finder win
    #[default]
    Arrival,

    /// Candidates with the lowest first breakend chromosome and position win
    Position,
}

/// All parameters influencing cluster link, chain and classification steps
#[derive(Clone, Debug)]
pub struct AnalysisSettings {
    pub proximity_distance: i64,

    /// Facing breakends closer than this are treated as a deletion bridge
    pub min_ti_length: i64,

    /// Templated insertions longer than this are 'long'
    pub short_ti_length: i64,

    /// Deletion bridges up to this length are 'short'
    pub max_db_length: i64,

    /// Simple and synthetic DEL/DUP clusters at least this long are marked as long
    pub del_dup_long_length: i64,

    pub small_cluster_size: usize,

    /// If true, templated insertions can cross the centromere
    pub allow_centromere_span: bool,

    pub chain_tie_break: ChainTieBreak,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            proximity_distance: 100_000,
            min_ti_length: 30,
            short_ti_length: 1000,
            max_db_length: 1000,
            del_dup_long_length: 100_000,
            small_cluster_size: 2,
            allow_centromere_span: true,
            chain_tie_break: ChainTieBreak::Arrival,
        }
    }
}

impl AnalysisSettings {
    pub fn new(settings: &AnalyzeSettings) -> Self {
        Self {
            proximity_distance: settings.proximity_distance,
            min_ti_length: settings.min_ti_length,
            short_ti_length: settings.short_ti_length,
            max_db_length: settings.max_db_length,
            del_dup_long_length: settings.del_dup_long_length,
            small_cluster_size: settings.small_cluster_size,
            allow_centromere_span: !settings.no_centromere_span,
            chain_tie_break: settings.chain_tie_break,
        }
    }
}
