use std::collections::HashMap;

use simple_error::{SimpleResult, bail};

use crate::sv::{BreakendRef, SampleSvs};

/// Breakend instances not yet consumed by a linked pair, keyed on the original breakend
///
/// Instances of each original breakend are kept in arena order, so the original instance is used
/// before its replicas.
///
pub struct BreakendPool {
    instances: HashMap<BreakendRef, Vec<BreakendRef>>,
}

impl BreakendPool {
    pub fn new(svs: &SampleSvs, sv_indexes: &[usize]) -> Self {
        let mut instances = HashMap::<BreakendRef, Vec<BreakendRef>>::new();
        for &sv_index in sv_indexes.iter() {
            for be in svs.svs[sv_index].breakends() {
                instances.entry(be.orig_handle()).or_default().push(be.handle());
            }
        }
        for x in instances.values_mut() {
            x.sort();
        }
        Self { instances }
    }

    pub fn remaining(&self, orig_be: BreakendRef) -> usize {
        self.instances.get(&orig_be).map_or(0, |x| x.len())
    }

    pub fn instances(&self, orig_be: BreakendRef) -> &[BreakendRef] {
        self.instances.get(&orig_be).map_or(&[], |x| x.as_slice())
    }

    /// Consume one specific breakend instance
    pub fn take(&mut self, orig_be: BreakendRef, be: BreakendRef) -> SimpleResult<()> {
        let Some(instances) = self.instances.get_mut(&orig_be) else {
            bail!("Breakend {orig_be:?} is not in the unlinked breakend pool");
        };
        let Some(pos) = instances.iter().position(|&x| x == be) else {
            bail!("Breakend instance {be:?} of {orig_be:?} is not in the unlinked breakend pool");
        };
        instances.remove(pos);
        Ok(())
    }
}
