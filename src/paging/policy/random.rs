//! Uniform-random eviction.

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::Result;
use crate::paging::pager::PagerCore;
use crate::paging::policy::ReplacementPolicy;
use crate::paging::PageTable;

/// Picks victims uniformly at random.
///
/// Keeps no ordering structure: when the pool is full, any occupied frame
/// is fair game, including one loaded by the previous fault.
#[derive(Debug)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    /// Creates the policy with the given random source.
    #[must_use]
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn acquire_frame(&mut self, core: &mut PagerCore, pt: &mut PageTable) -> Result<usize> {
        if let Some(frame) = core.frames().find_free_frame() {
            return Ok(frame);
        }

        let victim = self.rng.gen_range(0..core.frames().len());
        core.evict(pt, victim)?;
        Ok(victim)
    }

    fn note_loaded(
        &mut self,
        _core: &mut PagerCore,
        _pt: &mut PageTable,
        _frame: usize,
    ) -> Result<()> {
        Ok(())
    }
}
