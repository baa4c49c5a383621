//! Strict first-in, first-out eviction.

use crate::error::{Result, VirtmemError};
use crate::paging::frame_list::FrameList;
use crate::paging::pager::PagerCore;
use crate::paging::policy::ReplacementPolicy;
use crate::paging::PageTable;

/// Evicts frames in the order their pages were first loaded.
///
/// Write upgrades do not touch the queue; insertion order is eviction
/// order.
#[derive(Debug)]
pub struct FifoPolicy {
    queue: FrameList,
}

impl FifoPolicy {
    /// Creates the policy for a pool of `nframes` frames.
    #[must_use]
    pub fn new(nframes: usize) -> Self {
        Self {
            queue: FrameList::new(nframes),
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn acquire_frame(&mut self, core: &mut PagerCore, pt: &mut PageTable) -> Result<usize> {
        if let Some(frame) = core.frames().find_free_frame() {
            return Ok(frame);
        }

        let victim = self.queue.pop_front().ok_or_else(|| {
            VirtmemError::InvariantViolation(
                "fifo queue empty while every frame is occupied".into(),
            )
        })?;
        core.evict(pt, victim)?;
        Ok(victim)
    }

    fn note_loaded(
        &mut self,
        _core: &mut PagerCore,
        _pt: &mut PageTable,
        frame: usize,
    ) -> Result<()> {
        // Idempotent: a stale entry is never doubled.
        self.queue.push_back(frame);
        Ok(())
    }
}
