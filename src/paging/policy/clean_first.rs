//! Clean-page-preferring FIFO eviction.
//!
//! Insertion behaves exactly like FIFO. Eviction scans a bounded window
//! from the oldest end of the queue looking for a clean frame (no writable
//! bit, so no flush needed) and splices it out wherever it sits. Only when
//! every frame in the window is dirty does it fall back to plain FIFO head
//! removal.

use crate::error::{Result, VirtmemError};
use crate::paging::frame_list::FrameList;
use crate::paging::pager::PagerCore;
use crate::paging::policy::ReplacementPolicy;
use crate::paging::PageTable;

/// FIFO with a clean-victim look-ahead window.
#[derive(Debug)]
pub struct CleanFirstPolicy {
    queue: FrameList,
    /// Maximum frames inspected per eviction before the FIFO fallback.
    window: usize,
}

impl CleanFirstPolicy {
    /// Creates the policy for a pool of `nframes` frames.
    ///
    /// The look-ahead window covers five sixths of the pool, at least one
    /// frame.
    #[must_use]
    pub fn new(nframes: usize) -> Self {
        Self {
            queue: FrameList::new(nframes),
            window: Self::window(nframes),
        }
    }

    /// Look-ahead window for a pool of `nframes` frames.
    #[must_use]
    pub fn window(nframes: usize) -> usize {
        (nframes * 5 / 6).max(1)
    }

    /// Finds the oldest clean frame within the window, if any.
    fn find_clean_victim(&self, core: &PagerCore) -> Option<usize> {
        self.queue
            .iter()
            .take(self.window)
            .find(|&frame| !core.frames().protection(frame).writable())
    }
}

impl ReplacementPolicy for CleanFirstPolicy {
    fn acquire_frame(&mut self, core: &mut PagerCore, pt: &mut PageTable) -> Result<usize> {
        if let Some(frame) = core.frames().find_free_frame() {
            return Ok(frame);
        }

        let victim = match self.find_clean_victim(core) {
            Some(frame) => {
                // May sit anywhere in the window, not just at the head.
                self.queue.unlink(frame);
                frame
            }
            None => self.queue.pop_front().ok_or_else(|| {
                VirtmemError::InvariantViolation(
                    "clean-first queue empty while every frame is occupied".into(),
                )
            })?,
        };

        core.evict(pt, victim)?;
        Ok(victim)
    }

    fn note_loaded(
        &mut self,
        _core: &mut PagerCore,
        _pt: &mut PageTable,
        frame: usize,
    ) -> Result<()> {
        self.queue.push_back(frame);
        Ok(())
    }
}
