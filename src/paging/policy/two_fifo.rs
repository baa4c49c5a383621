//! Two-tier first-chance/second-chance eviction (2FIFO).
//!
//! Frames enter a probationary first-chance queue on load. Overflowing the
//! first queue demotes its oldest frame into the second-chance queue and
//! strips the page's readable bit, so the next read of that page faults
//! instead of silently aging. A fault on a demoted-but-resident page is a
//! promotion: the frame moves back to the first queue with no disk read.
//! Overflowing the second queue evicts for real.

use crate::error::{Result, VirtmemError};
use crate::paging::frame_list::FrameList;
use crate::paging::pager::PagerCore;
use crate::paging::policy::ReplacementPolicy;
use crate::paging::PageTable;

/// Two-tier LRU approximation.
#[derive(Debug)]
pub struct TwoFifoPolicy {
    first: FrameList,
    second: FrameList,
    first_cap: usize,
    second_cap: usize,
}

impl TwoFifoPolicy {
    /// Creates the policy for a pool of `nframes` frames.
    ///
    /// Small pools keep a single second-chance slot; larger pools split
    /// roughly 3:1 between the tiers.
    #[must_use]
    pub fn new(nframes: usize) -> Self {
        let (first_cap, second_cap) = Self::capacities(nframes);
        Self {
            first: FrameList::new(nframes),
            second: FrameList::new(nframes),
            first_cap,
            second_cap,
        }
    }

    /// Tier capacities for a pool of `nframes` frames.
    #[must_use]
    pub fn capacities(nframes: usize) -> (usize, usize) {
        if nframes < 5 {
            (nframes.saturating_sub(1), 1)
        } else {
            (nframes - nframes / 4, nframes / 4)
        }
    }

    /// Returns whether `frame` currently sits in the second-chance tier.
    #[must_use]
    pub fn in_second_chance(&self, frame: usize) -> bool {
        self.second.contains(frame)
    }

    /// Appends `frame` to the first-chance tier and runs the overflow
    /// cascade: first overflow demotes (strips the readable bit), second
    /// overflow evicts.
    fn insert_first(
        &mut self,
        core: &mut PagerCore,
        pt: &mut PageTable,
        frame: usize,
    ) -> Result<()> {
        self.first.push_back(frame);
        if self.first.len() <= self.first_cap {
            return Ok(());
        }

        let demoted = self.first.pop_front().ok_or_else(|| {
            VirtmemError::InvariantViolation("first-chance queue overflowed while empty".into())
        })?;

        // The second-chance signal: the page stays resident but its next
        // read must fault back through the dispatcher.
        let stripped = core.frames().protection(demoted).without_read();
        core.set_protection(pt, demoted, stripped)?;
        self.second.push_back(demoted);

        if self.second.len() > self.second_cap {
            let victim = self.second.pop_front().ok_or_else(|| {
                VirtmemError::InvariantViolation(
                    "second-chance queue overflowed while empty".into(),
                )
            })?;
            core.evict(pt, victim)?;
        }

        Ok(())
    }
}

impl ReplacementPolicy for TwoFifoPolicy {
    fn acquire_frame(&mut self, core: &mut PagerCore, pt: &mut PageTable) -> Result<usize> {
        if let Some(frame) = core.frames().find_free_frame() {
            return Ok(frame);
        }

        // Second-chance frames have already used up their probation.
        let victim = match self.second.pop_front() {
            Some(frame) => frame,
            None => self.first.pop_front().ok_or_else(|| {
                VirtmemError::InvariantViolation(
                    "both 2fifo queues empty while every frame is occupied".into(),
                )
            })?,
        };
        core.evict(pt, victim)?;
        Ok(victim)
    }

    fn note_loaded(
        &mut self,
        core: &mut PagerCore,
        pt: &mut PageTable,
        frame: usize,
    ) -> Result<()> {
        self.insert_first(core, pt, frame)
    }

    fn promote(&mut self, core: &mut PagerCore, pt: &mut PageTable, frame: usize) -> Result<bool> {
        if !self.second.unlink(frame) {
            return Ok(false);
        }

        // Content in physical memory is still valid; only the readable bit
        // was stripped at demotion. Restore it and re-probate the frame.
        let restored = core.frames().protection(frame).with_read();
        core.set_protection(pt, frame, restored)?;
        self.insert_first(core, pt, frame)?;
        Ok(true)
    }
}
