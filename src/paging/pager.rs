//! Page-fault dispatch and the eviction/load protocol.
//!
//! The [`Pager`] owns everything a fault needs: the frame table, the
//! physical frame pool, the backing disk, the statistics counters, and the
//! active replacement policy. A fault is handled to completion before the
//! faulting access resumes; nothing here suspends or retries.

use crate::error::{Result, VirtmemError};
use crate::paging::policy::{PolicyEngine, ReplacementPolicy};
use crate::paging::{AccessKind, FrameTable, PageTable, PagingStats, Protection};
use crate::storage::{Disk, PAGE_SIZE};

/// Frame pool, backing store, and statistics.
///
/// Policies receive this during victim selection so the shared eviction
/// side effects (flush-if-dirty, invalidate, vacate) happen in one place.
#[derive(Debug)]
pub struct PagerCore {
    frames: FrameTable,
    /// Physical memory: `nframes` page-sized slots.
    physmem: Vec<u8>,
    disk: Disk,
    stats: PagingStats,
}

impl PagerCore {
    fn new(nframes: usize, disk: Disk) -> Self {
        Self {
            frames: FrameTable::new(nframes),
            physmem: vec![0; nframes * PAGE_SIZE],
            disk,
            stats: PagingStats::default(),
        }
    }

    /// Read access to the frame table.
    #[must_use]
    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    /// The counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> PagingStats {
        self.stats
    }

    /// Evicts the page resident in `frame`: flush to disk if dirty, then
    /// invalidate its page-table entry and vacate the frame.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if `frame` is unoccupied, or a disk
    /// error if the flush fails.
    pub fn evict(&mut self, pt: &mut PageTable, frame: usize) -> Result<()> {
        let page = self.frames.page_of(frame).ok_or_else(|| {
            VirtmemError::InvariantViolation(format!("eviction of unoccupied frame {frame}"))
        })?;

        if self.frames.protection(frame).writable() {
            let slot = &self.physmem[frame * PAGE_SIZE..(frame + 1) * PAGE_SIZE];
            self.disk.write_page(page, slot)?;
            self.stats.disk_writes += 1;
        }

        pt.clear_entry(page);
        self.frames.mark_vacated(frame);
        self.stats.evictions += 1;
        Ok(())
    }

    /// Reads `page` from disk into `frame` and installs the mapping in
    /// both the page table and the frame table.
    ///
    /// # Errors
    ///
    /// Returns a disk error if the read fails.
    fn load(
        &mut self,
        pt: &mut PageTable,
        page: usize,
        frame: usize,
        protection: Protection,
    ) -> Result<()> {
        let slot = &mut self.physmem[frame * PAGE_SIZE..(frame + 1) * PAGE_SIZE];
        self.disk.read_page(page, slot)?;
        self.stats.disk_reads += 1;

        pt.set_entry(page, frame, protection);
        self.frames.mark_occupied(frame, page, protection);
        Ok(())
    }

    /// Updates the protection of the page resident in `frame`, in the page
    /// table and the frame-table mirror together.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if `frame` is unoccupied.
    pub fn set_protection(
        &mut self,
        pt: &mut PageTable,
        frame: usize,
        protection: Protection,
    ) -> Result<()> {
        let page = self.frames.page_of(frame).ok_or_else(|| {
            VirtmemError::InvariantViolation(format!(
                "protection change on unoccupied frame {frame}"
            ))
        })?;
        pt.set_entry(page, frame, protection);
        self.frames.set_protection(frame, protection);
        Ok(())
    }

    fn byte(&self, frame: usize, offset: usize) -> u8 {
        self.physmem[frame * PAGE_SIZE + offset]
    }

    fn set_byte(&mut self, frame: usize, offset: usize, value: u8) {
        self.physmem[frame * PAGE_SIZE + offset] = value;
    }

    /// Flushes every dirty resident page to disk without evicting.
    fn flush_all(&mut self) -> Result<()> {
        for frame in 0..self.frames.len() {
            if let Some(page) = self.frames.page_of(frame) {
                if self.frames.protection(frame).writable() {
                    let slot = &self.physmem[frame * PAGE_SIZE..(frame + 1) * PAGE_SIZE];
                    self.disk.write_page(page, slot)?;
                    self.stats.disk_writes += 1;
                }
            }
        }
        self.disk.sync()
    }
}

/// The page-fault dispatcher.
#[derive(Debug)]
pub struct Pager {
    core: PagerCore,
    policy: PolicyEngine,
    /// With as many frames as pages there is no contention: faults take
    /// the identity-mapping fast path and the policy is never consulted.
    identity: bool,
}

impl Pager {
    /// Creates a pager over `nframes` frames of physical memory backed by
    /// `disk`, running `policy`.
    #[must_use]
    pub fn new(policy: PolicyEngine, npages: usize, nframes: usize, disk: Disk) -> Self {
        Self {
            core: PagerCore::new(nframes, disk),
            policy,
            identity: npages == nframes,
        }
    }

    /// Handles one fault on `page` raised by an `access`.
    ///
    /// Classification follows the page-table entry's protection:
    /// - no readable bit, not resident: first touch — secure a frame (free
    ///   or evicted), read the page in, and map it readable (plus writable
    ///   when the faulting access is a write, so one fault suffices);
    /// - no readable bit, resident: second-chance promotion — restore the
    ///   stripped bit with no disk read;
    /// - readable only: write upgrade — set the writable bit, no I/O;
    /// - readable and writable: contract violation, surfaced as an error.
    ///
    /// `page_faults` increments exactly once, on entry.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation for the contract-violating cases
    /// above, or a disk error if a flush or load fails.
    pub fn handle_fault(
        &mut self,
        pt: &mut PageTable,
        page: usize,
        access: AccessKind,
    ) -> Result<()> {
        self.core.stats.page_faults += 1;

        if self.identity {
            pt.set_entry(page, page, Protection::READ_WRITE);
            self.core
                .frames
                .mark_occupied(page, page, Protection::READ_WRITE);
            return Ok(());
        }

        let (frame, prot) = pt.entry(page);

        if prot.readable() && prot.writable() {
            return Err(VirtmemError::InvariantViolation(format!(
                "fault on fully mapped page {page}"
            )));
        }

        if !prot.readable() {
            if let Some(frame) = frame {
                // Resident with the readable bit stripped: only the
                // second-chance policy produces this state.
                if self.policy.promote(&mut self.core, pt, frame)? {
                    return Ok(());
                }
                return Err(VirtmemError::InvariantViolation(format!(
                    "page {page} resident in frame {frame} with no readable bit \
                     under a non-promoting policy"
                )));
            }

            // First touch.
            let frame = self.policy.acquire_frame(&mut self.core, pt)?;
            let protection = match access {
                AccessKind::Read => Protection::READ,
                AccessKind::Write => Protection::READ_WRITE,
            };
            self.core.load(pt, page, frame, protection)?;
            self.policy.note_loaded(&mut self.core, pt, frame)?;
            return Ok(());
        }

        // Readable but faulted: write upgrade. Frame and residency are
        // untouched; 2FIFO deliberately does not re-promote here.
        let frame = frame.ok_or_else(|| {
            VirtmemError::InvariantViolation(format!("readable page {page} has no frame"))
        })?;
        self.core.set_protection(pt, frame, prot.with_write())
    }

    /// The counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> PagingStats {
        self.core.stats()
    }

    /// Read access to the frame table.
    #[must_use]
    pub fn frames(&self) -> &FrameTable {
        self.core.frames()
    }

    pub(crate) fn byte(&self, frame: usize, offset: usize) -> u8 {
        self.core.byte(frame, offset)
    }

    pub(crate) fn set_byte(&mut self, frame: usize, offset: usize, value: u8) {
        self.core.set_byte(frame, offset, value);
    }

    pub(crate) fn flush_all(&mut self) -> Result<()> {
        self.core.flush_all()
    }

    #[cfg(test)]
    pub(crate) fn core_mut(&mut self) -> &mut PagerCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::policy::PolicyKind;
    use tempfile::TempDir;

    fn test_pager(
        kind: PolicyKind,
        npages: usize,
        nframes: usize,
    ) -> (Pager, PageTable, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let disk = Disk::create(&temp_dir.path().join("test.disk"), npages).unwrap();
        let engine = PolicyEngine::new(kind, nframes, Some(0));
        let pager = Pager::new(engine, npages, nframes, disk);
        (pager, PageTable::new(npages), temp_dir)
    }

    #[test]
    fn test_golden_fifo_sequence() {
        // Three write touches against two frames: the third load evicts
        // page 0, whose dirty content costs the run's only flush.
        let (mut pager, mut pt, _temp) = test_pager(PolicyKind::Fifo, 3, 2);

        for page in 0..3 {
            pager.handle_fault(&mut pt, page, AccessKind::Write).unwrap();
        }

        let stats = pager.stats();
        assert_eq!(stats.page_faults, 3);
        assert_eq!(stats.disk_reads, 3);
        assert_eq!(stats.disk_writes, 1);
        assert_eq!(stats.evictions, 1);
    }

    #[test]
    fn test_write_fault_maps_read_write_in_one_fault() {
        let (mut pager, mut pt, _temp) = test_pager(PolicyKind::Fifo, 3, 2);

        pager.handle_fault(&mut pt, 0, AccessKind::Write).unwrap();

        assert_eq!(pt.entry(0).1, Protection::READ_WRITE);
        assert_eq!(pager.stats().page_faults, 1);
        assert_eq!(pager.stats().disk_reads, 1);
    }

    #[test]
    fn test_write_upgrade_costs_no_io() {
        let (mut pager, mut pt, _temp) = test_pager(PolicyKind::Fifo, 3, 2);

        pager.handle_fault(&mut pt, 0, AccessKind::Read).unwrap();
        let before = pager.stats();

        pager.handle_fault(&mut pt, 0, AccessKind::Write).unwrap();
        let after = pager.stats();

        assert_eq!(pt.entry(0), (Some(0), Protection::READ_WRITE));
        assert_eq!(after.page_faults, before.page_faults + 1);
        assert_eq!(after.disk_reads, before.disk_reads);
        assert_eq!(after.disk_writes, before.disk_writes);
        assert_eq!(after.evictions, before.evictions);
    }

    #[test]
    fn test_fault_on_fully_mapped_page_is_fatal() {
        let (mut pager, mut pt, _temp) = test_pager(PolicyKind::Fifo, 3, 2);

        pager.handle_fault(&mut pt, 0, AccessKind::Write).unwrap();
        let err = pager
            .handle_fault(&mut pt, 0, AccessKind::Write)
            .unwrap_err();

        assert!(matches!(err, VirtmemError::InvariantViolation(_)));
    }

    #[test]
    fn test_resident_unreadable_page_fatal_under_fifo() {
        let (mut pager, mut pt, _temp) = test_pager(PolicyKind::Fifo, 3, 2);

        pager.handle_fault(&mut pt, 0, AccessKind::Read).unwrap();

        // Force the state only 2FIFO legitimately creates.
        pager
            .core_mut()
            .set_protection(&mut pt, 0, Protection::NONE)
            .unwrap();

        let err = pager.handle_fault(&mut pt, 0, AccessKind::Read).unwrap_err();
        assert!(matches!(err, VirtmemError::InvariantViolation(_)));
    }

    #[test]
    fn test_identity_fast_path_skips_policy_and_disk() {
        let (mut pager, mut pt, _temp) = test_pager(PolicyKind::Fifo, 4, 4);

        for page in 0..4 {
            pager.handle_fault(&mut pt, page, AccessKind::Read).unwrap();
            assert_eq!(pt.entry(page), (Some(page), Protection::READ_WRITE));
        }

        let stats = pager.stats();
        assert_eq!(stats.page_faults, 4);
        assert_eq!(stats.disk_reads, 0);
        assert_eq!(stats.disk_writes, 0);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn test_eviction_flush_preserves_content() {
        let (mut pager, mut pt, _temp) = test_pager(PolicyKind::Fifo, 3, 1);

        // Dirty page 0, then force it out and bring it back.
        pager.handle_fault(&mut pt, 0, AccessKind::Write).unwrap();
        let frame = pt.entry(0).0.unwrap();
        pager.set_byte(frame, 17, 0xAB);

        pager.handle_fault(&mut pt, 1, AccessKind::Read).unwrap();
        assert_eq!(pt.entry(0).0, None);

        pager.handle_fault(&mut pt, 0, AccessKind::Read).unwrap();
        let frame = pt.entry(0).0.unwrap();
        assert_eq!(pager.byte(frame, 17), 0xAB);
    }

    #[test]
    fn test_frame_table_mirrors_page_table() {
        let (mut pager, mut pt, _temp) = test_pager(PolicyKind::Fifo, 4, 2);

        for (page, access) in [(0, AccessKind::Write), (1, AccessKind::Read), (2, AccessKind::Read)]
        {
            pager.handle_fault(&mut pt, page, access).unwrap();
        }

        for frame in 0..2 {
            let page = pager.frames().page_of(frame).unwrap();
            let (mapped, prot) = pt.entry(page);
            assert_eq!(mapped, Some(frame));
            assert_eq!(prot, pager.frames().protection(frame));
        }
    }
}
