//! virtmem - demand-paged virtual memory simulator.
//!
//! A fixed pool of physical frames backs a larger virtual address space.
//! Pages are loaded from and evicted to a file-backed disk on demand, and a
//! pluggable replacement policy picks the victim when the pool is full.
//!
//! # Example
//!
//! ```no_run
//! use virtmem::{PolicyKind, Simulation};
//!
//! let mut sim = Simulation::new("myvirtualdisk".as_ref(), 8, 4, PolicyKind::Fifo, Some(1))?;
//! sim.write_byte(0, 42)?;
//! assert_eq!(sim.read_byte(0)?, 42);
//! println!("{}", sim.stats());
//! # Ok::<(), virtmem::VirtmemError>(())
//! ```

pub mod error;
pub mod paging;
pub mod storage;
pub mod workload;

pub use error::{Result, VirtmemError};
pub use paging::{AccessKind, PagingStats, PolicyKind, Protection};
pub use storage::{Disk, PAGE_SIZE};
pub use workload::WorkloadKind;

use std::path::Path;

use paging::{Pager, PageTable, PolicyEngine};

/// A fault is expected to settle in one pass, two when a promotion is
/// followed by a write upgrade. More means the dispatcher and page table
/// disagree.
const MAX_FAULTS_PER_ACCESS: usize = 3;

/// One demand-paging machine: page table, frame pool, disk, and policy.
///
/// All accesses go through [`read_byte`](Self::read_byte) and
/// [`write_byte`](Self::write_byte), which fault pages in transparently.
/// Single-threaded by design; every fault completes before the access
/// resumes.
#[derive(Debug)]
pub struct Simulation {
    page_table: PageTable,
    pager: Pager,
}

impl Simulation {
    /// Creates a simulation with `npages` of virtual memory over `nframes`
    /// of physical memory, backed by a fresh disk image at `disk_path`.
    ///
    /// `seed` fixes the random policy's choices for reproducible runs.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for zero page or frame counts, or a
    /// disk error if the image cannot be created.
    pub fn new(
        disk_path: &Path,
        npages: usize,
        nframes: usize,
        policy: PolicyKind,
        seed: Option<u64>,
    ) -> Result<Self> {
        if npages == 0 {
            return Err(VirtmemError::Config("npages must be positive".into()));
        }
        if nframes == 0 {
            return Err(VirtmemError::Config("nframes must be positive".into()));
        }
        if policy == PolicyKind::TwoFifo && nframes < 2 {
            // FIRST_L would be zero: every load would demote itself and
            // no read access could ever settle.
            return Err(VirtmemError::Config(
                "the 2fifo policy needs at least two frames".into(),
            ));
        }

        let disk = Disk::create(disk_path, npages)?;
        let engine = PolicyEngine::new(policy, nframes, seed);

        Ok(Self {
            page_table: PageTable::new(npages),
            pager: Pager::new(engine, npages, nframes, disk),
        })
    }

    /// Returns the number of virtual pages.
    #[must_use]
    pub fn npages(&self) -> usize {
        self.page_table.npages()
    }

    /// Returns the number of physical frames.
    #[must_use]
    pub fn nframes(&self) -> usize {
        self.pager.frames().len()
    }

    /// Returns the size of the virtual address space in bytes.
    #[must_use]
    pub fn virtual_len(&self) -> usize {
        self.npages() * PAGE_SIZE
    }

    /// Reads one byte of virtual memory, faulting the page in if needed.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation for out-of-range addresses or a
    /// fault that does not settle; disk errors propagate from the pager.
    pub fn read_byte(&mut self, addr: usize) -> Result<u8> {
        let frame = self.ensure_access(addr, AccessKind::Read)?;
        Ok(self.pager.byte(frame, addr % PAGE_SIZE))
    }

    /// Writes one byte of virtual memory, faulting the page in if needed.
    ///
    /// # Errors
    ///
    /// Same conditions as [`read_byte`](Self::read_byte).
    pub fn write_byte(&mut self, addr: usize, value: u8) -> Result<()> {
        let frame = self.ensure_access(addr, AccessKind::Write)?;
        self.pager.set_byte(frame, addr % PAGE_SIZE, value);
        Ok(())
    }

    /// Faults until `addr`'s page permits `access`, returning its frame.
    fn ensure_access(&mut self, addr: usize, access: AccessKind) -> Result<usize> {
        if addr >= self.virtual_len() {
            return Err(VirtmemError::InvariantViolation(format!(
                "virtual address {addr} out of range ({} bytes mapped)",
                self.virtual_len()
            )));
        }
        let page = addr / PAGE_SIZE;

        for _ in 0..MAX_FAULTS_PER_ACCESS {
            let (frame, prot) = self.page_table.entry(page);
            if prot.permits(access) {
                return frame.ok_or_else(|| {
                    VirtmemError::InvariantViolation(format!(
                        "page {page} has protection {prot} but no frame"
                    ))
                });
            }
            self.pager.handle_fault(&mut self.page_table, page, access)?;
        }

        Err(VirtmemError::InvariantViolation(format!(
            "fault on page {page} did not settle after {MAX_FAULTS_PER_ACCESS} attempts"
        )))
    }

    /// The counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> PagingStats {
        self.pager.stats()
    }

    /// Flushes all dirty resident pages to the disk image.
    ///
    /// # Errors
    ///
    /// Returns a disk error if a write or sync fails.
    pub fn flush(&mut self) -> Result<()> {
        self.pager.flush_all()
    }

    /// Verifies the frame-table/page-table consistency invariants:
    /// occupancy matches mappings both ways, protections do not drift,
    /// and no two pages share a frame.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation describing the first inconsistency.
    pub fn check_consistency(&self) -> Result<()> {
        let frames = self.pager.frames();

        let mut seen_pages = vec![false; self.npages()];
        for frame in 0..frames.len() {
            if let Some(page) = frames.page_of(frame) {
                if seen_pages[page] {
                    return Err(VirtmemError::InvariantViolation(format!(
                        "page {page} resident in two frames"
                    )));
                }
                seen_pages[page] = true;

                let (mapped, prot) = self.page_table.entry(page);
                if mapped != Some(frame) {
                    return Err(VirtmemError::InvariantViolation(format!(
                        "frame {frame} holds page {page} but the page table maps it to {mapped:?}"
                    )));
                }
                if prot != frames.protection(frame) {
                    return Err(VirtmemError::InvariantViolation(format!(
                        "protection drift on page {page}: page table {prot}, frame table {}",
                        frames.protection(frame)
                    )));
                }
            }
        }

        for page in 0..self.npages() {
            let (mapped, _) = self.page_table.entry(page);
            if let Some(frame) = mapped {
                if frames.page_of(frame) != Some(page) {
                    return Err(VirtmemError::InvariantViolation(format!(
                        "page {page} maps to frame {frame} but the frame holds {:?}",
                        frames.page_of(frame)
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_sim(npages: usize, nframes: usize, policy: PolicyKind) -> (Simulation, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let sim = Simulation::new(
            &temp_dir.path().join("test.disk"),
            npages,
            nframes,
            policy,
            Some(0),
        )
        .unwrap();
        (sim, temp_dir)
    }

    #[test]
    fn test_zero_counts_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.disk");
        assert!(Simulation::new(&path, 0, 2, PolicyKind::Fifo, None).is_err());
        assert!(Simulation::new(&path, 2, 0, PolicyKind::Fifo, None).is_err());
    }

    #[test]
    fn test_single_frame_two_fifo_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.disk");
        let err = Simulation::new(&path, 4, 1, PolicyKind::TwoFifo, None).unwrap_err();
        assert!(matches!(err, VirtmemError::Config(_)));
    }

    #[test]
    fn test_write_then_read_back() {
        let (mut sim, _temp) = test_sim(4, 2, PolicyKind::Fifo);

        sim.write_byte(0, 42).unwrap();
        sim.write_byte(PAGE_SIZE + 7, 43).unwrap();

        assert_eq!(sim.read_byte(0).unwrap(), 42);
        assert_eq!(sim.read_byte(PAGE_SIZE + 7).unwrap(), 43);
    }

    #[test]
    fn test_content_survives_eviction() {
        let (mut sim, _temp) = test_sim(6, 2, PolicyKind::Fifo);

        // Dirty every page, forcing earlier pages through eviction.
        for page in 0..6 {
            sim.write_byte(page * PAGE_SIZE, page as u8 + 1).unwrap();
        }
        assert!(sim.stats().evictions >= 4);

        for page in 0..6 {
            assert_eq!(sim.read_byte(page * PAGE_SIZE).unwrap(), page as u8 + 1);
        }
        sim.check_consistency().unwrap();
    }

    #[test]
    fn test_read_then_write_counts_two_faults() {
        let (mut sim, _temp) = test_sim(3, 2, PolicyKind::Fifo);

        sim.read_byte(0).unwrap(); // first touch
        sim.write_byte(0, 1).unwrap(); // write upgrade

        let stats = sim.stats();
        assert_eq!(stats.page_faults, 2);
        assert_eq!(stats.disk_reads, 1);
    }

    #[test]
    fn test_repeated_access_faults_once() {
        let (mut sim, _temp) = test_sim(3, 2, PolicyKind::Fifo);

        for _ in 0..10 {
            sim.read_byte(5).unwrap();
        }
        assert_eq!(sim.stats().page_faults, 1);
    }

    #[test]
    fn test_out_of_range_address() {
        let (mut sim, _temp) = test_sim(2, 2, PolicyKind::Fifo);
        assert!(sim.read_byte(2 * PAGE_SIZE).is_err());
    }

    #[test]
    fn test_identity_mapping_consistency() {
        let (mut sim, _temp) = test_sim(4, 4, PolicyKind::Fifo);

        for page in 0..4 {
            sim.write_byte(page * PAGE_SIZE, 9).unwrap();
        }

        let stats = sim.stats();
        assert_eq!(stats.page_faults, 4);
        assert_eq!(stats.disk_reads, 0);
        assert_eq!(stats.evictions, 0);
        sim.check_consistency().unwrap();
    }

    #[test]
    fn test_flush_writes_dirty_pages() {
        let (mut sim, _temp) = test_sim(3, 2, PolicyKind::Fifo);

        sim.write_byte(0, 1).unwrap();
        sim.write_byte(PAGE_SIZE, 2).unwrap();
        let before = sim.stats().disk_writes;

        sim.flush().unwrap();
        assert_eq!(sim.stats().disk_writes, before + 2);
    }

    #[test]
    fn test_second_chance_promotion_through_access_layer() {
        // nframes = 3: FIRST_L = 2, SECOND_L = 1. Touch three pages, then
        // re-read the demoted one; it must come back without a disk read.
        let (mut sim, _temp) = test_sim(6, 3, PolicyKind::TwoFifo);

        for page in 0..3 {
            sim.read_byte(page * PAGE_SIZE).unwrap();
        }
        let reads_before = sim.stats().disk_reads;

        sim.read_byte(0).unwrap();
        assert_eq!(sim.stats().disk_reads, reads_before);
        sim.check_consistency().unwrap();
    }
}
