//! Paging statistics counters.

use std::fmt;

/// Monotone counters accumulated over one simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagingStats {
    /// Faults dispatched, counted once per fault regardless of outcome.
    pub page_faults: u64,
    /// Pages read from the backing store.
    pub disk_reads: u64,
    /// Dirty pages flushed to the backing store.
    pub disk_writes: u64,
    /// Frames vacated to make room for another page.
    pub evictions: u64,
}

impl fmt::Display for PagingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Page faults = {}", self.page_faults)?;
        writeln!(f, "Disk reads  = {}", self.disk_reads)?;
        writeln!(f, "Disk writes = {}", self.disk_writes)?;
        write!(f, "Evictions   = {}", self.evictions)
    }
}
