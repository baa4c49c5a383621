//! The hardware-visible page table.
//!
//! One entry per virtual page, recording the backing frame (if resident)
//! and the page's protection bits. The table is a pure mapping: it owns no
//! page content and performs no I/O.

use crate::paging::Protection;

/// A single page-table entry.
#[derive(Debug, Clone, Copy, Default)]
struct PageEntry {
    frame: Option<usize>,
    protection: Protection,
}

/// Maps virtual pages to physical frames.
#[derive(Debug)]
pub struct PageTable {
    entries: Vec<PageEntry>,
}

impl PageTable {
    /// Creates a page table for `npages` pages, all unmapped.
    #[must_use]
    pub fn new(npages: usize) -> Self {
        Self {
            entries: vec![PageEntry::default(); npages],
        }
    }

    /// Returns the number of virtual pages.
    #[must_use]
    pub fn npages(&self) -> usize {
        self.entries.len()
    }

    /// Returns the frame and protection recorded for `page`.
    #[must_use]
    pub fn entry(&self, page: usize) -> (Option<usize>, Protection) {
        let e = &self.entries[page];
        (e.frame, e.protection)
    }

    /// Installs a mapping for `page`.
    pub fn set_entry(&mut self, page: usize, frame: usize, protection: Protection) {
        self.entries[page] = PageEntry {
            frame: Some(frame),
            protection,
        };
    }

    /// Invalidates the mapping for `page`.
    pub fn clear_entry(&mut self, page: usize) {
        self.entries[page] = PageEntry::default();
    }
}
