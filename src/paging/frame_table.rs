//! The frame table: authoritative record of physical frame occupancy.
//!
//! One entry per physical frame, allocated once at simulation start and
//! never resized. Protection recorded here mirrors the page table entry of
//! the resident page; the two must never drift.

use crate::paging::Protection;

/// Metadata for a single physical frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frame {
    /// The virtual page currently loaded, if any.
    page: Option<usize>,
    /// Mirror of the resident page's protection bits.
    protection: Protection,
}

impl Frame {
    /// Returns whether a page is loaded in this frame.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.page.is_some()
    }
}

/// Fixed-size table of physical frames.
#[derive(Debug)]
pub struct FrameTable {
    frames: Vec<Frame>,
}

impl FrameTable {
    /// Creates a table of `nframes` vacant frames.
    #[must_use]
    pub fn new(nframes: usize) -> Self {
        Self {
            frames: vec![Frame::default(); nframes],
        }
    }

    /// Returns the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns whether the table has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Scans left to right for an unoccupied frame.
    ///
    /// The scan order is deterministic so fault traces reproduce exactly.
    /// Returns `None` when every frame is occupied, which callers treat as
    /// "must evict".
    #[must_use]
    pub fn find_free_frame(&self) -> Option<usize> {
        self.frames.iter().position(|f| !f.is_occupied())
    }

    /// Records `page` as resident in `frame`. Pure bookkeeping, no I/O.
    pub fn mark_occupied(&mut self, frame: usize, page: usize, protection: Protection) {
        self.frames[frame] = Frame {
            page: Some(page),
            protection,
        };
    }

    /// Logically vacates `frame`. Pure bookkeeping, no I/O.
    pub fn mark_vacated(&mut self, frame: usize) {
        self.frames[frame] = Frame::default();
    }

    /// Returns the page resident in `frame`, if any.
    #[must_use]
    pub fn page_of(&self, frame: usize) -> Option<usize> {
        self.frames[frame].page
    }

    /// Returns the protection mirror for `frame`.
    #[must_use]
    pub fn protection(&self, frame: usize) -> Protection {
        self.frames[frame].protection
    }

    /// Updates the protection mirror for `frame`.
    pub fn set_protection(&mut self, frame: usize, protection: Protection) {
        self.frames[frame].protection = protection;
    }

    /// Returns the frame holding `page`, if the page is resident.
    #[must_use]
    pub fn frame_of(&self, page: usize) -> Option<usize> {
        self.frames.iter().position(|f| f.page == Some(page))
    }

    /// Returns whether `frame` holds a page.
    #[must_use]
    pub fn is_occupied(&self, frame: usize) -> bool {
        self.frames[frame].is_occupied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_all_free() {
        let ft = FrameTable::new(3);
        assert_eq!(ft.len(), 3);
        assert_eq!(ft.find_free_frame(), Some(0));
        assert!(!ft.is_occupied(2));
    }

    #[test]
    fn test_find_free_frame_scans_left_to_right() {
        let mut ft = FrameTable::new(3);
        ft.mark_occupied(0, 10, Protection::READ);
        assert_eq!(ft.find_free_frame(), Some(1));

        ft.mark_occupied(1, 11, Protection::READ);
        ft.mark_occupied(2, 12, Protection::READ);
        assert_eq!(ft.find_free_frame(), None);

        // Vacating the middle frame makes it the next candidate.
        ft.mark_vacated(1);
        assert_eq!(ft.find_free_frame(), Some(1));
    }

    #[test]
    fn test_occupy_and_vacate() {
        let mut ft = FrameTable::new(2);

        ft.mark_occupied(1, 7, Protection::READ_WRITE);
        assert!(ft.is_occupied(1));
        assert_eq!(ft.page_of(1), Some(7));
        assert_eq!(ft.protection(1), Protection::READ_WRITE);
        assert_eq!(ft.frame_of(7), Some(1));

        ft.mark_vacated(1);
        assert!(!ft.is_occupied(1));
        assert_eq!(ft.page_of(1), None);
        assert!(ft.protection(1).is_none());
        assert_eq!(ft.frame_of(7), None);
    }

    #[test]
    fn test_set_protection() {
        let mut ft = FrameTable::new(1);
        ft.mark_occupied(0, 3, Protection::READ);

        ft.set_protection(0, Protection::READ_WRITE);
        assert_eq!(ft.protection(0), Protection::READ_WRITE);

        ft.set_protection(0, Protection::READ_WRITE.without_read());
        assert!(!ft.protection(0).readable());
        assert!(ft.protection(0).writable());
    }
}
