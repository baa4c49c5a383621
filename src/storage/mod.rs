//! Backing-store primitives.
//!
//! The simulator's "disk" is a flat file of page-sized blocks. This module
//! defines the page geometry and the [`Disk`] block device.

mod disk;

pub use disk::Disk;

/// Page size in bytes (4KB).
pub const PAGE_SIZE: usize = 4096;
