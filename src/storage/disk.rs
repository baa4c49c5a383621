//! File-backed block device with page-granular I/O.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, VirtmemError};
use crate::storage::PAGE_SIZE;

/// A virtual disk of fixed page capacity.
///
/// The disk handles:
/// - Reading and writing whole pages at page-aligned offsets
/// - Zero-filling reads of pages that were never written
/// - Syncing buffered writes to the underlying file
#[derive(Debug)]
pub struct Disk {
    /// Path to the disk image file.
    path: PathBuf,
    /// Open handle for the disk image.
    file: File,
    /// Number of pages this disk can hold.
    npages: usize,
}

impl Disk {
    /// Creates (or truncates) a disk image sized for `npages` pages.
    ///
    /// # Errors
    ///
    /// Returns an error if `npages` is zero or the file cannot be created.
    pub fn create(path: &Path, npages: usize) -> Result<Self> {
        if npages == 0 {
            return Err(VirtmemError::Config(
                "disk capacity must be at least one page".into(),
            ));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| VirtmemError::Disk(format!("failed to create disk image: {e}")))?;

        file.set_len((npages * PAGE_SIZE) as u64)
            .map_err(|e| VirtmemError::Disk(format!("failed to size disk image: {e}")))?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            npages,
        })
    }

    /// Returns the path to the disk image.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the disk capacity in pages.
    #[must_use]
    pub fn npages(&self) -> usize {
        self.npages
    }

    /// Reads one page into `buf`.
    ///
    /// A page that was never written reads back as zeroes.
    ///
    /// # Errors
    ///
    /// Returns an error if `page` is out of range, `buf` is not exactly one
    /// page long, or the read fails.
    pub fn read_page(&mut self, page: usize, buf: &mut [u8]) -> Result<()> {
        self.check_access(page, buf.len())?;

        self.file
            .seek(SeekFrom::Start((page * PAGE_SIZE) as u64))
            .map_err(|e| VirtmemError::Disk(format!("failed to seek to page {page}: {e}")))?;

        match self.file.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                // Past the written extent: behave as an all-zero block.
                buf.fill(0);
                Ok(())
            }
            Err(e) => Err(VirtmemError::Disk(format!(
                "failed to read page {page}: {e}"
            ))),
        }
    }

    /// Writes one page from `buf`.
    ///
    /// # Errors
    ///
    /// Returns an error if `page` is out of range, `buf` is not exactly one
    /// page long, or the write fails.
    pub fn write_page(&mut self, page: usize, buf: &[u8]) -> Result<()> {
        self.check_access(page, buf.len())?;

        self.file
            .seek(SeekFrom::Start((page * PAGE_SIZE) as u64))
            .map_err(|e| VirtmemError::Disk(format!("failed to seek to page {page}: {e}")))?;

        self.file
            .write_all(buf)
            .map_err(|e| VirtmemError::Disk(format!("failed to write page {page}: {e}")))
    }

    /// Flushes buffered writes to the disk image.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails.
    pub fn sync(&mut self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(|e| VirtmemError::Disk(format!("failed to sync disk image: {e}")))
    }

    fn check_access(&self, page: usize, buf_len: usize) -> Result<()> {
        if page >= self.npages {
            return Err(VirtmemError::Disk(format!(
                "page {page} out of range (disk holds {} pages)",
                self.npages
            )));
        }
        if buf_len != PAGE_SIZE {
            return Err(VirtmemError::Disk(format!(
                "buffer is {buf_len} bytes, expected {PAGE_SIZE}"
            )));
        }
        Ok(())
    }
}
