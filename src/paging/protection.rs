//! Page protection bits and access kinds.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Protection bits for a virtual page.
///
/// Empty protection means the page is unmapped (or, under the second-chance
/// policy, resident but demoted). The bits encode fault history, not genuine
/// access control: no page is read-only by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Protection(u8);

impl Protection {
    /// No access: the page has not been faulted in (or was demoted).
    pub const NONE: Self = Self(0);
    /// Read access.
    pub const READ: Self = Self(0b01);
    /// Write access.
    pub const WRITE: Self = Self(0b10);
    /// Read and write access.
    pub const READ_WRITE: Self = Self(0b11);

    /// Returns whether the readable bit is set.
    #[must_use]
    pub const fn readable(self) -> bool {
        self.0 & Self::READ.0 != 0
    }

    /// Returns whether the writable bit is set.
    #[must_use]
    pub const fn writable(self) -> bool {
        self.0 & Self::WRITE.0 != 0
    }

    /// Returns whether no bits are set.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Returns these bits with the readable bit added.
    #[must_use]
    pub const fn with_read(self) -> Self {
        Self(self.0 | Self::READ.0)
    }

    /// Returns these bits with the readable bit removed.
    #[must_use]
    pub const fn without_read(self) -> Self {
        Self(self.0 & !Self::READ.0)
    }

    /// Returns these bits with the writable bit added.
    #[must_use]
    pub const fn with_write(self) -> Self {
        Self(self.0 | Self::WRITE.0)
    }

    /// Returns whether the given access is permitted.
    #[must_use]
    pub const fn permits(self, access: AccessKind) -> bool {
        match access {
            AccessKind::Read => self.readable(),
            AccessKind::Write => self.writable(),
        }
    }
}

impl BitOr for Protection {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Protection {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = if self.readable() { 'r' } else { '-' };
        let w = if self.writable() { 'w' } else { '-' };
        write!(f, "{r}{w}")
    }
}

/// The kind of memory access that raised a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// A load from virtual memory.
    Read,
    /// A store to virtual memory.
    Write,
}
