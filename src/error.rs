//! Error types for the virtual memory simulator.

use thiserror::Error;

/// Result type alias using [`VirtmemError`].
pub type Result<T> = std::result::Result<T, VirtmemError>;

/// Error types for simulator operations.
///
/// Frame-pool exhaustion is deliberately absent: a full frame pool is the
/// normal trigger for eviction, not an error.
#[derive(Debug, Error)]
pub enum VirtmemError {
    /// Invalid configuration (unknown policy, zero page or frame counts).
    /// Raised before any core component is constructed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backing-store I/O failure.
    #[error("Disk error: {0}")]
    Disk(String),

    /// Paging bookkeeping bug: the frame table, a policy's ordering
    /// structure, and the page table disagree. Never retried.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}
