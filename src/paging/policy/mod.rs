//! Page replacement policies.
//!
//! Each policy owns only its ordering structure(s) over frame indices; page
//! content and protection stay canonical in the frame table and page table.
//! The active policy is chosen once at startup and fixed for the run.

mod clean_first;
mod fifo;
mod random;
mod two_fifo;

pub use clean_first::CleanFirstPolicy;
pub use fifo::FifoPolicy;
pub use random::RandomPolicy;
pub use two_fifo::TwoFifoPolicy;

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Result, VirtmemError};
use crate::paging::pager::PagerCore;
use crate::paging::PageTable;

/// Victim-selection contract shared by all replacement policies.
pub trait ReplacementPolicy {
    /// Secures a frame for an incoming page, preferring a free frame and
    /// evicting otherwise. The returned frame is vacated and untracked; it
    /// joins the policy's ordering structure on [`note_loaded`].
    ///
    /// [`note_loaded`]: ReplacementPolicy::note_loaded
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if no frame can be produced.
    fn acquire_frame(&mut self, core: &mut PagerCore, pt: &mut PageTable) -> Result<usize>;

    /// Notifies the policy that a first-touch load installed a page into
    /// `frame`. The second-chance policy's overflow cascade may demote or
    /// evict other frames here.
    ///
    /// # Errors
    ///
    /// Returns an error if the cascade's own eviction fails.
    fn note_loaded(&mut self, core: &mut PagerCore, pt: &mut PageTable, frame: usize)
        -> Result<()>;

    /// Offers the policy a fault on a page still resident in `frame` with
    /// its readable bit stripped. Returns `true` if the policy handled it
    /// as an access promotion (no disk read); `false` if it has no such
    /// notion, in which case the dispatcher treats the fault as a
    /// bookkeeping bug.
    ///
    /// # Errors
    ///
    /// Returns an error if the promotion cascade fails.
    fn promote(&mut self, _core: &mut PagerCore, _pt: &mut PageTable, _frame: usize) -> Result<bool> {
        Ok(false)
    }
}

/// Which replacement policy to run. Parsed once from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Uniform-random eviction.
    Random,
    /// Strict first-in, first-out eviction.
    Fifo,
    /// Two-tier first-chance/second-chance LRU approximation.
    TwoFifo,
    /// FIFO insertion with clean-page-preferring eviction.
    Custom,
}

impl PolicyKind {
    /// All selectable policies, in CLI help order.
    pub const ALL: [Self; 4] = [Self::Random, Self::Fifo, Self::TwoFifo, Self::Custom];

    /// The CLI spelling of this policy.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Random => "rand",
            Self::Fifo => "fifo",
            Self::TwoFifo => "2fifo",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = VirtmemError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rand" => Ok(Self::Random),
            "fifo" => Ok(Self::Fifo),
            "2fifo" => Ok(Self::TwoFifo),
            "custom" => Ok(Self::Custom),
            other => Err(VirtmemError::Config(format!(
                "unknown policy '{other}' (expected rand|fifo|2fifo|custom)"
            ))),
        }
    }
}

/// The closed set of policy implementations.
#[derive(Debug)]
pub enum PolicyEngine {
    Random(RandomPolicy),
    Fifo(FifoPolicy),
    TwoFifo(TwoFifoPolicy),
    Custom(CleanFirstPolicy),
}

impl PolicyEngine {
    /// Builds the selected policy for a pool of `nframes` frames.
    ///
    /// `seed` fixes the random policy's choices; without it the policy
    /// seeds from entropy.
    #[must_use]
    pub fn new(kind: PolicyKind, nframes: usize, seed: Option<u64>) -> Self {
        match kind {
            PolicyKind::Random => {
                let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
                Self::Random(RandomPolicy::new(rng))
            }
            PolicyKind::Fifo => Self::Fifo(FifoPolicy::new(nframes)),
            PolicyKind::TwoFifo => Self::TwoFifo(TwoFifoPolicy::new(nframes)),
            PolicyKind::Custom => Self::Custom(CleanFirstPolicy::new(nframes)),
        }
    }
}

impl ReplacementPolicy for PolicyEngine {
    fn acquire_frame(&mut self, core: &mut PagerCore, pt: &mut PageTable) -> Result<usize> {
        match self {
            Self::Random(p) => p.acquire_frame(core, pt),
            Self::Fifo(p) => p.acquire_frame(core, pt),
            Self::TwoFifo(p) => p.acquire_frame(core, pt),
            Self::Custom(p) => p.acquire_frame(core, pt),
        }
    }

    fn note_loaded(
        &mut self,
        core: &mut PagerCore,
        pt: &mut PageTable,
        frame: usize,
    ) -> Result<()> {
        match self {
            Self::Random(p) => p.note_loaded(core, pt, frame),
            Self::Fifo(p) => p.note_loaded(core, pt, frame),
            Self::TwoFifo(p) => p.note_loaded(core, pt, frame),
            Self::Custom(p) => p.note_loaded(core, pt, frame),
        }
    }

    fn promote(&mut self, core: &mut PagerCore, pt: &mut PageTable, frame: usize) -> Result<bool> {
        match self {
            Self::Random(p) => p.promote(core, pt, frame),
            Self::Fifo(p) => p.promote(core, pt, frame),
            Self::TwoFifo(p) => p.promote(core, pt, frame),
            Self::Custom(p) => p.promote(core, pt, frame),
        }
    }
}
