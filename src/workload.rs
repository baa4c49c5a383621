//! Memory-access workloads.
//!
//! Each workload touches the simulated virtual memory in a characteristic
//! pattern and returns a checksum. The checksum depends only on the
//! workload and its seed, never on the replacement policy, which makes it
//! a cheap cross-policy correctness probe.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, VirtmemError};
use crate::storage::PAGE_SIZE;
use crate::Simulation;

/// Which access pattern to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    /// Fill with random bytes, heapsort in place, verify order.
    Sort,
    /// Sequential write pass followed by a sequential read pass.
    Scan,
    /// Random accesses clustered around a moving hot region.
    Focus,
}

impl WorkloadKind {
    /// The CLI spelling of this workload.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sort => "sort",
            Self::Scan => "scan",
            Self::Focus => "focus",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WorkloadKind {
    type Err = VirtmemError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sort" => Ok(Self::Sort),
            "scan" => Ok(Self::Scan),
            "focus" => Ok(Self::Focus),
            other => Err(VirtmemError::Config(format!(
                "unknown workload '{other}' (expected sort|scan|focus)"
            ))),
        }
    }
}

const FOCUS_ROUNDS: usize = 100;
const FOCUS_ACCESSES_PER_ROUND: usize = 200;

/// Runs `kind` against `sim` and returns its checksum.
///
/// # Errors
///
/// Propagates paging errors, plus an invariant violation if the sort
/// workload finds its data out of order afterwards.
pub fn run(kind: WorkloadKind, sim: &mut Simulation, seed: u64) -> Result<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    match kind {
        WorkloadKind::Sort => sort(sim, &mut rng),
        WorkloadKind::Scan => scan(sim),
        WorkloadKind::Focus => focus(sim, &mut rng),
    }
}

/// Sequential write pass, then a sequential read pass summing every byte.
fn scan(sim: &mut Simulation) -> Result<u64> {
    let len = sim.virtual_len();

    for addr in 0..len {
        sim.write_byte(addr, (addr % 251) as u8)?;
    }

    let mut checksum = 0u64;
    for addr in 0..len {
        checksum = checksum.wrapping_add(u64::from(sim.read_byte(addr)?));
    }
    Ok(checksum)
}

/// Fills memory with random bytes and heapsorts it in place.
///
/// The checksum (byte sum) is permutation-invariant, so a paging bug that
/// loses or duplicates content shows up as a checksum mismatch across
/// policies even before the order check fires.
fn sort(sim: &mut Simulation, rng: &mut StdRng) -> Result<u64> {
    let len = sim.virtual_len();

    let mut checksum = 0u64;
    for addr in 0..len {
        let value = rng.gen::<u8>();
        sim.write_byte(addr, value)?;
        checksum = checksum.wrapping_add(u64::from(value));
    }

    heapsort(sim, len)?;

    let mut prev = 0u8;
    for addr in 0..len {
        let value = sim.read_byte(addr)?;
        if value < prev {
            return Err(VirtmemError::InvariantViolation(format!(
                "sorted data out of order at address {addr}"
            )));
        }
        prev = value;
    }
    Ok(checksum)
}

/// Bursts of accesses concentrated on a small hot region that jumps
/// around the address space between rounds.
fn focus(sim: &mut Simulation, rng: &mut StdRng) -> Result<u64> {
    let len = sim.virtual_len();
    let spread = (2 * PAGE_SIZE).min(len);

    let mut checksum = 0u64;
    for _ in 0..FOCUS_ROUNDS {
        let hot = rng.gen_range(0..len);
        for _ in 0..FOCUS_ACCESSES_PER_ROUND {
            let addr = (hot + rng.gen_range(0..spread)) % len;
            if rng.gen_bool(0.5) {
                let value = rng.gen::<u8>();
                sim.write_byte(addr, value)?;
                checksum = checksum.wrapping_add(u64::from(value));
            } else {
                checksum = checksum.wrapping_add(u64::from(sim.read_byte(addr)?));
            }
        }
    }
    Ok(checksum)
}

/// In-place heapsort through the byte accessors.
fn heapsort(sim: &mut Simulation, len: usize) -> Result<()> {
    if len < 2 {
        return Ok(());
    }

    for root in (0..len / 2).rev() {
        sift_down(sim, root, len)?;
    }
    for end in (1..len).rev() {
        swap(sim, 0, end)?;
        sift_down(sim, 0, end)?;
    }
    Ok(())
}

fn sift_down(sim: &mut Simulation, mut root: usize, end: usize) -> Result<()> {
    loop {
        let mut child = 2 * root + 1;
        if child >= end {
            return Ok(());
        }
        if child + 1 < end && sim.read_byte(child + 1)? > sim.read_byte(child)? {
            child += 1;
        }
        if sim.read_byte(root)? >= sim.read_byte(child)? {
            return Ok(());
        }
        swap(sim, root, child)?;
        root = child;
    }
}

fn swap(sim: &mut Simulation, a: usize, b: usize) -> Result<()> {
    let va = sim.read_byte(a)?;
    let vb = sim.read_byte(b)?;
    sim.write_byte(a, vb)?;
    sim.write_byte(b, va)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PolicyKind;
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
    fn test_workload_kind_parse() {
        assert_eq!("sort".parse::<WorkloadKind>().unwrap(), WorkloadKind::Sort);
        assert_eq!("scan".parse::<WorkloadKind>().unwrap(), WorkloadKind::Scan);
        assert_eq!("focus".parse::<WorkloadKind>().unwrap(), WorkloadKind::Focus);
        assert!("sweep".parse::<WorkloadKind>().is_err());
    }

    #[test]
    fn test_scan_checksum_is_deterministic() {
        let expected: u64 = (0..2 * PAGE_SIZE).map(|addr| (addr % 251) as u64).sum();

        let (mut sim, _temp) = test_sim(2, 1, PolicyKind::Fifo);
        let checksum = run(WorkloadKind::Scan, &mut sim, 0).unwrap();
        assert_eq!(checksum, expected);
    }

    #[test]
    fn test_scan_faults_at_least_once_per_page() {
        let (mut sim, _temp) = test_sim(4, 2, PolicyKind::Fifo);
        run(WorkloadKind::Scan, &mut sim, 0).unwrap();
        assert!(sim.stats().page_faults >= 4);
        sim.check_consistency().unwrap();
    }

    #[test]
    fn test_sort_orders_data_under_memory_pressure() {
        let (mut sim, _temp) = test_sim(2, 1, PolicyKind::Fifo);
        run(WorkloadKind::Sort, &mut sim, 7).unwrap();

        let mut prev = 0u8;
        for addr in 0..sim.virtual_len() {
            let value = sim.read_byte(addr).unwrap();
            assert!(value >= prev);
            prev = value;
        }
    }

    #[test]
    fn test_sort_checksum_matches_fill() {
        // Same seed, different frame counts: the byte population is
        // identical, so the permutation-invariant checksum must agree.
        let (mut small, _t1) = test_sim(2, 1, PolicyKind::Fifo);
        let (mut large, _t2) = test_sim(2, 2, PolicyKind::Fifo);

        let a = run(WorkloadKind::Sort, &mut small, 3).unwrap();
        let b = run(WorkloadKind::Sort, &mut large, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_focus_same_seed_same_checksum() {
        let (mut sim1, _t1) = test_sim(4, 2, PolicyKind::Fifo);
        let (mut sim2, _t2) = test_sim(4, 2, PolicyKind::Fifo);

        let a = run(WorkloadKind::Focus, &mut sim1, 11).unwrap();
        let b = run(WorkloadKind::Focus, &mut sim2, 11).unwrap();
        assert_eq!(a, b);
    }
}
