//! Demand paging: page table, frame table, fault dispatch, and the
//! replacement policies.
//!
//! # Architecture
//!
//! A workload touches virtual memory; the access layer consults the
//! [`PageTable`] and raises a fault when the needed protection bit is
//! missing. The [`Pager`] classifies the fault, asks the active policy for
//! a frame when one is needed, and runs the eviction/load protocol. The
//! [`FrameTable`] is the authoritative record of frame occupancy; policy
//! queues hold only frame indices into it.

mod frame_list;
mod frame_table;
mod page_table;
pub(crate) mod pager;
pub mod policy;
mod protection;
mod stats;

pub use frame_list::FrameList;
pub use frame_table::{Frame, FrameTable};
pub use page_table::PageTable;
pub use pager::{Pager, PagerCore};
pub use policy::{PolicyEngine, PolicyKind, ReplacementPolicy};
pub use protection::{AccessKind, Protection};
pub use stats::PagingStats;
