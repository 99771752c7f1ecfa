//! Status/visibility engine.
//!
//! Pure decisions over a loaded snapshot: which next status is offered,
//! which records pass a filter, what the summary counts are, and which
//! affordances a caller sees. Nothing here touches the store or the
//! session; callers pass both the snapshot and the [`access::Capability`].

pub mod access;
pub mod filter;
pub mod stats;
pub mod transition;

pub use access::{Affordances, Capability, VoiceAffordances};
pub use filter::StatusFilter;
pub use stats::{DashboardSummary, PublicSummary, ReadCounts, StatusCounts};
