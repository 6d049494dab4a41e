//! Screening module.
//!
//! Orchestrates universe scans: per-ticker fetching through the gateway,
//! class-keyed filtering, yield ranking and top-N truncation.

mod criteria;
mod engine;

pub use criteria::{rank, EquityCriteria, FundCriteria, ScreenCriteria, TOP_N};
pub use engine::{CancelToken, ScreenerEngine};
