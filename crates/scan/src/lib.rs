//! Order scan orchestration.
//!
//! Discovers orders changed within a time window through several overlapping
//! passes, evaluates each distinct order once against the rule engine and returns
//! a deterministically ordered report of the orders that failed.

pub mod ordering;
pub mod report;
pub mod request;
pub mod service;
pub mod source;

pub use ordering::{compare_results, sort_report};
pub use report::{OrderResult, ScanReport};
pub use request::{FilterRequest, ScanPass};
pub use service::{ScanError, ScanService};
pub use source::{MAX_PAGE_SIZE, OrderSource, PageRequest, SourceError, TimeField};
