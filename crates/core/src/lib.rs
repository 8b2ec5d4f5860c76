//! `orderscan-core`: shared building blocks for the order scanner.
//!
//! This crate contains **pure** primitives (no IO): identifiers, the domain error
//! model and the scan time window.

pub mod error;
pub mod id;
pub mod window;

pub use error::{DomainError, DomainResult};
pub use id::{OrderId, SalesChannelId};
pub use window::TimeWindow;
