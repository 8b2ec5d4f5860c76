//! `orderscan` binary wiring: configuration, upstream client and the scan run.

pub mod app;
