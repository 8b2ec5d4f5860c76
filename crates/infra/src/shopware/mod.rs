//! Shopware Admin API adapter.
//!
//! - [`ShopwareOrderSource`] answers the scan's order searches over HTTP.
//! - [`TokenRefresher`] keeps an OAuth access token fresh in the background.
//! - Wire models stay private to this module; callers only see domain types.

mod client;
mod models;
mod response;
mod token;

pub use client::{ShopwareOrderSource, TIME_FORMAT};
pub use token::{
    Credentials, RetryPolicy, SharedToken, StaticToken, TokenProvider, TokenRefreshConfig,
    TokenRefresher,
};
