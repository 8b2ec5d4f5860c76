//! Infrastructure layer: upstream API clients and configuration.
//!
//! - `shopware`: HTTP order source and background token refresh
//! - `config`: environment-driven application settings

pub mod config;
pub mod shopware;

pub use config::{AppConfig, ConfigError, ScanConfig, ShopwareConfig};
pub use shopware::{
    Credentials, ShopwareOrderSource, SharedToken, StaticToken, TokenProvider, TokenRefreshConfig,
    TokenRefresher,
};
