//! Environment configuration.
//!
//! Values come from the process environment, optionally seeded from a dotenv
//! file. Variables already set in the environment win over the file.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use orderscan_core::TimeWindow;
use orderscan_observability::LogFormat;
use orderscan_scan::FilterRequest;

/// Dotenv file read by the binary when present.
pub const DEFAULT_ENV_FILE: &str = "local.env";

pub const ENV_BASE_URL: &str = "SHOPWARE_BASE_URL";
pub const ENV_CLIENT_ID: &str = "SHOPWARE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SHOPWARE_CLIENT_SECRET";
pub const ENV_REQUEST_TIMEOUT: &str = "SHOPWARE_REQUEST_TIMEOUT_SECS";
pub const ENV_LOOKBACK_DAYS: &str = "SCAN_LOOKBACK_DAYS";
pub const ENV_INCLUDE_CREATED: &str = "SCAN_INCLUDE_CREATED";
pub const ENV_INCLUDE_UPDATED: &str = "SCAN_INCLUDE_UPDATED";
pub const ENV_INCLUDE_DELIVERY_UPDATED: &str = "SCAN_INCLUDE_DELIVERY_UPDATED";
pub const ENV_INCLUDE_TRANSACTION_UPDATED: &str = "SCAN_INCLUDE_TRANSACTION_UPDATED";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOOKBACK_DAYS: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("failed to read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// Connection settings for the Shopware Admin API.
#[derive(Clone)]
pub struct ShopwareConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub request_timeout: Duration,
}

impl core::fmt::Debug for ShopwareConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShopwareConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// What the binary scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Whole days before today covered by the window.
    pub lookback_days: u32,
    pub include_created: bool,
    pub include_updated: bool,
    pub include_delivery_updated: bool,
    pub include_transaction_updated: bool,
}

impl ScanConfig {
    /// Scan `window` with the passes switched on here.
    pub fn filter_request(&self, window: TimeWindow) -> FilterRequest {
        FilterRequest {
            window,
            include_created: self.include_created,
            include_updated: self.include_updated,
            include_delivery_updated: self.include_delivery_updated,
            include_transaction_updated: self.include_transaction_updated,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            include_created: true,
            include_updated: true,
            include_delivery_updated: true,
            include_transaction_updated: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub shopware: ShopwareConfig,
    pub scan: ScanConfig,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Seed the environment from `env_file` (a missing file is fine) and read it.
    pub fn load(env_file: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let loaded = match dotenvy::from_path(env_file.as_ref()) {
            Ok(()) => true,
            Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => false,
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %env_file.as_ref().display(), loaded, "env file");

        Self::from_env()
    }

    /// Read the current process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let base_url = env.required(ENV_BASE_URL)?;
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: ENV_BASE_URL,
                value: base_url,
            });
        }

        let timeout_secs = env.parsed(ENV_REQUEST_TIMEOUT, DEFAULT_REQUEST_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: ENV_REQUEST_TIMEOUT,
                value: timeout_secs.to_string(),
            });
        }

        let shopware = ShopwareConfig {
            base_url,
            client_id: env.required(ENV_CLIENT_ID)?,
            client_secret: env.required(ENV_CLIENT_SECRET)?,
            request_timeout: Duration::from_secs(timeout_secs),
        };

        let lookback_days = env.parsed(ENV_LOOKBACK_DAYS, DEFAULT_LOOKBACK_DAYS)?;
        if lookback_days == 0 {
            return Err(ConfigError::Invalid {
                var: ENV_LOOKBACK_DAYS,
                value: lookback_days.to_string(),
            });
        }

        let scan = ScanConfig {
            lookback_days,
            include_created: env.flag(ENV_INCLUDE_CREATED, true)?,
            include_updated: env.flag(ENV_INCLUDE_UPDATED, true)?,
            include_delivery_updated: env.flag(ENV_INCLUDE_DELIVERY_UPDATED, true)?,
            include_transaction_updated: env.flag(ENV_INCLUDE_TRANSACTION_UPDATED, true)?,
        };

        Ok(Self {
            shopware,
            scan,
            log_format: env.parsed(ENV_LOG_FORMAT, LogFormat::default())?,
        })
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Set and non-blank.
    fn get(&self, var: &str) -> Option<String> {
        (self.0)(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, var: &'static str) -> Result<String, ConfigError> {
        self.get(var).ok_or(ConfigError::Missing(var))
    }

    fn parsed<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
    {
        match self.get(var) {
            None => Ok(default),
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { var, value }),
        }
    }

    fn flag(&self, var: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.get(var) {
            None => Ok(default),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::Invalid { var, value }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use orderscan_scan::ScanPass;
    use std::collections::HashMap;

    fn window() -> TimeWindow {
        TimeWindow::previous_days(Utc.with_ymd_and_hms(2024, 5, 2, 6, 0, 0).unwrap(), 1).unwrap()
    }

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| map.get(var).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        (ENV_BASE_URL, "https://shop.example.com/"),
        (ENV_CLIENT_ID, "SWIA123"),
        (ENV_CLIENT_SECRET, "s3cret"),
    ];

    #[test]
    fn required_only_uses_defaults() {
        let cfg = config(&REQUIRED).unwrap();
        assert_eq!(cfg.shopware.base_url, "https://shop.example.com");
        assert_eq!(cfg.shopware.request_timeout, Duration::from_secs(30));
        assert_eq!(cfg.scan, ScanConfig::default());
        assert_eq!(cfg.scan.filter_request(window()).enabled_passes().len(), 4);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn missing_required_variable_is_named() {
        let err = config(&REQUIRED[..2]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_CLIENT_SECRET)));

        let blank = config(&[
            (ENV_BASE_URL, "https://shop.example.com"),
            (ENV_CLIENT_ID, "  "),
            (ENV_CLIENT_SECRET, "s3cret"),
        ])
        .unwrap_err();
        assert!(matches!(blank, ConfigError::Missing(ENV_CLIENT_ID)));
    }

    #[test]
    fn optional_values_override_defaults() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            (ENV_REQUEST_TIMEOUT, "5"),
            (ENV_LOOKBACK_DAYS, "3"),
            (ENV_INCLUDE_UPDATED, "false"),
            (ENV_INCLUDE_TRANSACTION_UPDATED, "0"),
            (ENV_LOG_FORMAT, "text"),
        ]);
        let cfg = config(&vars).unwrap();
        assert_eq!(cfg.shopware.request_timeout, Duration::from_secs(5));
        assert_eq!(cfg.scan.lookback_days, 3);
        let request = cfg.scan.filter_request(window());
        assert_eq!(request.window, window());
        assert_eq!(
            request.enabled_passes(),
            vec![ScanPass::Created, ScanPass::DeliveryUpdated]
        );
        assert_eq!(cfg.log_format, LogFormat::Text);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (var, value) in [
            (ENV_LOOKBACK_DAYS, "zero"),
            (ENV_LOOKBACK_DAYS, "0"),
            (ENV_REQUEST_TIMEOUT, "-1"),
            (ENV_INCLUDE_CREATED, "maybe"),
            (ENV_LOG_FORMAT, "xml"),
        ] {
            let mut vars = REQUIRED.to_vec();
            vars.push((var, value));
            match config(&vars) {
                Err(ConfigError::Invalid { var: got, .. }) => assert_eq!(got, var),
                other => panic!("{var}={value}: expected invalid, got {other:?}"),
            }
        }
    }

    #[test]
    fn base_url_must_be_http() {
        let err = config(&[
            (ENV_BASE_URL, "shop.example.com"),
            (ENV_CLIENT_ID, "id"),
            (ENV_CLIENT_SECRET, "secret"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_BASE_URL, .. }));
    }

    #[test]
    fn debug_output_hides_secret() {
        let cfg = config(&REQUIRED).unwrap();
        let rendered = format!("{:?}", cfg.shopware);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn unreadable_env_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(dotenvy::Error::Io(_))));
    }
}
