//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded first if
//! present). CLI flags override single fields after loading.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::ExportQuery;
use crate::transform::grouper::DEFAULT_THRESHOLD;

/// OEC OLAP proxy endpoint.
pub const DEFAULT_API_URL: &str = "https://oec.world/api/olap-proxy/data";

/// BACI trade cube, HS92 classification, annual.
pub const DEFAULT_CUBE: &str = "trade_i_baci_a_92";

/// Outbound request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_COMPANY_CSV: &str = "skcompany.csv";

pub const DEFAULT_PORT: u16 = 3000;

/// Dashboard configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_url: String,
    pub cube: String,
    /// Default exporter and year, used when a request does not override them.
    pub query: ExportQuery,
    pub timeout_secs: u64,
    pub company_csv: PathBuf,
    pub port: u16,
    /// Share, in percent, below which a section is folded into "Others".
    pub bucket_threshold: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cube: DEFAULT_CUBE.to_string(),
            query: ExportQuery::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            company_csv: PathBuf::from(DEFAULT_COMPANY_CSV),
            port: DEFAULT_PORT,
            bucket_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl DashboardConfig {
    /// Load from `TRADEBOARD_*` environment variables.
    pub fn from_env() -> Self {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        Self {
            api_url: env_str("TRADEBOARD_API_URL", &defaults.api_url),
            cube: env_str("TRADEBOARD_CUBE", &defaults.cube),
            query: ExportQuery {
                country: env_str("TRADEBOARD_COUNTRY", &defaults.query.country),
                year: env_parse("TRADEBOARD_YEAR", defaults.query.year),
            },
            timeout_secs: env_parse("TRADEBOARD_TIMEOUT_SECS", defaults.timeout_secs),
            company_csv: PathBuf::from(env_str(
                "TRADEBOARD_COMPANY_CSV",
                &defaults.company_csv.to_string_lossy(),
            )),
            port: env_parse("TRADEBOARD_PORT", defaults.port),
            bucket_threshold: env_parse("TRADEBOARD_BUCKET_THRESHOLD", defaults.bucket_threshold),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
