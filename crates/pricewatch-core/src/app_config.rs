use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::enrich::AlertThresholds;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub merchant_id: Option<String>,
    pub merchant_key: Option<String>,
    pub ranking_base_url: String,
    pub request_timeout_secs: u64,
    pub token_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub high_priority_popularity_max: u32,
    pub critical_gap_threshold: Decimal,
    pub image_placeholder_url: String,
    pub brands_path: PathBuf,
    pub reports_dir: PathBuf,
    pub market_seed: u64,
}

impl AppConfig {
    /// Alert cutoffs for the enrichment engine.
    #[must_use]
    pub fn alert_thresholds(&self) -> AlertThresholds {
        AlertThresholds {
            high_priority_popularity_max: self.high_priority_popularity_max,
            critical_gap_threshold: self.critical_gap_threshold,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("merchant_id", &self.merchant_id)
            .field(
                "merchant_key",
                &self.merchant_key.as_ref().map(|_| "[redacted]"),
            )
            .field("ranking_base_url", &self.ranking_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("token_timeout_secs", &self.token_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field(
                "high_priority_popularity_max",
                &self.high_priority_popularity_max,
            )
            .field("critical_gap_threshold", &self.critical_gap_threshold)
            .field("image_placeholder_url", &self.image_placeholder_url)
            .field("brands_path", &self.brands_path)
            .field("reports_dir", &self.reports_dir)
            .field("market_seed", &self.market_seed)
            .finish()
    }
}
