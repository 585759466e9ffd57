use bill_ledger::TaxRate;
use rust_decimal::Decimal;
use secrecy::Secret;
use serde::Deserialize;
use service_core::error::AppError;
use service_core::http::RetryConfig;
use std::time::Duration;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub billing: BillingSettings,
    #[serde(default)]
    pub restaurant: RestaurantProfile,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json_logs")]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json_logs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json_logs() -> bool {
    true
}

#[derive(Deserialize, Clone, Debug)]
pub struct BackendSettings {
    /// Base URL of the restaurant backend (e.g. http://localhost:5000).
    pub url: String,
    /// Token used when the caller did not forward one of its own.
    #[serde(default)]
    pub service_token: Option<Secret<String>>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Deserialize, Clone, Debug)]
pub struct BillingSettings {
    #[serde(default = "default_tax_rate_percent")]
    pub tax_rate_percent: Decimal,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Drafts untouched for this long are dropped from memory.
    #[serde(default = "default_draft_idle_ttl_secs")]
    pub draft_idle_ttl_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl BillingSettings {
    pub fn tax_rate(&self) -> Result<TaxRate, AppError> {
        TaxRate::from_percent(self.tax_rate_percent).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("billing.tax_rate_percent: {}", e))
        })
    }

    pub fn draft_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.draft_idle_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            tax_rate_percent: default_tax_rate_percent(),
            currency_symbol: default_currency_symbol(),
            draft_idle_ttl_secs: default_draft_idle_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_tax_rate_percent() -> Decimal {
    Decimal::from(18)
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_draft_idle_ttl_secs() -> u64 {
    4 * 60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60
}

/// Restaurant details printed in the receipt header.
///
/// Configured values act as fallbacks for whatever the backend profile
/// endpoint does not provide.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RestaurantProfile {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gst_number: Option<String>,
    #[serde(default = "default_receipt_footer")]
    pub receipt_footer: String,
}

impl Default for RestaurantProfile {
    fn default() -> Self {
        Self {
            name: "Your Restaurant Name".to_string(),
            address: None,
            phone: None,
            gst_number: None,
            receipt_footer: default_receipt_footer(),
        }
    }
}

fn default_receipt_footer() -> String {
    "Thank you for dining with us!".to_string()
}

pub fn get_configuration() -> Result<Settings, AppError> {
    service_core::config::get_configuration("billing-desk")
}
