use crate::core::{AppError, Result};
use std::env;

pub mod server;

pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub settlement: SettlementConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

/// Payment provider credentials and endpoints
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub publishable_key: String,
    pub secret_key: String,
    pub webhook_secret: String,
}

/// Settlement tuning: sweeper cadence and the clearing timeout that
/// escalates a transaction to an authoritative provider status query.
#[derive(Debug, Clone)]
pub struct SettlementConfig {
    pub sweep_interval_secs: u64,
    pub clearing_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let is_live = env::var("INTASEND_IS_LIVE")
            .map(|v| v == "true")
            .unwrap_or(false);

        let default_base_url = if is_live {
            "https://payment.intasend.com/api"
        } else {
            "https://sandbox.intasend.com/api"
        };

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            server: ServerConfig::from_env()?,
            provider: ProviderConfig {
                base_url: env::var("INTASEND_BASE_URL")
                    .unwrap_or_else(|_| default_base_url.to_string()),
                publishable_key: env::var("INTASEND_PUBLISHABLE_KEY").map_err(|_| {
                    AppError::Configuration("INTASEND_PUBLISHABLE_KEY not set".to_string())
                })?,
                secret_key: env::var("INTASEND_SECRET_KEY").map_err(|_| {
                    AppError::Configuration("INTASEND_SECRET_KEY not set".to_string())
                })?,
                webhook_secret: env::var("INTASEND_WEBHOOK_SECRET").map_err(|_| {
                    AppError::Configuration("INTASEND_WEBHOOK_SECRET not set".to_string())
                })?,
            },
            settlement: SettlementConfig {
                sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid SWEEP_INTERVAL_SECS".to_string())
                    })?,
                clearing_timeout_secs: env::var("CLEARING_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "600".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid CLEARING_TIMEOUT_SECS".to_string())
                    })?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.settlement.sweep_interval_secs == 0 {
            return Err(AppError::Configuration(
                "Sweep interval must be greater than 0".to_string(),
            ));
        }

        if self.settlement.clearing_timeout_secs == 0 {
            return Err(AppError::Configuration(
                "Clearing timeout must be greater than 0".to_string(),
            ));
        }

        if self.provider.webhook_secret.trim().is_empty() {
            return Err(AppError::Configuration(
                "Webhook secret must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
