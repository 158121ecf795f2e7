use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_QR_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub bot_token: String,
    /// Telegram user id of the operator who reviews and prices orders.
    pub operator_id: i64,
    pub payment: PaymentConfig,
    #[serde(default = "default_deliverables_dir")]
    pub deliverables_dir: PathBuf,
    #[serde(default = "default_true")]
    pub notify_operator_on_price_reject: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// UPI id payments are sent to.
    pub payee_id: String,
    pub payee_name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_qr_endpoint")]
    pub qr_endpoint: String,
}

fn default_deliverables_dir() -> PathBuf {
    PathBuf::from("./deliverables")
}

fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_qr_endpoint() -> String {
    DEFAULT_QR_ENDPOINT.to_string()
}

impl BotConfig {
    pub fn load() -> Result<Self> {
        let mut config_paths = vec![
            "/etc/deadline-desk/bot.toml".to_string(),
            "./deadline-desk.toml".to_string(),
        ];
        if let Ok(path) = env::var("DEADLINE_DESK_CONFIG") {
            config_paths.insert(0, path);
        }

        for path in config_paths {
            if let Ok(contents) = fs::read_to_string(&path) {
                tracing::info!("Loading config from {}", path);
                return Self::from_toml(&contents).with_context(|| format!("Invalid config file {}", path));
            }
        }

        tracing::info!("Loading config from environment");
        Self::from_env()
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn from_env() -> Result<Self> {
        let operator_id = env::var("OPERATOR_ID").context("OPERATOR_ID is not set")?;
        Ok(Self {
            bot_token: env::var("BOT_TOKEN").context("BOT_TOKEN is not set")?,
            operator_id: operator_id
                .trim()
                .parse()
                .with_context(|| format!("OPERATOR_ID must be a numeric Telegram id, got {}", operator_id))?,
            payment: PaymentConfig {
                payee_id: env::var("PAYEE_ID").context("PAYEE_ID is not set")?,
                payee_name: env::var("PAYEE_NAME").context("PAYEE_NAME is not set")?,
                currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| default_currency()),
                qr_endpoint: env::var("QR_ENDPOINT").unwrap_or_else(|_| default_qr_endpoint()),
            },
            deliverables_dir: env::var("DELIVERABLES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_deliverables_dir()),
            notify_operator_on_price_reject: env::var("NOTIFY_OPERATOR_ON_PRICE_REJECT")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(true),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_defaults_are_applied() {
        let config = BotConfig::from_toml(
            r#"
            bot_token = "123:abc"
            operator_id = 42

            [payment]
            payee_id = "desk@upi"
            payee_name = "Deadline Desk"
            "#,
        )
        .unwrap();

        assert_eq!(config.operator_id, 42);
        assert_eq!(config.payment.currency, "INR");
        assert_eq!(config.payment.qr_endpoint, DEFAULT_QR_ENDPOINT);
        assert_eq!(config.deliverables_dir, PathBuf::from("./deliverables"));
        assert!(config.notify_operator_on_price_reject);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = BotConfig::from_toml(
            r#"
            bot_token = "123:abc"
            operator_id = 42
            deliverables_dir = "/srv/files"
            notify_operator_on_price_reject = false

            [payment]
            payee_id = "desk@upi"
            payee_name = "Deadline Desk"
            currency = "USD"
            "#,
        )
        .unwrap();

        assert_eq!(config.deliverables_dir, PathBuf::from("/srv/files"));
        assert!(!config.notify_operator_on_price_reject);
        assert_eq!(config.payment.currency, "USD");
    }

    #[test]
    fn missing_payment_section_is_an_error() {
        assert!(BotConfig::from_toml("bot_token = \"x\"\noperator_id = 1\n").is_err());
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
