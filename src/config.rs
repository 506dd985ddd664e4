use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Broker identity printed on invoices, plus remittance and contact details.
/// Sourced from the `broker_settings` row, falling back to the shipped
/// defaults below when the row is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrokerSettings {
    pub company_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub email: String,
    pub ein: String,
    pub mc_number: String,
    pub us_dot: String,
    pub bank_name: String,
    pub bank_account: String,
    pub bank_routing: String,
    pub submitted_by: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub logo_path: Option<String>,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        BrokerSettings {
            company_name: "Kingdom Family Brokerage, Inc.".to_string(),
            address: "7533 Kingsmill Terrace".to_string(),
            city: "Fort Worth".to_string(),
            state: "TX".to_string(),
            zip: "76112".to_string(),
            phone: "(682) 231-3575".to_string(),
            email: "Hlrolfe@dfwtrucking.com".to_string(),
            ein: "29-58805".to_string(),
            mc_number: "1750411".to_string(),
            us_dot: "4444213".to_string(),
            bank_name: "Bank of America".to_string(),
            bank_account: "488135011117".to_string(),
            bank_routing: "111 000 025".to_string(),
            submitted_by: "Henry L Wolfe".to_string(),
            contact_phone: "(682) 231-3575".to_string(),
            contact_email: "Hlrolfe@dfwtrucking.com".to_string(),
            logo_path: None,
        }
    }
}

/// Vision model endpoint. Any OpenAI-compatible provider with multimodal
/// chat completions works; OpenRouter is the default.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl AiConfig {
    pub fn from_env() -> Result<Self> {
        Ok(AiConfig {
            base_url: optional_env("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| "https://openrouter.ai/api/v1".to_string()),
            api_key: require_env("OPENROUTER_API_KEY")?,
            model: optional_env("VISION_MODEL")
                .unwrap_or_else(|| "google/gemini-2.0-flash-exp:free".to_string()),
        })
    }
}

/// Transactional email endpoint (Resend-compatible API).
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub base_url: String,
    pub api_key: String,
    pub from_address: String,
}

impl EmailConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = optional_env("RESEND_API_KEY")
            .ok_or_else(|| anyhow!(crate::error::DeliveryError::NotConfigured))?;
        Ok(EmailConfig {
            base_url: optional_env("RESEND_BASE_URL")
                .unwrap_or_else(|| "https://api.resend.com".to_string()),
            api_key,
            from_address: optional_env("INVOICE_FROM_EMAIL")
                .unwrap_or_else(|| "invoices@copper-shipping.com".to_string()),
        })
    }
}

pub fn db_path() -> PathBuf {
    optional_env("COPPERFREIGHT_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("copperfreight.sqlite"))
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("missing required environment variable: {key}"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
