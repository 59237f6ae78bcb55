use crate::error::{AppError, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub push: PushConfig,
    pub email: EmailConfig,
    pub bible: BibleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Header the gateway sends its shared webhook secret in.
    pub webhook_header: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    pub token_url: String,
    pub send_url: String,
    pub project_id: String,
    pub scope: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub base_url: String,
    pub from_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BibleConfig {
    pub base_url: String,
    pub bible_id: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(config_path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .map_err(|e| AppError::Config(format!("Failed to read config file '{}': {}", config_path, e)))?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
