//! Configuration loader and validator for the release bot.
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::github::GITHUB_GRAPHQL_ENDPOINT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub telegram: Telegram,
    pub github: Github,
    #[serde(default)]
    pub app: App,
}

/// Telegram bot settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Telegram {
    pub bot_token: String,
    /// Long polling is used when absent.
    #[serde(default)]
    pub webhook: Option<Webhook>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Webhook {
    pub hostname: String,
    #[serde(default = "default_listen")]
    pub listen: String,
}

/// GitHub GraphQL settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Github {
    pub token: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    #[serde(default = "default_reply_timeout_secs")]
    pub reply_timeout_secs: u64,
}

impl Default for App {
    fn default() -> Self {
        Self {
            reply_timeout_secs: default_reply_timeout_secs(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:9090".to_string()
}

fn default_endpoint() -> String {
    GITHUB_GRAPHQL_ENDPOINT.to_string()
}

fn default_reply_timeout_secs() -> u64 {
    10
}

impl App {
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }
}

impl Webhook {
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen
            .parse()
            .map_err(|_| ConfigError::Invalid("telegram.webhook.listen must be host:port"))
    }

    /// Webhook URL; the path is the bot token so only Telegram knows it.
    pub fn url(&self, bot_token: &str) -> Result<Url, ConfigError> {
        Url::parse(&format!("https://{}/{}", self.hostname.trim(), bot_token))
            .map_err(|_| ConfigError::Invalid("telegram.webhook.hostname must form a valid URL"))
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.telegram.bot_token.trim().is_empty() {
        return Err(ConfigError::Invalid("telegram.bot_token must be non-empty"));
    }
    if let Some(webhook) = &cfg.telegram.webhook {
        if webhook.hostname.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "telegram.webhook.hostname must be non-empty",
            ));
        }
        webhook.listen_addr()?;
        webhook.url(&cfg.telegram.bot_token)?;
    }

    if cfg.github.token.trim().is_empty() {
        return Err(ConfigError::Invalid("github.token must be non-empty"));
    }
    if Url::parse(&cfg.github.endpoint).is_err() {
        return Err(ConfigError::Invalid("github.endpoint must be a valid URL"));
    }

    if cfg.app.reply_timeout_secs == 0 {
        return Err(ConfigError::Invalid("app.reply_timeout_secs must be > 0"));
    }

    Ok(())
}

/// Returns a sample configuration.
pub fn example() -> &'static str {
    r#"telegram:
  bot_token: "123456:YOUR_TELEGRAM_BOT_TOKEN"
  webhook:
    hostname: "bot.example.com"
    listen: "0.0.0.0:9090"

github:
  token: "YOUR_GITHUB_TOKEN"
  endpoint: "https://api.github.com/graphql"

app:
  reply_timeout_secs: 10
"#
}
