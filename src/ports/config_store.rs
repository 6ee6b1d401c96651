use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    ReadError(String),

    #[error("Failed to write configuration: {0}")]
    WriteError(String),

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_token: Option<String>,
    pub base_url: String,
    pub request_timeout_seconds: u64,
    pub page_size: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_seconds: 30,
            page_size: None,
        }
    }
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Effective settings: stored values with environment overrides applied.
    async fn load_config(&self) -> ConfigResult<AppConfig>;
    /// Only what was saved, which is what `save_config` should write back.
    async fn load_stored_config(&self) -> ConfigResult<AppConfig>;
    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()>;
    async fn get_api_token(&self) -> ConfigResult<Option<String>>;
    async fn set_api_token(&self, token: &str) -> ConfigResult<()>;
}
