use crate::ports::{AppConfig, ConfigError, ConfigResult, ConfigStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

const APP_NAME: &str = "projects-cli";
const KEYRING_USER: &str = "api_token";

pub const API_URL_ENV: &str = "PROJECTS_API_URL";
pub const TOKEN_ENV: &str = "PROJECTS_TOKEN";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    base_url: Option<String>,
    request_timeout_seconds: Option<u64>,
    page_size: Option<u32>,
}

pub struct FileConfigStore {
    config_path: PathBuf,
    keyring_service: Option<String>,
}

impl FileConfigStore {
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::ReadError("Cannot determine config directory".to_string())
        })?;

        Ok(Self {
            config_path: config_dir.join(APP_NAME).join("config.json"),
            keyring_service: Some(APP_NAME.to_string()),
        })
    }

    /// Store rooted at an explicit file, token kept next to it only.
    pub fn at(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            keyring_service: None,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn config_dir(&self) -> &Path {
        self.config_path.parent().unwrap_or_else(|| Path::new("."))
    }

    async fn ensure_config_dir(&self) -> ConfigResult<()> {
        fs::create_dir_all(self.config_dir())
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    fn token_file_path(&self) -> PathBuf {
        self.config_dir().join(".token")
    }

    async fn get_token_from_file(&self) -> ConfigResult<Option<String>> {
        match fs::read_to_string(self.token_file_path()).await {
            Ok(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            _ => Ok(None),
        }
    }

    async fn set_token_in_file(&self, token: &str) -> ConfigResult<()> {
        self.ensure_config_dir().await?;
        let token_path = self.token_file_path();
        fs::write(&token_path, token)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&token_path)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&token_path, perms)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        Ok(())
    }

    fn keyring_entry(&self) -> Option<keyring::Entry> {
        let service = self.keyring_service.as_deref()?;
        match keyring::Entry::new(service, KEYRING_USER) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Keyring service not available, falling back to file storage: {}", e);
                None
            }
        }
    }
}

/// Environment overrides: the url always wins, the token only fills a gap.
pub fn apply_env_overrides(mut config: AppConfig, api_url: Option<String>, token: Option<String>) -> AppConfig {
    if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
        config.base_url = url;
    }
    if config.api_token.is_none() {
        config.api_token = token.filter(|t| !t.trim().is_empty());
    }
    config
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load_config(&self) -> ConfigResult<AppConfig> {
        let stored = self.load_stored_config().await?;
        Ok(apply_env_overrides(
            stored,
            std::env::var(API_URL_ENV).ok(),
            std::env::var(TOKEN_ENV).ok(),
        ))
    }

    async fn load_stored_config(&self) -> ConfigResult<AppConfig> {
        let config_file = match fs::read_to_string(&self.config_path).await {
            Ok(content) => serde_json::from_str::<ConfigFile>(&content)
                .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?,
            Err(_) => {
                tracing::debug!("No config file at {}, using defaults", self.config_path.display());
                ConfigFile::default()
            }
        };

        let defaults = AppConfig::default();
        Ok(AppConfig {
            api_token: self.get_api_token().await?,
            base_url: config_file.base_url.unwrap_or(defaults.base_url),
            request_timeout_seconds: config_file
                .request_timeout_seconds
                .unwrap_or(defaults.request_timeout_seconds),
            page_size: config_file.page_size,
        })
    }

    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()> {
        self.ensure_config_dir().await?;

        let config_file = ConfigFile {
            base_url: Some(config.base_url.clone()),
            request_timeout_seconds: Some(config.request_timeout_seconds),
            page_size: config.page_size,
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        if let Some(token) = &config.api_token {
            self.set_api_token(token).await?;
        }

        Ok(())
    }

    async fn get_api_token(&self) -> ConfigResult<Option<String>> {
        if let Some(entry) = self.keyring_entry() {
            match entry.get_password() {
                Ok(token) => return Ok(Some(token)),
                Err(keyring::Error::NoEntry) => {}
                Err(e) => tracing::warn!("Keyring not available, falling back to file storage: {}", e),
            }
        }

        self.get_token_from_file().await
    }

    async fn set_api_token(&self, token: &str) -> ConfigResult<()> {
        if let Some(entry) = self.keyring_entry() {
            match entry.set_password(token) {
                Ok(()) => return Ok(()),
                Err(e) => tracing::warn!("Failed to store in keyring, falling back to file storage: {}", e),
            }
        }

        self.set_token_in_file(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    fn scratch_store(name: &str) -> FileConfigStore {
        let dir = std::env::temp_dir().join(format!("{}-test-{}-{}", APP_NAME, name, std::process::id()));
        FileConfigStore::at(dir.join("config.json"))
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips_file_settings() {
        let store = scratch_store("round-trip");
        let config = AppConfig {
            api_token: Some("secret".to_string()),
            base_url: "https://tracker.example.com".to_string(),
            request_timeout_seconds: 5,
            page_size: Some(50),
        };

        assert_ok!(store.save_config(&config).await);
        let loaded = assert_ok!(store.load_config().await);

        assert_eq!(loaded.request_timeout_seconds, 5);
        assert_eq!(loaded.page_size, Some(50));
        assert_eq!(loaded.api_token.as_deref(), Some("secret"));

        let _ = std::fs::remove_dir_all(store.config_dir());
    }

    #[tokio::test]
    async fn test_resaving_stored_settings_keeps_missing_token_missing() {
        let store = scratch_store("stored");
        std::fs::create_dir_all(store.config_dir()).unwrap();
        std::fs::write(store.config_path(), r#"{ "base_url": "https://saved.example.com" }"#).unwrap();

        let mut stored = assert_ok!(store.load_stored_config().await);
        assert_eq!(stored.base_url, "https://saved.example.com");
        assert_eq!(stored.api_token, None);

        stored.request_timeout_seconds = 5;
        assert_ok!(store.save_config(&stored).await);

        let reloaded = assert_ok!(store.load_stored_config().await);
        assert_eq!(reloaded.base_url, "https://saved.example.com");
        assert_eq!(reloaded.request_timeout_seconds, 5);
        assert_eq!(reloaded.api_token, None);
        assert!(!store.token_file_path().exists());

        let _ = std::fs::remove_dir_all(store.config_dir());
    }

    #[tokio::test]
    async fn test_invalid_file_is_reported() {
        let store = scratch_store("invalid");
        std::fs::create_dir_all(store.config_dir()).unwrap();
        std::fs::write(store.config_path(), "{ not json").unwrap();

        let err = store.load_config().await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat(_)));

        let _ = std::fs::remove_dir_all(store.config_dir());
    }

    #[test]
    fn test_env_overrides() {
        let stored = AppConfig {
            api_token: Some("stored".to_string()),
            ..Default::default()
        };

        let config = apply_env_overrides(
            stored,
            Some("http://api.internal:9000".to_string()),
            Some("from-env".to_string()),
        );
        assert_eq!(config.base_url, "http://api.internal:9000");
        assert_eq!(config.api_token.as_deref(), Some("stored"));

        let config = apply_env_overrides(AppConfig::default(), None, Some("from-env".to_string()));
        assert_eq!(config.api_token.as_deref(), Some("from-env"));
        assert_eq!(config.base_url, crate::ports::DEFAULT_BASE_URL);
    }
}
