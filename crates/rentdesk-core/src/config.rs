//! Configuration module
//!
//! Client configuration is read from the environment (optionally seeded from a
//! `.env` file). Every value except the API base URL has a default.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::AUTH_CRED;

const TIMEOUT_SECS: u64 = 100;
const DEFAULT_LANGUAGE: &str = "en";
const UPLOAD_CONCURRENCY: usize = 4;
const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Configuration shared by the API client, the uploader and the CLI.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// Key under which the credential blob is persisted.
    pub auth_token_key: String,
    pub timeout_secs: u64,
    /// Language tag attached to every list query unless overridden.
    pub default_language: String,
    /// Maximum number of uploads in flight per coordinator.
    pub upload_concurrency: usize,
    /// Size of the chunks an upload body is streamed in; progress is reported per chunk.
    pub upload_chunk_bytes: usize,
    pub credentials_path: PathBuf,
    pub environment: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("RENTDESK_API_URL")
            .or_else(|_| env::var("API_BASE_URL"))
            .map_err(|_| {
                anyhow::anyhow!(
                    "env variable not set: RENTDESK_API_URL (did you forget to create a .env file from .env.template?)"
                )
            })?;

        let auth_token_key =
            env::var("RENTDESK_AUTH_TOKEN_KEY").unwrap_or_else(|_| AUTH_CRED.to_string());

        let timeout_secs = env::var("RENTDESK_TIMEOUT_SECS")
            .unwrap_or_else(|_| TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .unwrap_or(TIMEOUT_SECS);

        let default_language =
            env::var("RENTDESK_LANGUAGE").unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string());

        let upload_concurrency = env::var("RENTDESK_UPLOAD_CONCURRENCY")
            .unwrap_or_else(|_| UPLOAD_CONCURRENCY.to_string())
            .parse::<usize>()
            .unwrap_or(UPLOAD_CONCURRENCY);

        let upload_chunk_bytes = env::var("RENTDESK_UPLOAD_CHUNK_BYTES")
            .unwrap_or_else(|_| UPLOAD_CHUNK_BYTES.to_string())
            .parse::<usize>()
            .unwrap_or(UPLOAD_CHUNK_BYTES);

        let credentials_path = env::var("RENTDESK_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_credentials_path(&auth_token_key));

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let config = Self {
            api_base_url,
            auth_token_key,
            timeout_secs,
            default_language,
            upload_concurrency,
            upload_chunk_bytes,
            credentials_path,
            environment,
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration with defaults for everything but the base URL.
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            auth_token_key: AUTH_CRED.to_string(),
            timeout_secs: TIMEOUT_SECS,
            default_language: DEFAULT_LANGUAGE.to_string(),
            upload_concurrency: UPLOAD_CONCURRENCY,
            upload_chunk_bytes: UPLOAD_CHUNK_BYTES,
            credentials_path: default_credentials_path(AUTH_CRED),
            environment: "development".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(anyhow::anyhow!(
                "RENTDESK_API_URL must start with http:// or https://, got '{}'",
                self.api_base_url
            ));
        }
        if self.auth_token_key.trim().is_empty() {
            return Err(anyhow::anyhow!("RENTDESK_AUTH_TOKEN_KEY cannot be empty"));
        }
        if self.default_language.trim().is_empty() {
            return Err(anyhow::anyhow!("RENTDESK_LANGUAGE cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow::anyhow!("RENTDESK_TIMEOUT_SECS must be at least 1"));
        }
        if self.upload_concurrency == 0 {
            return Err(anyhow::anyhow!(
                "RENTDESK_UPLOAD_CONCURRENCY must be at least 1"
            ));
        }
        if self.upload_chunk_bytes == 0 {
            return Err(anyhow::anyhow!(
                "RENTDESK_UPLOAD_CHUNK_BYTES must be at least 1"
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

fn default_credentials_path(key: &str) -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("rentdesk"))
        .unwrap_or_else(|| PathBuf::from(".rentdesk"))
        .join(format!("{}.json", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::with_base_url("http://localhost:4000");
        assert_eq!(config.timeout(), Duration::from_secs(100));
        assert_eq!(config.default_language, "en");
        assert_eq!(config.upload_concurrency, 4);
        assert!(config.credentials_path.ends_with("AUTH_CRED.json"));
        assert!(config.validate().is_ok());
        assert!(!config.is_production());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ClientConfig::with_base_url("localhost:4000");
        assert!(config.validate().is_err());

        config.api_base_url = "https://api.example.com".to_string();
        config.upload_concurrency = 0;
        assert!(config.validate().is_err());

        config.upload_concurrency = 2;
        config.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("RENTDESK_TIMEOUT_SECS"));

        config.timeout_secs = 30;
        config.default_language = " ".to_string();
        assert!(config.validate().is_err());
    }
}
