//! read client configuration from a file, the environment or AWS Secrets Manager

use std::time::Duration;

use aws_config::BehaviorVersion;
use tracing::debug;

use crate::errors::Error;

pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_USER_AGENT: &str = "ticketing-client-rust/0.1.0";

pub enum ConfigLocation {
    File(String),
    Env,
    Secret,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.example.com/api/v1`.
    pub base_url: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl ClientConfig {
    pub fn from_values(
        base_url: impl Into<String>,
        refresh_path: Option<String>,
        request_timeout_secs: Option<u64>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            refresh_path: refresh_path.unwrap_or_else(default_refresh_path),
            request_timeout_secs,
            user_agent: user_agent.unwrap_or_else(default_user_agent),
        }
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        config.validated()
    }

    pub fn from_env() -> Result<Self, Error> {
        read_config_from_env()?.validated()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Normalizes the base URL and checks the renewal path.
    pub fn validated(mut self) -> Result<Self, Error> {
        let base = self.base_url.trim().trim_end_matches('/');
        let base = if base.starts_with("http://") || base.starts_with("https://") {
            base.to_string()
        } else {
            format!("https://{base}")
        };
        reqwest::Url::parse(&base)
            .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", base, e)))?;
        if !self.refresh_path.starts_with('/') {
            return Err(Error::Config(format!(
                "Refresh path '{}' must start with '/'",
                self.refresh_path
            )));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(Error::Config("Request timeout must be > 0".into()));
        }
        self.base_url = base;
        Ok(self)
    }
}

pub async fn read_config(loc: ConfigLocation) -> Result<ClientConfig, Error> {
    let config = match loc {
        ConfigLocation::File(path) => {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        }
        ConfigLocation::Env => read_config_from_env()?,
        ConfigLocation::Secret => read_config_from_secret().await?,
    };
    config.validated()
}

fn read_config_from_env() -> Result<ClientConfig, Error> {
    let request_timeout_secs = match std::env::var("TICKETING_TIMEOUT_SECS") {
        Ok(raw) => Some(raw.parse::<u64>().map_err(|_| {
            Error::Config(format!("Invalid TICKETING_TIMEOUT_SECS value '{}'", raw))
        })?),
        Err(_) => None,
    };
    Ok(ClientConfig::from_values(
        std::env::var("TICKETING_API_URL")
            .map_err(|_| Error::Config("Missing TICKETING_API_URL env var".to_string()))?,
        std::env::var("TICKETING_REFRESH_PATH").ok(),
        request_timeout_secs,
        std::env::var("TICKETING_USER_AGENT").ok(),
    ))
}

async fn read_config_from_secret() -> Result<ClientConfig, Error> {
    let secret_arn = std::env::var("TICKETING_CONFIG_SECRET_ARN")
        .map_err(|_| Error::Config("Missing TICKETING_CONFIG_SECRET_ARN env var".to_string()))?;
    debug!(secret_arn = %secret_arn, "config.secret.fetch");
    let client = aws_sdk_secretsmanager::Client::new(
        &aws_config::load_defaults(BehaviorVersion::latest()).await,
    );
    let resp = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Config(format!("Failed to get secret: {}", e)))?;
    let secret = match resp.secret_string() {
        Some(s) => Ok(s),
        None => Err(Error::Config(
            "Failed to get secret string, returned None".to_string(),
        )),
    }?;
    let config: ClientConfig = serde_json::from_str(secret)?;
    Ok(config)
}
