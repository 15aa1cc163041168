//! Connection settings for the front-ends.
//!
//! Settings come from the process environment, after a `.env` file in the
//! working directory has been loaded. Variables already present in the
//! environment win over the file.

use thiserror::Error;

pub const TOKEN_VAR: &str = "BASELINKER_API_TOKEN";
pub const ENDPOINT_VAR: &str = "BASELINKER_API_URL";
pub const DEFAULT_ENDPOINT: &str = "https://api.baselinker.com/connector.php";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set; export it or add it to a .env file")]
    MissingToken(&'static str),
}

/// Token and endpoint used to build a client.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub token: String,
    pub endpoint: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("token", &"***")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Settings {
    pub fn new(token: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Load `.env` (if any), then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup(TOKEN_VAR)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken(TOKEN_VAR))?;
        let endpoint = lookup(ENDPOINT_VAR)
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Ok(Self { token, endpoint })
    }
}
