//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default upper bound on a single LLM call.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Which LLM provider to talk to.
    pub backend: LlmBackend,
    /// Credential for `backend`. `None` keeps the server up but every
    /// classification fails with a configuration error.
    pub api_key: Option<SecretString>,
    /// Model identifier passed to the provider.
    pub model: String,
    /// HTTP listening port.
    pub port: u16,
    /// Upper bound on a single LLM round-trip.
    pub llm_timeout: Duration,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("LLM_BACKEND") {
            Some(raw) => raw.parse::<LlmBackend>().map_err(|message| {
                ConfigError::InvalidValue {
                    key: "LLM_BACKEND".into(),
                    message,
                }
            })?,
            None => LlmBackend::OpenAi,
        };

        let api_key = lookup(backend.api_key_var())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(SecretString::from);

        let model = lookup(backend.model_var())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| backend.default_model().to_string());

        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let timeout_secs = parse_or(
            "LLM_TIMEOUT_SECS",
            lookup("LLM_TIMEOUT_SECS"),
            DEFAULT_LLM_TIMEOUT_SECS,
        )?;

        Ok(Self {
            backend,
            api_key,
            model,
            port,
            llm_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Provider configuration, if a credential is present.
    pub fn llm_config(&self) -> Option<LlmConfig> {
        self.api_key.as_ref().map(|key| LlmConfig {
            backend: self.backend,
            api_key: key.clone(),
            model: self.model.clone(),
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{value}': {e}"),
            }),
        None => Ok(default),
    }
}
