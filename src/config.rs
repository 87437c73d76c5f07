use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::index::DEFAULT_TOP_K;

/// Environment variable holding the Hugging Face API token. The only
/// required setting; startup refuses to proceed without it.
pub const TOKEN_VAR: &str = "HUGGINGFACEHUB_API_TOKEN";

const DEFAULT_SOURCE_URL: &str = "https://brainlox.com/courses/category/technical";
const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
const DEFAULT_CHAT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";
const DEFAULT_HF_API_BASE: &str = "https://router.huggingface.co";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Typed snapshot of the environment, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub hf_api_token: String,
    pub hf_api_base: String,
    pub source_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub top_k: usize,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub generation_timeout: Duration,
    pub log_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable resolver so
    /// parsing stays testable without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let hf_api_token =
            non_empty(&lookup, TOKEN_VAR).ok_or(ConfigError::MissingVar(TOKEN_VAR))?;

        let top_k: usize = parse_or(&lookup, "ASKPAGE_TOP_K", DEFAULT_TOP_K)?;
        if top_k == 0 {
            return Err(ConfigError::Invalid {
                var: "ASKPAGE_TOP_K",
                reason: "must be at least 1".to_string(),
            });
        }

        let port: u16 = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let request_timeout_secs: u64 = parse_or(
            &lookup,
            "ASKPAGE_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let generation_timeout_secs: u64 = parse_or(
            &lookup,
            "ASKPAGE_GENERATION_TIMEOUT_SECS",
            DEFAULT_GENERATION_TIMEOUT_SECS,
        )?;

        Ok(Self {
            hf_api_token,
            hf_api_base: string_or(&lookup, "ASKPAGE_HF_API_BASE", DEFAULT_HF_API_BASE),
            source_url: string_or(&lookup, "ASKPAGE_SOURCE_URL", DEFAULT_SOURCE_URL),
            embedding_model: string_or(&lookup, "ASKPAGE_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            chat_model: string_or(&lookup, "ASKPAGE_CHAT_MODEL", DEFAULT_CHAT_MODEL),
            top_k,
            host: string_or(&lookup, "ASKPAGE_HOST", DEFAULT_HOST),
            port,
            request_timeout: Duration::from_secs(request_timeout_secs),
            generation_timeout: Duration::from_secs(generation_timeout_secs),
            log_dir: PathBuf::from(string_or(&lookup, "ASKPAGE_LOG_DIR", DEFAULT_LOG_DIR)),
        })
    }

    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty<F>(lookup: &F, var: &'static str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn string_or<F>(lookup: &F, var: &'static str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, var).unwrap_or_else(|| default.to_string())
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, var) {
        Some(raw) => raw.parse::<T>().map_err(|err| ConfigError::Invalid {
            var,
            reason: err.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let result = AppConfig::from_lookup(|_| None);
        assert!(matches!(result, Err(ConfigError::MissingVar(TOKEN_VAR))));
    }

    #[test]
    fn blank_token_is_treated_as_missing() {
        let result = AppConfig::from_lookup(lookup(&[(TOKEN_VAR, "   ")]));
        assert!(matches!(result, Err(ConfigError::MissingVar(TOKEN_VAR))));
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let config = AppConfig::from_lookup(lookup(&[(TOKEN_VAR, "hf_test")])).unwrap();

        assert_eq!(config.hf_api_token, "hf_test");
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(config.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.chat_model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.top_k, DEFAULT_TOP_K);
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.generation_timeout, Duration::from_secs(120));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn overrides_take_effect() {
        let config = AppConfig::from_lookup(lookup(&[
            (TOKEN_VAR, "hf_test"),
            ("ASKPAGE_SOURCE_URL", "https://example.test/page"),
            ("ASKPAGE_TOP_K", "2"),
            ("ASKPAGE_HOST", "0.0.0.0"),
            ("PORT", "9321"),
        ]))
        .unwrap();

        assert_eq!(config.source_url, "https://example.test/page");
        assert_eq!(config.top_k, 2);
        assert_eq!(config.bind_addr(), "0.0.0.0:9321");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[(TOKEN_VAR, "hf_test"), ("PORT", "later")]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { var: "PORT", .. })
        ));
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let result =
            AppConfig::from_lookup(lookup(&[(TOKEN_VAR, "hf_test"), ("ASKPAGE_TOP_K", "0")]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                var: "ASKPAGE_TOP_K",
                ..
            })
        ));
    }
}
