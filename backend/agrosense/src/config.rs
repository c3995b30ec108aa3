//! Application configuration loaded from environment variables.

use crate::errors::{AppError, Result};

/// Where collection records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// The hosted record store; requires project credentials.
    Remote,
    /// Process-lifetime in-memory store for local development.
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Config(format!(
                "Invalid STORE_BACKEND '{other}' (expected 'remote' or 'memory')"
            ))),
        }
    }
}

/// Credentials for the hosted record store.
#[derive(Debug, Clone)]
pub struct StoreCredentials {
    pub project_id: String,
    pub public_key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: StoreBackend,
    /// Base URL of the hosted record store API
    pub store_url: String,
    /// Present whenever `backend` is `Remote`
    pub credentials: Option<StoreCredentials>,
    /// Port for the REST API server
    pub api_port: u16,
    /// Timeout applied to every outbound store request
    pub request_timeout_secs: u64,
    /// How often (in seconds) the weather monitor refreshes the current snapshot
    pub weather_refresh_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = StoreBackend::parse(&var("STORE_BACKEND").unwrap_or_else(|| "remote".into()))?;

        let credentials = match backend {
            StoreBackend::Remote => Some(StoreCredentials {
                project_id: var("STORE_PROJECT_ID").ok_or_else(|| {
                    AppError::Config("STORE_PROJECT_ID environment variable is required".to_string())
                })?,
                public_key: var("STORE_PUBLIC_KEY").ok_or_else(|| {
                    AppError::Config("STORE_PUBLIC_KEY environment variable is required".to_string())
                })?,
            }),
            StoreBackend::Memory => None,
        };

        Ok(Config {
            backend,
            store_url: var("STORE_URL")
                .unwrap_or_else(|| "https://api.apper.io".to_string())
                .trim_end_matches('/')
                .to_string(),
            credentials,
            api_port: var("API_PORT")
                .unwrap_or_else(|| "3001".to_string())
                .parse()
                .map_err(|_| AppError::Config("Invalid API_PORT".to_string()))?,
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse()
                .map_err(|_| AppError::Config("Invalid REQUEST_TIMEOUT_SECS".to_string()))?,
            weather_refresh_secs: var("WEATHER_REFRESH_SECS")
                .unwrap_or_else(|| "300".to_string())
                .parse()
                .map_err(|_| AppError::Config("Invalid WEATHER_REFRESH_SECS".to_string()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn remote_backend_requires_credentials() {
        let err = config(&[("STORE_PROJECT_ID", "proj")]).unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("STORE_PUBLIC_KEY")));

        let err = config(&[("STORE_PUBLIC_KEY", "key")]).unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("STORE_PROJECT_ID")));
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let err = config(&[("STORE_PROJECT_ID", "  "), ("STORE_PUBLIC_KEY", "key")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn remote_defaults() {
        let cfg = config(&[("STORE_PROJECT_ID", "proj"), ("STORE_PUBLIC_KEY", "key")]).unwrap();
        assert_eq!(cfg.backend, StoreBackend::Remote);
        assert_eq!(cfg.store_url, "https://api.apper.io");
        assert_eq!(cfg.api_port, 3001);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.weather_refresh_secs, 300);
        let creds = cfg.credentials.unwrap();
        assert_eq!(creds.project_id, "proj");
        assert_eq!(creds.public_key, "key");
    }

    #[test]
    fn memory_backend_needs_no_credentials() {
        let cfg = config(&[("STORE_BACKEND", "Memory"), ("STORE_URL", "http://localhost:9000/")])
            .unwrap();
        assert_eq!(cfg.backend, StoreBackend::Memory);
        assert!(cfg.credentials.is_none());
        assert_eq!(cfg.store_url, "http://localhost:9000");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config(&[("STORE_BACKEND", "sqlite")]).is_err());
        assert!(config(&[("STORE_BACKEND", "memory"), ("API_PORT", "http")]).is_err());
        assert!(config(&[("STORE_BACKEND", "memory"), ("WEATHER_REFRESH_SECS", "-1")]).is_err());
    }
}
