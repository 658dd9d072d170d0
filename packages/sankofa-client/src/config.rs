use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};
use dotenvy::dotenv;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Client configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    /// JSON session file. The session lives in memory when unset.
    pub session_file: Option<PathBuf>,
    /// Serve sample data from memory instead of calling the API.
    pub demo_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: None,
            demo_mode: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, e.g. a map in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("SANKOFA_API_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            bail!("SANKOFA_API_URL must start with http:// or https://, got {api_url}");
        }

        Ok(Self {
            api_url,
            session_file: lookup("SANKOFA_SESSION_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            demo_mode: lookup("SANKOFA_DEMO_MODE").is_some_and(|v| parse_flag(&v)),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config_from(&[]).unwrap(), Config::default());
    }

    #[test]
    fn test_reads_every_variable() {
        let config = config_from(&[
            ("SANKOFA_API_URL", "https://api.sankofa.example"),
            ("SANKOFA_SESSION_FILE", "/tmp/sankofa/session.json"),
            ("SANKOFA_DEMO_MODE", "Yes"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://api.sankofa.example");
        assert_eq!(
            config.session_file,
            Some(PathBuf::from("/tmp/sankofa/session.json"))
        );
        assert!(config.demo_mode);
    }

    #[test]
    fn test_demo_flag_values() {
        for value in ["true", "1", "yes", "TRUE"] {
            assert!(parse_flag(value), "{value}");
        }
        for value in ["false", "0", "no", ""] {
            assert!(!parse_flag(value), "{value}");
        }
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        assert!(config_from(&[("SANKOFA_API_URL", "api.sankofa.example")]).is_err());
    }
}
