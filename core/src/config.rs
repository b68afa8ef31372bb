//! Runtime configuration: endpoints, storage location, page size.
//!
//! Defaults match the public country API and a locally running auth backend.
//! Each value can be overridden from the environment.

use std::path::PathBuf;

use crate::browse::DEFAULT_PAGE_SIZE;
use crate::error::ConfigError;

pub const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1";
pub const DEFAULT_AUTH_URL: &str = "http://localhost:5000/api/auth";
pub const DEFAULT_STORAGE_DIR: &str = ".countries";

pub const ENV_COUNTRIES_URL: &str = "COUNTRIES_API_URL";
pub const ENV_AUTH_URL: &str = "COUNTRIES_AUTH_URL";
pub const ENV_STORAGE_DIR: &str = "COUNTRIES_STORAGE_DIR";
pub const ENV_PAGE_SIZE: &str = "COUNTRIES_PAGE_SIZE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub countries_base_url: String,
    pub auth_base_url: String,
    pub storage_dir: PathBuf,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            countries_base_url: DEFAULT_COUNTRIES_URL.to_string(),
            auth_base_url: DEFAULT_AUTH_URL.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes the process
    /// environment. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_COUNTRIES_URL) {
            config.countries_base_url = url;
        }
        if let Some(url) = get(ENV_AUTH_URL) {
            config.auth_base_url = url;
        }
        if let Some(dir) = get(ENV_STORAGE_DIR) {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get(ENV_PAGE_SIZE) {
            config.page_size = match raw.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        key: ENV_PAGE_SIZE,
                        value: raw,
                        reason: "must be at least 1",
                    })
                }
                Ok(n) => n,
                Err(_) => {
                    return Err(ConfigError::Invalid {
                        key: ENV_PAGE_SIZE,
                        value: raw,
                        reason: "not a number",
                    })
                }
            };
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.page_size, 12);
        assert_eq!(config.countries_base_url, "https://restcountries.com/v3.1");
    }

    #[test]
    fn overrides_apply() {
        let config = Config::from_lookup(lookup(&[
            (ENV_COUNTRIES_URL, "http://127.0.0.1:3000/v3.1"),
            (ENV_AUTH_URL, "http://127.0.0.1:3000/api/auth"),
            (ENV_STORAGE_DIR, "/tmp/countries"),
            (ENV_PAGE_SIZE, "24"),
        ]))
        .unwrap();
        assert_eq!(config.countries_base_url, "http://127.0.0.1:3000/v3.1");
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/countries"));
        assert_eq!(config.page_size, 24);
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = Config::from_lookup(lookup(&[(ENV_AUTH_URL, "  ")])).unwrap();
        assert_eq!(config.auth_base_url, DEFAULT_AUTH_URL);
    }

    #[test]
    fn bad_page_size_is_an_error() {
        assert!(Config::from_lookup(lookup(&[(ENV_PAGE_SIZE, "0")])).is_err());
        let err = Config::from_lookup(lookup(&[(ENV_PAGE_SIZE, "twelve")])).unwrap_err();
        assert!(err.to_string().contains("COUNTRIES_PAGE_SIZE"));
    }
}
