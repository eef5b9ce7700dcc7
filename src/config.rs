use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".tv-show-browser";
/// Log file written inside the data directory.
const LOG_FILE_NAME: &str = "tv-show-browser.log";

const API_URL_VAR: &str = "TV_SHOW_BROWSER_API_URL";
const TIMEOUT_VAR: &str = "TV_SHOW_BROWSER_TIMEOUT_SECS";
const LOG_VAR: &str = "TV_SHOW_BROWSER_LOG";

const DEFAULT_API_URL: &str = "https://api.tvmaze.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime settings, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Catalog base URL without a trailing slash.
    pub api_url: String,
    pub request_timeout: Duration,
    /// `tracing` filter directive for the log file.
    pub log_filter: String,
    pub data_dir: PathBuf,
}

impl Config {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok(), default_data_dir()?)
    }

    /// Resolve the configuration through `lookup`, falling back to defaults
    /// for unset or blank variables.
    pub fn from_lookup<F>(lookup: F, data_dir: PathBuf) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = read(API_URL_VAR)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            bail!("{API_URL_VAR} must be an http(s) URL, got {api_url:?}");
        }

        let timeout_secs = match read(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .with_context(|| format!("{TIMEOUT_VAR} must be a positive integer, got {raw:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let log_filter = read(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
            log_filter,
            data_dir,
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

/// Resolve the data directory inside the user's home.
fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn resolve(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned(), PathBuf::from("/tmp/tvsb"))
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = resolve(&[]).unwrap();
        assert_eq!(config.api_url, "https://api.tvmaze.com");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.log_path(), PathBuf::from("/tmp/tvsb/tv-show-browser.log"));
    }

    #[test]
    fn overrides_are_trimmed() {
        let config = resolve(&[
            (API_URL_VAR, " http://localhost:8080/ "),
            (TIMEOUT_VAR, "3"),
            (LOG_VAR, "tv_show_browser=debug"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.log_filter, "tv_show_browser=debug");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(resolve(&[(TIMEOUT_VAR, "0")]).is_err());
        assert!(resolve(&[(TIMEOUT_VAR, "soon")]).is_err());
        assert!(resolve(&[(API_URL_VAR, "ftp://catalog")]).is_err());
    }

    #[test]
    fn blank_variables_fall_back_to_defaults() {
        let config = resolve(&[(API_URL_VAR, "  "), (TIMEOUT_VAR, "")]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
