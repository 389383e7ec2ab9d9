//! Client configuration from the process environment.
//!
//! # Responsibility
//! - Resolve the backend base URL and ambient client settings.
//! - Reject malformed values with typed errors instead of panicking.
//!
//! # Invariants
//! - `base_url` is an absolute `http`/`https` URL.
//! - `page_size` is one of the paginator's offered sizes.
//! - `date_display_format` only contains valid strftime items.

use crate::logging::{default_log_level, normalize_level};
use crate::store::pagination::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
use chrono::format::{Item, StrftimeItems};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use url::Url;

pub const ENV_BASE_URL: &str = "PEOPLE_BASE_URL";
pub const ENV_PAGE_SIZE: &str = "PEOPLE_PAGE_SIZE";
pub const ENV_HTTP_TIMEOUT_MS: &str = "PEOPLE_HTTP_TIMEOUT_MS";
pub const ENV_DATE_FORMAT: &str = "PEOPLE_DATE_FORMAT";
pub const ENV_SEARCH_WINDOWING: &str = "PEOPLE_SEARCH_WINDOWING";
pub const ENV_LOG_LEVEL: &str = "PEOPLE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PEOPLE_LOG_DIR";

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_DATE_DISPLAY_FORMAT: &str = "%m/%d/%Y";

/// How `filtered_view` windows the filtered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchWindowing {
    /// Filter the loaded page and return every match.
    #[default]
    PageLocal,
    /// Filter, then slice `[page * size, page * size + size)` out of the
    /// already-paginated page. Empty for every page but the first.
    Legacy,
}

impl SearchWindowing {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PageLocal => "page_local",
            Self::Legacy => "legacy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "page_local" | "page-local" => Some(Self::PageLocal),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }
}

/// Configuration load errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required setting `{key}`"),
            Self::Invalid { key, value, reason } => {
                write!(f, "invalid `{key}` value `{value}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
    pub page_size: u32,
    pub http_timeout_ms: u64,
    pub date_display_format: String,
    pub search_windowing: SearchWindowing,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Builds a configuration with defaults around one base URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            page_size: DEFAULT_PAGE_SIZE,
            http_timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
            date_display_format: DEFAULT_DATE_DISPLAY_FORMAT.to_string(),
            search_windowing: SearchWindowing::default(),
            log_level: default_log_level(),
            log_dir: None,
        })
    }

    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let base_url = read(ENV_BASE_URL).ok_or(ConfigError::Missing(ENV_BASE_URL))?;
        let mut config = Self::new(&base_url)?;

        if let Some(raw) = read(ENV_PAGE_SIZE) {
            config.page_size = parse_page_size(&raw)?;
        }
        if let Some(raw) = read(ENV_HTTP_TIMEOUT_MS) {
            config.http_timeout_ms = match raw.parse::<u64>() {
                Ok(value) if value > 0 => value,
                _ => return Err(invalid(ENV_HTTP_TIMEOUT_MS, &raw, "expected a positive integer")),
            };
        }
        if let Some(raw) = read(ENV_DATE_FORMAT) {
            validate_date_format(&raw)?;
            config.date_display_format = raw;
        }
        if let Some(raw) = read(ENV_SEARCH_WINDOWING) {
            config.search_windowing = SearchWindowing::parse(&raw)
                .ok_or_else(|| invalid(ENV_SEARCH_WINDOWING, &raw, "expected page_local|legacy"))?;
        }
        if let Some(raw) = read(ENV_LOG_LEVEL) {
            config.log_level =
                normalize_level(&raw).map_err(|reason| invalid(ENV_LOG_LEVEL, &raw, &reason))?;
        }
        if let Some(raw) = read(ENV_LOG_DIR) {
            let path = PathBuf::from(&raw);
            if !path.is_absolute() {
                return Err(invalid(ENV_LOG_DIR, &raw, "expected an absolute path"));
            }
            config.log_dir = Some(path);
        }

        Ok(config)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| invalid(ENV_BASE_URL, trimmed, &err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(ENV_BASE_URL, trimmed, "expected an http or https URL"));
    }
    if url.cannot_be_a_base() {
        return Err(invalid(ENV_BASE_URL, trimmed, "URL cannot be used as a base"));
    }
    Ok(url)
}

fn parse_page_size(raw: &str) -> Result<u32, ConfigError> {
    match raw.parse::<u32>() {
        Ok(value) if PAGE_SIZE_OPTIONS.contains(&value) => Ok(value),
        _ => Err(invalid(
            ENV_PAGE_SIZE,
            raw,
            &format!("expected one of {PAGE_SIZE_OPTIONS:?}"),
        )),
    }
}

fn validate_date_format(raw: &str) -> Result<(), ConfigError> {
    if StrftimeItems::new(raw).any(|item| matches!(item, Item::Error)) {
        return Err(invalid(ENV_DATE_FORMAT, raw, "unsupported strftime specifier"));
    }
    Ok(())
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, ConfigError, SearchWindowing, ENV_BASE_URL};
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn base_url_is_required() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_BASE_URL));

        let blank = ClientConfig::from_lookup(lookup(&[("PEOPLE_BASE_URL", "  ")])).unwrap_err();
        assert_eq!(blank, ConfigError::Missing(ENV_BASE_URL));
    }

    #[test]
    fn defaults_apply_when_only_base_url_is_set() {
        let config =
            ClientConfig::from_lookup(lookup(&[("PEOPLE_BASE_URL", "http://localhost:5000")]))
                .unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.http_timeout_ms, 10_000);
        assert_eq!(config.date_display_format, "%m/%d/%Y");
        assert_eq!(config.search_windowing, SearchWindowing::PageLocal);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("PEOPLE_BASE_URL", "https://api.example.com/v1/"),
            ("PEOPLE_PAGE_SIZE", "25"),
            ("PEOPLE_HTTP_TIMEOUT_MS", "2500"),
            ("PEOPLE_DATE_FORMAT", "%d.%m.%Y"),
            ("PEOPLE_SEARCH_WINDOWING", "legacy"),
            ("PEOPLE_LOG_LEVEL", "WARNING"),
        ]))
        .unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.http_timeout_ms, 2500);
        assert_eq!(config.date_display_format, "%d.%m.%Y");
        assert_eq!(config.search_windowing, SearchWindowing::Legacy);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn malformed_values_are_rejected() {
        let cases = [
            ("PEOPLE_BASE_URL", "not a url"),
            ("PEOPLE_BASE_URL", "ftp://example.com"),
            ("PEOPLE_PAGE_SIZE", "11"),
            ("PEOPLE_HTTP_TIMEOUT_MS", "0"),
            ("PEOPLE_DATE_FORMAT", "%Q"),
            ("PEOPLE_SEARCH_WINDOWING", "global"),
            ("PEOPLE_LOG_LEVEL", "loud"),
            ("PEOPLE_LOG_DIR", "relative/logs"),
        ];
        for (key, value) in cases {
            let mut pairs = vec![("PEOPLE_BASE_URL", "http://localhost:5000")];
            pairs.retain(|(existing, _)| *existing != key);
            pairs.push((key, value));
            let err = ClientConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                "{key}={value} should be rejected, got {err:?}"
            );
        }
    }
}
