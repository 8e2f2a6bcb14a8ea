//! Pagination settings.

use crate::error::{RelayError, RelayResult};

/// Page size used when neither `first` nor `last` is given.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

const ENV_DEFAULT_PAGE_SIZE: &str = "CATALOG_DEFAULT_PAGE_SIZE";
const ENV_MAX_PAGE_SIZE: &str = "CATALOG_MAX_PAGE_SIZE";

/// Configuration for page sizing.
///
/// By default pages hold 20 rows and the requested size is not capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Page size when the request names none.
    pub default_page_size: i64,
    /// Upper bound applied to any requested page size. `None` means unbounded.
    pub max_page_size: Option<i64>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: None,
        }
    }
}

impl PaginationConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size used when `first`/`last` are absent.
    pub fn with_default_page_size(mut self, size: i64) -> Self {
        self.default_page_size = size.max(0);
        self
    }

    /// Cap every requested page size.
    pub fn with_max_page_size(mut self, size: i64) -> Self {
        self.max_page_size = Some(size.max(0));
        self
    }

    /// Remove the page size cap.
    pub fn unbounded(mut self) -> Self {
        self.max_page_size = None;
        self
    }

    /// Load from `CATALOG_DEFAULT_PAGE_SIZE` / `CATALOG_MAX_PAGE_SIZE`.
    ///
    /// A `.env` file is read first when present. Unset variables keep their
    /// defaults; malformed ones are an error.
    pub fn from_env() -> RelayResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RelayResult<Self> {
        let mut config = Self::default();
        if let Some(size) = parse_size(ENV_DEFAULT_PAGE_SIZE, lookup(ENV_DEFAULT_PAGE_SIZE))? {
            config.default_page_size = size;
        }
        config.max_page_size = parse_size(ENV_MAX_PAGE_SIZE, lookup(ENV_MAX_PAGE_SIZE))?;
        Ok(config)
    }

    /// Apply the cap, if any, to a requested page size.
    pub fn clamp(&self, size: i64) -> i64 {
        match self.max_page_size {
            Some(max) => size.min(max),
            None => size,
        }
    }
}

fn parse_size(key: &str, raw: Option<String>) -> RelayResult<Option<i64>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<i64>() {
        Ok(size) if size >= 0 => Ok(Some(size)),
        _ => Err(RelayError::config(format!(
            "{key} must be a non-negative integer, got {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_twenty_unbounded() {
        let config = PaginationConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PaginationConfig::default());
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.clamp(500), 500);
    }

    #[test]
    fn reads_both_variables() {
        let config = PaginationConfig::from_lookup(lookup(&[
            ("CATALOG_DEFAULT_PAGE_SIZE", "10"),
            ("CATALOG_MAX_PAGE_SIZE", " 50 "),
        ]))
        .unwrap();
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, Some(50));
        assert_eq!(config.clamp(80), 50);
    }

    #[test]
    fn rejects_malformed_values() {
        let err = PaginationConfig::from_lookup(lookup(&[("CATALOG_MAX_PAGE_SIZE", "lots")]))
            .unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));

        let err = PaginationConfig::from_lookup(lookup(&[("CATALOG_DEFAULT_PAGE_SIZE", "-1")]))
            .unwrap_err();
        assert!(err.to_string().contains("CATALOG_DEFAULT_PAGE_SIZE"));
    }

    #[test]
    fn builder_setters() {
        let config = PaginationConfig::new()
            .with_default_page_size(5)
            .with_max_page_size(8);
        assert_eq!(config.default_page_size, 5);
        assert_eq!(config.max_page_size, Some(8));
        assert_eq!(config.unbounded().max_page_size, None);
    }
}
