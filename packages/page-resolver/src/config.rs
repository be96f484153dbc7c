use dotenvy::dotenv;
use std::env;

use crate::error::{ResolverError, Result};
use crate::source::{DEFAULT_DOMAINS_QUERY, DEFAULT_PAGES_QUERY};

/// Resolver configuration loaded from environment variables.
///
/// Command-line values take precedence; these are the fallbacks.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub pages_query: String,
    pub domains_query: String,
    pub url_scheme: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from any variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let url_scheme = var("URL_SCHEME").unwrap_or_else(|| "https".to_string());
        if !matches!(url_scheme.as_str(), "http" | "https") {
            return Err(ResolverError::Config(format!(
                "URL_SCHEME must be http or https, got {url_scheme:?}"
            )));
        }

        Ok(Self {
            database_url: var("DATABASE_URL"),
            pages_query: var("PAGES_QUERY").unwrap_or_else(|| DEFAULT_PAGES_QUERY.to_string()),
            domains_query: var("DOMAINS_QUERY")
                .unwrap_or_else(|| DEFAULT_DOMAINS_QUERY.to_string()),
            url_scheme,
        })
    }
}
