//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

/// Default query-string key carrying the requested listing page.
pub const DEFAULT_PAGE_KEY: &str = "page";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Query-string key used for the listing page number (default: "page").
    pub page_key: String,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let page_key = env::var("PAGE_KEY")
            .map(|v| v.trim().to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PAGE_KEY.to_string());

        let cors_allowed_origins = parse_origins(env::var("CORS_ALLOWED_ORIGINS").ok());

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            page_key,
            cors_allowed_origins,
        })
    }
}

fn parse_origins(raw: Option<String>) -> Vec<String> {
    let origins: Vec<String> = raw
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}
