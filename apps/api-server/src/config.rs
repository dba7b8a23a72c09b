//! Application configuration loaded from environment variables.

use std::env;

use folio_infra::auth::GoogleConfig;
#[cfg(feature = "postgres")]
use folio_infra::database::DatabaseConfig;

/// Public site settings used by the feeds.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Absolute site URL without a trailing slash.
    pub url: String,
    pub title: String,
    pub description: String,
}

impl SiteConfig {
    pub fn from_env() -> Self {
        Self {
            url: env::var("SITE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            title: env::var("SITE_TITLE").unwrap_or_else(|_| "Folio".to_string()),
            description: env::var("SITE_DESCRIPTION")
                .unwrap_or_else(|_| "Latest articles and notes".to_string()),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub site: SiteConfig,
    pub google: Option<GoogleConfig>,
    /// Seeded into the allow-list as `master` at startup.
    pub master_email: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            site: SiteConfig::from_env(),
            google: GoogleConfig::from_env(),
            master_email: env::var("MASTER_EMAIL").ok().filter(|e| !e.trim().is_empty()),
        }
    }
}
