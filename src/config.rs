use chrono::Duration;
use serde::Deserialize;

const DEV_JWT_SECRET: &str = "watchlist-dev-secret";

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL database connection URL. In-memory stores are used when unset.
    #[serde(default)]
    pub database_url: Option<String>,

    /// TMDB API key. Media lookups are disabled when unset.
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL prepended to TMDB poster paths
    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,

    /// Secret used to sign bearer tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Bearer token lifetime in hours
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Comma-separated list of allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: String,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_jwt_secret() -> String {
    DEV_JWT_SECRET.to_string()
}

fn default_token_ttl_hours() -> i64 {
    24 * 7
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        config.token_ttl()?;

        if config.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!("JWT_SECRET not set, using the development secret");
        }

        Ok(config)
    }

    /// Bearer token lifetime; must be positive and within chrono's range
    pub fn token_ttl(&self) -> anyhow::Result<Duration> {
        if self.token_ttl_hours <= 0 {
            anyhow::bail!(
                "TOKEN_TTL_HOURS must be positive, got {}",
                self.token_ttl_hours
            );
        }

        Duration::try_hours(self.token_ttl_hours).ok_or_else(|| {
            anyhow::anyhow!("TOKEN_TTL_HOURS is out of range: {}", self.token_ttl_hours)
        })
    }

    /// Allowed CORS origins, trimmed and without empty items
    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.token_ttl_hours, 168);
        assert_eq!(config.port, 5001);
        assert!(config.allowed_origins().is_empty());
        assert_eq!(config.token_ttl().unwrap(), Duration::days(7));
    }

    #[test]
    fn test_token_ttl_must_be_positive_and_in_range() {
        for hours in ["0", "-2", "9223372036854775807"] {
            let config: Config = envy::from_iter(vec![(
                "TOKEN_TTL_HOURS".to_string(),
                hours.to_string(),
            )])
            .unwrap();
            assert!(config.token_ttl().is_err(), "accepted {} hours", hours);
        }
    }

    #[test]
    fn test_allowed_origins_parsing() {
        let config: Config = envy::from_iter(vec![(
            "CORS_ORIGINS".to_string(),
            "http://localhost:5173, https://example.app ,".to_string(),
        )])
        .unwrap();

        assert_eq!(
            config.allowed_origins(),
            vec!["http://localhost:5173", "https://example.app"]
        );
    }
}
