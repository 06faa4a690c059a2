use std::{
    env, fmt::Display, net::SocketAddr, num::NonZeroUsize, path::PathBuf, str::FromStr,
    time::Duration,
};

use anyhow::{Context, Result};
use tracing::info;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_INDEX_CACHE_SECONDS: &str = "20";
const DEFAULT_INDEX_CACHE_CAPACITY: &str = "1000";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub media_root: PathBuf,
    /// How long the rendered list feed is served from the page cache.
    pub index_cache_ttl: Duration,
    /// Most rendered pages held at once; the least recently used go first.
    pub index_cache_capacity: NonZeroUsize,
}

impl Config {
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            index_cache_ttl: Duration::from_secs(20),
            index_cache_capacity: NonZeroUsize::new(1000).unwrap_or(NonZeroUsize::MIN),
        }
    }

    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let bind_addr = try_load("BIND_ADDR", DEFAULT_BIND_ADDR)?;
        let media_root = try_load::<PathBuf>("MEDIA_ROOT", DEFAULT_MEDIA_ROOT)?;
        let cache_seconds = try_load::<u64>("INDEX_CACHE_SECONDS", DEFAULT_INDEX_CACHE_SECONDS)?;
        let index_cache_capacity =
            try_load::<NonZeroUsize>("INDEX_CACHE_CAPACITY", DEFAULT_INDEX_CACHE_CAPACITY)?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            media_root,
            index_cache_ttl: Duration::from_secs(cache_seconds),
            index_cache_capacity,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value {raw:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_public_site() {
        let config = Config::new("sqlite://test.db", "secret");
        assert_eq!(config.index_cache_ttl, Duration::from_secs(20));
        assert_eq!(config.bind_addr.port(), 3001);
        assert_eq!(config.media_root, PathBuf::from("media"));
        assert_eq!(config.index_cache_capacity.get(), 1000);
    }

    #[test]
    fn zero_cache_capacity_is_rejected() {
        env::set_var("YATUBE_TEST_ZERO_CAPACITY", "0");
        let result = try_load::<NonZeroUsize>("YATUBE_TEST_ZERO_CAPACITY", "1000");
        assert!(result.is_err());
    }

    #[test]
    fn try_load_rejects_garbage() {
        env::set_var("YATUBE_TEST_BAD_PORT", "not-a-number");
        let result = try_load::<u16>("YATUBE_TEST_BAD_PORT", "1");
        assert!(result.is_err());
    }

    #[test]
    fn try_load_falls_back_to_default() {
        let value = try_load::<u64>("YATUBE_TEST_UNSET_VALUE", "42").unwrap();
        assert_eq!(value, 42);
    }
}
