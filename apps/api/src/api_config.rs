use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use ergon_core::AppError;
use tracing_subscriber::EnvFilter;

/// Storage used to memoize resolved action sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionCacheBackend {
    InMemory,
    Redis,
}

impl PermissionCacheBackend {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim() {
            "in_memory" => Ok(Self::InMemory),
            "redis" => Ok(Self::Redis),
            other => Err(AppError::Validation(format!(
                "PERMISSION_CACHE_BACKEND must be either 'in_memory' or 'redis', got '{other}'"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InMemory => "in_memory",
            Self::Redis => "redis",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub redis_url: Option<String>,
    pub permission_cache_backend: PermissionCacheBackend,
    pub permission_cache_ttl_seconds: u32,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_non_empty_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let redis_url = env::var("REDIS_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let permission_cache_backend = PermissionCacheBackend::parse(
            env::var("PERMISSION_CACHE_BACKEND")
                .unwrap_or_else(|_| "in_memory".to_owned())
                .as_str(),
        )?;
        let permission_cache_ttl_seconds = parse_cache_ttl(
            env::var("PERMISSION_CACHE_TTL_SECONDS").ok().as_deref(),
        )?;

        if permission_cache_backend == PermissionCacheBackend::Redis && redis_url.is_none() {
            return Err(AppError::Validation(
                "REDIS_URL is required when PERMISSION_CACHE_BACKEND=redis".to_owned(),
            ));
        }

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            redis_url,
            permission_cache_backend,
            permission_cache_ttl_seconds,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    /// Cache backend serving permission lookups, or `disabled` when the ttl is zero.
    pub fn permission_cache_mode(&self) -> &'static str {
        if self.permission_cache_ttl_seconds == 0 {
            return "disabled";
        }

        self.permission_cache_backend.as_str()
    }

    /// Redis backs health checks only when it actually serves the cache.
    pub fn redis_required(&self) -> bool {
        self.permission_cache_backend == PermissionCacheBackend::Redis
            && self.permission_cache_ttl_seconds > 0
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_cache_ttl(value: Option<&str>) -> Result<u32, AppError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(0),
        Some(value) => value.parse::<u32>().map_err(|error| {
            AppError::Validation(format!(
                "invalid PERMISSION_CACHE_TTL_SECONDS '{value}': {error}"
            ))
        }),
    }
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(backend: PermissionCacheBackend, ttl: u32) -> ApiConfig {
        ApiConfig {
            migrate_only: false,
            database_url: "postgres://localhost/ergon".to_owned(),
            frontend_url: "http://localhost:3000".to_owned(),
            api_host: "127.0.0.1".to_owned(),
            api_port: 3001,
            redis_url: Some("redis://127.0.0.1:6379".to_owned()),
            permission_cache_backend: backend,
            permission_cache_ttl_seconds: ttl,
        }
    }

    #[test]
    fn cache_backend_parses_known_values() {
        assert_eq!(
            PermissionCacheBackend::parse("in_memory").ok(),
            Some(PermissionCacheBackend::InMemory)
        );
        assert_eq!(
            PermissionCacheBackend::parse(" redis ").ok(),
            Some(PermissionCacheBackend::Redis)
        );
        assert!(matches!(
            PermissionCacheBackend::parse("memcached"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn cache_ttl_defaults_to_disabled() {
        assert_eq!(parse_cache_ttl(None).ok(), Some(0));
        assert_eq!(parse_cache_ttl(Some("  ")).ok(), Some(0));
        assert_eq!(parse_cache_ttl(Some("30")).ok(), Some(30));
        assert!(matches!(
            parse_cache_ttl(Some("-5")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn socket_address_rejects_hostnames() {
        let mut api_config = config(PermissionCacheBackend::InMemory, 0);
        assert!(api_config.socket_address().is_ok());

        api_config.api_host = "localhost".to_owned();
        assert!(matches!(
            api_config.socket_address(),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn redis_is_required_only_for_an_enabled_redis_cache() {
        assert!(config(PermissionCacheBackend::Redis, 60).redis_required());
        assert!(!config(PermissionCacheBackend::Redis, 0).redis_required());
        assert!(!config(PermissionCacheBackend::InMemory, 60).redis_required());
    }

    #[test]
    fn permission_cache_mode_reports_disabled_for_zero_ttl() {
        assert_eq!(
            config(PermissionCacheBackend::Redis, 0).permission_cache_mode(),
            "disabled"
        );
        assert_eq!(
            config(PermissionCacheBackend::InMemory, 30).permission_cache_mode(),
            "in_memory"
        );
        assert_eq!(
            config(PermissionCacheBackend::Redis, 30).permission_cache_mode(),
            "redis"
        );
    }
}
