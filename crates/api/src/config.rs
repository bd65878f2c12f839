//! Runtime configuration read from environment variables.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be set when {reason}")]
    Missing { name: &'static str, reason: &'static str },

    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Dormant version operations; each is routed only when enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionRoutes {
    pub create: bool,
    pub update: bool,
    pub delete: bool,
    pub list: bool,
    pub detail: bool,
}

impl VersionRoutes {
    pub fn all() -> Self {
        Self {
            create: true,
            update: true,
            delete: true,
            list: true,
            detail: true,
        }
    }

    pub fn any(&self) -> bool {
        self.create || self.update || self.delete || self.list || self.detail
    }

    /// Parse a comma list such as `create,list` or `all`.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let mut routes = Self::default();
        for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "all" => routes = Self::all(),
                "create" => routes.create = true,
                "update" => routes.update = true,
                "delete" => routes.delete = true,
                "list" => routes.list = true,
                "detail" => routes.detail = true,
                other => {
                    return Err(ConfigError::Invalid {
                        name: "VERSION_ROUTES",
                        value: value.to_string(),
                        reason: format!("unknown operation `{other}`"),
                    });
                }
            }
        }
        Ok(routes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub caches_enabled: bool,
    /// Redis URL for the shared cache; in-process cache when unset.
    pub cache_location: Option<String>,
    pub detail_cache_ttl: Duration,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    pub version_routes: VersionRoutes,
}

impl AppConfig {
    /// In-memory defaults around the given JWT secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            jwt_secret: jwt_secret.into(),
            caches_enabled: false,
            cache_location: None,
            detail_cache_ttl: Duration::from_secs(60),
            use_persistent_stores: false,
            database_url: None,
            version_routes: VersionRoutes::default(),
        }
    }

    pub fn with_caches(mut self, enabled: bool) -> Self {
        self.caches_enabled = enabled;
        self
    }

    pub fn with_version_routes(mut self, routes: VersionRoutes) -> Self {
        self.version_routes = routes;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });
        let mut config = Self::new(jwt_secret);

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        config.caches_enabled = lookup("CACHES_ENABLE").is_some_and(|v| parse_flag(&v));
        config.cache_location = lookup("CACHE_LOCATION").filter(|v| !v.trim().is_empty());

        if let Some(raw) = lookup("DETAIL_CACHE_SECONDS") {
            let seconds = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "DETAIL_CACHE_SECONDS",
                value: raw.clone(),
                reason: e.to_string(),
            })?;
            config.detail_cache_ttl = Duration::from_secs(seconds);
        }

        config.use_persistent_stores = lookup("USE_PERSISTENT_STORES").is_some_and(|v| parse_flag(&v));
        config.database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if config.use_persistent_stores && config.database_url.is_none() {
            return Err(ConfigError::Missing {
                name: "DATABASE_URL",
                reason: "USE_PERSISTENT_STORES=true",
            });
        }

        if let Some(raw) = lookup("VERSION_ROUTES") {
            config.version_routes = VersionRoutes::parse(&raw)?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_are_in_memory_without_caches() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert!(!config.caches_enabled);
        assert!(!config.use_persistent_stores);
        assert_eq!(config.detail_cache_ttl, Duration::from_secs(60));
        assert!(!config.version_routes.any());
    }

    #[test]
    fn caches_enable_accepts_python_style_true() {
        let config = AppConfig::from_lookup(lookup(&[("CACHES_ENABLE", "True")])).unwrap();
        assert!(config.caches_enabled);
        let config = AppConfig::from_lookup(lookup(&[("CACHES_ENABLE", "False")])).unwrap();
        assert!(!config.caches_enabled);
    }

    #[test]
    fn persistent_stores_require_database_url() {
        let err = AppConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "true")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { name: "DATABASE_URL", .. }));
    }

    #[test]
    fn bad_detail_ttl_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("DETAIL_CACHE_SECONDS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DETAIL_CACHE_SECONDS", .. }));
    }

    #[test]
    fn version_routes_parse_lists_and_all() {
        let routes = VersionRoutes::parse("create, list").unwrap();
        assert!(routes.create && routes.list);
        assert!(!routes.update && !routes.delete && !routes.detail);
        assert_eq!(VersionRoutes::parse("ALL").unwrap(), VersionRoutes::all());
        assert!(VersionRoutes::parse("publish").is_err());
    }
}
