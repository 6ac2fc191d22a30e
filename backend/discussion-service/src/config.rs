/// Configuration management for Discussion Service
///
/// Loads configuration from environment variables (and `.env` in local
/// development).
use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Which comment store backs the service
    pub storage: StorageBackend,
    /// Database configuration (postgres storage only)
    pub database: DatabaseConfig,
    /// Request handling defaults
    pub service: ServiceConfig,
    /// GraphQL configuration
    pub graphql: GraphQLConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => Err(anyhow!("unknown STORAGE_TYPE: {}", other)),
        }
    }
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Deadline for a single store operation
    pub request_timeout_ms: u64,
    /// Page size when the client does not pass `first`
    pub default_page_size: usize,
    /// Upper bound applied to `first`
    pub max_page_size: usize,
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5000,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphQLConfig {
    /// Enable introspection queries
    pub introspection: bool,
}

// Default values
fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server = ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT").unwrap_or(8080),
        };

        let storage: StorageBackend = env::var("STORAGE_TYPE")
            .unwrap_or_default()
            .parse()
            .context("invalid STORAGE_TYPE")?;

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").ok(),
            max_connections: parse_env("DB_MAX_CONNECTIONS")
                .unwrap_or_else(default_max_connections),
            min_connections: parse_env("DB_MIN_CONNECTIONS")
                .unwrap_or_else(default_min_connections),
            acquire_timeout_secs: parse_env("DB_ACQUIRE_TIMEOUT_SECS").unwrap_or(5),
        };

        if storage == StorageBackend::Postgres && database.url.is_none() {
            return Err(anyhow!(
                "DATABASE_URL environment variable not set (required for STORAGE_TYPE=postgres)"
            ));
        }

        let defaults = ServiceConfig::default();
        let service = ServiceConfig {
            request_timeout_ms: parse_env("REQUEST_TIMEOUT_MS")
                .unwrap_or(defaults.request_timeout_ms),
            default_page_size: parse_env("DEFAULT_PAGE_SIZE")
                .unwrap_or(defaults.default_page_size),
            max_page_size: parse_env("MAX_PAGE_SIZE").unwrap_or(defaults.max_page_size),
        };

        let graphql = GraphQLConfig {
            introspection: parse_env("GRAPHQL_INTROSPECTION").unwrap_or(true),
        };

        Ok(Config {
            server,
            storage,
            database,
            service,
            graphql,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
