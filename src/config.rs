//! Process configuration, loaded from the `TOLLGATE_*` environment
//! variables. Follows the teacher's `Default` baseline +
//! `from_env()` overlay pattern: start from a fully-populated default,
//! then override each field whose variable is present, rejecting an
//! unparseable value with a `ConfigError` rather than silently falling
//! back to the default.
//!
//! Unlike the teacher's `DnsConfig` (recursive resolution, DNSSEC,
//! zones, blocklists, Redis, cluster discovery — none of which this
//! proxy implements), this `Config` carries only the fields the
//! forwarding path and its ambient stack actually consume.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ConfigError;

/// Which TLS trust-anchor strategy the DoT client dials upstream with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustStrategy {
    /// Compiled-in root set (`webpki-roots`), the secure default.
    Pinned,
    /// Harvest the peer's certificate chain over an unverified
    /// connection and trust it for the verified connection that
    /// follows. Not a secure default.
    PeerObserved,
}

impl TrustStrategy {
    fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "pinned" => Ok(Self::Pinned),
            "peer-observed" => Ok(Self::PeerObserved),
            other => Err(ConfigError::InvalidTrustStrategy(other.to_string())),
        }
    }
}

/// Minimum emitted log severity, mapped onto a `tracing_subscriber::EnvFilter` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(ConfigError::InvalidLogLevel(other.to_string())),
        }
    }

    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub provider_host: String,
    pub provider_port: u16,
    pub resolver_timeout: Duration,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub tcp_max_conn_pool: usize,
    pub udp_max_queue_size: usize,
    pub trust_strategy: TrustStrategy,
    pub log_level: LogLevel,
    pub admin_bind_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 53,
            provider_host: "1.1.1.1".to_string(),
            provider_port: 853,
            resolver_timeout: Duration::from_millis(2000),
            cache_enabled: true,
            cache_ttl: Duration::from_secs(300),
            tcp_max_conn_pool: 512,
            udp_max_queue_size: 4096,
            trust_strategy: TrustStrategy::Pinned,
            log_level: LogLevel::Info,
            admin_bind_addr: "127.0.0.1:8080".parse().expect("valid default admin addr"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("TOLLGATE_PORT") {
            config.port = parse_env("TOLLGATE_PORT", &v)?;
        }

        if let Ok(v) = std::env::var("TOLLGATE_PROVIDER_HOST") {
            config.provider_host = v;
        }

        if let Ok(v) = std::env::var("TOLLGATE_PROVIDER_PORT") {
            config.provider_port = parse_env("TOLLGATE_PROVIDER_PORT", &v)?;
        }

        if let Ok(v) = std::env::var("TOLLGATE_RESOLVER_TIMEOUT_MS") {
            let ms: u64 = parse_env("TOLLGATE_RESOLVER_TIMEOUT_MS", &v)?;
            config.resolver_timeout = Duration::from_millis(ms);
        }

        if let Ok(v) = std::env::var("TOLLGATE_CACHE_ENABLED") {
            config.cache_enabled = parse_bool(&v, config.cache_enabled);
        }

        if let Ok(v) = std::env::var("TOLLGATE_CACHE_TTL_SECS") {
            let secs: u64 = parse_env("TOLLGATE_CACHE_TTL_SECS", &v)?;
            config.cache_ttl = Duration::from_secs(secs);
        }

        if let Ok(v) = std::env::var("TOLLGATE_TCP_MAX_CONN_POOL") {
            config.tcp_max_conn_pool = parse_env("TOLLGATE_TCP_MAX_CONN_POOL", &v)?;
        }

        if let Ok(v) = std::env::var("TOLLGATE_UDP_MAX_QUEUE_SIZE") {
            config.udp_max_queue_size = parse_env("TOLLGATE_UDP_MAX_QUEUE_SIZE", &v)?;
        }

        if let Ok(v) = std::env::var("TOLLGATE_TRUST_STRATEGY") {
            config.trust_strategy = TrustStrategy::parse(&v)?;
        }

        if let Ok(v) = std::env::var("TOLLGATE_LOG_LEVEL") {
            config.log_level = LogLevel::parse(&v)?;
        }

        if let Ok(v) = std::env::var("TOLLGATE_ADMIN_BIND_ADDR") {
            config.admin_bind_addr = v.parse().map_err(|_| ConfigError::InvalidValue {
                var: "TOLLGATE_ADMIN_BIND_ADDR",
                value: v,
            })?;
        }

        Ok(config)
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}
