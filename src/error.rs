//! Error taxonomy: one `thiserror`-derived enum per concern, plus a
//! small aggregate for call sites (the resolver, `main`) that need to
//! unify several of them. Mirrors the teacher's `heimdall_error.rs`
//! approach of deriving `Error` per variant rather than hand-writing
//! `fmt::Display`, scoped down to the handful of kinds this proxy
//! actually reaches.

use thiserror::Error;

use crate::dns::{DecodeError, EncodeError};
use crate::dot::DotError;

/// Missing or unparseable configuration at startup. Fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("unknown trust strategy {0:?}, expected \"pinned\" or \"peer-observed\"")]
    InvalidTrustStrategy(String),
    #[error("unknown log level {0:?}")]
    InvalidLogLevel(String),
}

/// A listener could not be bound at startup. Fatal.
#[derive(Error, Debug)]
pub enum BindError {
    #[error("failed to bind {addr}: {source}")]
    Io {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Everything that can go wrong resolving a single request, surfaced to
/// the ingress that invoked [`crate::resolver::Resolver::solve`]. Cache
/// errors are deliberately absent: a cache failure is logged and
/// swallowed, never propagated to the caller.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Dot(#[from] DotError),
}

// `CacheError` (defined in `crate::cache`) is deliberately not a variant
// here: a cache failure is logged and swallowed at the call site, never
// converted into the request's error type.
