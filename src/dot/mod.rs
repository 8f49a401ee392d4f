//! DNS-over-TLS client: one short-lived TLS connection per query to
//! the configured upstream, a single length-prefixed write, a single
//! length-prefixed read under a deadline, then close.
//!
//! Deliberately does not pool or reuse connections: one connection per
//! query is simple and stateless, trading throughput for the absence
//! of head-of-line blocking and stale-connection bookkeeping.
//! Connection reuse is a valid extension, not part of the contract
//! this client implements.

mod trust;

use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_rustls::TlsConnector;

use crate::config::TrustStrategy;
use crate::logger::Logger;

pub use trust::{harvest_peer_roots, pinned_roots};

/// The DNS/TCP protocol maximum message size (a 16-bit length prefix).
const MAX_TCP_MESSAGE: usize = 65535;

#[derive(Error, Debug)]
pub enum DotError {
    #[error("failed to connect to upstream {host}:{port}: {source}")]
    Dial {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("TLS handshake with upstream {host}:{port} failed: {source}")]
    Handshake {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write request to upstream: {0}")]
    Write(std::io::Error),
    #[error("failed to read reply from upstream: {0}")]
    Read(std::io::Error),
    #[error("reading reply from upstream timed out after {0:?}")]
    Timeout(Duration),
    #[error("trust anchor error: {0}")]
    Trust(String),
}

/// One-shot DoT client dialing a single configured upstream.
pub struct DotClient {
    host: String,
    port: u16,
    read_timeout: Duration,
    trust_strategy: TrustStrategy,
    logger: Logger,
}

impl DotClient {
    pub fn new(host: String, port: u16, read_timeout: Duration, trust_strategy: TrustStrategy, logger: Logger) -> Self {
        Self {
            host,
            port,
            read_timeout,
            trust_strategy,
            logger,
        }
    }

    async fn root_store(&self) -> Result<RootCertStore, DotError> {
        match self.trust_strategy {
            TrustStrategy::Pinned => Ok(pinned_roots()),
            TrustStrategy::PeerObserved => {
                self.logger
                    .debug(&format!("harvesting peer roots from {}:{}", self.host, self.port));
                harvest_peer_roots(&self.host, self.port).await
            }
        }
    }

    /// Dials the upstream, writes `tcp_wire_request` verbatim, and
    /// returns the TCP-framed reply bytes read back. The caller
    /// supplies TCP framing on the way in; the return value is framed
    /// the same way.
    pub async fn resolve(&self, tcp_wire_request: &[u8]) -> Result<Vec<u8>, DotError> {
        let roots = self.root_store().await?;
        let client_config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        let connector = TlsConnector::from(Arc::new(client_config));

        let tcp = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|source| DotError::Dial {
                host: self.host.clone(),
                port: self.port,
                source,
            })?;

        let server_name = ServerName::try_from(self.host.clone())
            .map_err(|_| DotError::Trust(format!("{:?} is not a valid DNS name or IP address", self.host)))?;

        let mut stream = connector
            .connect(server_name, tcp)
            .await
            .map_err(|source| DotError::Handshake {
                host: self.host.clone(),
                port: self.port,
                source,
            })?;

        let deadline = Instant::now() + self.read_timeout;

        tokio::time::timeout_at(deadline, stream.write_all(tcp_wire_request))
            .await
            .map_err(|_| DotError::Timeout(self.read_timeout))?
            .map_err(DotError::Write)?;

        let mut len_buf = [0u8; 2];
        tokio::time::timeout_at(deadline, stream.read_exact(&mut len_buf))
            .await
            .map_err(|_| DotError::Timeout(self.read_timeout))?
            .map_err(DotError::Read)?;
        let body_len = u16::from_be_bytes(len_buf) as usize;
        if body_len > MAX_TCP_MESSAGE {
            return Err(DotError::Read(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("upstream reply length {body_len} exceeds the TCP/DNS maximum"),
            )));
        }

        let mut body = vec![0u8; body_len];
        tokio::time::timeout_at(deadline, stream.read_exact(&mut body))
            .await
            .map_err(|_| DotError::Timeout(self.read_timeout))?
            .map_err(DotError::Read)?;

        let _ = stream.shutdown().await;

        let mut reply = Vec::with_capacity(2 + body_len);
        reply.extend_from_slice(&len_buf);
        reply.extend_from_slice(&body);
        Ok(reply)
    }
}
