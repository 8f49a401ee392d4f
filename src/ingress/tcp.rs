//! TCP ingress: one listener, a per-connection task per accepted
//! stream, and an atomic counter gating admission at `max_pool`. An
//! over-cap connection is accepted then closed immediately rather than
//! spinning on the counter before `accept()`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use crate::dns::Transport;
use crate::error::BindError;
use crate::logger::Logger;
use crate::resolver::Resolver;

/// The DNS/TCP protocol maximum message size plus its 2-byte length prefix.
const TCP_BUFFER_SIZE: usize = 65535 + 2;

pub struct TcpIngress {
    listener: TcpListener,
    resolver: Arc<Resolver>,
    max_conn: usize,
    conn_counter: Arc<AtomicUsize>,
    logger: Logger,
}

impl TcpIngress {
    /// The address actually bound, useful when `bind` was called with
    /// an ephemeral port (`:0`).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn bind(addr: SocketAddr, resolver: Arc<Resolver>, max_conn: usize, logger: Logger) -> Result<Self, BindError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| BindError::Io { addr, source })?;
        Ok(Self {
            listener,
            resolver,
            max_conn,
            conn_counter: Arc::new(AtomicUsize::new(0)),
            logger,
        })
    }

    /// Accepts connections until `shutdown` fires. Never decrements the
    /// connection counter below zero: it is only ever decremented once
    /// per connection that was admitted (incremented).
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer_addr)) => self.admit(stream, peer_addr),
                        Err(e) => self.logger.err(&format!("TCP accept failed: {e}")),
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
        self.logger.info("TCP ingress shutting down");
    }

    fn admit(&self, stream: TcpStream, peer_addr: SocketAddr) {
        if self.conn_counter.load(Ordering::Acquire) >= self.max_conn {
            self.logger
                .err(&format!("TCP connection cap ({}) reached, closing {peer_addr}", self.max_conn));
            drop(stream);
            return;
        }
        self.conn_counter.fetch_add(1, Ordering::AcqRel);

        let resolver = self.resolver.clone();
        let conn_counter = self.conn_counter.clone();
        let logger = self.logger.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &resolver).await {
                logger.err(&format!("TCP connection from {peer_addr} failed: {e}"));
            }
            conn_counter.fetch_sub(1, Ordering::AcqRel);
        });
    }
}

async fn handle_connection(mut stream: TcpStream, resolver: &Resolver) -> std::io::Result<()> {
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;
    let body_len = u16::from_be_bytes(len_buf) as usize;
    if body_len + 2 > TCP_BUFFER_SIZE {
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "message exceeds TCP/DNS maximum"));
    }

    let mut body = vec![0u8; body_len];
    stream.read_exact(&mut body).await?;

    let mut request = Vec::with_capacity(2 + body_len);
    request.extend_from_slice(&len_buf);
    request.extend_from_slice(&body);

    match resolver.solve(&request, Transport::Tcp).await {
        Ok(reply) => stream.write_all(&reply).await,
        Err(e) => Err(std::io::Error::other(e.to_string())),
    }
}
