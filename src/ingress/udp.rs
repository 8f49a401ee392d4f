//! UDP ingress: one socket, a bounded work queue, and N worker tasks
//! (N = hardware threads) draining it. The receiver blocks (with a log
//! line) rather than silently dropping when the queue is full; the
//! kernel's socket buffer absorbs the resulting burst.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::{broadcast, mpsc, Mutex};

use crate::dns::Transport;
use crate::error::BindError;
use crate::logger::Logger;
use crate::pool::BufferPool;
use crate::resolver::Resolver;

/// Receive MTU-sized buffer; 2400 bytes covers the DNS/TCP maximum
/// with headroom, matching the reference's over-allocation.
const UDP_BUFFER_SIZE: usize = 2400;

struct UdpWorkItem {
    client_addr: SocketAddr,
    buffer: crate::pool::PooledItem<Vec<u8>>,
    length: usize,
}

pub struct UdpIngress {
    socket: Arc<UdpSocket>,
    resolver: Arc<Resolver>,
    buffer_pool: BufferPool,
    queue_size: usize,
    ops_counter: Arc<AtomicU64>,
    logger: Logger,
}

impl UdpIngress {
    /// The address actually bound, useful when `bind` was called with
    /// an ephemeral port (`:0`).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub async fn bind(
        addr: SocketAddr,
        resolver: Arc<Resolver>,
        queue_size: usize,
        logger: Logger,
    ) -> Result<Self, BindError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| BindError::Io { addr, source })?;
        Ok(Self {
            socket: Arc::new(socket),
            resolver,
            buffer_pool: BufferPool::new(UDP_BUFFER_SIZE, queue_size.min(4096)),
            queue_size,
            ops_counter: Arc::new(AtomicU64::new(0)),
            logger,
        })
    }

    /// Runs the receiver loop and worker pool until `shutdown` fires.
    /// Does not drain in-flight work on shutdown.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let worker_count = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let (tx, rx) = mpsc::channel::<UdpWorkItem>(self.queue_size);
        let rx = Arc::new(Mutex::new(rx));

        let mut workers = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let rx = rx.clone();
            let socket = self.socket.clone();
            let resolver = self.resolver.clone();
            let ops_counter = self.ops_counter.clone();
            let logger = self.logger.clone();
            workers.push(tokio::spawn(async move {
                loop {
                    let item = {
                        let mut guard = rx.lock().await;
                        guard.recv().await
                    };
                    let Some(item) = item else { break };
                    match resolver.solve(&item.buffer[..item.length], Transport::Udp).await {
                        Ok(reply) => {
                            if let Err(e) = socket.send_to(&reply, item.client_addr).await {
                                logger.err(&format!("failed to send UDP reply to {}: {e}", item.client_addr));
                            }
                        }
                        Err(e) => logger.err(&format!("failed to resolve UDP query from {}: {e}", item.client_addr)),
                    }
                    ops_counter.fetch_add(1, Ordering::Relaxed);
                }
            }));
        }

        loop {
            let mut buffer = self.buffer_pool.get();
            tokio::select! {
                received = self.socket.recv_from(&mut buffer) => {
                    match received {
                        Ok((length, client_addr)) => {
                            let item = UdpWorkItem { client_addr, buffer, length };
                            match tx.try_send(item) {
                                Ok(()) => {}
                                Err(mpsc::error::TrySendError::Full(item)) => {
                                    self.logger.err("UDP work queue full, blocking receiver");
                                    if tx.send(item).await.is_err() {
                                        break;
                                    }
                                }
                                Err(mpsc::error::TrySendError::Closed(_)) => break,
                            }
                        }
                        Err(e) => self.logger.err(&format!("UDP recv_from failed: {e}")),
                    }
                }
                _ = shutdown.recv() => break,
            }
        }

        drop(tx);
        for worker in workers {
            let _ = worker.await;
        }
        self.logger
            .info(&format!("UDP ingress shut down, {} operations handled", self.ops_counter.load(Ordering::Relaxed)));
    }
}
