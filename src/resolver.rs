//! The resolver service: the single entry point shared by both
//! ingresses. Decodes the inbound request, normalizes it to the TCP
//! framing the upstream speaks, consults the cache, forwards a miss to
//! the DoT client, stores the parsed reply, and re-encodes the reply
//! under whichever transport the caller used.

use std::sync::Arc;

use crate::cache::Cache;
use crate::dns::{self, Transport};
use crate::dot::DotClient;
use crate::error::ProxyError;
use crate::logger::Logger;
use crate::metrics::Metrics;

pub struct Resolver {
    cache: Arc<Cache>,
    dot: Arc<DotClient>,
    metrics: Option<Arc<Metrics>>,
    logger: Logger,
}

impl Resolver {
    pub fn new(cache: Arc<Cache>, dot: Arc<DotClient>, metrics: Option<Arc<Metrics>>, logger: Logger) -> Self {
        Self { cache, dot, metrics, logger }
    }

    /// Resolves one request. `request` is the raw bytes as received,
    /// framed per `transport`; the returned bytes are framed the same way.
    pub async fn solve(&self, request: &[u8], transport: Transport) -> Result<Vec<u8>, ProxyError> {
        let msg = match transport {
            Transport::Udp => dns::decode_udp(request)?,
            Transport::Tcp => dns::decode_tcp(request)?,
        };

        for q in &msg.questions {
            self.logger.info(&format!("query {} {:?}", q.name.join("."), q.qtype));
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_query(match transport {
                Transport::Udp => "udp",
                Transport::Tcp => "tcp",
            });
        }

        if let Some(mut cached) = self.cache.get(&msg) {
            cached.header.id = msg.header.id;
            if let Some(metrics) = &self.metrics {
                metrics.record_cache_hit();
            }
            return Ok(dns::encode(&cached, transport)?);
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_cache_miss();
        }

        let tcp_request = dns::encode(&msg, Transport::Tcp)?;
        let tcp_reply = match self.dot.resolve(&tcp_request).await {
            Ok(reply) => reply,
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_upstream_error();
                }
                return Err(e.into());
            }
        };
        let reply = dns::decode_tcp(&tcp_reply)?;

        if let Err(e) = self.cache.store(reply.clone()) {
            self.logger.err(&format!("failed to cache reply: {e}"));
        }

        Ok(dns::encode(&reply, transport)?)
    }
}
