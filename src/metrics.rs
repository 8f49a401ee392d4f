//! Metrics: a small `prometheus::Registry` covering cache
//! hits/misses, queries handled per transport, and upstream errors.
//! Far smaller than the teacher's `DnsMetrics` (no blocking, DNSSEC,
//! zone, or cluster subsystems exist here to instrument). Exposed for
//! scraping, not required by any invariant this proxy upholds.

use prometheus::{opts, CounterVec, Encoder, IntCounter, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    cache_hits: IntCounter,
    cache_misses: IntCounter,
    queries_total: CounterVec,
    upstream_errors: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cache_hits = IntCounter::with_opts(opts!("tollgate_cache_hits_total", "Total number of cache hits"))?;
        let cache_misses = IntCounter::with_opts(opts!("tollgate_cache_misses_total", "Total number of cache misses"))?;
        let queries_total = CounterVec::new(
            opts!("tollgate_queries_total", "Total number of queries handled, by transport"),
            &["transport"],
        )?;
        let upstream_errors = IntCounter::with_opts(opts!(
            "tollgate_upstream_errors_total",
            "Total number of failures reaching the upstream resolver"
        ))?;

        registry.register(Box::new(cache_hits.clone()))?;
        registry.register(Box::new(cache_misses.clone()))?;
        registry.register(Box::new(queries_total.clone()))?;
        registry.register(Box::new(upstream_errors.clone()))?;

        Ok(Self {
            registry,
            cache_hits,
            cache_misses,
            queries_total,
            upstream_errors,
        })
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.inc();
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.inc();
    }

    pub fn record_query(&self, transport: &str) {
        self.queries_total.with_label_values(&[transport]).inc();
    }

    pub fn record_upstream_error(&self) {
        self.upstream_errors.inc();
    }

    /// Renders the current state of the registry in Prometheus text
    /// exposition format, for a scrape endpoint to return verbatim.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
