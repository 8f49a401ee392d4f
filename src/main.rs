//! Process entry point: loads configuration, wires the cache, DoT
//! client, resolver, metrics, and denylist service, then spawns the UDP
//! ingress, TCP ingress, cache sweeper, and admin HTTP server as
//! independent tasks sharing one shutdown signal. Grounded on the
//! teacher's `server.rs` (`run_udp_server`/`run_tcp_server`, each taking
//! a `broadcast::Receiver<()>` and selecting on it against their accept
//! loop) and `bin/stress_test.rs` (`tracing_subscriber::fmt().with_env_filter(...).init()`).

use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::broadcast;
use tollgate::cache::Cache;
use tollgate::config::Config;
use tollgate::denylist::{Repository as DenylistRepository, Service as DenylistService};
use tollgate::dot::DotClient;
use tollgate::http_server::HttpServer;
use tollgate::ingress::{tcp::TcpIngress, udp::UdpIngress};
use tollgate::logger::Logger;
use tollgate::metrics::Metrics;
use tollgate::resolver::Resolver;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt().with_env_filter(config.log_level.as_filter()).init();

    let main_logger = Logger::new("MAIN");
    main_logger.info(&format!("starting on port {} -> {}:{}", config.port, config.provider_host, config.provider_port));

    let cache = Arc::new(Cache::new(config.cache_ttl, config.cache_enabled, Logger::new("CACHE")));
    let dot = Arc::new(DotClient::new(
        config.provider_host.clone(),
        config.provider_port,
        config.resolver_timeout,
        config.trust_strategy,
        Logger::new("DOT"),
    ));
    let metrics = match Metrics::new() {
        Ok(metrics) => Some(Arc::new(metrics)),
        Err(e) => {
            main_logger.err(&format!("failed to initialize metrics, continuing without them: {e}"));
            None
        }
    };
    let resolver = Arc::new(Resolver::new(cache.clone(), dot, metrics.clone(), Logger::new("RESOLVER")));
    let denylist = Arc::new(DenylistService::new(DenylistRepository::new()));

    let bind_addr: std::net::SocketAddr = match format!("0.0.0.0:{}", config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            main_logger.err(&format!("invalid bind port {}: {e}", config.port));
            return ExitCode::FAILURE;
        }
    };

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let udp_ingress = match UdpIngress::bind(bind_addr, resolver.clone(), config.udp_max_queue_size, Logger::new("UDP")).await {
        Ok(ingress) => ingress,
        Err(e) => {
            main_logger.err(&format!("{e}"));
            return ExitCode::FAILURE;
        }
    };
    let tcp_ingress = match TcpIngress::bind(bind_addr, resolver.clone(), config.tcp_max_conn_pool, Logger::new("TCP")).await {
        Ok(ingress) => ingress,
        Err(e) => {
            main_logger.err(&format!("{e}"));
            return ExitCode::FAILURE;
        }
    };

    let mut tasks = Vec::new();
    tasks.push(tokio::spawn(udp_ingress.run(shutdown_tx.subscribe())));
    tasks.push(tokio::spawn(tcp_ingress.run(shutdown_tx.subscribe())));
    tasks.push(tokio::spawn({
        let cache = cache.clone();
        let shutdown_rx = shutdown_tx.subscribe();
        async move { cache.run_sweeper(shutdown_rx).await }
    }));

    // The admin surface has no shutdown wiring of its own: it is off
    // the request path and not part of the graceful-shutdown contract,
    // so its task is spawned but not joined below; it is simply
    // dropped when the process exits.
    if let Some(metrics) = metrics {
        let http_server = HttpServer::new(config.admin_bind_addr, denylist, metrics, Logger::new("HTTP"));
        tokio::spawn(async move {
            if let Err(e) = http_server.run().await {
                tracing::error!(component = "HTTP", "admin server failed: {e}");
            }
        });
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => main_logger.info("received shutdown signal"),
        Err(e) => main_logger.err(&format!("failed to listen for shutdown signal: {e}")),
    }
    let _ = shutdown_tx.send(());

    for task in tasks {
        let _ = task.await;
    }

    main_logger.info("shutdown complete");
    ExitCode::SUCCESS
}
