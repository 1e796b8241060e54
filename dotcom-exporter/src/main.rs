//! Prometheus exporter for Dotcom-Monitor.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use dotcom_exporter::config::{parse_duration, parse_sites};
use dotcom_exporter::{
    DotcomClient, Exporter, ExporterConfig, HttpServer, SharedExporter, init_tracing,
};

/// Prometheus exporter for Dotcom-Monitor device status.
#[derive(Parser, Debug)]
#[command(name = "dotcom-exporter")]
#[command(about = "Export Dotcom-Monitor device status as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// Address to listen on for web interface and telemetry.
    #[arg(long = "web.listen-address")]
    listen_address: Option<String>,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path")]
    telemetry_path: Option<String>,

    /// Account Global Unique Identifier
    /// (Configure > Integrations > Unique Identifier column).
    #[arg(long = "dotcom.pid")]
    pid: Option<String>,

    /// Comma separated list of site IDs or names, e.g. "Site1,Site2".
    /// Wildcards such as "*" or "123*" are supported by the API.
    #[arg(long = "dotcom.sites")]
    sites: Option<String>,

    /// HTTP timeout used when scraping from dotcom, e.g. "10s".
    #[arg(long = "dotcom.http.timeout", value_parser = parse_duration)]
    http_timeout: Option<Duration>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        ExporterConfig::load_from_file(config_path)?
    } else {
        ExporterConfig::default()
    };

    // CLI overrides
    if let Some(listen) = args.listen_address {
        config.web.listen = listen;
    }
    if let Some(path) = args.telemetry_path {
        config.web.path = path;
    }
    if let Some(pid) = args.pid {
        config.dotcom.pid = pid;
    }
    if let Some(sites) = args.sites {
        config.dotcom.sites = parse_sites(&sites);
    }
    if let Some(timeout) = args.http_timeout {
        config.dotcom.http_timeout = timeout;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    config.validate()?;
    init_tracing(&config.logging)?;

    info!(
        pid = %config.dotcom.redacted_pid(),
        sites = ?config.dotcom.sites,
        timeout = %humantime::format_duration(config.dotcom.http_timeout),
        "Starting dotcom monitor exporter"
    );

    let client = DotcomClient::new(&config.dotcom)?;
    let exporter: SharedExporter<DotcomClient> = Arc::new(Exporter::new(client));

    let families: Vec<_> = exporter.describe().iter().map(|d| d.name).collect();
    info!(metrics = ?families, "Registered metric families");

    let listen_addr: SocketAddr = config
        .web
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Bind before spawning so a busy port terminates the process
    let server = HttpServer::new(exporter.clone(), listen_addr, config.web.path.clone())
        .bind()
        .await?;

    let mut http_task = tokio::spawn(server.serve(shutdown_rx));

    // Wait for shutdown signal, or for the server to stop on its own
    let server_exit = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            None
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
            None
        }
        joined = &mut http_task => Some(joined),
    };

    let outcome = match server_exit {
        None => {
            let _ = shutdown_tx.send(true);
            if tokio::time::timeout(Duration::from_secs(5), http_task)
                .await
                .is_err()
            {
                warn!("HTTP server did not stop within 5s");
            }
            Ok(())
        }
        Some(Ok(Ok(()))) => Err(anyhow::anyhow!("HTTP server stopped unexpectedly")),
        Some(Ok(Err(e))) => Err(e),
        Some(Err(e)) => Err(anyhow::anyhow!("HTTP server task failed: {}", e)),
    };

    if let Err(e) = &outcome {
        error!(error = %e, "HTTP server exited, shutting down");
    }

    let stats = exporter.stats();
    info!(
        scrapes = stats.scrapes,
        failures = stats.failures,
        last_device_count = stats.last_device_count,
        "Final statistics"
    );

    info!("Exporter stopped");
    outcome
}

#[cfg(unix)]
async fn terminate() {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(error = %e, "Failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
