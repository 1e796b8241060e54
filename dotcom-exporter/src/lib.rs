//! Prometheus exporter for Dotcom-Monitor device status.
//!
//! Every scrape of the `/metrics` endpoint triggers one request to the
//! Dotcom-Monitor XML reporting API. The report is decoded into device
//! records which are exposed as gauges.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │  Dotcom XML API │<────│    Exporter     │<────│   HTTP Server   │
//! │  (status.aspx)  │     │ (fetch, parse,  │     │   (/metrics)    │
//! │                 │     │   map, lock)    │     │                 │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Metrics
//!
//! - `dotcom_scrape_success`: 1 if the last scrape succeeded, 0 otherwise.
//! - `dotcom_device_status{id,name,status}`: 0 = Down, 1 = Up, 2 = other.
//!
//! # Usage
//!
//! ```bash
//! dotcom-exporter --dotcom.pid <PID> --dotcom.sites '123*,Homepage'
//! ```
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod client;
pub mod config;
pub mod error;
pub mod exporter;
pub mod exposition;
pub mod http;
pub mod mapping;
pub mod metrics;
pub mod parser;

pub use client::{DotcomClient, StatusSource};
pub use config::ExporterConfig;
pub use error::{ConfigError, ScrapeError};
pub use exporter::{Exporter, ScrapeStats, SharedExporter};
pub use http::HttpServer;
pub use metrics::{Collector, Sample};
pub use parser::{DeviceRecord, DeviceState};

use config::{LogFormat, LoggingConfig};

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| {
                    ConfigError::Validation(format!("Failed to initialize tracing: {}", e))
                })?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| {
                    ConfigError::Validation(format!("Failed to initialize tracing: {}", e))
                })?;
        }
    }

    Ok(())
}
