//! Scrape orchestration: fetch, parse and map on every collection request.

use std::future::Future;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::client::StatusSource;
use crate::error::Result;
use crate::mapping::{map_device, scrape_success};
use crate::metrics::{Collector, DEVICE_STATUS, Descriptor, SCRAPE_SUCCESS, Sample};
use crate::parser;

/// Exporter statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    /// Total scrapes attempted.
    pub scrapes: u64,
    /// Scrapes that failed at any stage.
    pub failures: u64,
    /// Devices returned by the last successful scrape.
    pub last_device_count: usize,
}

/// Scrapes the Dotcom-Monitor XML API on demand.
pub struct Exporter<S> {
    /// Upstream report source.
    source: S,
    /// Held for a whole scrape so at most one request to dotcom is in flight.
    scrape_lock: Mutex<()>,
    /// Statistics.
    stats: RwLock<ScrapeStats>,
}

/// Create a shareable exporter handle.
pub type SharedExporter<S> = Arc<Exporter<S>>;

impl<S: StatusSource> Exporter<S> {
    /// Create a new exporter around a report source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            scrape_lock: Mutex::new(()),
            stats: RwLock::new(ScrapeStats::default()),
        }
    }

    /// The two metric families this exporter emits.
    pub fn describe(&self) -> Vec<&'static Descriptor> {
        vec![&SCRAPE_SUCCESS, &DEVICE_STATUS]
    }

    /// Run one scrape and return its samples.
    ///
    /// On success: one `device_status` sample per device in report order,
    /// then `scrape_success` = 1. On any failure only `scrape_success` = 0 is
    /// returned. The success sample carries the scrape start time.
    pub async fn collect(&self) -> Vec<Sample> {
        let _guard = self.scrape_lock.lock().await;

        let started_ms = unix_millis(SystemTime::now());
        let started = Instant::now();

        match self.scrape().await {
            Ok(mut samples) => {
                let devices = samples.len();
                debug!(
                    devices,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Scrape succeeded"
                );
                self.record(true, devices);

                samples.push(scrape_success(true, started_ms));
                samples
            }
            Err(e) => {
                error!(error = %e, kind = e.kind(), "Failed to gather stats");
                self.record(false, 0);

                vec![scrape_success(false, started_ms)]
            }
        }
    }

    /// Fetch, parse and map. Caller holds the scrape lock.
    async fn scrape(&self) -> Result<Vec<Sample>> {
        let body = self.source.fetch().await?;
        let devices = parser::parse(&body)?;

        Ok(devices.iter().map(map_device).collect())
    }

    fn record(&self, success: bool, devices: usize) {
        let mut stats = self.stats.write();
        stats.scrapes += 1;
        if success {
            stats.last_device_count = devices;
        } else {
            stats.failures += 1;
        }
    }

    /// Get exporter statistics.
    pub fn stats(&self) -> ScrapeStats {
        self.stats.read().clone()
    }

    /// Access the underlying report source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: StatusSource> Collector for Exporter<S> {
    fn describe(&self) -> Vec<&'static Descriptor> {
        Exporter::describe(self)
    }

    fn collect(&self) -> impl Future<Output = Vec<Sample>> + Send {
        Exporter::collect(self)
    }
}

fn unix_millis(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
