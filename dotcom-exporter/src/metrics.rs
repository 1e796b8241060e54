//! Metric descriptors, samples and the collector capability.

use std::future::Future;

/// Namespace prepended to every exported metric.
pub const NAMESPACE: &str = "dotcom";

/// Prometheus metric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Gauge,
}

impl MetricType {
    /// Get the TYPE comment string for Prometheus exposition format.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
        }
    }
}

/// Static metadata of a metric family.
#[derive(Debug, PartialEq, Eq)]
pub struct Descriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub metric_type: MetricType,
    /// Variable label names, in the order sample label values are given.
    pub label_names: &'static [&'static str],
}

/// Whether the last scrape of the Dotcom-Monitor API succeeded.
pub static SCRAPE_SUCCESS: Descriptor = Descriptor {
    name: "dotcom_scrape_success",
    help: "Whether scraping dotcom device status was successful.",
    metric_type: MetricType::Gauge,
    label_names: &[],
};

/// Per-device alert state: 0 = Down, 1 = Up, 2 = anything else.
pub static DEVICE_STATUS: Descriptor = Descriptor {
    name: "dotcom_device_status",
    help: "Whether the dotcom alert is active or not",
    metric_type: MetricType::Gauge,
    label_names: &["id", "name", "status"],
};

/// A single metric value ready to be exposed.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub descriptor: &'static Descriptor,
    pub value: f64,
    /// Label values matching `descriptor.label_names`.
    pub label_values: Vec<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: Option<i64>,
}

impl Sample {
    /// Create a sample without a timestamp.
    pub fn new(descriptor: &'static Descriptor, value: f64, label_values: Vec<String>) -> Self {
        Self {
            descriptor,
            value,
            label_values,
            timestamp_ms: None,
        }
    }

    /// Attach an explicit timestamp.
    pub fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    /// Label name/value pairs in descriptor order.
    pub fn labels(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.descriptor
            .label_names
            .iter()
            .copied()
            .zip(self.label_values.iter().map(String::as_str))
    }

    /// Look up a label value by name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels().find(|(k, _)| *k == name).map(|(_, v)| v)
    }
}

/// Something the HTTP layer can ask for metrics.
///
/// `collect` is invoked once per scrape request and may perform I/O.
pub trait Collector: Send + Sync + 'static {
    /// Descriptors of every family this collector can emit.
    fn describe(&self) -> Vec<&'static Descriptor>;

    /// Gather a fresh set of samples.
    fn collect(&self) -> impl Future<Output = Vec<Sample>> + Send;
}
