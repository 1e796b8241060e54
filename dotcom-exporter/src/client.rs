//! HTTP client for the Dotcom-Monitor XML reporting API.

use std::future::Future;

use tracing::trace;

use crate::config::DotcomConfig;
use crate::error::{Result, ScrapeError};

/// Path of the status report below the API base URL.
pub const STATUS_PATH: &str = "/reporting/xml/status.aspx";

/// Source of raw status reports.
///
/// One call to [`fetch`](StatusSource::fetch) is one upstream request; no
/// retries are made.
pub trait StatusSource: Send + Sync + 'static {
    /// Fetch the raw report body.
    fn fetch(&self) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Client for `status.aspx`.
///
/// The underlying connection pool is reused across scrapes.
pub struct DotcomClient {
    http: reqwest::Client,
    url: String,
    query: Vec<(&'static str, String)>,
}

impl DotcomClient {
    /// Create a client from the upstream configuration.
    pub fn new(config: &DotcomConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self::with_client(
            http,
            &config.base_url,
            &config.pid,
            &config.sites,
        ))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str, pid: &str, sites: &[String]) -> Self {
        Self {
            http,
            url: format!("{}{}", base_url.trim_end_matches('/'), STATUS_PATH),
            query: build_query(pid, sites),
        }
    }

    /// Timeout-bounded GET of the status report.
    async fn get(&self) -> Result<Vec<u8>> {
        let response = self.http.get(&self.url).query(&self.query).send().await?;

        let status = response.status();
        trace!(url = %response.url(), %status, "Dotcom response received");

        if !status.is_success() {
            return Err(ScrapeError::HttpStatus { status });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

impl StatusSource for DotcomClient {
    fn fetch(&self) -> impl Future<Output = Result<Vec<u8>>> + Send {
        self.get()
    }
}

/// Query parameters: `PID` followed by one `site` per filter.
pub fn build_query(pid: &str, sites: &[String]) -> Vec<(&'static str, String)> {
    let mut query = Vec::with_capacity(sites.len() + 1);
    query.push(("PID", pid.to_string()));
    query.extend(sites.iter().map(|s| ("site", s.clone())));
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_repeats_site() {
        let query = build_query("PID1", &["1*".to_string(), "Shop".to_string()]);

        assert_eq!(
            query,
            vec![
                ("PID", "PID1".to_string()),
                ("site", "1*".to_string()),
                ("site", "Shop".to_string()),
            ]
        );
    }

    #[test]
    fn test_status_url() {
        let client = DotcomClient::with_client(
            reqwest::Client::new(),
            "https://xmlreporter.dotcom-monitor.com/",
            "PID1",
            &["*".to_string()],
        );

        assert_eq!(
            client.url,
            "https://xmlreporter.dotcom-monitor.com/reporting/xml/status.aspx"
        );
    }

    #[test]
    fn test_encoded_request_url() {
        let client = DotcomClient::with_client(
            reqwest::Client::new(),
            "https://xmlreporter.dotcom-monitor.com",
            "PID1",
            &["*".to_string(), "My Site".to_string()],
        );

        let request = client
            .http
            .get(&client.url)
            .query(&client.query)
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://xmlreporter.dotcom-monitor.com/reporting/xml/status.aspx?PID=PID1&site=*&site=My+Site"
        );
    }

    #[test]
    fn test_new_from_config() {
        let config = DotcomConfig {
            pid: "PID1".to_string(),
            ..Default::default()
        };

        let client = DotcomClient::new(&config).unwrap();

        assert_eq!(client.query.len(), 2);
    }
}
