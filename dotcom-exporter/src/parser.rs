//! Decoding of the Dotcom-Monitor XML status report.
//!
//! The report is a single root element containing one `Site` element per
//! monitored device. Device data is carried in attributes:
//!
//! ```xml
//! <Sites>
//!   <Site ID="123456" Name="Homepage" State="Up" Status="OK" />
//! </Sites>
//! ```

use serde::Deserialize;

use crate::error::{Result, ScrapeError};

/// Alert state reported for a device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DeviceState {
    Up,
    Down,
    /// Anything else, kept verbatim. Matching is case-sensitive.
    Other(String),
}

impl From<String> for DeviceState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Up" => Self::Up,
            "Down" => Self::Down,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for DeviceState {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

/// One monitored device from a status report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceRecord {
    #[serde(rename = "@ID", default)]
    pub id: String,
    #[serde(rename = "@Name", default)]
    pub name: String,
    #[serde(rename = "@State", default = "unknown_state")]
    pub state: DeviceState,
    /// Free-text status; exported as-is.
    #[serde(rename = "@Status", default)]
    pub status: String,
}

fn unknown_state() -> DeviceState {
    DeviceState::Other(String::new())
}

impl DeviceRecord {
    /// Create a record from its four attributes.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        state: impl Into<DeviceState>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state: state.into(),
            status: status.into(),
        }
    }
}

/// Top-level document of the status report.
///
/// `Site` elements are collected wherever they appear among the root's
/// children.
#[derive(Debug, Default, Deserialize)]
pub struct StatusReport {
    #[serde(rename = "Site", default)]
    pub devices: Vec<DeviceRecord>,
}

/// Parse a raw status report body into device records, in document order.
///
/// Malformed XML yields [`ScrapeError::Parse`]; a well-formed report
/// without any `Site` element yields [`ScrapeError::EmptyResult`].
pub fn parse(body: &[u8]) -> Result<Vec<DeviceRecord>> {
    let report: StatusReport = quick_xml::de::from_reader(body)?;

    if report.devices.is_empty() {
        return Err(ScrapeError::EmptyResult);
    }

    Ok(report.devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_devices_in_order() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
            <Sites>
                <Site ID="1" Name="A" State="Down" Status="x" />
                <Site ID="2" Name="B" State="Up" Status="y" />
            </Sites>"#;

        let devices = parse(xml).unwrap();

        assert_eq!(
            devices,
            vec![
                DeviceRecord::new("1", "A", DeviceState::Down, "x"),
                DeviceRecord::new("2", "B", DeviceState::Up, "y"),
            ]
        );
    }

    #[test]
    fn test_parse_unrecognized_state() {
        let xml = br#"<Sites><Site ID="7" Name="Api" State="UP" Status="Check" /></Sites>"#;

        let devices = parse(xml).unwrap();

        assert_eq!(devices[0].state, DeviceState::Other("UP".to_string()));
    }

    #[test]
    fn test_parse_missing_attributes_default_to_empty() {
        let xml = br#"<Sites><Site ID="9"></Site></Sites>"#;

        let devices = parse(xml).unwrap();

        assert_eq!(devices[0].id, "9");
        assert_eq!(devices[0].name, "");
        assert_eq!(devices[0].status, "");
        assert_eq!(devices[0].state, DeviceState::Other(String::new()));
    }

    #[test]
    fn test_parse_ignores_other_elements() {
        let xml = br#"<Sites>
                <Summary Total="1" />
                <Site ID="1" Name="A" State="Up" Status="OK" />
            </Sites>"#;

        let devices = parse(xml).unwrap();

        assert_eq!(devices.len(), 1);
    }

    #[test]
    fn test_parse_sites_interleaved_with_other_elements() {
        let xml =
            br#"<Sites><Site ID="1" State="Up"/><Summary/><Site ID="2" State="Down"/></Sites>"#;

        let devices = parse(xml).unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, "1");
        assert_eq!(devices[0].state, DeviceState::Up);
        assert_eq!(devices[1].id, "2");
        assert_eq!(devices[1].state, DeviceState::Down);
    }

    #[test]
    fn test_parse_empty_report() {
        let err = parse(b"<Sites></Sites>").unwrap_err();

        assert!(matches!(err, ScrapeError::EmptyResult));
    }

    #[test]
    fn test_parse_unclosed_tag() {
        let err = parse(br#"<Sites><Site ID="1" Name="A" State="Up" Status="OK" />"#).unwrap_err();

        assert!(matches!(err, ScrapeError::Parse(_)));
    }

    #[test]
    fn test_parse_invalid_utf8() {
        let mut xml = br#"<Sites><Site ID="1" Name=""#.to_vec();
        xml.extend_from_slice(&[0xff, 0xfe]);
        xml.extend_from_slice(br#"" State="Up" Status="OK" /></Sites>"#);

        let err = parse(&xml).unwrap_err();

        assert!(matches!(err, ScrapeError::Parse(_)));
    }

    #[test]
    fn test_parse_empty_body() {
        let err = parse(b"").unwrap_err();

        assert!(matches!(err, ScrapeError::Parse(_)));
    }

    #[test]
    fn test_device_state_from_str() {
        assert_eq!(DeviceState::from("Up"), DeviceState::Up);
        assert_eq!(DeviceState::from("Down"), DeviceState::Down);
        assert_eq!(
            DeviceState::from("down"),
            DeviceState::Other("down".to_string())
        );
    }
}
