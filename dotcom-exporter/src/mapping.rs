//! Mapping from Dotcom-Monitor device records to Prometheus samples.

use crate::metrics::{DEVICE_STATUS, SCRAPE_SUCCESS, Sample};
use crate::parser::{DeviceRecord, DeviceState};

impl DeviceState {
    /// Numeric gauge value for the state.
    ///
    /// Unrecognized states are not an error; they all share code 2.
    pub fn value(&self) -> f64 {
        match self {
            DeviceState::Down => 0.0,
            DeviceState::Up => 1.0,
            DeviceState::Other(_) => 2.0,
        }
    }
}

/// Convert a device record into its `device_status` sample.
///
/// Labels are `id`, `name` and the raw `status` text.
pub fn map_device(device: &DeviceRecord) -> Sample {
    Sample::new(
        &DEVICE_STATUS,
        device.state.value(),
        vec![
            device.id.clone(),
            device.name.clone(),
            device.status.clone(),
        ],
    )
}

/// Build the `scrape_success` sample, timestamped at the scrape start.
pub fn scrape_success(success: bool, started_ms: i64) -> Sample {
    let value = if success { 1.0 } else { 0.0 };
    Sample::new(&SCRAPE_SUCCESS, value, Vec::new()).with_timestamp(started_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(state: &str) -> DeviceRecord {
        DeviceRecord::new("42", "Checkout", state, "Everything fine")
    }

    #[test]
    fn test_state_values() {
        assert_eq!(map_device(&device("Down")).value, 0.0);
        assert_eq!(map_device(&device("Up")).value, 1.0);
    }

    #[test]
    fn test_unrecognized_states_map_to_two() {
        for state in ["", "unknown", "UP", "down", "Maintenance", " Up"] {
            assert_eq!(map_device(&device(state)).value, 2.0, "state {:?}", state);
        }
    }

    #[test]
    fn test_labels_are_verbatim() {
        let record = DeviceRecord::new("1", "A \"quoted\"", "Up", "Raw status\nline");
        let sample = map_device(&record);

        assert_eq!(sample.descriptor, &DEVICE_STATUS);
        assert_eq!(sample.label("id"), Some("1"));
        assert_eq!(sample.label("name"), Some("A \"quoted\""));
        assert_eq!(sample.label("status"), Some("Raw status\nline"));
        assert_eq!(sample.timestamp_ms, None);
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let record = device("Maintenance");

        let first = map_device(&record);
        let second = map_device(&record);

        assert_eq!(first, second);
        assert_eq!(first.value.to_bits(), second.value.to_bits());
    }

    #[test]
    fn test_scrape_success_sample() {
        let ok = scrape_success(true, 1000);
        let failed = scrape_success(false, 2000);

        assert_eq!(ok.descriptor, &SCRAPE_SUCCESS);
        assert_eq!(ok.value, 1.0);
        assert_eq!(ok.timestamp_ms, Some(1000));
        assert_eq!(failed.value, 0.0);
        assert_eq!(failed.timestamp_ms, Some(2000));
        assert!(failed.label_values.is_empty());
    }
}
