use serde::{Deserialize, Serialize};
use telemetry_record::TelemetryRecord;

/// Response body for `GET /`.
///
/// Record position to JSON key:
///
/// | position | record field  | key        |
/// |----------|---------------|------------|
/// | 0        | `co2`         | `co2`      |
/// | 1        | `temperature` | `temp`     |
/// | 2        | `humidity`    | `humidity` |
///
/// Key order in the body is temp, humidity, co2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temp: f32,
    pub humidity: f32,
    pub co2: f32,
}

impl From<TelemetryRecord> for Reading {
    fn from(record: TelemetryRecord) -> Self {
        Self {
            temp: record.temperature,
            humidity: record.humidity,
            co2: record.co2,
        }
    }
}
