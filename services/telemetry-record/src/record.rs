use std::path::PathBuf;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Size of one encoded record on disk.
pub const RECORD_LEN: usize = 12;

/// CO2 warning threshold in ppm. Nothing alerts on it yet.
pub const MAX_CO2_PPM: f32 = 1000.0;

/// One sensor reading, laid out exactly as it sits in the shared file:
/// three native-endian `f32`s in the order co2, temperature, humidity.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct TelemetryRecord {
    /// Parts per million.
    pub co2: f32,
    /// Degrees Celsius.
    pub temperature: f32,
    /// Percent relative humidity.
    pub humidity: f32,
}

const _: () = assert!(size_of::<TelemetryRecord>() == RECORD_LEN);

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("telemetry record at {} is unavailable: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("telemetry record is malformed: expected 12 bytes, got {len}")]
    Malformed { len: usize },
    #[error("telemetry record holds a non-finite value: {record:?}")]
    NonFinite { record: TelemetryRecord },
    #[error("failed to write telemetry record to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TelemetryRecord {
    pub fn new(co2: f32, temperature: f32, humidity: f32) -> Self {
        Self {
            co2,
            temperature,
            humidity,
        }
    }

    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out.copy_from_slice(self.as_bytes());
        out
    }

    /// Decodes the first [`RECORD_LEN`] bytes of `bytes`; anything after
    /// that is ignored. NaN or infinite fields are rejected, since they
    /// cannot be served as JSON numbers.
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        let (record, _rest) = Self::read_from_prefix(bytes)
            .map_err(|_| RecordError::Malformed { len: bytes.len() })?;
        if !record.is_finite() {
            return Err(RecordError::NonFinite { record });
        }
        Ok(record)
    }

    pub fn is_finite(&self) -> bool {
        self.co2.is_finite() && self.temperature.is_finite() && self.humidity.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_fields_in_co2_temperature_humidity_order() {
        let bytes = TelemetryRecord::new(415.0, 21.5, 48.2).encode();
        assert_eq!(bytes.len(), RECORD_LEN);
        assert_eq!(&bytes[0..4], &415.0f32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &21.5f32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &48.2f32.to_ne_bytes());
    }

    #[test]
    fn decode_is_bit_exact() {
        let samples = [
            TelemetryRecord::new(415.0, 21.5, 48.2),
            TelemetryRecord::new(0.0, -40.0, 100.0),
            TelemetryRecord::new(f32::MAX, f32::MIN_POSITIVE, -0.0),
            TelemetryRecord::new(40_000.0, 70.125, 0.001),
        ];
        for sample in samples {
            let decoded = TelemetryRecord::decode(&sample.encode()).unwrap();
            assert_eq!(decoded.co2.to_bits(), sample.co2.to_bits());
            assert_eq!(decoded.temperature.to_bits(), sample.temperature.to_bits());
            assert_eq!(decoded.humidity.to_bits(), sample.humidity.to_bits());
        }
    }

    #[test]
    fn decode_reads_positions_from_raw_bytes() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&612.3f32.to_ne_bytes());
        raw.extend_from_slice(&19.96f32.to_ne_bytes());
        raw.extend_from_slice(&55.44f32.to_ne_bytes());
        let record = TelemetryRecord::decode(&raw).unwrap();
        assert_eq!(record.co2, 612.3);
        assert_eq!(record.temperature, 19.96);
        assert_eq!(record.humidity, 55.44);
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let mut raw = TelemetryRecord::new(1.0, 2.0, 3.0).encode().to_vec();
        raw.extend_from_slice(&[0xAA; 4]);
        assert_eq!(
            TelemetryRecord::decode(&raw).unwrap(),
            TelemetryRecord::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn decode_rejects_non_finite_fields() {
        let samples = [
            TelemetryRecord::new(f32::NAN, 21.0, 40.0),
            TelemetryRecord::new(415.0, f32::INFINITY, 40.0),
            TelemetryRecord::new(415.0, 21.0, f32::NEG_INFINITY),
        ];
        for sample in samples {
            assert!(matches!(
                TelemetryRecord::decode(&sample.encode()),
                Err(RecordError::NonFinite { .. })
            ));
        }
    }

    #[test]
    fn decode_rejects_short_input() {
        for len in [0, 1, 4, 11] {
            let raw = vec![0u8; len];
            match TelemetryRecord::decode(&raw) {
                Err(RecordError::Malformed { len: got }) => assert_eq!(got, len),
                other => panic!("expected Malformed for {len} bytes, got {other:?}"),
            }
        }
    }
}
