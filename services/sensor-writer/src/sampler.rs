use std::time::Duration;

use telemetry_record::{RecordError, SharedRecord, TelemetryRecord};
use tokio_util::sync::CancellationToken;

use crate::scd30::{Measurement, Scd30, Scd30Error};

/// How often the data-ready flag is polled. Matches the sensor's own
/// default measurement interval.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Anything that can produce CO2/temperature/humidity readings.
pub trait AirSensor {
    fn data_ready(&mut self) -> Result<bool, Scd30Error>;
    fn read_measurement(&mut self) -> Result<Measurement, Scd30Error>;
}

impl<I2C, D> AirSensor for Scd30<I2C, D>
where
    I2C: embedded_hal::i2c::I2c,
    D: embedded_hal::delay::DelayNs,
{
    fn data_ready(&mut self) -> Result<bool, Scd30Error> {
        Scd30::data_ready(self)
    }

    fn read_measurement(&mut self) -> Result<Measurement, Scd30Error> {
        Scd30::read_measurement(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error(transparent)]
    Sensor(#[from] Scd30Error),
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl From<Measurement> for TelemetryRecord {
    fn from(m: Measurement) -> Self {
        TelemetryRecord::new(m.co2_ppm, m.temperature_c, m.humidity_pct)
    }
}

/// Moves readings from a sensor into the shared record.
pub struct Sampler<S> {
    sensor: S,
    record: SharedRecord,
}

impl<S: AirSensor> Sampler<S> {
    pub fn new(sensor: S, record: SharedRecord) -> Self {
        Self { sensor, record }
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Stores a fresh reading if the sensor has one. Returns what was
    /// stored, or `None` when no new data was ready.
    pub fn sample_once(&mut self) -> Result<Option<TelemetryRecord>, SampleError> {
        if !self.sensor.data_ready()? {
            return Ok(None);
        }
        let record = TelemetryRecord::from(self.sensor.read_measurement()?);
        self.record.store(&record)?;
        Ok(Some(record))
    }

    /// Samples every `interval` until `shutdown` fires. Failed samples are
    /// logged and skipped.
    ///
    /// Bus and file I/O block, so each sample runs under `block_in_place`;
    /// this needs the multi-threaded runtime.
    pub async fn run(&mut self, interval: Duration, shutdown: CancellationToken) {
        loop {
            match tokio::task::block_in_place(|| self.sample_once()) {
                Ok(Some(r)) => tracing::info!(
                    co2 = r.co2,
                    temperature = r.temperature,
                    humidity = r.humidity,
                    "reading stored"
                ),
                Ok(None) => tracing::trace!("sensor not ready"),
                Err(e) => tracing::error!(error = %e, "sampling failed"),
            }
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
        tracing::info!("sampler stopped");
    }
}
