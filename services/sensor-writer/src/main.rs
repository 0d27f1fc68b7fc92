use anyhow::{Context, Result};
use linux_embedded_hal::{Delay, I2cdev};
use sensor_writer::{POLL_INTERVAL, Sampler, Scd30};
use telemetry_record::{
    DEFAULT_RECORD_PATH, SharedRecord,
    env::{parse_i2c_address, read_env, read_env_optional},
    shutdown_signal,
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry_record::init_tracing();

    let record_path = read_env("SENSOR_RECORD_PATH", DEFAULT_RECORD_PATH);
    let bus = read_env("SCD30_I2C_BUS", "/dev/i2c-1");
    let address = match read_env_optional("SCD30_I2C_ADDRESS") {
        Some(raw) => parse_i2c_address(&raw)
            .with_context(|| format!("SCD30_I2C_ADDRESS={raw} is not an i2c address"))?,
        None => sensor_writer::scd30::DEFAULT_ADDRESS,
    };
    let pressure_mbar: u16 = read_env("SCD30_AMBIENT_PRESSURE_MBAR", "0")
        .parse()
        .unwrap_or(0);

    tracing::info!(%bus, address = %format!("{address:#04x}"), %record_path, "sensor-writer starting");

    let i2c = I2cdev::new(&bus).with_context(|| format!("failed to open i2c bus {bus}"))?;
    let mut scd30 = Scd30::with_address(i2c, Delay, address);
    match scd30.firmware_version() {
        Ok((major, minor)) => tracing::info!("scd30 firmware {major}.{minor}"),
        Err(e) => tracing::warn!(error = %e, "could not read scd30 firmware version"),
    }
    scd30
        .start_continuous_measurement(pressure_mbar)
        .context("failed to start continuous measurement")?;
    tracing::info!(pressure_mbar, "continuous measurement started");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    let mut sampler = Sampler::new(scd30, SharedRecord::new(record_path));
    sampler.run(POLL_INTERVAL, shutdown).await;

    if let Err(e) = sampler.sensor_mut().stop_continuous_measurement() {
        tracing::warn!(error = %e, "failed to stop continuous measurement");
    }
    tracing::info!("sensor-writer shutdown complete");
    Ok(())
}
