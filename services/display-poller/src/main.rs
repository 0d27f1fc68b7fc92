use anyhow::{Context, Result};
use display_poller::{
    Backend, ConsoleDisplay, Display, Hd44780, Poller, PollerConfig, ReadingClient,
    config::{LCD_COLS, LCD_ROWS},
};
use linux_embedded_hal::{Delay, I2cdev};
use telemetry_record::shutdown_signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry_record::init_tracing();

    let config = PollerConfig::from_env()?;
    tracing::info!(url = %config.url, backend = ?config.backend, "display-poller starting");

    let display: Box<dyn Display + Send> = match &config.backend {
        Backend::Lcd { bus, address } => {
            let i2c = I2cdev::new(bus).with_context(|| format!("failed to open i2c bus {bus}"))?;
            let lcd = Hd44780::new(i2c, Delay, *address, LCD_COLS, LCD_ROWS)
                .context("failed to initialise lcd")?;
            Box::new(lcd)
        }
        Backend::Console => Box::new(ConsoleDisplay::new(
            usize::from(LCD_COLS),
            usize::from(LCD_ROWS),
        )),
    };

    let client = ReadingClient::new(config.url.clone(), config.request_timeout)?;
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    let mut poller = Poller::new(client, display, config.interval);
    poller.run(shutdown).await;
    tracing::info!("display-poller shutdown complete");
    Ok(())
}
