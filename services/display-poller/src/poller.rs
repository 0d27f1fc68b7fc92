use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::{FetchError, ReadingClient};
use crate::display::{Display, DisplayError};
use crate::types::render;

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(transparent)]
    Upstream(#[from] FetchError),
    #[error("display write failed twice: {0}")]
    Display(#[from] DisplayError),
}

/// Fetches the latest reading and puts it on a display, once per interval.
pub struct Poller<D> {
    client: ReadingClient,
    display: D,
    interval: Duration,
}

impl<D: Display> Poller<D> {
    pub fn new(client: ReadingClient, display: D, interval: Duration) -> Self {
        Self {
            client,
            display,
            interval,
        }
    }

    /// One fetch-render-show cycle. Returns the text that was shown.
    pub async fn tick(&mut self) -> Result<String, PollError> {
        let reading = self.client.fetch().await?;
        let text = render(&reading);
        if let Err(e) = self.show(&text) {
            tracing::warn!(error = %e, "display write failed; retrying once");
            self.show(&text)?;
        }
        Ok(text)
    }

    /// Runs [`tick`](Self::tick) until `shutdown` fires. Failed ticks are
    /// logged and the next one happens on schedule.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        tracing::info!(url = %self.client.url(), interval = ?self.interval, "poller started");
        loop {
            let tick = tokio::select! {
                _ = shutdown.cancelled() => break,
                tick = self.tick() => tick,
            };
            match tick {
                Ok(text) => tracing::debug!(%text, "display updated"),
                Err(PollError::Upstream(e)) => tracing::warn!(error = %e, "skipping frame"),
                Err(e) => tracing::error!(error = %e, "skipping frame"),
            }
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        tracing::info!("poller stopped");
    }

    fn show(&mut self, text: &str) -> Result<(), DisplayError> {
        self.display.clear()?;
        self.display.write_str(text)
    }
}
