use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::types::Reading;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("reading service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("reading service returned {0}")]
    Status(reqwest::StatusCode),
    #[error("reading service sent an unexpected body: {0}")]
    Body(#[source] reqwest::Error),
}

/// HTTP client for the reading service's `GET /`.
#[derive(Clone)]
pub struct ReadingClient {
    http: Client,
    url: Url,
}

impl ReadingClient {
    pub fn new(url: Url, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn fetch(&self) -> Result<Reading, FetchError> {
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(FetchError::Unreachable)?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        response.json::<Reading>().await.map_err(FetchError::Body)
    }
}
