use axum::{Json, Router, http::StatusCode, routing::get};
use display_poller::{
    Display, DisplayError, FetchError, PollError, Poller, ReadingClient,
};
use serde_json::{Value, json};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::{task::JoinHandle, time::Duration};
use tokio_util::sync::CancellationToken;
use url::Url;

async fn spawn_reading_server(status: StatusCode, body: Value) -> (Url, JoinHandle<()>) {
    let router = Router::new().route(
        "/",
        get(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // ensure server is ready
    tokio::time::sleep(Duration::from_millis(50)).await;

    (Url::parse(&format!("http://{addr}")).unwrap(), handle)
}

#[derive(Clone, Default)]
struct RecordingDisplay {
    shown: Arc<Mutex<Vec<String>>>,
    failures_left: Arc<Mutex<usize>>,
}

impl RecordingDisplay {
    fn failing(times: usize) -> Self {
        let display = Self::default();
        *display.failures_left.lock().unwrap() = times;
        display
    }

    fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }
}

impl Display for RecordingDisplay {
    fn clear(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        let mut left = self.failures_left.lock().unwrap();
        if *left > 0 {
            *left -= 1;
            return Err(DisplayError::I2c(embedded_hal::i2c::ErrorKind::Bus));
        }
        self.shown.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn client(url: Url) -> ReadingClient {
    ReadingClient::new(url, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn renders_reading_from_service() {
    let (url, handle) = spawn_reading_server(
        StatusCode::OK,
        json!({"temp": 19.96, "humidity": 55.44, "co2": 612.3}),
    )
    .await;
    let display = RecordingDisplay::default();
    let mut poller = Poller::new(client(url), display.clone(), Duration::from_secs(5));

    let text = poller.tick().await.unwrap();
    handle.abort();
    assert_eq!(text, "T:20.0 / H:55.4 Co2 : 612");
    assert_eq!(display.shown(), ["T:20.0 / H:55.4 Co2 : 612"]);
}

#[tokio::test]
async fn server_error_skips_the_frame() {
    let (url, handle) =
        spawn_reading_server(StatusCode::SERVICE_UNAVAILABLE, json!({"error": "no record"})).await;
    let display = RecordingDisplay::default();
    let mut poller = Poller::new(client(url), display.clone(), Duration::from_secs(5));

    let result = poller.tick().await;
    handle.abort();
    assert!(matches!(
        result,
        Err(PollError::Upstream(FetchError::Status(StatusCode::SERVICE_UNAVAILABLE)))
    ));
    assert!(display.shown().is_empty());
}

#[tokio::test]
async fn missing_field_is_a_body_error() {
    let (url, handle) =
        spawn_reading_server(StatusCode::OK, json!({"temp": 20.0, "humidity": 40.0})).await;
    let mut poller = Poller::new(
        client(url),
        RecordingDisplay::default(),
        Duration::from_secs(5),
    );

    let result = poller.tick().await;
    handle.abort();
    assert!(matches!(result, Err(PollError::Upstream(FetchError::Body(_)))));
}

#[tokio::test]
async fn unreachable_service_is_reported() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!("http://{addr}")).unwrap();
    let mut poller = Poller::new(
        client(url),
        RecordingDisplay::default(),
        Duration::from_secs(5),
    );
    assert!(matches!(
        poller.tick().await,
        Err(PollError::Upstream(FetchError::Unreachable(_)))
    ));
}

#[tokio::test]
async fn display_failure_is_retried_once() {
    let (url, handle) = spawn_reading_server(
        StatusCode::OK,
        json!({"temp": 21.5, "humidity": 48.2, "co2": 415.0}),
    )
    .await;
    let display = RecordingDisplay::failing(1);
    let mut poller = Poller::new(client(url.clone()), display.clone(), Duration::from_secs(5));
    poller.tick().await.unwrap();
    assert_eq!(display.shown(), ["T:21.5 / H:48.2 Co2 : 415"]);

    let display = RecordingDisplay::failing(2);
    let mut poller = Poller::new(client(url), display.clone(), Duration::from_secs(5));
    let result = poller.tick().await;
    handle.abort();
    assert!(matches!(result, Err(PollError::Display(_))));
    assert!(display.shown().is_empty());
}

#[tokio::test]
async fn run_keeps_polling_until_cancelled() {
    let (url, handle) = spawn_reading_server(
        StatusCode::OK,
        json!({"temp": 21.5, "humidity": 48.2, "co2": 415.0}),
    )
    .await;
    let display = RecordingDisplay::default();
    let mut poller = Poller::new(client(url), display.clone(), Duration::from_millis(10));

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    tokio::time::timeout(Duration::from_secs(5), poller.run(token))
        .await
        .expect("poller did not stop");
    handle.abort();
    assert!(display.shown().len() >= 2);
}

#[tokio::test]
async fn run_survives_an_unreachable_service() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!("http://{addr}")).unwrap();
    let display = RecordingDisplay::default();
    let mut poller = Poller::new(client(url), display.clone(), Duration::from_millis(10));

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    tokio::time::timeout(Duration::from_secs(5), poller.run(token))
        .await
        .expect("poller did not stop");
    assert!(display.shown().is_empty());
}
