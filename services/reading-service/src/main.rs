use anyhow::Result;
use reading_service::{ServiceConfig, build_router};
use std::net::SocketAddr;
use telemetry_record::{env::read_env, shutdown_signal};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry_record::init_tracing();

    let config = ServiceConfig::from_env();
    tracing::info!(record_path = %config.record_path.display(), "reading-service starting");
    let app = build_router(config);

    let host = read_env("READING_SERVICE_HOST", "0.0.0.0");
    let port: u16 = read_env("READING_SERVICE_PORT", "8080")
        .parse()
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("reading-service listening on http://{addr}");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("reading-service shutdown complete");
    Ok(())
}
