//! Liveness plumbing, independent of command dispatch: a tiny HTTP endpoint
//! for an external uptime monitor, and an optional outbound self-ping that
//! keeps a hosting platform from idling the process.

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

const SELF_PING_INTERVAL: Duration = Duration::from_secs(600);

pub fn spawn_keepalive(port: u16) {
    tokio::spawn(async move {
        let app = Router::new()
            .route("/", get(|| async { "Bot is running!" }))
            .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }));

        let addr = format!("0.0.0.0:{port}");
        match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => {
                tracing::info!("Keepalive endpoint listening on {addr}");
                if let Err(error) = axum::serve(listener, app).await {
                    tracing::error!("Keepalive server exited: {error}");
                }
            }
            Err(error) => tracing::error!("Failed to bind keepalive endpoint on {addr}: {error}"),
        }
    });
}

pub fn spawn_self_ping(url: String) {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let mut tick = tokio::time::interval(SELF_PING_INTERVAL);
        loop {
            tick.tick().await;
            match client.get(&url).send().await {
                Ok(response) => tracing::debug!("Self-ping {url}: {}", response.status()),
                Err(error) => tracing::warn!("Self-ping {url} failed: {error}"),
            }
        }
    });
}
