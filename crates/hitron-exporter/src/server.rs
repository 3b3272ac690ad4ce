// Metrics HTTP server
//
// One scrape per /metrics request: the registry is rebuilt each pull, so
// the output reflects exactly one login/fan-out/logout cycle. Overlapping
// pulls serialize on the device client's session gate.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::TextEncoder;
use tracing::{error, info};

use hitron_collector::Collector;

const LANDING_PAGE: &str = "<html>\
    <head><title>hitron-exporter</title></head>\
    <body>\
    <h1>hitron-exporter</h1>\
    <a href=\"/metrics\">metrics</a>\
    </body>\
    </html>";

pub fn app(collector: Arc<Collector>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics))
        .with_state(collector)
}

/// Bind and serve until ctrl-c.
pub async fn serve(addr: SocketAddr, collector: Arc<Collector>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app(collector))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to listen for shutdown signal");
    }
}

async fn index() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

async fn metrics(State(collector): State<Arc<Collector>>) -> Response {
    match render(&collector).await {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(%err, "rendering metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

async fn render(collector: &Collector) -> Result<String, prometheus::Error> {
    let registry = collector.scrape().await?;
    TextEncoder::new().encode_to_string(&registry.gather())
}
