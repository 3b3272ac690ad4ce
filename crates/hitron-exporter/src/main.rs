mod server;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use hitron_api::{HitronRouter, RouterConfig, TransportConfig};
use hitron_collector::Collector;

#[derive(Parser)]
#[command(name = "hitron-exporter", version, about = "Prometheus exporter for Hitron cable-modem routers")]
struct Cli {
    /// Root URL of the router's web management interface.
    #[arg(long, env = "HITRON_HOST", default_value = "http://192.168.0.1")]
    host: Url,

    /// Login username.
    #[arg(short = 'u', long, env = "HITRON_USER", default_value = "admin")]
    user: String,

    /// Login password.
    #[arg(short = 'p', long, env = "HITRON_PASS", default_value = "admin")]
    pass: String,

    /// Bind address for the metrics endpoint.
    #[arg(short = 'b', long, env = "HITRON_BIND", default_value = "0.0.0.0:9101")]
    bind: SocketAddr,

    /// Per-request HTTP timeout against the device, in seconds.
    #[arg(long, env = "HITRON_TIMEOUT", default_value = "30")]
    timeout: u64,

    /// How long a scrape may wait for exclusive device access, in seconds.
    #[arg(long, env = "HITRON_ACQUIRE_TIMEOUT", default_value = "3")]
    acquire_timeout: u64,

    /// Enable debug logging.
    #[arg(short = 'd', long, env = "HITRON_DEBUG")]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    info!("starting hitron-exporter");

    let config = RouterConfig {
        base_url: cli.host,
        username: cli.user,
        password: SecretString::from(cli.pass),
        acquire_timeout: Duration::from_secs(cli.acquire_timeout),
    };
    let transport = TransportConfig {
        timeout: Duration::from_secs(cli.timeout),
        ..TransportConfig::default()
    };

    let router = Arc::new(HitronRouter::new(config, &transport)?);
    let collector = Arc::new(Collector::new(router));

    server::serve(cli.bind, collector).await
}
