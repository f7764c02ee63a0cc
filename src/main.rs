//! relaycast 服务入口

use relaycast::{server, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("relaycast=info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        "[SERVER] relaycast 启动, upstream={} heartbeat={:?}",
        config.upstream_base_url,
        config.heartbeat_interval
    );

    server::run(config).await
}
