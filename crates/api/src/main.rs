use anyhow::Context;

use stockroom_api::{app, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    stockroom_observability::init(config.log_format);

    let services = app::services::build_services(&config)
        .await
        .context("failed to initialise product store")?;
    let app = app::build_app(services, config.assets_dir.clone());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
