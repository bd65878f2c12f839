use anyhow::Context;

use storefront_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        caches_enabled = config.caches_enabled,
        persistent = config.use_persistent_stores,
        version_routes = ?config.version_routes,
        "starting storefront api"
    );

    let app = storefront_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
