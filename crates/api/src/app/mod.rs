//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the catalog service and store/cache wiring
//! - `routes/`: HTTP handlers, one file per area
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(build_router(config, services))
}

/// Router around an already-wired service.
pub fn build_router(config: &AppConfig, services: Arc<services::CatalogService>) -> Router {
    let jwt = Arc::new(storefront_auth::Hs256JwtValidator::new(config.jwt_secret.clone().into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let catalog = routes::router(config.version_routes).layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            ))
            .layer(Extension(services)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(catalog)
}
