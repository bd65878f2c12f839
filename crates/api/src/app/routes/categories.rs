use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use storefront_catalog::CategoryForm;
use storefront_core::CategoryId;

use crate::app::errors::{parse_id, service_error_to_response};
use crate::app::services::CatalogService;
use crate::context::ActorContext;

pub async fn list_categories(Extension(services): Extension<Arc<CatalogService>>) -> axum::response::Response {
    match services.list_categories().await {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(e) => service_error_to_response(e),
    }
}

pub async fn get_category(
    Extension(services): Extension<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CategoryId = match parse_id(&id, "category") {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.get_category(id).await {
        Ok(category) => (StatusCode::OK, Json(category)).into_response(),
        Err(e) => service_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<CatalogService>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<CategoryForm>,
) -> axum::response::Response {
    let actor = match ctx.require() {
        Ok(a) => a,
        Err(e) => return service_error_to_response(e.into()),
    };

    match services.create_category(actor, body).await {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(e) => service_error_to_response(e),
    }
}
