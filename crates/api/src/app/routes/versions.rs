//! Version endpoints. Not routed unless enabled through `VERSION_ROUTES`.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use storefront_core::VersionId;

use crate::app::dto::{CreateVersionRequest, UpdateVersionRequest, VersionListQuery};
use crate::app::errors::{parse_id, service_error_to_response};
use crate::app::services::CatalogService;
use crate::context::ActorContext;

pub async fn list_versions(
    Extension(services): Extension<Arc<CatalogService>>,
    Query(query): Query<VersionListQuery>,
) -> axum::response::Response {
    match services.list_versions(query.product).await {
        Ok(versions) => (StatusCode::OK, Json(versions)).into_response(),
        Err(e) => service_error_to_response(e),
    }
}

pub async fn version_detail(
    Extension(services): Extension<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VersionId = match parse_id(&id, "version") {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.version_detail(id).await {
        Ok(version) => (StatusCode::OK, Json(version)).into_response(),
        Err(e) => service_error_to_response(e),
    }
}

pub async fn create_version(
    Extension(services): Extension<Arc<CatalogService>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<CreateVersionRequest>,
) -> axum::response::Response {
    let actor = match ctx.require() {
        Ok(a) => a,
        Err(e) => return service_error_to_response(e.into()),
    };

    match services.create_version(actor, body).await {
        Ok(version) => (StatusCode::CREATED, Json(version)).into_response(),
        Err(e) => service_error_to_response(e),
    }
}

pub async fn update_version(
    Extension(services): Extension<Arc<CatalogService>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateVersionRequest>,
) -> axum::response::Response {
    let actor = match ctx.require() {
        Ok(a) => a,
        Err(e) => return service_error_to_response(e.into()),
    };
    let id: VersionId = match parse_id(&id, "version") {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.update_version(actor, id, body).await {
        Ok(version) => (StatusCode::OK, Json(version)).into_response(),
        Err(e) => service_error_to_response(e),
    }
}

pub async fn delete_version(
    Extension(services): Extension<Arc<CatalogService>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let actor = match ctx.require() {
        Ok(a) => a,
        Err(e) => return service_error_to_response(e.into()),
    };
    let id: VersionId = match parse_id(&id, "version") {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.delete_version(actor, id).await {
        Ok(version) => (StatusCode::OK, Json(version)).into_response(),
        Err(e) => service_error_to_response(e),
    }
}
