use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use storefront_catalog::{ProductFilter, ProductForm};
use storefront_core::{CategoryId, ProductId};

use crate::app::dto::UpdateProductRequest;
use crate::app::errors::{parse_id, service_error_to_response};
use crate::app::services::CatalogService;
use crate::context::ActorContext;

/// Raw listing query; empty parameters are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<ProductFilter, axum::response::Response> {
        let category = match self.category.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_id::<CategoryId>(raw, "category")?),
            _ => None,
        };
        Ok(ProductFilter { category, q: self.q })
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<CatalogService>>,
    Extension(ctx): Extension<ActorContext>,
    Query(query): Query<ListQuery>,
) -> axum::response::Response {
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(res) => return res,
    };

    match services.list_products(ctx.actor(), &filter).await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(e) => service_error_to_response(e),
    }
}

pub async fn product_detail(
    Extension(services): Extension<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match parse_id(&id, "product") {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.product_detail(id).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => service_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<CatalogService>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<ProductForm>,
) -> axum::response::Response {
    let actor = match ctx.require() {
        Ok(a) => a,
        Err(e) => return service_error_to_response(e.into()),
    };

    match services.create_product(actor, body).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => service_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<CatalogService>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProductRequest>,
) -> axum::response::Response {
    let actor = match ctx.require() {
        Ok(a) => a,
        Err(e) => return service_error_to_response(e.into()),
    };
    let id: ProductId = match parse_id(&id, "product") {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.update_product(actor, id, body).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "product": outcome.product,
                "saved_versions": outcome.saved_versions,
            })),
        )
            .into_response(),
        Err(e) => service_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<CatalogService>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let actor = match ctx.require() {
        Ok(a) => a,
        Err(e) => return service_error_to_response(e.into()),
    };
    let id: ProductId = match parse_id(&id, "product") {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.delete_product(actor, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_to_response(e),
    }
}

