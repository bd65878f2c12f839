use axum::{
    routing::{get, post},
    Router,
};

use crate::config::VersionRoutes;

pub mod categories;
pub mod products;
pub mod system;
pub mod versions;

/// Router for every catalog endpoint. Dormant version operations are mounted
/// only when enabled in `routes`.
pub fn router(routes: VersionRoutes) -> Router {
    let mut router = Router::new()
        .route("/", get(products::list_products))
        .route("/create", post(products::create_product))
        .route("/product/:id", get(products::product_detail))
        .route("/product/:id/update", post(products::update_product))
        .route("/product/:id/delete", post(products::delete_product))
        .route("/categories", get(categories::list_categories).post(categories::create_category))
        .route("/categories/:id", get(categories::get_category));

    if routes.create {
        router = router.route("/product/version/create", post(versions::create_version));
    }
    if routes.update {
        router = router.route("/product/version/update/:id", post(versions::update_version));
    }
    if routes.delete {
        router = router.route("/product/version/:id/delete", post(versions::delete_version));
    }
    if routes.detail {
        router = router.route("/product/version/:id/detail", get(versions::version_detail));
    }
    if routes.list {
        router = router.route("/product/version/list", get(versions::list_versions));
    }
    router
}
