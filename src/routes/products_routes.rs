use axum::{Router, routing::get};

use crate::{AppState, controllers::products_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/products", get(products_controller::get_products))
        .route(
            "/products/new",
            get(products_controller::get_product_new).post(products_controller::post_product_new),
        )
        .route(
            "/products/:id/restock",
            get(products_controller::get_restock).post(products_controller::post_restock),
        )
}
