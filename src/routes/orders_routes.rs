use axum::{Router, routing::get};

use crate::{AppState, controllers::orders_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/orders",
            get(orders_controller::get_order_form).post(orders_controller::post_order),
        )
        .route("/orders/history", get(orders_controller::get_order_history))
}
