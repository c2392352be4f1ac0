//! services/api/src/web/mod.rs
//!
//! Web layer: handlers, middleware, shared response helpers, and the master
//! OpenAPI definition.

pub mod auth;
pub mod middleware;
pub mod orders;
pub mod products;
pub mod state;
pub mod token;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

pub use middleware::require_auth;

//=========================================================================================
// Shared Response Helpers
//=========================================================================================

/// The body shape used for every non-2xx response: `{ "message": "..." }`.
#[derive(Serialize, ToSchema)]
pub struct Message {
    pub message: String,
}

/// A handler error: status code plus a JSON message body.
pub type ErrorResponse = (StatusCode, Json<Message>);

pub fn error_response(status: StatusCode, message: &str) -> ErrorResponse {
    (
        status,
        Json(Message {
            message: message.to_string(),
        }),
    )
}

/// GET / - Liveness banner.
pub async fn root_handler() -> &'static str {
    "Grocery Backend Running"
}

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        products::list_products_handler,
        products::get_product_handler,
        orders::create_order_handler,
        orders::list_orders_handler,
        orders::admin_orders_handler,
        orders::cancel_order_handler,
    ),
    components(schemas(auth::AuthResponse, auth::UserDto, Message)),
    tags(
        (name = "GroceryMart API", description = "REST endpoints for the grocery storefront.")
    )
)]
pub struct ApiDoc;
