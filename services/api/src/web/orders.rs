//! services/api/src/web/orders.rs
//!
//! Order endpoints: checkout, per-user history, the admin listing, and
//! cancellation. The checkout orchestration itself lives in the core crate;
//! these handlers translate between the wire and the ports.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::middleware::AuthUser;
use crate::web::state::AppState;
use crate::web::{error_response, ErrorResponse};
use grocerymart_core::checkout;
use grocerymart_core::domain::{OrderLine, PaymentMethod, Role, ShippingAddress};
use grocerymart_core::ports::PortError;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct OrderItemRequest {
    /// The catalog id of the purchased product.
    pub product: Uuid,
    pub name: String,
    /// Unit price at time of purchase.
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    /// Client-computed grand total, stored as provided.
    pub total: f64,
    #[schema(value_type = Object)]
    pub address: ShippingAddress,
    pub payment_method: Option<String>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/orders - Place an order from the submitted cart snapshot
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created"),
        (status = 400, description = "Invalid order payload"),
        (status = 401, description = "Missing bearer token"),
        (status = 500, description = "Order creation failed")
    )
)]
pub async fn create_order_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let payment_method = match req.payment_method.as_deref() {
        None => PaymentMethod::default(),
        Some(raw) => raw
            .parse()
            .map_err(|e| error_response(StatusCode::BAD_REQUEST, &format!("{}", e)))?,
    };

    let items: Vec<OrderLine> = req
        .items
        .into_iter()
        .map(|item| OrderLine {
            product_id: item.product,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
            image: item.image,
        })
        .collect();

    let order = checkout::place_order(
        state.catalog.as_ref(),
        state.orders.as_ref(),
        user.user_id,
        items,
        req.total,
        req.address,
        payment_method,
    )
    .await
    .map_err(|e| match e {
        PortError::Invalid(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
        e => {
            error!("Order creation error: {:?}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Order creation failed")
        }
    })?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders - List the caller's orders
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "The caller's orders"),
        (status = 401, description = "Missing bearer token"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_orders_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let orders = state
        .orders
        .orders_for_user(user.user_id)
        .await
        .map_err(|e| {
            error!("Failed to fetch orders: {:?}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch orders")
        })?;

    Ok(Json(orders))
}

/// GET /api/admin/orders - List every order, newest first (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    responses(
        (status = 200, description = "All orders, newest first"),
        (status = 401, description = "Missing bearer token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn admin_orders_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ErrorResponse> {
    if user.role != Role::Admin {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "Admin access required",
        ));
    }

    let orders = state.orders.all_orders().await.map_err(|e| {
        error!("Failed to fetch orders: {:?}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch orders")
    })?;

    Ok(Json(orders))
}

/// PUT /api/orders/{id}/cancel - Cancel an order
///
/// The transition is unconditional and stock consumed by the order is not
/// restored.
#[utoipa::path(
    put,
    path = "/api/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "The cancelled order"),
        (status = 400, description = "Cancel failed")
    )
)]
pub async fn cancel_order_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let order = checkout::cancel_order(state.orders.as_ref(), id)
        .await
        .map_err(|e| {
            error!("Failed to cancel order {}: {:?}", id, e);
            error_response(StatusCode::BAD_REQUEST, "Cancel failed")
        })?;

    Ok(Json(order))
}
