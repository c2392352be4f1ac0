//! services/api/src/web/products.rs
//!
//! Catalog endpoints: public listing and lookup, admin-gated writes.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::web::middleware::authorize_admin;
use crate::web::state::AppState;
use crate::web::{error_response, ErrorResponse, Message};
use grocerymart_core::domain::Product;
use grocerymart_core::ports::{NewProduct, PortError, ProductQuery, ProductSort, ProductUpdate};

const DEFAULT_PAGE_SIZE: u32 = 12;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsParams {
    /// Category filter; "all" or absent means every category.
    pub category: Option<String>,
    /// Case-insensitive substring search over name, category, and description.
    pub search: Option<String>,
    /// One of "price-low", "price-high", "name".
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_products: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub price: f64,
    pub offer_price: Option<f64>,
    pub stock: i32,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub image: String,
    pub images: Option<Vec<String>>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub offer_price: Option<f64>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/products - List the catalog with filters and pagination
#[utoipa::path(
    get,
    path = "/api/products",
    params(ListProductsParams),
    responses(
        (status = 200, description = "One page of products with pagination info"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_products_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListProductsParams>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let query = ProductQuery {
        category: params.category.filter(|c| c != "all"),
        search: params.search,
        sort: params.sort_by.as_deref().and_then(|s| match s {
            "price-low" => Some(ProductSort::PriceLow),
            "price-high" => Some(ProductSort::PriceHigh),
            "name" => Some(ProductSort::Name),
            _ => None,
        }),
        page,
        limit,
    };

    let result = state.catalog.list_products(&query).await.map_err(|e| {
        error!("Failed to list products: {:?}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error fetching products")
    })?;

    let total_pages = result.total.div_ceil(u64::from(limit));
    let pagination = Pagination {
        current_page: page,
        total_pages,
        total_products: result.total,
        has_next_page: u64::from(page) < total_pages,
        has_prev_page: page > 1,
    };

    Ok(Json(ProductListResponse {
        products: result.products,
        pagination,
    }))
}

/// GET /api/products/{id} - Fetch a single product
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_product_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let product = state.catalog.get_product(id).await.map_err(|e| match e {
        PortError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "Product not found"),
        e => {
            error!("Failed to fetch product {}: {:?}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error fetching product")
        }
    })?;

    Ok(Json(product))
}

/// POST /api/products - Create a product (admin only)
pub async fn create_product_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    authorize_admin(&state, &headers)?;

    let category = req.category.parse().map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            &format!("Error creating product: {}", e),
        )
    })?;

    // A product always carries at least its primary image in the gallery.
    let images = match req.images {
        Some(images) if !images.is_empty() => images,
        _ => vec![req.image.clone()],
    };

    let product = state
        .catalog
        .create_product(NewProduct {
            name: req.name,
            price: req.price,
            offer_price: req.offer_price,
            stock: req.stock,
            category,
            description: req.description,
            image: req.image,
            images,
        })
        .await
        .map_err(|e| {
            error!("Failed to create product: {:?}", e);
            error_response(StatusCode::BAD_REQUEST, "Error creating product")
        })?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id} - Update a product (admin only)
pub async fn update_product_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    authorize_admin(&state, &headers)?;

    let category = match req.category {
        Some(raw) => Some(raw.parse().map_err(|e| {
            error_response(
                StatusCode::BAD_REQUEST,
                &format!("Error updating product: {}", e),
            )
        })?),
        None => None,
    };

    let changes = ProductUpdate {
        name: req.name,
        price: req.price,
        offer_price: req.offer_price.map(Some),
        stock: req.stock,
        category,
        description: req.description,
        image: req.image,
        images: req.images,
    };

    let product = state
        .catalog
        .update_product(id, changes)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "Product not found"),
            e => {
                error!("Failed to update product {}: {:?}", id, e);
                error_response(StatusCode::BAD_REQUEST, "Error updating product")
            }
        })?;

    Ok(Json(product))
}

/// DELETE /api/products/{id} - Delete a product (admin only)
pub async fn delete_product_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ErrorResponse> {
    authorize_admin(&state, &headers)?;

    state.catalog.delete_product(id).await.map_err(|e| match e {
        PortError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "Product not found"),
        e => {
            error!("Failed to delete product {}: {:?}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error deleting product",
            )
        }
    })?;

    Ok(Json(Message {
        message: "Product deleted successfully".to_string(),
    }))
}
