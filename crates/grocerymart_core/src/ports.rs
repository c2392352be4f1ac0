//! crates/grocerymart_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the storefront's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Category, Order, OrderLine, OrderStatus, PaymentMethod, Product, Role, ShippingAddress, User,
    UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Catalog Query Types
//=========================================================================================

/// Sort orders accepted by the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    /// Ascending by effective unit price.
    PriceLow,
    /// Descending by effective unit price.
    PriceHigh,
    /// Ascending by name.
    Name,
}

/// Filter, sort, and pagination parameters for a catalog listing.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Case-insensitive category filter. `None` means all categories.
    pub category: Option<String>,
    /// Case-insensitive substring match over name, category, and description.
    pub search: Option<String>,
    pub sort: Option<ProductSort>,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

/// One page of catalog results plus the unpaginated match count.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
}

/// Fields for a product about to be created.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub offer_price: Option<f64>,
    pub stock: i32,
    pub category: Category,
    pub description: String,
    pub image: String,
    pub images: Vec<String>,
}

/// A partial product update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub offer_price: Option<Option<f64>>,
    pub stock: Option<i32>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Fields for an order about to be created. The total is the client-computed
/// grand total and is stored as provided.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub items: Vec<OrderLine>,
    pub total: f64,
    pub address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// Fields for an account about to be created.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_products(&self, query: &ProductQuery) -> PortResult<ProductPage>;

    async fn get_product(&self, product_id: Uuid) -> PortResult<Product>;

    async fn create_product(&self, new: NewProduct) -> PortResult<Product>;

    async fn update_product(&self, product_id: Uuid, changes: ProductUpdate)
        -> PortResult<Product>;

    async fn delete_product(&self, product_id: Uuid) -> PortResult<()>;

    /// Applies `stock += delta` as a single atomic row update. The result is
    /// not clamped at zero; callers that over-decrement drive stock negative.
    async fn adjust_stock(&self, product_id: Uuid, delta: i32) -> PortResult<Product>;

    async fn count_products(&self) -> PortResult<u64>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, new: NewOrder) -> PortResult<Order>;

    /// Orders placed by one user, oldest first.
    async fn orders_for_user(&self, user_id: Uuid) -> PortResult<Vec<Order>>;

    /// Every order in the store, newest first.
    async fn all_orders(&self) -> PortResult<Vec<Order>>;

    /// Unconditional status transition; returns the updated order.
    async fn set_status(&self, order_id: Uuid, status: OrderStatus) -> PortResult<Order>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_user(&self, new: NewUser) -> PortResult<User>;

    async fn find_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>>;
}
