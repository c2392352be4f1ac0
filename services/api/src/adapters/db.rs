//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `CatalogStore`, `OrderStore`, and `AccountStore`
//! ports from the `core` crate. It handles all interactions with the
//! PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use grocerymart_core::domain::{
    Order, OrderLine, OrderStatus, ParseEnumError, PaymentMethod, Product, Role, ShippingAddress,
    User, UserCredentials,
};
use grocerymart_core::ports::{
    AccountStore, CatalogStore, NewOrder, NewProduct, NewUser, OrderStore, PortError, PortResult,
    ProductPage, ProductQuery, ProductSort, ProductUpdate,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storefront's store ports.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, price, offer_price, stock, category, description, image, images, \
     created_at, updated_at";

const ORDER_COLUMNS: &str = "id, user_id, items, total, address, payment_method, status, created_at";

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

fn parse_enum(e: ParseEnumError) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

#[derive(FromRow)]
struct ProductRecord {
    id: Uuid,
    name: String,
    price: f64,
    offer_price: Option<f64>,
    stock: i32,
    category: String,
    description: String,
    image: String,
    images: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRecord {
    fn to_domain(self) -> PortResult<Product> {
        Ok(Product {
            id: self.id,
            name: self.name,
            price: self.price,
            offer_price: self.offer_price,
            stock: self.stock,
            category: self.category.parse().map_err(parse_enum)?,
            description: self.description,
            image: self.image,
            images: self.images,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct OrderRecord {
    id: Uuid,
    user_id: Uuid,
    items: Json<Vec<OrderLine>>,
    total: f64,
    address: Json<ShippingAddress>,
    payment_method: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl OrderRecord {
    fn to_domain(self) -> PortResult<Order> {
        let payment_method: PaymentMethod = self.payment_method.parse().map_err(parse_enum)?;
        let status: OrderStatus = self.status.parse().map_err(parse_enum)?;
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            items: self.items.0,
            total: self.total,
            address: self.address.0,
            payment_method,
            status,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        let role: Role = self.role.parse().map_err(parse_enum)?;
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            role,
            created_at: self.created_at,
        })
    }

    fn to_credentials(self) -> PortResult<UserCredentials> {
        let role: Role = self.role.parse().map_err(parse_enum)?;
        Ok(UserCredentials {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role,
        })
    }
}

//=========================================================================================
// Query Helpers
//=========================================================================================

/// Appends the category and search filters shared by the listing query and
/// its match count. Both start from `... WHERE 1=1` so every filter can be
/// pushed as an `AND` clause.
fn push_product_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    if let Some(category) = &query.category {
        builder
            .push(" AND category ILIKE ")
            .push_bind(format!("%{}%", category));
    }
    if let Some(search) = &query.search {
        let pattern = format!("%{}%", search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR category ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

//=========================================================================================
// `CatalogStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_products(&self, query: &ProductQuery) -> PortResult<ProductPage> {
        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM products WHERE 1=1");
        push_product_filters(&mut count_builder, query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;

        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM products WHERE 1=1",
            PRODUCT_COLUMNS
        ));
        push_product_filters(&mut builder, query);
        builder.push(match query.sort {
            Some(ProductSort::PriceLow) => " ORDER BY COALESCE(offer_price, price) ASC",
            Some(ProductSort::PriceHigh) => " ORDER BY COALESCE(offer_price, price) DESC",
            Some(ProductSort::Name) => " ORDER BY name ASC",
            None => " ORDER BY created_at ASC",
        });

        let limit = i64::from(query.limit.max(1));
        let page = i64::from(query.page.max(1));
        builder
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind((page - 1) * limit);

        let records: Vec<ProductRecord> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        let products = records
            .into_iter()
            .map(ProductRecord::to_domain)
            .collect::<PortResult<Vec<_>>>()?;
        Ok(ProductPage {
            products,
            total: total as u64,
        })
    }

    async fn get_product(&self, product_id: Uuid) -> PortResult<Product> {
        let record = sqlx::query_as::<_, ProductRecord>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Product {} not found", product_id)))?;
        record.to_domain()
    }

    async fn create_product(&self, new: NewProduct) -> PortResult<Product> {
        let record = sqlx::query_as::<_, ProductRecord>(&format!(
            "INSERT INTO products (id, name, price, offer_price, stock, category, description, image, images) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new.name)
        .bind(new.price)
        .bind(new.offer_price)
        .bind(new.stock)
        .bind(new.category.as_str())
        .bind(new.description)
        .bind(new.image)
        .bind(new.images)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn update_product(
        &self,
        product_id: Uuid,
        changes: ProductUpdate,
    ) -> PortResult<Product> {
        // `offer_price` can be set, cleared, or left alone, so it gets an
        // explicit touched flag instead of a COALESCE.
        let offer_touched = changes.offer_price.is_some();
        let offer_value = changes.offer_price.flatten();

        let record = sqlx::query_as::<_, ProductRecord>(&format!(
            "UPDATE products SET \
                 name = COALESCE($2, name), \
                 price = COALESCE($3, price), \
                 offer_price = CASE WHEN $4 THEN $5 ELSE offer_price END, \
                 stock = COALESCE($6, stock), \
                 category = COALESCE($7, category), \
                 description = COALESCE($8, description), \
                 image = COALESCE($9, image), \
                 images = COALESCE($10, images), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(changes.name)
        .bind(changes.price)
        .bind(offer_touched)
        .bind(offer_value)
        .bind(changes.stock)
        .bind(changes.category.map(|c| c.as_str()))
        .bind(changes.description)
        .bind(changes.image)
        .bind(changes.images)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Product {} not found", product_id)))?;
        record.to_domain()
    }

    async fn delete_product(&self, product_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Product {} not found",
                product_id
            )));
        }
        Ok(())
    }

    async fn adjust_stock(&self, product_id: Uuid, delta: i32) -> PortResult<Product> {
        // A single row update: atomic per product, no clamp at zero.
        let record = sqlx::query_as::<_, ProductRecord>(&format!(
            "UPDATE products SET stock = stock + $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Product {} not found", product_id)))?;
        record.to_domain()
    }

    async fn count_products(&self) -> PortResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(count as u64)
    }
}

//=========================================================================================
// `OrderStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl OrderStore for PgStore {
    async fn create_order(&self, new: NewOrder) -> PortResult<Order> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "INSERT INTO orders (id, user_id, items, total, address, payment_method, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(Json(new.items))
        .bind(new.total)
        .bind(Json(new.address))
        .bind(new.payment_method.as_str())
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn orders_for_user(&self, user_id: Uuid) -> PortResult<Vec<Order>> {
        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at ASC",
            ORDER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(OrderRecord::to_domain).collect()
    }

    async fn all_orders(&self) -> PortResult<Vec<Order>> {
        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {} FROM orders ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(OrderRecord::to_domain).collect()
    }

    async fn set_status(&self, order_id: Uuid, status: OrderStatus) -> PortResult<Order> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Order {} not found", order_id)))?;
        record.to_domain()
    }
}

//=========================================================================================
// `AccountStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AccountStore for PgStore {
    async fn create_user(&self, new: NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, email, password_hash, role, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new.name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Unique violation on the email column.
            if e.as_database_error()
                .and_then(|d| d.code())
                .is_some_and(|code| code == "23505")
            {
                PortError::Conflict("User already exists".to_string())
            } else {
                unexpected(e)
            }
        })?;
        record.to_domain()
    }

    async fn find_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password_hash, role, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        record.map(UserRecord::to_credentials).transpose()
    }
}
