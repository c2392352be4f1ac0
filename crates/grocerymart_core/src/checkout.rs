//! crates/grocerymart_core/src/checkout.rs
//!
//! Converts a cart snapshot into a persisted order and adjusts catalog stock.
//!
//! The flow is a sequence of independent per-item updates, not one atomic
//! transaction: each line's stock decrement is applied on its own, and the
//! order insert happens after all decrements. A failure mid-way leaves the
//! decrements already applied in place with no compensation, and a decrement
//! is never checked against current stock first. Both behaviors are recorded
//! storefront semantics and are pinned by the tests below.

use uuid::Uuid;

use crate::cart::CartLine;
use crate::domain::{Order, OrderLine, OrderStatus, PaymentMethod, ShippingAddress};
use crate::ports::{CatalogStore, NewOrder, OrderStore, PortError, PortResult};

/// Builds denormalized order lines from cart lines, freezing the effective
/// unit price of each product at its current value.
pub fn order_lines(lines: &[CartLine]) -> Vec<OrderLine> {
    lines
        .iter()
        .map(|line| OrderLine {
            product_id: line.product.id,
            name: line.product.name.clone(),
            price: line.product.unit_price(),
            quantity: line.quantity,
            image: line.product.image.clone(),
        })
        .collect()
}

/// Places an order: decrements stock for every line, then creates one order
/// record with the denormalized line snapshots and the client-provided total.
///
/// A line whose product has disappeared from the catalog is skipped rather
/// than treated as fatal; the order still records the line. Any other store
/// error aborts the flow, leaving decrements already applied in place.
pub async fn place_order(
    catalog: &dyn CatalogStore,
    orders: &dyn OrderStore,
    user_id: Uuid,
    items: Vec<OrderLine>,
    total: f64,
    address: ShippingAddress,
    payment_method: PaymentMethod,
) -> PortResult<Order> {
    if items.is_empty() {
        return Err(PortError::Invalid("order has no items".to_string()));
    }

    for line in &items {
        let delta = -i32::try_from(line.quantity)
            .map_err(|_| PortError::Invalid(format!("quantity {} out of range", line.quantity)))?;
        match catalog.adjust_stock(line.product_id, delta).await {
            Ok(_) => {}
            // Stale basket referencing a deleted product: skip the decrement,
            // keep the line.
            Err(PortError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
    }

    orders
        .create_order(NewOrder {
            user_id,
            items,
            total,
            address,
            payment_method,
        })
        .await
}

/// Transitions an order to cancelled, unconditionally. Stock consumed by the
/// order is NOT restored.
pub async fn cancel_order(orders: &dyn OrderStore, order_id: Uuid) -> PortResult<Order> {
    orders.set_status(order_id, OrderStatus::Cancelled).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Product};
    use crate::ports::{NewProduct, ProductPage, ProductQuery, ProductUpdate};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    //-------------------------------------------------------------------------------------
    // In-memory stores
    //-------------------------------------------------------------------------------------

    #[derive(Default)]
    struct MemCatalog {
        products: Mutex<HashMap<Uuid, Product>>,
        /// When set, `adjust_stock` for this product fails, simulating a
        /// persistence error mid-checkout.
        fail_on: Option<Uuid>,
    }

    impl MemCatalog {
        fn insert(&self, name: &str, price: f64, stock: i32) -> Uuid {
            let id = Uuid::new_v4();
            let now = Utc::now();
            self.products.lock().unwrap().insert(
                id,
                Product {
                    id,
                    name: name.to_string(),
                    price,
                    offer_price: None,
                    stock,
                    category: Category::Vegetables,
                    description: String::new(),
                    image: String::new(),
                    images: vec![String::new()],
                    created_at: now,
                    updated_at: now,
                },
            );
            id
        }

        fn stock_of(&self, id: Uuid) -> i32 {
            self.products.lock().unwrap()[&id].stock
        }
    }

    #[async_trait]
    impl CatalogStore for MemCatalog {
        async fn list_products(&self, _query: &ProductQuery) -> PortResult<ProductPage> {
            let products: Vec<Product> = self.products.lock().unwrap().values().cloned().collect();
            let total = products.len() as u64;
            Ok(ProductPage { products, total })
        }

        async fn get_product(&self, product_id: Uuid) -> PortResult<Product> {
            self.products
                .lock()
                .unwrap()
                .get(&product_id)
                .cloned()
                .ok_or_else(|| PortError::NotFound(format!("Product {} not found", product_id)))
        }

        async fn create_product(&self, _new: NewProduct) -> PortResult<Product> {
            unreachable!("not exercised by checkout tests")
        }

        async fn update_product(
            &self,
            _product_id: Uuid,
            _changes: ProductUpdate,
        ) -> PortResult<Product> {
            unreachable!("not exercised by checkout tests")
        }

        async fn delete_product(&self, product_id: Uuid) -> PortResult<()> {
            self.products.lock().unwrap().remove(&product_id);
            Ok(())
        }

        async fn adjust_stock(&self, product_id: Uuid, delta: i32) -> PortResult<Product> {
            if self.fail_on == Some(product_id) {
                return Err(PortError::Unexpected("simulated write failure".to_string()));
            }
            let mut products = self.products.lock().unwrap();
            let product = products
                .get_mut(&product_id)
                .ok_or_else(|| PortError::NotFound(format!("Product {} not found", product_id)))?;
            product.stock += delta;
            Ok(product.clone())
        }

        async fn count_products(&self) -> PortResult<u64> {
            Ok(self.products.lock().unwrap().len() as u64)
        }
    }

    #[derive(Default)]
    struct MemOrders {
        orders: Mutex<Vec<Order>>,
    }

    #[async_trait]
    impl OrderStore for MemOrders {
        async fn create_order(&self, new: NewOrder) -> PortResult<Order> {
            let order = Order {
                id: Uuid::new_v4(),
                user_id: new.user_id,
                items: new.items,
                total: new.total,
                address: new.address,
                payment_method: new.payment_method,
                status: OrderStatus::Pending,
                created_at: Utc::now(),
            };
            self.orders.lock().unwrap().push(order.clone());
            Ok(order)
        }

        async fn orders_for_user(&self, user_id: Uuid) -> PortResult<Vec<Order>> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn all_orders(&self) -> PortResult<Vec<Order>> {
            let mut orders = self.orders.lock().unwrap().clone();
            orders.reverse();
            Ok(orders)
        }

        async fn set_status(&self, order_id: Uuid, status: OrderStatus) -> PortResult<Order> {
            let mut orders = self.orders.lock().unwrap();
            let order = orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or_else(|| PortError::NotFound(format!("Order {} not found", order_id)))?;
            order.status = status;
            Ok(order.clone())
        }
    }

    //-------------------------------------------------------------------------------------
    // Helpers
    //-------------------------------------------------------------------------------------

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Demo User".to_string(),
            email: "demo@grocerymart.com".to_string(),
            phone: "9876543210".to_string(),
            address: "12 Market Road".to_string(),
            city: "Pune".to_string(),
            pincode: "411001".to_string(),
        }
    }

    fn line(product_id: Uuid, price: f64, quantity: u32) -> OrderLine {
        OrderLine {
            product_id,
            name: "item".to_string(),
            price,
            quantity,
            image: String::new(),
        }
    }

    //-------------------------------------------------------------------------------------
    // Tests
    //-------------------------------------------------------------------------------------

    #[tokio::test]
    async fn placing_an_order_decrements_each_line_and_creates_one_order() {
        let catalog = MemCatalog::default();
        let orders = MemOrders::default();
        let a = catalog.insert("Fresh Tomatoes", 40.0, 100);
        let b = catalog.insert("Fresh Milk", 60.0, 50);
        let user_id = Uuid::new_v4();

        let order = place_order(
            &catalog,
            &orders,
            user_id,
            vec![line(a, 35.0, 2), line(b, 55.0, 1)],
            175.0,
            address(),
            PaymentMethod::Cod,
        )
        .await
        .unwrap();

        assert_eq!(catalog.stock_of(a), 98);
        assert_eq!(catalog.stock_of(b), 49);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert_eq!(orders.orders_for_user(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn an_empty_order_is_rejected() {
        let catalog = MemCatalog::default();
        let orders = MemOrders::default();

        let result = place_order(
            &catalog,
            &orders,
            Uuid::new_v4(),
            Vec::new(),
            0.0,
            address(),
            PaymentMethod::Cod,
        )
        .await;

        assert!(matches!(result, Err(PortError::Invalid(_))));
    }

    #[tokio::test]
    async fn the_decrement_is_unconditional_and_can_go_negative() {
        let catalog = MemCatalog::default();
        let orders = MemOrders::default();
        let a = catalog.insert("Strawberries", 200.0, 1);

        place_order(
            &catalog,
            &orders,
            Uuid::new_v4(),
            vec![line(a, 180.0, 5)],
            950.0,
            address(),
            PaymentMethod::Card,
        )
        .await
        .unwrap();

        assert_eq!(catalog.stock_of(a), -4);
    }

    #[tokio::test]
    async fn a_deleted_product_is_skipped_but_its_line_is_kept() {
        let catalog = MemCatalog::default();
        let orders = MemOrders::default();
        let a = catalog.insert("Paneer", 180.0, 30);
        let gone = Uuid::new_v4();

        let order = place_order(
            &catalog,
            &orders,
            Uuid::new_v4(),
            vec![line(a, 160.0, 1), line(gone, 20.0, 2)],
            250.0,
            address(),
            PaymentMethod::Upi,
        )
        .await
        .unwrap();

        assert_eq!(catalog.stock_of(a), 29);
        assert_eq!(order.items.len(), 2);
    }

    #[tokio::test]
    async fn a_store_failure_aborts_without_rolling_back_earlier_decrements() {
        let mut catalog = MemCatalog::default();
        let orders = MemOrders::default();
        let a = catalog.insert("Basmati Rice", 200.0, 100);
        let b = catalog.insert("Oats", 120.0, 60);
        catalog.fail_on = Some(b);

        let result = place_order(
            &catalog,
            &orders,
            Uuid::new_v4(),
            vec![line(a, 180.0, 2), line(b, 110.0, 1)],
            470.0,
            address(),
            PaymentMethod::Cod,
        )
        .await;

        assert!(matches!(result, Err(PortError::Unexpected(_))));
        // The first line's decrement stands; no order was written.
        assert_eq!(catalog.stock_of(a), 98);
        assert!(orders.all_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancelling_sets_the_status_and_leaves_stock_alone() {
        let catalog = MemCatalog::default();
        let orders = MemOrders::default();
        let a = catalog.insert("Green Tea", 120.0, 70);

        let order = place_order(
            &catalog,
            &orders,
            Uuid::new_v4(),
            vec![line(a, 110.0, 3)],
            380.0,
            address(),
            PaymentMethod::Cod,
        )
        .await
        .unwrap();
        assert_eq!(catalog.stock_of(a), 67);

        let cancelled = cancel_order(&orders, order.id).await.unwrap();

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        // Cancellation does not re-increment stock.
        assert_eq!(catalog.stock_of(a), 67);
    }

    #[tokio::test]
    async fn cancelling_a_missing_order_reports_not_found() {
        let orders = MemOrders::default();
        let result = cancel_order(&orders, Uuid::new_v4()).await;
        assert!(matches!(result, Err(PortError::NotFound(_))));
    }

    #[test]
    fn order_lines_freeze_the_effective_unit_price() {
        use crate::cart::{Cart, MemoryStorage, ProductSnapshot};

        let mut cart = Cart::load(MemoryStorage::new());
        let discounted = ProductSnapshot {
            id: Uuid::new_v4(),
            name: "Fresh Tomatoes".to_string(),
            price: 40.0,
            offer_price: Some(35.0),
            image: "https://example.com/tomato.jpg".to_string(),
            category: Some(Category::Vegetables),
            stock: 10,
        };
        cart.add_to_cart(&discounted);
        cart.add_to_cart(&discounted);

        let lines = order_lines(cart.lines());

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].price, 35.0);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].line_total(), 70.0);
    }
}
