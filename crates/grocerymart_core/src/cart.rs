//! crates/grocerymart_core/src/cart.rs
//!
//! The client-local shopping basket. The cart is an explicitly owned state
//! object: callers construct one over a [`CartStorage`] backend and thread it
//! through their UI layer rather than reaching for a hidden singleton.
//!
//! Every successful mutation writes the full line set back to storage, so a
//! basket survives process restarts. Loading is fail-soft: missing or
//! malformed storage yields an empty basket, never an error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{Category, Order, Product};

/// Fixed key under which the serialized line set is persisted.
pub const CART_STORAGE_KEY: &str = "cart";

//=========================================================================================
// Storage Port
//=========================================================================================

/// Durable key/value storage for the basket, e.g. a browser's local storage
/// or a file on disk. Writes are synchronous and ordered with respect to the
/// mutation that triggered them.
pub trait CartStorage {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str);
}

/// An in-memory [`CartStorage`], useful for tests and short-lived sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

//=========================================================================================
// Cart Lines
//=========================================================================================

/// The product fields captured when a line is added. The `stock` value is the
/// ceiling quantity checks run against until the line is next refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub offer_price: Option<f64>,
    pub image: String,
    /// Absent when the snapshot was rebuilt from an order line, which does
    /// not record a category.
    pub category: Option<Category>,
    pub stock: i32,
}

impl ProductSnapshot {
    /// Effective unit price for this snapshot.
    pub fn unit_price(&self) -> f64 {
        self.offer_price.unwrap_or(self.price)
    }
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            offer_price: product.offer_price,
            image: product.image.clone(),
            category: Some(product.category),
            stock: product.stock,
        }
    }
}

/// One product-and-quantity pairing in the basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        self.product.unit_price() * f64::from(self.quantity)
    }
}

//=========================================================================================
// Cart Engine
//=========================================================================================

/// The basket itself, generic over its storage backend.
pub struct Cart<S: CartStorage> {
    lines: Vec<CartLine>,
    storage: S,
}

impl<S: CartStorage> Cart<S> {
    /// Loads the persisted basket from `storage`, falling back to an empty
    /// basket when nothing was saved or the saved payload does not parse.
    pub fn load(storage: S) -> Self {
        let lines = storage
            .load(CART_STORAGE_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self { lines, storage }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds one unit of `product`, merging with an existing line for the same
    /// product id. Returns `false` without changing the basket when the
    /// product is out of stock or the line is already at its stock ceiling.
    pub fn add_to_cart(&mut self, product: &ProductSnapshot) -> bool {
        if product.stock <= 0 {
            return false;
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            // The ceiling is the stock recorded when the line was added, not
            // the incoming snapshot's.
            if i64::from(line.quantity) + 1 > i64::from(line.product.stock) {
                return false;
            }
            line.quantity += 1;
        } else {
            self.lines.push(CartLine {
                product: product.clone(),
                quantity: 1,
            });
        }

        self.persist();
        true
    }

    /// Deletes the line for `product_id` if present; no-op otherwise.
    pub fn remove_from_cart(&mut self, product_id: Uuid) {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);
        if self.lines.len() != before {
            self.persist();
        }
    }

    /// Sets the quantity for `product_id`. A quantity of zero or less removes
    /// the line. Returns `false` without changing the basket when the new
    /// quantity would exceed the line's recorded stock ceiling.
    pub fn update_quantity(&mut self, product_id: Uuid, quantity: i32) -> bool {
        if quantity <= 0 {
            self.remove_from_cart(product_id);
            return true;
        }

        let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) else {
            return false;
        };
        if quantity > line.product.stock {
            return false;
        }

        line.quantity = quantity as u32;
        self.persist();
        true
    }

    /// Empties the basket. Used after a successful checkout; safe to call on
    /// an already-empty basket.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Sum of effective unit price times quantity over all lines.
    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Re-adds every line of a previously placed order at its original
    /// quantity, one unit at a time. Order lines carry no live stock value,
    /// so fresh lines created here get an unbounded ceiling; merging into an
    /// existing line still runs against that line's recorded ceiling.
    pub fn reorder(&mut self, order: &Order) {
        for item in &order.items {
            let snapshot = ProductSnapshot {
                id: item.product_id,
                name: item.name.clone(),
                price: item.price,
                offer_price: None,
                image: item.image.clone(),
                category: None,
                stock: i32::MAX,
            };
            for _ in 0..item.quantity {
                if !self.add_to_cart(&snapshot) {
                    break;
                }
            }
        }
    }

    /// Consumes the cart, handing back its storage backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) {
        // Serializing a Vec of plain structs cannot fail; fall back to an
        // empty list rather than poisoning storage if it ever does.
        let raw = serde_json::to_string(&self.lines).unwrap_or_else(|_| "[]".to_string());
        self.storage.save(CART_STORAGE_KEY, &raw);
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderLine;
    use crate::domain::{OrderStatus, PaymentMethod, ShippingAddress};
    use chrono::Utc;

    fn snapshot(id: Uuid, price: f64, offer: Option<f64>, stock: i32) -> ProductSnapshot {
        ProductSnapshot {
            id,
            name: "Fresh Tomatoes".to_string(),
            price,
            offer_price: offer,
            image: "https://example.com/tomato.jpg".to_string(),
            category: Some(Category::Vegetables),
            stock,
        }
    }

    fn empty_cart() -> Cart<MemoryStorage> {
        Cart::load(MemoryStorage::new())
    }

    #[test]
    fn add_rejects_out_of_stock_product() {
        let mut cart = empty_cart();
        let sold_out = snapshot(Uuid::new_v4(), 40.0, None, 0);

        assert!(!cart.add_to_cart(&sold_out));
        assert!(cart.is_empty());
    }

    #[test]
    fn add_merges_lines_up_to_the_stock_ceiling() {
        let mut cart = empty_cart();
        let product = snapshot(Uuid::new_v4(), 40.0, None, 2);

        assert!(cart.add_to_cart(&product));
        assert!(cart.add_to_cart(&product));
        assert!(!cart.add_to_cart(&product));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn update_quantity_zero_is_remove() {
        let mut cart = empty_cart();
        let product = snapshot(Uuid::new_v4(), 40.0, None, 10);
        cart.add_to_cart(&product);

        assert!(cart.update_quantity(product.id, 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn update_quantity_respects_the_recorded_ceiling() {
        let mut cart = empty_cart();
        let product = snapshot(Uuid::new_v4(), 40.0, None, 3);
        cart.add_to_cart(&product);

        assert!(!cart.update_quantity(product.id, 4));
        assert_eq!(cart.lines()[0].quantity, 1);

        assert!(cart.update_quantity(product.id, 3));
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn update_quantity_on_missing_line_is_rejected() {
        let mut cart = empty_cart();
        assert!(!cart.update_quantity(Uuid::new_v4(), 2));
    }

    #[test]
    fn total_uses_the_offer_price_when_present() {
        let mut cart = empty_cart();
        let discounted = snapshot(Uuid::new_v4(), 40.0, Some(35.0), 10);
        let full_price = snapshot(Uuid::new_v4(), 100.0, None, 10);

        cart.add_to_cart(&discounted);
        cart.add_to_cart(&discounted);
        cart.add_to_cart(&full_price);

        assert_eq!(cart.total(), 170.0);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut cart = empty_cart();
        cart.add_to_cart(&snapshot(Uuid::new_v4(), 40.0, None, 5));

        cart.clear();
        assert!(cart.is_empty());
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn persisted_state_round_trips() {
        let product = snapshot(Uuid::new_v4(), 40.0, Some(35.0), 10);

        let mut cart = empty_cart();
        cart.add_to_cart(&product);
        cart.add_to_cart(&product);
        let storage = cart.into_storage();

        let reloaded = Cart::load(storage);
        assert_eq!(reloaded.lines().len(), 1);
        assert_eq!(reloaded.lines()[0].product.id, product.id);
        assert_eq!(reloaded.lines()[0].quantity, 2);
    }

    #[test]
    fn malformed_storage_yields_an_empty_cart() {
        let mut storage = MemoryStorage::new();
        storage.save(CART_STORAGE_KEY, "{not json");

        let cart = Cart::load(storage);
        assert!(cart.is_empty());
    }

    #[test]
    fn reorder_re_adds_lines_at_their_original_quantity() {
        let order = Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            items: vec![
                OrderLine {
                    product_id: Uuid::new_v4(),
                    name: "Fresh Milk".to_string(),
                    price: 55.0,
                    quantity: 3,
                    image: "https://example.com/milk.jpg".to_string(),
                },
                OrderLine {
                    product_id: Uuid::new_v4(),
                    name: "Oats".to_string(),
                    price: 110.0,
                    quantity: 1,
                    image: "https://example.com/oats.jpg".to_string(),
                },
            ],
            total: 275.0,
            address: ShippingAddress {
                full_name: "Demo User".to_string(),
                email: "demo@grocerymart.com".to_string(),
                phone: "9876543210".to_string(),
                address: "12 Market Road".to_string(),
                city: "Pune".to_string(),
                pincode: "411001".to_string(),
            },
            payment_method: PaymentMethod::Cod,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        let mut cart = empty_cart();
        cart.reorder(&order);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.lines()[1].quantity, 1);
        assert_eq!(cart.total(), 275.0);
    }

    #[test]
    fn reorder_merges_into_an_existing_line_against_its_ceiling() {
        let product = snapshot(Uuid::new_v4(), 55.0, None, 2);
        let mut cart = empty_cart();
        cart.add_to_cart(&product);

        let order = Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            items: vec![OrderLine {
                product_id: product.id,
                name: product.name.clone(),
                price: 55.0,
                quantity: 3,
                image: product.image.clone(),
            }],
            total: 165.0,
            address: ShippingAddress {
                full_name: "Demo User".to_string(),
                email: "demo@grocerymart.com".to_string(),
                phone: "9876543210".to_string(),
                address: "12 Market Road".to_string(),
                city: "Pune".to_string(),
                pincode: "411001".to_string(),
            },
            payment_method: PaymentMethod::Cod,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        cart.reorder(&order);

        // The existing line's recorded stock of 2 caps the merge.
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }
}
