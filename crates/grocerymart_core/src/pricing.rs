//! crates/grocerymart_core/src/pricing.rs
//!
//! Delivery fee and order total rules.

/// Subtotal at or above which delivery is free.
pub const FREE_DELIVERY_THRESHOLD: f64 = 500.0;

/// Flat surcharge applied below the free-delivery threshold.
pub const DELIVERY_FEE: f64 = 50.0;

/// The delivery fee for a given cart subtotal.
pub fn delivery_fee(subtotal: f64) -> f64 {
    if subtotal >= FREE_DELIVERY_THRESHOLD {
        0.0
    } else {
        DELIVERY_FEE
    }
}

/// Grand total: subtotal plus delivery fee.
pub fn order_total(subtotal: f64) -> f64 {
    subtotal + delivery_fee(subtotal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_applies_below_the_threshold() {
        assert_eq!(delivery_fee(499.0), 50.0);
        assert_eq!(order_total(499.0), 549.0);
    }

    #[test]
    fn delivery_is_free_at_the_threshold() {
        assert_eq!(delivery_fee(500.0), 0.0);
        assert_eq!(order_total(500.0), 500.0);
    }

    #[test]
    fn fee_applies_to_an_empty_subtotal() {
        assert_eq!(order_total(0.0), 50.0);
    }
}
