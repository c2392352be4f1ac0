//! crates/grocerymart_core/src/validate.rs
//!
//! Field-level validation for the checkout shipping form. Failures are
//! reported per field and block submission before anything is sent to the
//! server.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::domain::ShippingAddress;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone regex"));
static PINCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("pincode regex"));

/// Per-field validation messages, keyed by the wire-level field name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn put(&mut self, field: &'static str, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

/// Validates a shipping form. All six fields are required; email, phone, and
/// pincode must additionally match their formats.
pub fn validate_shipping(address: &ShippingAddress) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if address.full_name.trim().is_empty() {
        errors.put("fullName", "Full name is required");
    }
    if address.email.trim().is_empty() {
        errors.put("email", "Email is required");
    } else if !EMAIL_RE.is_match(&address.email) {
        errors.put("email", "Please enter a valid email");
    }
    if address.phone.trim().is_empty() {
        errors.put("phone", "Phone number is required");
    } else if !PHONE_RE.is_match(&address.phone) {
        errors.put("phone", "Please enter a valid 10-digit phone number");
    }
    if address.address.trim().is_empty() {
        errors.put("address", "Address is required");
    }
    if address.city.trim().is_empty() {
        errors.put("city", "City is required");
    }
    if address.pincode.trim().is_empty() {
        errors.put("pincode", "Pincode is required");
    } else if !PINCODE_RE.is_match(&address.pincode) {
        errors.put("pincode", "Please enter a valid 6-digit pincode");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Demo User".to_string(),
            email: "demo@grocerymart.com".to_string(),
            phone: "9876543210".to_string(),
            address: "12 Market Road".to_string(),
            city: "Pune".to_string(),
            pincode: "411001".to_string(),
        }
    }

    #[test]
    fn a_complete_form_passes() {
        assert!(validate_shipping(&valid_address()).is_ok());
    }

    #[test]
    fn blank_fields_are_each_reported() {
        let blank = ShippingAddress {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            pincode: String::new(),
        };

        let errors = validate_shipping(&blank).unwrap_err();
        assert_eq!(errors.0.len(), 6);
        assert_eq!(errors.0["fullName"], "Full name is required");
    }

    #[test]
    fn email_format_is_checked() {
        let mut address = valid_address();
        address.email = "not-an-email".to_string();

        let errors = validate_shipping(&address).unwrap_err();
        assert_eq!(errors.0["email"], "Please enter a valid email");
    }

    #[test]
    fn phone_must_be_exactly_ten_digits() {
        let mut address = valid_address();
        address.phone = "12345".to_string();
        assert!(validate_shipping(&address).is_err());

        address.phone = "123456789012".to_string();
        assert!(validate_shipping(&address).is_err());

        address.phone = "1234567890".to_string();
        assert!(validate_shipping(&address).is_ok());
    }

    #[test]
    fn pincode_must_be_exactly_six_digits() {
        let mut address = valid_address();
        address.pincode = "41100".to_string();
        assert!(validate_shipping(&address).is_err());

        address.pincode = "41100a".to_string();
        assert!(validate_shipping(&address).is_err());
    }
}
