//! Cart line items and delivery options.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{ProductId, RestaurantId};

/// One entry in the cart.
///
/// Line identity is the `(id, restaurant)` pair: the same product added
/// from two different restaurants forms two separate lines, while repeat
/// adds of the same pair merge into one line. `quantity` is at least 1 for
/// any line present in the ledger; dropping to 0 removes the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identifier.
    pub id: ProductId,
    /// Display name captured at add time.
    pub name: String,
    /// Unit price, non-negative.
    pub price: Decimal,
    /// Number of units.
    pub quantity: u32,
    /// Product image URL captured at add time.
    pub image: String,
    /// Restaurant the product belongs to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<RestaurantId>,
}

impl CartItem {
    /// Whether this line has the given `(id, restaurant)` identity.
    #[must_use]
    pub fn matches(&self, id: &ProductId, restaurant: Option<&RestaurantId>) -> bool {
        self.id == *id && self.restaurant.as_ref() == restaurant
    }

    /// Whether this line and `other` are the same line for merge purposes.
    #[must_use]
    pub fn same_line(&self, other: &Self) -> bool {
        self.matches(&other.id, other.restaurant.as_ref())
    }

    /// Price times quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The user's choice between self-pickup and delivery-to-address.
///
/// `distance_km` is only meaningful under `Delivery` and defaults to 0
/// when the address has not been geocoded yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeliveryOption {
    /// Customer picks the order up themselves; no delivery fee.
    #[default]
    Pickup,
    /// Courier delivery to an address.
    Delivery {
        /// Distance from the restaurant in kilometers, non-negative.
        #[serde(default)]
        distance_km: Decimal,
        /// Street address, when the user has selected one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        address: Option<String>,
    },
}

impl DeliveryOption {
    /// Delivery over the given distance, with no address yet.
    #[must_use]
    pub const fn delivery(distance_km: Decimal) -> Self {
        Self::Delivery {
            distance_km,
            address: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, restaurant: Option<&str>) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: "Margherita".to_owned(),
            price: Decimal::from(10),
            quantity: 2,
            image: "https://img.example/margherita.jpg".to_owned(),
            restaurant: restaurant.map(RestaurantId::new),
        }
    }

    #[test]
    fn test_line_identity_includes_restaurant() {
        let a = item("p1", Some("r1"));
        let b = item("p1", Some("r2"));
        let c = item("p1", None);
        assert!(a.same_line(&a.clone()));
        assert!(!a.same_line(&b));
        assert!(!a.same_line(&c));
    }

    #[test]
    fn test_line_total() {
        let line = item("p1", None);
        assert_eq!(line.line_total(), Decimal::from(20));
    }

    #[test]
    fn test_delivery_option_serde_tag() {
        let json = serde_json::to_string(&DeliveryOption::Pickup).unwrap();
        assert_eq!(json, r#"{"type":"pickup"}"#);

        let parsed: DeliveryOption =
            serde_json::from_str(r#"{"type":"delivery","distance_km":"3"}"#).unwrap();
        assert_eq!(parsed, DeliveryOption::delivery(Decimal::from(3)));
    }

    #[test]
    fn test_delivery_distance_defaults_to_zero() {
        let parsed: DeliveryOption = serde_json::from_str(r#"{"type":"delivery"}"#).unwrap();
        let DeliveryOption::Delivery { distance_km, address } = parsed else {
            panic!("expected delivery variant");
        };
        assert_eq!(distance_km, Decimal::ZERO);
        assert_eq!(address, None);
    }
}
