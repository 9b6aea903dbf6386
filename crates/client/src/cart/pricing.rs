//! Derived pricing over cart lines and the delivery option.
//!
//! Pure functions: no state, no I/O, no rounding. Presentation-layer
//! formatting happens elsewhere.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dlizza_core::{CartItem, DeliveryOption};

/// Delivery fee policy: a flat base plus a linear per-kilometer charge.
///
/// The amounts are policy, not physics - both are configurable - but the
/// shape is fixed: zero for pickup, linear in distance for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFees {
    /// Flat fee charged for any courier delivery.
    pub base: Decimal,
    /// Additional fee per kilometer from the restaurant.
    pub per_km: Decimal,
}

impl Default for DeliveryFees {
    fn default() -> Self {
        Self {
            base: Decimal::from(20),
            per_km: Decimal::from(5),
        }
    }
}

/// The four derived values recomputed after every cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of price times quantity over all lines.
    pub subtotal: Decimal,
    /// Fee for the selected delivery option.
    pub delivery_fee: Decimal,
    /// `subtotal + delivery_fee`.
    pub total: Decimal,
    /// Sum of quantities over all lines.
    pub item_count: u32,
}

/// Sum of `price * quantity` over all lines.
#[must_use]
pub fn subtotal(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::line_total).sum()
}

/// Total number of units across all lines.
#[must_use]
pub fn item_count(items: &[CartItem]) -> u32 {
    items.iter().map(|item| item.quantity).sum()
}

/// Fee for the delivery option: zero for pickup, `base + per_km *
/// distance_km` for delivery. A stored distance is ignored under pickup.
#[must_use]
pub fn delivery_fee(option: &DeliveryOption, fees: &DeliveryFees) -> Decimal {
    match option {
        DeliveryOption::Pickup => Decimal::ZERO,
        DeliveryOption::Delivery { distance_km, .. } => fees.base + fees.per_km * *distance_km,
    }
}

/// All derived values in one pass.
#[must_use]
pub fn totals(items: &[CartItem], option: &DeliveryOption, fees: &DeliveryFees) -> CartTotals {
    let subtotal = subtotal(items);
    let delivery_fee = delivery_fee(option, fees);
    CartTotals {
        subtotal,
        delivery_fee,
        total: subtotal + delivery_fee,
        item_count: item_count(items),
    }
}
