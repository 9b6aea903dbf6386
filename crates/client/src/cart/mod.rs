//! The cart ledger: persisted line items and the delivery preference.
//!
//! Independent of identity - the cart belongs to the device, not the
//! session - and persists on its own lifecycle. Every mutation is
//! synchronous and written through to the store immediately, so there is
//! no unsaved state visible across a reload boundary.

use tracing::debug;

use dlizza_core::{CartItem, DeliveryOption, ProductId, RestaurantId};

use crate::store::{KeyValueStore, keys, read_json, write_json};

pub mod pricing;

pub use pricing::{CartTotals, DeliveryFees};

/// In-memory, persisted collection of cart lines.
///
/// Line identity is `(id, restaurant)`; the ledger never holds two lines
/// with the same identity, and every present line has quantity >= 1.
pub struct CartLedger<S> {
    store: S,
    items: Vec<CartItem>,
    delivery: DeliveryOption,
}

impl<S: KeyValueStore> CartLedger<S> {
    /// Load the ledger from its persisted slots.
    ///
    /// Absent or corrupted slots degrade to an empty cart and the default
    /// delivery option.
    pub fn load(store: S) -> Self {
        let items: Vec<CartItem> = read_json(&store, keys::CART).unwrap_or_default();
        let delivery: DeliveryOption =
            read_json(&store, keys::DELIVERY_OPTION).unwrap_or_default();
        debug!(lines = items.len(), "cart loaded");
        Self {
            store,
            items,
            delivery,
        }
    }

    /// Current lines.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Current delivery option.
    #[must_use]
    pub fn delivery_option(&self) -> &DeliveryOption {
        &self.delivery
    }

    /// Add `item` to the cart.
    ///
    /// If a line with the same `(id, restaurant)` identity exists, its
    /// quantity grows by the item's quantity; otherwise the item becomes a
    /// new line. A zero quantity counts as 1, so adding always has an
    /// effect.
    pub fn add(&mut self, item: CartItem) {
        let quantity = item.quantity.max(1);
        if let Some(line) = self.items.iter_mut().find(|line| line.same_line(&item)) {
            line.quantity += quantity;
        } else {
            self.items.push(CartItem { quantity, ..item });
        }
        self.persist_items();
    }

    /// Overwrite the quantity of the matching line.
    ///
    /// A quantity of 0 removes the line entirely - the ledger never holds
    /// a zero-quantity row. Absent lines are a no-op.
    pub fn set_quantity(
        &mut self,
        id: &ProductId,
        restaurant: Option<&RestaurantId>,
        quantity: u32,
    ) {
        if quantity == 0 {
            self.remove(id, restaurant);
            return;
        }
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.matches(id, restaurant))
        {
            line.quantity = quantity;
            self.persist_items();
        }
    }

    /// Delete the matching line if present; no-op if absent.
    pub fn remove(&mut self, id: &ProductId, restaurant: Option<&RestaurantId>) {
        let before = self.items.len();
        self.items.retain(|line| !line.matches(id, restaurant));
        if self.items.len() != before {
            self.persist_items();
        }
    }

    /// Empty the ledger.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist_items();
    }

    /// Select pickup or delivery; persisted to its own slot.
    pub fn set_delivery_option(&mut self, option: DeliveryOption) {
        self.delivery = option;
        write_json(&self.store, keys::DELIVERY_OPTION, &self.delivery);
    }

    /// Derived pricing for the current lines and delivery option.
    #[must_use]
    pub fn totals(&self, fees: &DeliveryFees) -> CartTotals {
        pricing::totals(&self.items, &self.delivery, fees)
    }

    fn persist_items(&self) {
        write_json(&self.store, keys::CART, &self.items);
    }
}
