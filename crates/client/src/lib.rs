//! Dlizza client library.
//!
//! The session and commerce state engine behind the Dlizza storefront and
//! restaurant-owner console. Two subsystems share one shape - local cache,
//! asynchronous refresh, derived recomputation, persistence:
//!
//! - [`session`] - who the current user is and which role they hold,
//!   resolved through a cache/claims/lookup protocol with a timeout race,
//!   plus business-approval polling for owners.
//! - [`cart`] - the shopping cart ledger and its derived pricing.
//!
//! Everything that talks to the outside world sits behind a trait: the
//! identity provider ([`identity::IdentityProvider`]), the query backend
//! ([`backend::QueryBackend`]), and the persistent store
//! ([`store::KeyValueStore`]). UI, routing, and transport live elsewhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod config;
pub mod identity;
pub mod session;
pub mod store;
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;
