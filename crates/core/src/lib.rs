//! Dlizza Core - Shared types library.
//!
//! This crate provides the domain types shared by the Dlizza client
//! components:
//! - `client` - Session and commerce state engine
//! - `integration-tests` - Cross-component tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no backend access, no
//! persistence. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, roles, identities, cart items, and
//!   business status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
