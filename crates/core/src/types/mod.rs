//! Core types for Dlizza.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod business;
pub mod cart;
pub mod email;
pub mod id;
pub mod identity;
pub mod role;

pub use business::BusinessStatus;
pub use cart::{CartItem, DeliveryOption};
pub use email::{Email, EmailError};
pub use id::*;
pub use identity::{Claims, Identity};
pub use role::Role;
