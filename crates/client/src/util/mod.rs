//! Small shared primitives.

pub mod race;

pub use race::first_settled;
