//! Query backend collaborator contract.
//!
//! The managed backend is reached over a generic single-row query API;
//! this core never sees a wire format, only rows as JSON maps. Role,
//! profile, and business lookups all go through [`QueryBackend::find_one`].

use thiserror::Error;

/// A row returned by the backend, as loosely typed JSON columns.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Equality filter on a set of columns.
pub type Filter<'a> = &'a [(&'a str, &'a str)];

/// Table and column names used by the session engine.
pub mod tables {
    /// Per-user profile records.
    pub const PROFILES: &str = "profiles";
    /// Business records linked to owner profiles.
    pub const BUSINESSES: &str = "businesses";

    pub mod profiles {
        pub const ID: &str = "id";
        pub const USER_ID: &str = "user_id";
        pub const USER_ROLE: &str = "user_role";
    }

    pub mod businesses {
        pub const OWNER_ID: &str = "owner_id";
        pub const NAME: &str = "name";
        pub const ACTIVE: &str = "active";
    }
}

/// Errors raised by a backend lookup.
///
/// None of these cross the engine's public boundary: resolution degrades
/// to a default value and polling retries. The distinct variants exist so
/// degrade paths can log what actually happened.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The queried relation does not exist (e.g. schema not deployed yet).
    #[error("relation not found: {0}")]
    RelationNotFound(String),

    /// The caller is not allowed to read the relation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Any other query failure.
    #[error("query failed: {0}")]
    Query(String),
}

/// Single-row lookups against the managed backend.
///
/// `find_one` resolves to at most one row matching an equality filter;
/// absence is `Ok(None)`, not an error. Callers that cannot tolerate a
/// slow backend race the returned future against a deadline themselves
/// (see [`crate::util::first_settled`]).
pub trait QueryBackend {
    /// Find the single row in `table` matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the query itself fails. A missing row
    /// is `Ok(None)`.
    fn find_one(
        &self,
        table: &str,
        filter: Filter<'_>,
    ) -> impl Future<Output = Result<Option<Row>, BackendError>>;
}
