//! Session identity as reported by the external identity provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::email::Email;
use crate::types::id::UserId;
use crate::types::role::Role;

/// Inline identity claims delivered alongside the session token.
///
/// Claims are written by the provider at registration time (full name,
/// phone number, business metadata for owners) and are opaque to this core
/// except for the role hint under [`Claims::ROLE`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(serde_json::Map<String, Value>);

impl Claims {
    /// Claim key carrying the role assigned at registration.
    pub const ROLE: &'static str = "user_role";

    /// Create an empty claims map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a raw claim value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert a claim, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// The role hint set at registration, if present and well-formed.
    ///
    /// A claim that exists but does not parse as a role is treated as
    /// absent; the resolver falls through to the authoritative lookup.
    #[must_use]
    pub fn role_hint(&self) -> Option<Role> {
        self.get(Self::ROLE)
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse().ok())
    }

    /// Whether no claims are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<serde_json::Map<String, Value>> for Claims {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(map)
    }
}

/// The current user as reported by the identity provider.
///
/// Read-only to this core; a new value arrives with every identity-change
/// notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque user id minted by the provider.
    pub user_id: UserId,
    /// Email address, when the provider shares it.
    pub email: Option<Email>,
    /// Inline claims set at registration.
    #[serde(default)]
    pub claims: Claims,
}

impl Identity {
    /// Create an identity with no email and no claims.
    #[must_use]
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            claims: Claims::new(),
        }
    }

    /// Attach a role claim, as the provider does at registration.
    #[must_use]
    pub fn with_role_claim(mut self, role: Role) -> Self {
        self.claims
            .insert(Claims::ROLE, Value::String(role.to_string()));
        self
    }
}
