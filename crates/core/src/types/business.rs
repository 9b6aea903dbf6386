//! Business approval status for restaurant owners.

use serde::{Deserialize, Serialize};

/// Approval state of an owner's business record.
///
/// Only meaningful while the session role is `owner`. Absent entirely
/// (`Option::None` at the session level) when unknown or not yet created;
/// the poller synthesizes a pending placeholder once its retry budget runs
/// out so callers are never left waiting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessStatus {
    /// Whether the business has been approved and activated.
    pub active: bool,
    /// Business display name, when the record has been created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl BusinessStatus {
    /// Placeholder for a business still awaiting record creation or review.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            active: false,
            name: None,
        }
    }

    /// Whether the owner has been approved.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        self.active
    }
}
