//! Business approval polling for owner sessions.

use serde_json::Value;
use tracing::{debug, warn};

use dlizza_core::{BusinessStatus, ProfileId, UserId};

use crate::backend::{QueryBackend, Row, tables};
use crate::config::EngineConfig;

/// Polls for an owner's business record until it exists.
///
/// Registration creates the profile and business records asynchronously on
/// the backend, so right after sign-up neither may exist yet. The poller
/// looks up the profile by user id, then the business by the profile's id,
/// sleeping a fixed interval between attempts. Both phases draw on one
/// shared retry budget, bounding the worst-case wait to a single ceiling;
/// when the budget runs out a pending placeholder is returned instead of
/// leaving the caller hanging. Polling stops the moment the business row
/// is found and is not resumed within the session.
pub struct BusinessStatusPoller<'a, B> {
    backend: &'a B,
    config: &'a EngineConfig,
}

impl<'a, B: QueryBackend> BusinessStatusPoller<'a, B> {
    /// Create a poller borrowing the engine's collaborators.
    #[must_use]
    pub const fn new(backend: &'a B, config: &'a EngineConfig) -> Self {
        Self { backend, config }
    }

    /// Poll until the business record exists or the budget is exhausted.
    ///
    /// Infallible: lookup errors count as "not there yet" and consume an
    /// attempt, and exhaustion yields [`BusinessStatus::pending`].
    pub async fn poll(&self, user_id: &UserId) -> BusinessStatus {
        let mut attempts: u32 = 0;

        let profile_id = loop {
            attempts += 1;
            match self.fetch_profile_id(user_id).await {
                Some(profile_id) => break profile_id,
                None => {
                    debug!(%user_id, attempts, "profile not available yet");
                }
            }
            if attempts >= self.config.poll_max_attempts {
                warn!(%user_id, attempts, "poll budget exhausted waiting for profile");
                return BusinessStatus::pending();
            }
            tokio::time::sleep(self.config.poll_interval).await;
        };

        // Business phase continues on the same budget; the profile phase
        // may already have spent all of it.
        if attempts >= self.config.poll_max_attempts {
            warn!(%user_id, attempts, "poll budget exhausted waiting for business");
            return BusinessStatus::pending();
        }
        loop {
            attempts += 1;
            match self.fetch_business(&profile_id).await {
                Some(status) => {
                    debug!(%user_id, attempts, active = status.active, "business record found");
                    return status;
                }
                None => {
                    debug!(%user_id, attempts, "business not available yet");
                }
            }
            if attempts >= self.config.poll_max_attempts {
                warn!(%user_id, attempts, "poll budget exhausted waiting for business");
                return BusinessStatus::pending();
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn fetch_profile_id(&self, user_id: &UserId) -> Option<ProfileId> {
        let result = self
            .backend
            .find_one(
                tables::PROFILES,
                &[(tables::profiles::USER_ID, user_id.as_str())],
            )
            .await;

        let row = match result {
            Ok(Some(row)) => row,
            Ok(None) => return None,
            Err(error) => {
                warn!(%user_id, %error, "profile lookup failed, will retry");
                return None;
            }
        };

        match row.get(tables::profiles::ID).and_then(Value::as_str) {
            Some(id) => Some(ProfileId::new(id)),
            None => {
                warn!(%user_id, "profile row has no id column, will retry");
                None
            }
        }
    }

    async fn fetch_business(&self, profile_id: &ProfileId) -> Option<BusinessStatus> {
        let result = self
            .backend
            .find_one(
                tables::BUSINESSES,
                &[(tables::businesses::OWNER_ID, profile_id.as_str())],
            )
            .await;

        match result {
            Ok(Some(row)) => Some(business_status(&row)),
            Ok(None) => None,
            Err(error) => {
                warn!(%profile_id, %error, "business lookup failed, will retry");
                None
            }
        }
    }
}

fn business_status(row: &Row) -> BusinessStatus {
    BusinessStatus {
        active: row
            .get(tables::businesses::ACTIVE)
            .and_then(Value::as_bool)
            .unwrap_or(false),
        name: row
            .get(tables::businesses::NAME)
            .and_then(Value::as_str)
            .map(str::to_owned),
    }
}
