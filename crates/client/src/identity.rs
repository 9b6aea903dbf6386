//! Identity provider collaborator contract.

use tokio::sync::watch;

use dlizza_core::Identity;

/// The external auth/session provider.
///
/// Owns sign-in, token refresh, and sign-out; this core only reads the
/// current identity and reacts to changes. Change notifications arrive on
/// a `watch` channel carrying the full new value (`None` = signed out), so
/// a late subscriber always sees the latest state.
pub trait IdentityProvider {
    /// Fetch the current session's identity, if any.
    fn current_session(&self) -> impl Future<Output = Option<Identity>>;

    /// Subscribe to identity changes (sign-in, sign-out, token refresh).
    fn identity_changes(&self) -> watch::Receiver<Option<Identity>>;

    /// End the current session at the provider.
    fn sign_out(&self) -> impl Future<Output = ()>;
}
