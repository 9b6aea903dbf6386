//! First-settled race between a future and a deadline.
//!
//! The role resolver must never hang on a slow backend: its authoritative
//! lookup is raced against a fixed timer and whichever settles first wins.
//! This is that race as a named primitive rather than ad hoc `select!` at
//! every call site.

use std::future::Future;
use std::time::Duration;

/// Drive `future` for at most `deadline`.
///
/// Returns `Some(output)` if the future settles first, `None` if the timer
/// fires first. The losing side is dropped, which cancels it; a late
/// result from the future is never observed.
pub async fn first_settled<F: Future>(future: F, deadline: Duration) -> Option<F::Output> {
    tokio::select! {
        output = future => Some(output),
        () = tokio::time::sleep(deadline) => None,
    }
}
