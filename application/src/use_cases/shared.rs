//! Shared utilities for use cases.
//!
//! Cancellation checks and cancellable waits used by the analysis run and
//! context gathering.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The awaited future lost the race against cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cancelled;

/// Returns `true` if the token exists and is cancelled.
pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(|t| t.is_cancelled())
}

/// Await `future` unless the token fires first. The future is dropped on
/// cancellation.
pub(crate) async fn cancellable<F: Future>(
    token: &Option<CancellationToken>,
    future: F,
) -> Result<F::Output, Cancelled> {
    match token {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(Cancelled),
            output = future => Ok(output),
        },
        None => Ok(future.await),
    }
}

/// Sleep for `delay` unless cancelled first.
pub(crate) async fn sleep_cancellable(
    token: &Option<CancellationToken>,
    delay: Duration,
) -> Result<(), Cancelled> {
    cancellable(token, tokio::time::sleep(delay)).await
}
