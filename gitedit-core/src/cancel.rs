use crate::error::{Error, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Runs blocking repository work on the blocking pool. The caller stops
/// waiting as soon as `cancel` fires.
pub(crate) async fn run_blocking<T, F>(cancel: &CancellationToken, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let task = tokio::task::spawn_blocking(work);
    tokio::select! {
        _ = cancel.cancelled() => Err(Error::Cancelled),
        joined = task => joined?,
    }
}

/// Drives `future` unless `cancel` fires first, in which case the future is dropped.
pub(crate) async fn until_cancelled<T>(
    cancel: &CancellationToken,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = future => result,
    }
}
