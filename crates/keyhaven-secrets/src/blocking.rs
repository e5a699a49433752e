//! Bridge from async callers to the blocking thread pool.

use crate::error::StorageError;

/// Run `f` on tokio's blocking pool and wait for it.
///
/// A panic inside `f` is resumed on the calling task. If the runtime drops
/// the task before it completes (shutdown), the store is reported as
/// unavailable.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, StorageError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(value) => Ok(value),
        Err(err) => match err.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            Err(_) => Err(StorageError::Unavailable),
        },
    }
}
