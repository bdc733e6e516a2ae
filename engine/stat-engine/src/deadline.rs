//! Storage call guard: deadline plus error logging

use crate::error::{Result, StatsError};
use std::future::Future;
use std::time::Duration;
use tracing::error;

/// Await a storage call, giving up after `timeout`.
///
/// On expiry the storage future is dropped, which cancels it. Storage
/// failures are logged here so every call site reports them the same way.
pub async fn bounded<T, F>(timeout: Option<Duration>, operation: &str, call: F) -> Result<T>
where
    F: Future<Output = persistence::Result<T>>,
{
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Storage call '{}' exceeded deadline of {:?}", operation, limit);
                return Err(StatsError::Storage(format!(
                    "{operation} timed out after {}ms",
                    limit.as_millis()
                )));
            }
        },
        None => call.await,
    };

    outcome.map_err(|err| {
        let err = StatsError::from(err);
        if let StatsError::Storage(msg) = &err {
            error!("Storage call '{}' failed: {}", operation, msg);
        }
        err
    })
}
