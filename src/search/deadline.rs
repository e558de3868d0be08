use std::future::Future;
use tokio::time::{Instant, timeout_at};

use crate::error::{Error, Result, Stage};

/// Run `operation` until `deadline`. An already-expired deadline fails
/// without polling the operation at all; otherwise the operation is dropped
/// when the deadline fires, which aborts any request it has in flight.
pub async fn with_deadline<T, F>(stage: Stage, deadline: Instant, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if Instant::now() >= deadline {
        return Err(Error::Timeout { stage });
    }

    match timeout_at(deadline, operation).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout { stage }),
    }
}
