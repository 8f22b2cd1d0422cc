//! Bounded delegate calls.

use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::UpstreamFailure;
use crate::traits::delegate::{Delegate, DelegateRequest};

/// Call the delegate, failing with `Timeout` once `timeout` elapses.
///
/// The in-flight request is dropped on expiry.
pub(crate) async fn call_delegate<D>(
    delegate: &D,
    request: DelegateRequest,
    timeout: Duration,
) -> Result<String, UpstreamFailure>
where
    D: Delegate + ?Sized,
{
    let stage = request.stage;
    let start = Instant::now();

    match tokio::time::timeout(timeout, delegate.complete(request)).await {
        Ok(Ok(text)) => {
            debug!(
                stage = %stage,
                response_len = text.len(),
                duration_ms = start.elapsed().as_millis(),
                "Delegate call complete"
            );
            Ok(text)
        }
        Ok(Err(e)) => {
            warn!(stage = %stage, error = %e, "Delegate call failed");
            Err(e)
        }
        Err(_) => {
            let after_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            warn!(stage = %stage, timeout_ms = after_ms, "Delegate call timed out");
            Err(UpstreamFailure::Timeout { after_ms })
        }
    }
}
