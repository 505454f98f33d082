use crate::error::BootError;
use backon::{ConstantBuilder, Retryable};
use std::cell::Cell;
use std::time::Duration;
use tracing::{info, warn};

/// How long to keep probing the store before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Fixed pause between two failed probes.
    pub interval: Duration,
    /// Total probes allowed, `None` retries forever.
    pub max_attempts: Option<usize>,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: None,
        }
    }
}

impl ReadinessPolicy {
    fn backoff(&self) -> ConstantBuilder {
        let builder = ConstantBuilder::default().with_delay(self.interval);
        match self.max_attempts {
            // backon counts retries, not attempts
            Some(n) => builder.with_max_times(n.saturating_sub(1)),
            None => builder.without_max_times(),
        }
    }
}

/// Block until `probe` succeeds. Returns the number of probes it took.
///
/// With an unbounded policy this only returns `Ok`; a store that never comes
/// up keeps the caller suspended. A bounded policy reports
/// [`BootError::ReadinessTimeout`] carrying the last probe failure.
pub async fn wait_until_ready<F, Fut>(
    mut probe: F,
    policy: &ReadinessPolicy,
) -> Result<usize, BootError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), BootError>>,
{
    let attempts = Cell::new(0usize);

    info!(
        interval = ?policy.interval,
        max_attempts = ?policy.max_attempts,
        "waiting for database"
    );

    let outcome = (|| {
        attempts.set(attempts.get() + 1);
        probe()
    })
    .retry(policy.backoff())
    .notify(|err: &BootError, dur: Duration| {
        warn!(
            attempt = attempts.get(),
            error = %err,
            "database unavailable, sleeping {:?}",
            dur
        );
    })
    .await;

    match outcome {
        Ok(()) => {
            info!(attempts = attempts.get(), "database is ready");
            Ok(attempts.get())
        }
        Err(e) => Err(BootError::ReadinessTimeout {
            attempts: attempts.get(),
            last_error: e.to_string(),
        }),
    }
}
