use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{CancelReason, ParleyError};

/// Cancellation token and deadline shared by every suspension point of one
/// `converse` call.
#[derive(Debug, Clone)]
pub(crate) struct CancelGuard {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CancelGuard {
    pub(crate) fn new(token: Option<CancellationToken>, budget: Option<Duration>) -> Self {
        Self {
            token: token.unwrap_or_default(),
            deadline: budget.map(|d| Instant::now() + d),
        }
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Fail immediately if the call is already cancelled or out of time.
    pub(crate) fn check(&self) -> Result<(), ParleyError> {
        if self.token.is_cancelled() {
            return Err(ParleyError::Cancelled(CancelReason::Token));
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Err(ParleyError::Cancelled(CancelReason::Deadline))
            }
            _ => Ok(()),
        }
    }

    /// Drive `fut` unless cancellation or the deadline comes first.
    pub(crate) async fn run<F: Future>(&self, fut: F) -> Result<F::Output, ParleyError> {
        self.check()?;
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ParleyError::Cancelled(CancelReason::Token)),
            _ = deadline => Err(ParleyError::Cancelled(CancelReason::Deadline)),
            out = fut => Ok(out),
        }
    }

    pub(crate) async fn sleep(&self, period: Duration) -> Result<(), ParleyError> {
        self.run(tokio::time::sleep(period)).await
    }
}
