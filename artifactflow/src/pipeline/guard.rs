//! Run-level cancellation and deadline checks.

use crate::cancellation::CancellationToken;
use crate::core::StageName;
use crate::errors::ArtifactflowError;
use futures::future::pending;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Watches a run's cancellation token and deadline.
///
/// Both are optional; a guard with neither never interrupts.
#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    token: Option<CancellationToken>,
    deadline: Option<(Instant, Duration)>,
}

impl RunGuard {
    /// Creates a guard; the deadline starts counting now.
    #[must_use]
    pub fn new(token: Option<CancellationToken>, timeout: Option<Duration>) -> Self {
        Self {
            token,
            deadline: timeout.map(|t| (Instant::now() + t, t)),
        }
    }

    /// Fails if the run was cancelled or its deadline has passed.
    pub fn check(&self, stage: Option<StageName>) -> Result<(), ArtifactflowError> {
        if let Some(token) = &self.token {
            if token.is_cancelled() {
                return Err(ArtifactflowError::Cancelled {
                    stage,
                    reason: token.reason().unwrap_or_else(|| "cancelled".to_string()),
                });
            }
        }
        if let Some((at, timeout)) = self.deadline {
            if Instant::now() >= at {
                return Err(ArtifactflowError::DeadlineExceeded { stage, timeout });
            }
        }
        Ok(())
    }

    /// Completes with the interrupting error once the run is cancelled or
    /// its deadline passes. Never completes for an unguarded run.
    pub async fn interrupted(&self, stage: Option<StageName>) -> ArtifactflowError {
        let cancelled = async {
            match &self.token {
                Some(token) => token.cancelled().await,
                None => pending::<String>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some((at, timeout)) => {
                    sleep_until(at).await;
                    timeout
                }
                None => pending::<Duration>().await,
            }
        };
        tokio::select! {
            reason = cancelled => ArtifactflowError::Cancelled { stage, reason },
            timeout = expired => ArtifactflowError::DeadlineExceeded { stage, timeout },
        }
    }
}
