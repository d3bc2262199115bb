//! Per-call deadline and cancellation.
//!
//! Every operation that crosses the network boundary takes a `CallContext`.
//! A context that is already expired or cancelled short-circuits before any
//! request is built; otherwise the request races the deadline and the
//! cancellation token.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{ChainError, ChainResult};

#[derive(Debug, Clone)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl CallContext {
    /// No deadline; only explicit cancellation ends the call early.
    pub fn background() -> Self {
        Self {
            deadline: None,
            cancel: CancellationToken::new(),
        }
    }

    /// A timeout too large to represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::background(),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Drive `fut` under this context. `fut` is not polled at all if the
    /// context is already done.
    pub async fn run<F, T>(&self, fut: F) -> ChainResult<T>
    where
        F: Future<Output = ChainResult<T>>,
    {
        if self.is_cancelled() {
            return Err(ChainError::Timeout("call cancelled before it started".into()));
        }
        if self.is_done() {
            return Err(ChainError::Timeout("deadline passed before the call started".into()));
        }

        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ChainError::Timeout("call cancelled".into())),
            _ = expiry => Err(ChainError::Timeout("deadline exceeded".into())),
            result = fut => result,
        }
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn expired_context_never_polls_the_future() {
        let ctx = CallContext::with_timeout(Duration::ZERO);
        let polled = Arc::new(AtomicBool::new(false));
        let flag = polled.clone();

        let result: ChainResult<()> = ctx
            .run(async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(ChainError::Timeout(_))));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancelled_context_short_circuits() {
        let ctx = CallContext::background();
        ctx.cancel();
        let result: ChainResult<u8> = ctx.run(async { Ok(1) }).await;
        assert!(matches!(result, Err(ChainError::Timeout(_))));
    }

    #[tokio::test]
    async fn slow_future_loses_to_deadline() {
        let ctx = CallContext::with_timeout(Duration::from_millis(20));
        let result: ChainResult<u8> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(1)
            })
            .await;
        assert_eq!(result, Err(ChainError::Timeout("deadline exceeded".into())));
    }

    #[tokio::test]
    async fn cancellation_in_flight_wins() {
        let ctx = CallContext::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });
        let result: ChainResult<u8> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(1)
            })
            .await;
        assert_eq!(result, Err(ChainError::Timeout("call cancelled".into())));
    }

    #[tokio::test]
    async fn unrepresentable_timeout_means_no_deadline() {
        let ctx = CallContext::with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ctx.deadline, None);
        assert!(!ctx.is_done());
        assert_eq!(ctx.run(async { Ok(3u8) }).await, Ok(3));
    }

    #[tokio::test]
    async fn fast_future_completes() {
        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        assert_eq!(ctx.run(async { Ok(7u8) }).await, Ok(7));
    }
}
