//! Request-scoped cancellation for store calls.
//!
//! A [`Context`] is cheap to clone; every clone observes the same cancel flag.
//! Store futures are raced against the flag and the optional deadline, and are
//! dropped as soon as either fires.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use super::error::{RepoError, RepoResult};

#[derive(Debug, Clone)]
pub struct Context {
    cancel: Arc<watch::Sender<bool>>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        let (tx, _) = watch::channel(false);
        Self { cancel: Arc::new(tx), deadline: None }
    }

    /// Derives a context sharing this one's cancel flag whose deadline is the
    /// earlier of the current one and `now + timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self { cancel: Arc::clone(&self.cancel), deadline: Some(deadline) }
    }

    /// Cancels this context and every clone or child of it.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool { *self.cancel.borrow() }

    /// Reports why the context is done, or `Ok(())` while it is still live.
    pub fn err(&self) -> RepoResult<()> {
        if self.is_cancelled() {
            return Err(RepoError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Err(RepoError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    async fn cancelled(&self) {
        let mut rx = self.cancel.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }

    /// Drives `fut` until it completes or the context is done, whichever is first.
    pub async fn run<F, T, E>(&self, fut: F) -> RepoResult<T>
    where
        F: Future<Output = Result<T, E>>,
        RepoError: From<E>,
    {
        self.err()?;
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(RepoError::Cancelled),
            _ = self.expired() => Err(RepoError::DeadlineExceeded),
            res = fut => res.map_err(RepoError::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn never() -> Result<(), RepoError> {
        std::future::pending().await
    }

    #[tokio::test]
    async fn background_runs_to_completion() {
        let ctx = Context::background();
        let value = ctx.run(async { Ok::<_, RepoError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn cancelled_context_never_polls_the_future() {
        let ctx = Context::background();
        ctx.cancel();
        let polled = std::sync::atomic::AtomicBool::new(false);
        let res = ctx.run(async { polled.store(true, std::sync::atomic::Ordering::SeqCst); Ok::<_, RepoError>(()) }).await;
        assert!(matches!(res, Err(RepoError::Cancelled)));
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancel_aborts_in_flight_call() {
        let ctx = Context::background();
        let child = ctx.clone();
        let handle = tokio::spawn(async move { child.run(never()).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        ctx.cancel();
        let res = handle.await.unwrap();
        assert!(matches!(res, Err(RepoError::Cancelled)));
    }

    #[tokio::test]
    async fn deadline_aborts_in_flight_call() {
        let ctx = Context::background().with_timeout(Duration::from_millis(20));
        let res = ctx.run(never()).await;
        assert!(matches!(res, Err(RepoError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn child_keeps_earlier_deadline_and_shares_cancel() {
        let parent = Context::background().with_timeout(Duration::from_millis(20));
        let child = parent.with_timeout(Duration::from_secs(60));
        let started = Instant::now();
        assert!(matches!(child.run(never()).await, Err(RepoError::DeadlineExceeded)));
        assert!(started.elapsed() < Duration::from_secs(5));

        let parent = Context::background();
        let child = parent.with_timeout(Duration::from_secs(60));
        parent.cancel();
        assert!(child.is_cancelled());
    }
}
