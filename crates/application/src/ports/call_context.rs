//! Cancellation and deadlines for remote calls.
//!
//! Cancellation is cooperative: it aborts the call in flight and stops a flow
//! from starting its next step, but never undoes a completed remote mutation.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Why a call or flow stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
    /// The operator cancelled the command.
    #[error("operation cancelled")]
    Cancelled,
    /// The deadline or per-call timeout elapsed.
    #[error("operation timed out")]
    TimedOut,
}

/// Sending half of a cancellation signal.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: watch::Sender<bool>,
}

impl CancellationToken {
    /// Creates a token and the receiver that observes it.
    #[must_use]
    pub fn new() -> (Self, CancellationReceiver) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, CancellationReceiver { receiver })
    }

    /// Signals cancellation to every receiver.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

/// Receiving half of a cancellation signal.
#[derive(Debug, Clone)]
pub struct CancellationReceiver {
    receiver: watch::Receiver<bool>,
}

impl CancellationReceiver {
    /// A receiver that is never cancelled.
    #[must_use]
    pub fn never() -> Self {
        let (sender, receiver) = watch::channel(false);
        // Keeping the sender alive is unnecessary: a closed channel reads as
        // "not cancelled" forever.
        drop(sender);
        Self { receiver }
    }

    /// Returns true once cancellation has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves when cancellation is signalled; pends forever otherwise.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.receiver.borrow_and_update() {
                return;
            }
            if self.receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Deadline-bearing context passed to every remote call.
#[derive(Debug, Clone)]
pub struct CallContext {
    cancel: CancellationReceiver,
    deadline: Option<Instant>,
    call_timeout: Option<Duration>,
}

impl Default for CallContext {
    fn default() -> Self {
        Self::background()
    }
}

impl CallContext {
    /// A context without cancellation, deadline or timeout.
    #[must_use]
    pub fn background() -> Self {
        Self {
            cancel: CancellationReceiver::never(),
            deadline: None,
            call_timeout: None,
        }
    }

    /// A context observing the given cancellation receiver.
    #[must_use]
    pub const fn with_cancellation(cancel: CancellationReceiver) -> Self {
        Self {
            cancel,
            deadline: None,
            call_timeout: None,
        }
    }

    /// Bounds every individual call by `timeout`.
    #[must_use]
    pub const fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Bounds the whole flow by `deadline`.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Fails if the context is already cancelled or past its deadline.
    ///
    /// Flows call this before starting each step.
    ///
    /// # Errors
    ///
    /// Returns the reason the context is no longer active.
    pub fn ensure_active(&self) -> Result<(), Interrupted> {
        if self.cancel.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Interrupted::TimedOut);
        }
        Ok(())
    }

    /// The instant the next call must finish by, if any.
    fn effective_deadline(&self) -> Option<Instant> {
        let call_deadline = self.call_timeout.map(|t| Instant::now() + t);
        match (self.deadline, call_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Runs `call`, racing it against cancellation and the deadline.
    ///
    /// # Errors
    ///
    /// Returns the call's own error, or `E::from(Interrupted)` if the call
    /// was cut short.
    pub async fn run<T, E, F>(&self, call: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<Interrupted>,
    {
        self.ensure_active()?;
        let mut cancel = self.cancel.clone();
        let deadline = self.effective_deadline();

        let sleep = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = call => result,
            () = cancel.cancelled() => Err(Interrupted::Cancelled.into()),
            () = sleep => Err(Interrupted::TimedOut.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum TestError {
        Interrupted(Interrupted),
    }

    impl From<Interrupted> for TestError {
        fn from(value: Interrupted) -> Self {
            Self::Interrupted(value)
        }
    }

    #[tokio::test]
    async fn test_background_context_runs_call() {
        let ctx = CallContext::background();
        let result: Result<u32, TestError> = ctx.run(async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
        assert!(ctx.ensure_active().is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_context_does_not_start_call() {
        let (token, receiver) = CancellationToken::new();
        let ctx = CallContext::with_cancellation(receiver);
        token.cancel();

        assert_eq!(ctx.ensure_active(), Err(Interrupted::Cancelled));
        let result: Result<u32, TestError> = ctx.run(async { Ok(7) }).await;
        assert_eq!(result, Err(TestError::Interrupted(Interrupted::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_pending_call() {
        let (token, receiver) = CancellationToken::new();
        let ctx = CallContext::with_cancellation(receiver);

        let call = ctx.run(async {
            std::future::pending::<()>().await;
            Ok::<u32, TestError>(1)
        });
        let cancel = async {
            tokio::task::yield_now().await;
            token.cancel();
        };
        let (result, ()) = tokio::join!(call, cancel);

        assert_eq!(result, Err(TestError::Interrupted(Interrupted::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout() {
        let ctx = CallContext::background().with_call_timeout(Duration::from_secs(5));
        let result: Result<u32, TestError> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(1)
            })
            .await;
        assert_eq!(result, Err(TestError::Interrupted(Interrupted::TimedOut)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_deadline_is_inactive() {
        let ctx = CallContext::background().with_deadline(Instant::now());
        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(ctx.ensure_active(), Err(Interrupted::TimedOut));
    }
}
