//! core::context
//!
//! Cancellation and deadlines for the network-facing steps.
//!
//! Only cloning and remote reference listing block on the network, so only
//! they consult a [`FetchContext`]. The file system handles never do.
//!
//! # Example
//!
//! ```
//! use gitrepofs::core::context::FetchContext;
//! use std::time::Duration;
//!
//! let ctx = FetchContext::background().with_timeout(Duration::from_secs(30));
//! let token = ctx.cancel_token();
//!
//! assert!(!ctx.is_done());
//! token.cancel();
//! assert!(ctx.is_done());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cloneable flag that aborts an in-flight fetch when raised.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, unraised token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. All clones of this token observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check whether the flag was raised.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Cancellation token plus optional deadline for one fetch operation.
#[derive(Debug, Clone, Default)]
pub struct FetchContext {
    token: CancelToken,
    deadline: Option<Instant>,
}

impl FetchContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that additionally expires after `timeout`.
    ///
    /// An earlier existing deadline is kept. A timeout too large to be
    /// represented as an instant leaves the deadline unchanged.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self;
        };
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Derive a context that is cancelled through `token`.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.token = token;
        self
    }

    /// The token cancelling this context.
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once cancelled or past the deadline.
    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_never_done() {
        let ctx = FetchContext::background();
        assert!(!ctx.is_done());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn cancel_through_cloned_token() {
        let token = CancelToken::new();
        let ctx = FetchContext::background().with_cancel_token(token.clone());
        token.cancel();
        assert!(ctx.is_done());
    }

    #[test]
    fn expired_deadline_is_done() {
        let ctx = FetchContext::background().with_timeout(Duration::ZERO);
        assert!(ctx.is_done());
    }

    #[test]
    fn earlier_deadline_wins() {
        let ctx = FetchContext::background()
            .with_timeout(Duration::from_secs(1))
            .with_timeout(Duration::from_secs(3600));
        let deadline = ctx.deadline().unwrap();
        assert!(deadline <= Instant::now() + Duration::from_secs(1));
    }

    #[test]
    fn unrepresentable_timeout_keeps_no_deadline() {
        let ctx = FetchContext::background().with_timeout(Duration::from_secs(u64::MAX));
        assert!(ctx.deadline().is_none());
        assert!(!ctx.is_done());
    }

    #[test]
    fn unrepresentable_timeout_keeps_existing_deadline() {
        let ctx = FetchContext::background()
            .with_timeout(Duration::from_secs(60))
            .with_timeout(Duration::MAX);
        let deadline = ctx.deadline().unwrap();
        assert!(deadline <= Instant::now() + Duration::from_secs(60));
    }
}
