//! Call contexts carrying cancellation and deadlines.
//!
//! A [`Context`] is passed to the context-aware driver calls. The proxy never
//! waits on it: when a call has to be degraded it checks the context once
//! with [`Context::err`] before invoking the backend.
//!
//! ```rust
//! use sqltee_core::{Context, ContextError};
//!
//! let (ctx, cancel) = Context::background().with_cancel();
//! assert!(ctx.err().is_none());
//!
//! cancel.cancel();
//! assert_eq!(ctx.err(), Some(ContextError::Canceled));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::ContextError;

/// Cancellation and deadline state of a call.
///
/// Cloning is cheap; clones observe the same cancellation.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel_flags: Vec<Arc<AtomicBool>>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never done.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that is canceled when the handle (or any parent) is.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let flag = Arc::new(AtomicBool::new(false));
        let mut child = self.clone();
        child.cancel_flags.push(Arc::clone(&flag));
        (child, CancelHandle { flag })
    }

    /// Derive a context that expires at `deadline` (or earlier if the parent does).
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let mut child = self.clone();
        child.deadline = Some(match self.deadline {
            Some(parent) => parent.min(deadline),
            None => deadline,
        });
        child
    }

    /// Derive a context that expires after `timeout`.
    ///
    /// A timeout too far in the future to represent adds no deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.clone(),
        }
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why the context is done, or `None` while it is live.
    ///
    /// Never blocks.
    pub fn err(&self) -> Option<ContextError> {
        if self
            .cancel_flags
            .iter()
            .any(|flag| flag.load(Ordering::Acquire))
        {
            return Some(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Whether the context is canceled or expired.
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }
}

/// Cancels the context it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Cancel the context and every context derived from it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether `cancel` was called.
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_never_done() {
        let ctx = Context::background();
        assert!(ctx.err().is_none());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn test_cancel_reaches_derived_contexts() {
        let (parent, cancel) = Context::background().with_cancel();
        let (child, _child_cancel) = parent.with_cancel();
        let timed = child.with_timeout(Duration::from_secs(60));

        cancel.cancel();

        assert!(cancel.is_canceled());
        assert_eq!(parent.err(), Some(ContextError::Canceled));
        assert_eq!(child.err(), Some(ContextError::Canceled));
        assert_eq!(timed.err(), Some(ContextError::Canceled));
    }

    #[test]
    fn test_child_cancel_does_not_reach_parent() {
        let (parent, _cancel) = Context::background().with_cancel();
        let (child, child_cancel) = parent.with_cancel();

        child_cancel.cancel();

        assert!(parent.err().is_none());
        assert!(child.is_done());
    }

    #[test]
    fn test_expired_deadline() {
        let ctx = Context::background().with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[test]
    fn test_deadline_keeps_earliest() {
        let soon = Instant::now() + Duration::from_secs(1);
        let later = soon + Duration::from_secs(60);
        let ctx = Context::background().with_deadline(soon).with_deadline(later);
        assert_eq!(ctx.deadline(), Some(soon));
    }

    #[test]
    fn test_unbounded_timeout_adds_no_deadline() {
        let ctx = Context::background().with_timeout(Duration::MAX);
        assert_eq!(ctx.deadline(), None);
        assert!(!ctx.is_done());

        let soon = Instant::now() + Duration::from_secs(1);
        let bounded = Context::background().with_deadline(soon).with_timeout(Duration::MAX);
        assert_eq!(bounded.deadline(), Some(soon));
    }
}
