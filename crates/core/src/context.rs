//! Per-request context carrying cancellation and an optional deadline.
//!
//! Operations in this workspace never block, so the context is only consulted
//! once, on entry: an already-cancelled or already-expired request fails fast
//! without touching storage.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use crate::error::{DomainError, DomainResult};

/// Cancellation handle shared between a transport adapter and the core.
///
/// Clones share the same cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<DateTime<Utc>>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: DateTime<Utc>) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Mark this context (and every clone of it) as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail fast if the request was cancelled or its deadline has passed.
    pub fn ensure_active(&self) -> DomainResult<()> {
        if self.is_cancelled() {
            return Err(DomainError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Utc::now() >= deadline {
                return Err(DomainError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn background_context_is_active() {
        assert!(RequestContext::background().ensure_active().is_ok());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let ctx = RequestContext::background();
        let handle = ctx.clone();
        handle.cancel();
        assert_eq!(ctx.ensure_active(), Err(DomainError::Cancelled));
    }

    #[test]
    fn expired_deadline_fails_fast() {
        let ctx = RequestContext::with_deadline(Utc::now() - Duration::seconds(1));
        assert_eq!(ctx.ensure_active(), Err(DomainError::DeadlineExceeded));

        let ctx = RequestContext::with_deadline(Utc::now() + Duration::minutes(5));
        assert!(ctx.ensure_active().is_ok());
    }
}
