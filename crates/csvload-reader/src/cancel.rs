//! Cooperative cancellation support.
//!
//! A [`CancelToken`] is a cloneable handle that can be tripped from another
//! thread while the owning thread is blocked in a read loop. Readers check
//! the token at the start of each `read()`; schema inference checks it
//! between rows. Cancellation is idempotent and never tears a delivered
//! record: already-returned records remain valid.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle for cancelling a running read or inference loop.
///
/// # Thread Safety
///
/// The token is `Send + Sync` and can be safely shared between threads.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, untripped token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token. Idempotent; repeated calls have no additional effect.
    pub fn cancel(&self) {
        self.inner.store(true, Ordering::Release);
    }

    /// Check whether the token has been tripped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("is_cancelled", &self.is_cancelled())
            .finish()
    }
}
