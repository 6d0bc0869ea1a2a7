use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cancellation signal shared between the caller and the engine's tasks.
///
/// Tokens form a tree: cancelling a token cancels everything derived from it
/// via [`CancelToken::child`], but not its parent. Long-running loops poll
/// [`CancelToken::is_cancelled`] and return promptly.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    parent: Option<Arc<Inner>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                parent: Some(Arc::clone(&self.inner)),
            }),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        let mut current = Some(&self.inner);
        while let Some(inner) = current {
            if inner.cancelled.load(Ordering::Acquire) {
                return true;
            }
            current = inner.parent.as_ref();
        }
        false
    }
}
