//! Process-wide completion guard.
//!
//! Backends are not assumed to be thread-safe while they complete a node (resolve a symbol by
//! name, fill in a lazily-read class file, ...). Every such step runs while holding this lock.
//! The lock is re-entrant because relation algorithms recurse through deferred nodes while
//! already holding it.

use std::sync::OnceLock;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

static COMPLETION_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn completion_lock() -> &'static ReentrantMutex<()> {
    COMPLETION_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// RAII token for the completion guard.
#[must_use = "the completion guard is released when this value is dropped"]
pub struct CompletionGuard {
    _guard: ReentrantMutexGuard<'static, ()>,
}

/// Acquire the completion guard, blocking until it is available.
pub fn lock_completion() -> CompletionGuard {
    CompletionGuard {
        _guard: completion_lock().lock(),
    }
}

/// Run `f` while holding the completion guard.
pub fn with_completion<R>(f: impl FnOnce() -> R) -> R {
    let _guard = lock_completion();
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_reentrant() {
        let outer = lock_completion();
        let value = with_completion(|| with_completion(|| 42));
        drop(outer);
        assert_eq!(value, 42);
    }
}
