use std::sync::OnceLock;

use parking_lot::Mutex;

use super::Model;
use crate::guard;
use crate::{LangError, Result};

pub(crate) type Supplier<I> = Box<dyn FnOnce(&Model) -> Result<I> + Send>;

/// A slot whose target is produced on first use and memoized afterwards.
///
/// The supplier runs exactly once, under the completion guard. Once resolved, reads go through
/// the memoized value without touching the guard.
pub(crate) struct Deferred<I> {
    resolved: OnceLock<I>,
    failure: OnceLock<LangError>,
    supplier: Mutex<Option<Supplier<I>>>,
}

impl<I: Copy + std::fmt::Debug> Deferred<I> {
    pub(crate) fn new(supplier: Supplier<I>) -> Self {
        Self {
            resolved: OnceLock::new(),
            failure: OnceLock::new(),
            supplier: Mutex::new(Some(supplier)),
        }
    }

    pub(crate) fn get(&self) -> Option<I> {
        self.resolved.get().copied()
    }

    pub(crate) fn resolve(&self, model: &Model) -> Result<I> {
        if let Some(value) = self.resolved.get() {
            return Ok(*value);
        }

        let _guard = guard::lock_completion();
        if let Some(value) = self.resolved.get() {
            return Ok(*value);
        }
        if let Some(err) = self.failure.get() {
            return Err(err.clone());
        }

        // The supplier is taken before it runs; finding it missing means we re-entered.
        let supplier = self
            .supplier
            .lock()
            .take()
            .ok_or(LangError::CyclicCompletion)?;
        match supplier(model) {
            Ok(value) => {
                tracing::trace!(target: "nova.lang_model", target_node = ?value, "completed deferred node");
                let _ = self.resolved.set(value);
                Ok(value)
            }
            Err(err) => {
                let _ = self.failure.set(err.clone());
                Err(err)
            }
        }
    }
}
