use std::fmt;
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::{LangError, Result};

/// A field that transitions at most once from unset to a value.
///
/// Re-setting the same value is a no-op; setting a different value fails with
/// [`LangError::WriteOnceConflict`].
pub(crate) struct WriteOnce<T> {
    field: &'static str,
    cell: OnceLock<T>,
}

impl<T: Clone + PartialEq> WriteOnce<T> {
    pub(crate) const fn new(field: &'static str) -> Self {
        Self {
            field,
            cell: OnceLock::new(),
        }
    }

    pub(crate) fn get(&self) -> Option<T> {
        self.cell.get().cloned()
    }

    pub(crate) fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Fails exactly when `set(value)` would, without writing.
    pub(crate) fn check(&self, value: &T) -> Result<()> {
        match self.cell.get() {
            Some(existing) if existing != value => {
                Err(LangError::WriteOnceConflict { field: self.field })
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn set(&self, value: T) -> Result<()> {
        match self.cell.set(value) {
            Ok(()) => Ok(()),
            Err(value) if self.cell.get() == Some(&value) => Ok(()),
            Err(_) => Err(LangError::WriteOnceConflict { field: self.field }),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for WriteOnce<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => value.fmt(f),
            None => f.write_str("<unset>"),
        }
    }
}

/// An ordered list that only ever grows.
pub(crate) struct AppendOnly<T> {
    items: RwLock<Vec<T>>,
}

impl<T: Clone> AppendOnly<T> {
    pub(crate) fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn push(&self, item: T) {
        self.items.write().push(item);
    }

    /// Push `item` unless `exists` already matches an entry. Returns whether it was added.
    pub(crate) fn push_unique(&self, item: T, exists: impl Fn(&T) -> bool) -> bool {
        let mut items = self.items.write();
        if items.iter().any(exists) {
            return false;
        }
        items.push(item);
        true
    }

    pub(crate) fn snapshot(&self) -> Vec<T> {
        self.items.read().clone()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for AppendOnly<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.read().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_once_accepts_identical_rewrite() {
        let field = WriteOnce::new("name");
        field.set("a".to_string()).unwrap();
        field.set("a".to_string()).unwrap();
        assert_eq!(field.get().as_deref(), Some("a"));
    }

    #[test]
    fn write_once_rejects_conflicting_rewrite() {
        let field = WriteOnce::new("name");
        field.set(1u32).unwrap();
        assert_eq!(
            field.set(2),
            Err(LangError::WriteOnceConflict { field: "name" })
        );
        assert_eq!(field.get(), Some(1));
    }

    #[test]
    fn check_mirrors_set_without_writing() {
        let field = WriteOnce::new("name");
        field.check(&1u32).unwrap();
        assert_eq!(field.get(), None);
        field.set(1).unwrap();
        field.check(&1).unwrap();
        assert_eq!(
            field.check(&2),
            Err(LangError::WriteOnceConflict { field: "name" })
        );
    }

    #[test]
    fn append_only_push_unique_skips_duplicates() {
        let list = AppendOnly::new();
        assert!(list.push_unique(1, |x| *x == 1));
        assert!(!list.push_unique(1, |x| *x == 1));
        list.push(2);
        assert_eq!(list.snapshot(), vec![1, 2]);
    }
}
