use std::sync::Arc;

use super::{unsupported, RelationCx, Visitors};
use crate::kind::TypeKind;
use crate::model::TypeId;
use crate::Result;

impl Visitors {
    /// The type closure of `ty`: `ty` (unless it is an intersection) and all of its supertypes,
    /// one entry per element, ordered by [`Visitors::precedes`].
    ///
    /// Results are cached per session, keyed by the session's equality policy.
    pub fn closure(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        let kind = self.model().type_kind(ty)?;
        if !matches!(
            kind,
            TypeKind::Declared | TypeKind::Error | TypeKind::TypeVar | TypeKind::Intersection
        ) {
            return Err(unsupported("closure", kind));
        }
        self.cx().closure(ty)
    }

    /// Insert `ty` into the ordered closure `closure`, unless an entry with its element is
    /// already present.
    pub fn closure_insert(&self, closure: &[TypeId], ty: TypeId) -> Result<Vec<TypeId>> {
        self.cx().closure_insert(closure, ty)
    }

    /// Merge two ordered closures.
    pub fn closure_union(&self, a: &[TypeId], b: &[TypeId]) -> Result<Vec<TypeId>> {
        self.cx().closure_union(a, b)
    }

    fn cached_closure(&self, ty: TypeId, hash: u64) -> Result<Option<Arc<[TypeId]>>> {
        let closures = self.closures.read();
        let Some(bucket) = closures.get(&hash) else {
            return Ok(None);
        };
        for (key, closure) in bucket {
            if self.equality.types_equal(self.model(), *key, ty)? {
                return Ok(Some(Arc::clone(closure)));
            }
        }
        Ok(None)
    }

    /// A racing computation may insert an equal entry first; the later one is dropped.
    fn store_closure(&self, ty: TypeId, hash: u64, closure: Arc<[TypeId]>) -> Result<()> {
        let mut closures = self.closures.write();
        let bucket = closures.entry(hash).or_default();
        for (key, _) in bucket.iter() {
            if self.equality.types_equal(self.model(), *key, ty)? {
                return Ok(());
            }
        }
        bucket.push((ty, closure));
        Ok(())
    }
}

impl RelationCx<'_> {
    pub(super) fn closure(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        let ty = self.resolve(ty)?;
        let hash = self.v.equality.type_hash(self.model(), ty)?;
        if let Some(cached) = self.v.cached_closure(ty, hash)? {
            return Ok(cached.to_vec());
        }
        tracing::trace!(target: "nova.lang_model", ?ty, "closure cache miss");

        let supertype = self.supertype(ty)?;
        let mut closure = if self.kind(ty)? == TypeKind::Intersection {
            self.closure(supertype)?
        } else {
            match self.kind(supertype)? {
                TypeKind::Declared | TypeKind::Error => {
                    let above = self.closure(supertype)?;
                    self.closure_insert(&above, ty)?
                }
                TypeKind::TypeVar => {
                    let mut closure = vec![ty];
                    closure.extend(self.closure(supertype)?);
                    closure
                }
                _ => vec![ty],
            }
        };
        for interface in self.interfaces(ty)? {
            let interface_closure = self.closure(interface)?;
            closure = self.closure_union(&closure, &interface_closure)?;
        }

        self.v.store_closure(ty, hash, Arc::from(closure.as_slice()))?;
        Ok(closure)
    }

    pub(super) fn closure_insert(&self, closure: &[TypeId], ty: TypeId) -> Result<Vec<TypeId>> {
        let mut result = Vec::with_capacity(closure.len() + 1);
        let mut inserted = false;
        for (idx, entry) in closure.iter().enumerate() {
            if self.same_closure_entry(ty, *entry)? {
                result.extend_from_slice(&closure[idx..]);
                return Ok(result);
            }
            if self.precedes(ty, *entry)? {
                result.push(ty);
                result.extend_from_slice(&closure[idx..]);
                inserted = true;
                break;
            }
            result.push(*entry);
        }
        if !inserted {
            result.push(ty);
        }
        Ok(result)
    }

    pub(super) fn closure_union(&self, a: &[TypeId], b: &[TypeId]) -> Result<Vec<TypeId>> {
        let mut result = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            let (x, y) = (a[i], b[j]);
            if self.same_closure_entry(x, y)? {
                result.push(x);
                i += 1;
                j += 1;
            } else if self.precedes(x, y)? {
                result.push(x);
                i += 1;
            } else if self.precedes(y, x)? {
                result.push(y);
                j += 1;
            } else {
                result.push(x);
                result.push(y);
                i += 1;
                j += 1;
            }
        }
        result.extend_from_slice(&a[i..]);
        result.extend_from_slice(&b[j..]);
        Ok(result)
    }

    /// Entries for the same element tie under `precedes` and are merged.
    fn same_closure_entry(&self, a: TypeId, b: TypeId) -> Result<bool> {
        let a = self.resolve(a)?;
        let b = self.resolve(b)?;
        if a == b {
            return Ok(true);
        }
        match (self.element_of(a)?, self.element_of(b)?) {
            (Some(x), Some(y)) => self.same_element(x, y),
            _ => Ok(false),
        }
    }
}
