use std::cmp::Ordering;

use super::{unsupported, RelationCx, Visitors};
use crate::config::ClosureOrder;
use crate::kind::TypeKind;
use crate::model::TypeId;
use crate::Result;

impl Visitors {
    /// Closure rank: `Object` is 0, every other type is one more than the highest rank among
    /// its superclass, its interfaces and `Object`.
    pub fn rank(&self, ty: TypeId) -> Result<u32> {
        let kind = self.model().type_kind(ty)?;
        if !matches!(
            kind,
            TypeKind::Declared | TypeKind::Error | TypeKind::TypeVar | TypeKind::Intersection
        ) {
            return Err(unsupported("rank", kind));
        }
        self.cx().rank(ty)
    }

    /// The closure order: type variables first, then higher rank first, then qualified names in
    /// the configured direction.
    pub fn precedes(&self, a: TypeId, b: TypeId) -> Result<bool> {
        self.cx().precedes(a, b)
    }
}

impl RelationCx<'_> {
    pub(super) fn precedes(&self, t: TypeId, s: TypeId) -> Result<bool> {
        let t = self.resolve(t)?;
        let s = self.resolve(s)?;
        let t_kind = self.kind(t)?;
        let s_kind = self.kind(s)?;
        match (t_kind, s_kind) {
            (TypeKind::TypeVar, TypeKind::TypeVar) => {
                Ok(t != s && self.is_subtype_no_capture(t, s)?)
            }
            (TypeKind::TypeVar, _) => Ok(true),
            (_, TypeKind::TypeVar) => Ok(false),
            (t_kind, s_kind) if t_kind.is_declared_like() && s_kind.is_declared_like() => {
                let (t_rank, s_rank) = (self.rank(t)?, self.rank(s)?);
                if t_rank != s_rank {
                    return Ok(t_rank > s_rank);
                }
                let ordering = self.qualified_name(t)?.cmp(&self.qualified_name(s)?);
                Ok(match self.v.config.closure_order {
                    ClosureOrder::NameAscending => ordering == Ordering::Less,
                    ClosureOrder::NameDescending => ordering == Ordering::Greater,
                })
            }
            _ => Ok(false),
        }
    }

    pub(super) fn rank(&self, ty: TypeId) -> Result<u32> {
        let ty = self.resolve(ty)?;
        match self.kind(ty)? {
            TypeKind::Declared | TypeKind::Error => {
                let Some(element) = self.element_of(ty)? else {
                    return Ok(0);
                };
                if element == self.object_element()? {
                    return Ok(0);
                }
                if let Some(rank) = self.v.ranks.read().get(&element) {
                    return Ok(*rank);
                }
                if !self.rank_in_progress.borrow_mut().insert(element) {
                    return Ok(0);
                }
                let rank = self.model().element_type(element)?.map(|own| self.rank_above(own));
                self.rank_in_progress.borrow_mut().remove(&element);
                let rank = match rank {
                    Some(rank) => rank?,
                    None => 1,
                };
                self.v.ranks.write().insert(element, rank);
                Ok(rank)
            }
            TypeKind::TypeVar | TypeKind::Intersection => self.rank_above(ty),
            _ => Ok(0),
        }
    }

    fn rank_above(&self, ty: TypeId) -> Result<u32> {
        let mut highest = 0;
        let supertype = self.supertype(ty)?;
        if self.kind(supertype)? != TypeKind::None {
            highest = highest.max(self.rank(supertype)?);
        }
        for interface in self.interfaces(ty)? {
            highest = highest.max(self.rank(interface)?);
        }
        Ok(highest + 1)
    }

    fn qualified_name(&self, ty: TypeId) -> Result<String> {
        match self.element_of(ty)? {
            Some(element) => self.model().qualified_name(element),
            None => Ok(String::new()),
        }
    }
}
