use super::{RelationCx, Visitors};
use crate::kind::TypeKind;
use crate::model::TypeId;
use crate::Result;

impl Visitors {
    /// Whether the type argument `container` contains `contained` (JLS 4.5.1).
    ///
    /// A non-wildcard container contains exactly the types it is the same type as.
    pub fn contains(&self, container: TypeId, contained: TypeId) -> Result<bool> {
        if let Some(answer) = self.source.contains(container, contained)? {
            return Ok(answer);
        }
        self.cx().contains_type(container, contained)
    }

    /// Point-wise containment of two argument lists. Lists of different length are not
    /// contained, which is not an error.
    pub fn contains_all(&self, containers: &[TypeId], contained: &[TypeId]) -> Result<bool> {
        self.cx().contains_list(containers, contained)
    }
}

impl RelationCx<'_> {
    pub(super) fn contains_type(&self, t: TypeId, s: TypeId) -> Result<bool> {
        let t = self.resolve(t)?;
        let s = self.resolve(s)?;
        if self.kind(t)? != TypeKind::Wildcard {
            return self.same_type(t, s);
        }
        if self.is_same_wildcard(t, s)? || self.is_capture_of(s, t)? {
            return Ok(true);
        }
        let lower_ok = self.is_extends_bound(t)? || {
            let s_lower = self.cvar_lower_bound(self.wild_lower_bound(s)?)?;
            self.is_subtype_no_capture(self.wild_lower_bound(t)?, s_lower)?
        };
        if !lower_ok {
            return Ok(false);
        }
        Ok(self.is_super_bound(t)? || {
            let s_upper = self.cvar_upper_bound(self.wild_upper_bound(s)?)?;
            self.is_subtype_no_capture(s_upper, self.wild_upper_bound(t)?)?
        })
    }

    pub(super) fn contains_list(&self, ts: &[TypeId], ss: &[TypeId]) -> Result<bool> {
        if ts.len() != ss.len() {
            return Ok(false);
        }
        for (t, s) in ts.iter().zip(ss) {
            if !self.contains_type(*t, *s)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Argument containment between two instantiations of one generic element. A pair that is
    /// already being checked further up the stack is assumed to hold.
    pub(super) fn contains_recursive(&self, t: TypeId, s: TypeId) -> Result<bool> {
        let pair = (self.resolve(t)?, self.resolve(s)?);
        if !self.contains_in_progress.borrow_mut().insert(pair) {
            return Ok(true);
        }
        let model = self.model();
        let result = self.contains_list(&model.type_arguments(t)?, &model.type_arguments(s)?);
        self.contains_in_progress.borrow_mut().remove(&pair);
        result
    }

    /// Same type or mutually containing.
    pub(super) fn contains_type_equivalent(&self, t: TypeId, s: TypeId) -> Result<bool> {
        if self.same_type(t, s)? {
            return Ok(true);
        }
        let t_contains_s = self.contains_type(t, s)?;
        if self.loose_wildcards
            && (self.kind(t)? == TypeKind::Wildcard || self.kind(s)? == TypeKind::Wildcard)
        {
            return Ok(t_contains_s || self.contains_type(s, t)?);
        }
        Ok(t_contains_s && self.contains_type(s, t)?)
    }

    /// Two wildcards of the same bound kind whose bounds are the same type.
    fn is_same_wildcard(&self, t: TypeId, s: TypeId) -> Result<bool> {
        if t == s {
            return Ok(true);
        }
        if self.kind(s)? != TypeKind::Wildcard {
            return Ok(false);
        }
        let model = self.model();
        let same = |a: Option<TypeId>, b: Option<TypeId>| -> Result<bool> {
            match (a, b) {
                (Some(a), Some(b)) => self.same_type(a, b),
                (None, None) => Ok(true),
                _ => Ok(false),
            }
        };
        Ok(same(model.extends_bound(t)?, model.extends_bound(s)?)?
            && same(model.super_bound(t)?, model.super_bound(s)?)?)
    }

    /// `s` is a capture variable minted from the wildcard `t`.
    fn is_capture_of(&self, s: TypeId, t: TypeId) -> Result<bool> {
        if self.kind(s)? != TypeKind::TypeVar {
            return Ok(false);
        }
        match self.model().captured_wildcard(s)? {
            Some(wildcard) => self.is_same_wildcard(t, self.resolve(wildcard)?),
            None => Ok(false),
        }
    }
}
