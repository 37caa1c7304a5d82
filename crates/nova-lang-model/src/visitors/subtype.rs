use super::{unsupported, RelationCx, Visitors};
use crate::kind::TypeKind;
use crate::model::TypeId;
use crate::Result;

impl Visitors {
    /// Whether `sub` is a subtype of `sup`.
    ///
    /// Applies capture conversion to `sub` first unless disabled by
    /// [`crate::VisitorsConfig::capture_in_subtyping`].
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> Result<bool> {
        if let Some(answer) = self.source.is_subtype(sub, sup)? {
            return Ok(answer);
        }
        self.cx().is_subtype(sub, sup, self.config.capture_in_subtyping)
    }

    /// Subtyping without capture conversion of `sub`.
    pub fn is_subtype_no_capture(&self, sub: TypeId, sup: TypeId) -> Result<bool> {
        self.cx().is_subtype_no_capture(sub, sup)
    }
}

/// Primitive widening (JLS 5.1.2), reflexive pairs excluded.
fn widens_to(from: TypeKind, to: TypeKind) -> bool {
    use TypeKind::*;
    match from {
        Byte => matches!(to, Short | Int | Long | Float | Double),
        Short | Char => matches!(to, Int | Long | Float | Double),
        Int => matches!(to, Long | Float | Double),
        Long => matches!(to, Float | Double),
        Float => to == Double,
        _ => false,
    }
}

impl RelationCx<'_> {
    pub(super) fn is_subtype_no_capture(&self, t: TypeId, s: TypeId) -> Result<bool> {
        self.is_subtype(t, s, false)
    }

    pub(super) fn is_subtype(&self, t: TypeId, s: TypeId, capture: bool) -> Result<bool> {
        let model = self.model();
        let t = self.resolve(t)?;
        let s = self.resolve(s)?;
        if self.same_type(t, s)? {
            return Ok(true);
        }
        let s_kind = self.kind(s)?;
        if s_kind == TypeKind::Intersection {
            for bound in model.bounds(s)? {
                if !self.is_subtype(t, bound, capture)? {
                    return Ok(false);
                }
            }
            return Ok(true);
        }
        if s_kind == TypeKind::Error {
            return Ok(true);
        }

        // `T <: ? super L` and `T <: CAP` (with lower bound L) both reduce to `T <: L`.
        let lower = self.cvar_lower_bound(self.wild_lower_bound(s)?)?;
        if lower != s && self.kind(lower)? != TypeKind::Null {
            let t = if capture { self.capture(t)? } else { t };
            return self.is_subtype(t, lower, false);
        }

        let t = if capture { self.capture(t)? } else { t };
        let t_kind = self.kind(t)?;
        match t_kind {
            k if k.is_primitive() => Ok(s_kind.is_primitive() && (k == s_kind || widens_to(k, s_kind))),
            TypeKind::Null => Ok(s_kind.is_reference()),
            TypeKind::Error => Ok(true),
            TypeKind::TypeVar => self.is_subtype_no_capture(self.upper_bound(t)?, s),
            TypeKind::Declared | TypeKind::Intersection => {
                if s_kind != TypeKind::Declared {
                    return Ok(false);
                }
                let Some(s_element) = self.element_of(s)? else {
                    return Ok(false);
                };
                let Some(sup) = self.as_super(t, s_element)? else {
                    return Ok(false);
                };
                if self.kind(sup)? != TypeKind::Declared {
                    return self.is_subtype_no_capture(sup, s);
                }
                if !model.type_arguments(s)?.is_empty() && !self.contains_recursive(s, sup)? {
                    return Ok(false);
                }
                let s_enclosing = model.enclosing_type(s)?;
                if self.kind(s_enclosing)? == TypeKind::Declared && self.is_parameterized(s_enclosing)? {
                    let sup_enclosing = model.enclosing_type(sup)?;
                    if self.kind(sup_enclosing)? != TypeKind::Declared {
                        return Ok(false);
                    }
                    return self.is_subtype_no_capture(sup_enclosing, s_enclosing);
                }
                Ok(true)
            }
            TypeKind::Array => {
                if s_kind == TypeKind::Array {
                    let (Some(tc), Some(sc)) = (model.component_type(t)?, model.component_type(s)?) else {
                        return Ok(false);
                    };
                    if self.kind(tc)?.is_primitive() {
                        return self.same_type(tc, sc);
                    }
                    return self.is_subtype_no_capture(tc, sc);
                }
                if s_kind == TypeKind::Declared {
                    let well_known = self.v.well_known()?;
                    let Some(element) = self.element_of(s)? else {
                        return Ok(false);
                    };
                    return Ok(element == well_known.object
                        || element == well_known.cloneable
                        || element == well_known.serializable);
                }
                Ok(false)
            }
            TypeKind::Union => {
                for alternative in model.bounds(t)? {
                    if !self.is_subtype(alternative, s, capture)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            kind => Err(unsupported("is_subtype", kind)),
        }
    }
}
