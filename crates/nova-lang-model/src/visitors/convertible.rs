use super::{RelationCx, Visitors};
use crate::guard;
use crate::kind::TypeKind;
use crate::model::{ElementId, TypeId};
use crate::{LangError, Result};

impl Visitors {
    /// Subtyping extended with unchecked conversion: a raw type is accepted where a
    /// parameterization of it is expected.
    pub fn is_subtype_unchecked(&self, sub: TypeId, sup: TypeId) -> Result<bool> {
        self.cx().is_subtype_unchecked(sub, sup)
    }

    /// Whether a value of type `from` converts to `to` by widening, boxing, unboxing or
    /// unchecked conversion.
    pub fn is_convertible(&self, from: TypeId, to: TypeId) -> Result<bool> {
        self.cx().is_convertible(from, to)
    }

    /// Assignment compatibility: same type or convertible.
    pub fn is_assignable(&self, from: TypeId, to: TypeId) -> Result<bool> {
        if let Some(answer) = self.source.is_assignable(from, to)? {
            return Ok(answer);
        }
        let cx = self.cx();
        Ok(cx.same_type(from, to)? || cx.is_convertible(from, to)?)
    }

    /// The class a primitive boxes to, through the source.
    pub fn boxed_class(&self, primitive: TypeKind) -> Result<Option<ElementId>> {
        if !primitive.is_primitive() {
            return Err(LangError::IllegalTypeKind {
                operation: "boxed_class",
                kind: primitive,
            });
        }
        guard::with_completion(|| self.source.boxed_class(primitive))
    }

    /// The primitive type `ty` unboxes to, if any.
    pub fn unboxed_type(&self, ty: TypeId) -> Result<Option<TypeId>> {
        self.cx().unboxed_type(ty)
    }
}

impl RelationCx<'_> {
    pub(super) fn is_subtype_unchecked(&self, t: TypeId, s: TypeId) -> Result<bool> {
        let model = self.model();
        let t = self.resolve(t)?;
        let s = self.resolve(s)?;
        if self.kind(t)? == TypeKind::Array && self.kind(s)? == TypeKind::Array {
            let (Some(tc), Some(sc)) = (model.component_type(t)?, model.component_type(s)?) else {
                return Ok(false);
            };
            if self.kind(tc)?.is_primitive() {
                return self.same_type(tc, sc);
            }
            return self.is_subtype_unchecked(tc, sc);
        }
        if self.is_subtype(t, s, true)? {
            return Ok(true);
        }
        if self.kind(t)? == TypeKind::TypeVar {
            return self.is_subtype_unchecked(self.upper_bound(t)?, s);
        }
        if self.kind(s)? == TypeKind::Declared && !self.is_raw(s)? {
            if let Some(element) = self.element_of(s)? {
                if let Some(sup) = self.as_super(t, element)? {
                    return self.is_raw(sup);
                }
            }
        }
        Ok(false)
    }

    pub(super) fn is_convertible(&self, t: TypeId, s: TypeId) -> Result<bool> {
        let t_kind = self.kind(t)?;
        if t_kind == TypeKind::Error {
            return Ok(true);
        }
        let t_primitive = t_kind.is_primitive();
        let s_primitive = self.kind(s)?.is_primitive();
        if t_primitive == s_primitive {
            return self.is_subtype_unchecked(t, s);
        }
        if t_primitive {
            return match self.boxed_type(t_kind)? {
                Some(boxed) => self.is_subtype(boxed, s, true),
                None => Ok(false),
            };
        }
        match self.unboxed_type(t)? {
            Some(unboxed) => self.is_subtype(unboxed, s, true),
            None => Ok(false),
        }
    }

    fn boxed_type(&self, primitive: TypeKind) -> Result<Option<TypeId>> {
        match self.v.boxed_class(primitive)? {
            Some(element) => self.model().element_type(element),
            None => Ok(None),
        }
    }

    pub(super) fn unboxed_type(&self, ty: TypeId) -> Result<Option<TypeId>> {
        let ty = self.resolve(ty)?;
        if !matches!(
            self.kind(ty)?,
            TypeKind::Declared | TypeKind::TypeVar | TypeKind::Intersection
        ) {
            return Ok(None);
        }
        for primitive in TypeKind::PRIMITIVES {
            let Some(boxed) = self.v.boxed_class(primitive)? else {
                continue;
            };
            let boxed = self.model().resolve_element(boxed)?;
            if self.as_super(ty, boxed)?.is_some() {
                return self.model().primitive_type(primitive).map(Some);
            }
        }
        Ok(None)
    }
}
