use super::{RelationCx, Visitors};
use crate::kind::TypeKind;
use crate::model::TypeId;
use crate::Result;

impl Visitors {
    /// Whether `a` and `b` denote the same type.
    ///
    /// Type arguments compare by mutual containment, so `List<?>` and `List<? extends Object>`
    /// are the same type. Annotations are compared only when the session's equality policy
    /// includes them.
    pub fn is_same_type(&self, a: TypeId, b: TypeId) -> Result<bool> {
        if let Some(answer) = self.source.same_type(a, b)? {
            return Ok(answer);
        }
        self.cx().same_type(a, b)
    }

    /// Like [`Visitors::is_same_type`], but a wildcard argument matches when either argument
    /// contains the other.
    pub fn is_same_type_loose(&self, a: TypeId, b: TypeId) -> Result<bool> {
        let mut cx = self.cx();
        cx.loose_wildcards = true;
        cx.same_type(a, b)
    }
}

impl RelationCx<'_> {
    pub(super) fn same_type(&self, t: TypeId, s: TypeId) -> Result<bool> {
        let model = self.model();
        let t = self.resolve(t)?;
        let s = self.resolve(s)?;
        if t == s {
            return Ok(true);
        }
        if self.v.equality.include_annotations {
            let (ta, sa) = (model.type_annotations(t)?, model.type_annotations(s)?);
            if ta.len() != sa.len() {
                return Ok(false);
            }
            for (x, y) in ta.iter().zip(&sa) {
                if !self.same_type(x.annotation_type, y.annotation_type)? || x.values != y.values {
                    return Ok(false);
                }
            }
        }

        let t_kind = self.kind(t)?;
        let s_kind = self.kind(s)?;
        match t_kind {
            k if k.is_primitive() || k.is_no_type() || k == TypeKind::Null => Ok(k == s_kind),
            TypeKind::TypeVar => self.same_type_variable(t, s),
            TypeKind::Wildcard => {
                if s_kind != TypeKind::Wildcard {
                    return Ok(false);
                }
                Ok(self.contains_type(t, s)? && self.contains_type(s, t)?)
            }
            TypeKind::Declared | TypeKind::Error => {
                if s_kind != t_kind {
                    return Ok(false);
                }
                match (self.element_of(t)?, self.element_of(s)?) {
                    (Some(a), Some(b)) if self.same_element(a, b)? => {}
                    (None, None) => {}
                    _ => return Ok(false),
                }
                if !self.same_type(model.enclosing_type(t)?, model.enclosing_type(s)?)? {
                    return Ok(false);
                }
                let (ta, sa) = (model.type_arguments(t)?, model.type_arguments(s)?);
                if ta.len() != sa.len() {
                    return Ok(false);
                }
                for (a, b) in ta.iter().zip(&sa) {
                    if !self.contains_type_equivalent(*a, *b)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            TypeKind::Array => {
                if s_kind != TypeKind::Array {
                    return Ok(false);
                }
                match (model.component_type(t)?, model.component_type(s)?) {
                    (Some(a), Some(b)) => self.same_type(a, b),
                    (None, None) => Ok(true),
                    _ => Ok(false),
                }
            }
            TypeKind::Intersection | TypeKind::Union => {
                if s_kind != t_kind {
                    return Ok(false);
                }
                self.same_type_sets(&model.bounds(t)?, &model.bounds(s)?)
            }
            TypeKind::Executable => {
                if s_kind != TypeKind::Executable {
                    return Ok(false);
                }
                self.same_executable(t, s)
            }
            _ => Ok(false),
        }
    }

    /// Same members regardless of order.
    fn same_type_sets(&self, a: &[TypeId], b: &[TypeId]) -> Result<bool> {
        Ok(self.each_in(a, b)? && self.each_in(b, a)?)
    }

    fn each_in(&self, items: &[TypeId], set: &[TypeId]) -> Result<bool> {
        'items: for item in items {
            for candidate in set {
                if self.same_type(*item, *candidate)? {
                    continue 'items;
                }
            }
            return Ok(false);
        }
        Ok(true)
    }

    /// Same parameter and return types after renaming `s`'s type variables to `t`'s.
    fn same_executable(&self, t: TypeId, s: TypeId) -> Result<bool> {
        let model = self.model();
        let t_vars = model.executable_type_variables(t)?;
        let s_vars = model.executable_type_variables(s)?;
        if t_vars.len() != s_vars.len() {
            return Ok(false);
        }
        let s = self.subst(s, &s_vars, &t_vars)?;
        let (tp, sp) = (model.parameter_types(t)?, model.parameter_types(s)?);
        if tp.len() != sp.len() {
            return Ok(false);
        }
        for (a, b) in tp.iter().zip(&sp) {
            if !self.same_type(*a, *b)? {
                return Ok(false);
            }
        }
        self.same_type(model.return_type(t)?, model.return_type(s)?)
    }
}
