use super::derived::ExecutableParts;
use super::{RelationCx, Visitors};
use crate::kind::TypeKind;
use crate::model::TypeId;
use crate::Result;

impl Visitors {
    /// Replace every occurrence of the type variables `from` in `ty` with the matching entry of
    /// `to`. Nodes without a replaced variable are returned unchanged (same handle).
    pub fn subst(&self, ty: TypeId, from: &[TypeId], to: &[TypeId]) -> Result<TypeId> {
        self.cx().subst(ty, from, to)
    }
}

impl RelationCx<'_> {
    pub(super) fn subst(&self, ty: TypeId, from: &[TypeId], to: &[TypeId]) -> Result<TypeId> {
        let model = self.model();
        let ty = self.resolve(ty)?;
        if from.is_empty() || from.len() != to.len() {
            return Ok(ty);
        }
        match self.kind(ty)? {
            TypeKind::TypeVar => {
                for (var, replacement) in from.iter().zip(to) {
                    if self.same_type_variable(ty, *var)? {
                        return Ok(*replacement);
                    }
                }
                Ok(ty)
            }
            TypeKind::Declared => {
                let enclosing = self.resolve(model.enclosing_type(ty)?)?;
                let new_enclosing = match self.kind(enclosing)? {
                    TypeKind::Declared => self.subst(enclosing, from, to)?,
                    _ => enclosing,
                };
                let arguments = model.type_arguments(ty)?;
                let new_arguments = self.subst_list(&arguments, from, to)?;
                if new_enclosing == enclosing && new_arguments.is_none() {
                    return Ok(ty);
                }
                let Some(element) = model.defining_element(ty)? else {
                    return Ok(ty);
                };
                let outer = (self.kind(new_enclosing)? != TypeKind::None).then_some(new_enclosing);
                self.derived_declared(
                    model.resolve_element(element)?,
                    outer,
                    new_arguments.unwrap_or(arguments),
                    model.is_erased(ty)?,
                )
            }
            TypeKind::Array => {
                let Some(component) = model.component_type(ty)? else {
                    return Ok(ty);
                };
                let new_component = self.wild_upper_bound(self.subst(component, from, to)?)?;
                if new_component == self.resolve(component)? {
                    return Ok(ty);
                }
                self.derived_array(new_component)
            }
            TypeKind::Wildcard => {
                let extends = model.extends_bound(ty)?;
                let super_ = model.super_bound(ty)?;
                let new_extends = extends.map(|b| self.subst(b, from, to)).transpose()?;
                let new_super = super_.map(|b| self.subst(b, from, to)).transpose()?;
                if self.unchanged(extends, new_extends)? && self.unchanged(super_, new_super)? {
                    return Ok(ty);
                }
                // A bound replaced by a wildcard contributes that wildcard's own bound.
                let new_extends = match new_extends {
                    Some(bound) => Some(self.wild_upper_bound(bound)?),
                    None => None,
                };
                let new_super = match new_super {
                    Some(bound) if self.kind(bound)? == TypeKind::Wildcard => {
                        let lower = self.wild_lower_bound(bound)?;
                        (self.kind(lower)? != TypeKind::Null).then_some(lower)
                    }
                    other => other,
                };
                self.derived_wildcard(new_extends, new_super)
            }
            TypeKind::Intersection => {
                let bounds = model.bounds(ty)?;
                match self.subst_list(&bounds, from, to)? {
                    Some(new_bounds) => self.derived_intersection(new_bounds),
                    None => Ok(ty),
                }
            }
            TypeKind::Union => {
                let alternatives = model.bounds(ty)?;
                match self.subst_list(&alternatives, from, to)? {
                    Some(new_alternatives) => self.derived_union(new_alternatives),
                    None => Ok(ty),
                }
            }
            TypeKind::Executable => self.subst_executable(ty, from, to),
            _ => Ok(ty),
        }
    }

    /// `None` when no element of `types` changed.
    fn subst_list(
        &self,
        types: &[TypeId],
        from: &[TypeId],
        to: &[TypeId],
    ) -> Result<Option<Vec<TypeId>>> {
        let mut changed = false;
        let mut result = Vec::with_capacity(types.len());
        for ty in types {
            let new = self.subst(*ty, from, to)?;
            changed |= new != self.resolve(*ty)?;
            result.push(new);
        }
        Ok(changed.then_some(result))
    }

    fn subst_executable(&self, ty: TypeId, from: &[TypeId], to: &[TypeId]) -> Result<TypeId> {
        let model = self.model();
        let parameters = model.parameter_types(ty)?;
        let thrown = model.thrown_types(ty)?;
        let return_type = model.return_type(ty)?;
        let new_parameters = self.subst_list(&parameters, from, to)?;
        let new_thrown = self.subst_list(&thrown, from, to)?;
        let new_return = self.subst(return_type, from, to)?;
        if new_parameters.is_none() && new_thrown.is_none() && new_return == self.resolve(return_type)? {
            return Ok(ty);
        }

        let receiver = model.receiver_type(ty)?;
        self.derived_executable(ExecutableParts {
            variables: model.executable_type_variables(ty)?,
            parameters: new_parameters.unwrap_or(parameters),
            return_type: new_return,
            receiver: (self.kind(receiver)? != TypeKind::None).then_some(receiver),
            thrown: new_thrown.unwrap_or(thrown),
        })
    }

    fn unchanged(&self, old: Option<TypeId>, new: Option<TypeId>) -> Result<bool> {
        match (old, new) {
            (Some(old), Some(new)) => Ok(self.resolve(old)? == new),
            _ => Ok(true),
        }
    }

    /// Same variable: the same node, or two non-capture variables of the same element.
    pub(super) fn same_type_variable(&self, a: TypeId, b: TypeId) -> Result<bool> {
        let a = self.resolve(a)?;
        let b = self.resolve(b)?;
        if a == b {
            return Ok(true);
        }
        if self.kind(a)? != TypeKind::TypeVar || self.kind(b)? != TypeKind::TypeVar {
            return Ok(false);
        }
        if self.is_capture(a)? || self.is_capture(b)? {
            return Ok(false);
        }
        match (self.element_of(a)?, self.element_of(b)?) {
            (Some(x), Some(y)) => self.same_element(x, y),
            _ => Ok(false),
        }
    }
}
