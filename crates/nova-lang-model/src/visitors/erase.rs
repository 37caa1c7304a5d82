use super::derived::ExecutableParts;
use super::{unsupported, RelationCx, Visitors};
use crate::kind::TypeKind;
use crate::model::TypeId;
use crate::Result;

impl Visitors {
    /// Erasure of `ty`.
    ///
    /// Declared types erase to their raw form, arrays to arrays of the erased component, type
    /// variables to the erasure of their upper bound; every other kind erases to itself.
    /// Executable, wildcard, union and intersection types are rejected.
    pub fn erasure(&self, ty: TypeId) -> Result<TypeId> {
        if let Some(erased) = self.source.erasure(ty)? {
            return Ok(erased);
        }
        let kind = self.model().type_kind(ty)?;
        if matches!(
            kind,
            TypeKind::Executable | TypeKind::Wildcard | TypeKind::Union | TypeKind::Intersection
        ) {
            return Err(unsupported("erasure", kind));
        }
        self.cx().erase(ty)
    }
}

impl RelationCx<'_> {
    /// Erasure over every kind, including the ones the public entry point rejects.
    pub(super) fn erase(&self, ty: TypeId) -> Result<TypeId> {
        let model = self.model();
        let ty = self.resolve(ty)?;
        match self.kind(ty)? {
            TypeKind::Declared => self.erase_declared(ty),
            TypeKind::Array => {
                let Some(component) = model.component_type(ty)? else {
                    return Ok(ty);
                };
                let erased = self.erase(component)?;
                if erased == self.resolve(component)? {
                    return Ok(ty);
                }
                self.derived_array(erased)
            }
            TypeKind::TypeVar => self.erase(self.upper_bound(ty)?),
            TypeKind::Intersection => match model.bounds(ty)?.first() {
                Some(first) => self.erase(*first),
                None => self.object(),
            },
            TypeKind::Wildcard => self.erase(self.wild_upper_bound(ty)?),
            TypeKind::Executable => self.erase_executable(ty),
            _ => Ok(ty),
        }
    }

    fn erase_declared(&self, ty: TypeId) -> Result<TypeId> {
        let model = self.model();
        if model.is_erased(ty)? {
            return Ok(ty);
        }
        let Some(element) = model.defining_element(ty)? else {
            return Ok(ty);
        };
        let enclosing = self.resolve(model.enclosing_type(ty)?)?;
        let erased_enclosing = if self.kind(enclosing)? == TypeKind::Declared {
            self.erase(enclosing)?
        } else {
            enclosing
        };
        if model.type_arguments(ty)?.is_empty()
            && model.type_parameters(element)?.is_empty()
            && erased_enclosing == enclosing
        {
            return Ok(ty);
        }

        let outer = (self.kind(erased_enclosing)? != TypeKind::None).then_some(erased_enclosing);
        self.derived_declared(model.resolve_element(element)?, outer, Vec::new(), true)
    }

    fn erase_executable(&self, ty: TypeId) -> Result<TypeId> {
        let model = self.model();
        let mut parameters = Vec::new();
        for parameter in model.parameter_types(ty)? {
            parameters.push(self.erase(parameter)?);
        }
        let receiver = model.receiver_type(ty)?;
        let receiver = match self.kind(receiver)? {
            TypeKind::None => None,
            _ => Some(self.erase(receiver)?),
        };
        let mut thrown = Vec::new();
        for thrown_type in model.thrown_types(ty)? {
            thrown.push(self.erase(thrown_type)?);
        }
        self.derived_executable(ExecutableParts {
            variables: Vec::new(),
            parameters,
            return_type: self.erase(model.return_type(ty)?)?,
            receiver,
            thrown,
        })
    }
}
