use super::{unsupported, RelationCx, Visitors};
use crate::kind::TypeKind;
use crate::model::{ElementId, TypeId};
use crate::Result;

impl Visitors {
    /// The direct superclass type of `ty`, substituted for `ty`'s arguments.
    ///
    /// Returns the none type for `Object`, for interfaces and for kinds without a superclass.
    pub fn supertype(&self, ty: TypeId) -> Result<TypeId> {
        self.cx().supertype(ty)
    }

    /// The directly implemented (or, for interfaces, extended) interface types of `ty`.
    pub fn interfaces(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        self.cx().interfaces(ty)
    }

    /// Direct supertypes: superclass then interfaces for declared types, the flattened bound for
    /// type variables, the bounds of an intersection.
    pub fn direct_supertypes(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        if let Some(supertypes) = self.source.direct_supertypes(ty)? {
            return Ok(supertypes);
        }
        self.cx().direct_supertypes(ty)
    }

    pub fn is_raw(&self, ty: TypeId) -> Result<bool> {
        self.cx().is_raw(ty)
    }

    /// Type arguments of `ty` and of its enclosing types, outermost first.
    pub fn all_type_arguments(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        self.cx().all_type_arguments(ty)
    }
}

impl RelationCx<'_> {
    pub(super) fn supertype(&self, ty: TypeId) -> Result<TypeId> {
        let model = self.model();
        let ty = self.resolve(ty)?;
        match self.kind(ty)? {
            TypeKind::Declared => {
                let Some(element) = self.element_of(ty)? else {
                    return Ok(self.none());
                };
                if model.element_kind(element)?.is_interface() || self.is_object(ty)? {
                    return Ok(self.none());
                }
                let superclass = match model.superclass(element)? {
                    Some(superclass) => superclass,
                    None => self.object()?,
                };
                if self.kind(superclass)? == TypeKind::None {
                    return Ok(self.none());
                }
                self.as_member_of(superclass, ty, element)
            }
            TypeKind::TypeVar => {
                let bound = self.upper_bound(ty)?;
                match self.kind(bound)? {
                    TypeKind::TypeVar => Ok(bound),
                    TypeKind::Intersection => self.supertype(bound),
                    _ if self.is_interface(bound)? => self.object(),
                    _ => Ok(bound),
                }
            }
            TypeKind::Intersection => {
                for bound in model.bounds(ty)? {
                    if !self.is_interface(bound)? {
                        return Ok(bound);
                    }
                }
                self.object()
            }
            TypeKind::Array => {
                let Some(component) = model.component_type(ty)? else {
                    return self.object();
                };
                if self.kind(component)?.is_primitive() || self.is_object(component)? {
                    return self.object();
                }
                let component_super = self.supertype(component)?;
                if self.kind(component_super)? == TypeKind::None {
                    return self.object();
                }
                self.derived_array(component_super)
            }
            _ => Ok(self.none()),
        }
    }

    pub(super) fn interfaces(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        let model = self.model();
        let ty = self.resolve(ty)?;
        match self.kind(ty)? {
            TypeKind::Declared => {
                let Some(element) = self.element_of(ty)? else {
                    return Ok(Vec::new());
                };
                let mut interfaces = Vec::new();
                for interface in model.interfaces(element)? {
                    interfaces.push(self.as_member_of(interface, ty, element)?);
                }
                Ok(interfaces)
            }
            TypeKind::TypeVar => {
                let bound = self.upper_bound(ty)?;
                if self.kind(bound)? == TypeKind::Intersection {
                    return self.interfaces(bound);
                }
                if self.is_interface(bound)? {
                    return Ok(vec![bound]);
                }
                Ok(Vec::new())
            }
            TypeKind::Intersection => {
                let mut interfaces = Vec::new();
                for bound in model.bounds(ty)? {
                    if self.is_interface(bound)? {
                        interfaces.push(bound);
                    }
                }
                Ok(interfaces)
            }
            _ => Ok(Vec::new()),
        }
    }

    pub(super) fn direct_supertypes(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        let model = self.model();
        let ty = self.resolve(ty)?;
        match self.kind(ty)? {
            TypeKind::Declared => {
                if self.is_object(ty)? {
                    return Ok(Vec::new());
                }
                let mut supertypes = Vec::new();
                let supertype = self.supertype(ty)?;
                if self.kind(supertype)? != TypeKind::None {
                    supertypes.push(supertype);
                }
                supertypes.extend(self.interfaces(ty)?);
                Ok(supertypes)
            }
            TypeKind::TypeVar => {
                let bound = self.upper_bound(ty)?;
                if self.kind(bound)? == TypeKind::Intersection {
                    return model.bounds(bound);
                }
                Ok(vec![bound])
            }
            TypeKind::Intersection => model.bounds(ty),
            TypeKind::Array => {
                let well_known = self.v.well_known()?;
                let Some(component) = model.component_type(ty)? else {
                    return Ok(vec![well_known.object_type]);
                };
                if self.kind(component)?.is_primitive() || self.is_object(component)? {
                    return Ok(vec![
                        well_known.object_type,
                        well_known.cloneable_type,
                        well_known.serializable_type,
                    ]);
                }
                let mut supertypes = Vec::new();
                for component_super in self.direct_supertypes(component)? {
                    supertypes.push(self.derived_array(component_super)?);
                }
                if supertypes.is_empty() {
                    supertypes.push(self.derived_array(well_known.object_type)?);
                }
                Ok(supertypes)
            }
            TypeKind::Error => Ok(Vec::new()),
            kind => Err(unsupported("direct_supertypes", kind)),
        }
    }

    /// View a supertype declared on `element` from the instantiation `ty`: erased when `ty` is
    /// raw, substituted when it is parameterized.
    fn as_member_of(&self, declared: TypeId, ty: TypeId, element: ElementId) -> Result<TypeId> {
        if self.is_raw(ty)? {
            return self.erase(declared);
        }
        if !self.is_parameterized(ty)? {
            return Ok(declared);
        }
        let from = self.all_type_arguments(self.declared_type_of(element)?)?;
        let to = self.all_type_arguments(ty)?;
        self.subst(declared, &from, &to)
    }
}
