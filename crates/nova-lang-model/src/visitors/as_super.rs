use super::{RelationCx, Visitors};
use crate::kind::TypeKind;
use crate::model::{ElementId, TypeId};
use crate::Result;

impl Visitors {
    /// The supertype of `ty` (possibly `ty` itself) whose element is `element`.
    ///
    /// A raw type viewed as its own element stays raw. Interfaces reach `Object` implicitly.
    pub fn as_super(&self, ty: TypeId, element: ElementId) -> Result<Option<TypeId>> {
        let element = self.model().resolve_element(element)?;
        self.cx().as_super(ty, element)
    }

    /// Like [`Visitors::as_super`], but also searches the enclosing types of `ty`.
    pub fn as_outer_super(&self, ty: TypeId, element: ElementId) -> Result<Option<TypeId>> {
        let element = self.model().resolve_element(element)?;
        self.cx().as_outer_super(ty, element)
    }
}

impl RelationCx<'_> {
    /// `element` must already be resolved.
    pub(super) fn as_super(&self, ty: TypeId, element: ElementId) -> Result<Option<TypeId>> {
        let model = self.model();
        let ty = self.resolve(ty)?;
        match self.kind(ty)? {
            TypeKind::Declared => {
                let Some(own) = self.element_of(ty)? else {
                    return Ok(None);
                };
                if own == element {
                    return Ok(Some(ty));
                }
                if let Some(found) = self.visiting(own, || {
                    let supertype = self.supertype(ty)?;
                    if self.kind(supertype)? != TypeKind::None {
                        if let Some(found) = self.as_super(supertype, element)? {
                            return Ok(Some(found));
                        }
                    }
                    for interface in self.interfaces(ty)? {
                        if let Some(found) = self.as_super(interface, element)? {
                            return Ok(Some(found));
                        }
                    }
                    Ok(None)
                })? {
                    return Ok(Some(found));
                }
                self.implicit_object(element)
            }
            TypeKind::Array => {
                let well_known = self.v.well_known()?;
                Ok(if element == well_known.object {
                    Some(well_known.object_type)
                } else if element == well_known.cloneable {
                    Some(well_known.cloneable_type)
                } else if element == well_known.serializable {
                    Some(well_known.serializable_type)
                } else {
                    None
                })
            }
            TypeKind::TypeVar => {
                let Some(own) = self.element_of(ty)? else {
                    return self.as_super(self.upper_bound(ty)?, element);
                };
                if own == element {
                    return Ok(Some(ty));
                }
                let bound = self.upper_bound(ty)?;
                self.visiting(own, || self.as_super(bound, element))
            }
            TypeKind::Intersection => {
                for bound in model.bounds(ty)? {
                    if let Some(found) = self.as_super(bound, element)? {
                        return Ok(Some(found));
                    }
                }
                self.implicit_object(element)
            }
            TypeKind::Error => Ok(Some(ty)),
            _ => Ok(None),
        }
    }

    pub(super) fn as_outer_super(&self, ty: TypeId, element: ElementId) -> Result<Option<TypeId>> {
        let model = self.model();
        let mut current = self.resolve(ty)?;
        match self.kind(current)? {
            TypeKind::Declared => loop {
                if let Some(found) = self.as_super(current, element)? {
                    return Ok(Some(found));
                }
                current = self.resolve(model.enclosing_type(current)?)?;
                if self.kind(current)? != TypeKind::Declared {
                    return Ok(None);
                }
            },
            TypeKind::Array | TypeKind::TypeVar | TypeKind::Intersection => {
                self.as_super(current, element)
            }
            TypeKind::Error => Ok(Some(current)),
            _ => Ok(None),
        }
    }

    /// Run `f` with `element` pushed on the visited stack; `None` if it is already there.
    fn visiting(
        &self,
        element: ElementId,
        f: impl FnOnce() -> Result<Option<TypeId>>,
    ) -> Result<Option<TypeId>> {
        if self.as_super_seen.borrow().contains(&element) {
            return Ok(None);
        }
        self.as_super_seen.borrow_mut().push(element);
        let result = f();
        self.as_super_seen.borrow_mut().pop();
        result
    }

    /// Every reference type has `Object` as a supertype, interfaces included.
    fn implicit_object(&self, element: ElementId) -> Result<Option<TypeId>> {
        if element == self.object_element()? {
            return Ok(Some(self.object()?));
        }
        Ok(None)
    }
}
