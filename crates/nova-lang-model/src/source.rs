//! The provider interface a backend implements for the relation visitors.

use crate::kind::TypeKind;
use crate::model::{ElementId, Model, TypeId};
use crate::Result;

/// Lookup and construction capabilities the relation visitors need from a backend.
///
/// Only [`TypeAndElementSource::model`] and [`TypeAndElementSource::type_element_in`] are
/// required. The constructors default to building nodes in the model. The relation hooks
/// (`erasure`, `same_type`, ...) default to `None`, meaning "compute it yourself"; a backend
/// backed by a host compiler can answer them authoritatively instead.
pub trait TypeAndElementSource: Send + Sync {
    fn model(&self) -> &Model;

    /// Resolve a type element by qualified name, optionally scoped to a module.
    fn type_element_in(&self, module: Option<&str>, qualified_name: &str) -> Result<Option<ElementId>>;

    fn type_element(&self, qualified_name: &str) -> Result<Option<ElementId>> {
        self.type_element_in(None, qualified_name)
    }

    fn declared_type(&self, element: ElementId, arguments: &[TypeId]) -> Result<TypeId> {
        self.model().declared_type(None, element, arguments)
    }

    fn declared_type_in(
        &self,
        enclosing: TypeId,
        element: ElementId,
        arguments: &[TypeId],
    ) -> Result<TypeId> {
        self.model().declared_type(Some(enclosing), element, arguments)
    }

    fn array_type(&self, component: TypeId) -> Result<TypeId> {
        self.model().array_type(component)
    }

    fn primitive_type(&self, kind: TypeKind) -> Result<TypeId> {
        self.model().primitive_type(kind)
    }

    fn no_type(&self, kind: TypeKind) -> Result<TypeId> {
        self.model().no_type(kind)
    }

    fn null_type(&self) -> TypeId {
        self.model().null_type()
    }

    fn wildcard_type(&self, extends: Option<TypeId>, super_: Option<TypeId>) -> Result<TypeId> {
        self.model().wildcard_type(extends, super_)
    }

    /// The class a primitive boxes to.
    fn boxed_class(&self, primitive: TypeKind) -> Result<Option<ElementId>> {
        match primitive.boxed_class_name() {
            Some(name) => self.type_element(name),
            None => Ok(None),
        }
    }

    fn erasure(&self, _ty: TypeId) -> Result<Option<TypeId>> {
        Ok(None)
    }

    fn same_type(&self, _a: TypeId, _b: TypeId) -> Result<Option<bool>> {
        Ok(None)
    }

    fn is_subtype(&self, _sub: TypeId, _sup: TypeId) -> Result<Option<bool>> {
        Ok(None)
    }

    fn is_assignable(&self, _from: TypeId, _to: TypeId) -> Result<Option<bool>> {
        Ok(None)
    }

    fn contains(&self, _container: TypeId, _contained: TypeId) -> Result<Option<bool>> {
        Ok(None)
    }

    fn direct_supertypes(&self, _ty: TypeId) -> Result<Option<Vec<TypeId>>> {
        Ok(None)
    }
}
