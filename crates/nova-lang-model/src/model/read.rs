//! Kind-agnostic read accessors.
//!
//! Every accessor is total over kinds: asking a node for state its kind does not carry yields
//! the empty value (`None`, an empty list) rather than an error. Handles are returned as
//! stored, i.e. possibly still deferred.

use std::collections::BTreeSet;

use super::{
    AnnotationMirror, AnnotationValue, ConstantValue, ElementData, ElementId, Model, TypeData,
    TypeId,
};
use crate::kind::{ElementKind, Modifier, NestingKind, TypeKind};
use crate::Result;

impl Model {
    pub fn type_annotations(&self, ty: TypeId) -> Result<Vec<AnnotationMirror>> {
        Ok(self.type_node(ty)?.annotations.snapshot())
    }

    pub fn component_type(&self, ty: TypeId) -> Result<Option<TypeId>> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::Array(data) => data.component.get(),
            _ => None,
        })
    }

    /// The element of a declared, error or type-variable type.
    pub fn defining_element(&self, ty: TypeId) -> Result<Option<ElementId>> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::Declared(data) => data.element.get(),
            TypeData::TypeVar(data) => data.element.get(),
            _ => None,
        })
    }

    /// The enclosing type of a declared type; the none type when unset.
    pub fn enclosing_type(&self, ty: TypeId) -> Result<TypeId> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::Declared(data) => data.enclosing.get(),
            _ => None,
        }
        .unwrap_or_else(|| self.none_type()))
    }

    pub fn type_arguments(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::Declared(data) => data.arguments.snapshot(),
            _ => Vec::new(),
        })
    }

    pub fn is_erased(&self, ty: TypeId) -> Result<bool> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::Declared(data) => data.erased.get().unwrap_or(false),
            _ => false,
        })
    }

    pub fn parameter_types(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::Executable(data) => data.parameters.snapshot(),
            _ => Vec::new(),
        })
    }

    /// Return type of an executable type; void when unset.
    pub fn return_type(&self, ty: TypeId) -> Result<TypeId> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::Executable(data) => data.return_type.get(),
            _ => None,
        }
        .unwrap_or_else(|| self.void_type()))
    }

    /// Receiver type of an executable type; the none type when unset.
    pub fn receiver_type(&self, ty: TypeId) -> Result<TypeId> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::Executable(data) => data.receiver.get(),
            _ => None,
        }
        .unwrap_or_else(|| self.none_type()))
    }

    pub fn thrown_types(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::Executable(data) => data.thrown.snapshot(),
            _ => Vec::new(),
        })
    }

    pub fn executable_type_variables(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::Executable(data) => data.type_variables.snapshot(),
            _ => Vec::new(),
        })
    }

    /// Bounds of an intersection or alternatives of a union.
    pub fn bounds(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::Intersection(data) | TypeData::Union(data) => data.items.snapshot(),
            _ => Vec::new(),
        })
    }

    /// Declared upper bound of a type variable, `None` when unset (logically `Object`).
    pub fn upper_bound(&self, ty: TypeId) -> Result<Option<TypeId>> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::TypeVar(data) => data.upper.get(),
            _ => None,
        })
    }

    /// Declared lower bound of a type variable, `None` when unset (logically the null type).
    pub fn lower_bound(&self, ty: TypeId) -> Result<Option<TypeId>> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::TypeVar(data) => data.lower.get(),
            _ => None,
        })
    }

    pub fn captured_wildcard(&self, ty: TypeId) -> Result<Option<TypeId>> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::TypeVar(data) => data.captured_from.get(),
            _ => None,
        })
    }

    pub fn extends_bound(&self, ty: TypeId) -> Result<Option<TypeId>> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::Wildcard(data) => data.extends.get(),
            _ => None,
        })
    }

    pub fn super_bound(&self, ty: TypeId) -> Result<Option<TypeId>> {
        Ok(match &self.type_node(ty)?.data {
            TypeData::Wildcard(data) => data.super_.get(),
            _ => None,
        })
    }

    pub fn simple_name(&self, element: ElementId) -> Result<String> {
        Ok(self.element_node(element)?.name.get().unwrap_or_default())
    }

    /// The element's own type (`asType`), if set.
    pub fn element_type(&self, element: ElementId) -> Result<Option<TypeId>> {
        Ok(self.element_node(element)?.ty.get())
    }

    pub fn modifiers(&self, element: ElementId) -> Result<BTreeSet<Modifier>> {
        Ok(self.element_node(element)?.modifiers.read().clone())
    }

    pub fn has_modifier(&self, element: ElementId, modifier: Modifier) -> Result<bool> {
        Ok(self.element_node(element)?.modifiers.read().contains(&modifier))
    }

    pub fn enclosing_element(&self, element: ElementId) -> Result<Option<ElementId>> {
        Ok(self.element_node(element)?.enclosing.get())
    }

    pub fn enclosed_elements(&self, element: ElementId) -> Result<Vec<ElementId>> {
        Ok(self.element_node(element)?.enclosed.snapshot())
    }

    pub fn element_annotations(&self, element: ElementId) -> Result<Vec<AnnotationMirror>> {
        Ok(self.element_node(element)?.annotations.snapshot())
    }

    pub fn nesting_kind(&self, element: ElementId) -> Result<Option<NestingKind>> {
        Ok(match &self.element_node(element)?.data {
            ElementData::Type(data) => data.nesting.get(),
            _ => None,
        })
    }

    /// Declared superclass; `None` for interfaces, `Object` and classes that never set one.
    pub fn superclass(&self, element: ElementId) -> Result<Option<TypeId>> {
        Ok(match &self.element_node(element)?.data {
            ElementData::Type(data) => data.superclass.get(),
            _ => None,
        })
    }

    pub fn interfaces(&self, element: ElementId) -> Result<Vec<TypeId>> {
        Ok(match &self.element_node(element)?.data {
            ElementData::Type(data) => data.interfaces.snapshot(),
            _ => Vec::new(),
        })
    }

    pub fn permitted_subclasses(&self, element: ElementId) -> Result<Vec<TypeId>> {
        Ok(match &self.element_node(element)?.data {
            ElementData::Type(data) => data.permitted.snapshot(),
            _ => Vec::new(),
        })
    }

    /// Type parameters of a type or executable element, in declaration order.
    pub fn type_parameters(&self, element: ElementId) -> Result<Vec<ElementId>> {
        Ok(match &self.element_node(element)?.data {
            ElementData::Type(data) => data.type_parameters.snapshot(),
            ElementData::Executable(data) => data.type_parameters.snapshot(),
            _ => Vec::new(),
        })
    }

    pub fn parameters(&self, element: ElementId) -> Result<Vec<ElementId>> {
        Ok(match &self.element_node(element)?.data {
            ElementData::Executable(data) => data.parameters.snapshot(),
            _ => Vec::new(),
        })
    }

    pub fn is_varargs(&self, element: ElementId) -> Result<bool> {
        Ok(match &self.element_node(element)?.data {
            ElementData::Executable(data) => data.varargs.get().unwrap_or(false),
            _ => false,
        })
    }

    pub fn is_default(&self, element: ElementId) -> Result<bool> {
        Ok(match &self.element_node(element)?.data {
            ElementData::Executable(data) => data.default.get().unwrap_or(false),
            _ => false,
        })
    }

    pub fn default_value(&self, element: ElementId) -> Result<Option<AnnotationValue>> {
        Ok(match &self.element_node(element)?.data {
            ElementData::Executable(data) => data.default_value.get(),
            _ => None,
        })
    }

    /// Thrown types of an executable element, read from its executable type.
    pub fn element_thrown_types(&self, element: ElementId) -> Result<Vec<TypeId>> {
        match self.element_type(element)? {
            Some(ty) if self.element_kind(element)?.is_executable() => self.thrown_types(ty),
            _ => Ok(Vec::new()),
        }
    }

    pub fn constant_value(&self, element: ElementId) -> Result<Option<ConstantValue>> {
        Ok(match &self.element_node(element)?.data {
            ElementData::Variable(data) => data.constant.get(),
            _ => None,
        })
    }

    /// Bounds of a type parameter: its variable's upper bound, with an intersection flattened.
    pub fn type_parameter_bounds(&self, element: ElementId) -> Result<Vec<TypeId>> {
        if self.element_kind(element)? != ElementKind::TypeParameter {
            return Ok(Vec::new());
        }
        let Some(variable) = self.element_type(element)? else {
            return Ok(Vec::new());
        };
        let Some(upper) = self.upper_bound(variable)? else {
            return Ok(Vec::new());
        };
        if self.type_kind(upper)? == TypeKind::Intersection {
            return self.bounds(upper);
        }
        Ok(vec![upper])
    }

    pub fn accessor(&self, component: ElementId) -> Result<Option<ElementId>> {
        Ok(match &self.element_node(component)?.data {
            ElementData::RecordComponent(data) => data.accessor.get(),
            _ => None,
        })
    }

    pub fn record_components(&self, record: ElementId) -> Result<Vec<ElementId>> {
        let mut components = Vec::new();
        for child in self.enclosed_elements(record)? {
            if self.element_kind(child)? == ElementKind::RecordComponent {
                components.push(child);
            }
        }
        Ok(components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_default_across_kinds() {
        let model = Model::new();
        let int = model.primitive_type(TypeKind::Int).unwrap();
        assert_eq!(model.component_type(int).unwrap(), None);
        assert_eq!(model.enclosing_type(int).unwrap(), model.none_type());
        assert_eq!(model.return_type(int).unwrap(), model.void_type());
        assert!(model.type_arguments(int).unwrap().is_empty());
        assert_eq!(model.lower_bound(int).unwrap(), None);

        let field = model.new_element(ElementKind::Field);
        assert_eq!(model.simple_name(field).unwrap(), "");
        assert!(model.type_parameters(field).unwrap().is_empty());
        assert_eq!(model.superclass(field).unwrap(), None);
    }

    #[test]
    fn type_parameter_bounds_flatten_intersections() {
        let model = Model::new();
        let a = model.new_declared_type();
        let b = model.new_declared_type();
        let bound = model.intersection_type(&[a, b]).unwrap();
        let variable = model.new_type_variable();
        model.set_upper_bound(variable, bound).unwrap();
        let parameter = model.new_named_element(ElementKind::TypeParameter, "T").unwrap();
        model.set_element_type(parameter, variable).unwrap();

        assert_eq!(model.type_parameter_bounds(parameter).unwrap(), vec![a, b]);
        assert_eq!(model.defining_element(variable).unwrap(), Some(parameter));
    }
}
