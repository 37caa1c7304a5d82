//! Type nodes and their builder surface.

use std::sync::Arc;

use super::write_once::{AppendOnly, WriteOnce};
use super::{AnnotationMirror, ElementId, Model, TypeId};
use crate::kind::{ElementKind, TypeKind};
use crate::{LangError, Result};

pub(crate) struct TypeNode {
    pub(crate) kind: TypeKind,
    /// Flyweights and error types reject every mutation.
    pub(crate) frozen: bool,
    pub(crate) annotations: AppendOnly<AnnotationMirror>,
    pub(crate) data: TypeData,
}

pub(crate) enum TypeData {
    Primitive,
    NoType,
    Null,
    Array(ArrayData),
    Declared(DeclaredData),
    Executable(ExecutableData),
    Intersection(ListData),
    TypeVar(TypeVarData),
    Union(ListData),
    Wildcard(WildcardData),
}

pub(crate) struct ArrayData {
    pub(crate) component: WriteOnce<TypeId>,
}

pub(crate) struct DeclaredData {
    pub(crate) element: WriteOnce<ElementId>,
    pub(crate) enclosing: WriteOnce<TypeId>,
    pub(crate) arguments: AppendOnly<TypeId>,
    pub(crate) erased: WriteOnce<bool>,
}

pub(crate) struct ExecutableData {
    pub(crate) parameters: AppendOnly<TypeId>,
    pub(crate) return_type: WriteOnce<TypeId>,
    pub(crate) receiver: WriteOnce<TypeId>,
    pub(crate) thrown: AppendOnly<TypeId>,
    pub(crate) type_variables: AppendOnly<TypeId>,
}

pub(crate) struct ListData {
    pub(crate) items: AppendOnly<TypeId>,
}

pub(crate) struct TypeVarData {
    pub(crate) element: WriteOnce<ElementId>,
    pub(crate) upper: WriteOnce<TypeId>,
    pub(crate) lower: WriteOnce<TypeId>,
    /// The wildcard this variable was minted from by capture conversion.
    pub(crate) captured_from: WriteOnce<TypeId>,
}

pub(crate) struct WildcardData {
    pub(crate) extends: WriteOnce<TypeId>,
    pub(crate) super_: WriteOnce<TypeId>,
}

impl TypeData {
    pub(crate) fn empty_union() -> Self {
        TypeData::Union(ListData::new())
    }

    fn declared() -> Self {
        TypeData::Declared(DeclaredData {
            element: WriteOnce::new("element"),
            enclosing: WriteOnce::new("enclosing type"),
            arguments: AppendOnly::new(),
            erased: WriteOnce::new("erased"),
        })
    }
}

impl ListData {
    fn new() -> Self {
        Self {
            items: AppendOnly::new(),
        }
    }
}

impl TypeNode {
    pub(crate) fn flyweight(kind: TypeKind, data: TypeData) -> Self {
        Self {
            kind,
            frozen: true,
            annotations: AppendOnly::new(),
            data,
        }
    }

    fn new(kind: TypeKind, data: TypeData) -> Self {
        Self {
            kind,
            frozen: false,
            annotations: AppendOnly::new(),
            data,
        }
    }
}

/// Which kinds a type slot accepts.
#[derive(Clone, Copy)]
enum Accept {
    /// Primitives and references: array components, parameter types.
    Value,
    /// References only: type arguments (plus wildcards), bounds, thrown types.
    Reference,
    ReferenceOrWildcard,
    ReferenceOrNull,
    /// Declared, error or the none type: enclosing types, receivers, superclasses.
    DeclaredOrNone,
    ReturnType,
    TypeVar,
}

impl Accept {
    fn admits(self, kind: TypeKind) -> bool {
        match self {
            Accept::Value => kind.is_primitive() || (kind.is_reference() && kind != TypeKind::Null),
            Accept::Reference => kind.is_reference() && kind != TypeKind::Null,
            Accept::ReferenceOrWildcard => {
                (kind.is_reference() && kind != TypeKind::Null) || kind == TypeKind::Wildcard
            }
            Accept::ReferenceOrNull => kind.is_reference(),
            Accept::DeclaredOrNone => kind.is_declared_like() || kind == TypeKind::None,
            Accept::ReturnType => {
                kind == TypeKind::Void
                    || kind.is_primitive()
                    || (kind.is_reference() && kind != TypeKind::Null)
            }
            Accept::TypeVar => kind == TypeKind::TypeVar,
        }
    }
}

/// Type constructors and write-once mutators.
impl Model {
    pub fn new_array_type(&self) -> TypeId {
        self.alloc_type(TypeNode::new(
            TypeKind::Array,
            TypeData::Array(ArrayData {
                component: WriteOnce::new("component type"),
            }),
        ))
    }

    pub fn new_declared_type(&self) -> TypeId {
        self.alloc_type(TypeNode::new(TypeKind::Declared, TypeData::declared()))
    }

    /// An error type. Its defining element (if any) is fixed here; the node is immutable after.
    pub fn new_error_type(&self, element: Option<ElementId>) -> TypeId {
        let data = TypeData::declared();
        if let (Some(element), TypeData::Declared(declared)) = (element, &data) {
            let _ = declared.element.set(element);
        }
        let mut node = TypeNode::new(TypeKind::Error, data);
        node.frozen = true;
        self.alloc_type(node)
    }

    pub fn new_executable_type(&self) -> TypeId {
        self.alloc_type(TypeNode::new(
            TypeKind::Executable,
            TypeData::Executable(ExecutableData {
                parameters: AppendOnly::new(),
                return_type: WriteOnce::new("return type"),
                receiver: WriteOnce::new("receiver type"),
                thrown: AppendOnly::new(),
                type_variables: AppendOnly::new(),
            }),
        ))
    }

    pub fn new_intersection_type(&self) -> TypeId {
        self.alloc_type(TypeNode::new(
            TypeKind::Intersection,
            TypeData::Intersection(ListData::new()),
        ))
    }

    pub fn new_type_variable(&self) -> TypeId {
        self.alloc_type(TypeNode::new(
            TypeKind::TypeVar,
            TypeData::TypeVar(TypeVarData {
                element: WriteOnce::new("element"),
                upper: WriteOnce::new("upper bound"),
                lower: WriteOnce::new("lower bound"),
                captured_from: WriteOnce::new("captured wildcard"),
            }),
        ))
    }

    pub fn new_union_type(&self) -> TypeId {
        self.alloc_type(TypeNode::new(TypeKind::Union, TypeData::empty_union()))
    }

    pub fn new_wildcard_type(&self) -> TypeId {
        self.alloc_type(TypeNode::new(
            TypeKind::Wildcard,
            TypeData::Wildcard(WildcardData {
                extends: WriteOnce::new("extends bound"),
                super_: WriteOnce::new("super bound"),
            }),
        ))
    }

    pub fn array_type(&self, component: TypeId) -> Result<TypeId> {
        let array = self.new_array_type();
        self.set_component_type(array, component)?;
        Ok(array)
    }

    /// A declared type for `element` with the given enclosing type and arguments.
    pub fn declared_type(
        &self,
        enclosing: Option<TypeId>,
        element: ElementId,
        arguments: &[TypeId],
    ) -> Result<TypeId> {
        let declared = self.new_declared_type();
        self.set_defining_element(declared, element)?;
        if let Some(enclosing) = enclosing {
            self.set_enclosing_type(declared, enclosing)?;
        }
        for argument in arguments {
            self.add_type_argument(declared, *argument)?;
        }
        Ok(declared)
    }

    pub fn wildcard_type(&self, extends: Option<TypeId>, super_: Option<TypeId>) -> Result<TypeId> {
        let wildcard = self.new_wildcard_type();
        if let Some(bound) = extends {
            self.set_extends_bound(wildcard, bound)?;
        }
        if let Some(bound) = super_ {
            self.set_super_bound(wildcard, bound)?;
        }
        Ok(wildcard)
    }

    pub fn intersection_type(&self, bounds: &[TypeId]) -> Result<TypeId> {
        let intersection = self.new_intersection_type();
        for bound in bounds {
            self.add_intersection_bound(intersection, *bound)?;
        }
        Ok(intersection)
    }

    pub fn union_type(&self, alternatives: &[TypeId]) -> Result<TypeId> {
        if alternatives.is_empty() {
            return Ok(self.empty_union_type());
        }
        let union = self.new_union_type();
        for alternative in alternatives {
            self.add_union_alternative(union, *alternative)?;
        }
        Ok(union)
    }

    pub fn add_type_annotation(&self, ty: TypeId, annotation: AnnotationMirror) -> Result<()> {
        let node = self.mutable_type_node(ty)?;
        node.annotations.push(annotation);
        Ok(())
    }

    pub fn set_component_type(&self, array: TypeId, component: TypeId) -> Result<()> {
        let node = self.mutable_type_node(array)?;
        let TypeData::Array(data) = &node.data else {
            return Err(illegal("set_component_type", node.kind));
        };
        self.check_not_self(array, component, "component type")?;
        self.check_accepts("set_component_type", component, Accept::Value)?;
        data.component.set(component)
    }

    /// Set the element a declared or type-variable type denotes.
    pub fn set_defining_element(&self, ty: TypeId, element: ElementId) -> Result<()> {
        let node = self.mutable_type_node(ty)?;
        match &node.data {
            TypeData::Declared(data) => {
                self.check_element_kind("set_defining_element", element, ElementKind::is_type_element)?;
                data.element.set(element)
            }
            TypeData::TypeVar(data) => {
                self.check_element_kind("set_defining_element", element, |k| {
                    k == ElementKind::TypeParameter
                })?;
                data.element.set(element)
            }
            _ => Err(illegal("set_defining_element", node.kind)),
        }
    }

    pub fn set_enclosing_type(&self, declared: TypeId, enclosing: TypeId) -> Result<()> {
        let node = self.mutable_type_node(declared)?;
        let TypeData::Declared(data) = &node.data else {
            return Err(illegal("set_enclosing_type", node.kind));
        };
        self.check_not_self(declared, enclosing, "enclosing type")?;
        self.check_accepts("set_enclosing_type", enclosing, Accept::DeclaredOrNone)?;
        data.enclosing.set(enclosing)
    }

    pub fn add_type_argument(&self, declared: TypeId, argument: TypeId) -> Result<()> {
        let node = self.mutable_type_node(declared)?;
        let TypeData::Declared(data) = &node.data else {
            return Err(illegal("add_type_argument", node.kind));
        };
        if data.erased.get() == Some(true) {
            return Err(LangError::Erased);
        }
        self.check_not_self(declared, argument, "type argument")?;
        self.check_accepts("add_type_argument", argument, Accept::ReferenceOrWildcard)?;
        data.arguments.push(argument);
        Ok(())
    }

    pub fn set_erased(&self, declared: TypeId, erased: bool) -> Result<()> {
        let node = self.mutable_type_node(declared)?;
        let TypeData::Declared(data) = &node.data else {
            return Err(illegal("set_erased", node.kind));
        };
        if erased && !data.arguments.is_empty() {
            return Err(LangError::Erased);
        }
        data.erased.set(erased)
    }

    pub fn add_parameter_type(&self, executable: TypeId, parameter: TypeId) -> Result<()> {
        let node = self.mutable_type_node(executable)?;
        let TypeData::Executable(data) = &node.data else {
            return Err(illegal("add_parameter_type", node.kind));
        };
        self.check_accepts("add_parameter_type", parameter, Accept::Value)?;
        data.parameters.push(parameter);
        Ok(())
    }

    pub fn set_return_type(&self, executable: TypeId, return_type: TypeId) -> Result<()> {
        let node = self.mutable_type_node(executable)?;
        let TypeData::Executable(data) = &node.data else {
            return Err(illegal("set_return_type", node.kind));
        };
        self.check_accepts("set_return_type", return_type, Accept::ReturnType)?;
        data.return_type.set(return_type)
    }

    pub fn set_receiver_type(&self, executable: TypeId, receiver: TypeId) -> Result<()> {
        let node = self.mutable_type_node(executable)?;
        let TypeData::Executable(data) = &node.data else {
            return Err(illegal("set_receiver_type", node.kind));
        };
        self.check_accepts("set_receiver_type", receiver, Accept::DeclaredOrNone)?;
        data.receiver.set(receiver)
    }

    pub fn add_thrown_type(&self, executable: TypeId, thrown: TypeId) -> Result<()> {
        let node = self.mutable_type_node(executable)?;
        let TypeData::Executable(data) = &node.data else {
            return Err(illegal("add_thrown_type", node.kind));
        };
        self.check_accepts("add_thrown_type", thrown, Accept::Reference)?;
        data.thrown.push(thrown);
        Ok(())
    }

    pub fn add_executable_type_variable(&self, executable: TypeId, variable: TypeId) -> Result<()> {
        let node = self.mutable_type_node(executable)?;
        let TypeData::Executable(data) = &node.data else {
            return Err(illegal("add_executable_type_variable", node.kind));
        };
        self.check_accepts("add_executable_type_variable", variable, Accept::TypeVar)?;
        data.type_variables.push(variable);
        Ok(())
    }

    pub fn add_intersection_bound(&self, intersection: TypeId, bound: TypeId) -> Result<()> {
        let node = self.mutable_type_node(intersection)?;
        let TypeData::Intersection(data) = &node.data else {
            return Err(illegal("add_intersection_bound", node.kind));
        };
        self.check_not_self(intersection, bound, "intersection bound")?;
        self.check_accepts("add_intersection_bound", bound, Accept::Reference)?;
        data.items.push(bound);
        Ok(())
    }

    pub fn add_union_alternative(&self, union: TypeId, alternative: TypeId) -> Result<()> {
        let node = self.mutable_type_node(union)?;
        let TypeData::Union(data) = &node.data else {
            return Err(illegal("add_union_alternative", node.kind));
        };
        self.check_not_self(union, alternative, "union alternative")?;
        self.check_accepts("add_union_alternative", alternative, Accept::Reference)?;
        data.items.push(alternative);
        Ok(())
    }

    pub fn set_upper_bound(&self, variable: TypeId, bound: TypeId) -> Result<()> {
        let node = self.mutable_type_node(variable)?;
        let TypeData::TypeVar(data) = &node.data else {
            return Err(illegal("set_upper_bound", node.kind));
        };
        self.check_not_self(variable, bound, "upper bound")?;
        self.check_accepts("set_upper_bound", bound, Accept::Reference)?;
        data.upper.set(bound)
    }

    pub fn set_lower_bound(&self, variable: TypeId, bound: TypeId) -> Result<()> {
        let node = self.mutable_type_node(variable)?;
        let TypeData::TypeVar(data) = &node.data else {
            return Err(illegal("set_lower_bound", node.kind));
        };
        self.check_not_self(variable, bound, "lower bound")?;
        self.check_accepts("set_lower_bound", bound, Accept::ReferenceOrNull)?;
        data.lower.set(bound)
    }

    /// Mark `variable` as the capture of `wildcard`.
    pub fn set_captured_wildcard(&self, variable: TypeId, wildcard: TypeId) -> Result<()> {
        let node = self.mutable_type_node(variable)?;
        let TypeData::TypeVar(data) = &node.data else {
            return Err(illegal("set_captured_wildcard", node.kind));
        };
        if let Some(kind) = self.peek_type_node(wildcard).map(|n| n.kind) {
            if kind != TypeKind::Wildcard {
                return Err(illegal("set_captured_wildcard", kind));
            }
        }
        data.captured_from.set(wildcard)
    }

    pub fn set_extends_bound(&self, wildcard: TypeId, bound: TypeId) -> Result<()> {
        let node = self.mutable_type_node(wildcard)?;
        let TypeData::Wildcard(data) = &node.data else {
            return Err(illegal("set_extends_bound", node.kind));
        };
        if data.super_.is_set() {
            return Err(LangError::WriteOnceConflict {
                field: "wildcard bound",
            });
        }
        self.check_not_self(wildcard, bound, "extends bound")?;
        self.check_accepts("set_extends_bound", bound, Accept::Reference)?;
        data.extends.set(bound)
    }

    pub fn set_super_bound(&self, wildcard: TypeId, bound: TypeId) -> Result<()> {
        let node = self.mutable_type_node(wildcard)?;
        let TypeData::Wildcard(data) = &node.data else {
            return Err(illegal("set_super_bound", node.kind));
        };
        if data.extends.is_set() {
            return Err(LangError::WriteOnceConflict {
                field: "wildcard bound",
            });
        }
        self.check_not_self(wildcard, bound, "super bound")?;
        self.check_accepts("set_super_bound", bound, Accept::Reference)?;
        data.super_.set(bound)
    }

    /// Link a type to the element whose `as_type` it is. Unlike [`Model::set_defining_element`]
    /// this also accepts (already-linked or element-less) error types.
    pub(crate) fn link_defining_element(&self, ty: TypeId, element: ElementId) -> Result<()> {
        let node = self.type_node(ty)?;
        match &node.data {
            TypeData::Declared(data) if node.kind == TypeKind::Error => data.element.set(element),
            TypeData::Declared(_) | TypeData::TypeVar(_) => self.set_defining_element(ty, element),
            _ => Ok(()),
        }
    }

    /// Fails exactly when [`Model::link_defining_element`] would, without writing anything.
    pub(crate) fn check_defining_element_link(&self, ty: TypeId, element: ElementId) -> Result<()> {
        let node = self.type_node(ty)?;
        if let TypeData::Declared(data) = &node.data {
            if node.kind == TypeKind::Error {
                return data.element.check(&element);
            }
        }
        if !matches!(node.data, TypeData::Declared(_) | TypeData::TypeVar(_)) {
            return Ok(());
        }
        if node.frozen {
            return Err(LangError::Immutable { kind: node.kind });
        }
        match &node.data {
            TypeData::Declared(data) => {
                self.check_element_kind("set_defining_element", element, ElementKind::is_type_element)?;
                data.element.check(&element)
            }
            TypeData::TypeVar(data) => {
                self.check_element_kind("set_defining_element", element, |k| {
                    k == ElementKind::TypeParameter
                })?;
                data.element.check(&element)
            }
            _ => Ok(()),
        }
    }

    fn mutable_type_node(&self, id: TypeId) -> Result<Arc<TypeNode>> {
        let node = self.type_node(id)?;
        if node.frozen {
            return Err(LangError::Immutable { kind: node.kind });
        }
        Ok(node)
    }

    /// Reference-identity check; deeper cycles are legal.
    fn check_not_self(&self, owner: TypeId, value: TypeId, field: &'static str) -> Result<()> {
        let owner = self.resolve_type(owner)?;
        if value == owner || self.peek_type(value) == Some(owner) {
            return Err(LangError::SelfReference { field });
        }
        Ok(())
    }

    /// Kind check against `value`; skipped while `value` is an uncompleted deferred slot.
    fn check_accepts(&self, operation: &'static str, value: TypeId, accept: Accept) -> Result<()> {
        match self.peek_type_node(value) {
            Some(node) if !accept.admits(node.kind) => Err(illegal(operation, node.kind)),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_element_kind(
        &self,
        operation: &'static str,
        element: ElementId,
        accept: impl Fn(ElementKind) -> bool,
    ) -> Result<()> {
        match self.peek_element_node(element) {
            Some(node) if !accept(node.kind) => Err(LangError::IllegalElementKind {
                operation,
                kind: node.kind,
            }),
            _ => Ok(()),
        }
    }
}

fn illegal(operation: &'static str, kind: TypeKind) -> LangError {
    LangError::IllegalTypeKind { operation, kind }
}
