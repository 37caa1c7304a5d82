//! Arena-backed graph of type and element nodes.
//!
//! Nodes are created raw by a backend and filled in through write-once setters on [`Model`].
//! Edges between nodes (type to defining element, element to enclosing element, ...) are plain
//! [`TypeId`] / [`ElementId`] handles, so cyclic graphs need no reference counting cycles.
//!
//! A slot may also be *deferred*: a supplier that produces the real handle on first use. The
//! read surface ([`crate::delegate`]) resolves deferred slots transparently.

mod annotations;
mod deferred;
mod elements;
mod read;
mod types;
pub(crate) mod write_once;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

pub use annotations::{AnnotationMirror, AnnotationValue, ConstantValue};
pub(crate) use elements::{ElementData, ElementNode};
pub(crate) use types::{TypeData, TypeNode};

use crate::kind::{ElementKind, TypeKind};
use crate::{LangError, Result};
use deferred::Deferred;

/// Handle to a type node owned by a [`Model`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

/// Handle to an element node owned by a [`Model`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ElementId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

enum Slot<N, I> {
    Node(Arc<N>),
    Deferred(Arc<Deferred<I>>),
}

impl<N, I> Clone for Slot<N, I> {
    fn clone(&self) -> Self {
        match self {
            Slot::Node(node) => Slot::Node(Arc::clone(node)),
            Slot::Deferred(deferred) => Slot::Deferred(Arc::clone(deferred)),
        }
    }
}

// Flyweight layout: the eight primitives (in `TypeKind::PRIMITIVES` order), the four no-types
// (in `TypeKind::NO_TYPES` order), the null type and the empty union.
const NO_TYPE_BASE: u32 = 8;
const NULL_INDEX: u32 = 12;
const EMPTY_UNION_INDEX: u32 = 13;

/// The node arena.
pub struct Model {
    types: RwLock<Vec<Slot<TypeNode, TypeId>>>,
    elements: RwLock<Vec<Slot<ElementNode, ElementId>>>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("types", &self.types.read().len())
            .field("elements", &self.elements.read().len())
            .finish()
    }
}

impl Model {
    pub fn new() -> Self {
        let mut types = Vec::with_capacity(64);
        for kind in TypeKind::PRIMITIVES {
            types.push(Slot::Node(Arc::new(TypeNode::flyweight(kind, TypeData::Primitive))));
        }
        for kind in TypeKind::NO_TYPES {
            types.push(Slot::Node(Arc::new(TypeNode::flyweight(kind, TypeData::NoType))));
        }
        types.push(Slot::Node(Arc::new(TypeNode::flyweight(
            TypeKind::Null,
            TypeData::Null,
        ))));
        types.push(Slot::Node(Arc::new(TypeNode::flyweight(
            TypeKind::Union,
            TypeData::empty_union(),
        ))));

        Self {
            types: RwLock::new(types),
            elements: RwLock::new(Vec::new()),
        }
    }

    /// The canonical instance of a primitive type.
    pub fn primitive_type(&self, kind: TypeKind) -> Result<TypeId> {
        TypeKind::PRIMITIVES
            .iter()
            .position(|k| *k == kind)
            .map(|idx| TypeId(idx as u32))
            .ok_or(LangError::IllegalTypeKind {
                operation: "primitive_type",
                kind,
            })
    }

    /// The canonical instance of a no-type (`None`, `Void`, `Module`, `Package`).
    pub fn no_type(&self, kind: TypeKind) -> Result<TypeId> {
        TypeKind::NO_TYPES
            .iter()
            .position(|k| *k == kind)
            .map(|idx| TypeId(NO_TYPE_BASE + idx as u32))
            .ok_or(LangError::IllegalTypeKind {
                operation: "no_type",
                kind,
            })
    }

    pub fn none_type(&self) -> TypeId {
        TypeId(NO_TYPE_BASE)
    }

    pub fn void_type(&self) -> TypeId {
        TypeId(NO_TYPE_BASE + 1)
    }

    pub fn null_type(&self) -> TypeId {
        TypeId(NULL_INDEX)
    }

    pub fn empty_union_type(&self) -> TypeId {
        TypeId(EMPTY_UNION_INDEX)
    }

    /// Allocate a type slot whose target is produced by `supplier` on first use.
    pub fn deferred_type(
        &self,
        supplier: impl FnOnce(&Model) -> Result<TypeId> + Send + 'static,
    ) -> TypeId {
        let mut types = self.types.write();
        let id = TypeId(types.len() as u32);
        types.push(Slot::Deferred(Arc::new(Deferred::new(Box::new(supplier)))));
        id
    }

    /// Allocate an element slot whose target is produced by `supplier` on first use.
    pub fn deferred_element(
        &self,
        supplier: impl FnOnce(&Model) -> Result<ElementId> + Send + 'static,
    ) -> ElementId {
        let mut elements = self.elements.write();
        let id = ElementId(elements.len() as u32);
        elements.push(Slot::Deferred(Arc::new(Deferred::new(Box::new(supplier)))));
        id
    }

    /// Follow deferred slots until a concrete type node is reached.
    pub fn resolve_type(&self, id: TypeId) -> Result<TypeId> {
        let mut current = id;
        let mut hops = 0usize;
        loop {
            match self.type_slot(current)? {
                Slot::Node(_) => return Ok(current),
                Slot::Deferred(deferred) => {
                    let next = deferred.resolve(self)?;
                    hops += 1;
                    if next == current || hops > self.types.read().len() {
                        return Err(LangError::CyclicCompletion);
                    }
                    current = next;
                }
            }
        }
    }

    /// Follow deferred slots until a concrete element node is reached.
    pub fn resolve_element(&self, id: ElementId) -> Result<ElementId> {
        let mut current = id;
        let mut hops = 0usize;
        loop {
            match self.element_slot(current)? {
                Slot::Node(_) => return Ok(current),
                Slot::Deferred(deferred) => {
                    let next = deferred.resolve(self)?;
                    hops += 1;
                    if next == current || hops > self.elements.read().len() {
                        return Err(LangError::CyclicCompletion);
                    }
                    current = next;
                }
            }
        }
    }

    /// Returns the concrete handle behind `id` without running any supplier, or `None` if a
    /// deferred slot on the way has not been completed yet.
    pub fn peek_type(&self, id: TypeId) -> Option<TypeId> {
        let mut current = id;
        let limit = self.types.read().len();
        for _ in 0..=limit {
            match self.type_slot(current).ok()? {
                Slot::Node(_) => return Some(current),
                Slot::Deferred(deferred) => current = deferred.get()?,
            }
        }
        None
    }

    /// Element counterpart of [`Model::peek_type`].
    pub fn peek_element(&self, id: ElementId) -> Option<ElementId> {
        let mut current = id;
        let limit = self.elements.read().len();
        for _ in 0..=limit {
            match self.element_slot(current).ok()? {
                Slot::Node(_) => return Some(current),
                Slot::Deferred(deferred) => current = deferred.get()?,
            }
        }
        None
    }

    pub fn type_kind(&self, id: TypeId) -> Result<TypeKind> {
        Ok(self.type_node(id)?.kind)
    }

    pub fn element_kind(&self, id: ElementId) -> Result<ElementKind> {
        Ok(self.element_node(id)?.kind)
    }

    pub fn type_count(&self) -> usize {
        self.types.read().len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.read().len()
    }

    pub(crate) fn type_node(&self, id: TypeId) -> Result<Arc<TypeNode>> {
        let resolved = self.resolve_type(id)?;
        match self.type_slot(resolved)? {
            Slot::Node(node) => Ok(node),
            Slot::Deferred(_) => Err(LangError::UnknownType(id)),
        }
    }

    pub(crate) fn element_node(&self, id: ElementId) -> Result<Arc<ElementNode>> {
        let resolved = self.resolve_element(id)?;
        match self.element_slot(resolved)? {
            Slot::Node(node) => Ok(node),
            Slot::Deferred(_) => Err(LangError::UnknownElement(id)),
        }
    }

    /// Node for `id` if it is already concrete; never runs a supplier.
    pub(crate) fn peek_type_node(&self, id: TypeId) -> Option<Arc<TypeNode>> {
        match self.type_slot(self.peek_type(id)?).ok()? {
            Slot::Node(node) => Some(node),
            Slot::Deferred(_) => None,
        }
    }

    pub(crate) fn peek_element_node(&self, id: ElementId) -> Option<Arc<ElementNode>> {
        match self.element_slot(self.peek_element(id)?).ok()? {
            Slot::Node(node) => Some(node),
            Slot::Deferred(_) => None,
        }
    }

    pub(crate) fn alloc_type(&self, node: TypeNode) -> TypeId {
        let mut types = self.types.write();
        let id = TypeId(types.len() as u32);
        types.push(Slot::Node(Arc::new(node)));
        id
    }

    pub(crate) fn alloc_element(&self, node: ElementNode) -> ElementId {
        let mut elements = self.elements.write();
        let id = ElementId(elements.len() as u32);
        elements.push(Slot::Node(Arc::new(node)));
        id
    }

    fn type_slot(&self, id: TypeId) -> Result<Slot<TypeNode, TypeId>> {
        self.types
            .read()
            .get(id.index())
            .cloned()
            .ok_or(LangError::UnknownType(id))
    }

    fn element_slot(&self, id: ElementId) -> Result<Slot<ElementNode, ElementId>> {
        self.elements
            .read()
            .get(id.index())
            .cloned()
            .ok_or(LangError::UnknownElement(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flyweights_are_canonical() {
        let model = Model::new();
        assert_eq!(
            model.primitive_type(TypeKind::Int).unwrap(),
            model.primitive_type(TypeKind::Int).unwrap()
        );
        assert_eq!(model.type_kind(model.null_type()).unwrap(), TypeKind::Null);
        assert_eq!(model.type_kind(model.void_type()).unwrap(), TypeKind::Void);
        assert_eq!(
            model.type_kind(model.empty_union_type()).unwrap(),
            TypeKind::Union
        );
        assert!(model.primitive_type(TypeKind::Declared).is_err());
        assert!(model.no_type(TypeKind::Int).is_err());
    }

    #[test]
    fn deferred_slots_resolve_once() {
        let model = Model::new();
        let target = model.new_array_type();
        let deferred = model.deferred_type(move |_| Ok(target));
        assert_eq!(model.peek_type(deferred), None);
        assert_eq!(model.resolve_type(deferred).unwrap(), target);
        assert_eq!(model.peek_type(deferred), Some(target));
        assert_eq!(model.type_kind(deferred).unwrap(), TypeKind::Array);
    }

    #[test]
    fn deferred_failure_is_sticky() {
        let model = Model::new();
        let deferred = model.deferred_element(|_| {
            Err(LangError::MissingElement {
                name: "com.example.Missing".to_string(),
            })
        });
        let first = model.resolve_element(deferred).unwrap_err();
        let second = model.resolve_element(deferred).unwrap_err();
        assert_eq!(first, second);
    }

    #[test]
    fn deferred_self_reference_is_reported() {
        let model = Model::new();
        let next = model.type_count() as u32;
        let deferred = model.deferred_type(move |_| Ok(TypeId(next)));
        assert_eq!(
            model.resolve_type(deferred),
            Err(LangError::CyclicCompletion)
        );
    }
}
