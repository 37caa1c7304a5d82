//! Node equality policy.
//!
//! One [`Equality`] value is chosen per session and used everywhere nodes are compared or hashed:
//! by delegate wrappers' `PartialEq`/`Hash`, by the type-closure cache and by the relation
//! visitors. Equality is structural. Two modes exist, with and without type annotations.

use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use crate::kind::{ElementKind, TypeKind};
use crate::model::{AnnotationMirror, ElementId, Model, TypeId};
use crate::Result;

const HASH_DEPTH: usize = 4;

/// Structural comparator for types and elements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Equality {
    pub include_annotations: bool,
}

impl Equality {
    pub const IGNORING_ANNOTATIONS: Equality = Equality {
        include_annotations: false,
    };
    pub const INCLUDING_ANNOTATIONS: Equality = Equality {
        include_annotations: true,
    };

    pub fn types_equal(&self, model: &Model, a: TypeId, b: TypeId) -> Result<bool> {
        Comparison::new(*self, model).types(a, b)
    }

    pub fn elements_equal(&self, model: &Model, a: ElementId, b: ElementId) -> Result<bool> {
        Comparison::new(*self, model).elements(a, b)
    }

    /// Pairwise equality of two lists; lists of different length are unequal.
    pub fn type_lists_equal(&self, model: &Model, a: &[TypeId], b: &[TypeId]) -> Result<bool> {
        Comparison::new(*self, model).type_lists(a, b)
    }

    /// A hash consistent with [`Equality::types_equal`]: equal types hash equally.
    pub fn type_hash(&self, model: &Model, ty: TypeId) -> Result<u64> {
        let mut hasher = DefaultHasher::new();
        hash_type(model, ty, HASH_DEPTH, &mut hasher)?;
        Ok(hasher.finish())
    }

    pub fn element_hash(&self, model: &Model, element: ElementId) -> Result<u64> {
        let mut hasher = DefaultHasher::new();
        hash_element(model, element, &mut hasher)?;
        Ok(hasher.finish())
    }
}

/// One comparison. Element pairs under comparison are assumed equal when revisited, which
/// terminates cycles such as a method type parameter used in its own method's signature.
struct Comparison<'m> {
    policy: Equality,
    model: &'m Model,
    in_progress: RefCell<HashSet<(ElementId, ElementId)>>,
}

impl<'m> Comparison<'m> {
    fn new(policy: Equality, model: &'m Model) -> Self {
        Self {
            policy,
            model,
            in_progress: RefCell::new(HashSet::new()),
        }
    }

    fn types(&self, a: TypeId, b: TypeId) -> Result<bool> {
        let model = self.model;
        let a = model.resolve_type(a)?;
        let b = model.resolve_type(b)?;
        if a == b {
            return Ok(true);
        }
        let kind = model.type_kind(a)?;
        if kind != model.type_kind(b)? {
            return Ok(false);
        }
        if self.policy.include_annotations
            && !self.annotations(&model.type_annotations(a)?, &model.type_annotations(b)?)?
        {
            return Ok(false);
        }
        match kind {
            k if k.is_primitive() || k.is_no_type() || k == TypeKind::Null => Ok(true),
            TypeKind::Array => self.optional_types(model.component_type(a)?, model.component_type(b)?),
            TypeKind::Declared | TypeKind::Error => {
                Ok(self.optional_elements(model.defining_element(a)?, model.defining_element(b)?)?
                    && self.types(model.enclosing_type(a)?, model.enclosing_type(b)?)?
                    && self.type_lists(&model.type_arguments(a)?, &model.type_arguments(b)?)?)
            }
            TypeKind::Executable => Ok(self.type_lists(
                &model.parameter_types(a)?,
                &model.parameter_types(b)?,
            )? && self.types(model.return_type(a)?, model.return_type(b)?)?
                && self.types(model.receiver_type(a)?, model.receiver_type(b)?)?
                && self.type_lists(&model.thrown_types(a)?, &model.thrown_types(b)?)?
                && self.type_lists(
                    &model.executable_type_variables(a)?,
                    &model.executable_type_variables(b)?,
                )?),
            TypeKind::Intersection | TypeKind::Union => {
                self.type_lists(&model.bounds(a)?, &model.bounds(b)?)
            }
            TypeKind::TypeVar => {
                // Captures are distinguished by identity alone.
                if model.captured_wildcard(a)?.is_some() || model.captured_wildcard(b)?.is_some() {
                    return Ok(false);
                }
                self.optional_elements(model.defining_element(a)?, model.defining_element(b)?)
            }
            TypeKind::Wildcard => Ok(self
                .optional_types(model.extends_bound(a)?, model.extends_bound(b)?)?
                && self.optional_types(model.super_bound(a)?, model.super_bound(b)?)?),
            _ => Ok(false),
        }
    }

    fn elements(&self, a: ElementId, b: ElementId) -> Result<bool> {
        let model = self.model;
        let a = model.resolve_element(a)?;
        let b = model.resolve_element(b)?;
        if a == b {
            return Ok(true);
        }
        let kind = model.element_kind(a)?;
        if kind != model.element_kind(b)? || model.simple_name(a)? != model.simple_name(b)? {
            return Ok(false);
        }
        if !self.in_progress.borrow_mut().insert((a, b)) {
            return Ok(true);
        }
        let result = self.element_structure(kind, a, b);
        self.in_progress.borrow_mut().remove(&(a, b));
        result
    }

    fn element_structure(&self, kind: ElementKind, a: ElementId, b: ElementId) -> Result<bool> {
        let model = self.model;
        if self.policy.include_annotations
            && !self.annotations(&model.element_annotations(a)?, &model.element_annotations(b)?)?
        {
            return Ok(false);
        }
        // Packages and modules carry their full name already.
        if matches!(kind, ElementKind::Package | ElementKind::Module) {
            return Ok(true);
        }
        if !self.optional_elements(model.enclosing_element(a)?, model.enclosing_element(b)?)? {
            return Ok(false);
        }
        if kind.is_executable() {
            let pa = model.element_type(a)?.map(|t| model.parameter_types(t)).transpose()?;
            let pb = model.element_type(b)?.map(|t| model.parameter_types(t)).transpose()?;
            return match (pa, pb) {
                (Some(pa), Some(pb)) => self.type_lists(&pa, &pb),
                (None, None) => Ok(true),
                _ => Ok(false),
            };
        }
        Ok(true)
    }

    fn type_lists(&self, a: &[TypeId], b: &[TypeId]) -> Result<bool> {
        if a.len() != b.len() {
            return Ok(false);
        }
        for (x, y) in a.iter().zip(b) {
            if !self.types(*x, *y)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn optional_types(&self, a: Option<TypeId>, b: Option<TypeId>) -> Result<bool> {
        match (a, b) {
            (Some(a), Some(b)) => self.types(a, b),
            (None, None) => Ok(true),
            _ => Ok(false),
        }
    }

    fn optional_elements(&self, a: Option<ElementId>, b: Option<ElementId>) -> Result<bool> {
        match (a, b) {
            (Some(a), Some(b)) => self.elements(a, b),
            (None, None) => Ok(true),
            _ => Ok(false),
        }
    }

    fn annotations(&self, a: &[AnnotationMirror], b: &[AnnotationMirror]) -> Result<bool> {
        if a.len() != b.len() {
            return Ok(false);
        }
        for (x, y) in a.iter().zip(b) {
            if !self.types(x.annotation_type, y.annotation_type)? || x.values != y.values {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn hash_type(model: &Model, ty: TypeId, depth: usize, state: &mut DefaultHasher) -> Result<()> {
    let kind = model.type_kind(ty)?;
    kind.hash(state);
    if depth == 0 {
        return Ok(());
    }
    match kind {
        TypeKind::Array => {
            if let Some(component) = model.component_type(ty)? {
                hash_type(model, component, depth - 1, state)?;
            }
        }
        TypeKind::Declared | TypeKind::Error => {
            if let Some(element) = model.defining_element(ty)? {
                hash_element(model, element, state)?;
            }
            let arguments = model.type_arguments(ty)?;
            arguments.len().hash(state);
            for argument in arguments {
                hash_type(model, argument, depth - 1, state)?;
            }
        }
        TypeKind::TypeVar => {
            if let Some(element) = model.defining_element(ty)? {
                hash_element(model, element, state)?;
            }
        }
        TypeKind::Wildcard => {
            for bound in [model.extends_bound(ty)?, model.super_bound(ty)?].into_iter().flatten() {
                hash_type(model, bound, depth - 1, state)?;
            }
        }
        TypeKind::Intersection | TypeKind::Union => {
            for bound in model.bounds(ty)? {
                hash_type(model, bound, depth - 1, state)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn hash_element(model: &Model, element: ElementId, state: &mut DefaultHasher) -> Result<()> {
    model.element_kind(element)?.hash(state);
    model.simple_name(element)?.hash(state);
    Ok(())
}
