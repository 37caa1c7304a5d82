//! Delegating wrappers over model handles.
//!
//! A [`DelegatingType`] / [`DelegatingElement`] can be created for a handle whose node is not
//! complete yet (a deferred slot). The first accessor call completes the node under the
//! completion guard and memoizes the concrete handle; later calls skip the guard.
//!
//! Every accessor is available on every wrapper regardless of kind. Kinds that do not carry a
//! value answer with the conventional default (the none type, an empty list), so recursive
//! algorithms can walk the graph without branching on kind first. Returned types and elements
//! are wrapped again, so the whole reachable graph is seen through wrappers.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use crate::equality::Equality;
use crate::guard;
use crate::kind::{ElementKind, Modifier, NestingKind, TypeKind};
use crate::model::{AnnotationMirror, AnnotationValue, ConstantValue, ElementId, Model, TypeId};
use crate::Result;

/// Wrapper factory bound to one model and one equality policy.
#[derive(Clone, Copy)]
pub struct Delegates<'m> {
    model: &'m Model,
    equality: Equality,
}

impl<'m> Delegates<'m> {
    pub fn new(model: &'m Model, equality: Equality) -> Self {
        Self { model, equality }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    pub fn equality(&self) -> Equality {
        self.equality
    }

    /// Wrap a type. Wrapping a wrapper returns it unchanged.
    pub fn ty(&self, ty: impl IntoDelegatingType<'m>) -> DelegatingType<'m> {
        ty.into_delegating(*self)
    }

    /// Wrap an element. Wrapping a wrapper returns it unchanged.
    pub fn element(&self, element: impl IntoDelegatingElement<'m>) -> DelegatingElement<'m> {
        element.into_delegating(*self)
    }

    fn types(&self, ids: Vec<TypeId>) -> Vec<DelegatingType<'m>> {
        ids.into_iter().map(|id| self.ty(id)).collect()
    }

    fn elements(&self, ids: Vec<ElementId>) -> Vec<DelegatingElement<'m>> {
        ids.into_iter().map(|id| self.element(id)).collect()
    }
}

impl fmt::Debug for Delegates<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegates")
            .field("equality", &self.equality)
            .finish_non_exhaustive()
    }
}

pub trait IntoDelegatingType<'m> {
    fn into_delegating(self, delegates: Delegates<'m>) -> DelegatingType<'m>;
}

impl<'m> IntoDelegatingType<'m> for TypeId {
    fn into_delegating(self, delegates: Delegates<'m>) -> DelegatingType<'m> {
        DelegatingType {
            delegates,
            id: self,
            resolved: OnceLock::new(),
        }
    }
}

impl<'m> IntoDelegatingType<'m> for DelegatingType<'m> {
    fn into_delegating(self, _delegates: Delegates<'m>) -> DelegatingType<'m> {
        self
    }
}

pub trait IntoDelegatingElement<'m> {
    fn into_delegating(self, delegates: Delegates<'m>) -> DelegatingElement<'m>;
}

impl<'m> IntoDelegatingElement<'m> for ElementId {
    fn into_delegating(self, delegates: Delegates<'m>) -> DelegatingElement<'m> {
        DelegatingElement {
            delegates,
            id: self,
            resolved: OnceLock::new(),
        }
    }
}

impl<'m> IntoDelegatingElement<'m> for DelegatingElement<'m> {
    fn into_delegating(self, _delegates: Delegates<'m>) -> DelegatingElement<'m> {
        self
    }
}

/// A lazily completed view of a type node.
#[derive(Clone)]
pub struct DelegatingType<'m> {
    delegates: Delegates<'m>,
    id: TypeId,
    resolved: OnceLock<TypeId>,
}

impl<'m> DelegatingType<'m> {
    /// The handle this wrapper was created for (possibly a deferred slot).
    pub fn handle(&self) -> TypeId {
        self.id
    }

    pub fn is_completed(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// The concrete handle, completing the node on first use.
    pub fn target(&self) -> Result<TypeId> {
        if let Some(resolved) = self.resolved.get() {
            return Ok(*resolved);
        }
        let model = self.delegates.model;
        let resolved = guard::with_completion(|| -> Result<TypeId> {
            let resolved = model.resolve_type(self.id)?;
            model.type_kind(resolved)?;
            Ok(resolved)
        })?;
        Ok(*self.resolved.get_or_init(|| resolved))
    }

    pub fn kind(&self) -> Result<TypeKind> {
        self.delegates.model.type_kind(self.target()?)
    }

    pub fn annotations(&self) -> Result<Vec<AnnotationMirror>> {
        self.delegates.model.type_annotations(self.target()?)
    }

    /// Component of an array; the none type for every other kind.
    pub fn component_type(&self) -> Result<DelegatingType<'m>> {
        let model = self.delegates.model;
        let component = model.component_type(self.target()?)?;
        Ok(self.delegates.ty(component.unwrap_or_else(|| model.none_type())))
    }

    pub fn defining_element(&self) -> Result<Option<DelegatingElement<'m>>> {
        let element = self.delegates.model.defining_element(self.target()?)?;
        Ok(element.map(|e| self.delegates.element(e)))
    }

    pub fn enclosing_type(&self) -> Result<DelegatingType<'m>> {
        Ok(self.delegates.ty(self.delegates.model.enclosing_type(self.target()?)?))
    }

    pub fn type_arguments(&self) -> Result<Vec<DelegatingType<'m>>> {
        Ok(self.delegates.types(self.delegates.model.type_arguments(self.target()?)?))
    }

    pub fn is_erased(&self) -> Result<bool> {
        self.delegates.model.is_erased(self.target()?)
    }

    pub fn parameter_types(&self) -> Result<Vec<DelegatingType<'m>>> {
        Ok(self.delegates.types(self.delegates.model.parameter_types(self.target()?)?))
    }

    pub fn return_type(&self) -> Result<DelegatingType<'m>> {
        Ok(self.delegates.ty(self.delegates.model.return_type(self.target()?)?))
    }

    pub fn receiver_type(&self) -> Result<DelegatingType<'m>> {
        Ok(self.delegates.ty(self.delegates.model.receiver_type(self.target()?)?))
    }

    pub fn thrown_types(&self) -> Result<Vec<DelegatingType<'m>>> {
        Ok(self.delegates.types(self.delegates.model.thrown_types(self.target()?)?))
    }

    pub fn type_variables(&self) -> Result<Vec<DelegatingType<'m>>> {
        let model = self.delegates.model;
        Ok(self.delegates.types(model.executable_type_variables(self.target()?)?))
    }

    /// Intersection bounds or union alternatives.
    pub fn bounds(&self) -> Result<Vec<DelegatingType<'m>>> {
        Ok(self.delegates.types(self.delegates.model.bounds(self.target()?)?))
    }

    /// Declared upper bound of a type variable. `None` for other kinds and for variables whose
    /// bound is implicitly `Object`.
    pub fn upper_bound(&self) -> Result<Option<DelegatingType<'m>>> {
        let bound = self.delegates.model.upper_bound(self.target()?)?;
        Ok(bound.map(|b| self.delegates.ty(b)))
    }

    /// Lower bound of a type variable, the null type when it has none. `None` for other kinds.
    pub fn lower_bound(&self) -> Result<Option<DelegatingType<'m>>> {
        let model = self.delegates.model;
        let target = self.target()?;
        if model.type_kind(target)? != TypeKind::TypeVar {
            return Ok(None);
        }
        let bound = model.lower_bound(target)?.unwrap_or_else(|| model.null_type());
        Ok(Some(self.delegates.ty(bound)))
    }

    pub fn captured_wildcard(&self) -> Result<Option<DelegatingType<'m>>> {
        let wildcard = self.delegates.model.captured_wildcard(self.target()?)?;
        Ok(wildcard.map(|w| self.delegates.ty(w)))
    }

    pub fn extends_bound(&self) -> Result<Option<DelegatingType<'m>>> {
        let bound = self.delegates.model.extends_bound(self.target()?)?;
        Ok(bound.map(|b| self.delegates.ty(b)))
    }

    pub fn super_bound(&self) -> Result<Option<DelegatingType<'m>>> {
        let bound = self.delegates.model.super_bound(self.target()?)?;
        Ok(bound.map(|b| self.delegates.ty(b)))
    }

    /// Equality under the session policy. Two wrappers of one handle are equal without
    /// resolving it, so a wrapper whose completion fails still equals itself.
    pub fn equals(&self, other: &DelegatingType<'_>) -> Result<bool> {
        if !std::ptr::eq(self.delegates.model, other.delegates.model) {
            return Ok(false);
        }
        if self.id == other.id {
            return Ok(true);
        }
        self.delegates
            .equality
            .types_equal(self.delegates.model, self.target()?, other.target()?)
    }
}

/// Wrappers that fail to resolve compare unequal to every other handle; they hash alike.
impl PartialEq for DelegatingType<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other).unwrap_or(false)
    }
}

impl Eq for DelegatingType<'_> {}

impl Hash for DelegatingType<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let hash = self
            .target()
            .and_then(|t| self.delegates.equality.type_hash(self.delegates.model, t));
        hash.unwrap_or_default().hash(state);
    }
}

impl fmt::Debug for DelegatingType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DelegatingType");
        s.field("handle", &self.id);
        match self.resolved.get() {
            Some(resolved) => s.field("resolved", resolved),
            None => s.field("resolved", &format_args!("<pending>")),
        };
        s.finish()
    }
}

/// A lazily completed view of an element node.
#[derive(Clone)]
pub struct DelegatingElement<'m> {
    delegates: Delegates<'m>,
    id: ElementId,
    resolved: OnceLock<ElementId>,
}

impl<'m> DelegatingElement<'m> {
    pub fn handle(&self) -> ElementId {
        self.id
    }

    pub fn is_completed(&self) -> bool {
        self.resolved.get().is_some()
    }

    pub fn target(&self) -> Result<ElementId> {
        if let Some(resolved) = self.resolved.get() {
            return Ok(*resolved);
        }
        let model = self.delegates.model;
        let resolved = guard::with_completion(|| -> Result<ElementId> {
            let resolved = model.resolve_element(self.id)?;
            model.element_kind(resolved)?;
            Ok(resolved)
        })?;
        Ok(*self.resolved.get_or_init(|| resolved))
    }

    pub fn kind(&self) -> Result<ElementKind> {
        self.delegates.model.element_kind(self.target()?)
    }

    pub fn simple_name(&self) -> Result<String> {
        self.delegates.model.simple_name(self.target()?)
    }

    pub fn qualified_name(&self) -> Result<String> {
        self.delegates.model.qualified_name(self.target()?)
    }

    /// The element's own type; the none type when unset.
    pub fn as_type(&self) -> Result<DelegatingType<'m>> {
        let model = self.delegates.model;
        let ty = model.element_type(self.target()?)?;
        Ok(self.delegates.ty(ty.unwrap_or_else(|| model.none_type())))
    }

    pub fn modifiers(&self) -> Result<BTreeSet<Modifier>> {
        self.delegates.model.modifiers(self.target()?)
    }

    pub fn enclosing_element(&self) -> Result<Option<DelegatingElement<'m>>> {
        let enclosing = self.delegates.model.enclosing_element(self.target()?)?;
        Ok(enclosing.map(|e| self.delegates.element(e)))
    }

    pub fn enclosed_elements(&self) -> Result<Vec<DelegatingElement<'m>>> {
        Ok(self.delegates.elements(self.delegates.model.enclosed_elements(self.target()?)?))
    }

    pub fn annotations(&self) -> Result<Vec<AnnotationMirror>> {
        self.delegates.model.element_annotations(self.target()?)
    }

    pub fn nesting_kind(&self) -> Result<Option<NestingKind>> {
        self.delegates.model.nesting_kind(self.target()?)
    }

    /// Superclass of a type element; the none type when it has none.
    pub fn superclass(&self) -> Result<DelegatingType<'m>> {
        let model = self.delegates.model;
        let superclass = model.superclass(self.target()?)?;
        Ok(self.delegates.ty(superclass.unwrap_or_else(|| model.none_type())))
    }

    pub fn interfaces(&self) -> Result<Vec<DelegatingType<'m>>> {
        Ok(self.delegates.types(self.delegates.model.interfaces(self.target()?)?))
    }

    pub fn permitted_subclasses(&self) -> Result<Vec<DelegatingType<'m>>> {
        let model = self.delegates.model;
        Ok(self.delegates.types(model.permitted_subclasses(self.target()?)?))
    }

    pub fn type_parameters(&self) -> Result<Vec<DelegatingElement<'m>>> {
        Ok(self.delegates.elements(self.delegates.model.type_parameters(self.target()?)?))
    }

    pub fn parameters(&self) -> Result<Vec<DelegatingElement<'m>>> {
        Ok(self.delegates.elements(self.delegates.model.parameters(self.target()?)?))
    }

    pub fn is_varargs(&self) -> Result<bool> {
        self.delegates.model.is_varargs(self.target()?)
    }

    pub fn is_default(&self) -> Result<bool> {
        self.delegates.model.is_default(self.target()?)
    }

    pub fn default_value(&self) -> Result<Option<AnnotationValue>> {
        self.delegates.model.default_value(self.target()?)
    }

    pub fn thrown_types(&self) -> Result<Vec<DelegatingType<'m>>> {
        let model = self.delegates.model;
        Ok(self.delegates.types(model.element_thrown_types(self.target()?)?))
    }

    pub fn constant_value(&self) -> Result<Option<ConstantValue>> {
        self.delegates.model.constant_value(self.target()?)
    }

    /// Bounds of a type parameter, with an intersection bound flattened.
    pub fn bounds(&self) -> Result<Vec<DelegatingType<'m>>> {
        let model = self.delegates.model;
        Ok(self.delegates.types(model.type_parameter_bounds(self.target()?)?))
    }

    /// The generic element a type parameter belongs to.
    pub fn generic_element(&self) -> Result<Option<DelegatingElement<'m>>> {
        if self.kind()? != ElementKind::TypeParameter {
            return Ok(None);
        }
        self.enclosing_element()
    }

    pub fn accessor(&self) -> Result<Option<DelegatingElement<'m>>> {
        let accessor = self.delegates.model.accessor(self.target()?)?;
        Ok(accessor.map(|a| self.delegates.element(a)))
    }

    pub fn record_components(&self) -> Result<Vec<DelegatingElement<'m>>> {
        let model = self.delegates.model;
        Ok(self.delegates.elements(model.record_components(self.target()?)?))
    }

    /// Equality under the session policy. Two wrappers of one handle are equal without
    /// resolving it, so a wrapper whose completion fails still equals itself.
    pub fn equals(&self, other: &DelegatingElement<'_>) -> Result<bool> {
        if !std::ptr::eq(self.delegates.model, other.delegates.model) {
            return Ok(false);
        }
        if self.id == other.id {
            return Ok(true);
        }
        self.delegates
            .equality
            .elements_equal(self.delegates.model, self.target()?, other.target()?)
    }
}

/// Wrappers that fail to resolve compare unequal to every other handle; they hash alike.
impl PartialEq for DelegatingElement<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other).unwrap_or(false)
    }
}

impl Eq for DelegatingElement<'_> {}

impl Hash for DelegatingElement<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let hash = self
            .target()
            .and_then(|e| self.delegates.equality.element_hash(self.delegates.model, e));
        hash.unwrap_or_default().hash(state);
    }
}

impl fmt::Debug for DelegatingElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DelegatingElement");
        s.field("handle", &self.id);
        match self.resolved.get() {
            Some(resolved) => s.field("resolved", resolved),
            None => s.field("resolved", &format_args!("<pending>")),
        };
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn wrapper_completes_once_and_memoizes() {
        let model = Model::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let deferred = model.deferred_type(move |model| {
            counter.fetch_add(1, Ordering::SeqCst);
            model.array_type(model.primitive_type(TypeKind::Int)?)
        });
        let delegates = Delegates::new(&model, Equality::default());
        let wrapped = delegates.ty(deferred);
        assert!(!wrapped.is_completed());

        assert_eq!(wrapped.kind().unwrap(), TypeKind::Array);
        assert_eq!(wrapped.component_type().unwrap().kind().unwrap(), TypeKind::Int);
        assert!(wrapped.is_completed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unresolvable_wrapper_still_equals_itself() {
        let model = Model::new();
        let broken = model.deferred_type(|_| {
            Err(crate::LangError::MissingElement {
                name: "missing.Type".to_string(),
            })
        });
        let delegates = Delegates::new(&model, Equality::default());
        let wrapped = delegates.ty(broken);
        assert!(wrapped.kind().is_err());
        assert_eq!(wrapped, wrapped.clone());
        assert_eq!(wrapped, delegates.ty(broken));
        assert_ne!(wrapped, delegates.ty(model.null_type()));
    }

    #[test]
    fn wrapping_is_idempotent() {
        let model = Model::new();
        let delegates = Delegates::new(&model, Equality::default());
        let wrapped = delegates.ty(model.null_type());
        wrapped.target().unwrap();
        let rewrapped = delegates.ty(wrapped.clone());
        assert!(rewrapped.is_completed());
        assert_eq!(rewrapped.handle(), wrapped.handle());
    }

    #[test]
    fn kind_defaults_instead_of_failing() {
        let model = Model::new();
        let delegates = Delegates::new(&model, Equality::default());
        let int = delegates.ty(model.primitive_type(TypeKind::Int).unwrap());
        assert_eq!(int.component_type().unwrap().kind().unwrap(), TypeKind::None);
        assert_eq!(int.lower_bound().unwrap(), None);

        let variable = delegates.ty(model.new_type_variable());
        let lower = variable.lower_bound().unwrap().unwrap();
        assert_eq!(lower.kind().unwrap(), TypeKind::Null);
    }
}
