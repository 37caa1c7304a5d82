use std::sync::atomic::Ordering;

use super::{RelationCx, Visitors};
use crate::kind::{ElementKind, TypeKind};
use crate::model::TypeId;
use crate::Result;

impl Visitors {
    /// Capture conversion (JLS 5.1.10).
    ///
    /// Every wildcard argument is replaced by a fresh type variable; each call mints new
    /// variables, even for structurally identical wildcards. Raw types and types without
    /// wildcard arguments are returned unchanged.
    pub fn capture(&self, ty: TypeId) -> Result<TypeId> {
        self.cx().capture(ty)
    }

    /// Greatest lower bound of two reference types: the more specific one when they are related,
    /// otherwise their intersection (class bound first).
    pub fn glb(&self, a: TypeId, b: TypeId) -> Result<TypeId> {
        self.cx().glb(a, b)
    }
}

impl RelationCx<'_> {
    pub(super) fn capture(&self, ty: TypeId) -> Result<TypeId> {
        let model = self.model();
        let ty = self.resolve(ty)?;
        if self.kind(ty)? != TypeKind::Declared {
            return Ok(ty);
        }
        let Some(element) = self.element_of(ty)? else {
            return Ok(ty);
        };

        let enclosing = self.resolve(model.enclosing_type(ty)?)?;
        let captured_enclosing = if self.kind(enclosing)? == TypeKind::Declared {
            self.capture(enclosing)?
        } else {
            enclosing
        };

        let arguments = model.type_arguments(ty)?;
        let mut has_wildcard = false;
        for argument in &arguments {
            has_wildcard |= self.kind(*argument)? == TypeKind::Wildcard;
        }
        let formals: Vec<TypeId> = model
            .type_parameters(element)?
            .into_iter()
            .filter_map(|parameter| model.element_type(parameter).transpose())
            .collect::<Result<_>>()?;
        if self.is_raw(ty)? || !has_wildcard || formals.len() != arguments.len() {
            if captured_enclosing == enclosing {
                return Ok(ty);
            }
            return self.rebuild(ty, captured_enclosing, &arguments);
        }

        // Allocate every capture variable first: a formal's bound may mention any of them.
        let mut captured = Vec::with_capacity(arguments.len());
        for argument in &arguments {
            if self.kind(*argument)? == TypeKind::Wildcard {
                captured.push(self.fresh_capture_variable(*argument)?);
            } else {
                captured.push(*argument);
            }
        }

        for ((argument, formal), var) in arguments.iter().zip(&formals).zip(&captured) {
            if self.kind(*argument)? != TypeKind::Wildcard {
                continue;
            }
            let formal_bound = self.subst(self.upper_bound(*formal)?, &formals, &captured)?;
            let upper = match model.extends_bound(*argument)? {
                Some(bound) => self.glb(bound, formal_bound)?,
                None => formal_bound,
            };
            if self.resolve(upper)? == *var {
                model.set_upper_bound(*var, self.object()?)?;
            } else {
                model.set_upper_bound(*var, upper)?;
            }
            if let Some(lower) = model.super_bound(*argument)? {
                model.set_lower_bound(*var, lower)?;
            }
        }

        self.rebuild(ty, captured_enclosing, &captured)
    }

    fn rebuild(&self, ty: TypeId, enclosing: TypeId, arguments: &[TypeId]) -> Result<TypeId> {
        let model = self.model();
        let Some(element) = model.defining_element(ty)? else {
            return Ok(ty);
        };
        let enclosing = (self.kind(enclosing)? != TypeKind::None).then_some(enclosing);
        let result = model.declared_type(enclosing, element, arguments)?;
        if arguments.is_empty() && model.is_erased(ty)? {
            model.set_erased(result, true)?;
        }
        Ok(result)
    }

    fn fresh_capture_variable(&self, wildcard: TypeId) -> Result<TypeId> {
        let model = self.model();
        let serial = self.v.captures.fetch_add(1, Ordering::Relaxed) + 1;
        let element = model.new_named_element(ElementKind::TypeParameter, format!("capture#{serial}"))?;
        let var = model.new_type_variable();
        model.set_element_type(element, var)?;
        model.set_captured_wildcard(var, wildcard)?;
        tracing::trace!(target: "nova.lang_model", serial, ?var, "minted capture variable");
        Ok(var)
    }

    pub(super) fn glb(&self, a: TypeId, b: TypeId) -> Result<TypeId> {
        let a = self.resolve(a)?;
        let b = self.resolve(b)?;
        if self.is_subtype_no_capture(a, b)? {
            return Ok(a);
        }
        if self.is_subtype_no_capture(b, a)? {
            return Ok(b);
        }

        let mut classes = Vec::new();
        let mut interfaces = Vec::new();
        for ty in [a, b] {
            let parts = if self.kind(ty)? == TypeKind::Intersection {
                self.model().bounds(ty)?
            } else {
                vec![ty]
            };
            for part in parts {
                let bucket = if self.is_interface(part)? {
                    &mut interfaces
                } else {
                    &mut classes
                };
                let mut seen = false;
                for existing in bucket.iter() {
                    seen |= self.same_type(*existing, part)?;
                }
                if !seen {
                    bucket.push(part);
                }
            }
        }
        classes.extend(interfaces);
        if let [single] = classes.as_slice() {
            return Ok(*single);
        }
        self.derived_intersection(classes)
    }
}
