//! An in-memory [`TypeAndElementSource`].
//!
//! [`MemorySource`] owns a [`Model`] and a registry of type elements by qualified name. Nodes are
//! populated exclusively through the model's builder surface; the `declare_*` helpers here just
//! bundle the usual sequences (create, name, enclose, type, register).

mod jdk;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::kind::{ElementKind, Modifier, NestingKind, TypeKind};
use crate::model::{ElementId, Model, TypeId};
use crate::source::TypeAndElementSource;
use crate::{LangError, Result};

#[derive(Default)]
struct Registry {
    by_name: HashMap<String, ElementId>,
    by_module: HashMap<(String, String), ElementId>,
}

impl Registry {
    fn lookup(&self, module: Option<&str>, qualified_name: &str) -> Option<ElementId> {
        match module {
            Some(module) => self
                .by_module
                .get(&(module.to_string(), qualified_name.to_string()))
                .copied(),
            None => self.by_name.get(qualified_name).copied(),
        }
    }
}

/// A source whose declarations are built in memory.
pub struct MemorySource {
    model: Model,
    registry: Arc<RwLock<Registry>>,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("model", &self.model)
            .field("registered", &self.registry.read().by_name.len())
            .finish()
    }
}

impl MemorySource {
    /// An empty source. See [`MemorySource::with_minimal_jdk`] for one with `java.lang` basics.
    pub fn new() -> Self {
        Self {
            model: Model::new(),
            registry: Arc::new(RwLock::new(Registry::default())),
        }
    }

    pub fn module(&self, name: &str) -> Result<ElementId> {
        let module = self.model.new_named_element(ElementKind::Module, name)?;
        self.model
            .set_element_type(module, self.model.no_type(TypeKind::Module)?)?;
        Ok(module)
    }

    /// A package, optionally inside `module`. The name is the fully qualified package name.
    pub fn package(&self, module: Option<ElementId>, name: &str) -> Result<ElementId> {
        let package = self.model.new_named_element(ElementKind::Package, name)?;
        self.model
            .set_element_type(package, self.model.no_type(TypeKind::Package)?)?;
        if let Some(module) = module {
            self.model.add_enclosed_element(module, package)?;
        }
        Ok(package)
    }

    /// Declare a public type element named `name` inside `enclosing`, with fresh type
    /// parameters, and register it.
    ///
    /// The element's type is `Name<T1, ..., Tn>` over its own type variables. A class declared
    /// inside another type element is an inner class: its type has the enclosing declaration's
    /// type as enclosing type.
    pub fn declare_type(
        &self,
        kind: ElementKind,
        enclosing: ElementId,
        name: &str,
        type_parameters: &[&str],
    ) -> Result<ElementId> {
        if !kind.is_type_element() {
            return Err(LangError::IllegalElementKind {
                operation: "declare_type",
                kind,
            });
        }
        let model = &self.model;
        let element = model.new_named_element(kind, name)?;
        model.add_modifier(element, Modifier::Public)?;
        model.add_enclosed_element(enclosing, element)?;

        let enclosing_kind = model.element_kind(enclosing)?;
        let nesting = if enclosing_kind == ElementKind::Package {
            NestingKind::TopLevel
        } else if enclosing_kind.is_type_element() {
            NestingKind::Member
        } else {
            NestingKind::Local
        };
        model.set_nesting_kind(element, nesting)?;

        let mut variables = Vec::with_capacity(type_parameters.len());
        for parameter in type_parameters {
            variables.push(self.declare_type_parameter(element, parameter)?);
        }
        let enclosing_type = if nesting == NestingKind::Member && kind == ElementKind::Class {
            model.element_type(enclosing)?
        } else {
            None
        };
        let ty = model.declared_type(enclosing_type, element, &variables)?;
        model.set_element_type(element, ty)?;
        self.register(element)?;
        Ok(element)
    }

    pub fn declare_class(
        &self,
        enclosing: ElementId,
        name: &str,
        type_parameters: &[&str],
    ) -> Result<ElementId> {
        self.declare_type(ElementKind::Class, enclosing, name, type_parameters)
    }

    pub fn declare_interface(
        &self,
        enclosing: ElementId,
        name: &str,
        type_parameters: &[&str],
    ) -> Result<ElementId> {
        let interface = self.declare_type(ElementKind::Interface, enclosing, name, type_parameters)?;
        self.model.add_modifier(interface, Modifier::Abstract)?;
        Ok(interface)
    }

    /// Add a type parameter named `name` to a type or executable element; returns its type
    /// variable. The variable is unbounded until [`MemorySource::set_bounds`] is called.
    pub fn declare_type_parameter(&self, generic: ElementId, name: &str) -> Result<TypeId> {
        let model = &self.model;
        let parameter = model.new_named_element(ElementKind::TypeParameter, name)?;
        let variable = model.new_type_variable();
        model.set_element_type(parameter, variable)?;
        model.add_type_parameter(generic, parameter)?;
        if model.element_kind(generic)?.is_executable() {
            if let Some(executable) = model.element_type(generic)? {
                model.add_executable_type_variable(executable, variable)?;
            }
        }
        Ok(variable)
    }

    /// The type variable of `generic`'s type parameter named `name`.
    pub fn type_variable(&self, generic: ElementId, name: &str) -> Result<TypeId> {
        for parameter in self.model.type_parameters(generic)? {
            if self.model.simple_name(parameter)? == name {
                if let Some(variable) = self.model.element_type(parameter)? {
                    return Ok(variable);
                }
            }
        }
        Err(LangError::MissingElement {
            name: name.to_string(),
        })
    }

    /// Set a type variable's declared bounds; more than one bound becomes an intersection.
    pub fn set_bounds(&self, variable: TypeId, bounds: &[TypeId]) -> Result<()> {
        match bounds {
            [] => Ok(()),
            [bound] => self.model.set_upper_bound(variable, *bound),
            _ => {
                let intersection = self.model.intersection_type(bounds)?;
                self.model.set_upper_bound(variable, intersection)
            }
        }
    }

    /// Declare a public instance method on `owner`.
    pub fn declare_method(
        &self,
        owner: ElementId,
        name: &str,
        return_type: TypeId,
        parameters: &[(&str, TypeId)],
    ) -> Result<ElementId> {
        let model = &self.model;
        let method = model.new_named_element(ElementKind::Method, name)?;
        model.add_modifier(method, Modifier::Public)?;
        model.add_enclosed_element(owner, method)?;

        let executable = model.new_executable_type();
        for (name, ty) in parameters {
            let parameter = model.new_named_element(ElementKind::Parameter, *name)?;
            model.set_element_type(parameter, *ty)?;
            model.add_parameter(method, parameter)?;
            model.add_parameter_type(executable, *ty)?;
        }
        model.set_return_type(executable, return_type)?;
        model.set_element_type(method, executable)?;
        Ok(method)
    }

    /// Declare a public field on `owner`.
    pub fn declare_field(&self, owner: ElementId, name: &str, ty: TypeId) -> Result<ElementId> {
        let field = self.model.new_named_element(ElementKind::Field, name)?;
        self.model.add_modifier(field, Modifier::Public)?;
        self.model.set_element_type(field, ty)?;
        self.model.add_enclosed_element(owner, field)?;
        Ok(field)
    }

    /// Declare a record component together with its accessor method.
    pub fn declare_record_component(
        &self,
        record: ElementId,
        name: &str,
        ty: TypeId,
    ) -> Result<ElementId> {
        let component = self.model.new_named_element(ElementKind::RecordComponent, name)?;
        self.model.set_element_type(component, ty)?;
        self.model.add_enclosed_element(record, component)?;
        let accessor = self.declare_method(record, name, ty, &[])?;
        self.model.set_accessor(component, accessor)?;
        Ok(component)
    }

    /// The type of an element's declaration (`List<E>` for `List`).
    pub fn type_of(&self, element: ElementId) -> Result<TypeId> {
        match self.model.element_type(element)? {
            Some(ty) => Ok(ty),
            None => Err(LangError::MissingElement {
                name: self.model.qualified_name(element)?,
            }),
        }
    }

    /// Record a type element under its qualified name (and its module, if any). The first
    /// registration of a name wins.
    pub fn register(&self, element: ElementId) -> Result<()> {
        let qualified_name = self.model.qualified_name(element)?;
        let module = self.module_of(element)?;
        let mut registry = self.registry.write();
        registry
            .by_name
            .entry(qualified_name.clone())
            .or_insert(element);
        if let Some(module) = module {
            registry
                .by_module
                .entry((module, qualified_name))
                .or_insert(element);
        }
        Ok(())
    }

    /// A deferred element handle that resolves to the type element registered as
    /// `qualified_name` on first use.
    pub fn lazy_type_element(&self, qualified_name: &str) -> ElementId {
        let registry = Arc::clone(&self.registry);
        let name = qualified_name.to_string();
        self.model.deferred_element(move |_| {
            let found = registry.read().lookup(None, &name);
            found.ok_or(LangError::MissingElement { name })
        })
    }

    /// A deferred declared type `qualified_name<arguments>`, built on first use.
    pub fn lazy_declared_type(&self, qualified_name: &str, arguments: Vec<TypeId>) -> TypeId {
        let registry = Arc::clone(&self.registry);
        let name = qualified_name.to_string();
        self.model.deferred_type(move |model| {
            let found = registry.read().lookup(None, &name);
            let element = found.ok_or(LangError::MissingElement { name })?;
            model.declared_type(None, element, &arguments)
        })
    }

    fn module_of(&self, element: ElementId) -> Result<Option<String>> {
        let mut current = self.model.enclosing_element(element)?;
        while let Some(element) = current {
            if self.model.element_kind(element)? == ElementKind::Module {
                return Ok(Some(self.model.simple_name(element)?));
            }
            current = self.model.enclosing_element(element)?;
        }
        Ok(None)
    }
}

impl TypeAndElementSource for MemorySource {
    fn model(&self) -> &Model {
        &self.model
    }

    fn type_element_in(&self, module: Option<&str>, qualified_name: &str) -> Result<Option<ElementId>> {
        Ok(self.registry.read().lookup(module, qualified_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_top_level_and_member_types() {
        let source = MemorySource::new();
        let module = source.module("m").unwrap();
        let package = source.package(Some(module), "p").unwrap();
        let outer = source.declare_class(package, "Outer", &["T"]).unwrap();
        let inner = source.declare_class(outer, "Inner", &[]).unwrap();

        assert_eq!(source.type_element("p.Outer").unwrap(), Some(outer));
        assert_eq!(source.type_element_in(Some("m"), "p.Outer.Inner").unwrap(), Some(inner));
        assert_eq!(source.type_element_in(Some("other"), "p.Outer").unwrap(), None);

        let inner_type = source.type_of(inner).unwrap();
        assert_eq!(
            source.model().enclosing_type(inner_type).unwrap(),
            source.type_of(outer).unwrap()
        );
    }

    #[test]
    fn lazy_element_resolves_after_registration() {
        let source = MemorySource::new();
        let lazy = source.lazy_type_element("p.Later");
        assert_eq!(source.model().peek_element(lazy), None);

        let package = source.package(None, "p").unwrap();
        let later = source.declare_class(package, "Later", &[]).unwrap();
        assert_eq!(source.model().resolve_element(lazy).unwrap(), later);
    }

    #[test]
    fn lazy_element_for_unknown_name_fails() {
        let source = MemorySource::new();
        let lazy = source.lazy_type_element("p.Missing");
        assert_eq!(
            source.model().resolve_element(lazy),
            Err(LangError::MissingElement {
                name: "p.Missing".to_string()
            })
        );
    }
}
