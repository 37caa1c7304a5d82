//! Interning of the types the relations derive.
//!
//! Substitution, erasure and the supertype walks build new nodes. Each one is keyed by its
//! kind and the handles it was built from, so asking the same question twice hands back the
//! node built the first time instead of growing the arena. Derived nodes are shared results;
//! callers must not mutate them.

use super::RelationCx;
use crate::model::{ElementId, TypeId};
use crate::Result;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(super) enum DerivedKey {
    Declared {
        element: ElementId,
        enclosing: Option<TypeId>,
        arguments: Vec<TypeId>,
        erased: bool,
    },
    Array(TypeId),
    Wildcard {
        extends: Option<TypeId>,
        super_: Option<TypeId>,
    },
    Intersection(Vec<TypeId>),
    Union(Vec<TypeId>),
    Executable {
        variables: Vec<TypeId>,
        parameters: Vec<TypeId>,
        return_type: TypeId,
        receiver: Option<TypeId>,
        thrown: Vec<TypeId>,
    },
}

/// Everything an executable node is rebuilt from.
pub(super) struct ExecutableParts {
    pub(super) variables: Vec<TypeId>,
    pub(super) parameters: Vec<TypeId>,
    pub(super) return_type: TypeId,
    pub(super) receiver: Option<TypeId>,
    pub(super) thrown: Vec<TypeId>,
}

impl RelationCx<'_> {
    /// Look `key` up, building and recording it on a miss. Two threads racing on one key may
    /// both build; the first recorded node wins and the other stays unreferenced.
    fn intern(&self, key: DerivedKey, build: impl FnOnce() -> Result<TypeId>) -> Result<TypeId> {
        if let Some(existing) = self.v.derived.read().get(&key) {
            return Ok(*existing);
        }
        let built = build()?;
        Ok(*self.v.derived.write().entry(key).or_insert(built))
    }

    pub(super) fn derived_declared(
        &self,
        element: ElementId,
        enclosing: Option<TypeId>,
        arguments: Vec<TypeId>,
        erased: bool,
    ) -> Result<TypeId> {
        let model = self.model();
        let key = DerivedKey::Declared {
            element,
            enclosing,
            arguments: arguments.clone(),
            erased,
        };
        self.intern(key, || {
            let declared = model.declared_type(enclosing, element, &arguments)?;
            if erased {
                model.set_erased(declared, true)?;
            }
            Ok(declared)
        })
    }

    pub(super) fn derived_array(&self, component: TypeId) -> Result<TypeId> {
        self.intern(DerivedKey::Array(component), || {
            self.model().array_type(component)
        })
    }

    pub(super) fn derived_wildcard(
        &self,
        extends: Option<TypeId>,
        super_: Option<TypeId>,
    ) -> Result<TypeId> {
        self.intern(DerivedKey::Wildcard { extends, super_ }, || {
            self.model().wildcard_type(extends, super_)
        })
    }

    pub(super) fn derived_intersection(&self, bounds: Vec<TypeId>) -> Result<TypeId> {
        let model = self.model();
        self.intern(DerivedKey::Intersection(bounds.clone()), || {
            model.intersection_type(&bounds)
        })
    }

    pub(super) fn derived_union(&self, alternatives: Vec<TypeId>) -> Result<TypeId> {
        let model = self.model();
        self.intern(DerivedKey::Union(alternatives.clone()), || {
            model.union_type(&alternatives)
        })
    }

    pub(super) fn derived_executable(&self, parts: ExecutableParts) -> Result<TypeId> {
        let model = self.model();
        let key = DerivedKey::Executable {
            variables: parts.variables.clone(),
            parameters: parts.parameters.clone(),
            return_type: parts.return_type,
            receiver: parts.receiver,
            thrown: parts.thrown.clone(),
        };
        self.intern(key, || {
            let executable = model.new_executable_type();
            for variable in parts.variables {
                model.add_executable_type_variable(executable, variable)?;
            }
            for parameter in parts.parameters {
                model.add_parameter_type(executable, parameter)?;
            }
            model.set_return_type(executable, parts.return_type)?;
            if let Some(receiver) = parts.receiver {
                model.set_receiver_type(executable, receiver)?;
            }
            for thrown in parts.thrown {
                model.add_thrown_type(executable, thrown)?;
            }
            Ok(executable)
        })
    }
}
