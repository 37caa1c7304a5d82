use std::cell::RefCell;
use std::collections::HashSet;

use super::{RelationCx, Visitors};
use crate::kind::TypeKind;
use crate::model::TypeId;
use crate::{LangError, Result};

/// A substitution from type variables to the types they were matched against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Adaptation {
    pub from: Vec<TypeId>,
    pub to: Vec<TypeId>,
}

impl Adaptation {
    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }

    /// The type `variable` was mapped to, compared by handle.
    pub fn get(&self, variable: TypeId) -> Option<TypeId> {
        self.from
            .iter()
            .position(|v| *v == variable)
            .and_then(|idx| self.to.get(idx).copied())
    }
}

impl Visitors {
    /// Match the generic type `source` (e.g. `List<E>`) against `target` (e.g. `List<String>`)
    /// and return the mapping from `source`'s type variables to `target`'s types.
    ///
    /// A variable reached more than once keeps the tighter of two compatible wildcard
    /// constraints; any other disagreement is an [`LangError::AdaptConflict`].
    pub fn adapt(&self, source: TypeId, target: TypeId) -> Result<Adaptation> {
        let cx = self.cx();
        let adapter = Adapter {
            cx: &cx,
            mapping: RefCell::new(Vec::new()),
            visited: RefCell::new(HashSet::new()),
        };
        adapter.adapt_recursive(source, target)?;
        let mut adaptation = Adaptation::default();
        for (from, to) in adapter.mapping.into_inner() {
            adaptation.from.push(from);
            adaptation.to.push(to);
        }
        Ok(adaptation)
    }
}

struct Adapter<'a, 'v> {
    cx: &'a RelationCx<'v>,
    /// Insertion-ordered variable mapping.
    mapping: RefCell<Vec<(TypeId, TypeId)>>,
    visited: RefCell<HashSet<(TypeId, TypeId)>>,
}

impl Adapter<'_, '_> {
    fn adapt_recursive(&self, source: TypeId, target: TypeId) -> Result<()> {
        let pair = (self.cx.resolve(source)?, self.cx.resolve(target)?);
        if !self.visited.borrow_mut().insert(pair) {
            return Ok(());
        }
        let result = self.adapt(pair.0, pair.1);
        self.visited.borrow_mut().remove(&pair);
        result
    }

    fn adapt_lists(&self, sources: &[TypeId], targets: &[TypeId]) -> Result<()> {
        if sources.len() != targets.len() {
            return Ok(());
        }
        for (source, target) in sources.iter().zip(targets) {
            self.adapt_recursive(*source, *target)?;
        }
        Ok(())
    }

    fn adapt(&self, source: TypeId, target: TypeId) -> Result<()> {
        let cx = self.cx;
        let model = cx.model();
        match cx.kind(source)? {
            TypeKind::Declared => {
                if cx.kind(target)? == TypeKind::Declared {
                    self.adapt_lists(
                        &cx.all_type_arguments(source)?,
                        &cx.all_type_arguments(target)?,
                    )?;
                }
                Ok(())
            }
            TypeKind::Array => {
                if cx.kind(target)? == TypeKind::Array {
                    if let (Some(s), Some(t)) =
                        (model.component_type(source)?, model.component_type(target)?)
                    {
                        self.adapt_recursive(s, t)?;
                    }
                }
                Ok(())
            }
            TypeKind::Wildcard => {
                if cx.is_extends_bound(source)? {
                    self.adapt_recursive(cx.wild_upper_bound(source)?, cx.wild_upper_bound(target)?)
                } else {
                    self.adapt_recursive(cx.wild_lower_bound(source)?, cx.wild_lower_bound(target)?)
                }
            }
            TypeKind::TypeVar => self.adapt_variable(source, target),
            _ => Ok(()),
        }
    }

    fn adapt_variable(&self, source: TypeId, target: TypeId) -> Result<()> {
        let cx = self.cx;
        let existing = {
            let mapping = self.mapping.borrow();
            let mut found = None;
            for (idx, (var, value)) in mapping.iter().enumerate() {
                if cx.same_type_variable(*var, source)? {
                    found = Some((idx, *value));
                    break;
                }
            }
            found
        };
        let Some((idx, value)) = existing else {
            self.mapping.borrow_mut().push((source, target));
            return Ok(());
        };

        let merged = if cx.is_super_bound(value)? && cx.is_super_bound(target)? {
            if cx.is_subtype(cx.wild_lower_bound(value)?, cx.wild_lower_bound(target)?, true)? {
                target
            } else {
                value
            }
        } else if cx.is_extends_bound(value)? && cx.is_extends_bound(target)? {
            if cx.is_subtype(cx.wild_upper_bound(value)?, cx.wild_upper_bound(target)?, true)? {
                value
            } else {
                target
            }
        } else if cx.same_type(value, target)? {
            value
        } else {
            tracing::debug!(
                target: "nova.lang_model",
                variable = ?source,
                ?value,
                conflicting = ?target,
                "adapt found conflicting mappings"
            );
            return Err(LangError::AdaptConflict { variable: source });
        };
        self.mapping.borrow_mut()[idx].1 = merged;
        Ok(())
    }
}
