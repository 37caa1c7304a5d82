//! Type relations over a [`Model`].
//!
//! [`Visitors`] is the facade: one instance per session, holding the source, the configuration,
//! the equality policy and the caches every relation shares, including the interned
//! types the relations derive (see `derived`). Each relation lives in its own
//! module as an `impl RelationCx` block plus its public entry point on [`Visitors`].
//!
//! A [`RelationCx`] is created per top-level query. It carries the recursion state that must not
//! outlive one call (the as-super visited stack, in-progress containment pairs), so unrelated
//! call sites never observe each other's partial results.

mod adapt;
mod as_super;
mod capture;
mod closure;
mod contains;
mod convertible;
mod derived;
mod erase;
mod member_type;
mod precedes;
mod same_type;
mod subst;
mod subtype;
mod supertype;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::AtomicU32;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

pub use adapt::Adaptation;

use derived::DerivedKey;

use crate::config::VisitorsConfig;
use crate::delegate::Delegates;
use crate::equality::Equality;
use crate::guard;
use crate::kind::TypeKind;
use crate::model::{ElementId, Model, TypeId};
use crate::source::TypeAndElementSource;
use crate::{LangError, Result};

const OBJECT: &str = "java.lang.Object";
const CLONEABLE: &str = "java.lang.Cloneable";
const SERIALIZABLE: &str = "java.io.Serializable";

/// Declarations every relation needs, resolved once per session.
#[derive(Clone, Copy, Debug)]
struct WellKnown {
    object: ElementId,
    object_type: TypeId,
    cloneable: ElementId,
    cloneable_type: TypeId,
    serializable: ElementId,
    serializable_type: TypeId,
}

/// Closure cache: structural hash buckets, matched with the session's equality policy.
type ClosureBuckets = HashMap<u64, Vec<(TypeId, Arc<[TypeId]>)>>;

/// The relation facade for one session.
pub struct Visitors {
    source: Arc<dyn TypeAndElementSource>,
    config: VisitorsConfig,
    equality: Equality,
    well_known: OnceLock<WellKnown>,
    closures: RwLock<ClosureBuckets>,
    ranks: RwLock<HashMap<ElementId, u32>>,
    derived: RwLock<HashMap<DerivedKey, TypeId>>,
    captures: AtomicU32,
}

impl fmt::Debug for Visitors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Visitors")
            .field("config", &self.config)
            .field("closures", &self.closures.read().len())
            .finish_non_exhaustive()
    }
}

impl Visitors {
    pub fn new(source: Arc<dyn TypeAndElementSource>) -> Self {
        Self::with_config(source, VisitorsConfig::default())
    }

    pub fn with_config(source: Arc<dyn TypeAndElementSource>, config: VisitorsConfig) -> Self {
        let equality = config.equality();
        Self {
            source,
            config,
            equality,
            well_known: OnceLock::new(),
            closures: RwLock::new(HashMap::new()),
            ranks: RwLock::new(HashMap::new()),
            derived: RwLock::new(HashMap::new()),
            captures: AtomicU32::new(0),
        }
    }

    pub fn config(&self) -> &VisitorsConfig {
        &self.config
    }

    pub fn equality(&self) -> Equality {
        self.equality
    }

    pub fn source(&self) -> &dyn TypeAndElementSource {
        self.source.as_ref()
    }

    pub fn model(&self) -> &Model {
        self.source.model()
    }

    /// Wrapper factory using this session's equality policy.
    pub fn delegates(&self) -> Delegates<'_> {
        Delegates::new(self.model(), self.equality)
    }

    /// The type `java.lang.Object`.
    pub fn object_type(&self) -> Result<TypeId> {
        Ok(self.well_known()?.object_type)
    }

    /// Resolve a type element by qualified name through the source, under the completion guard.
    pub fn type_element(&self, qualified_name: &str) -> Result<Option<ElementId>> {
        guard::with_completion(|| self.source.type_element(qualified_name))
    }

    fn require_type_element(&self, qualified_name: &str) -> Result<(ElementId, TypeId)> {
        let missing = || LangError::MissingElement {
            name: qualified_name.to_string(),
        };
        let element = self.type_element(qualified_name)?.ok_or_else(missing)?;
        let ty = self.model().element_type(element)?.ok_or_else(missing)?;
        Ok((self.model().resolve_element(element)?, ty))
    }

    fn well_known(&self) -> Result<WellKnown> {
        if let Some(well_known) = self.well_known.get() {
            return Ok(*well_known);
        }
        let (object, object_type) = self.require_type_element(OBJECT)?;
        let (cloneable, cloneable_type) = self.require_type_element(CLONEABLE)?;
        let (serializable, serializable_type) = self.require_type_element(SERIALIZABLE)?;
        let well_known = WellKnown {
            object,
            object_type,
            cloneable,
            cloneable_type,
            serializable,
            serializable_type,
        };
        Ok(*self.well_known.get_or_init(|| well_known))
    }

    fn cx(&self) -> RelationCx<'_> {
        RelationCx::new(self)
    }
}

/// Per-query relation state.
pub(crate) struct RelationCx<'v> {
    v: &'v Visitors,
    /// Elements currently being walked by `as_super`.
    as_super_seen: RefCell<Vec<ElementId>>,
    /// Type-argument containment checks in progress, assumed to hold when revisited.
    contains_in_progress: RefCell<HashSet<(TypeId, TypeId)>>,
    rank_in_progress: RefCell<HashSet<ElementId>>,
    /// Wildcards in argument position compare loosely (either containment direction).
    loose_wildcards: bool,
}

impl<'v> RelationCx<'v> {
    fn new(v: &'v Visitors) -> Self {
        Self {
            v,
            as_super_seen: RefCell::new(Vec::new()),
            contains_in_progress: RefCell::new(HashSet::new()),
            rank_in_progress: RefCell::new(HashSet::new()),
            loose_wildcards: false,
        }
    }

    fn model(&self) -> &'v Model {
        self.v.model()
    }

    fn kind(&self, ty: TypeId) -> Result<TypeKind> {
        self.model().type_kind(ty)
    }

    fn resolve(&self, ty: TypeId) -> Result<TypeId> {
        self.model().resolve_type(ty)
    }

    fn object(&self) -> Result<TypeId> {
        Ok(self.v.well_known()?.object_type)
    }

    fn object_element(&self) -> Result<ElementId> {
        Ok(self.v.well_known()?.object)
    }

    fn none(&self) -> TypeId {
        self.model().none_type()
    }

    /// Resolved defining element of a declared, error or type-variable type.
    fn element_of(&self, ty: TypeId) -> Result<Option<ElementId>> {
        match self.model().defining_element(ty)? {
            Some(element) => Ok(Some(self.model().resolve_element(element)?)),
            None => Ok(None),
        }
    }

    fn same_element(&self, a: ElementId, b: ElementId) -> Result<bool> {
        let model = self.model();
        if model.resolve_element(a)? == model.resolve_element(b)? {
            return Ok(true);
        }
        self.v.equality.elements_equal(model, a, b)
    }

    fn is_object(&self, ty: TypeId) -> Result<bool> {
        if self.kind(ty)? != TypeKind::Declared {
            return Ok(false);
        }
        match self.element_of(ty)? {
            Some(element) => Ok(element == self.object_element()?),
            None => Ok(false),
        }
    }

    /// Whether `ty` is a declared type whose element is an interface.
    fn is_interface(&self, ty: TypeId) -> Result<bool> {
        if !self.kind(ty)?.is_declared_like() {
            return Ok(false);
        }
        match self.element_of(ty)? {
            Some(element) => Ok(self.model().element_kind(element)?.is_interface()),
            None => Ok(false),
        }
    }

    /// Type arguments of `ty` and of every enclosing type, outermost first.
    fn all_type_arguments(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        let model = self.model();
        if !model.type_kind(ty)?.is_declared_like() {
            return Ok(Vec::new());
        }
        let mut arguments = self.all_type_arguments(model.enclosing_type(ty)?)?;
        arguments.extend(model.type_arguments(ty)?);
        Ok(arguments)
    }

    fn is_parameterized(&self, ty: TypeId) -> Result<bool> {
        Ok(!self.all_type_arguments(ty)?.is_empty())
    }

    /// A declared type used without arguments although its element (or an enclosing type's
    /// element) is generic.
    fn is_raw(&self, ty: TypeId) -> Result<bool> {
        let model = self.model();
        if model.type_kind(ty)? != TypeKind::Declared {
            return Ok(false);
        }
        if model.type_arguments(ty)?.is_empty() {
            if let Some(element) = self.element_of(ty)? {
                if !model.type_parameters(element)?.is_empty() {
                    return Ok(true);
                }
            }
        }
        let enclosing = model.enclosing_type(ty)?;
        self.is_raw(enclosing)
    }

    /// The declared type of an element's own declaration (`List<E>` for `List`).
    fn declared_type_of(&self, element: ElementId) -> Result<TypeId> {
        self.model()
            .element_type(element)?
            .ok_or_else(|| LangError::MissingElement {
                name: self.model().qualified_name(element).unwrap_or_default(),
            })
    }

    /// Upper bound of a type variable, `Object` when absent.
    fn upper_bound(&self, var: TypeId) -> Result<TypeId> {
        match self.model().upper_bound(var)? {
            Some(bound) => Ok(bound),
            None => self.object(),
        }
    }

    /// Lower bound of a type variable, the null type when absent.
    fn lower_bound(&self, var: TypeId) -> Result<TypeId> {
        Ok(self
            .model()
            .lower_bound(var)?
            .unwrap_or_else(|| self.model().null_type()))
    }

    fn is_capture(&self, ty: TypeId) -> Result<bool> {
        Ok(self.kind(ty)? == TypeKind::TypeVar && self.model().captured_wildcard(ty)?.is_some())
    }

    /// `? extends T` and `?` bound from above; `? super T` by `Object`.
    fn wild_upper_bound(&self, ty: TypeId) -> Result<TypeId> {
        if self.kind(ty)? != TypeKind::Wildcard {
            return Ok(ty);
        }
        match self.model().extends_bound(ty)? {
            Some(bound) => self.wild_upper_bound(bound),
            None => self.object(),
        }
    }

    /// `? super T` bound from below; `?` and `? extends T` by the null type.
    fn wild_lower_bound(&self, ty: TypeId) -> Result<TypeId> {
        if self.kind(ty)? != TypeKind::Wildcard {
            return Ok(ty);
        }
        match self.model().super_bound(ty)? {
            Some(bound) => self.wild_lower_bound(bound),
            None => Ok(self.model().null_type()),
        }
    }

    fn cvar_upper_bound(&self, ty: TypeId) -> Result<TypeId> {
        if self.is_capture(ty)? {
            return self.cvar_upper_bound(self.upper_bound(ty)?);
        }
        Ok(ty)
    }

    fn cvar_lower_bound(&self, ty: TypeId) -> Result<TypeId> {
        if self.is_capture(ty)? {
            return self.cvar_lower_bound(self.lower_bound(ty)?);
        }
        Ok(ty)
    }

    /// Wildcards with no bound or an extends bound (`?`, `? extends T`).
    fn is_extends_bound(&self, ty: TypeId) -> Result<bool> {
        Ok(self.kind(ty)? == TypeKind::Wildcard && self.model().super_bound(ty)?.is_none())
    }

    /// Wildcards with no bound or a super bound (`?`, `? super T`).
    fn is_super_bound(&self, ty: TypeId) -> Result<bool> {
        Ok(self.kind(ty)? == TypeKind::Wildcard && self.model().extends_bound(ty)?.is_none())
    }
}

fn unsupported(relation: &'static str, kind: TypeKind) -> LangError {
    LangError::UnsupportedRelation { relation, kind }
}
