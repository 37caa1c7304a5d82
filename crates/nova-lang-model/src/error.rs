use crate::kind::{ElementKind, TypeKind};
use crate::model::{ElementId, TypeId};

pub type Result<T> = std::result::Result<T, LangError>;

/// Usage errors raised by the model and the relation visitors.
///
/// None of these are recoverable by the model itself; callers are expected to validate node
/// shapes before invoking kind-specific operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LangError {
    #[error("write-once field `{field}` is already set to a different value")]
    WriteOnceConflict { field: &'static str },

    #[error("{kind} nodes are immutable")]
    Immutable { kind: TypeKind },

    #[error("a node cannot be its own `{field}`")]
    SelfReference { field: &'static str },

    #[error("`{operation}` does not accept a {kind} type")]
    IllegalTypeKind {
        operation: &'static str,
        kind: TypeKind,
    },

    #[error("`{operation}` does not accept a {kind} element")]
    IllegalElementKind {
        operation: &'static str,
        kind: ElementKind,
    },

    #[error("a {enclosing} element cannot enclose a {enclosed} element")]
    InvalidEnclosure {
        enclosing: ElementKind,
        enclosed: ElementKind,
    },

    #[error("invalid record component accessor: {reason}")]
    InvalidRecordAccessor { reason: &'static str },

    #[error("type arguments cannot be added to an erased declared type")]
    Erased,

    #[error("`{relation}` is not defined for {kind} types")]
    UnsupportedRelation {
        relation: &'static str,
        kind: TypeKind,
    },

    #[error("type variable {variable:?} adapts to conflicting types")]
    AdaptConflict { variable: TypeId },

    #[error("deferred node re-entered its own completion")]
    CyclicCompletion,

    #[error("unknown type handle {0:?}")]
    UnknownType(TypeId),

    #[error("unknown element handle {0:?}")]
    UnknownElement(ElementId),

    #[error("required element `{name}` could not be resolved")]
    MissingElement { name: String },
}
