//! Closed kind taxonomies for types and elements.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a type node. Fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
    Void,
    None,
    Module,
    Package,
    Null,
    Array,
    Declared,
    Error,
    Executable,
    Intersection,
    TypeVar,
    Union,
    Wildcard,
}

impl TypeKind {
    pub const PRIMITIVES: [TypeKind; 8] = [
        TypeKind::Boolean,
        TypeKind::Byte,
        TypeKind::Short,
        TypeKind::Int,
        TypeKind::Long,
        TypeKind::Char,
        TypeKind::Float,
        TypeKind::Double,
    ];

    pub const NO_TYPES: [TypeKind; 4] = [
        TypeKind::None,
        TypeKind::Void,
        TypeKind::Module,
        TypeKind::Package,
    ];

    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            TypeKind::Boolean
                | TypeKind::Byte
                | TypeKind::Short
                | TypeKind::Int
                | TypeKind::Long
                | TypeKind::Char
                | TypeKind::Float
                | TypeKind::Double
        )
    }

    pub fn is_no_type(self) -> bool {
        matches!(
            self,
            TypeKind::None | TypeKind::Void | TypeKind::Module | TypeKind::Package
        )
    }

    /// Kinds whose values denote references (things `null` is assignable to).
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            TypeKind::Array
                | TypeKind::Declared
                | TypeKind::Error
                | TypeKind::Intersection
                | TypeKind::Null
                | TypeKind::TypeVar
        )
    }

    /// Kinds that may legally appear as a type argument, array component or bound.
    pub fn is_value_type(self) -> bool {
        self.is_primitive() || self.is_reference() || self == TypeKind::Wildcard
    }

    /// Kinds backed by a declared-type node (`Declared` and its immutable `Error` twin).
    pub fn is_declared_like(self) -> bool {
        matches!(self, TypeKind::Declared | TypeKind::Error)
    }

    /// Binary name of a primitive kind (`int`, `boolean`, ...), `None` for other kinds.
    pub fn primitive_name(self) -> Option<&'static str> {
        Some(match self {
            TypeKind::Boolean => "boolean",
            TypeKind::Byte => "byte",
            TypeKind::Short => "short",
            TypeKind::Int => "int",
            TypeKind::Long => "long",
            TypeKind::Char => "char",
            TypeKind::Float => "float",
            TypeKind::Double => "double",
            _ => return None,
        })
    }

    /// Qualified name of the class a primitive boxes to.
    pub fn boxed_class_name(self) -> Option<&'static str> {
        Some(match self {
            TypeKind::Boolean => "java.lang.Boolean",
            TypeKind::Byte => "java.lang.Byte",
            TypeKind::Short => "java.lang.Short",
            TypeKind::Int => "java.lang.Integer",
            TypeKind::Long => "java.lang.Long",
            TypeKind::Char => "java.lang.Character",
            TypeKind::Float => "java.lang.Float",
            TypeKind::Double => "java.lang.Double",
            _ => return None,
        })
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The kind of an element (declaration).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementKind {
    Module,
    Package,
    Class,
    Interface,
    Enum,
    AnnotationType,
    Record,
    EnumConstant,
    Field,
    Parameter,
    LocalVariable,
    ExceptionParameter,
    ResourceVariable,
    BindingVariable,
    Method,
    Constructor,
    StaticInit,
    InstanceInit,
    TypeParameter,
    RecordComponent,
}

impl ElementKind {
    /// Class, interface, enum, annotation type or record.
    pub fn is_type_element(self) -> bool {
        matches!(
            self,
            ElementKind::Class
                | ElementKind::Interface
                | ElementKind::Enum
                | ElementKind::AnnotationType
                | ElementKind::Record
        )
    }

    pub fn is_interface(self) -> bool {
        matches!(self, ElementKind::Interface | ElementKind::AnnotationType)
    }

    pub fn is_executable(self) -> bool {
        matches!(
            self,
            ElementKind::Method
                | ElementKind::Constructor
                | ElementKind::StaticInit
                | ElementKind::InstanceInit
        )
    }

    pub fn is_variable(self) -> bool {
        matches!(
            self,
            ElementKind::EnumConstant
                | ElementKind::Field
                | ElementKind::Parameter
                | ElementKind::LocalVariable
                | ElementKind::ExceptionParameter
                | ElementKind::ResourceVariable
                | ElementKind::BindingVariable
        )
    }

    /// Whether an element of kind `self` may directly enclose an element of kind `child`.
    ///
    /// Type parameters are not "enclosed" in the membership sense; their enclosing element is the
    /// generic element they parameterize, which must be a type or an executable.
    pub fn can_enclose(self, child: ElementKind) -> bool {
        use ElementKind::*;
        match child {
            Module => false,
            Package => self == Module,
            Class | Interface | Enum | AnnotationType | Record => {
                self == Package || self.is_type_element() || self.is_executable()
            }
            EnumConstant => self == Enum,
            RecordComponent => self == Record,
            Field | Method | Constructor | StaticInit | InstanceInit => self.is_type_element(),
            Parameter => matches!(self, Method | Constructor),
            LocalVariable | ExceptionParameter | ResourceVariable | BindingVariable => {
                self.is_executable()
            }
            TypeParameter => self.is_type_element() || matches!(self, Method | Constructor),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Declaration modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Default,
    Static,
    Sealed,
    NonSealed,
    Final,
    Transient,
    Volatile,
    Synchronized,
    Native,
    Strictfp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestingKind {
    TopLevel,
    Member,
    Local,
    Anonymous,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enclosure_table_rejects_cross_kind_pairs() {
        assert!(ElementKind::Package.can_enclose(ElementKind::Class));
        assert!(ElementKind::Class.can_enclose(ElementKind::Method));
        assert!(ElementKind::Method.can_enclose(ElementKind::TypeParameter));
        assert!(!ElementKind::Field.can_enclose(ElementKind::TypeParameter));
        assert!(!ElementKind::Package.can_enclose(ElementKind::Method));
        assert!(!ElementKind::Class.can_enclose(ElementKind::Package));
        assert!(!ElementKind::Class.can_enclose(ElementKind::RecordComponent));
    }

    #[test]
    fn boxed_names_cover_every_primitive() {
        for kind in TypeKind::PRIMITIVES {
            assert!(kind.boxed_class_name().is_some(), "{kind} has no box");
            assert!(kind.is_value_type());
        }
        assert_eq!(TypeKind::Declared.boxed_class_name(), None);
    }
}
