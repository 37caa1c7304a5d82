//! Element nodes and their builder surface.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;

use super::write_once::{AppendOnly, WriteOnce};
use super::{AnnotationMirror, AnnotationValue, ConstantValue, ElementId, Model, TypeData, TypeId};
use crate::equality::Equality;
use crate::kind::{ElementKind, Modifier, NestingKind, TypeKind};
use crate::{LangError, Result};

pub(crate) struct ElementNode {
    pub(crate) kind: ElementKind,
    pub(crate) name: WriteOnce<String>,
    pub(crate) ty: WriteOnce<TypeId>,
    pub(crate) modifiers: RwLock<BTreeSet<Modifier>>,
    pub(crate) enclosing: WriteOnce<ElementId>,
    pub(crate) enclosed: AppendOnly<ElementId>,
    pub(crate) annotations: AppendOnly<AnnotationMirror>,
    pub(crate) data: ElementData,
}

pub(crate) enum ElementData {
    Module,
    Package,
    Type(TypeElementData),
    Executable(ExecutableElementData),
    Variable(VariableElementData),
    TypeParameter,
    RecordComponent(RecordComponentData),
}

pub(crate) struct TypeElementData {
    pub(crate) nesting: WriteOnce<NestingKind>,
    pub(crate) superclass: WriteOnce<TypeId>,
    pub(crate) interfaces: AppendOnly<TypeId>,
    pub(crate) permitted: AppendOnly<TypeId>,
    pub(crate) type_parameters: AppendOnly<ElementId>,
}

pub(crate) struct ExecutableElementData {
    pub(crate) parameters: AppendOnly<ElementId>,
    pub(crate) type_parameters: AppendOnly<ElementId>,
    pub(crate) varargs: WriteOnce<bool>,
    pub(crate) default: WriteOnce<bool>,
    pub(crate) default_value: WriteOnce<AnnotationValue>,
}

pub(crate) struct VariableElementData {
    pub(crate) constant: WriteOnce<ConstantValue>,
}

pub(crate) struct RecordComponentData {
    pub(crate) accessor: WriteOnce<ElementId>,
}

impl ElementNode {
    fn new(kind: ElementKind) -> Self {
        let data = match kind {
            ElementKind::Module => ElementData::Module,
            ElementKind::Package => ElementData::Package,
            ElementKind::TypeParameter => ElementData::TypeParameter,
            ElementKind::RecordComponent => ElementData::RecordComponent(RecordComponentData {
                accessor: WriteOnce::new("accessor"),
            }),
            k if k.is_type_element() => ElementData::Type(TypeElementData {
                nesting: WriteOnce::new("nesting kind"),
                superclass: WriteOnce::new("superclass"),
                interfaces: AppendOnly::new(),
                permitted: AppendOnly::new(),
                type_parameters: AppendOnly::new(),
            }),
            k if k.is_executable() => ElementData::Executable(ExecutableElementData {
                parameters: AppendOnly::new(),
                type_parameters: AppendOnly::new(),
                varargs: WriteOnce::new("varargs"),
                default: WriteOnce::new("default"),
                default_value: WriteOnce::new("default value"),
            }),
            _ => ElementData::Variable(VariableElementData {
                constant: WriteOnce::new("constant value"),
            }),
        };
        Self {
            kind,
            name: WriteOnce::new("simple name"),
            ty: WriteOnce::new("type"),
            modifiers: RwLock::new(BTreeSet::new()),
            enclosing: WriteOnce::new("enclosing element"),
            enclosed: AppendOnly::new(),
            annotations: AppendOnly::new(),
            data,
        }
    }
}

/// Element constructors and write-once mutators.
impl Model {
    pub fn new_element(&self, kind: ElementKind) -> ElementId {
        self.alloc_element(ElementNode::new(kind))
    }

    pub fn new_named_element(&self, kind: ElementKind, name: impl Into<String>) -> Result<ElementId> {
        let element = self.new_element(kind);
        self.set_simple_name(element, name)?;
        Ok(element)
    }

    /// Set the simple name. Packages and modules carry their fully qualified name here.
    pub fn set_simple_name(&self, element: ElementId, name: impl Into<String>) -> Result<()> {
        self.element_node(element)?.name.set(name.into())
    }

    /// Set the element's type (`asType`). Declared and type-variable types are linked back to
    /// the element, so `element.as_type().defining_element() == element`.
    pub fn set_element_type(&self, element: ElementId, ty: TypeId) -> Result<()> {
        let node = self.element_node(element)?;
        if let Some(ty_kind) = self.peek_type_node(ty).map(|n| n.kind) {
            let ok = match node.kind {
                k if k.is_type_element() => ty_kind.is_declared_like(),
                ElementKind::TypeParameter => ty_kind == TypeKind::TypeVar,
                k if k.is_executable() => ty_kind == TypeKind::Executable,
                ElementKind::Package => ty_kind == TypeKind::Package,
                ElementKind::Module => ty_kind == TypeKind::Module,
                _ => ty_kind.is_primitive() || (ty_kind.is_reference() && ty_kind != TypeKind::Null),
            };
            if !ok {
                return Err(LangError::IllegalTypeKind {
                    operation: "set_element_type",
                    kind: ty_kind,
                });
            }
        }
        // The back-link is validated first so a failure leaves both sides untouched.
        let links_back = node.kind.is_type_element() || node.kind == ElementKind::TypeParameter;
        let element = self.resolve_element(element)?;
        if links_back {
            self.check_defining_element_link(ty, element)?;
        }
        node.ty.set(ty)?;
        if links_back {
            self.link_defining_element(ty, element)?;
        }
        Ok(())
    }

    pub fn add_modifier(&self, element: ElementId, modifier: Modifier) -> Result<()> {
        self.element_node(element)?.modifiers.write().insert(modifier);
        Ok(())
    }

    pub fn add_element_annotation(&self, element: ElementId, annotation: AnnotationMirror) -> Result<()> {
        self.element_node(element)?.annotations.push(annotation);
        Ok(())
    }

    /// Add `child` to `parent`'s enclosed elements and point `child` back at `parent`.
    ///
    /// This is the only way the enclosing edge of a member is set, so both directions always
    /// agree. Type parameters and executable parameters use [`Model::add_type_parameter`] and
    /// [`Model::add_parameter`] instead.
    pub fn add_enclosed_element(&self, parent: ElementId, child: ElementId) -> Result<()> {
        let parent = self.resolve_element(parent)?;
        let child = self.resolve_element(child)?;
        let child_kind = self.element_kind(child)?;
        if matches!(child_kind, ElementKind::TypeParameter | ElementKind::Parameter) {
            return Err(LangError::IllegalElementKind {
                operation: "add_enclosed_element",
                kind: child_kind,
            });
        }
        self.link_enclosing(parent, child)?;
        self.element_node(parent)?
            .enclosed
            .push_unique(child, |existing| *existing == child);
        Ok(())
    }

    pub fn set_nesting_kind(&self, element: ElementId, nesting: NestingKind) -> Result<()> {
        self.type_element_data(element, "set_nesting_kind", |data| data.nesting.set(nesting))
    }

    pub fn set_superclass(&self, element: ElementId, superclass: TypeId) -> Result<()> {
        self.check_declared_or_none("set_superclass", superclass)?;
        self.type_element_data(element, "set_superclass", |data| data.superclass.set(superclass))
    }

    pub fn add_interface(&self, element: ElementId, interface: TypeId) -> Result<()> {
        self.check_declared_or_none("add_interface", interface)?;
        self.type_element_data(element, "add_interface", |data| {
            data.interfaces.push(interface);
            Ok(())
        })
    }

    pub fn add_permitted_subclass(&self, element: ElementId, subclass: TypeId) -> Result<()> {
        self.check_declared_or_none("add_permitted_subclass", subclass)?;
        self.type_element_data(element, "add_permitted_subclass", |data| {
            data.permitted.push(subclass);
            Ok(())
        })
    }

    /// Declare `parameter` as a type parameter of the generic element `generic` (a type or an
    /// executable). The parameter's enclosing element becomes `generic`; a type parameter can
    /// only ever belong to one generic element.
    pub fn add_type_parameter(&self, generic: ElementId, parameter: ElementId) -> Result<()> {
        let generic = self.resolve_element(generic)?;
        let parameter = self.resolve_element(parameter)?;
        let parameter_kind = self.element_kind(parameter)?;
        if parameter_kind != ElementKind::TypeParameter {
            return Err(LangError::IllegalElementKind {
                operation: "add_type_parameter",
                kind: parameter_kind,
            });
        }
        self.link_enclosing(generic, parameter)?;
        let node = self.element_node(generic)?;
        let list = match &node.data {
            ElementData::Type(data) => &data.type_parameters,
            ElementData::Executable(data) => &data.type_parameters,
            _ => {
                return Err(LangError::IllegalElementKind {
                    operation: "add_type_parameter",
                    kind: node.kind,
                })
            }
        };
        list.push_unique(parameter, |existing| *existing == parameter);
        Ok(())
    }

    /// Append a formal parameter to a method or constructor.
    pub fn add_parameter(&self, executable: ElementId, parameter: ElementId) -> Result<()> {
        let executable = self.resolve_element(executable)?;
        let parameter = self.resolve_element(parameter)?;
        let parameter_kind = self.element_kind(parameter)?;
        if parameter_kind != ElementKind::Parameter {
            return Err(LangError::IllegalElementKind {
                operation: "add_parameter",
                kind: parameter_kind,
            });
        }
        self.link_enclosing(executable, parameter)?;
        self.executable_element_data(executable, "add_parameter", |data| {
            data.parameters
                .push_unique(parameter, |existing| *existing == parameter);
            Ok(())
        })
    }

    pub fn set_varargs(&self, executable: ElementId, varargs: bool) -> Result<()> {
        self.executable_element_data(executable, "set_varargs", |data| data.varargs.set(varargs))
    }

    pub fn set_default(&self, executable: ElementId, default: bool) -> Result<()> {
        self.executable_element_data(executable, "set_default", |data| data.default.set(default))
    }

    pub fn set_default_value(&self, executable: ElementId, value: AnnotationValue) -> Result<()> {
        self.executable_element_data(executable, "set_default_value", |data| {
            data.default_value.set(value)
        })
    }

    pub fn set_constant_value(&self, variable: ElementId, value: ConstantValue) -> Result<()> {
        let node = self.element_node(variable)?;
        let ElementData::Variable(data) = &node.data else {
            return Err(LangError::IllegalElementKind {
                operation: "set_constant_value",
                kind: node.kind,
            });
        };
        data.constant.set(value)
    }

    /// Set a record component's accessor method.
    ///
    /// The accessor must be a public, non-static, zero-argument method with the component's
    /// name and a return type equal to the component's type.
    pub fn set_accessor(&self, component: ElementId, accessor: ElementId) -> Result<()> {
        let node = self.element_node(component)?;
        let ElementData::RecordComponent(data) = &node.data else {
            return Err(LangError::IllegalElementKind {
                operation: "set_accessor",
                kind: node.kind,
            });
        };
        let method = self.element_node(accessor)?;
        if method.kind != ElementKind::Method {
            return Err(LangError::InvalidRecordAccessor {
                reason: "accessor must be a method",
            });
        }
        {
            let modifiers = method.modifiers.read();
            if !modifiers.contains(&Modifier::Public) {
                return Err(LangError::InvalidRecordAccessor {
                    reason: "accessor must be public",
                });
            }
            if modifiers.contains(&Modifier::Static) {
                return Err(LangError::InvalidRecordAccessor {
                    reason: "accessor must not be static",
                });
            }
        }
        if let ElementData::Executable(exec) = &method.data {
            if !exec.parameters.is_empty() {
                return Err(LangError::InvalidRecordAccessor {
                    reason: "accessor must not take parameters",
                });
            }
        }
        if node.name.get() != method.name.get() {
            return Err(LangError::InvalidRecordAccessor {
                reason: "accessor name must match the component name",
            });
        }
        let component_type = node.ty.get();
        let return_type = match method.ty.get() {
            Some(ty) => match &self.type_node(ty)?.data {
                TypeData::Executable(exec) => exec.return_type.get(),
                _ => None,
            },
            None => None,
        };
        match (component_type, return_type) {
            (Some(expected), Some(actual))
                if Equality::default().types_equal(self, expected, actual)? => {}
            _ => {
                return Err(LangError::InvalidRecordAccessor {
                    reason: "accessor return type must match the component type",
                })
            }
        }
        if let (Some(record), Some(owner)) = (node.enclosing.get(), method.enclosing.get()) {
            if self.resolve_element(record)? != self.resolve_element(owner)? {
                return Err(LangError::InvalidRecordAccessor {
                    reason: "accessor must be declared by the component's record",
                });
            }
        }
        data.accessor.set(accessor)
    }

    /// Qualified name: packages and modules carry it as their name; nested types are
    /// `Outer.Inner`; local and anonymous types, and non-type elements, use the simple name.
    pub fn qualified_name(&self, element: ElementId) -> Result<String> {
        let node = self.element_node(element)?;
        let name = node.name.get().unwrap_or_default();
        if !node.kind.is_type_element() {
            return Ok(name);
        }
        let Some(enclosing) = node.enclosing.get() else {
            return Ok(name);
        };
        let enclosing_kind = self.element_kind(enclosing)?;
        if enclosing_kind == ElementKind::Package || enclosing_kind.is_type_element() {
            let prefix = self.qualified_name(enclosing)?;
            if prefix.is_empty() {
                return Ok(name);
            }
            return Ok(format!("{prefix}.{name}"));
        }
        Ok(name)
    }

    fn link_enclosing(&self, parent: ElementId, child: ElementId) -> Result<()> {
        let parent_kind = self.element_kind(parent)?;
        let child_kind = self.element_kind(child)?;
        if !parent_kind.can_enclose(child_kind) {
            return Err(LangError::InvalidEnclosure {
                enclosing: parent_kind,
                enclosed: child_kind,
            });
        }
        self.element_node(child)?.enclosing.set(parent)
    }

    fn check_declared_or_none(&self, operation: &'static str, ty: TypeId) -> Result<()> {
        match self.peek_type_node(ty).map(|n| n.kind) {
            Some(kind) if !(kind.is_declared_like() || kind == TypeKind::None) => {
                Err(LangError::IllegalTypeKind { operation, kind })
            }
            _ => Ok(()),
        }
    }

    fn type_element_data(
        &self,
        element: ElementId,
        operation: &'static str,
        f: impl FnOnce(&TypeElementData) -> Result<()>,
    ) -> Result<()> {
        let node: Arc<ElementNode> = self.element_node(element)?;
        match &node.data {
            ElementData::Type(data) => f(data),
            _ => Err(LangError::IllegalElementKind {
                operation,
                kind: node.kind,
            }),
        }
    }

    fn executable_element_data(
        &self,
        element: ElementId,
        operation: &'static str,
        f: impl FnOnce(&ExecutableElementData) -> Result<()>,
    ) -> Result<()> {
        let node = self.element_node(element)?;
        match &node.data {
            ElementData::Executable(data) => f(data),
            _ => Err(LangError::IllegalElementKind {
                operation,
                kind: node.kind,
            }),
        }
    }
}
