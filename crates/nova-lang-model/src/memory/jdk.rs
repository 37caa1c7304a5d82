use super::MemorySource;
use crate::kind::{ElementKind, Modifier, TypeKind};
use crate::model::{ElementId, TypeId};
use crate::source::TypeAndElementSource;
use crate::Result;

impl MemorySource {
    /// A source preloaded with the `java.base` declarations the relations rely on:
    /// `Object`, `String`, the boxed primitives, `Number`, `Comparable`, `Cloneable`,
    /// `Serializable`, `Constable`/`ConstantDesc`, the core collection interfaces, `Enum`,
    /// `Record` and `Annotation`.
    pub fn with_minimal_jdk() -> Result<Self> {
        let source = Self::new();
        source.bootstrap_jdk()?;
        tracing::debug!(
            target: "nova.lang_model",
            elements = source.model.element_count(),
            types = source.model.type_count(),
            "bootstrapped minimal JDK"
        );
        Ok(source)
    }

    fn bootstrap_jdk(&self) -> Result<()> {
        let model = &self.model;
        let java_base = self.module("java.base")?;
        let lang = self.package(Some(java_base), "java.lang")?;
        let io = self.package(Some(java_base), "java.io")?;
        let util = self.package(Some(java_base), "java.util")?;
        let constant = self.package(Some(java_base), "java.lang.constant")?;
        let annotation = self.package(Some(java_base), "java.lang.annotation")?;

        let int = model.primitive_type(TypeKind::Int)?;
        let boolean = model.primitive_type(TypeKind::Boolean)?;

        let object = self.declare_class(lang, "Object", &[])?;
        let object_type = self.type_of(object)?;

        // `Number` is declared before `java.io` is populated.
        let serializable_ref = self.lazy_declared_type("java.io.Serializable", Vec::new());

        let serializable = self.declare_interface(io, "Serializable", &[])?;
        let serializable_type = self.type_of(serializable)?;
        let cloneable = self.declare_interface(lang, "Cloneable", &[])?;
        let cloneable_type = self.type_of(cloneable)?;
        let char_sequence = self.declare_interface(lang, "CharSequence", &[])?;
        let char_sequence_type = self.type_of(char_sequence)?;
        let constable = self.type_of(self.declare_interface(constant, "Constable", &[])?)?;
        let constant_desc = self.type_of(self.declare_interface(constant, "ConstantDesc", &[])?)?;
        self.declare_interface(annotation, "Annotation", &[])?;

        let comparable = self.declare_interface(lang, "Comparable", &["T"])?;
        let comparable_t = self.type_variable(comparable, "T")?;
        self.declare_method(comparable, "compareTo", int, &[("o", comparable_t)])?;

        let iterable = self.declare_interface(lang, "Iterable", &["T"])?;
        let collection = self.declare_interface(util, "Collection", &["E"])?;
        let collection_e = self.type_variable(collection, "E")?;
        model.add_interface(collection, self.declared_type(iterable, &[collection_e])?)?;
        self.declare_method(collection, "add", boolean, &[("e", collection_e)])?;
        self.declare_method(collection, "size", int, &[])?;

        let list = self.declare_interface(util, "List", &["E"])?;
        let list_e = self.type_variable(list, "E")?;
        model.add_interface(list, self.declared_type(collection, &[list_e])?)?;
        self.declare_method(list, "get", list_e, &[("index", int)])?;
        self.declare_method(list, "add", boolean, &[("e", list_e)])?;

        let array_list = self.declare_class(util, "ArrayList", &["E"])?;
        let array_list_e = self.type_variable(array_list, "E")?;
        model.set_superclass(array_list, object_type)?;
        model.add_interface(array_list, self.declared_type(list, &[array_list_e])?)?;
        model.add_interface(array_list, cloneable_type)?;
        model.add_interface(array_list, serializable_type)?;

        let map = self.declare_interface(util, "Map", &["K", "V"])?;
        let map_k = self.type_variable(map, "K")?;
        let map_v = self.type_variable(map, "V")?;
        self.declare_method(map, "get", map_v, &[("key", object_type)])?;
        self.declare_method(map, "put", map_v, &[("key", map_k), ("value", map_v)])?;

        let number = self.declare_class(lang, "Number", &[])?;
        model.add_modifier(number, Modifier::Abstract)?;
        model.set_superclass(number, object_type)?;
        model.add_interface(number, serializable_ref)?;
        let number_type = self.type_of(number)?;
        self.declare_method(number, "intValue", int, &[])?;

        let string = self.declare_final_class(lang, "String", object_type)?;
        let string_type = self.type_of(string)?;
        self.implement_comparable(string, comparable)?;
        for interface in [serializable_type, char_sequence_type, constable, constant_desc] {
            model.add_interface(string, interface)?;
        }
        self.declare_method(string, "length", int, &[])?;
        self.declare_method(char_sequence, "length", int, &[])?;
        self.declare_method(object, "toString", string_type, &[])?;
        self.declare_method(object, "equals", boolean, &[("obj", object_type)])?;

        // Boxed primitives.
        for name in ["Integer", "Long", "Float", "Double"] {
            let boxed = self.declare_final_class(lang, name, number_type)?;
            self.implement_comparable(boxed, comparable)?;
            model.add_interface(boxed, constable)?;
            model.add_interface(boxed, constant_desc)?;
        }
        for name in ["Byte", "Short"] {
            let boxed = self.declare_final_class(lang, name, number_type)?;
            self.implement_comparable(boxed, comparable)?;
            model.add_interface(boxed, constable)?;
        }
        for name in ["Character", "Boolean"] {
            let boxed = self.declare_final_class(lang, name, object_type)?;
            model.add_interface(boxed, serializable_type)?;
            self.implement_comparable(boxed, comparable)?;
            model.add_interface(boxed, constable)?;
        }
        self.declare_final_class(lang, "Void", object_type)?;

        let enum_ = self.declare_class(lang, "Enum", &["E"])?;
        let enum_e = self.type_variable(enum_, "E")?;
        self.set_bounds(enum_e, &[self.declared_type(enum_, &[enum_e])?])?;
        model.add_modifier(enum_, Modifier::Abstract)?;
        model.set_superclass(enum_, object_type)?;
        model.add_interface(enum_, self.declared_type(comparable, &[enum_e])?)?;
        model.add_interface(enum_, serializable_type)?;
        model.add_interface(enum_, constable)?;
        self.declare_method(enum_, "name", string_type, &[])?;
        self.declare_method(enum_, "ordinal", int, &[])?;

        let record = self.declare_class(lang, "Record", &[])?;
        model.add_modifier(record, Modifier::Abstract)?;
        model.set_superclass(record, object_type)?;

        Ok(())
    }

    fn declare_final_class(
        &self,
        package: ElementId,
        name: &str,
        superclass: TypeId,
    ) -> Result<ElementId> {
        let class = self.declare_type(ElementKind::Class, package, name, &[])?;
        self.model.add_modifier(class, Modifier::Final)?;
        self.model.set_superclass(class, superclass)?;
        Ok(class)
    }

    /// `class C implements Comparable<C>`.
    fn implement_comparable(&self, class: ElementId, comparable: ElementId) -> Result<()> {
        let own = self.type_of(class)?;
        let interface = self.declared_type(comparable, &[own])?;
        self.model.add_interface(class, interface)
    }
}
