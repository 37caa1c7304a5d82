use std::sync::Arc;

use nova_lang_model::{
    ElementId, LangError, MemorySource, TypeAndElementSource, TypeId, TypeKind, Visitors,
};

use pretty_assertions::assert_eq;

fn session() -> Visitors {
    let source = Arc::new(MemorySource::with_minimal_jdk().unwrap());
    Visitors::new(source)
}

fn element(v: &Visitors, name: &str) -> ElementId {
    v.type_element(name).unwrap().unwrap_or_else(|| panic!("{name} must exist"))
}

fn declared(v: &Visitors, name: &str, args: &[TypeId]) -> TypeId {
    v.source().declared_type(element(v, name), args).unwrap()
}

fn name_of(v: &Visitors, ty: TypeId) -> String {
    let model = v.model();
    let element = model.defining_element(ty).unwrap().unwrap();
    model.qualified_name(element).unwrap()
}

#[test]
fn erasure_strips_arguments_and_is_idempotent() {
    let v = session();
    let string = declared(&v, "java.lang.String", &[]);
    let list_string = declared(&v, "java.util.List", &[string]);

    let erased = v.erasure(list_string).unwrap();
    assert!(v.model().is_erased(erased).unwrap());
    assert!(v.model().type_arguments(erased).unwrap().is_empty());
    assert!(v.is_raw(erased).unwrap());

    let again = v.erasure(erased).unwrap();
    assert_eq!(again, erased);
    assert!(v.is_same_type(again, erased).unwrap());
}

#[test]
fn erasure_of_type_variable_is_erasure_of_its_bound() {
    let v = session();
    let list = element(&v, "java.util.List");
    let e = v.model().type_parameters(list).unwrap()[0];
    let e_type = v.model().element_type(e).unwrap().unwrap();
    let erased = v.erasure(e_type).unwrap();
    assert_eq!(erased, v.object_type().unwrap());

    // `E extends Enum<E>` erases to the raw `Enum`.
    let enum_ = element(&v, "java.lang.Enum");
    let enum_e = v.model().type_parameters(enum_).unwrap()[0];
    let enum_e_type = v.model().element_type(enum_e).unwrap().unwrap();
    let erased = v.erasure(enum_e_type).unwrap();
    assert_eq!(name_of(&v, erased), "java.lang.Enum");
    assert!(v.is_raw(erased).unwrap());
}

#[test]
fn erasure_of_arrays_and_non_generic_types() {
    let v = session();
    let model = v.model();
    let string = declared(&v, "java.lang.String", &[]);
    assert_eq!(v.erasure(string).unwrap(), string);

    let strings = model.array_type(string).unwrap();
    assert_eq!(v.erasure(strings).unwrap(), strings);

    let lists = model
        .array_type(declared(&v, "java.util.List", &[string]))
        .unwrap();
    let erased = v.erasure(lists).unwrap();
    assert_eq!(model.type_kind(erased).unwrap(), TypeKind::Array);
    let component = model.component_type(erased).unwrap().unwrap();
    assert!(model.is_erased(component).unwrap());

    let int = model.primitive_type(TypeKind::Int).unwrap();
    assert_eq!(v.erasure(int).unwrap(), int);
}

#[test]
fn erasure_rejects_wildcards() {
    let v = session();
    let wildcard = v.model().wildcard_type(None, None).unwrap();
    assert_eq!(
        v.erasure(wildcard),
        Err(LangError::UnsupportedRelation {
            relation: "erasure",
            kind: TypeKind::Wildcard,
        })
    );
}

#[test]
fn direct_supertypes_of_object_and_plain_interfaces_are_empty() {
    let v = session();
    let object = v.object_type().unwrap();
    assert!(v.direct_supertypes(object).unwrap().is_empty());

    let serializable = declared(&v, "java.io.Serializable", &[]);
    assert!(v.direct_supertypes(serializable).unwrap().is_empty());
}

#[test]
fn direct_supertypes_substitute_type_arguments() {
    let v = session();
    let string = declared(&v, "java.lang.String", &[]);
    let array_list = declared(&v, "java.util.ArrayList", &[string]);

    let supertypes = v.direct_supertypes(array_list).unwrap();
    let names: Vec<_> = supertypes.iter().map(|ty| name_of(&v, *ty)).collect();
    assert_eq!(
        names,
        vec![
            "java.lang.Object",
            "java.util.List",
            "java.lang.Cloneable",
            "java.io.Serializable",
        ]
    );
    let list_string = declared(&v, "java.util.List", &[string]);
    assert!(v.is_same_type(supertypes[1], list_string).unwrap());
}

#[test]
fn supertype_is_superclass_only() {
    let v = session();
    let integer = declared(&v, "java.lang.Integer", &[]);
    let number = v.supertype(integer).unwrap();
    assert_eq!(name_of(&v, number), "java.lang.Number");
    assert_eq!(name_of(&v, v.supertype(number).unwrap()), "java.lang.Object");

    let object = v.object_type().unwrap();
    let none = v.supertype(object).unwrap();
    assert_eq!(v.model().type_kind(none).unwrap(), TypeKind::None);

    let comparable = element(&v, "java.lang.Comparable");
    let comparable_type = v.model().element_type(comparable).unwrap().unwrap();
    let none = v.supertype(comparable_type).unwrap();
    assert_eq!(v.model().type_kind(none).unwrap(), TypeKind::None);
}

#[test]
fn direct_supertypes_of_primitive_is_unsupported() {
    let v = session();
    let int = v.model().primitive_type(TypeKind::Int).unwrap();
    assert_eq!(
        v.direct_supertypes(int),
        Err(LangError::UnsupportedRelation {
            relation: "direct_supertypes",
            kind: TypeKind::Int,
        })
    );
}

#[test]
fn array_direct_supertypes() {
    let v = session();
    let model = v.model();
    let ints = model
        .array_type(model.primitive_type(TypeKind::Int).unwrap())
        .unwrap();
    let names: Vec<_> = v
        .direct_supertypes(ints)
        .unwrap()
        .into_iter()
        .map(|ty| name_of(&v, ty))
        .collect();
    assert_eq!(
        names,
        vec!["java.lang.Object", "java.lang.Cloneable", "java.io.Serializable"]
    );

    let integers = model.array_type(declared(&v, "java.lang.Integer", &[])).unwrap();
    let supertypes = v.direct_supertypes(integers).unwrap();
    assert_eq!(supertypes.len(), 4);
    let number = model.component_type(supertypes[0]).unwrap().unwrap();
    assert_eq!(name_of(&v, number), "java.lang.Number");
}

#[test]
fn as_super_finds_parameterized_supertype() {
    let v = session();
    let string = declared(&v, "java.lang.String", &[]);
    let array_list = declared(&v, "java.util.ArrayList", &[string]);
    let collection = element(&v, "java.util.Collection");

    let found = v.as_super(array_list, collection).unwrap().unwrap();
    let expected = declared(&v, "java.util.Collection", &[string]);
    assert!(v.is_same_type(found, expected).unwrap());

    let map = element(&v, "java.util.Map");
    assert_eq!(v.as_super(array_list, map).unwrap(), None);
}

#[test]
fn as_super_of_raw_type_returns_it_unchanged() {
    let v = session();
    let list = element(&v, "java.util.List");
    let raw = declared(&v, "java.util.List", &[]);
    assert!(v.is_raw(raw).unwrap());
    assert_eq!(v.as_super(raw, list).unwrap(), Some(raw));
}

#[test]
fn interfaces_reach_object_through_as_super() {
    let v = session();
    let object = element(&v, "java.lang.Object");
    let char_sequence = declared(&v, "java.lang.CharSequence", &[]);
    assert_eq!(
        v.as_super(char_sequence, object).unwrap(),
        Some(v.object_type().unwrap())
    );
}

#[test]
fn raw_supertypes_are_erased() {
    let v = session();
    let raw = declared(&v, "java.util.ArrayList", &[]);
    let interfaces = v.interfaces(raw).unwrap();
    assert_eq!(name_of(&v, interfaces[0]), "java.util.List");
    assert!(v.is_raw(interfaces[0]).unwrap());
}
