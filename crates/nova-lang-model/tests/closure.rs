use std::sync::Arc;

use nova_lang_model::{
    ClosureOrder, ElementId, LangError, MemorySource, TypeAndElementSource, TypeId, TypeKind,
    Visitors, VisitorsConfig,
};

use pretty_assertions::assert_eq;

fn session_with(config: VisitorsConfig) -> Visitors {
    let source = Arc::new(MemorySource::with_minimal_jdk().unwrap());
    Visitors::with_config(source, config)
}

fn session() -> Visitors {
    session_with(VisitorsConfig::default())
}

fn element(v: &Visitors, name: &str) -> ElementId {
    v.type_element(name).unwrap().unwrap_or_else(|| panic!("{name} must exist"))
}

fn declared(v: &Visitors, name: &str, args: &[TypeId]) -> TypeId {
    v.source().declared_type(element(v, name), args).unwrap()
}

fn names(v: &Visitors, types: &[TypeId]) -> Vec<String> {
    let model = v.model();
    types
        .iter()
        .map(|ty| {
            let element = model.defining_element(*ty).unwrap().unwrap();
            model.qualified_name(element).unwrap()
        })
        .collect()
}

#[test]
fn integer_closure_has_seven_entries_with_object_last() {
    let v = session();
    let integer = declared(&v, "java.lang.Integer", &[]);
    let closure = v.closure(integer).unwrap();
    assert_eq!(
        names(&v, &closure),
        vec![
            "java.lang.Integer",
            "java.lang.Number",
            "java.io.Serializable",
            "java.lang.Comparable",
            "java.lang.constant.Constable",
            "java.lang.constant.ConstantDesc",
            "java.lang.Object",
        ]
    );

    let comparable_integer = declared(&v, "java.lang.Comparable", &[integer]);
    assert!(v.is_same_type(closure[3], comparable_integer).unwrap());
}

#[test]
fn closure_is_cached_per_equal_type() {
    let v = session();
    let first = v.closure(declared(&v, "java.lang.Integer", &[])).unwrap();
    let second = v.closure(declared(&v, "java.lang.Integer", &[])).unwrap();
    assert_eq!(first, second);
}

#[test]
fn descending_name_order_flips_ties_only() {
    let v = session_with(VisitorsConfig {
        closure_order: ClosureOrder::NameDescending,
        ..VisitorsConfig::default()
    });
    let integer = declared(&v, "java.lang.Integer", &[]);
    let closure = v.closure(integer).unwrap();
    assert_eq!(
        names(&v, &closure),
        vec![
            "java.lang.Integer",
            "java.lang.Number",
            "java.lang.constant.ConstantDesc",
            "java.lang.constant.Constable",
            "java.lang.Comparable",
            "java.io.Serializable",
            "java.lang.Object",
        ]
    );
}

#[test]
fn closure_of_generic_type_merges_shared_supertypes() {
    let v = session();
    let string = declared(&v, "java.lang.String", &[]);
    let array_list = declared(&v, "java.util.ArrayList", &[string]);
    let closure = v.closure(array_list).unwrap();

    let names = names(&v, &closure);
    assert_eq!(names.first().map(String::as_str), Some("java.util.ArrayList"));
    assert_eq!(names.last().map(String::as_str), Some("java.lang.Object"));
    for expected in [
        "java.util.List",
        "java.util.Collection",
        "java.lang.Iterable",
        "java.lang.Cloneable",
        "java.io.Serializable",
    ] {
        assert_eq!(names.iter().filter(|n| *n == expected).count(), 1, "{expected}");
    }
    assert_eq!(names.len(), 7);
}

#[test]
fn rank_counts_levels_above_object() {
    let v = session();
    assert_eq!(v.rank(v.object_type().unwrap()).unwrap(), 0);
    assert_eq!(v.rank(declared(&v, "java.io.Serializable", &[])).unwrap(), 1);
    assert_eq!(v.rank(declared(&v, "java.lang.Number", &[])).unwrap(), 2);
    assert_eq!(v.rank(declared(&v, "java.lang.Integer", &[])).unwrap(), 3);
}

#[test]
fn precedes_orders_by_rank_then_name() {
    let v = session();
    let integer = declared(&v, "java.lang.Integer", &[]);
    let number = declared(&v, "java.lang.Number", &[]);
    let serializable = declared(&v, "java.io.Serializable", &[]);
    let cloneable = declared(&v, "java.lang.Cloneable", &[]);

    assert!(v.precedes(integer, number).unwrap());
    assert!(!v.precedes(number, integer).unwrap());
    assert!(v.precedes(serializable, cloneable).unwrap());
    assert!(!v.precedes(cloneable, serializable).unwrap());
}

#[test]
fn closure_insert_and_union_deduplicate() {
    let v = session();
    let object = v.object_type().unwrap();
    let number = declared(&v, "java.lang.Number", &[]);
    let serializable = declared(&v, "java.io.Serializable", &[]);

    let base = v.closure_insert(&[object], number).unwrap();
    assert_eq!(base, vec![number, object]);
    assert_eq!(v.closure_insert(&base, number).unwrap(), base);

    let merged = v.closure_union(&base, &[serializable, object]).unwrap();
    assert_eq!(merged, vec![number, serializable, object]);
}

#[test]
fn closure_of_primitive_is_unsupported() {
    let v = session();
    let int = v.model().primitive_type(TypeKind::Int).unwrap();
    assert_eq!(
        v.closure(int),
        Err(LangError::UnsupportedRelation {
            relation: "closure",
            kind: TypeKind::Int,
        })
    );
}
