use std::sync::Arc;
use std::thread;

use nova_lang_model::{
    ElementId, MemorySource, TypeAndElementSource, TypeId, Visitors,
};

use pretty_assertions::assert_eq;

const THREADS: usize = 8;

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
fn one_session_answers_the_same_from_every_thread() {
    let source = Arc::new(MemorySource::with_minimal_jdk().unwrap());
    let lazy_names = [
        "java.lang.Integer",
        "java.util.ArrayList",
        "java.lang.String",
        "java.lang.Number",
    ];
    let lazy: Vec<ElementId> = lazy_names
        .iter()
        .map(|name| source.lazy_type_element(name))
        .collect();
    let v = Visitors::new(source.clone());

    let string = declared(&v, "java.lang.String", &[]);
    let integer = declared(&v, "java.lang.Integer", &[]);
    let list_string = declared(&v, "java.util.List", &[string]);
    let array_list_string = declared(&v, "java.util.ArrayList", &[string]);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let v = &v;
                let lazy = &lazy;
                scope.spawn(move || {
                    let resolved: Vec<ElementId> = lazy
                        .iter()
                        .map(|e| v.model().resolve_element(*e).unwrap())
                        .collect();
                    let closure = names(v, &v.closure(integer).unwrap());
                    let subtype = v.is_subtype(array_list_string, list_string).unwrap();
                    let not_subtype = v.is_subtype(list_string, array_list_string).unwrap();
                    (resolved, closure, subtype, not_subtype)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let expected_elements: Vec<ElementId> = lazy_names
        .iter()
        .map(|name| element(&v, name))
        .collect();
    let expected_closure = vec![
        "java.lang.Integer",
        "java.lang.Number",
        "java.io.Serializable",
        "java.lang.Comparable",
        "java.lang.constant.Constable",
        "java.lang.constant.ConstantDesc",
        "java.lang.Object",
    ];
    for (resolved, closure, subtype, not_subtype) in results {
        assert_eq!(resolved, expected_elements);
        assert_eq!(closure, expected_closure);
        assert!(subtype);
        assert!(!not_subtype);
    }
}

#[test]
fn concurrent_closures_share_one_cache_entry() {
    let source = Arc::new(MemorySource::with_minimal_jdk().unwrap());
    let v = Visitors::new(source);
    let string = declared(&v, "java.lang.String", &[]);
    let array_list_string = declared(&v, "java.util.ArrayList", &[string]);

    let closures: Vec<Vec<TypeId>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| scope.spawn(|| v.closure(array_list_string).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let settled = v.closure(array_list_string).unwrap();
    assert_eq!(settled.len(), 7);
    for closure in closures {
        assert_eq!(names(&v, &closure), names(&v, &settled));
    }
}
