use std::sync::Arc;

use nova_lang_model::{
    Adaptation, ElementId, LangError, MemorySource, TypeAndElementSource, TypeId, TypeKind, Visitors,
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

fn own_type(v: &Visitors, name: &str) -> TypeId {
    v.model().element_type(element(v, name)).unwrap().unwrap()
}

fn member(v: &Visitors, owner: &str, name: &str) -> ElementId {
    let model = v.model();
    model
        .enclosed_elements(element(v, owner))
        .unwrap()
        .into_iter()
        .find(|e| model.simple_name(*e).unwrap() == name)
        .unwrap_or_else(|| panic!("{owner}.{name} must exist"))
}

#[test]
fn capture_is_a_no_op_without_wildcards() {
    let v = session();
    let string = declared(&v, "java.lang.String", &[]);
    let list_string = declared(&v, "java.util.List", &[string]);
    let raw_list = declared(&v, "java.util.List", &[]);

    assert_eq!(v.capture(list_string).unwrap(), list_string);
    assert_eq!(v.capture(raw_list).unwrap(), raw_list);
    assert_eq!(v.capture(string).unwrap(), string);

    let twice = v.capture(v.capture(list_string).unwrap()).unwrap();
    assert!(v.is_same_type(twice, list_string).unwrap());
}

#[test]
fn capture_mints_fresh_variables() {
    let v = session();
    let model = v.model();
    let wildcard = model.wildcard_type(None, None).unwrap();
    let list_wildcard = declared(&v, "java.util.List", &[wildcard]);

    let first = v.capture(list_wildcard).unwrap();
    let second = v.capture(list_wildcard).unwrap();
    let a = model.type_arguments(first).unwrap()[0];
    let b = model.type_arguments(second).unwrap()[0];

    assert_eq!(model.type_kind(a).unwrap(), TypeKind::TypeVar);
    assert_ne!(a, b);
    assert_eq!(model.captured_wildcard(a).unwrap(), Some(wildcard));
    assert_eq!(model.upper_bound(a).unwrap(), Some(v.object_type().unwrap()));
    assert!(!v.is_same_type(first, second).unwrap());

    // Each capture is still contained by the wildcard it came from.
    assert!(v.contains(wildcard, a).unwrap());
    assert!(v.is_subtype(first, list_wildcard).unwrap());
}

#[test]
fn capture_bounds_follow_the_wildcard() {
    let v = session();
    let model = v.model();
    let number = declared(&v, "java.lang.Number", &[]);
    let integer = declared(&v, "java.lang.Integer", &[]);

    let extends_number = model.wildcard_type(Some(number), None).unwrap();
    let captured = v.capture(declared(&v, "java.util.List", &[extends_number])).unwrap();
    let var = model.type_arguments(captured).unwrap()[0];
    assert_eq!(model.upper_bound(var).unwrap(), Some(number));
    assert!(v.is_subtype(var, number).unwrap());

    let super_integer = model.wildcard_type(None, Some(integer)).unwrap();
    let captured = v.capture(declared(&v, "java.util.List", &[super_integer])).unwrap();
    let var = model.type_arguments(captured).unwrap()[0];
    assert_eq!(model.lower_bound(var).unwrap(), Some(integer));
    assert!(v.is_subtype(integer, var).unwrap());
}

#[test]
fn capture_uses_the_formal_bound() {
    let v = session();
    let model = v.model();
    let wildcard = model.wildcard_type(None, None).unwrap();
    let captured = v.capture(declared(&v, "java.lang.Enum", &[wildcard])).unwrap();
    let var = model.type_arguments(captured).unwrap()[0];

    // `Enum<?>` captures to `Enum<CAP>` with `CAP extends Enum<CAP>`.
    let bound = model.upper_bound(var).unwrap().unwrap();
    assert_eq!(model.defining_element(bound).unwrap(), Some(element(&v, "java.lang.Enum")));
    assert_eq!(model.type_arguments(bound).unwrap(), vec![var]);
}

#[test]
fn glb_of_related_and_unrelated_types() {
    let v = session();
    let number = declared(&v, "java.lang.Number", &[]);
    let integer = declared(&v, "java.lang.Integer", &[]);
    let char_sequence = declared(&v, "java.lang.CharSequence", &[]);

    assert_eq!(v.glb(integer, number).unwrap(), integer);
    assert_eq!(v.glb(number, integer).unwrap(), integer);

    let both = v.glb(char_sequence, number).unwrap();
    assert_eq!(v.model().type_kind(both).unwrap(), TypeKind::Intersection);
    assert_eq!(v.model().bounds(both).unwrap(), vec![number, char_sequence]);
}

#[test]
fn member_type_substitutes_the_declaring_type_arguments() {
    let v = session();
    let model = v.model();
    let string = declared(&v, "java.lang.String", &[]);
    let list_string = declared(&v, "java.util.List", &[string]);
    let get = member(&v, "java.util.List", "get");

    let method = v.member_type(list_string, get).unwrap();
    assert_eq!(model.type_kind(method).unwrap(), TypeKind::Executable);
    assert!(v.is_same_type(model.return_type(method).unwrap(), string).unwrap());
    assert_eq!(
        model.parameter_types(method).unwrap(),
        vec![model.primitive_type(TypeKind::Int).unwrap()]
    );
}

#[test]
fn member_type_through_an_inherited_supertype() {
    let v = session();
    let model = v.model();
    let integer = declared(&v, "java.lang.Integer", &[]);
    let array_list = declared(&v, "java.util.ArrayList", &[integer]);
    let add = member(&v, "java.util.Collection", "add");

    let method = v.member_type(array_list, add).unwrap();
    let parameters = model.parameter_types(method).unwrap();
    assert_eq!(parameters.len(), 1);
    assert!(v.is_same_type(parameters[0], integer).unwrap());
}

#[test]
fn member_type_of_raw_type_is_erased() {
    let v = session();
    let model = v.model();
    let raw_list = declared(&v, "java.util.List", &[]);
    let get = member(&v, "java.util.List", "get");

    let method = v.member_type(raw_list, get).unwrap();
    assert_eq!(model.return_type(method).unwrap(), v.object_type().unwrap());
}

#[test]
fn member_type_with_wildcard_argument_is_captured() {
    let v = session();
    let model = v.model();
    let number = declared(&v, "java.lang.Number", &[]);
    let extends_number = model.wildcard_type(Some(number), None).unwrap();
    let list = declared(&v, "java.util.List", &[extends_number]);
    let get = member(&v, "java.util.List", "get");

    let method = v.member_type(list, get).unwrap();
    let returned = model.return_type(method).unwrap();
    assert_eq!(model.type_kind(returned).unwrap(), TypeKind::TypeVar);
    assert!(v.is_subtype(returned, number).unwrap());
}

#[test]
fn adapt_maps_type_variables() {
    let v = session();
    let string = declared(&v, "java.lang.String", &[]);
    let integer = declared(&v, "java.lang.Integer", &[]);
    let map = own_type(&v, "java.util.Map");
    let map_string_integer = declared(&v, "java.util.Map", &[string, integer]);

    let adaptation = v.adapt(map, map_string_integer).unwrap();
    let parameters = v.model().type_arguments(map).unwrap();
    let [key, value] = parameters[..] else {
        panic!("Map has two type parameters");
    };
    assert_eq!(adaptation.get(key), Some(string));
    assert_eq!(adaptation.get(value), Some(integer));
    assert_eq!(adaptation.from.len(), 2);
}

#[test]
fn adapt_detects_conflicts() {
    let v = session();
    let string = declared(&v, "java.lang.String", &[]);
    let integer = declared(&v, "java.lang.Integer", &[]);
    let list = own_type(&v, "java.util.List");
    let e = v.model().type_arguments(list).unwrap()[0];

    let source = declared(&v, "java.util.Map", &[e, e]);
    let agreeing = declared(&v, "java.util.Map", &[string, string]);
    let conflicting = declared(&v, "java.util.Map", &[string, integer]);

    let adaptation = v.adapt(source, agreeing).unwrap();
    assert_eq!(adaptation.get(e), Some(string));
    assert_eq!(
        v.adapt(source, conflicting),
        Err(LangError::AdaptConflict { variable: e })
    );
}

#[test]
fn adapt_keeps_the_tighter_wildcard() {
    let v = session();
    let model = v.model();
    let number = declared(&v, "java.lang.Number", &[]);
    let integer = declared(&v, "java.lang.Integer", &[]);
    let list = own_type(&v, "java.util.List");
    let e = model.type_arguments(list).unwrap()[0];

    let extends_number = model.wildcard_type(Some(number), None).unwrap();
    let extends_integer = model.wildcard_type(Some(integer), None).unwrap();
    let source = declared(&v, "java.util.Map", &[e, e]);
    let target = declared(&v, "java.util.Map", &[extends_number, extends_integer]);

    let adaptation = v.adapt(source, target).unwrap();
    assert_eq!(adaptation.get(e), Some(extends_integer));
}

#[test]
fn subst_leaves_unrelated_types_untouched() {
    let v = session();
    let string = declared(&v, "java.lang.String", &[]);
    let list = own_type(&v, "java.util.List");
    let e = v.model().type_arguments(list).unwrap()[0];

    let substituted = v.subst(list, &[e], &[string]).unwrap();
    let list_string = declared(&v, "java.util.List", &[string]);
    assert!(v.is_same_type(substituted, list_string).unwrap());
    assert_eq!(v.subst(string, &[e], &[string]).unwrap(), string);
}

#[test]
fn adaptation_with_mismatched_lists_has_no_mapping() {
    let v = session();
    let list = own_type(&v, "java.util.List");
    let e = v.model().type_arguments(list).unwrap()[0];
    let string = declared(&v, "java.lang.String", &[]);

    let truncated = Adaptation {
        from: vec![string, e],
        to: vec![string],
    };
    assert_eq!(truncated.get(string), Some(string));
    assert_eq!(truncated.get(e), None);
}
