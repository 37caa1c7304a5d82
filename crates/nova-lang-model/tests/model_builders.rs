use std::sync::Arc;

use nova_lang_model::model::{AnnotationMirror, AnnotationValue, ConstantValue};
use nova_lang_model::{
    Delegates, ElementKind, Equality, LangError, MemorySource, Model, Modifier,
    TypeAndElementSource, TypeKind, Visitors,
};

use pretty_assertions::assert_eq;

fn conflict(field: &'static str) -> LangError {
    LangError::WriteOnceConflict { field }
}

#[test]
fn write_once_fields_accept_the_same_value_and_reject_a_different_one() {
    let model = Model::new();
    let int = model.primitive_type(TypeKind::Int).unwrap();
    let long = model.primitive_type(TypeKind::Long).unwrap();

    // Array.
    let array = model.new_array_type();
    model.set_component_type(array, int).unwrap();
    model.set_component_type(array, int).unwrap();
    assert_eq!(model.set_component_type(array, long), Err(conflict("component type")));

    // Executable.
    let executable = model.new_executable_type();
    model.set_return_type(executable, int).unwrap();
    model.set_return_type(executable, int).unwrap();
    assert_eq!(model.set_return_type(executable, long), Err(conflict("return type")));

    // Wildcard.
    let string = model.new_declared_type();
    let number = model.new_declared_type();
    let wildcard = model.new_wildcard_type();
    model.set_extends_bound(wildcard, string).unwrap();
    model.set_extends_bound(wildcard, string).unwrap();
    assert_eq!(model.set_extends_bound(wildcard, number), Err(conflict("extends bound")));

    // Type variable.
    let variable = model.new_type_variable();
    model.set_upper_bound(variable, string).unwrap();
    model.set_upper_bound(variable, string).unwrap();
    assert_eq!(model.set_upper_bound(variable, number), Err(conflict("upper bound")));

    // Declared.
    let class = model.new_named_element(ElementKind::Class, "A").unwrap();
    let other = model.new_named_element(ElementKind::Class, "B").unwrap();
    let declared = model.new_declared_type();
    model.set_defining_element(declared, class).unwrap();
    model.set_defining_element(declared, class).unwrap();
    assert_eq!(model.set_defining_element(declared, other), Err(conflict("element")));

    // Elements.
    model.set_simple_name(class, "A").unwrap();
    assert_eq!(model.set_simple_name(class, "C"), Err(conflict("simple name")));
    let field = model.new_named_element(ElementKind::Field, "f").unwrap();
    model
        .set_constant_value(field, ConstantValue::Int(1))
        .unwrap();
    model
        .set_constant_value(field, ConstantValue::Int(1))
        .unwrap();
    assert_eq!(
        model.set_constant_value(field, ConstantValue::Int(2)),
        Err(conflict("constant value"))
    );
}

#[test]
fn failed_back_link_leaves_the_element_untyped() {
    let model = Model::new();
    let a = model.new_named_element(ElementKind::Class, "A").unwrap();
    let b = model.new_named_element(ElementKind::Class, "B").unwrap();
    let ty = model.declared_type(None, a, &[]).unwrap();
    model.set_element_type(a, ty).unwrap();

    // `ty` already belongs to `a`, so `b` cannot claim it.
    assert_eq!(model.set_element_type(b, ty), Err(conflict("element")));
    assert_eq!(model.element_type(b).unwrap(), None);
    assert_eq!(model.defining_element(ty).unwrap(), Some(a));
    assert_eq!(model.element_type(a).unwrap(), Some(ty));

    let own = model.new_declared_type();
    model.set_element_type(b, own).unwrap();
    assert_eq!(model.element_type(b).unwrap(), Some(own));
    assert_eq!(model.defining_element(own).unwrap(), Some(b));
}

#[test]
fn conflicting_element_type_does_not_link_the_new_type() {
    let model = Model::new();
    let a = model.new_named_element(ElementKind::Class, "A").unwrap();
    let first = model.new_declared_type();
    let second = model.new_declared_type();
    model.set_element_type(a, first).unwrap();

    assert_eq!(model.set_element_type(a, second), Err(conflict("type")));
    assert_eq!(model.defining_element(second).unwrap(), None);
}

#[test]
fn flyweights_and_error_types_are_immutable() {
    let model = Model::new();
    let int = model.primitive_type(TypeKind::Int).unwrap();
    let marker = AnnotationMirror::marker(model.new_declared_type());
    assert_eq!(
        model.add_type_annotation(int, marker),
        Err(LangError::Immutable { kind: TypeKind::Int })
    );

    let error = model.new_error_type(None);
    let class = model.new_named_element(ElementKind::Class, "A").unwrap();
    assert_eq!(
        model.set_defining_element(error, class),
        Err(LangError::Immutable {
            kind: TypeKind::Error
        })
    );
}

#[test]
fn construction_rejects_self_references_and_wrong_kinds() {
    let model = Model::new();
    let array = model.new_array_type();
    assert_eq!(
        model.set_component_type(array, array),
        Err(LangError::SelfReference {
            field: "component type"
        })
    );

    let declared = model.new_declared_type();
    let void = model.void_type();
    assert!(matches!(
        model.add_type_argument(declared, void),
        Err(LangError::IllegalTypeKind { .. })
    ));
    assert!(matches!(
        model.set_upper_bound(array, declared),
        Err(LangError::IllegalTypeKind { .. })
    ));

    model.set_erased(declared, true).unwrap();
    let argument = model.new_declared_type();
    assert_eq!(model.add_type_argument(declared, argument), Err(LangError::Erased));
}

#[test]
fn enclosure_follows_the_kind_table() {
    let source = MemorySource::new();
    let model = source.model();
    let package = source.package(None, "p").unwrap();
    let field = model.new_named_element(ElementKind::Field, "f").unwrap();
    assert_eq!(
        model.add_enclosed_element(package, field),
        Err(LangError::InvalidEnclosure {
            enclosing: ElementKind::Package,
            enclosed: ElementKind::Field,
        })
    );

    let class = source.declare_class(package, "A", &[]).unwrap();
    model.add_enclosed_element(class, field).unwrap();
    assert_eq!(model.enclosing_element(field).unwrap(), Some(class));
    assert_eq!(model.enclosed_elements(class).unwrap(), vec![field]);

    // A member has one enclosing element.
    let other = source.declare_class(package, "B", &[]).unwrap();
    assert_eq!(
        model.add_enclosed_element(other, field),
        Err(conflict("enclosing element"))
    );
}

#[test]
fn qualified_names_of_nested_types() {
    let source = MemorySource::new();
    let package = source.package(None, "com.example").unwrap();
    let outer = source.declare_class(package, "Outer", &[]).unwrap();
    let inner = source.declare_interface(outer, "Inner", &[]).unwrap();
    assert_eq!(
        source.model().qualified_name(inner).unwrap(),
        "com.example.Outer.Inner"
    );
    assert_eq!(
        source.type_element("com.example.Outer.Inner").unwrap(),
        Some(inner)
    );
}

#[test]
fn record_components_get_validated_accessors() {
    let source = MemorySource::with_minimal_jdk().unwrap();
    let model = source.model();
    let package = source.package(None, "com.example").unwrap();
    let point = source
        .declare_type(ElementKind::Record, package, "Point", &[])
        .unwrap();
    let int = model.primitive_type(TypeKind::Int).unwrap();

    let x = source.declare_record_component(point, "x", int).unwrap();
    let accessor = model.accessor(x).unwrap().unwrap();
    assert_eq!(model.simple_name(accessor).unwrap(), "x");
    assert_eq!(model.record_components(point).unwrap(), vec![x]);

    // A static method cannot be an accessor.
    let y = model.new_named_element(ElementKind::RecordComponent, "y").unwrap();
    model.set_element_type(y, int).unwrap();
    model.add_enclosed_element(point, y).unwrap();
    let bad = source.declare_method(point, "y", int, &[]).unwrap();
    model.add_modifier(bad, Modifier::Static).unwrap();
    assert_eq!(
        model.set_accessor(y, bad),
        Err(LangError::InvalidRecordAccessor {
            reason: "accessor must not be static"
        })
    );

    // Nor can a method whose name differs from the component.
    let z = model.new_named_element(ElementKind::RecordComponent, "z").unwrap();
    model.set_element_type(z, int).unwrap();
    model.add_enclosed_element(point, z).unwrap();
    let wrong_name = source.declare_method(point, "notZ", int, &[]).unwrap();
    assert_eq!(
        model.set_accessor(z, wrong_name),
        Err(LangError::InvalidRecordAccessor {
            reason: "accessor name must match the component name"
        })
    );
}

#[test]
fn element_properties_round_through_the_builder() {
    let source = MemorySource::with_minimal_jdk().unwrap();
    let model = source.model();
    let package = source.package(None, "com.example").unwrap();
    let annotation = source
        .declare_type(ElementKind::AnnotationType, package, "Marker", &[])
        .unwrap();
    let value = source
        .declare_method(annotation, "value", model.primitive_type(TypeKind::Int).unwrap(), &[])
        .unwrap();
    model
        .set_default_value(value, AnnotationValue::Constant(ConstantValue::Int(7)))
        .unwrap();
    assert_eq!(
        model.default_value(value).unwrap(),
        Some(AnnotationValue::Constant(ConstantValue::Int(7)))
    );

    let class = source.declare_class(package, "Annotated", &[]).unwrap();
    let marker = AnnotationMirror::marker(source.type_of(annotation).unwrap());
    model.add_element_annotation(class, marker.clone()).unwrap();
    assert_eq!(model.element_annotations(class).unwrap(), vec![marker]);
    assert!(model.has_modifier(class, Modifier::Public).unwrap());
}

#[test]
fn delegating_wrappers_complete_lazily() {
    let source = Arc::new(MemorySource::with_minimal_jdk().unwrap());
    let lazy = source.lazy_declared_type("java.lang.String", Vec::new());
    let visitors = Visitors::new(source.clone());
    let delegates = visitors.delegates();

    let wrapped = delegates.ty(lazy);
    assert!(!wrapped.is_completed());
    assert_eq!(wrapped.kind().unwrap(), TypeKind::Declared);
    assert!(wrapped.is_completed());

    let string = source.type_element("java.lang.String").unwrap().unwrap();
    let element = wrapped.defining_element().unwrap().unwrap();
    assert_eq!(element.qualified_name().unwrap(), "java.lang.String");
    assert_eq!(element, delegates.element(string));

    let own = delegates.ty(source.type_of(string).unwrap());
    assert_eq!(wrapped, own);
    assert_eq!(wrapped.component_type().unwrap().kind().unwrap(), TypeKind::None);
}

#[test]
fn equality_policy_can_include_annotations() {
    let model = Model::new();
    let class = model.new_named_element(ElementKind::Class, "A").unwrap();
    let annotation_type = model.new_declared_type();
    let plain = model.declared_type(None, class, &[]).unwrap();
    let annotated = model.declared_type(None, class, &[]).unwrap();
    model
        .add_type_annotation(annotated, AnnotationMirror::marker(annotation_type))
        .unwrap();

    assert!(Equality::IGNORING_ANNOTATIONS
        .types_equal(&model, plain, annotated)
        .unwrap());
    assert!(!Equality::INCLUDING_ANNOTATIONS
        .types_equal(&model, plain, annotated)
        .unwrap());

    let ignoring = Delegates::new(&model, Equality::IGNORING_ANNOTATIONS);
    assert_eq!(ignoring.ty(plain), ignoring.ty(annotated));
    let including = Delegates::new(&model, Equality::INCLUDING_ANNOTATIONS);
    assert_ne!(including.ty(plain), including.ty(annotated));
}
