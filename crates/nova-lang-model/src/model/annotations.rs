use super::{ElementId, TypeId};

/// A compile-time constant, as carried by constant variables and annotation members.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

/// The value of an annotation member.
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationValue {
    Constant(ConstantValue),
    /// A class literal.
    Type(TypeId),
    EnumConstant(ElementId),
    Annotation(Box<AnnotationMirror>),
    Array(Vec<AnnotationValue>),
}

/// An annotation applied to a type or an element.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationMirror {
    pub annotation_type: TypeId,
    pub values: Vec<(String, AnnotationValue)>,
}

impl AnnotationMirror {
    pub fn marker(annotation_type: TypeId) -> Self {
        Self {
            annotation_type,
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.values.push((name.into(), value));
        self
    }

    pub fn value(&self, name: &str) -> Option<&AnnotationValue> {
        self.values
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, value)| value)
    }
}
