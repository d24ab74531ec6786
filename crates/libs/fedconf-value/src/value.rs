use crate::descriptor::{DescriptorKind, ScalarKind, TypeDescriptor};
use crate::error::BridgeError;
use crate::path::AttrPath;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    String(String),
    Bool(bool),
    Int64(i64),
    Float64(f64),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::String(_) => ScalarKind::String,
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int64(_) => ScalarKind::Int64,
            Self::Float64(_) => ScalarKind::Float64,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Payload {
    Scalar(Scalar),
    Object(BTreeMap<String, DynamicValue>),
    List(Vec<DynamicValue>),
    /// Order carries no meaning; elements are unique.
    Set(Vec<DynamicValue>),
    Map(BTreeMap<String, DynamicValue>),
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(left), Self::Scalar(right)) => left == right,
            (Self::Object(left), Self::Object(right)) | (Self::Map(left), Self::Map(right)) => {
                left == right
            }
            (Self::List(left), Self::List(right)) => left == right,
            (Self::Set(left), Self::Set(right)) => {
                left.len() == right.len() && left.iter().all(|element| right.contains(element))
            }
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValueState {
    Null,
    /// Not yet known at planning time. Never produced from wire data.
    Unknown,
    Known(Payload),
}

/// A tri-state configuration value tied to its [`TypeDescriptor`].
///
/// Values are immutable once built. The checked constructors guarantee that a
/// known object holds exactly the attributes its descriptor declares and that
/// every collection element carries the declared element descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicValue {
    descriptor: TypeDescriptor,
    state: ValueState,
}

impl DynamicValue {
    pub fn null(descriptor: TypeDescriptor) -> Self {
        Self { descriptor, state: ValueState::Null }
    }

    pub fn unknown(descriptor: TypeDescriptor) -> Self {
        Self { descriptor, state: ValueState::Unknown }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::known_scalar(Scalar::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Self::known_scalar(Scalar::Bool(value))
    }

    pub fn int64(value: i64) -> Self {
        Self::known_scalar(Scalar::Int64(value))
    }

    pub fn float64(value: f64) -> Self {
        Self::known_scalar(Scalar::Float64(value))
    }

    fn known_scalar(scalar: Scalar) -> Self {
        Self {
            descriptor: TypeDescriptor::scalar(scalar.kind()),
            state: ValueState::Known(Payload::Scalar(scalar)),
        }
    }

    /// Known object; `attributes` must match the descriptor's declared names exactly.
    pub fn object<I, K>(descriptor: TypeDescriptor, attributes: I) -> Result<Self, BridgeError>
    where
        I: IntoIterator<Item = (K, DynamicValue)>,
        K: Into<String>,
    {
        let attributes: BTreeMap<String, DynamicValue> =
            attributes.into_iter().map(|(name, value)| (name.into(), value)).collect();
        let declared = descriptor.attributes().ok_or_else(|| {
            BridgeError::shape_mismatch(AttrPath::root(), descriptor.kind_name(), "object")
        })?;

        for (name, expected) in declared {
            let path = AttrPath::attribute(name.as_str());
            let value = attributes.get(name).ok_or_else(|| {
                BridgeError::shape_mismatch(path.clone(), "declared attribute", "missing")
            })?;
            check_descriptor(&path, expected, value)?;
        }
        if let Some(extra) = attributes.keys().find(|name| !declared.contains_key(*name)) {
            return Err(BridgeError::shape_mismatch(
                AttrPath::attribute(extra.as_str()),
                "no attribute",
                "undeclared attribute",
            ));
        }

        Ok(Self { descriptor, state: ValueState::Known(Payload::Object(attributes)) })
    }

    pub fn list(element: TypeDescriptor, items: Vec<DynamicValue>) -> Result<Self, BridgeError> {
        check_elements(&element, indexed(&items))?;
        Ok(Self {
            descriptor: TypeDescriptor::list(element),
            state: ValueState::Known(Payload::List(items)),
        })
    }

    /// Known set. Duplicate elements collapse to the first occurrence.
    pub fn set(element: TypeDescriptor, items: Vec<DynamicValue>) -> Result<Self, BridgeError> {
        check_elements(&element, indexed(&items))?;
        let mut unique: Vec<DynamicValue> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Ok(Self {
            descriptor: TypeDescriptor::set(element),
            state: ValueState::Known(Payload::Set(unique)),
        })
    }

    pub fn map<I, K>(element: TypeDescriptor, entries: I) -> Result<Self, BridgeError>
    where
        I: IntoIterator<Item = (K, DynamicValue)>,
        K: Into<String>,
    {
        let entries: BTreeMap<String, DynamicValue> =
            entries.into_iter().map(|(key, value)| (key.into(), value)).collect();
        check_elements(
            &element,
            entries.iter().map(|(key, value)| (AttrPath::root().key(key.as_str()), value)),
        )?;
        Ok(Self {
            descriptor: TypeDescriptor::map(element),
            state: ValueState::Known(Payload::Map(entries)),
        })
    }

    /// A fresh known empty value for `descriptor`.
    ///
    /// Collections are empty, objects have every attribute `Null`, scalars
    /// have no empty form and come back `Null`.
    pub fn empty(descriptor: &TypeDescriptor) -> Self {
        let payload = match descriptor.kind() {
            DescriptorKind::Scalar(_) => return Self::null(descriptor.clone()),
            DescriptorKind::Object(attributes) => Payload::Object(
                attributes
                    .iter()
                    .map(|(name, attribute)| (name.clone(), Self::null(attribute.clone())))
                    .collect(),
            ),
            DescriptorKind::List(_) => Payload::List(Vec::new()),
            DescriptorKind::Set(_) => Payload::Set(Vec::new()),
            DescriptorKind::Map(_) => Payload::Map(BTreeMap::new()),
        };
        Self { descriptor: descriptor.clone(), state: ValueState::Known(payload) }
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> &ValueState {
        &self.state
    }

    pub fn payload(&self) -> Option<&Payload> {
        match &self.state {
            ValueState::Known(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.state, ValueState::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.state, ValueState::Unknown)
    }

    pub fn is_known(&self) -> bool {
        matches!(self.state, ValueState::Known(_))
    }

    /// Known and not a zero-value placeholder.
    ///
    /// The only placeholder is a known object whose attributes are all null or
    /// unknown, which is what a host produces for a nested block the user never
    /// filled in. Known scalars and known collections, empty ones included, are
    /// always defined.
    pub fn is_defined(&self) -> bool {
        match &self.state {
            ValueState::Known(Payload::Object(attributes)) => {
                attributes.values().any(DynamicValue::is_known)
            }
            ValueState::Known(_) => true,
            ValueState::Null | ValueState::Unknown => false,
        }
    }

    /// Short description of what this value holds, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match &self.state {
            ValueState::Null => "null",
            ValueState::Unknown => "unknown",
            ValueState::Known(Payload::Scalar(scalar)) => scalar.kind().name(),
            ValueState::Known(Payload::Object(_)) => "object",
            ValueState::Known(Payload::List(_)) => "list",
            ValueState::Known(Payload::Set(_)) => "set",
            ValueState::Known(Payload::Map(_)) => "map",
        }
    }

    pub fn as_object(&self) -> Result<&BTreeMap<String, DynamicValue>, BridgeError> {
        match &self.state {
            ValueState::Known(Payload::Object(attributes)) => Ok(attributes),
            _ => Err(self.mismatch("object")),
        }
    }

    pub fn as_list(&self) -> Result<&[DynamicValue], BridgeError> {
        match &self.state {
            ValueState::Known(Payload::List(items)) => Ok(items),
            _ => Err(self.mismatch("list")),
        }
    }

    pub fn as_set(&self) -> Result<&[DynamicValue], BridgeError> {
        match &self.state {
            ValueState::Known(Payload::Set(items)) => Ok(items),
            _ => Err(self.mismatch("set")),
        }
    }

    pub fn as_map(&self) -> Result<&BTreeMap<String, DynamicValue>, BridgeError> {
        match &self.state {
            ValueState::Known(Payload::Map(entries)) => Ok(entries),
            _ => Err(self.mismatch("map")),
        }
    }

    pub fn as_scalar(&self) -> Result<&Scalar, BridgeError> {
        match &self.state {
            ValueState::Known(Payload::Scalar(scalar)) => Ok(scalar),
            _ => Err(self.mismatch("scalar")),
        }
    }

    pub fn as_str(&self) -> Result<&str, BridgeError> {
        match self.as_scalar() {
            Ok(Scalar::String(value)) => Ok(value),
            _ => Err(self.mismatch("string")),
        }
    }

    pub fn as_bool(&self) -> Result<bool, BridgeError> {
        match self.as_scalar() {
            Ok(Scalar::Bool(value)) => Ok(*value),
            _ => Err(self.mismatch("bool")),
        }
    }

    pub fn as_i64(&self) -> Result<i64, BridgeError> {
        match self.as_scalar() {
            Ok(Scalar::Int64(value)) => Ok(*value),
            _ => Err(self.mismatch("int64")),
        }
    }

    pub fn as_f64(&self) -> Result<f64, BridgeError> {
        match self.as_scalar() {
            Ok(Scalar::Float64(value)) => Ok(*value),
            _ => Err(self.mismatch("float64")),
        }
    }

    /// Looks up a declared attribute of a known object.
    pub fn attribute(&self, name: &str) -> Result<&DynamicValue, BridgeError> {
        self.as_object()?.get(name).ok_or_else(|| {
            BridgeError::shape_mismatch(AttrPath::attribute(name), "declared attribute", "missing")
        })
    }

    /// Returns a copy of this known object with one attribute replaced.
    pub fn with_attribute(&self, name: &str, value: DynamicValue) -> Result<Self, BridgeError> {
        let mut attributes = self.as_object()?.clone();
        let path = AttrPath::attribute(name);
        let expected = self.descriptor.attribute(name).ok_or_else(|| {
            BridgeError::shape_mismatch(path.clone(), "declared attribute", "undeclared attribute")
        })?;
        check_descriptor(&path, expected, &value)?;
        attributes.insert(name.to_string(), value);
        Ok(Self {
            descriptor: self.descriptor.clone(),
            state: ValueState::Known(Payload::Object(attributes)),
        })
    }

    fn mismatch(&self, expected: &str) -> BridgeError {
        BridgeError::shape_mismatch(AttrPath::root(), expected, self.kind_name())
    }
}

fn check_descriptor(
    path: &AttrPath,
    expected: &TypeDescriptor,
    value: &DynamicValue,
) -> Result<(), BridgeError> {
    if value.descriptor() == expected {
        return Ok(());
    }
    Err(BridgeError::shape_mismatch(
        path.clone(),
        format!("value described as {}", expected.kind_name()),
        format!("value described as {}", value.descriptor().kind_name()),
    ))
}

fn indexed(items: &[DynamicValue]) -> impl Iterator<Item = (AttrPath, &DynamicValue)> {
    items.iter().enumerate().map(|(index, item)| (AttrPath::root().index(index), item))
}

fn check_elements<'a>(
    element: &TypeDescriptor,
    items: impl Iterator<Item = (AttrPath, &'a DynamicValue)>,
) -> Result<(), BridgeError> {
    for (path, item) in items {
        check_descriptor(&path, element, item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_descriptor() -> TypeDescriptor {
        TypeDescriptor::object([
            ("type", TypeDescriptor::string()),
            ("id", TypeDescriptor::string()),
        ])
    }

    fn text_source() -> DynamicValue {
        DynamicValue::object(
            source_descriptor(),
            [
                ("type", DynamicValue::string("TEXT")),
                ("id", DynamicValue::null(TypeDescriptor::string())),
            ],
        )
        .expect("valid source")
    }

    #[test]
    fn object_requires_exactly_declared_attributes() {
        let missing =
            DynamicValue::object(source_descriptor(), [("type", DynamicValue::string("TEXT"))])
                .expect_err("id is declared");
        assert_eq!(missing.path().to_string(), "id");

        let extra = DynamicValue::object(
            source_descriptor(),
            [
                ("type", DynamicValue::string("TEXT")),
                ("id", DynamicValue::null(TypeDescriptor::string())),
                ("location", DynamicValue::string("https://example.test")),
            ],
        )
        .expect_err("location is not declared");
        assert_eq!(extra.path().to_string(), "location");
    }

    #[test]
    fn object_rejects_wrongly_described_attribute() {
        let err = DynamicValue::object(
            source_descriptor(),
            [
                ("type", DynamicValue::bool(true)),
                ("id", DynamicValue::null(TypeDescriptor::string())),
            ],
        )
        .expect_err("type is a string");
        assert!(matches!(err, BridgeError::ShapeMismatch { .. }));
    }

    #[test]
    fn accessors_fail_on_wrong_payload() {
        let value = text_source();
        assert!(value.as_object().is_ok());
        assert!(matches!(value.as_list(), Err(BridgeError::ShapeMismatch { .. })));
        assert_eq!(value.attribute("type").and_then(DynamicValue::as_str), Ok("TEXT"));
        assert!(value.attribute("id").expect("declared").as_str().is_err());
        assert!(DynamicValue::null(TypeDescriptor::bool()).as_bool().is_err());
    }

    #[test]
    fn placeholder_object_is_known_but_not_defined() {
        let placeholder = DynamicValue::empty(&source_descriptor());
        assert!(placeholder.is_known());
        assert!(!placeholder.is_defined());
        assert!(text_source().is_defined());
        assert!(DynamicValue::bool(false).is_defined());
        assert!(DynamicValue::string("").is_defined());
        assert!(!DynamicValue::unknown(TypeDescriptor::string()).is_defined());
    }

    #[test]
    fn empty_collections_are_known_and_distinct_from_null() {
        let element = TypeDescriptor::string();
        let empty = DynamicValue::empty(&TypeDescriptor::list(element.clone()));
        assert!(empty.is_defined());
        assert_eq!(empty.as_list().map(<[DynamicValue]>::len), Ok(0));
        assert_ne!(empty, DynamicValue::null(TypeDescriptor::list(element)));
    }

    #[test]
    fn set_equality_ignores_order_and_duplicates() {
        let element = TypeDescriptor::string();
        let left = DynamicValue::set(
            element.clone(),
            vec![
                DynamicValue::string("mail"),
                DynamicValue::string("cn"),
                DynamicValue::string("mail"),
            ],
        )
        .expect("valid set");
        let right = DynamicValue::set(
            element,
            vec![DynamicValue::string("cn"), DynamicValue::string("mail")],
        )
        .expect("valid set");
        assert_eq!(left, right);
        assert_eq!(left.as_set().map(<[DynamicValue]>::len), Ok(2));
    }

    #[test]
    fn list_rejects_foreign_element() {
        let err = DynamicValue::list(TypeDescriptor::string(), vec![DynamicValue::int64(3)])
            .expect_err("int64 is not a string");
        assert_eq!(err.path().to_string(), "[0]");
        assert!(matches!(err, BridgeError::ShapeMismatch { .. }));
    }

    #[test]
    fn with_attribute_replaces_one_attribute() {
        let updated = text_source()
            .with_attribute("id", DynamicValue::string("ds1"))
            .expect("declared attribute");
        assert_eq!(updated.attribute("id").and_then(DynamicValue::as_str), Ok("ds1"));
        assert_eq!(text_source().attribute("id").map(DynamicValue::is_null), Ok(true));
    }

    #[test]
    fn values_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DynamicValue>();
        assert_send_sync::<TypeDescriptor>();
    }
}
