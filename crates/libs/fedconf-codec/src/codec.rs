//! Conversion between [`DynamicValue`] trees and JSON documents.
//!
//! Encoding is the write direction (configuration to wire record), decoding
//! the read direction. `Unknown` never reaches the wire. `Null` object
//! attributes are omitted unless the caller asks for legacy explicit nulls;
//! `Null` map entries and collection elements are always written as `null`.

use crate::case::KeyCase;
use fedconf_value::{
    AttrPath, BridgeError, DescriptorKind, DynamicValue, Payload, Scalar, ScalarKind,
    TypeDescriptor, ValueState,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Render `Null` object attributes as explicit `null` instead of omitting them.
    pub legacy_mode: bool,
    pub key_case: KeyCase,
}

impl EncodeOptions {
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn legacy() -> Self {
        Self { legacy_mode: true, ..Self::default() }
    }

    pub fn with_key_case(self, key_case: KeyCase) -> Self {
        Self { key_case, ..self }
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions { key_case: self.key_case }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub key_case: KeyCase,
}

/// Encodes `value`; `Ok(None)` means the field is omitted from its parent.
pub fn encode(
    value: &DynamicValue,
    options: EncodeOptions,
) -> Result<Option<JsonValue>, BridgeError> {
    encode_at(value, options, &AttrPath::root())
}

/// Like [`encode`], reporting errors below `path`.
pub fn encode_at(
    value: &DynamicValue,
    options: EncodeOptions,
    path: &AttrPath,
) -> Result<Option<JsonValue>, BridgeError> {
    match value.state() {
        ValueState::Unknown => Ok(None),
        ValueState::Null => Ok(options.legacy_mode.then_some(JsonValue::Null)),
        ValueState::Known(payload) => encode_payload(payload, options, path).map(Some),
    }
}

fn encode_payload(
    payload: &Payload,
    options: EncodeOptions,
    path: &AttrPath,
) -> Result<JsonValue, BridgeError> {
    match payload {
        Payload::Scalar(scalar) => encode_scalar(scalar, path),
        Payload::Object(attributes) => {
            let mut object = JsonMap::new();
            let mut claimed = BTreeMap::new();
            for (name, attribute) in attributes {
                let child = path.child(name.as_str());
                let key = options.key_case.wire_key(name);
                if let Some(first) = claimed.insert(key.clone(), name) {
                    return Err(BridgeError::encode(
                        child,
                        format!("wire key `{key}` is already used by `{first}`"),
                    ));
                }
                if let Some(json) = encode_at(attribute, options, &child)? {
                    object.insert(key, json);
                }
            }
            Ok(JsonValue::Object(object))
        }
        Payload::Map(entries) => {
            let mut object = JsonMap::new();
            for (key, entry) in entries {
                let json = match entry.state() {
                    ValueState::Unknown => continue,
                    ValueState::Null => JsonValue::Null,
                    ValueState::Known(element) => {
                        encode_payload(element, options, &path.key(key.as_str()))?
                    }
                };
                object.insert(key.clone(), json);
            }
            Ok(JsonValue::Object(object))
        }
        Payload::List(items) | Payload::Set(items) => {
            let mut array = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match item.state() {
                    ValueState::Unknown => {}
                    ValueState::Null => array.push(JsonValue::Null),
                    ValueState::Known(element) => {
                        array.push(encode_payload(element, options, &path.index(index))?);
                    }
                }
            }
            Ok(JsonValue::Array(array))
        }
    }
}

fn encode_scalar(scalar: &Scalar, path: &AttrPath) -> Result<JsonValue, BridgeError> {
    Ok(match scalar {
        Scalar::String(value) => JsonValue::String(value.clone()),
        Scalar::Bool(value) => JsonValue::Bool(*value),
        Scalar::Int64(value) => JsonValue::Number((*value).into()),
        Scalar::Float64(value) => Number::from_f64(*value).map(JsonValue::Number).ok_or_else(|| {
            BridgeError::encode(path.clone(), format!("{value} has no JSON representation"))
        })?,
    })
}

/// Decodes `doc` against `descriptor` with camelCase keys.
pub fn decode(doc: &JsonValue, descriptor: &TypeDescriptor) -> Result<DynamicValue, BridgeError> {
    decode_at(doc, descriptor, DecodeOptions::default(), &AttrPath::root())
}

/// Decodes `doc`, which sits at `path` inside a larger document.
///
/// JSON `null` decodes to `Null`. Object attributes missing from the document
/// decode to `Null` as well, and document keys the descriptor does not declare
/// are ignored.
pub fn decode_at(
    doc: &JsonValue,
    descriptor: &TypeDescriptor,
    options: DecodeOptions,
    path: &AttrPath,
) -> Result<DynamicValue, BridgeError> {
    if doc.is_null() {
        return Ok(DynamicValue::null(descriptor.clone()));
    }
    match descriptor.kind() {
        DescriptorKind::Scalar(kind) => decode_scalar(doc, *kind, path),
        DescriptorKind::Object(declared) => {
            let object = expect_object(doc, path)?;
            let mut attributes = BTreeMap::new();
            let mut consumed = Vec::with_capacity(declared.len());
            for (name, attribute) in declared {
                let key = options.key_case.wire_key(name);
                let child = path.child(name.as_str());
                let value = match object.get(&key) {
                    Some(json) => decode_at(json, attribute, options, &child)?,
                    None => DynamicValue::null(attribute.clone()),
                };
                attributes.insert(name.clone(), value);
                consumed.push(key);
            }
            for key in object.keys().filter(|key| !consumed.contains(key)) {
                log::trace!("ignoring undeclared key {key} at {path}");
            }
            DynamicValue::object(descriptor.clone(), attributes).map_err(|err| err.under(path))
        }
        DescriptorKind::Map(element) => {
            let object = expect_object(doc, path)?;
            let mut entries = BTreeMap::new();
            for (key, json) in object {
                let value = decode_at(json, element, options, &path.key(key.as_str()))?;
                entries.insert(key.clone(), value);
            }
            DynamicValue::map(element.clone(), entries).map_err(|err| err.under(path))
        }
        DescriptorKind::List(element) => {
            let items = decode_elements(doc, element, options, path)?;
            DynamicValue::list(element.clone(), items).map_err(|err| err.under(path))
        }
        DescriptorKind::Set(element) => {
            let items = decode_elements(doc, element, options, path)?;
            DynamicValue::set(element.clone(), items).map_err(|err| err.under(path))
        }
    }
}

fn decode_elements(
    doc: &JsonValue,
    element: &TypeDescriptor,
    options: DecodeOptions,
    path: &AttrPath,
) -> Result<Vec<DynamicValue>, BridgeError> {
    let JsonValue::Array(array) = doc else {
        return Err(type_mismatch(path, "array", doc));
    };
    array
        .iter()
        .enumerate()
        .map(|(index, json)| decode_at(json, element, options, &path.index(index)))
        .collect()
}

fn decode_scalar(
    doc: &JsonValue,
    kind: ScalarKind,
    path: &AttrPath,
) -> Result<DynamicValue, BridgeError> {
    match (kind, doc) {
        (ScalarKind::String, JsonValue::String(value)) => Ok(DynamicValue::string(value.as_str())),
        (ScalarKind::Bool, JsonValue::Bool(value)) => Ok(DynamicValue::bool(*value)),
        (ScalarKind::Int64, JsonValue::Number(number)) => match number.as_i64() {
            Some(value) => Ok(DynamicValue::int64(value)),
            None if number.is_u64() => {
                Err(BridgeError::decode(path.clone(), format!("{number} is out of int64 range")))
            }
            None => Err(BridgeError::decode(path.clone(), format!("{number} is not an integer"))),
        },
        (ScalarKind::Float64, JsonValue::Number(number)) => match number.as_f64() {
            Some(value) => Ok(DynamicValue::float64(value)),
            None => Err(BridgeError::decode(path.clone(), format!("{number} is not a float64"))),
        },
        (kind, doc) => Err(type_mismatch(path, kind.name(), doc)),
    }
}

fn expect_object<'a>(
    doc: &'a JsonValue,
    path: &AttrPath,
) -> Result<&'a JsonMap<String, JsonValue>, BridgeError> {
    match doc {
        JsonValue::Object(object) => Ok(object),
        other => Err(type_mismatch(path, "object", other)),
    }
}

fn type_mismatch(path: &AttrPath, expected: &str, found: &JsonValue) -> BridgeError {
    BridgeError::decode(path.clone(), format!("expected {expected}, found {}", json_kind(found)))
}

fn json_kind(doc: &JsonValue) -> &'static str {
    match doc {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Encodes `value` and deserializes the result into a typed wire record.
///
/// Returns `Ok(None)` when the value is absent from the wire altogether.
pub fn to_record<T: DeserializeOwned>(
    value: &DynamicValue,
    options: EncodeOptions,
    path: &AttrPath,
) -> Result<Option<T>, BridgeError> {
    match encode_at(value, options, path)? {
        None | Some(JsonValue::Null) => Ok(None),
        Some(doc) => serde_json::from_value(doc).map(Some).map_err(|err| {
            BridgeError::encode(path.clone(), format!("cannot build wire record: {err}"))
        }),
    }
}

/// Serializes a typed wire record and decodes it against `descriptor`.
pub fn from_record<T: Serialize>(
    record: &T,
    descriptor: &TypeDescriptor,
    options: DecodeOptions,
    path: &AttrPath,
) -> Result<DynamicValue, BridgeError> {
    let doc = serde_json::to_value(record).map_err(|err| {
        BridgeError::decode(path.clone(), format!("cannot read wire record: {err}"))
    })?;
    decode_at(&doc, descriptor, options, path)
}
