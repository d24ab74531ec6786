//! Type descriptors and declared shapes.
//!
//! A [`TypeDescriptor`] is built once per logical attribute shape and then
//! only read. Clones share the same allocation; equality is structural, so two
//! descriptors built independently from the same [`Shape`] compare equal.

use crate::error::BridgeError;
use crate::path::AttrPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    String,
    Bool,
    Int64,
    Float64,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
        }
    }
}

/// Recursive shape of a [`crate::DynamicValue`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor(Arc<DescriptorKind>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DescriptorKind {
    Scalar(ScalarKind),
    Object(BTreeMap<String, TypeDescriptor>),
    List(TypeDescriptor),
    Set(TypeDescriptor),
    Map(TypeDescriptor),
}

impl TypeDescriptor {
    fn new(kind: DescriptorKind) -> Self {
        Self(Arc::new(kind))
    }

    pub fn scalar(kind: ScalarKind) -> Self {
        Self::new(DescriptorKind::Scalar(kind))
    }

    pub fn string() -> Self {
        Self::scalar(ScalarKind::String)
    }

    pub fn bool() -> Self {
        Self::scalar(ScalarKind::Bool)
    }

    pub fn int64() -> Self {
        Self::scalar(ScalarKind::Int64)
    }

    pub fn float64() -> Self {
        Self::scalar(ScalarKind::Float64)
    }

    pub fn list(element: TypeDescriptor) -> Self {
        Self::new(DescriptorKind::List(element))
    }

    pub fn set(element: TypeDescriptor) -> Self {
        Self::new(DescriptorKind::Set(element))
    }

    pub fn map(element: TypeDescriptor) -> Self {
        Self::new(DescriptorKind::Map(element))
    }

    pub fn object<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, TypeDescriptor)>,
        K: Into<String>,
    {
        Self::new(DescriptorKind::Object(
            attributes.into_iter().map(|(name, descriptor)| (name.into(), descriptor)).collect(),
        ))
    }

    pub fn kind(&self) -> &DescriptorKind {
        &self.0
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind() {
            DescriptorKind::Scalar(kind) => kind.name(),
            DescriptorKind::Object(_) => "object",
            DescriptorKind::List(_) => "list",
            DescriptorKind::Set(_) => "set",
            DescriptorKind::Map(_) => "map",
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind(), DescriptorKind::Object(_))
    }

    /// Declared attributes when this describes an object.
    pub fn attributes(&self) -> Option<&BTreeMap<String, TypeDescriptor>> {
        match self.kind() {
            DescriptorKind::Object(attributes) => Some(attributes),
            _ => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&TypeDescriptor> {
        self.attributes().and_then(|attributes| attributes.get(name))
    }

    /// Element descriptor of a list, set or map.
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self.kind() {
            DescriptorKind::List(element)
            | DescriptorKind::Set(element)
            | DescriptorKind::Map(element) => Some(element),
            _ => None,
        }
    }

    /// Returns a new object descriptor with `name` added or replaced.
    pub fn with_attribute(
        &self,
        name: impl Into<String>,
        descriptor: TypeDescriptor,
    ) -> Result<Self, BridgeError> {
        let mut attributes = self.object_attributes()?.clone();
        attributes.insert(name.into(), descriptor);
        Ok(Self::new(DescriptorKind::Object(attributes)))
    }

    /// Returns a new object descriptor without `name`.
    pub fn without_attribute(&self, name: &str) -> Result<Self, BridgeError> {
        let mut attributes = self.object_attributes()?.clone();
        attributes.remove(name);
        Ok(Self::new(DescriptorKind::Object(attributes)))
    }

    fn object_attributes(&self) -> Result<&BTreeMap<String, TypeDescriptor>, BridgeError> {
        self.attributes().ok_or_else(|| {
            BridgeError::shape_mismatch(AttrPath::root(), "object", self.kind_name())
        })
    }
}

/// A declared configuration shape, as written by a resource schema.
///
/// Shapes are plain data so resource schemas can live in JSON or TOML:
///
/// ```toml
/// kind = "object"
/// [attributes.id]
/// kind = "string"
/// [attributes.location]
/// kind = "string"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    String,
    Bool,
    Int64,
    Float64,
    List { element: Box<Shape> },
    Set { element: Box<Shape> },
    Map { element: Box<Shape> },
    Object { attributes: BTreeMap<String, Shape> },
}

/// Builds the descriptor for a declared shape.
pub fn describe(shape: &Shape) -> TypeDescriptor {
    match shape {
        Shape::String => TypeDescriptor::string(),
        Shape::Bool => TypeDescriptor::bool(),
        Shape::Int64 => TypeDescriptor::int64(),
        Shape::Float64 => TypeDescriptor::float64(),
        Shape::List { element } => TypeDescriptor::list(describe(element)),
        Shape::Set { element } => TypeDescriptor::set(describe(element)),
        Shape::Map { element } => TypeDescriptor::map(describe(element)),
        Shape::Object { attributes } => TypeDescriptor::object(
            attributes.iter().map(|(name, shape)| (name.clone(), describe(shape))),
        ),
    }
}
