use fedconf_value::{AttrPath, BridgeError, DynamicValue, TypeDescriptor};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Converts one configuration shape between its dynamic form and its wire record.
///
/// Implementors provide the path-aware `*_at` conversions; [`Assembler::to_wire`]
/// and [`Assembler::from_wire`] root them at the assembler's own attribute and
/// wrap any failure with the assembler's name.
pub trait Assembler {
    type Wire: Serialize + DeserializeOwned;

    /// Attribute name this shape is configured under.
    fn name(&self) -> &'static str;

    fn descriptor(&self) -> &'static TypeDescriptor;

    /// `Ok(None)` means the wire record omits the field.
    fn to_wire_at(
        &self,
        value: &DynamicValue,
        path: &AttrPath,
    ) -> Result<Option<Self::Wire>, BridgeError>;

    fn from_wire_at(
        &self,
        wire: Option<&Self::Wire>,
        path: &AttrPath,
    ) -> Result<DynamicValue, BridgeError>;

    fn to_wire(&self, value: &DynamicValue) -> Result<Option<Self::Wire>, BridgeError> {
        let path = AttrPath::attribute(self.name());
        check_descriptor(self.descriptor(), value, &path)
            .and_then(|()| self.to_wire_at(value, &path))
            .map_err(|err| err.in_assembler(self.name()))
    }

    fn from_wire(&self, wire: Option<&Self::Wire>) -> Result<DynamicValue, BridgeError> {
        self.from_wire_at(wire, &AttrPath::attribute(self.name()))
            .map_err(|err| err.in_assembler(self.name()))
    }
}

pub(crate) fn check_descriptor(
    expected: &TypeDescriptor,
    value: &DynamicValue,
    path: &AttrPath,
) -> Result<(), BridgeError> {
    if value.descriptor() == expected {
        return Ok(());
    }
    Err(BridgeError::shape_mismatch(
        path.clone(),
        format!("{} shaped like {}", expected.kind_name(), path),
        format!("{} of another shape", value.descriptor().kind_name()),
    ))
}
