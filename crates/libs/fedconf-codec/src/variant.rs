//! Discriminated unions expressed as one optional slot per variant.
//!
//! A union object declares one attribute per variant, e.g.
//! `ldap_attribute_source`, of which exactly one is defined. On the wire the
//! variant travels as a flat record tagged by its `type` field.

use crate::codec::{decode_at, encode_at, DecodeOptions, EncodeOptions};
use fedconf_value::{AttrPath, BridgeError, DynamicValue, TypeDescriptor};
use serde_json::Value as JsonValue;
use std::fmt;

/// Attribute of a variant record that carries its discriminator.
pub const DISCRIMINATOR_ATTRIBUTE: &str = "type";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantSlot {
    pub slot: &'static str,
    /// Stamped onto records that leave `type` unset.
    pub discriminator: &'static str,
    /// Further discriminators served by the same slot.
    pub aliases: &'static [&'static str],
}

impl VariantSlot {
    pub const fn new(slot: &'static str, discriminator: &'static str) -> Self {
        Self { slot, discriminator, aliases: &[] }
    }

    pub const fn with_aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    pub fn accepts(&self, discriminator: &str) -> bool {
        self.discriminator == discriminator || self.aliases.contains(&discriminator)
    }

    fn accepted(&self) -> String {
        std::iter::once(self.discriminator)
            .chain(self.aliases.iter().copied())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for VariantSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slot)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct VariantTable {
    slots: &'static [VariantSlot],
}

/// The single defined variant of a union, with its discriminator stamped.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedVariant {
    pub slot: &'static VariantSlot,
    pub discriminator: String,
    pub value: DynamicValue,
}

impl ResolvedVariant {
    /// Encodes the variant record, `path` being the union's location.
    pub fn to_json(
        &self,
        options: EncodeOptions,
        path: &AttrPath,
    ) -> Result<JsonValue, BridgeError> {
        let slot_path = path.child(self.slot.slot);
        encode_at(&self.value, options, &slot_path)?.ok_or_else(|| {
            BridgeError::encode(slot_path, "variant record has no wire representation")
        })
    }
}

impl VariantTable {
    pub const fn new(slots: &'static [VariantSlot]) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &'static [VariantSlot] {
        self.slots
    }

    pub fn slot_for(&self, discriminator: &str) -> Option<&'static VariantSlot> {
        self.slots.iter().find(|slot| slot.accepts(discriminator))
    }

    fn candidates(&self) -> Vec<String> {
        self.slots.iter().map(|slot| slot.slot.to_string()).collect()
    }

    fn discriminators(&self) -> String {
        self.slots.iter().map(VariantSlot::accepted).collect::<Vec<_>>().join(", ")
    }

    /// Picks the one defined slot of `union` and stamps its discriminator.
    ///
    /// Placeholder objects count as undefined. A `type` already set must be
    /// one the slot accepts; an unset one is filled with the slot's primary
    /// discriminator.
    pub fn resolve(
        &self,
        union: &DynamicValue,
        path: &AttrPath,
    ) -> Result<ResolvedVariant, BridgeError> {
        let attributes = union.as_object().map_err(|err| err.under(path))?;
        let defined: Vec<&'static VariantSlot> = self
            .slots
            .iter()
            .filter(|slot| attributes.get(slot.slot).is_some_and(DynamicValue::is_defined))
            .collect();

        let slot = match defined.as_slice() {
            [slot] => *slot,
            [] => {
                return Err(BridgeError::NoVariantSelected {
                    path: path.clone(),
                    candidates: self.candidates(),
                })
            }
            _ => {
                return Err(BridgeError::AmbiguousVariant {
                    path: path.clone(),
                    defined: defined.iter().map(|slot| slot.slot.to_string()).collect(),
                })
            }
        };

        let slot_path = path.child(slot.slot);
        let record = &attributes[slot.slot];
        let type_path = slot_path.child(DISCRIMINATOR_ATTRIBUTE);
        if record.descriptor().attribute(DISCRIMINATOR_ATTRIBUTE).is_none() {
            return Err(BridgeError::encode(
                slot_path,
                format!("variant record declares no `{DISCRIMINATOR_ATTRIBUTE}` attribute"),
            ));
        }
        let current =
            record.attribute(DISCRIMINATOR_ATTRIBUTE).map_err(|err| err.under(&slot_path))?;
        let discriminator = if current.is_known() {
            let declared = current.as_str().map_err(|err| err.under(&type_path))?;
            if !slot.accepts(declared) {
                return Err(BridgeError::encode(
                    type_path,
                    format!(
                        "`{declared}` does not select {slot}, expected one of {}",
                        slot.accepted()
                    ),
                ));
            }
            declared.to_string()
        } else {
            slot.discriminator.to_string()
        };
        let value = record
            .with_attribute(DISCRIMINATOR_ATTRIBUTE, DynamicValue::string(discriminator.as_str()))
            .map_err(|err| err.under(&slot_path))?;

        Ok(ResolvedVariant { slot, discriminator, value })
    }

    /// Builds a union object with only the slot serving `discriminator` set.
    ///
    /// Other slots and any ordinary attributes of the union come back `Null`.
    pub fn build(
        &self,
        union_descriptor: &TypeDescriptor,
        discriminator: &str,
        value: DynamicValue,
        path: &AttrPath,
    ) -> Result<DynamicValue, BridgeError> {
        let slot = self.slot_for(discriminator).ok_or_else(|| {
            BridgeError::decode(
                path.child(DISCRIMINATOR_ATTRIBUTE),
                format!(
                    "unknown discriminator `{discriminator}`, expected one of {}",
                    self.discriminators()
                ),
            )
        })?;
        let declared = union_descriptor.attributes().ok_or_else(|| {
            BridgeError::shape_mismatch(path.clone(), "object", union_descriptor.kind_name())
        })?;
        if !declared.contains_key(slot.slot) {
            return Err(BridgeError::shape_mismatch(
                path.child(slot.slot),
                "declared variant slot",
                "missing",
            ));
        }
        if let Ok(stamped) = value.attribute(DISCRIMINATOR_ATTRIBUTE).and_then(DynamicValue::as_str)
        {
            if !slot.accepts(stamped) {
                return Err(BridgeError::decode(
                    path.child(slot.slot).child(DISCRIMINATOR_ATTRIBUTE),
                    format!("record of type `{stamped}` cannot fill {slot}"),
                ));
            }
        }

        DynamicValue::empty(union_descriptor)
            .with_attribute(slot.slot, value)
            .map_err(|err| err.under(path))
    }

    /// Resolves `union` and encodes the selected record.
    pub fn resolve_to_json(
        &self,
        union: &DynamicValue,
        options: EncodeOptions,
        path: &AttrPath,
    ) -> Result<(ResolvedVariant, JsonValue), BridgeError> {
        let resolved = self.resolve(union, path)?;
        let doc = resolved.to_json(options, path)?;
        Ok((resolved, doc))
    }

    /// Reads a flat, `type`-tagged record into a union object.
    pub fn build_from_json(
        &self,
        union_descriptor: &TypeDescriptor,
        doc: &JsonValue,
        options: DecodeOptions,
        path: &AttrPath,
    ) -> Result<DynamicValue, BridgeError> {
        let type_path = path.child(DISCRIMINATOR_ATTRIBUTE);
        let discriminator = match doc.get(DISCRIMINATOR_ATTRIBUTE) {
            Some(JsonValue::String(discriminator)) => discriminator.as_str(),
            Some(_) => return Err(BridgeError::decode(type_path, "discriminator is not a string")),
            None => return Err(BridgeError::decode(type_path, "record carries no discriminator")),
        };
        let slot = self.slot_for(discriminator).ok_or_else(|| {
            BridgeError::decode(
                type_path,
                format!(
                    "unknown discriminator `{discriminator}`, expected one of {}",
                    self.discriminators()
                ),
            )
        })?;
        let slot_descriptor = union_descriptor.attribute(slot.slot).ok_or_else(|| {
            BridgeError::shape_mismatch(path.child(slot.slot), "declared variant slot", "missing")
        })?;
        let value = decode_at(doc, slot_descriptor, options, &path.child(slot.slot))?;
        self.build(union_descriptor, discriminator, value, path)
    }
}
