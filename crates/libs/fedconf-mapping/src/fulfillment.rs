//! Attribute contract fulfillment: target attribute name to `{source, value}`.

use crate::assembler::Assembler;
use crate::family::WireFamily;
use crate::wire::{
    AttributeContractFulfillment, AttributeFulfillmentValue, SourceType, SourceTypeIdKey,
};
use fedconf_codec::{from_record, to_record, CodecConfig, EncodeOptions};
use fedconf_value::{AttrPath, BridgeError, DynamicValue, TypeDescriptor, ValueState};
use std::sync::OnceLock;

const SOURCE: &str = "source";
const VALUE: &str = "value";

/// `{type, id}` reference to where a value is looked up.
pub fn source_type_id_key_descriptor() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| {
        TypeDescriptor::object([
            ("type", TypeDescriptor::string()),
            ("id", TypeDescriptor::string()),
        ])
    })
}

pub fn fulfillment_entry_descriptor() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| {
        TypeDescriptor::object([
            (SOURCE, source_type_id_key_descriptor().clone()),
            (VALUE, TypeDescriptor::string()),
        ])
    })
}

pub fn fulfillment_descriptor() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| TypeDescriptor::map(fulfillment_entry_descriptor().clone()))
}

#[derive(Clone, Debug)]
pub struct FulfillmentAssembler {
    options: EncodeOptions,
}

impl Default for FulfillmentAssembler {
    fn default() -> Self {
        Self::with_options(WireFamily::AttributeContractFulfillment.encode_options())
    }
}

impl FulfillmentAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EncodeOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::with_options(WireFamily::AttributeContractFulfillment.configured(config))
    }

    pub fn options(&self) -> EncodeOptions {
        self.options
    }

    /// Checks that `NO_MAPPING` entries carry no value and all others do.
    pub fn validate(&self, value: &DynamicValue) -> Result<(), BridgeError> {
        validate_at(value, &AttrPath::attribute(self.name()))
            .map_err(|err| err.in_assembler(self.name()))
    }
}

impl Assembler for FulfillmentAssembler {
    type Wire = AttributeContractFulfillment;

    fn name(&self) -> &'static str {
        WireFamily::AttributeContractFulfillment.name()
    }

    fn descriptor(&self) -> &'static TypeDescriptor {
        fulfillment_descriptor()
    }

    fn to_wire_at(
        &self,
        value: &DynamicValue,
        path: &AttrPath,
    ) -> Result<Option<Self::Wire>, BridgeError> {
        if !value.is_known() {
            return Ok(None);
        }
        let entries = value.as_map().map_err(|err| err.under(path))?;
        validate_at(value, path)?;

        let mut wire = AttributeContractFulfillment::new();
        for (key, entry) in entries {
            let entry_path = path.key(key.as_str());
            if !entry.is_known() {
                log::trace!("skipping unset fulfillment entry {entry_path}");
                continue;
            }
            source_type_of(entry, &entry_path)?;
            let Some(mut record) =
                to_record::<AttributeFulfillmentValue>(entry, self.options, &entry_path)?
            else {
                continue;
            };
            require_source_id(&mut record.source, &entry_path.child(SOURCE))?;
            wire.insert(key.clone(), record);
        }
        log::debug!("assembled {} fulfillment entries for {path}", wire.len());
        Ok(Some(wire))
    }

    fn from_wire_at(
        &self,
        wire: Option<&Self::Wire>,
        path: &AttrPath,
    ) -> Result<DynamicValue, BridgeError> {
        let Some(wire) = wire else {
            return Ok(DynamicValue::null(fulfillment_descriptor().clone()));
        };
        let mut settled = wire.clone();
        for entry in settled.values_mut() {
            if !entry.source.source_type.requires_id() {
                entry.source.id = None;
            }
        }
        from_record(&settled, fulfillment_descriptor(), self.options.decode_options(), path)
    }
}

/// Data-store sources keep a non-empty id; every other source loses its id.
fn require_source_id(source: &mut SourceTypeIdKey, path: &AttrPath) -> Result<(), BridgeError> {
    if !source.source_type.requires_id() {
        if let Some(id) = source.id.take() {
            log::trace!("dropping id `{id}` of {} source at {path}", source.source_type);
        }
        return Ok(());
    }
    match source.id.as_deref() {
        Some(id) if !id.is_empty() => Ok(()),
        _ => Err(BridgeError::encode(
            path.child("id"),
            format!("{} requires the id of a data store", source.source_type),
        )),
    }
}

/// The entry's source type, `None` while it is not yet known.
fn source_type_of(
    entry: &DynamicValue,
    path: &AttrPath,
) -> Result<Option<SourceType>, BridgeError> {
    let source_path = path.child(SOURCE);
    let source = entry.attribute(SOURCE).map_err(|err| err.under(path))?;
    if !source.is_known() {
        return Ok(None);
    }
    let kind = source.attribute("type").map_err(|err| err.under(&source_path))?;
    if !kind.is_known() {
        return Ok(None);
    }
    let type_path = source_path.child("type");
    let name = kind.as_str().map_err(|err| err.under(&type_path))?;
    name.parse::<SourceType>()
        .map(Some)
        .map_err(|err| BridgeError::decode(type_path, err.to_string()))
}

fn validate_at(value: &DynamicValue, path: &AttrPath) -> Result<(), BridgeError> {
    let ValueState::Known(_) = value.state() else {
        return Ok(());
    };
    for (key, entry) in value.as_map().map_err(|err| err.under(path))? {
        let entry_path = path.key(key.as_str());
        if !entry.is_known() {
            continue;
        }
        let Some(source_type) = source_type_of(entry, &entry_path)? else {
            continue;
        };
        let value_path = entry_path.child(VALUE);
        let text = entry.attribute(VALUE).map_err(|err| err.under(&entry_path))?;
        let text = match text.state() {
            ValueState::Unknown => continue,
            ValueState::Null => "",
            ValueState::Known(_) => text.as_str().map_err(|err| err.under(&value_path))?,
        };
        if source_type == SourceType::NoMapping && !text.is_empty() {
            return Err(BridgeError::invalid_configuration(
                value_path,
                format!("key `{key}` uses NO_MAPPING and must not define a value"),
            ));
        }
        if source_type != SourceType::NoMapping && text.is_empty() {
            return Err(BridgeError::invalid_configuration(
                value_path,
                format!("key `{key}` uses {source_type} and must define a value"),
            ));
        }
    }
    Ok(())
}
