//! Attribute sources: an ordered list of custom, JDBC or LDAP data store lookups.

use crate::assembler::Assembler;
use crate::family::WireFamily;
use crate::fulfillment::{fulfillment_descriptor, FulfillmentAssembler};
use crate::wire::AttributeSource;
use fedconf_codec::{CodecConfig, EncodeOptions, VariantSlot, VariantTable};
use fedconf_value::{AttrPath, BridgeError, DynamicValue, TypeDescriptor};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const FULFILLMENT: &str = "attribute_contract_fulfillment";

pub const CUSTOM_SLOT: &str = "custom_attribute_source";
pub const JDBC_SLOT: &str = "jdbc_attribute_source";
pub const LDAP_SLOT: &str = "ldap_attribute_source";

static SLOTS: [VariantSlot; 3] = [
    VariantSlot::new(CUSTOM_SLOT, "CUSTOM"),
    VariantSlot::new(JDBC_SLOT, "JDBC"),
    VariantSlot::new(LDAP_SLOT, "LDAP").with_aliases(&["PING_ONE_LDAP_GATEWAY"]),
];

pub static ATTRIBUTE_SOURCE_VARIANTS: VariantTable = VariantTable::new(&SLOTS);

pub fn resource_link_descriptor() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| {
        TypeDescriptor::object([
            ("id", TypeDescriptor::string()),
            ("location", TypeDescriptor::string()),
        ])
    })
}

fn common_attributes() -> Vec<(&'static str, TypeDescriptor)> {
    vec![
        ("type", TypeDescriptor::string()),
        ("data_store_ref", resource_link_descriptor().clone()),
        ("id", TypeDescriptor::string()),
        ("description", TypeDescriptor::string()),
        (FULFILLMENT, fulfillment_descriptor().clone()),
    ]
}

fn with_common(specific: Vec<(&'static str, TypeDescriptor)>) -> TypeDescriptor {
    TypeDescriptor::object(common_attributes().into_iter().chain(specific))
}

pub fn custom_attribute_source_descriptor() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| {
        let field = TypeDescriptor::object([
            ("name", TypeDescriptor::string()),
            ("value", TypeDescriptor::string()),
        ]);
        with_common(vec![("filter_fields", TypeDescriptor::set(field))])
    })
}

pub fn jdbc_attribute_source_descriptor() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| {
        with_common(vec![
            ("schema", TypeDescriptor::string()),
            ("table", TypeDescriptor::string()),
            ("column_names", TypeDescriptor::list(TypeDescriptor::string())),
            ("filter", TypeDescriptor::string()),
        ])
    })
}

pub fn ldap_attribute_source_descriptor() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| {
        let binary = TypeDescriptor::object([("binary_encoding", TypeDescriptor::string())]);
        with_common(vec![
            ("base_dn", TypeDescriptor::string()),
            ("search_scope", TypeDescriptor::string()),
            ("search_filter", TypeDescriptor::string()),
            ("search_attributes", TypeDescriptor::set(TypeDescriptor::string())),
            ("binary_attribute_settings", TypeDescriptor::map(binary)),
            ("member_of_nested_group", TypeDescriptor::bool()),
        ])
    })
}

/// One list element: a slot per source kind, exactly one of them defined.
pub fn attribute_source_descriptor() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| {
        TypeDescriptor::object([
            (CUSTOM_SLOT, custom_attribute_source_descriptor().clone()),
            (JDBC_SLOT, jdbc_attribute_source_descriptor().clone()),
            (LDAP_SLOT, ldap_attribute_source_descriptor().clone()),
        ])
    })
}

pub fn attribute_sources_descriptor() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| TypeDescriptor::list(attribute_source_descriptor().clone()))
}

#[derive(Clone, Debug)]
pub struct AttributeSourcesAssembler {
    options: EncodeOptions,
    fulfillment: FulfillmentAssembler,
}

impl Default for AttributeSourcesAssembler {
    fn default() -> Self {
        Self {
            options: WireFamily::AttributeSources.encode_options(),
            fulfillment: FulfillmentAssembler::default(),
        }
    }
}

impl AttributeSourcesAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EncodeOptions, fulfillment: FulfillmentAssembler) -> Self {
        Self { options, fulfillment }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::with_options(
            WireFamily::AttributeSources.configured(config),
            FulfillmentAssembler::from_config(config),
        )
    }

    pub fn options(&self) -> EncodeOptions {
        self.options
    }

    fn source_to_wire(
        &self,
        item: &DynamicValue,
        path: &AttrPath,
    ) -> Result<AttributeSource, BridgeError> {
        let resolved = ATTRIBUTE_SOURCE_VARIANTS.resolve(item, path)?;
        log::trace!("attribute source {path} resolved to {}", resolved.discriminator);

        let slot_path = path.child(resolved.slot.slot);
        let nested = resolved.value.attribute(FULFILLMENT).map_err(|err| err.under(&slot_path))?;
        let fulfillment = self.fulfillment.to_wire_at(nested, &slot_path.child(FULFILLMENT))?;

        let mut doc = resolved.to_json(self.options, path)?;
        if let JsonValue::Object(object) = &mut doc {
            object.remove(&self.options.key_case.wire_key(FULFILLMENT));
        }
        let mut source: AttributeSource = serde_json::from_value(doc).map_err(|err| {
            BridgeError::encode(
                slot_path.clone(),
                format!("cannot build {} attribute source: {err}", resolved.discriminator),
            )
        })?;
        *source.attribute_contract_fulfillment_mut() = fulfillment;
        Ok(source)
    }

    fn source_from_wire(
        &self,
        source: &AttributeSource,
        path: &AttrPath,
    ) -> Result<DynamicValue, BridgeError> {
        let mut settled = source.clone();
        let fulfillment = settled.attribute_contract_fulfillment_mut().take();
        if let AttributeSource::Ldap(ldap) | AttributeSource::PingOneLdapGateway(ldap) =
            &mut settled
        {
            if ldap.binary_attribute_settings.as_ref().is_some_and(BTreeMap::is_empty) {
                ldap.binary_attribute_settings = None;
            }
        }

        let doc = serde_json::to_value(&settled).map_err(|err| {
            BridgeError::decode(path.clone(), format!("cannot read attribute source: {err}"))
        })?;
        let union = ATTRIBUTE_SOURCE_VARIANTS.build_from_json(
            attribute_source_descriptor(),
            &doc,
            self.options.decode_options(),
            path,
        )?;

        let slot = ATTRIBUTE_SOURCE_VARIANTS.slot_for(settled.source_type()).ok_or_else(|| {
            BridgeError::decode(path.child("type"), "attribute source type has no slot")
        })?;
        let slot_path = path.child(slot.slot);
        let nested =
            self.fulfillment.from_wire_at(fulfillment.as_ref(), &slot_path.child(FULFILLMENT))?;
        let record = union
            .attribute(slot.slot)
            .and_then(|record| record.with_attribute(FULFILLMENT, nested))
            .map_err(|err| err.under(&slot_path))?;
        union.with_attribute(slot.slot, record).map_err(|err| err.under(path))
    }
}

impl Assembler for AttributeSourcesAssembler {
    type Wire = Vec<AttributeSource>;

    fn name(&self) -> &'static str {
        WireFamily::AttributeSources.name()
    }

    fn descriptor(&self) -> &'static TypeDescriptor {
        attribute_sources_descriptor()
    }

    fn to_wire_at(
        &self,
        value: &DynamicValue,
        path: &AttrPath,
    ) -> Result<Option<Self::Wire>, BridgeError> {
        if !value.is_known() {
            return Ok(None);
        }
        let items = value.as_list().map_err(|err| err.under(path))?;
        let mut sources = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_path = path.index(index);
            if !item.is_known() {
                log::trace!("skipping unset attribute source {item_path}");
                continue;
            }
            sources.push(self.source_to_wire(item, &item_path)?);
        }
        log::debug!("assembled {} attribute sources for {path}", sources.len());
        Ok(Some(sources))
    }

    fn from_wire_at(
        &self,
        wire: Option<&Self::Wire>,
        path: &AttrPath,
    ) -> Result<DynamicValue, BridgeError> {
        let Some(sources) = wire else {
            return Ok(DynamicValue::null(attribute_sources_descriptor().clone()));
        };
        let items = sources
            .iter()
            .enumerate()
            .map(|(index, source)| self.source_from_wire(source, &path.index(index)))
            .collect::<Result<Vec<_>, _>>()?;
        DynamicValue::list(attribute_source_descriptor().clone(), items)
            .map_err(|err| err.under(path))
    }
}
