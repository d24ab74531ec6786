use crate::assembler::Assembler;
use crate::criteria::{issuance_criteria_descriptor, IssuanceCriteriaAssembler};
use crate::fulfillment::{fulfillment_descriptor, FulfillmentAssembler};
use crate::sources::{attribute_sources_descriptor, AttributeSourcesAssembler};
use crate::wire::AttributeMapping;
use fedconf_codec::CodecConfig;
use fedconf_value::{AttrPath, BridgeError, DynamicValue, TypeDescriptor};
use std::sync::OnceLock;

const FULFILLMENT: &str = "attribute_contract_fulfillment";
const SOURCES: &str = "attribute_sources";
const CRITERIA: &str = "issuance_criteria";

pub fn attribute_mapping_descriptor() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| {
        TypeDescriptor::object([
            (FULFILLMENT, fulfillment_descriptor().clone()),
            (SOURCES, attribute_sources_descriptor().clone()),
            (CRITERIA, issuance_criteria_descriptor().clone()),
        ])
    })
}

/// Fulfillment, sources and criteria of one mapping, each encoded by its own assembler.
#[derive(Clone, Debug, Default)]
pub struct AttributeMappingAssembler {
    fulfillment: FulfillmentAssembler,
    sources: AttributeSourcesAssembler,
    criteria: IssuanceCriteriaAssembler,
}

impl AttributeMappingAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self {
            fulfillment: FulfillmentAssembler::from_config(config),
            sources: AttributeSourcesAssembler::from_config(config),
            criteria: IssuanceCriteriaAssembler::from_config(config),
        }
    }

    pub fn fulfillment(&self) -> &FulfillmentAssembler {
        &self.fulfillment
    }

    pub fn sources(&self) -> &AttributeSourcesAssembler {
        &self.sources
    }

    pub fn criteria(&self) -> &IssuanceCriteriaAssembler {
        &self.criteria
    }
}

impl Assembler for AttributeMappingAssembler {
    type Wire = AttributeMapping;

    fn name(&self) -> &'static str {
        "attribute_mapping"
    }

    fn descriptor(&self) -> &'static TypeDescriptor {
        attribute_mapping_descriptor()
    }

    fn to_wire_at(
        &self,
        value: &DynamicValue,
        path: &AttrPath,
    ) -> Result<Option<Self::Wire>, BridgeError> {
        if !value.is_known() {
            return Ok(None);
        }
        let part = |name: &str| value.attribute(name).map_err(|err| err.under(path));

        let attribute_contract_fulfillment = self
            .fulfillment
            .to_wire_at(part(FULFILLMENT)?, &path.child(FULFILLMENT))?
            .unwrap_or_default();
        let attribute_sources =
            self.sources.to_wire_at(part(SOURCES)?, &path.child(SOURCES))?.unwrap_or_default();
        let issuance_criteria = self.criteria.to_wire_at(part(CRITERIA)?, &path.child(CRITERIA))?;

        Ok(Some(AttributeMapping {
            attribute_contract_fulfillment,
            attribute_sources,
            issuance_criteria,
        }))
    }

    fn from_wire_at(
        &self,
        wire: Option<&Self::Wire>,
        path: &AttrPath,
    ) -> Result<DynamicValue, BridgeError> {
        let Some(wire) = wire else {
            return Ok(DynamicValue::null(attribute_mapping_descriptor().clone()));
        };
        let fulfillment = self
            .fulfillment
            .from_wire_at(Some(&wire.attribute_contract_fulfillment), &path.child(FULFILLMENT))?;
        let sources =
            self.sources.from_wire_at(Some(&wire.attribute_sources), &path.child(SOURCES))?;
        let criteria =
            self.criteria.from_wire_at(wire.issuance_criteria.as_ref(), &path.child(CRITERIA))?;

        DynamicValue::object(
            attribute_mapping_descriptor().clone(),
            [(FULFILLMENT, fulfillment), (SOURCES, sources), (CRITERIA, criteria)],
        )
        .map_err(|err| err.under(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedconf_codec::{decode, EncodeOptions};
    use serde_json::json;

    fn mapping() -> DynamicValue {
        decode(
            &json!({
                "attributeContractFulfillment": {
                    "subject": {
                        "source": {"type": "LDAP_DATA_STORE", "id": "ldapDs"},
                        "value": "uid"
                    }
                },
                "attributeSources": [{
                    "ldapAttributeSource": {
                        "type": "LDAP",
                        "dataStoreRef": {"id": "ldapDs"},
                        "searchScope": "SUBTREE",
                        "searchFilter": "uid=${username}"
                    }
                }],
                "issuanceCriteria": {"conditionalCriteria": [], "expressionCriteria": []}
            }),
            attribute_mapping_descriptor(),
        )
        .expect("valid mapping")
    }

    #[test]
    fn composite_round_trips_through_parts() {
        let assembler = AttributeMappingAssembler::new();
        let wire = assembler.to_wire(&mapping()).expect("valid").expect("present");
        assert_eq!(wire.attribute_sources.len(), 1);
        assert_eq!(wire.attribute_contract_fulfillment["subject"].value_str(), Some("uid"));
        assert_eq!(assembler.from_wire(Some(&wire)), Ok(mapping()));
    }

    #[test]
    fn missing_mapping_reads_back_as_null() {
        let assembler = AttributeMappingAssembler::new();
        assert_eq!(
            assembler.from_wire(None),
            Ok(DynamicValue::null(attribute_mapping_descriptor().clone()))
        );
    }

    #[test]
    fn part_errors_carry_composite_name_and_full_path() {
        let value = mapping()
            .with_attribute(FULFILLMENT, DynamicValue::empty(fulfillment_descriptor()))
            .and_then(|value| {
                let sources = DynamicValue::list(
                    crate::sources::attribute_source_descriptor().clone(),
                    vec![DynamicValue::empty(crate::sources::attribute_source_descriptor())],
                )?;
                value.with_attribute(SOURCES, sources)
            })
            .expect("valid mapping");
        let err = AttributeMappingAssembler::new().to_wire(&value).expect_err("no variant");
        assert_eq!(err.path().to_string(), "attribute_mapping.attribute_sources[0]");
        assert!(err.to_string().starts_with("attribute_mapping: "));
    }

    #[test]
    fn config_reaches_every_part() {
        let config = CodecConfig::from_toml_str("[legacy_mode]\nattribute_sources = true\n")
            .expect("valid config");
        let assembler = AttributeMappingAssembler::from_config(&config);
        assert_eq!(assembler.sources().options(), EncodeOptions::legacy());
        assert_eq!(assembler.fulfillment().options(), EncodeOptions::legacy());
        assert_eq!(assembler.criteria().options(), EncodeOptions::standard());
    }
}
