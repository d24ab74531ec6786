//! Assemblers for the recurring attribute mapping shapes of a federation server.
//!
//! Each [`Assembler`] owns the descriptor of one configuration shape and the
//! encode options of its [`WireFamily`], and converts between
//! [`fedconf_value::DynamicValue`] trees and the typed records in [`wire`].

mod assembler;
mod criteria;
mod family;
mod fulfillment;
mod mapping;
mod sources;
pub mod wire;

pub use assembler::Assembler;
pub use criteria::{
    conditional_criteria_entry_descriptor, expression_criteria_entry_descriptor,
    issuance_criteria_descriptor, IssuanceCriteriaAssembler,
};
pub use family::WireFamily;
pub use fulfillment::{
    fulfillment_descriptor, fulfillment_entry_descriptor, source_type_id_key_descriptor,
    FulfillmentAssembler,
};
pub use mapping::{attribute_mapping_descriptor, AttributeMappingAssembler};
pub use sources::{
    attribute_source_descriptor, attribute_sources_descriptor, custom_attribute_source_descriptor,
    jdbc_attribute_source_descriptor, ldap_attribute_source_descriptor, resource_link_descriptor,
    AttributeSourcesAssembler, ATTRIBUTE_SOURCE_VARIANTS, CUSTOM_SLOT, JDBC_SLOT, LDAP_SLOT,
};
