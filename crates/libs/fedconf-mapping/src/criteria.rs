//! Issuance criteria: conditions that must hold before attributes are issued.

use crate::assembler::Assembler;
use crate::family::WireFamily;
use crate::fulfillment::source_type_id_key_descriptor;
use crate::wire::{Condition, IssuanceCriteria, SourceType};
use fedconf_codec::{from_record, to_record, CodecConfig, EncodeOptions};
use fedconf_value::{AttrPath, BridgeError, DynamicValue, TypeDescriptor};
use std::str::FromStr;
use std::sync::OnceLock;

const CONDITIONAL: &str = "conditional_criteria";
const EXPRESSION: &str = "expression_criteria";

pub fn conditional_criteria_entry_descriptor() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| {
        TypeDescriptor::object([
            ("source", source_type_id_key_descriptor().clone()),
            ("attribute_name", TypeDescriptor::string()),
            ("condition", TypeDescriptor::string()),
            ("value", TypeDescriptor::string()),
            ("error_result", TypeDescriptor::string()),
        ])
    })
}

pub fn expression_criteria_entry_descriptor() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| {
        TypeDescriptor::object([
            ("expression", TypeDescriptor::string()),
            ("error_result", TypeDescriptor::string()),
        ])
    })
}

pub fn issuance_criteria_descriptor() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| {
        TypeDescriptor::object([
            (CONDITIONAL, TypeDescriptor::list(conditional_criteria_entry_descriptor().clone())),
            (EXPRESSION, TypeDescriptor::list(expression_criteria_entry_descriptor().clone())),
        ])
    })
}

#[derive(Clone, Debug)]
pub struct IssuanceCriteriaAssembler {
    options: EncodeOptions,
}

impl Default for IssuanceCriteriaAssembler {
    fn default() -> Self {
        Self::with_options(WireFamily::IssuanceCriteria.encode_options())
    }
}

impl IssuanceCriteriaAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EncodeOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::with_options(WireFamily::IssuanceCriteria.configured(config))
    }

    pub fn options(&self) -> EncodeOptions {
        self.options
    }

    /// Fresh criteria with both lists known and empty.
    pub fn default_value(&self) -> DynamicValue {
        let descriptor = issuance_criteria_descriptor();
        let lists = descriptor
            .attributes()
            .into_iter()
            .flatten()
            .map(|(name, list)| (name.clone(), DynamicValue::empty(list)));
        DynamicValue::object(descriptor.clone(), lists)
            .unwrap_or_else(|_| DynamicValue::empty(descriptor))
    }
}

/// Rejects enumeration names the remote API would not accept.
fn check_names(value: &DynamicValue, path: &AttrPath) -> Result<(), BridgeError> {
    let list_path = path.child(CONDITIONAL);
    let entries = value.attribute(CONDITIONAL).map_err(|err| err.under(path))?;
    let Ok(entries) = entries.as_list() else {
        return Ok(());
    };
    for (index, entry) in entries.iter().enumerate() {
        let entry_path = list_path.index(index);
        if !entry.is_known() {
            continue;
        }
        check_name::<Condition>(entry.attribute("condition"), &entry_path.child("condition"))?;
        if let Ok(source) = entry.attribute("source") {
            let type_path = entry_path.child("source").child("type");
            check_name::<SourceType>(source.attribute("type"), &type_path)?;
        }
    }
    Ok(())
}

fn check_name<T>(
    attribute: Result<&DynamicValue, BridgeError>,
    path: &AttrPath,
) -> Result<(), BridgeError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match attribute.and_then(DynamicValue::as_str) {
        Ok(name) => name
            .parse::<T>()
            .map(|_| ())
            .map_err(|err| BridgeError::decode(path.clone(), err.to_string())),
        Err(_) => Ok(()),
    }
}

impl Assembler for IssuanceCriteriaAssembler {
    type Wire = IssuanceCriteria;

    fn name(&self) -> &'static str {
        WireFamily::IssuanceCriteria.name()
    }

    fn descriptor(&self) -> &'static TypeDescriptor {
        issuance_criteria_descriptor()
    }

    fn to_wire_at(
        &self,
        value: &DynamicValue,
        path: &AttrPath,
    ) -> Result<Option<Self::Wire>, BridgeError> {
        if !value.is_known() {
            return Ok(None);
        }
        check_names(value, path)?;
        let criteria = to_record::<IssuanceCriteria>(value, self.options, path)?;
        if let Some(criteria) = &criteria {
            log::debug!(
                "assembled {} conditional and {} expression criteria for {path}",
                criteria.conditional_criteria.as_ref().map_or(0, Vec::len),
                criteria.expression_criteria.as_ref().map_or(0, Vec::len),
            );
        }
        Ok(criteria)
    }

    fn from_wire_at(
        &self,
        wire: Option<&Self::Wire>,
        path: &AttrPath,
    ) -> Result<DynamicValue, BridgeError> {
        let Some(wire) = wire else {
            return Ok(self.default_value());
        };
        let settled = IssuanceCriteria {
            conditional_criteria: Some(wire.conditional_criteria.clone().unwrap_or_default()),
            expression_criteria: Some(wire.expression_criteria.clone().unwrap_or_default()),
        };
        from_record(&settled, issuance_criteria_descriptor(), self.options.decode_options(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{
        ConditionalIssuanceCriteriaEntry, ExpressionIssuanceCriteriaEntry, SourceTypeIdKey,
    };
    use fedconf_codec::decode;
    use serde_json::json;

    fn criteria(doc: serde_json::Value) -> DynamicValue {
        decode(&doc, issuance_criteria_descriptor()).expect("valid criteria")
    }

    #[test]
    fn default_value_has_known_empty_lists() {
        let value = IssuanceCriteriaAssembler::new().default_value();
        for name in [CONDITIONAL, EXPRESSION] {
            let list = value.attribute(name).expect("declared");
            assert!(list.is_known());
            assert_eq!(list.as_list().map(<[DynamicValue]>::len), Ok(0));
        }
        assert_eq!(value, criteria(json!({"conditionalCriteria": [], "expressionCriteria": []})));
    }

    #[test]
    fn null_lists_are_omitted_on_write() {
        let value = criteria(json!({
            "expressionCriteria": [{"expression": "#this.get(\"role\") == \"admin\""}]
        }));
        let wire =
            IssuanceCriteriaAssembler::new().to_wire(&value).expect("valid").expect("present");
        assert_eq!(wire.conditional_criteria, None);
        assert_eq!(
            wire.expression_criteria,
            Some(vec![ExpressionIssuanceCriteriaEntry {
                expression: "#this.get(\"role\") == \"admin\"".into(),
                error_result: None,
            }])
        );
    }

    #[test]
    fn conditional_criteria_round_trip() {
        let value = criteria(json!({
            "conditionalCriteria": [{
                "source": {"type": "ASSERTION"},
                "attributeName": "SAML_SUBJECT",
                "condition": "MULTIVALUE_CONTAINS_CASE_INSENSITIVE",
                "value": "admin",
                "errorResult": "denied"
            }],
            "expressionCriteria": []
        }));
        let assembler = IssuanceCriteriaAssembler::new();
        let wire = assembler.to_wire(&value).expect("valid").expect("present");
        let conditional = wire.conditional_criteria.as_deref().unwrap_or_default();
        assert_eq!(
            conditional,
            [ConditionalIssuanceCriteriaEntry {
                source: SourceTypeIdKey { source_type: SourceType::Assertion, id: None },
                attribute_name: "SAML_SUBJECT".into(),
                condition: Condition::MultivalueContainsCaseInsensitive,
                value: "admin".into(),
                error_result: Some("denied".into()),
            }]
        );
        assert_eq!(assembler.from_wire(Some(&wire)), Ok(value));
    }

    #[test]
    fn unknown_condition_is_a_decode_error() {
        let value = criteria(json!({
            "conditionalCriteria": [{
                "source": {"type": "ASSERTION"},
                "attributeName": "SAML_SUBJECT",
                "condition": "LIKE",
                "value": "admin"
            }]
        }));
        let err = IssuanceCriteriaAssembler::new().to_wire(&value).expect_err("LIKE");
        assert_eq!(err.path().to_string(), "issuance_criteria.conditional_criteria[0].condition");
        assert!(err.to_string().contains("unknown condition `LIKE`"));
    }

    #[test]
    fn missing_criteria_read_back_as_defaults() {
        let assembler = IssuanceCriteriaAssembler::new();
        assert_eq!(assembler.from_wire(None), Ok(assembler.default_value()));
        assert_eq!(
            assembler.from_wire(Some(&IssuanceCriteria::default())),
            Ok(assembler.default_value())
        );
        let null = DynamicValue::null(issuance_criteria_descriptor().clone());
        assert_eq!(assembler.to_wire(&null), Ok(None));
    }
}
