//! Wire records exchanged with the federation server's administrative API.
//!
//! Field names travel in camelCase. Optional fields are skipped when absent;
//! `Option<Option<T>>` slots keep an explicit `null` apart from an absent key.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{name}`")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $wire:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownName;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(UnknownName { kind: $kind, name: value.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Where a fulfilled attribute value comes from.
    SourceType, "source type" {
        TokenExchangeProcessorPolicy => "TOKEN_EXCHANGE_PROCESSOR_POLICY",
        AccountLink => "ACCOUNT_LINK",
        Adapter => "ADAPTER",
        Assertion => "ASSERTION",
        Context => "CONTEXT",
        CustomDataStore => "CUSTOM_DATA_STORE",
        Expression => "EXPRESSION",
        JdbcDataStore => "JDBC_DATA_STORE",
        LdapDataStore => "LDAP_DATA_STORE",
        PingOneLdapGatewayDataStore => "PING_ONE_LDAP_GATEWAY_DATA_STORE",
        MappedAttributes => "MAPPED_ATTRIBUTES",
        NoMapping => "NO_MAPPING",
        Text => "TEXT",
        Token => "TOKEN",
        Request => "REQUEST",
        OauthPersistentGrant => "OAUTH_PERSISTENT_GRANT",
        SubjectToken => "SUBJECT_TOKEN",
        ActorToken => "ACTOR_TOKEN",
        PasswordCredentialValidator => "PASSWORD_CREDENTIAL_VALIDATOR",
        IdpConnection => "IDP_CONNECTION",
        AuthenticationPolicyContract => "AUTHENTICATION_POLICY_CONTRACT",
        Claims => "CLAIMS",
        LocalIdentityProfile => "LOCAL_IDENTITY_PROFILE",
        ExtendedClientMetadata => "EXTENDED_CLIENT_METADATA",
        ExtendedProperties => "EXTENDED_PROPERTIES",
        TrackedHttpParams => "TRACKED_HTTP_PARAMS",
        Fragment => "FRAGMENT",
        Inputs => "INPUTS",
        AttributeQuery => "ATTRIBUTE_QUERY",
        IdentityStoreUser => "IDENTITY_STORE_USER",
        IdentityStoreGroup => "IDENTITY_STORE_GROUP",
        ScimUser => "SCIM_USER",
        ScimGroup => "SCIM_GROUP",
    }
}

impl SourceType {
    /// Data-store backed sources name the store through `source.id`.
    pub fn requires_id(self) -> bool {
        matches!(
            self,
            Self::CustomDataStore
                | Self::JdbcDataStore
                | Self::LdapDataStore
                | Self::PingOneLdapGatewayDataStore
        )
    }
}

wire_enum! {
    /// Comparison applied by a conditional issuance criterion.
    Condition, "condition" {
        Equals => "EQUALS",
        EqualsCaseInsensitive => "EQUALS_CASE_INSENSITIVE",
        EqualsDn => "EQUALS_DN",
        NotEqual => "NOT_EQUAL",
        NotEqualCaseInsensitive => "NOT_EQUAL_CASE_INSENSITIVE",
        NotEqualDn => "NOT_EQUAL_DN",
        MultivalueContains => "MULTIVALUE_CONTAINS",
        MultivalueContainsCaseInsensitive => "MULTIVALUE_CONTAINS_CASE_INSENSITIVE",
        MultivalueContainsDn => "MULTIVALUE_CONTAINS_DN",
        MultivalueDoesNotContain => "MULTIVALUE_DOES_NOT_CONTAIN",
        MultivalueDoesNotContainCaseInsensitive => "MULTIVALUE_DOES_NOT_CONTAIN_CASE_INSENSITIVE",
        MultivalueDoesNotContainDn => "MULTIVALUE_DOES_NOT_CONTAIN_DN",
    }
}

wire_enum! {
    SearchScope, "search scope" {
        Object => "OBJECT",
        OneLevel => "ONE_LEVEL",
        Subtree => "SUBTREE",
    }
}

wire_enum! {
    BinaryEncoding, "binary encoding" {
        Base64 => "BASE64",
        Hex => "HEX",
        Sid => "SID",
    }
}

/// Deserializes a present `null` as `Some(None)`; pair with `#[serde(default)]`.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLink {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceTypeIdKey {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeFulfillmentValue {
    pub source: SourceTypeIdKey,
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub value: Option<Option<String>>,
}

impl AttributeFulfillmentValue {
    /// The value text, treating absent and explicit null alike.
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Option::as_deref)
    }
}

/// Target attribute name to the way it is fulfilled.
pub type AttributeContractFulfillment = BTreeMap<String, AttributeFulfillmentValue>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAttributeSource {
    pub data_store_ref: ResourceLink,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_contract_fulfillment: Option<AttributeContractFulfillment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_fields: Option<Vec<FieldEntry>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JdbcAttributeSource {
    pub data_store_ref: ResourceLink,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_contract_fulfillment: Option<AttributeContractFulfillment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_names: Option<Vec<String>>,
    pub filter: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryLdapAttributeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_encoding: Option<BinaryEncoding>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdapAttributeSource {
    pub data_store_ref: ResourceLink,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_contract_fulfillment: Option<AttributeContractFulfillment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dn: Option<String>,
    pub search_scope: SearchScope,
    pub search_filter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_attribute_settings: Option<BTreeMap<String, BinaryLdapAttributeSettings>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_of_nested_group: Option<bool>,
}

/// One attribute source, tagged on the wire by its `type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AttributeSource {
    #[serde(rename = "CUSTOM")]
    Custom(CustomAttributeSource),
    #[serde(rename = "JDBC")]
    Jdbc(JdbcAttributeSource),
    #[serde(rename = "LDAP")]
    Ldap(LdapAttributeSource),
    #[serde(rename = "PING_ONE_LDAP_GATEWAY")]
    PingOneLdapGateway(LdapAttributeSource),
}

impl AttributeSource {
    pub fn source_type(&self) -> &'static str {
        match self {
            Self::Custom(_) => "CUSTOM",
            Self::Jdbc(_) => "JDBC",
            Self::Ldap(_) => "LDAP",
            Self::PingOneLdapGateway(_) => "PING_ONE_LDAP_GATEWAY",
        }
    }

    pub fn data_store_ref(&self) -> &ResourceLink {
        match self {
            Self::Custom(source) => &source.data_store_ref,
            Self::Jdbc(source) => &source.data_store_ref,
            Self::Ldap(source) | Self::PingOneLdapGateway(source) => &source.data_store_ref,
        }
    }

    pub fn attribute_contract_fulfillment(&self) -> Option<&AttributeContractFulfillment> {
        match self {
            Self::Custom(source) => source.attribute_contract_fulfillment.as_ref(),
            Self::Jdbc(source) => source.attribute_contract_fulfillment.as_ref(),
            Self::Ldap(source) | Self::PingOneLdapGateway(source) => {
                source.attribute_contract_fulfillment.as_ref()
            }
        }
    }

    pub fn attribute_contract_fulfillment_mut(
        &mut self,
    ) -> &mut Option<AttributeContractFulfillment> {
        match self {
            Self::Custom(source) => &mut source.attribute_contract_fulfillment,
            Self::Jdbc(source) => &mut source.attribute_contract_fulfillment,
            Self::Ldap(source) | Self::PingOneLdapGateway(source) => {
                &mut source.attribute_contract_fulfillment
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalIssuanceCriteriaEntry {
    pub source: SourceTypeIdKey,
    pub attribute_name: String,
    pub condition: Condition,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_result: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionIssuanceCriteriaEntry {
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_result: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_criteria: Option<Vec<ConditionalIssuanceCriteriaEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_criteria: Option<Vec<ExpressionIssuanceCriteriaEntry>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeMapping {
    #[serde(default)]
    pub attribute_contract_fulfillment: AttributeContractFulfillment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribute_sources: Vec<AttributeSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuance_criteria: Option<IssuanceCriteria>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enum_tables_match_their_serde_names() {
        assert_eq!(SourceType::ALL.len(), 33);
        assert_eq!(Condition::ALL.len(), 12);
        for source_type in SourceType::ALL {
            assert_eq!(serde_json::to_value(source_type).ok(), Some(json!(source_type.as_str())));
            assert_eq!(source_type.as_str().parse::<SourceType>(), Ok(*source_type));
        }
        for condition in Condition::ALL {
            assert_eq!(serde_json::to_value(condition).ok(), Some(json!(condition.as_str())));
        }
        let err = "SAML".parse::<SourceType>().expect_err("not a source type");
        assert_eq!(err.to_string(), "unknown source type `SAML`");
    }

    #[test]
    fn only_data_store_sources_require_id() {
        let requiring: Vec<&str> = SourceType::ALL
            .iter()
            .filter(|source_type| source_type.requires_id())
            .map(|source_type| source_type.as_str())
            .collect();
        assert_eq!(
            requiring,
            [
                "CUSTOM_DATA_STORE",
                "JDBC_DATA_STORE",
                "LDAP_DATA_STORE",
                "PING_ONE_LDAP_GATEWAY_DATA_STORE"
            ]
        );
    }

    #[test]
    fn fulfillment_value_keeps_explicit_null_apart_from_absent() {
        let explicit: AttributeFulfillmentValue =
            serde_json::from_value(json!({"source": {"type": "NO_MAPPING"}, "value": null}))
                .expect("valid entry");
        assert_eq!(explicit.value, Some(None));
        assert_eq!(
            serde_json::to_value(&explicit).ok(),
            Some(json!({"source": {"type": "NO_MAPPING"}, "value": null}))
        );

        let absent: AttributeFulfillmentValue =
            serde_json::from_value(json!({"source": {"type": "NO_MAPPING"}})).expect("valid entry");
        assert_eq!(absent.value, None);
        assert_eq!(absent.value_str(), None);
    }

    #[test]
    fn attribute_source_is_tagged_by_type() {
        let source: AttributeSource = serde_json::from_value(json!({
            "type": "PING_ONE_LDAP_GATEWAY",
            "dataStoreRef": {"id": "gateway"},
            "searchScope": "SUBTREE",
            "searchFilter": "uid=${username}",
            "memberOfNestedGroup": false
        }))
        .expect("valid LDAP source");
        assert_eq!(source.source_type(), "PING_ONE_LDAP_GATEWAY");
        assert_eq!(source.data_store_ref().id, "gateway");
        let AttributeSource::PingOneLdapGateway(ldap) = &source else {
            panic!("expected gateway variant, got {source:?}");
        };
        assert_eq!(ldap.search_scope, SearchScope::Subtree);

        let rendered = serde_json::to_value(&source).expect("serializes");
        assert_eq!(rendered["type"], json!("PING_ONE_LDAP_GATEWAY"));
        assert!(rendered.get("baseDn").is_none());
    }
}
