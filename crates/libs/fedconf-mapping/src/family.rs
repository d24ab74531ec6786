use fedconf_codec::{CodecConfig, EncodeOptions};

/// Groups of wire records that share one rule for rendering `Null`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WireFamily {
    AttributeContractFulfillment,
    AttributeSources,
    IssuanceCriteria,
}

impl WireFamily {
    pub const ALL: [WireFamily; 3] =
        [Self::AttributeContractFulfillment, Self::AttributeSources, Self::IssuanceCriteria];

    /// Key of the family in a codec config's `[legacy_mode]` table.
    pub fn name(self) -> &'static str {
        match self {
            Self::AttributeContractFulfillment => "attribute_contract_fulfillment",
            Self::AttributeSources => "attribute_sources",
            Self::IssuanceCriteria => "issuance_criteria",
        }
    }

    /// Whether the remote API expects explicit `null` for unset fields.
    pub fn legacy_mode(self) -> bool {
        matches!(self, Self::AttributeContractFulfillment)
    }

    pub fn encode_options(self) -> EncodeOptions {
        EncodeOptions { legacy_mode: self.legacy_mode(), ..EncodeOptions::default() }
    }

    pub fn configured(self, config: &CodecConfig) -> EncodeOptions {
        config.encode_options(self.name(), self.legacy_mode())
    }
}
