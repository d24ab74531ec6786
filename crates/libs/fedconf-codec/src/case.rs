use serde::{Deserialize, Serialize};

/// How object attribute names map onto wire keys.
///
/// Map keys are user data and are never converted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCase {
    /// `data_store_ref` travels as `dataStoreRef`.
    #[default]
    Camel,
    Preserve,
}

impl KeyCase {
    pub fn wire_key(self, attribute: &str) -> String {
        match self {
            Self::Camel => underscores_to_camel_case(attribute),
            Self::Preserve => attribute.to_string(),
        }
    }
}

pub fn underscores_to_camel_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut upper_next = false;
    for ch in value.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            result.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}
