//! JSON codec for [`fedconf_value::DynamicValue`] trees.
//!
//! [`encode`] and [`decode`] move whole trees between the dynamic form and
//! JSON wire documents; [`VariantTable`] resolves slot-per-variant unions into
//! `type`-tagged records and back. [`CodecConfig`] lets operators adjust key
//! casing and per-family legacy null handling from a TOML file.

mod case;
mod codec;
mod config;
mod variant;

pub use case::{underscores_to_camel_case, KeyCase};
pub use codec::{
    decode, decode_at, encode, encode_at, from_record, to_record, DecodeOptions, EncodeOptions,
};
pub use config::{CodecConfig, ConfigError};
pub use variant::{ResolvedVariant, VariantSlot, VariantTable, DISCRIMINATOR_ATTRIBUTE};
