use crate::case::KeyCase;
use crate::codec::{DecodeOptions, EncodeOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read codec config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid codec config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Operator-tunable codec behaviour.
///
/// ```toml
/// key_case = "camel"
///
/// [legacy_mode]
/// issuance_criteria = true
/// ```
///
/// Families without an entry keep the mode their assembler was built with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    pub key_case: KeyCase,
    pub legacy_mode: BTreeMap<String, bool>,
}

impl CodecConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded codec config from {}", path.display());
        Ok(config)
    }

    /// Encode options for `family`, starting from its built-in legacy mode.
    pub fn encode_options(&self, family: &str, default_legacy: bool) -> EncodeOptions {
        let legacy_mode = match self.legacy_mode.get(family) {
            Some(&legacy) if legacy != default_legacy => {
                log::warn!(
                    "codec config overrides legacy mode for {family}: {default_legacy} -> {legacy}"
                );
                legacy
            }
            Some(&legacy) => legacy,
            None => default_legacy,
        };
        EncodeOptions { legacy_mode, key_case: self.key_case }
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions { key_case: self.key_case }
    }
}
