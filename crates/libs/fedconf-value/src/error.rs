use crate::path::AttrPath;

/// Errors raised while moving configuration between dynamic trees and wire records.
///
/// Every variant carries the attribute path it refers to, see [`BridgeError::path`].
/// None of them are retryable: they signal either an assembler bug or a
/// configuration a human has to fix.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum BridgeError {
    #[error("shape mismatch at {path}: expected {expected}, found {found}")]
    ShapeMismatch { path: AttrPath, expected: String, found: String },

    #[error("decode error at {path}: {message}")]
    Decode { path: AttrPath, message: String },

    #[error("encode error at {path}: {message}")]
    Encode { path: AttrPath, message: String },

    #[error("no variant selected at {path}: expected exactly one of {}", .candidates.join(", "))]
    NoVariantSelected { path: AttrPath, candidates: Vec<String> },

    #[error("ambiguous variant at {path}: only one of {} may be defined", .defined.join(", "))]
    AmbiguousVariant { path: AttrPath, defined: Vec<String> },

    #[error("invalid configuration at {path}: {message}")]
    InvalidConfiguration { path: AttrPath, message: String },

    #[error("{assembler}: {source}")]
    Assembly {
        assembler: &'static str,
        #[source]
        source: Box<BridgeError>,
    },
}

impl BridgeError {
    pub fn shape_mismatch(
        path: AttrPath,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch { path, expected: expected.into(), found: found.into() }
    }

    pub fn decode(path: AttrPath, message: impl Into<String>) -> Self {
        Self::Decode { path, message: message.into() }
    }

    pub fn encode(path: AttrPath, message: impl Into<String>) -> Self {
        Self::Encode { path, message: message.into() }
    }

    pub fn invalid_configuration(path: AttrPath, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration { path, message: message.into() }
    }

    /// Wraps the error with the name of the assembler it escaped from.
    pub fn in_assembler(self, assembler: &'static str) -> Self {
        Self::Assembly { assembler, source: Box::new(self) }
    }

    /// The attribute path the error refers to.
    pub fn path(&self) -> &AttrPath {
        match self {
            Self::ShapeMismatch { path, .. }
            | Self::Decode { path, .. }
            | Self::Encode { path, .. }
            | Self::NoVariantSelected { path, .. }
            | Self::AmbiguousVariant { path, .. }
            | Self::InvalidConfiguration { path, .. } => path,
            Self::Assembly { source, .. } => source.path(),
        }
    }

    /// Re-roots the error's path below `base`.
    ///
    /// Accessors and the codec report paths relative to the value they were
    /// handed; callers that know where that value lives use this to produce
    /// the absolute path.
    pub fn under(self, base: &AttrPath) -> Self {
        if base.is_root() {
            return self;
        }
        match self {
            Self::ShapeMismatch { path, expected, found } => {
                Self::ShapeMismatch { path: base.join(&path), expected, found }
            }
            Self::Decode { path, message } => Self::Decode { path: base.join(&path), message },
            Self::Encode { path, message } => Self::Encode { path: base.join(&path), message },
            Self::NoVariantSelected { path, candidates } => {
                Self::NoVariantSelected { path: base.join(&path), candidates }
            }
            Self::AmbiguousVariant { path, defined } => {
                Self::AmbiguousVariant { path: base.join(&path), defined }
            }
            Self::InvalidConfiguration { path, message } => {
                Self::InvalidConfiguration { path: base.join(&path), message }
            }
            Self::Assembly { assembler, source } => {
                Self::Assembly { assembler, source: Box::new(source.under(base)) }
            }
        }
    }
}
