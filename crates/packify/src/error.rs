//! Codec error types.

use packify_buffers::BufferError;
use thiserror::Error;

/// Malformed or truncated wire data, or a frame that cannot be written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FramingError {
    #[error("input too short for a frame header: {available} bytes")]
    ShortHeader { available: usize },
    #[error("frame declares {declared} payload bytes, {available} remaining")]
    Truncated { declared: usize, available: usize },
    #[error("unknown type tag: 0x{0:02x}")]
    UnknownTag(u8),
    #[error("payload of {0} bytes exceeds the 4-byte length field")]
    PayloadTooLarge(usize),
    #[error("invalid payload length {actual} for tag '{tag}'")]
    InvalidLength { tag: char, actual: usize },
    #[error("invalid boolean byte: 0x{0:02x}")]
    InvalidBoolean(u8),
    #[error("invalid UTF-8 in text payload")]
    InvalidUtf8,
    #[error("invalid decimal payload: {0:?}")]
    InvalidDecimal(String),
    #[error("extension payload has no type name separator")]
    MissingSeparator,
    #[error("extension type name is not valid hex-encoded UTF-8")]
    InvalidTypeName,
    #[error("mapping entry {index} is not a 2-element tuple")]
    InvalidPair { index: usize },
    #[error("nesting depth limit of {0} exceeded while decoding")]
    DepthLimit(usize),
    #[error("{0} bytes left after the frame")]
    TrailingBytes(usize),
}

impl From<BufferError> for FramingError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::UnexpectedEof { needed, remaining } => FramingError::Truncated {
                declared: needed,
                available: remaining,
            },
        }
    }
}

/// The caller handed the codec something it cannot serve.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("data type must be one of the supported kinds; {kind} is not serializable")]
    Unsupported { kind: String },
    #[error("{0} not found in registry; cannot unpack")]
    UnknownExtension(String),
    #[error("cannot unpack {type_name}: {reason}")]
    Extension { type_name: String, reason: String },
    #[error("nesting depth limit of {0} exceeded while encoding")]
    DepthLimit(usize),
    #[error("{kind} has no JSON representation")]
    NotJson { kind: String },
    #[error(transparent)]
    Decimal(#[from] DecimalError),
}

/// Umbrella error returned by every encode and decode operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Framing(#[from] FramingError),
}

impl PackError {
    pub fn is_usage(&self) -> bool {
        matches!(self, PackError::Usage(_))
    }

    pub fn is_framing(&self) -> bool {
        matches!(self, PackError::Framing(_))
    }

    /// Shorthand for an extension that failed to rebuild itself from its
    /// packed bytes.
    pub fn extension(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        PackError::Usage(UsageError::Extension {
            type_name: type_name.into(),
            reason: reason.into(),
        })
    }
}

impl From<BufferError> for PackError {
    fn from(err: BufferError) -> Self {
        PackError::Framing(err.into())
    }
}

/// Error returned when a string is not a decimal number.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid decimal literal: {0:?}")]
pub struct DecimalError(pub String);
