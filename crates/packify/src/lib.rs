//! Self-describing binary serialization for nested values.
//!
//! Every value is written as a frame: a one-byte type tag, a 4-byte
//! big-endian payload length, then the payload. Containers nest frames,
//! sets and mappings are written in a canonical byte order, and
//! user-defined types travel as named extension frames that a
//! [`Registry`] turns back into Rust values.
//!
//! ```
//! use packify::{decode, encode, Value};
//!
//! let value = Value::mapping([
//!     (Value::text("id"), Value::from(7)),
//!     (Value::text("tags"), Value::set(["a", "b"])),
//! ]);
//! let bytes = encode(&value).unwrap();
//! assert_eq!(decode(&bytes, None).unwrap(), value);
//! ```

use std::any::Any;

pub mod builtin;
pub mod constants;
mod decimal;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod extension;
pub mod frame;
mod json;
pub mod registry;
mod value;

pub use constants::{Tag, DEFAULT_MAX_DEPTH};
pub use decimal::Decimal;
pub use decoder::{DecoderOptions, PackDecoder};
pub use encoder::{EncoderOptions, PackEncoder};
pub use error::{DecimalError, FramingError, PackError, UsageError};
pub use extension::{Extension, ExtensionHandler, Packable, PackableHandler};
pub use registry::Registry;
pub use value::{Float, Value};

/// Encodes `value` as a single frame.
pub fn encode(value: &Value) -> Result<Vec<u8>, PackError> {
    PackEncoder::new().encode(value)
}

/// Encodes any Rust value [`Value::from_native`] accepts.
pub fn encode_native<T: Any>(value: &T) -> Result<Vec<u8>, PackError> {
    encode(&Value::from_native(value)?)
}

/// Decodes the first frame of `input`; bytes after it are ignored.
///
/// Extensions are resolved through the built-in registry, extended by
/// (and overridden with) `inject` when given.
pub fn decode(input: &[u8], inject: Option<&Registry>) -> Result<Value, PackError> {
    decode_with_consumed(input, inject).map(|(value, _)| value)
}

/// Like [`decode`], also returning how many bytes the frame spanned.
pub fn decode_with_consumed(
    input: &[u8],
    inject: Option<&Registry>,
) -> Result<(Value, usize), PackError> {
    let registry = match inject {
        Some(extra) => Registry::with_builtins().merged(extra),
        None => Registry::with_builtins(),
    };
    PackDecoder::new(&registry).decode_with_consumed(input)
}
