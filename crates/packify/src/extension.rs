//! User-defined "packable" types and the handlers that rebuild them.
//!
//! An extension frame carries the hex-encoded type name, a `_` separator
//! and whatever bytes the type packed itself into. The codec never looks
//! inside those bytes; on decode it finds a handler for the name in the
//! [`Registry`] and lets the handler rebuild the value.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::constants::EXTENSION_SEPARATOR;
use crate::error::{FramingError, PackError};
use crate::registry::Registry;

/// A type that can serialize itself to opaque bytes and back.
///
/// Implementations must satisfy `unpack(&x.pack(), registry) == x` for
/// every value they produce. `TYPE_NAME` is written to the wire and is
/// how the decoding side finds the type, so it must be stable.
pub trait Packable: Any + Send + Sync + Sized {
    const TYPE_NAME: &'static str;

    fn pack(&self) -> Vec<u8>;

    /// Rebuilds a value from bytes produced by [`Packable::pack`].
    ///
    /// `registry` is the registry of the decode in progress, for types
    /// that nest other extension values.
    fn unpack(data: &[u8], registry: &Registry) -> Result<Self, PackError>;
}

/// An extension value: a type name, the packed bytes, and (when it was
/// built from or decoded into a Rust type) the typed instance.
///
/// Equality, ordering and hashing look only at the name and the bytes.
#[derive(Clone)]
pub struct Extension {
    type_name: String,
    data: Vec<u8>,
    object: Option<Arc<dyn Any + Send + Sync>>,
}

impl Extension {
    pub fn new<T: Packable>(value: T) -> Self {
        Self {
            type_name: T::TYPE_NAME.to_string(),
            data: value.pack(),
            object: Some(Arc::new(value)),
        }
    }

    /// Builds an extension with no Rust type behind it.
    pub fn from_parts(type_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            type_name: type_name.into(),
            data: data.into(),
            object: None,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// `true` when no typed instance is attached.
    pub fn is_opaque(&self) -> bool {
        self.object.is_none()
    }

    pub fn downcast_ref<T: Packable>(&self) -> Option<&T> {
        self.object.as_deref()?.downcast_ref::<T>()
    }

    /// Rebuilds a `T` from the packed bytes, whether or not a typed
    /// instance is attached.
    pub fn unpack_as<T: Packable>(&self, registry: &Registry) -> Result<T, PackError> {
        if self.type_name != T::TYPE_NAME {
            return Err(PackError::extension(
                T::TYPE_NAME,
                format!("extension holds a {}", self.type_name),
            ));
        }
        T::unpack(&self.data, registry)
    }

    /// Extension frame payload: `hex(type_name) '_' data`.
    pub fn to_body(&self) -> Vec<u8> {
        let name = hex::encode(self.type_name.as_bytes());
        let mut body = Vec::with_capacity(name.len() + 1 + self.data.len());
        body.extend_from_slice(name.as_bytes());
        body.push(EXTENSION_SEPARATOR);
        body.extend_from_slice(&self.data);
        body
    }

    /// Parses an extension frame payload and rebuilds the value through
    /// `registry`.
    pub fn from_body(body: &[u8], registry: &Registry) -> Result<Extension, PackError> {
        let (type_name, data) = split_body(body)?;
        registry.unpack(&type_name, data)
    }
}

/// Splits an extension payload at the first separator and decodes the
/// hex type name.
pub fn split_body(body: &[u8]) -> Result<(String, &[u8]), FramingError> {
    let sep = body
        .iter()
        .position(|&b| b == EXTENSION_SEPARATOR)
        .ok_or(FramingError::MissingSeparator)?;
    let name = hex::decode(&body[..sep]).map_err(|_| FramingError::InvalidTypeName)?;
    let type_name = String::from_utf8(name).map_err(|_| FramingError::InvalidTypeName)?;
    Ok((type_name, &body[sep + 1..]))
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("type_name", &self.type_name)
            .field("data", &hex::encode(&self.data))
            .field("opaque", &self.is_opaque())
            .finish()
    }
}

impl PartialEq for Extension {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.data == other.data
    }
}

impl Eq for Extension {}

impl PartialOrd for Extension {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Extension {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.type_name, &self.data).cmp(&(&other.type_name, &other.data))
    }
}

impl Hash for Extension {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_name.hash(state);
        self.data.hash(state);
    }
}

/// Rebuilds an [`Extension`] from its packed bytes.
///
/// Implemented for every `Fn(&[u8], &Registry) -> Result<Extension, PackError>`
/// closure and, through [`Registry::register`], for every [`Packable`].
pub trait ExtensionHandler: Send + Sync {
    fn unpack(&self, data: &[u8], registry: &Registry) -> Result<Extension, PackError>;
}

impl<F> ExtensionHandler for F
where
    F: Fn(&[u8], &Registry) -> Result<Extension, PackError> + Send + Sync,
{
    fn unpack(&self, data: &[u8], registry: &Registry) -> Result<Extension, PackError> {
        self(data, registry)
    }
}

/// Handler that rebuilds a concrete [`Packable`] type.
pub struct PackableHandler<T>(PhantomData<fn() -> T>);

impl<T> PackableHandler<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for PackableHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Packable> ExtensionHandler for PackableHandler<T> {
    fn unpack(&self, data: &[u8], registry: &Registry) -> Result<Extension, PackError> {
        T::unpack(data, registry).map(Extension::new)
    }
}
