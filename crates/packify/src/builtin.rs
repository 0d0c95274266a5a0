//! Extension types every [`Registry::with_builtins`] knows about.

use packify_buffers::{Reader, Writer};

use crate::error::PackError;
use crate::extension::{Extension, Packable};
use crate::registry::Registry;

/// A string carried as an extension value rather than as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StrWrapper(pub String);

impl StrWrapper {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Packable for StrWrapper {
    const TYPE_NAME: &'static str = "StrWrapper";

    fn pack(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }

    fn unpack(data: &[u8], _registry: &Registry) -> Result<Self, PackError> {
        String::from_utf8(data.to_vec())
            .map(Self)
            .map_err(|_| PackError::extension(Self::TYPE_NAME, "invalid UTF-8"))
    }
}

/// A key/value pair of two extension values.
///
/// Packed as `u16 key_len, u16 value_len, key, value`, each side being a
/// full extension body (hex type name, `_`, packed bytes) that is resolved
/// through the registry of the enclosing decode.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MapEntry {
    key: Extension,
    value: Extension,
}

impl MapEntry {
    /// Fails when either side's extension body is longer than a u16 length
    /// can describe.
    pub fn new(key: Extension, value: Extension) -> Result<Self, PackError> {
        for side in [&key, &value] {
            let len = side.to_body().len();
            if len > usize::from(u16::MAX) {
                return Err(PackError::extension(
                    Self::TYPE_NAME,
                    format!("{} body of {len} bytes does not fit a u16 length", side.type_name()),
                ));
            }
        }
        Ok(Self { key, value })
    }

    /// Convenience constructor for two typed packables.
    pub fn of<K: Packable, V: Packable>(key: K, value: V) -> Result<Self, PackError> {
        Self::new(Extension::new(key), Extension::new(value))
    }

    pub fn key(&self) -> &Extension {
        &self.key
    }

    pub fn value(&self) -> &Extension {
        &self.value
    }
}

impl Packable for MapEntry {
    const TYPE_NAME: &'static str = "PackableMapEntry";

    fn pack(&self) -> Vec<u8> {
        let key = self.key.to_body();
        let value = self.value.to_body();
        let mut writer = Writer::with_capacity(4 + key.len() + value.len());
        // lengths are bounded by `MapEntry::new`
        writer.u16(key.len() as u16);
        writer.u16(value.len() as u16);
        writer.buf(&key);
        writer.buf(&value);
        writer.flush()
    }

    fn unpack(data: &[u8], registry: &Registry) -> Result<Self, PackError> {
        let mut reader = Reader::new(data);
        let key_len = usize::from(reader.u16()?);
        let value_len = usize::from(reader.u16()?);
        let key = reader.buf(key_len)?;
        let value = reader.buf(value_len)?;
        if !reader.is_empty() {
            return Err(PackError::extension(
                Self::TYPE_NAME,
                format!("{} trailing bytes", reader.size()),
            ));
        }
        Ok(Self {
            key: Extension::from_body(key, registry)?,
            value: Extension::from_body(value, registry)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UsageError;

    #[test]
    fn str_wrapper_roundtrip() {
        let w = StrWrapper::new("some key");
        let back = StrWrapper::unpack(&w.pack(), &Registry::new()).unwrap();
        assert_eq!(back, w);
        assert!(StrWrapper::unpack(&[0xff], &Registry::new())
            .unwrap_err()
            .is_usage());
    }

    #[test]
    fn map_entry_layout() {
        let entry = MapEntry::of(StrWrapper::new("k"), StrWrapper::new("vv")).unwrap();
        let packed = entry.pack();
        // 20 hex chars + '_' + payload
        assert_eq!(&packed[..4], &[0, 22, 0, 23]);
        assert_eq!(&packed[4..26], b"53747257726170706572_k");
        assert_eq!(&packed[26..], b"53747257726170706572_vv");
    }

    #[test]
    fn map_entry_resolves_sides_through_registry() {
        let entry = MapEntry::of(StrWrapper::new("123"), StrWrapper::new("321")).unwrap();
        let packed = entry.pack();

        let back = MapEntry::unpack(&packed, &Registry::with_builtins()).unwrap();
        assert_eq!(back, entry);
        assert_eq!(
            back.value().downcast_ref::<StrWrapper>(),
            Some(&StrWrapper::new("321"))
        );

        let err = MapEntry::unpack(&packed, &Registry::new()).unwrap_err();
        assert_eq!(
            err,
            PackError::Usage(UsageError::UnknownExtension("StrWrapper".into()))
        );
    }

    #[test]
    fn map_entry_rejects_bad_lengths() {
        let packed = MapEntry::of(StrWrapper::new("a"), StrWrapper::new("b"))
            .unwrap()
            .pack();
        let registry = Registry::with_builtins();
        assert!(MapEntry::unpack(&packed[..packed.len() - 1], &registry)
            .unwrap_err()
            .is_framing());

        let mut longer = packed.clone();
        longer.push(0);
        assert!(MapEntry::unpack(&longer, &registry).unwrap_err().is_usage());

        let huge = StrWrapper::new("x".repeat(usize::from(u16::MAX)));
        assert!(MapEntry::of(huge, StrWrapper::new("y")).is_err());
    }
}
