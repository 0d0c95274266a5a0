//! The [`Value`] tree every encoder and decoder works on.

use std::any::Any;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use crate::constants::Tag;
use crate::error::{PackError, UsageError};
use crate::extension::{Extension, Packable};
use crate::Decimal;

/// An IEEE-754 double with total equality and ordering.
///
/// Equality and hashing use the bit pattern, ordering uses
/// [`f64::total_cmp`]. `NaN == NaN` holds for identical payloads and
/// `0.0 != -0.0`, which matches how the two encode on the wire.
#[derive(Debug, Clone, Copy, Default)]
pub struct Float(pub f64);

impl PartialEq for Float {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Float {}

impl PartialOrd for Float {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Float {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Float {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f64> for Float {
    fn from(f: f64) -> Self {
        Float(f)
    }
}

/// Every kind of value the codec can frame.
///
/// `Set` and `Mapping` are ordered collections in memory only so that the
/// enum can be `Ord + Hash`; their wire order is always the byte order of
/// the encoded entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// No value.
    Absent,
    Boolean(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    Float(Float),
    Decimal(Decimal),
    Text(String),
    /// Immutable byte string.
    Bytes(Vec<u8>),
    /// Mutable byte buffer; same payload as `Bytes`, different tag.
    ByteArray(Vec<u8>),
    Sequence(Vec<Value>),
    /// Fixed-arity product; same payload as `Sequence`, different tag.
    Tuple(Vec<Value>),
    Set(BTreeSet<Value>),
    Mapping(BTreeMap<Value, Value>),
    Extension(Extension),
}

impl Value {
    /// Human-readable name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::ByteArray(_) => "bytearray",
            Value::Sequence(_) => "sequence",
            Value::Tuple(_) => "tuple",
            Value::Set(_) => "set",
            Value::Mapping(_) => "mapping",
            Value::Extension(_) => "extension",
        }
    }

    /// Wire tag this value is framed with.
    pub fn tag(&self) -> Tag {
        match self {
            Value::Absent => Tag::Absent,
            Value::Boolean(_) => Tag::Boolean,
            Value::Integer(_) => Tag::Integer,
            Value::Float(_) => Tag::Float,
            Value::Decimal(_) => Tag::Decimal,
            Value::Text(_) => Tag::Text,
            Value::Bytes(_) => Tag::Bytes,
            Value::ByteArray(_) => Tag::ByteArray,
            Value::Sequence(_) => Tag::Sequence,
            Value::Tuple(_) => Tag::Tuple,
            Value::Set(_) => Tag::Set,
            Value::Mapping(_) => Tag::Mapping,
            Value::Extension(_) => Tag::Extension,
        }
    }

    pub fn float(f: f64) -> Self {
        Value::Float(Float(f))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn decimal(literal: &str) -> Result<Self, PackError> {
        let decimal = Decimal::parse(literal).map_err(UsageError::from)?;
        Ok(Value::Decimal(decimal))
    }

    pub fn sequence<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }

    pub fn tuple<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Builds a set, dropping duplicates.
    pub fn set<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Set(items.into_iter().map(Into::into).collect())
    }

    /// Builds a mapping; a repeated key keeps the last value.
    pub fn mapping<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn extension<T: Packable>(value: T) -> Self {
        Value::Extension(Extension::new(value))
    }

    /// Converts an arbitrary Rust value into a [`Value`].
    ///
    /// Accepts `Value` itself and the native types that have a direct
    /// counterpart (integers, `bool`, floats, strings, byte vectors,
    /// [`Decimal`], [`Extension`], `()`, and already-built collections of
    /// values). Anything else fails with [`UsageError::Unsupported`]
    /// naming the Rust type.
    pub fn from_native<T: Any>(value: &T) -> Result<Value, PackError> {
        let any = value as &dyn Any;
        if let Some(v) = any.downcast_ref::<Value>() {
            return Ok(v.clone());
        }
        if let Some(v) = any.downcast_ref::<&'static str>() {
            return Ok(Value::from(*v));
        }
        macro_rules! native {
            ($($ty:ty),* $(,)?) => {
                $(
                    if let Some(v) = any.downcast_ref::<$ty>() {
                        return Ok(Value::from(v.clone()));
                    }
                )*
            };
        }
        native!(
            bool,
            i8,
            i16,
            i32,
            i64,
            u8,
            u16,
            u32,
            u64,
            f32,
            f64,
            String,
            Vec<u8>,
            Decimal,
            Extension,
            (),
            Vec<Value>,
            BTreeSet<Value>,
            BTreeMap<Value, Value>,
        );
        Err(UsageError::Unsupported {
            kind: std::any::type_name::<T>().to_string(),
        }
        .into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f.0),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            Value::Decimal(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Payload of either byte variant.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) | Value::ByteArray(b) => Some(b),
            _ => None,
        }
    }

    /// Elements of a sequence or a tuple.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<Value>> {
        match self {
            Value::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<Value, Value>> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_extension(&self) -> Option<&Extension> {
        match self {
            Value::Extension(ext) => Some(ext),
            _ => None,
        }
    }

    /// Typed view of an extension value.
    pub fn downcast_ref<T: Packable>(&self) -> Option<&T> {
        self.as_extension()?.downcast_ref::<T>()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

macro_rules! from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(i: $ty) -> Self {
                    Value::Integer(i64::from(i))
                }
            }
        )*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    /// Values above `i64::MAX` become decimals rather than wrapping.
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Decimal(Decimal::from(u)),
        }
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(Float(f))
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(Float(f64::from(f)))
    }
}

impl From<Float> for Value {
    fn from(f: Float) -> Self {
        Value::Float(f)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<BTreeSet<Value>> for Value {
    fn from(items: BTreeSet<Value>) -> Self {
        Value::Set(items)
    }
}

impl From<BTreeMap<Value, Value>> for Value {
    fn from(map: BTreeMap<Value, Value>) -> Self {
        Value::Mapping(map)
    }
}

impl From<Extension> for Value {
    fn from(ext: Extension) -> Self {
        Value::Extension(ext)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Absent
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Absent, Into::into)
    }
}
