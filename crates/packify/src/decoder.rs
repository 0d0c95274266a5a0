//! `PackDecoder`: rebuilds a [`Value`] from a frame.
//!
//! Every read is bounds-checked against the enclosing frame, so malformed
//! input ends in a [`FramingError`] and never reads past a payload.

use std::collections::{BTreeMap, BTreeSet};

use packify_buffers::Reader;
use tracing::{debug, trace};

use crate::constants::{Tag, DEFAULT_MAX_DEPTH};
use crate::error::{FramingError, PackError};
use crate::extension::Extension;
use crate::frame;
use crate::registry::Registry;
use crate::{Decimal, Float, Value};

/// Options controlling decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Deepest container nesting accepted; the top-level value is depth 0.
    pub max_depth: usize,
    /// When `false`, [`PackDecoder::decode`] fails if bytes follow the
    /// first frame.
    pub allow_trailing_bytes: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            allow_trailing_bytes: true,
        }
    }
}

pub struct PackDecoder<'r> {
    pub registry: &'r Registry,
    pub options: DecoderOptions,
}

impl<'r> PackDecoder<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_options(registry, DecoderOptions::default())
    }

    pub fn with_options(registry: &'r Registry, options: DecoderOptions) -> Self {
        Self { registry, options }
    }

    /// Decodes the frame at the start of `input`.
    pub fn decode(&self, input: &[u8]) -> Result<Value, PackError> {
        self.decode_with_consumed(input).map(|(value, _)| value)
    }

    /// Decodes the frame at the start of `input` and reports how many
    /// bytes it spanned.
    pub fn decode_with_consumed(&self, input: &[u8]) -> Result<(Value, usize), PackError> {
        let mut reader = Reader::new(input);
        let value = self.read_any(&mut reader, 0)?;
        let consumed = reader.x;
        if !self.options.allow_trailing_bytes && !reader.is_empty() {
            return Err(FramingError::TrailingBytes(reader.size()).into());
        }
        trace!(kind = value.kind(), consumed, "decoded value");
        Ok((value, consumed))
    }

    /// Reads one frame at the cursor; `depth` is how many containers
    /// enclose it.
    pub fn read_any(&self, reader: &mut Reader<'_>, depth: usize) -> Result<Value, PackError> {
        if depth > self.options.max_depth {
            debug!(max_depth = self.options.max_depth, "decode depth limit hit");
            return Err(FramingError::DepthLimit(self.options.max_depth).into());
        }
        let frame = frame::read_frame_from(reader)?;
        let tag = frame.tag()?;
        let payload = frame.payload;
        let value = match tag {
            Tag::Absent => {
                expect_len(tag, payload, &[0])?;
                Value::Absent
            }
            Tag::Boolean => {
                expect_len(tag, payload, &[1])?;
                match payload[0] {
                    0 => Value::Boolean(false),
                    1 => Value::Boolean(true),
                    other => return Err(FramingError::InvalidBoolean(other).into()),
                }
            }
            Tag::Integer => Value::Integer(read_integer(payload)?),
            Tag::Float => {
                expect_len(tag, payload, &[8])?;
                Value::Float(Float(Reader::new(payload).f64()?))
            }
            Tag::Decimal => Value::Decimal(read_decimal(payload)?),
            Tag::Text => {
                let s = std::str::from_utf8(payload).map_err(|_| FramingError::InvalidUtf8)?;
                Value::Text(s.to_string())
            }
            Tag::Bytes => Value::Bytes(payload.to_vec()),
            Tag::ByteArray => Value::ByteArray(payload.to_vec()),
            Tag::Sequence => Value::Sequence(self.read_items(payload, depth)?),
            Tag::Tuple => Value::Tuple(self.read_items(payload, depth)?),
            Tag::Set => {
                let items: BTreeSet<Value> = self.read_items(payload, depth)?.into_iter().collect();
                Value::Set(items)
            }
            Tag::Mapping => Value::Mapping(self.read_mapping(payload, depth)?),
            Tag::Extension => {
                let registry = self.registry.at_depth(depth, self.options.max_depth);
                Value::Extension(Extension::from_body(payload, &registry)?)
            }
        };
        Ok(value)
    }

    /// Reads back-to-back child frames filling a container payload.
    fn read_items(&self, payload: &[u8], depth: usize) -> Result<Vec<Value>, PackError> {
        let mut reader = Reader::new(payload);
        let mut items = Vec::new();
        while !reader.is_empty() {
            items.push(self.read_any(&mut reader, depth + 1)?);
        }
        Ok(items)
    }

    /// A repeated key keeps the value that came last on the wire.
    fn read_mapping(
        &self,
        payload: &[u8],
        depth: usize,
    ) -> Result<BTreeMap<Value, Value>, PackError> {
        let mut map = BTreeMap::new();
        for (index, item) in self.read_items(payload, depth)?.into_iter().enumerate() {
            match item {
                Value::Tuple(pair) if pair.len() == 2 => {
                    let mut pair = pair.into_iter();
                    if let (Some(key), Some(value)) = (pair.next(), pair.next()) {
                        map.insert(key, value);
                    }
                }
                _ => return Err(FramingError::InvalidPair { index }.into()),
            }
        }
        Ok(map)
    }
}

fn expect_len(tag: Tag, payload: &[u8], allowed: &[usize]) -> Result<(), FramingError> {
    if allowed.contains(&payload.len()) {
        Ok(())
    } else {
        Err(FramingError::InvalidLength {
            tag: char::from(tag.byte()),
            actual: payload.len(),
        })
    }
}

/// 8-byte signed payloads, plus the 4-byte unsigned form older writers
/// produced.
fn read_integer(payload: &[u8]) -> Result<i64, FramingError> {
    expect_len(Tag::Integer, payload, &[8, 4])?;
    let mut reader = Reader::new(payload);
    let int = if payload.len() == 8 {
        reader.i64()?
    } else {
        i64::from(reader.u32()?)
    };
    Ok(int)
}

fn read_decimal(payload: &[u8]) -> Result<Decimal, FramingError> {
    let literal = std::str::from_utf8(payload).map_err(|_| FramingError::InvalidUtf8)?;
    Decimal::parse(literal).map_err(|_| FramingError::InvalidDecimal(literal.to_string()))
}
