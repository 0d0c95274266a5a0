//! `PackEncoder`: writes a [`Value`] tree as one frame.
//!
//! Wire format, every frame being `tag || be_u32(len) || payload`:
//! - Absent:    `n`, empty payload
//! - Boolean:   `B`, one byte 0 or 1
//! - Integer:   `i`, 8-byte big-endian two's complement
//! - Float:     `f`, 8-byte big-endian IEEE-754
//! - Decimal:   `D`, canonical decimal string
//! - Text:      `s`, UTF-8 bytes
//! - Bytes:     `b` / ByteArray `a`, raw bytes
//! - Sequence:  `l` / Tuple `t`, element frames in order
//! - Set:       `e`, element frames sorted by their bytes
//! - Mapping:   `d`, `(key, value)` tuple frames sorted by their bytes
//! - Extension: `p`, `hex(type name) '_' packed bytes`

use std::collections::{BTreeMap, BTreeSet};

use packify_buffers::Writer;
use tracing::{debug, trace};

use crate::constants::{Tag, DEFAULT_MAX_DEPTH};
use crate::error::{PackError, UsageError};
use crate::extension::Extension;
use crate::frame;
use crate::{Decimal, Value};

/// Options controlling encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Deepest container nesting accepted; the top-level value is depth 0.
    pub max_depth: usize,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

pub struct PackEncoder {
    pub writer: Writer,
    pub options: EncoderOptions,
}

impl Default for PackEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PackEncoder {
    pub fn new() -> Self {
        Self::with_options(EncoderOptions::default())
    }

    pub fn with_options(options: EncoderOptions) -> Self {
        Self {
            writer: Writer::new(),
            options,
        }
    }

    /// Encodes `value` into a fresh frame. Nothing is returned on failure.
    pub fn encode(&mut self, value: &Value) -> Result<Vec<u8>, PackError> {
        self.writer.reset();
        if let Err(err) = self.write_any(value, 0) {
            self.writer.reset();
            return Err(err);
        }
        let out = self.writer.flush();
        trace!(kind = value.kind(), bytes = out.len(), "encoded value");
        Ok(out)
    }

    /// Writes the frame of `value`, which sits `depth` containers deep.
    pub fn write_any(&mut self, value: &Value, depth: usize) -> Result<(), PackError> {
        self.enter(depth)?;
        match value {
            Value::Absent => self.write_absent(),
            Value::Boolean(b) => self.write_boolean(*b),
            Value::Integer(i) => self.write_integer(*i),
            Value::Float(f) => self.write_float(f.0),
            Value::Decimal(d) => self.write_decimal(d)?,
            Value::Text(s) => self.write_text(s)?,
            Value::Bytes(b) => self.write_bytes(Tag::Bytes, b)?,
            Value::ByteArray(b) => self.write_bytes(Tag::ByteArray, b)?,
            Value::Sequence(items) => self.write_ordered(Tag::Sequence, items, depth)?,
            Value::Tuple(items) => self.write_ordered(Tag::Tuple, items, depth)?,
            Value::Set(items) => self.write_set(items, depth)?,
            Value::Mapping(map) => self.write_mapping(map, depth)?,
            Value::Extension(ext) => self.write_extension(ext)?,
        }
        Ok(())
    }

    fn enter(&self, depth: usize) -> Result<(), PackError> {
        if depth > self.options.max_depth {
            debug!(max_depth = self.options.max_depth, "encode depth limit hit");
            return Err(UsageError::DepthLimit(self.options.max_depth).into());
        }
        Ok(())
    }

    pub fn write_absent(&mut self) {
        self.writer.u8u32(Tag::Absent.byte(), 0);
    }

    pub fn write_boolean(&mut self, b: bool) {
        self.writer.u8u32(Tag::Boolean.byte(), 1);
        self.writer.u8(u8::from(b));
    }

    pub fn write_integer(&mut self, int: i64) {
        self.writer.u8u32(Tag::Integer.byte(), 8);
        self.writer.i64(int);
    }

    pub fn write_float(&mut self, float: f64) {
        self.writer.u8u32(Tag::Float.byte(), 8);
        self.writer.f64(float);
    }

    pub fn write_decimal(&mut self, decimal: &Decimal) -> Result<(), PackError> {
        frame::write_frame_into(&mut self.writer, Tag::Decimal, decimal.as_str().as_bytes())?;
        Ok(())
    }

    pub fn write_text(&mut self, s: &str) -> Result<(), PackError> {
        frame::write_frame_into(&mut self.writer, Tag::Text, s.as_bytes())?;
        Ok(())
    }

    pub fn write_bytes(&mut self, tag: Tag, buf: &[u8]) -> Result<(), PackError> {
        frame::write_frame_into(&mut self.writer, tag, buf)?;
        Ok(())
    }

    pub fn write_extension(&mut self, ext: &Extension) -> Result<(), PackError> {
        frame::write_frame_into(&mut self.writer, Tag::Extension, &ext.to_body())?;
        Ok(())
    }

    /// Sequence or tuple: element frames in iteration order.
    pub fn write_ordered(
        &mut self,
        tag: Tag,
        items: &[Value],
        depth: usize,
    ) -> Result<(), PackError> {
        let slot = frame::begin_frame(&mut self.writer, tag);
        for item in items {
            self.write_any(item, depth + 1)?;
        }
        frame::end_frame(&mut self.writer, slot)?;
        Ok(())
    }

    pub fn write_set(&mut self, items: &BTreeSet<Value>, depth: usize) -> Result<(), PackError> {
        let slot = frame::begin_frame(&mut self.writer, Tag::Set);
        let start = self.writer.x();
        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            self.write_any(item, depth + 1)?;
            entries.push(self.writer.split_off(start));
        }
        self.write_canonical(entries);
        frame::end_frame(&mut self.writer, slot)?;
        Ok(())
    }

    /// Each entry is framed as a 2-tuple `(key, value)`.
    pub fn write_mapping(
        &mut self,
        map: &BTreeMap<Value, Value>,
        depth: usize,
    ) -> Result<(), PackError> {
        let slot = frame::begin_frame(&mut self.writer, Tag::Mapping);
        let start = self.writer.x();
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            self.write_pair(key, value, depth + 1)?;
            entries.push(self.writer.split_off(start));
        }
        self.write_canonical(entries);
        frame::end_frame(&mut self.writer, slot)?;
        Ok(())
    }

    fn write_pair(&mut self, key: &Value, value: &Value, depth: usize) -> Result<(), PackError> {
        self.enter(depth)?;
        let slot = frame::begin_frame(&mut self.writer, Tag::Tuple);
        self.write_any(key, depth + 1)?;
        self.write_any(value, depth + 1)?;
        frame::end_frame(&mut self.writer, slot)?;
        Ok(())
    }

    /// Writes already-encoded entry frames in byte order, which makes the
    /// output independent of how the collection was built.
    fn write_canonical(&mut self, mut entries: Vec<Vec<u8>>) {
        entries.sort_unstable();
        for entry in &entries {
            self.writer.buf(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(value: &Value) -> Vec<u8> {
        PackEncoder::new().encode(value).unwrap()
    }

    #[test]
    fn scalar_frames() {
        assert_eq!(enc(&Value::Absent), [b'n', 0, 0, 0, 0]);
        assert_eq!(enc(&Value::from(true)), [b'B', 0, 0, 0, 1, 1]);
        assert_eq!(enc(&Value::from(false)), [b'B', 0, 0, 0, 1, 0]);
        assert_eq!(
            enc(&Value::from(-2)),
            [b'i', 0, 0, 0, 8, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]
        );
        let mut float = vec![b'f', 0, 0, 0, 8];
        float.extend(123.456f64.to_be_bytes());
        assert_eq!(enc(&Value::from(123.456)), float);
        assert_eq!(enc(&Value::from("hé")), [b's', 0, 0, 0, 3, b'h', 0xc3, 0xa9]);
        assert_eq!(enc(&Value::Bytes(vec![7])), [b'b', 0, 0, 0, 1, 7]);
        assert_eq!(enc(&Value::ByteArray(vec![7])), [b'a', 0, 0, 0, 1, 7]);
        assert_eq!(
            enc(&Value::decimal("123.456").unwrap()),
            b"D\x00\x00\x00\x07123.456"
        );
    }

    #[test]
    fn sequence_and_tuple_share_layout() {
        let seq = enc(&Value::sequence([1, 2]));
        let tup = enc(&Value::tuple([1, 2]));
        assert_eq!(seq[0], b'l');
        assert_eq!(tup[0], b't');
        assert_eq!(seq[1..], tup[1..]);
        assert_eq!(&seq[1..5], &[0, 0, 0, 26]);
    }

    #[test]
    fn set_entries_are_sorted_by_bytes() {
        // Integer frames start with 'i' (0x69), text frames with 's' (0x73).
        let bytes = enc(&Value::set([Value::from("a"), Value::from(1)]));
        assert_eq!(bytes[0], b'e');
        assert_eq!(bytes[5], b'i');
        assert_eq!(bytes[5 + 13], b's');
    }

    #[test]
    fn mapping_entries_are_pair_tuples() {
        let bytes = enc(&Value::mapping([(1, 2)]));
        assert_eq!(bytes[0], b'd');
        assert_eq!(&bytes[1..5], &[0, 0, 0, 31]);
        assert_eq!(bytes[5], b't');
        assert_eq!(&bytes[6..10], &[0, 0, 0, 26]);
    }

    #[test]
    fn depth_limit() {
        let mut value = Value::Absent;
        for _ in 0..4 {
            value = Value::sequence([value]);
        }
        let mut shallow = PackEncoder::with_options(EncoderOptions { max_depth: 3 });
        assert_eq!(
            shallow.encode(&value),
            Err(PackError::Usage(UsageError::DepthLimit(3)))
        );
        // the failed attempt leaves nothing behind
        assert!(shallow.writer.is_empty());
        let mut deep_enough = PackEncoder::with_options(EncoderOptions { max_depth: 4 });
        assert!(deep_enough.encode(&value).is_ok());
    }

    #[test]
    fn mapping_pairs_count_toward_depth() {
        let value = Value::mapping([(1, 2)]);
        let mut encoder = PackEncoder::with_options(EncoderOptions { max_depth: 1 });
        assert!(encoder.encode(&value).is_err());
        let mut encoder = PackEncoder::with_options(EncoderOptions { max_depth: 2 });
        assert!(encoder.encode(&value).is_ok());
    }

    #[test]
    fn encoder_is_reusable() {
        let mut encoder = PackEncoder::default();
        let a = encoder.encode(&Value::from(1)).unwrap();
        let b = encoder.encode(&Value::from(1)).unwrap();
        assert_eq!(a, b);
    }
}
