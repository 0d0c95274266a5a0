//! Wire tags.

/// One-byte type tag at the start of every frame.
///
/// The byte values are part of the wire format and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Extension = b'p',
    Sequence = b'l',
    Set = b'e',
    Tuple = b't',
    Mapping = b'd',
    Bytes = b'b',
    ByteArray = b'a',
    Text = b's',
    Integer = b'i',
    Boolean = b'B',
    Float = b'f',
    Decimal = b'D',
    Absent = b'n',
}

impl Tag {
    pub const ALL: [Tag; 13] = [
        Tag::Extension,
        Tag::Sequence,
        Tag::Set,
        Tag::Tuple,
        Tag::Mapping,
        Tag::Bytes,
        Tag::ByteArray,
        Tag::Text,
        Tag::Integer,
        Tag::Boolean,
        Tag::Float,
        Tag::Decimal,
        Tag::Absent,
    ];

    #[inline]
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Returns `true` for tags whose payload is a run of nested frames.
    pub fn is_container(self) -> bool {
        matches!(self, Tag::Sequence | Tag::Set | Tag::Tuple | Tag::Mapping)
    }
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        Ok(match byte {
            b'p' => Tag::Extension,
            b'l' => Tag::Sequence,
            b'e' => Tag::Set,
            b't' => Tag::Tuple,
            b'd' => Tag::Mapping,
            b'b' => Tag::Bytes,
            b'a' => Tag::ByteArray,
            b's' => Tag::Text,
            b'i' => Tag::Integer,
            b'B' => Tag::Boolean,
            b'f' => Tag::Float,
            b'D' => Tag::Decimal,
            b'n' => Tag::Absent,
            other => return Err(other),
        })
    }
}

/// Separator between the hex type name and the packed bytes of an
/// extension payload.
pub const EXTENSION_SEPARATOR: u8 = b'_';

/// Tag byte plus the 4-byte length.
pub const HEADER_SIZE: usize = 5;

/// Largest payload a single frame can declare.
pub const MAX_PAYLOAD_SIZE: usize = u32::MAX as usize;

/// Nesting depth accepted by default before encoding or decoding fails.
pub const DEFAULT_MAX_DEPTH: usize = 512;
