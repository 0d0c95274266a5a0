//! Frame envelope: `tag (1) || payload length (4, big-endian) || payload`.

use packify_buffers::{Reader, Writer};

use crate::constants::{Tag, HEADER_SIZE};
use crate::error::FramingError;

/// One frame read from a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Raw tag byte; may not be a known [`Tag`].
    pub tag: u8,
    pub payload: &'a [u8],
    /// Header plus payload size.
    pub consumed: usize,
}

impl Frame<'_> {
    pub fn tag(&self) -> Result<Tag, FramingError> {
        Tag::try_from(self.tag).map_err(FramingError::UnknownTag)
    }
}

/// Checks that a payload length fits the 4-byte length field.
pub fn payload_len(len: usize) -> Result<u32, FramingError> {
    u32::try_from(len).map_err(|_| FramingError::PayloadTooLarge(len))
}

/// Returns a standalone frame wrapping `payload`.
pub fn write_frame(tag: Tag, payload: &[u8]) -> Result<Vec<u8>, FramingError> {
    let mut writer = Writer::with_capacity(HEADER_SIZE + payload.len());
    write_frame_into(&mut writer, tag, payload)?;
    Ok(writer.flush())
}

/// Appends a frame wrapping `payload` to `writer`.
pub fn write_frame_into(writer: &mut Writer, tag: Tag, payload: &[u8]) -> Result<(), FramingError> {
    let len = payload_len(payload.len())?;
    writer.u8u32(tag.byte(), len);
    writer.buf(payload);
    Ok(())
}

/// Writes the tag and a placeholder length; returns the position of the
/// placeholder for [`end_frame`].
pub fn begin_frame(writer: &mut Writer, tag: Tag) -> usize {
    writer.u8(tag.byte());
    writer.reserve_u32()
}

/// Fills in the length reserved by [`begin_frame`] with the number of
/// bytes written since.
pub fn end_frame(writer: &mut Writer, slot: usize) -> Result<(), FramingError> {
    let len = payload_len(writer.x() - slot - 4)?;
    writer.patch_u32(slot, len);
    Ok(())
}

/// Reads the frame at the start of `input`.
pub fn read_frame(input: &[u8]) -> Result<Frame<'_>, FramingError> {
    let mut reader = Reader::new(input);
    read_frame_from(&mut reader)
}

/// Reads one frame at the reader's cursor and advances past it.
pub fn read_frame_from<'a>(reader: &mut Reader<'a>) -> Result<Frame<'a>, FramingError> {
    let available = reader.size();
    if available < HEADER_SIZE {
        return Err(FramingError::ShortHeader { available });
    }
    let tag = reader.u8()?;
    let declared = reader.u32()? as usize;
    let remaining = reader.size();
    if declared > remaining {
        return Err(FramingError::Truncated {
            declared,
            available: remaining,
        });
    }
    let body = reader.cut(declared)?;
    Ok(Frame {
        tag,
        payload: body.rest(),
        consumed: HEADER_SIZE + declared,
    })
}

/// Iterates over back-to-back frames; stops after the first error.
pub fn frames(input: &[u8]) -> FrameIter<'_> {
    FrameIter {
        reader: Reader::new(input),
        failed: false,
    }
}

pub struct FrameIter<'a> {
    reader: Reader<'a>,
    failed: bool,
}

impl FrameIter<'_> {
    /// Offset of the next frame in the input.
    pub fn offset(&self) -> usize {
        self.reader.x
    }
}

impl<'a> Iterator for FrameIter<'a> {
    type Item = Result<Frame<'a>, FramingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_empty() {
            return None;
        }
        let result = read_frame_from(&mut self.reader);
        self.failed = result.is_err();
        Some(result)
    }
}
