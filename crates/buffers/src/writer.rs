//! Binary buffer writer with length back-patching.

/// A binary buffer writer that grows as needed.
///
/// All multi-byte quantities are written big-endian.
///
/// # Example
///
/// ```
/// use packify_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(b's');
/// let slot = writer.reserve_u32();
/// writer.buf(b"hi");
/// writer.patch_u32(slot, 2);
/// assert_eq!(writer.flush(), [b's', 0, 0, 0, 2, b'h', b'i']);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Writer {
    /// The underlying byte buffer.
    pub uint8: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { uint8: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            uint8: Vec::with_capacity(capacity),
        }
    }

    /// Current cursor position, which is also the number of bytes written.
    #[inline]
    pub fn x(&self) -> usize {
        self.uint8.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uint8.is_empty()
    }

    /// Discards everything written so far.
    pub fn reset(&mut self) {
        self.uint8.clear();
    }

    /// Returns the written data and leaves the writer empty.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.uint8)
    }

    /// Removes and returns every byte written at or after `pos`.
    pub fn split_off(&mut self, pos: usize) -> Vec<u8> {
        self.uint8.split_off(pos)
    }

    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.uint8.push(val);
    }

    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn i64(&mut self, val: i64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn f64(&mut self, val: f64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a tag byte followed by a big-endian u32.
    #[inline]
    pub fn u8u32(&mut self, u8_val: u8, u32_val: u32) {
        self.u8(u8_val);
        self.u32(u32_val);
    }

    /// Writes raw bytes.
    pub fn buf(&mut self, buf: &[u8]) {
        self.uint8.extend_from_slice(buf);
    }

    /// Writes a zeroed u32 placeholder and returns its position, to be
    /// filled in later with [`Writer::patch_u32`].
    pub fn reserve_u32(&mut self) -> usize {
        let pos = self.x();
        self.u32(0);
        pos
    }

    /// Overwrites the four bytes at `pos` with a big-endian u32.
    ///
    /// # Panics
    ///
    /// Panics if fewer than four bytes were written at `pos`.
    pub fn patch_u32(&mut self, pos: usize, val: u32) {
        self.uint8[pos..pos + 4].copy_from_slice(&val.to_be_bytes());
    }
}
