//! Bounds-checked binary buffer reader with cursor tracking.

use crate::BufferError;

/// A binary buffer reader over a borrowed byte slice.
///
/// The reader keeps a cursor `x` and an exclusive `end`. Every read checks
/// the remaining size first and returns [`BufferError::UnexpectedEof`]
/// rather than indexing out of bounds.
///
/// # Example
///
/// ```
/// use packify_buffers::Reader;
///
/// let data = [0x01, 0x00, 0x00, 0x00, 0x02, 0xaa, 0xbb];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8().unwrap(), 0x01);
/// assert_eq!(reader.u32().unwrap(), 2);
/// assert_eq!(reader.buf(2).unwrap(), &[0xaa, 0xbb]);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
    /// End position (exclusive).
    pub end: usize,
}

impl<'a> Reader<'a> {
    pub fn new(uint8: &'a [u8]) -> Self {
        Self {
            uint8,
            x: 0,
            end: uint8.len(),
        }
    }

    /// Creates a reader over `uint8[x..end]`.
    pub fn from_slice(uint8: &'a [u8], x: usize, end: usize) -> Self {
        Self { uint8, x, end }
    }

    /// Returns the number of remaining bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.end.saturating_sub(self.x)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        let remaining = self.size();
        if n > remaining {
            Err(BufferError::UnexpectedEof {
                needed: n,
                remaining,
            })
        } else {
            Ok(())
        }
    }

    /// Returns the unread remainder without advancing.
    pub fn rest(&self) -> &'a [u8] {
        &self.uint8[self.x..self.end]
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        Ok(u16::from_be_bytes(self.array::<2>()?))
    }

    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        Ok(u32::from_be_bytes(self.array::<4>()?))
    }

    #[inline]
    pub fn i64(&mut self) -> Result<i64, BufferError> {
        Ok(i64::from_be_bytes(self.array::<8>()?))
    }

    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        Ok(f64::from_be_bytes(self.array::<8>()?))
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.uint8[self.x..self.x + N]);
        self.x += N;
        Ok(out)
    }

    /// Returns the next `size` bytes and advances past them.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let bin = &self.uint8[self.x..self.x + size];
        self.x += size;
        Ok(bin)
    }

    /// Returns a reader over the next `size` bytes and advances past them.
    pub fn cut(&mut self, size: usize) -> Result<Reader<'a>, BufferError> {
        self.check(size)?;
        let sub = Reader::from_slice(self.uint8, self.x, self.x + size);
        self.x += size;
        Ok(sub)
    }
}
