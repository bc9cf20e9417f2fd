/// Bounds-checked cursor over a byte region
use crate::error::{MetadataError, Result};

/// Cursor-based view over borrowed bytes
///
/// Every read and skip is checked against the end of the view and fails
/// with [`MetadataError::BufferUnderrun`] without moving the cursor. A child
/// view carved with [`ByteBuffer::carve`] only ever sees the bytes its parent
/// gave up, so a corrupt size inside one nested structure cannot reach into
/// its siblings.
#[derive(Debug, Clone)]
pub struct ByteBuffer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteBuffer<'a> {
    /// Create a view over the whole slice, cursor at zero
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Carve a child view of `len` bytes at the current cursor
    ///
    /// The parent advances by exactly `len` no matter how much of the child
    /// is later consumed. The child's cursor starts at zero.
    pub fn carve(&mut self, len: usize) -> Result<ByteBuffer<'a>> {
        let bytes = self.take(len)?;
        Ok(ByteBuffer::new(bytes))
    }

    /// Next byte without advancing
    pub fn peek(&self) -> Result<u8> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.underrun(1))
    }

    /// Bytes left between the cursor and the end of the view
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Cursor offset from the start of the view
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor back to the start of the view
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// The unread part of the view, without advancing
    pub fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.take_array::<1>()?;
        Ok(b)
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.take_array().map(u16::from_be_bytes)
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.take_array().map(u32::from_be_bytes)
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub fn read_u64_be(&mut self) -> Result<u64> {
        self.take_array().map(u64::from_be_bytes)
    }

    /// Read a fixed number of bytes into an array
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read `len` bytes and advance past them
    pub fn read(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    /// Advance `len` bytes without returning them
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.underrun(len));
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.bytes[start..self.pos])
    }

    fn underrun(&self, requested: usize) -> MetadataError {
        MetadataError::BufferUnderrun {
            requested,
            remaining: self.remaining(),
        }
    }
}
