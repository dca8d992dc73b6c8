//! Forward-only reader over container bytes. Multi-byte fields are big-endian.

use super::{Result, StructuralError};

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Absolute offset of the next unread byte; error offsets use the same origin.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }

    fn eof(&self) -> StructuralError {
        StructuralError::UnexpectedEof {
            offset: self.offset,
        }
    }

    pub fn peek_u8(&self) -> Result<u8> {
        self.bytes.get(self.offset).copied().ok_or_else(|| self.eof())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.read_array::<2>().map(u16::from_be_bytes)
    }

    /// Read a fixed-size field.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Borrow the next `n` bytes and advance past them. Nothing is consumed on failure.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self.bytes;
        let start = self.offset;
        let slice = start
            .checked_add(n)
            .and_then(|end| bytes.get(start..end))
            .ok_or_else(|| self.eof())?;
        self.offset += n;
        Ok(slice)
    }
}
