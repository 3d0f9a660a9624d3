//! Bounds-checked little-endian reads over an in-memory SPC image.
//!
//! The read position is an explicit [`Cursor`] value owned by the caller and
//! passed into each parser, never a field shared between parsers. Concurrent
//! subfile decoders can therefore read the same [`ByteSource`] freely.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{DecodeError, Result};

/// Immutable view of the whole input.
#[derive(Debug, Clone, Copy)]
pub struct ByteSource<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Total length `N` of the source.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes available from `offset` to the end (0 if `offset` is past the end).
    pub fn remaining_from(&self, offset: usize) -> usize {
        self.bytes.len().saturating_sub(offset)
    }

    /// Borrow `len` bytes at `offset`, failing with `OutOfBounds` unless the
    /// whole range lies inside the source.
    pub fn read(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset.checked_add(len).ok_or(DecodeError::OutOfBounds {
            offset,
            len,
            source_len: self.bytes.len(),
        })?;
        self.bytes.get(offset..end).ok_or(DecodeError::OutOfBounds {
            offset,
            len,
            source_len: self.bytes.len(),
        })
    }

    /// Borrow `len` bytes at the cursor and advance it.
    pub fn take(&self, cursor: &mut Cursor, len: usize) -> Result<&'a [u8]> {
        let bytes = self.read(cursor.pos, len)?;
        cursor.pos += len;
        Ok(bytes)
    }
}

/// A position in a [`ByteSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: usize,
}

impl Cursor {
    pub fn at(pos: usize) -> Self {
        Self { pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn skip(&mut self, len: usize) {
        self.pos = self.pos.saturating_add(len);
    }
}

// ─── Field readers over an already bounds-checked block ─────────────────────
//
// Header parsers borrow their whole fixed-size block once through
// `ByteSource::read` and then decode fields at constant offsets inside it.

pub(crate) fn u8_at(block: &[u8], off: usize) -> u8 {
    block[off]
}

pub(crate) fn i8_at(block: &[u8], off: usize) -> i8 {
    block[off] as i8
}

pub(crate) fn u16_at(block: &[u8], off: usize) -> u16 {
    LittleEndian::read_u16(&block[off..off + 2])
}

pub(crate) fn i16_at(block: &[u8], off: usize) -> i16 {
    LittleEndian::read_i16(&block[off..off + 2])
}

pub(crate) fn u32_at(block: &[u8], off: usize) -> u32 {
    LittleEndian::read_u32(&block[off..off + 4])
}

pub(crate) fn i32_at(block: &[u8], off: usize) -> i32 {
    LittleEndian::read_i32(&block[off..off + 4])
}

pub(crate) fn f32_at(block: &[u8], off: usize) -> f32 {
    LittleEndian::read_f32(&block[off..off + 4])
}

pub(crate) fn f64_at(block: &[u8], off: usize) -> f64 {
    LittleEndian::read_f64(&block[off..off + 8])
}

/// NUL-terminated text field, trimmed, decoded lossily.
pub(crate) fn text_at(block: &[u8], off: usize, len: usize) -> String {
    let end = (off + len).min(block.len());
    let field = &block[off.min(end)..end];
    let s: Vec<u8> = field.iter().copied().take_while(|&b| b != 0).collect();
    String::from_utf8_lossy(&s).trim().to_string()
}
