//! Per-subfile 32-byte header.

use crate::error::{DecodeError, Result};
use crate::source::{f32_at, i8_at, u16_at, u32_at, u8_at, ByteSource, Cursor};

pub const SUBHEADER_SIZE: usize = 32;

const S_FLAGS: usize = 0;
const S_EXPONENT: usize = 1;
const S_INDEX: usize = 2;
const S_Z_START: usize = 4;
const S_Z_END: usize = 8;
const S_NOISE: usize = 12;
const S_NPTS: usize = 16;
const S_SCANS: usize = 20;
const S_W_VALUE: usize = 24;

/// Subfile flag: the subfile was changed after acquisition.
pub const SUBFLAG_CHANGED: u8 = 0x01;
/// Subfile flag: modified by arithmetic.
pub const SUBFLAG_MODIFIED: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubfileHeader {
    pub flags: u8,
    /// 0 means inherit the main header exponent.
    pub exponent_override: i8,
    pub index: u16,
    pub z_start: f32,
    pub z_end: f32,
    pub noise: f32,
    /// Only meaningful in per-subfile-X mode.
    pub local_num_points: u32,
    pub coadded_scans: u32,
    pub w_value: f32,
}

impl SubfileHeader {
    /// Read the header at `cursor` and advance past it. `index` is the
    /// subfile's position in the file, used for error context.
    pub fn parse(src: &ByteSource<'_>, cursor: &mut Cursor, index: usize) -> Result<Self> {
        let offset = cursor.position();
        let b = src
            .take(cursor, SUBHEADER_SIZE)
            .map_err(|_| DecodeError::MalformedSubheader {
                index,
                offset,
                expected: SUBHEADER_SIZE,
                available: src.remaining_from(offset),
            })?;

        Ok(Self {
            flags: u8_at(b, S_FLAGS),
            exponent_override: i8_at(b, S_EXPONENT),
            index: u16_at(b, S_INDEX),
            z_start: f32_at(b, S_Z_START),
            z_end: f32_at(b, S_Z_END),
            noise: f32_at(b, S_NOISE),
            local_num_points: u32_at(b, S_NPTS),
            coadded_scans: u32_at(b, S_SCANS),
            w_value: f32_at(b, S_W_VALUE),
        })
    }

    pub fn changed(&self) -> bool {
        self.flags & SUBFLAG_CHANGED != 0
    }

    pub fn modified_by_arithmetic(&self) -> bool {
        self.flags & SUBFLAG_MODIFIED != 0
    }
}
