//! Subfile directory of XYXY files.
//!
//! When an XYXY file sets the main header point count field, that field holds
//! the offset of a table with one 12-byte entry per subfile. The table only
//! describes the layout; decoding follows the subfiles sequentially.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::source::{f32_at, i32_at, ByteSource};
use crate::validate;

pub const DIRECTORY_ENTRY_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// File offset of the subfile header.
    pub position: i32,
    /// Size of the subfile in bytes, header included.
    pub size: i32,
    pub z: f32,
}

/// Read `count` entries at `offset`; the whole table must fit in the source.
pub fn read_directory(src: &ByteSource<'_>, offset: usize, count: usize) -> Result<Vec<DirectoryEntry>> {
    let len = validate::array_bytes(count, DIRECTORY_ENTRY_SIZE, offset, src.len())?;
    let table = src.read(offset, len)?;
    Ok(table
        .chunks_exact(DIRECTORY_ENTRY_SIZE)
        .map(|e| DirectoryEntry {
            position: i32_at(e, 0),
            size: i32_at(e, 4),
            z: f32_at(e, 8),
        })
        .collect())
}
