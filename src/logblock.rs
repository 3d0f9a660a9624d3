//! Trailing log block: a 64-byte header followed by free-form text.
//!
//! The binary log area between the header and the text is not decoded.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};
use crate::source::{u32_at, ByteSource};

pub const LOG_HEADER_SIZE: usize = 64;

const LOG_BLOCK_SIZE: usize = 0;
const LOG_MEMORY_SIZE: usize = 4;
const LOG_TEXT_OFFSET: usize = 8;
const LOG_BINARY_SIZE: usize = 12;
const LOG_DISK_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogBlockHeader {
    /// Size of the whole block on disk, header included.
    pub block_size: u32,
    pub memory_size: u32,
    /// Offset of the text from the start of the block.
    pub text_offset: u32,
    pub binary_size: u32,
    pub disk_size: u32,
}

impl LogBlockHeader {
    fn parse(b: &[u8]) -> Self {
        Self {
            block_size: u32_at(b, LOG_BLOCK_SIZE),
            memory_size: u32_at(b, LOG_MEMORY_SIZE),
            text_offset: u32_at(b, LOG_TEXT_OFFSET),
            binary_size: u32_at(b, LOG_BINARY_SIZE),
            disk_size: u32_at(b, LOG_DISK_SIZE),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogBlock {
    pub header: LogBlockHeader,
    pub text: String,
    /// The text was cut at the configured maximum.
    pub truncated: bool,
}

/// Read the log block at `offset`; 0 means the file has none.
pub fn read_log_block(src: &ByteSource<'_>, offset: usize, max_text: usize) -> Result<Option<LogBlock>> {
    if offset == 0 {
        return Ok(None);
    }
    let invalid = |reason: String| DecodeError::InvalidLogBlock { offset, reason };

    let block = src.read(offset, LOG_HEADER_SIZE).map_err(|_| {
        invalid(format!(
            "{}-byte log header does not fit in the {}-byte source",
            LOG_HEADER_SIZE,
            src.len()
        ))
    })?;
    let header = LogBlockHeader::parse(block);

    let text_len = header
        .block_size
        .checked_sub(header.text_offset)
        .ok_or_else(|| {
            invalid(format!(
                "text offset {} exceeds block size {}",
                header.text_offset, header.block_size
            ))
        })? as usize;
    let text_start = offset
        .checked_add(header.text_offset as usize)
        .ok_or_else(|| invalid("text offset overflows".into()))?;
    let text_end = text_start
        .checked_add(text_len)
        .ok_or_else(|| invalid("text length overflows".into()))?;
    if text_end > src.len() {
        return Err(invalid(format!(
            "text range {}..{} extends past the {}-byte source",
            text_start,
            text_end,
            src.len()
        )));
    }

    let truncated = text_len > max_text;
    if truncated {
        warn!(
            "log text of {} bytes cut to the configured maximum of {}",
            text_len,
            max_text
        );
    }
    let raw = src.read(text_start, text_len.min(max_text))?;
    let raw = match raw.iter().position(|&b| b == 0) {
        Some(nul) => &raw[..nul],
        None => raw,
    };

    Ok(Some(LogBlock {
        header,
        text: String::from_utf8_lossy(raw).into_owned(),
        truncated,
    }))
}

/// Split log text into `KEY=VALUE` pairs in file order. Lines without `=`
/// are skipped.
pub fn parse_log_entries(text: &str) -> Vec<(String, String)> {
    text.split(['\r', '\n'])
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}
