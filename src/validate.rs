//! Size, count and range ceilings.
//!
//! Pure functions, called before any allocation or read that a header field
//! controls. Each maps a violation to the error variant of its caller's domain.

use crate::config::DecoderConfig;
use crate::error::{DecodeError, Result};

pub fn check_source_size(len: usize, config: &DecoderConfig) -> Result<()> {
    if len > config.max_source_bytes {
        return Err(DecodeError::SourceTooLarge {
            size: len,
            max: config.max_source_bytes,
        });
    }
    Ok(())
}

/// Validate a declared point count; `subfile` names the subfile for local counts.
pub fn check_point_count(count: u64, subfile: Option<usize>, config: &DecoderConfig) -> Result<usize> {
    let max = config.max_points_per_subfile;
    if count == 0 || count > max as u64 {
        return Err(DecodeError::InvalidPointCount { count, max, subfile });
    }
    Ok(count as usize)
}

pub fn check_subfile_count(count: u64, config: &DecoderConfig) -> Result<usize> {
    let max = config.max_subfiles;
    if count == 0 || count > max as u64 {
        return Err(DecodeError::InvalidSubfileCount { count, max });
    }
    Ok(count as usize)
}

/// Byte length of `count` words of `word_bytes` each, or `OutOfBounds` when
/// the product cannot be represented.
pub fn array_bytes(count: usize, word_bytes: usize, offset: usize, source_len: usize) -> Result<usize> {
    count
        .checked_mul(word_bytes)
        .ok_or(DecodeError::OutOfBounds {
            offset,
            len: usize::MAX,
            source_len,
        })
}

/// Check that `[offset, offset + len)` lies inside a source of `source_len`
/// bytes, returning `err(available)` otherwise.
pub fn require<F>(offset: usize, len: usize, source_len: usize, err: F) -> Result<()>
where
    F: FnOnce(usize) -> DecodeError,
{
    let available = source_len.saturating_sub(offset);
    if offset > source_len || len > available {
        return Err(err(available));
    }
    Ok(())
}
