//! Decode errors.
//!
//! Every variant is terminal for the decode call that produced it. Variants
//! carry the byte offset and the expected/available lengths so a corrupt file
//! can be diagnosed from the message alone.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("source is {size} bytes, exceeding the configured maximum of {max} bytes")]
    SourceTooLarge { size: usize, max: usize },

    #[error("malformed main header: {reason} (need {expected} bytes, have {available})")]
    MalformedHeader {
        reason: &'static str,
        expected: usize,
        available: usize,
    },

    #[error(
        "malformed header for subfile {index} at offset {offset}: need {expected} bytes, have {available}"
    )]
    MalformedSubheader {
        index: usize,
        offset: usize,
        expected: usize,
        available: usize,
    },

    #[error("invalid point count {}{} (allowed 1..={})", .count, subfile_suffix(.subfile), .max)]
    InvalidPointCount {
        count: u64,
        max: usize,
        subfile: Option<usize>,
    },

    #[error("invalid subfile count {count} (allowed 1..={max})")]
    InvalidSubfileCount { count: u64, max: usize },

    #[error("truncated X axis at offset {offset}: need {expected} bytes, have {available}")]
    TruncatedXAxis {
        offset: usize,
        expected: usize,
        available: usize,
    },

    #[error(
        "truncated Y data for subfile {subfile} at offset {offset}: need {expected} bytes, have {available}"
    )]
    TruncatedYData {
        subfile: usize,
        offset: usize,
        expected: usize,
        available: usize,
    },

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("exponent {exponent} cannot descale {word_bits}-bit words to a finite value")]
    InvalidExponent { exponent: i32, word_bits: u32 },

    #[error("invalid log block at offset {offset}: {reason}")]
    InvalidLogBlock { offset: usize, reason: String },

    #[error("read of {len} bytes at offset {offset} is outside the {source_len}-byte source")]
    OutOfBounds {
        offset: usize,
        len: usize,
        source_len: usize,
    },
}

fn subfile_suffix(subfile: &Option<usize>) -> String {
    match subfile {
        Some(i) => format!(" in subfile {}", i),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let e = DecodeError::TruncatedYData {
            subfile: 2,
            offset: 600,
            expected: 40,
            available: 39,
        };
        let msg = e.to_string();
        assert!(msg.contains("subfile 2"));
        assert!(msg.contains("offset 600"));
        assert!(msg.contains("need 40"));
        assert!(msg.contains("have 39"));
    }

    #[test]
    fn test_point_count_message_names_subfile() {
        let whole = DecodeError::InvalidPointCount {
            count: 0,
            max: 10,
            subfile: None,
        };
        assert_eq!(whole.to_string(), "invalid point count 0 (allowed 1..=10)");

        let local = DecodeError::InvalidPointCount {
            count: 11,
            max: 10,
            subfile: Some(3),
        };
        assert_eq!(
            local.to_string(),
            "invalid point count 11 in subfile 3 (allowed 1..=10)"
        );
    }
}
