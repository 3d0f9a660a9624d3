//! Y word decoding and exponent descaling.
//!
//! Integer words are descaled as `value = word × 2^(exponent − bits)`, with
//! `bits` the declared word width. The power of two is built directly from
//! its IEEE-754 bit pattern, so the scale is exact and the product is
//! rounded at most once by the final multiplication. Results that land in
//! the subnormal range lose precision but stay finite.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{DecodeError, Result};
use crate::flags::{WordOrder, YEncoding, YWordWidth};

const F64_EXP_BIAS: i32 = 1023;
const F64_MIN_EXP: i32 = -1022;
const F64_MAX_EXP: i32 = 1023;
/// Exponent of the smallest subnormal double.
const F64_MIN_SUBNORMAL_EXP: i32 = -1074;

/// `2^k` exactly, for `k` from the smallest subnormal up to the largest
/// normal power.
pub fn pow2(k: i32) -> Option<f64> {
    match k {
        F64_MIN_EXP..=F64_MAX_EXP => Some(f64::from_bits(((k + F64_EXP_BIAS) as u64) << 52)),
        F64_MIN_SUBNORMAL_EXP..=-1023 => Some(f64::from_bits(1u64 << (k - F64_MIN_SUBNORMAL_EXP))),
        _ => None,
    }
}

/// Scale factor `2^(exponent − bits)` for `width`-bit words.
///
/// Rejects exponents whose largest-magnitude word would overflow, and those
/// whose unit word would underflow to zero. Every accepted product is finite
/// and every non-zero word stays non-zero.
pub fn scale_factor(width: YWordWidth, exponent: i32) -> Result<f64> {
    let bits = width.bits() as i32;
    let k = exponent - bits;
    let invalid = DecodeError::InvalidExponent {
        exponent,
        word_bits: width.bits(),
    };
    // |word| < 2^(bits-1), so the product stays below 2^(k + bits - 1).
    if k + bits - 1 > F64_MAX_EXP {
        return Err(invalid);
    }
    pow2(k).ok_or(invalid)
}

/// One subfile's raw Y run plus the context reported on failure.
#[derive(Debug, Clone, Copy)]
pub struct YRun<'a> {
    pub subfile: usize,
    pub offset: usize,
    pub points: usize,
    pub bytes: &'a [u8],
}

/// Converts Y runs of one encoding into samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YDecoder {
    encoding: YEncoding,
    order: WordOrder,
    factor: f64,
}

impl YDecoder {
    /// Select the encoding for `width` and the effective `exponent`.
    pub fn new(width: YWordWidth, exponent: i32, order: WordOrder) -> Result<Self> {
        let encoding = YEncoding::select(width, exponent)?;
        let factor = match encoding {
            YEncoding::Float32 => 1.0,
            YEncoding::Scaled { width, exponent } => scale_factor(width, exponent)?,
        };
        Ok(Self {
            encoding,
            order,
            factor,
        })
    }

    pub fn encoding(&self) -> YEncoding {
        self.encoding
    }

    pub fn word_bytes(&self) -> usize {
        self.encoding.word_bytes()
    }

    /// Byte length of `points` words.
    pub fn run_len(&self, points: usize) -> Option<usize> {
        points.checked_mul(self.word_bytes())
    }

    pub fn decode(&self, run: YRun<'_>) -> Result<Vec<f64>> {
        let expected = self.run_len(run.points).unwrap_or(usize::MAX);
        if run.bytes.len() < expected {
            return Err(DecodeError::TruncatedYData {
                subfile: run.subfile,
                offset: run.offset,
                expected,
                available: run.bytes.len(),
            });
        }
        let bytes = &run.bytes[..expected];

        let y = match self.encoding {
            YEncoding::Float32 => bytes
                .chunks_exact(4)
                .map(|c| LittleEndian::read_f32(c) as f64)
                .collect(),
            YEncoding::Scaled {
                width: YWordWidth::Bits16,
                ..
            } => bytes
                .chunks_exact(2)
                .map(|c| LittleEndian::read_i16(c) as f64 * self.factor)
                .collect(),
            YEncoding::Scaled {
                width: YWordWidth::Bits32,
                ..
            } => bytes
                .chunks_exact(4)
                .map(|c| read_word32(c, self.order) as f64 * self.factor)
                .collect(),
        };
        Ok(y)
    }
}

fn read_word32(c: &[u8], order: WordOrder) -> i32 {
    match order {
        WordOrder::LittleEndian => LittleEndian::read_i32(c),
        WordOrder::HighHalfFirst => {
            (((c[1] as u32) << 24) | ((c[0] as u32) << 16) | ((c[3] as u32) << 8) | c[2] as u32)
                as i32
        }
    }
}
