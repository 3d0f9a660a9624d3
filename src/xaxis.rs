//! X axis resolution for the three axis modes.

use byteorder::{ByteOrder, LittleEndian};
use std::sync::Arc;

use crate::error::{DecodeError, Result};
use crate::flags::XAxisMode;
use crate::header::MainHeader;
use crate::source::{ByteSource, Cursor};
use crate::validate;

/// Bytes per stored X value.
pub const X_WORD_BYTES: usize = 4;

/// A materialized X axis shared by every subfile in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedAxis {
    pub values: Arc<[f64]>,
    pub first_x: f64,
    pub last_x: f64,
}

/// `first_x + i * (last_x - first_x) / (n - 1)` for `i` in `0..n`; a single
/// point sits at `first_x`.
pub fn generate_linear(first_x: f64, last_x: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![first_x];
    }
    let step = (last_x - first_x) / (n - 1) as f64;
    (0..n).map(|i| first_x + step * i as f64).collect()
}

/// Widen little-endian f32 words to f64.
pub fn widen_words(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(X_WORD_BYTES)
        .map(|c| LittleEndian::read_f32(c) as f64)
        .collect()
}

/// Byte length of an explicit X run of `count` values at `offset`, failing
/// with `TruncatedXAxis` unless it fits in the source.
pub fn explicit_len(src: &ByteSource<'_>, offset: usize, count: usize) -> Result<usize> {
    let len = validate::array_bytes(count, X_WORD_BYTES, offset, src.len())?;
    validate::require(offset, len, src.len(), |available| DecodeError::TruncatedXAxis {
        offset,
        expected: len,
        available,
    })?;
    Ok(len)
}

/// Where the shared axis comes from. Known, and bounds-checked, before any
/// value is produced, so a generated axis is only materialized once the
/// subfiles that use it are known to fit in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedLayout {
    Generated { points: usize },
    Explicit { offset: usize, points: usize },
}

impl SharedLayout {
    pub fn points(self) -> usize {
        match self {
            Self::Generated { points } | Self::Explicit { points, .. } => points,
        }
    }

    pub fn resolve(self, src: &ByteSource<'_>, header: &MainHeader) -> Result<SharedAxis> {
        match self {
            Self::Generated { points } => Ok(SharedAxis {
                values: generate_linear(header.first_x, header.last_x, points).into(),
                first_x: header.first_x,
                last_x: header.last_x,
            }),
            Self::Explicit { offset, points } => {
                let len = explicit_len(src, offset, points)?;
                let values = widen_words(src.read(offset, len)?);
                // Stored samples supersede the header's X range.
                let first_x = values.first().copied().unwrap_or(header.first_x);
                let last_x = values.last().copied().unwrap_or(header.last_x);
                Ok(SharedAxis {
                    values: values.into(),
                    first_x,
                    last_x,
                })
            }
        }
    }
}

/// Locate the axis every subfile shares, advancing the cursor past a shared
/// explicit run. Per-subfile mode has no shared axis.
pub fn shared_layout(
    src: &ByteSource<'_>,
    header: &MainHeader,
    cursor: &mut Cursor,
) -> Result<Option<SharedLayout>> {
    let points = match (header.x_axis_mode(), header.num_points) {
        (XAxisMode::PerSubfileExplicit, _) | (_, None) => return Ok(None),
        (_, Some(n)) => n,
    };
    match header.x_axis_mode() {
        XAxisMode::SharedExplicit => {
            let offset = cursor.position();
            cursor.skip(explicit_len(src, offset, points)?);
            Ok(Some(SharedLayout::Explicit { offset, points }))
        }
        _ => Ok(Some(SharedLayout::Generated { points })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecoderConfig;
    use crate::flags::FLAG_EXPLICIT_X;
    use crate::header::parse_main_header;
    use crate::testutil::{f32_bytes, modern_header};

    #[test]
    fn test_linear_descending() {
        assert_eq!(
            generate_linear(4000.0, 400.0, 5),
            vec![4000.0, 3100.0, 2200.0, 1300.0, 400.0]
        );
    }

    #[test]
    fn test_linear_single_point() {
        assert_eq!(generate_linear(12.5, 99.0, 1), vec![12.5]);
    }

    #[test]
    fn test_linear_endpoints() {
        let x = generate_linear(0.0, 1.0, 11);
        assert_eq!(x.len(), 11);
        assert_eq!(x[0], 0.0);
        assert!((x[10] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_shared_explicit_overrides_range() {
        let mut img = modern_header(FLAG_EXPLICIT_X, 3, 0.0, 0.0, 1);
        img.extend(f32_bytes(&[10.0, 20.0, 35.0]));
        let src = ByteSource::new(&img);
        let hdr = parse_main_header(&src, &DecoderConfig::default()).unwrap();

        let mut cur = Cursor::at(hdr.header_size());
        let layout = shared_layout(&src, &hdr, &mut cur).unwrap().unwrap();
        assert_eq!(layout, SharedLayout::Explicit { offset: 512, points: 3 });
        let axis = layout.resolve(&src, &hdr).unwrap();
        assert_eq!(&axis.values[..], &[10.0, 20.0, 35.0]);
        assert_eq!(axis.first_x, 10.0);
        assert_eq!(axis.last_x, 35.0);
        assert_eq!(cur.position(), 512 + 12);
    }

    #[test]
    fn test_shared_explicit_truncated() {
        let mut img = modern_header(FLAG_EXPLICIT_X, 3, 0.0, 0.0, 1);
        img.extend(f32_bytes(&[10.0, 20.0]));
        img.push(0);
        let src = ByteSource::new(&img);
        let hdr = parse_main_header(&src, &DecoderConfig::default()).unwrap();

        let mut cur = Cursor::at(hdr.header_size());
        assert_eq!(
            shared_layout(&src, &hdr, &mut cur),
            Err(DecodeError::TruncatedXAxis {
                offset: 512,
                expected: 12,
                available: 9
            })
        );
    }

    #[test]
    fn test_generated_axis_leaves_cursor() {
        let img = modern_header(0, 5, 4000.0, 400.0, 1);
        let src = ByteSource::new(&img);
        let hdr = parse_main_header(&src, &DecoderConfig::default()).unwrap();
        let mut cur = Cursor::at(512);
        let layout = shared_layout(&src, &hdr, &mut cur).unwrap().unwrap();
        assert_eq!(layout, SharedLayout::Generated { points: 5 });
        assert_eq!(cur.position(), 512);
        let axis = layout.resolve(&src, &hdr).unwrap();
        assert_eq!(axis.values.len(), 5);
        assert_eq!(axis.first_x, 4000.0);
    }
}
