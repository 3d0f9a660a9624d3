//! Main header parsing.
//!
//! The header is 512 bytes in the modern layout (version byte 0x4B) and 256
//! bytes in the legacy layout (0x4D). The parser branches once on the layout
//! to pull raw fields from their fixed offsets, then validates counts with
//! logic shared by both layouts.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::DecoderConfig;
use crate::error::{DecodeError, Result};
use crate::flags::{
    FormatFlags, HeaderLayout, XAxisMode, YWordWidth, FLOAT_EXPONENT, LEGACY_FIRST_SUBHEADER,
};
use crate::source::{f32_at, f64_at, i16_at, i8_at, text_at, u16_at, u32_at, u8_at, ByteSource};
use crate::subheader::SUBHEADER_SIZE;
use crate::units::{ExperimentType, XUnit, YUnit};
use crate::validate;

// ─── Modern layout offsets ──────────────────────────────────────────────────

const M_FLAGS: usize = 0;
const M_EXPERIMENT: usize = 2;
const M_EXPONENT: usize = 3;
const M_NPTS: usize = 4;
const M_FIRST_X: usize = 8;
const M_LAST_X: usize = 16;
const M_NSUB: usize = 24;
const M_XUNIT: usize = 28;
const M_YUNIT: usize = 29;
const M_ZUNIT: usize = 30;
const M_POSTING: usize = 31;
const M_DATE: usize = 32;
const M_RESOLUTION: usize = 36;
const M_SOURCE: usize = 45;
const M_PEAKPT: usize = 54;
const M_MEMO: usize = 88;
const M_LABELS: usize = 218;
const M_LOGOFF: usize = 248;
const M_MODS: usize = 252;
const M_PROCESSING: usize = 256;
const M_LEVEL: usize = 257;
const M_INJECTION: usize = 258;
const M_FACTOR: usize = 260;
const M_METHOD: usize = 264;
const M_ZINC: usize = 312;
const M_WPLANES: usize = 316;
const M_WINC: usize = 320;
const M_WUNIT: usize = 324;

// ─── Legacy layout offsets ──────────────────────────────────────────────────

const L_FLAGS: usize = 0;
const L_EXPONENT: usize = 2;
const L_NPTS: usize = 4;
const L_FIRST_X: usize = 8;
const L_LAST_X: usize = 12;
const L_XUNIT: usize = 16;
const L_YUNIT: usize = 17;
/// Year in the low 12 bits, z unit code in the top 4.
const L_YEAR: usize = 18;
const L_MONTH: usize = 20;
const L_DAY: usize = 21;
const L_HOUR: usize = 22;
const L_MINUTE: usize = 23;
const L_RESOLUTION: usize = 24;
const L_PEAKPT: usize = 32;
const L_SCANS: usize = 34;
const L_MEMO: usize = 64;
const L_LABELS: usize = 194;

const RESOLUTION_LEN: usize = 9;
const LEGACY_RESOLUTION_LEN: usize = 8;
const SOURCE_LEN: usize = 9;
const MEMO_LEN: usize = 130;
const LABELS_LEN: usize = 30;
const METHOD_LEN: usize = 48;

/// Custom axis labels, NUL-separated in the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
    pub z: String,
}

impl AxisLabels {
    fn parse(field: &[u8]) -> Self {
        let mut parts = field
            .split(|&b| b == 0)
            .map(|p| String::from_utf8_lossy(p).trim().to_string());
        Self {
            x: parts.next().unwrap_or_default(),
            y: parts.next().unwrap_or_default(),
            z: parts.next().unwrap_or_default(),
        }
    }
}

/// Descriptive header fields that do not affect decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub experiment: ExperimentType,
    pub x_unit: XUnit,
    pub y_unit: YUnit,
    pub z_unit: XUnit,
    pub w_unit: XUnit,
    pub acquired: Option<NaiveDateTime>,
    pub resolution: String,
    pub source_instrument: String,
    pub memo: String,
    pub axis_labels: AxisLabels,
    pub peak_point: u16,
    pub posting: u8,
    pub modifications: u32,
    pub processing_code: u8,
    pub calibration_level: u8,
    pub sample_injection: u16,
    pub concentration_factor: f32,
    pub method_file: String,
    pub z_increment: f32,
    pub w_planes: u32,
    pub w_increment: f32,
    /// Legacy layout only.
    pub scan_count: Option<u16>,
}

/// The decoded main header, with counts already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct MainHeader {
    pub layout: HeaderLayout,
    pub flags: FormatFlags,
    pub global_y_exponent: i32,
    /// Point count shared by every subfile; `None` in per-subfile-X mode.
    pub num_points: Option<usize>,
    /// Per-subfile-X mode reuses the point count field as a directory offset.
    pub directory_offset: Option<usize>,
    pub first_x: f64,
    pub last_x: f64,
    pub num_subfiles: usize,
    /// 0 means no log block.
    pub log_block_offset: usize,
    pub metadata: FileMetadata,
}

impl MainHeader {
    pub fn header_size(&self) -> usize {
        self.layout.header_size()
    }

    pub fn x_axis_mode(&self) -> XAxisMode {
        self.flags.x_axis_mode()
    }

    pub fn y_word_width(&self) -> YWordWidth {
        self.flags.y_word_width()
    }
}

/// Raw fields pulled from one layout, before validation.
struct LayoutFields {
    flags: FormatFlags,
    exponent: i32,
    points: u64,
    first_x: f64,
    last_x: f64,
    /// Legacy headers have no subfile count.
    subfiles: Option<u64>,
    log_offset: u32,
    metadata: FileMetadata,
}

/// Decode and validate the main header at the start of `src`.
pub fn parse_main_header(src: &ByteSource<'_>, config: &DecoderConfig) -> Result<MainHeader> {
    let available = src.len();
    if available < 2 {
        return Err(DecodeError::MalformedHeader {
            reason: "missing format version byte",
            expected: 2,
            available,
        });
    }
    let version = src.read(1, 1)?[0];
    let layout = HeaderLayout::from_version(version, available)?;
    let size = layout.header_size();
    let block = src.read(0, size).map_err(|_| DecodeError::MalformedHeader {
        reason: "header truncated",
        expected: size,
        available,
    })?;

    let fields = match layout {
        HeaderLayout::Modern => modern_fields(block),
        HeaderLayout::Legacy => legacy_fields(block),
    };
    finish(layout, fields, available, config)
}

fn modern_fields(b: &[u8]) -> LayoutFields {
    LayoutFields {
        flags: FormatFlags(u8_at(b, M_FLAGS)),
        exponent: i8_at(b, M_EXPONENT) as i32,
        points: u32_at(b, M_NPTS) as u64,
        first_x: f64_at(b, M_FIRST_X),
        last_x: f64_at(b, M_LAST_X),
        subfiles: Some(u32_at(b, M_NSUB) as u64),
        log_offset: u32_at(b, M_LOGOFF),
        metadata: FileMetadata {
            experiment: ExperimentType::from_u8(u8_at(b, M_EXPERIMENT)),
            x_unit: XUnit::from_u8(u8_at(b, M_XUNIT)),
            y_unit: YUnit::from_u8(u8_at(b, M_YUNIT)),
            z_unit: XUnit::from_u8(u8_at(b, M_ZUNIT)),
            w_unit: XUnit::from_u8(u8_at(b, M_WUNIT)),
            acquired: unpack_date(u32_at(b, M_DATE)),
            resolution: text_at(b, M_RESOLUTION, RESOLUTION_LEN),
            source_instrument: text_at(b, M_SOURCE, SOURCE_LEN),
            memo: text_at(b, M_MEMO, MEMO_LEN),
            axis_labels: AxisLabels::parse(&b[M_LABELS..M_LABELS + LABELS_LEN]),
            peak_point: u16_at(b, M_PEAKPT),
            posting: u8_at(b, M_POSTING),
            modifications: u32_at(b, M_MODS),
            processing_code: u8_at(b, M_PROCESSING),
            calibration_level: u8_at(b, M_LEVEL),
            sample_injection: u16_at(b, M_INJECTION),
            concentration_factor: f32_at(b, M_FACTOR),
            method_file: text_at(b, M_METHOD, METHOD_LEN),
            z_increment: f32_at(b, M_ZINC),
            w_planes: u32_at(b, M_WPLANES),
            w_increment: f32_at(b, M_WINC),
            scan_count: None,
        },
    }
}

/// Legacy exponent word that marks float samples, besides -128.
const LEGACY_FLOAT_EXPONENT: i16 = 0x80;

fn legacy_fields(b: &[u8]) -> LayoutFields {
    let year_word = u16_at(b, L_YEAR);
    let acquired = legacy_date(
        (year_word & 0x0FFF) as i32,
        u8_at(b, L_MONTH) as u32,
        u8_at(b, L_DAY) as u32,
        u8_at(b, L_HOUR) as u32,
        u8_at(b, L_MINUTE) as u32,
    );
    LayoutFields {
        flags: FormatFlags(u8_at(b, L_FLAGS)),
        exponent: match i16_at(b, L_EXPONENT) {
            LEGACY_FLOAT_EXPONENT => FLOAT_EXPONENT,
            e => e as i32,
        },
        // Saturating cast: NaN and negatives become 0 and fail validation.
        points: f32_at(b, L_NPTS) as u64,
        first_x: f32_at(b, L_FIRST_X) as f64,
        last_x: f32_at(b, L_LAST_X) as f64,
        subfiles: None,
        log_offset: 0,
        metadata: FileMetadata {
            experiment: ExperimentType::General,
            x_unit: XUnit::from_u8(u8_at(b, L_XUNIT)),
            y_unit: YUnit::from_u8(u8_at(b, L_YUNIT)),
            z_unit: XUnit::from_u8((year_word >> 12) as u8),
            w_unit: XUnit::Arbitrary,
            acquired,
            resolution: text_at(b, L_RESOLUTION, LEGACY_RESOLUTION_LEN),
            source_instrument: String::new(),
            memo: text_at(b, L_MEMO, MEMO_LEN),
            axis_labels: AxisLabels::parse(&b[L_LABELS..L_LABELS + LABELS_LEN]),
            peak_point: u16_at(b, L_PEAKPT),
            posting: 0,
            modifications: 0,
            processing_code: 0,
            calibration_level: 0,
            sample_injection: 0,
            concentration_factor: 0.0,
            method_file: String::new(),
            z_increment: 0.0,
            w_planes: 0,
            w_increment: 0.0,
            scan_count: Some(u16_at(b, L_SCANS)),
        },
    }
}

fn finish(
    layout: HeaderLayout,
    f: LayoutFields,
    source_len: usize,
    config: &DecoderConfig,
) -> Result<MainHeader> {
    let mode = f.flags.x_axis_mode();

    let (num_points, directory_offset) = match mode {
        XAxisMode::PerSubfileExplicit => {
            if layout == HeaderLayout::Legacy {
                return Err(DecodeError::UnsupportedEncoding(
                    "per-subfile X arrays in the legacy layout".into(),
                ));
            }
            let dir = (f.points != 0).then_some(f.points as usize);
            (None, dir)
        }
        _ => (Some(validate::check_point_count(f.points, None, config)?), None),
    };

    let num_subfiles = if !f.flags.multifile() {
        1
    } else {
        match f.subfiles {
            Some(count) => validate::check_subfile_count(count, config)?,
            None => legacy_subfile_count(&f, num_points, source_len, config)?,
        }
    };

    Ok(MainHeader {
        layout,
        flags: f.flags,
        global_y_exponent: f.exponent,
        num_points,
        directory_offset,
        first_x: f.first_x,
        last_x: f.last_x,
        num_subfiles,
        log_block_offset: f.log_offset as usize,
        metadata: f.metadata,
    })
}

/// Legacy multifile images have fixed-size subfiles, so the count follows
/// from the byte budget when it divides exactly. The first subfile header
/// sits inside the main header, so the budget starts there.
fn legacy_subfile_count(
    f: &LayoutFields,
    num_points: Option<usize>,
    source_len: usize,
    config: &DecoderConfig,
) -> Result<usize> {
    let points = num_points.unwrap_or(0);
    let word = f.flags.y_word_width().bytes();
    let shared_x = if f.flags.explicit_x() { points * 4 } else { 0 };
    let stride = SUBHEADER_SIZE + points * word;
    let body = source_len
        .saturating_sub(LEGACY_FIRST_SUBHEADER)
        .saturating_sub(shared_x);
    if body == 0 || body % stride != 0 {
        return Err(DecodeError::InvalidSubfileCount {
            count: 0,
            max: config.max_subfiles,
        });
    }
    validate::check_subfile_count((body / stride) as u64, config)
}

/// Modern packed date: minute in the low 6 bits, then hour (5), day (5),
/// month (4) and year (12).
fn unpack_date(packed: u32) -> Option<NaiveDateTime> {
    if packed == 0 {
        return None;
    }
    let minute = packed & 0x3F;
    let hour = (packed >> 6) & 0x1F;
    let day = (packed >> 11) & 0x1F;
    let month = (packed >> 16) & 0x0F;
    let year = (packed >> 20) as i32;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

fn legacy_date(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    if year == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{FLAG_EXPLICIT_X, FLAG_MULTIFILE, FLAG_PER_SUBFILE_X, FLAG_Y16};
    use crate::testutil::{legacy_header, modern_header};

    fn cfg() -> DecoderConfig {
        DecoderConfig::default()
    }

    #[test]
    fn test_modern_fields() {
        let mut h = modern_header(0, 5, 4000.0, 400.0, 1);
        h[M_EXPONENT] = 0xFE; // -2
        h[M_EXPERIMENT] = 4;
        h[M_XUNIT] = 1;
        h[M_YUNIT] = 2;
        h[M_RESOLUTION..M_RESOLUTION + 4].copy_from_slice(b"4.0\0");
        h[M_MEMO..M_MEMO + 6].copy_from_slice(b"sample");
        h[M_LOGOFF..M_LOGOFF + 4].copy_from_slice(&700u32.to_le_bytes());
        let hdr = parse_main_header(&ByteSource::new(&h), &cfg()).unwrap();

        assert_eq!(hdr.layout, HeaderLayout::Modern);
        assert_eq!(hdr.global_y_exponent, -2);
        assert_eq!(hdr.num_points, Some(5));
        assert_eq!(hdr.first_x, 4000.0);
        assert_eq!(hdr.last_x, 400.0);
        assert_eq!(hdr.num_subfiles, 1);
        assert_eq!(hdr.log_block_offset, 700);
        assert_eq!(hdr.metadata.experiment, ExperimentType::FtIr);
        assert_eq!(hdr.metadata.x_unit, XUnit::Wavenumber);
        assert_eq!(hdr.metadata.y_unit, YUnit::Absorbance);
        assert_eq!(hdr.metadata.resolution, "4.0");
        assert_eq!(hdr.metadata.memo, "sample");
        assert_eq!(hdr.metadata.scan_count, None);
    }

    #[test]
    fn test_single_file_ignores_subfile_field() {
        let h = modern_header(0, 8, 0.0, 1.0, 9);
        let hdr = parse_main_header(&ByteSource::new(&h), &cfg()).unwrap();
        assert_eq!(hdr.num_subfiles, 1);
    }

    #[test]
    fn test_multifile_count() {
        let h = modern_header(FLAG_MULTIFILE, 8, 0.0, 1.0, 3);
        let hdr = parse_main_header(&ByteSource::new(&h), &cfg()).unwrap();
        assert_eq!(hdr.num_subfiles, 3);
    }

    #[test]
    fn test_short_buffer() {
        let h = modern_header(0, 8, 0.0, 1.0, 1);
        let err = parse_main_header(&ByteSource::new(&h[..300]), &cfg()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedHeader {
                reason: "header truncated",
                expected: 512,
                available: 300
            }
        );
        assert!(matches!(
            parse_main_header(&ByteSource::new(&[0u8]), &cfg()),
            Err(DecodeError::MalformedHeader { expected: 2, .. })
        ));
    }

    #[test]
    fn test_point_count_limits() {
        let h = modern_header(0, 0, 0.0, 1.0, 1);
        assert!(matches!(
            parse_main_header(&ByteSource::new(&h), &cfg()),
            Err(DecodeError::InvalidPointCount { count: 0, .. })
        ));

        let h = modern_header(0, 11, 0.0, 1.0, 1);
        let small = cfg().with_max_points_per_subfile(10);
        assert!(matches!(
            parse_main_header(&ByteSource::new(&h), &small),
            Err(DecodeError::InvalidPointCount { count: 11, max: 10, .. })
        ));
    }

    #[test]
    fn test_subfile_count_limits() {
        let h = modern_header(FLAG_MULTIFILE, 4, 0.0, 1.0, 0);
        assert!(matches!(
            parse_main_header(&ByteSource::new(&h), &cfg()),
            Err(DecodeError::InvalidSubfileCount { count: 0, .. })
        ));
        let h = modern_header(FLAG_MULTIFILE, 4, 0.0, 1.0, 5);
        assert_eq!(
            parse_main_header(&ByteSource::new(&h), &cfg().with_max_subfiles(4)),
            Err(DecodeError::InvalidSubfileCount { count: 5, max: 4 })
        );
    }

    #[test]
    fn test_per_subfile_mode_reads_directory_offset() {
        let flags = FLAG_MULTIFILE | FLAG_EXPLICIT_X | FLAG_PER_SUBFILE_X;
        let h = modern_header(flags, 0, 0.0, 0.0, 2);
        let hdr = parse_main_header(&ByteSource::new(&h), &cfg()).unwrap();
        assert_eq!(hdr.num_points, None);
        assert_eq!(hdr.directory_offset, None);
        assert_eq!(hdr.x_axis_mode(), XAxisMode::PerSubfileExplicit);

        let h = modern_header(flags, 2048, 0.0, 0.0, 2);
        let hdr = parse_main_header(&ByteSource::new(&h), &cfg()).unwrap();
        assert_eq!(hdr.directory_offset, Some(2048));
    }

    #[test]
    fn test_packed_date() {
        // 2021-03-14 15:09
        let packed = (2021u32 << 20) | (3 << 16) | (14 << 11) | (15 << 6) | 9;
        let dt = unpack_date(packed).unwrap();
        assert_eq!(dt.to_string(), "2021-03-14 15:09:00");
        assert_eq!(unpack_date(0), None);
        // month 13 does not exist
        assert_eq!(unpack_date((2021u32 << 20) | (13 << 16) | (1 << 11)), None);
    }

    #[test]
    fn test_axis_labels() {
        let labels = AxisLabels::parse(b"Wavenumber\0Counts\0Time\0\0\0");
        assert_eq!(labels.x, "Wavenumber");
        assert_eq!(labels.y, "Counts");
        assert_eq!(labels.z, "Time");
        let empty = AxisLabels::parse(&[0u8; 30]);
        assert_eq!(empty, AxisLabels::default());
    }

    #[test]
    fn test_legacy_fields() {
        let mut h = legacy_header(FLAG_Y16, 3.0, 10.0, 20.0);
        h[L_EXPONENT..L_EXPONENT + 2].copy_from_slice(&5i16.to_le_bytes());
        // z unit 13 (minutes) in the top nibble
        h[L_YEAR..L_YEAR + 2].copy_from_slice(&((13u16 << 12) | 1994).to_le_bytes());
        h[L_MONTH] = 6;
        h[L_DAY] = 2;
        h[L_SCANS..L_SCANS + 2].copy_from_slice(&16u16.to_le_bytes());
        let hdr = parse_main_header(&ByteSource::new(&h), &cfg()).unwrap();

        assert_eq!(hdr.layout, HeaderLayout::Legacy);
        assert_eq!(hdr.header_size(), 256);
        assert_eq!(hdr.global_y_exponent, 5);
        assert_eq!(hdr.num_points, Some(3));
        assert_eq!(hdr.first_x, 10.0);
        assert_eq!(hdr.last_x, 20.0);
        assert_eq!(hdr.log_block_offset, 0);
        assert_eq!(hdr.metadata.scan_count, Some(16));
        assert_eq!(hdr.metadata.z_unit, XUnit::from_u8(13));
        assert_eq!(
            hdr.metadata.acquired.unwrap().to_string(),
            "1994-06-02 00:00:00"
        );
    }

    #[test]
    fn test_legacy_float_exponent_word() {
        let mut h = legacy_header(0, 2.0, 0.0, 1.0);
        h[L_EXPONENT..L_EXPONENT + 2].copy_from_slice(&0x0080i16.to_le_bytes());
        let hdr = parse_main_header(&ByteSource::new(&h), &cfg()).unwrap();
        assert_eq!(hdr.global_y_exponent, FLOAT_EXPONENT);

        h[L_EXPONENT..L_EXPONENT + 2].copy_from_slice(&(-128i16).to_le_bytes());
        let hdr = parse_main_header(&ByteSource::new(&h), &cfg()).unwrap();
        assert_eq!(hdr.global_y_exponent, FLOAT_EXPONENT);

        h[L_EXPONENT..L_EXPONENT + 2].copy_from_slice(&0x0081i16.to_le_bytes());
        let hdr = parse_main_header(&ByteSource::new(&h), &cfg()).unwrap();
        assert_eq!(hdr.global_y_exponent, 129);
    }

    #[test]
    fn test_legacy_nan_point_count() {
        let h = legacy_header(0, f32::NAN, 0.0, 1.0);
        assert!(matches!(
            parse_main_header(&ByteSource::new(&h), &cfg()),
            Err(DecodeError::InvalidPointCount { count: 0, .. })
        ));
    }

    #[test]
    fn test_legacy_multifile_count_from_budget() {
        // two subfiles of 4 points, 32-bit words: the first header is inside
        // the main header, so 16 bytes of Y then one (32 + 16) byte subfile
        let mut img = legacy_header(FLAG_MULTIFILE, 4.0, 0.0, 3.0);
        img.extend(std::iter::repeat(0u8).take(16 + 32 + 16));
        let hdr = parse_main_header(&ByteSource::new(&img), &cfg()).unwrap();
        assert_eq!(hdr.num_subfiles, 2);

        img.push(0);
        assert!(matches!(
            parse_main_header(&ByteSource::new(&img), &cfg()),
            Err(DecodeError::InvalidSubfileCount { .. })
        ));
    }

    #[test]
    fn test_legacy_rejects_per_subfile_x() {
        let flags = FLAG_MULTIFILE | FLAG_EXPLICIT_X | FLAG_PER_SUBFILE_X;
        let h = legacy_header(flags, 4.0, 0.0, 3.0);
        assert!(matches!(
            parse_main_header(&ByteSource::new(&h), &cfg()),
            Err(DecodeError::UnsupportedEncoding(_))
        ));
    }
}
