//! Format flags and the closed mode enumerations they select.
//!
//! Every layout decision the decoder makes is one of the small decision
//! functions in this module, so the mutually exclusive modes can be checked
//! in isolation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DecodeError, Result};

// ─── Flag bits (main header byte 0) ─────────────────────────────────────────

/// Y samples are 16-bit words.
pub const FLAG_Y16: u8 = 0x01;
/// Subfiles are ordered chromatogram-style (fixed z increment).
pub const FLAG_CHROMATOGRAM: u8 = 0x02;
/// The file holds more than one subfile.
pub const FLAG_MULTIFILE: u8 = 0x04;
/// Subfile z values are randomly spaced.
pub const FLAG_RANDOM_Z: u8 = 0x08;
/// Subfile z values are ordered but unevenly spaced.
pub const FLAG_ORDERED_Z: u8 = 0x10;
/// Axis labels come from the custom label text.
pub const FLAG_CUSTOM_LABELS: u8 = 0x20;
/// Each subfile carries its own X array.
pub const FLAG_PER_SUBFILE_X: u8 = 0x40;
/// X values are stored explicitly.
pub const FLAG_EXPLICIT_X: u8 = 0x80;

/// Exponent value that marks Y samples as IEEE floats.
pub const FLOAT_EXPONENT: i32 = -128;

/// The raw flag byte with one accessor per bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FormatFlags(pub u8);

impl FormatFlags {
    pub fn bits(self) -> u8 {
        self.0
    }

    fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub fn y_16bit(self) -> bool {
        self.has(FLAG_Y16)
    }

    pub fn chromatogram(self) -> bool {
        self.has(FLAG_CHROMATOGRAM)
    }

    pub fn multifile(self) -> bool {
        self.has(FLAG_MULTIFILE)
    }

    pub fn random_z(self) -> bool {
        self.has(FLAG_RANDOM_Z)
    }

    pub fn ordered_z(self) -> bool {
        self.has(FLAG_ORDERED_Z)
    }

    pub fn custom_labels(self) -> bool {
        self.has(FLAG_CUSTOM_LABELS)
    }

    pub fn explicit_x(self) -> bool {
        self.has(FLAG_EXPLICIT_X)
    }

    /// The per-subfile-X bit only counts on multifile explicit-X files.
    pub fn per_subfile_x(self) -> bool {
        self.has(FLAG_PER_SUBFILE_X) && self.multifile() && self.explicit_x()
    }

    pub fn x_axis_mode(self) -> XAxisMode {
        XAxisMode::select(self.explicit_x(), self.per_subfile_x())
    }

    pub fn y_word_width(self) -> YWordWidth {
        if self.y_16bit() {
            YWordWidth::Bits16
        } else {
            YWordWidth::Bits32
        }
    }
}

// ─── Header layout (main header byte 1) ─────────────────────────────────────

pub const VERSION_MODERN: u8 = 0x4B;
pub const VERSION_MODERN_BIG_ENDIAN: u8 = 0x4C;
pub const VERSION_LEGACY: u8 = 0x4D;

pub const MODERN_HEADER_SIZE: usize = 512;
pub const LEGACY_HEADER_SIZE: usize = 256;
/// The legacy header ends with the first subfile's header.
pub const LEGACY_FIRST_SUBHEADER: usize = 224;

/// Which of the two main-header layouts a file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderLayout {
    /// 256-byte header, float counts, 16-bit exponent, word-swapped 32-bit Y.
    Legacy,
    /// 512-byte header, integer counts and double X bounds.
    Modern,
}

impl HeaderLayout {
    /// `available` is the source length, reported if the byte is unknown.
    pub fn from_version(version: u8, available: usize) -> Result<Self> {
        match version {
            VERSION_MODERN => Ok(Self::Modern),
            VERSION_LEGACY => Ok(Self::Legacy),
            VERSION_MODERN_BIG_ENDIAN => Err(DecodeError::UnsupportedEncoding(
                "big-endian modern layout (version 0x4C)".into(),
            )),
            _ => Err(DecodeError::MalformedHeader {
                reason: "unknown format version byte",
                expected: MODERN_HEADER_SIZE,
                available,
            }),
        }
    }

    pub fn header_size(self) -> usize {
        match self {
            Self::Legacy => LEGACY_HEADER_SIZE,
            Self::Modern => MODERN_HEADER_SIZE,
        }
    }

    /// Offset of the first subfile header when it lives inside the main header.
    pub fn embedded_subheader(self) -> Option<usize> {
        match self {
            Self::Legacy => Some(LEGACY_FIRST_SUBHEADER),
            Self::Modern => None,
        }
    }

    pub fn word_order(self) -> WordOrder {
        match self {
            Self::Legacy => WordOrder::HighHalfFirst,
            Self::Modern => WordOrder::LittleEndian,
        }
    }
}

impl fmt::Display for HeaderLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy (0x4D)"),
            Self::Modern => write!(f, "modern (0x4B)"),
        }
    }
}

// ─── X axis mode ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum XAxisMode {
    /// X generated from first/last X and the point count, shared by all subfiles.
    GeneratedLinear,
    /// One explicit X array after the main header, shared by all subfiles.
    SharedExplicit,
    /// An explicit X array after each subfile header (XYXY).
    PerSubfileExplicit,
}

impl XAxisMode {
    /// | explicit_x | per_subfile_x | mode |
    /// |---|---|---|
    /// | false | any | GeneratedLinear |
    /// | true | false | SharedExplicit |
    /// | true | true | PerSubfileExplicit |
    pub fn select(explicit_x: bool, per_subfile_x: bool) -> Self {
        match (explicit_x, per_subfile_x) {
            (false, _) => Self::GeneratedLinear,
            (true, false) => Self::SharedExplicit,
            (true, true) => Self::PerSubfileExplicit,
        }
    }
}

// ─── Y word width / encoding ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YWordWidth {
    Bits16,
    Bits32,
}

impl YWordWidth {
    pub fn bits(self) -> u32 {
        match self {
            Self::Bits16 => 16,
            Self::Bits32 => 32,
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            Self::Bits16 => 2,
            Self::Bits32 => 4,
        }
    }
}

/// How 32-bit integer Y words are laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordOrder {
    LittleEndian,
    /// Legacy files: high 16-bit half first, each half little-endian.
    HighHalfFirst,
}

/// How one subfile's Y words become samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YEncoding {
    /// 32-bit IEEE floats, no scaling.
    Float32,
    /// Signed integers of `width`, scaled by `2^(exponent - bits)`.
    Scaled { width: YWordWidth, exponent: i32 },
}

impl YEncoding {
    /// | width | exponent | encoding |
    /// |---|---|---|
    /// | 32 | -128 | Float32 |
    /// | 16 | -128 | unsupported |
    /// | w | e | Scaled(w, e) |
    pub fn select(width: YWordWidth, exponent: i32) -> Result<Self> {
        match (width, exponent) {
            (YWordWidth::Bits32, FLOAT_EXPONENT) => Ok(Self::Float32),
            (YWordWidth::Bits16, FLOAT_EXPONENT) => Err(DecodeError::UnsupportedEncoding(
                "16-bit Y words with the float exponent".into(),
            )),
            (width, exponent) => Ok(Self::Scaled { width, exponent }),
        }
    }

    pub fn word_bytes(self) -> usize {
        match self {
            Self::Float32 => 4,
            Self::Scaled { width, .. } => width.bytes(),
        }
    }
}

/// The subfile exponent overrides the global one unless it is 0.
pub fn effective_exponent(global: i32, subfile: i32) -> i32 {
    if subfile == 0 {
        global
    } else {
        subfile
    }
}
