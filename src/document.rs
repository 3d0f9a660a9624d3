//! The decoded document.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::directory::DirectoryEntry;
use crate::flags::{FormatFlags, HeaderLayout};
use crate::header::FileMetadata;
use crate::logblock::{parse_log_entries, LogBlockHeader};

/// One spectrum. `x` and `y` always have the same non-zero length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subfile {
    /// Shared with every other subfile unless the file is XYXY.
    pub x: Arc<[f64]>,
    pub y: Vec<f64>,
    pub z_start: f32,
    pub z_end: f32,
    pub index: u16,
    pub flags: u8,
    pub noise: f32,
    pub coadded_scans: u32,
    pub w_value: f32,
    /// Exponent applied to the Y words; -128 for float samples.
    pub exponent: i32,
}

impl Subfile {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// (x, y) pairs in file order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpcDocument {
    pub is_multifile: bool,
    pub has_explicit_x: bool,
    pub has_per_subfile_x: bool,
    /// 16 or 32.
    pub y_word_width: u32,
    pub subfiles: Vec<Subfile>,
    pub log_text: Option<String>,
    pub log_header: Option<LogBlockHeader>,
    /// Shared point count; `None` for XYXY files.
    pub num_points: Option<usize>,
    /// X range, taken from the stored X values when they are explicit and shared.
    pub first_x: f64,
    pub last_x: f64,
    pub format_version: HeaderLayout,
    pub global_y_exponent: i32,
    pub flags: FormatFlags,
    pub metadata: FileMetadata,
    pub directory: Option<Vec<DirectoryEntry>>,
}

impl SpcDocument {
    pub fn num_subfiles(&self) -> usize {
        self.subfiles.len()
    }

    /// `KEY=VALUE` lines of the log text, in order.
    pub fn log_entries(&self) -> Vec<(String, String)> {
        self.log_text
            .as_deref()
            .map(parse_log_entries)
            .unwrap_or_default()
    }

    /// Look up one log entry by key.
    pub fn log_value(&self, key: &str) -> Option<String> {
        self.log_entries()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
