//! Decoder limits.
//!
//! The limits bound every allocation the decoder makes from header-declared
//! counts, so a hostile file is rejected before it can drive memory use.

use serde::{Deserialize, Serialize};

/// Default ceiling on the whole input (1 GiB).
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 1024 * 1024 * 1024;
/// Default ceiling on points in one subfile.
pub const DEFAULT_MAX_POINTS_PER_SUBFILE: usize = 10_000_000;
/// Default ceiling on subfiles in one document.
pub const DEFAULT_MAX_SUBFILES: usize = 100_000;
/// Default ceiling on decoded log text (1 MiB).
pub const DEFAULT_MAX_LOG_TEXT_BYTES: usize = 1024 * 1024;

/// Options for one or more decode calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Reject sources larger than this many bytes.
    pub max_source_bytes: usize,
    /// Reject any subfile declaring more points than this.
    pub max_points_per_subfile: usize,
    /// Reject files declaring more subfiles than this.
    pub max_subfiles: usize,
    /// Log text beyond this many bytes is dropped.
    pub max_log_text_bytes: usize,
    /// Decode subfile payloads on the rayon pool once their byte ranges are known.
    pub parallel: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            max_points_per_subfile: DEFAULT_MAX_POINTS_PER_SUBFILE,
            max_subfiles: DEFAULT_MAX_SUBFILES,
            max_log_text_bytes: DEFAULT_MAX_LOG_TEXT_BYTES,
            parallel: true,
        }
    }
}

impl DecoderConfig {
    /// Load a config from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_max_source_bytes(mut self, max: usize) -> Self {
        self.max_source_bytes = max;
        self
    }

    pub fn with_max_points_per_subfile(mut self, max: usize) -> Self {
        self.max_points_per_subfile = max;
        self
    }

    pub fn with_max_subfiles(mut self, max: usize) -> Self {
        self.max_subfiles = max;
        self
    }

    pub fn with_max_log_text_bytes(mut self, max: usize) -> Self {
        self.max_log_text_bytes = max;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
