//! Decoder for Galactic SPC spectroscopy files.
//!
//! Reads a whole SPC image from memory and returns an [`SpcDocument`]: one or
//! more X/Y curves with their subfile and file metadata, plus the optional
//! log text. Both the 512-byte header layout and the legacy 256-byte layout
//! are supported; every declared count and offset is checked against the
//! configured limits and the source length before it is used.

pub mod config;
pub mod decode;
pub mod directory;
pub mod document;
pub mod error;
pub mod flags;
pub mod header;
pub mod logblock;
pub mod source;
pub mod subheader;
pub mod units;
pub mod validate;
pub mod xaxis;
pub mod ydata;

#[cfg(test)]
mod testutil;

pub use config::DecoderConfig;
pub use decode::{decode, decode_with, Decoder};
pub use directory::DirectoryEntry;
pub use document::{SpcDocument, Subfile};
pub use error::{DecodeError, Result};
pub use flags::{FormatFlags, HeaderLayout, XAxisMode, YEncoding, YWordWidth};
pub use header::{AxisLabels, FileMetadata};
pub use logblock::LogBlockHeader;
pub use units::{ExperimentType, XUnit, YUnit};
