//! Decode orchestration.
//!
//! A decode runs in two passes over the source. The plan pass walks the
//! subfile headers in file order and fixes every subfile's byte ranges and Y
//! encoding, so all bounds and encoding errors surface before any sample is
//! produced. The decode pass then turns each planned subfile into samples;
//! plans share nothing mutable, so that pass can run on the rayon pool.

use log::{debug, trace, warn};
use rayon::prelude::*;
use std::sync::Arc;

use crate::config::DecoderConfig;
use crate::directory::{read_directory, DirectoryEntry};
use crate::document::{SpcDocument, Subfile};
use crate::error::{DecodeError, Result};
use crate::flags::effective_exponent;
use crate::header::{parse_main_header, MainHeader};
use crate::logblock::read_log_block;
use crate::source::{ByteSource, Cursor};
use crate::subheader::{SubfileHeader, SUBHEADER_SIZE};
use crate::validate;
use crate::xaxis::{self, SharedLayout};
use crate::ydata::{YDecoder, YRun};

/// Decodes SPC images with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<SpcDocument> {
        decode_with(bytes, &self.config)
    }
}

/// Decode with the default limits.
pub fn decode(bytes: &[u8]) -> Result<SpcDocument> {
    decode_with(bytes, &DecoderConfig::default())
}

pub fn decode_with(bytes: &[u8], config: &DecoderConfig) -> Result<SpcDocument> {
    validate::check_source_size(bytes.len(), config)?;
    let src = ByteSource::new(bytes);

    let header = parse_main_header(&src, config)?;
    debug!(
        "{} header: {} subfile(s), {:?}, {}-bit Y, exponent {}",
        header.layout,
        header.num_subfiles,
        header.x_axis_mode(),
        header.y_word_width().bits(),
        header.global_y_exponent
    );

    let mut cursor = Cursor::at(header.header_size());
    let layout = xaxis::shared_layout(&src, &header, &mut cursor)?;
    let plans = plan_subfiles(&src, &header, layout, &mut cursor, config)?;
    let shared = layout.map(|l| l.resolve(&src, &header)).transpose()?;
    // XYXY plans never read the shared axis
    let shared_x: Arc<[f64]> = match &shared {
        Some(axis) => Arc::clone(&axis.values),
        None => Arc::from(Vec::new()),
    };

    let directory = match header.directory_offset {
        Some(offset) => {
            let entries = read_directory(&src, offset, header.num_subfiles)?;
            check_directory(&entries, &plans);
            Some(entries)
        }
        None => None,
    };

    let subfiles = if config.parallel && plans.len() > 1 {
        plans
            .par_iter()
            .map(|plan| decode_subfile(&src, plan, &shared_x))
            .collect::<Result<Vec<_>>>()?
    } else {
        plans
            .iter()
            .map(|plan| decode_subfile(&src, plan, &shared_x))
            .collect::<Result<Vec<_>>>()?
    };

    let log = read_log_block(&src, header.log_block_offset, config.max_log_text_bytes)?;
    if let Some(log) = &log {
        debug!("log block: {} bytes of text", log.text.len());
    }

    let (first_x, last_x) = match &shared {
        Some(axis) => (axis.first_x, axis.last_x),
        None => (header.first_x, header.last_x),
    };
    let (log_header, log_text) = match log {
        Some(log) => (Some(log.header), Some(log.text)),
        None => (None, None),
    };

    Ok(SpcDocument {
        is_multifile: header.flags.multifile(),
        has_explicit_x: header.flags.explicit_x(),
        has_per_subfile_x: header.flags.per_subfile_x(),
        y_word_width: header.y_word_width().bits(),
        subfiles,
        log_text,
        log_header,
        num_points: header.num_points,
        first_x,
        last_x,
        format_version: header.layout,
        global_y_exponent: header.global_y_exponent,
        flags: header.flags,
        metadata: header.metadata,
        directory,
    })
}

// ─── Plan ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum XSource {
    Shared,
    Explicit { offset: usize, len: usize },
}

/// Everything needed to decode one subfile without touching the cursor.
#[derive(Debug, Clone)]
struct SubfilePlan {
    index: usize,
    header_offset: usize,
    header: SubfileHeader,
    x: XSource,
    points: usize,
    y_offset: usize,
    y_len: usize,
    exponent: i32,
    decoder: YDecoder,
}

fn plan_subfiles(
    src: &ByteSource<'_>,
    header: &MainHeader,
    shared: Option<SharedLayout>,
    cursor: &mut Cursor,
    config: &DecoderConfig,
) -> Result<Vec<SubfilePlan>> {
    // Each subfile needs at least its header, which bounds the allocation
    // independently of the declared count.
    let room = src.remaining_from(cursor.position()) / SUBHEADER_SIZE;
    let mut plans = Vec::with_capacity(header.num_subfiles.min(room));

    for index in 0..header.num_subfiles {
        // Legacy files keep the first subfile header inside the main header;
        // its data still starts at the cursor.
        let (header_offset, sub) = match header.layout.embedded_subheader() {
            Some(at) if index == 0 => {
                let sub = SubfileHeader::parse(src, &mut Cursor::at(at), index)?;
                (at, sub)
            }
            _ => (cursor.position(), SubfileHeader::parse(src, cursor, index)?),
        };

        let (x, points) = match shared {
            Some(layout) => (XSource::Shared, layout.points()),
            None => {
                let points =
                    validate::check_point_count(sub.local_num_points as u64, Some(index), config)?;
                let offset = cursor.position();
                let len = xaxis::explicit_len(src, offset, points)?;
                cursor.skip(len);
                (XSource::Explicit { offset, len }, points)
            }
        };

        let exponent = effective_exponent(header.global_y_exponent, sub.exponent_override as i32);
        let decoder = YDecoder::new(header.y_word_width(), exponent, header.layout.word_order())?;

        let y_offset = cursor.position();
        let y_len = validate::array_bytes(points, decoder.word_bytes(), y_offset, src.len())?;
        validate::require(y_offset, y_len, src.len(), |available| {
            DecodeError::TruncatedYData {
                subfile: index,
                offset: y_offset,
                expected: y_len,
                available,
            }
        })?;
        cursor.skip(y_len);

        trace!(
            "subfile {}: header at {}, {} points, Y at {}, {:?}",
            index,
            header_offset,
            points,
            y_offset,
            decoder.encoding()
        );
        plans.push(SubfilePlan {
            index,
            header_offset,
            header: sub,
            x,
            points,
            y_offset,
            y_len,
            exponent,
            decoder,
        });
    }
    Ok(plans)
}

fn check_directory(entries: &[DirectoryEntry], plans: &[SubfilePlan]) {
    for (entry, plan) in entries.iter().zip(plans) {
        if entry.position < 0 || entry.position as usize != plan.header_offset {
            warn!(
                "directory places subfile {} at {}, but it starts at {}",
                plan.index, entry.position, plan.header_offset
            );
        }
    }
}

// ─── Decode ─────────────────────────────────────────────────────────────────

fn decode_subfile(src: &ByteSource<'_>, plan: &SubfilePlan, shared_x: &Arc<[f64]>) -> Result<Subfile> {
    let x: Arc<[f64]> = match plan.x {
        XSource::Shared => Arc::clone(shared_x),
        XSource::Explicit { offset, len } => xaxis::widen_words(src.read(offset, len)?).into(),
    };
    let y = plan.decoder.decode(YRun {
        subfile: plan.index,
        offset: plan.y_offset,
        points: plan.points,
        bytes: src.read(plan.y_offset, plan.y_len)?,
    })?;

    Ok(Subfile {
        x,
        y,
        z_start: plan.header.z_start,
        z_end: plan.header.z_end,
        index: plan.header.index,
        flags: plan.header.flags,
        noise: plan.header.noise,
        coadded_scans: plan.header.coadded_scans,
        w_value: plan.header.w_value,
        exponent: plan.exponent,
    })
}
