//! Synthetic SPC images for unit tests.

use crate::flags::{VERSION_LEGACY, VERSION_MODERN};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 512-byte modern header with a zero exponent and no log block.
pub fn modern_header(flags: u8, npts: u32, first_x: f64, last_x: f64, nsub: u32) -> Vec<u8> {
    let mut h = vec![0u8; 512];
    h[0] = flags;
    h[1] = VERSION_MODERN;
    h[4..8].copy_from_slice(&npts.to_le_bytes());
    h[8..16].copy_from_slice(&first_x.to_le_bytes());
    h[16..24].copy_from_slice(&last_x.to_le_bytes());
    h[24..28].copy_from_slice(&nsub.to_le_bytes());
    h
}

/// 256-byte legacy header with a zero exponent. The embedded first subfile
/// header is all zeros, so it inherits the main exponent.
pub fn legacy_header(flags: u8, npts: f32, first_x: f32, last_x: f32) -> Vec<u8> {
    let mut h = vec![0u8; 256];
    h[0] = flags;
    h[1] = VERSION_LEGACY;
    h[4..8].copy_from_slice(&npts.to_le_bytes());
    h[8..12].copy_from_slice(&first_x.to_le_bytes());
    h[12..16].copy_from_slice(&last_x.to_le_bytes());
    h
}

pub fn set_modern_exponent(h: &mut [u8], exponent: i8) {
    h[3] = exponent as u8;
}

pub fn set_legacy_exponent(h: &mut [u8], exponent: i16) {
    h[2..4].copy_from_slice(&exponent.to_le_bytes());
}

/// Write the first subfile header into its slot inside a legacy header.
pub fn set_legacy_subheader(h: &mut [u8], sub: &[u8]) {
    h[224..256].copy_from_slice(sub);
}

pub fn set_log_offset(h: &mut [u8], offset: u32) {
    h[248..252].copy_from_slice(&offset.to_le_bytes());
}

pub fn subheader(exponent: i8, z_start: f32, z_end: f32, npts: u32) -> Vec<u8> {
    let mut s = vec![0u8; 32];
    s[1] = exponent as u8;
    s[4..8].copy_from_slice(&z_start.to_le_bytes());
    s[8..12].copy_from_slice(&z_end.to_le_bytes());
    s[16..20].copy_from_slice(&npts.to_le_bytes());
    s
}

pub fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn i32_bytes(words: &[i32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

pub fn i16_bytes(words: &[i16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// 32-bit words in the legacy high-half-first order.
pub fn legacy_i32_bytes(words: &[i32]) -> Vec<u8> {
    words
        .iter()
        .flat_map(|w| {
            let b = w.to_le_bytes();
            [b[2], b[3], b[0], b[1]]
        })
        .collect()
}

/// Log block with the text right after the 64-byte header.
pub fn log_block(text: &[u8]) -> Vec<u8> {
    let mut b = vec![0u8; 64];
    let size = (64 + text.len()) as u32;
    b[0..4].copy_from_slice(&size.to_le_bytes());
    b[4..8].copy_from_slice(&size.to_le_bytes());
    b[8..12].copy_from_slice(&64u32.to_le_bytes());
    b.extend_from_slice(text);
    b
}

/// Modern multifile image with a generated X axis and float Y.
pub fn float_multifile(rows: &[Vec<f32>], first_x: f64, last_x: f64) -> Vec<u8> {
    let npts = rows.first().map_or(0, |r| r.len()) as u32;
    let mut img = modern_header(
        crate::flags::FLAG_MULTIFILE,
        npts,
        first_x,
        last_x,
        rows.len() as u32,
    );
    set_modern_exponent(&mut img, -128);
    for (i, row) in rows.iter().enumerate() {
        img.extend(subheader(-128, i as f32, i as f32 + 0.5, 0));
        img.extend(f32_bytes(row));
    }
    img
}
