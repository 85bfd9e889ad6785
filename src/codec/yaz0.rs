//! Yaz0 block compression codec.
//!
//! Yaz0 is the run-length/LZ77 scheme used by the SARC ecosystem. A stream
//! starts with a 16-byte header:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00 | 4 | magic `Yaz0` |
//! | 0x04 | 4 | decompressed size, **always big-endian** |
//! | 0x08 | 4 | reserved (data alignment hint) |
//! | 0x0C | 4 | reserved |
//!
//! The payload is a sequence of groups. Each group is one head byte of eight
//! flag bits (MSB first) followed by eight items. A set bit means a literal
//! byte; a clear bit means a back-reference of two bytes, where `n = b1 >> 4`
//! and `dist = (((b1 & 0x0F) << 8) | b2) + 1`. When `n == 0` a third byte
//! follows and the length is `b3 + 0x12`; otherwise the length is `n + 2`.
//! Lengths may exceed the distance (overlapping copy), which encodes runs.
//!
//! Callers gate on [`is_compressed`]; [`decompress`] is never invoked on
//! plain data. [`compress`] is a greedy matcher whose search window scales
//! with the level, deterministic for a given level.

use crate::{Error, Result};
use std::borrow::Cow;

/// The Yaz0 stream magic.
pub const MAGIC: &[u8; 4] = b"Yaz0";

/// Size of the Yaz0 header in bytes.
pub const HEADER_SIZE: usize = 0x10;

/// Maximum back-reference distance.
const MAX_DISTANCE: usize = 0x1000;

/// Maximum back-reference length (three-byte encoding).
const MAX_LENGTH: usize = 0x111;

/// Shortest back-reference worth emitting.
const MIN_LENGTH: usize = 3;

/// The default compression level used when rebuilding nested archives.
pub const DEFAULT_LEVEL: u8 = 7;

/// Returns whether `data` carries the Yaz0 magic header.
///
/// # Examples
///
/// ```
/// use nestarc::codec::yaz0;
///
/// assert!(yaz0::is_compressed(&yaz0::compress(b"hello", 7)));
/// assert!(!yaz0::is_compressed(b"hello"));
/// ```
pub fn is_compressed(data: &[u8]) -> bool {
    data.len() >= 4 && &data[0..4] == MAGIC
}

/// Peeks at the first four decompressed bytes of a Yaz0 stream without
/// decompressing it.
///
/// The first group head sits right after the 16-byte header, so when the
/// stream opens with at least four literals the bytes at `0x11..0x15` are the
/// first four bytes of the payload. This is how nested compressed containers
/// are recognized cheaply; it returns `None` when the stream is too short or
/// opens with a back-reference (impossible for position zero in well-formed
/// streams).
pub fn peek_payload_magic(data: &[u8]) -> Option<[u8; 4]> {
    if !is_compressed(data) || data.len() < HEADER_SIZE + 5 {
        return None;
    }
    // Top four flag bits must mark literals for the peek to be valid.
    if data[HEADER_SIZE] & 0xF0 != 0xF0 {
        return None;
    }
    let mut magic = [0u8; 4];
    magic.copy_from_slice(&data[HEADER_SIZE + 1..HEADER_SIZE + 5]);
    Some(magic)
}

/// Decompresses a Yaz0 stream.
///
/// # Errors
///
/// Returns [`Error::CorruptData`] if the magic is missing, the stream is
/// truncated, a back-reference reaches before the start of the output, or
/// the payload overruns the declared decompressed size.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    if !is_compressed(data) {
        return Err(Error::CorruptData("missing Yaz0 magic".into()));
    }
    if data.len() < HEADER_SIZE {
        return Err(Error::CorruptData("truncated Yaz0 header".into()));
    }
    let size = u32::from_be_bytes([data[4], data[5], data[6], data[7]]) as usize;

    let mut out: Vec<u8> = Vec::with_capacity(size);
    let mut src = HEADER_SIZE;
    let mut head = 0u8;
    let mut bits = 0u8;

    while out.len() < size {
        if bits == 0 {
            head = *data
                .get(src)
                .ok_or_else(|| Error::CorruptData("truncated Yaz0 stream".into()))?;
            src += 1;
            bits = 8;
        }
        if head & 0x80 != 0 {
            let byte = *data
                .get(src)
                .ok_or_else(|| Error::CorruptData("truncated Yaz0 literal".into()))?;
            out.push(byte);
            src += 1;
        } else {
            if src + 1 >= data.len() {
                return Err(Error::CorruptData("truncated Yaz0 back-reference".into()));
            }
            let b1 = data[src];
            let b2 = data[src + 1];
            src += 2;
            let dist = ((((b1 & 0x0F) as usize) << 8) | b2 as usize) + 1;
            let len = match b1 >> 4 {
                0 => {
                    let b3 = *data.get(src).ok_or_else(|| {
                        Error::CorruptData("truncated Yaz0 back-reference".into())
                    })?;
                    src += 1;
                    b3 as usize + 0x12
                }
                n => n as usize + 2,
            };
            if dist > out.len() {
                return Err(Error::CorruptData(format!(
                    "back-reference distance {dist} exceeds output position {}",
                    out.len()
                )));
            }
            if out.len() + len > size {
                return Err(Error::CorruptData(
                    "payload overruns declared decompressed size".into(),
                ));
            }
            // Overlapping copies are legal and must run byte by byte.
            for _ in 0..len {
                let byte = out[out.len() - dist];
                out.push(byte);
            }
        }
        head <<= 1;
        bits -= 1;
    }

    Ok(out)
}

/// Decompresses `data` if it carries the Yaz0 magic, otherwise borrows it
/// unchanged.
///
/// # Errors
///
/// Returns [`Error::CorruptData`] if the magic is present but the framing is
/// invalid.
pub fn decompress_if(data: &[u8]) -> Result<Cow<'_, [u8]>> {
    if is_compressed(data) {
        Ok(Cow::Owned(decompress(data)?))
    } else {
        Ok(Cow::Borrowed(data))
    }
}

/// Compresses `data` into a Yaz0 stream.
///
/// `level` ranges from 1 (fastest, smallest search window) to 9 (full
/// 4 KiB window); values outside the range are clamped. The output is
/// deterministic for a given level.
pub fn compress(data: &[u8], level: u8) -> Vec<u8> {
    let level = level.clamp(1, 9) as usize;
    let window = MAX_DISTANCE.min(0x10 << level);

    let mut out = Vec::with_capacity(HEADER_SIZE + data.len() + data.len() / 8 + 1);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&[0u8; 8]);

    let mut pos = 0;
    while pos < data.len() {
        let head_idx = out.len();
        out.push(0);
        let mut head = 0u8;
        for bit in (0u8..8).rev() {
            if pos >= data.len() {
                break;
            }
            let (len, dist) = best_match(data, pos, window);
            if len >= MIN_LENGTH {
                let dist_code = (dist - 1) as u16;
                if len >= 0x12 {
                    out.push((dist_code >> 8) as u8);
                    out.push(dist_code as u8);
                    out.push((len - 0x12) as u8);
                } else {
                    out.push((((len - 2) as u8) << 4) | (dist_code >> 8) as u8);
                    out.push(dist_code as u8);
                }
                pos += len;
            } else {
                head |= 1 << bit;
                out.push(data[pos]);
                pos += 1;
            }
        }
        out[head_idx] = head;
    }
    out
}

/// Finds the longest match for `data[pos..]` within the search window,
/// scanning nearest-first so equal lengths prefer the shorter distance.
fn best_match(data: &[u8], pos: usize, window: usize) -> (usize, usize) {
    let max_len = MAX_LENGTH.min(data.len() - pos);
    if max_len < MIN_LENGTH {
        return (0, 0);
    }
    let start = pos.saturating_sub(window);
    let mut best_len = 0;
    let mut best_dist = 0;

    for candidate in (start..pos).rev() {
        if data[candidate] != data[pos] {
            continue;
        }
        let mut len = 1;
        while len < max_len && data[candidate + len] == data[pos + len] {
            len += 1;
        }
        if len > best_len {
            best_len = len;
            best_dist = pos - candidate;
            if len == max_len {
                break;
            }
        }
    }
    (best_len, best_dist)
}
