//! On-disk record encoding shared by [`crate::writer`] and [`crate::reader`].
//!
//! A segment of generation `g` is three files sharing the stem
//! `segment-<g>`:
//!
//! - `segment-<g>.data` — `[magic: u32 LE]` followed by records:
//!   `crc32 (u32) | key_len (u32) | key | seq (u64) | present (u8) | [val_len (u32) | val]`.
//!   The CRC32 covers everything in the record after itself.
//! - `segment-<g>.index` — `[magic: u32 LE][stride: u32 LE]` followed by
//!   sparse entries: `key_len (u32) | key | offset (u64)`, one per
//!   `stride`-th data record, in ascending key order.
//! - `segment-<g>.bloom` — a [`bloom::BloomFilter`] in its own wire format.
//!
//! All integers are little-endian. Unlike a versioned single-file footer,
//! there is exactly one layout here: segments are written once and never
//! migrated in place, so there is nothing to version.

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher as Crc32;
use std::io::Read;

/// Magic tag at the start of every `.data` file.
pub const DATA_MAGIC: u32 = 0x4B53_5444;
/// Magic tag at the start of every `.index` file.
pub const INDEX_MAGIC: u32 = 0x4B53_5449;
/// Byte offset of the first record in a `.data` file, just past the magic.
pub const DATA_HEADER_LEN: u64 = 4;

/// Largest key this format will encode or decode.
pub const MAX_KEY_BYTES: usize = 64 * 1024;
/// Largest value this format will encode or decode.
pub const MAX_VALUE_BYTES: usize = 10 * 1024 * 1024;

/// Serializes one data record into `buf`, CRC-framed.
pub fn encode_record(buf: &mut Vec<u8>, key: &[u8], seq: u64, value: Option<&[u8]>) -> Result<()> {
    let start = buf.len();
    buf.write_u32::<LittleEndian>(0)?; // crc placeholder, patched below
    let body_start = buf.len();
    buf.write_u32::<LittleEndian>(key.len() as u32)?;
    buf.extend_from_slice(key);
    buf.write_u64::<LittleEndian>(seq)?;
    match value {
        Some(v) => {
            buf.write_u8(1)?;
            buf.write_u32::<LittleEndian>(v.len() as u32)?;
            buf.extend_from_slice(v);
        }
        None => {
            buf.write_u8(0)?;
        }
    }
    let mut hasher = Crc32::new();
    hasher.update(&buf[body_start..]);
    let crc = hasher.finalize();
    buf[start..start + 4].copy_from_slice(&crc.to_le_bytes());
    Ok(())
}

/// Reads and decodes exactly one record from `r`, returning
/// `(key, seq, value)`. Returns `Ok(None)` on a clean EOF before any byte of
/// the record is read; any other I/O failure, or a CRC/format mismatch, is
/// an error — segment files are written once by `write_from_iterator`, so a
/// truncation partway through a record means corruption, not a benign
/// partial write the way it would for the WAL.
pub fn decode_record<R: Read>(r: &mut R) -> Result<Option<(Vec<u8>, u64, Option<Vec<u8>>)>> {
    let crc = match r.read_u32::<LittleEndian>() {
        Ok(v) => v,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let key_len = r.read_u32::<LittleEndian>().context("reading key_len")? as usize;
    if key_len > MAX_KEY_BYTES {
        bail!("corrupt segment record: key_len {key_len} exceeds cap");
    }
    let mut key = vec![0u8; key_len];
    r.read_exact(&mut key).context("reading key")?;

    let seq = r.read_u64::<LittleEndian>().context("reading seq")?;
    let present = r.read_u8().context("reading present flag")?;

    let mut body = Vec::with_capacity(4 + key_len + 9);
    body.write_u32::<LittleEndian>(key_len as u32)?;
    body.extend_from_slice(&key);
    body.write_u64::<LittleEndian>(seq)?;

    let value = match present {
        0 => {
            body.write_u8(0)?;
            None
        }
        1 => {
            let val_len = r.read_u32::<LittleEndian>().context("reading val_len")? as usize;
            if val_len > MAX_VALUE_BYTES {
                bail!("corrupt segment record: val_len {val_len} exceeds cap");
            }
            let mut val = vec![0u8; val_len];
            r.read_exact(&mut val).context("reading value")?;
            body.write_u8(1)?;
            body.write_u32::<LittleEndian>(val_len as u32)?;
            body.extend_from_slice(&val);
            Some(val)
        }
        other => bail!("corrupt segment record: unknown present byte {other}"),
    };

    let mut hasher = Crc32::new();
    hasher.update(&body);
    if hasher.finalize() != crc {
        bail!("corrupt segment record: CRC mismatch for a {key_len}-byte key");
    }

    Ok(Some((key, seq, value)))
}

/// Parses a segment stem's generation number out of `segment-<g>`.
#[must_use]
pub fn generation_from_stem(stem: &str) -> Option<u64> {
    stem.strip_prefix("segment-")?.parse().ok()
}

/// Formats the file stem for generation `g`.
#[must_use]
pub fn stem_for_generation(generation: u64) -> String {
    format!("segment-{generation}")
}
