//! Fixed-width little-endian reads and fixed-length C-string field trimming.
//!
//! Every on-disk header in OPAT is byte-packed and little-endian (spec.md
//! §4.B, §9). Rather than cast a buffer onto a `#[repr(packed)]` struct
//! (alignment-unsafe, and silently wrong on a big-endian host), every field
//! is pulled out with an explicit little-endian read, the way
//! `mft::raw::Header::from_buffer` reads its packed `MULTI_SECTOR_HEADER`
//! field-by-field through `byteorder`.

use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

/// Reads a fixed-width little-endian value out of `buf` at `offset`, failing
/// `ShortRead` rather than panicking if the buffer is too small.
macro_rules! read_at {
    ($name:ident, $ty:ty, $read:ident, $len:expr) => {
        pub fn $name(buf: &[u8], offset: usize) -> Result<$ty> {
            let end = offset
                .checked_add($len)
                .ok_or_else(|| Error::CatalogCorrupt("offset overflow".into()))?;
            if end > buf.len() {
                return Err(Error::short_read(
                    offset as u64,
                    $len as u64,
                    buf.len().saturating_sub(offset) as u64,
                ));
            }
            let mut cursor = &buf[offset..end];
            Ok(cursor.$read::<LittleEndian>().expect("length checked above"))
        }
    };
}

read_at!(read_u16_at, u16, read_u16, 2);
read_at!(read_u32_at, u32, read_u32, 4);
read_at!(read_u64_at, u64, read_u64, 8);
read_at!(read_f64_at, f64, read_f64, 8);

pub fn read_u8_at(buf: &[u8], offset: usize) -> Result<u8> {
    buf.get(offset).copied().ok_or_else(|| {
        Error::short_read(offset as u64, 1, buf.len().saturating_sub(offset) as u64)
    })
}

/// Copies `len` bytes starting at `offset`, failing `ShortRead` if short.
pub fn read_bytes_at<'a>(buf: &'a [u8], offset: usize, len: usize) -> Result<&'a [u8]> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| Error::CatalogCorrupt("offset overflow".into()))?;
    if end > buf.len() {
        return Err(Error::short_read(
            offset as u64,
            len as u64,
            buf.len().saturating_sub(offset) as u64,
        ));
    }
    Ok(&buf[offset..end])
}

/// Reads a fixed-length array of `f64` values at `offset`.
pub fn read_f64_array_at(buf: &[u8], offset: usize, count: usize) -> Result<Vec<f64>> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(read_f64_at(buf, offset + i * 8)?);
    }
    Ok(out)
}

/// The logical value of a fixed-length `char[]` field: the prefix up to
/// (but excluding) the first zero byte, interpreted as UTF-8 (lossily, in
/// case a producer wrote non-UTF-8 bytes into padding).
pub fn trim_cstr_field(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// Streaming counterpart of `read_*_at`, used while walking a
/// `Read + Seek` source rather than a fully-buffered slice (the table
/// payload reader in `reader.rs` uses this to avoid materializing the
/// whole card up front).
pub fn read_u16<R: Read>(r: &mut R) -> Result<u16> {
    Ok(r.read_u16::<LittleEndian>()?)
}

pub fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    Ok(r.read_u32::<LittleEndian>()?)
}

pub fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    Ok(r.read_u64::<LittleEndian>()?)
}

pub fn read_f64<R: Read>(r: &mut R) -> Result<f64> {
    Ok(r.read_f64::<LittleEndian>()?)
}

pub fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    Ok(r.read_u8()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_le_primitives() {
        let buf = [0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(read_u16_at(&buf, 0).unwrap(), 1);
        assert_eq!(read_u32_at(&buf, 2).unwrap(), 2);
        assert_eq!(read_u64_at(&buf, 6).unwrap(), 3);
    }

    #[test]
    fn short_read_reports_offset() {
        let buf = [0u8; 1];
        let err = read_u16_at(&buf, 0).unwrap_err();
        assert!(matches!(err, Error::ShortRead { offset: 0, needed: 2, got: 1 }));
    }

    #[test]
    fn trims_at_first_zero() {
        let mut buf = [0u8; 8];
        buf[..5].copy_from_slice(b"hello");
        assert_eq!(trim_cstr_field(&buf), "hello");
    }

    #[test]
    fn empty_field_trims_to_empty_string() {
        let buf = [0u8; 8];
        assert_eq!(trim_cstr_field(&buf), "");
    }
}
