use crate::endian::{read_bytes_at, read_f64_array_at, read_u64_at};
use crate::error::Result;

/// One entry of the card catalog (spec.md §3): a coordinate vector and the
/// byte range, plus checksum, of the card it addresses.
#[derive(Debug, Clone)]
pub struct CardCatalogEntry {
    pub index: Vec<f64>,
    pub byte_start: u64,
    pub byte_end: u64,
    pub sha256: [u8; 32],
}

impl CardCatalogEntry {
    pub fn encoded_size(num_index: u16) -> usize {
        48 + 8 * num_index as usize
    }

    pub fn from_buffer(buf: &[u8], offset: usize, num_index: u16) -> Result<Self> {
        let index = read_f64_array_at(buf, offset, num_index as usize)?;
        let tail = offset + num_index as usize * 8;
        let byte_start = read_u64_at(buf, tail)?;
        let byte_end = read_u64_at(buf, tail + 8)?;
        let sha_slice = read_bytes_at(buf, tail + 16, 32)?;
        let mut sha256 = [0u8; 32];
        sha256.copy_from_slice(sha_slice);
        Ok(Self {
            index,
            byte_start,
            byte_end,
            sha256,
        })
    }
}
