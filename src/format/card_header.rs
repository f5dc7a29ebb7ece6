use super::{CARD_HEADER_SIZE, CARD_MAGIC};
use crate::endian::{read_bytes_at, read_u32_at, read_u64_at, trim_cstr_field};
use crate::error::{Error, Result};

/// The 256-byte per-card header (spec.md §3).
#[derive(Debug, Clone)]
pub struct CardHeader {
    pub num_tables: u32,
    pub header_size: u32,
    /// Offset of the table index, relative to the card's start byte.
    pub index_offset: u64,
    pub card_size: u64,
    pub comment: String,
}

impl CardHeader {
    pub fn from_buffer(buf: &[u8]) -> Result<Self> {
        if buf.len() < CARD_HEADER_SIZE {
            return Err(Error::short_read(0, CARD_HEADER_SIZE as u64, buf.len() as u64));
        }
        let magic = read_bytes_at(buf, 0, 4)?;
        if magic != CARD_MAGIC {
            let mut found = [0u8; 4];
            found.copy_from_slice(magic);
            return Err(Error::bad_magic(0, CARD_MAGIC, found));
        }
        let num_tables = read_u32_at(buf, 4)?;
        let header_size = read_u32_at(buf, 8)?;
        let index_offset = read_u64_at(buf, 12)?;
        let card_size = read_u64_at(buf, 20)?;
        let comment = trim_cstr_field(read_bytes_at(buf, 28, 128)?);
        // bytes 156..256 are reserved

        if header_size != CARD_HEADER_SIZE as u32 {
            return Err(Error::CatalogCorrupt(format!(
                "card header size {header_size} != {CARD_HEADER_SIZE}"
            )));
        }

        Ok(Self {
            num_tables,
            header_size,
            index_offset,
            card_size,
            comment,
        })
    }
}
