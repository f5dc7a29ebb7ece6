use super::{FILE_HEADER_SIZE, FILE_MAGIC};
use crate::endian::{read_bytes_at, read_u16_at, read_u32_at, read_u64_at, read_u8_at, trim_cstr_field};
use crate::error::{Error, Result};
use crate::key::{MAX_HASH_PRECISION, MIN_HASH_PRECISION};

/// The 256-byte top-level file header (spec.md §3).
#[derive(Debug, Clone)]
pub struct FileHeader {
    pub version: u16,
    /// Actually the number of cards in the file, despite the on-disk field
    /// name (spec.md §3 calls this out explicitly).
    pub num_cards: u32,
    pub header_size: u32,
    pub index_offset: u64,
    pub creation_date: String,
    pub source_info: String,
    pub comment: String,
    pub num_index: u16,
    pub hash_precision: u8,
}

impl FileHeader {
    pub fn from_buffer(buf: &[u8]) -> Result<Self> {
        if buf.len() < FILE_HEADER_SIZE {
            return Err(Error::short_read(0, FILE_HEADER_SIZE as u64, buf.len() as u64));
        }
        let magic = read_bytes_at(buf, 0, 4)?;
        if magic != FILE_MAGIC {
            let mut found = [0u8; 4];
            found.copy_from_slice(magic);
            return Err(Error::bad_magic(0, FILE_MAGIC, found));
        }
        let version = read_u16_at(buf, 4)?;
        let num_cards = read_u32_at(buf, 6)?;
        let header_size = read_u32_at(buf, 10)?;
        let index_offset = read_u64_at(buf, 14)?;
        let creation_date = trim_cstr_field(read_bytes_at(buf, 22, 16)?);
        let source_info = trim_cstr_field(read_bytes_at(buf, 38, 64)?);
        let comment = trim_cstr_field(read_bytes_at(buf, 102, 128)?);
        let num_index = read_u16_at(buf, 230)?;
        let hash_precision = read_u8_at(buf, 232)?;
        // bytes 233..256 are reserved

        if header_size != FILE_HEADER_SIZE as u32 {
            return Err(Error::CatalogCorrupt(format!(
                "file header size {header_size} != {FILE_HEADER_SIZE}"
            )));
        }
        if !(1..=255).contains(&num_index) {
            return Err(Error::InvalidArgument(format!(
                "numIndex {num_index} outside [1,255]"
            )));
        }
        if !(MIN_HASH_PRECISION..=MAX_HASH_PRECISION).contains(&hash_precision) {
            return Err(Error::InvalidArgument(format!(
                "hashPrecision {hash_precision} outside [{MIN_HASH_PRECISION},{MAX_HASH_PRECISION}]"
            )));
        }

        Ok(Self {
            version,
            num_cards,
            header_size,
            index_offset,
            creation_date,
            source_info,
            comment,
            num_index,
            hash_precision,
        })
    }
}
