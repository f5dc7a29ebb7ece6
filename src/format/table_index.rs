use super::TABLE_INDEX_ENTRY_SIZE;
use crate::endian::{read_bytes_at, read_u16_at, read_u64_at, trim_cstr_field};
use crate::error::{Error, Result};

/// One entry of a card's table index (spec.md §3): where a named table's
/// payload lives within the card, and its shape.
#[derive(Debug, Clone)]
pub struct TableIndexEntry {
    pub tag: String,
    /// Offsets relative to the card's start byte.
    pub byte_start: u64,
    pub byte_end: u64,
    pub num_columns: u16,
    pub num_rows: u16,
    pub column_name: String,
    pub row_name: String,
    /// Per-cell vector length.
    pub size: u64,
}

impl TableIndexEntry {
    pub fn from_buffer(buf: &[u8], offset: usize) -> Result<Self> {
        if offset + TABLE_INDEX_ENTRY_SIZE > buf.len() {
            return Err(Error::short_read(
                offset as u64,
                TABLE_INDEX_ENTRY_SIZE as u64,
                buf.len().saturating_sub(offset) as u64,
            ));
        }
        let tag = trim_cstr_field(read_bytes_at(buf, offset, 8)?);
        let byte_start = read_u64_at(buf, offset + 8)?;
        let byte_end = read_u64_at(buf, offset + 16)?;
        let num_columns = read_u16_at(buf, offset + 24)?;
        let num_rows = read_u16_at(buf, offset + 26)?;
        let column_name = trim_cstr_field(read_bytes_at(buf, offset + 28, 8)?);
        let row_name = trim_cstr_field(read_bytes_at(buf, offset + 36, 8)?);
        let size = read_u64_at(buf, offset + 44)?;
        // bytes at offset+52..offset+64 are reserved

        if size == 0 {
            return Err(Error::CatalogCorrupt(format!(
                "table {tag} has zero-length cell vector"
            )));
        }

        Ok(Self {
            tag,
            byte_start,
            byte_end,
            num_columns,
            num_rows,
            column_name,
            row_name,
            size,
        })
    }
}
