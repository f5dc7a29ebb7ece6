//! Byte-level OPAT fixture construction, for unit tests only.
//!
//! This is deliberately not part of the public API: the crate's in-memory
//! model builder (`model::builder::FileBuilder`) is the supported way to
//! construct a `File` value programmatically (spec.md §1's "optional
//! writer ... in-memory construction only"). This module instead encodes
//! an actual byte-exact OPAT stream, so the *codec* itself (header
//! parsing, catalog walk, checksum verification) has something real to
//! decode in tests, the way `mft`'s own tests embed literal NTFS record
//! bytes (`raw.rs::tests::test_entry_parse`) rather than exercising the
//! parser only through round-tripped in-memory structures.

use crate::format::{CARD_HEADER_SIZE, FILE_HEADER_SIZE, TABLE_INDEX_ENTRY_SIZE};
use sha2::{Digest, Sha256};

pub struct TableFixture {
    pub tag: String,
    pub row_values: Vec<f64>,
    pub column_values: Vec<f64>,
    pub v: u64,
    /// Row-major, innermost axis is the per-cell vector of length `v`.
    pub data: Vec<f64>,
}

impl TableFixture {
    pub fn new(tag: &str, row_values: Vec<f64>, column_values: Vec<f64>, data: Vec<f64>) -> Self {
        Self {
            tag: tag.to_string(),
            row_values,
            column_values,
            v: 1,
            data,
        }
    }

    fn num_rows(&self) -> u16 {
        self.row_values.len() as u16
    }

    fn num_columns(&self) -> u16 {
        self.column_values.len() as u16
    }

    fn encoded_len(&self) -> u64 {
        ((self.row_values.len() + self.column_values.len() + self.data.len()) * 8) as u64
    }
}

pub struct CardFixture {
    pub key: Vec<f64>,
    pub tables: Vec<TableFixture>,
}

impl CardFixture {
    pub fn new(key: Vec<f64>, tables: Vec<TableFixture>) -> Self {
        Self { key, tables }
    }

    /// Encodes this card's payload (CardHeader + table index + table
    /// bodies) as a standalone byte buffer.
    fn encode(&self) -> Vec<u8> {
        let index_offset = CARD_HEADER_SIZE as u64;
        let index_size = self.tables.len() * TABLE_INDEX_ENTRY_SIZE;
        let mut payload_offset = index_offset + index_size as u64;

        let mut table_ranges = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            let start = payload_offset;
            let end = start + table.encoded_len();
            table_ranges.push((start, end));
            payload_offset = end;
        }
        let card_size = payload_offset;

        let mut buf = vec![0u8; card_size as usize];
        buf[0..4].copy_from_slice(b"CARD");
        buf[4..8].copy_from_slice(&(self.tables.len() as u32).to_le_bytes());
        buf[8..12].copy_from_slice(&(CARD_HEADER_SIZE as u32).to_le_bytes());
        buf[12..20].copy_from_slice(&index_offset.to_le_bytes());
        buf[20..28].copy_from_slice(&card_size.to_le_bytes());
        // comment[128] and reserved[100] left zeroed.

        for (i, (table, (start, end))) in self.tables.iter().zip(&table_ranges).enumerate() {
            let entry_offset = index_offset as usize + i * TABLE_INDEX_ENTRY_SIZE;
            let mut tag_bytes = [0u8; 8];
            let tag_src = table.tag.as_bytes();
            let n = tag_src.len().min(8);
            tag_bytes[..n].copy_from_slice(&tag_src[..n]);
            buf[entry_offset..entry_offset + 8].copy_from_slice(&tag_bytes);
            buf[entry_offset + 8..entry_offset + 16].copy_from_slice(&start.to_le_bytes());
            buf[entry_offset + 16..entry_offset + 24].copy_from_slice(&end.to_le_bytes());
            buf[entry_offset + 24..entry_offset + 26]
                .copy_from_slice(&table.num_columns().to_le_bytes());
            buf[entry_offset + 26..entry_offset + 28]
                .copy_from_slice(&table.num_rows().to_le_bytes());
            // columnName[8] / rowName[8] left zeroed (bytes 28..44).
            buf[entry_offset + 44..entry_offset + 52].copy_from_slice(&table.v.to_le_bytes());
            // reserved[12] left zeroed.

            let mut cursor = *start as usize;
            for v in &table.row_values {
                buf[cursor..cursor + 8].copy_from_slice(&v.to_le_bytes());
                cursor += 8;
            }
            for v in &table.column_values {
                buf[cursor..cursor + 8].copy_from_slice(&v.to_le_bytes());
                cursor += 8;
            }
            for v in &table.data {
                buf[cursor..cursor + 8].copy_from_slice(&v.to_le_bytes());
                cursor += 8;
            }
        }
        buf
    }
}

pub struct FileBuilder {
    num_index: u16,
    hash_precision: u8,
    comment: String,
    source_info: String,
    creation_date: String,
    cards: Vec<CardFixture>,
}

impl FileBuilder {
    pub fn new(num_index: u16, hash_precision: u8) -> Self {
        Self {
            num_index,
            hash_precision,
            comment: String::new(),
            source_info: String::new(),
            creation_date: String::new(),
            cards: Vec::new(),
        }
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }

    pub fn source_info(mut self, source_info: &str) -> Self {
        self.source_info = source_info.to_string();
        self
    }

    pub fn with_card(mut self, card: CardFixture) -> Self {
        self.cards.push(card);
        self
    }

    fn write_fixed(buf: &mut [u8], s: &str) {
        let bytes = s.as_bytes();
        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
    }

    pub fn build_bytes(&self) -> Vec<u8> {
        let mut card_payloads: Vec<Vec<u8>> = Vec::with_capacity(self.cards.len());
        let mut ranges: Vec<(u64, u64)> = Vec::with_capacity(self.cards.len());
        let mut cursor = FILE_HEADER_SIZE as u64;
        for card in &self.cards {
            let encoded = card.encode();
            let start = cursor;
            let end = start + encoded.len() as u64;
            ranges.push((start, end));
            cursor = end;
            card_payloads.push(encoded);
        }
        let index_offset = cursor;

        let entry_size = 48 + 8 * self.num_index as usize;
        let catalog_size = entry_size * self.cards.len();
        let total_len = index_offset as usize + catalog_size;
        let mut out = vec![0u8; total_len];

        out[0..4].copy_from_slice(b"OPAT");
        out[4..6].copy_from_slice(&crate::format::CURRENT_VERSION.to_le_bytes());
        out[6..10].copy_from_slice(&(self.cards.len() as u32).to_le_bytes());
        out[10..14].copy_from_slice(&(FILE_HEADER_SIZE as u32).to_le_bytes());
        out[14..22].copy_from_slice(&index_offset.to_le_bytes());
        Self::write_fixed(&mut out[22..38], &self.creation_date);
        Self::write_fixed(&mut out[38..102], &self.source_info);
        Self::write_fixed(&mut out[102..230], &self.comment);
        out[230..232].copy_from_slice(&self.num_index.to_le_bytes());
        out[232] = self.hash_precision;

        for (payload, (start, _end)) in card_payloads.iter().zip(&ranges) {
            let s = *start as usize;
            out[s..s + payload.len()].copy_from_slice(payload);
        }

        for (i, (card, (start, end))) in self.cards.iter().zip(&ranges).enumerate() {
            let entry_offset = index_offset as usize + i * entry_size;
            for (j, v) in card.key.iter().enumerate() {
                let off = entry_offset + j * 8;
                out[off..off + 8].copy_from_slice(&v.to_le_bytes());
            }
            let tail = entry_offset + self.num_index as usize * 8;
            out[tail..tail + 8].copy_from_slice(&start.to_le_bytes());
            out[tail + 8..tail + 16].copy_from_slice(&end.to_le_bytes());
            let digest = Sha256::digest(&card_payloads[i]);
            out[tail + 16..tail + 48].copy_from_slice(&digest);
        }

        out
    }
}
