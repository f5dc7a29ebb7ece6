//! The Codec/Reader (spec.md §4.C): parses a byte source into a fully
//! constructed `model::File`.
//!
//! Random access is abstracted behind `RandomAccessSource` so the same
//! parsing code runs whether the bytes come from a memory-mapped file
//! (`memmap2`, grounded on `moc-set`'s use of the same crate for its
//! persistent MOC cache) or an already-in-memory buffer. Both give
//! zero-copy slice access, satisfying spec.md §1's "zero-copy,
//! random-access retrieval" requirement; neither needs the classic
//! `BufReader` + repeated seeks `mft::Parser` uses, because every offset
//! in an OPAT file is reachable directly once the whole byte range is
//! addressable as a slice.

use crate::endian::{read_bytes_at, read_f64_array_at};
use crate::error::{Error, Result};
use crate::format::{
    CardCatalogEntry, CardHeader, FileHeader, TableIndexEntry, CURRENT_VERSION,
    TABLE_INDEX_ENTRY_SIZE,
};
use crate::key::CoordinateKey;
use crate::model::{Card, File, Table};
use crate::source::RandomAccessSource;
use memmap2::Mmap;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Reader-side configuration, the OPAT analogue of `mft::ParserSettings`.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Recompute and check every card's SHA-256 while loading. Off by
    /// default since it requires hashing the whole file; `File::verify`
    /// (or the standalone `verify_file`) can be called separately when
    /// wanted.
    pub verify_checksums: bool,
    /// Memory-map the source file rather than reading it fully into
    /// memory. Has no effect on `from_bytes`, which is already
    /// in-memory.
    pub use_mmap: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            verify_checksums: false,
            use_mmap: true,
        }
    }
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    pub fn use_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }
}

/// Opens and parses the OPAT file at `path` with default options.
pub fn open<P: AsRef<Path>>(path: P) -> Result<File> {
    open_with_options(path, &ReaderOptions::default())
}

pub fn open_with_options<P: AsRef<Path>>(path: P, options: &ReaderOptions) -> Result<File> {
    trace!(
        "opening OPAT file {} (mmap={}, verify_checksums={})",
        path.as_ref().display(),
        options.use_mmap,
        options.verify_checksums
    );
    let source: Arc<dyn RandomAccessSource> = if options.use_mmap {
        let file = std::fs::File::open(&path)?;
        // Safety: the file is treated as read-only for the mapping's
        // lifetime; concurrent external modification is the caller's
        // responsibility, as with any `memmap2::Mmap`.
        let mmap = unsafe { Mmap::map(&file)? };
        Arc::new(mmap)
    } else {
        Arc::new(std::fs::read(&path)?)
    };
    parse(source, options)
}

/// Parses an already-in-memory OPAT byte buffer.
pub fn from_bytes(bytes: Vec<u8>) -> Result<File> {
    from_bytes_with_options(bytes, &ReaderOptions::default())
}

pub fn from_bytes_with_options(bytes: Vec<u8>, options: &ReaderOptions) -> Result<File> {
    trace!("parsing OPAT file from an in-memory buffer of {} bytes", bytes.len());
    parse(Arc::new(bytes), options)
}

/// A per-card checksum verification result, for the first-class "verify
/// file" operation spec.md §4.C requires.
#[derive(Debug, Clone)]
pub struct ChecksumReport {
    pub byte_range: (u64, u64),
    pub matches: bool,
}

fn parse(source: Arc<dyn RandomAccessSource>, options: &ReaderOptions) -> Result<File> {
    let slice = source.as_slice();

    let header = FileHeader::from_buffer(slice)?;
    debug!(
        "parsed file header: numCards={} numIndex={} hashPrecision={} indexOffset={}",
        header.num_cards, header.num_index, header.hash_precision, header.index_offset
    );
    if header.version > CURRENT_VERSION {
        return Err(Error::UnsupportedVersion {
            found: header.version,
            supported: CURRENT_VERSION,
        });
    }

    let entry_size = CardCatalogEntry::encoded_size(header.num_index);
    trace!(
        "reading card catalog at offset {} ({} entries of {} bytes each)",
        header.index_offset, header.num_cards, entry_size
    );
    let mut catalog = HashMap::new();
    for i in 0..header.num_cards as usize {
        let offset = header.index_offset as usize + i * entry_size;
        let entry = CardCatalogEntry::from_buffer(slice, offset, header.num_index)?;
        // Reader tolerates duplicate coordinate keys by keeping the last
        // write (spec.md §4.C, §9's first Open Question); the writer
        // side (model::builder::FileBuilder) forbids duplicates outright.
        let key = CoordinateKey::with_precision(entry.index.clone(), header.hash_precision)?;
        if catalog.contains_key(&key) {
            warn!(
                "duplicate coordinate key {:?} in card catalog at entry {}; keeping last write",
                key.values(), i
            );
        }
        catalog.insert(key, entry);
    }
    debug!("loaded card catalog with {} entries", catalog.len());

    let mut cards = HashMap::with_capacity(catalog.len());
    for (key, entry) in &catalog {
        trace!(
            "loading card for key {:?} (byte range {}..{})",
            key.values(), entry.byte_start, entry.byte_end
        );
        let card = parse_card(slice, entry, options)?;
        cards.insert(key.clone(), card);
    }
    debug!("loaded {} cards", cards.len());

    let mut file = File::new(header, catalog, cards);
    file.attach_source(source);
    Ok(file)
}

fn parse_card(
    slice: &[u8],
    entry: &CardCatalogEntry,
    options: &ReaderOptions,
) -> Result<Card> {
    let start = entry.byte_start as usize;
    let end = entry.byte_end as usize;
    if end > slice.len() || start >= end {
        return Err(Error::CatalogCorrupt(format!(
            "card byte range {start}..{end} invalid for file of length {}",
            slice.len()
        )));
    }
    let card_bytes = &slice[start..end];

    if options.verify_checksums {
        trace!("verifying checksum for card byte range {start}..{end}");
        let digest = Sha256::digest(card_bytes);
        if digest.as_slice() != entry.sha256 {
            warn!("checksum mismatch for card byte range {start}..{end}");
            return Err(Error::ChecksumMismatch {
                start: entry.byte_start,
                end: entry.byte_end,
            });
        }
    }

    let card_header = CardHeader::from_buffer(card_bytes)?;
    trace!(
        "parsed card header: numTables={} indexOffset={}",
        card_header.num_tables, card_header.index_offset
    );
    let mut tables = HashMap::with_capacity(card_header.num_tables as usize);
    for i in 0..card_header.num_tables as usize {
        let entry_offset = card_header.index_offset as usize + i * TABLE_INDEX_ENTRY_SIZE;
        let table_entry = TableIndexEntry::from_buffer(card_bytes, entry_offset)?;
        if tables.contains_key(&table_entry.tag) {
            return Err(Error::CatalogCorrupt(format!(
                "duplicate table tag {:?} within one card",
                table_entry.tag
            )));
        }
        trace!(
            "loading table {:?} ({}x{}, v={}) at offset {}",
            table_entry.tag, table_entry.num_rows, table_entry.num_columns, table_entry.size, entry_offset
        );
        let table = parse_table(card_bytes, &table_entry)?;
        tables.insert(table_entry.tag.clone(), table);
    }
    Ok(Card::new(card_header, tables))
}

fn parse_table(card_bytes: &[u8], entry: &TableIndexEntry) -> Result<Table> {
    let start = entry.byte_start as usize;
    let end = entry.byte_end as usize;
    if end > card_bytes.len() || start >= end {
        return Err(Error::CatalogCorrupt(format!(
            "table {:?} byte range {start}..{end} invalid for card of length {}",
            entry.tag,
            card_bytes.len()
        )));
    }
    let payload = read_bytes_at(card_bytes, start, end - start)?;

    let rows = entry.num_rows as usize;
    let cols = entry.num_columns as usize;
    let v = entry.size as usize;
    trace!("parsing table payload: {rows} rows x {cols} columns, cell length {v}");

    let row_values = read_f64_array_at(payload, 0, rows)?;
    let column_values = read_f64_array_at(payload, rows * 8, cols)?;
    let data = read_f64_array_at(payload, (rows + cols) * 8, rows * cols * v)?;

    Table::new(rows, cols, v, row_values, column_values, data)
}

/// Re-verifies every card's checksum in `file` against its retained byte
/// source, without needing to reopen or reparse anything.
pub fn verify(file: &File) -> Result<Vec<ChecksumReport>> {
    let Some(source) = file.source() else {
        // A file built in-memory via `model::builder::FileBuilder` has no
        // byte source and no stored digests to check against.
        debug!("file has no retained byte source; verify is a no-op");
        return Ok(Vec::new());
    };
    debug!("verifying checksums for {} cards", file.catalog().len());
    let slice = source.as_slice();
    let mut reports = Vec::with_capacity(file.catalog().len());
    for entry in file.catalog().values() {
        let start = entry.byte_start as usize;
        let end = entry.byte_end as usize;
        let matches = end <= slice.len()
            && start < end
            && Sha256::digest(&slice[start..end]).as_slice() == entry.sha256;
        if !matches {
            warn!("checksum mismatch for card byte range {start}..{end}");
        }
        reports.push(ChecksumReport {
            byte_range: (entry.byte_start, entry.byte_end),
            matches,
        });
    }
    Ok(reports)
}

/// Lightweight verification entry point: parses only the header and
/// catalog (not card/table bodies) before recomputing checksums. This is
/// the primitive an external `opatVerify`-style tool would call; it does
/// not require constructing a full `File`.
pub fn verify_file<P: AsRef<Path>>(path: P) -> Result<Vec<ChecksumReport>> {
    debug!("verifying OPAT file {} without a full parse", path.as_ref().display());
    let file = std::fs::File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    let slice = &mmap[..];

    let header = FileHeader::from_buffer(slice)?;
    let entry_size = CardCatalogEntry::encoded_size(header.num_index);
    trace!(
        "catalog at offset {} ({} entries)",
        header.index_offset, header.num_cards
    );
    let mut reports = Vec::with_capacity(header.num_cards as usize);
    for i in 0..header.num_cards as usize {
        let offset = header.index_offset as usize + i * entry_size;
        let entry = CardCatalogEntry::from_buffer(slice, offset, header.num_index)?;
        let start = entry.byte_start as usize;
        let end = entry.byte_end as usize;
        let matches = end <= slice.len()
            && start < end
            && Sha256::digest(&slice[start..end]).as_slice() == entry.sha256;
        if !matches {
            warn!("checksum mismatch for card byte range {start}..{end}");
        }
        reports.push(ChecksumReport {
            byte_range: (entry.byte_start, entry.byte_end),
            matches,
        });
    }
    debug!(
        "verified {} cards ({} mismatches)",
        reports.len(),
        reports.iter().filter(|r| !r.matches).count()
    );
    Ok(reports)
}
