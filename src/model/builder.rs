//! In-memory construction of a `File` without going through the byte
//! codec (spec.md §4.D supplement; spec.md §1's "optional writer ...
//! in-memory construction only", and the invariants spec.md §6 assigns to
//! the out-of-scope format converter's builder).

use crate::error::{Error, Result};
use crate::format::{CardHeader, FileHeader, CARD_HEADER_SIZE, CURRENT_VERSION, FILE_HEADER_SIZE};
use crate::key::CoordinateKey;
use crate::model::{Card, File, Table};
use std::collections::HashMap;

pub struct CardBuilder {
    tables: HashMap<String, Table>,
}

impl CardBuilder {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Adds a table, failing `InvalidArgument` if `tag` is already present
    /// in this card (spec.md §6: "unique tags per card").
    pub fn add_table(mut self, tag: &str, table: Table) -> Result<Self> {
        if self.tables.contains_key(tag) {
            return Err(Error::InvalidArgument(format!(
                "duplicate table tag {tag:?} in card"
            )));
        }
        self.tables.insert(tag.to_string(), table);
        Ok(self)
    }

    pub fn build(self) -> Card {
        let header = CardHeader {
            num_tables: self.tables.len() as u32,
            header_size: CARD_HEADER_SIZE as u32,
            index_offset: CARD_HEADER_SIZE as u64,
            card_size: 0,
            comment: String::new(),
        };
        Card::new(header, self.tables)
    }
}

impl Default for CardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct FileBuilder {
    num_index: u16,
    hash_precision: u8,
    comment: String,
    cards: HashMap<CoordinateKey, Card>,
}

impl FileBuilder {
    pub fn new(num_index: u16, hash_precision: u8) -> Self {
        Self {
            num_index,
            hash_precision,
            comment: String::new(),
            cards: HashMap::new(),
        }
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }

    /// Adds a card addressed by `key`, enforcing that every key shares
    /// this builder's `numIndex` (spec.md §6) and that no key is added
    /// twice (the writer side's "no duplicate key" invariant — stricter
    /// than the reader, which tolerates duplicates by keeping the last
    /// write per spec.md §4.C/§9).
    pub fn add_card(mut self, key: Vec<f64>, card: CardBuilder) -> Result<Self> {
        if key.len() != self.num_index as usize {
            return Err(Error::InvalidArgument(format!(
                "card key has {} components, builder expects {}",
                key.len(),
                self.num_index
            )));
        }
        let key = CoordinateKey::with_precision(key, self.hash_precision)?;
        if self.cards.contains_key(&key) {
            return Err(Error::InvalidArgument(
                "duplicate coordinate key in file builder".into(),
            ));
        }
        self.cards.insert(key, card.build());
        Ok(self)
    }

    pub fn build(self) -> Result<File> {
        if self.cards.is_empty() {
            return Err(Error::InvalidArgument(
                "file builder requires at least one card".into(),
            ));
        }
        let header = FileHeader {
            version: CURRENT_VERSION,
            num_cards: self.cards.len() as u32,
            header_size: FILE_HEADER_SIZE as u32,
            index_offset: 0,
            creation_date: String::new(),
            source_info: String::new(),
            comment: self.comment,
            num_index: self.num_index,
            hash_precision: self.hash_precision,
        };
        let catalog = HashMap::new();
        Ok(File::new(header, catalog, self.cards))
    }
}
