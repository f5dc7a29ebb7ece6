use crate::error::{Error, Result};
use crate::format::CardHeader;
use crate::model::Table;
use std::collections::HashMap;

/// A data card: a header plus a set of named tables, keyed by a
/// coordinate vector at the `File` level (spec.md §3).
#[derive(Debug, Clone)]
pub struct Card {
    header: CardHeader,
    tables: HashMap<String, Table>,
}

impl Card {
    pub fn new(header: CardHeader, tables: HashMap<String, Table>) -> Self {
        Self { header, tables }
    }

    pub fn header(&self) -> &CardHeader {
        &self.header
    }

    /// Looks up a table by its case-sensitive tag.
    pub fn get(&self, tag: &str) -> Result<&Table> {
        self.tables
            .get(tag)
            .ok_or_else(|| Error::NotFound(format!("no table tagged {tag:?} in card")))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
