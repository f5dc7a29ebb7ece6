use crate::error::{Error, Result};
use crate::format::{CardCatalogEntry, FileHeader};
use crate::key::CoordinateKey;
use crate::model::Card;
use crate::source::RandomAccessSource;
use std::collections::HashMap;
use std::sync::Arc;

/// The fully-loaded OPAT file: header, card catalog, and card contents
/// (spec.md §3). Immutable after construction, aside from the reader
/// attaching its byte source once at load time so `reader::verify` can
/// re-check checksums later without reopening anything.
pub struct File {
    header: FileHeader,
    catalog: HashMap<CoordinateKey, CardCatalogEntry>,
    cards: HashMap<CoordinateKey, Card>,
    source: Option<Arc<dyn RandomAccessSource>>,
}

// `RandomAccessSource` carries no `Debug` bound (its only implementors,
// `Vec<u8>` and `memmap2::Mmap`, are large byte buffers not worth
// printing), so `source` is rendered as present/absent rather than
// deriving `Debug` across a trait object that doesn't support it.
impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("header", &self.header)
            .field("catalog_len", &self.catalog.len())
            .field("cards_len", &self.cards.len())
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

impl File {
    pub fn new(
        header: FileHeader,
        catalog: HashMap<CoordinateKey, CardCatalogEntry>,
        cards: HashMap<CoordinateKey, Card>,
    ) -> Self {
        Self {
            header,
            catalog,
            cards,
            source: None,
        }
    }

    /// Retains the byte source this file was parsed from, so it can be
    /// re-verified later. Builder-constructed files never call this and
    /// so never retain a source.
    pub fn attach_source(&mut self, source: Arc<dyn RandomAccessSource>) {
        self.source = Some(source);
    }

    pub fn source(&self) -> Option<&Arc<dyn RandomAccessSource>> {
        self.source.as_ref()
    }

    /// Re-verifies every card's SHA-256 against its retained byte source
    /// (spec.md §4.C's first-class "verify file" operation). A file built
    /// via [`crate::model::FileBuilder`] has no byte source and no
    /// stored digests, so it always yields an empty report.
    pub fn verify(&self) -> Result<Vec<crate::reader::ChecksumReport>> {
        crate::reader::verify(self)
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn catalog(&self) -> &HashMap<CoordinateKey, CardCatalogEntry> {
        &self.catalog
    }

    pub fn get(&self, key: &CoordinateKey) -> Result<&Card> {
        self.cards
            .get(key)
            .ok_or_else(|| Error::NotFound(format!("no card for key {:?}", key.values())))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CoordinateKey> {
        self.cards.keys()
    }

    /// Ordered list of the unique coordinate vectors backing every card,
    /// the input the geometric core (spec.md §4.E) triangulates over.
    pub fn coordinate_vectors(&self) -> Vec<(CoordinateKey, Vec<f64>)> {
        self.cards
            .keys()
            .map(|k| (k.clone(), k.values().to_vec()))
            .collect()
    }

    /// Per-dimension `(min, max)` over every catalog entry's coordinate,
    /// used by the interpolator for bounds checks (spec.md §4.D).
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        let dims = self.header.num_index as usize;
        let mut bounds = vec![(f64::INFINITY, f64::NEG_INFINITY); dims];
        for key in self.cards.keys() {
            for (d, bound) in bounds.iter_mut().enumerate() {
                if let Some(v) = key.get(d) {
                    bound.0 = bound.0.min(v);
                    bound.1 = bound.1.max(v);
                }
            }
        }
        bounds
    }
}
