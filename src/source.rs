//! The byte-range abstraction the reader and, later, checksum
//! verification address directly (spec.md §4.C: "a random-access byte
//! source (file path or in-memory buffer)").

use memmap2::Mmap;

pub trait RandomAccessSource: Send + Sync {
    fn as_slice(&self) -> &[u8];
}

impl RandomAccessSource for Vec<u8> {
    fn as_slice(&self) -> &[u8] {
        self
    }
}

impl RandomAccessSource for Mmap {
    fn as_slice(&self) -> &[u8] {
        &self[..]
    }
}
