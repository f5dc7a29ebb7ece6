//! OPAT: a self-describing binary container for sets of tabular numeric
//! data indexed by a fixed-length vector of floating-point coordinates,
//! plus an N-dimensional Delaunay-triangulation-based linear
//! interpolator over the set of loaded cards.
//!
//! The two core subsystems are [`reader`] (the codec: header, card
//! catalog, per-card table index, table payloads) and [`interpolator`]
//! (triangulation + barycentric solve + walk-locate, composed into
//! [`interpolator::TableLattice`]). [`model`] holds the in-memory
//! `File`/`Card`/`Table` objects both subsystems operate on.

#[macro_use]
extern crate log;

pub mod endian;
pub mod error;
pub mod format;
pub mod geometry;
pub mod interpolator;
pub mod key;
pub mod model;
pub mod reader;
pub mod source;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
pub use interpolator::{InterpolationType, TableLattice};
pub use key::CoordinateKey;
pub use model::{Card, File, Table};
pub use reader::{from_bytes, open, verify, verify_file, ReaderOptions};
