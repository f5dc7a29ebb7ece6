//! Coordinate keys: hashable, quantized identity for a coordinate vector.
//!
//! Mirrors the role `FileReference`/file-reference equality plays in
//! `mft::raw` (identity derived from a transform of the raw bytes, not the
//! raw bytes themselves) but for floating-point vectors instead of NTFS
//! entry references.

use crate::error::{Error, Result};
use std::hash::{Hash, Hasher};

pub const MIN_HASH_PRECISION: u8 = 1;
pub const MAX_HASH_PRECISION: u8 = 13;
const DEFAULT_HASH_PRECISION: u8 = 8;

/// A fixed-length `f64` vector identified, for hashing and equality
/// purposes, by a quantized integer projection rather than its raw bits.
///
/// The raw values are retained (`raw`) for geometric work; only the
/// quantized values (`quantized`) and `precision` participate in
/// `Hash`/`Eq`, so two keys built from slightly different raw floats that
/// quantize identically compare equal, as spec.md §3/§4.A requires.
#[derive(Debug, Clone)]
pub struct CoordinateKey {
    raw: Vec<f64>,
    quantized: Vec<i64>,
    precision: u8,
}

impl CoordinateKey {
    /// Builds a key with the default hash precision (8 decimal digits).
    pub fn new(values: Vec<f64>) -> Result<Self> {
        Self::with_precision(values, DEFAULT_HASH_PRECISION)
    }

    pub fn with_precision(values: Vec<f64>, precision: u8) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidArgument(
                "coordinate key vector must not be empty".into(),
            ));
        }
        if !(MIN_HASH_PRECISION..=MAX_HASH_PRECISION).contains(&precision) {
            return Err(Error::InvalidArgument(format!(
                "hash precision {precision} outside [{MIN_HASH_PRECISION},{MAX_HASH_PRECISION}]"
            )));
        }
        let scale = 10f64.powi(precision as i32);
        let quantized = values
            .iter()
            .map(|v| quantize_component(*v, scale))
            .collect();
        Ok(Self {
            raw: values,
            quantized,
            precision,
        })
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Raw (unquantized) component values, for geometric use.
    pub fn values(&self) -> &[f64] {
        &self.raw
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.raw.get(index).copied()
    }
}

/// Multiply by `10^p`, truncate toward zero, round to nearest multiple of
/// ten — spec.md §3's quantization rule, stated precisely so two
/// producers agreeing on `p` always agree on identity.
fn quantize_component(value: f64, scale: f64) -> i64 {
    let scaled = (value * scale).trunc() as i64;
    let remainder = scaled % 10;
    let rounded = if remainder.abs() >= 5 {
        scaled + (10 - remainder.abs()) * remainder.signum()
    } else {
        scaled - remainder
    };
    rounded
}

impl PartialEq for CoordinateKey {
    fn eq(&self, other: &Self) -> bool {
        self.precision == other.precision && self.quantized == other.quantized
    }
}

impl Eq for CoordinateKey {}

impl Hash for CoordinateKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.precision.hash(state);
        self.quantized.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_keys_under_quantization() {
        let a = CoordinateKey::with_precision(vec![0.2, 0.06], 8).unwrap();
        let b = CoordinateKey::with_precision(vec![0.2000000001, 0.06], 8).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_precision_not_equal() {
        let a = CoordinateKey::with_precision(vec![0.2], 8).unwrap();
        let b = CoordinateKey::with_precision(vec![0.2], 6).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_vector_rejected() {
        assert!(matches!(
            CoordinateKey::new(vec![]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn precision_out_of_range_rejected() {
        assert!(CoordinateKey::with_precision(vec![1.0], 0).is_err());
        assert!(CoordinateKey::with_precision(vec![1.0], 14).is_err());
    }

    #[test]
    fn raw_values_preserved_for_geometry() {
        let k = CoordinateKey::with_precision(vec![0.123_456_789, 1.0], 8).unwrap();
        assert_eq!(k.values(), &[0.123_456_789, 1.0]);
    }
}
