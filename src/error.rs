use thiserror::Error;

/// Every failure mode the codec, in-memory model, and interpolator can produce.
///
/// Variant names follow spec.md §7 ("error kinds") rather than a generic
/// exception taxonomy, so a caller can match on exactly the condition the
/// format/interpolator specification names.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad magic at offset {offset}: expected {expected:?}, found {found:?}")]
    BadMagic {
        offset: u64,
        expected: [u8; 4],
        found: [u8; 4],
    },

    #[error("short read: needed {needed} bytes at offset {offset}, got {got}")]
    ShortRead { offset: u64, needed: u64, got: u64 },

    #[error("card catalog corrupt: {0}")]
    CatalogCorrupt(String),

    #[error("unsupported file version {found} (reader supports up to {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid query dimension: expected {expected}, got {got}")]
    InvalidDimension { expected: usize, got: usize },

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unsupported interpolation type: {0}")]
    Unsupported(String),

    #[error("cannot construct triangulation: {0}")]
    DegenerateGeometry(String),

    #[error("singular simplex encountered during barycentric solve (simplex {simplex})")]
    SingularSimplex { simplex: u32 },

    #[error("query point lies outside the convex hull of the card catalog")]
    OutsideHull,

    #[error("walk-locate revisited simplex {simplex}")]
    WalkCycle { simplex: u32 },

    #[error("walk-locate exceeded {limit} steps without converging")]
    WalkExceeded { limit: usize },

    #[error("card payload checksum mismatch for card at byte range {start}..{end}")]
    ChecksumMismatch { start: u64, end: u64 },

    #[error("triangulation is empty")]
    Empty,
}

impl Error {
    pub(crate) fn short_read(offset: u64, needed: u64, got: u64) -> Self {
        Error::ShortRead { offset, needed, got }
    }

    pub(crate) fn bad_magic(offset: u64, expected: [u8; 4], found: [u8; 4]) -> Self {
        Error::BadMagic {
            offset,
            expected,
            found,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
