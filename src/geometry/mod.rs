//! The geometric core of the interpolator: Delaunay triangulation with
//! adjacency (§4.E), the barycentric solver (§4.F), and the walk-locate
//! search (§4.G).

pub mod barycentric;
pub mod triangulation;
pub mod walk;

pub use triangulation::{Triangulation, NO_NEIGHBOR};
pub use walk::{locate, Located};

/// Containment tolerance for barycentric weights (spec.md §4.G): a weight
/// in `[-WALK_TOLERANCE, 1+WALK_TOLERANCE]` is considered "inside".
pub const WALK_TOLERANCE: f64 = 1e-8;
