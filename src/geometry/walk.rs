//! Walk-locate (spec.md §4.G): finds the simplex containing a query point
//! by following face adjacency from a starting guess, stepping toward
//! whichever face the current barycentric weights say the point is on
//! the wrong side of.

use crate::error::{Error, Result};
use crate::geometry::triangulation::{Triangulation, NO_NEIGHBOR};
use crate::geometry::{barycentric, WALK_TOLERANCE};
use std::cell::Cell;
use std::collections::HashSet;

/// Result of a successful locate: the simplex id and its barycentric
/// weights for the query point, in the same vertex order as
/// `Triangulation::simplices()[id]`.
pub struct Located {
    pub simplex: u32,
    pub weights: Vec<f64>,
}

/// Locates the simplex in `triangulation` containing `q`, starting from
/// `cache`'s last-found simplex if it still names a valid simplex (the
/// fast path for repeated nearby queries), otherwise from simplex 0.
/// Updates `cache` with the result on success.
pub fn locate(
    triangulation: &Triangulation,
    vertices: &[Vec<f64>],
    bounds: &[(f64, f64)],
    q: &[f64],
    cache: &Cell<Option<u32>>,
) -> Result<Located> {
    if q.len() != triangulation.dim() {
        return Err(Error::InvalidDimension {
            expected: triangulation.dim(),
            got: q.len(),
        });
    }
    for (d, &(lo, hi)) in bounds.iter().enumerate() {
        if q[d] < lo || q[d] > hi {
            return Err(Error::OutOfRange(format!(
                "query coordinate {d} = {} is outside catalog bounds [{lo}, {hi}]",
                q[d]
            )));
        }
    }
    if triangulation.is_empty() {
        return Err(Error::Empty);
    }

    let mut current = cache
        .get()
        .filter(|&id| (id as usize) < triangulation.len())
        .unwrap_or(0);

    let cap = 2 * triangulation.len() + 10;
    let mut visited: HashSet<u32> = HashSet::new();
    let mut steps = 0usize;

    loop {
        if !visited.insert(current) {
            return Err(Error::WalkCycle { simplex: current });
        }
        steps += 1;
        if steps > cap {
            return Err(Error::WalkExceeded { limit: cap });
        }

        let simplex = &triangulation.simplices()[current as usize];
        let verts: Vec<&[f64]> = simplex
            .iter()
            .map(|&vi| vertices[vi as usize].as_slice())
            .collect();
        let weights = barycentric::solve(&verts, q, current)?;

        if weights
            .iter()
            .all(|&w| w >= -WALK_TOLERANCE && w <= 1.0 + WALK_TOLERANCE)
        {
            cache.set(Some(current));
            return Ok(Located {
                simplex: current,
                weights,
            });
        }

        let mut j_star = 0;
        let mut min_weight = weights[0];
        for (j, &w) in weights.iter().enumerate().skip(1) {
            if w < min_weight {
                min_weight = w;
                j_star = j;
            }
        }

        let neighbor = triangulation.adjacency()[current as usize][j_star];
        if neighbor == NO_NEIGHBOR {
            return Err(Error::OutsideHull);
        }
        current = neighbor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> (Triangulation, Vec<Vec<f64>>, Vec<(f64, f64)>) {
        let vertices = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
        ];
        let tri = Triangulation::build(&vertices).unwrap();
        let bounds = vec![(0.0, 1.0), (0.0, 1.0)];
        (tri, vertices, bounds)
    }

    #[test]
    fn locates_interior_point() {
        let (tri, vertices, bounds) = unit_square();
        let cache = Cell::new(None);
        let located = locate(&tri, &vertices, &bounds, &[0.4, 0.4], &cache).unwrap();
        assert!(located.weights.iter().all(|&w| w >= -1e-8));
        assert_eq!(cache.get(), Some(located.simplex));
    }

    #[test]
    fn rejects_wrong_dimension() {
        let (tri, vertices, bounds) = unit_square();
        let cache = Cell::new(None);
        let err = locate(&tri, &vertices, &bounds, &[0.4, 0.4, 0.1], &cache).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { .. }));
    }

    #[test]
    fn rejects_out_of_bounds() {
        let (tri, vertices, bounds) = unit_square();
        let cache = Cell::new(None);
        let err = locate(&tri, &vertices, &bounds, &[2.0, 2.0], &cache).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
    }

    #[test]
    fn reuses_cached_simplex_for_nearby_query() {
        let (tri, vertices, bounds) = unit_square();
        let cache = Cell::new(None);
        let first = locate(&tri, &vertices, &bounds, &[0.1, 0.1], &cache).unwrap();
        cache.set(Some(first.simplex));
        let second = locate(&tri, &vertices, &bounds, &[0.15, 0.15], &cache).unwrap();
        assert_eq!(second.simplex, first.simplex);
    }
}
