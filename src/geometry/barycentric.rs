//! Barycentric weight solver (spec.md §4.F): given a simplex's `dim + 1`
//! vertices and a query point, solves the dense `dim x dim` linear system
//! relating the query to vertex 0 for weights `lambda_1..lambda_dim`, then
//! recovers `lambda_0 = 1 - sum(lambda_1..lambda_dim)`.

use crate::error::{Error, Result};
use nalgebra::{DMatrix, DVector};

/// Solves for the barycentric weights of `q` against the simplex whose
/// vertices are `verts` (length `dim + 1`, each of length `dim`). Weights
/// are returned in the same order as `verts`; they sum to 1 but are not
/// clamped to `[0, 1]` — the caller (the walk-locate step) uses
/// out-of-range weights to pick which face to cross next.
pub fn solve(verts: &[&[f64]], q: &[f64], simplex_id: u32) -> Result<Vec<f64>> {
    let dim = q.len();
    let v0 = verts[0];

    let mut m = DMatrix::<f64>::zeros(dim, dim);
    let mut b = DVector::<f64>::zeros(dim);
    for j in 1..=dim {
        let vj = verts[j];
        for d in 0..dim {
            m[(d, j - 1)] = vj[d] - v0[d];
        }
    }
    for d in 0..dim {
        b[d] = q[d] - v0[d];
    }

    let lambda = m
        .lu()
        .solve(&b)
        .ok_or(Error::SingularSimplex { simplex: simplex_id })?;

    let mut weights = vec![0.0; dim + 1];
    let sum: f64 = lambda.iter().sum();
    weights[0] = 1.0 - sum;
    for (j, w) in lambda.iter().enumerate() {
        weights[j + 1] = *w;
    }
    Ok(weights)
}
