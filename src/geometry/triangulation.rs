//! Delaunay triangulation with face adjacency (spec.md §4.E).
//!
//! Construction uses the incremental Bowyer-Watson algorithm over a
//! synthetic bounding super-simplex, which is discarded once every real
//! point has been inserted. Circumsphere membership is decided by solving
//! for the simplex's circumcenter with `nalgebra`'s dense LU factorization
//! rather than an explicit determinant lift — the same machinery the
//! barycentric solver (`geometry::barycentric`) uses for weights, so the
//! two share one numerical approach.

use crate::error::{Error, Result};
use nalgebra::{DMatrix, DVector};
use std::collections::{HashMap, HashSet};

/// Sentinel adjacency entry meaning "no neighbor across this face" (the
/// face lies on the convex hull boundary).
pub const NO_NEIGHBOR: u32 = u32::MAX;

/// Extra slack applied to a circumsphere's squared radius when testing
/// containment, to keep near-cospherical points from flip-flopping
/// between "inside" and "outside" under floating point error.
const CIRCUMSPHERE_TOLERANCE: f64 = 1e-9;

/// A Delaunay triangulation of a fixed set of points: a flat list of
/// simplices (each `dim + 1` global vertex indices into the point list
/// passed to `build`) and the adjacency across each simplex's faces.
#[derive(Debug, Clone)]
pub struct Triangulation {
    simplices: Vec<Vec<u32>>,
    adjacency: Vec<Vec<u32>>,
    dim: usize,
}

impl Triangulation {
    /// Builds the Delaunay triangulation of `points`. Every point must
    /// have the same dimension, and there must be at least `dim + 1` of
    /// them or no full-dimensional simplex can be formed.
    pub fn build(points: &[Vec<f64>]) -> Result<Self> {
        let n = points.len();
        if n == 0 {
            return Err(Error::DegenerateGeometry(
                "no points to triangulate".to_string(),
            ));
        }
        let dim = points[0].len();
        if dim == 0 {
            return Err(Error::InvalidArgument(
                "coordinate vectors must have at least one dimension".to_string(),
            ));
        }
        for p in points {
            if p.len() != dim {
                return Err(Error::InvalidArgument(format!(
                    "inconsistent coordinate dimension: expected {dim}, got {}",
                    p.len()
                )));
            }
        }
        if n < dim + 1 {
            return Err(Error::DegenerateGeometry(format!(
                "at least {} points are needed to triangulate {dim} dimensions, got {n}",
                dim + 1
            )));
        }

        let mut points: Vec<Vec<f64>> = points.to_vec();
        let super_vertices = append_super_simplex(&mut points, n, dim);

        let mut simplices: Vec<Vec<u32>> = vec![super_vertices];

        for i in 0..n {
            let p = &points[i];

            let mut bad_indices = Vec::new();
            for (si, simplex) in simplices.iter().enumerate() {
                if in_circumsphere(simplex, &points, p) {
                    bad_indices.push(si);
                }
            }
            if bad_indices.is_empty() {
                return Err(Error::DegenerateGeometry(format!(
                    "point {i} fell outside every candidate circumsphere during triangulation"
                )));
            }

            let mut face_count: HashMap<Vec<u32>, u32> = HashMap::new();
            for &si in &bad_indices {
                for face in faces_of(&simplices[si]) {
                    *face_count.entry(face).or_insert(0) += 1;
                }
            }
            let boundary: Vec<Vec<u32>> = face_count
                .into_iter()
                .filter(|(_, count)| *count == 1)
                .map(|(face, _)| face)
                .collect();

            let mut bad_sorted = bad_indices;
            bad_sorted.sort_unstable_by(|a, b| b.cmp(a));
            for si in bad_sorted {
                simplices.remove(si);
            }

            for face in boundary {
                let mut new_simplex = face;
                new_simplex.push(i as u32);
                simplices.push(new_simplex);
            }
        }

        let kept: Vec<Vec<u32>> = simplices
            .into_iter()
            .filter(|s| s.iter().all(|&v| (v as usize) < n))
            .collect();
        if kept.is_empty() {
            return Err(Error::DegenerateGeometry(
                "triangulation collapsed to nothing; points may be coplanar/collinear".to_string(),
            ));
        }

        let adjacency = build_adjacency(&kept, dim);

        Ok(Self {
            simplices: kept,
            adjacency,
            dim,
        })
    }

    pub fn simplices(&self) -> &[Vec<u32>] {
        &self.simplices
    }

    pub fn adjacency(&self) -> &[Vec<u32>] {
        &self.adjacency
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.simplices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simplices.is_empty()
    }
}

/// Appends `dim + 1` synthetic vertices, far enough outside the bounding
/// box of `points[..n]` to enclose every real point within their
/// circumsphere, and returns their global indices (`n..n+dim+1`).
fn append_super_simplex(points: &mut Vec<Vec<f64>>, n: usize, dim: usize) -> Vec<u32> {
    let mut min = points[0].clone();
    let mut max = points[0].clone();
    for p in points.iter() {
        for d in 0..dim {
            min[d] = min[d].min(p[d]);
            max[d] = max[d].max(p[d]);
        }
    }
    let center: Vec<f64> = (0..dim).map(|d| (min[d] + max[d]) / 2.0).collect();
    let extent = (0..dim)
        .map(|d| max[d] - min[d])
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let scale = extent * 1_000.0;

    let mut v0 = center.clone();
    for x in v0.iter_mut() {
        *x -= scale;
    }
    points.push(v0);

    for k in 0..dim {
        let mut vk = center.clone();
        for (d, x) in vk.iter_mut().enumerate() {
            *x += if d == k { dim as f64 * scale } else { 0.0 } - scale;
        }
        points.push(vk);
    }

    (n as u32..(n + dim + 1) as u32).collect()
}

fn faces_of(simplex: &[u32]) -> Vec<Vec<u32>> {
    (0..simplex.len())
        .map(|skip| {
            let mut face: Vec<u32> = simplex
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != skip)
                .map(|(_, &v)| v)
                .collect();
            face.sort_unstable();
            face
        })
        .collect()
}

fn build_adjacency(simplices: &[Vec<u32>], dim: usize) -> Vec<Vec<u32>> {
    let mut adjacency = vec![vec![NO_NEIGHBOR; dim + 1]; simplices.len()];
    let mut face_map: HashMap<Vec<u32>, Vec<(usize, usize)>> = HashMap::new();

    for (si, simplex) in simplices.iter().enumerate() {
        for local in 0..simplex.len() {
            let mut face: Vec<u32> = simplex
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != local)
                .map(|(_, &v)| v)
                .collect();
            face.sort_unstable();
            face_map.entry(face).or_default().push((si, local));
        }
    }

    for occurrences in face_map.into_values() {
        if occurrences.len() == 2 {
            let (s1, l1) = occurrences[0];
            let (s2, l2) = occurrences[1];
            adjacency[s1][l1] = s2 as u32;
            adjacency[s2][l2] = s1 as u32;
        }
    }

    adjacency
}

fn in_circumsphere(simplex: &[u32], points: &[Vec<f64>], p: &[f64]) -> bool {
    let dim = p.len();
    let verts: Vec<&Vec<f64>> = simplex.iter().map(|&i| &points[i as usize]).collect();
    match circumsphere(&verts, dim) {
        Some((center, radius_sq)) => {
            let dist_sq: f64 = (0..dim).map(|d| (p[d] - center[d]).powi(2)).sum();
            dist_sq <= radius_sq + CIRCUMSPHERE_TOLERANCE
        }
        None => false,
    }
}

/// Solves for the circumcenter of `dim + 1` affinely independent points by
/// intersecting the perpendicular bisectors between vertex 0 and every
/// other vertex. Returns `None` if the vertices are degenerate (the
/// resulting linear system is singular).
fn circumsphere(verts: &[&Vec<f64>], dim: usize) -> Option<(Vec<f64>, f64)> {
    let v0 = verts[0];
    let mut m = DMatrix::<f64>::zeros(dim, dim);
    let mut b = DVector::<f64>::zeros(dim);

    for j in 1..=dim {
        let vj = verts[j];
        let mut sq_vj = 0.0;
        let mut sq_v0 = 0.0;
        for d in 0..dim {
            m[(j - 1, d)] = 2.0 * (vj[d] - v0[d]);
            sq_vj += vj[d] * vj[d];
            sq_v0 += v0[d] * v0[d];
        }
        b[j - 1] = sq_vj - sq_v0;
    }

    let center = m.lu().solve(&b)?;
    let radius_sq: f64 = (0..dim).map(|d| (center[d] - v0[d]).powi(2)).sum();
    Some((center.iter().copied().collect(), radius_sq))
}
