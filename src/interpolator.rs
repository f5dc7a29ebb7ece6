//! The Interpolator (spec.md §4.H): composes the codec's loaded `File`
//! with the geometric core (§4.E/F/G) to synthesize a card for any query
//! point inside the convex hull of the card catalog.

use crate::error::{Error, Result};
use crate::geometry::{self, Triangulation};
use crate::key::CoordinateKey;
use crate::model::{Card, File, Table};
use std::cell::Cell;
use std::io::Write;

/// The interpolation scheme a `TableLattice` is built with. Only
/// `Linear` is implemented; `Quadratic`/`Cubic` are reserved names that
/// must be rejected both at construction and via `set_interpolation_type`
/// (spec.md §4.H, S7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationType {
    Linear,
    Quadratic,
    Cubic,
}

impl InterpolationType {
    fn require_linear(self) -> Result<()> {
        match self {
            InterpolationType::Linear => Ok(()),
            other => Err(Error::Unsupported(format!("{other:?} interpolation"))),
        }
    }
}

/// An N-dimensional Delaunay-triangulation-based linear interpolator over
/// a `File`'s card catalog (spec.md §4.H).
///
/// Every field but `last_simplex` is immutable after construction; the
/// cache sits behind a `Cell` so a shared `&TableLattice` can still
/// accelerate spatially coherent queries (spec.md §5, §9 — "mutable
/// cache, immutable data").
#[derive(Debug)]
pub struct TableLattice<'a> {
    file: &'a File,
    kind: InterpolationType,
    triangulation: Triangulation,
    /// Vertex global index -> coordinate key, in the same order the
    /// triangulation's points were built from.
    vertex_keys: Vec<CoordinateKey>,
    vertex_coords: Vec<Vec<f64>>,
    bounds: Vec<(f64, f64)>,
    last_simplex: Cell<Option<u32>>,
}

impl<'a> TableLattice<'a> {
    pub fn new(file: &'a File) -> Result<Self> {
        Self::new_with_type(file, InterpolationType::Linear)
    }

    pub fn new_with_type(file: &'a File, kind: InterpolationType) -> Result<Self> {
        kind.require_linear()?;

        let mut pairs = file.coordinate_vectors();
        // `File::coordinate_vectors` iterates a `HashMap`; fix an order
        // now so vertex indices are stable for the lifetime of this
        // lattice (the triangulation is built from this exact sequence).
        pairs.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let (vertex_keys, vertex_coords): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();

        let triangulation = Triangulation::build(&vertex_coords)?;
        let bounds = file.bounds();

        debug!(
            "built TableLattice over {} cards ({} simplices)",
            vertex_keys.len(),
            triangulation.len()
        );

        Ok(Self {
            file,
            kind,
            triangulation,
            vertex_keys,
            vertex_coords,
            bounds,
            last_simplex: Cell::new(None),
        })
    }

    pub fn interpolation_type(&self) -> InterpolationType {
        self.kind
    }

    /// Rejects anything but `Linear`, as construction does; the current
    /// type is left unchanged on failure (spec.md S7).
    pub fn set_interpolation_type(&mut self, kind: InterpolationType) -> Result<()> {
        kind.require_linear()?;
        self.kind = kind;
        Ok(())
    }

    pub fn file(&self) -> &File {
        self.file
    }

    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    /// Locates the enclosing simplex and synthesizes a card by taking the
    /// weighted combination of its `N+1` vertex cards' tables (spec.md
    /// §4.H).
    pub fn get(&self, q: &[f64]) -> Result<Card> {
        let located = geometry::locate(
            &self.triangulation,
            &self.vertex_coords,
            &self.bounds,
            q,
            &self.last_simplex,
        )?;
        trace!(
            "query {:?} located in simplex {} with weights {:?}",
            q, located.simplex, located.weights
        );

        let simplex = &self.triangulation.simplices()[located.simplex as usize];
        let corner_cards: Vec<&Card> = simplex
            .iter()
            .map(|&vi| self.file.get(&self.vertex_keys[vi as usize]))
            .collect::<Result<Vec<_>>>()?;

        let template = corner_cards[0];
        let mut tags: Vec<&str> = template.tags().collect();
        tags.sort_unstable();

        let mut result = crate::model::CardBuilder::new();
        for tag in tags {
            let template_table = template.get(tag)?;
            let mut data = vec![0.0f64; template_table.data().len()];

            for (corner, &weight) in corner_cards.iter().zip(&located.weights) {
                let table = corner.get(tag)?;
                if table.data().len() != data.len() {
                    return Err(Error::InvalidArgument(format!(
                        "table {tag:?} shape mismatch across simplex corners"
                    )));
                }
                for (out, &cell) in data.iter_mut().zip(table.data()) {
                    // IEEE arithmetic already propagates NaN through a
                    // nonzero-weight contribution (spec.md §4.H step 3);
                    // a zero weight times NaN would itself be NaN, so a
                    // vertex with weight 0 must not be allowed to poison
                    // an otherwise well-defined cell.
                    if weight == 0.0 {
                        continue;
                    }
                    *out += weight * cell;
                }
            }

            let synthesized = Table::new(
                template_table.num_rows(),
                template_table.num_columns(),
                template_table.cell_len(),
                template_table.row_values().to_vec(),
                template_table.column_values().to_vec(),
                data,
            )?;
            result = result.add_table(tag, synthesized)?;
        }

        Ok(result.build())
    }

    /// Diagnostic dump of every triangulation vertex: global id and raw
    /// coordinates, one per line, space-separated (spec.md §4.H).
    pub fn dump_vertices<W: Write>(&self, mut out: W) -> Result<()> {
        for (id, coords) in self.vertex_coords.iter().enumerate() {
            let line = coords
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(out, "{id} {line}")?;
        }
        Ok(())
    }

    /// Diagnostic dump of every simplex as its space-separated vertex
    /// ids, one simplex per line (spec.md §4.H).
    pub fn dump_simplices<W: Write>(&self, mut out: W) -> Result<()> {
        for simplex in self.triangulation.simplices() {
            let line = simplex
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardBuilder, FileBuilder};

    fn two_point_file() -> File {
        let a = Table::new(1, 1, 1, vec![0.0], vec![0.0], vec![1.0]).unwrap();
        let b = Table::new(1, 1, 1, vec![0.0], vec![0.0], vec![3.0]).unwrap();
        FileBuilder::new(1, 8)
            .add_card(vec![0.0], CardBuilder::new().add_table("data", a).unwrap())
            .unwrap()
            .add_card(vec![2.0], CardBuilder::new().add_table("data", b).unwrap())
            .unwrap()
            .build()
            .unwrap()
    }

    fn two_d_file() -> File {
        let mk = |v: f64| Table::new(1, 1, 1, vec![0.0], vec![0.0], vec![v]).unwrap();
        FileBuilder::new(2, 8)
            .add_card(
                vec![0.0, 0.0],
                CardBuilder::new().add_table("data", mk(0.0)).unwrap(),
            )
            .unwrap()
            .add_card(
                vec![1.0, 0.0],
                CardBuilder::new().add_table("data", mk(10.0)).unwrap(),
            )
            .unwrap()
            .add_card(
                vec![0.0, 1.0],
                CardBuilder::new().add_table("data", mk(20.0)).unwrap(),
            )
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn rejects_nonlinear_type_s7() {
        let file = two_point_file();
        let err = TableLattice::new_with_type(&file, InterpolationType::Quadratic).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn setter_rejects_nonlinear_and_leaves_type_unchanged() {
        let file = two_point_file();
        let mut lattice = TableLattice::new(&file).unwrap();
        let err = lattice
            .set_interpolation_type(InterpolationType::Cubic)
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
        assert_eq!(lattice.interpolation_type(), InterpolationType::Linear);
    }

    #[test]
    fn exact_at_vertex_s4() {
        let file = two_d_file();
        let lattice = TableLattice::new(&file).unwrap();
        let card = lattice.get(&[0.0, 0.0]).unwrap();
        assert_eq!(card.get("data").unwrap().get_scalar(0, 0, 0).unwrap(), 0.0);
    }

    #[test]
    fn midpoint_is_arithmetic_mean_s5() {
        let file = two_point_file();
        let lattice = TableLattice::new(&file).unwrap();
        let card = lattice.get(&[1.0]).unwrap();
        assert_eq!(card.get("data").unwrap().get_scalar(0, 0, 0).unwrap(), 2.0);
    }

    #[test]
    fn out_of_hull_query_rejected_s6() {
        let file = two_d_file();
        let lattice = TableLattice::new(&file).unwrap();
        // Inside the per-dimension bounds box but outside the triangle hull.
        let err = lattice.get(&[0.9, 0.9]).unwrap_err();
        assert!(matches!(err, Error::OutsideHull));
    }

    #[test]
    fn nan_propagates_through_positive_weight() {
        let a = Table::new(1, 1, 1, vec![0.0], vec![0.0], vec![f64::NAN]).unwrap();
        let b = Table::new(1, 1, 1, vec![0.0], vec![0.0], vec![3.0]).unwrap();
        let file = FileBuilder::new(1, 8)
            .add_card(vec![0.0], CardBuilder::new().add_table("data", a).unwrap())
            .unwrap()
            .add_card(vec![2.0], CardBuilder::new().add_table("data", b).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let lattice = TableLattice::new(&file).unwrap();
        let card = lattice.get(&[1.0]).unwrap();
        assert!(card
            .get("data")
            .unwrap()
            .get_scalar(0, 0, 0)
            .unwrap()
            .is_nan());
    }

    #[test]
    fn dump_vertices_and_simplices_write_expected_shape() {
        let file = two_d_file();
        let lattice = TableLattice::new(&file).unwrap();
        let mut vertices = Vec::new();
        lattice.dump_vertices(&mut vertices).unwrap();
        let text = String::from_utf8(vertices).unwrap();
        assert_eq!(text.lines().count(), 3);

        let mut simplices = Vec::new();
        lattice.dump_simplices(&mut simplices).unwrap();
        let text = String::from_utf8(simplices).unwrap();
        assert_eq!(text.lines().count(), lattice.triangulation().len());
    }
}
