use crate::error::{Error, Result};

/// A two-dimensional table of (possibly vector-valued) `f64` cells.
///
/// Immutable after construction; `slice`/`get_row`/`get_column` copy into
/// freshly owned buffers rather than returning views (spec.md §4.D, §9 —
/// "Ownership of large arrays").
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    num_rows: usize,
    num_columns: usize,
    /// Per-cell vector length.
    v: usize,
    row_values: Vec<f64>,
    column_values: Vec<f64>,
    /// Row-major; innermost axis is the per-cell vector.
    data: Vec<f64>,
}

impl Table {
    pub fn new(
        num_rows: usize,
        num_columns: usize,
        v: usize,
        row_values: Vec<f64>,
        column_values: Vec<f64>,
        data: Vec<f64>,
    ) -> Result<Self> {
        if row_values.len() != num_rows {
            return Err(Error::InvalidArgument(format!(
                "rowValues length {} != numRows {}",
                row_values.len(),
                num_rows
            )));
        }
        if column_values.len() != num_columns {
            return Err(Error::InvalidArgument(format!(
                "columnValues length {} != numColumns {}",
                column_values.len(),
                num_columns
            )));
        }
        if data.len() != num_rows * num_columns * v {
            return Err(Error::InvalidArgument(format!(
                "data length {} != numRows*numColumns*v ({})",
                data.len(),
                num_rows * num_columns * v
            )));
        }
        Ok(Self {
            num_rows,
            num_columns,
            v,
            row_values,
            column_values,
            data,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub fn cell_len(&self) -> usize {
        self.v
    }

    pub fn row_values(&self) -> &[f64] {
        &self.row_values
    }

    pub fn column_values(&self) -> &[f64] {
        &self.column_values
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    fn cell_offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.num_rows || col >= self.num_columns {
            return Err(Error::OutOfRange(format!(
                "cell ({row},{col}) outside {}x{} table",
                self.num_rows, self.num_columns
            )));
        }
        Ok((row * self.num_columns + col) * self.v)
    }

    /// The cell's full vector (length `v`).
    pub fn get(&self, row: usize, col: usize) -> Result<&[f64]> {
        let offset = self.cell_offset(row, col)?;
        Ok(&self.data[offset..offset + self.v])
    }

    /// A scalar element within a cell's vector.
    pub fn get_scalar(&self, row: usize, col: usize, z: usize) -> Result<f64> {
        let cell = self.get(row, col)?;
        cell.get(z).copied().ok_or_else(|| {
            Error::OutOfRange(format!("cell vector index {z} outside length {}", self.v))
        })
    }

    /// Copies the rectangular subregion `[r0,r1) x [c0,c1)` into a new,
    /// independently-owned `Table`.
    pub fn slice(&self, r0: usize, r1: usize, c0: usize, c1: usize) -> Result<Self> {
        if !(r0 < r1 && r1 <= self.num_rows) {
            return Err(Error::OutOfRange(format!(
                "row slice [{r0},{r1}) invalid for {} rows",
                self.num_rows
            )));
        }
        if !(c0 < c1 && c1 <= self.num_columns) {
            return Err(Error::OutOfRange(format!(
                "column slice [{c0},{c1}) invalid for {} columns",
                self.num_columns
            )));
        }
        let new_rows = r1 - r0;
        let new_cols = c1 - c0;
        let mut data = Vec::with_capacity(new_rows * new_cols * self.v);
        for row in r0..r1 {
            for col in c0..c1 {
                data.extend_from_slice(self.get(row, col)?);
            }
        }
        Table::new(
            new_rows,
            new_cols,
            self.v,
            self.row_values[r0..r1].to_vec(),
            self.column_values[c0..c1].to_vec(),
            data,
        )
    }

    /// A `1 x numColumns` table holding only row `r`.
    pub fn get_row(&self, r: usize) -> Result<Self> {
        self.slice(r, r + 1, 0, self.num_columns)
    }

    /// A `numRows x 1` table holding only column `c`.
    pub fn get_column(&self, c: usize) -> Result<Self> {
        self.slice(0, self.num_rows, c, c + 1)
    }
}
