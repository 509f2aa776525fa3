use crate::common::ViewId;
use crate::error::{SceneError, SceneResult};

/// Placement of one view in a [`Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridAssignment {
    pub view: ViewId,
    pub row: usize,
    pub col: usize,
    pub rowspan: usize,
    pub colspan: usize,
}

/// Arranges views in weighted rows and columns.
///
/// Each row `i` gets `row_sizes[i] / sum(row_sizes)` of the canvas height,
/// and likewise for columns. Views may span several cells.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    assignments: Vec<GridAssignment>,
    row_sizes: Vec<f64>,
    col_sizes: Vec<f64>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assignments(&self) -> &[GridAssignment] {
        &self.assignments
    }

    pub fn row_sizes(&self) -> &[f64] {
        &self.row_sizes
    }

    pub fn col_sizes(&self) -> &[f64] {
        &self.col_sizes
    }

    /// Replaces the row weights. Missing rows are weighted 1.
    ///
    /// # Errors
    /// [`SceneError::Validation`] if a weight is not a positive finite
    /// number; the old weights are kept.
    pub fn set_row_sizes(&mut self, sizes: Vec<f64>) -> SceneResult<()> {
        self.row_sizes = check_weights("row_sizes", sizes)?;
        Ok(())
    }

    /// Replaces the column weights. Missing columns are weighted 1.
    ///
    /// # Errors
    /// See [`Grid::set_row_sizes`].
    pub fn set_col_sizes(&mut self, sizes: Vec<f64>) -> SceneResult<()> {
        self.col_sizes = check_weights("col_sizes", sizes)?;
        Ok(())
    }

    /// Places `view`, filling in whichever of `row` and `col` is missing.
    ///
    /// - Neither given: the top-left cell.
    /// - Only `col`: the first row below every view already in that column.
    /// - Only `row`: the first column right of every view already in that row.
    ///
    /// Rows and columns the placement needs beyond the current weights are
    /// added with the average existing weight (1 for an empty grid).
    pub fn add(
        &mut self,
        view: ViewId,
        row: Option<usize>,
        col: Option<usize>,
        rowspan: usize,
        colspan: usize,
    ) -> GridAssignment {
        let (row, col) = match (row, col) {
            (None, None) => (0, 0),
            (Some(row), Some(col)) => (row, col),
            (None, Some(col)) => {
                let row = self
                    .assignments
                    .iter()
                    .filter(|a| a.col == col)
                    .map(|a| a.row + a.rowspan)
                    .max()
                    .unwrap_or(0);
                (row, col)
            }
            (Some(row), None) => {
                let col = self
                    .assignments
                    .iter()
                    .filter(|a| a.row == row)
                    .map(|a| a.col + a.colspan)
                    .max()
                    .unwrap_or(0);
                (row, col)
            }
        };
        let rowspan = rowspan.max(1);
        let colspan = colspan.max(1);

        pad_with_average(&mut self.row_sizes, row + rowspan);
        pad_with_average(&mut self.col_sizes, col + colspan);

        let assignment = GridAssignment {
            view,
            row,
            col,
            rowspan,
            colspan,
        };
        self.assignments.push(assignment);
        assignment
    }

    /// Returns `true` if the view was placed in the grid.
    pub fn remove(&mut self, view: ViewId) -> bool {
        let before = self.assignments.len();
        self.assignments.retain(|a| a.view != view);
        self.assignments.len() != before
    }

    /// Pixel rectangles `(x, y, width, height)` for every placed view on a
    /// canvas of the given size.
    pub fn compute(&self, width: f64, height: f64) -> Vec<(ViewId, (f64, f64, f64, f64))> {
        let Some(rows) = self.assignments.iter().map(|a| a.row + a.rowspan).max() else {
            return Vec::new();
        };
        let cols = self
            .assignments
            .iter()
            .map(|a| a.col + a.colspan)
            .max()
            .unwrap_or(1);
        let row_sizes = weights(&self.row_sizes, rows);
        let col_sizes = weights(&self.col_sizes, cols);
        let total_rows: f64 = row_sizes.iter().sum();
        let total_cols: f64 = col_sizes.iter().sum();

        self.assignments
            .iter()
            .map(|a| {
                let x: f64 = col_sizes[..a.col].iter().sum();
                let y: f64 = row_sizes[..a.row].iter().sum();
                let w: f64 = col_sizes[a.col..a.col + a.colspan].iter().sum();
                let h: f64 = row_sizes[a.row..a.row + a.rowspan].iter().sum();
                (
                    a.view,
                    (
                        x / total_cols * width,
                        y / total_rows * height,
                        w / total_cols * width,
                        h / total_rows * height,
                    ),
                )
            })
            .collect()
    }
}

pub(crate) fn check_weights(field: &'static str, sizes: Vec<f64>) -> SceneResult<Vec<f64>> {
    match sizes.iter().find(|size| !(size.is_finite() && **size > 0.0)) {
        Some(bad) => Err(SceneError::Validation {
            field,
            reason: format!("weight {bad} is not positive"),
        }),
        None => Ok(sizes),
    }
}

fn pad_with_average(sizes: &mut Vec<f64>, len: usize) {
    if sizes.len() >= len {
        return;
    }
    let average = if sizes.is_empty() {
        1.0
    } else {
        sizes.iter().sum::<f64>() / sizes.len() as f64
    };
    sizes.resize(len, average);
}

/// The first `len` weights, padded with 1.
fn weights(sizes: &[f64], len: usize) -> Vec<f64> {
    (0..len).map(|i| sizes.get(i).copied().unwrap_or(1.0)).collect()
}
