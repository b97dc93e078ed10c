/**
 * HirReco
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use ndarray::{aview1, Array1, Array2, ArrayView1, ArrayViewMut1, Axis};
use serde_derive::{Deserialize, Serialize};

use crate::error::{HirError, Result};

/// Dense `rows x cols` matrix of doubles. Snapshots carry the shape next to the data, and
/// deserialization fails if the two disagree.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct DenseMatrix {
    values: Array2<f64>,
}

impl DenseMatrix {

    pub fn zeros(num_rows: usize, num_cols: usize) -> Self {
        DenseMatrix { values: Array2::zeros((num_rows, num_cols)) }
    }

    /// Builds a matrix from explicit rows, all of which must have `num_cols` entries.
    pub fn from_rows(rows: Vec<Vec<f64>>, num_cols: usize) -> Result<Self> {
        let num_rows = rows.len();
        let mut flattened = Vec::with_capacity(num_rows * num_cols);

        for row in rows {
            if row.len() != num_cols {
                return Err(HirError::MatrixShape { expected: num_cols, found: row.len() });
            }
            flattened.extend(row);
        }

        let found = flattened.len();
        let values = Array2::from_shape_vec((num_rows, num_cols), flattened)
            .map_err(|_| HirError::MatrixShape { expected: num_rows * num_cols, found })?;

        Ok(DenseMatrix { values })
    }

    pub fn num_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[[row, col]]
    }

    pub fn row(&self, row: usize) -> ArrayView1<f64> {
        self.values.row(row)
    }

    pub fn set_row(&mut self, row: usize, values: &[f64]) {
        assert_eq!(values.len(), self.num_cols(), "row length must match the column count");
        self.values.row_mut(row).assign(&aview1(values));
    }

    pub fn transpose(&self) -> DenseMatrix {
        DenseMatrix { values: self.values.t().as_standard_layout().into_owned() }
    }

    /// Computes the row vector `vector * self`.
    pub fn pre_multiply(&self, vector: ArrayView1<f64>) -> Array1<f64> {
        assert_eq!(vector.len(), self.num_rows(), "vector length must match the row count");
        vector.dot(&self.values)
    }

    fn normalize_rows(&mut self) {
        for row in self.values.axis_iter_mut(Axis(0)) {
            normalize_l1(row);
        }
    }
}

/// Divides every row by its L1 norm. Rows with a zero norm stay all-zero, we never produce NaNs.
pub fn row_stochastic(matrix: &DenseMatrix) -> DenseMatrix {
    let mut stochastic = matrix.clone();
    stochastic.normalize_rows();
    stochastic
}

/// Transposes first and then row-normalizes, which makes the columns of the original
/// orientation sum to one.
pub fn transpose_and_row_stochastic(matrix: &DenseMatrix) -> DenseMatrix {
    let mut transposed = matrix.transpose();
    transposed.normalize_rows();
    transposed
}

fn normalize_l1(mut row: ArrayViewMut1<f64>) {
    let norm: f64 = row.iter().map(|value| value.abs()).sum();

    if norm != 0.0 {
        row.mapv_inplace(|value| value / norm);
    }
}


#[cfg(test)]
mod tests {

    use ndarray::aview1;

    use crate::stochastic::{row_stochastic, transpose_and_row_stochastic, DenseMatrix};

    fn close_enough_to(value: f64, expected: f64) -> bool {
        (value - expected).abs() < 1e-6
    }

    fn genres() -> DenseMatrix {
        DenseMatrix::from_rows(vec![
            vec![1.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0],
            vec![0.0, 1.0, 3.0],
        ], 3).unwrap()
    }

    #[test]
    fn ragged_rows_rejected() {
        assert!(DenseMatrix::from_rows(vec![vec![1.0, 2.0], vec![1.0]], 2).is_err());
    }

    #[test]
    fn rows_sum_to_one_or_stay_zero() {
        let stochastic = row_stochastic(&genres());

        for row in 0..stochastic.num_rows() {
            let sum: f64 = stochastic.row(row).iter().sum();
            assert!(sum == 0.0 || close_enough_to(sum, 1.0));
        }

        assert_eq!(stochastic.row(1).to_vec(), vec![0.0, 0.0, 0.0]);
        assert!(stochastic.row(1).iter().all(|value| !value.is_nan()));
        assert!(close_enough_to(stochastic.get(2, 2), 0.75));
    }

    #[test]
    fn transposed_rows_normalized_per_column() {
        let stochastic = transpose_and_row_stochastic(&genres());

        assert_eq!(stochastic.num_rows(), 3);
        assert_eq!(stochastic.num_cols(), 3);

        // second genre is shared by the first and the last item
        assert!(close_enough_to(stochastic.get(1, 0), 0.5));
        assert!(close_enough_to(stochastic.get(1, 1), 0.0));
        assert!(close_enough_to(stochastic.get(1, 2), 0.5));
        assert!(close_enough_to(stochastic.get(2, 2), 1.0));
    }

    #[test]
    fn transpose_of_non_square() {
        let matrix = DenseMatrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]], 3)
            .unwrap();
        let transposed = matrix.transpose();

        assert_eq!(transposed.num_rows(), 3);
        assert_eq!(transposed.num_cols(), 2);
        assert_eq!(transposed.row(2).to_vec(), vec![3.0, 6.0]);
    }

    #[test]
    fn pre_multiplication() {
        let matrix = DenseMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 2).unwrap();

        assert_eq!(matrix.pre_multiply(aview1(&[1.0, 1.0])).to_vec(), vec![4.0, 6.0]);
        assert_eq!(matrix.pre_multiply(aview1(&[0.0, 0.5])).to_vec(), vec![1.5, 2.0]);
    }

    #[test]
    fn mismatched_data_does_not_deserialize() {
        let json = r#"{"values":{"v":1,"dim":[2,2],"data":[1.0]}}"#;
        assert!(serde_json::from_str::<DenseMatrix>(json).is_err());

        let json = r#"{"values":{"v":1,"dim":[1,2],"data":[1.0,0.0]}}"#;
        let matrix: DenseMatrix = serde_json::from_str(json).unwrap();
        assert_eq!(matrix.get(0, 0), 1.0);
    }
}
