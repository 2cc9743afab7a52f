use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::ops::{Add, Sub, Mul};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Single-row matrix (shape `1 x values.len()`).
    pub fn row(values: Vec<f64>) -> Matrix {
        Matrix { rows: 1, cols: values.len(), data: vec![values] }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    /// Both u1 and u2 must be uniform on (0, 1].
    pub fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Draw two independent uniform samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn gaussian<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    /// He initialization: samples from N(0, sqrt(2 / fan_in)).
    ///
    /// Recommended before ReLU layers. The variance 2/fan_in accounts for
    /// the fact that ReLU zeroes half of its inputs on average.
    ///
    /// `fan_in` is passed explicitly because convolution kernels are stored
    /// transposed relative to dense weights.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, fan_in: usize, rng: &mut R) -> Matrix {
        Matrix::gaussian(rows, cols, (2.0 / fan_in.max(1) as f64).sqrt(), rng)
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / fan_in)).
    ///
    /// Recommended before Sigmoid/Tanh/Identity layers. Keeps the variance of
    /// activations and gradients roughly equal across layers.
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, fan_in: usize, rng: &mut R) -> Matrix {
        Matrix::gaussian(rows, cols, (1.0 / fan_in.max(1) as f64).sqrt(), rng)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Checks that `data` really is `rows x cols`. Deserialized matrices
    /// carry both, and the operators index by the declared shape.
    pub fn validate(&self) -> Result<()> {
        let ragged = self.data.iter().position(|row| row.len() != self.cols);
        if self.data.len() != self.rows || ragged.is_some() {
            let found = match ragged {
                Some(i) => format!("row {i} with {} values", self.data[i].len()),
                None => format!("{} rows", self.data.len()),
            };
            return Err(Error::shape(format!("{}x{} matrix", self.rows, self.cols), found));
        }
        Ok(())
    }

    /// Validates the matrix and checks it against an expected shape.
    pub fn expect_shape(&self, rows: usize, cols: usize, what: &str) -> Result<()> {
        self.validate()?;
        if (self.rows, self.cols) != (rows, cols) {
            return Err(Error::shape(
                format!("{what} of {rows}x{cols}"),
                format!("{}x{}", self.rows, self.cols),
            ));
        }
        Ok(())
    }

    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, other: &Matrix) -> Matrix {
        assert!(self.same_shape(other), "Matrices are of incorrect sizes");
        let data = self.data.iter().zip(other.data.iter())
            .map(|(row_a, row_b)| {
                row_a.iter().zip(row_b.iter()).map(|(x, y)| x * y).collect()
            })
            .collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }

    /// In-place element-wise sum; avoids reallocating accumulators.
    pub fn add_assign(&mut self, other: &Matrix) {
        assert!(self.same_shape(other), "Matrices are of incorrect sizes");
        for (row_a, row_b) in self.data.iter_mut().zip(other.data.iter()) {
            for (a, b) in row_a.iter_mut().zip(row_b.iter()) {
                *a += b;
            }
        }
    }

    pub fn norm_squared(&self) -> f64 {
        self.data.iter().flatten().map(|x| x * x).sum()
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |row| row.len()),
            data
        }
    }

    /// Consumes a `1 x n` matrix and returns its only row.
    pub fn into_row(mut self) -> Vec<f64> {
        assert_eq!(self.rows, 1, "into_row called on a {}x{} matrix", self.rows, self.cols);
        self.data.pop().unwrap_or_default()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(mut self, rhs: Self) -> Self::Output {
        self.add_assign(&rhs);
        self
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, self.cols);

        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[i][j] = self.data[i][j] - rhs.data[i][j];
            }
        }

        res
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res =  Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for k in 0..self.cols {
                let a = self.data[i][k];
                if a == 0.0 {
                    continue;
                }
                for j in 0..res.cols {
                    res.data[i][j] += a * rhs.data[k][j];
                }
            }
        }

        res
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        &self * &rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn product_matches_hand_computation() {
        let a = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = Matrix::from_data(vec![vec![5.0], vec![6.0]]);
        let c = &a * &b;
        assert_eq!(c.data, vec![vec![17.0], vec![39.0]]);
    }

    #[test]
    fn transpose_swaps_shape() {
        let a = Matrix::from_data(vec![vec![1.0, 2.0, 3.0]]);
        let t = a.transpose();
        assert_eq!((t.rows, t.cols), (3, 1));
        assert_eq!(t.data[2][0], 3.0);
    }

    #[test]
    fn he_init_has_expected_spread() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = Matrix::he(200, 50, 50, &mut rng);
        let n = (m.rows * m.cols) as f64;
        let var = m.norm_squared() / n;
        // Expected variance 2 / 50 = 0.04.
        assert!((var - 0.04).abs() < 0.005, "variance {var}");
    }

    #[test]
    fn validate_catches_declared_shape_drift() {
        let mut m = Matrix::zeros(2, 3);
        assert!(m.validate().is_ok());
        m.rows = 3;
        assert!(matches!(m.validate(), Err(Error::Shape { .. })));
        let ragged = Matrix { rows: 2, cols: 2, data: vec![vec![1.0, 2.0], vec![3.0]] };
        assert!(matches!(ragged.validate(), Err(Error::Shape { .. })));
        assert!(Matrix::zeros(1, 4).expect_shape(4, 1, "bias").is_err());
    }

    #[test]
    #[should_panic(expected = "incorrect sizes")]
    fn mismatched_add_panics() {
        let _ = Matrix::zeros(1, 2) + Matrix::zeros(2, 1);
    }
}
