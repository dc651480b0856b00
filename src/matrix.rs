use ndarray::{s, Array2, Zip};
use num::{One, Zero};

use std::fmt;
use std::ops::{Div, Index, IndexMut, Mul, Neg, Sub};

use crate::error::LppError;

/// Element type of a [`DenseMatrix`]. Exact types keep every operation exact.
pub trait Scalar:
    Clone + PartialEq + Zero + One + Neg<Output = Self> + Sub<Output = Self> + Div<Output = Self> + fmt::Display
{
}

impl<T> Scalar for T where
    T: Clone + PartialEq + Zero + One + Neg<Output = T> + Sub<Output = T> + Div<Output = T> + fmt::Display
{
}

/// Row-major dense matrix over an exact scalar.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseMatrix<T: Scalar> {
    data: Array2<T>,
}

impl<T: Scalar> DenseMatrix<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::from_shape_fn((rows, cols), |_| T::zero()),
        }
    }

    pub fn identity(n: usize) -> Self {
        Self {
            data: Array2::from_shape_fn((n, n), |(i, j)| if i == j { T::one() } else { T::zero() }),
        }
    }

    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, LppError> {
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != n_cols)
        {
            return Err(LppError::RaggedMatrix {
                row,
                expected: n_cols,
                found,
            });
        }
        let n_rows = rows.len();
        let flat: Vec<T> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((n_rows, n_cols), flat)
            .map(|data| Self { data })
            .map_err(|_| LppError::RaggedMatrix {
                row: 0,
                expected: n_cols,
                found: 0,
            })
    }

    pub fn from_fn<F: FnMut(usize, usize) -> T>(rows: usize, cols: usize, mut f: F) -> Self {
        Self {
            data: Array2::from_shape_fn((rows, cols), |(i, j)| f(i, j)),
        }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    pub fn row(&self, i: usize) -> Vec<T> {
        self.data.row(i).to_vec()
    }

    pub fn column(&self, j: usize) -> Vec<T> {
        self.data.column(j).to_vec()
    }

    pub fn transpose(&self) -> Self {
        Self {
            data: self.data.t().to_owned(),
        }
    }

    /// Copy with `column` appended on the right.
    pub fn with_column(&self, column: &[T]) -> Self {
        assert_eq!(column.len(), self.rows(), "column length does not match row count");
        let cols = self.cols();
        Self::from_fn(self.rows(), cols + 1, |i, j| {
            if j < cols {
                self.data[[i, j]].clone()
            } else {
                column[i].clone()
            }
        })
    }

    /// Copy with column `k` removed.
    pub fn without_column(&self, k: usize) -> Self {
        assert!(k < self.cols(), "column {} out of range", k);
        Self::from_fn(self.rows(), self.cols() - 1, |i, j| {
            self.data[[i, if j < k { j } else { j + 1 }]].clone()
        })
    }

    /// Square submatrix of the given rows and columns.
    pub fn select(&self, rows: &[usize], cols: &[usize]) -> Self {
        Self::from_fn(rows.len(), cols.len(), |i, j| self.data[[rows[i], cols[j]]].clone())
    }

    /// Divides row `i` by `pivot`.
    pub(crate) fn scale_row(&mut self, i: usize, pivot: &T) {
        self.data.row_mut(i).mapv_inplace(|v| v / pivot.clone());
    }

    /// `row[r] -= factor * row[i]`.
    pub(crate) fn eliminate(&mut self, r: usize, i: usize, factor: &T) {
        if factor.is_zero() {
            return;
        }
        for c in 0..self.cols() {
            let product = factor.clone() * self.data[[i, c]].clone();
            self.data[[r, c]] = self.data[[r, c]].clone() - product;
        }
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a != b {
            let (row_a, row_b) = self.data.multi_slice_mut((s![a, ..], s![b, ..]));
            Zip::from(row_a).and(row_b).for_each(::std::mem::swap);
        }
    }

    /// Reduced row echelon form and the pivot column of each non-zero row.
    pub fn echelon_form(&self) -> (Self, Vec<usize>) {
        let mut tbl = self.clone();
        let m = self.rows();
        let n = self.cols();
        let mut pivots = Vec::with_capacity(std::cmp::min(m, n));

        let mut i = 0;
        for j in 0..n {
            if i == m {
                break;
            }
            //find pivot row
            let Some(k) = (i..m).find(|&k| !tbl[(k, j)].is_zero()) else {
                continue;
            };
            tbl.swap_rows(i, k);

            //normalize pivot row
            let div = tbl[(i, j)].clone();
            tbl.scale_row(i, &div);

            //eliminate column
            for r in (0..m).filter(|&r| r != i) {
                let factor = tbl[(r, j)].clone();
                tbl.eliminate(r, i, &factor);
            }
            pivots.push(j);
            i += 1;
        }
        (tbl, pivots)
    }

    pub fn rank(&self) -> usize {
        self.echelon_form().1.len()
    }

    /// Panics if the matrix is not square.
    pub fn determinant(&self) -> T {
        assert!(
            self.is_square(),
            "determinant of a non-square {}x{} matrix",
            self.rows(),
            self.cols()
        );
        let mut tbl = self.clone();
        let n = self.rows();
        let mut det = T::one();
        for j in 0..n {
            let Some(k) = (j..n).find(|&k| !tbl[(k, j)].is_zero()) else {
                return T::zero();
            };
            if k != j {
                tbl.swap_rows(j, k);
                det = -det;
            }
            let pivot = tbl[(j, j)].clone();
            det = det * pivot.clone();
            for r in j + 1..n {
                let factor = tbl[(r, j)].clone() / pivot.clone();
                tbl.eliminate(r, j, &factor);
            }
        }
        det
    }

    /// Gauss-Jordan inverse.
    pub fn inverse(&self) -> Result<Self, LppError> {
        if !self.is_square() {
            return Err(LppError::SingularMatrix);
        }
        let n = self.rows();
        let augmented = Self::from_fn(n, 2 * n, |i, j| {
            if j < n {
                self.data[[i, j]].clone()
            } else if j - n == i {
                T::one()
            } else {
                T::zero()
            }
        });
        let (reduced, pivots) = augmented.echelon_form();
        if !pivots.iter().copied().take(n).eq(0..n) {
            return Err(LppError::SingularMatrix);
        }
        Ok(Self {
            data: reduced.data.slice(s![.., n..]).to_owned(),
        })
    }

    pub fn mul_vec(&self, v: &[T]) -> Vec<T> {
        assert_eq!(v.len(), self.cols(), "vector length does not match column count");
        (0..self.rows())
            .map(|i| {
                v.iter()
                    .enumerate()
                    .fold(T::zero(), |acc, (k, x)| acc + self.data[[i, k]].clone() * x.clone())
            })
            .collect()
    }
}

impl<T: Scalar> Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[[i, j]]
    }
}

impl<T: Scalar> IndexMut<(usize, usize)> for DenseMatrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        &mut self.data[[i, j]]
    }
}

impl<T: Scalar> Mul for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;

    fn mul(self, rhs: Self) -> Self::Output {
        assert_eq!(
            self.cols(),
            rhs.rows(),
            "cannot multiply {}x{} by {}x{}",
            self.rows(),
            self.cols(),
            rhs.rows(),
            rhs.cols()
        );
        DenseMatrix::from_fn(self.rows(), rhs.cols(), |i, j| {
            (0..self.cols()).fold(T::zero(), |acc, k| {
                acc + self.data[[i, k]].clone() * rhs.data[[k, j]].clone()
            })
        })
    }
}

impl<T: Scalar> fmt::Display for DenseMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.data.rows() {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(f, "[{}]", cells.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::Rational;

    fn m(rows: Vec<Vec<i64>>) -> DenseMatrix<Rational> {
        DenseMatrix::from_rows(
            rows.into_iter()
                .map(|r| r.into_iter().map(Rational::from).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_identity_and_product() {
        let a = m(vec![vec![1, 2], vec![3, 4]]);
        let id = DenseMatrix::identity(2);
        assert_eq!(&a * &id, a);
        assert_eq!(&id * &a, a);
        assert_eq!(&a * &a, m(vec![vec![7, 10], vec![15, 22]]));
    }

    #[test]
    fn test_inverse() {
        let a = m(vec![vec![2, 1], vec![1, 1]]);
        let inv = a.inverse().unwrap();
        assert_eq!(inv, m(vec![vec![1, -1], vec![-1, 2]]));
        assert_eq!(&a * &inv, DenseMatrix::identity(2));

        let b = m(vec![vec![0, 1], vec![2, 0]]);
        let inv = b.inverse().unwrap();
        assert_eq!(inv[(0, 1)], Rational::new(1, 2));
        assert_eq!(inv[(1, 0)], Rational::from(1));
    }

    #[test]
    fn test_singular_inverse_is_an_error() {
        let a = m(vec![vec![1, 2], vec![2, 4]]);
        assert_eq!(a.inverse(), Err(LppError::SingularMatrix));
        assert_eq!(a.rank(), 1);
        assert_eq!(a.determinant(), Rational::from(0));
    }

    #[test]
    fn test_determinant() {
        let a = m(vec![vec![0, 2, 1], vec![1, 0, 0], vec![3, 1, 1]]);
        assert_eq!(a.determinant(), Rational::from(-1));
        assert_eq!(DenseMatrix::<Rational>::identity(4).determinant(), Rational::from(1));
    }

    #[test]
    fn test_echelon_form() {
        let a = m(vec![vec![1, 2, 1, 4], vec![2, 1, 5, 5]]);
        let (reduced, pivots) = a.echelon_form();
        assert_eq!(pivots, vec![0, 1]);
        assert_eq!(reduced.row(0), vec![1, 0, 3, 2].into_iter().map(Rational::from).collect::<Vec<_>>());
        assert_eq!(reduced.row(1), vec![0, 1, -1, 1].into_iter().map(Rational::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_columns() {
        let a = m(vec![vec![1, 2], vec![3, 4]]);
        let wide = a.with_column(&[Rational::from(5), Rational::from(6)]);
        assert_eq!(wide.column(2), vec![Rational::from(5), Rational::from(6)]);
        assert_eq!(wide.without_column(0), m(vec![vec![2, 5], vec![4, 6]]));
        assert_eq!(a.transpose(), m(vec![vec![1, 3], vec![2, 4]]));
        assert_eq!(a.select(&[1], &[0]), m(vec![vec![3]]));
        assert_eq!(a.mul_vec(&[Rational::from(1), Rational::from(1)]), vec![Rational::from(3), Rational::from(7)]);
    }

    #[test]
    fn test_ragged_rows() {
        let rows = vec![vec![Rational::from(1), Rational::from(2)], vec![Rational::from(3)]];
        assert_eq!(
            DenseMatrix::from_rows(rows),
            Err(LppError::RaggedMatrix {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }
}
