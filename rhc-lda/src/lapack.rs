//! Dense row-major matrices and LU factorization in pure Rust.
//!
//! Covers what the discriminant needs:
//!
//! - **LU factorization** (`dgetrf`): Doolittle elimination with partial
//!   pivoting on absolute value, plus a zero-diagonal row-swap fallback
//! - **LU solve** (`dgetrs`): solve A*x = b using the factors
//! - **Inverse**: column-by-column solve against the identity
//!
//! Matrices are small (feature-count square), so everything is scalar and
//! row-major; rows are contiguous slices.

use std::ops::{Index, IndexMut};

use rhc_core::{Result, RhcError};

// ============================================================================
// Matrix
// ============================================================================

/// Row-major dense matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// All-zero `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Build from nested rows. Fails with RankMismatch on ragged input.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for r in rows {
            if r.len() != cols {
                return Err(RhcError::rank_mismatch(cols, r.len()));
            }
            data.extend_from_slice(r);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Contiguous row `i`.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// `self += other`, element-wise.
    pub fn add_assign(&mut self, other: &Matrix) {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
    }

    /// Rank-1 update `self += x xᵀ` (square, `x.len() == rows`).
    pub fn add_outer(&mut self, x: &[f64]) {
        assert!(self.is_square() && x.len() == self.rows);
        let n = self.cols;
        for i in 0..n {
            let xi = x[i];
            if xi == 0.0 {
                continue;
            }
            let row = &mut self.data[i * n..(i + 1) * n];
            for (r, &xj) in row.iter_mut().zip(x) {
                *r += xi * xj;
            }
        }
    }

    /// Matrix-vector product `self * x`.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.cols);
        (0..self.rows).map(|i| dot(self.row(i), x)).collect()
    }

    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t[(j, i)] = self[(i, j)];
            }
        }
        t
    }

    /// Matrix product `self * other`.
    pub fn mul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(RhcError::rank_mismatch(self.cols, other.rows));
        }
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let aik = self[(i, k)];
                if aik == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    out[(i, j)] += aik * other[(k, j)];
                }
            }
        }
        Ok(out)
    }

    fn swap_rows(&mut self, r1: usize, r2: usize) {
        if r1 == r2 {
            return;
        }
        let n = self.cols;
        let (lo, hi) = if r1 < r2 { (r1, r2) } else { (r2, r1) };
        let (head, tail) = self.data.split_at_mut(hi * n);
        head[lo * n..(lo + 1) * n].swap_with_slice(&mut tail[..n]);
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}

/// Inner product of two equal-length slices.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

// ============================================================================
// LU Factorization: PA = LU
// ============================================================================

/// Packed LU factors of a square matrix.
///
/// `lu` holds L (unit lower, diagonal implied) below the diagonal and U on
/// and above it. `ipiv[k]` is the row interchanged with row `k` at step `k`.
#[derive(Debug, Clone)]
pub struct LuFactors {
    lu: Matrix,
    ipiv: Vec<usize>,
    swaps: usize,
}

/// Double-precision LU factorization with partial pivoting.
///
/// At each column the row with the largest absolute value at or below the
/// diagonal becomes the pivot. If the diagonal is still exactly zero after
/// that, any later row with a non-zero entry in the column is swapped in
/// instead of giving up. When no row qualifies the matrix is singular.
pub fn dgetrf(a: &Matrix) -> Result<LuFactors> {
    if !a.is_square() {
        return Err(RhcError::invalid_parameter(format!(
            "LU factorization needs a square matrix, got {}x{}",
            a.rows(),
            a.cols()
        )));
    }
    let n = a.rows();
    let mut lu = a.clone();
    let mut ipiv = vec![0usize; n];
    let mut swaps = 0usize;

    for k in 0..n {
        let (max_idx, _) = pivot_search(&lu, k);
        ipiv[k] = max_idx;
        if max_idx != k {
            lu.swap_rows(k, max_idx);
            swaps += 1;
        }

        if lu[(k, k)] == 0.0 {
            let good_row = ((k + 1)..n).rev().find(|&row| lu[(row, k)] != 0.0);
            match good_row {
                Some(row) => {
                    lu.swap_rows(k, row);
                    ipiv[k] = row;
                    swaps += 1;
                }
                None => return Err(RhcError::SingularMatrix { column: k }),
            }
        }

        let inv_pivot = 1.0 / lu[(k, k)];
        scale_column(&mut lu, k, inv_pivot);
        trailing_update(&mut lu, k);
    }

    Ok(LuFactors { lu, ipiv, swaps })
}

// ============================================================================
// LU helpers: pivot search, column scale, trailing update
// ============================================================================

/// Pivot search: index and value of max |A[i, col]| for i in col..n.
/// The current diagonal wins ties.
#[inline]
fn pivot_search(a: &Matrix, col: usize) -> (usize, f64) {
    let mut max_val = a[(col, col)].abs();
    let mut max_idx = col;
    for i in (col + 1)..a.rows() {
        let val = a[(i, col)].abs();
        if val > max_val {
            max_val = val;
            max_idx = i;
        }
    }
    (max_idx, max_val)
}

/// Scale column: A[i, col] *= alpha for i in col+1..n (the L multipliers).
#[inline]
fn scale_column(a: &mut Matrix, col: usize, alpha: f64) {
    for i in (col + 1)..a.rows() {
        a[(i, col)] *= alpha;
    }
}

/// Trailing submatrix update: A[i,j] -= A[i,k] * A[k,j] for i>k, j>k.
/// Row k and row i are contiguous from column k+1..n.
#[inline]
fn trailing_update(a: &mut Matrix, k: usize) {
    let n = a.cols();
    let pivot_row: Vec<f64> = a.row(k)[k + 1..].to_vec();
    for i in (k + 1)..a.rows() {
        let lik = a[(i, k)];
        if lik == 0.0 {
            continue;
        }
        let start = i * n + k + 1;
        for (x, &u) in a.data[start..start + pivot_row.len()]
            .iter_mut()
            .zip(&pivot_row)
        {
            *x -= lik * u;
        }
    }
}

// ============================================================================
// LU Solve and inverse
// ============================================================================

impl LuFactors {
    /// Order of the factored matrix.
    pub fn order(&self) -> usize {
        self.lu.rows()
    }

    /// Solve A * x = b in place: `b` is overwritten with x.
    pub fn dgetrs(&self, b: &mut [f64]) {
        let n = self.order();
        assert_eq!(b.len(), n, "right-hand side length must match order");

        // Apply row interchanges to b
        for k in 0..n {
            if self.ipiv[k] != k {
                b.swap(k, self.ipiv[k]);
            }
        }

        // Forward substitution: L * y = P * b
        for i in 1..n {
            let row = self.lu.row(i);
            let s = dot(&row[..i], &b[..i]);
            b[i] -= s;
        }

        // Back substitution: U * x = y
        for k in (0..n).rev() {
            let row = self.lu.row(k);
            let s = dot(&row[k + 1..], &b[k + 1..]);
            b[k] = (b[k] - s) / row[k];
        }
    }

    /// Inverse of the factored matrix, one identity column at a time.
    pub fn inverse(&self) -> Matrix {
        let n = self.order();
        let mut inv = Matrix::zeros(n, n);
        let mut col = vec![0.0f64; n];
        for j in 0..n {
            col.iter_mut().for_each(|x| *x = 0.0);
            col[j] = 1.0;
            self.dgetrs(&mut col);
            for i in 0..n {
                inv[(i, j)] = col[i];
            }
        }
        inv
    }

    /// Determinant: product of U's diagonal, sign-flipped per row swap.
    pub fn determinant(&self) -> f64 {
        let diag: f64 = (0..self.order()).map(|i| self.lu[(i, i)]).product();
        if self.swaps % 2 == 0 {
            diag
        } else {
            -diag
        }
    }
}

/// Inverse of a square matrix via LU. Fails with SingularMatrix when no
/// usable pivot exists.
pub fn invert(a: &Matrix) -> Result<Matrix> {
    Ok(dgetrf(a)?.inverse())
}

// ============================================================================
// Tests
// ============================================================================
