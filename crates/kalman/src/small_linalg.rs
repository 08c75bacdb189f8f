//! Stack-allocated small linear algebra types for the Kalman recursions.
//!
//! The kinematic state is always three-dimensional (position, velocity,
//! acceleration), so vectors and matrices are fixed-size `Copy` values and
//! the 3x3 inverse is closed-form. Nothing here allocates.

use std::ops::{Add, Index, Mul, Sub};

/// Relative tolerance used when testing a matrix for positive
/// semi-definiteness. Principal minors may dip this far below zero
/// (scaled by the matrix magnitude) before the matrix is rejected.
pub(crate) const PSD_TOLERANCE: f64 = 1e-8;

/// Stack-allocated vector of dimension `R`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmallVec<const R: usize> {
    pub(crate) data: [f64; R],
}

/// Stack-allocated R x R matrix stored in column-major order.
///
/// `cols[c][r]` = element at row r, column c.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmallMat<const R: usize> {
    pub(crate) cols: [[f64; R]; R],
}

/// Kinematic state `(position, velocity, acceleration)`.
pub type StateVector = SmallVec<3>;

/// Covariance of a [`StateVector`].
pub type StateCovariance = SmallMat<3>;

impl<const R: usize> SmallVec<R> {
    /// Creates a vector from its components.
    pub fn new(data: [f64; R]) -> Self {
        Self { data }
    }

    /// Returns a zero-initialized vector.
    #[inline(always)]
    pub fn zeros() -> Self {
        Self { data: [0.0; R] }
    }

    /// Returns the component at `i`.
    #[inline(always)]
    pub fn get(&self, i: usize) -> f64 {
        self.data[i]
    }

    /// Returns the components as an array.
    pub fn to_array(&self) -> [f64; R] {
        self.data
    }

    /// Returns `true` if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Multiplies every component by `s`.
    #[inline(always)]
    pub fn scale(&self, s: f64) -> Self {
        let mut out = *self;
        for x in &mut out.data {
            *x *= s;
        }
        out
    }
}

impl<const R: usize> SmallMat<R> {
    /// Returns a zero-initialized matrix.
    #[inline(always)]
    pub fn zeros() -> Self {
        Self {
            cols: [[0.0; R]; R],
        }
    }

    /// Returns the identity matrix.
    pub fn identity() -> Self {
        let mut m = Self::zeros();
        for i in 0..R {
            m.cols[i][i] = 1.0;
        }
        m
    }

    /// Builds a matrix from row-major nested arrays.
    pub fn from_rows(rows: [[f64; R]; R]) -> Self {
        let mut m = Self::zeros();
        for (r, row) in rows.iter().enumerate() {
            for (c, &val) in row.iter().enumerate() {
                m.set(r, c, val);
            }
        }
        m
    }

    /// Builds a diagonal matrix.
    pub fn from_diagonal(diag: [f64; R]) -> Self {
        let mut m = Self::zeros();
        for (i, &val) in diag.iter().enumerate() {
            m.cols[i][i] = val;
        }
        m
    }

    /// Returns the outer product `u * vᵀ`.
    pub fn outer(u: &SmallVec<R>, v: &SmallVec<R>) -> Self {
        let mut m = Self::zeros();
        for c in 0..R {
            for r in 0..R {
                m.cols[c][r] = u.data[r] * v.data[c];
            }
        }
        m
    }

    /// Returns the element at `(row, col)`.
    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cols[col][row]
    }

    /// Sets the element at `(row, col)` to `val`.
    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, val: f64) {
        self.cols[col][row] = val;
    }

    /// Returns column `col` as a vector.
    #[inline(always)]
    pub fn column(&self, col: usize) -> SmallVec<R> {
        SmallVec {
            data: self.cols[col],
        }
    }

    /// Returns the rows as row-major nested arrays.
    pub fn to_rows(&self) -> [[f64; R]; R] {
        let mut rows = [[0.0; R]; R];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, val) in row.iter_mut().enumerate() {
                *val = self.get(r, c);
            }
        }
        rows
    }

    /// Returns the main diagonal.
    pub fn diagonal(&self) -> SmallVec<R> {
        let mut d = SmallVec::zeros();
        for i in 0..R {
            d.data[i] = self.cols[i][i];
        }
        d
    }

    /// Sum of the diagonal elements.
    pub fn trace(&self) -> f64 {
        (0..R).map(|i| self.cols[i][i]).sum()
    }

    /// Returns the transpose.
    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros();
        for c in 0..R {
            for r in 0..R {
                t.cols[r][c] = self.cols[c][r];
            }
        }
        t
    }

    /// Returns `(self + selfᵀ) / 2`, exactly symmetric.
    pub fn symmetrized(&self) -> Self {
        let mut s = *self;
        for c in 0..R {
            for r in (c + 1)..R {
                let avg = 0.5 * (self.get(r, c) + self.get(c, r));
                s.set(r, c, avg);
                s.set(c, r, avg);
            }
        }
        s
    }

    /// Multiplies every element by `s`.
    pub fn scale(&self, s: f64) -> Self {
        let mut out = *self;
        for col in &mut out.cols {
            for x in col.iter_mut() {
                *x *= s;
            }
        }
        out
    }

    /// Returns `true` if every element is finite.
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|x| x.is_finite())
    }

    /// Largest absolute element, used to scale numerical tolerances.
    pub(crate) fn max_abs(&self) -> f64 {
        self.cols
            .iter()
            .flatten()
            .fold(0.0_f64, |acc, x| acc.max(x.abs()))
    }

    /// Computes the matrix-vector product `self * v`.
    #[inline(always)]
    pub fn mul_vec(&self, v: &SmallVec<R>) -> SmallVec<R> {
        let mut result = SmallVec::zeros();
        for i in 0..R {
            let mut sum = 0.0;
            for k in 0..R {
                sum += self.get(i, k) * v.data[k];
            }
            result.data[i] = sum;
        }
        result
    }

    /// Computes the matrix product `self * other`.
    #[inline(always)]
    pub fn mul_mat(&self, other: &Self) -> Self {
        let mut result = Self::zeros();
        for c in 0..R {
            result.cols[c] = self.mul_vec(&other.column(c)).data;
        }
        result
    }

    /// Computes `self * p * selfᵀ`, the covariance propagation through `self`.
    pub fn sandwich(&self, p: &Self) -> Self {
        self.mul_mat(p).mul_mat(&self.transpose())
    }

    /// Raises every diagonal element to at least `floor`.
    pub(crate) fn with_diagonal_floor(&self, floor: f64) -> Self {
        let mut m = *self;
        for i in 0..R {
            if m.cols[i][i] < floor {
                m.cols[i][i] = floor;
            }
        }
        m
    }
}

impl SmallMat<3> {
    /// Determinant via cofactor expansion along the first row.
    pub fn determinant(&self) -> f64 {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.to_rows();
        a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g)
    }

    /// Closed-form inverse via the adjugate.
    ///
    /// Returns `None` when the determinant is zero, underflows, or the
    /// result is not finite.
    pub fn inverse(&self) -> Option<Self> {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.to_rows();

        let co_a = e * i - f * h;
        let co_b = -(d * i - f * g);
        let co_c = d * h - e * g;
        let det = a * co_a + b * co_b + c * co_c;
        if !det.is_finite() || det.abs() < f64::MIN_POSITIVE {
            return None;
        }

        let co_d = -(b * i - c * h);
        let co_e = a * i - c * g;
        let co_f = -(a * h - b * g);
        let co_g = b * f - c * e;
        let co_h = -(a * f - c * d);
        let co_i = a * e - b * d;

        let inv = Self::from_rows([
            [co_a, co_d, co_g],
            [co_b, co_e, co_h],
            [co_c, co_f, co_i],
        ])
        .scale(1.0 / det);
        inv.is_finite().then_some(inv)
    }

    /// Tests positive semi-definiteness through the principal minors.
    ///
    /// A symmetric matrix is PSD iff every principal minor is non-negative.
    /// Each minor of order k may fall `PSD_TOLERANCE * scale^k` below zero
    /// to absorb round-off, where `scale` is the largest absolute element.
    pub fn is_positive_semidefinite(&self) -> bool {
        if !self.is_finite() {
            return false;
        }
        let scale = self.max_abs();
        if scale == 0.0 {
            return true;
        }
        let tol1 = PSD_TOLERANCE * scale;
        let tol2 = tol1 * scale;
        let tol3 = tol2 * scale;

        let m = |r, c| self.get(r, c);
        if (0..3).any(|i| m(i, i) < -tol1) {
            return false;
        }
        for (i, j) in [(0, 1), (0, 2), (1, 2)] {
            if (m(i, j) - m(j, i)).abs() > tol1 {
                return false;
            }
            if m(i, i) * m(j, j) - m(i, j) * m(j, i) < -tol2 {
                return false;
            }
        }
        self.determinant() >= -tol3
    }
}

impl<const R: usize> Add for SmallVec<R> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        for (x, y) in self.data.iter_mut().zip(rhs.data) {
            *x += y;
        }
        self
    }
}

impl<const R: usize> Sub for SmallVec<R> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        for (x, y) in self.data.iter_mut().zip(rhs.data) {
            *x -= y;
        }
        self
    }
}

impl<const R: usize> Add for SmallMat<R> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        for (col, rcol) in self.cols.iter_mut().zip(rhs.cols) {
            for (x, y) in col.iter_mut().zip(rcol) {
                *x += y;
            }
        }
        self
    }
}

impl<const R: usize> Sub for SmallMat<R> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        for (col, rcol) in self.cols.iter_mut().zip(rhs.cols) {
            for (x, y) in col.iter_mut().zip(rcol) {
                *x -= y;
            }
        }
        self
    }
}

impl<const R: usize> Mul<SmallVec<R>> for SmallMat<R> {
    type Output = SmallVec<R>;

    fn mul(self, rhs: SmallVec<R>) -> SmallVec<R> {
        self.mul_vec(&rhs)
    }
}

impl<const R: usize> Mul for SmallMat<R> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.mul_mat(&rhs)
    }
}

impl<const R: usize> Index<usize> for SmallVec<R> {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.data[i]
    }
}

impl<const R: usize> Index<(usize, usize)> for SmallMat<R> {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.cols[col][row]
    }
}
