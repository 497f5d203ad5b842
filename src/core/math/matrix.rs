use super::MathError;
use super::vector::{Vector3, Vector4};
use std::ops::Mul;

/// Smallest `|det|` relative to its Hadamard bound that still counts as invertible.
const SINGULAR_EPSILON: f64 = 1e-7;

/// 4x4 single-precision matrix stored column-major (`cols[c][r]`).
///
/// The memory layout matches glm and OpenGL, so a column vector is
/// transformed by multiplying on the right: `M·v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    cols: [[f32; 4]; 4],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4 {
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self::from_cols([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    pub const fn zeros() -> Self {
        Self::from_cols([[0.0; 4]; 4])
    }

    pub const fn from_cols(cols: [[f32; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Builds a matrix from rows as written on paper.
    pub fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self::from_cols(rows).transpose()
    }

    /// Reads 16 floats in column-major order.
    pub fn from_column_slice(data: &[f32; 16]) -> Self {
        let mut cols = [[0.0; 4]; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            col.copy_from_slice(&data[c * 4..c * 4 + 4]);
        }
        Self { cols }
    }

    /// Flattens to 16 floats in column-major order.
    pub fn to_column_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (c, col) in self.cols.iter().enumerate() {
            out[c * 4..c * 4 + 4].copy_from_slice(col);
        }
        out
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.cols[col][row]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.cols[col][row] = value;
    }

    #[inline]
    pub fn column(&self, c: usize) -> Vector4 {
        Vector4::from_array(self.cols[c])
    }

    #[inline]
    pub fn row(&self, r: usize) -> Vector4 {
        Vector4::new(
            self.cols[0][r],
            self.cols[1][r],
            self.cols[2][r],
            self.cols[3][r],
        )
    }

    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros();
        for c in 0..4 {
            for r in 0..4 {
                out.cols[r][c] = self.cols[c][r];
            }
        }
        out
    }

    pub fn mul_matrix(&self, rhs: &Self) -> Self {
        let mut out = Self::zeros();
        for c in 0..4 {
            out.cols[c] = self.mul_vector(rhs.column(c)).to_array();
        }
        out
    }

    #[inline]
    pub fn mul_vector(&self, v: Vector4) -> Vector4 {
        self.column(0) * v.x + self.column(1) * v.y + self.column(2) * v.z + self.column(3) * v.w
    }

    /// Transforms a point (`w = 1`) and divides by the resulting `w` when it is not zero.
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        let h = self.mul_vector(p.to_point());
        if h.w.abs() > f32::EPSILON && h.w != 1.0 {
            h.xyz() / h.w
        } else {
            h.xyz()
        }
    }

    /// Transforms a direction (`w = 0`), ignoring translation.
    #[inline]
    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        self.mul_vector(v.to_direction()).xyz()
    }

    /// Tightest Hadamard bound on `|det|`: the smaller of the products of
    /// row norms and of column norms. Translation only lengthens one column,
    /// so affine transforms keep a bound comparable to their determinant.
    fn hadamard_bound(&self) -> f64 {
        let norm = |v: [f32; 4]| v.iter().map(|&x| f64::from(x).powi(2)).sum::<f64>().sqrt();
        let by_cols: f64 = self.cols.iter().map(|&c| norm(c)).product();
        let by_rows: f64 = (0..4)
            .map(|r| norm([self.cols[0][r], self.cols[1][r], self.cols[2][r], self.cols[3][r]]))
            .product();
        by_cols.min(by_rows)
    }

    /// Returns the 2x2 sub-determinants shared by `determinant` and `invert`.
    #[inline]
    fn minors(&self) -> ([f32; 6], [f32; 6]) {
        let a = |r: usize, c: usize| self.get(r, c);

        let s = [
            a(0, 0) * a(1, 1) - a(1, 0) * a(0, 1),
            a(0, 0) * a(1, 2) - a(1, 0) * a(0, 2),
            a(0, 0) * a(1, 3) - a(1, 0) * a(0, 3),
            a(0, 1) * a(1, 2) - a(1, 1) * a(0, 2),
            a(0, 1) * a(1, 3) - a(1, 1) * a(0, 3),
            a(0, 2) * a(1, 3) - a(1, 2) * a(0, 3),
        ];
        let c = [
            a(2, 0) * a(3, 1) - a(3, 0) * a(2, 1),
            a(2, 0) * a(3, 2) - a(3, 0) * a(2, 2),
            a(2, 0) * a(3, 3) - a(3, 0) * a(2, 3),
            a(2, 1) * a(3, 2) - a(3, 1) * a(2, 2),
            a(2, 1) * a(3, 3) - a(3, 1) * a(2, 3),
            a(2, 2) * a(3, 3) - a(3, 2) * a(2, 3),
        ];
        (s, c)
    }

    pub fn determinant(&self) -> f32 {
        let (s, c) = self.minors();
        s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0]
    }

    /// General inverse through the adjugate (cofactor) matrix.
    ///
    /// Fails with [`MathError::SingularMatrix`] when the determinant is not
    /// finite or vanishes relative to the row and column norms. Uniformly
    /// tiny or far-translated transforms still invert.
    pub fn invert(&self) -> Result<Self, MathError> {
        let bound = self.hadamard_bound();
        if bound == 0.0 || !bound.is_finite() {
            return Err(MathError::SingularMatrix);
        }

        let (s, c) = self.minors();
        let det = s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0];
        if !det.is_finite() || f64::from(det.abs()) <= SINGULAR_EPSILON * bound {
            return Err(MathError::SingularMatrix);
        }
        let inv_det = 1.0 / det;
        let a = |r: usize, col: usize| self.get(r, col);

        #[rustfmt::skip]
        let rows = [
            [
                 a(1, 1) * c[5] - a(1, 2) * c[4] + a(1, 3) * c[3],
                -a(0, 1) * c[5] + a(0, 2) * c[4] - a(0, 3) * c[3],
                 a(3, 1) * s[5] - a(3, 2) * s[4] + a(3, 3) * s[3],
                -a(2, 1) * s[5] + a(2, 2) * s[4] - a(2, 3) * s[3],
            ],
            [
                -a(1, 0) * c[5] + a(1, 2) * c[2] - a(1, 3) * c[1],
                 a(0, 0) * c[5] - a(0, 2) * c[2] + a(0, 3) * c[1],
                -a(3, 0) * s[5] + a(3, 2) * s[2] - a(3, 3) * s[1],
                 a(2, 0) * s[5] - a(2, 2) * s[2] + a(2, 3) * s[1],
            ],
            [
                 a(1, 0) * c[4] - a(1, 1) * c[2] + a(1, 3) * c[0],
                -a(0, 0) * c[4] + a(0, 1) * c[2] - a(0, 3) * c[0],
                 a(3, 0) * s[4] - a(3, 1) * s[2] + a(3, 3) * s[0],
                -a(2, 0) * s[4] + a(2, 1) * s[2] - a(2, 3) * s[0],
            ],
            [
                -a(1, 0) * c[3] + a(1, 1) * c[1] - a(1, 2) * c[0],
                 a(0, 0) * c[3] - a(0, 1) * c[1] + a(0, 2) * c[0],
                -a(3, 0) * s[3] + a(3, 1) * s[1] - a(3, 2) * s[0],
                 a(2, 0) * s[3] - a(2, 1) * s[1] + a(2, 2) * s[0],
            ],
        ];

        let mut out = Self::from_rows(rows);
        for col in out.cols.iter_mut() {
            for v in col.iter_mut() {
                *v *= inv_det;
            }
        }
        Ok(out)
    }

    /// Inverse-transpose, used to carry normals through a model transform.
    pub fn normal_matrix(&self) -> Result<Self, MathError> {
        Ok(self.invert()?.transpose())
    }

    pub fn approx_eq(&self, other: &Self, eps: f32) -> bool {
        self.cols
            .iter()
            .flatten()
            .zip(other.cols.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        self.mul_matrix(&rhs)
    }
}

impl Mul<Vector4> for Matrix4 {
    type Output = Vector4;

    fn mul(self, rhs: Vector4) -> Vector4 {
        self.mul_vector(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    fn sample() -> Matrix4 {
        Matrix4::from_rows([
            [2.0, 0.5, 0.0, 1.0],
            [0.0, 3.0, 1.0, -2.0],
            [1.0, 0.0, 4.0, 0.5],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    #[test]
    fn from_rows_is_column_major() {
        let m = sample();
        assert_eq!(m.get(0, 3), 1.0);
        assert_eq!(m.column(3), Vector4::new(1.0, -2.0, 0.5, 1.0));
        assert_eq!(m.to_column_array()[12], 1.0);
    }

    #[test]
    fn identity_is_neutral_for_multiplication() {
        let m = sample();
        assert_eq!(m * Matrix4::identity(), m);
        assert_eq!(Matrix4::identity() * m, m);
    }

    #[test]
    fn multiplication_applies_right_operand_first() {
        let scale = Matrix4::from_rows([
            [2.0, 0.0, 0.0, 0.0],
            [0.0, 2.0, 0.0, 0.0],
            [0.0, 0.0, 2.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let translate = Matrix4::from_rows([
            [1.0, 0.0, 0.0, 5.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let p = Vector4::new(1.0, 0.0, 0.0, 1.0);
        // scale then translate
        assert_eq!((translate * scale) * p, Vector4::new(7.0, 0.0, 0.0, 1.0));
        // translate then scale
        assert_eq!((scale * translate) * p, Vector4::new(12.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn invert_round_trips() {
        let m = sample();
        let inv = m.invert().unwrap();
        assert!((m * inv).approx_eq(&Matrix4::identity(), 1e-5));
        assert!((inv * m).approx_eq(&Matrix4::identity(), 1e-5));
        assert!(inv.invert().unwrap().approx_eq(&m, 1e-4));
    }

    #[test]
    fn determinant_of_identity_and_scale() {
        assert_eq!(Matrix4::identity().determinant(), 1.0);
        let m = Matrix4::from_rows([
            [2.0, 0.0, 0.0, 0.0],
            [0.0, 3.0, 0.0, 0.0],
            [0.0, 0.0, 4.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert_eq!(m.determinant(), 24.0);
    }

    #[test]
    fn invert_rejects_singular() {
        assert_eq!(Matrix4::zeros().invert(), Err(MathError::SingularMatrix));

        let dependent_rows = Matrix4::from_rows([
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ]);
        assert_eq!(dependent_rows.invert(), Err(MathError::SingularMatrix));

        let flattened = Matrix4::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert!(flattened.invert().is_err());
    }

    #[test]
    fn invert_accepts_small_and_far_transforms() {
        let tiny = Matrix4::from_rows([
            [0.001, 0.0, 0.0, 0.0],
            [0.0, 0.001, 0.0, 0.0],
            [0.0, 0.0, 0.001, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let inv = tiny.invert().unwrap();
        assert!((inv.get(0, 0) - 1000.0).abs() < 1e-2);
        assert!((tiny * inv).approx_eq(&Matrix4::identity(), 1e-5));

        // a small piece far out on the board
        let far = Matrix4::from_rows([
            [0.04, 0.0, 0.0, 10.5],
            [0.0, 0.04, 0.0, 0.0],
            [0.0, 0.0, 0.04, 10.5],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let inv = far.invert().unwrap();
        assert!((far * inv).approx_eq(&Matrix4::identity(), 1e-4));

        let shifted = Matrix4::from_rows([
            [0.2, 0.0, 0.0, 50.0],
            [0.0, 0.2, 0.0, 0.0],
            [0.0, 0.0, 0.2, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let p = shifted.invert().unwrap() * Vector4::new(50.2, 0.0, 0.0, 1.0);
        assert!((p.x - 1.0).abs() < 1e-3, "{p:?}");
    }

    #[test]
    fn invert_rejects_non_finite() {
        let mut m = Matrix4::identity();
        m.set(1, 2, f32::NAN);
        assert!(m.invert().is_err());
    }

    #[test]
    fn normal_matrix_of_uniform_scale_is_scaled_identity() {
        let m = Matrix4::from_rows([
            [2.0, 0.0, 0.0, 3.0],
            [0.0, 2.0, 0.0, -1.0],
            [0.0, 0.0, 2.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let n = m.normal_matrix().unwrap();
        let v = n.transform_vector(Vector3::new(0.0, 1.0, 0.0));
        assert!((v - Vector3::new(0.0, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn transform_point_divides_by_w() {
        let mut m = Matrix4::identity();
        m.set(3, 3, 2.0);
        let p = m.transform_point(Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(p, Vector3::new(1.0, 2.0, 3.0));
    }
}
