use super::MathError;
use std::ops::{Add, AddAssign, Div, Index, Mul, Neg, Sub, SubAssign};

/// Lengths at or below this are treated as zero by `normalize`.
const NORMALIZE_EPSILON: f32 = 1e-8;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn zeros() -> Self {
        Self::new(0.0, 0.0)
    }

    /// 2D cross product (signed parallelogram area).
    #[inline]
    pub fn perp_dot(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn zeros() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub const fn repeat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    pub const fn x_axis() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    pub const fn y_axis() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    pub const fn z_axis() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    pub fn from_array(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Scales the vector to unit length.
    ///
    /// Zero-length and non-finite inputs are rejected instead of producing NaN.
    pub fn normalize(self) -> Result<Self, MathError> {
        let len = self.length();
        if !len.is_finite() || len <= NORMALIZE_EPSILON {
            return Err(MathError::DegenerateVector);
        }
        Ok(self / len)
    }

    /// `sa * self + sb * other`.
    #[inline]
    pub fn combine(self, other: Self, sa: f32, sb: f32) -> Self {
        self * sa + other * sb
    }

    #[inline]
    pub fn component_mul(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }

    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z))
    }

    pub fn max_component(self) -> f32 {
        self.x.max(self.y).max(self.z)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Homogeneous point (`w = 1`).
    #[inline]
    pub fn to_point(self) -> Vector4 {
        Vector4::new(self.x, self.y, self.z, 1.0)
    }

    /// Homogeneous direction (`w = 0`).
    #[inline]
    pub fn to_direction(self) -> Vector4 {
        Vector4::new(self.x, self.y, self.z, 0.0)
    }
}

impl Vector4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub const fn zeros() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn from_array(a: [f32; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    #[inline]
    pub fn xyz(self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }
}

macro_rules! impl_vector_ops {
    ($t:ident { $($f:ident),+ }) => {
        impl Add for $t {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self { $($f: self.$f + rhs.$f),+ }
            }
        }

        impl Sub for $t {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self { $($f: self.$f - rhs.$f),+ }
            }
        }

        impl Mul<f32> for $t {
            type Output = Self;
            #[inline]
            fn mul(self, rhs: f32) -> Self {
                Self { $($f: self.$f * rhs),+ }
            }
        }

        impl Div<f32> for $t {
            type Output = Self;
            #[inline]
            fn div(self, rhs: f32) -> Self {
                Self { $($f: self.$f / rhs),+ }
            }
        }

        impl Neg for $t {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                Self { $($f: -self.$f),+ }
            }
        }

        impl AddAssign for $t {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                $(self.$f += rhs.$f;)+
            }
        }

        impl SubAssign for $t {
            #[inline]
            fn sub_assign(&mut self, rhs: Self) {
                $(self.$f -= rhs.$f;)+
            }
        }
    };
}

impl_vector_ops!(Vector2 { x, y });
impl_vector_ops!(Vector3 { x, y, z });
impl_vector_ops!(Vector4 { x, y, z, w });

impl Index<usize> for Vector3 {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vector3 index out of range: {i}"),
        }
    }
}

impl Index<usize> for Vector4 {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            3 => &self.w,
            _ => panic!("Vector4 index out of range: {i}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_follows_right_hand_rule() {
        let x = Vector3::x_axis();
        let y = Vector3::y_axis();
        assert_eq!(x.cross(y), Vector3::z_axis());
        assert_eq!(y.cross(x), -Vector3::z_axis());
    }

    #[test]
    fn cross_is_orthogonal_to_inputs() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(-2.0, 0.5, 4.0);
        let c = a.cross(b);
        assert!(c.dot(a).abs() < 1e-5);
        assert!(c.dot(b).abs() < 1e-5);
    }

    #[test]
    fn normalize_produces_unit_length() {
        let samples = [
            Vector3::new(3.0, 4.0, 0.0),
            Vector3::new(-0.001, 0.002, 0.0005),
            Vector3::new(1e3, -2e3, 5e2),
        ];
        for v in samples {
            let n = v.normalize().unwrap();
            assert!((n.length() - 1.0).abs() < 1e-5, "{v:?} -> {n:?}");
        }
    }

    #[test]
    fn normalize_rejects_zero_vector() {
        assert_eq!(
            Vector3::zeros().normalize(),
            Err(MathError::DegenerateVector)
        );
        assert_eq!(
            Vector3::new(1e-10, 0.0, 0.0).normalize(),
            Err(MathError::DegenerateVector)
        );
    }

    #[test]
    fn normalize_rejects_non_finite() {
        let v = Vector3::new(f32::NAN, 1.0, 0.0);
        assert!(v.normalize().is_err());
        let v = Vector3::new(f32::INFINITY, 1.0, 0.0);
        assert!(v.normalize().is_err());
    }

    #[test]
    fn vector4_dot_includes_w() {
        let a = Vector4::new(1.0, 2.0, 3.0, 4.0);
        let b = Vector4::new(1.0, 1.0, 1.0, 2.0);
        assert_eq!(a.dot(b), 14.0);
    }
}
