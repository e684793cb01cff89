//! Fixed-size linear algebra for 3-channel color vectors.
//!
//! Everything here is allocation-free: vectors and matrices are plain
//! arrays, and the 3×3 determinant and inverse use closed-form cofactor
//! expansion.

use std::ops::{Add, AddAssign, Div, Index, Mul, Sub};

use image::Rgb;

/// A 3-component real vector in color space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3(pub [f64; 3]);

impl Vec3 {
    pub const ZERO: Self = Self([0.0; 3]);

    #[inline]
    pub const fn new(c0: f64, c1: f64, c2: f64) -> Self {
        Self([c0, c1, c2])
    }

    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.0[0] * other.0[0] + self.0[1] * other.0[1] + self.0[2] * other.0[2]
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Euclidean distance between two colors.
    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).norm()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    /// Outer product `self · otherᵀ`.
    #[inline]
    pub fn outer(self, other: Self) -> Mat3 {
        let mut m = [[0.0; 3]; 3];
        for (y, row) in m.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = self.0[y] * other.0[x];
            }
        }
        Mat3(m)
    }
}

impl Index<usize> for Vec3 {
    type Output = f64;

    #[inline]
    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl From<Rgb<u8>> for Vec3 {
    #[inline]
    fn from(Rgb([r, g, b]): Rgb<u8>) -> Self {
        Self([f64::from(r), f64::from(g), f64::from(b)])
    }
}

impl From<&Rgb<u8>> for Vec3 {
    #[inline]
    fn from(pixel: &Rgb<u8>) -> Self {
        Self::from(*pixel)
    }
}

macro_rules! impl_componentwise {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Vec3 {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: Self) -> Self {
                Self([self.0[0] $op rhs.0[0], self.0[1] $op rhs.0[1], self.0[2] $op rhs.0[2]])
            }
        }
    };
}

macro_rules! impl_scalar {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<f64> for Vec3 {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: f64) -> Self {
                Self([self.0[0] $op rhs, self.0[1] $op rhs, self.0[2] $op rhs])
            }
        }
    };
}

impl_componentwise!(Add, add, +);
impl_componentwise!(Sub, sub, -);
impl_scalar!(Mul, mul, *);
impl_scalar!(Div, div, /);

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// A 3×3 real matrix stored row-major
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mat3(pub [[f64; 3]; 3]);

impl Mat3 {
    pub const ZERO: Self = Self([[0.0; 3]; 3]);

    pub const IDENTITY: Self = Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    #[inline]
    pub fn get(&self, y: usize, x: usize) -> f64 {
        self.0[y][x]
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.0;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Inverse via the adjugate, `None` when the determinant is zero or not finite.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let m = &self.0;
        let cofactor = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };
        // adjugate = transposed cofactor matrix
        let adj = [
            [cofactor(1, 2, 1, 2), -cofactor(0, 2, 1, 2), cofactor(0, 1, 1, 2)],
            [-cofactor(1, 2, 0, 2), cofactor(0, 2, 0, 2), -cofactor(0, 1, 0, 2)],
            [cofactor(1, 2, 0, 1), -cofactor(0, 2, 0, 1), cofactor(0, 1, 0, 1)],
        ];
        Some(Self(adj.map(|row| row.map(|c| c / det))))
    }

    #[inline]
    pub fn mul_vec(&self, v: Vec3) -> Vec3 {
        Vec3(self.0.map(|row| row[0] * v.0[0] + row[1] * v.0[1] + row[2] * v.0[2]))
    }

    /// `vᵀ · self · v`
    #[inline]
    pub fn quadratic_form(&self, v: Vec3) -> f64 {
        v.dot(self.mul_vec(v))
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self(self.0.map(|row| row.map(|c| c * factor)))
    }

    pub fn add_diagonal(&self, value: f64) -> Self {
        let mut m = self.0;
        for (i, row) in m.iter_mut().enumerate() {
            row[i] += value;
        }
        Self(m)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().flatten().all(|c| c.is_finite())
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        (0..3).all(|y| (0..3).all(|x| (self.0[y][x] - self.0[x][y]).abs() <= tolerance))
    }

    /// Copies the upper triangle onto the lower one.
    pub fn mirror_upper(&self) -> Self {
        let mut m = self.0;
        for y in 1..3 {
            for x in 0..y {
                m[y][x] = m[x][y];
            }
        }
        Self(m)
    }
}

impl Add for Mat3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut m = self.0;
        for (row, rhs_row) in m.iter_mut().zip(rhs.0) {
            for (cell, rhs_cell) in row.iter_mut().zip(rhs_row) {
                *cell += rhs_cell;
            }
        }
        Self(m)
    }
}

impl AddAssign for Mat3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
