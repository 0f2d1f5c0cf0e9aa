//! Basic geometric types for content stream interpretation
//!
//! All coordinates are exact decimals so that values read from a content
//! stream survive interpretation unchanged. Arithmetic on them is checked:
//! operands large enough to overflow a [`Decimal`] yield
//! [`PdfError::InvalidStructure`].

use crate::error::{PdfError, Result};
use rust_decimal::Decimal;

fn overflow() -> PdfError {
    PdfError::InvalidStructure("numeric overflow in content stream arithmetic".to_string())
}

pub(crate) fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b).ok_or_else(overflow)
}

pub(crate) fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(overflow)
}

/// `Σ aᵢ·bᵢ + offset`
pub(crate) fn dot(terms: &[(Decimal, Decimal)], offset: Decimal) -> Result<Decimal> {
    terms
        .iter()
        .try_fold(offset, |acc, &(a, b)| checked_add(acc, checked_mul(a, b)?))
}

/// A point in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    /// X coordinate
    pub x: Decimal,
    /// Y coordinate
    pub y: Decimal,
}

impl Point {
    /// Create a new point
    pub fn new(x: Decimal, y: Decimal) -> Self {
        Self { x, y }
    }

    /// Origin point (0, 0)
    pub fn origin() -> Self {
        Self {
            x: Decimal::ZERO,
            y: Decimal::ZERO,
        }
    }
}

/// A straight piece of a path, in user space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

impl LineSegment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Zero-length segment, as left by a moveto.
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

/// Affine transformation `[a b c d e f]`.
///
/// Points are row vectors: `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Matrix(pub [Decimal; 6]);

impl Matrix {
    pub fn identity() -> Self {
        Matrix([
            Decimal::ONE,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ONE,
            Decimal::ZERO,
            Decimal::ZERO,
        ])
    }

    pub fn translation(tx: Decimal, ty: Decimal) -> Self {
        Matrix([
            Decimal::ONE,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ONE,
            tx,
            ty,
        ])
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Ok(Matrix([
            dot(&[(a1, a2), (b1, c2)], Decimal::ZERO)?,
            dot(&[(a1, b2), (b1, d2)], Decimal::ZERO)?,
            dot(&[(c1, a2), (d1, c2)], Decimal::ZERO)?,
            dot(&[(c1, b2), (d1, d2)], Decimal::ZERO)?,
            dot(&[(e1, a2), (f1, c2)], e2)?,
            dot(&[(e1, b2), (f1, d2)], f2)?,
        ]))
    }

    pub fn transform_point(&self, point: Point) -> Result<Point> {
        let [a, b, c, d, e, f] = self.0;
        Ok(Point::new(
            dot(&[(a, point.x), (c, point.y)], e)?,
            dot(&[(b, point.x), (d, point.y)], f)?,
        ))
    }

    pub fn translation_part(&self) -> Point {
        Point::new(self.0[4], self.0[5])
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}
