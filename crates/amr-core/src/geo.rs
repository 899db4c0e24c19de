//! Planar vector algebra in layout units (millimetres).
//!
//! Positions carry a `z` component so carried items and conveyor surfaces
//! can be lifted visually, but every distance, direction, and containment
//! test in the simulator is planar: `z` is ignored.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A 3D point or vector.  Only `x`/`y` take part in geometry queries.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A point on the floor plane.
    #[inline]
    pub const fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Unit direction for a heading angle in degrees (0° = +x, CCW positive).
    #[inline]
    pub fn from_heading_deg(deg: f64) -> Self {
        let rad = deg.to_radians();
        Self::planar(rad.cos(), rad.sin())
    }

    /// Heading angle in degrees of the planar part of this vector.
    #[inline]
    pub fn heading_deg(self) -> f64 {
        self.y.atan2(self.x).to_degrees()
    }

    #[inline]
    pub fn planar_length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn planar_distance(self, other: Vec3) -> f64 {
        (self - other).planar_length()
    }

    /// Planar unit vector.  The zero vector normalizes to zero.
    #[inline]
    pub fn normalize(self) -> Vec3 {
        let len = self.planar_length();
        if len > 0.0 {
            Vec3::planar(self.x / len, self.y / len)
        } else {
            Vec3::ZERO
        }
    }

    #[inline]
    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the planar cross product `self × other`.
    #[inline]
    pub fn cross(self, other: Vec3) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Left-hand perpendicular `(-y, x)`.
    #[inline]
    pub fn perp(self) -> Vec3 {
        Vec3::planar(-self.y, self.x)
    }

    /// Copy of `self` with `z` replaced.
    #[inline]
    pub fn with_z(self, z: f64) -> Vec3 {
        Vec3 { z, ..self }
    }

    #[inline]
    pub fn lerp(self, to: Vec3, t: f64) -> Vec3 {
        self + (to - self) * t
    }

    /// Midpoint of `self` and `other`.
    #[inline]
    pub fn midpoint(self, other: Vec3) -> Vec3 {
        self.lerp(other, 0.5)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, k: f64) -> Vec3 {
        Vec3::new(self.x * k, self.y * k, self.z * k)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.0}, {:.0}, {:.0})", self.x, self.y, self.z)
    }
}

// ── Point-set queries ─────────────────────────────────────────────────────────

/// The point in `points` closest to `target`.  Earlier points win ties.
pub fn nearest_point(points: &[Vec3], target: Vec3) -> Option<Vec3> {
    let mut best: Option<(f64, Vec3)> = None;
    for &p in points {
        let d = p.planar_distance(target);
        if best.is_none_or(|(bd, _)| d < bd) {
            best = Some((d, p));
        }
    }
    best.map(|(_, p)| p)
}

/// The pair `(a, b)` with `a ∈ from` and `b ∈ to` at minimum distance.
/// Earlier pairs (row-major over `from`, then `to`) win ties.
pub fn closest_pair(from: &[Vec3], to: &[Vec3]) -> Option<(Vec3, Vec3)> {
    let mut best: Option<(f64, Vec3, Vec3)> = None;
    for &a in from {
        for &b in to {
            let d = a.planar_distance(b);
            if best.is_none_or(|(bd, _, _)| d < bd) {
                best = Some((d, a, b));
            }
        }
    }
    best.map(|(_, a, b)| (a, b))
}
