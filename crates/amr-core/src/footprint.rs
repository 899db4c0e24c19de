//! Oriented rectangular footprints of pathways, idle locations, and conveyors.
//!
//! A footprint is anchored at the segment's world position and extends
//! `length_back` against its direction and `length_front` along it.  The two
//! widths describe the near and far ends; the rectangle uses the wider one.

use crate::Vec3;

/// Width substituted when a footprint reports a zero width.
pub const DEFAULT_WIDTH: f64 = 1000.0;

/// How many samples to take along each side when walking a footprint's edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoundaryDensity {
    /// Points per long side (inclusive of both corners).
    pub long_side:  usize,
    /// Points per short side (inclusive of both corners).
    pub short_side: usize,
}

impl BoundaryDensity {
    pub const DEFAULT: BoundaryDensity = BoundaryDensity { long_side: 6, short_side: 4 };
}

impl Default for BoundaryDensity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Footprint {
    pub center:       Vec3,
    /// Planar unit vector along the footprint's long axis.
    pub direction:    Vec3,
    pub length_back:  f64,
    pub length_front: f64,
    pub width_near:   f64,
    pub width_far:    f64,
}

impl Footprint {
    /// Build from a heading.  `direction` is normalized; a zero vector falls
    /// back to +x.
    pub fn new(
        center: Vec3,
        direction: Vec3,
        length_back: f64,
        length_front: f64,
        width_near: f64,
        width_far: f64,
    ) -> Self {
        let mut direction = direction.normalize();
        if direction == Vec3::ZERO {
            direction = Vec3::planar(1.0, 0.0);
        }
        Self { center, direction, length_back, length_front, width_near, width_far }
    }

    /// Zero-size footprint at a point, used for the robot's start position.
    pub fn point(center: Vec3) -> Self {
        Self::new(center, Vec3::planar(1.0, 0.0), 0.0, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn start(&self) -> Vec3 {
        self.center - self.direction * self.length_back
    }

    #[inline]
    pub fn end(&self) -> Vec3 {
        self.center + self.direction * self.length_front
    }

    #[inline]
    pub fn total_length(&self) -> f64 {
        self.length_back + self.length_front
    }

    #[inline]
    pub fn perpendicular(&self) -> Vec3 {
        self.direction.perp()
    }

    /// Half the wider end width, or half of [`DEFAULT_WIDTH`] when either
    /// width is zero.
    pub fn half_width(&self) -> f64 {
        if self.width_near > 0.0 && self.width_far > 0.0 {
            self.width_near.max(self.width_far) / 2.0
        } else {
            DEFAULT_WIDTH / 2.0
        }
    }

    /// Sample the rectangle's perimeter: both long sides first, then both
    /// short sides.  Corners appear more than once.
    pub fn boundary_points(&self, density: BoundaryDensity) -> Vec<Vec3> {
        let start = self.start();
        let end = self.end();
        let offset = self.perpendicular() * self.half_width();
        let mut out = Vec::with_capacity(2 * (density.long_side + density.short_side));

        for side in [offset, -offset] {
            push_edge(&mut out, start + side, end + side, density.long_side);
        }
        for cap in [start, end] {
            push_edge(&mut out, cap + offset, cap - offset, density.short_side);
        }
        out
    }

    /// `n` points evenly spaced along the axis from start to end.
    pub fn axis_points(&self, n: usize) -> Vec<Vec3> {
        let mut out = Vec::with_capacity(n);
        push_edge(&mut out, self.start(), self.end(), n);
        out
    }

    /// Planar containment: the point's projection from the start end lies
    /// within the total length and its lateral offset within the half width.
    pub fn contains(&self, p: Vec3) -> bool {
        let rel = p - self.start();
        let along = rel.dot(self.direction);
        let across = rel.dot(self.perpendicular()).abs();
        (0.0..=self.total_length()).contains(&along) && across <= self.half_width()
    }

    /// Whichever axis end (start or end) is closer to `to`.  Start wins ties.
    pub fn nearest_end(&self, to: Vec3) -> Vec3 {
        let (s, e) = (self.start(), self.end());
        if e.planar_distance(to) < s.planar_distance(to) { e } else { s }
    }

    /// Junction between two footprints: midpoint of the closest of the
    /// start/end/center pairings.
    pub fn junction(&self, other: &Footprint) -> Vec3 {
        let pairs = [
            (self.start(), other.start()),
            (self.start(), other.end()),
            (self.end(), other.start()),
            (self.end(), other.end()),
            (self.center, other.center),
        ];
        let mut best = pairs[0];
        let mut best_d = best.0.planar_distance(best.1);
        for &(a, b) in &pairs[1..] {
            let d = a.planar_distance(b);
            if d < best_d {
                best = (a, b);
                best_d = d;
            }
        }
        best.0.midpoint(best.1)
    }
}

fn push_edge(out: &mut Vec<Vec3>, from: Vec3, to: Vec3, n: usize) {
    match n {
        0 => {}
        1 => out.push(from),
        _ => {
            let last = (n - 1) as f64;
            out.extend((0..n).map(|i| from.lerp(to, i as f64 / last)));
        }
    }
}
