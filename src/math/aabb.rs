use crate::math::{Vector3, Matrix4};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Axis-Aligned Bounding Box (AABB)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner of the AABB
    pub min: Vector3,

    /// Maximum corner of the AABB
    pub max: Vector3,
}

impl Aabb {
    /// Creates a new AABB from minimum and maximum points
    #[inline]
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Creates an AABB centered at a position with the given half extents
    #[inline]
    pub fn from_center_half_extents(center: Vector3, half_extents: Vector3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Creates an AABB from a set of points
    pub fn from_points(points: &[Vector3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;

        let mut aabb = Self::new(*first, *first);
        for point in rest {
            aabb.expand_to_include_point(*point);
        }

        Some(aabb)
    }

    /// Returns the center of the AABB
    #[inline]
    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the extents of the AABB in each dimension
    #[inline]
    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }

    /// Returns half the extents of the AABB in each dimension
    #[inline]
    pub fn half_extents(&self) -> Vector3 {
        self.extents() * 0.5
    }

    /// Returns the volume of the AABB
    #[inline]
    pub fn volume(&self) -> f32 {
        let extents = self.extents();
        extents.x * extents.y * extents.z
    }

    /// Returns the 8 corners of the box
    pub fn corners(&self) -> [Vector3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vector3::new(lo.x, lo.y, lo.z),
            Vector3::new(hi.x, lo.y, lo.z),
            Vector3::new(lo.x, hi.y, lo.z),
            Vector3::new(hi.x, hi.y, lo.z),
            Vector3::new(lo.x, lo.y, hi.z),
            Vector3::new(hi.x, lo.y, hi.z),
            Vector3::new(lo.x, hi.y, hi.z),
            Vector3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Checks if this AABB contains a point
    #[inline]
    pub fn contains_point(&self, point: Vector3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Checks if this AABB fully contains another AABB
    #[inline]
    pub fn contains_aabb(&self, other: &Self) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x &&
        self.min.y <= other.min.y && self.max.y >= other.max.y &&
        self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    /// Checks if this AABB intersects with another AABB
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Returns the union of this AABB with another
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(&other.min), self.max.max(&other.max))
    }

    /// Expands this AABB to include a point
    #[inline]
    pub fn expand_to_include_point(&mut self, point: Vector3) {
        self.min = self.min.min(&point);
        self.max = self.max.max(&point);
    }

    /// Expands this AABB by a margin in all directions
    #[inline]
    pub fn expand(&self, margin: f32) -> Self {
        let margin_vec = Vector3::replicate(margin);
        Self::new(self.min - margin_vec, self.max + margin_vec)
    }

    /// Scales the box by a (possibly negative) per-axis scale
    #[inline]
    pub fn scaled(&self, scale: Vector3) -> Self {
        let a = self.min.component_mul(&scale);
        let b = self.max.component_mul(&scale);
        Self::new(a.min(&b), a.max(&b))
    }

    /// Transforms the box by an affine matrix and returns the box enclosing the result.
    ///
    /// The result encloses every transformed point of the input but is not tight for rotations.
    pub fn transformed(&self, matrix: &Matrix4) -> Self {
        // Arvo: start with the translation and accumulate the extremes of every 3x3 element
        let translation = matrix.translation();
        let mut new_min = translation;
        let mut new_max = translation;

        for c in 0..3 {
            let column = matrix.axis(c);
            let a = column * self.min[c];
            let b = column * self.max[c];

            new_min += a.min(&b);
            new_max += a.max(&b);
        }

        Self::new(new_min, new_max)
    }

    /// Returns the closest point on the AABB to a given point
    pub fn closest_point(&self, point: Vector3) -> Vector3 {
        point.max(&self.min).min(&self.max)
    }

    /// Returns the squared distance from a point to the AABB
    #[inline]
    pub fn squared_distance_to_point(&self, point: Vector3) -> f32 {
        let closest = self.closest_point(point);
        (closest - point).length_squared()
    }
}
