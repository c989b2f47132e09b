use crate::collision::epa::EPA;
use crate::math::{Matrix4, Vector3};
use crate::shapes::ConvexShape;

/// GJK (Gilbert-Johnson-Keerthi) algorithm for collision detection
pub struct GJK;

/// Maximum number of iterations for the GJK algorithm
const MAX_ITERATIONS: usize = 32;

/// Search directions shorter than this mean the origin lies on the simplex
const MIN_DIRECTION_LENGTH_SQ: f32 = 1.0e-12;

/// Maximum number of iterations when sweeping one set against another
const MAX_CAST_ITERATIONS: usize = 64;

/// Squared distance, relative to the size of the simplex, at which a cast counts as touching
const CAST_TOLERANCE_SQ: f32 = 1.0e-8;

/// Looser tolerance accepted when a cast runs out of iterations
const CAST_FALLBACK_TOLERANCE_SQ: f32 = 1.0e-6;

const BARYCENTRIC_TOLERANCE: f32 = 1.0e-5;

/// Pivots smaller than this, relative to the largest diagonal entry, make a simplex degenerate
const SINGULAR_TOLERANCE: f32 = 1.0e-6;

/// A point set with a support function
pub trait SupportMap {
    /// Furthest point along `direction`
    fn support(&self, direction: Vector3) -> Vector3;
}

/// A convex shape placed by a center of mass transform and scaled in local space
pub struct TransformedConvex<'a> {
    pub shape: &'a dyn ConvexShape,
    pub transform: &'a Matrix4,
    pub scale: Vector3,

    /// Radius added around the shape
    pub margin: f32,
}

impl SupportMap for TransformedConvex<'_> {
    fn support(&self, direction: Vector3) -> Vector3 {
        let local_direction = self.transform.multiply_direction_transposed(direction);
        let point = self.transform.multiply_point(self.shape.scaled_support(local_direction, self.scale));

        if self.margin > 0.0 {
            point + direction.normalized_or(Vector3::zero()) * self.margin
        } else {
            point
        }
    }
}

/// First time of impact found by [`GJK::cast`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    /// Fraction of the cast direction travelled
    pub fraction: f32,

    /// Normal of `b` at the contact, pointing towards `a`. Zero when the sets touch at the start.
    pub normal: Vector3,

    /// Contact point on the moved `a`
    pub point_on_a: Vector3,

    pub point_on_b: Vector3,
}

impl CastHit {
    fn from_simplex(
        fraction: f32,
        direction: Vector3,
        normal: Vector3,
        points: &[(Vector3, Vector3, Vector3)],
        weights: &[f32],
    ) -> Self {
        let mut point_on_a = Vector3::zero();
        let mut point_on_b = Vector3::zero();
        for ((_, b, a), weight) in points.iter().zip(weights) {
            point_on_a += *a * *weight;
            point_on_b += *b * *weight;
        }

        Self {
            fraction,
            normal,
            point_on_a: point_on_a + direction * fraction,
            point_on_b,
        }
    }
}

/// A simplex is a geometric shape: point, line, triangle, or tetrahedron.
///
/// Points are stored newest first.
#[derive(Debug, Clone, Copy)]
pub struct Simplex {
    points: [Vector3; 4],
    size: usize,
}

impl Simplex {
    /// Creates a new empty simplex
    pub fn new() -> Self {
        Self {
            points: [Vector3::zero(); 4],
            size: 0,
        }
    }

    /// Adds a point as the newest point of the simplex
    pub fn push_front(&mut self, point: Vector3) {
        self.points = [point, self.points[0], self.points[1], self.points[2]];
        self.size = (self.size + 1).min(4);
    }

    fn set(&mut self, points: &[Vector3]) {
        self.points[..points.len()].copy_from_slice(points);
        self.size = points.len();
    }

    /// Gets the number of points in the simplex
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gets the points in the simplex, newest first
    pub fn points(&self) -> &[Vector3] {
        &self.points[..self.size]
    }
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new()
    }
}

/// Closest point to the origin on the convex hull of up to four points.
///
/// Also returns the indices of the smallest subset of points spanning it with their barycentric weights.
fn closest_point_to_origin(points: &[Vector3]) -> (Vector3, Vec<(usize, f32)>) {
    let count = points.len();
    let mut best: Option<(f32, Vector3, Vec<(usize, f32)>)> = None;

    for size in 1..=count {
        for mask in 1u32..(1 << count) {
            if mask.count_ones() as usize != size {
                continue;
            }

            let indices: Vec<usize> = (0..count).filter(|i| mask & (1 << i) != 0).collect();
            let Some((point, weights)) = project_origin(points, &indices) else {
                continue;
            };
            if weights.iter().any(|weight| *weight < -BARYCENTRIC_TOLERANCE) {
                continue;
            }

            let distance_sq = point.length_squared();
            if best.as_ref().map_or(true, |(best_sq, ..)| distance_sq < *best_sq * (1.0 - 1.0e-6)) {
                best = Some((distance_sq, point, indices.into_iter().zip(weights).collect()));
            }
        }
    }

    match best {
        Some((_, point, used)) => (point, used),
        None => (points[0], vec![(0, 1.0)]),
    }
}

/// Projects the origin onto the affine hull of the selected points, returning the projection and
/// its barycentric weights. `None` when the points are degenerate.
fn project_origin(points: &[Vector3], indices: &[usize]) -> Option<(Vector3, Vec<f32>)> {
    let origin = points[indices[0]];
    let edges: Vec<Vector3> = indices[1..].iter().map(|i| points[*i] - origin).collect();
    let k = edges.len();

    let mut gram = [[0.0f32; 3]; 3];
    let mut rhs = [0.0f32; 3];
    for i in 0..k {
        for j in 0..k {
            gram[i][j] = edges[i].dot(&edges[j]);
        }
        rhs[i] = -edges[i].dot(&origin);
    }

    let t = solve_linear(gram, rhs, k)?;

    let mut point = origin;
    let mut weights = vec![1.0 - t[..k].iter().sum::<f32>()];
    for (edge, t) in edges.iter().zip(&t[..k]) {
        point += *edge * *t;
        weights.push(*t);
    }
    Some((point, weights))
}

/// Solves the leading `n` by `n` block of `a x = b` by Gaussian elimination with partial pivoting
fn solve_linear(mut a: [[f32; 3]; 3], mut b: [f32; 3], n: usize) -> Option<[f32; 3]> {
    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0, f32::max);

    for column in 0..n {
        let pivot = (column..n).max_by(|i, j| a[*i][column].abs().total_cmp(&a[*j][column].abs()))?;
        if a[pivot][column].abs() <= SINGULAR_TOLERANCE * scale {
            return None;
        }
        a.swap(column, pivot);
        b.swap(column, pivot);

        for row in column + 1..n {
            let factor = a[row][column] / a[column][column];
            for c in column..n {
                a[row][c] -= factor * a[column][c];
            }
            b[row] -= factor * b[column];
        }
    }

    let mut x = [0.0f32; 3];
    for row in (0..n).rev() {
        let sum: f32 = (row + 1..n).map(|c| a[row][c] * x[c]).sum();
        x[row] = (b[row] - sum) / a[row][row];
    }
    Some(x)
}

#[inline]
fn same_direction(a: Vector3, b: Vector3) -> bool {
    a.dot(&b) > 0.0
}

impl GJK {
    /// Support point of the Minkowski difference `a - b`
    pub(crate) fn support(a: &dyn SupportMap, b: &dyn SupportMap, direction: Vector3) -> Vector3 {
        a.support(direction) - b.support(-direction)
    }

    /// Checks if two convex sets overlap, returning the simplex enclosing the origin
    pub fn intersect(a: &dyn SupportMap, b: &dyn SupportMap) -> Option<Simplex> {
        let mut simplex = Simplex::new();

        let support = Self::support(a, b, Vector3::unit_x());
        simplex.push_front(support);
        let mut direction = -support;

        for _ in 0..MAX_ITERATIONS {
            if direction.length_squared() < MIN_DIRECTION_LENGTH_SQ {
                // The origin lies on the simplex: touching
                return Some(simplex);
            }

            let support = Self::support(a, b, direction);
            if support.dot(&direction) < 0.0 {
                return None;
            }

            simplex.push_front(support);

            if Self::next_simplex(&mut simplex, &mut direction) {
                return Some(simplex);
            }
        }

        // Treat a search that does not converge as separated
        None
    }

    /// Penetration depth and axis (direction to move `b` out of `a`) of two overlapping convex sets
    pub fn penetration(a: &dyn SupportMap, b: &dyn SupportMap, tolerance: f32) -> Option<(f32, Vector3)> {
        let simplex = Self::intersect(a, b)?;
        EPA::penetration_depth(&simplex, a, b, tolerance)
    }

    /// Sweeps `a` along `direction` against the fixed set `b`.
    ///
    /// This is a ray cast from the origin along `direction` against the Minkowski difference `b - a`
    /// (van den Bergen). Returns the first fraction in `[0, 1]` at which the sets touch.
    pub fn cast(a: &dyn SupportMap, b: &dyn SupportMap, direction: Vector3) -> Option<CastHit> {
        let mut fraction = 0.0;
        let mut x = Vector3::zero();
        let mut normal = Vector3::zero();

        // Support points of b - a together with the points of b and a they were made from
        let mut points: Vec<(Vector3, Vector3, Vector3)> = Vec::with_capacity(4);
        let mut weights: Vec<f32> = Vec::new();
        let mut v = x - Self::support(b, a, -direction);

        for _ in 0..MAX_CAST_ITERATIONS {
            let max_length_sq = points.iter().map(|(p, ..)| (x - *p).length_squared()).fold(1.0, f32::max);
            if v.length_squared() <= CAST_TOLERANCE_SQ * max_length_sq {
                return Some(CastHit::from_simplex(fraction, direction, normal, &points, &weights));
            }

            let point_b = b.support(v);
            let point_a = a.support(-v);
            let p = point_b - point_a;
            let w = x - p;

            let v_dot_w = v.dot(&w);
            if v_dot_w > 0.0 {
                let v_dot_r = v.dot(&direction);
                if v_dot_r >= 0.0 {
                    return None;
                }

                fraction -= v_dot_w / v_dot_r;
                if fraction > 1.0 {
                    return None;
                }
                x = direction * fraction;
                normal = v;
            }

            points.push((p, point_b, point_a));
            let offsets: Vec<Vector3> = points.iter().map(|(p, ..)| x - *p).collect();
            let (closest, used) = closest_point_to_origin(&offsets);
            v = closest;
            points = used.iter().map(|(i, _)| points[*i]).collect();
            weights = used.iter().map(|(_, weight)| *weight).collect();
        }

        // Out of iterations, accept the estimate if the ray ended up on the surface
        let max_length_sq = points.iter().map(|(p, ..)| (x - *p).length_squared()).fold(1.0, f32::max);
        (v.length_squared() <= CAST_FALLBACK_TOLERANCE_SQ * max_length_sq)
            .then(|| CastHit::from_simplex(fraction, direction, normal, &points, &weights))
    }

    /// Updates the simplex and search direction, returns true if the simplex contains the origin
    fn next_simplex(simplex: &mut Simplex, direction: &mut Vector3) -> bool {
        match simplex.size() {
            2 => Self::line_case(simplex, direction),
            3 => Self::triangle_case(simplex, direction),
            4 => Self::tetrahedron_case(simplex, direction),
            _ => false,
        }
    }

    fn line_case(simplex: &mut Simplex, direction: &mut Vector3) -> bool {
        let [a, b, ..] = simplex.points;
        let ab = b - a;
        let ao = -a;

        if same_direction(ab, ao) {
            *direction = ab.cross(&ao).cross(&ab);

            // Origin on the segment
            if direction.length_squared() < MIN_DIRECTION_LENGTH_SQ {
                return true;
            }
        } else {
            simplex.set(&[a]);
            *direction = ao;
        }

        false
    }

    fn triangle_case(simplex: &mut Simplex, direction: &mut Vector3) -> bool {
        let [a, b, c, _] = simplex.points;
        let ab = b - a;
        let ac = c - a;
        let ao = -a;
        let abc = ab.cross(&ac);

        if same_direction(abc.cross(&ac), ao) {
            if same_direction(ac, ao) {
                simplex.set(&[a, c]);
                *direction = ac.cross(&ao).cross(&ac);
                return false;
            }

            simplex.set(&[a, b]);
            return Self::line_case(simplex, direction);
        }

        if same_direction(ab.cross(&abc), ao) {
            simplex.set(&[a, b]);
            return Self::line_case(simplex, direction);
        }

        let side = abc.dot(&ao);
        if side.abs() < f32::EPSILON * abc.length() {
            // Origin in the plane of the triangle
            return true;
        }

        if side > 0.0 {
            *direction = abc;
        } else {
            simplex.set(&[a, c, b]);
            *direction = -abc;
        }

        false
    }

    fn tetrahedron_case(simplex: &mut Simplex, direction: &mut Vector3) -> bool {
        let [a, b, c, d] = simplex.points;
        let ab = b - a;
        let ac = c - a;
        let ad = d - a;
        let ao = -a;

        let abc = ab.cross(&ac);
        let acd = ac.cross(&ad);
        let adb = ad.cross(&ab);

        if same_direction(abc, ao) {
            simplex.set(&[a, b, c]);
            return Self::triangle_case(simplex, direction);
        }

        if same_direction(acd, ao) {
            simplex.set(&[a, c, d]);
            return Self::triangle_case(simplex, direction);
        }

        if same_direction(adb, ao) {
            simplex.set(&[a, d, b]);
            return Self::triangle_case(simplex, direction);
        }

        // The origin is inside the tetrahedron
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ball {
        center: Vector3,
        radius: f32,
    }

    impl SupportMap for Ball {
        fn support(&self, direction: Vector3) -> Vector3 {
            self.center + direction.normalized_or(Vector3::unit_x()) * self.radius
        }
    }

    #[test]
    fn detects_overlap_and_separation() {
        let a = Ball { center: Vector3::zero(), radius: 1.0 };
        let near = Ball { center: Vector3::new(1.5, 0.0, 0.0), radius: 1.0 };
        let far = Ball { center: Vector3::new(0.0, 3.0, 0.0), radius: 1.0 };

        assert!(GJK::intersect(&a, &near).is_some());
        assert!(GJK::intersect(&a, &far).is_none());
    }

    #[test]
    fn cast_finds_first_contact() {
        let moving = Ball { center: Vector3::new(-5.0, 0.0, 0.0), radius: 1.0 };
        let target = Ball { center: Vector3::zero(), radius: 1.0 };

        let hit = GJK::cast(&moving, &target, Vector3::new(10.0, 0.0, 0.0)).unwrap();
        assert!((hit.fraction - 0.3).abs() < 1e-3);
        assert!((hit.point_on_b - Vector3::new(-1.0, 0.0, 0.0)).length() < 1e-2);
        assert!(hit.normal.normalize().x < -0.99);

        // Too short to reach the target
        assert!(GJK::cast(&moving, &target, Vector3::new(2.0, 0.0, 0.0)).is_none());

        // Passes above the target
        let above = Ball { center: Vector3::new(-5.0, 3.0, 0.0), radius: 1.0 };
        assert!(GJK::cast(&above, &target, Vector3::new(10.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn cast_starting_in_contact_hits_at_zero() {
        let moving = Ball { center: Vector3::new(0.5, 0.0, 0.0), radius: 1.0 };
        let target = Ball { center: Vector3::zero(), radius: 1.0 };

        let hit = GJK::cast(&moving, &target, Vector3::new(0.0, 4.0, 0.0)).unwrap();
        assert_eq!(hit.fraction, 0.0);
    }

    #[test]
    fn closest_point_on_triangle() {
        let points = [Vector3::new(1.0, -1.0, -1.0), Vector3::new(1.0, 2.0, -1.0), Vector3::new(1.0, -1.0, 2.0)];

        let (closest, used) = closest_point_to_origin(&points);
        assert!((closest - Vector3::new(1.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(used.len(), 3);
        assert!((used.iter().map(|(_, weight)| weight).sum::<f32>() - 1.0).abs() < 1e-5);
    }
}
