use crate::collision::gjk::{Simplex, SupportMap, GJK};
use crate::math::Vector3;

/// Expanding Polytope Algorithm (EPA) for computing penetration depth
pub struct EPA;

/// Maximum number of iterations for the EPA algorithm
const MAX_ITERATIONS: usize = 64;

/// Small value to handle numerical stability issues
const EPSILON: f32 = 1e-6;

/// A face of the polytope
#[derive(Debug, Clone)]
struct Face {
    /// The vertices of the face, counter clockwise seen from outside
    vertices: [usize; 3],

    /// The outward normal of the face
    normal: Vector3,

    /// The distance from the origin to the face
    distance: f32,
}

impl EPA {
    /// Computes the penetration depth and axis of two convex sets whose Minkowski
    /// difference contains the origin. The axis is the direction to move `b` out of `a`.
    pub fn penetration_depth(
        simplex: &Simplex,
        a: &dyn SupportMap,
        b: &dyn SupportMap,
        tolerance: f32,
    ) -> Option<(f32, Vector3)> {
        let mut vertices = simplex.points().to_vec();
        if !Self::expand_simplex_to_tetrahedron(&mut vertices, a, b) {
            return None;
        }

        let mut faces = Vec::new();
        Self::add_face(&vertices, &mut faces, 0, 1, 2);
        Self::add_face(&vertices, &mut faces, 0, 3, 1);
        Self::add_face(&vertices, &mut faces, 0, 2, 3);
        Self::add_face(&vertices, &mut faces, 1, 3, 2);

        for _ in 0..MAX_ITERATIONS {
            let closest = Self::find_closest_face(&faces)?.clone();

            let support = GJK::support(a, b, closest.normal);
            if support.dot(&closest.normal) - closest.distance < tolerance {
                return Some((closest.distance, closest.normal));
            }

            vertices.push(support);
            let new_vertex = vertices.len() - 1;

            // Remove faces that can see the new point, keeping their boundary
            let mut edges = Vec::new();
            let mut i = 0;
            while i < faces.len() {
                let face = &faces[i];
                if (support - vertices[face.vertices[0]]).dot(&face.normal) > 0.0 {
                    let [v0, v1, v2] = face.vertices;
                    Self::add_edge(&mut edges, v0, v1);
                    Self::add_edge(&mut edges, v1, v2);
                    Self::add_edge(&mut edges, v2, v0);
                    faces.swap_remove(i);
                } else {
                    i += 1;
                }
            }

            if edges.is_empty() {
                break;
            }

            for (from, to) in edges {
                Self::add_face(&vertices, &mut faces, from, to, new_vertex);
            }
        }

        // Did not converge, return the best estimate
        Self::find_closest_face(&faces).map(|face| (face.distance, face.normal))
    }

    /// Adds support points until the polytope is a non degenerate tetrahedron
    fn expand_simplex_to_tetrahedron(vertices: &mut Vec<Vector3>, a: &dyn SupportMap, b: &dyn SupportMap) -> bool {
        const DIRECTIONS: [Vector3; 6] = [
            Vector3 { x: 1.0, y: 0.0, z: 0.0 },
            Vector3 { x: -1.0, y: 0.0, z: 0.0 },
            Vector3 { x: 0.0, y: 1.0, z: 0.0 },
            Vector3 { x: 0.0, y: -1.0, z: 0.0 },
            Vector3 { x: 0.0, y: 0.0, z: 1.0 },
            Vector3 { x: 0.0, y: 0.0, z: -1.0 },
        ];

        let mut independent: Vec<Vector3> = Vec::with_capacity(4);
        let candidates = vertices
            .clone()
            .into_iter()
            .chain(DIRECTIONS.iter().map(|d| GJK::support(a, b, *d)));

        for point in candidates {
            if independent.len() == 4 {
                break;
            }
            if Self::is_independent(&independent, point) {
                independent.push(point);
            }
        }

        *vertices = independent;
        vertices.len() == 4
    }

    /// Returns true if `point` is not in the affine hull of `points`
    fn is_independent(points: &[Vector3], point: Vector3) -> bool {
        match points {
            [] => true,
            [a] => (point - *a).length_squared() > EPSILON,
            [a, b] => (*b - *a).cross(&(point - *a)).length_squared() > EPSILON,
            [a, b, c, ..] => (*b - *a).cross(&(*c - *a)).dot(&(point - *a)).abs() > EPSILON,
        }
    }

    /// Adds a face to the polytope with its normal pointing away from the origin
    fn add_face(vertices: &[Vector3], faces: &mut Vec<Face>, a: usize, b: usize, c: usize) {
        let ab = vertices[b] - vertices[a];
        let ac = vertices[c] - vertices[a];
        let cross = ab.cross(&ac);

        // Skip degenerate faces
        if cross.length_squared() < 1e-12 {
            return;
        }

        let normal = cross.normalize();
        let distance = normal.dot(&vertices[a]);

        if distance < 0.0 {
            faces.push(Face {
                vertices: [a, c, b],
                normal: -normal,
                distance: -distance,
            });
        } else {
            faces.push(Face {
                vertices: [a, b, c],
                normal,
                distance,
            });
        }
    }

    /// Finds the face closest to the origin
    fn find_closest_face(faces: &[Face]) -> Option<&Face> {
        faces.iter().min_by(|x, y| x.distance.total_cmp(&y.distance))
    }

    /// Adds a directed edge to the horizon, cancelling it against its reverse
    fn add_edge(edges: &mut Vec<(usize, usize)>, a: usize, b: usize) {
        if let Some(idx) = edges.iter().position(|&(x, y)| x == b && y == a) {
            edges.swap_remove(idx);
        } else {
            edges.push((a, b));
        }
    }
}
