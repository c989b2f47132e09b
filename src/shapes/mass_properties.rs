use crate::math::{Matrix3, Vector3};
use nalgebra as na;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Mass and inertia tensor of a shape, relative to its center of mass
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct MassProperties {
    /// Mass of the shape (kg)
    pub mass: f32,

    /// Inertia tensor of the shape (kg m^2)
    pub inertia: Matrix3,
}

impl MassProperties {
    pub fn new(mass: f32, inertia: Matrix3) -> Self {
        Self { mass, inertia }
    }

    /// Mass properties of a solid box with full extents `box_size`
    pub fn solid_box(box_size: Vector3, density: f32) -> Self {
        let mut properties = Self::default();
        properties.set_mass_and_inertia_of_solid_box(box_size, density);
        properties
    }

    /// Sets the mass and inertia of a solid box with full extents `box_size`
    pub fn set_mass_and_inertia_of_solid_box(&mut self, box_size: Vector3, density: f32) {
        self.mass = box_size.x * box_size.y * box_size.z * density;

        let sq = box_size.component_mul(&box_size);
        let factor = self.mass / 12.0;
        self.inertia = Matrix3::from_diagonal(Vector3::new(
            factor * (sq.y + sq.z),
            factor * (sq.x + sq.z),
            factor * (sq.x + sq.y),
        ));
    }

    /// Rotates the inertia tensor: `I' = R * I * R^T`
    pub fn rotate(&mut self, rotation: &Matrix3) {
        self.inertia = rotation
            .multiply_matrix(&self.inertia)
            .multiply_matrix(&rotation.transpose());
    }

    /// Moves the inertia tensor away from the center of mass (parallel axis theorem)
    pub fn translate(&mut self, translation: Vector3) {
        let t = translation;
        let outer = Matrix3::from_columns(t * t.x, t * t.y, t * t.z);
        self.inertia = self.inertia + (Matrix3::identity() * t.dot(&t) - outer) * self.mass;
    }

    /// Scales the shape the mass properties belong to, keeping the density.
    ///
    /// Negative components mirror the shape.
    pub fn scale(&mut self, scale: Vector3) {
        let diagonal = self.inertia.diagonal();

        // Second moments of mass along each axis: sum of m * x^2, m * y^2, m * z^2
        let moments = Vector3::new(
            diagonal.y + diagonal.z - diagonal.x,
            diagonal.x + diagonal.z - diagonal.y,
            diagonal.x + diagonal.y - diagonal.z,
        ) * 0.5;

        let mass_scale = (scale.x * scale.y * scale.z).abs();
        let scaled = moments.component_mul(&scale).component_mul(&scale) * mass_scale;

        let i = &mut self.inertia.data;
        i[0][0] = scaled.y + scaled.z;
        i[1][1] = scaled.x + scaled.z;
        i[2][2] = scaled.x + scaled.y;

        let xy = mass_scale * scale.x * scale.y;
        let xz = mass_scale * scale.x * scale.z;
        let yz = mass_scale * scale.y * scale.z;
        i[0][1] *= xy;
        i[1][0] *= xy;
        i[0][2] *= xz;
        i[2][0] *= xz;
        i[1][2] *= yz;
        i[2][1] *= yz;

        self.mass *= mass_scale;
    }

    /// Splits the inertia tensor into a rotation and diagonal principal moments,
    /// such that `inertia = R * diag(moments) * R^T`.
    ///
    /// Returns `None` when the tensor contains non-finite values.
    pub fn decompose_principal_moments_of_inertia(&self) -> Option<(Matrix3, Vector3)> {
        let inertia = self.inertia.to_nalgebra();
        if inertia.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let eigen = na::SymmetricEigen::new(inertia);
        let mut rotation = Matrix3::from_nalgebra(&eigen.eigenvectors);

        // Keep a right handed basis
        if rotation.determinant() < 0.0 {
            for row in rotation.data.iter_mut() {
                row[2] = -row[2];
            }
        }

        let moments = Vector3::from_nalgebra(&eigen.eigenvalues);
        Some((rotation, moments))
    }
}

impl Default for MassProperties {
    fn default() -> Self {
        Self {
            mass: 0.0,
            inertia: Matrix3::zero(),
        }
    }
}
