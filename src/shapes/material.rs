use std::sync::OnceLock;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Surface material of a shape
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct PhysicsMaterial {
    /// Name used for debugging
    pub name: String,

    /// Coefficient of friction, 0-1
    pub friction: f32,

    /// Coefficient of restitution (bounciness), 0-1
    pub restitution: f32,

    /// Density of the material (kg/m^3)
    pub density: f32,
}

impl PhysicsMaterial {
    /// Creates a new material with the specified properties
    pub fn new(name: impl Into<String>, density: f32, friction: f32, restitution: f32) -> Self {
        Self {
            name: name.into(),
            friction,
            restitution,
            density,
        }
    }

    /// Creates a material for ice (low friction, high restitution)
    pub fn ice() -> Self {
        Self::new("Ice", 900.0, 0.05, 0.4)
    }

    /// Creates a material for rubber (medium friction, medium restitution)
    pub fn rubber() -> Self {
        Self::new("Rubber", 1200.0, 0.8, 0.7)
    }

    /// Creates a material for metal (medium friction, medium restitution)
    pub fn metal() -> Self {
        Self::new("Metal", 7800.0, 0.4, 0.5)
    }

    /// Material shared by every shape that has none assigned
    pub fn default_material() -> &'static PhysicsMaterial {
        static DEFAULT: OnceLock<PhysicsMaterial> = OnceLock::new();
        DEFAULT.get_or_init(PhysicsMaterial::default)
    }
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self::new("Default", 1000.0, 0.5, 0.3)
    }
}
