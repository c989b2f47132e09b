use bitflags::bitflags;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

bitflags! {
    /// Options for ray casts
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
    pub struct RayCastFlags: u32 {
        /// A ray starting inside a convex shape hits it at fraction 0
        const TREAT_CONVEX_AS_SOLID = 0x00000001;

        /// Report where the ray leaves a shape
        const COLLIDE_WITH_BACK_FACES = 0x00000002;
    }
}

bitflags! {
    /// Options for shape casts
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
    pub struct ShapeCastFlags: u32 {
        /// When the shapes start in collision, report the penetration depth
        const RETURN_DEEPEST_POINT = 0x00000001;

        /// Report hits where the cast shape moves away from the target
        const COLLIDE_WITH_BACK_FACES = 0x00000002;
    }
}

/// Configuration of a ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RayCastSettings {
    /// Behaviour switches
    pub flags: RayCastFlags,
}

impl Default for RayCastSettings {
    fn default() -> Self {
        Self {
            flags: RayCastFlags::TREAT_CONVEX_AS_SOLID,
        }
    }
}

impl RayCastSettings {
    #[inline]
    pub fn treat_convex_as_solid(&self) -> bool {
        self.flags.contains(RayCastFlags::TREAT_CONVEX_AS_SOLID)
    }

    #[inline]
    pub fn collide_with_back_faces(&self) -> bool {
        self.flags.contains(RayCastFlags::COLLIDE_WITH_BACK_FACES)
    }
}

/// Configuration of a shape vs shape collision query
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CollideShapeSettings {
    /// Shapes closer than this are reported with a negative penetration depth
    pub max_separation_distance: f32,

    /// Tolerance used to terminate the penetration depth search
    pub penetration_tolerance: f32,
}

impl Default for CollideShapeSettings {
    fn default() -> Self {
        Self {
            max_separation_distance: 0.0,
            penetration_tolerance: 1.0e-4,
        }
    }
}

/// Configuration of a shape cast
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ShapeCastSettings {
    /// Behaviour switches
    pub flags: ShapeCastFlags,

    /// Tolerance used when the shapes start in collision
    pub penetration_tolerance: f32,
}

impl Default for ShapeCastSettings {
    fn default() -> Self {
        Self {
            flags: ShapeCastFlags::empty(),
            penetration_tolerance: 1.0e-4,
        }
    }
}

impl ShapeCastSettings {
    #[inline]
    pub fn return_deepest_point(&self) -> bool {
        self.flags.contains(ShapeCastFlags::RETURN_DEEPEST_POINT)
    }

    #[inline]
    pub fn collide_with_back_faces(&self) -> bool {
        self.flags.contains(ShapeCastFlags::COLLIDE_WITH_BACK_FACES)
    }
}
