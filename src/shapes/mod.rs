pub(crate) mod shape;
mod sub_shape_id;
mod material;
mod mass_properties;
pub mod scale_helpers;
mod empty;
mod sphere;
mod box_shape;
mod decorated;
mod rotated_translated;

pub use self::shape::{
    stats_once, ConvexShape, Shape, ShapeList, ShapeResult, ShapeSettings, ShapeStats, ShapeSubType, ShapeType,
    SubmergedVolume, VisitedShapes,
};
pub use self::sub_shape_id::{SubShapeId, SubShapeIdCreator};
pub use self::material::PhysicsMaterial;
pub use self::mass_properties::MassProperties;
pub use self::empty::{EmptyShape, EmptyShapeSettings};
pub use self::sphere::{Sphere, SphereSettings};
pub use self::box_shape::{BoxShape, BoxShapeSettings};
pub use self::decorated::{DecoratedShape, DecoratedShapeSettings};
pub use self::rotated_translated::{RotatedTranslatedShape, RotatedTranslatedShapeSettings};
