mod collector;
mod results;
mod settings;
mod shape_cast;
mod transformed_shape;
mod dispatch;
mod gjk;
mod epa;
pub mod convex;

pub use self::collector::{
    AllHitCollector, AnyHitCollector, ClosestHitCollector, CollisionCollector, CollisionResult,
    FORCED_EARLY_OUT_FRACTION,
};
pub use self::results::{CollidePointResult, CollideShapeResult, RayCastResult, ShapeCastResult};
pub use self::settings::{
    CollideShapeSettings, RayCastFlags, RayCastSettings, ShapeCastFlags, ShapeCastSettings,
};
pub use self::shape_cast::{DefaultShapeFilter, ShapeCast, ShapeFilter};
pub use self::transformed_shape::TransformedShape;
pub use self::dispatch::{cast_no_result, collide_no_result, CastShapeFn, CollideShapeFn, CollisionDispatch};
pub use self::gjk::{CastHit, Simplex, SupportMap, TransformedConvex, GJK};
pub use self::epa::EPA;
