use crate::collision::convex::{self, ConvexHandlers};
use crate::collision::{
    CollideShapeResult, CollideShapeSettings, CollisionCollector, ShapeCast, ShapeCastResult,
    ShapeCastSettings, ShapeFilter,
};
use crate::math::{Matrix4, Vector3};
use crate::shapes::{EmptyShape, RotatedTranslatedShape, Shape, ShapeSubType, SubShapeIdCreator};
use std::collections::HashMap;
use std::fmt;

/// Handler colliding two shapes, both placed in the same space by their center
/// of mass transforms. Results are reported in that space.
pub type CollideShapeFn = fn(
    dispatch: &CollisionDispatch,
    shape1: &dyn Shape,
    shape2: &dyn Shape,
    scale1: Vector3,
    scale2: Vector3,
    center_of_mass_transform1: &Matrix4,
    center_of_mass_transform2: &Matrix4,
    id_creator1: SubShapeIdCreator,
    id_creator2: SubShapeIdCreator,
    settings: &CollideShapeSettings,
    collector: &mut dyn CollisionCollector<CollideShapeResult>,
    filter: &dyn ShapeFilter,
);

/// Handler sweeping a shape against a target. The cast is expressed in the
/// target's center of mass space, `center_of_mass_transform2` takes results to world space.
pub type CastShapeFn = fn(
    dispatch: &CollisionDispatch,
    shape_cast: &ShapeCast,
    settings: &ShapeCastSettings,
    shape: &dyn Shape,
    scale: Vector3,
    filter: &dyn ShapeFilter,
    center_of_mass_transform2: &Matrix4,
    id_creator1: SubShapeIdCreator,
    id_creator2: SubShapeIdCreator,
    collector: &mut dyn CollisionCollector<ShapeCastResult>,
);

/// Double dispatch table for shape vs shape queries, keyed by the sub types of both operands
#[derive(Clone, Default)]
pub struct CollisionDispatch {
    collide_shape: HashMap<(ShapeSubType, ShapeSubType), CollideShapeFn>,
    cast_shape: HashMap<(ShapeSubType, ShapeSubType), CastShapeFn>,
}

impl fmt::Debug for CollisionDispatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CollisionDispatch")
            .field("collide_shape", &self.collide_shape.keys().collect::<Vec<_>>())
            .field("cast_shape", &self.cast_shape.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CollisionDispatch {
    /// Creates an empty dispatch table
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatch table with handlers for every built in shape
    pub fn with_default_handlers() -> Self {
        let mut dispatch = Self::new();
        EmptyShape::register(&mut dispatch);
        ConvexHandlers::register(&mut dispatch);
        RotatedTranslatedShape::register(&mut dispatch);
        dispatch
    }

    /// Sets the collide handler for a pair, replacing any previous handler
    pub fn register_collide_shape(&mut self, type1: ShapeSubType, type2: ShapeSubType, handler: CollideShapeFn) {
        log::trace!("Registering collide handler for {:?} vs {:?}", type1, type2);
        self.collide_shape.insert((type1, type2), handler);
    }

    /// Sets the cast handler for a pair, replacing any previous handler
    pub fn register_cast_shape(&mut self, type1: ShapeSubType, type2: ShapeSubType, handler: CastShapeFn) {
        log::trace!("Registering cast handler for {:?} vs {:?}", type1, type2);
        self.cast_shape.insert((type1, type2), handler);
    }

    pub fn has_collide_shape(&self, type1: ShapeSubType, type2: ShapeSubType) -> bool {
        self.collide_shape.contains_key(&(type1, type2))
    }

    pub fn has_cast_shape(&self, type1: ShapeSubType, type2: ShapeSubType) -> bool {
        self.cast_shape.contains_key(&(type1, type2))
    }

    /// Collides two shapes using the handler registered for their sub types
    #[allow(clippy::too_many_arguments)]
    pub fn collide_shape_vs_shape(
        &self,
        shape1: &dyn Shape,
        shape2: &dyn Shape,
        scale1: Vector3,
        scale2: Vector3,
        center_of_mass_transform1: &Matrix4,
        center_of_mass_transform2: &Matrix4,
        id_creator1: SubShapeIdCreator,
        id_creator2: SubShapeIdCreator,
        settings: &CollideShapeSettings,
        collector: &mut dyn CollisionCollector<CollideShapeResult>,
        filter: &dyn ShapeFilter,
    ) {
        if !filter.should_collide_pair(shape1, id_creator1.id(), shape2, id_creator2.id()) {
            return;
        }

        let key = (shape1.sub_type(), shape2.sub_type());
        match self.collide_shape.get(&key) {
            Some(handler) => handler(
                self,
                shape1,
                shape2,
                scale1,
                scale2,
                center_of_mass_transform1,
                center_of_mass_transform2,
                id_creator1,
                id_creator2,
                settings,
                collector,
                filter,
            ),
            None => log::warn!("No collide handler registered for {:?} vs {:?}", key.0, key.1),
        }
    }

    /// Sweeps `shape_cast` against `shape` using the handler registered for their
    /// sub types, falling back to the target's own [`Shape::cast_shape`]
    #[allow(clippy::too_many_arguments)]
    pub fn cast_shape_vs_shape(
        &self,
        shape_cast: &ShapeCast,
        settings: &ShapeCastSettings,
        shape: &dyn Shape,
        scale: Vector3,
        filter: &dyn ShapeFilter,
        center_of_mass_transform2: &Matrix4,
        id_creator1: SubShapeIdCreator,
        id_creator2: SubShapeIdCreator,
        collector: &mut dyn CollisionCollector<ShapeCastResult>,
    ) {
        if !filter.should_collide_pair(shape_cast.shape, id_creator1.id(), shape, id_creator2.id()) {
            return;
        }

        let key = (shape_cast.shape.sub_type(), shape.sub_type());
        match self.cast_shape.get(&key) {
            Some(handler) => handler(
                self,
                shape_cast,
                settings,
                shape,
                scale,
                filter,
                center_of_mass_transform2,
                id_creator1,
                id_creator2,
                collector,
            ),
            None => shape.cast_shape(
                self,
                shape_cast,
                settings,
                scale,
                filter,
                center_of_mass_transform2,
                id_creator1,
                id_creator2,
                collector,
            ),
        }
    }
}

/// Collide handler for pairs that can never produce contacts
#[allow(clippy::too_many_arguments)]
pub fn collide_no_result(
    _dispatch: &CollisionDispatch,
    _shape1: &dyn Shape,
    _shape2: &dyn Shape,
    _scale1: Vector3,
    _scale2: Vector3,
    _center_of_mass_transform1: &Matrix4,
    _center_of_mass_transform2: &Matrix4,
    _id_creator1: SubShapeIdCreator,
    _id_creator2: SubShapeIdCreator,
    _settings: &CollideShapeSettings,
    _collector: &mut dyn CollisionCollector<CollideShapeResult>,
    _filter: &dyn ShapeFilter,
) {
}

/// Cast handler for pairs that can never produce hits
#[allow(clippy::too_many_arguments)]
pub fn cast_no_result(
    _dispatch: &CollisionDispatch,
    _shape_cast: &ShapeCast,
    _settings: &ShapeCastSettings,
    _shape: &dyn Shape,
    _scale: Vector3,
    _filter: &dyn ShapeFilter,
    _center_of_mass_transform2: &Matrix4,
    _id_creator1: SubShapeIdCreator,
    _id_creator2: SubShapeIdCreator,
    _collector: &mut dyn CollisionCollector<ShapeCastResult>,
) {
}
