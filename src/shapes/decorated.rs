use crate::error::ShapeError;
use crate::serialization::{StreamIn, StreamOut};
use crate::shapes::shape::stats_once;
use crate::shapes::{PhysicsMaterial, Shape, ShapeList, ShapeSettings, ShapeStats, SubShapeId, VisitedShapes};
use std::sync::Arc;

/// Describes where a decorator gets its inner shape from
#[derive(Debug, Clone, Default)]
pub struct DecoratedShapeSettings {
    /// Settings to build the inner shape from
    pub inner_shape: Option<Arc<dyn ShapeSettings>>,

    /// Already built inner shape, takes precedence over `inner_shape`
    pub inner_shape_ptr: Option<Arc<dyn Shape>>,

    /// User data attached to the decorator itself
    pub user_data: u64,
}

impl DecoratedShapeSettings {
    pub fn from_settings(inner_shape: Arc<dyn ShapeSettings>) -> Self {
        Self {
            inner_shape: Some(inner_shape),
            ..Default::default()
        }
    }

    pub fn from_shape(inner_shape: Arc<dyn Shape>) -> Self {
        Self {
            inner_shape_ptr: Some(inner_shape),
            ..Default::default()
        }
    }

    /// Resolves the inner shape, building it from settings if no shape was given
    fn resolve_inner_shape(&self) -> crate::Result<Arc<dyn Shape>> {
        match (&self.inner_shape_ptr, &self.inner_shape) {
            (Some(shape), _) => Ok(shape.clone()),
            (None, Some(settings)) => settings.create(),
            (None, None) => Err(ShapeError::InnerShapeMissing),
        }
    }
}

/// State shared by every shape that wraps a single inner shape.
///
/// Concrete decorators embed this and forward the operations that do not depend
/// on their transform.
#[derive(Debug, Clone)]
pub struct DecoratedShape {
    inner_shape: Arc<dyn Shape>,
    user_data: u64,
}

impl DecoratedShape {
    pub fn new(settings: &DecoratedShapeSettings) -> crate::Result<Self> {
        Ok(Self {
            inner_shape: settings.resolve_inner_shape()?,
            user_data: settings.user_data,
        })
    }

    pub fn from_inner(inner_shape: Arc<dyn Shape>) -> Self {
        Self { inner_shape, user_data: 0 }
    }

    /// The wrapped shape
    #[inline]
    pub fn inner_shape(&self) -> &Arc<dyn Shape> {
        &self.inner_shape
    }

    pub fn user_data(&self) -> u64 {
        self.user_data
    }

    pub fn material(&self, sub_shape_id: SubShapeId) -> &PhysicsMaterial {
        self.inner_shape.material(sub_shape_id)
    }

    pub fn sub_shape_user_data(&self, sub_shape_id: SubShapeId) -> u64 {
        self.inner_shape.sub_shape_user_data(sub_shape_id)
    }

    pub fn save_sub_shape_state(&self, sub_shapes: &mut ShapeList) {
        sub_shapes.clear();
        sub_shapes.push(self.inner_shape.clone());
    }

    pub fn restore_sub_shape_state(&mut self, sub_shapes: &[Arc<dyn Shape>]) {
        assert_eq!(sub_shapes.len(), 1, "Decorated shape needs exactly one sub shape");
        self.inner_shape = sub_shapes[0].clone();
    }

    /// Stats of the decorator `own` (counted once) plus those of the inner shape
    pub fn stats_recursive(&self, own: &dyn Shape, visited: &mut VisitedShapes) -> ShapeStats {
        stats_once(own, visited) + self.inner_shape.stats_recursive(visited)
    }

    pub fn save_binary_state(&self, stream: &mut dyn StreamOut) {
        stream.write_u64(self.user_data);
    }

    pub fn restore_binary_state(&mut self, stream: &mut dyn StreamIn) -> crate::Result<()> {
        self.user_data = stream.read_u64()?;
        Ok(())
    }
}
