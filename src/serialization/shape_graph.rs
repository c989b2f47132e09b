//! Persistence of shape graphs in which shapes may be shared.
//!
//! Every distinct shape is written once. The first time a shape is seen it gets
//! the next free index and its full state follows the index; later references
//! write the index alone.

use crate::error::ShapeError;
use crate::serialization::{StreamIn, StreamOut};
use crate::shapes::{BoxShape, EmptyShape, RotatedTranslatedShape, Shape, ShapeList, ShapeSubType, Sphere};
use std::collections::HashMap;
use std::sync::Arc;

/// Index written in place of a missing shape
pub const NULL_SHAPE_INDEX: u32 = u32::MAX;

/// Indices assigned to shapes that were already written, keyed by shape address
pub type ShapeToIdMap = HashMap<usize, u32>;

/// Shapes restored so far, by index. `None` marks a shape whose restore is in progress.
pub type IdToShapeMap = Vec<Option<Arc<dyn Shape>>>;

fn shape_address(shape: &Arc<dyn Shape>) -> usize {
    Arc::as_ptr(shape) as *const () as usize
}

/// Writes `shape` and, on its first occurrence, everything it references
pub fn save_with_children(shape: Option<&Arc<dyn Shape>>, stream: &mut dyn StreamOut, shape_map: &mut ShapeToIdMap) {
    let Some(shape) = shape else {
        stream.write_u32(NULL_SHAPE_INDEX);
        return;
    };

    let address = shape_address(shape);
    if let Some(&index) = shape_map.get(&address) {
        stream.write_u32(index);
        return;
    }

    let index = shape_map.len() as u32;
    shape_map.insert(address, index);
    stream.write_u32(index);
    stream.write_u32(shape.sub_type().code());
    shape.save_binary_state(stream);

    let mut sub_shapes = ShapeList::new();
    shape.save_sub_shape_state(&mut sub_shapes);
    stream.write_u32(sub_shapes.len() as u32);
    for sub_shape in &sub_shapes {
        save_with_children(Some(sub_shape), stream, shape_map);
    }
}

/// Default instance of a sub type, ready to have its state restored
fn default_shape(sub_type: ShapeSubType) -> Box<dyn Shape> {
    match sub_type {
        ShapeSubType::Empty => Box::new(EmptyShape::default()),
        ShapeSubType::Sphere => Box::new(Sphere::default()),
        ShapeSubType::Box => Box::new(BoxShape::default()),
        ShapeSubType::RotatedTranslated => Box::new(RotatedTranslatedShape::default()),
    }
}

/// Reads a shape written by [`save_with_children`], sharing shapes that were
/// already restored into `shape_map`
pub fn restore_with_children(
    stream: &mut dyn StreamIn,
    shape_map: &mut IdToShapeMap,
) -> crate::Result<Option<Arc<dyn Shape>>> {
    let index = stream.read_u32()?;
    if index == NULL_SHAPE_INDEX {
        return Ok(None);
    }

    let slot = index as usize;
    if slot < shape_map.len() {
        // A reference to a shape whose restore is still running would be a cycle
        return shape_map[slot].clone().map(Some).ok_or(ShapeError::InvalidShapeIndex(index));
    }
    if slot != shape_map.len() {
        return Err(ShapeError::InvalidShapeIndex(index));
    }
    shape_map.push(None);

    let code = stream.read_u32()?;
    let sub_type = ShapeSubType::from_code(code).ok_or(ShapeError::UnknownShapeType(code))?;
    let mut shape = default_shape(sub_type);
    shape.restore_binary_state(stream)?;

    let mut expected = ShapeList::new();
    shape.save_sub_shape_state(&mut expected);
    let count = stream.read_u32()?;
    if count as usize != expected.len() {
        return Err(ShapeError::Stream(format!(
            "{:?} expects {} sub shapes, stream has {}",
            sub_type,
            expected.len(),
            count
        )));
    }

    let mut sub_shapes = ShapeList::with_capacity(expected.len());
    for _ in 0..count {
        let sub_shape = restore_with_children(stream, shape_map)?
            .ok_or_else(|| ShapeError::Stream(format!("{:?} has a missing sub shape", sub_type)))?;
        sub_shapes.push(sub_shape);
    }
    shape.restore_sub_shape_state(&sub_shapes);

    let shape: Arc<dyn Shape> = Arc::from(shape);
    shape_map[slot] = Some(shape.clone());
    log::trace!("Restored {:?} as shape {}", sub_type, index);
    Ok(Some(shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Quaternion, Vector3};
    use crate::serialization::{SliceStreamIn, VecStreamOut};

    #[test]
    fn shared_shape_is_restored_once() {
        let sphere: Arc<dyn Shape> = Arc::new(Sphere::new(2.0));
        let decorator: Arc<dyn Shape> = Arc::new(
            RotatedTranslatedShape::from_inner(Vector3::new(1.0, 0.0, 0.0), Quaternion::identity(), sphere.clone())
                .unwrap(),
        );

        let mut stream = VecStreamOut::new();
        let mut saved = ShapeToIdMap::new();
        save_with_children(Some(&decorator), &mut stream, &mut saved);
        save_with_children(Some(&sphere), &mut stream, &mut saved);
        save_with_children(None, &mut stream, &mut saved);
        assert_eq!(saved.len(), 2);

        let mut input = SliceStreamIn::new(stream.as_slice());
        let mut restored = IdToShapeMap::new();
        let decorator = restore_with_children(&mut input, &mut restored).unwrap().unwrap();
        let sphere = restore_with_children(&mut input, &mut restored).unwrap().unwrap();
        assert!(restore_with_children(&mut input, &mut restored).unwrap().is_none());
        assert!(input.is_at_end());

        let decorator = decorator.as_any().downcast_ref::<RotatedTranslatedShape>().unwrap();
        assert!(Arc::ptr_eq(decorator.inner_shape(), &sphere));
        assert_eq!(decorator.center_of_mass(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn unknown_sub_type_is_rejected() {
        let mut stream = VecStreamOut::new();
        stream.write_u32(0);
        stream.write_u32(42);

        let mut input = SliceStreamIn::new(stream.as_slice());
        let result = restore_with_children(&mut input, &mut IdToShapeMap::new());
        assert!(matches!(result, Err(ShapeError::UnknownShapeType(42))));
    }

    #[test]
    fn forward_reference_is_rejected() {
        let mut stream = VecStreamOut::new();
        stream.write_u32(3);

        let mut input = SliceStreamIn::new(stream.as_slice());
        let result = restore_with_children(&mut input, &mut IdToShapeMap::new());
        assert!(matches!(result, Err(ShapeError::InvalidShapeIndex(3))));
    }
}
