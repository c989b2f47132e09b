mod stream;
mod shape_graph;

pub use self::stream::{SliceStreamIn, StreamIn, StreamOut, VecStreamOut};
pub use self::shape_graph::{
    restore_with_children, save_with_children, IdToShapeMap, ShapeToIdMap, NULL_SHAPE_INDEX,
};
