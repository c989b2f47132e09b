pub mod math;
pub mod shapes;
pub mod collision;
pub mod serialization;

/// Re-export common types for easier usage
pub use crate::math::{Vector3, Quaternion, Matrix4};
pub use crate::shapes::{
    Shape, ShapeSettings, ShapeResult, DecoratedShape, DecoratedShapeSettings,
    RotatedTranslatedShape, RotatedTranslatedShapeSettings,
};
pub use crate::collision::CollisionDispatch;

/// Error types for shape construction and persistence
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum ShapeError {
        #[error("Inner shape is null")]
        InnerShapeMissing,

        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Stream error: {0}")]
        Stream(String),

        #[error("Unknown shape sub type: {0}")]
        UnknownShapeType(u32),

        #[error("Invalid shape index: {0}")]
        InvalidShapeIndex(u32),
    }
}

/// Result type for shape operations
pub type Result<T> = std::result::Result<T, error::ShapeError>;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
