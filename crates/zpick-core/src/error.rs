//! 形状构造错误定义

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("Invalid dimension {name}: {value}")]
    InvalidDimension { name: &'static str, value: f64 },

    #[error("Too few points: need at least {required}, got {actual}")]
    TooFewPoints { required: usize, actual: usize },

    #[error("Degenerate face: points are collinear or coincident")]
    DegenerateFace,

    #[error("Non-planar face: a point lies {deviation} off the face plane")]
    NonPlanarFace { deviation: f64 },

    #[error("Non-simple face: outline crosses itself")]
    NonSimpleFace,
}
