//! 相机与视口错误定义

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("Degenerate view: eye coincides with center or up is parallel to the view direction")]
    DegenerateView,

    #[error("Invalid camera parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("View-projection matrix is not invertible")]
    NonInvertible,

    #[error("Invalid viewport size: {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
}
