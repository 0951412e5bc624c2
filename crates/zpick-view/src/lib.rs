//! ZPick 相机与视口
//!
//! 基于 nalgebra 的透视/正交相机。
//!
//! # 特点
//!
//! - **投影/反投影**：世界坐标与 NDC、像素坐标之间的转换
//! - **拾取射线**：从近平面到远平面穿过指定像素的射线
//! - **批量投影**：`Projector` 缓存矩阵及其逆矩阵

pub mod camera;
pub mod error;
pub mod viewport;

pub use camera::{Camera, ProjectionType, Projector, ScreenPoint};
pub use error::CameraError;
pub use viewport::Viewport;
