//! ZPick 几何内核
//!
//! 为拾取引擎提供3D形状拓扑、变换以及射线/采样查询。
//!
//! # 架构设计
//!
//! - `Shape`: 轻量B-rep形状（顶点、折线边、三角化面）
//! - `GeometryKernel`: 选择引擎与几何之间的唯一接口
//! - `BRepKernel`: 基于 `Shape` 与 parry3d 的默认内核
//!
//! # 示例
//!
//! ```rust
//! use zpick_core::prelude::*;
//!
//! let shape = Shape::make_box(10.0, 10.0, 10.0).unwrap();
//! let kernel = BRepKernel;
//! assert_eq!(kernel.sub_shape_count(&shape, SubShapeType::Face), 6);
//! ```

pub mod error;
pub mod kernel;
pub mod math;
pub mod shape;
pub mod transform;

pub use error::ShapeError;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::error::ShapeError;
    pub use crate::kernel::{BRepKernel, GeometryKernel, SampleDensity, SubShape, SubShapeType};
    pub use crate::math::{BoundingBox2, BoundingBox3, PickRay, Point2, Point3, Vector2, Vector3};
    pub use crate::shape::{Edge, Face, Shape};
    pub use crate::transform::Transform3D;
}
