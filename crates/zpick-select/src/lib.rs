//! ZPick 选择引擎
//!
//! 维护可选形状注册表及每个形状的选择模式，响应屏幕空间的拾取查询。
//!
//! # 查询流程
//!
//! 1. 按形状ID升序、模式顺序（Shape、Face、Edge、Vertex）生成候选
//! 2. 对每个候选做命中测试（点选、框选或套索）
//! 3. 按深度排序，按需去重并截断
//!
//! # 示例
//!
//! ```rust
//! use zpick_core::math::{Point2, Point3};
//! use zpick_core::shape::Shape;
//! use zpick_select::{Selector, ShapeId};
//! use zpick_view::{Camera, Viewport};
//!
//! let mut selector = Selector::new();
//! let shape = Shape::make_box_centered(Point3::origin(), 10.0, 10.0, 10.0).unwrap();
//! selector.add(shape, ShapeId(42));
//!
//! let viewport = Viewport::new(800.0, 600.0);
//! let hits = selector.pick(Point2::new(400.0, 300.0), &Camera::new(), viewport);
//! assert_eq!(hits[0].shape_id, ShapeId(42));
//! ```

pub mod candidate;
pub mod config;
pub mod entity;
pub mod error;
pub mod hit;
pub mod hit_test;
pub mod mode;
pub mod ranker;
pub mod selector;

pub use config::SelectorConfig;
pub use entity::{SelectableEntity, ShapeId};
pub use error::SelectError;
pub use hit::{HitResult, SubShapeReference};
pub use hit_test::ScreenRegion;
pub use mode::{ModeSet, SelectionMode};
pub use selector::Selector;
