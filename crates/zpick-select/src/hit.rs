//! 拾取结果类型

use crate::entity::ShapeId;
use serde::{Deserialize, Serialize};
use zpick_core::kernel::{SubShape, SubShapeType};
use zpick_core::math::Point3;

/// 子形状引用：精确标识实体中被命中的部分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubShapeReference {
    pub shape_id: ShapeId,
    pub sub_shape_type: SubShapeType,
    /// 整体为0，面/边/顶点从1开始
    pub sub_shape_index: usize,
}

impl SubShapeReference {
    /// 由内核的子形状（0基索引）构造
    pub fn new(shape_id: ShapeId, sub: SubShape) -> Self {
        Self {
            shape_id,
            sub_shape_type: sub.sub_shape_type(),
            sub_shape_index: sub.external_index(),
        }
    }

    /// 转换回内核的子形状
    pub fn to_sub_shape(&self) -> SubShape {
        SubShape::new(self.sub_shape_type, self.sub_shape_index.saturating_sub(1))
    }
}

/// 单个拾取命中
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitResult {
    /// 注册时分配的形状ID
    pub shape_id: ShapeId,

    /// 命中的子形状类型
    pub sub_shape_type: SubShapeType,

    /// 子形状索引：整体为0，其余从1开始
    pub sub_shape_index: usize,

    /// 命中点（世界坐标）
    pub point: Point3,

    /// 沿视线方向到相机的距离
    pub depth: f64,
}

impl HitResult {
    pub(crate) fn new(shape_id: ShapeId, sub: SubShape, point: Point3, depth: f64) -> Self {
        Self {
            shape_id,
            sub_shape_type: sub.sub_shape_type(),
            sub_shape_index: sub.external_index(),
            point,
            depth,
        }
    }

    /// 命中的子形状引用
    pub fn sub_shape(&self) -> SubShapeReference {
        SubShapeReference {
            shape_id: self.shape_id,
            sub_shape_type: self.sub_shape_type,
            sub_shape_index: self.sub_shape_index,
        }
    }
}
