//! 视口
//!
//! 像素坐标原点在左上角，Y轴向下；NDC 坐标范围为 [-1, 1]，Y轴向上。

use crate::error::CameraError;
use serde::{Deserialize, Serialize};
use zpick_core::math::Point2;

/// 视口尺寸（像素）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// 创建新的视口
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// 尺寸是否有效（有限且为正）
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// 校验尺寸
    pub fn validate(&self) -> Result<(), CameraError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CameraError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }

    /// 宽高比
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// 视口中心（像素）
    pub fn center(&self) -> Point2 {
        Point2::new(self.width / 2.0, self.height / 2.0)
    }

    /// 像素坐标转 NDC
    pub fn to_ndc(&self, pixel: &Point2) -> Point2 {
        Point2::new(
            2.0 * pixel.x / self.width - 1.0,
            1.0 - 2.0 * pixel.y / self.height,
        )
    }

    /// NDC 转像素坐标
    pub fn to_pixel(&self, ndc: &Point2) -> Point2 {
        Point2::new(
            (ndc.x + 1.0) * self.width / 2.0,
            (1.0 - ndc.y) * self.height / 2.0,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}
