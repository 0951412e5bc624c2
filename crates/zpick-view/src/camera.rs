//! 3D相机
//!
//! 支持透视与正交投影，提供投影/反投影、拾取射线构造和视图适配。
//! NDC 采用 OpenGL 约定（x、y、z 均在 [-1, 1]）。

use crate::error::CameraError;
use crate::viewport::Viewport;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use zpick_core::math::{BoundingBox3, Matrix4, PickRay, Point2, Point3, Vector3, EPSILON};

/// NDC 深度范围的容差
const CLIP_TOLERANCE: f64 = 1e-9;

/// 投影类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

/// 3D相机
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// 相机位置（世界坐标）
    pub eye: Point3,

    /// 观察中心（世界坐标）
    pub center: Point3,

    /// 上方向
    pub up: Vector3,

    /// 投影类型
    pub projection: ProjectionType,

    /// 垂直视场角（度），仅透视投影使用
    pub fov: f64,

    /// 正交投影的可见高度（世界单位）
    pub scale: f64,

    /// 近裁剪面距离
    pub z_near: f64,

    /// 远裁剪面距离
    pub z_far: f64,

    /// 宽高比
    pub aspect: f64,
}

/// 点在屏幕上的投影
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// 像素坐标
    pub pixel: Point2,
    /// 沿视线方向到相机的距离
    pub depth: f64,
}

impl Camera {
    /// 创建默认相机：位于 (0, 0, 50) 看向原点，45° 透视
    pub fn new() -> Self {
        Self {
            eye: Point3::new(0.0, 0.0, 50.0),
            center: Point3::origin(),
            up: Vector3::y(),
            projection: ProjectionType::Perspective,
            fov: 45.0,
            scale: 100.0,
            z_near: 0.1,
            z_far: 1000.0,
            aspect: 1.0,
        }
    }

    /// 以给定的观察参数创建透视相机
    pub fn look_at(eye: Point3, center: Point3, up: Vector3) -> Self {
        Self {
            eye,
            center,
            up,
            ..Self::new()
        }
    }

    /// 设置投影类型
    pub fn with_projection(mut self, projection: ProjectionType) -> Self {
        self.projection = projection;
        self
    }

    /// 设置垂直视场角（度）
    pub fn with_fov(mut self, fov: f64) -> Self {
        self.fov = fov;
        self
    }

    /// 设置正交投影可见高度
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// 设置宽高比
    pub fn with_aspect(mut self, aspect: f64) -> Self {
        self.aspect = aspect;
        self
    }

    /// 设置近/远裁剪面
    pub fn with_z_range(mut self, z_near: f64, z_far: f64) -> Self {
        self.z_near = z_near;
        self.z_far = z_far;
        self
    }

    /// 单位视线方向；退化时返回零向量
    pub fn view_direction(&self) -> Vector3 {
        let d = self.center - self.eye;
        let len = d.norm();
        if len <= EPSILON {
            Vector3::zeros()
        } else {
            d / len
        }
    }

    /// 相机到观察中心的距离
    pub fn distance(&self) -> f64 {
        (self.center - self.eye).norm()
    }

    /// 校验相机参数
    pub fn validate(&self) -> Result<(), CameraError> {
        let mut coords = self.eye.iter().chain(self.center.iter()).chain(self.up.iter());
        if coords.any(|v| !v.is_finite()) {
            return Err(CameraError::DegenerateView);
        }

        let dir = self.view_direction();
        let up_tolerance = EPSILON * self.up.norm().max(1.0);
        if dir.norm() <= EPSILON || self.up.cross(&dir).norm() <= up_tolerance {
            return Err(CameraError::DegenerateView);
        }

        check_positive("aspect", self.aspect)?;
        if !self.z_far.is_finite() || self.z_far <= self.z_near {
            return Err(CameraError::InvalidParameter {
                name: "z_far",
                value: self.z_far,
            });
        }

        match self.projection {
            ProjectionType::Perspective => {
                check_positive("z_near", self.z_near)?;
                if !(self.fov > 0.0 && self.fov < 180.0) {
                    return Err(CameraError::InvalidParameter {
                        name: "fov",
                        value: self.fov,
                    });
                }
            }
            ProjectionType::Orthographic => {
                if !self.z_near.is_finite() {
                    return Err(CameraError::InvalidParameter {
                        name: "z_near",
                        value: self.z_near,
                    });
                }
                check_positive("scale", self.scale)?;
            }
        }
        Ok(())
    }

    /// 视图矩阵（世界 → 相机）
    pub fn view_matrix(&self) -> Result<Matrix4, CameraError> {
        self.validate()?;
        Ok(na::Isometry3::look_at_rh(&self.eye, &self.center, &self.up).to_homogeneous())
    }

    /// 投影矩阵（相机 → 裁剪空间）
    pub fn projection_matrix(&self) -> Result<Matrix4, CameraError> {
        self.validate()?;
        let matrix = match self.projection {
            ProjectionType::Perspective => {
                na::Perspective3::new(self.aspect, self.fov.to_radians(), self.z_near, self.z_far)
                    .to_homogeneous()
            }
            ProjectionType::Orthographic => {
                let half_h = self.scale / 2.0;
                let half_w = half_h * self.aspect;
                na::Orthographic3::new(-half_w, half_w, -half_h, half_h, self.z_near, self.z_far)
                    .to_homogeneous()
            }
        };
        Ok(matrix)
    }

    /// 组合的视图投影矩阵
    pub fn view_projection(&self) -> Result<Matrix4, CameraError> {
        Ok(self.projection_matrix()? * self.view_matrix()?)
    }

    /// 世界坐标投影到 NDC
    pub fn project(&self, world: &Point3) -> Result<Point3, CameraError> {
        Ok(self.view_projection()?.transform_point(world))
    }

    /// NDC 反投影到世界坐标
    pub fn unproject(&self, ndc: &Point3) -> Result<Point3, CameraError> {
        let inverse = self
            .view_projection()?
            .try_inverse()
            .ok_or(CameraError::NonInvertible)?;
        Ok(inverse.transform_point(ndc))
    }

    /// 为指定视口预计算投影器，批量投影时避免重复求逆
    pub fn projector(&self, viewport: Viewport) -> Result<Projector, CameraError> {
        viewport.validate()?;
        let view_projection = self.view_projection()?;
        let inverse = view_projection
            .try_inverse()
            .ok_or(CameraError::NonInvertible)?;
        Ok(Projector {
            view_projection,
            inverse,
            eye: self.eye,
            direction: self.view_direction(),
            viewport,
        })
    }

    /// 世界坐标转屏幕坐标；相机无效或点不在深度范围内时返回 `None`
    pub fn world_to_screen(&self, world: &Point3, viewport: Viewport) -> Option<ScreenPoint> {
        self.projector(viewport).ok()?.world_to_screen(world)
    }

    /// 构造穿过像素的拾取射线（近平面到远平面）
    pub fn pick_ray(&self, pixel: &Point2, viewport: Viewport) -> Result<PickRay, CameraError> {
        Ok(self.projector(viewport)?.pick_ray(pixel))
    }

    /// 点沿视线方向到相机的有符号距离
    pub fn depth_of(&self, point: &Point3) -> f64 {
        (point - self.eye).dot(&self.view_direction())
    }

    /// 调整相机使包围盒完整可见，保持视线方向不变
    pub fn fit(&mut self, bbox: &BoundingBox3) {
        if !bbox.is_valid() {
            tracing::warn!("Ignoring fit to an empty bounding box");
            return;
        }

        let mut dir = self.view_direction();
        if dir.norm() <= EPSILON {
            dir = -Vector3::z();
        }
        let target = bbox.center();
        let radius = (bbox.diagonal() / 2.0).max(EPSILON);

        let distance = match self.projection {
            ProjectionType::Perspective => {
                let half_v = self.fov.to_radians() / 2.0;
                let half = if self.aspect < 1.0 {
                    (half_v.tan() * self.aspect).atan()
                } else {
                    half_v
                };
                radius / half.sin()
            }
            ProjectionType::Orthographic => {
                self.scale = 2.0 * radius / self.aspect.min(1.0);
                self.distance().max(2.0 * radius)
            }
        };

        self.center = target;
        self.eye = target - dir * distance;
        if self.z_far < distance + radius {
            self.z_far = distance + 2.0 * radius;
        }
    }

    /// 缩放视图：透视投影拉近相机，正交投影缩小可见高度
    pub fn zoom(&mut self, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            tracing::warn!("Ignoring invalid zoom factor {}", factor);
            return;
        }
        match self.projection {
            ProjectionType::Perspective => {
                let dir = self.view_direction();
                self.eye = self.center - dir * (self.distance() / factor);
            }
            ProjectionType::Orthographic => self.scale /= factor,
        }
    }

    /// 重置相机到默认状态
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// 预计算的投影器
///
/// 保存视图投影矩阵及其逆矩阵，供一次拾取查询中的大量点投影使用。
#[derive(Debug, Clone)]
pub struct Projector {
    view_projection: Matrix4,
    inverse: Matrix4,
    eye: Point3,
    direction: Vector3,
    viewport: Viewport,
}

impl Projector {
    /// 世界坐标转屏幕坐标；在相机后方或超出近/远平面时返回 `None`
    pub fn world_to_screen(&self, world: &Point3) -> Option<ScreenPoint> {
        let clip = self.view_projection * world.to_homogeneous();
        if clip.w <= EPSILON {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        if ndc.z < -1.0 - CLIP_TOLERANCE || ndc.z > 1.0 + CLIP_TOLERANCE {
            return None;
        }
        Some(ScreenPoint {
            pixel: self.viewport.to_pixel(&Point2::new(ndc.x, ndc.y)),
            depth: self.depth_of(world),
        })
    }

    /// 构造穿过像素的拾取射线
    pub fn pick_ray(&self, pixel: &Point2) -> PickRay {
        let ndc = self.viewport.to_ndc(pixel);
        let near = self.inverse.transform_point(&Point3::new(ndc.x, ndc.y, -1.0));
        let far = self.inverse.transform_point(&Point3::new(ndc.x, ndc.y, 1.0));
        PickRay::new(near, far)
    }

    /// 点沿视线方向到相机的有符号距离
    pub fn depth_of(&self, point: &Point3) -> f64 {
        (point - self.eye).dot(&self.direction)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn view_projection(&self) -> &Matrix4 {
        &self.view_projection
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), CameraError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CameraError::InvalidParameter { name, value })
    }
}
