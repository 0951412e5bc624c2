//! 数学基础类型
//!
//! 基于 nalgebra 提供的向量和点类型的别名，以及拾取计算用到的
//! 包围盒、射线和最近点工具函数。

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// 2D点类型（屏幕坐标）
pub type Point2 = na::Point2<f64>;

/// 3D点类型
pub type Point3 = na::Point3<f64>;

/// 2D向量类型
pub type Vector2 = na::Vector2<f64>;

/// 3D向量类型
pub type Vector3 = na::Vector3<f64>;

/// 3D齐次变换矩阵
pub type Matrix4 = na::Matrix4<f64>;

/// 数值容差，用于几何比较
pub const EPSILON: f64 = 1e-10;

/// 判断两个浮点数是否近似相等
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// 判断两个浮点数在给定容差内是否相等
#[inline]
pub fn approx_eq_tol(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// 判断两个3D点是否近似相等
#[inline]
pub fn points_approx_eq(a: &Point3, b: &Point3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

/// 2D包围盒（屏幕空间矩形）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    /// 创建新的包围盒
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// 由任意两个对角点创建（自动规范化 min/max）
    pub fn from_corners(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// 创建空的包围盒（无效状态）
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::MAX, f64::MAX),
            max: Point2::new(f64::MIN, f64::MIN),
        }
    }

    /// 从点集创建包围盒
    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    /// 扩展包围盒以包含指定点
    pub fn expand_to_include(&mut self, point: &Point2) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// 检查是否包含指定点（含边界）
    pub fn contains(&self, point: &Point2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// 获取宽度
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// 获取高度
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// 面积；无效包围盒返回 0
    pub fn area(&self) -> f64 {
        if self.width() <= 0.0 || self.height() <= 0.0 {
            0.0
        } else {
            self.width() * self.height()
        }
    }

    /// 是否退化（面积为零或坐标非有限）
    pub fn is_degenerate(&self) -> bool {
        let finite = self.min.x.is_finite()
            && self.min.y.is_finite()
            && self.max.x.is_finite()
            && self.max.y.is_finite();
        !finite || self.area() <= 0.0
    }
}

/// 3D轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3 {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox3 {
    /// 创建新的包围盒
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// 创建空的包围盒（无效状态）
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// 从点集创建包围盒
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(p);
        }
        bbox
    }

    /// 扩展包围盒以包含指定点
    pub fn expand_to_include(&mut self, point: &Point3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// 是否有效（min <= max）
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// 获取中心点
    pub fn center(&self) -> Point3 {
        na::center(&self.min, &self.max)
    }

    /// 对角线长度
    pub fn diagonal(&self) -> f64 {
        if self.is_valid() {
            (self.max - self.min).norm()
        } else {
            0.0
        }
    }

    /// 八个角点
    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }
}

/// 拾取射线
///
/// 以线段形式表示：从近裁剪面上的点 `origin` 指向远裁剪面上的点 `end`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickRay {
    pub origin: Point3,
    pub end: Point3,
}

impl PickRay {
    /// 创建新的射线
    pub fn new(origin: Point3, end: Point3) -> Self {
        Self { origin, end }
    }

    /// 射线长度（近平面到远平面）
    pub fn length(&self) -> f64 {
        (self.end - self.origin).norm()
    }

    /// 单位方向；退化射线返回零向量
    pub fn direction(&self) -> Vector3 {
        let d = self.end - self.origin;
        let len = d.norm();
        if len <= EPSILON {
            Vector3::zeros()
        } else {
            d / len
        }
    }

    /// 是否退化
    pub fn is_degenerate(&self) -> bool {
        self.length() <= EPSILON
    }

    /// 沿方向距离 `distance` 处的点
    pub fn point_at(&self, distance: f64) -> Point3 {
        self.origin + self.direction() * distance
    }

    /// 点到射线线段的最短距离
    pub fn distance_to_point(&self, point: &Point3) -> f64 {
        (closest_point_on_segment(point, &self.origin, &self.end) - point).norm()
    }
}

/// 点在线段上的最近点
pub fn closest_point_on_segment(point: &Point3, a: &Point3, b: &Point3) -> Point3 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= EPSILON {
        return *a;
    }
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// 两条线段 `[p1, q1]` 与 `[p2, q2]` 之间的最近点对
///
/// 返回 `(线段1上的点, 线段2上的点)`。
pub fn closest_points_segments(
    p1: &Point3,
    q1: &Point3,
    p2: &Point3,
    q2: &Point3,
) -> (Point3, Point3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    if a <= EPSILON && e <= EPSILON {
        return (*p1, *p2);
    }

    let (s, t) = if a <= EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            // 近似平行时任取线段1的起点
            let mut s = if denom > EPSILON * a * e {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}

/// 射线与三角形求交（Möller–Trumbore）
///
/// 返回沿射线方向到交点的距离，只接受 `[0, ray.length()]` 范围内的交点。
/// 重心坐标带有小容差，落在相邻三角形公共边上的射线不会漏检。
pub fn ray_triangle_intersection(ray: &PickRay, triangle: &[Point3; 3]) -> Option<f64> {
    const BARYCENTRIC_TOLERANCE: f64 = 1e-9;

    let dir = ray.direction();
    let e1 = triangle[1] - triangle[0];
    let e2 = triangle[2] - triangle[0];
    let p = dir.cross(&e2);
    let det = e1.dot(&p);
    // 射线与三角形平面平行
    if det.abs() <= EPSILON * (e1.norm() * e2.norm()).max(1.0) {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - triangle[0];
    let u = s.dot(&p) * inv_det;
    if u < -BARYCENTRIC_TOLERANCE || u > 1.0 + BARYCENTRIC_TOLERANCE {
        return None;
    }

    let q = s.cross(&e1);
    let v = dir.dot(&q) * inv_det;
    if v < -BARYCENTRIC_TOLERANCE || u + v > 1.0 + BARYCENTRIC_TOLERANCE {
        return None;
    }

    let t = e2.dot(&q) * inv_det;
    (t >= 0.0 && t <= ray.length()).then_some(t)
}

/// 偶奇规则的点在多边形内测试
///
/// 多边形顶点列表可以闭合（首尾相同）也可以不闭合，
/// 两种情况结果一致。少于3个顶点时总是返回 `false`。
pub fn polygon_contains_point(polygon: &[Point2], point: &Point2) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
