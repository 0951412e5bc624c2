//! 3D变换操作
//!
//! 支持平移、旋转、缩放以及它们的组合，用于摆放注册到选择器中的形状。

use crate::math::{Matrix4, Point3, Vector3, EPSILON};
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// 3D仿射变换
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    matrix: Matrix4,
}

impl Transform3D {
    /// 创建单位变换
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// 创建平移变换
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vector3::new(dx, dy, dz)),
        }
    }

    /// 创建绕过原点的轴旋转变换
    ///
    /// 零长度的轴视为单位变换。
    pub fn rotation(axis: Vector3, angle: f64) -> Self {
        match na::Unit::try_new(axis, EPSILON) {
            Some(axis) => Self {
                matrix: na::Rotation3::from_axis_angle(&axis, angle).to_homogeneous(),
            },
            None => Self::identity(),
        }
    }

    /// 创建绕指定点的轴旋转变换
    pub fn rotation_around(center: Point3, axis: Vector3, angle: f64) -> Self {
        Self::translation(center.x, center.y, center.z)
            .then(&Self::rotation(axis, angle))
            .then(&Self::translation(-center.x, -center.y, -center.z))
    }

    /// 创建缩放变换（绕原点）
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)),
        }
    }

    /// 创建均匀缩放变换
    pub fn uniform_scale(s: f64) -> Self {
        Self::scale(s, s, s)
    }

    /// 组合两个变换（self 在后，other 在前）
    pub fn then(&self, other: &Transform3D) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// 变换一个点
    pub fn transform_point(&self, point: &Point3) -> Point3 {
        self.matrix.transform_point(point)
    }

    /// 变换一个向量（不受平移影响）
    pub fn transform_vector(&self, vector: &Vector3) -> Vector3 {
        self.matrix.transform_vector(vector)
    }

    /// 获取逆变换
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|m| Self { matrix: m })
    }

    /// 获取变换矩阵
    pub fn matrix(&self) -> &Matrix4 {
        &self.matrix
    }

    /// 从矩阵创建变换
    pub fn from_matrix(matrix: Matrix4) -> Self {
        Self { matrix }
    }

    /// 提取平移分量
    pub fn translation_component(&self) -> Vector3 {
        Vector3::new(
            self.matrix[(0, 3)],
            self.matrix[(1, 3)],
            self.matrix[(2, 3)],
        )
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            matrix: self.matrix * rhs.matrix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, points_approx_eq};

    #[test]
    fn test_translation() {
        let t = Transform3D::translation(10.0, 20.0, -5.0);
        let result = t.transform_point(&Point3::new(5.0, 5.0, 5.0));

        assert!(points_approx_eq(&result, &Point3::new(15.0, 25.0, 0.0)));
        assert!(approx_eq(t.translation_component().z, -5.0));

        // 向量不受平移影响
        let v = t.transform_vector(&Vector3::new(1.0, 0.0, 0.0));
        assert!(approx_eq(v.x, 1.0));
        assert!(approx_eq(v.y, 0.0));
    }

    #[test]
    fn test_rotation() {
        let t = Transform3D::rotation(Vector3::z(), std::f64::consts::PI / 2.0);
        let result = t.transform_point(&Point3::new(1.0, 0.0, 0.0));

        assert!(points_approx_eq(&result, &Point3::new(0.0, 1.0, 0.0)));

        let degenerate = Transform3D::rotation(Vector3::zeros(), 1.0);
        assert_eq!(degenerate, Transform3D::identity());
    }

    #[test]
    fn test_rotation_around() {
        let t = Transform3D::rotation_around(
            Point3::new(1.0, 1.0, 0.0),
            Vector3::z(),
            std::f64::consts::PI,
        );
        let result = t.transform_point(&Point3::new(2.0, 1.0, 3.0));
        assert!(points_approx_eq(&result, &Point3::new(0.0, 1.0, 3.0)));
    }

    #[test]
    fn test_inverse() {
        let t = Transform3D::translation(10.0, 20.0, 30.0)
            .then(&Transform3D::rotation(Vector3::new(1.0, 1.0, 0.0), 0.5))
            .then(&Transform3D::scale(2.0, 3.0, 4.0));

        let inv = t.inverse().unwrap();
        let p = Point3::new(100.0, 200.0, -50.0);

        let restored = inv.transform_point(&t.transform_point(&p));

        assert!((restored - p).norm() < 1e-9);
    }
}
